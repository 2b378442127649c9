//! Interface de busca do sensor.
//!
//! O poller só conhece [`SensorFetch`]. A implementação HTTP real vive no
//! binário (`ureq`); aqui fica a composição transporte + request + formato
//! do payload, testável com transportes falsos.

use crate::config::SensorConfig;
use crate::payload::{PayloadError, PayloadShape, extract_concentration};
use std::time::Duration;

/// Qualquer falha de um ciclo de busca. Para o poller todas contam igual.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("Status HTTP inesperado: {0}")]
    Status(u16),

    #[error("Timeout na requisição")]
    Timeout,

    #[error("Erro de transporte: {0}")]
    Transport(String),

    #[error("Payload inválido: {0}")]
    Payload(#[from] PayloadError),
}

/// Requisição GET já montada.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

/// Resposta crua: status e corpo.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Cliente HTTP bloqueante com timeout limitado.
pub trait HttpTransport: Send {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError>;
}

/// Fonte de concentração consumida pelo poller.
pub trait SensorFetch: Send {
    fn fetch_concentration(&mut self) -> Result<f64, FetchError>;
}

/// Sensor HTTP: transporte + requisição + formato do payload.
pub struct HttpSensor<T> {
    transport: T,
    request: HttpRequest,
    pointer: String,
}

impl<T: HttpTransport> HttpSensor<T> {
    pub fn new(transport: T, request: HttpRequest, shape: PayloadShape) -> Self {
        Self {
            transport,
            request,
            pointer: shape.default_pointer().to_string(),
        }
    }

    /// Monta URL, headers e ponteiro a partir do `[sensor]` do config.
    pub fn from_config(transport: T, cfg: &SensorConfig) -> Self {
        let shape = cfg.payload;
        let base = if cfg.base_url.is_empty() {
            shape.default_base_url()
        } else {
            cfg.base_url.as_str()
        };

        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if shape.needs_api_key() && !cfg.api_key.is_empty() {
            headers.push((cfg.api_key_header.clone(), cfg.api_key.clone()));
        }

        let request = HttpRequest {
            url: format!("{base}{}", cfg.sensor_id),
            headers,
            timeout: Duration::from_secs_f64(cfg.timeout_secs),
        };

        let mut sensor = Self::new(transport, request, shape);
        if !cfg.field_pointer.is_empty() {
            sensor.pointer = cfg.field_pointer.clone();
        }
        sensor
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }
}

impl<T: HttpTransport> SensorFetch for HttpSensor<T> {
    fn fetch_concentration(&mut self) -> Result<f64, FetchError> {
        let response = self.transport.get(&self.request)?;
        if !(200..300).contains(&response.status) {
            return Err(FetchError::Status(response.status));
        }
        Ok(extract_concentration(&response.body, &self.pointer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Transporte falso que devolve uma resposta fixa e grava as requisições.
    struct CannedTransport {
        reply: Result<HttpResponse, FetchError>,
        seen: Arc<Mutex<Vec<HttpRequest>>>,
    }

    impl HttpTransport for CannedTransport {
        fn get(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    fn canned(reply: Result<HttpResponse, FetchError>) -> (CannedTransport, Arc<Mutex<Vec<HttpRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            CannedTransport {
                reply,
                seen: Arc::clone(&seen),
            },
            seen,
        )
    }

    fn ok(body: &str) -> Result<HttpResponse, FetchError> {
        Ok(HttpResponse {
            status: 200,
            body: body.into(),
        })
    }

    fn v1_config() -> SensorConfig {
        SensorConfig {
            sensor_id: "98765".into(),
            api_key: "READ-KEY".into(),
            ..Default::default()
        }
    }

    #[test]
    fn v1_request_carries_key_and_timeout() {
        let (transport, seen) = canned(ok(r#"{"sensor":{"pm2.5_atm":3.5}}"#));
        let mut sensor = HttpSensor::from_config(transport, &v1_config());
        assert_eq!(sensor.fetch_concentration(), Ok(3.5));

        let seen = seen.lock().unwrap();
        let req = &seen[0];
        assert_eq!(req.url, "https://api.purpleair.com/v1/sensors/98765");
        assert!(req.headers.contains(&("X-API-Key".into(), "READ-KEY".into())));
        assert_eq!(req.timeout, Duration::from_secs(30));
    }

    #[test]
    fn legacy_request_has_no_key_header() {
        let cfg = SensorConfig {
            payload: PayloadShape::PurpleAirLegacy,
            ..v1_config()
        };
        let (transport, _) = canned(ok(r#"{"results":[{"PM2_5Value":"41.2"}]}"#));
        let mut sensor = HttpSensor::from_config(transport, &cfg);
        assert_eq!(sensor.request().url, "https://www.purpleair.com/json?show=98765");
        assert!(sensor.request().headers.iter().all(|(k, _)| k != "X-API-Key"));
        assert_eq!(sensor.fetch_concentration(), Ok(41.2));
    }

    #[test]
    fn custom_pointer_and_base_url() {
        let cfg = SensorConfig {
            base_url: "http://192.168.1.50/json?id=".into(),
            field_pointer: "/pm2_5_atm".into(),
            ..v1_config()
        };
        let (transport, _) = canned(ok(r#"{"pm2_5_atm": 5.0}"#));
        let mut sensor = HttpSensor::from_config(transport, &cfg);
        assert_eq!(sensor.request().url, "http://192.168.1.50/json?id=98765");
        assert_eq!(sensor.fetch_concentration(), Ok(5.0));
    }

    #[test]
    fn non_success_status_is_error() {
        let (transport, _) = canned(Ok(HttpResponse {
            status: 403,
            body: r#"{"error":"InvalidApiKeyError"}"#.into(),
        }));
        let mut sensor = HttpSensor::from_config(transport, &v1_config());
        assert_eq!(sensor.fetch_concentration(), Err(FetchError::Status(403)));
    }

    #[test]
    fn transport_errors_propagate() {
        let (transport, _) = canned(Err(FetchError::Timeout));
        let mut sensor = HttpSensor::from_config(transport, &v1_config());
        assert_eq!(sensor.fetch_concentration(), Err(FetchError::Timeout));
    }

    #[test]
    fn bad_body_is_payload_error() {
        let (transport, _) = canned(ok("{}"));
        let mut sensor = HttpSensor::from_config(transport, &v1_config());
        assert!(matches!(
            sensor.fetch_concentration(),
            Err(FetchError::Payload(PayloadError::MissingField(_)))
        ));
    }
}
