//! Extração da concentração PM2.5 do corpo JSON do sensor.
//!
//! Dois formatos históricos da PurpleAir são suportados; a lógica de
//! mapeamento é idêntica depois que o número é extraído.
//!
//! ```text
//! PurpleAirV1      GET https://api.purpleair.com/v1/sensors/<id>
//!                  { "sensor": { "pm2.5_atm": 12.3, ... } }
//!
//! PurpleAirLegacy  GET https://www.purpleair.com/json?show=<id>
//!                  { "results": [ { "PM2_5Value": "12.3", ... } ] }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Erros de extração do payload.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayloadError {
    #[error("JSON inválido: {0}")]
    Json(String),

    #[error("Campo ausente: {0}")]
    MissingField(String),

    #[error("Campo {pointer} não é numérico: {value}")]
    NotNumeric { pointer: String, value: String },

    #[error("Valor não finito: {0}")]
    NotFinite(f64),
}

/// Formato do payload retornado pelo sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadShape {
    /// API v1 com chave (`X-API-Key`)
    #[default]
    PurpleAirV1,
    /// JSON público antigo, valores como string
    PurpleAirLegacy,
}

impl PayloadShape {
    /// JSON pointer (RFC 6901) do campo de concentração.
    pub fn default_pointer(self) -> &'static str {
        match self {
            PayloadShape::PurpleAirV1 => "/sensor/pm2.5_atm",
            PayloadShape::PurpleAirLegacy => "/results/0/PM2_5Value",
        }
    }

    /// URL base; o id do sensor é concatenado no final.
    pub fn default_base_url(self) -> &'static str {
        match self {
            PayloadShape::PurpleAirV1 => "https://api.purpleair.com/v1/sensors/",
            PayloadShape::PurpleAirLegacy => "https://www.purpleair.com/json?show=",
        }
    }

    /// Se a API exige header de chave.
    pub fn needs_api_key(self) -> bool {
        matches!(self, PayloadShape::PurpleAirV1)
    }
}

/// Lê o valor em `pointer` como concentração.
///
/// Aceita número JSON ou string numérica. NaN/infinito são rejeitados para
/// nunca chegarem ao valor compartilhado.
pub fn extract_concentration(body: &str, pointer: &str) -> Result<f64, PayloadError> {
    let json: Value = serde_json::from_str(body).map_err(|e| PayloadError::Json(e.to_string()))?;

    let field = json
        .pointer(pointer)
        .ok_or_else(|| PayloadError::MissingField(pointer.to_string()))?;

    let value = match field {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| PayloadError::NotNumeric {
        pointer: pointer.to_string(),
        value: field.to_string(),
    })?;

    if !value.is_finite() {
        return Err(PayloadError::NotFinite(value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1_BODY: &str = r#"{
        "api_version": "V1.0.11",
        "sensor": { "sensor_index": 1234, "name": "Quintal", "pm2.5_atm": 8.4 }
    }"#;

    const LEGACY_BODY: &str = r#"{
        "mapVersion": "0.18",
        "results": [
            { "ID": 1234, "Label": "Quintal", "PM2_5Value": "23.07" },
            { "ID": 1235, "Label": "Quintal B", "PM2_5Value": "22.90" }
        ]
    }"#;

    #[test]
    fn extracts_v1_number() {
        let pointer = PayloadShape::PurpleAirV1.default_pointer();
        assert_eq!(extract_concentration(V1_BODY, pointer), Ok(8.4));
    }

    #[test]
    fn extracts_legacy_string() {
        let pointer = PayloadShape::PurpleAirLegacy.default_pointer();
        assert_eq!(extract_concentration(LEGACY_BODY, pointer), Ok(23.07));
    }

    #[test]
    fn wrong_shape_reports_missing_field() {
        let pointer = PayloadShape::PurpleAirLegacy.default_pointer();
        assert!(matches!(
            extract_concentration(V1_BODY, pointer),
            Err(PayloadError::MissingField(_))
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            extract_concentration("<html>502</html>", "/sensor/pm2.5_atm"),
            Err(PayloadError::Json(_))
        ));
    }

    #[test]
    fn rejects_non_numeric_values() {
        let body = r#"{ "sensor": { "pm2.5_atm": null } }"#;
        assert!(matches!(
            extract_concentration(body, "/sensor/pm2.5_atm"),
            Err(PayloadError::NotNumeric { .. })
        ));
        let body = r#"{ "sensor": { "pm2.5_atm": "n/a" } }"#;
        assert!(matches!(
            extract_concentration(body, "/sensor/pm2.5_atm"),
            Err(PayloadError::NotNumeric { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_strings() {
        let body = r#"{ "sensor": { "pm2.5_atm": "NaN" } }"#;
        assert!(matches!(
            extract_concentration(body, "/sensor/pm2.5_atm"),
            Err(PayloadError::NotFinite(_))
        ));
    }

    #[test]
    fn shape_names_in_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            payload: PayloadShape,
        }
        let w: Wrapper = toml::from_str(r#"payload = "purple_air_legacy""#).unwrap();
        assert_eq!(w.payload, PayloadShape::PurpleAirLegacy);
    }
}
