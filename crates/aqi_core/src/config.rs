//! Configuração unificada via TOML.
//!
//! Credenciais, horários, intervalos, tolerância, divisores e a tabela de
//! breakpoints vivem em um único `config.toml`, lido só no startup.

use crate::breakpoints::{BreakpointRow, BreakpointTable, default_rows};
use crate::payload::PayloadShape;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Variável de ambiente que sobrescreve o caminho do `config.toml`.
pub const CONFIG_ENV_VAR: &str = "AQI_ORB_CONFIG";

/// Sensor remoto (PurpleAir).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Formato do payload: "purple_air_v1" ou "purple_air_legacy"
    pub payload: PayloadShape,
    /// URL base (vazio = padrão do formato); o id é concatenado
    pub base_url: String,
    /// Índice/ID do sensor
    pub sensor_id: String,
    /// Chave de leitura da API v1
    pub api_key: String,
    /// Nome do header da chave
    pub api_key_header: String,
    /// JSON pointer do campo PM2.5 (vazio = padrão do formato)
    pub field_pointer: String,
    /// Timeout da requisição em segundos
    pub timeout_secs: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            payload: PayloadShape::PurpleAirV1,
            base_url: String::new(),
            sensor_id: String::new(),
            api_key: String::new(),
            api_key_header: "X-API-Key".into(),
            field_pointer: String::new(),
            timeout_secs: 30.0,
        }
    }
}

/// Thread de polling do sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Intervalo entre consultas (segundos)
    pub interval_secs: f64,
    /// Falhas consecutivas toleradas antes de marcar offline
    pub fail_count_tolerance: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 15.0,
            fail_count_tolerance: 8,
        }
    }
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }
}

/// Loop de renderização.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Intervalo entre atualizações da fita (segundos)
    pub interval_secs: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { interval_secs: 15.0 }
    }
}

impl RenderConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }
}

/// Fita de LEDs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    /// Quantidade de pixels
    pub pixel_count: usize,
    /// Driver: "terminal" ou "log"
    pub driver: String,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            pixel_count: 8,
            driver: "terminal".into(),
        }
    }
}

/// Horário diurno (relógio de 24h). Fora dele os LEDs escurecem mais.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub morning_hour: u32,
    pub evening_hour: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            morning_hour: 6,
            evening_hour: 20,
        }
    }
}

/// Divisores de brilho.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DimmingConfig {
    /// Sempre aplicado (NeoPixels são muito brilhantes)
    pub baseline_divisor: f64,
    /// Aplicado à noite, depois do baseline
    pub night_divisor: f64,
}

impl Default for DimmingConfig {
    fn default() -> Self {
        Self {
            baseline_divisor: 4.0,
            night_divisor: 3.0,
        }
    }
}

/// Encerramento.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Tempo dado aos loops após o sinal antes de encerrar o processo
    pub grace_period_secs: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 5.0,
        }
    }
}

impl LifecycleConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs_f64(self.grace_period_secs)
    }
}

/// Autotestes de startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Loga índice/cor dos pontos de calibração ao iniciar
    pub calibration_report: bool,
    /// Percorre a escala de cores na fita antes do loop principal
    pub startup_sweep: bool,
    /// Tempo por passo da varredura (ms)
    pub sweep_step_ms: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            calibration_report: false,
            startup_sweep: false,
            sweep_step_ms: 500,
        }
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sensor: SensorConfig,
    pub poller: PollerConfig,
    pub render: RenderConfig,
    pub strip: StripConfig,
    pub schedule: ScheduleConfig,
    pub dimming: DimmingConfig,
    pub lifecycle: LifecycleConfig,
    pub debug: DebugConfig,
    /// Tabela de breakpoints (vazia no arquivo = tabela EPA padrão)
    pub breakpoints: Vec<BreakpointRow>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sensor: SensorConfig::default(),
            poller: PollerConfig::default(),
            render: RenderConfig::default(),
            strip: StripConfig::default(),
            schedule: ScheduleConfig::default(),
            dimming: DimmingConfig::default(),
            lifecycle: LifecycleConfig::default(),
            debug: DebugConfig::default(),
            breakpoints: default_rows(),
        }
    }
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    ///
    /// `AQI_ORB_CONFIG` tem prioridade; senão, ao lado do executável.
    pub fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Constrói a tabela de breakpoints configurada.
    pub fn breakpoint_table(&self) -> Result<BreakpointTable, crate::breakpoints::TableError> {
        if self.breakpoints.is_empty() {
            return Ok(BreakpointTable::us_epa_pm25());
        }
        BreakpointTable::new(self.breakpoints.clone())
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.sensor.sensor_id.trim().is_empty() {
            errors.push("sensor.sensor_id não configurado".into());
        }
        if self.sensor.payload.needs_api_key() && self.sensor.api_key.trim().is_empty() {
            errors.push("sensor.api_key é obrigatório para purple_air_v1".into());
        }
        check_secs(&mut errors, "sensor.timeout_secs", self.sensor.timeout_secs, 0.5, 300.0);
        check_secs(&mut errors, "poller.interval_secs", self.poller.interval_secs, 0.1, 3600.0);
        check_secs(&mut errors, "render.interval_secs", self.render.interval_secs, 0.05, 3600.0);
        check_secs(
            &mut errors,
            "lifecycle.grace_period_secs",
            self.lifecycle.grace_period_secs,
            0.0,
            60.0,
        );

        if self.strip.pixel_count == 0 {
            errors.push("strip.pixel_count não pode ser 0".into());
        }
        for (name, hour) in [
            ("schedule.morning_hour", self.schedule.morning_hour),
            ("schedule.evening_hour", self.schedule.evening_hour),
        ] {
            if hour > 23 {
                errors.push(format!("{name} inválido: {hour} (0–23)"));
            }
        }
        for (name, divisor) in [
            ("dimming.baseline_divisor", self.dimming.baseline_divisor),
            ("dimming.night_divisor", self.dimming.night_divisor),
        ] {
            if !(divisor >= 1.0 && divisor.is_finite()) {
                errors.push(format!("{name} inválido: {divisor} (>= 1)"));
            }
        }
        if let Err(e) = self.breakpoint_table() {
            errors.push(format!("breakpoints: {e}"));
        }

        errors
    }
}

fn check_secs(errors: &mut Vec<String>, name: &str, value: f64, min: f64, max: f64) {
    if !(min..=max).contains(&value) {
        errors.push(format!("{name} inválido: {value} ({min}–{max})"));
    }
}
