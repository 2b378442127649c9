//! # AQI Orb
//!
//! Consulta um sensor PurpleAir em segundo plano e pinta uma fita de LEDs
//! com a cor do índice AQI atual, mais escura à noite e azul quando o
//! sensor fica inacessível.
//!
//! ## Uso
//! ```bash
//! aqi_orb                                    # config.toml ao lado do binário
//! AQI_ORB_CONFIG=/etc/aqi-orb.toml aqi_orb   # caminho explícito
//! RUST_LOG=aqi_core=debug aqi_orb            # logs de cada ciclo
//! ```
//!
//! Encerra com SIGINT/SIGTERM/SIGQUIT após o período de graça.

#[cfg(not(unix))]
compile_error!("aqi_orb depende de sinais POSIX e só roda em sistemas Unix");

mod http;
mod strip;

use aqi_core::config::AppConfig;
use aqi_core::fetch::HttpSensor;
use aqi_core::lifecycle::{self, Shutdown};
use aqi_core::poller::SensorPoller;
use aqi_core::render::{Dimming, Renderer};
use aqi_core::shared::SharedConcentration;
use http::UreqTransport;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Carregar config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("Config inválida: {e}");
        }
        error!("Corrija {} e reinicie", config_path.display());
        return ExitCode::FAILURE;
    }

    // ── Tabela de breakpoints ──
    let table = match config.breakpoint_table() {
        Ok(t) => Arc::new(t),
        Err(e) => {
            error!("Tabela de breakpoints inválida: {e}");
            return ExitCode::FAILURE;
        }
    };

    if config.debug.calibration_report {
        info!("--> Pontos de calibração:");
        for r in table.calibration_report() {
            info!("*** PM2.5 == {:.1} --> AQI == {} ***", r.concentration, r.index);
        }
    }

    // ── Fita ──
    let strip = match strip::from_driver(&config.strip.driver, config.strip.pixel_count) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    let concentration = Arc::new(SharedConcentration::new());
    let mut renderer = Renderer::new(
        strip,
        Arc::clone(&table),
        Arc::clone(&concentration),
        Dimming::from_config(&config.dimming, &config.schedule),
        config.render.interval(),
    );

    // ── Sinais ──
    let grace = config.lifecycle.grace_period();
    if let Err(e) = lifecycle::spawn_signal_watcher(
        shutdown.clone(),
        lifecycle::TERMINATION_SIGNALS,
        grace,
        || std::process::exit(0),
    ) {
        error!("Falha ao registrar handlers de sinal: {e}");
        return ExitCode::FAILURE;
    }

    if config.debug.startup_sweep {
        renderer.sweep(Duration::from_millis(config.debug.sweep_step_ms), &shutdown);
    }

    // ── Poller ──
    let sensor = HttpSensor::from_config(UreqTransport::new(), &config.sensor);
    let sensor_url = sensor.request().url.clone();
    let mut poller = SensorPoller::from_config(sensor, Arc::clone(&concentration), &config.poller);
    let poller_shutdown = shutdown.clone();
    let poller_thread = match std::thread::Builder::new()
        .name("aqi-poller".into())
        .spawn(move || poller.run(&poller_shutdown))
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Falha ao criar thread do poller: {e}");
            return ExitCode::FAILURE;
        }
    };

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   🌫  AQI ORB – ATIVO");
    println!("══════════════════════════════════════════════");
    println!("  Sensor:    {sensor_url}");
    println!(
        "  Polling:   {:.0}s (tolerância {} falhas)",
        config.poller.interval_secs, config.poller.fail_count_tolerance
    );
    println!("  Fita:      {} px ({})", config.strip.pixel_count, config.strip.driver);
    println!(
        "  Noite:     antes das {}h / depois das {}h",
        config.schedule.morning_hour, config.schedule.evening_hour
    );
    println!("══════════════════════════════════════════════");
    println!();

    // ── Loop principal ──
    renderer.run(&shutdown);

    if poller_thread.join().is_err() {
        error!("Thread do poller terminou com panic");
        return ExitCode::FAILURE;
    }
    info!("Encerrado.");
    ExitCode::SUCCESS
}
