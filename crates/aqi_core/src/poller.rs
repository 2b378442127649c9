//! Poller do sensor – atualiza a concentração compartilhada.
//!
//! Cada ciclo chama a fonte com timeout limitado. Sucesso grava o valor e
//! zera o contador de falhas; qualquer erro (status, timeout, payload)
//! incrementa o contador. Acima da tolerância, o valor compartilhado é
//! forçado para o sentinela offline em todo ciclo até a próxima leitura
//! válida. Erros nunca saem daqui.

use crate::config::PollerConfig;
use crate::fetch::SensorFetch;
use crate::lifecycle::Shutdown;
use crate::shared::SharedConcentration;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Resultado de um ciclo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    /// Leitura válida gravada
    Updated(f64),
    /// Falha dentro da tolerância; o valor anterior continua exposto
    Failed { consecutive: u32 },
    /// Falhas acima da tolerância; valor marcado offline
    Offline { consecutive: u32 },
}

pub struct SensorPoller<F> {
    fetcher: F,
    concentration: Arc<SharedConcentration>,
    fail_count: u32,
    tolerance: u32,
    interval: Duration,
}

impl<F: SensorFetch> SensorPoller<F> {
    pub fn new(
        fetcher: F,
        concentration: Arc<SharedConcentration>,
        tolerance: u32,
        interval: Duration,
    ) -> Self {
        Self {
            fetcher,
            concentration,
            fail_count: 0,
            tolerance,
            interval,
        }
    }

    pub fn from_config(
        fetcher: F,
        concentration: Arc<SharedConcentration>,
        cfg: &PollerConfig,
    ) -> Self {
        Self::new(fetcher, concentration, cfg.fail_count_tolerance, cfg.interval())
    }

    /// Falhas consecutivas até agora.
    pub fn fail_count(&self) -> u32 {
        self.fail_count
    }

    /// Executa um ciclo de busca.
    pub fn poll_once(&mut self) -> PollOutcome {
        match self.fetcher.fetch_concentration() {
            Ok(pm25) => {
                if self.fail_count > self.tolerance {
                    info!("Sensor voltou após {} falhas", self.fail_count);
                }
                self.fail_count = 0;
                self.concentration.store(pm25);
                debug!("--> [sucesso] PM2.5 == {pm25:.1}");
                return PollOutcome::Updated(pm25);
            }
            Err(e) => {
                self.fail_count = self.fail_count.saturating_add(1);
                debug!("--> [erro #{}] {e}", self.fail_count);
            }
        }

        if self.fail_count > self.tolerance {
            if self.fail_count == self.tolerance.saturating_add(1) {
                warn!(
                    "{} falhas consecutivas (tolerância {}), sensor marcado offline",
                    self.fail_count, self.tolerance
                );
            }
            self.concentration.mark_offline();
            PollOutcome::Offline {
                consecutive: self.fail_count,
            }
        } else {
            PollOutcome::Failed {
                consecutive: self.fail_count,
            }
        }
    }

    /// Loop de polling até o encerramento ser pedido.
    pub fn run(&mut self, shutdown: &Shutdown) {
        info!("Poller iniciado (intervalo {:?}, tolerância {})", self.interval, self.tolerance);
        while shutdown.is_running() {
            self.poll_once();
            shutdown.sleep(self.interval);
        }
        info!("Poller encerrado");
    }
}
