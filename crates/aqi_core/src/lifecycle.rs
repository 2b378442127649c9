//! Encerramento cooperativo.
//!
//! Um sinal de término limpa a flag "keep running", espera o período de
//! graça para os loops notarem e então chama `on_expire` (no binário,
//! `process::exit`). Buscas HTTP em andamento não são canceladas: um loop
//! preso no fetch além do período de graça morre junto com o processo.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Granularidade da espera interrompível.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Sinais que pedem o encerramento.
#[cfg(unix)]
pub const TERMINATION_SIGNALS: &[std::ffi::c_int] = &[
    signal_hook::consts::SIGINT,
    signal_hook::consts::SIGTERM,
    signal_hook::consts::SIGQUIT,
];

/// Flag "keep running" compartilhada pelos loops.
///
/// Só o controlador de ciclo de vida escreve; poller e render loop leem
/// uma vez por iteração.
#[derive(Debug, Clone)]
pub struct Shutdown {
    running: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn request(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Dorme até `duration`, acordando antes se o encerramento for pedido.
    ///
    /// Retorna `true` se ainda deve continuar rodando.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        while self.is_running() {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
        false
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Registra `signals` e inicia a thread que aguarda o primeiro deles.
///
/// O registro acontece antes do retorno, então um sinal entregue logo em
/// seguida já é capturado.
#[cfg(unix)]
pub fn spawn_signal_watcher<F>(
    shutdown: Shutdown,
    signals: &[std::ffi::c_int],
    grace: Duration,
    on_expire: F,
) -> std::io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    let mut signals = signal_hook::iterator::Signals::new(signals)?;

    std::thread::Builder::new()
        .name("signal-watch".into())
        .spawn(move || {
            if let Some(signum) = signals.forever().next() {
                info!("Sinal {signum} recebido, encerrando...");
                shutdown.request();
                std::thread::sleep(grace);
                debug!("Período de graça ({grace:?}) esgotado");
                on_expire();
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_runs_full_duration_when_running() {
        let s = Shutdown::new();
        let start = Instant::now();
        assert!(s.sleep(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn sleep_returns_early_after_request() {
        let s = Shutdown::new();
        let remote = s.clone();
        let t = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            remote.request();
        });
        let start = Instant::now();
        assert!(!s.sleep(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(5));
        t.join().unwrap();
    }

    #[test]
    fn clones_share_the_flag() {
        let a = Shutdown::new();
        let b = a.clone();
        assert!(b.is_running());
        a.request();
        assert!(!b.is_running());
    }

    #[test]
    fn both_loops_stop_within_one_interval() {
        use crate::breakpoints::BreakpointTable;
        use crate::color::Rgb8;
        use crate::fetch::{FetchError, SensorFetch};
        use crate::poller::SensorPoller;
        use crate::render::{Dimming, Renderer, Strip};
        use crate::shared::SharedConcentration;

        struct Constant(f64);
        impl SensorFetch for Constant {
            fn fetch_concentration(&mut self) -> Result<f64, FetchError> {
                Ok(self.0)
            }
        }

        struct Dark;
        impl Strip for Dark {
            fn len(&self) -> usize {
                8
            }
            fn show(&mut self, _: &[Rgb8]) -> std::io::Result<()> {
                Ok(())
            }
        }

        let interval = Duration::from_millis(300);
        let shutdown = Shutdown::new();
        let shared = Arc::new(SharedConcentration::new());

        let mut poller = SensorPoller::new(Constant(18.0), Arc::clone(&shared), 8, interval);
        let poller_shutdown = shutdown.clone();
        let poller_thread = std::thread::spawn(move || poller.run(&poller_shutdown));

        let mut renderer = Renderer::new(
            Dark,
            Arc::new(BreakpointTable::us_epa_pm25()),
            Arc::clone(&shared),
            Dimming::default(),
            interval,
        );
        let render_shutdown = shutdown.clone();
        let render_thread = std::thread::spawn(move || renderer.run(&render_shutdown));

        std::thread::sleep(Duration::from_millis(100));
        let requested = Instant::now();
        shutdown.request();
        poller_thread.join().unwrap();
        render_thread.join().unwrap();

        assert!(requested.elapsed() < interval + Duration::from_millis(200));
        assert_eq!(shared.load(), 18.0);
    }

    #[cfg(unix)]
    #[test]
    fn signal_clears_flag_then_expires_after_grace() {
        use signal_hook::consts::SIGUSR2;
        use std::sync::mpsc;

        let shutdown = Shutdown::new();
        let (tx, rx) = mpsc::channel();
        let grace = Duration::from_millis(100);
        let started = Instant::now();
        let _watcher = spawn_signal_watcher(shutdown.clone(), &[SIGUSR2], grace, move || {
            let _ = tx.send(Instant::now());
        })
        .unwrap();

        signal_hook::low_level::raise(SIGUSR2).unwrap();

        let expired_at = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(!shutdown.is_running());
        assert!(expired_at.duration_since(started) >= grace);
    }
}
