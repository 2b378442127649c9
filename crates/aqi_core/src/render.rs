//! Render loop – concentração compartilhada → cor → fita de LEDs.

use crate::breakpoints::BreakpointTable;
use crate::color::{OFFLINE_COLOR, Rgb, Rgb8};
use crate::config::{DimmingConfig, ScheduleConfig};
use crate::lifecycle::Shutdown;
use crate::mapper::Reading;
use crate::shared::SharedConcentration;
use chrono::Timelike;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fita de LEDs endereçável.
///
/// `show` aplica a sequência a todos os pixels físicos imediatamente.
/// Não há confirmação; o render loop apenas loga e descarta erros.
pub trait Strip {
    /// Número de pixels
    fn len(&self) -> usize;

    fn show(&mut self, pixels: &[Rgb8]) -> std::io::Result<()>;

    /// Pinta todos os pixels com a mesma cor.
    fn fill(&mut self, color: Rgb8) -> std::io::Result<()> {
        let pixels = vec![color; self.len()];
        self.show(&pixels)
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: Strip + ?Sized> Strip for Box<S> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn show(&mut self, pixels: &[Rgb8]) -> std::io::Result<()> {
        (**self).show(pixels)
    }
}

/// Redução de brilho: baseline sempre, e mais um divisor à noite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimming {
    pub baseline_divisor: f64,
    pub night_divisor: f64,
    pub morning_hour: u32,
    pub evening_hour: u32,
}

impl Default for Dimming {
    fn default() -> Self {
        Self::from_config(&DimmingConfig::default(), &ScheduleConfig::default())
    }
}

impl Dimming {
    pub fn from_config(dimming: &DimmingConfig, schedule: &ScheduleConfig) -> Self {
        Self {
            baseline_divisor: dimming.baseline_divisor,
            night_divisor: dimming.night_divisor,
            morning_hour: schedule.morning_hour,
            evening_hour: schedule.evening_hour,
        }
    }

    /// Antes de `morning_hour` ou depois de `evening_hour`.
    pub fn is_night(&self, hour: u32) -> bool {
        hour < self.morning_hour || hour > self.evening_hour
    }

    /// Cor final para a fita na hora `hour`.
    ///
    /// A cor offline passa intacta para continuar reconhecível.
    pub fn apply(&self, color: Rgb, hour: u32) -> Rgb8 {
        if color == OFFLINE_COLOR {
            return color.to_rgb8();
        }
        let mut dimmed = color.map(|c| c / self.baseline_divisor);
        if self.is_night(hour) {
            dimmed = dimmed.map(|c| (c / self.night_divisor).trunc());
        }
        dimmed.to_rgb8()
    }
}

/// Um quadro renderizado.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub reading: Reading,
    pub hour: u32,
    pub color: Rgb8,
}

/// Lê o valor compartilhado, mapeia e pinta a fita.
pub struct Renderer<S> {
    strip: S,
    table: Arc<BreakpointTable>,
    concentration: Arc<SharedConcentration>,
    dimming: Dimming,
    interval: Duration,
}

impl<S: Strip> Renderer<S> {
    pub fn new(
        strip: S,
        table: Arc<BreakpointTable>,
        concentration: Arc<SharedConcentration>,
        dimming: Dimming,
        interval: Duration,
    ) -> Self {
        Self {
            strip,
            table,
            concentration,
            dimming,
            interval,
        }
    }

    /// Um ciclo de renderização para a hora local `hour`.
    pub fn render_once(&mut self, hour: u32) -> Frame {
        let reading = self.table.map(self.concentration.load());
        let color = self.dimming.apply(reading.color, hour);

        if let Err(e) = self.strip.fill(color) {
            warn!("Falha ao atualizar fita: {e}");
        }

        let frame = Frame {
            reading,
            hour,
            color,
        };
        if reading.offline {
            debug!("→ OFFLINE → RGB ({},{},{})", color.r, color.g, color.b);
        } else {
            debug!(
                "→ PM2.5 {:.1} → AQI {} → RGB ({},{},{}){}",
                reading.concentration,
                reading.index,
                color.r,
                color.g,
                color.b,
                if self.dimming.is_night(hour) { " [noite]" } else { "" }
            );
        }
        frame
    }

    /// Loop principal: renderiza e dorme até o encerramento ser pedido.
    pub fn run(&mut self, shutdown: &Shutdown) {
        info!("Render loop iniciado (intervalo {:?})", self.interval);
        while shutdown.is_running() {
            let hour = chrono::Local::now().hour();
            self.render_once(hour);
            shutdown.sleep(self.interval);
        }
        info!("Render loop encerrado");
    }

    /// Varre a escala de cores (sem dimming) para conferir a fita.
    pub fn sweep(&mut self, step: Duration, shutdown: &Shutdown) {
        info!("Varredura de cores na fita...");
        for x in (-15..350).step_by(5) {
            if !shutdown.is_running() {
                break;
            }
            let reading = self.table.map(f64::from(x));
            let color = reading.color.to_rgb8();
            debug!(
                "PM2.5 {x} → AQI {} → RGB ({},{},{})",
                reading.index, color.r, color.g, color.b
            );
            if let Err(e) = self.strip.fill(color) {
                warn!("Falha ao atualizar fita: {e}");
            }
            shutdown.sleep(step);
        }
    }

    pub fn strip(&self) -> &S {
        &self.strip
    }
}
