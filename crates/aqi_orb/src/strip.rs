//! Fitas de LED disponíveis no binário.
//!
//! O driver físico (WS2812 via PWM/SPI) fica fora deste repositório e
//! entra implementando [`Strip`]. Aqui ficam as saídas de bancada.

use aqi_core::color::Rgb8;
use aqi_core::render::Strip;
use std::io::Write;
use tracing::info;

/// Desenha a fita como blocos ANSI true-color numa linha do terminal.
pub struct TerminalStrip<W> {
    out: W,
    len: usize,
}

impl TerminalStrip<std::io::Stdout> {
    pub fn stdout(len: usize) -> Self {
        Self::new(std::io::stdout(), len)
    }
}

impl<W: Write> TerminalStrip<W> {
    pub fn new(out: W, len: usize) -> Self {
        Self { out, len }
    }
}

impl<W: Write> Strip for TerminalStrip<W> {
    fn len(&self) -> usize {
        self.len
    }

    fn show(&mut self, pixels: &[Rgb8]) -> std::io::Result<()> {
        let mut line = String::with_capacity(pixels.len() * 24 + 8);
        line.push('\r');
        for p in pixels {
            line.push_str(&format!("\x1b[38;2;{};{};{}m██", p.r, p.g, p.b));
        }
        line.push_str("\x1b[0m");
        self.out.write_all(line.as_bytes())?;
        self.out.flush()
    }
}

/// Apenas loga a cor; útil em serviços sem terminal.
pub struct LogStrip {
    len: usize,
    last: Option<Rgb8>,
}

impl LogStrip {
    pub fn new(len: usize) -> Self {
        Self { len, last: None }
    }
}

impl Strip for LogStrip {
    fn len(&self) -> usize {
        self.len
    }

    fn show(&mut self, pixels: &[Rgb8]) -> std::io::Result<()> {
        let first = pixels.first().copied();
        if first != self.last {
            if let Some(c) = first {
                info!("Fita ({} px) → RGB ({},{},{})", pixels.len(), c.r, c.g, c.b);
            }
            self.last = first;
        }
        Ok(())
    }
}

/// Escolhe a fita pelo nome configurado em `strip.driver`.
pub fn from_driver(driver: &str, len: usize) -> Result<Box<dyn Strip + Send>, String> {
    match driver.to_lowercase().as_str() {
        "terminal" => Ok(Box::new(TerminalStrip::stdout(len))),
        "log" => Ok(Box::new(LogStrip::new(len))),
        other => Err(format!("Driver de fita desconhecido: {other} (terminal, log)")),
    }
}
