//! Valor compartilhado de concentração entre poller e render loop.
//!
//! Canal de uma posição com sobrescrita: o poller é o único escritor, o
//! render loop o único leitor, e leituras intermediárias se perdem. Não há
//! lock; a célula é um `AtomicU64` com os bits do `f64` e ordem `Relaxed`,
//! já que o leitor tolera estar uma iteração atrasado.

use std::sync::atomic::{AtomicU64, Ordering};

/// Concentração reservada para "sem leitura válida recente".
pub const OFFLINE_CONCENTRATION: f64 = -1.0;

/// Última concentração conhecida (µg/m³).
#[derive(Debug)]
pub struct SharedConcentration {
    bits: AtomicU64,
}

impl SharedConcentration {
    /// Começa no sentinela offline.
    pub fn new() -> Self {
        Self {
            bits: AtomicU64::new(OFFLINE_CONCENTRATION.to_bits()),
        }
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn store(&self, concentration: f64) {
        self.bits.store(concentration.to_bits(), Ordering::Relaxed);
    }

    pub fn mark_offline(&self) {
        self.store(OFFLINE_CONCENTRATION);
    }

    pub fn is_offline(&self) -> bool {
        crate::mapper::is_offline(self.load())
    }
}

impl Default for SharedConcentration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn starts_offline() {
        let c = SharedConcentration::new();
        assert_eq!(c.load(), OFFLINE_CONCENTRATION);
        assert!(c.is_offline());
    }

    #[test]
    fn store_then_mark_offline() {
        let c = SharedConcentration::new();
        c.store(17.25);
        assert_eq!(c.load(), 17.25);
        assert!(!c.is_offline());
        c.mark_offline();
        assert!(c.is_offline());
    }

    #[test]
    fn latest_write_wins_across_threads() {
        let c = Arc::new(SharedConcentration::new());
        let writer = {
            let c = Arc::clone(&c);
            std::thread::spawn(move || {
                for v in 0..1000 {
                    c.store(f64::from(v));
                }
            })
        };
        writer.join().unwrap();
        assert_eq!(c.load(), 999.0);
    }
}
