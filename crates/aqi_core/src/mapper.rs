//! Conversão concentração → índice AQI → cor.
//!
//! Interpolação linear por partes sobre a [`BreakpointTable`]. Nada aqui
//! é limitado (clamp): concentrações fora da faixa nominal da linha ativa
//! extrapolam, e quem envia a cor para o hardware decide como truncar.

use crate::breakpoints::BreakpointTable;
use crate::color::{OFFLINE_COLOR, Rgb};

/// Pontos avaliados no relatório de calibração de startup.
pub const CALIBRATION_POINTS: [f64; 17] = [
    0.0, 12.0, 12.1, 34.4, 35.5, 55.4, 55.5, 150.4, 150.5, 250.4, 250.5, 350.4, 350.5, 500.4,
    500.5, 99_999.9, 1_000_000.0,
];

/// Resultado completo de um mapeamento.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub concentration: f64,
    pub index: i32,
    pub color: Rgb,
    pub offline: bool,
}

/// `true` para o sentinela offline (qualquer concentração negativa).
pub fn is_offline(concentration: f64) -> bool {
    concentration < 0.0
}

impl BreakpointTable {
    /// Menor linha `i` em `[1, N-2]` com `x <= conc_high`; senão `N-2`.
    ///
    /// Nunca retorna a primeira nem a última linha, então `i + 1` é sempre
    /// um índice válido para a cor final da interpolação.
    pub fn row_index(&self, x: f64) -> usize {
        let rows = self.rows();
        let last_active = rows.len() - 2;
        (1..=last_active)
            .find(|&i| x <= rows[i].conc_high)
            .unwrap_or(last_active)
    }

    /// Fração linear de `x` dentro da linha `i` (sem clamp).
    fn fraction(&self, i: usize, x: f64) -> f64 {
        let row = &self.rows()[i];
        (x - row.conc_low) / (row.conc_high - row.conc_low)
    }

    /// Índice AQI de `x`, arredondado para baixo.
    #[allow(clippy::cast_possible_truncation)]
    pub fn index_value(&self, x: f64) -> i32 {
        let i = self.row_index(x);
        let row = &self.rows()[i];
        let f = self.fraction(i, x);
        let low = f64::from(row.index_low);
        let high = f64::from(row.index_high);
        (low + f * (high - low)).floor() as i32
    }

    /// Cor de `x`, interpolada entre a âncora da linha ativa e a da seguinte.
    ///
    /// O sentinela offline retorna [`OFFLINE_COLOR`] sem consultar a tabela.
    pub fn color_value(&self, x: f64) -> Rgb {
        if is_offline(x) {
            return OFFLINE_COLOR;
        }
        let i = self.row_index(x);
        let f = self.fraction(i, x);
        let start = Rgb::from(self.rows()[i].color);
        let end = Rgb::from(self.rows()[i + 1].color);
        Rgb::lerp(start, end, f)
    }

    /// Índice e cor de uma vez.
    pub fn map(&self, x: f64) -> Reading {
        Reading {
            concentration: x,
            index: self.index_value(x),
            color: self.color_value(x),
            offline: is_offline(x),
        }
    }

    /// Avalia os [`CALIBRATION_POINTS`] para log de depuração.
    pub fn calibration_report(&self) -> Vec<Reading> {
        CALIBRATION_POINTS.iter().map(|&x| self.map(x)).collect()
    }
}
