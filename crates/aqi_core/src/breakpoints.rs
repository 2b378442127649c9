//! Tabela de breakpoints PM2.5 → AQI → cor.
//!
//! Cada linha mapeia uma faixa de concentração (µg/m³) para uma faixa de
//! índice e carrega a cor âncora da sua extremidade. A primeira e a última
//! linha são sentinelas: o mapper nunca as escolhe como linha ativa, mas
//! usa suas cores como âncora de interpolação.
//!
//! ```text
//!   #   conc_low   conc_high   idx_low idx_high     cor
//!   0      0.0        0.0         0      0      (  0,128, 0)  ← sentinela
//!   1      0.0       12.1         0     50      (  0,128, 0)
//!   2     12.1       35.5        51    100      ( 64, 64, 0)
//!  ...
//!   9  99999.9   100000.0       999   1000      ( 24,  0, 4)  ← sentinela
//! ```

use crate::color::Rgb8;
use serde::{Deserialize, Serialize};

/// Uma linha de calibração.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakpointRow {
    /// Início da faixa de concentração
    pub conc_low: f64,
    /// Fim da faixa de concentração (inclusivo)
    pub conc_high: f64,
    /// Índice no início da faixa
    pub index_low: i32,
    /// Índice no fim da faixa
    pub index_high: i32,
    /// Cor âncora da linha
    pub color: Rgb8,
}

impl BreakpointRow {
    pub const fn new(
        conc_low: f64,
        conc_high: f64,
        index_low: i32,
        index_high: i32,
        color: Rgb8,
    ) -> Self {
        Self {
            conc_low,
            conc_high,
            index_low,
            index_high,
            color,
        }
    }
}

/// Erros de construção da tabela.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("Tabela precisa de pelo menos {MIN_ROWS} linhas (tem {0})")]
    TooFewRows(usize),

    #[error("Linha {row}: conc_low {low} ≠ conc_high da linha anterior ({prev_high})")]
    Gap { row: usize, low: f64, prev_high: f64 },

    #[error("Linha {row}: conc_high {high} menor que o da linha anterior ({prev_high})")]
    Unordered { row: usize, high: f64, prev_high: f64 },

    #[error("Linha {row}: faixa de concentração vazia ({low}..{high})")]
    EmptyRange { row: usize, low: f64, high: f64 },
}

/// Duas sentinelas + ao menos uma linha ativa.
const MIN_ROWS: usize = 3;

/// Tabela imutável de breakpoints, validada na construção.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointTable {
    rows: Vec<BreakpointRow>,
}

impl BreakpointTable {
    /// Valida e constrói a tabela.
    ///
    /// Exige linhas contíguas, `conc_high` não decrescente e largura não
    /// nula em toda linha ativa (`1..=N-2`). A linha 0 pode ser degenerada
    /// (`[0.0, 0.0]`) porque nunca é usada como divisor.
    pub fn new(rows: Vec<BreakpointRow>) -> Result<Self, TableError> {
        if rows.len() < MIN_ROWS {
            return Err(TableError::TooFewRows(rows.len()));
        }

        for (i, pair) in rows.windows(2).enumerate() {
            let (prev, row) = (&pair[0], &pair[1]);
            let row_num = i + 1;
            if row.conc_low != prev.conc_high {
                return Err(TableError::Gap {
                    row: row_num,
                    low: row.conc_low,
                    prev_high: prev.conc_high,
                });
            }
            if row.conc_high < prev.conc_high {
                return Err(TableError::Unordered {
                    row: row_num,
                    high: row.conc_high,
                    prev_high: prev.conc_high,
                });
            }
        }

        let last_active = rows.len() - 2;
        for (i, row) in rows.iter().enumerate().take(last_active + 1).skip(1) {
            if row.conc_high <= row.conc_low {
                return Err(TableError::EmptyRange {
                    row: i,
                    low: row.conc_low,
                    high: row.conc_high,
                });
            }
        }

        Ok(Self { rows })
    }

    /// Tabela US EPA para PM2.5 com cores ajustadas para NeoPixel.
    ///
    /// As cores oficiais (104,223,67), (255,254,84)… saturam mal em LEDs
    /// WS2812, por isso os valores abaixo são mais escuros.
    pub fn us_epa_pm25() -> Self {
        Self {
            rows: default_rows(),
        }
    }

    pub fn rows(&self) -> &[BreakpointRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for BreakpointTable {
    fn default() -> Self {
        Self::us_epa_pm25()
    }
}

/// Linhas da tabela padrão (também usadas como default do `config.toml`).
pub fn default_rows() -> Vec<BreakpointRow> {
    vec![
        BreakpointRow::new(0.0, 0.0, 0, 0, Rgb8::new(0, 128, 0)),
        BreakpointRow::new(0.0, 12.1, 0, 50, Rgb8::new(0, 128, 0)),
        BreakpointRow::new(12.1, 35.5, 51, 100, Rgb8::new(64, 64, 0)),
        BreakpointRow::new(35.5, 55.5, 101, 150, Rgb8::new(192, 64, 0)),
        BreakpointRow::new(55.5, 150.5, 151, 200, Rgb8::new(192, 0, 0)),
        BreakpointRow::new(150.5, 250.5, 201, 300, Rgb8::new(192, 0, 16)),
        BreakpointRow::new(250.5, 350.5, 301, 400, Rgb8::new(24, 0, 4)),
        BreakpointRow::new(350.5, 500.5, 401, 500, Rgb8::new(24, 0, 4)),
        BreakpointRow::new(500.5, 99_999.9, 501, 999, Rgb8::new(24, 0, 4)),
        BreakpointRow::new(99_999.9, 100_000.0, 999, 1000, Rgb8::new(24, 0, 4)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(low: f64, high: f64) -> BreakpointRow {
        BreakpointRow::new(low, high, 0, 0, Rgb8::default())
    }

    #[test]
    fn default_table_is_valid() {
        let table = BreakpointTable::new(default_rows()).unwrap();
        assert_eq!(table, BreakpointTable::us_epa_pm25());
        assert_eq!(table.len(), 10);
    }

    #[test]
    fn degenerate_first_row_is_allowed() {
        let rows = vec![row(0.0, 0.0), row(0.0, 10.0), row(10.0, 20.0)];
        assert!(BreakpointTable::new(rows).is_ok());
    }

    #[test]
    fn rejects_too_few_rows() {
        let rows = vec![row(0.0, 0.0), row(0.0, 10.0)];
        assert_eq!(BreakpointTable::new(rows), Err(TableError::TooFewRows(2)));
    }

    #[test]
    fn rejects_gap_between_rows() {
        let rows = vec![row(0.0, 0.0), row(0.0, 10.0), row(11.0, 20.0)];
        assert!(matches!(
            BreakpointTable::new(rows),
            Err(TableError::Gap { row: 2, .. })
        ));
    }

    #[test]
    fn rejects_empty_active_row() {
        let rows = vec![row(0.0, 0.0), row(0.0, 0.0), row(0.0, 20.0)];
        assert!(matches!(
            BreakpointTable::new(rows),
            Err(TableError::EmptyRange { row: 1, .. })
        ));
    }

    #[test]
    fn rejects_descending_rows() {
        let rows = vec![row(0.0, 5.0), row(5.0, 3.0), row(3.0, 20.0)];
        assert!(matches!(
            BreakpointTable::new(rows),
            Err(TableError::Unordered { row: 1, .. })
        ));
    }
}
