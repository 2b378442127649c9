//! Tipos de cor usados pelo mapper e pela fita de LEDs.

use serde::{Deserialize, Serialize};

/// Cor exibida quando não há leitura válida recente.
pub const OFFLINE_COLOR: Rgb = Rgb::new(0.0, 0.0, 255.0);

/// Cor em ponto flutuante, exatamente como sai da interpolação.
///
/// Canais não são arredondados nem limitados aqui; a conversão para
/// bytes acontece em [`Rgb::to_rgb8`], no momento de enviar para a fita.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Interpola linearmente canal a canal. `f` fora de `[0, 1]` extrapola.
    pub fn lerp(start: Rgb, end: Rgb, f: f64) -> Rgb {
        Rgb {
            r: start.r + f * (end.r - start.r),
            g: start.g + f * (end.g - start.g),
            b: start.b + f * (end.b - start.b),
        }
    }

    /// Aplica `op` em cada canal.
    pub fn map(self, op: impl Fn(f64) -> f64) -> Rgb {
        Rgb {
            r: op(self.r),
            g: op(self.g),
            b: op(self.b),
        }
    }

    /// Trunca em direção a zero e limita cada canal a `[0, 255]`.
    pub fn to_rgb8(self) -> Rgb8 {
        Rgb8 {
            r: channel_to_u8(self.r),
            g: channel_to_u8(self.g),
            b: channel_to_u8(self.b),
        }
    }
}

impl From<Rgb8> for Rgb {
    fn from(c: Rgb8) -> Self {
        Rgb::new(f64::from(c.r), f64::from(c.g), f64::from(c.b))
    }
}

/// Cor de 8 bits por canal, formato aceito pela fita.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel_to_u8(value: f64) -> u8 {
    // `as` satura e mapeia NaN para 0
    value.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Rgb::new(0.0, 128.0, 0.0);
        let b = Rgb::new(64.0, 64.0, 0.0);
        assert_eq!(Rgb::lerp(a, b, 0.0), a);
        assert_eq!(Rgb::lerp(a, b, 1.0), b);
        assert_eq!(Rgb::lerp(a, b, 0.5), Rgb::new(32.0, 96.0, 0.0));
    }

    #[test]
    fn lerp_extrapolates_without_clamping() {
        let c = Rgb::lerp(Rgb::new(0.0, 128.0, 0.0), Rgb::new(64.0, 64.0, 0.0), -1.0);
        assert_eq!(c, Rgb::new(-64.0, 192.0, 0.0));
    }

    #[test]
    fn to_rgb8_truncates_and_clamps() {
        assert_eq!(Rgb::new(10.9, 0.2, 254.99).to_rgb8(), Rgb8::new(10, 0, 254));
        assert_eq!(Rgb::new(-3.0, 300.0, f64::NAN).to_rgb8(), Rgb8::new(0, 255, 0));
    }
}
