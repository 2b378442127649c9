//! # AQI Core
//!
//! Núcleo do orbe de qualidade do ar: converte a concentração de PM2.5
//! em índice AQI e cor, e coordena as duas threads que mantêm a fita de
//! LEDs atualizada.
//!
//! ```text
//!  sensor ──► SensorPoller ──► SharedConcentration ──► Renderer ──► Strip
//!                                                        │
//!                            BreakpointTable (mapper) ◄──┘
//! ```
//!
//! ## Módulos
//! - [`breakpoints`] – Tabela de calibração PM2.5 → AQI → cor
//! - [`mapper`] – Interpolação linear por partes (índice e cor)
//! - [`color`] – Tipos `Rgb` / `Rgb8` e a cor offline
//! - [`shared`] – Valor de concentração compartilhado entre threads
//! - [`payload`] – Extração do PM2.5 dos formatos PurpleAir
//! - [`fetch`] – Interfaces de busca (transporte HTTP e sensor)
//! - [`poller`] – Thread de polling com tolerância a falhas
//! - [`render`] – Render loop, dimming e interface da fita
//! - [`lifecycle`] – Flag de execução e sinais de término
//! - [`config`] – Configuração unificada via TOML

pub mod breakpoints;
pub mod color;
pub mod config;
pub mod fetch;
pub mod lifecycle;
pub mod mapper;
pub mod payload;
pub mod poller;
pub mod render;
pub mod shared;

// Re-exports convenientes
pub use breakpoints::{BreakpointRow, BreakpointTable};
pub use color::{OFFLINE_COLOR, Rgb, Rgb8};
pub use config::AppConfig;
pub use fetch::{FetchError, HttpSensor, HttpTransport, SensorFetch};
pub use lifecycle::Shutdown;
pub use poller::SensorPoller;
pub use render::{Dimming, Renderer, Strip};
pub use shared::{OFFLINE_CONCENTRATION, SharedConcentration};
