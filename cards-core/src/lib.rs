//! Core library for the weather cards widget.
//!
//! This crate defines:
//! - Configuration (cities, endpoints, refresh interval)
//! - The Open-Meteo weather source and the weather-code table
//! - Card rendering and the display areas cards are mounted into
//! - The periodic refresh cycle tying them together
//!
//! It is used by `cards-cli`, but can also be embedded in other binaries.

pub mod classify;
pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod query;
pub mod refresh;
pub mod render;
pub mod source;

pub use config::{ClockStyle, Config, ErrorDetail};
pub use display::{DisplayArea, Grid, HtmlPage};
pub use error::{DisplayError, FetchError};
pub use model::{City, WeatherSnapshot};
pub use refresh::{CycleReport, RefreshState, Refresher, ScheduleHandle};
pub use render::{CardRenderer, DisplayNode};
pub use source::{OpenMeteoSource, WeatherSource};
