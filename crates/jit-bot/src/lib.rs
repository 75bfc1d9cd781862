//! JIT maker bot application: configuration, logging, and the
//! paper-trading harness around the fill engine.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod sim;

pub use app::Application;
pub use config::{AppConfig, ClientConfig, MarketQuoteConfig, SimConfig};
pub use error::{AppError, AppResult};
pub use logging::init_logging;
pub use sim::SimExchange;
