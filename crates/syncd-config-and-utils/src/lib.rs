//! Core configuration and utilities for the tallysync daemon.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{api_token_from_env, Config, API_TOKEN_ENV, DEFAULT_API_BASE_URL};
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use paths::Paths;
