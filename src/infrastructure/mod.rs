//! Infrastructure layer
//!
//! Process-level concerns: configuration and logging.

mod config;
mod logging;

pub use config::{
    Config, ConfigError, ENV_API_SESSION, ENV_CLIENT_CERT, ENV_CLIENT_KEY, ENV_CLIENT_TIMEOUT,
    ENV_ENDPOINT, ENV_IAP_TOKEN, ENV_LOG, ENV_TASK_TIMEOUT,
};
pub use logging::{init_logging, log_level};
