pub mod resolve_config;

pub use resolve_config::{resolve_config, validate_timeout, HttpConfig, NormalizedConfig};
