//! Application constants and configuration

use std::time::Duration;

pub const APP_NAME: &str = "Clarity Converter";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend used when neither the environment nor settings provide one
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
/// Environment override for the backend base URL
pub const API_URL_ENV: &str = "CLARITY_CONVERTER_API_URL";

pub const HEALTH_PATH: &str = "/api/health";
pub const CONVERT_PATH: &str = "/api/convert";
pub const DEPLOY_PATH: &str = "/api/deploy";
pub const EXPLAIN_PATH: &str = "/api/explain";

/// Fixed parameters sent with every mock deploy
pub const DEPLOY_CONTRACT_NAME: &str = "converted-contract";
pub const DEPLOY_NETWORK: &str = "testnet";

/// Maximum number of conversions kept in the version strip
pub const HISTORY_LIMIT: usize = 10;

/// How long the "Copied!" label stays up after the last copy click
pub const COPY_FEEDBACK: Duration = Duration::from_millis(2000);
