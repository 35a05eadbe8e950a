//! Common types and data structures

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Called from background tasks after they deliver a result, so the UI wakes up
pub type Repaint = Arc<dyn Fn() + Send + Sync>;

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest<'a> {
    pub solidity_code: &'a str,
}

/// Missing `clarityCode` is treated as empty output
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertResponse {
    pub clarity_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest<'a> {
    pub clarity_code: &'a str,
    pub contract_name: &'a str,
    pub network: &'a str,
}

/// Result of a mock deploy. Only `contractId` is known; everything else the
/// backend sends is kept as-is.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReceipt {
    #[serde(default)]
    pub contract_id: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainRequest<'a> {
    pub clarity_code: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExplainResponse {
    pub explanation: String,
}

/// Body the backend sends with non-2xx responses
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub error: Option<String>,
}

// ============================================================================
// STATE
// ============================================================================

/// Result of the startup health probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    Checking,
    Connected,
    Error,
}

/// Lifecycle of the convert action
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertPhase {
    Idle,
    Loading,
    Ready,
    Error(String),
}

/// Lifecycle of the mock deploy action
#[derive(Debug, Clone, PartialEq)]
pub enum DeployPhase {
    Idle,
    Deploying,
    Deployed(DeployReceipt),
    Error(String),
}

/// Lifecycle of the tutor's explain action
#[derive(Debug, Clone, PartialEq)]
pub enum ExplainPhase {
    Idle,
    Loading,
    Ready(String),
    Error(String),
}

/// Top-level tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum View {
    #[default]
    Converter,
    Tutor,
}
