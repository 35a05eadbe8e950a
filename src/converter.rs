//! Converter session: input, output, version history and the async driver
//! that talks to the backend.
//!
//! [`SessionState`] holds every transition as a plain method so it can be
//! exercised without a runtime. [`Converter`] wraps it, spawns one task per
//! request and feeds the results back through a channel drained by
//! [`Converter::poll`] on the UI thread.

use crate::api::{ApiClient, ApiError};
use crate::constants::COPY_FEEDBACK;
use crate::history::{ConversionRecord, VersionHistory};
use crate::types::*;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter Solidity code to convert";
const DEPLOY_FALLBACK_MESSAGE: &str = "Deploy failed";

// ============================================================================
// COPY FEEDBACK
// ============================================================================

/// Transient "Copied!" indicator. Each mark restarts the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyFeedback {
    copied_at: Option<Instant>,
}

impl CopyFeedback {
    pub fn mark(&mut self, now: Instant) {
        self.copied_at = Some(now);
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.remaining(now).is_some()
    }

    /// Time left before the indicator reverts, `None` once it has.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.copied_at?);
        COPY_FEEDBACK.checked_sub(elapsed).filter(|d| !d.is_zero())
    }
}

// ============================================================================
// SESSION STATE
// ============================================================================

#[derive(Debug, Clone)]
pub struct SessionState {
    pub input: String,
    output: String,
    history: VersionHistory,
    convert: ConvertPhase,
    deploy: DeployPhase,
    backend: BackendStatus,
    copy: CopyFeedback,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            input: String::new(),
            output: String::new(),
            history: VersionHistory::default(),
            convert: ConvertPhase::Idle,
            deploy: DeployPhase::Idle,
            backend: BackendStatus::Checking,
            copy: CopyFeedback::default(),
        }
    }
}

impl SessionState {
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn history(&self) -> &VersionHistory {
        &self.history
    }

    pub fn convert_phase(&self) -> &ConvertPhase {
        &self.convert
    }

    #[cfg(test)]
    pub fn deploy_phase(&self) -> &DeployPhase {
        &self.deploy
    }

    pub fn backend(&self) -> BackendStatus {
        self.backend
    }

    pub fn is_loading(&self) -> bool {
        self.convert == ConvertPhase::Loading
    }

    pub fn is_deploying(&self) -> bool {
        self.deploy == DeployPhase::Deploying
    }

    pub fn can_convert(&self) -> bool {
        !self.is_loading() && !self.input.trim().is_empty()
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.copy.is_active(now)
    }

    pub fn copy_remaining(&self, now: Instant) -> Option<Duration> {
        self.copy.remaining(now)
    }

    /// The inline error, convert failures first.
    pub fn error_message(&self) -> Option<&str> {
        match (&self.convert, &self.deploy) {
            (ConvertPhase::Error(msg), _) | (_, DeployPhase::Error(msg)) => Some(msg.as_str()),
            _ => None,
        }
    }

    pub fn receipt(&self) -> Option<&DeployReceipt> {
        match &self.deploy {
            DeployPhase::Deployed(receipt) => Some(receipt),
            _ => None,
        }
    }

    pub fn set_backend(&mut self, result: Result<(), ApiError>) {
        self.backend = match result {
            Ok(()) => BackendStatus::Connected,
            Err(_) => BackendStatus::Error,
        };
    }

    /// Validates the input and enters `Loading`. Returns the source to send,
    /// or `None` when nothing should go out.
    pub fn begin_convert(&mut self) -> Option<String> {
        if self.is_loading() {
            return None;
        }
        if self.input.trim().is_empty() {
            self.convert = ConvertPhase::Error(EMPTY_INPUT_MESSAGE.to_string());
            return None;
        }
        self.output.clear();
        self.deploy = DeployPhase::Idle;
        self.convert = ConvertPhase::Loading;
        Some(self.input.clone())
    }

    pub fn finish_convert(&mut self, result: Result<String, ApiError>) {
        match result {
            Ok(output) => {
                if !output.is_empty() {
                    self.history.push(ConversionRecord::new(output.clone()));
                }
                self.output = output;
                self.convert = ConvertPhase::Ready;
            }
            Err(e) => {
                self.convert = ConvertPhase::Error(e.convert_message());
            }
        }
    }

    /// Shows a stored version. Out-of-range indices change nothing.
    pub fn restore(&mut self, index: usize) -> bool {
        match self.history.select(index) {
            Some(record) => {
                self.output = record.output.clone();
                true
            }
            None => false,
        }
    }

    /// Enters `Deploying` and returns the code to deploy. Blank output is a no-op.
    /// A stale convert error is dropped so the deploy outcome is what shows.
    pub fn begin_deploy(&mut self) -> Option<String> {
        if self.is_deploying() || self.output.trim().is_empty() {
            return None;
        }
        if matches!(self.convert, ConvertPhase::Error(_)) {
            self.convert = ConvertPhase::Ready;
        }
        self.deploy = DeployPhase::Deploying;
        Some(self.output.clone())
    }

    pub fn finish_deploy(&mut self, result: Result<DeployReceipt, ApiError>) {
        self.deploy = match result {
            Ok(receipt) => DeployPhase::Deployed(receipt),
            Err(e) => {
                let detail = e.detail();
                DeployPhase::Error(if detail.is_empty() {
                    DEPLOY_FALLBACK_MESSAGE.to_string()
                } else {
                    detail
                })
            }
        };
    }

    /// Marks the copy indicator and returns the text for the clipboard.
    pub fn copy_output(&mut self, now: Instant) -> Option<String> {
        if self.output.is_empty() {
            return None;
        }
        self.copy.mark(now);
        Some(self.output.clone())
    }
}

// ============================================================================
// ASYNC DRIVER
// ============================================================================

#[derive(Debug)]
enum ConverterEvent {
    Health(Result<(), ApiError>),
    Converted(Result<String, ApiError>),
    Deployed(Result<DeployReceipt, ApiError>),
}

/// Owns the session and runs its requests on the app's runtime.
/// Dropping it abandons any request still in flight.
pub struct Converter {
    pub state: SessionState,
    client: ApiClient,
    runtime: tokio::runtime::Handle,
    tx: mpsc::UnboundedSender<ConverterEvent>,
    rx: mpsc::UnboundedReceiver<ConverterEvent>,
    cancel: CancellationToken,
    repaint: Repaint,
}

impl Converter {
    pub fn new(client: ApiClient, runtime: tokio::runtime::Handle, repaint: Repaint) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::default(),
            client,
            runtime,
            tx,
            rx,
            cancel: CancellationToken::new(),
            repaint,
        }
    }

    fn spawn<F, T>(&self, request: F, wrap: fn(T) -> ConverterEvent)
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let tx = self.tx.clone();
        let token = self.cancel.clone();
        let repaint = self.repaint.clone();
        self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => debug!("Converter gone, request abandoned"),
                result = request => {
                    if tx.send(wrap(result)).is_ok() {
                        repaint();
                    }
                }
            }
        });
    }

    /// Probes the backend once; no retries.
    pub fn check_backend_status(&mut self) {
        self.state.backend = BackendStatus::Checking;
        let client = self.client.clone();
        debug!(url = client.base_url(), "Checking backend status");
        self.spawn(async move { client.health().await }, ConverterEvent::Health);
    }

    pub fn convert(&mut self) {
        let Some(source) = self.state.begin_convert() else {
            debug!("Conversion not started");
            return;
        };
        info!(chars = source.len(), "Starting conversion");
        let client = self.client.clone();
        self.spawn(
            async move { client.convert(&source).await },
            ConverterEvent::Converted,
        );
    }

    pub fn restore_version(&mut self, index: usize) {
        if self.state.restore(index) {
            debug!(index, "Restored version");
        }
    }

    pub fn deploy(&mut self) {
        let Some(code) = self.state.begin_deploy() else {
            return;
        };
        info!(chars = code.len(), "Starting mock deploy");
        let client = self.client.clone();
        self.spawn(async move { client.deploy(&code).await }, ConverterEvent::Deployed);
    }

    /// Returns the text to put on the clipboard, if there is any output.
    pub fn copy_to_clipboard(&mut self, now: Instant) -> Option<String> {
        self.state.copy_output(now)
    }

    /// Applies every finished request. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            applied += 1;
            match event {
                ConverterEvent::Health(result) => {
                    match &result {
                        Ok(()) => info!("Backend connected"),
                        Err(e) => warn!(error = %e, kind = e.kind(), "Backend health check failed"),
                    }
                    self.state.set_backend(result);
                }
                ConverterEvent::Converted(result) => {
                    match &result {
                        Ok(code) => info!(chars = code.len(), "Conversion complete"),
                        Err(e) => warn!(error = %e, kind = e.kind(), "Conversion failed"),
                    }
                    self.state.finish_convert(result);
                }
                ConverterEvent::Deployed(result) => {
                    match &result {
                        Ok(receipt) => info!(contract_id = %receipt.contract_id, "Mock deploy complete"),
                        Err(e) => warn!(error = %e, kind = e.kind(), "Mock deploy failed"),
                    }
                    self.state.finish_deploy(result);
                }
            }
        }
        applied
    }
}

impl Drop for Converter {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{settle, spawn_backend, unreachable_url};
    use axum::routing::{get, post};
    use axum::{http::StatusCode, Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn no_repaint() -> Repaint {
        Arc::new(|| {})
    }

    fn converter_for(base_url: String) -> Converter {
        Converter::new(ApiClient::new(base_url, None), tokio::runtime::Handle::current(), no_repaint())
    }

    /// Echoes a numbered Clarity snippet and counts calls.
    fn counting_backend(hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route("/api/health", get(|| async { Json(json!({ "status": "healthy" })) }))
            .route(
                "/api/convert",
                post(move |Json(_): Json<Value>| {
                    let hits = hits.clone();
                    async move {
                        let n = hits.fetch_add(1, Ordering::SeqCst);
                        Json(json!({ "clarityCode": format!("(define-constant v u{})", n) }))
                    }
                }),
            )
    }

    fn converted(output: &str) -> SessionState {
        let mut state = SessionState { input: "contract A {}".into(), ..SessionState::default() };
        state.begin_convert().unwrap();
        state.finish_convert(Ok(output.to_string()));
        state
    }

    // -- pure transitions ---------------------------------------------------

    #[test]
    fn blank_input_is_rejected_locally() {
        let mut state = SessionState { input: " \n\t ".into(), ..SessionState::default() };
        assert!(state.begin_convert().is_none());
        assert_eq!(state.convert_phase(), &ConvertPhase::Error(EMPTY_INPUT_MESSAGE.into()));
        assert!(!state.is_loading());
    }

    #[test]
    fn begin_convert_clears_previous_result() {
        let mut state = converted("(old)");
        state.finish_deploy(Err(ApiError::Other("x".into())));
        assert_eq!(state.begin_convert().as_deref(), Some("contract A {}"));
        assert!(state.output().is_empty());
        assert!(state.is_loading());
        assert!(state.error_message().is_none());
        assert_eq!(state.deploy_phase(), &DeployPhase::Idle);
    }

    #[test]
    fn success_updates_output_and_history() {
        let state = converted("(define-read-only (get-x) u1)");
        assert_eq!(state.output(), "(define-read-only (get-x) u1)");
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.history().get(0).unwrap().output, state.output());
        assert_eq!(state.history().selected(), Some(0));
        assert_eq!(state.convert_phase(), &ConvertPhase::Ready);
    }

    #[test]
    fn empty_success_is_not_recorded() {
        let state = converted("");
        assert!(state.history().is_empty());
        assert_eq!(state.convert_phase(), &ConvertPhase::Ready);
    }

    #[test]
    fn history_caps_at_ten() {
        let mut state = SessionState { input: "x".into(), ..SessionState::default() };
        for i in 0..11 {
            state.begin_convert().unwrap();
            state.finish_convert(Ok(format!("v{}", i)));
        }
        assert_eq!(state.history().len(), 10);
        assert_eq!(state.history().get(0).unwrap().output, "v10");
        assert_eq!(state.history().get(9).unwrap().output, "v1");
        assert_eq!(state.output(), "v10");
    }

    #[test]
    fn failure_maps_to_category_message() {
        let mut state = SessionState { input: "x".into(), ..SessionState::default() };
        state.begin_convert();
        state.finish_convert(Err(ApiError::NoResponse("timed out".into())));
        assert!(!state.is_loading());
        assert!(state.output().is_empty());
        assert_eq!(
            state.error_message(),
            Some("No response from server. Please check if the backend server is running.")
        );
    }

    #[test]
    fn second_convert_while_loading_is_ignored() {
        let mut state = SessionState { input: "x".into(), ..SessionState::default() };
        assert!(state.begin_convert().is_some());
        assert!(state.begin_convert().is_none());
        assert!(state.is_loading());
    }

    #[test]
    fn restore_changes_output_only() {
        let mut state = SessionState { input: "x".into(), ..SessionState::default() };
        for i in 0..3 {
            state.begin_convert();
            state.finish_convert(Ok(format!("v{}", i)));
        }
        let before: Vec<_> = state.history().iter().cloned().collect();
        assert!(state.restore(2));
        assert_eq!(state.output(), "v0");
        assert_eq!(state.history().selected(), Some(2));
        assert_eq!(state.history().iter().cloned().collect::<Vec<_>>(), before);
        assert!(!state.restore(7));
        assert_eq!(state.output(), "v0");
    }

    #[test]
    fn deploy_without_output_is_noop() {
        let mut state = SessionState::default();
        assert!(state.begin_deploy().is_none());
        assert_eq!(state.deploy_phase(), &DeployPhase::Idle);

        let mut blank = converted("   ");
        assert!(blank.begin_deploy().is_none());
        assert_eq!(blank.deploy_phase(), &DeployPhase::Idle);
    }

    #[test]
    fn deploy_failure_prefers_server_message() {
        let mut state = converted("(x)");
        state.begin_deploy().unwrap();
        state.finish_deploy(Err(ApiError::Server {
            status: reqwest::StatusCode::BAD_REQUEST,
            message: Some("No Clarity code provided".into()),
        }));
        assert_eq!(state.error_message(), Some("No Clarity code provided"));
        assert!(!state.is_deploying());
    }

    #[test]
    fn deploy_failure_without_detail_uses_fallback() {
        let mut state = converted("(x)");
        state.begin_deploy().unwrap();
        state.finish_deploy(Err(ApiError::Other(String::new())));
        assert_eq!(state.error_message(), Some("Deploy failed"));
    }

    #[test]
    fn deploy_after_failed_convert_shows_deploy_outcome() {
        let mut state = converted("(v0)");
        state.begin_convert().unwrap();
        state.finish_convert(Err(ApiError::NoResponse("timed out".into())));
        assert!(state.restore(0));
        assert_eq!(state.output(), "(v0)");

        state.begin_deploy().unwrap();
        assert_eq!(state.error_message(), None);
        state.finish_deploy(Err(ApiError::Server {
            status: reqwest::StatusCode::BAD_REQUEST,
            message: Some("Deploy rejected".into()),
        }));
        assert_eq!(state.error_message(), Some("Deploy rejected"));

        state.begin_deploy().unwrap();
        state.finish_deploy(Ok(DeployReceipt::default()));
        assert_eq!(state.error_message(), None);
        assert_eq!(state.convert_phase(), &ConvertPhase::Ready);
    }

    #[test]
    fn copy_requires_output() {
        let mut state = SessionState::default();
        let now = Instant::now();
        assert!(state.copy_output(now).is_none());
        assert!(!state.is_copied(now));
    }

    #[test]
    fn copy_flag_reverts_after_two_seconds() {
        let mut state = converted("(x)");
        let t0 = Instant::now();
        assert_eq!(state.copy_output(t0).as_deref(), Some("(x)"));
        assert!(state.is_copied(t0));
        assert!(state.is_copied(t0 + Duration::from_millis(1999)));
        assert!(!state.is_copied(t0 + Duration::from_millis(2000)));
        assert_eq!(state.copy_remaining(t0 + Duration::from_millis(500)), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn copy_again_restarts_window() {
        let mut state = converted("(x)");
        let t0 = Instant::now();
        state.copy_output(t0);
        state.copy_output(t0 + Duration::from_millis(1500));
        assert!(state.is_copied(t0 + Duration::from_millis(3000)));
        assert!(!state.is_copied(t0 + Duration::from_millis(3500)));
    }

    // -- driver against a local backend -------------------------------------

    #[tokio::test]
    async fn convert_round_trip_fills_history() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut converter = converter_for(spawn_backend(counting_backend(hits.clone())).await);
        converter.state.input = "contract Token {}".into();

        converter.convert();
        assert!(converter.state.is_loading());
        settle(|| {
            converter.poll();
            !converter.state.is_loading()
        })
        .await;

        assert_eq!(converter.state.output(), "(define-constant v u0)");
        assert_eq!(converter.state.history().get(0).unwrap().output, "(define-constant v u0)");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn eleven_conversions_keep_ten() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut converter = converter_for(spawn_backend(counting_backend(hits.clone())).await);
        converter.state.input = "contract Token {}".into();

        for _ in 0..11 {
            converter.convert();
            settle(|| {
                converter.poll();
                !converter.state.is_loading()
            })
            .await;
        }

        let history = converter.state.history();
        assert_eq!(history.len(), 10);
        assert_eq!(history.get(0).unwrap().output, "(define-constant v u10)");
        assert!(history.iter().all(|r| r.output != "(define-constant v u0)"));
    }

    #[tokio::test]
    async fn blank_input_sends_nothing() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut converter = converter_for(spawn_backend(counting_backend(hits.clone())).await);
        converter.state.input = "   ".into();

        converter.convert();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(converter.poll(), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(converter.state.error_message(), Some(EMPTY_INPUT_MESSAGE));
    }

    #[tokio::test]
    async fn deploy_with_empty_output_sends_nothing() {
        let deploys = Arc::new(AtomicUsize::new(0));
        let counter = deploys.clone();
        let router = Router::new().route(
            "/api/deploy",
            post(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Json(json!({ "contractId": "x" })) }
            }),
        );
        let mut converter = converter_for(spawn_backend(router).await);

        converter.deploy();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(converter.poll(), 0);
        assert_eq!(deploys.load(Ordering::SeqCst), 0);
        assert_eq!(converter.state.deploy_phase(), &DeployPhase::Idle);
        assert!(converter.state.error_message().is_none());
    }

    #[tokio::test]
    async fn deploy_stores_receipt() {
        let router = Router::new()
            .route("/api/convert", post(|| async { Json(json!({ "clarityCode": "(x)" })) }))
            .route(
                "/api/deploy",
                post(|| async {
                    Json(json!({ "contractId": "ST1PQ.converted-contract", "network": "testnet" }))
                }),
            );
        let mut converter = converter_for(spawn_backend(router).await);
        converter.state.input = "contract A {}".into();
        converter.convert();
        settle(|| {
            converter.poll();
            !converter.state.is_loading()
        })
        .await;

        converter.deploy();
        assert!(converter.state.is_deploying());
        settle(|| {
            converter.poll();
            !converter.state.is_deploying()
        })
        .await;
        assert_eq!(converter.state.receipt().unwrap().contract_id, "ST1PQ.converted-contract");
    }

    #[tokio::test]
    async fn server_error_surfaces_message() {
        let router = Router::new().route(
            "/api/convert",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Groq API key is not configured" })),
                )
            }),
        );
        let mut converter = converter_for(spawn_backend(router).await);
        converter.state.input = "contract A {}".into();
        converter.convert();
        settle(|| {
            converter.poll();
            !converter.state.is_loading()
        })
        .await;
        assert_eq!(
            converter.state.error_message(),
            Some("Server error: Groq API key is not configured")
        );
        assert!(converter.state.history().is_empty());
    }

    #[tokio::test]
    async fn health_transitions() {
        let mut down = converter_for(unreachable_url());
        down.check_backend_status();
        assert_eq!(down.state.backend(), BackendStatus::Checking);
        settle(|| {
            down.poll();
            down.state.backend() != BackendStatus::Checking
        })
        .await;
        assert_eq!(down.state.backend(), BackendStatus::Error);

        let hits = Arc::new(AtomicUsize::new(0));
        let mut up = converter_for(spawn_backend(counting_backend(hits)).await);
        up.check_backend_status();
        settle(|| {
            up.poll();
            up.state.backend() != BackendStatus::Checking
        })
        .await;
        assert_eq!(up.state.backend(), BackendStatus::Connected);
    }

    #[tokio::test]
    async fn dropped_converter_gets_no_update() {
        let router = Router::new().route(
            "/api/convert",
            post(|| async {
                tokio::time::sleep(Duration::from_millis(150)).await;
                Json(json!({ "clarityCode": "(late)" }))
            }),
        );
        let base = spawn_backend(router).await;
        let repaints = Arc::new(AtomicUsize::new(0));
        let counter = repaints.clone();
        let mut converter = Converter::new(
            ApiClient::new(base, None),
            tokio::runtime::Handle::current(),
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        converter.state.input = "contract A {}".into();
        converter.convert();
        drop(converter);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(repaints.load(Ordering::SeqCst), 0);
    }
}
