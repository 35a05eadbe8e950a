//! Tutor view: send code to the explain endpoint and show the answer

use crate::api::{ApiClient, ApiError};
use crate::types::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const EXPLAIN_FALLBACK_MESSAGE: &str = "Failed to explain";

#[derive(Debug, Clone)]
pub struct TutorState {
    pub input: String,
    phase: ExplainPhase,
}

impl Default for TutorState {
    fn default() -> Self {
        Self {
            input: String::new(),
            phase: ExplainPhase::Idle,
        }
    }
}

impl TutorState {
    #[cfg(test)]
    pub fn phase(&self) -> &ExplainPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ExplainPhase::Loading
    }

    pub fn can_explain(&self) -> bool {
        !self.is_loading() && !self.input.trim().is_empty()
    }

    pub fn explanation(&self) -> Option<&str> {
        match &self.phase {
            ExplainPhase::Ready(text) if !text.is_empty() => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            ExplainPhase::Error(msg) => Some(msg.as_str()),
            _ => None,
        }
    }

    /// Replaces the input unless a request is pending, so the text on screen
    /// always matches the answer being waited on.
    pub fn load_input(&mut self, code: &str) -> bool {
        if self.is_loading() {
            return false;
        }
        self.input = code.to_string();
        true
    }

    /// Blank input is a silent no-op.
    pub fn begin_explain(&mut self) -> Option<String> {
        if !self.can_explain() {
            return None;
        }
        self.phase = ExplainPhase::Loading;
        Some(self.input.clone())
    }

    pub fn finish_explain(&mut self, result: Result<String, ApiError>) {
        self.phase = match result {
            Ok(text) => ExplainPhase::Ready(text),
            Err(e) => {
                let detail = e.detail();
                ExplainPhase::Error(if detail.is_empty() {
                    EXPLAIN_FALLBACK_MESSAGE.to_string()
                } else {
                    detail
                })
            }
        };
    }
}

pub struct Tutor {
    pub state: TutorState,
    client: ApiClient,
    runtime: tokio::runtime::Handle,
    tx: mpsc::UnboundedSender<Result<String, ApiError>>,
    rx: mpsc::UnboundedReceiver<Result<String, ApiError>>,
    cancel: CancellationToken,
    repaint: Repaint,
}

impl Tutor {
    pub fn new(client: ApiClient, runtime: tokio::runtime::Handle, repaint: Repaint) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: TutorState::default(),
            client,
            runtime,
            tx,
            rx,
            cancel: CancellationToken::new(),
            repaint,
        }
    }

    pub fn explain(&mut self) {
        let Some(code) = self.state.begin_explain() else {
            return;
        };
        info!(chars = code.len(), "Requesting explanation");

        let client = self.client.clone();
        let tx = self.tx.clone();
        let token = self.cancel.clone();
        let repaint = self.repaint.clone();
        self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => debug!("Tutor gone, request abandoned"),
                result = client.explain(&code) => {
                    if tx.send(result).is_ok() {
                        repaint();
                    }
                }
            }
        });
    }

    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(result) = self.rx.try_recv() {
            applied += 1;
            match &result {
                Ok(text) => info!(chars = text.len(), "Explanation received"),
                Err(e) => warn!(error = %e, kind = e.kind(), "Explain failed"),
            }
            self.state.finish_explain(result);
        }
        applied
    }
}

impl Drop for Tutor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
