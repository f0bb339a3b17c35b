//! Sending built requests to a backend.
//!
//! ```rust
//! use cprovider::{ProviderId, ProviderRequest, ProviderTransport, ScriptedTransport};
//! use cprovider::echo::text_response;
//! use serde_json::json;
//!
//! # tokio_test_block_on(async {
//! let transport = ScriptedTransport::new().with_response(text_response("scripted"));
//! let request = ProviderRequest::new(ProviderId::Echo, json!({}));
//!
//! let response = transport.send(&request).await.expect("response should be queued");
//! assert_eq!(response.body["content"][0]["text"], "scripted");
//! assert_eq!(transport.requests().len(), 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(future: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(future)
//! # }
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use ccommon::BoxFuture;

use crate::{ProviderError, ProviderRequest, ProviderResponse};

pub type ProviderFuture<'a, T> = BoxFuture<'a, T>;

pub trait ProviderTransport: Send + Sync {
    fn send<'a>(
        &'a self,
        request: &'a ProviderRequest,
    ) -> ProviderFuture<'a, Result<ProviderResponse, ProviderError>>;
}

impl<T> ProviderTransport for Arc<T>
where
    T: ProviderTransport + ?Sized,
{
    fn send<'a>(
        &'a self,
        request: &'a ProviderRequest,
    ) -> ProviderFuture<'a, Result<ProviderResponse, ProviderError>> {
        self.as_ref().send(request)
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    outcomes: Vec<Result<ProviderResponse, ProviderError>>,
    cursor: usize,
    fallback: Option<Result<ProviderResponse, ProviderError>>,
    requests: Vec<ProviderRequest>,
}

/// Serves queued responses and errors in order, then a fallback outcome.
///
/// Every request is captured for later inspection. Without a fallback, an
/// exhausted script answers with an `Other` error.
#[derive(Debug, Default, Clone)]
pub struct ScriptedTransport {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: ProviderResponse) -> Self {
        self.push_response(response);
        self
    }

    pub fn with_error(self, error: ProviderError) -> Self {
        self.push_error(error);
        self
    }

    pub fn with_default_response(self, response: ProviderResponse) -> Self {
        self.set_default_response(response);
        self
    }

    pub fn push_response(&self, response: ProviderResponse) {
        self.lock().outcomes.push(Ok(response));
    }

    pub fn push_responses(&self, responses: impl IntoIterator<Item = ProviderResponse>) {
        self.lock().outcomes.extend(responses.into_iter().map(Ok));
    }

    pub fn push_error(&self, error: ProviderError) {
        self.lock().outcomes.push(Err(error));
    }

    pub fn push_errors(&self, errors: impl IntoIterator<Item = ProviderError>) {
        self.lock().outcomes.extend(errors.into_iter().map(Err));
    }

    pub fn set_default_response(&self, response: ProviderResponse) {
        self.lock().fallback = Some(Ok(response));
    }

    pub fn set_default_error(&self, error: ProviderError) {
        self.lock().fallback = Some(Err(error));
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.lock().requests.clone()
    }

    pub fn remaining(&self) -> usize {
        let state = self.lock();
        state.outcomes.len().saturating_sub(state.cursor)
    }

    /// Replays the script from the start and forgets captured requests.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.cursor = 0;
        state.requests.clear();
    }

    pub fn reset_responses(&self) {
        let mut state = self.lock();
        state.outcomes.clear();
        state.cursor = 0;
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_outcome(&self, request: &ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        if let Some(outcome) = state.outcomes.get(state.cursor).cloned() {
            state.cursor += 1;
            return outcome;
        }

        state.fallback.clone().unwrap_or_else(|| {
            Err(ProviderError::other(
                "scripted transport has no response left",
            ))
        })
    }
}

impl ProviderTransport for ScriptedTransport {
    fn send<'a>(
        &'a self,
        request: &'a ProviderRequest,
    ) -> ProviderFuture<'a, Result<ProviderResponse, ProviderError>> {
        let outcome = self.next_outcome(request);
        Box::pin(async move { outcome })
    }
}
