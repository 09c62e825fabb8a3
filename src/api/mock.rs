//! Scripted in-memory [`ModelService`] for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::client::{EventSink, ModelService};
use crate::api::types::{
    CreateProgress, CreateRequest, GenerateRequest, GenerateResponse, ListResponse, PullRequest, PushRequest,
    TransferProgress,
};
use crate::error::{ClientError, ErrorResponse, Result};

/// Failure injected into every stream after a number of delivered events
#[derive(Debug, Clone)]
struct Failure {
    after: usize,
    error: ErrorResponse,
}

/// Replays canned events and records every request it receives.
///
/// Each generate call consumes the next scripted turn; pull and push replay
/// the same transfer events.
#[derive(Debug, Default)]
pub struct MockService {
    turns: Mutex<VecDeque<Vec<GenerateResponse>>>,
    transfer: Vec<TransferProgress>,
    create: Vec<CreateProgress>,
    models: ListResponse,
    failure: Option<Failure>,

    generate_requests: Mutex<Vec<GenerateRequest>>,
    pull_requests: Mutex<Vec<PullRequest>>,
    push_requests: Mutex<Vec<PushRequest>>,
    create_requests: Mutex<Vec<CreateRequest>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_turn(self, events: Vec<GenerateResponse>) -> Self {
        lock(&self.turns).push_back(events);
        self
    }

    pub fn with_transfer(mut self, events: Vec<TransferProgress>) -> Self {
        self.transfer = events;
        self
    }

    pub fn with_create(mut self, events: Vec<CreateProgress>) -> Self {
        self.create = events;
        self
    }

    pub fn with_models(mut self, models: ListResponse) -> Self {
        self.models = models;
        self
    }

    /// Fail every call with `error` after `after` events were delivered
    pub fn failing_after(mut self, after: usize, error: ErrorResponse) -> Self {
        self.failure = Some(Failure { after, error });
        self
    }

    pub fn generate_requests(&self) -> Vec<GenerateRequest> {
        lock(&self.generate_requests).clone()
    }

    pub fn pull_requests(&self) -> Vec<PullRequest> {
        lock(&self.pull_requests).clone()
    }

    pub fn push_requests(&self) -> Vec<PushRequest> {
        lock(&self.push_requests).clone()
    }

    pub fn create_requests(&self) -> Vec<CreateRequest> {
        lock(&self.create_requests).clone()
    }

    fn replay<T: Clone>(&self, events: &[T], sink: &mut EventSink<'_, T>) -> Result<()> {
        for (i, event) in events.iter().enumerate() {
            self.check_failure(i)?;
            sink(event.clone()).map_err(ClientError::Sink)?;
        }
        self.check_failure(events.len())
    }

    fn check_failure(&self, delivered: usize) -> Result<()> {
        match &self.failure {
            Some(failure) if failure.after == delivered => Err(ClientError::Api(failure.error.clone())),
            _ => Ok(()),
        }
    }
}

// A poisoned lock only means another test thread panicked
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl ModelService for MockService {
    async fn generate(&self, request: &GenerateRequest, sink: &mut EventSink<'_, GenerateResponse>) -> Result<()> {
        lock(&self.generate_requests).push(request.clone());
        let events = lock(&self.turns).pop_front().unwrap_or_default();
        self.replay(&events, sink)
    }

    async fn pull(&self, request: &PullRequest, sink: &mut EventSink<'_, TransferProgress>) -> Result<()> {
        lock(&self.pull_requests).push(request.clone());
        self.replay(&self.transfer, sink)
    }

    async fn push(&self, request: &PushRequest, sink: &mut EventSink<'_, TransferProgress>) -> Result<()> {
        lock(&self.push_requests).push(request.clone());
        self.replay(&self.transfer, sink)
    }

    async fn create(&self, request: &CreateRequest, sink: &mut EventSink<'_, CreateProgress>) -> Result<()> {
        lock(&self.create_requests).push(request.clone());
        self.replay(&self.create, sink)
    }

    async fn list(&self) -> Result<ListResponse> {
        self.check_failure(0)?;
        Ok(self.models.clone())
    }
}
