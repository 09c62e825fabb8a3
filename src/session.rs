//! Conversational state for one interactive run.
//!
//! A [`Session`] is owned by the prompt loop. Each generation turn sends the
//! context and session id returned by the previous turn; a successful turn
//! replaces both with whatever its final response carried.

use crate::api::{GenerateRequest, GenerateResponse, ModelService, Options};
use crate::error::{Result, SinkError};

/// State carried from one generation turn into the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    pub context: Vec<i64>,
    pub session_id: Option<i64>,
}

impl ConversationState {
    pub fn from_response(resp: &GenerateResponse) -> Self {
        Self {
            context: resp.context.clone(),
            session_id: resp.session_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.context.is_empty() && self.session_id.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    model: String,
    options: Options,
    state: ConversationState,
    turns: usize,
}

impl Session {
    pub fn new(model: impl Into<String>, options: Options) -> Self {
        Self {
            model: model.into(),
            options,
            state: ConversationState::default(),
            turns: 0,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Completed turns so far
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Request for the next turn, carrying the current state verbatim
    pub fn request(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            context: self.state.context.clone(),
            session_id: self.state.session_id,
            options: self.options.clone(),
        }
    }

    /// Replace the held state with the state of `resp`
    pub fn update(&mut self, resp: &GenerateResponse) {
        self.state = ConversationState::from_response(resp);
        self.turns += 1;
    }

    /// Run one generation turn, passing every chunk to `on_chunk`.
    ///
    /// The state is only replaced when the stream completes without error.
    /// Returns the last chunk received, if any.
    pub async fn turn<S, F>(&mut self, service: &S, prompt: &str, mut on_chunk: F) -> Result<Option<GenerateResponse>>
    where
        S: ModelService + ?Sized,
        F: FnMut(&GenerateResponse) -> std::result::Result<(), SinkError> + Send,
    {
        let request = self.request(prompt);
        let mut latest: Option<GenerateResponse> = None;

        if self.state.is_empty() {
            log::debug!("Generating with {} in a new conversation", self.model);
        } else {
            log::debug!(
                "Generating with {} (context {} tokens, session {:?})",
                self.model,
                request.context.len(),
                request.session_id
            );
        }

        service
            .generate(&request, &mut |resp: GenerateResponse| -> std::result::Result<(), SinkError> {
                on_chunk(&resp)?;
                latest = Some(resp);
                Ok(())
            })
            .await?;

        if let Some(resp) = &latest {
            self.update(resp);
        }

        Ok(latest)
    }
}
