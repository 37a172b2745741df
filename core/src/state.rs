//! Request lifecycle for a single view: idle, loading, then a result.

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    /// Display-ready error message.
    Failed(String),
}

impl<T> RequestState<T> {
    pub fn new() -> Self {
        RequestState::Idle
    }

    /// Enter `Loading`, dropping any previous result or error.
    pub fn begin(&mut self) {
        *self = RequestState::Loading;
    }

    pub fn finish(&mut self, result: Result<T, ApiError>) {
        *self = match result {
            Ok(data) => RequestState::Success(data),
            Err(err) => RequestState::Failed(err.to_string()),
        };
    }

    /// `begin`, run `op`, then `finish` with its result.
    pub fn run(&mut self, op: impl FnOnce() -> Result<T, ApiError>) -> &Self {
        self.begin();
        self.finish(op());
        self
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            RequestState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Failed(message) => Some(message),
            _ => None,
        }
    }
}
