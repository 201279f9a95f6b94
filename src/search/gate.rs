//! Last-request-wins gate for overlapping searches
//!
//! A caller that fires searches faster than they complete (type-ahead, filter
//! toggles) opens every search through the same [`SearchGate`]. Starting a new
//! search cancels the token of the previous one, and only the newest ticket
//! may publish its result.

use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Handle of one search started through a gate
#[derive(Debug, Clone)]
pub struct SearchTicket {
    generation: u64,
    token: CancellationToken,
}

impl SearchTicket {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
struct GateState {
    generation: u64,
    token: CancellationToken,
}

#[derive(Debug)]
pub struct SearchGate {
    state: Mutex<GateState>,
}

impl SearchGate {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                generation: 0,
                token: CancellationToken::new(),
            }),
        }
    }

    /// Start a search, superseding whatever was in flight
    pub fn begin(&self) -> SearchTicket {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.token.cancel();
        state.generation += 1;
        state.token = CancellationToken::new();
        SearchTicket {
            generation: state.generation,
            token: state.token.clone(),
        }
    }

    pub fn is_current(&self, ticket: &SearchTicket) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.generation == ticket.generation
    }

    /// Hand back `value` only if no newer search was started meanwhile
    pub fn finish<T>(&self, ticket: &SearchTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(generation = ticket.generation, "discarding superseded search result");
            None
        }
    }
}

impl Default for SearchGate {
    fn default() -> Self {
        Self::new()
    }
}
