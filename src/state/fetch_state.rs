/// Fetch state definitions for a single URL
///
/// This module defines the states one fetch walks through, from the first
/// request to a terminal outcome, and which transitions between them are legal.
use std::fmt;

/// Represents where a single fetch currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchState {
    // ===== Active States =====
    /// Nothing sent yet
    Idle,

    /// Plain HTTP request in flight
    Sending,

    /// The response body looked like an anti-bot challenge
    ChallengeDetected,

    /// Loading the page in the browser session
    RenderingFallback,

    /// The attempt failed; may go back to Sending after a backoff
    Errored,

    // ===== Terminal States =====
    /// Content was extracted
    Succeeded,

    /// Retries exhausted
    Failed,
}

impl FetchState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Returns true if the transition `self -> next` is part of the fetch state machine
    pub fn can_transition_to(&self, next: FetchState) -> bool {
        use FetchState::*;

        matches!(
            (self, next),
            (Idle, Sending)
                | (Sending, Succeeded)
                | (Sending, ChallengeDetected)
                | (Sending, Errored)
                | (ChallengeDetected, RenderingFallback)
                | (RenderingFallback, Succeeded)
                | (RenderingFallback, Errored)
                | (Errored, Sending)
                | (Errored, Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Sending => "sending",
            Self::ChallengeDetected => "challenge_detected",
            Self::RenderingFallback => "rendering_fallback",
            Self::Errored => "errored",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Returns all fetch states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::Sending,
            Self::ChallengeDetected,
            Self::RenderingFallback,
            Self::Errored,
            Self::Succeeded,
            Self::Failed,
        ]
    }
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
