use log::debug;
use std::fmt;

/// Where a capture is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    PreconditionChecked,
    SessionActive,
    WaitingForSignal,
    SessionClosed,
    ArtifactRetrieved,
    Done,
    Failed,
}

impl CaptureState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaptureState::Done | CaptureState::Failed)
    }

    /// The single forward step out of this state, if any
    pub fn next(&self) -> Option<CaptureState> {
        use CaptureState::*;
        match self {
            Idle => Some(PreconditionChecked),
            PreconditionChecked => Some(SessionActive),
            SessionActive => Some(WaitingForSignal),
            WaitingForSignal => Some(SessionClosed),
            SessionClosed => Some(ArtifactRetrieved),
            ArtifactRetrieved => Some(Done),
            Done | Failed => None,
        }
    }

    pub fn can_advance_to(&self, target: CaptureState) -> bool {
        if target == CaptureState::Failed {
            return !self.is_terminal();
        }
        self.next() == Some(target)
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Ordered record of the states a capture passed through
#[derive(Debug, Clone)]
pub struct StateTracker {
    history: Vec<CaptureState>,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTracker {
    pub fn new() -> Self {
        Self {
            history: vec![CaptureState::Idle],
        }
    }

    pub fn current(&self) -> CaptureState {
        self.history
            .last()
            .copied()
            .unwrap_or(CaptureState::Idle)
    }

    pub fn history(&self) -> &[CaptureState] {
        &self.history
    }

    pub fn advance(&mut self, next: CaptureState) {
        let current = self.current();
        debug_assert!(
            current.can_advance_to(next),
            "invalid capture transition {} -> {}",
            current,
            next
        );
        debug!("Capture state: {} -> {}", current, next);
        self.history.push(next);
    }

    /// Move to `Failed` unless already terminal
    pub fn fail(&mut self) {
        if !self.current().is_terminal() {
            self.advance(CaptureState::Failed);
        }
    }
}
