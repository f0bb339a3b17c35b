//! Turn lifecycle states and the per-bot turn policy.

use std::fmt::{Display, Formatter};

/// `Idle → AwaitingResponse → {Dispatching → AwaitingResponse}* → Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TurnState {
    #[default]
    Idle,
    AwaitingResponse,
    Dispatching,
    Done,
}

impl TurnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingResponse => "awaiting_response",
            Self::Dispatching => "dispatching",
            Self::Done => "done",
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::AwaitingResponse | Self::Dispatching)
    }
}

impl Display for TurnState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Limits applied to every turn. The default places no limit on round trips.
///
/// Without a limit, a backend that keeps reporting an incomplete turn with
/// no function calls is asked again indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChatPolicy {
    pub max_round_trips: Option<u32>,
}

impl ChatPolicy {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_max_round_trips(mut self, max_round_trips: u32) -> Self {
        self.max_round_trips = Some(max_round_trips);
        self
    }

    pub(crate) fn allows(&self, completed_round_trips: u32) -> bool {
        self.max_round_trips
            .is_none_or(|limit| completed_round_trips < limit)
    }
}
