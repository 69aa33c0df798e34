use serde::{Deserialize, Serialize};

pub const READY_MESSAGE: &str = "Open vSwitch configured and ready";
pub const NOT_CONFIGURED_MESSAGE: &str = "Open vSwitch not configured with an ODL OVSDB controller";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadState {
    Active,
    Waiting,
}

impl std::fmt::Display for WorkloadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkloadState::Active => write!(f, "active"),
            WorkloadState::Waiting => write!(f, "waiting"),
        }
    }
}

/// Status reported back to the orchestration layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadStatus {
    pub state: WorkloadState,
    pub message: String,
}

impl WorkloadStatus {
    pub fn new(state: WorkloadState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
        }
    }

    pub fn ready() -> Self {
        Self::new(WorkloadState::Active, READY_MESSAGE)
    }

    pub fn not_configured() -> Self {
        Self::new(WorkloadState::Waiting, NOT_CONFIGURED_MESSAGE)
    }
}

impl std::fmt::Display for WorkloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.state, self.message)
    }
}
