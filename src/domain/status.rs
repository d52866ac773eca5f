use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    New,
    Success,
    Failure,
    Error,
    Canceled,
}

impl RecordStatus {
    pub const ALL: [RecordStatus; 5] = [
        RecordStatus::New,
        RecordStatus::Success,
        RecordStatus::Failure,
        RecordStatus::Error,
        RecordStatus::Canceled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::New => "new",
            RecordStatus::Success => "success",
            RecordStatus::Failure => "failure",
            RecordStatus::Error => "error",
            RecordStatus::Canceled => "canceled",
        }
    }

    pub fn is_terminal(self) -> bool {
        self != RecordStatus::New
    }

    pub fn can_transition_to(self, requested: RecordStatus) -> bool {
        allowed(self, requested)
    }

    /// Statuses a record may currently hold for `requested` to be accepted.
    /// Stores bake this set into the conditional write predicate.
    pub fn sources_for(requested: RecordStatus) -> Vec<RecordStatus> {
        RecordStatus::ALL
            .into_iter()
            .filter(|current| allowed(*current, requested))
            .collect()
    }
}

/// Transition guard. Only `new` may move, and only to a terminal outcome
/// other than `error` (which is reserved for declines at creation time).
pub fn allowed(current: RecordStatus, requested: RecordStatus) -> bool {
    matches!(
        (current, requested),
        (
            RecordStatus::New,
            RecordStatus::Success | RecordStatus::Failure | RecordStatus::Canceled
        )
    )
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status {:?}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for RecordStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(RecordStatus::New),
            "success" => Ok(RecordStatus::Success),
            "failure" => Ok(RecordStatus::Failure),
            "error" => Ok(RecordStatus::Error),
            "canceled" => Ok(RecordStatus::Canceled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}
