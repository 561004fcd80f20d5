//! Caller-visible error kinds for Session Table operations.

use mazebox_engine::GenerateError;
use mazebox_wire::WireError;

use crate::session::OwnerId;

/// Every failure a table operation can report.
///
/// All of these are expected outcomes returned to the adapter; none of them
/// indicates a defect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    /// Non-positive, over-maximum, or too-small dimensions.
    #[error("invalid maze size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },

    /// The owner already has a session.
    #[error("owner {owner} already has a maze")]
    AlreadyExists { owner: OwnerId },

    /// The owner has no session.
    #[error("owner {owner} has no maze")]
    NotFound { owner: OwnerId },

    /// Every slot is occupied.
    #[error("all {capacity} maze slots are in use")]
    Exhausted { capacity: usize },

    /// Malformed request payload.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Storage for a new session could not be allocated.
    #[error("failed to allocate {cells} maze cells")]
    AllocationFailure { cells: usize },

    /// Generation gave up before finding a solvable layout.
    #[error("maze generation timed out after {attempts} endpoint samples")]
    GenerationTimeout { attempts: u64 },
}

/// errno values used by device-style adapters.
pub mod errno {
    pub const ENOENT: i32 = 2;
    pub const ENOMEM: i32 = 12;
    pub const EEXIST: i32 = 17;
    pub const EINVAL: i32 = 22;
    pub const EBADFD: i32 = 77;
    pub const ETIMEDOUT: i32 = 110;
}

impl MazeError {
    /// errno an adapter returns (negated) for this error.
    pub fn errno(&self) -> i32 {
        match self {
            Self::InvalidSize { .. } | Self::InvalidInput { .. } => errno::EINVAL,
            Self::AlreadyExists { .. } => errno::EEXIST,
            Self::NotFound { .. } => errno::ENOENT,
            Self::Exhausted { .. } | Self::AllocationFailure { .. } => errno::ENOMEM,
            Self::GenerationTimeout { .. } => errno::ETIMEDOUT,
        }
    }
}

impl From<GenerateError> for MazeError {
    fn from(e: GenerateError) -> Self {
        match e {
            GenerateError::InvalidSize { width, height } => Self::InvalidSize { width, height },
            GenerateError::AllocationFailure { cells } => Self::AllocationFailure { cells },
            GenerateError::GenerationTimeout { attempts, .. } => {
                Self::GenerationTimeout { attempts }
            }
        }
    }
}

impl From<WireError> for MazeError {
    fn from(e: WireError) -> Self {
        Self::InvalidInput {
            reason: e.to_string(),
        }
    }
}
