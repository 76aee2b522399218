//! Follow state of a companion.
//!
//! The state is a small bit-set rather than an enum because several concerns
//! overlap during transitions (a companion can be following, paused and
//! returning at once). All mutation goes through [`FollowState`], which keeps
//! the following invariants:
//!
//! - `IN_PROGRESS` and `COMPLETE` are never set together.
//! - `RETURNING` is only set while `IN_PROGRESS` is set, and is dropped
//!   whenever `IN_PROGRESS` is dropped.

use bitflags::bitflags;

use crate::error::{CompanionError, ErrorSeverity};
use crate::state::EntityId;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct FollowFlags: u8 {
        const IN_PROGRESS = 1 << 0;
        const RETURNING   = 1 << 1;
        const PAUSED      = 1 << 2;
        const COMPLETE    = 1 << 3;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FollowState {
    flags: FollowFlags,
}

impl FollowState {
    /// The initial state: not following, nothing pending.
    pub const NONE: Self = Self {
        flags: FollowFlags::empty(),
    };

    pub fn flags(&self) -> FollowFlags {
        self.flags
    }

    pub fn is_none(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn in_progress(&self) -> bool {
        self.flags.contains(FollowFlags::IN_PROGRESS)
    }

    pub fn is_returning(&self) -> bool {
        self.flags.contains(FollowFlags::RETURNING)
    }

    pub fn is_paused(&self) -> bool {
        self.flags.contains(FollowFlags::PAUSED)
    }

    pub fn is_complete(&self) -> bool {
        self.flags.contains(FollowFlags::COMPLETE)
    }

    /// Enters `IN_PROGRESS`. A previous `COMPLETE` is cleared.
    pub fn begin(&mut self) -> Result<(), FollowError> {
        if self.in_progress() {
            return Err(FollowError::AlreadyFollowing);
        }
        self.flags.remove(FollowFlags::COMPLETE);
        self.flags.insert(FollowFlags::IN_PROGRESS);
        Ok(())
    }

    /// `IN_PROGRESS` → `COMPLETE`. Returns false when not following.
    pub fn complete(&mut self) -> bool {
        if !self.in_progress() {
            return false;
        }
        self.flags.remove(FollowFlags::IN_PROGRESS | FollowFlags::RETURNING);
        self.flags.insert(FollowFlags::COMPLETE);
        true
    }

    /// Sets `RETURNING`. Returns false when not following.
    pub fn mark_returning(&mut self) -> bool {
        if !self.in_progress() {
            return false;
        }
        self.flags.insert(FollowFlags::RETURNING);
        true
    }

    /// Clears `RETURNING`. Returns true if it was set.
    pub fn clear_returning(&mut self) -> bool {
        let was = self.is_returning();
        self.flags.remove(FollowFlags::RETURNING);
        was
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.flags.set(FollowFlags::PAUSED, paused);
    }

    pub fn reset(&mut self) {
        *self = Self::NONE;
    }
}

/// Rejected follow-state requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FollowError {
    #[error("attempt to start following while already following")]
    AlreadyFollowing,

    #[error("leader {0} is not in the world")]
    LeaderNotFound(EntityId),

    #[error("owner {0} is between maps")]
    OwnerAway(EntityId),

    #[error("no player of the leader's group is within reach")]
    LeaderOutOfReach,
}

impl CompanionError for FollowError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            FollowError::AlreadyFollowing => ErrorSeverity::Precondition,
            FollowError::LeaderNotFound(_) => ErrorSeverity::InvalidInput,
            FollowError::OwnerAway(_) => ErrorSeverity::Transient,
            FollowError::LeaderOutOfReach => ErrorSeverity::Terminal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            FollowError::AlreadyFollowing => "FOLLOW_ALREADY_IN_PROGRESS",
            FollowError::LeaderNotFound(_) => "FOLLOW_LEADER_NOT_FOUND",
            FollowError::OwnerAway(_) => "FOLLOW_OWNER_AWAY",
            FollowError::LeaderOutOfReach => "FOLLOW_LEADER_OUT_OF_REACH",
        }
    }
}
