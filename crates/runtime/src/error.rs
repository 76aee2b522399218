//! Errors surfaced by the reference host.
use companion_core::{EntityId, FollowError, GroupId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("entity {0} is not in the world")]
    UnknownEntity(EntityId),

    #[error("companion {0} is not spawned")]
    UnknownCompanion(EntityId),

    #[error("{0} does not exist")]
    UnknownGroup(GroupId),

    #[error("entity {0} already exists")]
    DuplicateEntity(EntityId),

    #[error("template entry {entry} of {id} is not a companion template")]
    NotACompanion { id: EntityId, entry: u32 },

    #[error("companion {companion} is already hired by {owner}")]
    AlreadyHired {
        companion: EntityId,
        owner: EntityId,
    },

    #[error("follow request rejected")]
    Follow(#[from] FollowError),
}
