use crate::packet::PartyMemberStats;
use crate::state::{EntityId, GroupId};

/// Group-visible status channel.
pub trait GroupBroadcast {
    fn send_member_stats(&mut self, recipient: EntityId, stats: &PartyMemberStats);

    /// Asks the host to resend the full group roster.
    fn send_group_update(&mut self, group: GroupId);
}
