use companion_core::{
    EntityId, GroupBroadcast, GroupId, PartyMemberStats, SMSG_PARTY_MEMBER_STATS,
};

/// An encoded packet waiting for delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundPacket {
    pub recipient: EntityId,
    pub opcode: u16,
    pub payload: Vec<u8>,
}

/// Collects group traffic produced during ticks until the host drains it.
#[derive(Clone, Debug, Default)]
pub struct PacketOutbox {
    packets: Vec<OutboundPacket>,
    group_updates: Vec<GroupId>,
}

impl PacketOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packets(&self) -> &[OutboundPacket] {
        &self.packets
    }

    pub fn group_updates(&self) -> &[GroupId] {
        &self.group_updates
    }

    pub fn drain(&mut self) -> Vec<OutboundPacket> {
        std::mem::take(&mut self.packets)
    }

    pub fn drain_group_updates(&mut self) -> Vec<GroupId> {
        std::mem::take(&mut self.group_updates)
    }
}

impl GroupBroadcast for PacketOutbox {
    fn send_member_stats(&mut self, recipient: EntityId, stats: &PartyMemberStats) {
        self.packets.push(OutboundPacket {
            recipient,
            opcode: SMSG_PARTY_MEMBER_STATS,
            payload: stats.encode(),
        });
    }

    fn send_group_update(&mut self, group: GroupId) {
        self.group_updates.push(group);
    }
}
