//! Group status packet sent to every member of the owner's group.
//!
//! Layout: packed entity id, `u32` field mask, then each field whose bit is
//! set, in ascending bit order. All integers little-endian.
//!
//! | bit | field          | type          |
//! |-----|----------------|---------------|
//! | 0   | status         | `u16`         |
//! | 1   | current health | `u32`         |
//! | 2   | max health     | `u32`         |
//! | 3   | power type     | `u8`          |
//! | 4   | current power  | `u16`         |
//! | 5   | max power      | `u16`         |
//! | 6   | level          | `u16`         |
//! | 7   | zone           | `u16`         |
//! | 8   | position x, y  | `u16`, `u16`  |
//! | 19  | vehicle seat   | `u32`         |

use bitflags::bitflags;

use crate::state::{Companion, EntityId, PowerKind, PvpFlags};

/// Opcode of the member stats packet.
pub const SMSG_PARTY_MEMBER_STATS: u16 = 0x007E;

bitflags! {
    /// Fields present in a member stats packet.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct GroupUpdateFlags: u32 {
        const STATUS       = 1 << 0;
        const CUR_HP       = 1 << 1;
        const MAX_HP       = 1 << 2;
        const POWER_TYPE   = 1 << 3;
        const CUR_POWER    = 1 << 4;
        const MAX_POWER    = 1 << 5;
        const LEVEL        = 1 << 6;
        const ZONE         = 1 << 7;
        const POSITION     = 1 << 8;
        const VEHICLE_SEAT = 1 << 19;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct MemberStatus: u16 {
        const ONLINE  = 0x0001;
        const PVP     = 0x0002;
        const DEAD    = 0x0004;
        const PVP_FFA = 0x0010;
    }
}

/// Snapshot of a companion's group-visible status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartyMemberStats {
    pub id: EntityId,
    pub status: MemberStatus,
    pub health: u32,
    pub max_health: u32,
    pub power_type: PowerKind,
    pub power: u16,
    pub max_power: u16,
    pub level: u16,
    pub zone: u16,
    pub x: u16,
    pub y: u16,
    pub vehicle_seat: u32,
}

impl PartyMemberStats {
    /// Fields every member stats packet carries.
    pub const MASK: GroupUpdateFlags = GroupUpdateFlags::all();

    pub fn from_companion(companion: &Companion) -> Self {
        let mut status = MemberStatus::ONLINE;
        status.set(MemberStatus::PVP, companion.pvp.contains(PvpFlags::PVP));
        status.set(MemberStatus::DEAD, !companion.alive);
        status.set(MemberStatus::PVP_FFA, companion.pvp.contains(PvpFlags::FFA_PVP));

        let power = companion.current_power();
        Self {
            id: companion.id,
            status,
            health: companion.health.current,
            max_health: companion.health.maximum,
            power_type: companion.power_type,
            power: saturate_u16(power.current),
            max_power: saturate_u16(power.maximum),
            level: u16::from(companion.level),
            zone: companion.zone,
            x: coordinate(companion.position.x),
            y: coordinate(companion.position.y),
            vehicle_seat: companion.vehicle.map_or(0, |seat| seat.seat_id),
        }
    }

    /// Encodes the packet body (without opcode framing).
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(9 + 4 + 31);
        write_packed_id(&mut buf, self.id);
        buf.extend_from_slice(&Self::MASK.bits().to_le_bytes());

        buf.extend_from_slice(&self.status.bits().to_le_bytes());
        buf.extend_from_slice(&self.health.to_le_bytes());
        buf.extend_from_slice(&self.max_health.to_le_bytes());
        buf.push(self.power_type as u8);
        buf.extend_from_slice(&self.power.to_le_bytes());
        buf.extend_from_slice(&self.max_power.to_le_bytes());
        buf.extend_from_slice(&self.level.to_le_bytes());
        buf.extend_from_slice(&self.zone.to_le_bytes());
        buf.extend_from_slice(&self.x.to_le_bytes());
        buf.extend_from_slice(&self.y.to_le_bytes());
        buf.extend_from_slice(&self.vehicle_seat.to_le_bytes());
        buf
    }
}

/// Writes `id` as a presence byte followed by its non-zero bytes.
pub fn write_packed_id(buf: &mut Vec<u8>, id: EntityId) {
    let bytes = id.0.to_le_bytes();
    let mask_at = buf.len();
    buf.push(0);
    let mut mask = 0u8;
    for (i, byte) in bytes.into_iter().enumerate() {
        if byte != 0 {
            mask |= 1 << i;
            buf.push(byte);
        }
    }
    buf[mask_at] = mask;
}

fn saturate_u16(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

// Coordinates are truncated to integers and wrapped into 16 bits.
fn coordinate(value: f32) -> u16 {
    value as i32 as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CompanionTemplate, Position, ResourceMeter, VehicleSeat};

    #[test]
    fn packed_id_skips_zero_bytes() {
        let mut buf = Vec::new();
        write_packed_id(&mut buf, EntityId(0x0000_00AB_0000_1200));

        assert_eq!(buf, vec![0b0001_0010, 0x12, 0xAB]);
    }

    #[test]
    fn encodes_every_masked_field_in_bit_order() {
        let mut companion = Companion::new(EntityId(0x2A), "Mira", CompanionTemplate::default())
            .with_level(80)
            .with_position(Position::new(571, 5804.9, 624.7, 647.8))
            .with_health(ResourceMeter::new(9000, 12000))
            .with_power(PowerKind::Energy, ResourceMeter::new(70, 100));
        companion.zone = 4395;
        companion.pvp = PvpFlags::PVP;
        companion.vehicle = Some(VehicleSeat {
            seat_id: 301,
            can_attack: true,
        });

        let bytes = PartyMemberStats::from_companion(&companion).encode();

        let mut expected = vec![0x01, 0x2A];
        expected.extend_from_slice(&0x0008_01FFu32.to_le_bytes());
        expected.extend_from_slice(&0x0003u16.to_le_bytes());
        expected.extend_from_slice(&9000u32.to_le_bytes());
        expected.extend_from_slice(&12000u32.to_le_bytes());
        expected.push(3);
        expected.extend_from_slice(&70u16.to_le_bytes());
        expected.extend_from_slice(&100u16.to_le_bytes());
        expected.extend_from_slice(&80u16.to_le_bytes());
        expected.extend_from_slice(&4395u16.to_le_bytes());
        expected.extend_from_slice(&5804u16.to_le_bytes());
        expected.extend_from_slice(&624u16.to_le_bytes());
        expected.extend_from_slice(&301u32.to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn dead_companion_without_seat() {
        let mut companion = Companion::new(EntityId(5), "Mira", CompanionTemplate::default());
        companion.alive = false;
        companion.pvp = PvpFlags::FFA_PVP;

        let stats = PartyMemberStats::from_companion(&companion);
        assert_eq!(
            stats.status,
            MemberStatus::ONLINE | MemberStatus::DEAD | MemberStatus::PVP_FFA
        );
        assert_eq!(stats.vehicle_seat, 0);
    }
}
