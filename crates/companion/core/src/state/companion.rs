//! The controlled entity as seen by its controller.
//!
//! The host simulation owns every [`Companion`]; the controller only borrows
//! one for the duration of a call. Fields mirror what the host keeps on the
//! unit: identity, resources, flags and the regeneration modifiers that are
//! currently applied by effects.

use bitflags::bitflags;

use super::common::{EntityId, Position, ResourceMeter};

bitflags! {
    /// Transient unit states owned by the movement and combat layers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct UnitStateFlags: u32 {
        const STUNNED    = 1 << 3;
        const FOLLOW     = 1 << 4;
        const DISTRACTED = 1 << 19;
    }
}

bitflags! {
    /// Interaction flags an idle, unhired companion exposes to players.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct NpcFlags: u32 {
        const GOSSIP     = 0x0000_0001;
        const QUESTGIVER = 0x0000_0002;
        const TRAINER    = 0x0000_0010;
        const VENDOR     = 0x0000_0080;
    }
}

bitflags! {
    /// Static flags from the companion's template.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TemplateFlags: u32 {
        /// Joins fights against anything attacking a player.
        const CAN_ASSIST = 0x0000_1000;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PvpFlags: u8 {
        const PVP     = 1 << 0;
        const FFA_PVP = 1 << 1;
    }
}

/// Power resource a unit spends. Discriminants match the wire encoding.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(u8)]
pub enum PowerKind {
    #[default]
    Mana = 0,
    Rage = 1,
    Focus = 2,
    Energy = 3,
}

impl PowerKind {
    pub const COUNT: usize = 4;

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

/// How the last power change was made visible to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerSync {
    /// Full write: observers are notified and dependent state recomputed.
    Authoritative,
    /// Value-only write: the stored value changes but no notification is sent.
    ValueOnly,
}

/// Template data the companion was spawned from.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompanionTemplate {
    pub entry: u32,
    pub faction: u32,
    pub flags: TemplateFlags,
}

/// Regeneration-relevant effects currently applied to the companion.
///
/// Percentage lists hold one value per active effect; they are applied in
/// order, each compounding on the running total.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegenModifiers {
    pub polymorphed: bool,
    /// Base health regeneration override from effects; ignored unless positive.
    pub base_regen: i32,
    /// Out-of-combat health regeneration percentages.
    pub health_regen_pct: Vec<i32>,
    /// Flat health regeneration per 5 seconds.
    pub mod_regen: i32,
    /// Percentage of normal health regeneration kept while engaged.
    pub regen_during_combat_pct: Option<i32>,
    /// Flat health regeneration that also applies while engaged.
    pub health_regen_in_combat: Option<i32>,
    /// Power regeneration percentages keyed by the power they affect.
    pub power_regen_pct: Vec<(PowerKind, i32)>,
}

impl RegenModifiers {
    /// True if any effect allows health regeneration while engaged.
    pub fn allows_combat_regen(&self) -> bool {
        self.regen_during_combat_pct.is_some() || self.health_regen_in_combat.is_some()
    }
}

/// Mana regeneration rates maintained by the host's stat system.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManaRegen {
    /// Mana per second under normal regeneration.
    pub flat: f32,
    /// Mana per second while a recent mana spend suppresses normal regeneration.
    pub interrupted_flat: f32,
    /// True while the last mana spend still suppresses normal regeneration.
    pub recently_spent: bool,
}

/// Vehicle seat the companion currently occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleSeat {
    pub seat_id: u32,
    pub can_attack: bool,
}

/// A companion unit owned by the host simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Companion {
    pub id: EntityId,
    pub name: String,
    pub template: CompanionTemplate,
    pub level: u8,
    pub faction: u32,
    pub position: Position,
    pub zone: u16,
    pub health: ResourceMeter,
    /// Health at creation for the current level, before modifiers.
    pub create_health: u32,
    pub power_type: PowerKind,
    powers: [ResourceMeter; PowerKind::COUNT],
    last_power_sync: Option<(PowerKind, PowerSync)>,
    pub alive: bool,
    pub in_world: bool,
    pub victim: Option<EntityId>,
    pub unit_state: UnitStateFlags,
    pub npc_flags: NpcFlags,
    pub pvp: PvpFlags,
    pub vehicle: Option<VehicleSeat>,
    /// Set while a player controls the companion through ownership.
    pub player_controlled: bool,
    pub loot_recipient: Option<EntityId>,
    pub regen_modifiers: RegenModifiers,
    pub mana_regen: ManaRegen,
}

impl Companion {
    pub fn new(id: EntityId, name: impl Into<String>, template: CompanionTemplate) -> Self {
        Self {
            id,
            name: name.into(),
            faction: template.faction,
            template,
            level: 1,
            position: Position::default(),
            zone: 0,
            health: ResourceMeter::full(1),
            create_health: 1,
            power_type: PowerKind::Mana,
            powers: [ResourceMeter::default(); PowerKind::COUNT],
            last_power_sync: None,
            alive: true,
            in_world: true,
            victim: None,
            unit_state: UnitStateFlags::empty(),
            npc_flags: NpcFlags::GOSSIP,
            pvp: PvpFlags::empty(),
            vehicle: None,
            player_controlled: false,
            loot_recipient: None,
            regen_modifiers: RegenModifiers::default(),
            mana_regen: ManaRegen::default(),
        }
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_health(mut self, health: ResourceMeter) -> Self {
        self.health = health;
        self.create_health = health.maximum;
        self
    }

    pub fn with_power(mut self, kind: PowerKind, meter: ResourceMeter) -> Self {
        self.power_type = kind;
        self.powers[kind.index()] = meter;
        self
    }

    pub fn power(&self, kind: PowerKind) -> ResourceMeter {
        self.powers[kind.index()]
    }

    /// Meter of the power the companion actually uses.
    pub fn current_power(&self) -> ResourceMeter {
        self.power(self.power_type)
    }

    pub fn set_max_power(&mut self, kind: PowerKind, maximum: u32) {
        let meter = &mut self.powers[kind.index()];
        meter.maximum = maximum;
        meter.current = meter.current.min(maximum);
    }

    /// Authoritative power write.
    pub fn set_power(&mut self, kind: PowerKind, value: u32) {
        self.powers[kind.index()].set(value);
        self.last_power_sync = Some((kind, PowerSync::Authoritative));
    }

    /// Value-only power write; the stored value stays authoritative for later reads.
    pub fn update_power_value(&mut self, kind: PowerKind, value: u32) {
        self.powers[kind.index()].set(value);
        self.last_power_sync = Some((kind, PowerSync::ValueOnly));
    }

    /// Adds power with an authoritative write. Returns the amount gained.
    pub fn modify_power(&mut self, kind: PowerKind, amount: u32) -> u32 {
        let gained = self.powers[kind.index()].gain(amount);
        self.last_power_sync = Some((kind, PowerSync::Authoritative));
        gained
    }

    /// How the most recent power change was written, if any.
    pub fn last_power_sync(&self) -> Option<(PowerKind, PowerSync)> {
        self.last_power_sync
    }

    /// Adds health, clamped at the maximum. Returns the amount gained.
    pub fn modify_health(&mut self, amount: u32) -> u32 {
        self.health.gain(amount)
    }

    pub fn is_stunned(&self) -> bool {
        self.unit_state.contains(UnitStateFlags::STUNNED)
    }

    pub fn can_assist(&self) -> bool {
        self.template.flags.contains(TemplateFlags::CAN_ASSIST)
    }

    /// True unless the companion sits in a vehicle seat that forbids attacking.
    pub fn can_attack_on_vehicle(&self) -> bool {
        self.vehicle.is_none_or(|seat| seat.can_attack)
    }

    /// Drops every applied effect.
    pub fn clear_effects(&mut self) {
        self.regen_modifiers = RegenModifiers::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_writes_record_their_sync_kind() {
        let mut companion = Companion::new(EntityId(7), "Rook", CompanionTemplate::default())
            .with_power(PowerKind::Energy, ResourceMeter::new(10, 100));

        companion.update_power_value(PowerKind::Energy, 20);
        assert_eq!(
            companion.last_power_sync(),
            Some((PowerKind::Energy, PowerSync::ValueOnly))
        );
        assert_eq!(companion.current_power().current, 20);

        companion.set_power(PowerKind::Energy, 150);
        assert_eq!(companion.current_power().current, 100);
        assert_eq!(
            companion.last_power_sync(),
            Some((PowerKind::Energy, PowerSync::Authoritative))
        );
    }

    #[test]
    fn vehicle_seat_can_forbid_attacking() {
        let mut companion = Companion::new(EntityId(7), "Rook", CompanionTemplate::default());
        assert!(companion.can_attack_on_vehicle());

        companion.vehicle = Some(VehicleSeat {
            seat_id: 12,
            can_attack: false,
        });
        assert!(!companion.can_attack_on_vehicle());
    }
}
