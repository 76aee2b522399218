use tracing::debug;

use super::CompanionController;
use crate::config::ControllerConfig;
use crate::env::{CompanionEnv, UnitInfo};
use crate::state::{Companion, EntityId, UnitStateFlags};

impl CompanionController {
    /// Engages `target`. Returns false if the combat driver refused.
    pub fn attack_start(
        &mut self,
        companion: &mut Companion,
        target: EntityId,
        env: &mut CompanionEnv<'_>,
    ) -> bool {
        if !env.combat().engage(companion, target) {
            return false;
        }

        companion.unit_state.remove(UnitStateFlags::FOLLOW);
        self.combat_start.get_or_insert(companion.position);
        if self.combat_movement {
            env.movement().move_chase(companion.id, target);
        }
        true
    }

    /// `who` came into view.
    pub fn move_in_line_of_sight(
        &mut self,
        companion: &mut Companion,
        who: &UnitInfo,
        env: &mut CompanionEnv<'_>,
    ) {
        if companion.victim.is_some() {
            return;
        }

        if !companion.is_stunned()
            && who.targetable
            && who.accessible
            && self.assist_player_in_combat(companion, who, env)
        {
            return;
        }

        if env.combat().can_start_attack(companion, who) {
            if companion.unit_state.contains(UnitStateFlags::DISTRACTED) {
                companion.unit_state.remove(UnitStateFlags::DISTRACTED);
                env.movement().clear(companion.id);
            }
            self.attack_start(companion, who.id, env);
        }
    }

    /// Joins a fight against `who` if it is attacking a player.
    ///
    /// Requires the template's assist flag, a player-controlled victim, a
    /// non-friendly `who`, and `who` within range and sight.
    pub fn assist_player_in_combat(
        &mut self,
        companion: &mut Companion,
        who: &UnitInfo,
        env: &mut CompanionEnv<'_>,
    ) -> bool {
        let Some(victim) = who.victim else {
            return false;
        };
        if !companion.can_assist() {
            return false;
        }

        let world = env.world();
        if !world.unit(victim).is_some_and(|unit| unit.player_controlled) {
            return false;
        }
        if world.is_friendly(companion.faction, who.faction) {
            return false;
        }
        if !who.is_within(&companion.position, self.config.max_leader_distance)
            || !world.in_line_of_sight(&companion.position, &who.position)
        {
            return false;
        }

        debug!(companion = %companion.id, attacker = %who.id, %victim, "assisting player");
        self.attack_start(companion, who.id, env);
        true
    }

    /// Leaves combat and heads back to where it started, or home when not
    /// following.
    pub fn evade(&mut self, companion: &mut Companion, env: &mut CompanionEnv<'_>) {
        companion.clear_effects();
        env.combat().disengage(companion);
        companion.loot_recipient = None;

        let combat_start = self.combat_start.take();
        if self.follow.in_progress() {
            let destination = combat_start.unwrap_or(companion.position);
            debug!(companion = %companion.id, "left combat, returning to combat start");
            env.movement().move_point(
                companion.id,
                ControllerConfig::POINT_COMBAT_START,
                destination,
            );
        } else {
            debug!(companion = %companion.id, "left combat, returning home");
            env.movement().move_home(companion.id);
        }

        env.combat().reset(companion);
    }
}
