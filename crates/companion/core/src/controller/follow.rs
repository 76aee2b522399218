use tracing::debug;

use super::CompanionController;
use crate::config::ControllerConfig;
use crate::env::{CompanionEnv, MovementKind, UnitInfo};
use crate::error::report;
use crate::packet::PartyMemberStats;
use crate::state::{Companion, EntityId, FollowError, NpcFlags, UnitStateFlags};

impl CompanionController {
    /// Starts following `leader`, optionally switching to `faction`.
    ///
    /// Rejected while already following. A scripted waypoint path is
    /// cancelled first.
    pub fn start_follow(
        &mut self,
        companion: &mut Companion,
        leader: EntityId,
        faction: Option<u32>,
        env: &mut CompanionEnv<'_>,
    ) -> Result<(), FollowError> {
        if self.follow.in_progress() {
            let err = FollowError::AlreadyFollowing;
            report(companion.id, &err);
            return Err(err);
        }
        if env.world().unit(leader).is_none() {
            let err = FollowError::LeaderNotFound(leader);
            report(companion.id, &err);
            return Err(err);
        }

        self.leader = Some(leader);
        if let Some(faction) = faction.filter(|&faction| faction != 0) {
            companion.faction = faction;
        }

        if env.movement().current_kind(companion.id) == MovementKind::Waypoint {
            env.movement().clear(companion.id);
            debug!(companion = %companion.id, "waypoint path cancelled for follow");
        }

        companion.npc_flags = NpcFlags::empty();
        self.follow.begin()?;
        self.follow_leader(companion, leader, env);
        debug!(companion = %companion.id, %leader, "start follow");
        Ok(())
    }

    /// Stops following: movement halts and the state becomes `COMPLETE`.
    pub fn set_follow_complete(&mut self, companion: &mut Companion, env: &mut CompanionEnv<'_>) {
        companion.unit_state.remove(UnitStateFlags::FOLLOW);
        env.movement().stop(companion.id);
        env.movement().clear(companion.id);
        self.follow.complete();
    }

    pub fn pause(&mut self) {
        self.follow.set_paused(true);
    }

    pub fn resume(&mut self) {
        self.follow.set_paused(false);
    }

    /// Arrival at a movement point.
    pub fn movement_inform(
        &mut self,
        companion: &mut Companion,
        kind: MovementKind,
        point_id: u32,
        env: &mut CompanionEnv<'_>,
    ) {
        if kind != MovementKind::Point || point_id != ControllerConfig::POINT_COMBAT_START {
            return;
        }

        if self.leader_for_follower(companion, env).is_some() {
            if !self.follow.is_paused() {
                self.follow.mark_returning();
            }
        } else {
            debug!(companion = %companion.id, "no leader after combat, stop follow");
            self.follow.complete();
        }
    }

    /// Resolves the leader to follow.
    ///
    /// A dead leader hands over to the first living player of its group
    /// within range, which becomes the stored leader.
    pub fn leader_for_follower(
        &mut self,
        companion: &Companion,
        env: &CompanionEnv<'_>,
    ) -> Option<UnitInfo> {
        let world = env.world();
        let leader = world.unit(self.leader?)?;
        if leader.alive {
            return Some(leader);
        }

        let range = self.config.max_leader_distance;
        let successor = world
            .group_members(leader.group?)
            .into_iter()
            .filter(|&id| id != companion.id)
            .filter_map(|id| world.unit(id))
            .find(|member| {
                member.is_player && member.alive && member.is_within(&companion.position, range)
            })?;

        debug!(
            companion = %companion.id,
            from = %leader.id,
            to = %successor.id,
            "leader died, following group member"
        );
        self.leader = Some(successor.id);
        Some(successor)
    }

    /// Periodic follower check.
    pub(super) fn update_follower(
        &mut self,
        companion: &mut Companion,
        elapsed_ms: u32,
        env: &mut CompanionEnv<'_>,
    ) {
        if self.follow.in_progress() && companion.victim.is_none() {
            if self.follower_timer_ms > elapsed_ms {
                self.follower_timer_ms -= elapsed_ms;
                return;
            }
            self.follower_timer_ms = self.config.follower_check_interval_ms;

            if let Some(leader) = self.leader_for_follower(companion, env) {
                if self.follow.clear_returning() {
                    debug!(companion = %companion.id, leader = %leader.id, "returning to leader");
                    self.follow_leader(companion, leader.id, env);
                    return;
                }
                if self.group_in_range(companion, &leader, env) {
                    return;
                }
            }

            report(companion.id, &FollowError::LeaderOutOfReach);
            self.dismiss(companion, env);
        } else if self.follow.is_complete() {
            debug!(companion = %companion.id, "follow complete, dismissing");
            self.dismiss(companion, env);
        }
    }

    /// True if the leader, or any player in the leader's group, is in range.
    fn group_in_range(
        &self,
        companion: &Companion,
        leader: &UnitInfo,
        env: &CompanionEnv<'_>,
    ) -> bool {
        let range = self.config.max_leader_distance;
        let Some(group) = leader.group else {
            return leader.is_within(&companion.position, range);
        };

        let world = env.world();
        world
            .group_members(group)
            .into_iter()
            .filter(|&id| id != companion.id)
            .filter_map(|id| world.unit(id))
            .any(|member| member.is_player && member.is_within(&companion.position, range))
    }

    fn follow_leader(
        &mut self,
        companion: &mut Companion,
        leader: EntityId,
        env: &mut CompanionEnv<'_>,
    ) {
        companion.unit_state.insert(UnitStateFlags::FOLLOW);
        env.movement().move_follow(
            companion.id,
            leader,
            self.config.follow_distance,
            self.config.follow_angle,
        );
    }

    /// Releases the companion. Only the first call has any effect.
    pub fn dismiss(&mut self, companion: &mut Companion, env: &mut CompanionEnv<'_>) -> bool {
        if self.dismissed {
            return false;
        }
        self.dismissed = true;

        self.set_follow_complete(companion, env);
        if !env.registry().dismiss(companion) {
            debug!(companion = %companion.id, "dismissed companion was not registered");
        }
        self.owner = None;
        debug!(companion = %companion.id, "dismissed");
        true
    }

    pub fn just_died(&mut self, companion: &mut Companion, env: &mut CompanionEnv<'_>) {
        if !self.follow.in_progress() || self.leader.is_none() {
            return;
        }

        if let Some(owner) = self.owner {
            let group = env.world().unit(owner).and_then(|unit| unit.group);
            if let Some(group) = group {
                if env.world().group_members(group).contains(&companion.id) {
                    env.broadcast().send_group_update(group);
                }
            }
        }
        self.dismiss(companion, env);
    }

    pub fn just_respawned(&mut self, companion: &mut Companion, env: &mut CompanionEnv<'_>) {
        self.follow.reset();
        self.combat_movement = true;
        self.combat_start = None;
        self.dismissed = false;
        companion.faction = companion.template.faction;
        env.combat().reset(companion);
    }

    /// Sends the member stats packet to the players in the owner's group.
    ///
    /// Returns the number of recipients.
    pub(super) fn broadcast_status(
        &self,
        companion: &Companion,
        env: &mut CompanionEnv<'_>,
    ) -> usize {
        if !companion.in_world {
            return 0;
        }
        let Some(group) = self
            .owner
            .and_then(|owner| env.world().unit(owner))
            .and_then(|owner| owner.group)
        else {
            return 0;
        };
        let members = env.world().group_members(group);
        if !members.contains(&companion.id) {
            return 0;
        }

        let world = env.world();
        let recipients: Vec<EntityId> = members
            .into_iter()
            .filter(|&id| id != companion.id)
            .filter(|&id| world.unit(id).is_some_and(|unit| unit.is_player))
            .collect();

        let stats = PartyMemberStats::from_companion(companion);
        for &member in &recipients {
            env.broadcast().send_member_stats(member, &stats);
        }
        recipients.len()
    }
}
