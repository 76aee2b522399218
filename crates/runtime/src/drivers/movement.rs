use std::collections::HashMap;

use companion_core::{EntityId, MovementDriver, MovementKind, Position};

#[derive(Clone, Debug, PartialEq)]
pub enum MovementCommand {
    Follow {
        leader: EntityId,
        distance: f32,
        angle: f32,
    },
    Point {
        point_id: u32,
        destination: Position,
    },
    Home,
    Chase {
        target: EntityId,
    },
    Clear,
    Stop,
}

/// Records movement commands and answers `current_kind` from them.
///
/// Point moves complete instantly: they are queued as arrivals that the
/// runtime delivers at the start of the next tick.
#[derive(Clone, Debug, Default)]
pub struct MovementRecorder {
    active: HashMap<EntityId, MovementKind>,
    follow_targets: HashMap<EntityId, EntityId>,
    arrivals: Vec<(EntityId, u32, Position)>,
    log: Vec<(EntityId, MovementCommand)>,
}

impl MovementRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a companion on a scripted path or any other generator.
    pub fn set_kind(&mut self, companion: EntityId, kind: MovementKind) {
        self.active.insert(companion, kind);
    }

    /// Leader the companion is following, if its active generator is follow.
    pub fn follow_target(&self, companion: EntityId) -> Option<EntityId> {
        if self.current_kind(companion) != MovementKind::Follow {
            return None;
        }
        self.follow_targets.get(&companion).copied()
    }

    pub fn take_arrivals(&mut self) -> Vec<(EntityId, u32, Position)> {
        std::mem::take(&mut self.arrivals)
    }

    pub fn log(&self) -> &[(EntityId, MovementCommand)] {
        &self.log
    }

    /// Commands issued for one companion, oldest first.
    pub fn commands_for(&self, companion: EntityId) -> Vec<MovementCommand> {
        self.log
            .iter()
            .filter(|(id, _)| *id == companion)
            .map(|(_, command)| command.clone())
            .collect()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn forget(&mut self, companion: EntityId) {
        self.active.remove(&companion);
        self.follow_targets.remove(&companion);
        self.arrivals.retain(|(id, _, _)| *id != companion);
    }

    fn record(&mut self, companion: EntityId, kind: MovementKind, command: MovementCommand) {
        self.active.insert(companion, kind);
        self.log.push((companion, command));
    }
}

impl MovementDriver for MovementRecorder {
    fn move_follow(&mut self, companion: EntityId, leader: EntityId, distance: f32, angle: f32) {
        self.follow_targets.insert(companion, leader);
        self.record(
            companion,
            MovementKind::Follow,
            MovementCommand::Follow {
                leader,
                distance,
                angle,
            },
        );
    }

    fn move_point(&mut self, companion: EntityId, point_id: u32, destination: Position) {
        self.arrivals.push((companion, point_id, destination));
        self.record(
            companion,
            MovementKind::Point,
            MovementCommand::Point {
                point_id,
                destination,
            },
        );
    }

    fn move_home(&mut self, companion: EntityId) {
        self.record(companion, MovementKind::Home, MovementCommand::Home);
    }

    fn move_chase(&mut self, companion: EntityId, target: EntityId) {
        self.record(companion, MovementKind::Chase, MovementCommand::Chase { target });
    }

    fn clear(&mut self, companion: EntityId) {
        self.follow_targets.remove(&companion);
        self.arrivals.retain(|(id, _, _)| *id != companion);
        self.record(companion, MovementKind::Idle, MovementCommand::Clear);
    }

    fn stop(&mut self, companion: EntityId) {
        self.log.push((companion, MovementCommand::Stop));
    }

    fn current_kind(&self, companion: EntityId) -> MovementKind {
        self.active.get(&companion).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_cancels_pending_arrival_and_follow() {
        let mut movement = MovementRecorder::new();
        let id = EntityId(4);

        movement.move_follow(id, EntityId(1), 3.0, 0.0);
        assert_eq!(movement.follow_target(id), Some(EntityId(1)));

        movement.move_point(id, 7, Position::default());
        assert_eq!(movement.follow_target(id), None);

        movement.clear(id);
        assert!(movement.take_arrivals().is_empty());
        assert_eq!(movement.current_kind(id), MovementKind::Idle);
    }
}
