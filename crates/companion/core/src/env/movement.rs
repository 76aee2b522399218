use crate::state::{EntityId, Position};

/// Movement generator currently driving a companion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum MovementKind {
    #[default]
    Idle,
    /// Scripted waypoint path.
    Waypoint,
    Follow,
    Chase,
    Point,
    Home,
}

/// Outbound movement commands. Pathfinding and physics stay in the host.
///
/// Arrival at a point is reported back through
/// [`CompanionController::movement_inform`](crate::CompanionController::movement_inform).
pub trait MovementDriver {
    fn move_follow(&mut self, companion: EntityId, leader: EntityId, distance: f32, angle: f32);

    fn move_point(&mut self, companion: EntityId, point_id: u32, destination: Position);

    fn move_home(&mut self, companion: EntityId);

    fn move_chase(&mut self, companion: EntityId, target: EntityId);

    /// Drops every active generator and falls back to idle.
    fn clear(&mut self, companion: EntityId);

    fn stop(&mut self, companion: EntityId);

    fn current_kind(&self, companion: EntityId) -> MovementKind;
}
