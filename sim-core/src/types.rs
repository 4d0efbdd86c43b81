use glam::Vec2;

/// Identifier for an entity within one simulation scene.
///
/// Ids are only meaningful inside the collection that owns the entity;
/// they double as palette indices and as the source of a boid's
/// sub-population type.
pub type AgentId = usize;

/// Raw display color. Mapping physical quantities (pressure, speed) to
/// colors is the renderer's job; the core only carries this value.
pub type Rgb = [u8; 3];

/// Read-only view of an entity that a renderer needs to draw it.
pub trait Sprite {
    fn pos(&self) -> Vec2;
    fn radius(&self) -> f32;
    fn color(&self) -> Rgb;
}
