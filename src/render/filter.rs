//! Which scene objects occlude visibility during cubemap captures.

use std::collections::HashSet;

use hecs::{Entity, World};

/// Kind of renderable attached to a scene entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderObjectKind {
    Mesh,
    Landscape,
    SpeedTree,
    Sprite,
    Vegetation,
    ParticleEmitter,
}

/// Renderable component
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderObject {
    pub kind: RenderObjectKind,
    /// Active switch state (0 = intact)
    pub switch_index: u32,
    /// Highest switch state; 0 for objects without switches
    pub max_switch_index: u32,
}

impl RenderObject {
    pub fn new(kind: RenderObjectKind) -> Self {
        Self {
            kind,
            switch_index: 0,
            max_switch_index: 0,
        }
    }

    /// Switch object currently showing a destroyed state
    pub fn is_crashed(&self) -> bool {
        self.max_switch_index > 0 && self.switch_index > 0
    }
}

/// Level-editor collision classes, stored as integers in custom properties
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum CollisionType {
    NoCollision = 0,
    Tree = 1,
    Bush = 2,
    FragileProjectile = 3,
    FragileProjectileInvisible = 4,
    Falling = 5,
    Building = 6,
    InvisibleWall = 7,
    SpeedTree = 8,
}

impl CollisionType {
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            0 => Self::NoCollision,
            1 => Self::Tree,
            2 => Self::Bush,
            3 => Self::FragileProjectile,
            4 => Self::FragileProjectileInvisible,
            5 => Self::Falling,
            6 => Self::Building,
            7 => Self::InvisibleWall,
            8 => Self::SpeedTree,
            _ => return None,
        })
    }

    /// Whether objects of this class block line of sight
    pub fn blocks_visibility(self) -> bool {
        !matches!(
            self,
            Self::NoCollision
                | Self::Tree
                | Self::Bush
                | Self::Falling
                | Self::FragileProjectileInvisible
                | Self::SpeedTree
        )
    }
}

/// Editor custom properties relevant to visibility
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionProperties {
    /// `CollisionType` property
    pub collision_type: Option<i32>,
    /// `CollisionTypeCrashed` property, used while a switch object is destroyed
    pub collision_type_crashed: Option<i32>,
}

/// Decide whether a render object participates in visibility captures.
///
/// Landscapes always do. Foliage, sprites and particles never do. Anything
/// else must be a registered entity whose collision class blocks sight.
pub fn should_draw_render_object(world: &World, registered: &HashSet<Entity>, entity: Entity) -> bool {
    let Ok(object) = world.get::<&RenderObject>(entity) else {
        return false;
    };

    match object.kind {
        RenderObjectKind::Landscape => return true,
        RenderObjectKind::SpeedTree
        | RenderObjectKind::Sprite
        | RenderObjectKind::Vegetation
        | RenderObjectKind::ParticleEmitter => return false,
        RenderObjectKind::Mesh => {}
    }

    if !registered.contains(&entity) {
        return false;
    }

    let Ok(properties) = world.get::<&CollisionProperties>(entity) else {
        return false;
    };
    let value = if object.is_crashed() {
        properties.collision_type_crashed
    } else {
        properties.collision_type
    };

    value
        .and_then(CollisionType::from_i32)
        .is_some_and(CollisionType::blocks_visibility)
}
