//! Entity store for the reference world.
//!
//! The Arena provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - Spatial indexing for proximity queries
//! - Entity lifecycle management (spawn/despawn)
//! - Temporary checkout of one entity (`take`/`restore`) so it can run a
//!   callback against the rest of the world
//!
//! # Spatial Index Synchronization
//!
//! The spatial index is not updated when an entity moves through
//! `get_mut()`. Call `update_spatial(id)` afterward. Spawn, despawn and
//! restore keep the index in sync on their own.
//!
//! ```
//! # use tankbattle_core::arena::Arena;
//! # use tankbattle_core::config::{Placement, TankConfig};
//! # use tankbattle_core::entity::EntityInner;
//! # use tankbattle_core::player::PlayerTank;
//! # use glam::Vec3;
//! # let mut arena = Arena::new();
//! # let id = arena.spawn(EntityInner::PlayerTank(PlayerTank::new(TankConfig::default(), Placement::default())));
//! if let Some(tank) = arena.get_mut(id).and_then(|entity| entity.tank_mut()) {
//!     tank.set_position(Vec3::new(500.0, 500.0, 0.0));
//! }
//! // sync the index after a position change
//! arena.update_spatial(id);
//! ```

use std::collections::{BTreeMap, HashMap};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityInner};

// =============================================================================
// Spatial Index
// =============================================================================

/// Position index for proximity queries.
///
/// A flat `HashMap` scan. Query results are sorted by id, so the map's
/// iteration order never leaks into simulation state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialIndex {
    positions: HashMap<EntityId, Vec3>,
}

impl SpatialIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
        }
    }

    /// Inserts or replaces an entity's position.
    pub fn insert(&mut self, id: EntityId, pos: Vec3) {
        self.positions.insert(id, pos);
    }

    /// Removes an entity.
    pub fn remove(&mut self, id: EntityId) {
        self.positions.remove(&id);
    }

    /// Indexed position of an entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<Vec3> {
        self.positions.get(&id).copied()
    }

    /// Entities within `radius` of `center`, sorted by id.
    #[must_use]
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        let mut results: Vec<EntityId> = self
            .positions
            .iter()
            .filter(|(_, pos)| center.distance_squared(**pos) <= radius_sq)
            .map(|(id, _)| *id)
            .collect();

        results.sort();
        results
    }

    /// Number of indexed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Container for every live entity.
///
/// Ids are assigned monotonically and never reused, and the `BTreeMap`
/// keeps iteration in id order.
///
/// ```
/// use tankbattle_core::arena::Arena;
/// use tankbattle_core::config::ObstacleConfig;
/// use tankbattle_core::entity::EntityInner;
/// use tankbattle_core::obstacle::Obstacle;
/// use glam::Vec3;
///
/// let mut arena = Arena::new();
/// let a = arena.spawn(EntityInner::Obstacle(Obstacle::new(ObstacleConfig::default(), Vec3::ZERO)));
/// let b = arena.spawn(EntityInner::Obstacle(Obstacle::new(ObstacleConfig::default(), Vec3::X)));
///
/// let ids: Vec<_> = arena.entity_ids_sorted().collect();
/// assert_eq!(ids, vec![a, b]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
    spatial: SpatialIndex,
    tick: u64,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    /// Creates an empty arena at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entities: BTreeMap::new(),
            spatial: SpatialIndex::new(),
            tick: 0,
        }
    }

    /// Adds an entity and returns its new id.
    pub fn spawn(&mut self, inner: EntityInner) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        let entity = Entity::new(id, inner);
        self.spatial.insert(id, entity.position());
        self.entities.insert(id, entity);
        id
    }

    /// Removes an entity and returns it, if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.spatial.remove(id);
        self.entities.remove(&id)
    }

    /// Checks an entity out of storage.
    ///
    /// While taken, `get` does not see it but its last indexed position
    /// stays in the spatial index. Hand it back with [`Arena::restore`].
    pub fn take(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Returns a taken entity and re-indexes its position.
    pub fn restore(&mut self, entity: Entity) {
        let id = entity.id();
        self.spatial.insert(id, entity.position());
        self.entities.insert(id, entity);
    }

    /// Entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable entity by id.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Entity ids in ascending order.
    pub fn entity_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Entities in ascending id order.
    pub fn entities_sorted(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Number of stored entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The spatial index.
    #[must_use]
    pub const fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Current simulation tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    /// Re-indexes an entity after its position changed.
    pub fn update_spatial(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get(&id) {
            self.spatial.insert(id, entity.position());
        }
    }
}
