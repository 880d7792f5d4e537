//! Entity registry
//!
//! Owns every pooled entity for its whole lifetime. Destruction only clears
//! the active flag; the slot is physically removed by [`Registry::compact`]
//! at the end of a tick, so a destroy issued mid-iteration never shifts the
//! entities still being visited.

use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity, EntityId, EntityKind, Variant};

const POOL_COUNT: usize = EntityKind::POOLED.len();

fn pool_index(kind: EntityKind) -> Option<usize> {
    match kind {
        EntityKind::Projectile => Some(0),
        EntityKind::Hostile => Some(1),
        EntityKind::Hazard => Some(2),
        EntityKind::Player | EntityKind::Singularity => None,
    }
}

/// Per-kind entity pools, each sorted by serial
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    pools: [Vec<Entity>; POOL_COUNT],
    next_serial: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new active entity; its kind follows from the variant
    pub fn spawn(&mut self, variant: Variant, body: Body) -> EntityId {
        let kind = variant.kind();
        let id = EntityId {
            kind,
            serial: self.next_serial,
        };
        self.next_serial += 1;

        let mut body = body;
        body.active = true;
        // Serials only grow, so pushing keeps the pool sorted
        if let Some(pool) = pool_index(kind).map(|i| &mut self.pools[i]) {
            pool.push(Entity { id, body, variant });
        }
        id
    }

    fn pool(&self, kind: EntityKind) -> &[Entity] {
        match pool_index(kind) {
            Some(i) => &self.pools[i],
            None => &[],
        }
    }

    fn pool_mut(&mut self, kind: EntityKind) -> Option<&mut Vec<Entity>> {
        pool_index(kind).map(|i| &mut self.pools[i])
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let pool = self.pool(id.kind);
        pool.binary_search_by_key(&id.serial, |e| e.id.serial)
            .ok()
            .map(|i| &pool[i])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let pool = self.pool_mut(id.kind)?;
        let idx = pool.binary_search_by_key(&id.serial, |e| e.id.serial).ok()?;
        Some(&mut pool[idx])
    }

    pub fn is_active(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(Entity::is_active)
    }

    /// Mark an entity inactive. Returns false if it was already inactive or
    /// unknown, in which case nothing changes.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(entity) if entity.body.active => {
                entity.body.active = false;
                true
            }
            _ => false,
        }
    }

    /// Active entities of one kind, in spawn order
    pub fn iter_active(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.pool(kind).iter().filter(|e| e.body.active)
    }

    pub fn for_each_active(&self, kind: EntityKind, mut f: impl FnMut(&Entity)) {
        for entity in self.iter_active(kind) {
            f(entity);
        }
    }

    /// Visit active entities mutably. Clearing `body.active` inside `f`
    /// destroys the entity without disturbing the iteration.
    pub fn for_each_active_mut(&mut self, kind: EntityKind, mut f: impl FnMut(&mut Entity)) {
        if let Some(pool) = self.pool_mut(kind) {
            for entity in pool.iter_mut().filter(|e| e.body.active) {
                f(entity);
            }
        }
    }

    pub fn active_count(&self, kind: EntityKind) -> usize {
        self.iter_active(kind).count()
    }

    /// Active entities across all pools
    pub fn total_active(&self) -> usize {
        EntityKind::POOLED
            .iter()
            .map(|&kind| self.active_count(kind))
            .sum()
    }

    /// Physically drop destroyed entities. Returns how many were removed.
    pub fn compact(&mut self) -> usize {
        let mut removed = 0;
        for pool in &mut self.pools {
            let before = pool.len();
            pool.retain(|e| e.body.active);
            removed += before - pool.len();
        }
        removed
    }
}
