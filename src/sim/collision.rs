//! Collision detection and response
//!
//! Everything collides as a circle. Pair rules are data: each names two
//! groups and the effect of an overlap between them. Rules run in order,
//! once per tick, against post-move positions.

use glam::Vec2;

use super::entity::{Body, EntityId, EntityKind};
use super::registry::Registry;

/// What happens when two groups overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Destroy both entities and award a point
    DestroyBothAndScore,
    /// Destroy the second entity only
    DestroySecond,
    /// End the session
    GameOver,
}

/// An overlap rule between two groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionRule {
    pub a: EntityKind,
    pub b: EntityKind,
    pub effect: Effect,
}

impl CollisionRule {
    pub const fn new(a: EntityKind, b: EntityKind, effect: Effect) -> Self {
        Self { a, b, effect }
    }
}

/// Standard rule table
pub const DEFAULT_RULES: [CollisionRule; 5] = [
    CollisionRule::new(EntityKind::Projectile, EntityKind::Hostile, Effect::DestroyBothAndScore),
    CollisionRule::new(EntityKind::Player, EntityKind::Hazard, Effect::GameOver),
    CollisionRule::new(EntityKind::Singularity, EntityKind::Hostile, Effect::DestroySecond),
    CollisionRule::new(EntityKind::Singularity, EntityKind::Hazard, Effect::DestroySecond),
    CollisionRule::new(EntityKind::Player, EntityKind::Singularity, Effect::GameOver),
];

/// Result of one resolved overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Both destroyed, one point scored
    Scored { a: EntityId, b: EntityId },
    /// `id` destroyed by contact with a member of `by`
    Destroyed { id: EntityId, by: EntityKind },
    /// Session-ending contact
    GameOver { cause: EntityKind },
}

/// Circle-circle overlap: centers closer than the sum of the radii
#[inline]
pub fn circles_overlap(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a_pos.distance_squared(b_pos) < reach * reach
}

/// Positional snapshot of one group member
#[derive(Debug, Clone, Copy)]
struct Collider {
    id: Option<EntityId>,
    pos: Vec2,
    radius: f32,
}

/// The singleton bodies that take part in collisions
#[derive(Debug, Clone, Copy)]
pub struct Singletons<'a> {
    pub player: &'a Body,
    pub singularity: &'a Body,
}

fn gather(kind: EntityKind, registry: &Registry, singletons: &Singletons) -> Vec<Collider> {
    let single = |body: &Body| -> Vec<Collider> {
        body.active
            .then(|| Collider {
                id: None,
                pos: body.pos,
                radius: body.radius,
            })
            .into_iter()
            .collect()
    };
    match kind {
        EntityKind::Player => single(singletons.player),
        EntityKind::Singularity => single(singletons.singularity),
        _ => registry
            .iter_active(kind)
            .map(|e| Collider {
                id: Some(e.id),
                pos: e.body.pos,
                radius: e.body.radius,
            })
            .collect(),
    }
}

fn still_active(collider: &Collider, registry: &Registry) -> bool {
    collider.id.is_none_or(|id| registry.is_active(id))
}

/// Run every rule once and apply its effects.
///
/// Destroys are idempotent and checked before each pair, so an entity
/// matched by several pairs (or several rules) is destroyed and scored at
/// most once.
pub fn resolve(
    registry: &mut Registry,
    singletons: &Singletons,
    rules: &[CollisionRule],
) -> Vec<Contact> {
    let mut contacts = Vec::new();

    for rule in rules {
        let group_a = gather(rule.a, registry, singletons);
        let group_b = gather(rule.b, registry, singletons);

        'outer: for a in &group_a {
            for b in &group_b {
                if !still_active(a, registry) {
                    continue 'outer;
                }
                if !still_active(b, registry)
                    || !circles_overlap(a.pos, a.radius, b.pos, b.radius)
                {
                    continue;
                }

                match rule.effect {
                    Effect::DestroyBothAndScore => {
                        let a_gone = a.id.is_some_and(|id| registry.destroy(id));
                        let b_gone = b.id.is_some_and(|id| registry.destroy(id));
                        match (a.id, b.id) {
                            (Some(a_id), Some(b_id)) if a_gone && b_gone => {
                                contacts.push(Contact::Scored { a: a_id, b: b_id });
                            }
                            _ => {
                                if let Some(id) = a.id.filter(|_| a_gone) {
                                    contacts.push(Contact::Destroyed { id, by: rule.b });
                                }
                                if let Some(id) = b.id.filter(|_| b_gone) {
                                    contacts.push(Contact::Destroyed { id, by: rule.a });
                                }
                            }
                        }
                    }
                    Effect::DestroySecond => {
                        if let Some(id) = b.id {
                            if registry.destroy(id) {
                                contacts.push(Contact::Destroyed { id, by: rule.a });
                            }
                        }
                    }
                    Effect::GameOver => {
                        let cause = if rule.a == EntityKind::Player { rule.b } else { rule.a };
                        contacts.push(Contact::GameOver { cause });
                        // One fatal contact per rule is enough
                        break 'outer;
                    }
                }
            }
        }
    }

    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Variant;

    struct Scene {
        registry: Registry,
        player: Body,
        singularity: Body,
    }

    impl Scene {
        fn new() -> Self {
            Self {
                registry: Registry::new(),
                player: Body::new(Vec2::new(400.0, 600.0), 20.0),
                singularity: Body::new(Vec2::new(400.0, 300.0), 40.0),
            }
        }

        fn spawn(&mut self, variant: Variant, pos: Vec2, radius: f32) -> EntityId {
            self.registry.spawn(variant, Body::new(pos, radius))
        }

        fn resolve(&mut self) -> Vec<Contact> {
            let singletons = Singletons {
                player: &self.player,
                singularity: &self.singularity,
            };
            resolve(&mut self.registry, &singletons, &DEFAULT_RULES)
        }
    }

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(circles_overlap(Vec2::ONE, 0.5, Vec2::ONE, 0.5));
    }

    #[test]
    fn test_projectile_hits_hostile() {
        let mut scene = Scene::new();
        let shot = scene.spawn(Variant::Projectile { ttl: 2.0 }, Vec2::new(100.0, 100.0), 4.0);
        let hostile = scene.spawn(Variant::Hostile { scale: 0.8 }, Vec2::new(105.0, 100.0), 19.0);

        let contacts = scene.resolve();

        assert_eq!(contacts, vec![Contact::Scored { a: shot, b: hostile }]);
        assert!(!scene.registry.is_active(shot));
        assert!(!scene.registry.is_active(hostile));
    }

    #[test]
    fn test_two_hostiles_on_one_projectile_score_once() {
        let mut scene = Scene::new();
        let pos = Vec2::new(100.0, 100.0);
        let shot = scene.spawn(Variant::Projectile { ttl: 2.0 }, pos, 4.0);
        let first = scene.spawn(Variant::Hostile { scale: 0.8 }, pos, 19.0);
        let second = scene.spawn(Variant::Hostile { scale: 0.8 }, pos, 19.0);

        let contacts = scene.resolve();

        let scored = contacts
            .iter()
            .filter(|c| matches!(c, Contact::Scored { .. }))
            .count();
        assert_eq!(scored, 1);
        assert_eq!(contacts[0], Contact::Scored { a: shot, b: first });
        assert!(!scene.registry.is_active(first));
        assert!(scene.registry.is_active(second));
    }

    #[test]
    fn test_two_projectiles_on_one_hostile_score_once() {
        let mut scene = Scene::new();
        let pos = Vec2::new(100.0, 100.0);
        scene.spawn(Variant::Projectile { ttl: 2.0 }, pos, 4.0);
        let spare = scene.spawn(Variant::Projectile { ttl: 2.0 }, pos, 4.0);
        scene.spawn(Variant::Hostile { scale: 0.8 }, pos, 19.0);

        let contacts = scene.resolve();

        assert_eq!(contacts.len(), 1);
        assert!(scene.registry.is_active(spare));
    }

    #[test]
    fn test_player_hits_hazard() {
        let mut scene = Scene::new();
        scene.spawn(Variant::Hazard { scale: 0.5 }, Vec2::new(400.0, 590.0), 19.0);
        assert_eq!(
            scene.resolve(),
            vec![Contact::GameOver { cause: EntityKind::Hazard }]
        );
    }

    #[test]
    fn test_player_hits_singularity() {
        let mut scene = Scene::new();
        scene.player.pos = Vec2::new(400.0, 330.0);
        assert_eq!(
            scene.resolve(),
            vec![Contact::GameOver { cause: EntityKind::Singularity }]
        );
    }

    #[test]
    fn test_singularity_swallows_hostile_and_hazard() {
        let mut scene = Scene::new();
        let hostile = scene.spawn(Variant::Hostile { scale: 0.8 }, Vec2::new(430.0, 300.0), 19.0);
        let hazard = scene.spawn(Variant::Hazard { scale: 0.5 }, Vec2::new(400.0, 270.0), 19.0);
        let shot = scene.spawn(Variant::Projectile { ttl: 2.0 }, Vec2::new(400.0, 300.0), 4.0);

        let contacts = scene.resolve();

        assert_eq!(
            contacts,
            vec![
                Contact::Destroyed { id: hostile, by: EntityKind::Singularity },
                Contact::Destroyed { id: hazard, by: EntityKind::Singularity },
            ]
        );
        // No rule pairs projectiles with the singularity
        assert!(scene.registry.is_active(shot));
    }

    #[test]
    fn test_inactive_entities_never_collide() {
        let mut scene = Scene::new();
        let hazard = scene.spawn(Variant::Hazard { scale: 0.5 }, Vec2::new(400.0, 600.0), 19.0);
        scene.registry.destroy(hazard);
        assert!(scene.resolve().is_empty());
    }

    #[test]
    fn test_scored_hostile_not_swallowed_twice() {
        let mut scene = Scene::new();
        let pos = Vec2::new(400.0, 300.0);
        scene.spawn(Variant::Projectile { ttl: 2.0 }, pos, 4.0);
        let hostile = scene.spawn(Variant::Hostile { scale: 0.8 }, pos, 19.0);

        let contacts = scene.resolve();

        assert_eq!(contacts.len(), 1);
        assert!(matches!(contacts[0], Contact::Scored { b, .. } if b == hostile));
    }
}
