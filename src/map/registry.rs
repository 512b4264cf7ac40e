use bevy::prelude::*;
use std::collections::HashMap;

use crate::data::LayerKind;

/// Every entity the synchronizer has put on the map, by layer and stable id.
/// Reconciliation diffs desired state against this, so unchanged markers are
/// never torn down and respawned.
#[derive(Resource, Default)]
pub struct LayerRegistry {
    layers: HashMap<LayerKind, HashMap<String, Entity>>,
}

impl LayerRegistry {
    /// Diffs `desired` ids against the rendered set for one layer. Returns the
    /// entities to despawn (removed from the registry already) and the ids the
    /// caller still has to spawn and `insert`. Ids present on both sides are
    /// left alone.
    pub fn reconcile(
        &mut self,
        kind: LayerKind,
        desired: &[String],
    ) -> (Vec<Entity>, Vec<String>) {
        let rendered = self.layers.entry(kind).or_default();

        let mut to_despawn = Vec::new();
        rendered.retain(|id, entity| {
            if desired.iter().any(|d| d == id) {
                true
            } else {
                to_despawn.push(*entity);
                false
            }
        });

        let to_add = desired
            .iter()
            .filter(|id| !rendered.contains_key(*id))
            .cloned()
            .collect();

        (to_despawn, to_add)
    }

    pub fn insert(&mut self, kind: LayerKind, id: String, entity: Entity) {
        self.layers.entry(kind).or_default().insert(id, entity);
    }

    pub fn get(&self, kind: LayerKind, id: &str) -> Option<Entity> {
        self.layers.get(&kind).and_then(|layer| layer.get(id)).copied()
    }

    pub fn count(&self, kind: LayerKind) -> usize {
        self.layers.get(&kind).map_or(0, HashMap::len)
    }

    /// Empties every layer, handing back all entities for despawning. Used on
    /// teardown so a remount starts from a clean slate.
    pub fn drain_all(&mut self) -> Vec<Entity> {
        self.layers
            .drain()
            .flat_map(|(_, layer)| layer.into_values().collect::<Vec<_>>())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn reconcile_is_idempotent_for_unchanged_input() {
        let mut world = World::new();
        let mut registry = LayerRegistry::default();
        let desired = ids(&["KTLX", "KFWS", "KAMA"]);

        let (despawn, add) = registry.reconcile(LayerKind::Stations, &desired);
        assert!(despawn.is_empty());
        assert_eq!(add.len(), 3);
        for id in &add {
            registry.insert(LayerKind::Stations, id.clone(), world.spawn_empty().id());
        }

        let (despawn, add) = registry.reconcile(LayerKind::Stations, &desired);
        assert!(despawn.is_empty());
        assert!(add.is_empty());
        assert_eq!(registry.count(LayerKind::Stations), 3);
    }

    #[test]
    fn overlapping_update_keeps_surviving_entities() {
        let mut world = World::new();
        let mut registry = LayerRegistry::default();

        let first = ids(&["a", "b", "c", "d", "e"]);
        let (_, add) = registry.reconcile(LayerKind::StormCells, &first);
        for id in add {
            registry.insert(LayerKind::StormCells, id, world.spawn_empty().id());
        }
        let kept_before: Vec<Entity> = ["b", "c", "d"]
            .iter()
            .map(|id| registry.get(LayerKind::StormCells, id).unwrap())
            .collect();

        let second = ids(&["b", "c", "d", "f", "g"]);
        let (despawn, add) = registry.reconcile(LayerKind::StormCells, &second);
        assert_eq!(despawn.len(), 2);
        assert_eq!(add, ids(&["f", "g"]));

        let kept_after: Vec<Entity> = ["b", "c", "d"]
            .iter()
            .map(|id| registry.get(LayerKind::StormCells, id).unwrap())
            .collect();
        assert_eq!(kept_before, kept_after);
    }

    #[test]
    fn drain_all_returns_everything_once() {
        let mut world = World::new();
        let mut registry = LayerRegistry::default();
        registry.insert(LayerKind::Stations, "x".to_string(), world.spawn_empty().id());
        registry.insert(LayerKind::TornadoEvents, "y".to_string(), world.spawn_empty().id());

        assert_eq!(registry.drain_all().len(), 2);
        assert_eq!(registry.count(LayerKind::Stations), 0);
        assert!(registry.drain_all().is_empty());
    }
}
