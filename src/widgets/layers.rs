use bevy::prelude::*;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiLayer {
    Surface,  // The map itself: radar imagery and markers
    Controls, // Playback bar, scrubber, category toggles
    Panels,   // Floating info panels above everything interactive
    Debug,    // Debug readouts
}

#[derive(Resource, Default)]
pub struct UiLayerStack {
    pub stacks: HashMap<UiLayer, VecDeque<Entity>>,
}

impl UiLayerStack {
    pub fn recalculate_z_order(&self, layer: UiLayer, commands: &mut Commands) {
        if let Some(queue) = self.stacks.get(&layer) {
            let base = layer.base_z();
            for (i, &entity) in queue.iter().enumerate() {
                commands
                    .entity(entity)
                    .insert(GlobalZIndex(base + (i as i32) + 1));
            }
        }
    }

    pub fn push(&mut self, layer: UiLayer, entity: Entity, commands: &mut Commands) {
        let queue = self.stacks.entry(layer).or_default();
        let z_index = layer.base_z() + (queue.len() as i32) + 1;
        commands.entity(entity).insert(GlobalZIndex(z_index));
        queue.push_back(entity);
    }

    pub fn remove(&mut self, layer: UiLayer, entity: Entity, commands: &mut Commands) {
        if let Some(queue) = self.stacks.get_mut(&layer) {
            queue.retain(|&e| e != entity);
            self.recalculate_z_order(layer, commands);
        }
    }
}

impl UiLayer {
    pub fn base_z(self) -> i32 {
        match self {
            UiLayer::Surface => 0,
            UiLayer::Controls => 10_000,
            UiLayer::Panels => 20_000,
            UiLayer::Debug => 30_000,
        }
    }
}
