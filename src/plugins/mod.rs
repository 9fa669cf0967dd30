//! Feature plugins.

use bevy::prelude::*;

pub mod assets;
pub mod core;
pub mod enemies;
pub mod events;
pub mod hazards;
pub mod hud;
pub mod persistence;
pub mod pickups;
pub mod player;
pub mod projectiles;
pub mod spatial;
pub mod world;

// Render-only
pub mod camera;
pub mod input;
pub mod lighting;
pub mod render;

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    events::plugin(app);
    camera::plugin(app);
    world::plugin(app);
    player::plugin(app);
    enemies::plugin(app);
    projectiles::plugin(app);
    hazards::plugin(app);
    pickups::plugin(app);
    hud::plugin(app);
    persistence::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::render_plugin(app);
    render::plugin(app);
    lighting::plugin(app);
    input::plugin(app);
}

/// Register all plugins (full app).
pub fn register_all(app: &mut App) {
    register_gameplay(app);
    register_render(app);
}
