//! Camera plugin.
//!
//! The camera is not a render matrix: it is an eager world-to-screen transform. Every tick
//! it computes how far the player's centre drifted from the viewport centre, accumulates
//! that into [`CameraRig::offset`], and subtracts it from every live body. Stored
//! coordinates are therefore always camera-relative.
//!
//! ```text
//! delta  = player.center - viewport / 2
//! offset += delta            (read by streaming: cell crossing + materialise position)
//! body.pos -= delta          (every body, colliders and bus event positions included)
//! ```
//!
//! The render-only half spawns one static `Camera2d` looking at the viewport; it never
//! moves because the world moves instead.

use bevy::prelude::*;
use bevy_firefly::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::core::SimSet;
use crate::plugins::events::EventBus;
use crate::plugins::player::Player;
use crate::plugins::spatial::{Body, Collider};

/// Accumulated camera displacement since the current cell was entered.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub offset: Vec2,
}

#[derive(Component)]
pub struct MainCamera;

pub fn plugin(app: &mut App) {
    app.init_resource::<CameraRig>()
        .add_systems(Update, recenter_on_player.in_set(SimSet::Camera));
}

/// Render-only: the window camera. It outlives the run so the game-over banner stays visible.
pub fn render_plugin(app: &mut App) {
    app.add_systems(Startup, spawn_camera);
}

/// Displacement that brings `target` back to the viewport centre.
#[inline]
pub fn recenter_delta(target: &Body, viewport: Vec2) -> Vec2 {
    target.center() - viewport * 0.5
}

pub fn recenter_on_player(
    tunables: Res<Tunables>,
    mut rig: ResMut<CameraRig>,
    mut bus: ResMut<EventBus>,
    player: Option<Single<Entity, With<Player>>>,
    mut bodies: Query<(&mut Body, Option<&mut Collider>)>,
) {
    let Some(player) = player else {
        return;
    };
    let Ok((body, _)) = bodies.get(*player) else {
        return;
    };
    let delta = recenter_delta(body, tunables.viewport());
    if delta == Vec2::ZERO {
        return;
    }

    rig.offset += delta;
    for (mut body, collider) in &mut bodies {
        body.pos -= delta;
        if let Some(mut collider) = collider {
            let pos = body.pos;
            collider.place(pos);
        }
    }
    bus.translate(-delta);
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        MainCamera,
        FireflyConfig::default(),
        Transform::from_xyz(0.0, 0.0, 999.0),
    ));
}
