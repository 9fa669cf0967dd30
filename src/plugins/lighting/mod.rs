//! Lighting plugin (Firefly) (render-only).
//!
//! One warm point light rides on the player and reddens as health drops. The player is
//! always near the viewport centre, so the light mostly stays put while the world
//! scrolls underneath.

use bevy::prelude::*;
use bevy_firefly::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::core::SimSet;
use crate::plugins::player::{Player, look_for};
use crate::plugins::render::screen_to_world;
use crate::plugins::spatial::{Body, Health};

#[derive(Component)]
pub struct PlayerLight;

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<FireflyPlugin>() {
        app.add_plugins(FireflyPlugin);
    }

    app.add_systems(Startup, setup)
        .add_systems(Update, follow_player_light.after(SimSet::Camera));
}

/// Light colour for the player's current health band.
pub fn tint(hp: i32) -> Color {
    match look_for(hp) {
        "player" => Color::srgb(1.0, 0.9, 0.75),
        "player-hurt" => Color::srgb(1.0, 0.7, 0.45),
        _ => Color::srgb(1.0, 0.35, 0.3),
    }
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Name::new("PlayerLight"),
        PlayerLight,
        PointLight2d {
            color: tint(i32::MAX),
            radius: 450.0,
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 10.0),
    ));
}

fn follow_player_light(
    tunables: Res<Tunables>,
    player: Option<Single<(&Body, &Health), With<Player>>>,
    light: Option<Single<(&mut Transform, &mut PointLight2d), With<PlayerLight>>>,
) {
    let (Some(player), Some(light)) = (player, light) else {
        return;
    };
    let (body, health) = *player;
    let (mut tf, mut point) = light.into_inner();

    let at = screen_to_world(body.center(), tunables.viewport());
    tf.translation.x = at.x;
    tf.translation.y = at.y;
    let color = tint(health.hp);
    if point.color != color {
        point.color = color;
    }
}
