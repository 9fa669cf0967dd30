//! Input collaborator (full app only): keyboard and mouse → `PlayerInput`.
//!
//! Runs in `PreUpdate` after Bevy's input systems, so the tick that follows sees this
//! frame's keys. Held keys are level state; Tab and mouse clicks are edges that stay set
//! until the player systems consume them.
//!
//! - WASD: move
//! - arrows: fire (left, right, up, down in that precedence)
//! - Tab: next weapon
//! - left / right mouse: place an item spawner / aid kit at the cursor
//! - Escape: quit

use bevy::input::InputSystems;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::common::tunables::Tunables;
use crate::plugins::camera::MainCamera;
use crate::plugins::player::weapons::Direction;
use crate::plugins::player::{PlaceRequest, Placeable, PlayerInput};
use crate::plugins::render::world_to_screen;

pub fn plugin(app: &mut App) {
    app.add_systems(PreUpdate, (read_keyboard, read_mouse, quit_on_escape).after(InputSystems));
}

/// First held arrow in precedence order.
pub fn fire_direction(keys: &ButtonInput<KeyCode>) -> Option<Direction> {
    [
        (KeyCode::ArrowLeft, Direction::Left),
        (KeyCode::ArrowRight, Direction::Right),
        (KeyCode::ArrowUp, Direction::Up),
        (KeyCode::ArrowDown, Direction::Down),
    ]
    .into_iter()
    .find(|(key, _)| keys.pressed(*key))
    .map(|(_, dir)| dir)
}

pub fn read_keyboard(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<PlayerInput>) {
    input.up = keys.pressed(KeyCode::KeyW);
    input.down = keys.pressed(KeyCode::KeyS);
    input.left = keys.pressed(KeyCode::KeyA);
    input.right = keys.pressed(KeyCode::KeyD);
    input.fire = fire_direction(&keys);
    if keys.just_pressed(KeyCode::Tab) {
        input.cycle_weapon = true;
    }
}

fn read_mouse(
    tunables: Res<Tunables>,
    buttons: Res<ButtonInput<MouseButton>>,
    mut input: ResMut<PlayerInput>,
    window: Option<Single<&Window, With<PrimaryWindow>>>,
    camera: Option<Single<(&Camera, &GlobalTransform), With<MainCamera>>>,
) {
    let kind = if buttons.just_pressed(MouseButton::Left) {
        Placeable::ItemSpawner
    } else if buttons.just_pressed(MouseButton::Right) {
        Placeable::AidKit
    } else {
        return;
    };
    let (Some(window), Some(camera)) = (window, camera) else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let (camera, camera_tf) = *camera;
    let Ok(world_cursor) = camera.viewport_to_world_2d(camera_tf, cursor) else {
        return;
    };
    let pos = world_to_screen(world_cursor, tunables.viewport());
    input.place = Some(PlaceRequest { kind, pos });
}

fn quit_on_escape(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
