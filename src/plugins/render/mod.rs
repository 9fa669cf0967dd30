//! Render collaborator (full app only).
//!
//! Simulation state is stored in screen space: top-left origin, y down, camera-relative.
//! Bevy's 2D camera sits at the origin looking at a y-up world. Each frame this module
//! copies `Body`/`Visual` onto `Transform`/`Sprite`/`Visibility`, and mirrors the `Hud`
//! labels as `Text2d` entities.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy::sprite::Anchor;

use crate::common::tags::Tag;
use crate::common::tunables::Tunables;
use crate::plugins::assets::{AssetCatalog, FOREGROUND};
use crate::plugins::core::SimSet;
use crate::plugins::hud::Hud;
use crate::plugins::spatial::{Body, Look, Tags, Visual};

const HUD_DEPTH: f32 = 10.0;

pub fn plugin(app: &mut App) {
    app.init_resource::<AssetCatalog>().add_systems(
        Update,
        (attach_sprites, sync_sprites, mirror_hud).chain().after(SimSet::Hud),
    );
}

/// Screen point (y down, origin top-left) to Bevy world point (y up, origin centre).
#[inline]
pub fn screen_to_world(screen: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(screen.x - viewport.x * 0.5, viewport.y * 0.5 - screen.y)
}

#[inline]
pub fn world_to_screen(world: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(world.x + viewport.x * 0.5, viewport.y * 0.5 - world.y)
}

/// Characters draw over bullets, bullets over everything else.
fn depth(tags: Option<&Tags>) -> f32 {
    match tags {
        Some(t) if t.has(Tag::Character) => 3.0,
        Some(t) if t.has(Tag::Bullet) => 2.0,
        Some(t) if t.has(Tag::Wall) => 1.0,
        _ => 1.5,
    }
}

fn sprite_for(visual: &Visual, size: Vec2, catalog: &AssetCatalog, assets: &AssetServer) -> Sprite {
    match visual.look {
        Look::Asset(key) => match catalog.file(key) {
            Some(file) => Sprite { image: assets.load(file), custom_size: Some(size), ..default() },
            None => {
                warn!("no asset for look `{key}`");
                Sprite::from_color(FOREGROUND, size)
            }
        },
        Look::Fill => Sprite::from_color(FOREGROUND, size),
    }
}

fn visibility(visual: &Visual) -> Visibility {
    if visual.visible { Visibility::Inherited } else { Visibility::Hidden }
}

fn attach_sprites(
    mut commands: Commands,
    tunables: Res<Tunables>,
    catalog: Res<AssetCatalog>,
    assets: Res<AssetServer>,
    q: Query<(Entity, &Body, &Visual, Option<&Tags>), Added<Visual>>,
) {
    let viewport = tunables.viewport();
    for (e, body, visual, tags) in &q {
        let at = screen_to_world(body.center(), viewport);
        commands.entity(e).try_insert((
            sprite_for(visual, body.size, &catalog, &assets),
            Transform::from_translation(at.extend(depth(tags))),
            visibility(visual),
        ));
    }
}

fn sync_sprites(
    tunables: Res<Tunables>,
    catalog: Res<AssetCatalog>,
    assets: Res<AssetServer>,
    mut q: Query<(&Body, Ref<Visual>, &mut Sprite, &mut Transform, &mut Visibility)>,
) {
    let viewport = tunables.viewport();
    for (body, visual, mut sprite, mut tf, mut vis) in &mut q {
        let at = screen_to_world(body.center(), viewport);
        tf.translation.x = at.x;
        tf.translation.y = at.y;
        if visual.is_changed() {
            *sprite = sprite_for(&visual, body.size, &catalog, &assets);
            *vis = visibility(&visual);
        } else if sprite.custom_size != Some(body.size) {
            sprite.custom_size = Some(body.size);
        }
    }
}

#[derive(Component)]
pub struct HudText;

fn mirror_hud(
    mut commands: Commands,
    tunables: Res<Tunables>,
    hud: Res<Hud>,
    mut shown: Local<HashMap<String, Entity>>,
    mut texts: Query<(&mut Text2d, &mut TextFont, &mut Transform), With<HudText>>,
) {
    let viewport = tunables.viewport();
    shown.retain(|key, e| {
        let keep = hud.labels.contains_key(key);
        if !keep {
            commands.entity(*e).try_despawn();
        }
        keep
    });

    for (key, label) in &hud.labels {
        let at = screen_to_world(label.pos, viewport).extend(HUD_DEPTH);
        if let Some((mut text, mut font, mut tf)) = shown.get(key).and_then(|e| texts.get_mut(*e).ok()) {
            if text.0 != label.text {
                text.0.clone_from(&label.text);
            }
            if font.font_size != label.font_size {
                font.font_size = label.font_size;
            }
            tf.translation = at;
            continue;
        }
        let e = commands
            .spawn((
                Name::new(format!("Label {key}")),
                HudText,
                Text2d::new(label.text.clone()),
                TextFont { font_size: label.font_size, ..default() },
                TextColor(FOREGROUND),
                Anchor::TOP_LEFT,
                Transform::from_translation(at),
            ))
            .id();
        shown.insert(key.clone(), e);
    }
}
