//! HUD: label-key → text + screen placement, rebuilt every tick.
//!
//! The simulation only describes what to print and where. Drawing is the render
//! collaborator's job (`plugins::render` mirrors every label as a `Text2d`).
//!
//! Sizes are estimated from the font size; there is no font metrics dependency here.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::common::clock::SimClock;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::core::SimSet;
use crate::plugins::enemies::Turret;
use crate::plugins::pickups::ItemSpawner;
use crate::plugins::player::Player;
use crate::plugins::player::items::Loadout;
use crate::plugins::spatial::{Body, Health, PendingDespawn, Stamp};

pub const HUD_FONT: f32 = 35.0;
pub const TURRET_FONT: f32 = 30.0;
pub const SPAWNER_FONT: f32 = 20.0;
pub const BANNER_FONT: f32 = 250.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    /// Top-left corner in screen space.
    pub pos: Vec2,
    pub font_size: f32,
}

impl Label {
    pub fn new(text: impl Into<String>, pos: Vec2, font_size: f32) -> Self {
        Self { text: text.into(), pos, font_size }
    }

    /// Rough rendered size: half an em per character, one em high.
    pub fn size(&self) -> Vec2 {
        estimate_size(&self.text, self.font_size)
    }
}

pub fn estimate_size(text: &str, font_size: f32) -> Vec2 {
    Vec2::new(text.chars().count() as f32 * font_size * 0.5, font_size)
}

#[derive(Resource, Debug, Default, Clone)]
pub struct Hud {
    pub labels: BTreeMap<String, Label>,
}

impl Hud {
    pub fn set(&mut self, key: impl Into<String>, label: Label) {
        self.labels.insert(key.into(), label);
    }

    pub fn get(&self, key: &str) -> Option<&Label> {
        self.labels.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).map(|l| l.text.as_str())
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<Hud>()
        .add_systems(OnEnter(GameState::GameOver), show_game_over)
        .add_systems(Update, rebuild_hud.in_set(SimSet::Hud).run_if(in_state(GameState::InGame)));
}

/// Label centred horizontally over `body`, ending `lift` pixels above its top edge.
fn above(body: &Body, text: String, font_size: f32, lift: f32) -> Label {
    let size = estimate_size(&text, font_size);
    let pos = Vec2::new(body.center().x - size.x * 0.5, body.pos.y - lift);
    Label::new(text, pos, font_size)
}

pub fn rebuild_hud(
    tunables: Res<Tunables>,
    clock: Res<SimClock>,
    mut hud: ResMut<Hud>,
    player: Option<Single<(&Player, &Health, &Loadout)>>,
    turrets: Query<(&Stamp, &Body, &Health), (With<Turret>, Without<PendingDespawn>)>,
    spawners: Query<(&Stamp, &Body, &ItemSpawner), Without<PendingDespawn>>,
) {
    hud.labels.clear();

    if let Some(player) = player {
        let (player, health, loadout) = *player;
        hud.set("Character", Label::new(format!("Hp: {}", health.hp), Vec2::new(10.0, 10.0), HUD_FONT));
        hud.set(
            "Character's coins",
            Label::new(format!("Coins: {}", player.coins), Vec2::new(10.0, 50.0), HUD_FONT),
        );
        for (i, kind) in loadout.kinds().into_iter().enumerate() {
            let pos = Vec2::new(10.0, 90.0 + i as f32 * HUD_FONT);
            hud.set(format!("Item {i}"), Label::new(format!("Item {}: {kind}", i + 1), pos, HUD_FONT));
        }
    }

    let fps = if clock.dt() > 0.0 { (1.0 / clock.dt()) as u32 } else { 0 };
    let fps_pos = Vec2::new(tunables.viewport().x - 150.0, 10.0);
    hud.set("FPS", Label::new(format!("FPS: {fps}"), fps_pos, HUD_FONT));

    for (stamp, body, health) in &turrets {
        hud.set(format!("Enemy {}", stamp.serial), above(body, health.hp.to_string(), TURRET_FONT, TURRET_FONT));
    }

    for (stamp, body, spawner) in &spawners {
        let item = above(body, format!("Item: {}", spawner.item), SPAWNER_FONT, 40.0);
        let price = above(body, format!("Price: {}", spawner.price), SPAWNER_FONT, 20.0);
        hud.set(format!("Stock {}", stamp.serial), item);
        hud.set(format!("Price {}", stamp.serial), price);
    }
}

/// Everything else disappears; one centred banner remains.
pub fn show_game_over(tunables: Res<Tunables>, mut hud: ResMut<Hud>) {
    let text = "Game over";
    let pos = (tunables.viewport() - estimate_size(text, BANNER_FONT)) * 0.5;
    hud.labels.clear();
    hud.set(text, Label::new(text, pos, BANNER_FONT));
    info!("game over");
}
