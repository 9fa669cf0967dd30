//! Game composition root.
//!
//! Provides two public configuration functions:
//! - `configure_full`: loads tunables, checks assets, then DefaultPlugins (window/render) + game plugins.
//! - `configure_headless`: minimal configuration for integration tests.

use std::fmt;

use bevy::prelude::*;
use bevy::window::WindowResolution;

use crate::common::state::GameState;
use crate::common::tunables::{ConfigError, Tunables};
use crate::plugins;
use crate::plugins::assets::{AssetCatalog, AssetError};
use crate::plugins::persistence::{JsonLinesSink, RunReporter};

pub const ASSET_ROOT: &str = "assets";
pub const TUNABLES_FILE: &str = "assets/tunables.json";
pub const RUNS_FILE: &str = "runs.jsonl";

/// Reasons the full app refuses to start.
#[derive(Debug)]
pub enum StartupError {
    Config(ConfigError),
    Asset(AssetError),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Config(e) => write!(f, "{e}"),
            StartupError::Asset(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Config(e) => Some(e),
            StartupError::Asset(e) => Some(e),
        }
    }
}

impl From<ConfigError> for StartupError {
    fn from(e: ConfigError) -> Self {
        StartupError::Config(e)
    }
}

impl From<AssetError> for StartupError {
    fn from(e: AssetError) -> Self {
        StartupError::Asset(e)
    }
}

pub fn run() -> AppExit {
    let mut app = App::new();
    if let Err(e) = configure_full(&mut app) {
        // LogPlugin is not installed yet; stderr is all there is.
        eprintln!("turret-run: {e}");
        return AppExit::error();
    }
    app.run()
}

/// Full configuration for `cargo run`.
pub fn configure_full(app: &mut App) -> Result<(), StartupError> {
    let tunables = Tunables::load(TUNABLES_FILE)?;
    let catalog = AssetCatalog::default();
    catalog.verify(ASSET_ROOT)?;

    let [width, height] = tunables.viewport;
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Turret Run".into(),
            resolution: WindowResolution::new(width as u32, height as u32),
            resizable: false,
            ..default()
        }),
        ..default()
    }));

    app.insert_resource(tunables)
        .insert_resource(catalog)
        .insert_resource(RunReporter::new(JsonLinesSink::new(RUNS_FILE)))
        .init_state::<GameState>();
    plugins::register_all(app);
    info!("turret-run ready");
    Ok(())
}

/// Headless configuration for integration tests.
///
/// Notes:
/// - Do NOT add DefaultPlugins.
/// - Do NOT add render-only plugins (Firefly/camera/input).
/// - Insert `Tunables` / `WorldRng` / `RunReporter` before calling to override defaults.
pub fn configure_headless(app: &mut App) {
    app.init_state::<GameState>();
    plugins::register_gameplay(app);
}
