mod common;

use bevy::prelude::*;
use turret_run::common::state::GameState;
use turret_run::plugins::hud::Hud;
use turret_run::plugins::player::Player;
use turret_run::plugins::world::WorldGrid;

#[test]
fn boots_and_ticks() {
    let mut app = common::app_headless();

    for _ in 0..3 {
        app.update();
    }

    assert_eq!(*app.world().resource::<State<GameState>>().get(), GameState::InGame);
}

#[test]
fn first_tick_builds_the_start_neighbourhood() {
    let mut app = common::booted();

    let body = common::player_body(&mut app);
    assert_eq!(body.center(), Vec2::new(500.0, 300.0));

    let grid = app.world().resource::<WorldGrid>();
    assert_eq!(grid.current(), IVec2::ZERO);
    for y in -1..=1 {
        for x in -1..=1 {
            assert!(grid.get(IVec2::new(x, y)).is_some(), "cell ({x}, {y}) generated");
        }
    }
    assert!(grid.is_rectangular());
}

#[test]
fn hud_tracks_the_player() {
    let mut app = common::booted();
    app.update();

    let hud = app.world().resource::<Hud>();
    assert_eq!(hud.text("Character"), Some("Hp: 100"));
    assert_eq!(hud.text("Character's coins"), Some("Coins: 0"));
    assert!(hud.text("FPS").is_some());

    let players = app.world_mut().query::<&Player>().iter(app.world()).count();
    assert_eq!(players, 1);
}
