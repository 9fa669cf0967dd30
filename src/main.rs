use bevy::prelude::*;

fn main() -> AppExit {
    turret_run::game::run()
}
