// Main
mod audio;
mod catalog;
mod goal;
mod hazards;
mod keys;
mod level;
mod menu;
mod player;
mod prefs;
mod progress;
mod screens;
mod transition;

use bevy::prelude::*;

use audio::{AudioPlugin, VolumeSettings};
use catalog::{SceneCatalog, TOTAL_LEVELS};
use goal::GoalPlugin;
use hazards::HazardPlugin;
use keys::KeyPlugin;
use level::LevelPlugin;
use menu::MenuPlugin;
use player::PlayerPlugin;
use prefs::PrefStore;
use progress::Progress;
use screens::{ActiveScene, Screen};
use transition::TransitionPlugin;

fn main() {
    // Services are constructed up front and injected as resources.
    let mut store = PrefStore::load_default();
    let progress = Progress::from_store(TOTAL_LEVELS, &mut store);
    let volumes = VolumeSettings::from_store(&store);

    App::new()
        .add_plugins(DefaultPlugins)
        .init_state::<Screen>()
        .init_resource::<ActiveScene>()
        .init_resource::<SceneCatalog>()
        .insert_resource(store)
        .insert_resource(progress)
        .insert_resource(volumes)
        .add_plugins((
            MenuPlugin,
            PlayerPlugin,
            LevelPlugin,
            KeyPlugin,
            HazardPlugin,
            GoalPlugin,
            TransitionPlugin,
            AudioPlugin,
        ))
        .run();
}
