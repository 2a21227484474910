/// Top-level screens and the active-scene record.
use bevy::prelude::*;

use crate::catalog::MENU_SCENE;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum Screen {
    #[default]
    Menu,
    /// Interstitial while a scene transition is in flight.
    Loading,
    Playing,
}

/// The scene active after the last committed transition. `level` is None on
/// the menu; the completion handler reads it to compute "next".
#[derive(Resource)]
pub struct ActiveScene {
    pub name: String,
    pub level: Option<u32>,
}

impl Default for ActiveScene {
    fn default() -> Self {
        Self {
            name: MENU_SCENE.to_owned(),
            level: None,
        }
    }
}
