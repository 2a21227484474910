// Scene catalog: ordered level scene identifiers and name resolution.

use bevy::prelude::*;

/// Scene identifier for the main menu.
pub const MENU_SCENE: &str = "MainMenu";

/// Number of levels shipped with the game.
pub const TOTAL_LEVELS: u32 = 5;

/// Ordered list of level scene identifiers, indexed by level number minus one.
#[derive(Resource)]
pub struct SceneCatalog {
    scenes: Vec<String>,
}

impl Default for SceneCatalog {
    fn default() -> Self {
        Self::with_levels(TOTAL_LEVELS)
    }
}

impl SceneCatalog {
    pub fn with_levels(total: u32) -> Self {
        let scenes = (1..=total).map(|n| format!("Level_{n:02}")).collect();
        Self { scenes }
    }

    pub fn total_levels(&self) -> u32 {
        self.scenes.len() as u32
    }

    /// Scene identifier for a level number. None outside [1, total].
    pub fn scene_for_level(&self, level: u32) -> Option<&str> {
        if level == 0 {
            return None;
        }
        self.scenes.get(level as usize - 1).map(String::as_str)
    }

    /// Level number for a scene identifier. Falls back to the `Level_<NN>`
    /// naming convention for names not present in the list.
    pub fn level_for_scene(&self, name: &str) -> Option<u32> {
        if let Some(index) = self.scenes.iter().position(|s| s == name) {
            return Some(index as u32 + 1);
        }
        parse_level_suffix(name)
    }
}

/// Parse the substring after the last underscore as a level number.
pub fn parse_level_suffix(name: &str) -> Option<u32> {
    let (_, suffix) = name.rsplit_once('_')?;
    suffix.parse().ok()
}
