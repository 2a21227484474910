// Level content: built-in layouts, spawned on entering a level and scoped to it.

use bevy::prelude::*;

use crate::goal::Goal;
use crate::hazards::{CheckpointId, CheckpointKeyPickup, FailLatch, Hazard, HazardKind};
use crate::keys::{KeyColor, KeyPickup, KeyRing};
use crate::player::{place_player, Movement, Player};
use crate::screens::{ActiveScene, Screen};

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RespawnPoint>()
            .add_systems(OnEnter(Screen::Playing), spawn_level);
    }
}

/// Axis-aligned trigger extent shared by hazards, key pickups and goals.
#[derive(Component)]
pub struct TriggerVolume {
    pub half: Vec2,
}

/// Solid ground the player can stand on.
#[derive(Component)]
pub struct Platform {
    pub half: Vec2,
}

/// Where checkpoint hazards send the player.
#[derive(Resource, Default)]
pub struct RespawnPoint(pub Vec2);

/// Y below which the player has fallen out of the level.
pub const KILL_Y: f32 = -600.0;

pub fn overlaps(a_pos: Vec2, a_half: Vec2, b_pos: Vec2, b_half: Vec2) -> bool {
    (a_pos.x - b_pos.x).abs() <= a_half.x + b_half.x
        && (a_pos.y - b_pos.y).abs() <= a_half.y + b_half.y
}

pub struct PlatformDef {
    pub pos: Vec2,
    pub half: Vec2,
}

pub enum HazardDef {
    Neutral(Vec2),
    Colored(KeyColor, Vec2),
    /// Checkpoint-flavored hazard paired with the pickup that disarms it.
    Checkpoint { pos: Vec2, key_at: Vec2 },
}

pub struct LevelLayout {
    pub spawn: Vec2,
    pub respawn: Vec2,
    pub platforms: &'static [PlatformDef],
    pub hazards: &'static [HazardDef],
    pub keys: &'static [(KeyColor, Vec2)],
    pub goal: Vec2,
}

const fn platform(x: f32, y: f32, hw: f32, hh: f32) -> PlatformDef {
    PlatformDef {
        pos: Vec2::new(x, y),
        half: Vec2::new(hw, hh),
    }
}

static LEVEL_1: LevelLayout = LevelLayout {
    spawn: Vec2::new(-380.0, -150.0),
    respawn: Vec2::new(-380.0, -150.0),
    platforms: &[
        platform(0.0, -200.0, 450.0, 20.0),
        platform(80.0, -90.0, 60.0, 12.0),
    ],
    hazards: &[HazardDef::Neutral(Vec2::new(-60.0, -160.0))],
    keys: &[],
    goal: Vec2::new(400.0, -140.0),
};

static LEVEL_2: LevelLayout = LevelLayout {
    spawn: Vec2::new(-380.0, -150.0),
    respawn: Vec2::new(-380.0, -150.0),
    platforms: &[
        platform(-250.0, -200.0, 200.0, 20.0),
        platform(60.0, -160.0, 90.0, 14.0),
        platform(320.0, -200.0, 130.0, 20.0),
        platform(60.0, -40.0, 50.0, 12.0),
    ],
    hazards: &[
        HazardDef::Neutral(Vec2::new(60.0, -120.0)),
        HazardDef::Colored(KeyColor::Blue, Vec2::new(250.0, -160.0)),
    ],
    keys: &[(KeyColor::Blue, Vec2::new(60.0, 0.0))],
    goal: Vec2::new(400.0, -140.0),
};

static LEVEL_3: LevelLayout = LevelLayout {
    spawn: Vec2::new(-380.0, -150.0),
    respawn: Vec2::new(-40.0, -120.0),
    platforms: &[
        platform(-280.0, -200.0, 170.0, 20.0),
        platform(-40.0, -170.0, 80.0, 14.0),
        platform(200.0, -140.0, 70.0, 14.0),
        platform(380.0, -100.0, 70.0, 14.0),
    ],
    hazards: &[
        HazardDef::Checkpoint {
            pos: Vec2::new(90.0, -130.0),
            key_at: Vec2::new(-40.0, -110.0),
        },
        HazardDef::Colored(KeyColor::Red, Vec2::new(310.0, -60.0)),
    ],
    keys: &[(KeyColor::Red, Vec2::new(200.0, -90.0))],
    goal: Vec2::new(420.0, -40.0),
};

static LEVEL_4: LevelLayout = LevelLayout {
    spawn: Vec2::new(-380.0, -150.0),
    respawn: Vec2::new(-380.0, -150.0),
    platforms: &[
        platform(-300.0, -200.0, 150.0, 20.0),
        platform(-60.0, -150.0, 60.0, 14.0),
        platform(140.0, -110.0, 60.0, 14.0),
        platform(340.0, -150.0, 110.0, 20.0),
        platform(140.0, 10.0, 45.0, 12.0),
    ],
    hazards: &[
        HazardDef::Neutral(Vec2::new(-180.0, -160.0)),
        HazardDef::Colored(KeyColor::Yellow, Vec2::new(250.0, -110.0)),
        HazardDef::Colored(KeyColor::Red, Vec2::new(420.0, -110.0)),
    ],
    keys: &[
        (KeyColor::Yellow, Vec2::new(-60.0, -100.0)),
        (KeyColor::Red, Vec2::new(140.0, 60.0)),
    ],
    goal: Vec2::new(455.0, -90.0),
};

static LEVEL_5: LevelLayout = LevelLayout {
    spawn: Vec2::new(-400.0, -150.0),
    respawn: Vec2::new(20.0, -100.0),
    platforms: &[
        platform(-320.0, -200.0, 130.0, 20.0),
        platform(-100.0, -160.0, 70.0, 14.0),
        platform(120.0, -140.0, 80.0, 14.0),
        platform(320.0, -100.0, 60.0, 14.0),
        platform(460.0, -60.0, 60.0, 14.0),
        platform(-100.0, -30.0, 45.0, 12.0),
    ],
    hazards: &[
        HazardDef::Neutral(Vec2::new(-200.0, -160.0)),
        HazardDef::Colored(KeyColor::Blue, Vec2::new(40.0, -100.0)),
        HazardDef::Checkpoint {
            pos: Vec2::new(220.0, -100.0),
            key_at: Vec2::new(120.0, -90.0),
        },
        HazardDef::Colored(KeyColor::Yellow, Vec2::new(400.0, -20.0)),
    ],
    keys: &[
        (KeyColor::Blue, Vec2::new(-100.0, 20.0)),
        (KeyColor::Yellow, Vec2::new(320.0, -50.0)),
    ],
    goal: Vec2::new(500.0, 0.0),
};

pub fn layout(level: u32) -> Option<&'static LevelLayout> {
    match level {
        1 => Some(&LEVEL_1),
        2 => Some(&LEVEL_2),
        3 => Some(&LEVEL_3),
        4 => Some(&LEVEL_4),
        5 => Some(&LEVEL_5),
        _ => None,
    }
}

const HAZARD_HALF: Vec2 = Vec2::new(20.0, 20.0);
const KEY_HALF: Vec2 = Vec2::new(12.0, 12.0);
const GOAL_HALF: Vec2 = Vec2::new(20.0, 40.0);
const NEUTRAL_TINT: Color = Color::srgb(0.5, 0.1, 0.1);
const CHECKPOINT_TINT: Color = Color::srgb(0.7, 0.4, 0.9);
const PLATFORM_TINT: Color = Color::srgb(0.25, 0.25, 0.3);
const GOAL_TINT: Color = Color::srgb(0.2, 0.8, 0.3);

fn spawn_level(
    mut commands: Commands,
    active: Res<ActiveScene>,
    mut ring: ResMut<KeyRing>,
    mut latch: ResMut<FailLatch>,
    mut respawn: ResMut<RespawnPoint>,
    mut player: Query<(&mut Transform, &mut Movement), With<Player>>,
) {
    let Some(level) = active.level else {
        error!("entered gameplay with no active level");
        return;
    };
    let Some(layout) = layout(level) else {
        error!("no layout for level {level}");
        return;
    };

    ring.clear();
    latch.0 = false;
    respawn.0 = layout.respawn;

    if let Ok((mut transform, mut movement)) = player.single_mut() {
        place_player(&mut transform, &mut movement, layout.spawn);
    }

    for def in layout.platforms {
        commands.spawn((
            Platform { half: def.half },
            Sprite::from_color(PLATFORM_TINT, def.half * 2.0),
            Transform::from_translation(def.pos.extend(0.0)),
            DespawnOnExit(Screen::Playing),
        ));
    }

    let mut checkpoint_ids = 0u8;
    for def in layout.hazards {
        match def {
            HazardDef::Neutral(pos) => {
                commands.spawn((
                    Hazard::Lethal(HazardKind::Neutral),
                    TriggerVolume { half: HAZARD_HALF },
                    Sprite::from_color(NEUTRAL_TINT, HAZARD_HALF * 2.0),
                    Transform::from_translation(pos.extend(1.0)),
                    DespawnOnExit(Screen::Playing),
                ));
            }
            HazardDef::Colored(color, pos) => {
                commands.spawn((
                    Hazard::Lethal(HazardKind::Colored(*color)),
                    TriggerVolume { half: HAZARD_HALF },
                    Sprite::from_color(color.tint(), HAZARD_HALF * 2.0),
                    Transform::from_translation(pos.extend(1.0)),
                    DespawnOnExit(Screen::Playing),
                ));
            }
            HazardDef::Checkpoint { pos, key_at } => {
                let id = CheckpointId(checkpoint_ids);
                checkpoint_ids += 1;
                commands.spawn((
                    Hazard::Checkpoint {
                        key_collected: false,
                    },
                    id,
                    TriggerVolume { half: HAZARD_HALF },
                    Sprite::from_color(CHECKPOINT_TINT, HAZARD_HALF * 2.0),
                    Transform::from_translation(pos.extend(1.0)),
                    DespawnOnExit(Screen::Playing),
                ));
                // The pickup that disarms this checkpoint hazard.
                commands.spawn((
                    CheckpointKeyPickup(id),
                    TriggerVolume { half: KEY_HALF },
                    Sprite::from_color(CHECKPOINT_TINT, KEY_HALF * 2.0),
                    Transform::from_translation(key_at.extend(1.0)),
                    DespawnOnExit(Screen::Playing),
                ));
            }
        }
    }

    for (color, pos) in layout.keys {
        commands.spawn((
            KeyPickup(*color),
            TriggerVolume { half: KEY_HALF },
            Sprite::from_color(color.tint(), KEY_HALF * 2.0),
            Transform::from_translation(pos.extend(1.0)),
            DespawnOnExit(Screen::Playing),
        ));
    }

    commands.spawn((
        Goal::default(),
        TriggerVolume { half: GOAL_HALF },
        Sprite::from_color(GOAL_TINT, GOAL_HALF * 2.0),
        Transform::from_translation(layout.goal.extend(1.0)),
        DespawnOnExit(Screen::Playing),
    ));

    info!("spawned level {level} ({})", active.name);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_level_has_a_layout() {
        for level in 1..=crate::catalog::TOTAL_LEVELS {
            let layout = layout(level).unwrap();
            assert!(!layout.platforms.is_empty(), "level {level} has no ground");
        }
        assert!(layout(0).is_none());
        assert!(layout(crate::catalog::TOTAL_LEVELS + 1).is_none());
    }

    #[test]
    fn spawn_points_sit_above_the_kill_plane() {
        for level in 1..=crate::catalog::TOTAL_LEVELS {
            let layout = layout(level).unwrap();
            assert!(layout.spawn.y > KILL_Y);
            assert!(layout.respawn.y > KILL_Y);
            assert!(layout.goal.y > KILL_Y);
        }
    }

    #[test]
    fn overlap_is_inclusive_on_touching_edges() {
        let half = Vec2::splat(10.0);
        assert!(overlaps(Vec2::ZERO, half, Vec2::new(20.0, 0.0), half));
        assert!(!overlaps(Vec2::ZERO, half, Vec2::new(20.1, 0.0), half));
        assert!(overlaps(Vec2::ZERO, half, Vec2::new(0.0, -20.0), half));
    }
}
