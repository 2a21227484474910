// Key possession flags and key pickups.

use bevy::prelude::*;
use strum::IntoEnumIterator;

use crate::audio::{self, VolumeSettings};
use crate::level::{overlaps, TriggerVolume};
use crate::player::{Player, PLAYER_HALF};
use crate::screens::Screen;

pub struct KeyPlugin;

impl Plugin for KeyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<KeyRing>()
            .add_systems(OnEnter(Screen::Playing), spawn_key_hud)
            .add_systems(
                Update,
                (collect_keys, update_key_hud).run_if(in_state(Screen::Playing)),
            );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum KeyColor {
    Blue,
    Red,
    Yellow,
}

impl KeyColor {
    /// Sprite tint for keys and the matching hazards.
    pub fn tint(&self) -> Color {
        match self {
            KeyColor::Blue => Color::srgb(0.3, 0.5, 1.0),
            KeyColor::Red => Color::srgb(1.0, 0.3, 0.3),
            KeyColor::Yellow => Color::srgb(1.0, 0.9, 0.3),
        }
    }
}

/// One possession flag per key color. Read-only from the hazard resolver's
/// perspective; cleared on every level entry.
#[derive(Resource, Default)]
pub struct KeyRing {
    blue: bool,
    red: bool,
    yellow: bool,
}

impl KeyRing {
    pub fn has(&self, color: KeyColor) -> bool {
        match color {
            KeyColor::Blue => self.blue,
            KeyColor::Red => self.red,
            KeyColor::Yellow => self.yellow,
        }
    }

    pub fn collect(&mut self, color: KeyColor) {
        match color {
            KeyColor::Blue => self.blue = true,
            KeyColor::Red => self.red = true,
            KeyColor::Yellow => self.yellow = true,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn held(&self) -> impl Iterator<Item = KeyColor> + '_ {
        KeyColor::iter().filter(|color| self.has(*color))
    }
}

#[derive(Component)]
pub struct KeyPickup(pub KeyColor);

#[derive(Component)]
struct KeyHud;

fn collect_keys(
    mut commands: Commands,
    player: Query<&Transform, With<Player>>,
    pickups: Query<(Entity, &Transform, &TriggerVolume, &KeyPickup)>,
    mut ring: ResMut<KeyRing>,
    asset_server: Res<AssetServer>,
    volumes: Res<VolumeSettings>,
) {
    let Ok(player_transform) = player.single() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();

    for (entity, transform, volume, pickup) in &pickups {
        if !overlaps(player_pos, PLAYER_HALF, transform.translation.truncate(), volume.half) {
            continue;
        }
        ring.collect(pickup.0);
        commands.entity(entity).despawn();
        audio::play_sfx(&mut commands, &asset_server, audio::SFX_KEY_PICKUP, &volumes);
        info!("collected {} key", pickup.0);
    }
}

fn spawn_key_hud(mut commands: Commands) {
    commands.spawn((
        KeyHud,
        Text::new("Keys: none"),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::srgba(1.0, 1.0, 1.0, 0.8)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
        DespawnOnExit(Screen::Playing),
    ));
}

fn update_key_hud(ring: Res<KeyRing>, mut hud: Query<&mut Text, With<KeyHud>>) {
    if !ring.is_changed() {
        return;
    }
    let Ok(mut text) = hud.single_mut() else {
        return;
    };
    let held: Vec<String> = ring.held().map(|color| color.to_string()).collect();
    text.0 = if held.is_empty() {
        "Keys: none".to_owned()
    } else {
        format!("Keys: {}", held.join(", "))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_starts_empty_and_tracks_collection() {
        let mut ring = KeyRing::default();
        for color in KeyColor::iter() {
            assert!(!ring.has(color));
        }

        ring.collect(KeyColor::Red);
        assert!(ring.has(KeyColor::Red));
        assert!(!ring.has(KeyColor::Blue));
        assert_eq!(ring.held().collect::<Vec<_>>(), vec![KeyColor::Red]);
    }

    #[test]
    fn clear_drops_every_flag() {
        let mut ring = KeyRing::default();
        ring.collect(KeyColor::Blue);
        ring.collect(KeyColor::Yellow);
        ring.clear();
        assert_eq!(ring.held().count(), 0);
    }
}
