// Volume settings persisted as normalized floats, applied in decibels.

use bevy::audio::Volume;
use bevy::prelude::*;

use crate::prefs::PrefStore;
use crate::screens::Screen;

pub struct AudioPlugin;

impl Plugin for AudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Screen::Menu), start_menu_music)
            .add_systems(Update, apply_volumes);
    }
}

pub const MUSIC_MENU: &str = "audio/menu_theme.ogg";
pub const SFX_KEY_PICKUP: &str = "audio/key_pickup.ogg";
pub const SFX_FAIL: &str = "audio/fail.ogg";
pub const SFX_LEVEL_COMPLETE: &str = "audio/level_complete.ogg";
pub const SFX_UI_CLICK: &str = "audio/ui_click.ogg";

/// Silence floor for the linear-to-decibel conversion.
pub const DB_FLOOR: f32 = -80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioChannel {
    Master,
    Music,
    Sfx,
    Ui,
}

impl AudioChannel {
    fn key(self) -> &'static str {
        match self {
            AudioChannel::Master => "MasterVolume",
            AudioChannel::Music => "MusicVolume",
            AudioChannel::Sfx => "SFXVolume",
            AudioChannel::Ui => "UIVolume",
        }
    }
}

/// Normalized volume in [0, 1] per channel, persisted through the
/// preference store on every change.
#[derive(Resource)]
pub struct VolumeSettings {
    master: f32,
    music: f32,
    sfx: f32,
    ui: f32,
}

impl VolumeSettings {
    pub fn from_store(store: &PrefStore) -> Self {
        let read = |channel: AudioChannel| {
            store
                .get_f32(channel.key())
                .unwrap_or(1.0)
                .clamp(0.0, 1.0)
        };
        Self {
            master: read(AudioChannel::Master),
            music: read(AudioChannel::Music),
            sfx: read(AudioChannel::Sfx),
            ui: read(AudioChannel::Ui),
        }
    }

    pub fn get(&self, channel: AudioChannel) -> f32 {
        match channel {
            AudioChannel::Master => self.master,
            AudioChannel::Music => self.music,
            AudioChannel::Sfx => self.sfx,
            AudioChannel::Ui => self.ui,
        }
    }

    /// Clamp, set and write through immediately.
    pub fn set(&mut self, channel: AudioChannel, value: f32, store: &mut PrefStore) {
        let value = value.clamp(0.0, 1.0);
        match channel {
            AudioChannel::Master => self.master = value,
            AudioChannel::Music => self.music = value,
            AudioChannel::Sfx => self.sfx = value,
            AudioChannel::Ui => self.ui = value,
        }
        store.set_f32(channel.key(), value);
        store.save();
    }
}

/// `20 * log10(v)` with the input clamped away from zero and the result
/// clamped to [-80, 0] dB.
pub fn to_decibels(volume: f32) -> f32 {
    (20.0 * volume.clamp(0.0001, 1.0).log10()).clamp(DB_FLOOR, 0.0)
}

/// Marks looping music so volume changes reach its sink.
#[derive(Component)]
pub struct MusicChannel;

pub fn play_sfx(
    commands: &mut Commands,
    asset_server: &AssetServer,
    path: &'static str,
    volumes: &VolumeSettings,
) {
    let db = to_decibels(volumes.get(AudioChannel::Sfx));
    commands.spawn((
        AudioPlayer::new(asset_server.load(path)),
        PlaybackSettings::DESPAWN.with_volume(Volume::Decibels(db)),
    ));
}

pub fn play_ui_click(
    commands: &mut Commands,
    asset_server: &AssetServer,
    volumes: &VolumeSettings,
) {
    let db = to_decibels(volumes.get(AudioChannel::Ui));
    commands.spawn((
        AudioPlayer::new(asset_server.load(SFX_UI_CLICK)),
        PlaybackSettings::DESPAWN.with_volume(Volume::Decibels(db)),
    ));
}

fn start_menu_music(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    volumes: Res<VolumeSettings>,
) {
    let db = to_decibels(volumes.get(AudioChannel::Music));
    commands.spawn((
        MusicChannel,
        AudioPlayer::new(asset_server.load(MUSIC_MENU)),
        PlaybackSettings::LOOP.with_volume(Volume::Decibels(db)),
        DespawnOnExit(Screen::Menu),
    ));
}

fn apply_volumes(
    volumes: Res<VolumeSettings>,
    mut global: ResMut<GlobalVolume>,
    mut music_sinks: Query<&mut AudioSink, With<MusicChannel>>,
) {
    if !volumes.is_changed() {
        return;
    }
    global.volume = Volume::Decibels(to_decibels(volumes.get(AudioChannel::Master)));
    let music_db = to_decibels(volumes.get(AudioChannel::Music));
    for mut sink in &mut music_sinks {
        sink.set_volume(Volume::Decibels(music_db));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_volume_is_zero_decibels() {
        assert_eq!(to_decibels(1.0), 0.0);
    }

    #[test]
    fn silence_hits_the_floor() {
        // The input clamp pins everything at or below 0.0001 to the floor,
        // within f32 log precision.
        assert!((to_decibels(0.0) - DB_FLOOR).abs() < 1e-3);
        assert!((to_decibels(0.0001) - DB_FLOOR).abs() < 1e-3);
        assert!((to_decibels(-1.0) - DB_FLOOR).abs() < 1e-3);
    }

    #[test]
    fn conversion_is_monotonic_in_between() {
        let quiet = to_decibels(0.1);
        let loud = to_decibels(0.9);
        assert!(quiet < loud);
        assert!(quiet > DB_FLOOR);
        assert!(loud < 0.0);
        // -20 dB at one tenth of full volume.
        assert!((quiet + 20.0).abs() < 1e-4);
    }

    #[test]
    fn volumes_round_trip_through_the_store() {
        let mut store = PrefStore::in_memory();
        let mut volumes = VolumeSettings::from_store(&store);
        assert_eq!(volumes.get(AudioChannel::Master), 1.0);

        volumes.set(AudioChannel::Master, 0.4, &mut store);
        volumes.set(AudioChannel::Sfx, 1.5, &mut store);

        let stored = store.get_f32("MasterVolume").unwrap();
        assert!((stored - 0.4).abs() < 1e-6);

        let reloaded = VolumeSettings::from_store(&store);
        assert!((reloaded.get(AudioChannel::Master) - 0.4).abs() < 1e-6);
        // Out-of-range writes are clamped before persisting.
        assert_eq!(reloaded.get(AudioChannel::Sfx), 1.0);
        assert_eq!(reloaded.get(AudioChannel::Music), 1.0);
    }
}
