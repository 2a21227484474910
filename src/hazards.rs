// Hazard interaction resolver: fail, key-gated destruction, checkpoint respawn.

use bevy::prelude::*;

use crate::audio::{self, VolumeSettings};
use crate::catalog::MENU_SCENE;
use crate::keys::{KeyColor, KeyRing};
use crate::level::{overlaps, RespawnPoint, TriggerVolume};
use crate::menu::spawn_button;
use crate::player::{place_player, Movement, Player, PLAYER_HALF};
use crate::screens::Screen;
use crate::transition::TransitionRequest;

pub struct HazardPlugin;

impl Plugin for HazardPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FailLatch>().add_systems(
            Update,
            (collect_checkpoint_keys, hazard_contacts, fail_overlay_actions)
                .chain()
                .run_if(in_state(Screen::Playing)),
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardKind {
    Neutral,
    Colored(KeyColor),
}

/// A hazard trigger volume. The two variants are distinct policies, chosen
/// per instance when the level is spawned.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hazard {
    /// Resolved against the global key ring; fails without the matching key.
    Lethal(HazardKind),
    /// Sends the player to the respawn point instead of failing. Once its
    /// own key has been picked up the hazard is destroyed on contact.
    Checkpoint { key_collected: bool },
}

/// Pairs a checkpoint hazard with its disarming pickup within one level.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointId(pub u8);

#[derive(Component)]
pub struct CheckpointKeyPickup(pub CheckpointId);

/// One-shot guard: after a fail no further hazard outcome can occur until
/// the scene reloads.
#[derive(Resource, Default)]
pub struct FailLatch(pub bool);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardOutcome {
    Fail,
    Consume,
    Respawn,
    Ignore,
}

/// Decide what a player/hazard contact does. Pure so the policy is testable
/// without an app.
pub fn resolve_contact(hazard: &Hazard, keys: &KeyRing, latched: bool) -> HazardOutcome {
    if latched {
        return HazardOutcome::Ignore;
    }
    match hazard {
        Hazard::Lethal(HazardKind::Neutral) => HazardOutcome::Fail,
        Hazard::Lethal(HazardKind::Colored(color)) => {
            if keys.has(*color) {
                HazardOutcome::Consume
            } else {
                HazardOutcome::Fail
            }
        }
        Hazard::Checkpoint {
            key_collected: true,
        } => HazardOutcome::Consume,
        Hazard::Checkpoint {
            key_collected: false,
        } => HazardOutcome::Respawn,
    }
}

/// Latch the fail, freeze game time and surface the fail overlay. Reloading
/// is left to an explicit retry action.
pub fn trigger_fail(
    commands: &mut Commands,
    latch: &mut FailLatch,
    time: &mut Time<Virtual>,
    asset_server: &AssetServer,
    volumes: &VolumeSettings,
) {
    if latch.0 {
        return;
    }
    latch.0 = true;
    time.pause();
    audio::play_sfx(commands, asset_server, audio::SFX_FAIL, volumes);
    spawn_fail_overlay(commands);
    info!("player failed");
}

fn hazard_contacts(
    mut commands: Commands,
    mut player: Query<(&mut Transform, &mut Movement), With<Player>>,
    hazards: Query<(Entity, &Transform, &TriggerVolume, &Hazard), Without<Player>>,
    ring: Res<KeyRing>,
    mut latch: ResMut<FailLatch>,
    mut time: ResMut<Time<Virtual>>,
    respawn: Res<RespawnPoint>,
    asset_server: Res<AssetServer>,
    volumes: Res<VolumeSettings>,
) {
    let Ok((mut player_transform, mut movement)) = player.single_mut() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();

    for (entity, transform, volume, hazard) in &hazards {
        if !overlaps(player_pos, PLAYER_HALF, transform.translation.truncate(), volume.half) {
            continue;
        }
        match resolve_contact(hazard, &ring, latch.0) {
            HazardOutcome::Fail => {
                trigger_fail(&mut commands, &mut latch, &mut time, &asset_server, &volumes);
            }
            HazardOutcome::Consume => {
                commands.entity(entity).despawn();
                info!("hazard consumed");
            }
            HazardOutcome::Respawn => {
                place_player(&mut player_transform, &mut movement, respawn.0);
                info!("player sent back to the respawn point");
                break;
            }
            HazardOutcome::Ignore => {}
        }
    }
}

fn collect_checkpoint_keys(
    mut commands: Commands,
    player: Query<&Transform, With<Player>>,
    pickups: Query<(Entity, &Transform, &TriggerVolume, &CheckpointKeyPickup)>,
    mut hazards: Query<(&mut Hazard, &CheckpointId)>,
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
        for (mut hazard, id) in &mut hazards {
            if *id == pickup.0 {
                *hazard = Hazard::Checkpoint {
                    key_collected: true,
                };
            }
        }
        commands.entity(entity).despawn();
        audio::play_sfx(&mut commands, &asset_server, audio::SFX_KEY_PICKUP, &volumes);
        info!("checkpoint key collected");
    }
}

#[derive(Component)]
enum FailButton {
    Retry,
    Menu,
}

fn spawn_fail_overlay(commands: &mut Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(24.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            GlobalZIndex(50),
            DespawnOnExit(Screen::Playing),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("You were caught"),
                TextFont {
                    font_size: 36.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.4, 0.4)),
            ));
            spawn_button(parent, "Retry", FailButton::Retry);
            spawn_button(parent, "Menu", FailButton::Menu);
        });
}

fn fail_overlay_actions(
    buttons: Query<(&Interaction, &FailButton), Changed<Interaction>>,
    mut time: ResMut<Time<Virtual>>,
    mut requests: MessageWriter<TransitionRequest>,
) {
    for (interaction, button) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        // Restore normal time flow before asking for the transition.
        time.unpause();
        match button {
            FailButton::Retry => {
                requests.write(TransitionRequest::Reload);
            }
            FailButton::Menu => {
                requests.write(TransitionRequest::Named(MENU_SCENE.to_owned()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_hazard_fails_unconditionally() {
        let mut ring = KeyRing::default();
        ring.collect(KeyColor::Blue);
        ring.collect(KeyColor::Red);
        ring.collect(KeyColor::Yellow);
        let hazard = Hazard::Lethal(HazardKind::Neutral);
        assert_eq!(resolve_contact(&hazard, &ring, false), HazardOutcome::Fail);
    }

    #[test]
    fn colored_hazard_consumed_only_with_matching_key() {
        let mut ring = KeyRing::default();
        let hazard = Hazard::Lethal(HazardKind::Colored(KeyColor::Blue));
        assert_eq!(resolve_contact(&hazard, &ring, false), HazardOutcome::Fail);

        ring.collect(KeyColor::Red);
        assert_eq!(resolve_contact(&hazard, &ring, false), HazardOutcome::Fail);

        ring.collect(KeyColor::Blue);
        assert_eq!(
            resolve_contact(&hazard, &ring, false),
            HazardOutcome::Consume
        );
    }

    #[test]
    fn latch_suppresses_every_further_outcome() {
        let ring = KeyRing::default();
        for hazard in [
            Hazard::Lethal(HazardKind::Neutral),
            Hazard::Lethal(HazardKind::Colored(KeyColor::Yellow)),
            Hazard::Checkpoint {
                key_collected: false,
            },
            Hazard::Checkpoint {
                key_collected: true,
            },
        ] {
            assert_eq!(resolve_contact(&hazard, &ring, true), HazardOutcome::Ignore);
        }
    }

    #[test]
    fn fail_latches_after_the_first_contact() {
        let ring = KeyRing::default();
        let hazard = Hazard::Lethal(HazardKind::Neutral);
        let mut latched = false;

        let first = resolve_contact(&hazard, &ring, latched);
        assert_eq!(first, HazardOutcome::Fail);
        latched = true;

        // The second contact in succession produces no further side effect.
        let second = resolve_contact(&hazard, &ring, latched);
        assert_eq!(second, HazardOutcome::Ignore);
    }

    #[test]
    fn checkpoint_variant_respawns_then_destroys() {
        let ring = KeyRing::default();
        assert_eq!(
            resolve_contact(
                &Hazard::Checkpoint {
                    key_collected: false
                },
                &ring,
                false
            ),
            HazardOutcome::Respawn
        );
        assert_eq!(
            resolve_contact(
                &Hazard::Checkpoint {
                    key_collected: true
                },
                &ring,
                false
            ),
            HazardOutcome::Consume
        );
    }
}
