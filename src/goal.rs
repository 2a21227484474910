// Level completion: end-zone trigger, next-level unlock, continue/menu choice.

use bevy::prelude::*;

use crate::audio::{self, VolumeSettings};
use crate::catalog::{SceneCatalog, MENU_SCENE};
use crate::hazards::FailLatch;
use crate::level::{overlaps, TriggerVolume};
use crate::menu::spawn_button;
use crate::player::{Player, PLAYER_HALF};
use crate::prefs::PrefStore;
use crate::progress::Progress;
use crate::screens::{ActiveScene, Screen};
use crate::transition::TransitionRequest;

pub struct GoalPlugin;

impl Plugin for GoalPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (goal_contact, completion_actions).run_if(in_state(Screen::Playing)),
        );
    }
}

/// Level-end trigger volume. Latched: fires once per instance.
#[derive(Component, Default)]
pub struct Goal {
    triggered: bool,
}

/// Where the Continue button goes, decided when the panel is spawned.
#[derive(Component, Clone, Copy)]
enum CompletionButton {
    Continue { next: Option<u32> },
    Menu,
}

fn goal_contact(
    mut commands: Commands,
    player: Query<&Transform, With<Player>>,
    mut goals: Query<(&Transform, &TriggerVolume, &mut Goal), Without<Player>>,
    active: Res<ActiveScene>,
    catalog: Res<SceneCatalog>,
    mut progress: ResMut<Progress>,
    mut store: ResMut<PrefStore>,
    latch: Res<FailLatch>,
    mut time: ResMut<Time<Virtual>>,
    asset_server: Res<AssetServer>,
    volumes: Res<VolumeSettings>,
) {
    if latch.0 {
        return;
    }
    let Ok(player_transform) = player.single() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();

    for (transform, volume, mut goal) in &mut goals {
        if goal.triggered
            || !overlaps(player_pos, PLAYER_HALF, transform.translation.truncate(), volume.half)
        {
            continue;
        }
        goal.triggered = true;

        let Some(current) = active.level else {
            warn!("goal reached outside a level, ignoring");
            continue;
        };

        let next = current + 1;
        if next <= catalog.total_levels() {
            progress.unlock(next, &mut store);
        }

        // Continue goes to the next level only if it resolves to a scene.
        let continue_target = catalog.scene_for_level(next).map(|_| next);

        time.pause();
        audio::play_sfx(&mut commands, &asset_server, audio::SFX_LEVEL_COMPLETE, &volumes);
        spawn_completion_panel(&mut commands, current, continue_target);
        info!("level {current} complete");
    }
}

fn spawn_completion_panel(commands: &mut Commands, current: u32, next: Option<u32>) {
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
                Text::new(format!("Level {current} complete")),
                TextFont {
                    font_size: 36.0,
                    ..default()
                },
                TextColor(Color::srgb(0.4, 1.0, 0.5)),
            ));
            spawn_button(parent, "Continue", CompletionButton::Continue { next });
            spawn_button(parent, "Menu", CompletionButton::Menu);
        });
}

fn completion_actions(
    buttons: Query<(&Interaction, &CompletionButton), Changed<Interaction>>,
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
            CompletionButton::Continue { next: Some(next) } => {
                requests.write(TransitionRequest::Level(*next));
            }
            // Past the last level: fall back to the menu.
            CompletionButton::Continue { next: None } | CompletionButton::Menu => {
                requests.write(TransitionRequest::Named(MENU_SCENE.to_owned()));
            }
        }
    }
}
