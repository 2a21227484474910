// Main menu: level select gated on unlocks, volume steppers, exit.

use bevy::prelude::*;

use crate::audio::{self, AudioChannel, VolumeSettings};
use crate::prefs::PrefStore;
use crate::progress::Progress;
use crate::screens::Screen;
use crate::transition::TransitionRequest;

pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Screen::Menu), setup_menu)
            .add_systems(Update, button_visuals)
            .add_systems(
                Update,
                (button_actions, volume_label_sync).run_if(in_state(Screen::Menu)),
            );
    }
}

pub(crate) const NORMAL_BUTTON: Color = Color::srgb(0.15, 0.15, 0.15);
pub(crate) const HOVERED_BUTTON: Color = Color::srgb(0.25, 0.25, 0.25);
pub(crate) const PRESSED_BUTTON: Color = Color::srgb(0.35, 0.35, 0.35);

const VOLUME_STEP: f32 = 0.1;

#[derive(Component)]
enum MenuButton {
    Play,
    Level(u32),
    VolumeDown,
    VolumeUp,
    #[cfg(not(target_arch = "wasm32"))]
    Exit,
}

#[derive(Component)]
struct VolumeLabel;

fn setup_menu(mut commands: Commands, progress: Res<Progress>, volumes: Res<VolumeSettings>) {
    // Root container.
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(24.0),
                ..default()
            },
            DespawnOnExit(Screen::Menu),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("GATEFALL"),
                TextFont {
                    font_size: 64.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Node {
                    margin: UiRect::bottom(Val::Px(32.0)),
                    ..default()
                },
            ));

            spawn_button(parent, "Play", MenuButton::Play);

            // Level select: one slot per level, locked ones inert and dimmed.
            parent
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    column_gap: Val::Px(12.0),
                    ..default()
                })
                .with_children(|row| {
                    for level in 1..=progress.total_levels() {
                        if progress.is_unlocked(level) {
                            spawn_level_button(row, level);
                        } else {
                            spawn_locked_slot(row, level);
                        }
                    }
                });

            // Master volume steppers.
            parent
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    align_items: AlignItems::Center,
                    column_gap: Val::Px(12.0),
                    ..default()
                })
                .with_children(|row| {
                    spawn_level_sized_button(row, "-", MenuButton::VolumeDown);
                    row.spawn((
                        VolumeLabel,
                        Text::new(volume_label(&volumes)),
                        TextFont {
                            font_size: 20.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                    ));
                    spawn_level_sized_button(row, "+", MenuButton::VolumeUp);
                });

            // Exit button (native only).
            #[cfg(not(target_arch = "wasm32"))]
            spawn_button(parent, "Exit", MenuButton::Exit);
        });
}

/// Standard panel button, shared with the fail overlay and completion panel.
pub(crate) fn spawn_button(
    parent: &mut ChildSpawnerCommands,
    label: &str,
    marker: impl Component,
) {
    parent
        .spawn((
            marker,
            Button,
            Node {
                width: Val::Px(200.0),
                height: Val::Px(50.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BorderColor::all(Color::srgba(1.0, 1.0, 1.0, 0.3)),
            BackgroundColor(NORMAL_BUTTON),
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new(label),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

fn spawn_level_button(parent: &mut ChildSpawnerCommands, level: u32) {
    spawn_level_sized_button(parent, &level.to_string(), MenuButton::Level(level));
}

fn spawn_level_sized_button(parent: &mut ChildSpawnerCommands, label: &str, marker: MenuButton) {
    parent
        .spawn((
            marker,
            Button,
            Node {
                width: Val::Px(50.0),
                height: Val::Px(50.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BorderColor::all(Color::srgba(1.0, 1.0, 1.0, 0.3)),
            BackgroundColor(NORMAL_BUTTON),
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new(label),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

fn spawn_locked_slot(parent: &mut ChildSpawnerCommands, level: u32) {
    parent
        .spawn((
            Node {
                width: Val::Px(50.0),
                height: Val::Px(50.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BorderColor::all(Color::srgba(1.0, 1.0, 1.0, 0.1)),
            BackgroundColor(Color::srgb(0.08, 0.08, 0.08)),
        ))
        .with_children(|slot| {
            slot.spawn((
                Text::new(level.to_string()),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::srgba(1.0, 1.0, 1.0, 0.25)),
            ));
        });
}

fn button_visuals(
    mut query: Query<
        (&Interaction, &mut BackgroundColor, &mut BorderColor),
        (Changed<Interaction>, With<Button>),
    >,
) {
    for (interaction, mut bg, mut border) in &mut query {
        match *interaction {
            Interaction::Pressed => {
                *bg = PRESSED_BUTTON.into();
                *border = BorderColor::all(Color::WHITE);
            }
            Interaction::Hovered => {
                *bg = HOVERED_BUTTON.into();
                *border = BorderColor::all(Color::WHITE);
            }
            Interaction::None => {
                *bg = NORMAL_BUTTON.into();
                *border = BorderColor::all(Color::srgba(1.0, 1.0, 1.0, 0.3));
            }
        }
    }
}

fn button_actions(
    mut commands: Commands,
    query: Query<(&Interaction, &MenuButton), Changed<Interaction>>,
    mut volumes: ResMut<VolumeSettings>,
    mut store: ResMut<PrefStore>,
    mut requests: MessageWriter<TransitionRequest>,
    asset_server: Res<AssetServer>,
    #[cfg(not(target_arch = "wasm32"))] mut exit: MessageWriter<AppExit>,
) {
    for (interaction, button) in &query {
        if *interaction != Interaction::Pressed {
            continue;
        }
        audio::play_ui_click(&mut commands, &asset_server, &volumes);
        match button {
            MenuButton::Play | MenuButton::Level(_) => {
                requests.write(load_request(button));
            }
            MenuButton::VolumeDown => {
                let current = volumes.get(AudioChannel::Master);
                volumes.set(AudioChannel::Master, current - VOLUME_STEP, &mut store);
            }
            MenuButton::VolumeUp => {
                let current = volumes.get(AudioChannel::Master);
                volumes.set(AudioChannel::Master, current + VOLUME_STEP, &mut store);
            }
            #[cfg(not(target_arch = "wasm32"))]
            MenuButton::Exit => {
                exit.write(AppExit::Success);
            }
        }
    }
}

/// Play always starts over from the first level; the level-select row is
/// the route into later unlocks.
fn load_request(button: &MenuButton) -> TransitionRequest {
    match button {
        MenuButton::Level(level) => TransitionRequest::Level(*level),
        _ => TransitionRequest::Level(1),
    }
}

fn volume_label(volumes: &VolumeSettings) -> String {
    format!(
        "Volume {:.0}%",
        volumes.get(AudioChannel::Master) * 100.0
    )
}

fn volume_label_sync(volumes: Res<VolumeSettings>, mut label: Query<&mut Text, With<VolumeLabel>>) {
    if !volumes.is_changed() {
        return;
    }
    if let Ok(mut text) = label.single_mut() {
        text.0 = volume_label(&volumes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_starts_the_first_level() {
        // Even with later levels unlocked, Play is a fresh run from level 1.
        assert_eq!(
            load_request(&MenuButton::Play),
            TransitionRequest::Level(1)
        );
    }

    #[test]
    fn level_buttons_target_their_own_level() {
        for level in [1, 3, 5] {
            assert_eq!(
                load_request(&MenuButton::Level(level)),
                TransitionRequest::Level(level)
            );
        }
    }
}
