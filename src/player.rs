// Side-scroller player controller: run, jump, gravity, platform landings.

use bevy::prelude::*;

use crate::audio::VolumeSettings;
use crate::hazards::{trigger_fail, FailLatch};
use crate::level::{Platform, KILL_Y};
use crate::screens::Screen;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::srgb(0.08, 0.08, 0.12)))
            .add_systems(Startup, spawn_player)
            .add_systems(OnEnter(Screen::Playing), show_player)
            .add_systems(OnEnter(Screen::Menu), hide_player)
            .add_systems(
                Update,
                (player_input, apply_movement, fall_out_check)
                    .chain()
                    .run_if(in_state(Screen::Playing)),
            );
    }
}

#[derive(Component)]
pub struct Player;

#[derive(Component, Default)]
pub struct Movement {
    pub velocity: Vec2,
    pub grounded: bool,
}

pub const PLAYER_HALF: Vec2 = Vec2::new(14.0, 20.0);

const MOVE_SPEED: f32 = 260.0;
const JUMP_SPEED: f32 = 620.0;
const GRAVITY: f32 = 1500.0;
const MAX_FALL_SPEED: f32 = 900.0;
const PLAYER_TINT: Color = Color::srgb(0.9, 0.9, 1.0);

/// Move the player to a point and reset motion. Shared by level spawn and
/// checkpoint respawn.
pub fn place_player(transform: &mut Transform, movement: &mut Movement, point: Vec2) {
    transform.translation = point.extend(5.0);
    movement.velocity = Vec2::ZERO;
    movement.grounded = false;
}

fn spawn_player(mut commands: Commands) {
    commands.spawn(Camera2d);
    commands.spawn((
        Player,
        Movement::default(),
        Sprite::from_color(PLAYER_TINT, PLAYER_HALF * 2.0),
        Transform::from_xyz(0.0, 0.0, 5.0),
        Visibility::Hidden,
    ));
}

fn show_player(mut player: Query<&mut Visibility, With<Player>>) {
    if let Ok(mut visibility) = player.single_mut() {
        *visibility = Visibility::Inherited;
    }
}

fn hide_player(mut player: Query<&mut Visibility, With<Player>>) {
    if let Ok(mut visibility) = player.single_mut() {
        *visibility = Visibility::Hidden;
    }
}

fn player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut player: Query<&mut Movement, With<Player>>,
) {
    let Ok(mut movement) = player.single_mut() else {
        return;
    };

    let mut direction = 0.0;
    if keyboard.pressed(KeyCode::ArrowLeft) || keyboard.pressed(KeyCode::KeyA) {
        direction -= 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowRight) || keyboard.pressed(KeyCode::KeyD) {
        direction += 1.0;
    }
    movement.velocity.x = direction * MOVE_SPEED;

    if movement.grounded
        && (keyboard.just_pressed(KeyCode::Space) || keyboard.just_pressed(KeyCode::ArrowUp))
    {
        movement.velocity.y = JUMP_SPEED;
        movement.grounded = false;
    }
}

fn apply_movement(
    time: Res<Time>,
    mut player: Query<(&mut Transform, &mut Movement), With<Player>>,
    platforms: Query<(&Transform, &Platform), Without<Player>>,
) {
    let Ok((mut transform, mut movement)) = player.single_mut() else {
        return;
    };
    let dt = time.delta_secs();

    movement.velocity.y = (movement.velocity.y - GRAVITY * dt).max(-MAX_FALL_SPEED);

    let prev_bottom = transform.translation.y - PLAYER_HALF.y;
    transform.translation.x += movement.velocity.x * dt;
    transform.translation.y += movement.velocity.y * dt;

    // Land on platform tops only while falling.
    movement.grounded = false;
    if movement.velocity.y <= 0.0 {
        for (platform_transform, platform) in &platforms {
            let top = platform_transform.translation.y + platform.half.y;
            let within_x = (transform.translation.x - platform_transform.translation.x).abs()
                <= platform.half.x + PLAYER_HALF.x;
            let new_bottom = transform.translation.y - PLAYER_HALF.y;
            if within_x && prev_bottom >= top - 1.0 && new_bottom <= top {
                transform.translation.y = top + PLAYER_HALF.y;
                movement.velocity.y = 0.0;
                movement.grounded = true;
            }
        }
    }
}

fn fall_out_check(
    mut commands: Commands,
    player: Query<&Transform, With<Player>>,
    mut latch: ResMut<FailLatch>,
    mut time: ResMut<Time<Virtual>>,
    asset_server: Res<AssetServer>,
    volumes: Res<VolumeSettings>,
) {
    let Ok(transform) = player.single() else {
        return;
    };
    if transform.translation.y < KILL_Y {
        trigger_fail(&mut commands, &mut latch, &mut time, &asset_server, &volumes);
    }
}
