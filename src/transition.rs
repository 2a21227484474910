// Guarded scene transitions behind a full-screen loading card.
//
// Idle -> Loading (guard set, card fades in) -> commit behind the opaque
// card -> card fades out -> Idle (guard cleared). Requests arriving while
// the guard is set are rejected.

use bevy::prelude::*;

use crate::catalog::{SceneCatalog, MENU_SCENE};
use crate::screens::{ActiveScene, Screen};

pub struct TransitionPlugin;

impl Plugin for TransitionPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<TransitionRequest>()
            .init_resource::<TransitionInFlight>()
            .add_systems(Update, (begin_transition, drive_card).chain());
    }
}

/// The one canonical load API. `Named` covers reload and older call sites
/// that address scenes by identifier instead of level number.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub enum TransitionRequest {
    Level(u32),
    Named(String),
    Reload,
}

/// True from request acceptance until the card finishes fading out.
#[derive(Resource, Default)]
pub struct TransitionInFlight(pub bool);

const FADE_IN: f32 = 0.4;
const HOLD: f32 = 0.8;
const FADE_OUT: f32 = 0.6;
const TOTAL: f32 = FADE_IN + HOLD + FADE_OUT;
/// The scene switch happens mid-hold, while the card is fully opaque.
const COMMIT_AT: f32 = FADE_IN + HOLD * 0.5;

#[derive(Resource)]
struct PendingTransition {
    scene: String,
    level: Option<u32>,
    timer: f32,
    committed: bool,
}

#[derive(Component)]
struct CardRoot;

#[derive(Component)]
struct CardText;

#[derive(Debug, PartialEq, Eq)]
enum ResolveError {
    OutOfRange(u32),
    UnknownScene(String),
}

/// Resolve a request to a scene identifier and, for levels, its number.
/// `Named` bypasses range validation by design: legacy names route through
/// the `Level_<NN>` suffix parse even when outside the catalog.
fn resolve_request(
    request: &TransitionRequest,
    catalog: &SceneCatalog,
    current_scene: &str,
) -> Result<(String, Option<u32>), ResolveError> {
    match request {
        TransitionRequest::Level(number) => match catalog.scene_for_level(*number) {
            Some(scene) => Ok((scene.to_owned(), Some(*number))),
            None => Err(ResolveError::OutOfRange(*number)),
        },
        TransitionRequest::Named(name) if name == MENU_SCENE => Ok((name.clone(), None)),
        TransitionRequest::Named(name) => match catalog.level_for_scene(name) {
            Some(number) => Ok((name.clone(), Some(number))),
            None => Err(ResolveError::UnknownScene(name.clone())),
        },
        TransitionRequest::Reload => resolve_request(
            &TransitionRequest::Named(current_scene.to_owned()),
            catalog,
            current_scene,
        ),
    }
}

/// Admit or reject a request. Rejected while the guard is set; a request
/// that fails to resolve leaves the guard untouched. The request handler
/// runs on one thread, so this check-and-set is atomic.
fn admit_request(
    request: &TransitionRequest,
    catalog: &SceneCatalog,
    current_scene: &str,
    in_flight: &mut TransitionInFlight,
) -> Option<(String, Option<u32>)> {
    if in_flight.0 {
        warn!("transition already in flight, dropping {request:?}");
        return None;
    }
    match resolve_request(request, catalog, current_scene) {
        Ok(target) => {
            in_flight.0 = true;
            Some(target)
        }
        Err(ResolveError::OutOfRange(number)) => {
            warn!("ignoring load for out-of-range level {number}");
            None
        }
        Err(ResolveError::UnknownScene(name)) => {
            error!("no scene identifier for {name:?}");
            None
        }
    }
}

fn begin_transition(
    mut commands: Commands,
    mut requests: MessageReader<TransitionRequest>,
    catalog: Res<SceneCatalog>,
    active: Res<ActiveScene>,
    mut in_flight: ResMut<TransitionInFlight>,
    mut time: ResMut<Time<Virtual>>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    for request in requests.read() {
        let Some((scene, level)) = admit_request(request, &catalog, &active.name, &mut in_flight)
        else {
            continue;
        };

        // A paused session never carries into a new scene.
        time.unpause();

        let title = match level {
            Some(number) => format!("Level {number}"),
            None => "Main Menu".to_owned(),
        };
        spawn_card(&mut commands, &title);
        commands.insert_resource(PendingTransition {
            scene: scene.clone(),
            level,
            timer: 0.0,
            committed: false,
        });
        next_screen.set(Screen::Loading);
        info!("loading {scene}");
    }
}

fn spawn_card(commands: &mut Commands, title: &str) {
    commands
        .spawn((
            CardRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                position_type: PositionType::Absolute,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
            GlobalZIndex(100),
        ))
        .with_children(|parent| {
            parent.spawn((
                CardText,
                Text::new(title),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::srgba(1.0, 1.0, 1.0, 0.0)),
            ));
        });
}

fn drive_card(
    mut commands: Commands,
    // Real time: a gameplay pause during the fade-out tail must not stall
    // the card, or the guard would never clear.
    time: Res<Time<Real>>,
    pending: Option<ResMut<PendingTransition>>,
    mut in_flight: ResMut<TransitionInFlight>,
    mut active: ResMut<ActiveScene>,
    mut next_screen: ResMut<NextState<Screen>>,
    roots: Query<Entity, With<CardRoot>>,
    mut texts: Query<&mut TextColor, With<CardText>>,
    mut backgrounds: Query<&mut BackgroundColor, With<CardRoot>>,
) {
    let Some(mut pending) = pending else {
        return;
    };

    pending.timer += time.delta_secs();
    let t = pending.timer;

    if !pending.committed && t >= COMMIT_AT {
        // The load completes behind the opaque card.
        active.name = pending.scene.clone();
        active.level = pending.level;
        next_screen.set(match pending.level {
            Some(_) => Screen::Playing,
            None => Screen::Menu,
        });
        pending.committed = true;
    }

    if t >= TOTAL {
        for entity in &roots {
            commands.entity(entity).despawn();
        }
        commands.remove_resource::<PendingTransition>();
        in_flight.0 = false;
        return;
    }

    let alpha = if t < FADE_IN {
        t / FADE_IN
    } else if t < FADE_IN + HOLD {
        1.0
    } else {
        1.0 - (t - FADE_IN - HOLD) / FADE_OUT
    };

    for mut color in &mut texts {
        color.0 = Color::srgba(1.0, 1.0, 1.0, alpha);
    }
    for mut bg in &mut backgrounds {
        bg.0 = Color::srgba(0.0, 0.0, 0.0, alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_requests_resolve_through_the_catalog() {
        let catalog = SceneCatalog::default();
        let target = resolve_request(&TransitionRequest::Level(2), &catalog, MENU_SCENE);
        assert_eq!(target, Ok(("Level_02".to_owned(), Some(2))));
    }

    #[test]
    fn out_of_range_level_requests_are_rejected() {
        let catalog = SceneCatalog::default();
        for number in [0, 6, 99] {
            let target = resolve_request(&TransitionRequest::Level(number), &catalog, MENU_SCENE);
            assert_eq!(target, Err(ResolveError::OutOfRange(number)));
        }
    }

    #[test]
    fn named_requests_bypass_range_validation() {
        let catalog = SceneCatalog::with_levels(2);
        let target = resolve_request(
            &TransitionRequest::Named("Level_07".to_owned()),
            &catalog,
            MENU_SCENE,
        );
        // Not in the catalog, but the naming convention still derives a number.
        assert_eq!(target, Ok(("Level_07".to_owned(), Some(7))));

        let unknown = resolve_request(
            &TransitionRequest::Named("Bonus".to_owned()),
            &catalog,
            MENU_SCENE,
        );
        assert_eq!(unknown, Err(ResolveError::UnknownScene("Bonus".to_owned())));
    }

    #[test]
    fn reload_targets_the_active_scene() {
        let catalog = SceneCatalog::default();
        let target = resolve_request(&TransitionRequest::Reload, &catalog, "Level_03");
        assert_eq!(target, Ok(("Level_03".to_owned(), Some(3))));

        let menu = resolve_request(&TransitionRequest::Reload, &catalog, MENU_SCENE);
        assert_eq!(menu, Ok((MENU_SCENE.to_owned(), None)));
    }

    #[test]
    fn commit_point_sits_inside_the_opaque_hold() {
        assert!(COMMIT_AT > FADE_IN);
        assert!(COMMIT_AT < FADE_IN + HOLD);
        assert!(TOTAL > COMMIT_AT);
    }

    #[test]
    fn requests_are_rejected_while_a_transition_is_in_flight() {
        let catalog = SceneCatalog::default();
        let mut in_flight = TransitionInFlight::default();

        let first = admit_request(
            &TransitionRequest::Level(1),
            &catalog,
            MENU_SCENE,
            &mut in_flight,
        );
        assert_eq!(first, Some(("Level_01".to_owned(), Some(1))));
        assert!(in_flight.0);

        // A second request arriving before the card finishes is dropped.
        let second = admit_request(
            &TransitionRequest::Level(2),
            &catalog,
            MENU_SCENE,
            &mut in_flight,
        );
        assert_eq!(second, None);
        assert!(in_flight.0);

        // Once the card completes the guard clears and requests flow again.
        in_flight.0 = false;
        let third = admit_request(
            &TransitionRequest::Reload,
            &catalog,
            "Level_01",
            &mut in_flight,
        );
        assert_eq!(third, Some(("Level_01".to_owned(), Some(1))));
    }

    #[test]
    fn unresolvable_requests_leave_the_guard_untouched() {
        let catalog = SceneCatalog::default();
        let mut in_flight = TransitionInFlight::default();

        let rejected = admit_request(
            &TransitionRequest::Level(99),
            &catalog,
            MENU_SCENE,
            &mut in_flight,
        );
        assert_eq!(rejected, None);
        assert!(!in_flight.0);
    }

    #[test]
    fn card_completes_while_gameplay_time_is_paused() {
        use std::time::Duration;

        use bevy::state::app::StatesPlugin;
        use bevy::time::TimeUpdateStrategy;

        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
                400,
            )))
            .init_state::<Screen>()
            .init_resource::<ActiveScene>()
            .init_resource::<SceneCatalog>()
            .add_plugins(TransitionPlugin);

        app.world_mut().write_message(TransitionRequest::Level(1));
        app.update();
        assert!(app.world().resource::<TransitionInFlight>().0);

        // A fail during the fade-out tail freezes the gameplay clock. The
        // card runs on real time, so it must still finish and clear the
        // guard for the retry request that follows.
        app.world_mut().resource_mut::<Time<Virtual>>().pause();
        for _ in 0..10 {
            app.update();
        }

        assert!(!app.world().resource::<TransitionInFlight>().0);
        let active = app.world().resource::<ActiveScene>();
        assert_eq!(active.name, "Level_01");
        assert_eq!(active.level, Some(1));
        assert_eq!(
            *app.world().resource::<State<Screen>>().get(),
            Screen::Playing
        );
    }
}
