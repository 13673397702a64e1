//! Flow plugin: turns `GameCommand`s into state transitions.
//!
//! ```text
//!   Requests: action pressed in Menu      -> Play
//!             action pressed in Win/Lose  -> Reset
//!   Commands: GameState::after(cmd), first legal command wins the frame
//!   OnEnter(Playing): shooters accept input
//!   OnExit(Playing):  shooters drop input (held shot despawned), movers stop
//! ```

use bevy::prelude::*;

use crate::common::sets::TickSet;
use crate::common::state::{GameCommand, GameState};
use crate::plugins::charge::ChargeShooter;
use crate::plugins::charge::systems::disable_input;
use crate::plugins::geometry::{CollisionIgnores, GroundProbe};
use crate::plugins::mass::Mass;
use crate::plugins::mover::{Mover, stop_all};
use crate::plugins::player::ChargeInput;

pub fn plugin(app: &mut App) {
    app.add_message::<GameCommand>()
        .add_systems(Update, request_from_action.in_set(TickSet::Requests))
        .add_systems(Update, apply_game_commands.in_set(TickSet::Commands))
        .add_systems(OnEnter(GameState::Playing), enable_shooters)
        .add_systems(OnExit(GameState::Playing), (disable_shooters, stop_movers));
}

/// The charge action doubles as the menu button.
pub fn request_from_action(
    input: Res<ChargeInput>,
    state: Res<State<GameState>>,
    mut out: MessageWriter<GameCommand>,
) {
    if !input.pressed {
        return;
    }
    match state.get() {
        GameState::Menu => {
            out.write(GameCommand::Play);
        }
        GameState::Win | GameState::Lose => {
            out.write(GameCommand::Reset);
        }
        GameState::Playing => {}
    }
}

/// Apply at most one transition per frame. Illegal commands are dropped.
pub fn apply_game_commands(
    mut commands_in: MessageReader<GameCommand>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
) {
    let current = *state.get();
    let mut target: Option<GameState> = None;

    for &cmd in commands_in.read() {
        if let Some(to) = target {
            debug!("{cmd:?} dropped; already moving to {to:?}");
            continue;
        }
        match current.after(cmd) {
            Some(to) => {
                info!("{current:?} -> {to:?} ({cmd:?})");
                target = Some(to);
            }
            None => debug!("{cmd:?} ignored in {current:?}"),
        }
    }

    if let Some(to) = target {
        next.set(to);
    }
}

fn enable_shooters(mut q: Query<&mut ChargeShooter>) {
    for mut shooter in &mut q {
        shooter.set_input_enabled(true);
    }
}

fn disable_shooters(
    mut commands: Commands,
    mut ignores: ResMut<CollisionIgnores>,
    mut q: Query<&mut ChargeShooter>,
) {
    for mut shooter in &mut q {
        disable_input(&mut commands, &mut ignores, &mut shooter);
    }
}

fn stop_movers(mut q: Query<(&mut Mover, &mut Transform, Option<&Mass>, Option<&GroundProbe>)>) {
    stop_all(&mut q);
}
