//! Global state machine.
//!
//! ```text
//!   Menu --Play--> Playing --Win--> Win  --Reset--> Menu
//!                          \-Lose-> Lose --Reset--> Menu
//! ```
//!
//! Every other (state, command) pair is rejected, so a late `Win` after a
//! `Lose` (or the reverse) can never overwrite the first outcome.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Menu,
    Playing,
    Win,
    Lose,
}

/// Requests addressed to the state machine.
///
/// `Play`, `Win` and `Lose` are the gameplay entry points; `Reset` is the
/// external full reset that returns a finished round to the menu.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    Play,
    Win,
    Lose,
    Reset,
}

impl GameState {
    /// The state reached by applying `cmd`, or `None` if the edge is illegal.
    pub fn after(self, cmd: GameCommand) -> Option<GameState> {
        match (self, cmd) {
            (GameState::Menu, GameCommand::Play) => Some(GameState::Playing),
            (GameState::Playing, GameCommand::Win) => Some(GameState::Win),
            (GameState::Playing, GameCommand::Lose) => Some(GameState::Lose),
            (GameState::Win | GameState::Lose, GameCommand::Reset) => Some(GameState::Menu),
            _ => None,
        }
    }

    #[inline]
    pub fn is_playing(self) -> bool {
        self == GameState::Playing
    }
}

/// Marker: entity belongs to the current level and is despawned on reset.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct LevelScoped;
