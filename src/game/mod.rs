// Copyright 2023 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

#[cfg(feature = "random")]
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::Display;

use crate::Color;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameId(u64);

impl GameId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
    #[cfg(feature = "random")]
    pub fn random() -> Self {
        Self(thread_rng().gen())
    }
}

impl Default for GameId {
    #[cfg(feature = "random")]
    fn default() -> Self {
        Self::random()
    }
    #[cfg(not(feature = "random"))]
    fn default() -> Self {
        Self(0)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEndedReason {
    CheckMate,
    Stalemate,
    FiftyMoveRule,
    ThreefoldRepetition,
    InsufficientMaterial,
    TimeUp,
    Resign,
    Abandon,
}

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameOutcome {
    pub fn win(color: Color) -> Self {
        match color {
            Color::White => Self::WhiteWins,
            Color::Black => Self::BlackWins,
        }
    }
    pub fn winner(&self) -> Option<Color> {
        match self {
            Self::WhiteWins => Some(Color::White),
            Self::BlackWins => Some(Color::Black),
            Self::Draw => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    Ongoing,
    Ended {
        reason: GameEndedReason,
        outcome: GameOutcome,
    },
}

impl GameState {
    pub fn ended(reason: GameEndedReason, outcome: GameOutcome) -> Self {
        Self::Ended { reason, outcome }
    }
    #[inline]
    pub fn is_ongoing(&self) -> bool {
        matches!(self, Self::Ongoing)
    }
    #[inline]
    pub fn is_ended(&self) -> bool {
        !self.is_ongoing()
    }
    pub fn reason(&self) -> Option<GameEndedReason> {
        match self {
            Self::Ongoing => None,
            Self::Ended { reason, .. } => Some(*reason),
        }
    }
    pub fn outcome(&self) -> Option<GameOutcome> {
        match self {
            Self::Ongoing => None,
            Self::Ended { outcome, .. } => Some(*outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_winner() {
        assert_eq!(GameOutcome::win(Color::Black), GameOutcome::BlackWins);
        assert_eq!(GameOutcome::WhiteWins.winner(), Some(Color::White));
        assert_eq!(GameOutcome::Draw.winner(), None);
    }
    #[test]
    fn test_game_state() {
        let state = GameState::default();
        assert!(state.is_ongoing());
        assert_eq!(state.reason(), None);
        let state = GameState::ended(GameEndedReason::Resign, GameOutcome::WhiteWins);
        assert!(state.is_ended());
        assert_eq!(state.reason(), Some(GameEndedReason::Resign));
        assert_eq!(state.outcome(), Some(GameOutcome::WhiteWins));
    }
    #[test]
    fn test_game_id_display() {
        assert_eq!(GameId::new(255).to_string(), "00000000000000ff");
    }
}
