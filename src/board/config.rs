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

use serde::{Deserialize, Serialize};

/// Which automatic end-of-game rules a board enforces.
///
/// Checkmate and stalemate are always detected while `end_game_rules`
/// is on; the draw rules can be switched off one by one.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct RulesConfig {
    pub end_game_rules: bool,
    /// Plies without a pawn move or capture that draw the game
    /// (`0` disables the rule).
    pub fifty_move_plies: u16,
    /// Occurrences of one position that draw the game (`0` disables).
    pub repetition_count: u8,
    pub insufficient_material: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            end_game_rules: true,
            fifty_move_plies: 100,
            repetition_count: 3,
            insufficient_material: true,
        }
    }
}

impl RulesConfig {
    /// No automatic game ending at all, e.g. for analysis boards.
    pub fn disabled() -> Self {
        Self {
            end_game_rules: false,
            ..Self::default()
        }
    }
}
