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

use std::collections::BTreeSet;

use super::config::RulesConfig;
use super::coordinate::Coordinate;
use super::material::{Color, PieceKind};
use super::moves::Move;
use super::{Board, Turn};
use crate::game::{GameEndedReason, GameOutcome};

use GameEndedReason::*;

/// A position as far as repetition is concerned: the side to move and
/// every move available to either side, keyed by piece kind rather than
/// piece identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionSignature {
    turn: Color,
    moves: BTreeSet<(Color, PieceKind, Coordinate, Coordinate)>,
}

impl PositionSignature {
    pub fn of(board: &Board, turn: Color) -> Self {
        let mut moves = BTreeSet::new();
        for (id, piece) in board.pieces().playing() {
            let Some(from) = piece.position() else {
                continue;
            };
            for to in board.mobility().moves(id) {
                moves.insert((piece.color(), piece.kind(), from, to));
            }
        }
        Self { turn, moves }
    }
}

/// Decides, after each move, whether the game is over.
///
/// Checks run in a fixed order and the first that fires wins: mate or
/// stalemate, the fifty-move rule, insufficient material, repetition.
/// A clock timeout is reported by the board itself.
#[derive(Debug, Clone)]
pub struct EndGameRules {
    config: RulesConfig,
    // Positions since the last irreversible move, oldest first.
    positions: Vec<PositionSignature>,
}

impl EndGameRules {
    pub fn new(config: RulesConfig, board: &Board) -> Self {
        Self {
            config,
            positions: vec![PositionSignature::of(board, board.turn())],
        }
    }

    pub fn on_move_played(
        &mut self,
        board: &Board,
        mv: &Move,
    ) -> Option<(GameEndedReason, GameOutcome)> {
        let next = !mv.color();

        if board.legal_move_count(next) == 0 {
            return Some(if board.is_in_check(next) {
                (CheckMate, GameOutcome::win(mv.color()))
            } else {
                (Stalemate, GameOutcome::Draw)
            });
        }

        let plies = self.config.fifty_move_plies;
        if plies > 0 && board.history().quiet_plies() >= plies {
            return Some((FiftyMoveRule, GameOutcome::Draw));
        }

        if self.config.insufficient_material && is_insufficient_material(board) {
            return Some((InsufficientMaterial, GameOutcome::Draw));
        }

        if mv.is_irreversible() {
            self.positions.clear();
        }
        let signature = PositionSignature::of(board, next);
        let earlier = self.positions.iter().filter(|p| **p == signature).count();
        self.positions.push(signature);
        let count = self.config.repetition_count as usize;
        if count > 0 && earlier + 1 >= count {
            return Some((ThreefoldRepetition, GameOutcome::Draw));
        }
        None
    }

    /// Positions recorded since the last irreversible move.
    pub fn positions(&self) -> &[PositionSignature] {
        &self.positions
    }
}

/// Neither side can mate: kings only, kings and bishops all standing on
/// squares of one color, or kings and a single knight.
pub fn is_insufficient_material(board: &Board) -> bool {
    let mut knights = 0;
    let mut bishops = 0;
    let mut light = 0;
    for (_, piece) in board.pieces().playing() {
        match piece.kind() {
            PieceKind::King => {}
            PieceKind::Knight => knights += 1,
            PieceKind::Bishop => {
                bishops += 1;
                if piece.position().is_some_and(|at| at.is_light()) {
                    light += 1;
                }
            }
            _ => return false,
        }
    }
    match (knights, bishops) {
        (0, 0) | (1, 0) => true,
        (0, _) => light == 0 || light == bishops,
        _ => false,
    }
}
