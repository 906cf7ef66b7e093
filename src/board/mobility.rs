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

//! Cache of the legal destinations of every piece.
//!
//! After a move only some pieces can have gained or lost moves:
//!
//! * the pieces the move touched and both kings;
//! * pieces controlling a square whose occupancy changed;
//! * pawns whose forward or capture squares include such a square (kept
//!   in a reverse index, since a pawn's forward squares are not part of
//!   its control);
//! * pawns able to capture en passant, before and after the move;
//! * every piece of a side in check, and the pieces standing between a
//!   king and an enemy slider aligned with it.
//!
//! The watch set is taken before the move is applied and again after,
//! and the union is recomputed.

use super::coordinate::{Coordinate, Mask, Offset};
use super::factory;
use super::material::{Color, PieceKind};
use super::pattern::{self, KING_MOVES};
use super::piece::{PieceId, PieceSet};
use super::Board;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobilityManager {
    moves: Vec<Mask>,
    fronts: Vec<Mask>,
    watchers: [PieceSet; 64],
}

impl Default for MobilityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MobilityManager {
    pub fn new() -> Self {
        Self {
            moves: Vec::with_capacity(PieceId::LIMIT),
            fronts: Vec::with_capacity(PieceId::LIMIT),
            watchers: [PieceSet::empty(); 64],
        }
    }

    /// Legal destinations of `id`.
    #[inline]
    pub fn moves(&self, id: PieceId) -> Mask {
        self.moves.get(id.to_index()).copied().unwrap_or_default()
    }

    /// Pawns whose forward or capture squares include `square`.
    #[inline]
    pub fn pawns_watching(&self, square: Coordinate) -> PieceSet {
        self.watchers[square]
    }

    fn set(&mut self, id: PieceId, moves: Mask, front: Mask) {
        let index = id.to_index();
        if self.moves.len() <= index {
            self.moves.resize(index + 1, Mask::empty());
            self.fronts.resize(index + 1, Mask::empty());
        }
        self.moves[index] = moves;
        let old = std::mem::replace(&mut self.fronts[index], front);
        for square in old - front {
            self.watchers[square].remove(id);
        }
        for square in front - old {
            self.watchers[square].insert(id);
        }
    }
}

impl Board {
    /// Recomputes the cached moves of `ids`.
    pub(super) fn refresh_mobility(&mut self, ids: PieceSet) {
        for id in ids.iter() {
            let moves = self.compute_mobility(id);
            let front = self.pawn_front(id);
            self.mobility.set(id, moves, front);
        }
    }

    /// Legal destinations of `id` derived from the board alone.
    pub(super) fn compute_mobility(&mut self, id: PieceId) -> Mask {
        let piece = self.pieces[id];
        let Some(from) = piece.position() else {
            return Mask::empty();
        };
        let reach = match piece.kind() {
            PieceKind::Pawn => pattern::pawn_front_squares(piece.color(), from),
            PieceKind::King => KING_MOVES[from] | castle_targets(from),
            _ => self.control.controlled_by(id),
        };
        let candidates = reach - self.occupancy[piece.color()];

        let mut moves = Mask::empty();
        for to in candidates {
            if factory::is_legal(self, from, to) {
                moves |= to;
            }
        }
        moves
    }

    fn pawn_front(&self, id: PieceId) -> Mask {
        let piece = &self.pieces[id];
        match piece.position() {
            Some(at) if piece.kind().is_pawn() => pattern::pawn_front_squares(piece.color(), at),
            _ => Mask::empty(),
        }
    }

    /// Pieces whose moves may change when the occupancy of `changed`
    /// changes. Taken once before and once after a move.
    pub(super) fn mobility_watch(&self, changed: Mask) -> PieceSet {
        let mut watch: PieceSet = [self.kings[Color::White], self.kings[Color::Black]]
            .into_iter()
            .collect();
        for square in changed {
            watch |= self.control.attackers(square);
            watch |= self.mobility.pawns_watching(square);
        }
        watch |= self.en_passant_capturers();
        for color in [Color::White, Color::Black] {
            watch |= if self.is_in_check(color) {
                self.playing_pieces(color).map(|(id, _)| id).collect()
            } else {
                self.pinned_candidates(color)
            };
        }
        watch
    }

    // Pieces of `color` standing between their king and an enemy slider
    // that would otherwise see the king.
    fn pinned_candidates(&self, color: Color) -> PieceSet {
        let mut set = PieceSet::empty();
        let Some(king) = self.king_position(color) else {
            return set;
        };
        for (_, slider) in self.playing_pieces(!color) {
            let Some(at) = slider.position() else {
                continue;
            };
            if !slider.kind().is_slider() || !pattern::lines(slider.kind(), at).contains(king) {
                continue;
            }
            let between = pattern::between(king, at) & self.occupancy[color];
            for square in between {
                if let Some(id) = self.squares[square].occupant() {
                    set.insert(id);
                }
            }
        }
        set
    }

    // Pawns that could capture the pawn that just double-stepped.
    fn en_passant_capturers(&self) -> PieceSet {
        let mut set = PieceSet::empty();
        let Some(last) = self.history.last_move() else {
            return set;
        };
        if !last.is_double_step() {
            return set;
        }
        for dx in [-1, 1] {
            let Some(square) = last.to() + Offset::new(dx, 0) else {
                continue;
            };
            if let Some(id) = self.squares[square].occupant() {
                let piece = &self.pieces[id];
                if piece.kind().is_pawn() && piece.color() != last.color() {
                    set.insert(id);
                }
            }
        }
        set
    }
}

// Squares two files away on the same rank.
fn castle_targets(from: Coordinate) -> Mask {
    [Offset::new(-2, 0), Offset::new(2, 0)]
        .into_iter()
        .filter_map(|offset| from + offset)
        .collect()
}
