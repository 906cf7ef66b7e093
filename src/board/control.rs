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

//! Incremental index of the squares each piece attacks.
//!
//! Three structures are kept in lock step:
//!
//! * per piece, the mask of squares it controls;
//! * per square, the set of pieces controlling it (the transpose);
//! * per color, the union of its pieces' masks, backed by a per-square
//!   attacker count so that removing one attacker is O(1).
//!
//! A move only changes the control of the pieces it touches and of the
//! pieces that were controlling one of the squares whose occupancy
//! changed: a slider's ray always ends on the first occupied square, so a
//! slider whose line of sight opens or closes was already controlling the
//! square that changed.

use super::coordinate::{Coordinate, Mask};
use super::material::{Color, Pair};
use super::moves::MoveOperations;
use super::pattern;
use super::piece::{PieceId, PieceSet, Pieces};

/// Previous masks of every piece an update touched, in update order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct ControlUndo {
    entries: Vec<(PieceId, Mask)>,
    len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlManager {
    controlled: Vec<Mask>,
    attackers: [PieceSet; 64],
    counts: Pair<[u8; 64]>,
    aggregate: Pair<Mask>,
}

impl Default for ControlManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlManager {
    pub fn new() -> Self {
        Self {
            controlled: Vec::with_capacity(PieceId::LIMIT),
            attackers: [PieceSet::empty(); 64],
            counts: Pair::new([0; 64], [0; 64]),
            aggregate: Pair::new(Mask::empty(), Mask::empty()),
        }
    }

    /// Squares `id` currently controls.
    #[inline]
    pub fn controlled_by(&self, id: PieceId) -> Mask {
        self.controlled
            .get(id.to_index())
            .copied()
            .unwrap_or_default()
    }

    /// Pieces of either color controlling `square`.
    #[inline]
    pub fn attackers(&self, square: Coordinate) -> PieceSet {
        self.attackers[square]
    }

    /// Union of the squares controlled by `color`.
    #[inline]
    pub fn controlled_squares(&self, color: Color) -> Mask {
        self.aggregate[color]
    }

    #[inline]
    pub fn is_controlled(&self, square: Coordinate, by: Color) -> bool {
        self.aggregate[by].contains(square)
    }

    /// Computes and indexes the control of freshly placed pieces.
    ///
    /// Returns the squares whose aggregate may have changed.
    pub fn add_pieces<I>(&mut self, pieces: &Pieces, occupied: Mask, ids: I) -> Mask
    where
        I: IntoIterator<Item = PieceId>,
    {
        let mut touched = Mask::empty();
        for id in ids {
            let mask = Self::derive(pieces, occupied, id);
            let old = self.set(pieces, id, mask);
            touched |= old | mask;
        }
        touched
    }

    /// Brings the index up to date with a move that has already been
    /// applied to `pieces`. The returned log restores the previous state.
    pub fn on_move_played(
        &mut self,
        pieces: &Pieces,
        occupied: Mask,
        operations: &MoveOperations,
    ) -> (ControlUndo, Mask) {
        let mut affected = operations.touched_pieces();
        for square in operations.changed_squares() {
            affected |= self.attackers[square];
        }

        let mut undo = ControlUndo {
            entries: Vec::new(),
            len: self.controlled.len(),
        };
        let mut touched = Mask::empty();
        for id in affected.iter() {
            let mask = Self::derive(pieces, occupied, id);
            let old = self.set(pieces, id, mask);
            if old != mask {
                touched |= old | mask;
                undo.entries.push((id, old));
            }
        }
        (undo, touched)
    }

    /// Reverts an update. `pieces` must still hold every piece the update
    /// touched, since their colors are read from it.
    pub fn undo(&mut self, pieces: &Pieces, undo: ControlUndo) -> Mask {
        let mut touched = Mask::empty();
        for (id, old) in undo.entries.into_iter().rev() {
            let current = self.set(pieces, id, old);
            touched |= current | old;
        }
        self.controlled.truncate(undo.len);
        touched
    }

    /// Control of `id` derived from the board alone.
    pub fn derive(pieces: &Pieces, occupied: Mask, id: PieceId) -> Mask {
        let Some(piece) = pieces.get(id) else {
            return Mask::empty();
        };
        match piece.position() {
            Some(at) => pattern::controlled(piece.kind(), piece.color(), at, occupied),
            None => Mask::empty(),
        }
    }

    // Replaces the mask of `id` and maintains the transpose and the
    // per-color aggregate. Returns the previous mask.
    fn set(&mut self, pieces: &Pieces, id: PieceId, mask: Mask) -> Mask {
        let index = id.to_index();
        if self.controlled.len() <= index {
            self.controlled.resize(index + 1, Mask::empty());
        }
        let old = std::mem::replace(&mut self.controlled[index], mask);
        if old == mask {
            return old;
        }
        let color = pieces[id].color();
        for square in old - mask {
            self.attackers[square].remove(id);
            let count = &mut self.counts[color][square];
            *count -= 1;
            if *count == 0 {
                self.aggregate[color].reset(square);
            }
        }
        for square in mask - old {
            self.attackers[square].insert(id);
            let count = &mut self.counts[color][square];
            *count += 1;
            self.aggregate[color].set(square);
        }
        old
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::material::PieceKind::{self, *};
    use crate::board::piece::Piece;
    use pretty_assertions::assert_eq;
    use Color::*;
    use Coordinate::*;

    fn arena(pieces: &[(Color, PieceKind, Coordinate)]) -> (Pieces, Mask) {
        let mut arena = Pieces::new();
        let mut occupied = Mask::empty();
        for (color, kind, at) in pieces {
            arena.push(Piece::new(*color, *kind, *at));
            occupied |= *at;
        }
        (arena, occupied)
    }

    #[test]
    fn test_add_pieces_builds_transpose() {
        let (pieces, occupied) = arena(&[(White, Rook, A1), (White, King, E1), (Black, King, E8)]);
        let mut control = ControlManager::new();
        control.add_pieces(&pieces, occupied, pieces.iter().map(|(id, _)| id));

        let rook = PieceId::new(0);
        assert!(control.controlled_by(rook).contains(A8));
        assert!(control.controlled_by(rook).contains(E1));
        assert!(!control.controlled_by(rook).contains(F1));
        assert!(control.attackers(D1).contains(rook));
        assert!(control.attackers(D1).contains(PieceId::new(1)));
        assert!(control.is_controlled(D7, Black));
        assert!(!control.is_controlled(D6, Black));
    }

    #[test]
    fn test_move_reopens_slider_line() {
        let (mut pieces, mut occupied) = arena(&[
            (White, Rook, A1),
            (White, Knight, A3),
            (White, King, E1),
            (Black, King, E8),
        ]);
        let mut control = ControlManager::new();
        control.add_pieces(&pieces, occupied, pieces.iter().map(|(id, _)| id));
        assert!(!control.controlled_by(PieceId::new(0)).contains(A4));

        let knight = PieceId::new(1);
        let ops = MoveOperations::new(White).relocate(knight, A3, B5);
        pieces[knight].set_position(Some(B5));
        occupied = (occupied - A3) | B5;
        let (undo, _) = control.on_move_played(&pieces, occupied, &ops);

        assert!(control.controlled_by(PieceId::new(0)).contains(A8));
        assert!(control.controlled_by(knight).contains(C7));
        for (id, _) in pieces.iter() {
            assert_eq!(
                control.controlled_by(id),
                ControlManager::derive(&pieces, occupied, id)
            );
        }

        pieces[knight].set_position(Some(A3));
        occupied = (occupied - B5) | A3;
        let _ = control.undo(&pieces, undo);
        assert!(!control.controlled_by(PieceId::new(0)).contains(A4));
        let mut fresh = ControlManager::new();
        fresh.add_pieces(&pieces, occupied, pieces.iter().map(|(id, _)| id));
        assert_eq!(control, fresh);
    }

    #[test]
    fn test_capture_clears_control() {
        let (mut pieces, mut occupied) = arena(&[
            (White, Queen, D1),
            (Black, Bishop, D5),
            (White, King, E1),
            (Black, King, E8),
        ]);
        let mut control = ControlManager::new();
        control.add_pieces(&pieces, occupied, pieces.iter().map(|(id, _)| id));
        let queen = PieceId::new(0);
        let bishop = PieceId::new(1);
        assert!(control.is_controlled(A8, Black));

        let ops = MoveOperations::new(White)
            .relocate(queen, D1, D5)
            .capture(bishop, D5);
        pieces[bishop].set_position(None);
        pieces[queen].set_position(Some(D5));
        occupied = occupied - D1;
        let _ = control.on_move_played(&pieces, occupied, &ops);

        assert!(control.controlled_by(bishop).is_empty());
        assert!(!control.is_controlled(A8, Black));
        assert!(control.is_controlled(A8, White));
        assert!(control.attackers(H1).contains(queen));
    }
}
