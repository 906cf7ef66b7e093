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

use std::ops::Deref;
use tracing::trace;

use super::control::ControlUndo;
use super::coordinate::Coordinate;
use super::moves::MoveOperations;
use super::Board;

/// A move played on the board for as long as the scope lives.
///
/// Squares, piece positions and control are updated; history, turn,
/// mobility and the end-of-game rules are not. Dropping the scope restores
/// the exact prior state. The scope holds the board's only mutable borrow
/// and hands out shared access, so scopes cannot nest.
#[must_use]
pub struct TemporaryMove<'a> {
    board: &'a mut Board,
    operations: MoveOperations,
    undo: Option<ControlUndo>,
}

impl Deref for TemporaryMove<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl Drop for TemporaryMove<'_> {
    fn drop(&mut self) {
        if let Some(undo) = self.undo.take() {
            let touched = self.board.control.undo(&self.board.pieces, undo);
            self.board.revert_operations(&self.operations);
            self.board.sync_controlled_flags(touched);
            trace!(game = %self.board.id, "temporary move reverted");
        }
    }
}

impl Board {
    pub(super) fn play_temporary_operations(
        &mut self,
        operations: MoveOperations,
    ) -> TemporaryMove<'_> {
        self.apply_operations(&operations);
        let occupied = self.occupied();
        let (undo, touched) = self
            .control
            .on_move_played(&self.pieces, occupied, &operations);
        self.sync_controlled_flags(touched);
        TemporaryMove {
            board: self,
            operations,
            undo: Some(undo),
        }
    }

    /// Moves the piece on `from` to `to`, capturing whatever stands there,
    /// without any legality check. Returns `None` if `from` is empty.
    pub fn play_temporary_move(
        &mut self,
        from: Coordinate,
        to: Coordinate,
    ) -> Option<TemporaryMove<'_>> {
        let id = self.squares[from].occupant()?;
        let color = self.pieces[id].color();
        let mut operations = MoveOperations::new(color);
        if let Some(target) = self.squares[to].occupant() {
            if target == id {
                return None;
            }
            operations = operations.capture(target, to);
        }
        trace!(game = %self.id, %from, %to, "temporary move");
        Some(self.play_temporary_operations(operations.relocate(id, from, to)))
    }

    /// Whether the mover's king would be attacked once `operations` are
    /// applied.
    pub fn would_be_in_check_after_move(&mut self, operations: &MoveOperations) -> bool {
        let color = operations.color;
        let scope = self.play_temporary_operations(operations.clone());
        scope.is_in_check(color)
    }
}

#[cfg(test)]
mod tests {
    use crate::board::*;
    use pretty_assertions::assert_eq;
    use Coordinate::*;

    #[test]
    fn test_temporary_move_round_trip() {
        let mut board = Board::replay(&ClassicSetup, &[(E2, E4), (D7, D5)]).unwrap();
        let before = board.snapshot();
        {
            let scope = board.play_temporary_move(E4, D5).unwrap();
            assert!(scope.piece_at(E4).is_none());
            assert_eq!(scope.piece_at(D5).map(|p| p.color()), Some(Color::White));
            assert!(scope.is_attacked_by(E6, Color::White));
            assert_eq!(scope.captured(Color::Black).count(), 0);
            assert!(scope.pieces().iter().any(|(_, p)| p.is_captured()));
        }
        assert_eq!(board.snapshot(), before);
    }

    #[test]
    fn test_temporary_move_exposes_king() {
        let mut board = Board::new(&[
            Placement::white(PieceKind::King, E1),
            Placement::white(PieceKind::Bishop, E2),
            Placement::black(PieceKind::Rook, E8),
            Placement::black(PieceKind::King, A8),
        ])
        .unwrap();
        assert!(!board.is_in_check(Color::White));
        {
            let scope = board.play_temporary_move(E2, D3).unwrap();
            assert!(scope.is_in_check(Color::White));
        }
        assert!(!board.is_in_check(Color::White));
        assert!(board.square(E2).controlled_by_black());
        assert!(!board.square(E1).controlled_by_black());
    }

    #[test]
    fn test_temporary_promotion_round_trip() {
        let mut board = Board::new(&[
            Placement::white(PieceKind::King, E1),
            Placement::white(PieceKind::Pawn, B7),
            Placement::black(PieceKind::Knight, A8),
            Placement::black(PieceKind::King, H8),
        ])
        .unwrap();
        let before = board.snapshot();
        let pawn = board.occupant(B7).unwrap();
        let knight = board.occupant(A8).unwrap();
        let added = AddedPiece {
            id: board.pieces().next_id(),
            color: Color::White,
            kind: PieceKind::Queen,
            at: A8,
        };
        let operations = MoveOperations::new(Color::White)
            .capture(knight, A8)
            .promote(pawn, B7, added);
        {
            let scope = board.play_temporary_operations(operations);
            assert_eq!(scope.pieces().len(), 5);
            assert!(scope.is_in_check(Color::Black));
        }
        assert_eq!(board.pieces().len(), 4);
        assert_eq!(board.snapshot(), before);
    }

    #[test]
    fn test_temporary_move_from_empty_square() {
        let mut board = Board::standard();
        assert!(board.play_temporary_move(E4, E5).is_none());
    }
}
