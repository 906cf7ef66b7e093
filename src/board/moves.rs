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
use std::fmt;
use thiserror::Error;

use super::coordinate::{Coordinate, Mask};
use super::material::{Color, PieceKind, PromoteTo};
use super::piece::{PieceId, PieceSet, Pieces};

/// Why a move was declined. Never surfaced to `try_play_move` callers;
/// only logged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("No piece on {0}")]
    EmptySquare(Coordinate),
    #[error("It is not {0}'s turn")]
    NotYourTurn(Color),
    #[error("{0} cannot move from {1} to {2}")]
    NotPatternMove(PieceKind, Coordinate, Coordinate),
    #[error("The path from {0} to {1} is blocked")]
    Blocked(Coordinate, Coordinate),
    #[error("Cannot capture a piece of the same color on {0}")]
    OwnPiece(Coordinate),
    #[error("Cannot capture the king on {0}")]
    KingCapture(Coordinate),
    #[error("Castling is not allowed")]
    CastleNotAllowed,
    #[error("The king would be in check")]
    KingInCheck,
    #[error("The game is over")]
    GameOver,
    #[error("A promotion choice is pending")]
    PromotionPending,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceMove {
    pub piece: PieceId,
    pub from: Coordinate,
    pub to: Coordinate,
}

/// A piece taken off the board, by capture or because it promoted.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemovedPiece {
    pub piece: PieceId,
    pub at: Coordinate,
}

/// A piece that enters the board (the promoted piece). Its id is reserved
/// when the move is built.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddedPiece {
    pub id: PieceId,
    pub color: Color,
    pub kind: PieceKind,
    pub at: Coordinate,
}

/// The complete mutation a move performs.
///
/// Board mutation and cache invalidation both consume this value, for
/// real moves and temporary ones alike.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct MoveOperations {
    pub color: Color,
    pub captured: Option<RemovedPiece>,
    pub promoted: Option<RemovedPiece>,
    pub moved: Vec<PieceMove>,
    pub added: Option<AddedPiece>,
}

impl MoveOperations {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            captured: None,
            promoted: None,
            moved: Vec::with_capacity(2),
            added: None,
        }
    }
    pub fn relocate(mut self, piece: PieceId, from: Coordinate, to: Coordinate) -> Self {
        self.moved.push(PieceMove { piece, from, to });
        self
    }
    pub fn capture(mut self, piece: PieceId, at: Coordinate) -> Self {
        self.captured = Some(RemovedPiece { piece, at });
        self
    }
    pub fn promote(mut self, pawn: PieceId, from: Coordinate, added: AddedPiece) -> Self {
        self.promoted = Some(RemovedPiece {
            piece: pawn,
            at: from,
        });
        self.added = Some(added);
        self
    }

    /// Pieces leaving the board, captured first.
    pub fn removed(&self) -> impl Iterator<Item = &RemovedPiece> {
        self.captured.iter().chain(self.promoted.iter())
    }

    /// Every square whose occupancy this move changes.
    pub fn changed_squares(&self) -> Mask {
        let mut mask = Mask::empty();
        for removed in self.removed() {
            mask |= removed.at;
        }
        for moved in &self.moved {
            mask |= moved.from;
            mask |= moved.to;
        }
        if let Some(added) = &self.added {
            mask |= added.at;
        }
        mask
    }

    /// Every piece this move relocates, removes or adds.
    pub fn touched_pieces(&self) -> PieceSet {
        let mut set: PieceSet = self.moved.iter().map(|m| m.piece).collect();
        for removed in self.removed() {
            set.insert(removed.piece);
        }
        if let Some(added) = &self.added {
            set.insert(added.id);
        }
        set
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Generic,
    Castle {
        side: CastleSide,
        rook: PieceId,
        rook_from: Coordinate,
        rook_to: Coordinate,
    },
    EnPassant {
        captured_at: Coordinate,
    },
    Promotion {
        promote_to: PromoteTo,
    },
}

/// What a notation layer needs to tell the mover apart from other like
/// pieces that could legally reach the same destination.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Disambiguation {
    #[default]
    None,
    File,
    Rank,
    Both,
}

/// A legal move, built by the move factory.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    kind: MoveKind,
    color: Color,
    piece: PieceId,
    piece_kind: PieceKind,
    from: Coordinate,
    to: Coordinate,
    captured: Option<PieceKind>,
    operations: MoveOperations,
    disambiguation: Disambiguation,
    check: bool,
    mate: bool,
}

impl Move {
    pub(crate) fn new(
        kind: MoveKind,
        piece: PieceId,
        piece_kind: PieceKind,
        from: Coordinate,
        to: Coordinate,
        captured: Option<PieceKind>,
        operations: MoveOperations,
    ) -> Self {
        Self {
            kind,
            color: operations.color,
            piece,
            piece_kind,
            from,
            to,
            captured,
            operations,
            disambiguation: Disambiguation::None,
            check: false,
            mate: false,
        }
    }
    #[inline]
    pub fn kind(&self) -> MoveKind {
        self.kind
    }
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }
    #[inline]
    pub fn piece(&self) -> PieceId {
        self.piece
    }
    #[inline]
    pub fn piece_kind(&self) -> PieceKind {
        self.piece_kind
    }
    #[inline]
    pub fn from(&self) -> Coordinate {
        self.from
    }
    #[inline]
    pub fn to(&self) -> Coordinate {
        self.to
    }
    #[inline]
    pub fn operations(&self) -> &MoveOperations {
        &self.operations
    }
    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
    /// Kind of the captured piece, if any.
    #[inline]
    pub fn captured(&self) -> Option<PieceKind> {
        self.captured
    }
    #[inline]
    pub fn is_castle(&self) -> bool {
        matches!(self.kind, MoveKind::Castle { .. })
    }
    #[inline]
    pub fn is_en_passant(&self) -> bool {
        matches!(self.kind, MoveKind::EnPassant { .. })
    }
    #[inline]
    pub fn promotion(&self) -> Option<PromoteTo> {
        match self.kind {
            MoveKind::Promotion { promote_to } => Some(promote_to),
            _ => None,
        }
    }
    #[inline]
    pub fn is_pawn_move(&self) -> bool {
        self.piece_kind.is_pawn()
    }
    /// A pawn moving two ranks from its starting square.
    pub fn is_double_step(&self) -> bool {
        self.piece_kind.is_pawn() && (self.to - self.from).y.abs() == 2
    }
    /// Pawn moves, captures, castles and promotions change the position
    /// for good: no earlier position can occur again.
    pub fn is_irreversible(&self) -> bool {
        self.is_pawn_move() || self.is_capture() || self.is_castle()
    }
    #[inline]
    pub fn disambiguation(&self) -> Disambiguation {
        self.disambiguation
    }
    #[inline]
    pub fn gives_check(&self) -> bool {
        self.check
    }
    #[inline]
    pub fn is_mate(&self) -> bool {
        self.mate
    }
    pub(crate) fn set_disambiguation(&mut self, disambiguation: Disambiguation) {
        self.disambiguation = disambiguation;
    }
    pub(crate) fn set_check(&mut self, check: bool, mate: bool) {
        self.check = check;
        self.mate = mate;
    }

    /// Flags the participants as having moved.
    pub(crate) fn on_played(&self, pieces: &mut Pieces) {
        for moved in &self.operations.moved {
            pieces[moved.piece].set_moved(true);
        }
        if let Some(added) = &self.operations.added {
            pieces[added.id].set_moved(true);
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MoveKind::Castle {
                side: CastleSide::King,
                ..
            } => write!(f, "O-O"),
            MoveKind::Castle {
                side: CastleSide::Queen,
                ..
            } => write!(f, "O-O-O"),
            MoveKind::Promotion { promote_to } => {
                write!(f, "{}{}={}", self.from, self.to, promote_to)
            }
            _ => write!(f, "{}{}", self.from, self.to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Coordinate::*;

    #[test]
    fn test_operations_changed_squares() {
        let ops = MoveOperations::new(Color::White)
            .relocate(PieceId::new(4), E4, D5)
            .capture(PieceId::new(20), D5);
        assert_eq!(ops.changed_squares(), Mask::from_coordinates([E4, D5]));
        assert_eq!(ops.touched_pieces().len(), 2);
    }
    #[test]
    fn test_promotion_operations() {
        let added = AddedPiece {
            id: PieceId::new(32),
            color: Color::White,
            kind: PieceKind::Queen,
            at: B8,
        };
        let ops = MoveOperations::new(Color::White)
            .capture(PieceId::new(17), B8)
            .promote(PieceId::new(8), A7, added);
        assert_eq!(ops.changed_squares(), Mask::from_coordinates([A7, B8]));
        let mv = Move::new(
            MoveKind::Promotion {
                promote_to: PromoteTo::Queen,
            },
            PieceId::new(8),
            PieceKind::Pawn,
            A7,
            B8,
            Some(PieceKind::Rook),
            ops,
        );
        assert_eq!(mv.from(), A7);
        assert_eq!(mv.to(), B8);
        assert!(mv.is_capture());
        assert!(mv.is_irreversible());
        assert_eq!(mv.to_string(), "a7b8=Queen");
    }
    #[test]
    fn test_double_step() {
        let ops = MoveOperations::new(Color::Black).relocate(PieceId::new(19), D7, D5);
        let mv = Move::new(
            MoveKind::Generic,
            PieceId::new(19),
            PieceKind::Pawn,
            D7,
            D5,
            None,
            ops,
        );
        assert!(mv.is_double_step());
        assert!(!mv.is_capture());
    }
}
