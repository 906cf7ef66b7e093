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

use super::coordinate::{Coordinate, Direction, Offset, Rank};
use super::material::{PieceKind, PromoteTo};
use super::moves::{
    AddedPiece, CastleSide, Disambiguation, Move, MoveError, MoveKind, MoveOperations,
};
use super::pattern::{self, PatternContext};
use super::piece::{Piece, PieceId};
use super::{Board, Turn};

use MoveError::*;

/// Builds legal moves for a board.
///
/// Move kinds are tried in a fixed order: promotion, en passant, castle,
/// then generic. Every candidate is played on a temporary scope to make
/// sure it does not leave the mover's king attacked.
pub struct MoveFactory<'a> {
    board: &'a mut Board,
}

impl<'a> MoveFactory<'a> {
    pub fn new(board: &'a mut Board) -> Self {
        Self { board }
    }

    /// The move a player asks for: it must be their turn, the game must
    /// be ongoing and no promotion may be pending.
    pub fn create(
        &mut self,
        from: Coordinate,
        to: Coordinate,
        promote_to: PromoteTo,
    ) -> Result<Move, MoveError> {
        if self.board.state.is_ended() {
            return Err(GameOver);
        }
        if self.board.pending.is_some() {
            return Err(PromotionPending);
        }
        let piece = self.piece_on(from)?;
        if piece.color() != self.board.turn() {
            return Err(NotYourTurn(piece.color()));
        }
        let mut mv = self.build(from, to, promote_to)?;
        mv.set_disambiguation(self.disambiguate(&mv));
        Ok(mv)
    }

    pub fn try_create_valid_move(
        &mut self,
        from: Coordinate,
        to: Coordinate,
        promote_to: PromoteTo,
    ) -> Option<Move> {
        self.create(from, to, promote_to).ok()
    }

    /// A legal move of the piece on `from`, whoever's turn it is.
    pub fn build(
        &mut self,
        from: Coordinate,
        to: Coordinate,
        promote_to: PromoteTo,
    ) -> Result<Move, MoveError> {
        let piece = self.piece_on(from)?;
        if from == to {
            return Err(NotPatternMove(piece.kind(), from, to));
        }
        let target = self.board.piece_at(to).copied();
        if let Some(target) = target {
            if target.color() == piece.color() {
                return Err(OwnPiece(to));
            }
            if target.kind().is_king() {
                return Err(KingCapture(to));
            }
        }

        let mv = if piece.kind().is_pawn() && to.rank() == Rank::promotion_rank(piece.color()) {
            self.promotion(&piece, from, to, promote_to)?
        } else if let Some(mv) = self.en_passant(&piece, from, to) {
            mv
        } else if piece.kind().is_king() && (to - from).x.abs() == 2 && (to - from).y == 0 {
            return self.castle(&piece, from, to);
        } else {
            self.generic(&piece, from, to)?
        };

        if self.board.would_be_in_check_after_move(mv.operations()) {
            return Err(KingInCheck);
        }
        Ok(mv)
    }

    fn piece_on(&self, at: Coordinate) -> Result<Piece, MoveError> {
        self.board.piece_at(at).copied().ok_or(EmptySquare(at))
    }

    fn id_on(&self, at: Coordinate) -> Result<PieceId, MoveError> {
        self.board.occupant(at).ok_or(EmptySquare(at))
    }

    // Pattern, obstacles and capture rules shared by generic moves and
    // promotions.
    fn check_reach(
        &self,
        piece: &Piece,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<(), MoveError> {
        let context = PatternContext {
            has_moved: piece.has_moved(),
            target_occupied: self.board.is_occupied(to),
        };
        if !pattern::is_pattern_move(piece.kind(), piece.color(), from, to, context) {
            return Err(NotPatternMove(piece.kind(), from, to));
        }
        if !pattern::rules(piece.kind()).can_jump && !self.board.is_path_clear(from, to) {
            return Err(Blocked(from, to));
        }
        Ok(())
    }

    fn promotion(
        &self,
        piece: &Piece,
        from: Coordinate,
        to: Coordinate,
        promote_to: PromoteTo,
    ) -> Result<Move, MoveError> {
        self.check_reach(piece, from, to)?;
        let pawn = self.id_on(from)?;
        let added = AddedPiece {
            id: self.board.pieces.next_id(),
            color: piece.color(),
            kind: promote_to.into(),
            at: to,
        };
        let mut operations = MoveOperations::new(piece.color());
        let mut captured = None;
        if let Some(target) = self.board.occupant(to) {
            captured = Some(self.board.pieces[target].kind());
            operations = operations.capture(target, to);
        }
        Ok(Move::new(
            MoveKind::Promotion { promote_to },
            pawn,
            PieceKind::Pawn,
            from,
            to,
            captured,
            operations.promote(pawn, from, added),
        ))
    }

    // A diagonal pawn step onto an empty square, right after an enemy pawn
    // double-stepped past it.
    fn en_passant(&self, piece: &Piece, from: Coordinate, to: Coordinate) -> Option<Move> {
        if !piece.kind().is_pawn() || self.board.is_occupied(to) {
            return None;
        }
        let offset = to - from;
        if offset.x.abs() != 1 || offset.y != piece.color().forward() {
            return None;
        }
        let last = self.board.last_move()?;
        let captured_at = Coordinate::new(to.file(), from.rank());
        if !last.is_double_step() || last.color() == piece.color() || last.to() != captured_at {
            return None;
        }
        let pawn = self.board.occupant(from)?;
        let operations = MoveOperations::new(piece.color())
            .relocate(pawn, from, to)
            .capture(last.piece(), captured_at);
        Some(Move::new(
            MoveKind::EnPassant { captured_at },
            pawn,
            PieceKind::Pawn,
            from,
            to,
            Some(PieceKind::Pawn),
            operations,
        ))
    }

    // The king moves two files towards an unmoved rook of its color with
    // nothing in between. Neither the king's square nor the squares it
    // crosses or lands on may be attacked.
    fn castle(&self, piece: &Piece, from: Coordinate, to: Coordinate) -> Result<Move, MoveError> {
        let color = piece.color();
        if piece.has_moved() || from.rank() != Rank::back_rank(color) {
            return Err(CastleNotAllowed);
        }
        let (side, direction) = if to > from {
            (CastleSide::King, Direction::Right)
        } else {
            (CastleSide::Queen, Direction::Left)
        };

        let mut next = from + direction;
        let rook_from = loop {
            let Some(square) = next else {
                return Err(CastleNotAllowed);
            };
            if self.board.is_occupied(square) {
                break square;
            }
            next = square + direction;
        };
        let rook = self.id_on(rook_from)?;
        let rook_piece = self.board.pieces[rook];
        if !rook_piece.kind().is_rook() || rook_piece.color() != color || rook_piece.has_moved() {
            return Err(CastleNotAllowed);
        }
        // The rook must stand beyond the king's destination.
        if (rook_from - from).x.abs() <= 2 {
            return Err(CastleNotAllowed);
        }

        let step: Offset = direction.into();
        let transit = (from + step).ok_or(CastleNotAllowed)?;
        for square in [from, transit, to] {
            if self.board.is_attacked_by(square, !color) {
                return Err(CastleNotAllowed);
            }
        }

        let king = self.id_on(from)?;
        let operations = MoveOperations::new(color)
            .relocate(king, from, to)
            .relocate(rook, rook_from, transit);
        Ok(Move::new(
            MoveKind::Castle {
                side,
                rook,
                rook_from,
                rook_to: transit,
            },
            king,
            PieceKind::King,
            from,
            to,
            None,
            operations,
        ))
    }

    fn generic(&self, piece: &Piece, from: Coordinate, to: Coordinate) -> Result<Move, MoveError> {
        self.check_reach(piece, from, to)?;
        let id = self.id_on(from)?;
        let mut operations = MoveOperations::new(piece.color());
        let mut captured = None;
        if let Some(target) = self.board.occupant(to) {
            captured = Some(self.board.pieces[target].kind());
            operations = operations.capture(target, to);
        }
        Ok(Move::new(
            MoveKind::Generic,
            id,
            piece.kind(),
            from,
            to,
            captured,
            operations.relocate(id, from, to),
        ))
    }

    /// How much of the origin square a notation layer must show to tell
    /// the mover apart from other like pieces that can also reach the
    /// destination.
    pub fn disambiguate(&self, mv: &Move) -> Disambiguation {
        let kind = mv.piece_kind();
        if kind.is_pawn() || kind.is_king() || !matches!(mv.kind(), MoveKind::Generic) {
            return Disambiguation::None;
        }
        let rivals: Vec<Coordinate> = self
            .board
            .playing_pieces(mv.color())
            .filter(|(id, piece)| {
                *id != mv.piece()
                    && piece.kind() == kind
                    && self.board.mobility.moves(*id).contains(mv.to())
            })
            .filter_map(|(_, piece)| piece.position())
            .collect();
        if rivals.is_empty() {
            Disambiguation::None
        } else if rivals.iter().all(|at| at.file() != mv.from().file()) {
            Disambiguation::File
        } else if rivals.iter().all(|at| at.rank() != mv.from().rank()) {
            Disambiguation::Rank
        } else {
            Disambiguation::Both
        }
    }
}

/// Color-agnostic helper used by the mobility refresh.
pub(super) fn is_legal(board: &mut Board, from: Coordinate, to: Coordinate) -> bool {
    MoveFactory::new(board)
        .build(from, to, PromoteTo::Queen)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use crate::board::*;
    use Coordinate::*;
    use PieceKind::*;

    fn setup_board(placements: &[Placement]) -> Board {
        Board::new(placements).unwrap()
    }

    fn build(board: &mut Board, from: Coordinate, to: Coordinate) -> Result<Move, MoveError> {
        MoveFactory::new(board).build(from, to, PromoteTo::Queen)
    }

    #[test]
    fn test_generic_moves() {
        let mut board = Board::standard();
        assert!(build(&mut board, G1, F3).is_ok());
        assert!(build(&mut board, E2, E4).is_ok());
        assert_eq!(build(&mut board, F1, C4), Err(MoveError::Blocked(F1, C4)));
        assert_eq!(build(&mut board, D1, D2), Err(MoveError::OwnPiece(D2)));
        assert_eq!(build(&mut board, E4, E5), Err(MoveError::EmptySquare(E4)));
        assert_eq!(
            build(&mut board, G1, G3),
            Err(MoveError::NotPatternMove(Knight, G1, G3))
        );
    }

    #[test]
    fn test_create_checks_turn() {
        let mut board = Board::standard();
        let result = MoveFactory::new(&mut board).create(E7, E5, PromoteTo::Queen);
        assert_eq!(result, Err(MoveError::NotYourTurn(Color::Black)));
    }

    #[test]
    fn test_pinned_piece_cannot_leave_line() {
        let mut board = setup_board(&[
            Placement::white(King, E1),
            Placement::white(Rook, E4),
            Placement::black(Queen, E8),
            Placement::black(King, A8),
        ]);
        assert_eq!(build(&mut board, E4, A4), Err(MoveError::KingInCheck));
        assert!(build(&mut board, E4, E6).is_ok());
        assert!(build(&mut board, E4, E8).is_ok());
    }

    #[test]
    fn test_king_cannot_step_into_attack() {
        let mut board = setup_board(&[
            Placement::white(King, E1),
            Placement::black(Rook, D8),
            Placement::black(King, H8),
        ]);
        assert_eq!(build(&mut board, E1, D1), Err(MoveError::KingInCheck));
        assert_eq!(build(&mut board, E1, D2), Err(MoveError::KingInCheck));
        assert!(build(&mut board, E1, F2).is_ok());
    }

    #[test]
    fn test_king_cannot_retreat_along_checking_line() {
        let mut board = setup_board(&[
            Placement::white(King, E2),
            Placement::black(Rook, E8),
            Placement::black(King, H8),
        ]);
        assert!(board.is_in_check(Color::White));
        assert_eq!(build(&mut board, E2, E1), Err(MoveError::KingInCheck));
        assert!(build(&mut board, E2, D1).is_ok());
    }

    #[test]
    fn test_en_passant_capture() {
        let mut board = Board::replay(
            &ClassicSetup,
            &[(E2, E4), (A7, A6), (E4, E5), (D7, D5)],
        )
        .unwrap();
        let mv = build(&mut board, E5, D6).unwrap();
        assert!(mv.is_en_passant());
        assert!(mv.is_capture());
        assert_eq!(mv.operations().captured.map(|c| c.at), Some(D5));
    }

    #[test]
    fn test_castle_requirements() {
        let setup = [
            Placement::white(King, E1),
            Placement::white(Rook, H1),
            Placement::white(Rook, A1),
            Placement::white(Knight, B1),
            Placement::black(King, E8),
        ];
        let mut board = setup_board(&setup);
        let mv = build(&mut board, E1, G1).unwrap();
        assert!(mv.is_castle());
        assert_eq!(
            mv.operations().moved[1],
            PieceMove {
                piece: board.occupant(H1).unwrap(),
                from: H1,
                to: F1
            }
        );
        assert_eq!(build(&mut board, E1, C1), Err(MoveError::CastleNotAllowed));

        let mut moved = setup;
        moved[1] = Placement::white(Rook, H1).moved();
        let mut board = setup_board(&moved);
        assert_eq!(build(&mut board, E1, G1), Err(MoveError::CastleNotAllowed));
    }

    fn castle_board() -> Board {
        setup_board(&[
            Placement::white(King, E1),
            Placement::white(Rook, H1),
            Placement::black(King, A8),
        ])
    }

    #[test]
    fn test_king_move_forfeits_castle() {
        let mut board = castle_board();
        assert!(board.legal_moves(E1).unwrap().contains(G1));
        for (from, to) in [(E1, E2), (A8, B8), (E2, E1), (B8, A8)] {
            assert!(board.try_play_move(from, to));
        }
        assert!(!board.legal_moves(E1).unwrap().contains(G1));
        assert!(!board.try_play_move(E1, G1));
        assert_eq!(build(&mut board, E1, G1), Err(MoveError::CastleNotAllowed));
    }

    #[test]
    fn test_rook_move_forfeits_castle() {
        let mut board = castle_board();
        for (from, to) in [(H1, H2), (A8, B8), (H2, H1), (B8, A8)] {
            assert!(board.try_play_move(from, to));
        }
        assert!(!board.legal_moves(E1).unwrap().contains(G1));
        assert!(!board.try_play_move(E1, G1));
        assert_eq!(build(&mut board, E1, G1), Err(MoveError::CastleNotAllowed));
    }

    #[test]
    fn test_no_castle_out_of_check() {
        let mut board = setup_board(&[
            Placement::white(King, E1),
            Placement::white(Rook, H1),
            Placement::black(Rook, E8),
            Placement::black(King, A8),
        ]);
        assert!(board.is_in_check(Color::White));
        assert!(!board.legal_moves(E1).unwrap().contains(G1));
        assert_eq!(build(&mut board, E1, G1), Err(MoveError::CastleNotAllowed));
        assert!(!board.try_play_move(E1, G1));
    }

    #[test]
    fn test_no_castle_onto_attacked_square() {
        let mut board = setup_board(&[
            Placement::white(King, E1),
            Placement::white(Rook, H1),
            Placement::black(Rook, G8),
            Placement::black(King, A8),
        ]);
        assert!(!board.legal_moves(E1).unwrap().contains(G1));
        assert_eq!(build(&mut board, E1, G1), Err(MoveError::CastleNotAllowed));
    }

    #[test]
    fn test_castle_through_attack() {
        let mut board = setup_board(&[
            Placement::white(King, E1),
            Placement::white(Rook, H1),
            Placement::white(Rook, A1),
            Placement::black(Bishop, A6),
            Placement::black(Bishop, A2),
            Placement::black(King, E8),
        ]);
        // The bishop on a6 covers f1.
        assert_eq!(build(&mut board, E1, G1), Err(MoveError::CastleNotAllowed));
        assert!(!board.legal_moves(E1).unwrap().contains(G1));
        // b1 is attacked from a2, but the king does not cross it.
        assert!(board.is_attacked_by(B1, Color::Black));
        assert!(build(&mut board, E1, C1).is_ok());
        assert!(board.legal_moves(E1).unwrap().contains(C1));
    }

    #[test]
    fn test_promotion_adds_piece() {
        let mut board = setup_board(&[
            Placement::white(King, E1),
            Placement::white(Pawn, G7),
            Placement::black(Rook, H8),
            Placement::black(King, A1),
        ]);
        let mv = MoveFactory::new(&mut board)
            .build(G7, H8, PromoteTo::Knight)
            .unwrap();
        assert_eq!(mv.promotion(), Some(PromoteTo::Knight));
        assert_eq!(mv.captured(), Some(Rook));
        let added = mv.operations().added.unwrap();
        assert_eq!(added.kind, Knight);
        assert_eq!(added.id, board.pieces().next_id());
        assert!(build(&mut board, G7, G8).is_ok());
    }

    #[test]
    fn test_disambiguation() {
        let mut board = setup_board(&[
            Placement::white(King, E1),
            Placement::white(Rook, A1),
            Placement::white(Rook, A5),
            Placement::white(Knight, B1),
            Placement::white(Knight, F1),
            Placement::black(King, E8),
        ]);
        let mut create = |from, to| {
            MoveFactory::new(&mut board)
                .create(from, to, PromoteTo::Queen)
                .unwrap()
                .disambiguation()
        };
        assert_eq!(create(A1, A3), Disambiguation::Rank);
        assert_eq!(create(B1, D2), Disambiguation::File);
        assert_eq!(create(B1, C3), Disambiguation::None);
        assert_eq!(create(E1, D2), Disambiguation::None);
    }

    #[test]
    fn test_try_create_valid_move() {
        let mut board = Board::standard();
        let mut factory = MoveFactory::new(&mut board);
        assert!(factory.try_create_valid_move(E7, E5, PromoteTo::Queen).is_none());
        assert!(factory.try_create_valid_move(E2, E5, PromoteTo::Queen).is_none());
        let mv = factory
            .try_create_valid_move(G1, F3, PromoteTo::Queen)
            .unwrap();
        assert_eq!(mv.piece_kind(), Knight);
        assert_eq!(mv.to(), F3);
    }
}
