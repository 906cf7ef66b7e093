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

use super::material::Color;
use super::moves::Move;

/// One full turn: a white move and the black reply, once played.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MovePair {
    number: usize,
    white: Move,
    black: Option<Move>,
}

impl MovePair {
    /// Move number, starting at 1.
    #[inline]
    pub fn number(&self) -> usize {
        self.number
    }
    #[inline]
    pub fn white(&self) -> &Move {
        &self.white
    }
    #[inline]
    pub fn black(&self) -> Option<&Move> {
        self.black.as_ref()
    }
    pub fn is_complete(&self) -> bool {
        self.black.is_some()
    }
}

/// Append-only log of the moves played on a board.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct MovesHistory {
    pairs: Vec<MovePair>,
    plies: usize,
    // Plies since the last pawn move or capture.
    quiet_plies: u16,
}

impl MovesHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_move_played(&mut self, mv: Move) {
        self.plies += 1;
        if mv.is_pawn_move() || mv.is_capture() {
            self.quiet_plies = 0;
        } else {
            self.quiet_plies = self.quiet_plies.saturating_add(1);
        }
        match (mv.color(), self.pairs.last_mut()) {
            (Color::Black, Some(pair)) if pair.black.is_none() => pair.black = Some(mv),
            _ => {
                let number = self.pairs.len() + 1;
                self.pairs.push(MovePair {
                    number,
                    white: mv,
                    black: None,
                });
            }
        }
    }

    /// Records whether the last move gave check or mate.
    pub(crate) fn mark_last(&mut self, check: bool, mate: bool) {
        let Some(pair) = self.pairs.last_mut() else {
            return;
        };
        match pair.black.as_mut() {
            Some(mv) => mv.set_check(check, mate),
            None => pair.white.set_check(check, mate),
        }
    }

    pub fn pairs(&self) -> &[MovePair] {
        &self.pairs
    }

    pub fn last_move(&self) -> Option<&Move> {
        let pair = self.pairs.last()?;
        pair.black.as_ref().or(Some(&pair.white))
    }

    /// Number of moves (plies) played.
    #[inline]
    pub fn len(&self) -> usize {
        self.plies
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.plies == 0
    }

    /// Plies played since the last pawn move or capture.
    #[inline]
    pub fn quiet_plies(&self) -> u16 {
        self.quiet_plies
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> {
        self.pairs
            .iter()
            .flat_map(|pair| std::iter::once(&pair.white).chain(pair.black.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::coordinate::Coordinate::{self, *};
    use crate::board::material::PieceKind;
    use crate::board::moves::{MoveKind, MoveOperations};
    use crate::board::piece::PieceId;

    fn quiet(color: Color, kind: PieceKind, from: Coordinate, to: Coordinate) -> Move {
        let ops = MoveOperations::new(color).relocate(PieceId::new(0), from, to);
        Move::new(MoveKind::Generic, PieceId::new(0), kind, from, to, None, ops)
    }

    #[test]
    fn test_pairs_are_numbered() {
        let mut history = MovesHistory::new();
        history.on_move_played(quiet(Color::White, PieceKind::Knight, G1, F3));
        history.on_move_played(quiet(Color::Black, PieceKind::Knight, G8, F6));
        history.on_move_played(quiet(Color::White, PieceKind::Knight, F3, G1));

        assert_eq!(history.len(), 3);
        assert_eq!(history.pairs().len(), 2);
        assert_eq!(history.pairs()[1].number(), 2);
        assert!(history.pairs()[0].is_complete());
        assert!(!history.pairs()[1].is_complete());
        assert_eq!(history.last_move().map(|m| m.to()), Some(G1));
        assert_eq!(history.quiet_plies(), 3);
        assert_eq!(
            history.iter().map(|m| m.from()).collect::<Vec<_>>(),
            vec![G1, G8, F3]
        );
    }

    #[test]
    fn test_pawn_move_resets_quiet_plies() {
        let mut history = MovesHistory::new();
        history.on_move_played(quiet(Color::White, PieceKind::Knight, G1, F3));
        history.on_move_played(quiet(Color::Black, PieceKind::Pawn, E7, E5));
        assert_eq!(history.quiet_plies(), 0);
        history.on_move_played(quiet(Color::White, PieceKind::Knight, F3, G1));
        assert_eq!(history.quiet_plies(), 1);
    }
}
