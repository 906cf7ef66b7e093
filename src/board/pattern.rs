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

//! Per-kind movement rules.
//!
//! Every `PieceKind` maps to a `KindRules` entry holding two pure
//! functions: a move-pattern predicate (can a piece of this kind go from
//! one coordinate to another, ignoring obstacles and check) and a
//! controlled-square generator (which squares does it attack given the
//! current occupancy). The lookup tables backing them are built once.

use once_cell::sync::Lazy;
use strum::IntoEnumIterator;

use super::coordinate::{Coordinate, Direction, Mask, Offset, Rank};
use super::material::{Color, Pair, PieceKind};

use Color::*;

/// What the pattern predicate may know about the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatternContext {
    pub has_moved: bool,
    pub target_occupied: bool,
}

pub type PatternFn = fn(Color, Coordinate, Coordinate, PatternContext) -> bool;
pub type ControlFn = fn(Color, Coordinate, Mask) -> Mask;

pub struct KindRules {
    pub kind: PieceKind,
    pub can_jump: bool,
    pub is_pattern_move: PatternFn,
    pub controlled: ControlFn,
}

static RULES: [KindRules; 6] = [
    KindRules {
        kind: PieceKind::Pawn,
        can_jump: false,
        is_pattern_move: pawn_pattern,
        controlled: pawn_control,
    },
    KindRules {
        kind: PieceKind::Knight,
        can_jump: true,
        is_pattern_move: knight_pattern,
        controlled: knight_control,
    },
    KindRules {
        kind: PieceKind::Bishop,
        can_jump: false,
        is_pattern_move: bishop_pattern,
        controlled: bishop_control,
    },
    KindRules {
        kind: PieceKind::Rook,
        can_jump: false,
        is_pattern_move: rook_pattern,
        controlled: rook_control,
    },
    KindRules {
        kind: PieceKind::Queen,
        can_jump: false,
        is_pattern_move: queen_pattern,
        controlled: queen_control,
    },
    KindRules {
        kind: PieceKind::King,
        can_jump: false,
        is_pattern_move: king_pattern,
        controlled: king_control,
    },
];

#[inline]
pub fn rules(kind: PieceKind) -> &'static KindRules {
    let rules = &RULES[kind.to_index()];
    debug_assert_eq!(rules.kind, kind);
    rules
}

/// Squares a piece of `kind` standing on `from` attacks.
#[inline]
pub fn controlled(kind: PieceKind, color: Color, from: Coordinate, occupied: Mask) -> Mask {
    (rules(kind).controlled)(color, from, occupied)
}

#[inline]
pub fn is_pattern_move(
    kind: PieceKind,
    color: Color,
    from: Coordinate,
    to: Coordinate,
    context: PatternContext,
) -> bool {
    from != to && (rules(kind).is_pattern_move)(color, from, to, context)
}

fn pawn_pattern(color: Color, from: Coordinate, to: Coordinate, context: PatternContext) -> bool {
    let offset = to - from;
    let forward = offset.y * color.forward();
    if context.target_occupied {
        forward == 1 && offset.x.abs() == 1
    } else if offset.x != 0 {
        false
    } else {
        forward == 1
            || (forward == 2 && !context.has_moved && from.rank() == Rank::pawn_rank(color))
    }
}

fn knight_pattern(_: Color, from: Coordinate, to: Coordinate, _: PatternContext) -> bool {
    (to - from).is_knight_jump()
}

fn bishop_pattern(_: Color, from: Coordinate, to: Coordinate, _: PatternContext) -> bool {
    (to - from).is_diagonal()
}

fn rook_pattern(_: Color, from: Coordinate, to: Coordinate, _: PatternContext) -> bool {
    (to - from).is_straight()
}

fn queen_pattern(_: Color, from: Coordinate, to: Coordinate, _: PatternContext) -> bool {
    let offset = to - from;
    offset.is_straight() || offset.is_diagonal()
}

fn king_pattern(_: Color, from: Coordinate, to: Coordinate, _: PatternContext) -> bool {
    (to - from).is_adjacent()
}

fn pawn_control(color: Color, from: Coordinate, _: Mask) -> Mask {
    PAWN_ATTACKS[color][from]
}

fn knight_control(_: Color, from: Coordinate, _: Mask) -> Mask {
    KNIGHT_MOVES[from]
}

fn bishop_control(_: Color, from: Coordinate, occupied: Mask) -> Mask {
    slide(from, occupied, Direction::diagonals())
}

fn rook_control(_: Color, from: Coordinate, occupied: Mask) -> Mask {
    slide(from, occupied, Direction::straights())
}

fn queen_control(_: Color, from: Coordinate, occupied: Mask) -> Mask {
    slide(from, occupied, Direction::iter())
}

fn king_control(_: Color, from: Coordinate, _: Mask) -> Mask {
    KING_MOVES[from]
}

// Walks each direction until the edge or the first occupied square
// (which is included: it is either captured or defended).
fn slide<I>(from: Coordinate, occupied: Mask, directions: I) -> Mask
where
    I: IntoIterator<Item = Direction>,
{
    let mut mask = Mask::empty();
    for dir in directions {
        let mut next = from + dir;
        while let Some(square) = next {
            mask |= square;
            if occupied.contains(square) {
                break;
            }
            next = square + dir;
        }
    }
    mask
}

/// The squares a pawn's mobility depends on: its forward square(s) and
/// its two capture diagonals.
pub fn pawn_front_squares(color: Color, from: Coordinate) -> Mask {
    let mut mask = PAWN_ATTACKS[color][from];
    if let Some(one) = from + Offset::new(0, color.forward()) {
        mask |= one;
        if from.rank() == Rank::pawn_rank(color) {
            if let Some(two) = one + Offset::new(0, color.forward()) {
                mask |= two;
            }
        }
    }
    mask
}

/// Squares a sliding `kind` could reach from `from` on an empty board.
#[inline]
pub fn lines(kind: PieceKind, from: Coordinate) -> Mask {
    match kind {
        PieceKind::Rook => STRAIGHTS[from],
        PieceKind::Bishop => DIAGONALS[from],
        PieceKind::Queen => STRAIGHTS[from] | DIAGONALS[from],
        _ => Mask::empty(),
    }
}

/// Squares strictly between `from` and `to` when they share a rank, file
/// or diagonal; empty otherwise.
#[inline]
pub fn between(from: Coordinate, to: Coordinate) -> Mask {
    SQUARES_BETWEEN[from.to_index() * 64 + to.to_index()]
}

pub(super) static KING_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Coordinate::iter() {
        array[square] = Mask::from_coordinates(Direction::iter().filter_map(|dir| square + dir));
    }
    array
});

pub(super) static KNIGHT_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    const OFFSETS: [Offset; 8] = [
        Offset::new(-2, -1),
        Offset::new(-2, 1),
        Offset::new(2, -1),
        Offset::new(2, 1),
        Offset::new(-1, -2),
        Offset::new(-1, 2),
        Offset::new(1, -2),
        Offset::new(1, 2),
    ];
    let mut array = [Mask::default(); 64];
    for square in Coordinate::iter() {
        array[square] =
            Mask::from_coordinates(OFFSETS.into_iter().filter_map(|offset| square + offset));
    }
    array
});

pub(super) static PAWN_ATTACKS: Lazy<Pair<[Mask; 64]>> = Lazy::new(|| {
    fn attacks(color: Color) -> [Mask; 64] {
        let offsets = [
            Offset::new(-1, color.forward()),
            Offset::new(1, color.forward()),
        ];
        let mut array = [Mask::default(); 64];
        for square in Coordinate::iter() {
            if square.rank() == Rank::promotion_rank(color) {
                continue;
            }
            array[square] =
                Mask::from_coordinates(offsets.into_iter().filter_map(|offset| square + offset));
        }
        array
    }
    Pair::new(attacks(White), attacks(Black))
});

static STRAIGHTS: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Coordinate::iter() {
        array[square] = slide(square, Mask::empty(), Direction::straights());
    }
    array
});

static DIAGONALS: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Coordinate::iter() {
        array[square] = slide(square, Mask::empty(), Direction::diagonals());
    }
    array
});

static SQUARES_BETWEEN: Lazy<Vec<Mask>> = Lazy::new(|| {
    fn squares_between(start: Coordinate, end: Coordinate) -> Mask {
        let mut mask = Mask::empty();
        if let Some(step) = (end - start).to_unit() {
            let mut next = start + step;
            while let Some(square) = next {
                if square == end {
                    break;
                }
                mask |= square;
                next = square + step;
            }
        }
        mask
    }

    let mut array = vec![Mask::empty(); 64 * 64];
    for start in Coordinate::iter() {
        for end in Coordinate::iter() {
            array[start.to_index() * 64 + end.to_index()] = squares_between(start, end);
        }
    }
    array
});

#[cfg(test)]
mod tests {
    use super::*;
    use Coordinate::*;
    use PieceKind::*;

    fn ctx(has_moved: bool, target_occupied: bool) -> PatternContext {
        PatternContext {
            has_moved,
            target_occupied,
        }
    }

    #[test]
    fn test_between_a3_and_e3() {
        let mask = between(A3, E3);
        assert_eq!(mask.len(), 3);
        assert!(!mask.contains(A3));
        assert!(mask.contains(B3));
        assert!(mask.contains(C3));
        assert!(mask.contains(D3));
        assert!(!mask.contains(E3));
    }
    #[test]
    fn test_between_a1_and_d4() {
        let mask = between(D4, A1);
        assert_eq!(mask.len(), 2);
        assert!(mask.contains(B2));
        assert!(mask.contains(C3));
    }
    #[test]
    fn test_between_unaligned_is_empty() {
        assert!(between(A1, H5).is_empty());
        assert!(between(G4, F5).is_empty());
        assert!(between(B1, C3).is_empty());
    }
    #[test]
    fn test_pawn_patterns() {
        assert!(is_pattern_move(Pawn, White, E2, E4, ctx(false, false)));
        assert!(!is_pattern_move(Pawn, White, E2, E4, ctx(true, false)));
        assert!(!is_pattern_move(Pawn, White, E3, E5, ctx(false, false)));
        assert!(is_pattern_move(Pawn, White, E2, E3, ctx(true, false)));
        assert!(!is_pattern_move(Pawn, White, E2, E3, ctx(true, true)));
        assert!(is_pattern_move(Pawn, White, E2, D3, ctx(true, true)));
        assert!(!is_pattern_move(Pawn, White, E2, D3, ctx(true, false)));
        assert!(!is_pattern_move(Pawn, White, E3, E2, ctx(true, false)));
        assert!(is_pattern_move(Pawn, Black, D7, D5, ctx(false, false)));
        assert!(is_pattern_move(Pawn, Black, D7, C6, ctx(false, true)));
        assert!(!is_pattern_move(Pawn, Black, D7, C8, ctx(false, true)));
    }
    #[test]
    fn test_piece_patterns() {
        assert!(is_pattern_move(Knight, White, G1, F3, ctx(false, false)));
        assert!(!is_pattern_move(Knight, White, G1, G3, ctx(false, false)));
        assert!(is_pattern_move(Bishop, White, C1, H6, ctx(false, false)));
        assert!(!is_pattern_move(Bishop, White, C1, C2, ctx(false, false)));
        assert!(is_pattern_move(Rook, White, A1, A8, ctx(false, false)));
        assert!(!is_pattern_move(Rook, White, A1, B2, ctx(false, false)));
        assert!(is_pattern_move(Queen, White, D1, H5, ctx(false, false)));
        assert!(is_pattern_move(Queen, White, D1, D8, ctx(false, false)));
        assert!(!is_pattern_move(Queen, White, D1, E3, ctx(false, false)));
        assert!(is_pattern_move(King, White, E1, F2, ctx(false, false)));
        assert!(!is_pattern_move(King, White, E1, G1, ctx(false, false)));
        assert!(!is_pattern_move(King, White, E1, E1, ctx(false, false)));
    }
    #[test]
    fn test_slider_control_stops_at_first_blocker() {
        let occupied = Mask::from_coordinates([D4, D6, F1]);
        let control = controlled(Rook, White, D1, occupied);
        assert!(control.contains(D2));
        assert!(control.contains(D4));
        assert!(!control.contains(D5));
        assert!(control.contains(A1));
        assert!(control.contains(E1));
        assert!(control.contains(F1));
        assert!(!control.contains(G1));
        assert_eq!(control.len(), 3 + 3 + 2);
    }
    #[test]
    fn test_pawn_control_is_diagonal() {
        let control = controlled(Pawn, White, E4, Mask::all());
        assert_eq!(control, Mask::from_coordinates([D5, F5]));
        let control = controlled(Pawn, Black, A7, Mask::empty());
        assert_eq!(control, Mask::from_coordinates([B6]));
    }
    #[test]
    fn test_knight_and_king_tables() {
        assert_eq!(KNIGHT_MOVES[A1], Mask::from_coordinates([B3, C2]));
        assert_eq!(KNIGHT_MOVES[D4].len(), 8);
        assert_eq!(KING_MOVES[H8], Mask::from_coordinates([G8, G7, H7]));
        assert_eq!(KING_MOVES[E4].len(), 8);
    }
    #[test]
    fn test_pawn_front_squares() {
        assert_eq!(
            pawn_front_squares(White, E2),
            Mask::from_coordinates([D3, E3, F3, E4])
        );
        assert_eq!(
            pawn_front_squares(Black, A5),
            Mask::from_coordinates([A4, B4])
        );
    }
    #[test]
    fn test_lines() {
        assert!(lines(Bishop, C5).contains(A3));
        assert!(lines(Bishop, C5).contains(G1));
        assert!(!lines(Bishop, C5).contains(C6));
        assert!(lines(Rook, G2).contains(G8));
        assert!(!lines(Rook, G2).contains(H1));
        assert!(lines(Knight, G2).is_empty());
    }
}
