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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

use super::coordinate::{Coordinate, File, Mask, Rank};
use super::material::{Color, PieceKind};
use super::piece::Placement;

use PieceKind::{Bishop, King, Knight, Pawn, Queen, Rook};

#[derive(Error, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    #[error("Expecting exactly 1 {color} king, found {count}")]
    KingCount { color: Color, count: usize },
    #[error("More than one piece placed on {0}")]
    DuplicateSquare(Coordinate),
    #[error("Too many {0} pieces (at most 16)")]
    TooManyPieces(Color),
    #[error("Pawn placed on back rank square {0}")]
    PawnOnBackRank(Coordinate),
}

use SetupError::*;

/// Source of the pieces a game starts with.
pub trait StartingPosition {
    fn placements(&self) -> Vec<Placement>;
}

/// The standard chess starting position.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClassicSetup;

const BACK_RANK: [PieceKind; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

impl StartingPosition for ClassicSetup {
    fn placements(&self) -> Vec<Placement> {
        let mut placements = Vec::with_capacity(32);
        for color in Color::iter() {
            for (file, kind) in File::iter().zip(BACK_RANK) {
                let at = Coordinate::new(file, Rank::back_rank(color));
                placements.push(Placement::new(color, kind, at));
            }
            for file in File::iter() {
                let at = Coordinate::new(file, Rank::pawn_rank(color));
                placements.push(Placement::new(color, Pawn, at));
            }
        }
        placements
    }
}

impl StartingPosition for Vec<Placement> {
    fn placements(&self) -> Vec<Placement> {
        self.clone()
    }
}

impl StartingPosition for [Placement] {
    fn placements(&self) -> Vec<Placement> {
        self.to_vec()
    }
}

impl<const N: usize> StartingPosition for [Placement; N] {
    fn placements(&self) -> Vec<Placement> {
        self.to_vec()
    }
}

/// Checks that `placements` describe a playable position.
pub fn validate(placements: &[Placement]) -> Result<()> {
    let mut seen = Mask::empty();
    for placement in placements {
        if seen.contains(placement.coordinate) {
            return Err(DuplicateSquare(placement.coordinate).into());
        }
        seen |= placement.coordinate;
        if placement.kind == Pawn
            && matches!(placement.coordinate.rank(), Rank::Rank1 | Rank::Rank8)
        {
            return Err(PawnOnBackRank(placement.coordinate).into());
        }
    }
    for color in Color::iter() {
        let own = placements.iter().filter(|p| p.color == color);
        let kings = own.clone().filter(|p| p.kind == King).count();
        if kings != 1 {
            return Err(KingCount {
                color,
                count: kings,
            }
            .into());
        }
        if own.count() > 16 {
            return Err(TooManyPieces(color).into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use Coordinate::*;

    #[test]
    fn test_classic_setup() {
        let placements = ClassicSetup.placements();
        assert_eq!(placements.len(), 32);
        assert!(placements.contains(&Placement::white(King, E1)));
        assert!(placements.contains(&Placement::black(Queen, D8)));
        assert!(placements.contains(&Placement::black(Pawn, H7)));
        assert!(validate(&placements).is_ok());
    }
    #[test]
    fn test_missing_king() {
        let placements = vec![Placement::white(King, E1), Placement::black(Queen, E8)];
        let err = validate(&placements).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SetupError>(),
            Some(&KingCount {
                color: Color::Black,
                count: 0
            })
        );
    }
    #[test]
    fn test_two_kings() {
        let placements = [
            Placement::white(King, E1),
            Placement::white(King, A1),
            Placement::black(King, E8),
        ];
        let err = validate(&placements).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SetupError>(),
            Some(&KingCount {
                color: Color::White,
                count: 2
            })
        );
    }
    #[test]
    fn test_duplicate_square() {
        let placements = [
            Placement::white(King, E1),
            Placement::black(King, E8),
            Placement::black(Rook, E1),
        ];
        let err = validate(&placements).unwrap_err();
        assert_eq!(err.downcast_ref::<SetupError>(), Some(&DuplicateSquare(E1)));
    }
    #[test]
    fn test_pawn_on_back_rank() {
        let placements = [
            Placement::white(King, E1),
            Placement::black(King, E8),
            Placement::white(Pawn, A8),
        ];
        assert!(validate(&placements).is_err());
    }
}
