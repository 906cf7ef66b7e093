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

use super::coordinate::Coordinate;
use super::material::{Color, Pair};
use super::piece::PieceId;

/// One cell of the board.
///
/// The controlled flags are a projection of the control index and are
/// rewritten whenever a color's aggregate control changes.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    coordinate: Coordinate,
    occupant: Option<PieceId>,
    controlled: Pair<bool>,
}

impl Square {
    pub const fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            occupant: None,
            controlled: Pair::new(false, false),
        }
    }
    #[inline]
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
    #[inline]
    pub fn occupant(&self) -> Option<PieceId> {
        self.occupant
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }
    #[inline]
    pub fn is_controlled_by(&self, color: Color) -> bool {
        self.controlled[color]
    }
    #[inline]
    pub fn controlled_by_white(&self) -> bool {
        *self.controlled.white()
    }
    #[inline]
    pub fn controlled_by_black(&self) -> bool {
        *self.controlled.black()
    }
    /// Replaces the occupant, returning the previous one.
    #[inline]
    pub(crate) fn set_occupant(&mut self, occupant: Option<PieceId>) -> Option<PieceId> {
        std::mem::replace(&mut self.occupant, occupant)
    }
    #[inline]
    pub(crate) fn set_controlled(&mut self, color: Color, controlled: bool) {
        self.controlled[color] = controlled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_occupant() {
        let mut square = Square::new(Coordinate::E4);
        assert!(square.is_empty());
        assert_eq!(square.set_occupant(Some(PieceId::new(7))), None);
        assert_eq!(square.occupant(), Some(PieceId::new(7)));
        assert_eq!(square.set_occupant(None), Some(PieceId::new(7)));
        assert!(square.is_empty());
    }
    #[test]
    fn test_square_controlled_flags() {
        let mut square = Square::new(Coordinate::D5);
        square.set_controlled(Color::Black, true);
        assert!(square.controlled_by_black());
        assert!(!square.controlled_by_white());
        assert!(square.is_controlled_by(Color::Black));
    }
}
