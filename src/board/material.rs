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
use std::ops::{Index, IndexMut, Not};
use strum_macros::Display;
use strum_macros::EnumIter;

use Color::{Black, White};

#[derive(
    Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter,
)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const fn to_index(&self) -> usize {
        *self as usize
    }
    #[inline]
    pub fn is_white(&self) -> bool {
        matches!(*self, White)
    }
    #[inline]
    pub fn is_black(&self) -> bool {
        matches!(*self, Black)
    }
    /// Rank direction pawns of this color advance in.
    #[inline]
    pub const fn forward(&self) -> isize {
        match self {
            White => 1,
            Black => -1,
        }
    }
}

impl Not for Color {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        match self {
            White => Black,
            Black => White,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pair<T>((T, T));

impl<T> Pair<T> {
    pub const fn new(white: T, black: T) -> Self {
        Self((white, black))
    }
    pub fn white(&self) -> &T {
        &self.0 .0
    }
    pub fn white_mut(&mut self) -> &mut T {
        &mut self.0 .0
    }
    pub fn black(&self) -> &T {
        &self.0 .1
    }
    pub fn black_mut(&mut self) -> &mut T {
        &mut self.0 .1
    }
}

impl<T> Index<Color> for Pair<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, index: Color) -> &Self::Output {
        match index {
            White => self.white(),
            Black => self.black(),
        }
    }
}

impl<T> IndexMut<Color> for Pair<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: Color) -> &mut Self::Output {
        match index {
            White => self.white_mut(),
            Black => self.black_mut(),
        }
    }
}

#[derive(
    Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter,
)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
use PieceKind::{Bishop, King, Knight, Pawn, Queen, Rook};

impl PieceKind {
    pub const fn from_index(index: usize) -> Self {
        debug_assert!(index < 6);
        const KIND_MAP: [PieceKind; 6] = [Pawn, Knight, Bishop, Rook, Queen, King];
        KIND_MAP[index]
    }
    pub const fn to_index(&self) -> usize {
        *self as usize
    }
    pub fn is_king(&self) -> bool {
        matches!(*self, King)
    }
    pub fn is_queen(&self) -> bool {
        matches!(*self, Queen)
    }
    pub fn is_rook(&self) -> bool {
        matches!(*self, Rook)
    }
    pub fn is_bishop(&self) -> bool {
        matches!(*self, Bishop)
    }
    pub fn is_knight(&self) -> bool {
        matches!(*self, Knight)
    }
    pub fn is_pawn(&self) -> bool {
        matches!(*self, Pawn)
    }
    /// Rook, bishop and queen: pieces whose reach depends on line of sight.
    pub fn is_slider(&self) -> bool {
        matches!(*self, Rook | Bishop | Queen)
    }
}

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum PromoteTo {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl From<PromoteTo> for PieceKind {
    fn from(value: PromoteTo) -> Self {
        match value {
            PromoteTo::Queen => Queen,
            PromoteTo::Rook => Rook,
            PromoteTo::Bishop => Bishop,
            PromoteTo::Knight => Knight,
        }
    }
}

impl TryFrom<PieceKind> for PromoteTo {
    type Error = PieceKind;

    fn try_from(value: PieceKind) -> Result<Self, Self::Error> {
        match value {
            Queen => Ok(PromoteTo::Queen),
            Rook => Ok(PromoteTo::Rook),
            Bishop => Ok(PromoteTo::Bishop),
            Knight => Ok(PromoteTo::Knight),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_indexing() {
        let mut pair = Pair::new(1, 2);
        assert_eq!(pair[White], 1);
        assert_eq!(pair[Black], 2);
        pair[Black] += 5;
        assert_eq!(*pair.black(), 7);
    }
    #[test]
    fn test_promotion_conversions() {
        assert_eq!(PieceKind::from(PromoteTo::Knight), Knight);
        assert_eq!(PromoteTo::try_from(Rook), Ok(PromoteTo::Rook));
        assert_eq!(PromoteTo::try_from(King), Err(King));
        assert_eq!(PromoteTo::try_from(Pawn), Err(Pawn));
    }
    #[test]
    fn test_color_negation() {
        assert_eq!(!White, Black);
        assert_eq!(!Black, White);
        assert_eq!(White.forward(), 1);
        assert_eq!(Black.forward(), -1);
    }
}
