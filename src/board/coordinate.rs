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
use std::ops::{Add, BitAnd, BitAndAssign, BitOr, BitOrAssign, Not, Sub};
use std::ops::{Index, IndexMut};
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;

use super::material::Color;

use Color::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinateError {
    #[error("Rank {0} is out of range (expecting 1..=8)")]
    RankOutOfRange(u8),
    #[error("File {0} is out of range (expecting 1..=8)")]
    FileOutOfRange(u8),
    #[error("Cannot parse '{0}' as a square name")]
    InvalidName(String),
}

#[rustfmt::skip]
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum Coordinate {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

#[rustfmt::skip]
use Coordinate::{
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
};

impl Coordinate {
    #[inline]
    pub const fn new(file: File, rank: Rank) -> Self {
        Self::from_index(rank.to_index() * 8 + file.to_index())
    }

    /// Builds a coordinate from 1-based rank and file numbers, rejecting
    /// anything outside of `1..=8`.
    pub fn try_new(rank: u8, file: u8) -> Result<Self, CoordinateError> {
        if !(1..=8).contains(&rank) {
            return Err(CoordinateError::RankOutOfRange(rank));
        }
        if !(1..=8).contains(&file) {
            return Err(CoordinateError::FileOutOfRange(file));
        }
        Ok(Self::new(
            File::from_index(file as usize - 1),
            Rank::from_index(rank as usize - 1),
        ))
    }

    #[inline]
    pub const fn from_index(index: usize) -> Self {
        #[rustfmt::skip]
        const VALUES: [Coordinate; 64] = [
            A1, B1, C1, D1, E1, F1, G1, H1,
            A2, B2, C2, D2, E2, F2, G2, H2,
            A3, B3, C3, D3, E3, F3, G3, H3,
            A4, B4, C4, D4, E4, F4, G4, H4,
            A5, B5, C5, D5, E5, F5, G5, H5,
            A6, B6, C6, D6, E6, F6, G6, H6,
            A7, B7, C7, D7, E7, F7, G7, H7,
            A8, B8, C8, D8, E8, F8, G8, H8,
        ];
        debug_assert!(index < 64);
        VALUES[index]
    }
    #[inline]
    pub fn try_from_chars(f: char, r: char) -> Option<Self> {
        let file = File::try_from_char(f)?;
        let rank = Rank::try_from_char(r)?;
        Some(Self::new(file, rank))
    }

    #[inline]
    pub const fn to_index(&self) -> usize {
        *self as usize
    }
    #[inline]
    pub const fn to_mask(&self) -> Mask {
        Mask::new(0x1 << self.to_index())
    }
    #[inline]
    pub const fn file(&self) -> File {
        File::from_index(self.to_index() % 8)
    }
    #[inline]
    pub const fn rank(&self) -> Rank {
        Rank::from_index(self.to_index() / 8)
    }
    /// Rank as a number in `1..=8`.
    #[inline]
    pub const fn rank_number(&self) -> u8 {
        (self.to_index() / 8) as u8 + 1
    }
    /// File as a number in `1..=8` (a = 1).
    #[inline]
    pub const fn file_number(&self) -> u8 {
        (self.to_index() % 8) as u8 + 1
    }
    /// True for light squares (h1 is light).
    #[inline]
    pub const fn is_light(&self) -> bool {
        (self.rank().to_index() + self.file().to_index()) % 2 == 1
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let invalid = || CoordinateError::InvalidName(name.to_string());
        let mut chars = name.chars();
        let (Some(f), Some(r), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };
        Self::try_from_chars(f, r).ok_or_else(invalid)
    }
}

impl From<Coordinate> for usize {
    fn from(value: Coordinate) -> Self {
        value.to_index()
    }
}

#[rustfmt::skip]
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum File {
    FileA, FileB, FileC, FileD, FileE, FileF, FileG, FileH,
}

use File::{FileA, FileB, FileC, FileD, FileE, FileF, FileG, FileH};

impl File {
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        const VALUES: [File; 8] = [FileA, FileB, FileC, FileD, FileE, FileF, FileG, FileH];
        debug_assert!(index < 8);
        VALUES[index]
    }
    #[inline]
    pub const fn try_from_char(c: char) -> Option<Self> {
        match c {
            'a' | 'A' => Some(FileA),
            'b' | 'B' => Some(FileB),
            'c' | 'C' => Some(FileC),
            'd' | 'D' => Some(FileD),
            'e' | 'E' => Some(FileE),
            'f' | 'F' => Some(FileF),
            'g' | 'G' => Some(FileG),
            'h' | 'H' => Some(FileH),
            _ => None,
        }
    }
    #[inline]
    pub const fn to_char(&self) -> char {
        const VALUES: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];
        VALUES[self.to_index()]
    }
    #[inline]
    pub const fn to_index(&self) -> usize {
        *self as usize
    }
    #[inline]
    pub const fn to_mask(&self) -> Mask {
        Mask::new(0x0101_0101_0101_0101 << self.to_index())
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl Add<isize> for File {
    type Output = Option<Self>;
    fn add(self, rhs: isize) -> Self::Output {
        match self.to_index().checked_add_signed(rhs) {
            Some(i) if i < 8 => Some(Self::from_index(i)),
            _ => None,
        }
    }
}

impl Sub for File {
    type Output = isize;

    fn sub(self, rhs: Self) -> Self::Output {
        self.to_index() as isize - rhs.to_index() as isize
    }
}

#[rustfmt::skip]
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum Rank {
    Rank1, Rank2, Rank3, Rank4, Rank5, Rank6, Rank7, Rank8,
}

use Rank::{Rank1, Rank2, Rank3, Rank4, Rank5, Rank6, Rank7, Rank8};

impl Rank {
    #[inline]
    pub fn is_back_rank(&self, color: Color) -> bool {
        Self::back_rank(color) == *self
    }
    #[inline]
    pub const fn back_rank(color: Color) -> Self {
        match color {
            White => Rank1,
            Black => Rank8,
        }
    }
    /// The rank a pawn of `color` is promoted on.
    #[inline]
    pub const fn promotion_rank(color: Color) -> Self {
        match color {
            White => Rank8,
            Black => Rank1,
        }
    }
    /// The rank pawns of `color` start on.
    #[inline]
    pub const fn pawn_rank(color: Color) -> Self {
        match color {
            White => Rank2,
            Black => Rank7,
        }
    }
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        const VALUES: [Rank; 8] = [Rank1, Rank2, Rank3, Rank4, Rank5, Rank6, Rank7, Rank8];
        debug_assert!(index < 8);
        VALUES[index]
    }
    #[inline]
    pub fn try_from_char(c: char) -> Option<Self> {
        match c {
            '1' => Some(Rank1),
            '2' => Some(Rank2),
            '3' => Some(Rank3),
            '4' => Some(Rank4),
            '5' => Some(Rank5),
            '6' => Some(Rank6),
            '7' => Some(Rank7),
            '8' => Some(Rank8),
            _ => None,
        }
    }
    #[inline]
    pub const fn to_char(&self) -> char {
        const VALUES: [char; 8] = ['1', '2', '3', '4', '5', '6', '7', '8'];
        VALUES[self.to_index()]
    }
    #[inline]
    pub const fn to_index(&self) -> usize {
        *self as usize
    }
    #[inline]
    pub const fn to_mask(&self) -> Mask {
        Mask::new(0xff << (self.to_index() * 8))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl Add<isize> for Rank {
    type Output = Option<Self>;
    fn add(self, rhs: isize) -> Self::Output {
        match self.to_index().checked_add_signed(rhs) {
            Some(i) if i < 8 => Some(Self::from_index(i)),
            _ => None,
        }
    }
}

impl Sub for Rank {
    type Output = isize;

    fn sub(self, rhs: Self) -> Self::Output {
        self.to_index() as isize - rhs.to_index() as isize
    }
}

/// A file/rank displacement. Positive `y` points towards rank 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: isize,
    pub y: isize,
}

impl Offset {
    pub const fn new(x: isize, y: isize) -> Self {
        Self { x, y }
    }

    /// Unit step along a rank, file or diagonal, if the offset lies on one.
    pub fn to_unit(self) -> Option<Self> {
        let (x, y) = match (self.x, self.y) {
            (0, 0) => return None,
            (x, y) if x == 0 || y == 0 || x.abs() == y.abs() => (x.signum(), y.signum()),
            _ => return None,
        };
        Some(Self { x, y })
    }

    #[inline]
    pub fn is_straight(&self) -> bool {
        (self.x == 0) != (self.y == 0)
    }
    #[inline]
    pub fn is_diagonal(&self) -> bool {
        self.x != 0 && self.x.abs() == self.y.abs()
    }
    #[inline]
    pub fn is_knight_jump(&self) -> bool {
        matches!((self.x.abs(), self.y.abs()), (1, 2) | (2, 1))
    }
    #[inline]
    pub fn is_adjacent(&self) -> bool {
        (self.x != 0 || self.y != 0) && self.x.abs() <= 1 && self.y.abs() <= 1
    }
}

impl Add<Offset> for Coordinate {
    type Output = Option<Coordinate>;
    fn add(self, rhs: Offset) -> Self::Output {
        let file = (self.file() + rhs.x)?;
        let rank = (self.rank() + rhs.y)?;
        Some(Coordinate::new(file, rank))
    }
}

impl Sub for Coordinate {
    type Output = Offset;
    fn sub(self, rhs: Self) -> Self::Output {
        Offset::new(self.file() - rhs.file(), self.rank() - rhs.rank())
    }
}

impl<T> Index<Coordinate> for [T; 64] {
    type Output = T;
    fn index(&self, coordinate: Coordinate) -> &Self::Output {
        &self[coordinate.to_index()]
    }
}

impl<T> IndexMut<Coordinate> for [T; 64] {
    fn index_mut(&mut self, coordinate: Coordinate) -> &mut Self::Output {
        &mut self[coordinate.to_index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Direction {
    UpLeft,
    Up,
    UpRight,
    Left,
    Right,
    DownLeft,
    Down,
    DownRight,
}

use Direction::{Down, DownLeft, DownRight, Left, Right, Up, UpLeft, UpRight};

impl Direction {
    #[inline]
    pub fn is_straight(&self) -> bool {
        matches!(*self, Up | Left | Right | Down)
    }
    #[inline]
    pub fn is_diagonal(&self) -> bool {
        matches!(*self, UpLeft | UpRight | DownLeft | DownRight)
    }
    pub fn straights() -> impl Iterator<Item = Self> {
        [Up, Left, Right, Down].into_iter()
    }
    pub fn diagonals() -> impl Iterator<Item = Self> {
        [UpLeft, UpRight, DownLeft, DownRight].into_iter()
    }
}

impl From<Direction> for Offset {
    fn from(value: Direction) -> Self {
        match value {
            UpLeft => Self::new(-1, 1),
            Up => Self::new(0, 1),
            UpRight => Self::new(1, 1),
            Left => Self::new(-1, 0),
            Right => Self::new(1, 0),
            DownLeft => Self::new(-1, -1),
            Down => Self::new(0, -1),
            DownRight => Self::new(1, -1),
        }
    }
}

impl Add<Direction> for Coordinate {
    type Output = Option<Coordinate>;
    fn add(self, rhs: Direction) -> Self::Output {
        let offset: Offset = rhs.into();
        self + offset
    }
}

/// A set of coordinates, one bit per square (`A1` is bit 0).
#[derive(Clone, Serialize, Deserialize, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mask(u64);

impl Mask {
    #[inline]
    pub const fn new(val: u64) -> Self {
        Self(val)
    }
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }
    #[inline]
    pub const fn all() -> Self {
        Self(!0)
    }

    pub fn from_coordinates<I>(coordinates: I) -> Self
    where
        I: IntoIterator<Item = Coordinate>,
    {
        coordinates
            .into_iter()
            .fold(Mask::empty(), |mask, coordinate| mask | coordinate)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
    #[inline]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }
    #[inline]
    pub fn set(&mut self, coordinate: Coordinate) {
        self.0 |= coordinate.to_mask().0;
    }
    #[inline]
    pub fn reset(&mut self, coordinate: Coordinate) {
        self.0 &= !coordinate.to_mask().0;
    }
    #[inline]
    pub const fn contains(&self, coordinate: Coordinate) -> bool {
        (self.0 & coordinate.to_mask().0) != 0
    }
    #[inline]
    pub const fn intersects(&self, other: Mask) -> bool {
        (self.0 & other.0) != 0
    }
    pub fn iter(&self) -> MaskIter {
        MaskIter(self.0)
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            for file in File::iter() {
                let coordinate = Coordinate::new(file, rank);
                write!(f, "{}", if self.contains(coordinate) { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Sub<Coordinate> for Mask {
    type Output = Self;
    fn sub(self, rhs: Coordinate) -> Self::Output {
        Self(self.0 & !rhs.to_mask().0)
    }
}

impl Sub for Mask {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 & !rhs.0)
    }
}

impl Not for Mask {
    type Output = Self;
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

impl BitOr for Mask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitOr<Coordinate> for Mask {
    type Output = Self;
    fn bitor(self, rhs: Coordinate) -> Self {
        Self(self.0 | rhs.to_mask().0)
    }
}

impl BitOrAssign<Coordinate> for Mask {
    fn bitor_assign(&mut self, rhs: Coordinate) {
        self.0 |= rhs.to_mask().0;
    }
}

impl BitAnd for Mask {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Mask {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl IntoIterator for Mask {
    type Item = Coordinate;
    type IntoIter = MaskIter;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Coordinate> for Mask {
    fn from_iter<I: IntoIterator<Item = Coordinate>>(iter: I) -> Self {
        Self::from_coordinates(iter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskIter(u64);

impl Iterator for MaskIter {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 != 0 {
            let coordinate = Coordinate::from_index(self.0.trailing_zeros() as usize);
            self.0 &= self.0 - 1;
            return Some(coordinate);
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_ones() as usize;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for MaskIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.0 != 0 {
            let coordinate = Coordinate::from_index(63 - self.0.leading_zeros() as usize);
            self.0 &= !coordinate.to_mask().0;
            return Some(coordinate);
        }
        None
    }
}

impl ExactSizeIterator for MaskIter {}
