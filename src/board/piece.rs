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
use std::ops::{BitOr, BitOrAssign, Index, IndexMut};

use super::coordinate::Coordinate;
use super::material::{Color, PieceKind};

/// Opaque handle of a piece record in the board's arena.
///
/// Ids are never reused: a captured piece keeps its id (with no position)
/// and a promoted piece gets a fresh one.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceId(u8);

impl PieceId {
    /// An arena never holds more records than this: 32 initial pieces
    /// plus one per promoted pawn.
    pub const LIMIT: usize = 64;

    #[inline]
    pub(crate) const fn new(index: usize) -> Self {
        debug_assert!(index < Self::LIMIT);
        Self(index as u8)
    }
    #[inline]
    pub const fn to_index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    color: Color,
    kind: PieceKind,
    position: Option<Coordinate>,
    has_moved: bool,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind, position: Coordinate) -> Self {
        Self {
            color,
            kind,
            position: Some(position),
            has_moved: false,
        }
    }
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }
    #[inline]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }
    /// Current coordinate, `None` once captured.
    #[inline]
    pub fn position(&self) -> Option<Coordinate> {
        self.position
    }
    #[inline]
    pub fn is_captured(&self) -> bool {
        self.position.is_none()
    }
    #[inline]
    pub fn has_moved(&self) -> bool {
        self.has_moved
    }
    #[inline]
    pub(crate) fn set_position(&mut self, position: Option<Coordinate>) {
        self.position = position;
    }
    #[inline]
    pub(crate) fn set_moved(&mut self, has_moved: bool) {
        self.has_moved = has_moved;
    }
}

/// Arena of every piece that took part in the game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pieces(Vec<Piece>);

impl Pieces {
    pub fn new() -> Self {
        Self(Vec::new())
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// Id the next pushed piece will receive.
    #[inline]
    pub fn next_id(&self) -> PieceId {
        PieceId::new(self.0.len())
    }
    pub(crate) fn push(&mut self, piece: Piece) -> PieceId {
        let id = self.next_id();
        self.0.push(piece);
        id
    }
    #[inline]
    pub(crate) fn pop(&mut self) -> Option<Piece> {
        self.0.pop()
    }
    #[inline]
    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.0.get(id.to_index())
    }
    pub fn iter(&self) -> impl Iterator<Item = (PieceId, &Piece)> {
        self.0
            .iter()
            .enumerate()
            .map(|(index, piece)| (PieceId::new(index), piece))
    }
    /// Pieces that still stand on the board.
    pub fn playing(&self) -> impl Iterator<Item = (PieceId, &Piece)> {
        self.iter().filter(|(_, piece)| !piece.is_captured())
    }
}

impl Index<PieceId> for Pieces {
    type Output = Piece;
    fn index(&self, id: PieceId) -> &Self::Output {
        &self.0[id.to_index()]
    }
}

impl IndexMut<PieceId> for Pieces {
    fn index_mut(&mut self, id: PieceId) -> &mut Self::Output {
        &mut self.0[id.to_index()]
    }
}

/// A set of piece ids, one bit per arena slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PieceSet(u64);

impl PieceSet {
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
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
    pub fn insert(&mut self, id: PieceId) {
        self.0 |= 1 << id.to_index();
    }
    #[inline]
    pub fn remove(&mut self, id: PieceId) {
        self.0 &= !(1 << id.to_index());
    }
    #[inline]
    pub const fn contains(&self, id: PieceId) -> bool {
        (self.0 & (1 << id.to_index())) != 0
    }
    pub fn iter(&self) -> PieceSetIter {
        PieceSetIter(self.0)
    }
}

impl fmt::Debug for PieceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl BitOr for PieceSet {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PieceSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl FromIterator<PieceId> for PieceSet {
    fn from_iter<I: IntoIterator<Item = PieceId>>(iter: I) -> Self {
        let mut set = Self::empty();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSetIter(u64);

impl Iterator for PieceSetIter {
    type Item = PieceId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 != 0 {
            let id = PieceId::new(self.0.trailing_zeros() as usize);
            self.0 &= self.0 - 1;
            return Some(id);
        }
        None
    }
}

/// A piece to put on the board when a game is set up.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub color: Color,
    pub kind: PieceKind,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub has_moved: bool,
}

impl Placement {
    pub const fn new(color: Color, kind: PieceKind, coordinate: Coordinate) -> Self {
        Self {
            color,
            kind,
            coordinate,
            has_moved: false,
        }
    }
    pub const fn white(kind: PieceKind, coordinate: Coordinate) -> Self {
        Self::new(Color::White, kind, coordinate)
    }
    pub const fn black(kind: PieceKind, coordinate: Coordinate) -> Self {
        Self::new(Color::Black, kind, coordinate)
    }
    /// Marks the piece as having moved before the game was set up, which
    /// forfeits castling (king/rook) or the double step (pawn).
    pub const fn moved(mut self) -> Self {
        self.has_moved = true;
        self
    }
}

impl From<Placement> for Piece {
    fn from(value: Placement) -> Self {
        let mut piece = Piece::new(value.color, value.kind, value.coordinate);
        piece.set_moved(value.has_moved);
        piece
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Coordinate::*;

    #[test]
    fn test_arena_assigns_sequential_ids() {
        let mut pieces = Pieces::new();
        let a = pieces.push(Piece::new(Color::White, PieceKind::King, E1));
        let b = pieces.push(Piece::new(Color::Black, PieceKind::King, E8));
        assert_eq!(a.to_index(), 0);
        assert_eq!(b.to_index(), 1);
        assert_eq!(pieces.next_id().to_index(), 2);
        pieces[a].set_position(None);
        assert_eq!(pieces.playing().map(|(id, _)| id).collect::<Vec<_>>(), vec![b]);
    }
    #[test]
    fn test_piece_set() {
        let mut set = PieceSet::empty();
        set.insert(PieceId::new(3));
        set.insert(PieceId::new(40));
        assert!(set.contains(PieceId::new(40)));
        assert_eq!(set.len(), 2);
        set.remove(PieceId::new(3));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![PieceId::new(40)]);
    }
}
