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

//! Chess rules engine with incrementally maintained attack and move caches
//!
//! A _board_ owns the authoritative state of one game: which piece stands
//! on which square, whose turn it is, which moves were played and whether
//! the game is over. The following features are supported:
//!
//! [x] Standard chess rules (castling, en passant, promotion)
//! [x] Arbitrary starting positions (validated for one king per color)
//! [x] Checkmate and stalemate
//! [x] Enforce three-fold repetition rule
//! [x] Enforce fifty-move rule
//! [x] Recognize insufficient mating material
//! [x] Clock timeout, resignation and abandonment
//! [x] Two-phase pawn promotion (request, then provide the piece)
//! [ ] Take backs
//! [ ] Chess960 castling
//!
//! Some of the key abstractions include:
//!
//! * A `Coordinate` names one of the 64 squares (`A1` .. `H8`). A `Mask`
//!   is a 64-bit set of coordinates supporting the usual bitwise
//!   operators and an efficient double-ended iterator.
//!
//! * Pieces live in an arena (`Pieces`) and are referred to everywhere
//!   else by a `PieceId`. A captured piece keeps its record with no
//!   position. A `Square` stores the id of its occupant, never the piece.
//!
//! * The movement rules of each `PieceKind` are plain functions looked up
//!   in a table (see `pattern`): a move-pattern predicate and a
//!   controlled-square generator.
//!
//! * `ControlManager` keeps, per piece, the squares it attacks, the
//!   transpose of that map and the per-color union. `MobilityManager`
//!   keeps, per piece, its legal destinations. Both are updated
//!   incrementally after every move and always equal a recomputation
//!   from scratch.
//!
//! * `MoveFactory` turns a from/to pair into a `Move` (promotion, en
//!   passant, castle or generic, tried in that order) and rejects moves
//!   that would leave the mover's king in check. Check is tested by
//!   playing the move on a `TemporaryMove` scope that restores the board
//!   when dropped.
//!
//! * Every `Move` carries its `MoveOperations`: the pieces it relocates,
//!   removes and adds. The board mutation and both cache updates consume
//!   exactly that value.
//!
//! * `EndGameRules` looks at the board after each move and ends the game
//!   on mate, stalemate, the fifty-move rule, insufficient material or
//!   threefold repetition.
//!

use anyhow::Result;
use std::fmt;
use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

mod config;
mod control;
mod coordinate;
mod endgame;
mod events;
mod factory;
mod history;
mod material;
mod mobility;
mod moves;
mod pattern;
mod piece;
mod setup;
mod square;
mod temporary;

pub use config::*;
pub use control::*;
pub use coordinate::*;
pub use endgame::*;
pub use events::*;
pub use factory::*;
pub use history::*;
pub use material::*;
pub use mobility::*;
pub use moves::*;
pub use piece::*;
pub use setup::*;
pub use square::*;
pub use temporary::*;

use crate::game::{GameEndedReason, GameId, GameOutcome, GameState};

pub trait Turn {
    fn turn(&self) -> Color;
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("No piece on {0}")]
    EmptySquare(Coordinate),
    #[error("No promotion is pending")]
    NoPendingPromotion,
    #[error("Illegal move from {0} to {1}")]
    IllegalMove(Coordinate, Coordinate),
    #[error("The game is over")]
    GameOver,
}

/// Result of asking the board to play a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    Rejected,
    Played,
    /// The move promotes a pawn; it is played once the piece is provided.
    AwaitingPromotion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingPromotion {
    pub from: Coordinate,
    pub to: Coordinate,
}

pub struct Board {
    id: GameId,
    config: RulesConfig,
    squares: [Square; 64],
    pieces: Pieces,
    occupancy: Pair<Mask>,
    kings: Pair<PieceId>,
    turn: Color,
    control: ControlManager,
    mobility: MobilityManager,
    history: MovesHistory,
    end_game: Option<EndGameRules>,
    state: GameState,
    pending: Option<PendingPromotion>,
    captured: Pair<Vec<PieceId>>,
    observers: Vec<Box<dyn BoardObserver>>,
}

impl Board {
    /// A board set up with `setup` and the default rules.
    pub fn new<S>(setup: &S) -> Result<Self>
    where
        S: StartingPosition + ?Sized,
    {
        Self::with_config(setup, RulesConfig::default())
    }

    pub fn with_config<S>(setup: &S, config: RulesConfig) -> Result<Self>
    where
        S: StartingPosition + ?Sized,
    {
        let mut board = Self::empty(config);
        board.init_pieces(&setup.placements())?;
        Ok(board)
    }

    /// A board in the standard starting position.
    pub fn standard() -> Self {
        let mut board = Self::empty(RulesConfig::default());
        board.populate(&ClassicSetup.placements());
        board
    }

    /// Reconstruct a board by replaying a sequence of from/to pairs.
    /// Promotions are played as queen promotions.
    pub fn replay<S>(setup: &S, moves: &[(Coordinate, Coordinate)]) -> Result<Self>
    where
        S: StartingPosition + ?Sized,
    {
        let mut board = Self::new(setup)?;
        for &(from, to) in moves {
            if !board.play_promotion(from, to, PromoteTo::Queen) {
                return Err(BoardError::IllegalMove(from, to).into());
            }
        }
        Ok(board)
    }

    pub fn with_id(mut self, id: GameId) -> Self {
        self.id = id;
        self
    }

    fn empty(config: RulesConfig) -> Self {
        Self {
            id: GameId::default(),
            config,
            squares: std::array::from_fn(|index| Square::new(Coordinate::from_index(index))),
            pieces: Pieces::new(),
            occupancy: Pair::new(Mask::empty(), Mask::empty()),
            kings: Pair::new(PieceId::new(0), PieceId::new(0)),
            turn: Color::White,
            control: ControlManager::new(),
            mobility: MobilityManager::new(),
            history: MovesHistory::new(),
            end_game: None,
            state: GameState::Ongoing,
            pending: None,
            captured: Pair::new(Vec::new(), Vec::new()),
            observers: Vec::new(),
        }
    }

    /// Replaces every piece on the board with `placements` and restarts
    /// the game. Fails unless each color has exactly one king.
    pub fn init_pieces(&mut self, placements: &[Placement]) -> Result<()> {
        setup::validate(placements)?;
        self.populate(placements);
        Ok(())
    }

    // Expects validated placements.
    fn populate(&mut self, placements: &[Placement]) {
        let observers = std::mem::take(&mut self.observers);
        *self = Self {
            id: self.id,
            observers,
            ..Self::empty(self.config)
        };
        for placement in placements {
            let id = self.pieces.push(Piece::from(*placement));
            self.put(id, placement.coordinate);
            if placement.kind.is_king() {
                self.kings[placement.color] = id;
            }
        }
        let occupied = self.occupied();
        let ids: Vec<_> = self.pieces.iter().map(|(id, _)| id).collect();
        let touched = self.control.add_pieces(&self.pieces, occupied, ids);
        self.sync_controlled_flags(touched);
        let playing = self.pieces.playing().map(|(id, _)| id).collect();
        self.refresh_mobility(playing);
        if self.config.end_game_rules {
            self.end_game = Some(EndGameRules::new(self.config, self));
        }
        debug!(game = %self.id, pieces = self.pieces.len(), "pieces initialized");
    }

    #[inline]
    pub fn id(&self) -> GameId {
        self.id
    }
    #[inline]
    pub fn config(&self) -> &RulesConfig {
        &self.config
    }
    #[inline]
    pub fn game_state(&self) -> GameState {
        self.state
    }
    #[inline]
    pub fn squares(&self) -> &[Square; 64] {
        &self.squares
    }
    #[inline]
    pub fn square(&self, at: Coordinate) -> &Square {
        &self.squares[at]
    }
    #[inline]
    pub fn pieces(&self) -> &Pieces {
        &self.pieces
    }
    #[inline]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id)
    }
    pub fn piece_at(&self, at: Coordinate) -> Option<&Piece> {
        self.squares[at].occupant().map(|id| &self.pieces[id])
    }
    #[inline]
    pub fn occupant(&self, at: Coordinate) -> Option<PieceId> {
        self.squares[at].occupant()
    }
    /// Pieces of `color` that still stand on the board.
    pub fn playing_pieces(&self, color: Color) -> impl Iterator<Item = (PieceId, &Piece)> {
        self.pieces
            .playing()
            .filter(move |(_, piece)| piece.color() == color)
    }
    /// Pieces of `color` that were captured, in capture order.
    pub fn captured(&self, color: Color) -> impl Iterator<Item = &Piece> {
        self.captured[color].iter().map(|id| &self.pieces[*id])
    }
    #[inline]
    pub fn king(&self, color: Color) -> PieceId {
        self.kings[color]
    }
    #[inline]
    pub fn king_position(&self, color: Color) -> Option<Coordinate> {
        self.pieces[self.kings[color]].position()
    }
    #[inline]
    pub fn occupied(&self) -> Mask {
        self.occupancy[Color::White] | self.occupancy[Color::Black]
    }
    #[inline]
    pub fn occupied_by(&self, color: Color) -> Mask {
        self.occupancy[color]
    }
    #[inline]
    pub fn is_occupied(&self, at: Coordinate) -> bool {
        self.occupied().contains(at)
    }
    #[inline]
    pub fn is_occupied_by(&self, at: Coordinate, color: Color) -> bool {
        self.occupancy[color].contains(at)
    }
    /// Both squares hold pieces of the same color.
    pub fn is_same_color(&self, a: Coordinate, b: Coordinate) -> bool {
        match (self.piece_at(a), self.piece_at(b)) {
            (Some(x), Some(y)) => x.color() == y.color(),
            _ => false,
        }
    }
    /// Both squares hold pieces, of opposite colors.
    pub fn is_opposite_color(&self, a: Coordinate, b: Coordinate) -> bool {
        match (self.piece_at(a), self.piece_at(b)) {
            (Some(x), Some(y)) => x.color() != y.color(),
            _ => false,
        }
    }
    #[inline]
    pub fn is_attacked_by(&self, at: Coordinate, color: Color) -> bool {
        self.control.is_controlled(at, color)
    }
    /// Every square strictly between `from` and `to` is empty. Squares
    /// that do not share a line have nothing in between.
    #[inline]
    pub fn is_path_clear(&self, from: Coordinate, to: Coordinate) -> bool {
        !pattern::between(from, to).intersects(self.occupied())
    }
    pub fn is_in_check(&self, color: Color) -> bool {
        self.king_position(color)
            .is_some_and(|at| self.control.is_controlled(at, !color))
    }
    #[inline]
    pub fn control(&self) -> &ControlManager {
        &self.control
    }
    #[inline]
    pub fn mobility(&self) -> &MobilityManager {
        &self.mobility
    }
    /// Legal destinations of the piece on `from`.
    pub fn legal_moves(&self, from: Coordinate) -> Result<Mask> {
        let id = self.squares[from]
            .occupant()
            .ok_or(BoardError::EmptySquare(from))?;
        Ok(self.mobility.moves(id))
    }
    /// Number of legal destinations over every piece of `color`.
    pub fn legal_move_count(&self, color: Color) -> usize {
        self.playing_pieces(color)
            .map(|(id, _)| self.mobility.moves(id).len())
            .sum()
    }
    #[inline]
    pub fn history(&self) -> &MovesHistory {
        &self.history
    }
    #[inline]
    pub fn all_moves_played(&self) -> &[MovePair] {
        self.history.pairs()
    }
    #[inline]
    pub fn last_move(&self) -> Option<&Move> {
        self.history.last_move()
    }
    /// End-of-game rules in force, `None` when switched off.
    #[inline]
    pub fn end_game_rules(&self) -> Option<&EndGameRules> {
        self.end_game.as_ref()
    }
    #[inline]
    pub fn pending_promotion(&self) -> Option<PendingPromotion> {
        self.pending
    }

    pub fn subscribe<O>(&mut self, observer: O)
    where
        O: BoardObserver + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Plays the move if it is legal. Illegal attempts change nothing.
    ///
    /// A promotion is not complete until the piece is provided, but is
    /// reported as accepted.
    pub fn try_play_move(&mut self, from: Coordinate, to: Coordinate) -> bool {
        self.begin_move(from, to) != MoveOutcome::Rejected
    }

    pub fn begin_move(&mut self, from: Coordinate, to: Coordinate) -> MoveOutcome {
        let mv = match MoveFactory::new(self).create(from, to, PromoteTo::Queen) {
            Ok(mv) => mv,
            Err(err) => {
                trace!(game = %self.id, %from, %to, %err, "move rejected");
                return MoveOutcome::Rejected;
            }
        };
        if mv.promotion().is_some() {
            self.pending = Some(PendingPromotion { from, to });
            trace!(game = %self.id, %from, %to, "promotion requested");
            self.notify(BoardEvent::PromotionRequested { from, to });
            return MoveOutcome::AwaitingPromotion;
        }
        self.make_move(mv);
        MoveOutcome::Played
    }

    /// Completes the pending promotion with `kind`.
    pub fn provide_requested_promotion_piece(&mut self, kind: PromoteTo) -> Result<()> {
        let Some(pending) = self.pending.take() else {
            warn!(game = %self.id, %kind, "promotion piece provided with none pending");
            return Err(BoardError::NoPendingPromotion.into());
        };
        let mv = MoveFactory::new(self).create(pending.from, pending.to, kind)?;
        self.make_move(mv);
        Ok(())
    }

    /// Plays a move, promoting to `kind` if it turns out to be a
    /// promotion.
    pub fn play_promotion(&mut self, from: Coordinate, to: Coordinate, kind: PromoteTo) -> bool {
        match self.begin_move(from, to) {
            MoveOutcome::Rejected => false,
            MoveOutcome::Played => true,
            MoveOutcome::AwaitingPromotion => self.provide_requested_promotion_piece(kind).is_ok(),
        }
    }

    pub fn resign(&mut self, color: Color) -> Result<()> {
        self.concede(color, GameEndedReason::Resign)
    }

    pub fn abandon(&mut self, color: Color) -> Result<()> {
        self.concede(color, GameEndedReason::Abandon)
    }

    fn concede(&mut self, color: Color, reason: GameEndedReason) -> Result<()> {
        if self.state.is_ended() {
            return Err(BoardError::GameOver.into());
        }
        self.end(reason, GameOutcome::win(!color));
        Ok(())
    }

    /// Relays a clock signal. A time-up ends the game for the opponent;
    /// signals after the game ended are ignored.
    pub fn on_clock_event(&mut self, event: ClockEvent) {
        if self.state.is_ended() {
            trace!(game = %self.id, ?event, "clock event after game end");
            return;
        }
        match event {
            ClockEvent::Tick { color, remaining } => {
                self.notify(BoardEvent::ClockChanged { color, remaining });
            }
            ClockEvent::TimeUp(color) => {
                self.end(GameEndedReason::TimeUp, GameOutcome::win(!color));
            }
        }
    }

    fn make_move(&mut self, mv: Move) {
        let color = mv.color();
        let changed = mv.operations().changed_squares();
        let watched = self.mobility_watch(changed);

        self.apply_operations(mv.operations());
        mv.on_played(&mut self.pieces);
        if let Some(captured) = mv.operations().captured {
            self.captured[!color].push(captured.piece);
        }
        let occupied = self.occupied();
        let (_, touched) = self
            .control
            .on_move_played(&self.pieces, occupied, mv.operations());
        self.sync_controlled_flags(touched);

        let touched_pieces = mv.operations().touched_pieces();
        debug!(
            game = %self.id,
            ply = self.history.len() + 1,
            %color,
            from = %mv.from(),
            to = %mv.to(),
            kind = ?mv.kind(),
            "move played"
        );
        self.history.on_move_played(mv);

        let affected = watched | touched_pieces | self.mobility_watch(changed);
        self.refresh_mobility(affected);

        let check = self.is_in_check(!color);
        let mate = check && self.legal_move_count(!color) == 0;
        self.history.mark_last(check, mate);

        let verdict = match self.end_game.take() {
            Some(mut rules) => {
                let verdict = self
                    .history
                    .last_move()
                    .and_then(|mv| rules.on_move_played(self, mv));
                self.end_game = Some(rules);
                verdict
            }
            None => None,
        };
        if verdict.is_none() {
            self.turn = !self.turn;
        }
        if let Some(mv) = self.history.last_move().cloned() {
            self.notify(BoardEvent::MovePlayed(mv));
        }
        if let Some((reason, outcome)) = verdict {
            self.end(reason, outcome);
        }
    }

    fn end(&mut self, reason: GameEndedReason, outcome: GameOutcome) {
        self.state = GameState::ended(reason, outcome);
        self.pending = None;
        info!(game = %self.id, %reason, %outcome, "game ended");
        self.notify(BoardEvent::GameEnded { reason, outcome });
    }

    fn notify(&mut self, event: BoardEvent) {
        for observer in self.observers.iter_mut() {
            observer.on_event(&event);
        }
    }

    // Applies the relocations, removals and additions of `operations`
    // to the squares and the arena. Caches are not touched.
    fn apply_operations(&mut self, operations: &MoveOperations) {
        for removed in operations.removed() {
            self.lift(removed.piece, removed.at);
            self.pieces[removed.piece].set_position(None);
        }
        for moved in &operations.moved {
            self.lift(moved.piece, moved.from);
        }
        for moved in &operations.moved {
            self.put(moved.piece, moved.to);
        }
        if let Some(added) = &operations.added {
            let id = self
                .pieces
                .push(Piece::new(added.color, added.kind, added.at));
            debug_assert_eq!(id, added.id);
            self.put(id, added.at);
        }
    }

    fn revert_operations(&mut self, operations: &MoveOperations) {
        if let Some(added) = &operations.added {
            self.lift(added.id, added.at);
            self.pieces.pop();
        }
        for moved in &operations.moved {
            self.lift(moved.piece, moved.to);
        }
        for moved in &operations.moved {
            self.put(moved.piece, moved.from);
        }
        for removed in operations.removed() {
            self.put(removed.piece, removed.at);
        }
    }

    fn lift(&mut self, id: PieceId, at: Coordinate) {
        let previous = self.squares[at].set_occupant(None);
        debug_assert_eq!(previous, Some(id));
        self.occupancy[self.pieces[id].color()].reset(at);
    }

    fn put(&mut self, id: PieceId, at: Coordinate) {
        self.squares[at].set_occupant(Some(id));
        let piece = &mut self.pieces[id];
        piece.set_position(Some(at));
        self.occupancy[piece.color()].set(at);
    }

    fn sync_controlled_flags(&mut self, touched: Mask) {
        for at in touched {
            for color in [Color::White, Color::Black] {
                let controlled = self.control.is_controlled(at, color);
                self.squares[at].set_controlled(color, controlled);
            }
        }
    }
}

impl Turn for Board {
    #[inline]
    fn turn(&self) -> Color {
        self.turn
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("id", &self.id)
            .field("turn", &self.turn)
            .field("state", &self.state)
            .field("plies", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            for file in File::iter() {
                let c = match self.piece_at(Coordinate::new(file, rank)) {
                    Some(piece) => piece_char(piece),
                    None => '.',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn piece_char(piece: &Piece) -> char {
    let c = match piece.kind() {
        PieceKind::Pawn => 'p',
        PieceKind::Knight => 'n',
        PieceKind::Bishop => 'b',
        PieceKind::Rook => 'r',
        PieceKind::Queen => 'q',
        PieceKind::King => 'k',
    };
    match piece.color() {
        Color::White => c.to_ascii_uppercase(),
        Color::Black => c,
    }
}

#[cfg(test)]
#[derive(Debug, PartialEq)]
pub(crate) struct Snapshot {
    squares: [Square; 64],
    pieces: Pieces,
    occupancy: Pair<Mask>,
    control: ControlManager,
    mobility: MobilityManager,
}

#[cfg(test)]
impl Board {
    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            squares: self.squares,
            pieces: self.pieces.clone(),
            occupancy: self.occupancy,
            control: self.control.clone(),
            mobility: self.mobility.clone(),
        }
    }

    /// Panics unless every cache equals a recomputation from scratch.
    pub(crate) fn assert_caches_consistent(&mut self) {
        let mut fresh = ControlManager::new();
        let ids: Vec<_> = self.pieces.iter().map(|(id, _)| id).collect();
        fresh.add_pieces(&self.pieces, self.occupied(), ids);
        assert_eq!(self.control, fresh, "control diverged");

        for at in Coordinate::iter() {
            for color in [Color::White, Color::Black] {
                assert_eq!(
                    self.squares[at].is_controlled_by(color),
                    self.control.is_controlled(at, color),
                    "stale control flag on {at}"
                );
            }
            let watching: PieceSet = self
                .pieces
                .playing()
                .filter(|(_, piece)| piece.kind().is_pawn())
                .filter(|(_, piece)| {
                    piece.position().is_some_and(|from| {
                        pattern::pawn_front_squares(piece.color(), from).contains(at)
                    })
                })
                .map(|(id, _)| id)
                .collect();
            assert_eq!(self.mobility.pawns_watching(at), watching, "watchers of {at}");
        }

        let ids: Vec<_> = self.pieces.iter().map(|(id, _)| id).collect();
        for id in ids {
            let expected = self.compute_mobility(id);
            assert_eq!(self.mobility.moves(id), expected, "mobility of {id}");
        }
    }
}
