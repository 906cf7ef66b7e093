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
use std::time::Duration;

use super::coordinate::Coordinate;
use super::material::Color;
use super::moves::Move;
use crate::game::{GameEndedReason, GameOutcome};

/// Notifications a board emits after its state changed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    MovePlayed(Move),
    ClockChanged { color: Color, remaining: Duration },
    GameEnded { reason: GameEndedReason, outcome: GameOutcome },
    /// A pawn reached its last rank; the move completes once
    /// `provide_requested_promotion_piece` is called.
    PromotionRequested { from: Coordinate, to: Coordinate },
}

pub trait BoardObserver {
    fn on_event(&mut self, event: &BoardEvent);
}

impl<F> BoardObserver for F
where
    F: FnMut(&BoardEvent),
{
    fn on_event(&mut self, event: &BoardEvent) {
        self(event)
    }
}

/// Signals from an external chess clock.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockEvent {
    Tick { color: Color, remaining: Duration },
    TimeUp(Color),
}
