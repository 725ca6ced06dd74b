//! Click versus long-press disambiguation for a single pointer.
//!
//! The terminal gives us press, drag and release events with no timers, so
//! the long-press timer is a deadline that the event loop polls through
//! [`PressGesture::tick`]. Cancelling the timer clears the deadline, which
//! makes a late fire impossible.

use crate::tui::geometry::Point;
use crate::tui::selection::ItemId;
use log::debug;
use std::time::{Duration, Instant};

pub const LONG_PRESS_DELAY: Duration = Duration::from_millis(500);

/// Movement, in cells, tolerated before a press stops counting as a hold.
pub const MOVE_THRESHOLD: i32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressState {
    Idle,
    Pressed {
        id: ItemId,
        origin: Point,
        /// `None` once the timer has been cancelled by movement.
        deadline: Option<Instant>,
    },
    LongPressFired {
        id: ItemId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureAction {
    Click(ItemId),
    LongPress(ItemId),
}

/// Fire-and-forget hook run when a long-press lands.
pub trait Feedback {
    fn long_press(&mut self);
}

pub struct NoFeedback;

impl Feedback for NoFeedback {
    fn long_press(&mut self) {}
}

#[derive(Debug)]
pub struct PressGesture {
    state: PressState,
    delay: Duration,
    move_threshold: i32,
}

impl Default for PressGesture {
    fn default() -> Self {
        Self::new(LONG_PRESS_DELAY, MOVE_THRESHOLD)
    }
}

impl PressGesture {
    pub fn new(delay: Duration, move_threshold: i32) -> Self {
        Self {
            state: PressState::Idle,
            delay,
            move_threshold,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &PressState {
        &self.state
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.state == PressState::Idle
    }

    /// When the armed timer will fire, if one is armed.
    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            PressState::Pressed { deadline, .. } => *deadline,
            _ => None,
        }
    }

    pub fn press(&mut self, id: &str, at: Point, now: Instant) {
        self.state = PressState::Pressed {
            id: id.to_string(),
            origin: at,
            deadline: Some(now + self.delay),
        };
    }

    /// Pointer moved while held. Travelling past the threshold disarms the
    /// timer so scrolling or dragging is never read as a hold.
    pub fn moved(&mut self, at: Point) {
        if let PressState::Pressed { origin, deadline, id } = &mut self.state {
            if deadline.is_some() && origin.distance(at) > self.move_threshold {
                debug!("long-press on {} cancelled by movement", id);
                *deadline = None;
            }
        }
    }

    /// Fire the long-press if its deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Option<GestureAction> {
        let PressState::Pressed { id, deadline: Some(deadline), .. } = &self.state else {
            return None;
        };
        if now < *deadline {
            return None;
        }

        let id = id.clone();
        debug!("long-press fired on {}", id);
        self.state = PressState::LongPressFired { id: id.clone() };
        Some(GestureAction::LongPress(id))
    }

    /// Pointer released. A release before the deadline is a click; a
    /// release after a long-press fired produces nothing, which suppresses
    /// the click that would otherwise follow.
    pub fn release(&mut self, now: Instant) -> Option<GestureAction> {
        if let Some(action) = self.tick(now) {
            self.state = PressState::Idle;
            return Some(action);
        }

        match std::mem::replace(&mut self.state, PressState::Idle) {
            PressState::Pressed { id, .. } => Some(GestureAction::Click(id)),
            PressState::LongPressFired { .. } | PressState::Idle => None,
        }
    }

    /// Drop any pending press without producing an action.
    pub fn cancel(&mut self) {
        self.state = PressState::Idle;
    }
}
