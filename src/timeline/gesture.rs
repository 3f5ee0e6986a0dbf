//! Turns raw clicks and drags into single-click, double-click and swipe
//! gestures. Time is always passed in, so nothing here waits on a timer.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::models::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    SingleClick,
    DoubleClick,
    SwipeLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickState {
    Idle,
    AwaitingSecond { first_at: Instant },
    Resolved(Gesture),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickInput {
    Click(Instant),
    /// Time passes with no click.
    Poll(Instant),
}

/// Transition table of the click recognizer.
pub fn transition(state: ClickState, input: ClickInput, window: Duration) -> ClickState {
    use ClickInput::*;
    use ClickState::*;

    match (state, input) {
        (AwaitingSecond { first_at }, Click(at)) if at.saturating_duration_since(first_at) < window => {
            Resolved(Gesture::DoubleClick)
        }
        (AwaitingSecond { first_at }, Poll(at)) if at.saturating_duration_since(first_at) >= window => {
            Resolved(Gesture::SingleClick)
        }
        (AwaitingSecond { .. }, Poll(_)) => state,
        (AwaitingSecond { .. }, Click(at)) | (Idle | Resolved(_), Click(at)) => {
            AwaitingSecond { first_at: at }
        }
        (Idle | Resolved(_), Poll(_)) => Idle,
    }
}

/// Per-task click disambiguation. Each task has its own pending state, so
/// clicking one row never cancels another row's pending single click.
pub struct ClickRecognizer {
    window: Duration,
    states: HashMap<TaskId, ClickState>,
}

impl ClickRecognizer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            states: HashMap::new(),
        }
    }

    pub fn click(&mut self, task: TaskId, at: Instant) -> Vec<(TaskId, Gesture)> {
        // Resolve anything that timed out before this click landed.
        let mut resolved = self.poll(at);
        if let Some(gesture) = self.step(task, ClickInput::Click(at)) {
            resolved.push((task, gesture));
        }
        resolved
    }

    pub fn poll(&mut self, at: Instant) -> Vec<(TaskId, Gesture)> {
        let pending: Vec<TaskId> = self
            .states
            .iter()
            .filter(|(_, s)| matches!(s, ClickState::AwaitingSecond { .. }))
            .map(|(id, _)| *id)
            .collect();

        let mut resolved: Vec<(TaskId, Gesture)> = pending
            .into_iter()
            .filter_map(|id| self.step(id, ClickInput::Poll(at)).map(|g| (id, g)))
            .collect();
        resolved.sort_by_key(|(id, _)| *id);
        resolved
    }

    pub fn is_pending(&self) -> bool {
        self.states
            .values()
            .any(|s| matches!(s, ClickState::AwaitingSecond { .. }))
    }

    fn step(&mut self, task: TaskId, input: ClickInput) -> Option<Gesture> {
        let state = self.states.get(&task).copied().unwrap_or(ClickState::Idle);
        match transition(state, input, self.window) {
            ClickState::Resolved(gesture) => {
                self.states.insert(task, ClickState::Idle);
                Some(gesture)
            }
            next => {
                self.states.insert(task, next);
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeRule {
    pub min_dx: f64,
    pub max_dy: f64,
}

impl Default for SwipeRule {
    fn default() -> Self {
        Self {
            min_dx: 100.0,
            max_dy: 50.0,
        }
    }
}

impl SwipeRule {
    /// Leftward drag: more than `min_dx` to the left, less than `max_dy`
    /// off the horizontal.
    pub fn detect(&self, start: Point, end: Point) -> Option<Gesture> {
        let dx = start.x - end.x;
        let dy = (start.y - end.y).abs();
        (dx > self.min_dx && dy < self.max_dy).then_some(Gesture::SwipeLeft)
    }
}
