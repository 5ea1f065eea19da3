use serde::{Deserialize, Serialize};

use crate::input::{ButtonEvent, NavAction};

/// Number of fixed menu cells preceding the game grid.
pub const HEADER_SLOTS: usize = 3;
/// Column count of the body grid.
pub const BODY_ROW_WIDTH: usize = 4;
/// First body slot; the header occupies `0..BODY_START`.
pub const BODY_START: usize = HEADER_SLOTS;

const LAST_HEADER_SLOT: usize = HEADER_SLOTS - 1;
const FIRST_BODY_ROW_END: usize = BODY_START + BODY_ROW_WIDTH - 1;

/// Result of feeding one button transition to the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusOutcome {
    /// No state change: a release, an unrecognized button, or a move that
    /// clamped back onto the current slot.
    Unchanged,
    /// The cursor moved to a new slot.
    Moved(usize),
    /// A confirm-class press landed on the focused slot.
    Commit(usize),
}

/// Body navigation style. Header slots behave identically in both modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridMode {
    /// Four-wide grid; vertical moves are row-aware.
    #[default]
    Grid,
    /// Single-step vertical list over the body items.
    Carousel,
}

/// How a vertical rule rewrites the cursor.
#[derive(Debug, Clone, Copy)]
enum Step {
    /// Land on a fixed slot.
    Jump(usize),
    /// Shift by a signed offset.
    Shift(isize),
}

/// One row of a vertical transition table, applying to slots `lo..=hi`.
/// The first matching row wins.
struct Rule {
    lo: usize,
    hi: usize,
    step: Step,
}

/// Up out of the first body row collapses onto the last header cell;
/// everywhere else Up is a plain row shift.
const UP_RULES: &[Rule] = &[
    Rule {
        lo: BODY_START,
        hi: FIRST_BODY_ROW_END,
        step: Step::Jump(LAST_HEADER_SLOT),
    },
    Rule {
        lo: 0,
        hi: usize::MAX,
        step: Step::Shift(-(BODY_ROW_WIDTH as isize)),
    },
];

/// Down from the first two header cells gathers onto the last one, which in
/// turn feeds the first body slot; body rows shift by the row width.
const DOWN_RULES: &[Rule] = &[
    Rule {
        lo: 0,
        hi: LAST_HEADER_SLOT - 1,
        step: Step::Jump(LAST_HEADER_SLOT),
    },
    Rule {
        lo: LAST_HEADER_SLOT,
        hi: LAST_HEADER_SLOT,
        step: Step::Jump(BODY_START),
    },
    Rule {
        lo: BODY_START,
        hi: usize::MAX,
        step: Step::Shift(BODY_ROW_WIDTH as isize),
    },
];

fn apply_rules(rules: &[Rule], slot: usize) -> isize {
    for rule in rules {
        if (rule.lo..=rule.hi).contains(&slot) {
            return match rule.step {
                Step::Jump(target) => target as isize,
                Step::Shift(delta) => slot as isize + delta,
            };
        }
    }
    slot as isize
}

/// Cursor state machine for the launcher grid.
///
/// Only press transitions act; releases are ignored entirely. Left and
/// Right deliberately run off the header row into the body and back —
/// only the vertical rules are row-aware, which is what makes the header
/// reachable from anywhere in the first body row.
///
/// The body size is passed on every call so an externally growing or
/// shrinking item list is honored on the very next transition.
#[derive(Debug)]
pub struct FocusNavigator {
    focused: usize,
    mode: GridMode,
}

impl FocusNavigator {
    pub fn new() -> Self {
        Self::with_mode(GridMode::Grid)
    }

    pub fn with_mode(mode: GridMode) -> Self {
        Self { focused: 0, mode }
    }

    /// The currently highlighted slot.
    pub fn focused(&self) -> usize {
        self.focused
    }

    pub fn mode(&self) -> GridMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GridMode) {
        self.mode = mode;
    }

    /// Last valid slot for the given body size. With an empty body the
    /// cursor is confined to the header.
    pub fn max_slot(items_count: usize) -> usize {
        LAST_HEADER_SLOT + items_count
    }

    /// Advance the state machine by one button transition.
    ///
    /// Confirm presses commit the focused slot without moving it; the
    /// caller decides what selection means. Directional presses compute a
    /// candidate from the transition tables and clamp it into
    /// `0..=max_slot(items_count)`.
    pub fn handle(&mut self, event: ButtonEvent, items_count: usize) -> FocusOutcome {
        if !event.pressed {
            return FocusOutcome::Unchanged;
        }

        let slot = self.focused as isize;
        let candidate = match (NavAction::from(event.button), self.mode) {
            (NavAction::Confirm, _) => return FocusOutcome::Commit(self.focused),
            (NavAction::Other, _) => return FocusOutcome::Unchanged,
            (NavAction::Up, GridMode::Carousel) if self.focused >= BODY_START => {
                (slot - 1).max(BODY_START as isize)
            },
            (NavAction::Down, GridMode::Carousel) if self.focused >= BODY_START => slot + 1,
            (NavAction::Up, _) => apply_rules(UP_RULES, self.focused),
            (NavAction::Down, _) => apply_rules(DOWN_RULES, self.focused),
            (NavAction::Left, _) => slot - 1,
            (NavAction::Right, _) => slot + 1,
        };

        let next = candidate.clamp(0, Self::max_slot(items_count) as isize) as usize;
        if next == self.focused {
            FocusOutcome::Unchanged
        } else {
            self.focused = next;
            FocusOutcome::Moved(next)
        }
    }
}

impl Default for FocusNavigator {
    fn default() -> Self {
        Self::new()
    }
}
