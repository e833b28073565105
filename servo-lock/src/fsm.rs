//! Hierarchical stability classifier
//!
//! The classifier is a finite-state machine over the servo states reported by
//! ts2phc. States form a hierarchy under a `Testing` root:
//!
//! ```text
//! Testing
//! ├── Unknown
//! ├── Initializing
//! ├── Locking
//! └── Locked
//!     ├── Stabilizing
//!     ├── Stable
//!     └── Wobble
//! ```
//!
//! The transition table is pure data: (state, input) -> (next state, action).
//! Guard evaluation and action side effects are delegated to a [`Callbacks`]
//! implementation supplied on each call, so the table can be enumerated and
//! tested on its own.
//!
//! `Stable` and `Wobble` are edge-triggered: they fire only on entry into
//! `LockedStable` / `LockedWobble`. `Unstable` is level-triggered: it fires on
//! every S0 or S1 received anywhere in the `Locked` family.

use crate::types::{Label, Sample, ServoState};
use serde::Serialize;
use std::fmt;

/// Classifier state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FsmState {
    /// Root of the hierarchy, never a resting state
    Testing,
    Unknown,
    Initializing,
    Locking,
    /// Parent of the locked states, never a resting state
    Locked,
    LockedStabilizing,
    LockedStable,
    LockedWobble,
}

impl FsmState {
    /// All states, in table row order
    pub const ALL: [FsmState; 8] = [
        FsmState::Testing,
        FsmState::Unknown,
        FsmState::Initializing,
        FsmState::Locking,
        FsmState::Locked,
        FsmState::LockedStabilizing,
        FsmState::LockedStable,
        FsmState::LockedWobble,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Hierarchical path of the state, e.g. `/TESTING/LOCKED/STABLE`
    pub fn path(&self) -> &'static str {
        match self {
            FsmState::Testing => "/TESTING",
            FsmState::Unknown => "/TESTING/UNKNOWN",
            FsmState::Initializing => "/TESTING/INITIALIZING",
            FsmState::Locking => "/TESTING/LOCKING",
            FsmState::Locked => "/TESTING/LOCKED",
            FsmState::LockedStabilizing => "/TESTING/LOCKED/STABILIZING",
            FsmState::LockedStable => "/TESTING/LOCKED/STABLE",
            FsmState::LockedWobble => "/TESTING/LOCKED/WOBBLE",
        }
    }

    /// True for `Locked` and its substates
    pub fn is_locked_family(&self) -> bool {
        matches!(
            self,
            FsmState::Locked
                | FsmState::LockedStabilizing
                | FsmState::LockedStable
                | FsmState::LockedWobble
        )
    }

    /// True for states an observer may see between events
    pub fn is_resting(&self) -> bool {
        !matches!(self, FsmState::Testing | FsmState::Locked)
    }
}

impl fmt::Display for FsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Table column: a servo state event with the guard already evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Input {
    S0,
    S1,
    /// S2 with a time error within the stability threshold
    S2Tight,
    /// S2 with a time error outside the stability threshold
    S2Loose,
}

impl Input {
    /// All inputs, in table column order
    pub const ALL: [Input; 4] = [Input::S0, Input::S1, Input::S2Tight, Input::S2Loose];

    fn index(self) -> usize {
        self as usize
    }
}

/// Outcome of one table lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// New state, `None` leaves the current state unchanged
    pub next: Option<FsmState>,
    /// Action to fire, if any
    pub action: Option<Label>,
}

impl Transition {
    /// No state change, no action
    pub const STAY: Transition = Transition {
        next: None,
        action: None,
    };

    const fn to(state: FsmState) -> Self {
        Transition {
            next: Some(state),
            action: None,
        }
    }

    const fn fire(state: FsmState, label: Label) -> Self {
        Transition {
            next: Some(state),
            action: Some(label),
        }
    }
}

use FsmState::{Initializing, LockedStabilizing, LockedStable, LockedWobble, Locking};

/// Transitions out of states that are not in the locked family
const UNLOCKED_ROW: [Transition; 4] = [
    Transition::to(Initializing),
    Transition::to(Locking),
    Transition::fire(LockedStable, Label::Stable),
    Transition::to(LockedStabilizing),
];

/// Transitions out of `Locked` and `LockedStabilizing`
const SETTLING_ROW: [Transition; 4] = [
    Transition::fire(Initializing, Label::Unstable),
    Transition::fire(Locking, Label::Unstable),
    Transition::fire(LockedStable, Label::Stable),
    Transition::STAY,
];

/// Transition table indexed by `[state][input]`
pub const TRANSITIONS: [[Transition; 4]; 8] = [
    // Testing
    UNLOCKED_ROW,
    // Unknown
    UNLOCKED_ROW,
    // Initializing
    UNLOCKED_ROW,
    // Locking
    UNLOCKED_ROW,
    // Locked
    SETTLING_ROW,
    // LockedStabilizing
    SETTLING_ROW,
    // LockedStable
    [
        Transition::fire(Initializing, Label::Unstable),
        Transition::fire(Locking, Label::Unstable),
        Transition::STAY,
        Transition::fire(LockedWobble, Label::Wobble),
    ],
    // LockedWobble
    [
        Transition::fire(Initializing, Label::Unstable),
        Transition::fire(Locking, Label::Unstable),
        Transition::fire(LockedStable, Label::Stable),
        Transition::STAY,
    ],
];

/// Look up the transition for `state` on `input`
///
/// Out-of-table lookups are a no-op.
pub fn transition(state: FsmState, input: Input) -> Transition {
    TRANSITIONS
        .get(state.index())
        .and_then(|row| row.get(input.index()))
        .copied()
        .unwrap_or(Transition::STAY)
}

/// Guard and actions invoked by the classifier
///
/// Implementations must be total: the classifier does not recover from a
/// callback that panics.
pub trait Callbacks {
    /// Guard: is the sample's time error within the stability threshold?
    fn condition_tight(&self, sample: &Sample) -> bool;

    /// Entered `LockedStable`
    fn action_stable(&mut self, sample: &Sample);

    /// Entered `LockedWobble`
    fn action_wobble(&mut self, sample: &Sample);

    /// Lost lock while in the locked family
    fn action_unstable(&mut self, sample: &Sample);
}

/// The stability classifier. Holds nothing but its current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilityClassifier {
    state: FsmState,
}

impl StabilityClassifier {
    /// Create a classifier resting in `Unknown`
    ///
    /// Entry passes through the `Testing` root, which has no entry action, so
    /// only the final state is stored.
    pub fn new() -> Self {
        Self {
            state: FsmState::Unknown,
        }
    }

    /// Current resting state
    pub fn state(&self) -> FsmState {
        self.state
    }

    /// Inject a servo state event carrying `sample`
    ///
    /// The guard is only consulted for S2. Returns the action fired, if any,
    /// after it has been delivered to `callbacks`.
    pub fn inject<C>(&mut self, event: ServoState, sample: &Sample, callbacks: &mut C) -> Option<Label>
    where
        C: Callbacks + ?Sized,
    {
        let input = match event {
            ServoState::S0 => Input::S0,
            ServoState::S1 => Input::S1,
            ServoState::S2 if callbacks.condition_tight(sample) => Input::S2Tight,
            ServoState::S2 => Input::S2Loose,
        };

        let Transition { next, action } = transition(self.state, input);

        if let Some(next) = next {
            if next != self.state {
                log::trace!("{} --{:?}--> {}", self.state, input, next);
            }
            self.state = next;
        }

        match action {
            Some(Label::Stable) => callbacks.action_stable(sample),
            Some(Label::Wobble) => callbacks.action_wobble(sample),
            Some(Label::Unstable) => callbacks.action_unstable(sample),
            None => {}
        }

        action
    }
}

impl Default for StabilityClassifier {
    fn default() -> Self {
        Self::new()
    }
}
