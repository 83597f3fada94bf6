use tracing::{info, warn};

use super::input::InputSnapshot;
use super::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateId {
    Null,
    Init,
    Intro,
    Menu,
    Edit,
    Game,
    Exit,
}

/// Every legal `(from, to)` pair. Any state may additionally move to `Exit`.
const TRANSITIONS: &[(StateId, StateId)] = &[
    (StateId::Null, StateId::Init),
    (StateId::Init, StateId::Intro),
    (StateId::Intro, StateId::Menu),
    (StateId::Menu, StateId::Edit),
    (StateId::Menu, StateId::Game),
    (StateId::Edit, StateId::Menu),
    (StateId::Game, StateId::Menu),
];

pub fn is_legal_transition(from: StateId, to: StateId) -> bool {
    if from == StateId::Exit {
        return false;
    }
    to == StateId::Exit || TRANSITIONS.contains(&(from, to))
}

/// Current state plus at most one pending, already-validated transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTracker {
    current: StateId,
    next: Option<StateId>,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self {
            current: StateId::Null,
            next: None,
        }
    }
}

impl StateTracker {
    pub fn current(&self) -> StateId {
        self.current
    }

    pub fn pending(&self) -> Option<StateId> {
        self.next
    }

    /// Queues `next` if the table allows it from the current state.
    /// `Exit` always wins over a previously queued request.
    pub fn request(&mut self, next: StateId) -> bool {
        if !is_legal_transition(self.current, next) {
            warn!(from = ?self.current, to = ?next, "illegal_state_transition_ignored");
            return false;
        }
        if self.next == Some(StateId::Exit) {
            return false;
        }
        self.next = Some(next);
        true
    }

    /// Applies the pending transition, returning `(from, to)` when one happened.
    pub fn apply(&mut self) -> Option<(StateId, StateId)> {
        let next = self.next.take()?;
        let from = self.current;
        self.current = next;
        info!(from = ?from, to = ?next, "state_changed");
        Some((from, next))
    }
}

/// What the window loop drives: one update per fixed tick, one draw per frame.
pub trait StateHost {
    fn current_state(&self) -> StateId;
    fn update(&mut self, input: &InputSnapshot);
    fn draw(&mut self, surface: &mut dyn Surface);
    fn title(&self) -> Option<String> {
        None
    }
    fn shutdown(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_chain_is_legal() {
        let mut tracker = StateTracker::default();
        for next in [StateId::Init, StateId::Intro, StateId::Menu, StateId::Game] {
            assert!(tracker.request(next), "to={next:?}");
            assert_eq!(tracker.apply().map(|(_, to)| to), Some(next));
        }
        assert_eq!(tracker.current(), StateId::Game);
    }

    #[test]
    fn illegal_request_leaves_state_unchanged() {
        let mut tracker = StateTracker::default();
        assert!(!tracker.request(StateId::Game));
        assert_eq!(tracker.pending(), None);
        assert_eq!(tracker.apply(), None);
        assert_eq!(tracker.current(), StateId::Null);
    }

    #[test]
    fn edit_and_game_cannot_switch_directly() {
        assert!(!is_legal_transition(StateId::Edit, StateId::Game));
        assert!(!is_legal_transition(StateId::Game, StateId::Edit));
        assert!(is_legal_transition(StateId::Edit, StateId::Menu));
    }

    #[test]
    fn exit_reachable_from_everywhere_and_terminal() {
        for from in [
            StateId::Null,
            StateId::Init,
            StateId::Intro,
            StateId::Menu,
            StateId::Edit,
            StateId::Game,
        ] {
            assert!(is_legal_transition(from, StateId::Exit), "from={from:?}");
        }
        assert!(!is_legal_transition(StateId::Exit, StateId::Menu));
    }

    #[test]
    fn exit_is_not_overridden_by_later_request() {
        let mut tracker = StateTracker::default();
        tracker.request(StateId::Exit);
        assert!(!tracker.request(StateId::Init));
        assert_eq!(tracker.apply(), Some((StateId::Null, StateId::Exit)));
    }
}
