//! Discrete navigation events produced by the gesture recognizer.

/// Outcome of one completed single-pointer interaction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum NavigationIntent {
    /// `x` is the negated committed horizontal delta, so a leftward drag
    /// yields a positive value. `y` is `+1` for upward, `-1` for downward
    /// motion. `{0, 0}` means the gesture did not reach its threshold.
    Nav { x: f64, y: f64 },
    /// The pointer went down and up without committing to an axis.
    Interrupted,
}

impl NavigationIntent {
    pub const NONE: NavigationIntent = NavigationIntent::Nav { x: 0.0, y: 0.0 };

    /// Fixed mapping from a gesture outcome to a controller action.
    pub fn action(&self) -> Option<NavAction> {
        match *self {
            NavigationIntent::Interrupted => Some(NavAction::Interrupted),
            NavigationIntent::Nav { x, .. } if x != 0.0 => Some(NavAction::Step(sign(x))),
            NavigationIntent::Nav { y, .. } if y != 0.0 => Some(NavAction::Level(sign(y))),
            NavigationIntent::Nav { .. } => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NavAction {
    /// Move by one item in the given direction.
    Step(i64),
    /// Leave the item view (either direction).
    Level(i64),
    /// Let the interaction through as a click.
    Interrupted,
}

fn sign(v: f64) -> i64 {
    if v > 0.0 { 1 } else { -1 }
}

#[cfg(test)]
mod tests {
    use super::{NavAction, NavigationIntent};

    #[test]
    fn horizontal_intent_steps_by_sign() {
        assert_eq!(
            NavigationIntent::Nav { x: 340.0, y: 0.0 }.action(),
            Some(NavAction::Step(1))
        );
        assert_eq!(
            NavigationIntent::Nav { x: -0.5, y: 0.0 }.action(),
            Some(NavAction::Step(-1))
        );
    }

    #[test]
    fn vertical_intent_changes_level() {
        assert_eq!(
            NavigationIntent::Nav { x: 0.0, y: 1.0 }.action(),
            Some(NavAction::Level(1))
        );
        assert_eq!(
            NavigationIntent::Nav { x: 0.0, y: -1.0 }.action(),
            Some(NavAction::Level(-1))
        );
    }

    #[test]
    fn zero_intent_does_nothing() {
        assert_eq!(NavigationIntent::NONE.action(), None);
        assert_eq!(NavigationIntent::Interrupted.action(), Some(NavAction::Interrupted));
    }
}
