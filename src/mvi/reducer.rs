//! Reducer trait.

use super::intent::Intent;
use super::state::StoreState;

/// Applies intents to state.
///
/// Implementations match on the intent exhaustively so that adding a
/// variant without handling it is a compile error.
pub trait Reducer {
    /// The state type this reducer operates on.
    type State: StoreState;

    /// The intent type this reducer handles.
    type Intent: Intent;

    /// Consume the current state and an intent, returning the next state.
    ///
    /// Must be pure: no I/O, no clocks, no shared mutation.
    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}
