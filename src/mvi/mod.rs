//! Unidirectional state-transition primitives.
//!
//! Every change to store state is expressed as an intent and applied by a
//! reducer; nothing else writes state.
//!
//! ```text
//! Operation ──→ Intent ──→ Reducer ──→ State ──→ Subscribers
//!     ↑                                              │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! - **State**: snapshot that consumers read and clone
//! - **Intent**: a settled outcome (or the start of one)
//! - **Reducer**: pure function `(State, Intent) -> State`

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::StoreState;
