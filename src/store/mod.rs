//! The cities store: state, transitions, and the remote-backed handle.

mod intent;
mod operation;
mod reducer;
mod remote;
mod state;

pub use intent::CitiesIntent;
pub use operation::Operation;
pub use reducer::CitiesReducer;
pub use remote::CityStore;
pub use state::{CitiesState, RequestState};
