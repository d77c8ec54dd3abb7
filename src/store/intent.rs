//! Transitions applied to [`CitiesState`](super::CitiesState).

use crate::city::{City, RecordId};
use crate::mvi::Intent;

use super::operation::Operation;

/// Every way the store state can change.
#[derive(Debug, Clone)]
pub enum CitiesIntent {
    /// An operation started and is waiting on the network.
    Loading,

    /// The full collection arrived; replaces whatever was cached.
    CitiesLoaded { cities: Vec<City> },

    /// A single city arrived and becomes the focus.
    CityLoaded { city: City },

    /// The server accepted a new city and assigned its id.
    CityCreated { city: City },

    /// The server confirmed a delete.
    CityDeleted { id: RecordId },

    /// An operation failed.
    Rejected { operation: Operation },

    /// The caller dropped an operation before its response arrived.
    Cancelled,
}

impl Intent for CitiesIntent {}
