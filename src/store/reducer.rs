//! Pure transition function for the cities store.

use std::collections::HashSet;

use crate::city::City;
use crate::mvi::Reducer;

use super::intent::CitiesIntent;
use super::state::{CitiesState, RequestState};

pub struct CitiesReducer;

impl Reducer for CitiesReducer {
    type State = CitiesState;
    type Intent = CitiesIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        let next = match intent {
            CitiesIntent::Loading => CitiesState {
                request: RequestState::Pending,
                ..state
            },

            CitiesIntent::CitiesLoaded { cities } => CitiesState {
                cities: dedup_by_id(cities),
                request: RequestState::Idle,
                ..state
            },

            CitiesIntent::CityLoaded { city } => CitiesState {
                focus: Some(city),
                request: RequestState::Idle,
                ..state
            },

            CitiesIntent::CityCreated { city } => {
                let mut cities = state.cities;
                // Ids are server-assigned; a repeat replaces rather than duplicates.
                match cities.iter_mut().find(|existing| existing.id == city.id) {
                    Some(existing) => *existing = city.clone(),
                    None => cities.push(city.clone()),
                }
                CitiesState {
                    cities,
                    focus: Some(city),
                    request: RequestState::Idle,
                }
            }

            CitiesIntent::CityDeleted { id } => {
                let mut cities = state.cities;
                cities.retain(|city| city.id != id);
                // Focus is left alone even when it was the deleted city.
                CitiesState {
                    cities,
                    request: RequestState::Idle,
                    ..state
                }
            }

            CitiesIntent::Rejected { operation } => CitiesState {
                request: RequestState::Error(operation.failure_message().to_string()),
                ..state
            },

            CitiesIntent::Cancelled => CitiesState {
                request: RequestState::Idle,
                ..state
            },
        };

        debug_assert!(next.has_unique_ids(), "duplicate city ids in collection");
        next
    }
}

/// Keeps the first city for each id, preserving server order.
pub(crate) fn dedup_by_id(cities: Vec<City>) -> Vec<City> {
    let mut seen = HashSet::with_capacity(cities.len());
    cities.into_iter().filter(|city| seen.insert(city.id)).collect()
}
