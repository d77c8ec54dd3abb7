//! Snapshot of everything the store knows.

use std::collections::HashSet;

use crate::city::{City, MapMarker, RecordId};
use crate::mvi::StoreState;

/// Status of the most recent background operation.
///
/// One value for the whole store: a consumer cannot tell a collection load
/// from a single-record load except by which operation it started.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    /// The last operation failed; the message is meant to be shown verbatim.
    Error(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Collection, focus, and request status, published as one value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CitiesState {
    pub cities: Vec<City>,
    /// Separate copy of the selected city, not a reference into `cities`.
    pub focus: Option<City>,
    pub request: RequestState,
}

impl StoreState for CitiesState {}

impl CitiesState {
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn focus(&self) -> Option<&City> {
        self.focus.as_ref()
    }

    pub fn focus_id(&self) -> Option<RecordId> {
        self.focus.as_ref().map(|city| city.id)
    }

    pub fn is_loading(&self) -> bool {
        self.request.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.request.error()
    }

    pub fn get(&self, id: RecordId) -> Option<&City> {
        self.cities.iter().find(|city| city.id == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    /// True when a city is focused but no longer present in the collection,
    /// e.g. after it was removed.
    pub fn is_focus_stale(&self) -> bool {
        self.focus_id().is_some_and(|id| !self.contains(id))
    }

    pub fn markers(&self) -> Vec<MapMarker> {
        self.cities.iter().map(City::marker).collect()
    }

    pub fn has_unique_ids(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.cities.len());
        self.cities.iter().all(|city| seen.insert(city.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::{CityDraft, Position};

    fn city(id: u64, name: &str) -> City {
        City::new(id, CityDraft::new(name, "🏳️", Position::new(0.0, 0.0)))
    }

    #[test]
    fn idle_is_default() {
        let state = CitiesState::default();
        assert_eq!(state.request, RequestState::Idle);
        assert!(state.cities.is_empty());
        assert!(state.focus.is_none());
        assert!(!state.is_loading());
        assert_eq!(state.error(), None);
    }

    #[test]
    fn error_message_only_when_errored() {
        assert_eq!(RequestState::Pending.error(), None);
        assert_eq!(RequestState::Error("boom".into()).error(), Some("boom"));
        assert!(RequestState::Pending.is_loading());
        assert!(!RequestState::Error("boom".into()).is_loading());
    }

    #[test]
    fn stale_focus_detection() {
        let mut state = CitiesState {
            cities: vec![city(1, "Lisbon")],
            focus: Some(city(1, "Lisbon")),
            request: RequestState::Idle,
        };
        assert!(!state.is_focus_stale());
        state.cities.clear();
        assert!(state.is_focus_stale());
        state.focus = None;
        assert!(!state.is_focus_stale());
    }

    #[test]
    fn unique_ids_check() {
        let mut state = CitiesState {
            cities: vec![city(1, "A"), city(2, "B")],
            ..Default::default()
        };
        assert!(state.has_unique_ids());
        state.cities.push(city(1, "C"));
        assert!(!state.has_unique_ids());
    }

    #[test]
    fn markers_follow_collection_order() {
        let state = CitiesState {
            cities: vec![city(2, "B"), city(1, "A")],
            ..Default::default()
        };
        let labels: Vec<_> = state.markers().into_iter().map(|m| m.label).collect();
        assert_eq!(labels, vec!["B", "A"]);
    }
}
