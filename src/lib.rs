//! Client-side cache for a remote collection of city visits.
//!
//! [`store::CityStore`] keeps the collection, the focused city, and the
//! request status in sync with a `/cities` JSON API reached through a
//! [`transport::CityTransport`].

pub mod city;
pub mod cli;
pub mod config;
pub mod logging;
pub mod mvi;
pub mod store;
pub mod transport;
