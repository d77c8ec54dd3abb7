//! Marker trait for store state.

/// Snapshot type published to subscribers.
///
/// States are cloned out to readers, compared to detect changes, and start
/// from `Default` before the first load.
pub trait StoreState: Clone + PartialEq + Default + Send + Sync + 'static {}
