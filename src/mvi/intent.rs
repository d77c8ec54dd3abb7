//! Marker trait for state transitions.

/// A transition consumed by a [`Reducer`](super::Reducer).
///
/// Intents describe what happened (a request started, a payload arrived,
/// a request failed), never how to render it.
pub trait Intent: Send + 'static {}
