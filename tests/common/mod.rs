//! Shared test utilities and fake transports.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use async_trait::async_trait;
use citylog::city::{City, CityDraft, Position, RecordId};
use citylog::transport::{CityTransport, TransportError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

// -- Fixtures -----------------------------------------------------------------

pub fn city(id: u64, name: &str) -> City {
    City::new(id, draft(name))
}

pub fn draft(name: &str) -> CityDraft {
    CityDraft::new(name, "🏳️", Position::new(10.0, 20.0))
}

pub fn lisbon() -> City {
    City::new(1, CityDraft::new("Lisbon", "🇵🇹", Position::new(38.7, -9.1)))
}

// -- Scripted transport -------------------------------------------------------

/// A transport call as the store issued it.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchAll,
    FetchOne(RecordId),
    Create(CityDraft),
    Delete(RecordId),
}

/// Canned answer for the next call.
#[derive(Debug, Clone)]
pub enum Reply {
    Cities(Vec<City>),
    City(City),
    Deleted,
    Fail,
}

/// In-process transport that replays queued replies in order and records
/// every call. With [`ScriptedTransport::held`], each call blocks until the
/// test releases it.
pub struct ScriptedTransport {
    calls: Mutex<Vec<Call>>,
    replies: Mutex<VecDeque<Reply>>,
    hold: Option<Semaphore>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            replies: Mutex::new(replies.into_iter().collect()),
            hold: None,
        })
    }

    pub fn held(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            replies: Mutex::new(replies.into_iter().collect()),
            hold: Some(Semaphore::new(0)),
        })
    }

    pub fn push(&self, reply: Reply) {
        self.replies.lock().push_back(reply);
    }

    /// Lets `n` held calls complete.
    pub fn release(&self, n: usize) {
        if let Some(hold) = &self.hold {
            hold.add_permits(n);
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    async fn answer(&self, call: Call) -> Result<Reply, TransportError> {
        self.calls.lock().push(call);
        if let Some(hold) = &self.hold {
            hold.acquire().await.expect("hold semaphore closed").forget();
        }
        match self.replies.lock().pop_front() {
            Some(Reply::Fail) | None => Err(TransportError::Status {
                status: 500,
                message: "scripted failure".to_string(),
            }),
            Some(reply) => Ok(reply),
        }
    }
}

fn unexpected(reply: Reply) -> TransportError {
    TransportError::Status {
        status: 599,
        message: format!("reply {:?} does not fit this call", reply),
    }
}

#[async_trait]
impl CityTransport for ScriptedTransport {
    async fn fetch_all(&self) -> Result<Vec<City>, TransportError> {
        match self.answer(Call::FetchAll).await? {
            Reply::Cities(cities) => Ok(cities),
            other => Err(unexpected(other)),
        }
    }

    async fn fetch_one(&self, id: RecordId) -> Result<City, TransportError> {
        match self.answer(Call::FetchOne(id)).await? {
            Reply::City(city) => Ok(city),
            other => Err(unexpected(other)),
        }
    }

    async fn create(&self, draft: &CityDraft) -> Result<City, TransportError> {
        match self.answer(Call::Create(draft.clone())).await? {
            Reply::City(city) => Ok(city),
            other => Err(unexpected(other)),
        }
    }

    async fn delete(&self, id: RecordId) -> Result<(), TransportError> {
        match self.answer(Call::Delete(id)).await? {
            Reply::Deleted => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}

/// Wait until the transport has seen `n` calls.
pub async fn wait_for_calls(transport: &ScriptedTransport, n: usize) {
    let start = std::time::Instant::now();
    while transport.call_count() < n {
        assert!(
            start.elapsed() < Duration::from_secs(2),
            "timed out waiting for {} calls, saw {:?}",
            n,
            transport.calls()
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
