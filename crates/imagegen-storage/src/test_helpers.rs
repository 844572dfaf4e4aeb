//! In-memory content client and console sink for persistence tests.

use async_trait::async_trait;
use bytes::Bytes;
use imagegen_core::{ContentClient, ContentSession, RetrievalError};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Counters shared between a mock client and the sessions it opens.
#[derive(Debug, Default)]
pub struct MockStats {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub fetches: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub fetched: Mutex<Vec<String>>,
}

impl MockStats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

/// Cloneable in-memory `Write` sink for console assertions.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Serves canned bytes or errors keyed by reference.
#[derive(Clone, Default)]
pub struct MockContentClient {
    responses: Arc<HashMap<String, Result<Bytes, RetrievalError>>>,
    delays: Arc<HashMap<String, Duration>>,
    panics: Arc<Vec<String>>,
    fail_open: bool,
    pub stats: Arc<MockStats>,
}

impl MockContentClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(mut self, reference: &str, data: &[u8]) -> Self {
        Arc::make_mut(&mut self.responses)
            .insert(reference.to_string(), Ok(Bytes::copy_from_slice(data)));
        self
    }

    pub fn with_error(mut self, reference: &str, error: RetrievalError) -> Self {
        Arc::make_mut(&mut self.responses).insert(reference.to_string(), Err(error));
        self
    }

    pub fn with_delay(mut self, reference: &str, delay: Duration) -> Self {
        Arc::make_mut(&mut self.delays).insert(reference.to_string(), delay);
        self
    }

    pub fn with_panic(mut self, reference: &str) -> Self {
        Arc::make_mut(&mut self.panics).push(reference.to_string());
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }
}

#[async_trait]
impl ContentClient for MockContentClient {
    async fn open_session(&self) -> Result<Box<dyn ContentSession>, RetrievalError> {
        if self.fail_open {
            return Err(RetrievalError::Transport {
                reference: "mock".to_string(),
                message: "connection refused".to_string(),
            });
        }

        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            client: self.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

struct MockSession {
    client: MockContentClient,
    closed: AtomicBool,
}

#[async_trait]
impl ContentSession for MockSession {
    async fn fetch(&self, reference: &str) -> Result<Bytes, RetrievalError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RetrievalError::SessionClosed);
        }

        let stats = &self.client.stats;
        stats.fetches.fetch_add(1, Ordering::SeqCst);
        stats.fetched.lock().unwrap().push(reference.to_string());

        let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        stats.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.client.delays.get(reference) {
            tokio::time::sleep(*delay).await;
        }

        stats.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.client.panics.iter().any(|r| r == reference) {
            panic!("mock fetch panicked for {}", reference);
        }

        self.client
            .responses
            .get(reference)
            .cloned()
            .unwrap_or_else(|| Err(RetrievalError::NotFound(reference.to_string())))
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.client.stats.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}
