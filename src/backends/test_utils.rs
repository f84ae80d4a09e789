//! Test utilities and mock removers
//!
//! This module provides a scripted implementation of the `BackgroundRemover`
//! trait so sessions can be exercised without network access or an API key.

use crate::{
    error::{BgRemovalError, Result},
    remover::BackgroundRemover,
    types::SelectedImage,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted outcome of a mock call
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return these bytes
    Succeed(Vec<u8>),
    /// Fail as an HTTP response with this status would
    HttpStatus(u16),
    /// Fail as a network error would
    ConnectionFailure,
    /// Fail with a malformed success response
    Malformed,
}

/// Mock background remover for testing
#[derive(Debug, Clone)]
pub struct MockRemover {
    behavior: MockBehavior,
    /// Optional artificial latency
    delay: Option<Duration>,
    /// File names received, in call order
    call_history: Arc<Mutex<Vec<String>>>,
}

impl MockRemover {
    #[must_use]
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Mock that returns the given bytes
    #[must_use]
    pub fn returning(bytes: Vec<u8>) -> Self {
        Self::new(MockBehavior::Succeed(bytes))
    }

    /// Mock that answers with an HTTP error status
    #[must_use]
    pub fn failing_with_status(status: u16) -> Self {
        Self::new(MockBehavior::HttpStatus(status))
    }

    /// Add latency to every call
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the call history for verification in tests
    pub fn get_call_history(&self) -> Vec<String> {
        self.call_history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    /// Number of calls received
    pub fn call_count(&self) -> usize {
        self.get_call_history().len()
    }

    fn record_call(&self, file_name: &str) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(file_name.to_string());
        }
    }
}

#[async_trait]
impl BackgroundRemover for MockRemover {
    async fn remove_background(&self, image: &SelectedImage) -> Result<Vec<u8>> {
        self.record_call(image.file_name());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            MockBehavior::Succeed(bytes) => Ok(bytes.clone()),
            MockBehavior::HttpStatus(status) => Err(BgRemovalError::transport(
                Some(*status),
                format!("mock service answered {}", status),
            )),
            MockBehavior::ConnectionFailure => Err(BgRemovalError::network_error(
                "Failed to reach background removal service",
                "connection refused",
            )),
            MockBehavior::Malformed => Err(BgRemovalError::unexpected_response(
                "service returned an empty body",
            )),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
