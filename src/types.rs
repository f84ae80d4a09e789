//! Core types: selected images, handles, results and operation state

use crate::{
    error::{BgRemovalError, FailureKind, Result},
    services::FormatService,
};
use chrono::{DateTime, Utc};
use instant::Duration;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use uuid::Uuid;

/// Image chosen by the user, held in memory for the session
#[derive(Debug, Clone)]
pub struct SelectedImage {
    file_name: String,
    mime_type: String,
    data: Arc<[u8]>,
}

impl SelectedImage {
    /// Accept raw file content as a selected image
    ///
    /// Mirrors an `image/*` file picker filter: empty content and content
    /// that cannot be identified as an image are rejected.
    pub fn from_bytes<S: Into<String>>(file_name: S, data: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        if data.is_empty() {
            return Err(BgRemovalError::invalid_input(format!(
                "'{}' is empty",
                file_name
            )));
        }
        let format = FormatService::sniff(&data).ok_or_else(|| {
            BgRemovalError::invalid_input(format!("'{}' is not a recognized image", file_name))
        })?;

        Ok(Self {
            file_name,
            mime_type: format.to_mime_type().to_string(),
            data: data.into(),
        })
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type sniffed from the content
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn shared_data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }
}

/// Counts live image handles
///
/// Every [`ImageHandle`] created through a tracker increments its counter and
/// decrements it when the last clone of the handle is dropped.
#[derive(Debug, Clone, Default)]
pub struct HandleTracker {
    live: Arc<AtomicUsize>,
}

impl HandleTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles currently alive
    #[must_use]
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Create a tracked handle over shared bytes
    #[must_use]
    pub fn create(&self, data: Arc<[u8]>) -> ImageHandle {
        self.live.fetch_add(1, Ordering::SeqCst);
        let handle = ImageHandle {
            id: Uuid::new_v4(),
            data,
            _lease: Arc::new(HandleLease {
                live: Arc::clone(&self.live),
            }),
        };
        log::trace!("Created handle {}", handle.id);
        handle
    }
}

#[derive(Debug)]
struct HandleLease {
    live: Arc<AtomicUsize>,
}

impl Drop for HandleLease {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory reference to image bytes usable for display
#[derive(Debug, Clone)]
pub struct ImageHandle {
    id: Uuid,
    data: Arc<[u8]>,
    _lease: Arc<HandleLease>,
}

/// Handle onto the currently selected image
pub type PreviewHandle = ImageHandle;

impl ImageHandle {
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Decode the referenced bytes
    pub fn decode(&self) -> Result<image::DynamicImage> {
        Ok(image::load_from_memory(&self.data)?)
    }
}

/// Result returned by the removal service
#[derive(Debug, Clone)]
pub struct ProcessedResult {
    handle: ImageHandle,
    download_name: String,
    content_type: String,
    received_at: DateTime<Utc>,
    elapsed: Duration,
}

impl ProcessedResult {
    pub(crate) fn new(handle: ImageHandle, download_stem: &str, elapsed: Duration) -> Self {
        let format = FormatService::sniff(handle.bytes());
        Self {
            download_name: FormatService::download_file_name(download_stem, format),
            content_type: FormatService::mime_type(format).to_string(),
            received_at: Utc::now(),
            elapsed,
            handle,
        }
    }

    /// Processed image bytes exactly as received
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.handle.bytes()
    }

    #[must_use]
    pub fn handle(&self) -> &ImageHandle {
        &self.handle
    }

    /// File name offered for download, e.g. `image-sans-fond.png`
    #[must_use]
    pub fn download_name(&self) -> &str {
        &self.download_name
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[must_use]
    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Time spent waiting on the service
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Why the last removal failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    /// User-facing message
    pub message: String,
    /// Underlying error, for diagnostics
    pub detail: String,
}

impl Failure {
    #[must_use]
    pub fn from_error(error: &BgRemovalError) -> Self {
        let kind = error.failure_kind();
        Self {
            kind,
            message: kind.user_message().to_string(),
            detail: error.to_string(),
        }
    }
}

/// State of the removal operation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationState {
    #[default]
    Idle,
    Loading,
    Success,
    Failed(Failure),
}

impl OperationState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Success => write!(f, "success"),
            Self::Failed(failure) => write!(f, "failed: {}", failure.message),
        }
    }
}
