//! Per-instance removal session
//!
//! `RemovalSession` holds everything one upload-and-remove workflow needs:
//! the selected image and its preview handle, the processed result, the
//! operation state and the transparency advisory flag. Front ends drive it
//! with the same events a user triggers (select, check, remove, reset).
//! Sessions share nothing, so any number of them can coexist.

use crate::{
    config::{ServiceConfig, DEFAULT_DOWNLOAD_STEM},
    error::{BgRemovalError, Result},
    remover::BackgroundRemover,
    services::{ProcessingStage, ProgressReporter, ProgressTracker},
    tracing_config::{events, spans},
    transparency,
    types::{
        Failure, HandleTracker, OperationState, PreviewHandle, ProcessedResult, SelectedImage,
    },
};
use instant::Instant;
use std::sync::Arc;
use tracing::Instrument;

/// Proof that a removal request was started for a given selection
///
/// Returned by [`RemovalSession::begin_removal`] and consumed by
/// [`RemovalSession::complete_removal`].
#[derive(Debug)]
pub struct RemovalTicket {
    selection_id: u64,
    image: SelectedImage,
    started: Instant,
}

impl RemovalTicket {
    /// Image to send to the service
    #[must_use]
    pub fn image(&self) -> &SelectedImage {
        &self.image
    }
}

/// Isolated state container for one removal workflow
#[derive(Debug)]
pub struct RemovalSession {
    selected: Option<SelectedImage>,
    preview: Option<PreviewHandle>,
    result: Option<ProcessedResult>,
    state: OperationState,
    already_transparent: bool,
    /// Bumped on every select/reset; stale tickets are discarded
    selection_id: u64,
    /// Bumped on reset so a front end recreates its file input
    input_key: u64,
    handles: HandleTracker,
    download_stem: String,
    progress: ProgressTracker,
}

impl Default for RemovalSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RemovalSession {
    /// Create an empty session in the `Idle` state
    #[must_use]
    pub fn new() -> Self {
        Self {
            selected: None,
            preview: None,
            result: None,
            state: OperationState::Idle,
            already_transparent: false,
            selection_id: 0,
            input_key: 0,
            handles: HandleTracker::new(),
            download_stem: DEFAULT_DOWNLOAD_STEM.to_string(),
            progress: ProgressTracker::silent(),
        }
    }

    /// Create a session using the download naming of a service configuration
    #[must_use]
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new().with_download_stem(config.download_stem.clone())
    }

    /// Set the file stem used for result downloads
    #[must_use]
    pub fn with_download_stem<S: Into<String>>(mut self, stem: S) -> Self {
        self.download_stem = stem.into();
        self
    }

    /// Report stage changes to a progress reporter
    #[must_use]
    pub fn with_progress_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.progress = ProgressTracker::new(reporter);
        self
    }

    /// Store a newly selected image
    ///
    /// Replaces any previous selection, releases the previous preview
    /// handle, and clears the result, the error and the transparency flag.
    /// A request still in flight for the previous image is ignored when it
    /// completes.
    pub fn select_image(&mut self, image: SelectedImage) {
        log::info!(
            "Selected {} ({} bytes, {})",
            image.file_name(),
            image.len(),
            image.mime_type()
        );

        self.selection_id += 1;
        self.preview = Some(self.handles.create(image.shared_data()));
        self.selected = Some(image);
        self.result = None;
        self.already_transparent = false;
        self.state = OperationState::Idle;
    }

    /// Run the transparency heuristic on the current preview
    ///
    /// The outcome is stored as an advisory flag that disables
    /// [`can_remove`](Self::can_remove). If the image cannot be decoded the
    /// flag is left unset and the error is returned.
    pub fn check_transparency(&mut self) -> Result<bool> {
        let preview = self
            .preview
            .as_ref()
            .ok_or_else(|| BgRemovalError::invalid_state("no image selected"))?;

        let _span = spans::transparency_check(preview.bytes().len()).entered();
        self.progress.report_stage(ProcessingStage::TransparencyCheck);

        match preview
            .decode()
            .map(|image| transparency::image_has_transparency(&image))
        {
            Ok(transparent) => {
                if transparent {
                    log::info!("Image already has transparent pixels; removal not needed");
                }
                self.already_transparent = transparent;
                Ok(transparent)
            },
            Err(e) => {
                log::warn!("Transparency check failed: {}", e);
                self.already_transparent = false;
                Err(e)
            },
        }
    }

    /// Start a removal request
    ///
    /// Moves the session to `Loading` and clears any previous error or
    /// result. The transparency flag is advisory and not consulted here.
    ///
    /// # Errors
    /// - No image selected
    /// - A request is already in flight
    pub fn begin_removal(&mut self) -> Result<RemovalTicket> {
        if self.state.is_loading() {
            return Err(BgRemovalError::invalid_state(
                "a removal request is already in flight",
            ));
        }
        let image = self
            .selected
            .clone()
            .ok_or_else(|| BgRemovalError::invalid_state("no image selected"))?;

        self.result = None;
        self.state = OperationState::Loading;
        self.progress.restart();
        self.progress.report_stage(ProcessingStage::Uploading);

        Ok(RemovalTicket {
            selection_id: self.selection_id,
            image,
            started: Instant::now(),
        })
    }

    /// Record the outcome of a request started with [`begin_removal`](Self::begin_removal)
    ///
    /// Success wraps the bytes as the processed result. Failure is logged and
    /// converted into a user-facing [`Failure`]; it is never returned. Either
    /// way the session leaves `Loading`. Outcomes for a superseded selection
    /// are discarded.
    pub fn complete_removal(
        &mut self,
        ticket: RemovalTicket,
        outcome: Result<Vec<u8>>,
    ) -> &OperationState {
        if ticket.selection_id != self.selection_id {
            log::warn!(
                "Discarding removal outcome for {}: selection changed while in flight",
                ticket.image.file_name()
            );
            return &self.state;
        }

        let elapsed = ticket.started.elapsed();
        let outcome = outcome.and_then(|bytes| {
            if bytes.is_empty() {
                Err(BgRemovalError::unexpected_response(
                    "service returned an empty body",
                ))
            } else {
                Ok(bytes)
            }
        });

        match outcome {
            Ok(bytes) => {
                self.progress.report_stage(ProcessingStage::ResultHandling);
                let handle = self.handles.create(Arc::from(bytes));
                let result = ProcessedResult::new(handle, &self.download_stem, elapsed);
                events::removal_completed(
                    ticket.image.file_name(),
                    result.bytes().len(),
                    elapsed.as_millis() as u64,
                );
                self.result = Some(result);
                self.state = OperationState::Success;
                self.progress.report_completion();
            },
            Err(e) => {
                events::removal_failed(ticket.image.file_name(), &e);
                let failure = Failure::from_error(&e);
                self.progress
                    .report_error(ProcessingStage::Uploading, &failure.message);
                self.result = None;
                self.state = OperationState::Failed(failure);
            },
        }

        &self.state
    }

    /// Send the selected image to `remover` and record the outcome
    ///
    /// Service errors never escape: they end up in
    /// [`OperationState::Failed`]. Only the preconditions of
    /// [`begin_removal`](Self::begin_removal) are reported as errors.
    pub async fn remove_background(
        &mut self,
        remover: &dyn BackgroundRemover,
    ) -> Result<&OperationState> {
        let ticket = self.begin_removal()?;
        let span = spans::removal_request(remover.name(), ticket.image().file_name());
        let outcome = remover
            .remove_background(ticket.image())
            .instrument(span)
            .await;
        Ok(self.complete_removal(ticket, outcome))
    }

    /// Return to the initial state
    ///
    /// Drops the image, preview, result, error and transparency flag, and
    /// refreshes [`input_key`](Self::input_key) so the same file can be
    /// selected again.
    pub fn reset(&mut self) {
        log::debug!("Resetting session");
        self.selected = None;
        self.preview = None;
        self.result = None;
        self.already_transparent = false;
        self.state = OperationState::Idle;
        self.selection_id += 1;
        self.input_key += 1;
    }

    /// Whether the removal action should be enabled
    ///
    /// Requires a selected image, no request in flight, no result yet and no
    /// sign of existing transparency.
    #[must_use]
    pub fn can_remove(&self) -> bool {
        self.selected.is_some()
            && !self.state.is_loading()
            && self.result.is_none()
            && !self.already_transparent
    }

    #[must_use]
    pub fn selected_image(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    #[must_use]
    pub fn result(&self) -> Option<&ProcessedResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> &OperationState {
        &self.state
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// User-facing error message of the last failed request
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.state.failure().map(|failure| failure.message.as_str())
    }

    /// Advisory flag set by [`check_transparency`](Self::check_transparency)
    #[must_use]
    pub fn already_transparent(&self) -> bool {
        self.already_transparent
    }

    /// Identity of the file input; changes on every reset
    #[must_use]
    pub fn input_key(&self) -> u64 {
        self.input_key
    }

    /// Number of preview/result handles still alive
    #[must_use]
    pub fn live_handles(&self) -> usize {
        self.handles.live()
    }
}
