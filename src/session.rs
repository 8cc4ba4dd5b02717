//! Session orchestrator: owns the image slots and the single in-flight
//! submission, and drives the composition engine for previews.
//!
//! All state mutation goes through named transition functions on [`Session`];
//! every error is recovered here into [`SessionPhase::Error`] plus a message
//! rather than aborting the session. Loads and the remote call are split into
//! `begin_*`/`finish_*` pairs so completions arriving out of order route
//! through the slot sequence-number check.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::encoded::EncodedImage;
use crate::error::{PicblendError, PicblendResult};
use crate::handle::{ImageHandle, LoadTicket, Provenance, Slot, SlotInstall};
use crate::remote::{ProcessService, SubmitRequest};
use crate::render::{Surface, render_preview};

const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(120);
const NO_FOREGROUND_MESSAGE: &str = "Please select a car image";
const SUBMIT_TIMEOUT_MESSAGE: &str = "Processing request timed out. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SessionPhase {
    Idle,
    Selecting,
    Submitting,
    Result,
    Error,
}

/// The two user-selectable input positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSlot {
    Foreground,
    Background,
}

/// What the remote service produced for one submission.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultBundle {
    pub subject_only: EncodedImage,
    pub final_composite: Option<EncodedImage>,
    pub angle_degrees: Option<f32>,
    pub orientation: Option<String>,
}

impl ResultBundle {
    /// Caption text for the detected subject pose, e.g. `"Car Angle: Left,
    /// 12.3°"`. `None` unless both angle and orientation were returned.
    pub fn caption(&self) -> Option<String> {
        let angle = self.angle_degrees?;
        let orientation = self.orientation.as_deref()?;

        let mut chars = orientation.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => return None,
        };

        Some(format!("Car Angle: {capitalized}, {angle:.1}°"))
    }
}

/// Which side of the before/after toggle is shown. Switching views never
/// mutates the stored [`ResultBundle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultView {
    Original,
    Processed,
}

/// Outcome of handing an async load completion back to the session.
#[derive(Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Installed,
    /// A newer load for the slot was issued in the meantime; dropped.
    Stale,
    /// The bytes did not decode; the slot was marked invalid and the message
    /// recorded, other slots untouched.
    Failed,
}

pub struct Session {
    phase: SessionPhase,
    foreground: Slot,
    background: Slot,
    result: Option<ResultBundle>,
    last_error: Option<String>,
    submit_timeout: Duration,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            foreground: Slot::default(),
            background: Slot::default(),
            result: None,
            last_error: None,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn foreground(&self) -> Option<&ImageHandle> {
        self.foreground.get()
    }

    pub fn background(&self) -> Option<&ImageHandle> {
        self.background.get()
    }

    pub fn result(&self) -> Option<&ResultBundle> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The UI-facing submit-button contract: a foreground is selected and no
    /// submission is in flight.
    pub fn can_submit(&self) -> bool {
        self.foreground.is_set() && self.phase != SessionPhase::Submitting
    }

    pub fn set_submit_timeout(&mut self, timeout: Duration) {
        self.submit_timeout = timeout;
    }

    /// Registers an in-flight load for `slot`. Any active result is
    /// invalidated by the new selection, and earlier pending loads for the
    /// same slot become stale.
    pub fn begin_load(&mut self, slot: InputSlot) -> LoadTicket {
        self.result = None;
        self.last_error = None;
        self.phase = SessionPhase::Selecting;
        debug!(?slot, "image load issued");
        match slot {
            InputSlot::Foreground => self.foreground.begin_load(),
            InputSlot::Background => self.background.begin_load(),
        }
    }

    /// Routes an async load completion to its slot.
    ///
    /// Only the most recently issued load for a slot may install its handle;
    /// anything older is discarded unseen. A decode failure clears the slot
    /// and records the message without touching the other slot.
    pub fn finish_load(
        &mut self,
        slot: InputSlot,
        ticket: LoadTicket,
        loaded: PicblendResult<ImageHandle>,
    ) -> LoadOutcome {
        let target = match slot {
            InputSlot::Foreground => &mut self.foreground,
            InputSlot::Background => &mut self.background,
        };

        if !target.is_current(ticket) {
            debug!(?slot, "stale load completion discarded");
            return LoadOutcome::Stale;
        }

        match loaded {
            Ok(handle) => match target.finish(ticket, handle) {
                SlotInstall::Installed => LoadOutcome::Installed,
                SlotInstall::Stale => LoadOutcome::Stale,
            },
            Err(err) => {
                warn!(?slot, error = %err, "image load failed");
                target.clear();
                self.last_error = Some(err.user_message());
                LoadOutcome::Failed
            }
        }
    }

    /// Synchronous convenience for callers that already hold the file bytes:
    /// begin, decode, finish.
    pub fn select(&mut self, slot: InputSlot, bytes: Vec<u8>) -> PicblendResult<()> {
        let ticket = self.begin_load(slot);
        let loaded = ImageHandle::decode(bytes, Provenance::LocalFile);
        match self.finish_load(slot, ticket, loaded) {
            LoadOutcome::Failed => Err(PicblendError::decode(
                self.last_error.clone().unwrap_or_default(),
            )),
            LoadOutcome::Installed | LoadOutcome::Stale => Ok(()),
        }
    }

    /// Releases the slot's handle and invalidates any stored result.
    pub fn remove(&mut self, slot: InputSlot) {
        match slot {
            InputSlot::Foreground => self.foreground.clear(),
            InputSlot::Background => self.background.clear(),
        }
        self.result = None;
        self.phase = if self.foreground.is_set() || self.background.is_set() {
            SessionPhase::Selecting
        } else {
            SessionPhase::Idle
        };
        debug!(?slot, "selection removed");
    }

    /// Validates and transitions into `Submitting`, handing back the encoded
    /// bytes to send. On validation failure no network call may be issued: the
    /// session moves to `Error` synchronously and stays resubmittable.
    pub fn begin_submit(&mut self) -> PicblendResult<SubmitRequest> {
        if self.phase == SessionPhase::Submitting {
            return Err(PicblendError::validation(
                "a submission is already in flight",
            ));
        }

        let Some(foreground) = self.foreground.get() else {
            self.last_error = Some(NO_FOREGROUND_MESSAGE.to_string());
            self.phase = SessionPhase::Error;
            return Err(PicblendError::validation(NO_FOREGROUND_MESSAGE));
        };

        let request = SubmitRequest {
            foreground: foreground.source_bytes(),
            background: self.background.get().map(ImageHandle::source_bytes),
        };

        self.last_error = None;
        self.phase = SessionPhase::Submitting;
        debug!(
            has_background = request.background.is_some(),
            "submission issued"
        );
        Ok(request)
    }

    /// Applies the outcome of the remote call. Failures preserve the current
    /// selections so the user can retry without reselecting files.
    pub fn finish_submit(&mut self, outcome: PicblendResult<ResultBundle>) {
        match outcome {
            Ok(bundle) => {
                debug!(
                    has_composite = bundle.final_composite.is_some(),
                    "submission succeeded"
                );
                self.result = Some(bundle);
                self.last_error = None;
                self.phase = SessionPhase::Result;
            }
            Err(err) => {
                warn!(error = %err, "submission failed");
                self.last_error = Some(err.user_message());
                self.phase = SessionPhase::Error;
            }
        }
    }

    /// Full submission round-trip against `service`, with the session's
    /// timeout imposed on the call (expiry is treated as a network error).
    /// Every failure is recovered into the `Error` phase; inspect [`phase`]
    /// and [`last_error`] afterwards.
    ///
    /// [`phase`]: Session::phase
    /// [`last_error`]: Session::last_error
    pub async fn submit<S: ProcessService>(&mut self, service: &S) {
        let request = match self.begin_submit() {
            Ok(request) => request,
            Err(_) => return,
        };

        let outcome = match tokio::time::timeout(self.submit_timeout, service.process(request))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(PicblendError::network(SUBMIT_TIMEOUT_MESSAGE)),
        };

        self.finish_submit(outcome);
    }

    /// Renders the current selections onto `surface`: background beneath
    /// foreground, absent layers skipped.
    pub fn render_preview(&self, surface: &mut Surface) -> PicblendResult<()> {
        render_preview(surface, self.background.get(), self.foreground.get())
    }

    /// The encoded image the comparison toggle should display for `view`.
    ///
    /// `Original` shows the selected foreground's source bytes; `Processed`
    /// prefers the final composite and falls back to the subject-only image.
    /// Never mutates the stored bundle.
    pub fn display_image(&self, view: ResultView) -> Option<Arc<Vec<u8>>> {
        match view {
            ResultView::Original => self.foreground.get().map(ImageHandle::source_bytes),
            ResultView::Processed => {
                let bundle = self.result.as_ref()?;
                let encoded = bundle
                    .final_composite
                    .as_ref()
                    .unwrap_or(&bundle.subject_only);
                Some(Arc::new(encoded.as_bytes().to_vec()))
            }
        }
    }

    /// Teardown: releases every live handle and the stored result. Invoked
    /// when the session view is discarded so decoded bitmaps do not outlive
    /// it.
    pub fn release_all(&mut self) {
        self.foreground.clear();
        self.background.clear();
        self.result = None;
        self.last_error = None;
        self.phase = SessionPhase::Idle;
        debug!("session released all handles");
    }
}
