pub mod messages;
pub mod state;

pub use messages::{Notice, NoticeKind, ScreenCommand, SubmissionOutcome};
pub use state::{can_transition, ScreenState};

use crate::calc::{DisplayResult, RecognitionService, ResultEntry, VariableBindings};
use crate::draw::model::DEFAULT_ERASER_WIDTH;
use crate::draw::{DrawingSurface, StrokeStyle};
use crate::error::{CanvasError, Result};
use crate::overlay::{LabelId, OverlayManager, Position, TypesettingEngine, DEFAULT_LABEL_STAGGER};
use crate::settings::Settings;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How often the shell should poll while a submission is in flight.
const SUBMISSION_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    pub brush: StrokeStyle,
    pub eraser_width: u32,
    pub label_stagger: Duration,
    pub clear_ink_on_result: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            brush: StrokeStyle::default(),
            eraser_width: DEFAULT_ERASER_WIDTH,
            label_stagger: DEFAULT_LABEL_STAGGER,
            clear_ink_on_result: true,
        }
    }
}

impl From<&Settings> for ControllerConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            brush: StrokeStyle {
                width: settings.brush_width,
                color: settings.brush_color,
            },
            eraser_width: settings.eraser_width,
            label_stagger: settings.label_stagger(),
            clear_ink_on_result: settings.clear_ink_on_result,
        }
    }
}

/// Owns the canvas screen and drives it from user input and submission
/// completions.
///
/// Everything here lives on the UI thread. Submissions run on short-lived
/// worker threads and report back through a channel that [`pump`](Self::pump)
/// drains, so overlapping Calculates are applied in the order they finish.
pub struct ScreenController {
    state: ScreenState,
    surface: DrawingSurface,
    bindings: VariableBindings,
    overlay: OverlayManager,
    service: Arc<dyn RecognitionService>,
    typesetter: Box<dyn TypesettingEngine>,
    typesetter_ready: bool,
    retypeset_due: bool,
    completions_tx: Sender<SubmissionOutcome>,
    completions_rx: Receiver<SubmissionOutcome>,
    in_flight: usize,
    /// Submissions started since the last reset.
    live_in_flight: usize,
    /// Bumped by every reset.
    epoch: u64,
    next_submission: u64,
    notices: Vec<Notice>,
    clear_ink_on_result: bool,
}

impl ScreenController {
    /// Build the screen once the canvas size is known and load the typesetter.
    pub fn mount(
        size: (u32, u32),
        config: ControllerConfig,
        service: Arc<dyn RecognitionService>,
        mut typesetter: Box<dyn TypesettingEngine>,
    ) -> Self {
        let mut notices = Vec::new();
        let typesetter_ready = match typesetter.load() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "typesetter unavailable");
                notices.push(Notice::from(&err));
                false
            }
        };
        let surface = DrawingSurface::with_style(size.0, size.1, config.brush, config.eraser_width);
        tracing::info!(
            width = surface.width(),
            height = surface.height(),
            "canvas mounted"
        );
        let (completions_tx, completions_rx) = channel();
        Self {
            state: ScreenState::Idle,
            surface,
            bindings: VariableBindings::default(),
            overlay: OverlayManager::new(config.label_stagger),
            service,
            typesetter,
            typesetter_ready,
            retypeset_due: false,
            completions_tx,
            completions_rx,
            in_flight: 0,
            live_in_flight: 0,
            epoch: 0,
            next_submission: 0,
            notices,
            clear_ink_on_result: config.clear_ink_on_result,
        }
    }

    pub fn state(&self) -> ScreenState {
        self.state
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut DrawingSurface {
        &mut self.surface
    }

    pub fn bindings(&self) -> &VariableBindings {
        &self.bindings
    }

    pub fn overlay(&self) -> &OverlayManager {
        &self.overlay
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn typesetter_ready(&self) -> bool {
        self.typesetter_ready
    }

    pub fn retypeset_pending(&self) -> bool {
        self.retypeset_due
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if self.state.is_drawing() {
            return;
        }
        self.surface.begin_stroke(x, y);
        self.transition(ScreenState::Drawing);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if !self.state.is_drawing() {
            return;
        }
        self.surface.extend_stroke(x, y);
    }

    pub fn pointer_up(&mut self) {
        if !self.state.is_drawing() {
            return;
        }
        self.surface.end_stroke();
        self.transition(self.resting_state());
    }

    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }

    pub fn dispatch(&mut self, command: ScreenCommand) {
        match command {
            ScreenCommand::Reset => self.reset(),
            ScreenCommand::Calculate => {
                if let Err(err) = self.calculate() {
                    tracing::debug!(error = %err, "calculate not started");
                }
            }
            ScreenCommand::SetColor(color) => self.surface.set_color(color),
            ScreenCommand::ToggleEraser => {
                let active = self.surface.toggle_eraser();
                tracing::debug!(active, "eraser toggled");
            }
            ScreenCommand::SetEraserWidth(width) => self.surface.set_eraser_width(width),
        }
    }

    /// Snapshot the raster and bindings and hand them to a worker thread.
    ///
    /// An empty canvas is refused with [`CanvasError::DegenerateInk`] and
    /// nothing is sent.
    pub fn calculate(&mut self) -> Result<u64> {
        if !self.surface.has_ink() {
            return Err(self.report(CanvasError::DegenerateInk));
        }
        let image = match self.surface.to_data_url() {
            Ok(image) => image,
            Err(err) => return Err(self.report(err)),
        };
        let bindings = self.bindings.clone();
        let ink = self.surface.ink_bounds();
        let epoch = self.epoch;
        let id = self.next_submission;
        let service = Arc::clone(&self.service);
        let tx = self.completions_tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("calculate-{id}"))
            .spawn(move || {
                let result = service.submit(&image, &bindings);
                let _ = tx.send(SubmissionOutcome {
                    id,
                    epoch,
                    ink,
                    result,
                });
            });
        if let Err(e) = spawned {
            return Err(self.report(CanvasError::Request(format!(
                "spawn submission worker: {e}"
            ))));
        }

        self.next_submission += 1;
        self.in_flight += 1;
        self.live_in_flight += 1;
        if self.state == ScreenState::Idle {
            self.transition(ScreenState::Submitting);
        }
        tracing::info!(id, vars = self.bindings.len(), "canvas submitted");
        Ok(id)
    }

    /// Clear canvas, bindings and labels. Submissions still in flight are not
    /// cancelled and will apply when they finish, but they no longer hold the
    /// screen in `Submitting`.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.live_in_flight = 0;
        self.surface.end_stroke();
        self.surface.clear();
        self.bindings.clear();
        self.overlay.clear();
        self.retypeset_due = false;
        self.transition(ScreenState::Idle);
        tracing::info!(in_flight = self.in_flight, "screen reset");
    }

    /// One UI tick: typeset labels released last tick, apply finished
    /// submissions, then release labels that are due.
    pub fn pump(&mut self, now: Instant) {
        if self.retypeset_due {
            self.retypeset_due = false;
            if self.typesetter_ready {
                self.typesetter.retypeset(self.overlay.labels_mut());
            }
        }

        while let Ok(outcome) = self.completions_rx.try_recv() {
            self.complete(outcome, now);
        }

        let released = self.overlay.release_due(now);
        if !released.is_empty() {
            if self.clear_ink_on_result {
                self.surface.clear();
            }
            self.retypeset_due = true;
            tracing::debug!(count = released.len(), "labels released");
        }
    }

    /// Time until the next [`pump`](Self::pump) has work to do.
    pub fn repaint_after(&self, now: Instant) -> Option<Duration> {
        let mut wait = self
            .overlay
            .queue()
            .next_due()
            .map(|due| due.saturating_duration_since(now));
        if self.in_flight > 0 {
            wait = Some(wait.map_or(SUBMISSION_POLL, |w| w.min(SUBMISSION_POLL)));
        }
        if self.retypeset_due {
            wait = Some(Duration::ZERO);
        }
        wait
    }

    pub fn move_label(&mut self, id: LabelId, position: Position) -> bool {
        self.overlay.move_label(id, position)
    }

    pub fn drag_label(&mut self, id: LabelId, dx: f32, dy: f32) -> bool {
        self.overlay.drag_label(id, dx, dy)
    }

    fn complete(&mut self, outcome: SubmissionOutcome, now: Instant) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let current = outcome.epoch == self.epoch;
        if current {
            self.live_in_flight = self.live_in_flight.saturating_sub(1);
        }
        match &outcome.result {
            Ok(entries) => self.apply_entries(&outcome, entries, now),
            Err(err) => {
                tracing::warn!(id = outcome.id, error = %err, "calculation failed");
                self.notices.push(Notice::from(err));
            }
        }
        if self.live_in_flight == 0 && self.state == ScreenState::Submitting {
            self.transition(ScreenState::Idle);
        }
    }

    fn apply_entries(&mut self, outcome: &SubmissionOutcome, entries: &[ResultEntry], now: Instant) {
        let id = outcome.id;
        let assigned = self.bindings.apply_results(entries);
        for entry in entries.iter().filter(|e| e.assign) {
            self.notices
                .push(Notice::info(format!("{} = {}", entry.expr, entry.result)));
        }
        let shown: Vec<DisplayResult> = entries.iter().filter_map(ResultEntry::display).collect();
        let shown_count = shown.len();
        tracing::info!(
            id,
            entries = entries.len(),
            assigned,
            shown = shown_count,
            "calculation finished"
        );
        if shown.is_empty() {
            return;
        }

        let mut bounds = self.surface.ink_bounds();
        // Only a reset may empty the canvas under a submission; our own
        // clear after releasing earlier labels falls back to the snapshot.
        if bounds.is_empty() && outcome.epoch == self.epoch {
            bounds = outcome.ink;
        }
        match self.overlay.place_from_bounding_box(&bounds) {
            Ok(anchor) => {
                let queued = self.overlay.schedule(shown, now);
                tracing::debug!(id, queued, x = anchor.x, y = anchor.y, "results anchored");
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "results dropped");
                self.notices.push(Notice::from(&err));
            }
        }
    }

    fn resting_state(&self) -> ScreenState {
        if self.live_in_flight > 0 {
            ScreenState::Submitting
        } else {
            ScreenState::Idle
        }
    }

    fn transition(&mut self, to: ScreenState) {
        if !can_transition(self.state, to) {
            tracing::warn!(from = ?self.state, to = ?to, "ignored screen transition");
            return;
        }
        if self.state != to {
            tracing::debug!(from = ?self.state, to = ?to, "screen transition");
        }
        self.state = to;
    }

    fn report(&mut self, err: CanvasError) -> CanvasError {
        tracing::warn!(error = %err, "calculate refused");
        self.notices.push(Notice::from(&err));
        err
    }
}
