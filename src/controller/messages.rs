use crate::calc::ResultEntry;
use crate::draw::{Color, InkBounds};
use crate::error::CanvasError;

/// Toolbar input, dispatched through [`ScreenController::dispatch`](super::ScreenController::dispatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenCommand {
    Reset,
    Calculate,
    SetColor(Color),
    ToggleEraser,
    SetEraserWidth(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// Transient, user-facing message. The shell shows these as toasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

impl From<&CanvasError> for Notice {
    fn from(err: &CanvasError) -> Self {
        match err {
            CanvasError::DegenerateInk => Notice::warning("Draw something before calculating"),
            CanvasError::ScriptLoad(_) => Notice::warning(format!("{err}; showing raw LaTeX")),
            CanvasError::Request(_) | CanvasError::Encode(_) => Notice::error(err.to_string()),
        }
    }
}

/// Sent from a submission worker back to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub id: u64,
    /// Reset count when the canvas was submitted.
    pub epoch: u64,
    /// Ink bounds of the submitted raster.
    pub ink: InkBounds,
    pub result: Result<Vec<ResultEntry>, CanvasError>,
}
