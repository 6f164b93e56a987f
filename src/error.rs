use thiserror::Error;

/// Failures surfaced by the canvas screen.
///
/// None of these are fatal: the controller logs them, turns them into a
/// transient [`Notice`](crate::controller::Notice) and stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    /// Network failure, non-2xx status or malformed body from the evaluation endpoint.
    #[error("recognition request failed: {0}")]
    Request(String),
    /// The typesetting engine could not be loaded.
    #[error("typesetting engine failed to load: {0}")]
    ScriptLoad(String),
    /// The canvas holds no ink, so there is no bounding box to anchor results on.
    #[error("nothing drawn on the canvas")]
    DegenerateInk,
    #[error("failed to encode canvas: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, CanvasError>;
