pub mod labels;
pub mod queue;
pub mod typeset;

pub use labels::{latex_label, LabelId, OverlayLabel, OverlayManager, Position};
pub use queue::{LabelQueue, DEFAULT_LABEL_STAGGER};
pub use typeset::{RenderedMath, TexTypesetter, TypesettingEngine};
