pub mod model;
pub mod scan;
pub mod surface;

pub use model::{BrushMode, Color, StrokeStyle};
pub use scan::{scan_ink, InkBounds};
pub use surface::DrawingSurface;
