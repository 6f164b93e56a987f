use image::RgbaImage;

/// Axis-aligned rectangle around every pixel with non-zero alpha.
///
/// Bounds are inclusive. A raster without ink produces an inverted rectangle
/// (`min_x > max_x`), which [`is_empty`](Self::is_empty) reports and
/// [`center`](Self::center) refuses to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InkBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl InkBounds {
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn center(&self) -> Option<(f32, f32)> {
        if self.is_empty() {
            return None;
        }
        Some((
            (self.min_x as f32 + self.max_x as f32) / 2.0,
            (self.min_y as f32 + self.max_y as f32) / 2.0,
        ))
    }
}

/// Full row-major scan of the raster. Runs only on an explicit Calculate.
pub fn scan_ink(raster: &RgbaImage) -> InkBounds {
    let mut bounds = InkBounds {
        min_x: raster.width().max(1),
        min_y: raster.height().max(1),
        max_x: 0,
        max_y: 0,
    };
    for (x, y, px) in raster.enumerate_pixels() {
        if px.0[3] == 0 {
            continue;
        }
        bounds.min_x = bounds.min_x.min(x);
        bounds.max_x = bounds.max_x.max(x);
        bounds.min_y = bounds.min_y.min(y);
        bounds.max_y = bounds.max_y.max(y);
    }
    bounds
}
