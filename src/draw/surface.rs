use crate::draw::model::{
    clamp_eraser_width, BrushMode, Color, StrokeStyle, DEFAULT_ERASER_WIDTH, DISPLAY_BACKGROUND,
    ERASE_COLOR,
};
use crate::draw::scan::{scan_ink, InkBounds};
use crate::error::{CanvasError, Result};
use base64::{engine::general_purpose, Engine as _};
use image::{ImageOutputFormat, Rgba, RgbaImage};
use std::io::Cursor;

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct StrokeState {
    active: bool,
    last: (f32, f32),
}

/// Pixel raster the user sketches on.
///
/// Strokes are painted straight into the raster as round-capped segments;
/// nothing about them is remembered once the pointer is released.
#[derive(Debug, Clone)]
pub struct DrawingSurface {
    raster: RgbaImage,
    stroke: StrokeState,
    style: StrokeStyle,
    mode: BrushMode,
    eraser_width: u32,
    background: Option<Color>,
    revision: u64,
}

impl DrawingSurface {
    /// Create a fully transparent surface. Zero dimensions are bumped to one pixel.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_style(width, height, StrokeStyle::default(), DEFAULT_ERASER_WIDTH)
    }

    pub fn with_style(width: u32, height: u32, style: StrokeStyle, eraser_width: u32) -> Self {
        Self {
            raster: RgbaImage::new(width.max(1), height.max(1)),
            stroke: StrokeState::default(),
            style: StrokeStyle {
                width: style.width.max(1),
                color: style.color,
            },
            mode: BrushMode::Pen,
            eraser_width: clamp_eraser_width(eraser_width),
            background: None,
            revision: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    /// Direct pixel access. Counts as a mutation for [`revision`](Self::revision).
    pub fn raster_mut(&mut self) -> &mut RgbaImage {
        self.revision += 1;
        &mut self.raster
    }

    /// Bumped on every pixel mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.active
    }

    /// Display background, set once the first stroke begins.
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn begin_stroke(&mut self, x: f32, y: f32) {
        if self.stroke.active {
            return;
        }
        self.background = Some(DISPLAY_BACKGROUND);
        self.stroke = StrokeState {
            active: true,
            last: (x, y),
        };
    }

    pub fn extend_stroke(&mut self, x: f32, y: f32) {
        if !self.stroke.active {
            return;
        }
        let (color, width) = self.active_paint();
        let start = self.stroke.last;
        let written = paint_segment(&mut self.raster, start, (x, y), color, width);
        if written > 0 {
            self.revision += 1;
        }
        self.stroke.last = (x, y);
    }

    pub fn end_stroke(&mut self) {
        self.stroke.active = false;
    }

    pub fn clear(&mut self) {
        for px in self.raster.pixels_mut() {
            *px = Rgba(Color::TRANSPARENT.to_rgba_array());
        }
        self.revision += 1;
    }

    pub fn color(&self) -> Color {
        self.style.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.style.color = color;
    }

    pub fn eraser_active(&self) -> bool {
        self.mode == BrushMode::Eraser
    }

    pub fn set_eraser(&mut self, active: bool) {
        self.mode = if active {
            BrushMode::Eraser
        } else {
            BrushMode::Pen
        };
    }

    pub fn toggle_eraser(&mut self) -> bool {
        self.set_eraser(!self.eraser_active());
        self.eraser_active()
    }

    pub fn eraser_width(&self) -> u32 {
        self.eraser_width
    }

    pub fn set_eraser_width(&mut self, width: u32) {
        self.eraser_width = clamp_eraser_width(width);
    }

    /// Colour and width the next segment will be painted with.
    pub fn active_paint(&self) -> (Color, u32) {
        match self.mode {
            BrushMode::Pen => (self.style.color, self.style.width),
            BrushMode::Eraser => (ERASE_COLOR, self.eraser_width),
        }
    }

    pub fn ink_bounds(&self) -> InkBounds {
        scan_ink(&self.raster)
    }

    pub fn has_ink(&self) -> bool {
        self.raster.pixels().any(|px| px.0[3] > 0)
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.raster
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .map_err(|e| CanvasError::Encode(e.to_string()))?;
        Ok(bytes)
    }

    /// PNG of the raster as a `data:image/png;base64,` URL.
    pub fn to_data_url(&self) -> Result<String> {
        let png = self.encode_png()?;
        Ok(format!(
            "{PNG_DATA_URL_PREFIX}{}",
            general_purpose::STANDARD.encode(png)
        ))
    }
}

fn paint_segment(
    raster: &mut RgbaImage,
    start: (f32, f32),
    end: (f32, f32),
    color: Color,
    stroke_width: u32,
) -> u64 {
    let radius = stroke_width.max(1) as f32 / 2.0;
    let pad = radius.ceil() + 1.0;
    let max_px = raster.width() as i64 - 1;
    let max_py = raster.height() as i64 - 1;

    let x0 = ((start.0.min(end.0) - pad).floor() as i64).max(0);
    let x1 = ((start.0.max(end.0) + pad).ceil() as i64).min(max_px);
    let y0 = ((start.1.min(end.1) - pad).floor() as i64).max(0);
    let y1 = ((start.1.max(end.1) + pad).ceil() as i64).min(max_py);
    if x1 < x0 || y1 < y0 {
        return 0;
    }

    let radius_sq = radius * radius;
    let pixel = Rgba(color.to_rgba_array());
    let mut writes: u64 = 0;
    for y in y0..=y1 {
        for x in x0..=x1 {
            if point_segment_distance_sq((x as f32, y as f32), start, end) <= radius_sq {
                raster.put_pixel(x as u32, y as u32, pixel);
                writes = writes.saturating_add(1);
            }
        }
    }
    writes
}

fn point_segment_distance_sq(point: (f32, f32), start: (f32, f32), end: (f32, f32)) -> f32 {
    let (px, py) = point;
    let (x0, y0) = start;
    let vx = end.0 - x0;
    let vy = end.1 - y0;
    let wx = px - x0;
    let wy = py - y0;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        return wx * wx + wy * wy;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let dx = px - (x0 + vx * t);
    let dy = py - (y0 + vy * t);
    dx * dx + dy * dy
}
