use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushMode {
    #[default]
    Pen,
    Eraser,
}

/// Colour the eraser paints with. It covers ink, it does not remove it.
pub const ERASE_COLOR: Color = Color::BLACK;
/// Shown behind the raster once the user starts drawing.
pub const DISPLAY_BACKGROUND: Color = Color::BLACK;

pub const DEFAULT_BRUSH_WIDTH: u32 = 3;
pub const DEFAULT_ERASER_WIDTH: u32 = 10;
pub const ERASER_WIDTH_RANGE: RangeInclusive<u32> = 1..=50;

pub fn clamp_eraser_width(width: u32) -> u32 {
    width.clamp(*ERASER_WIDTH_RANGE.start(), *ERASER_WIDTH_RANGE.end())
}

pub const SWATCHES: [Color; 12] = [
    Color::rgb(0x00, 0x00, 0x00),
    Color::rgb(0xff, 0xff, 0xff),
    Color::rgb(0xee, 0x33, 0x33),
    Color::rgb(0xe6, 0x49, 0x80),
    Color::rgb(0xbe, 0x4b, 0xdb),
    Color::rgb(0x89, 0x32, 0x00),
    Color::rgb(0x22, 0x8b, 0xe6),
    Color::rgb(0x33, 0x33, 0xee),
    Color::rgb(0x40, 0xc0, 0x57),
    Color::rgb(0x00, 0xaa, 0x00),
    Color::rgb(0xfa, 0xb0, 0x05),
    Color::rgb(0xfd, 0x7e, 0x14),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeStyle {
    pub width: u32,
    pub color: Color,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: DEFAULT_BRUSH_WIDTH,
            color: Color::WHITE,
        }
    }
}
