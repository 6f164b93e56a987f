use crate::controller::{ScreenCommand, ScreenController};
use crate::draw::model::ERASER_WIDTH_RANGE;
use crate::draw::Color;
use eframe::egui::{self, Button, Color32, Stroke, Vec2};

const SWATCH_SIZE: f32 = 22.0;
const ERASER_ON_FILL: Color32 = Color32::from_rgb(190, 40, 40);

/// What the toolbar needs to know about the screen for one frame.
pub struct ToolbarView<'a> {
    pub swatches: &'a [Color],
    pub current: Color,
    pub eraser_active: bool,
    pub eraser_width: u32,
    pub in_flight: usize,
}

impl<'a> ToolbarView<'a> {
    pub fn new(swatches: &'a [Color], controller: &ScreenController) -> Self {
        let surface = controller.surface();
        Self {
            swatches,
            current: surface.color(),
            eraser_active: surface.eraser_active(),
            eraser_width: surface.eraser_width(),
            in_flight: controller.in_flight(),
        }
    }
}

pub fn to_color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Draw the toolbar row and return the commands clicked this frame.
pub fn show(ui: &mut egui::Ui, view: &ToolbarView<'_>) -> Vec<ScreenCommand> {
    let mut commands = Vec::new();
    ui.horizontal_wrapped(|ui| {
        if ui.button("Reset").clicked() {
            commands.push(ScreenCommand::Reset);
        }
        ui.separator();

        for &swatch in view.swatches {
            let mut button = Button::new("")
                .fill(to_color32(swatch))
                .min_size(Vec2::splat(SWATCH_SIZE));
            if swatch == view.current && !view.eraser_active {
                button = button.stroke(Stroke::new(2.0, Color32::WHITE));
            }
            if ui.add(button).clicked() {
                commands.push(ScreenCommand::SetColor(swatch));
            }
        }
        ui.separator();

        let calculate = if view.in_flight > 0 {
            format!("Calculate ({} pending)", view.in_flight)
        } else {
            "Calculate".to_owned()
        };
        if ui.button(calculate).clicked() {
            commands.push(ScreenCommand::Calculate);
        }

        let mut eraser = Button::new(if view.eraser_active {
            "Eraser On"
        } else {
            "Eraser Off"
        });
        if view.eraser_active {
            eraser = eraser.fill(ERASER_ON_FILL);
        }
        if ui.add(eraser).clicked() {
            commands.push(ScreenCommand::ToggleEraser);
        }

        if view.eraser_active {
            let mut width = view.eraser_width;
            let slider = egui::Slider::new(&mut width, ERASER_WIDTH_RANGE).text("size");
            if ui.add(slider).changed() {
                commands.push(ScreenCommand::SetEraserWidth(width));
            }
        }
    });
    commands
}
