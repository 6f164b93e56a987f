pub mod toolbar;

use crate::calc::RecognitionService;
use crate::controller::{ControllerConfig, NoticeKind, ScreenController};
use crate::draw::model::DISPLAY_BACKGROUND;
use crate::overlay::{LabelId, Position, RenderedMath, TexTypesetter, TypesettingEngine};
use crate::settings::Settings;
use eframe::egui::{
    self, Color32, ColorImage, PointerButton, Pos2, Rect, Sense, TextureHandle, TextureOptions,
};
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::sync::Arc;
use std::time::Instant;
use toolbar::{to_color32, ToolbarView};

const LABEL_TEXT_SIZE: f32 = 16.0;

pub struct CanvasApp {
    settings: Settings,
    service: Arc<dyn RecognitionService>,
    typesetter: Option<Box<dyn TypesettingEngine>>,
    /// Built on the first frame, once the canvas area has a size.
    controller: Option<ScreenController>,
    texture: Option<TextureHandle>,
    uploaded_revision: Option<u64>,
    toasts: Toasts,
}

impl CanvasApp {
    pub fn new(
        settings: Settings,
        service: Arc<dyn RecognitionService>,
        typesetter: Box<dyn TypesettingEngine>,
    ) -> Self {
        Self {
            settings,
            service,
            typesetter: Some(typesetter),
            controller: None,
            texture: None,
            uploaded_revision: None,
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
        }
    }

    fn mount(&mut self, size: egui::Vec2) {
        let typesetter = self
            .typesetter
            .take()
            .unwrap_or_else(|| Box::new(TexTypesetter::default()));
        let size = (size.x.max(1.0) as u32, size.y.max(1.0) as u32);
        self.controller = Some(ScreenController::mount(
            size,
            ControllerConfig::from(&self.settings),
            Arc::clone(&self.service),
            typesetter,
        ));
    }

    fn push_toast(&mut self, kind: NoticeKind, text: String) {
        if !self.settings.enable_toasts {
            return;
        }
        let kind = match kind {
            NoticeKind::Info => ToastKind::Info,
            NoticeKind::Warning => ToastKind::Warning,
            NoticeKind::Error => ToastKind::Error,
        };
        self.toasts.add(Toast {
            text: text.into(),
            kind,
            options: ToastOptions::default()
                .duration_in_seconds(self.settings.toast_duration as f64),
        });
    }
}

/// Feed pointer input to the controller, then paint the raster. Returns the
/// canvas rect in screen space.
fn paint_canvas(
    ui: &mut egui::Ui,
    controller: &mut ScreenController,
    texture: &mut Option<TextureHandle>,
    uploaded_revision: &mut Option<u64>,
) -> Rect {
    let size = egui::vec2(
        controller.surface().width() as f32,
        controller.surface().height() as f32,
    );
    let (response, painter) = ui.allocate_painter(size, Sense::drag());
    let origin = response.rect.min;
    let local = |pos: Pos2| (pos.x - origin.x, pos.y - origin.y);

    if response.drag_started_by(PointerButton::Primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            let (x, y) = local(pos);
            controller.pointer_down(x, y);
        }
    }
    if response.dragged_by(PointerButton::Primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            if response.rect.contains(pos) {
                let (x, y) = local(pos);
                controller.pointer_move(x, y);
            } else {
                controller.pointer_leave();
            }
        }
    }
    if response.drag_stopped_by(PointerButton::Primary) {
        controller.pointer_up();
    }

    let surface = controller.surface();
    if texture.is_none() || *uploaded_revision != Some(surface.revision()) {
        let image = ColorImage::from_rgba_unmultiplied(
            [surface.width() as usize, surface.height() as usize],
            surface.raster().as_raw(),
        );
        match texture {
            Some(handle) => handle.set(image, TextureOptions::NEAREST),
            None => {
                *texture = Some(ui.ctx().load_texture("canvas", image, TextureOptions::NEAREST));
            }
        }
        *uploaded_revision = Some(surface.revision());
    }

    let background = surface.background().unwrap_or(DISPLAY_BACKGROUND);
    painter.rect_filled(response.rect, 0.0, to_color32(background));
    if let Some(handle) = texture {
        painter.image(
            handle.id(),
            response.rect,
            Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );
    }
    response.rect
}

fn show_labels(ctx: &egui::Context, controller: &mut ScreenController, origin: Pos2) {
    let labels: Vec<(LabelId, Position, String, Option<RenderedMath>)> = controller
        .overlay()
        .labels()
        .iter()
        .map(|l| (l.id(), l.position, l.text().to_owned(), l.rendered().cloned()))
        .collect();

    for (id, position, text, rendered) in labels {
        let response = egui::Area::new(egui::Id::new(("overlay_label", id.value())))
            .fixed_pos(Pos2::new(origin.x + position.x, origin.y + position.y))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                let text = match &rendered {
                    Some(math) => egui::RichText::new(&math.body).size(LABEL_TEXT_SIZE * math.scale),
                    None => egui::RichText::new(&text).monospace(),
                };
                ui.add(egui::Label::new(text.color(Color32::WHITE)).sense(Sense::drag()))
            })
            .inner;
        if response.dragged() {
            let delta = response.drag_delta();
            controller.drag_label(id, delta.x, delta.y);
        }
    }
}

impl eframe::App for CanvasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        let mut commands = Vec::new();
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            if let Some(controller) = &self.controller {
                commands = toolbar::show(ui, &ToolbarView::new(&self.settings.swatches, controller));
            }
        });

        let mut canvas_origin = None;
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(to_color32(DISPLAY_BACKGROUND)))
            .show(ctx, |ui| {
                if self.controller.is_none() {
                    self.mount(ui.available_size());
                }
                if let Some(controller) = self.controller.as_mut() {
                    for command in commands.drain(..) {
                        controller.dispatch(command);
                    }
                    let rect = paint_canvas(
                        ui,
                        controller,
                        &mut self.texture,
                        &mut self.uploaded_revision,
                    );
                    canvas_origin = Some(rect.min);
                }
            });

        let mut notices = Vec::new();
        if let Some(controller) = self.controller.as_mut() {
            controller.pump(now);
            if let Some(origin) = canvas_origin {
                show_labels(ctx, controller, origin);
            }
            notices = controller.take_notices();
            if let Some(wait) = controller.repaint_after(now) {
                ctx.request_repaint_after(wait);
            }
        }
        for notice in notices {
            self.push_toast(notice.kind, notice.text);
        }
        self.toasts.show(ctx);
    }
}
