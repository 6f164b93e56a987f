use math_canvas::calc::RecognitionClient;
use math_canvas::gui::CanvasApp;
use math_canvas::logging;
use math_canvas::overlay::TexTypesetter;
use math_canvas::settings::Settings;

use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let mut settings = Settings::load("settings.json")?;
    settings.apply_env_overrides();
    logging::init(settings.debug_logging, settings.log_file.as_ref().map(PathBuf::from));

    let client = RecognitionClient::new(&settings.api_url)?;
    tracing::info!(endpoint = client.endpoint(), "starting math canvas");
    let service = Arc::new(client);

    let (width, height) = settings.window_size.unwrap_or((1280.0, 800.0));
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Math Canvas",
        native_options,
        Box::new(move |_cc| {
            Box::new(CanvasApp::new(
                settings,
                service,
                Box::new(TexTypesetter::default()),
            ))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
