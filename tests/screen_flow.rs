use httpmock::prelude::*;
use image::Rgba;
use math_canvas::calc::{RecognitionClient, RecognitionService, ResultEntry, VariableBindings};
use math_canvas::controller::{
    ControllerConfig, Notice, NoticeKind, ScreenController, ScreenState,
};
use math_canvas::error::CanvasError;
use math_canvas::overlay::{Position, TexTypesetter};
use serde_json::json;
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::{Duration, Instant};

#[derive(Default)]
struct ScriptedService {
    replies: Mutex<Vec<Result<Vec<ResultEntry>, CanvasError>>>,
    requests: Mutex<Vec<(String, VariableBindings)>>,
}

impl ScriptedService {
    fn replying(replies: Vec<Result<Vec<ResultEntry>, CanvasError>>) -> Arc<Self> {
        let mut replies = replies;
        replies.reverse();
        Arc::new(Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        })
    }
}

impl RecognitionService for ScriptedService {
    fn submit(
        &self,
        image: &str,
        bindings: &VariableBindings,
    ) -> Result<Vec<ResultEntry>, CanvasError> {
        self.requests
            .lock()
            .unwrap()
            .push((image.to_owned(), bindings.clone()));
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Each submission blocks until the test sends one release.
struct GatedService {
    gate: Mutex<Receiver<()>>,
    entries: Vec<ResultEntry>,
}

impl RecognitionService for GatedService {
    fn submit(
        &self,
        _image: &str,
        _bindings: &VariableBindings,
    ) -> Result<Vec<ResultEntry>, CanvasError> {
        let _ = self.gate.lock().unwrap().recv();
        Ok(self.entries.clone())
    }
}

fn mount(service: Arc<dyn RecognitionService>) -> ScreenController {
    ScreenController::mount(
        (200, 200),
        ControllerConfig::default(),
        service,
        Box::new(TexTypesetter::default()),
    )
}

fn paint_square(controller: &mut ScreenController) {
    let raster = controller.surface_mut().raster_mut();
    for y in 100..=110 {
        for x in 100..=110 {
            raster.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }
}

fn settle_to(controller: &mut ScreenController, now: Instant, remaining: usize) {
    for _ in 0..400 {
        controller.pump(now);
        if controller.in_flight() == remaining {
            return;
        }
        sleep(Duration::from_millis(5));
    }
    panic!("submissions did not finish");
}

fn settle(controller: &mut ScreenController, now: Instant) {
    settle_to(controller, now, 0);
}

#[test]
fn square_sketch_gets_one_label_at_its_center() {
    let service = ScriptedService::replying(vec![Ok(vec![ResultEntry::new("2+2", "4", false)])]);
    let mut controller = mount(service.clone());
    paint_square(&mut controller);

    controller.calculate().unwrap();
    let t0 = Instant::now();
    settle(&mut controller, t0);
    assert_eq!(controller.overlay().anchor(), Some(Position::new(105.0, 105.0)));

    controller.pump(t0 + Duration::from_millis(200));
    let labels = controller.overlay().labels();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].text(), r"\(\LARGE(2+2 = 4)\)");
    assert_eq!(labels[0].position, Position::new(105.0, 105.0));
    assert!(controller.bindings().is_empty());
    assert_eq!(controller.state(), ScreenState::Idle);

    let requests = service.requests.lock().unwrap();
    assert!(requests[0].0.starts_with("data:image/png;base64,"));
}

#[test]
fn assignment_only_reply_updates_bindings_without_labels() {
    let service = ScriptedService::replying(vec![Ok(vec![ResultEntry::new("x", "7", true)])]);
    let mut controller = mount(service);
    paint_square(&mut controller);

    controller.calculate().unwrap();
    let t0 = Instant::now();
    settle(&mut controller, t0);
    controller.pump(t0 + Duration::from_secs(1));

    assert_eq!(controller.bindings().get("x"), Some("7"));
    assert_eq!(controller.bindings().len(), 1);
    assert!(controller.overlay().labels().is_empty());
    assert!(controller.overlay().queue().is_empty());
}

#[test]
fn results_appear_one_stagger_step_apart_in_reply_order() {
    let service = ScriptedService::replying(vec![Ok(vec![
        ResultEntry::new("1+1", "2", false),
        ResultEntry::new("y", "3", true),
        ResultEntry::new("2*3", "6", false),
        ResultEntry::new("9-4", "5", false),
    ])]);
    let mut controller = mount(service);
    paint_square(&mut controller);

    controller.calculate().unwrap();
    let t0 = Instant::now();
    settle(&mut controller, t0);
    assert_eq!(controller.overlay().queue().len(), 3);

    let step = Duration::from_millis(200);
    controller.pump(t0 + step - Duration::from_millis(1));
    assert!(controller.overlay().labels().is_empty());

    controller.pump(t0 + step);
    assert_eq!(controller.overlay().labels().len(), 1);
    controller.pump(t0 + step * 2);
    assert_eq!(controller.overlay().labels().len(), 2);
    controller.pump(t0 + step * 3);

    let texts: Vec<&str> = controller
        .overlay()
        .labels()
        .iter()
        .map(|l| l.text())
        .collect();
    assert_eq!(
        texts,
        vec![
            r"\(\LARGE(1+1 = 2)\)",
            r"\(\LARGE(2*3 = 6)\)",
            r"\(\LARGE(9-4 = 5)\)",
        ]
    );
    assert_eq!(controller.bindings().get("y"), Some("3"));
}

#[test]
fn earlier_labels_survive_later_calculations() {
    let service = ScriptedService::replying(vec![
        Ok(vec![ResultEntry::new("1+1", "2", false)]),
        Ok(vec![ResultEntry::new("3+3", "6", false)]),
    ]);
    let mut controller = mount(service);

    for _ in 0..2 {
        paint_square(&mut controller);
        controller.calculate().unwrap();
        let now = Instant::now();
        settle(&mut controller, now);
        controller.pump(now + Duration::from_secs(1));
    }

    assert_eq!(controller.overlay().labels().len(), 2);
}

#[test]
fn empty_canvas_calculate_sends_nothing() {
    let service = ScriptedService::replying(Vec::new());
    let mut controller = mount(service.clone());

    assert_eq!(controller.calculate(), Err(CanvasError::DegenerateInk));
    assert_eq!(controller.state(), ScreenState::Idle);
    assert!(service.requests.lock().unwrap().is_empty());
    assert!(controller
        .take_notices()
        .iter()
        .any(|n| n.kind == NoticeKind::Warning));
}

#[test]
fn request_error_leaves_screen_usable() {
    let service = ScriptedService::replying(vec![
        Err(CanvasError::Request("connection refused".into())),
        Ok(vec![ResultEntry::new("1+2", "3", false)]),
    ]);
    let mut controller = mount(service);
    paint_square(&mut controller);

    controller.calculate().unwrap();
    settle(&mut controller, Instant::now());
    assert_eq!(controller.state(), ScreenState::Idle);
    assert!(controller.overlay().labels().is_empty());
    assert!(controller
        .take_notices()
        .iter()
        .any(|n| n.kind == NoticeKind::Error && n.text.contains("connection refused")));

    controller.calculate().unwrap();
    let t0 = Instant::now();
    settle(&mut controller, t0);
    controller.pump(t0 + Duration::from_secs(1));
    assert_eq!(controller.overlay().labels().len(), 1);
}

#[test]
fn reset_clears_everything() {
    let service = ScriptedService::replying(vec![Ok(vec![
        ResultEntry::new("x", "7", true),
        ResultEntry::new("x+1", "8", false),
    ])]);
    let mut controller = mount(service);
    paint_square(&mut controller);
    controller.calculate().unwrap();
    let t0 = Instant::now();
    settle(&mut controller, t0);
    controller.pump(t0 + Duration::from_secs(1));
    assert!(!controller.overlay().labels().is_empty());

    controller.reset();
    assert_eq!(controller.state(), ScreenState::Idle);
    assert!(!controller.surface().has_ink());
    assert!(controller.bindings().is_empty());
    assert!(controller.overlay().labels().is_empty());
    assert_eq!(controller.overlay().anchor(), None);
}

#[test]
fn full_round_trip_through_http_service() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/calculate")
            .body_contains(r#""image":"data:image/png;base64,"#)
            .body_contains(r#""dict_of_vars":{}"#);
        then.status(200).json_body(json!({
            "message": "Image processed",
            "type": "success",
            "data": [{"expr": "2+2", "result": 4, "assign": false}]
        }));
    });

    let client = RecognitionClient::new(&server.base_url()).unwrap();
    let mut controller = mount(Arc::new(client));
    controller.pointer_down(20.0, 20.0);
    controller.pointer_move(40.0, 20.0);
    controller.pointer_up();

    controller.calculate().unwrap();
    let t0 = Instant::now();
    settle(&mut controller, t0);
    controller.pump(t0 + Duration::from_secs(1));
    controller.pump(t0 + Duration::from_secs(1));

    m.assert();
    let labels = controller.overlay().labels();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].position, Position::new(30.0, 20.0));
    assert_eq!(
        labels[0].rendered().map(|r| r.body.as_str()),
        Some("(2+2 = 4)")
    );
}

#[test]
fn overlapping_calculates_both_get_labels_after_ink_is_cleared() {
    let (release, gate) = channel();
    let service = Arc::new(GatedService {
        gate: Mutex::new(gate),
        entries: vec![ResultEntry::new("2+2", "4", false)],
    });
    let mut controller = mount(service);
    paint_square(&mut controller);

    controller.calculate().unwrap();
    controller.calculate().unwrap();
    assert_eq!(controller.in_flight(), 2);

    release.send(()).unwrap();
    let t0 = Instant::now();
    settle_to(&mut controller, t0, 1);
    controller.pump(t0 + Duration::from_secs(1));
    assert_eq!(controller.overlay().labels().len(), 1);
    assert!(!controller.surface().has_ink());
    assert_eq!(controller.state(), ScreenState::Submitting);

    release.send(()).unwrap();
    let t1 = Instant::now();
    settle(&mut controller, t1);
    controller.pump(t1 + Duration::from_secs(1));

    let labels = controller.overlay().labels();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[1].position, Position::new(105.0, 105.0));
    assert_eq!(controller.state(), ScreenState::Idle);
    assert!(!controller
        .take_notices()
        .contains(&Notice::from(&CanvasError::DegenerateInk)));
}
