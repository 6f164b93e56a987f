use std::{fs, thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

// The global subscriber can only be installed once per test binary, so the
// file sink gets a single test.
#[test]
#[serial]
fn writes_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("canvas.log");

    math_canvas::logging::init(true, Some(path.clone()));
    tracing::info!("canvas mounted for test");

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("canvas mounted for test"));
}
