//! CLI integration tests against a local removal service
//!
//! A wiremock server stands in for the remote API; the binary is pointed at
//! it through `REMOVE_BG_ENDPOINT` and runs on a blocking thread so the
//! server keeps serving on the test runtime.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use remote_bgremove::error::messages;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

const API_PATH: &str = "/v1.0/removebg";
const TEST_KEY: &str = "cli-test-key";

fn png(alpha: u8) -> Vec<u8> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([40, 80, 160, alpha])));
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("Failed to encode test image");
    buffer
}

/// Workspace with an input image named `photo.png`
fn workspace(alpha: u8) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("photo.png");
    std::fs::write(&input, png(alpha)).expect("Failed to write input");
    (temp_dir, input)
}

/// Run the binary in `dir` against `server` with an isolated config directory
async fn run_cli(server: &MockServer, dir: &Path, args: &[&str]) -> Output {
    let endpoint = format!("{}{}", server.uri(), API_PATH);
    let dir = dir.to_path_buf();
    let args: Vec<String> = args.iter().map(|arg| (*arg).to_string()).collect();

    tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_remote-bgremove"))
            .args(&args)
            .current_dir(&dir)
            .env("XDG_CONFIG_HOME", &dir)
            .env("HOME", &dir)
            .env("REMOVE_BG_API_KEY", TEST_KEY)
            .env("REMOVE_BG_ENDPOINT", endpoint)
            .output()
            .expect("Failed to run CLI")
    })
    .await
    .expect("CLI thread panicked")
}

async fn mount_success(server: &MockServer, processed: Vec<u8>, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(header("X-Api-Key", TEST_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_raw(processed, "image/png"))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_result_saved_to_working_directory() {
    let server = MockServer::start().await;
    let processed = png(0);
    mount_success(&server, processed.clone(), 1).await;
    let (temp_dir, input) = workspace(255);

    let output = run_cli(&server, temp_dir.path(), &[input.to_str().unwrap()]).await;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let written = temp_dir.path().join("image-sans-fond.png");
    assert_eq!(std::fs::read(&written).unwrap(), processed);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("image-sans-fond.png"), "stdout: {}", stdout);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_result_saved_to_output_file() {
    let server = MockServer::start().await;
    let processed = png(0);
    mount_success(&server, processed.clone(), 1).await;
    let (temp_dir, input) = workspace(255);
    let target = temp_dir.path().join("out").join("cutout.png");

    let output = run_cli(
        &server,
        temp_dir.path(),
        &[input.to_str().unwrap(), "-o", target.to_str().unwrap()],
    )
    .await;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(std::fs::read(&target).unwrap(), processed);
    assert!(!temp_dir.path().join("image-sans-fond.png").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_request_fails_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_raw(r#"{"errors":[{"title":"API Key invalid"}]}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let (temp_dir, input) = workspace(255);

    let output = run_cli(&server, temp_dir.path(), &[input.to_str().unwrap()]).await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(messages::TRANSPORT_FAILURE), "stderr: {}", stderr);
    assert!(!stderr.contains(TEST_KEY));
    assert!(!temp_dir.path().join("image-sans-fond.png").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_transparent_input_is_skipped() {
    let server = MockServer::start().await;
    mount_success(&server, png(0), 0).await;
    let (temp_dir, input) = workspace(0);

    let output = run_cli(&server, temp_dir.path(), &[input.to_str().unwrap()]).await;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(!temp_dir.path().join("image-sans-fond.png").exists());
    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_force_sends_transparent_input() {
    let server = MockServer::start().await;
    let processed = png(0);
    mount_success(&server, processed.clone(), 1).await;
    let (temp_dir, input) = workspace(0);

    let output = run_cli(&server, temp_dir.path(), &[input.to_str().unwrap(), "--force"]).await;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        std::fs::read(temp_dir.path().join("image-sans-fond.png")).unwrap(),
        processed
    );
}
