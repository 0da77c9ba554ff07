//! Test helpers: build the router around a temporary upload directory.

use audio_trimmer::app::create_app;
use audio_trimmer::config::settings::{
    parse_schedule, AppConfig, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_REAPER_SCHEDULE,
};
use audio_trimmer::infrastructure::audio::MediaProcessor;
use audio_trimmer::infrastructure::storage::local::BlobStore;
use audio_trimmer::modules::jobs::JobRegistry;
use audio_trimmer::state::AppState;
use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

pub const API_KEY: &str = "test-api-key";
pub const BASE_URL: &str = "http://trim.test";
const BOUNDARY: &str = "----audio-trimmer-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    /// Number of entries left in the upload root.
    pub fn stored_entries(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).unwrap().count()
    }

    /// Entries left once background cleanup has had a chance to run.
    pub async fn settled_entries(&self) -> usize {
        for _ in 0..200 {
            if self.stored_entries() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.stored_entries()
    }
}

pub async fn setup_test_app() -> TestApp {
    // WAV trims never shell out; MP3 trims would fail loudly.
    setup_test_app_with_ffmpeg("/nonexistent/ffmpeg").await
}

pub async fn setup_test_app_with_ffmpeg(ffmpeg_path: &str) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        server_port: 0,
        api_key: API_KEY.to_string(),
        upload_dir: upload_dir.path().to_path_buf(),
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        public_base_url: BASE_URL.to_string(),
        job_ttl_secs: 3600,
        reaper_schedule: parse_schedule(DEFAULT_REAPER_SCHEDULE).unwrap(),
        ffmpeg_path: ffmpeg_path.to_string(),
    };

    let storage = BlobStore::new(upload_dir.path()).await.unwrap();
    let state = AppState::new(
        config,
        storage,
        JobRegistry::new(),
        Arc::new(MediaProcessor::new(ffmpeg_path)),
    );
    let router = create_app(state.clone()).await;

    TestApp {
        router,
        state,
        upload_dir,
    }
}

pub enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                name,
                filename,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(path: &str, api_key: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(key) = api_key {
        builder = builder.header("X-API-KEY", key);
    }
    builder.body(Body::from(multipart_body(parts))).unwrap()
}

pub fn get_request(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

pub fn head_request(path: &str) -> Request<Body> {
    Request::builder()
        .method("HEAD")
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

pub async fn json_body(res: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// 16-bit mono PCM WAV of `seconds` length at 8 kHz.
pub fn wav_fixture(seconds: u32) -> Vec<u8> {
    let sample_rate: u32 = 8000;
    let frames = sample_rate * seconds;
    let data_len = frames * 2;

    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for i in 0..frames {
        let sample = ((i as f32 * 0.05).sin() * 8000.0) as i16;
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

pub fn duration_of(bytes: &[u8], dir: &Path) -> f64 {
    let path = dir.join("probe.wav");
    std::fs::write(&path, bytes).unwrap();
    audio_trimmer::infrastructure::audio::probe::probe_duration(&path).unwrap()
}

/// Silent 128 kbit/s 44.1 kHz mono MP3 of `frames` frames (1152 samples each).
pub fn mp3_fixture(frames: usize) -> Vec<u8> {
    const FRAME_LEN: usize = 417;
    let mut out = Vec::with_capacity(frames * FRAME_LEN);
    for _ in 0..frames {
        out.extend_from_slice(&[0xFF, 0xFB, 0x90, 0xC0]);
        out.resize(out.len() + FRAME_LEN - 4, 0);
    }
    out
}

/// Shell script standing in for ffmpeg. It writes `output` to the last
/// argument and exits with `code`, printing an error first when non-zero.
#[cfg(unix)]
pub fn fake_ffmpeg(dir: &Path, output: &str, code: i32) -> String {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-ffmpeg");
    let body = format!(
        "#!/bin/sh\n\
         for last; do :; done\n\
         printf '%s' '{output}' > \"$last\"\n\
         [ {code} -eq 0 ] || echo 'encoder exploded' >&2\n\
         exit {code}\n",
        output = output,
        code = code,
    );
    std::fs::write(&script, body).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script.to_string_lossy().into_owned()
}
