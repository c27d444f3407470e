//! Shared fixtures for the HTTP integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use epass_server::email::{MailTransport, Notifier, OutgoingEmail};
use epass_server::intake::proof::ProofStore;
use epass_server::store::RegistrationSheet;
use epass_server::{AppState, DeliveryError, IntakePipeline, api};
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

/// Router wired to a scratch directory
pub struct TestApp {
    _temp: TempDir,
    root: PathBuf,
    router: Router,
    sheet: RegistrationSheet,
}

impl TestApp {
    pub fn new(notifier: Notifier) -> Self {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().to_path_buf();
        let sheet = RegistrationSheet::new(root.join("registrations.xlsx"));
        let pipeline = IntakePipeline::new(
            ProofStore::new(root.join("uploads")),
            sheet.clone(),
            notifier,
            "Isai Illam",
        );
        let router = api::create_router(AppState::with_pipeline(pipeline));
        Self {
            _temp: temp,
            root,
            router,
            sheet,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sheet_path(&self) -> PathBuf {
        self.root.join("registrations.xlsx")
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    /// Stored proof file names, sorted
    pub fn uploads(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.upload_dir()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub async fn rows(&self) -> Vec<Vec<String>> {
        self.sheet.rows().await.unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, http::HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, body)
    }

    pub async fn register(&self, body: &Value) -> (StatusCode, Value) {
        self.post_json("/api/register", body).await
    }
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

pub fn registration_form() -> Value {
    json!({
        "fullName": "Kavya Raman",
        "email": "kavya@example.com",
        "mobileNumber": "9876543210",
        "clubName": "Music Club",
        "event": "Isai Illam",
        "paymentScreenshot": data_uri("image/png", b"\x89PNG\r\n\x1a\nfake-screenshot"),
    })
}

/// Records every email instead of sending it
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<String, DeliveryError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok("<recorded@isai-illam.local>".into())
    }
}

/// Fails every delivery the way an unreachable relay does
pub struct FailingTransport;

#[async_trait]
impl MailTransport for FailingTransport {
    async fn deliver(&self, _email: &OutgoingEmail) -> Result<String, DeliveryError> {
        Err(DeliveryError::Transport("connection refused".into()))
    }
}

pub fn recording_notifier() -> (Notifier, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    (Notifier::new(transport.clone()), transport)
}

/// Decode the QR code drawn on a rendered pass.
///
/// The symbol is the block of black `re` operators in the page content
/// stream; it is rasterized back into a greyscale image for `rqrr`.
pub fn decode_pass_qr(pdf: &[u8]) -> String {
    const LEFT: f32 = 125.0;
    const TOP: f32 = 500.0;
    const SIZE: f32 = 150.0;
    const SCALE: f32 = 4.0;

    let text = String::from_utf8_lossy(pdf);
    let start = text.find("\n0 0 0 rg\n").expect("QR fill colour in content stream");
    let section = &text[start..];
    let end = section.find("\nf\n").expect("QR fill operator");

    let side = (SIZE * SCALE) as usize;
    let mut dark = vec![false; side * side];
    let to_px = |v: f32| ((v * SCALE).round().max(0.0) as usize).min(side);

    for line in section[..end].lines().filter(|l| l.ends_with(" re")) {
        let v: Vec<f32> = line
            .split_whitespace()
            .take(4)
            .map(|n| n.parse().unwrap())
            .collect();
        let (x, y, w, h) = (v[0], v[1], v[2], v[3]);
        let (x0, x1) = (to_px(x - LEFT), to_px(x + w - LEFT));
        let (y0, y1) = (to_px(TOP - (y + h)), to_px(TOP - y));
        for py in y0..y1 {
            for px in x0..x1 {
                dark[py * side + px] = true;
            }
        }
    }

    let mut image = rqrr::PreparedImage::prepare_from_greyscale(side, side, |x, y| {
        if dark[y * side + x] { 0 } else { 255 }
    });
    let grids = image.detect_grids();
    assert_eq!(grids.len(), 1, "expected exactly one QR code on the pass");
    let (_, content) = grids[0].decode().unwrap();
    content
}
