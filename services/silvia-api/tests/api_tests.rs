//! End-to-end tests for the HTTP API.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; uploads
//! and frontend files live in a temporary directory per test.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use image::GenericImageView;
use sentinel_hub::{CompositeRequest, ImagerySource, SentinelHubResult};
use silvia_api::{config::AppConfig, create_router, state::AppState};
use tempfile::TempDir;
use test_utils::{
    create_constant_band, create_ramp_band, encode_gray_f32, encode_multiband_u16, encode_rgb_u8,
    interleave, write_fixture, FixtureOptions, RawTiff,
};
use tower::ServiceExt;

const BOUNDARY: &str = "silvia-test-boundary";

// ============================================================================
// Helpers
// ============================================================================

struct TestApp {
    dir: TempDir,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        Self::build(None)
    }

    fn with_source(source: Arc<dyn ImagerySource>) -> Self {
        Self::build(Some(source))
    }

    fn build(source: Option<Arc<dyn ImagerySource>>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::new(dir.path().join("uploads"), dir.path().join("frontend"));
        let mut state = AppState::new(config).unwrap();
        if let Some(source) = source {
            state = state.with_imagery_source(source);
        }
        let router = create_router(Arc::new(state));
        Self { dir, router }
    }

    fn upload_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }

    fn frontend_dir(&self) -> std::path::PathBuf {
        let dir = self.dir.path().join("frontend");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn add_raster(&self, name: &str, bytes: &[u8]) {
        write_fixture(&self.upload_dir(), name, bytes);
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Bytes) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn upload(&self, field: &str, filename: &str, content: &[u8]) -> (StatusCode, Bytes) {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: image/tiff\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::post("/api/upload-geotiff")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

fn json(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).unwrap()
}

fn detail(body: &[u8]) -> String {
    json(body)["detail"].as_str().unwrap_or_default().to_string()
}

/// Always answers with a fixed body.
struct CannedSource(Bytes);

#[async_trait]
impl ImagerySource for CannedSource {
    async fn fetch_composite(&self, _: &CompositeRequest) -> SentinelHubResult<Bytes> {
        Ok(self.0.clone())
    }
}

// ============================================================================
// Upload
// ============================================================================

#[tokio::test]
async fn test_upload_tif_is_stored() {
    let app = TestApp::new();
    let bytes = encode_gray_f32(2, 2, &[0.0; 4], &FixtureOptions::default());

    let (status, body) = app.upload("file", "scene.TIF", &bytes).await;
    assert_eq!(status, StatusCode::OK);

    let body = json(&body);
    assert_eq!(body["filename"], "scene.TIF");
    assert_eq!(body["detail"], "File uploaded successfully");
    assert_eq!(std::fs::read(app.upload_dir().join("scene.TIF")).unwrap(), bytes);
}

#[tokio::test]
async fn test_upload_other_extension_rejected() {
    let app = TestApp::new();
    let bytes = encode_gray_f32(2, 2, &[0.0; 4], &FixtureOptions::default());

    for name in ["scene.png", "scene.tif.zip", "scene"] {
        let (status, body) = app.upload("file", name, &bytes).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{name}");
        assert!(!detail(&body).is_empty());
        assert!(!app.upload_dir().join(name).exists());
    }
}

#[tokio::test]
async fn test_upload_path_traversal_rejected() {
    let app = TestApp::new();

    let (status, _) = app.upload("file", "../escape.tif", b"II*\0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!app.dir.path().join("escape.tif").exists());
}

#[tokio::test]
async fn test_upload_missing_file_field() {
    let app = TestApp::new();

    let (status, body) = app.upload("document", "scene.tif", b"II*\0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(detail(&body).contains("file"));
}

// ============================================================================
// Metadata
// ============================================================================

#[tokio::test]
async fn test_metadata_missing_file_is_404() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/geotiff-metadata/nothing.tif").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(detail(&body).contains("nothing.tif"));
}

#[tokio::test]
async fn test_metadata_encoded_traversal_is_400() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/geotiff-metadata/..%2Fsecret.tif").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metadata_reports_bands_and_descriptions() {
    let app = TestApp::new();
    let options = FixtureOptions::default().with_descriptions(&["Red", "Green", "NIR"]);
    app.add_raster("rgb.tif", &encode_rgb_u8(5, 4, &[0u8; 60], &options));

    let (status, body) = app.get("/api/geotiff-metadata/rgb.tif").await;
    assert_eq!(status, StatusCode::OK);

    let body = json(&body);
    assert_eq!(body["bands"], 3);
    assert_eq!(body["descriptions"], serde_json::json!(["Red", "Green", "NIR"]));
    assert_eq!(body["width"], 5);
    assert_eq!(body["height"], 4);
}

#[tokio::test]
async fn test_metadata_unparseable_file_is_500() {
    let app = TestApp::new();
    app.add_raster("broken.tif", b"this is not a tiff");

    let (status, body) = app.get("/api/geotiff-metadata/broken.tif").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!detail(&body).is_empty());
}

// ============================================================================
// Band previews
// ============================================================================

#[tokio::test]
async fn test_band_out_of_range_is_400() {
    let app = TestApp::new();
    app.add_raster(
        "one.tif",
        &encode_gray_f32(2, 2, &[0.0; 4], &FixtureOptions::default()),
    );

    for uri in [
        "/api/geotiff-band/one.tif/0",
        "/api/geotiff-band/one.tif/2",
        "/api/geotiff-band/one.tif/abc",
    ] {
        let (status, _) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn test_band_missing_file_is_404() {
    let app = TestApp::new();
    let (status, _) = app.get("/api/geotiff-band/missing.tif/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_band_preview_wide_image() {
    let app = TestApp::new();
    let data = create_ramp_band(40, 20);
    app.add_raster(
        "ramp.tif",
        &encode_gray_f32(40, 20, &data, &FixtureOptions::default().with_rows_per_strip(3)),
    );

    let (status, body) = app.get("/api/geotiff-band/ramp.tif/1").await;
    assert_eq!(status, StatusCode::OK);

    let image = image::load_from_memory(&body).unwrap().to_luma8();
    assert_eq!(image.dimensions(), (2048, 1024));
    // Source minimum sits at the top-left, maximum at the bottom-right
    assert_eq!(image.get_pixel(0, 0).0, [0]);
    assert_eq!(image.get_pixel(2047, 1023).0, [255]);
}

#[tokio::test]
async fn test_band_preview_tall_image() {
    let app = TestApp::new();
    app.add_raster(
        "tall.tif",
        &encode_gray_f32(30, 70, &create_ramp_band(30, 70), &FixtureOptions::default()),
    );

    let (status, body) = app.get("/api/geotiff-band/tall.tif/1").await;
    assert_eq!(status, StatusCode::OK);

    let image = image::load_from_memory(&body).unwrap();
    // trunc(2048 * 30 / 70) = 877
    assert_eq!(image.dimensions(), (877, 2048));
}

#[tokio::test]
async fn test_band_preview_constant_band_is_black() {
    let app = TestApp::new();
    app.add_raster(
        "flat.tif",
        &encode_gray_f32(16, 16, &create_constant_band(16, 16, 3.5), &FixtureOptions::default()),
    );

    let (status, body) = app.get("/api/geotiff-band/flat.tif/1").await;
    assert_eq!(status, StatusCode::OK);

    let image = image::load_from_memory(&body).unwrap().to_luma8();
    assert_eq!(image.dimensions(), (2048, 2048));
    assert!(image.pixels().all(|p| p.0 == [0]));
}

#[tokio::test]
async fn test_band_preview_selects_band() {
    let app = TestApp::new();
    let red = vec![0u8; 16];
    let green: Vec<u8> = (0..16).map(|v| v * 10).collect();
    let blue = vec![9u8; 16];
    let pixels = interleave(&[red, green, blue]);
    app.add_raster("rgb.tif", &encode_rgb_u8(4, 4, &pixels, &FixtureOptions::default()));

    // Constant bands render black, the ramp band spans the full range
    let (_, body) = app.get("/api/geotiff-band/rgb.tif/1").await;
    let image = image::load_from_memory(&body).unwrap().to_luma8();
    assert!(image.pixels().all(|p| p.0 == [0]));

    let (_, body) = app.get("/api/geotiff-band/rgb.tif/2").await;
    let image = image::load_from_memory(&body).unwrap().to_luma8();
    assert_eq!(image.pixels().map(|p| p.0[0]).max(), Some(255));
}

#[tokio::test]
async fn test_band_preview_of_four_band_gray() {
    let app = TestApp::new();
    let ramp: Vec<u16> = (0..32).map(|v| v * 100).collect();
    let reversed: Vec<u16> = ramp.iter().rev().copied().collect();
    let pixels = interleave(&[vec![5u16; 32], ramp, vec![7u16; 32], reversed]);
    app.add_raster(
        "rgbn.tif",
        &encode_multiband_u16(8, 4, &pixels, &FixtureOptions::default()),
    );

    let (status, body) = app.get("/api/geotiff-metadata/rgbn.tif").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["bands"], 4);

    let (status, body) = app.get("/api/geotiff-band/rgbn.tif/2").await;
    assert_eq!(status, StatusCode::OK);
    let image = image::load_from_memory(&body).unwrap().to_luma8();
    assert_eq!(image.dimensions(), (2048, 1024));
    assert_eq!(image.get_pixel(0, 0).0, [0]);
    assert_eq!(image.get_pixel(2047, 1023).0, [255]);

    let (status, body) = app.get("/api/geotiff-band/rgbn.tif/4").await;
    assert_eq!(status, StatusCode::OK);
    let image = image::load_from_memory(&body).unwrap().to_luma8();
    assert_eq!(image.get_pixel(0, 0).0, [255]);
    assert_eq!(image.get_pixel(2047, 1023).0, [0]);
}

#[tokio::test]
async fn test_band_preview_of_planar_tiled_file() {
    let app = TestApp::new();
    let bands: Vec<Vec<f32>> = (0..3)
        .map(|b| create_ramp_band(20, 20).into_iter().map(|v| v * (b + 1) as f32).collect())
        .collect();
    app.add_raster("planar.tif", &RawTiff::new(20, 20).tiled(16, 16).planar().encode(&bands));

    let (status, body) = app.get("/api/geotiff-band/planar.tif/3").await;
    assert_eq!(status, StatusCode::OK);
    let image = image::load_from_memory(&body).unwrap().to_luma8();
    assert_eq!(image.dimensions(), (2048, 2048));
    assert_eq!(image.get_pixel(0, 0).0, [0]);
    assert_eq!(image.get_pixel(2047, 2047).0, [255]);
}

#[tokio::test]
async fn test_band_preview_ignores_nodata_border() {
    let app = TestApp::new();
    // 16x16 band: a -9999 frame around interior values 117..=338
    let data: Vec<f32> = create_ramp_band(16, 16)
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            let (row, col) = (i / 16, i % 16);
            if row == 0 || col == 0 || row == 15 || col == 15 {
                -9999.0
            } else {
                v + 100.0
            }
        })
        .collect();
    let options = FixtureOptions::default().with_nodata("-9999");
    app.add_raster("framed.tif", &encode_gray_f32(16, 16, &data, &options));

    let (status, body) = app.get("/api/geotiff-band/framed.tif/1").await;
    assert_eq!(status, StatusCode::OK);
    let image = image::load_from_memory(&body).unwrap().to_luma8();
    assert_eq!(image.dimensions(), (2048, 2048));

    // Output pixel 192 samples source position ~1.004, output 1855 ~13.996.
    // With the frame counted the interior would all stretch to 249 or more.
    assert!(image.get_pixel(192, 192).0[0] <= 1);
    assert!(image.get_pixel(1855, 1855).0[0] >= 250);
}

// ============================================================================
// Satellite proxy
// ============================================================================

#[tokio::test]
async fn test_satellite_without_credentials_is_500() {
    let app = TestApp::new();

    let (status, body) = app
        .get("/api/satellite-image?BBOX=0,0,1,1&WIDTH=10&HEIGHT=10")
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(detail(&body).to_lowercase().contains("configuration"));
}

#[tokio::test]
async fn test_satellite_malformed_bbox_returns_transparent_png() {
    let app = TestApp::with_source(Arc::new(CannedSource(Bytes::new())));

    let (status, body) = app
        .get("/api/satellite-image?BBOX=1,2,oops&WIDTH=300&HEIGHT=200&date=2024-05-01")
        .await;
    assert_eq!(status, StatusCode::OK);

    let image = image::load_from_memory(&body).unwrap();
    assert_eq!(image.dimensions(), (300, 200));
    assert!(image.to_rgba8().pixels().all(|p| p.0[3] == 0));
}

#[tokio::test]
async fn test_satellite_returns_remote_png() {
    let remote = renderer::png::create_png_rgba(&[10, 20, 30, 255], 1, 1).unwrap();
    let app = TestApp::with_source(Arc::new(CannedSource(Bytes::from(remote.clone()))));

    let (status, body) = app
        .get("/api/satellite-image?BBOX=-3.8,40.3,-3.6,40.5&WIDTH=1&HEIGHT=1&SRS=EPSG:4326")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), remote.as_slice());
}

#[tokio::test]
async fn test_satellite_missing_crs_returns_transparent_png() {
    let remote = renderer::png::create_png_rgba(&[10, 20, 30, 255], 1, 1).unwrap();
    let app = TestApp::with_source(Arc::new(CannedSource(Bytes::from(remote))));

    let (status, body) = app
        .get("/api/satellite-image?BBOX=-3.8,40.3,-3.6,40.5&WIDTH=5&HEIGHT=3")
        .await;
    assert_eq!(status, StatusCode::OK);

    let image = image::load_from_memory(&body).unwrap();
    assert_eq!(image.dimensions(), (5, 3));
    assert!(image.to_rgba8().pixels().all(|p| p.0[3] == 0));
}

#[tokio::test]
async fn test_satellite_bad_size_is_400() {
    let app = TestApp::with_source(Arc::new(CannedSource(Bytes::new())));

    let (status, _) = app.get("/api/satellite-image?BBOX=0,0,1,1&WIDTH=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .get("/api/satellite-image?BBOX=0,0,1,1&WIDTH=ten&HEIGHT=10")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Probes and pages
// ============================================================================

#[tokio::test]
async fn test_today_format() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/today").await;
    assert_eq!(status, StatusCode::OK);

    let today = json(&body)["today"].as_str().unwrap().to_string();
    assert_eq!(today.len(), 10);
    assert!(chrono::NaiveDate::parse_from_str(&today, "%Y-%m-%d").is_ok());
}

#[tokio::test]
async fn test_status_and_health() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({ "status": "active" }));

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), b"OK");

    let (status, _) = app.get("/metrics").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_static_pages() {
    let app = TestApp::new();
    let frontend = app.frontend_dir();
    std::fs::write(frontend.join("index.html"), "<h1>Silvia</h1>").unwrap();
    std::fs::write(frontend.join("app.js"), "console.log('hi');").unwrap();

    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), b"<h1>Silvia</h1>");

    let (status, _) = app.get("/static/app.js").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/viewer.html").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
