//! Prometheus metrics emitted by the service.
//!
//! Values go through the `metrics` facade; the Prometheus recorder installed
//! in `main` renders them at `/metrics`.

use std::time::Duration;

use metrics::{counter, histogram};

pub fn record_upload(bytes: u64) {
    counter!("uploads_total").increment(1);
    counter!("upload_bytes_total").increment(bytes);
}

pub fn record_band_render(duration: Duration) {
    counter!("band_renders_total").increment(1);
    histogram!("band_render_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_satellite_request() {
    counter!("satellite_requests_total").increment(1);
}

pub fn record_satellite_fallback(reason: &'static str) {
    counter!("satellite_fallbacks_total", "reason" => reason).increment(1);
}
