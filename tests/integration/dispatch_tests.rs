//! Integration tests for telemetry fan-out wired from device configuration.

use airfan::app::ports::Method;
use airfan::app::reading::Reading;
use airfan::config::{DOCUMENT_SINK_ID, METRICS_SINK_ID, SystemConfig};
use airfan::error::{SinkError, TransportError};
use airfan::telemetry::TelemetryDispatcher;

use crate::mock_hw::{DOCUMENT_URL, METRICS_URL, MockHttp, Script, device_config, ok};

fn dispatcher() -> TelemetryDispatcher {
    TelemetryDispatcher::new(device_config().telemetry_sinks(&SystemConfig::default()))
}

fn reading() -> Reading {
    Reading {
        temperature: Some(21.5),
        humidity: Some(40.0),
        raw_adc: Some(1000),
        concentration_ppm: Some(28.4),
    }
}

#[test]
fn sinks_are_posted_in_configured_order() {
    let mut http = MockHttp::new();
    let results = dispatcher().dispatch(&mut http, &reading());

    let ids: Vec<&str> = results.iter().map(|r| r.sink_id).collect();
    assert_eq!(ids, vec![METRICS_SINK_ID, DOCUMENT_SINK_ID]);
    assert!(results.iter().all(|r| r.success()));
    assert!(http.requests.iter().all(|r| r.method == Method::Post));
    assert_eq!(http.urls(), vec![METRICS_URL, DOCUMENT_URL]);
}

#[test]
fn every_sink_is_attempted_when_all_fail() {
    let mut http = MockHttp::new();
    http.route(METRICS_URL, Script::repeat(Err(TransportError::Connect)));
    http.route(DOCUMENT_URL, Script::repeat(ok(400, "bad")));

    let results = dispatcher().dispatch(&mut http, &reading());
    assert_eq!(http.requests.len(), 2);
    assert_eq!(
        results[0].outcome,
        Err(SinkError::Transport(TransportError::Connect))
    );
    assert_eq!(results[1].outcome, Err(SinkError::Status(400)));
}

#[test]
fn sink_recovers_on_the_next_dispatch() {
    let mut http = MockHttp::new();
    http.route(
        METRICS_URL,
        Script::sequence([Err(TransportError::Timeout), ok(200, "{}")]),
    );
    let d = dispatcher();

    assert!(!d.dispatch(&mut http, &reading())[0].success());
    assert!(d.dispatch(&mut http, &reading())[0].success());
}

#[test]
fn payload_shapes_differ_per_sink() {
    let mut http = MockHttp::new();
    dispatcher().dispatch(&mut http, &reading());

    assert_eq!(
        http.requests_to(METRICS_URL)[0].body.as_deref(),
        Some(r#"{"temperature":21.5,"humidity":40.0,"ppm":28.4,"adc_value":1000}"#)
    );
    assert_eq!(
        http.requests_to(DOCUMENT_URL)[0].body.as_deref(),
        Some(r#"{"temperature":21.5,"humidity":40.0,"adc_value":1000,"ppm":28.4}"#)
    );
}
