//! Integration tests for the sense → report → predict → actuate → display
//! cycle, driven through mock ports.

use airfan::app::events::{AbortReason, AppEvent};
use airfan::control::hysteresis::{FanState, Transition};
use airfan::error::{
    ActuatorError, Error, EstimationError, PredictionError, SensorFault, SinkError,
    TransportError,
};
use airfan::sensors::climate::ClimateSample;

use crate::mock_hw::{
    DOCUMENT_URL, METRICS_URL, PREDICTION_URL, Script, harness, ok, predicts,
};

fn on(cooldown: u8) -> FanState {
    FanState {
        fan_on: true,
        cooldown_remaining: cooldown,
    }
}

// ── Reference sample end to end ───────────────────────────────

#[test]
fn reference_sample_flows_through_every_stage() {
    let (mut control, mut hw, mut http, mut display, mut sink) = harness();
    http.route(PREDICTION_URL, Script::repeat(predicts(30.0)));

    let report = control
        .tick(&mut hw, &mut http, &mut display, &mut sink)
        .unwrap();

    let reading = report.reading.unwrap();
    assert_eq!(reading.concentration_ppm, Some(45.65));
    assert_eq!(report.estimation_error, None);
    assert_eq!(report.transition, Transition::Latched);
    assert_eq!(report.fan, on(3));
    assert_eq!(hw.fan_calls.last(), Some(&true));

    // Sinks first, in order, then the prediction.
    assert_eq!(http.urls(), vec![METRICS_URL, DOCUMENT_URL, PREDICTION_URL]);
    assert_eq!(
        http.requests[0].body.as_deref(),
        Some(r#"{"temperature":26.0,"humidity":71.0,"ppm":45.65,"adc_value":2048}"#)
    );
    assert_eq!(
        http.requests[1].body.as_deref(),
        Some(r#"{"temperature":26.0,"humidity":71.0,"adc_value":2048,"ppm":45.65}"#)
    );

    assert_eq!(
        display.last_frame().unwrap(),
        [
            "Temp: 26.0 C",
            "Hum : 71.0 %",
            "ADC : 2048",
            "PPM : 45.65 PPM",
            "Pred: 30ppm",
            "Fan : ON (3)",
        ]
    );

    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::CycleCompleted(s)) if s.sinks_ok == 2 && s.sinks_failed == 0
    ));
}

#[test]
fn metrics_sink_carries_auth_token_first() {
    let (mut control, mut hw, mut http, mut display, mut sink) = harness();
    control
        .tick(&mut hw, &mut http, &mut display, &mut sink)
        .unwrap();

    let metrics = &http.requests_to(METRICS_URL)[0];
    assert_eq!(
        metrics.headers,
        vec![
            ("X-Auth-Token".to_owned(), "BBUS-test-token".to_owned()),
            ("Content-Type".to_owned(), "application/json".to_owned()),
        ]
    );
    let document = &http.requests_to(DOCUMENT_URL)[0];
    assert_eq!(
        document.headers,
        vec![("Content-Type".to_owned(), "application/json".to_owned())]
    );
}

// ── Hysteresis over several cycles ────────────────────────────

#[test]
fn fan_latches_then_cools_down_then_releases() {
    let (mut control, mut hw, mut http, mut display, mut sink) = harness();
    http.route(
        PREDICTION_URL,
        Script::sequence([predicts(25.0), predicts(10.0), predicts(10.0), predicts(10.0), predicts(10.0)]),
    );

    let mut states = Vec::new();
    for _ in 0..5 {
        let report = control
            .tick(&mut hw, &mut http, &mut display, &mut sink)
            .unwrap();
        states.push(report.fan);
    }

    assert_eq!(
        states,
        vec![on(3), on(2), on(1), on(0), FanState::default()]
    );
    // Start + one command per cycle.
    assert_eq!(hw.fan_calls, vec![false, true, true, true, true, false]);

    let switches: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::FanSwitched { to, transition, .. } => Some((to.fan_on, *transition)),
            _ => None,
        })
        .collect();
    assert_eq!(
        switches,
        vec![(true, Transition::Latched), (false, Transition::Released)]
    );
}

#[test]
fn threshold_itself_does_not_latch() {
    let (mut control, mut hw, mut http, mut display, mut sink) = harness();
    http.route(PREDICTION_URL, Script::repeat(predicts(22.0)));
    let report = control
        .tick(&mut hw, &mut http, &mut display, &mut sink)
        .unwrap();
    assert_eq!(report.transition, Transition::Idle);
    assert!(!report.fan.fan_on);
}

// ── Prediction failures hold the fan ──────────────────────────

#[test]
fn failed_prediction_holds_state_and_shows_placeholder() {
    let (mut control, mut hw, mut http, mut display, mut sink) = harness();
    http.route(
        PREDICTION_URL,
        Script::sequence([
            predicts(40.0),
            predicts(10.0),
            Err(TransportError::Timeout),
            ok(500, "oops"),
            ok(200, r#"{"predicted_ppm": null}"#),
            ok(200, "not json"),
        ]),
    );

    control.tick(&mut hw, &mut http, &mut display, &mut sink).unwrap();
    let cooling = control
        .tick(&mut hw, &mut http, &mut display, &mut sink)
        .unwrap();
    assert_eq!(cooling.fan, on(2));

    for _ in 0..4 {
        let report = control
            .tick(&mut hw, &mut http, &mut display, &mut sink)
            .unwrap();
        assert_eq!(report.prediction, None);
        assert_eq!(report.transition, Transition::Held);
        assert_eq!(report.fan, on(2));
        assert_eq!(display.last_frame().unwrap()[4], "Pred: --");
    }

    let errors: Vec<PredictionError> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::PredictionUnavailable { error, .. } => Some(*error),
            _ => None,
        })
        .collect();
    assert_eq!(
        errors,
        vec![
            PredictionError::Transport(TransportError::Timeout),
            PredictionError::Status(500),
            PredictionError::MissingField,
            PredictionError::Malformed,
        ]
    );
    // The fan is still re-asserted while holding.
    assert_eq!(hw.fan_calls.len(), 7);
    assert!(hw.fan_calls[1..].iter().all(|&level| level));
}

// ── Sink isolation ────────────────────────────────────────────

#[test]
fn failing_metrics_sink_does_not_block_document_sink() {
    let (mut control, mut hw, mut http, mut display, mut sink) = harness();
    http.route(METRICS_URL, Script::repeat(Err(TransportError::Timeout)));
    http.route(PREDICTION_URL, Script::repeat(predicts(30.0)));

    let report = control
        .tick(&mut hw, &mut http, &mut display, &mut sink)
        .unwrap();

    assert_eq!(report.sink_results.len(), 2);
    assert_eq!(
        report.sink_results[0].outcome,
        Err(SinkError::Transport(TransportError::Timeout))
    );
    assert_eq!(report.sink_results[1].outcome, Ok(201));
    assert_eq!(http.requests_to(DOCUMENT_URL).len(), 1);

    // The prediction and decision still happen.
    assert_eq!(report.fan, on(3));
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SinkFailed { sink_id: "ubidots", .. })),
        1
    );
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SinkDelivered { sink_id: "mongodb", status: 201, .. })),
        1
    );
}

#[test]
fn rejected_document_sink_is_reported_with_status() {
    let (mut control, mut hw, mut http, mut display, mut sink) = harness();
    http.route(DOCUMENT_URL, Script::repeat(ok(503, "busy")));

    let report = control
        .tick(&mut hw, &mut http, &mut display, &mut sink)
        .unwrap();
    assert_eq!(report.sink_results[0].outcome, Ok(200));
    assert_eq!(report.sink_results[1].outcome, Err(SinkError::Status(503)));
    assert_eq!(report.summary().sinks_failed, 1);
}

// ── Sensor and estimation faults ──────────────────────────────

#[test]
fn zero_sample_dispatches_without_ppm_and_skips_prediction() {
    let (mut control, hw, mut http, mut display, mut sink) = harness();
    let mut hw = hw.with_gas(Script::repeat(Ok(0)));

    let report = control
        .tick(&mut hw, &mut http, &mut display, &mut sink)
        .unwrap();

    assert_eq!(report.estimation_error, Some(EstimationError::ZeroSample));
    assert!(http.requests_to(PREDICTION_URL).is_empty());
    assert_eq!(
        http.requests_to(METRICS_URL)[0].body.as_deref(),
        Some(r#"{"temperature":26.0,"humidity":71.0,"adc_value":0}"#)
    );
    assert_eq!(report.transition, Transition::Held);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::PredictionSkipped { .. })), 1);
    assert_eq!(display.last_frame().unwrap()[3], "PPM : ERR");
}

#[test]
fn climate_fault_omits_temperature_and_humidity() {
    let (mut control, hw, mut http, mut display, mut sink) = harness();
    let mut hw = hw.with_climate(Script::sequence([
        Err(SensorFault::ClimateChecksum),
        Ok(ClimateSample {
            temperature_c: 24.0,
            humidity_pct: 55.0,
        }),
    ]));

    let report = control
        .tick(&mut hw, &mut http, &mut display, &mut sink)
        .unwrap();
    let reading = report.reading.unwrap();
    assert_eq!(reading.temperature, None);
    assert_eq!(reading.concentration_ppm, Some(45.65));
    assert_eq!(
        http.requests_to(DOCUMENT_URL)[0].body.as_deref(),
        Some(r#"{"adc_value":2048,"ppm":45.65}"#)
    );
    // The gas path alone still feeds the predictor.
    assert_eq!(http.requests_to(PREDICTION_URL).len(), 1);
    assert_eq!(display.last_frame().unwrap()[0], "Temp: -- C");

    // Next cycle shows fresh values, not stale placeholders.
    control.tick(&mut hw, &mut http, &mut display, &mut sink).unwrap();
    assert_eq!(display.last_frame().unwrap()[0], "Temp: 24.0 C");
}

#[test]
fn gas_fault_keeps_climate_and_holds_fan() {
    let (mut control, hw, mut http, mut display, mut sink) = harness();
    let mut hw = hw.with_gas(Script::sequence([
        Ok(2048),
        Err(SensorFault::GasAdcReadFailed),
    ]));
    http.route(PREDICTION_URL, Script::repeat(predicts(30.0)));

    control.tick(&mut hw, &mut http, &mut display, &mut sink).unwrap();
    let predictions_before = http.requests_to(PREDICTION_URL).len();

    let report = control
        .tick(&mut hw, &mut http, &mut display, &mut sink)
        .unwrap();
    let reading = report.reading.unwrap();
    assert_eq!(reading.temperature, Some(26.0));
    assert_eq!(reading.humidity, Some(71.0));
    assert_eq!(reading.raw_adc, None);
    assert_eq!(reading.concentration_ppm, None);
    assert_eq!(report.estimation_error, None);
    assert_eq!(report.prediction, None);
    assert_eq!(report.transition, Transition::Held);
    assert_eq!(report.fan, on(3));

    // Climate-only telemetry still goes out to both sinks.
    assert_eq!(report.sink_results.len(), 2);
    for url in [METRICS_URL, DOCUMENT_URL] {
        let sent = http.requests_to(url);
        assert_eq!(
            sent.last().and_then(|r| r.body.as_deref()),
            Some(r#"{"temperature":26.0,"humidity":71.0}"#)
        );
    }
    assert_eq!(http.requests_to(PREDICTION_URL).len(), predictions_before);

    let frame = display.last_frame().unwrap();
    assert_eq!(frame[0], "Temp: 26.0 C");
    assert_eq!(frame[1], "Hum : 71.0 %");
    assert_eq!(frame[2], "ADC : ERR");
    assert_eq!(frame[3], "PPM : --");
    assert_eq!(frame[4], "Pred: --");
    assert_eq!(frame[5], "Fan : ON (3)");
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::SensorFault {
                fault: SensorFault::GasAdcReadFailed,
                ..
            }
        )),
        1
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::EstimationFailed { .. })), 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::PredictionSkipped { .. })), 1);
}

#[test]
fn both_sensor_faults_hold_fan_and_skip_network() {
    let (mut control, hw, mut http, mut display, mut sink) = harness();
    let mut hw = hw
        .with_gas(Script::repeat(Err(SensorFault::GasAdcReadFailed)))
        .with_climate(Script::repeat(Err(SensorFault::ClimateTimeout)));

    let report = control
        .tick(&mut hw, &mut http, &mut display, &mut sink)
        .unwrap();
    assert_eq!(report.reading, None);
    assert!(report.sink_results.is_empty());
    assert_eq!(report.transition, Transition::Held);
    assert!(http.requests.is_empty());

    let frame = display.last_frame().unwrap();
    assert_eq!(frame[0], "Temp: -- C");
    assert_eq!(frame[2], "ADC : ERR");
    assert_eq!(frame[4], "Pred: --");
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SensorFault { .. })), 2);
}

// ── Iteration boundary ────────────────────────────────────────

#[test]
fn panic_inside_a_cycle_is_contained() {
    let (mut control, mut hw, mut http, mut display, mut sink) = harness();
    http.panic_on(PREDICTION_URL);

    let report = control.run_iteration(&mut hw, &mut http, &mut display, &mut sink);
    assert!(report.is_none());
    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::CycleAborted {
            cycle: 1,
            reason: AbortReason::Panic(msg),
        }) if msg.as_str() == "mock transport exploded"
    ));

    // The loop carries on with the next cycle.
    let mut healthy = crate::mock_hw::MockHttp::new();
    let next = control.run_iteration(&mut hw, &mut healthy, &mut display, &mut sink);
    assert_eq!(next.map(|r| r.cycle), Some(2));
}

#[test]
fn fan_write_failure_aborts_cycle_after_display() {
    let (mut control, mut hw, mut http, mut display, mut sink) = harness();
    hw.fail_fan = true;

    let report = control.run_iteration(&mut hw, &mut http, &mut display, &mut sink);
    assert!(report.is_none());
    assert_eq!(display.frames.len(), 1);
    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::CycleAborted {
            reason: AbortReason::Error(Error::Actuator(ActuatorError::GpioWriteFailed)),
            ..
        })
    ));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::CycleCompleted(_))), 0);
}

#[test]
fn display_failure_is_isolated() {
    let (mut control, mut hw, mut http, mut display, mut sink) = harness();
    display.fail = true;
    http.route(PREDICTION_URL, Script::repeat(predicts(30.0)));

    let report = control
        .tick(&mut hw, &mut http, &mut display, &mut sink)
        .unwrap();
    assert_eq!(report.fan, on(3));
    assert_eq!(hw.fan_calls.last(), Some(&true));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::DisplayFailed { .. })), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::CycleCompleted(_))), 1);
}

#[test]
fn requests_use_configured_timeout() {
    let (mut control, mut hw, mut http, mut display, mut sink) = harness();
    control.tick(&mut hw, &mut http, &mut display, &mut sink).unwrap();
    assert!(
        http.requests
            .iter()
            .all(|r| r.timeout == std::time::Duration::from_millis(5_000))
    );
}
