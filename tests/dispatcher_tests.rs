//! Dispatcher tests: keyword matching, arity validation, numeric
//! conversion, and the no-partial-apply guarantee.

use rust_serial_cmd_pipeline::command::parse_float_lenient;
use rust_serial_cmd_pipeline::{dispatch, AppState, DispatchCtx, DispatchError, LinkStats, MsgBuffer};

fn run(payload: &[u8], state: &AppState, stats: &LinkStats) -> (Result<(), DispatchError>, String) {
    let cx = DispatchCtx { state, stats };
    let mut out = MsgBuffer::new();
    let result = dispatch(payload, &cx, &mut out);
    (result, out.as_str().to_string())
}

#[test]
fn test_pid_sets_all_three_gains() {
    let state = AppState::new();
    let stats = LinkStats::new();

    let (result, out) = run(b"PID,1.0,0.5,0.01", &state, &stats);
    assert!(result.is_ok());
    assert_eq!(state.gains(), (1.0, 0.5, 0.01));
    assert!(out.contains("PID gains set"));
}

#[test]
fn test_pid_too_few_args_changes_nothing() {
    let state = AppState::new();
    let stats = LinkStats::new();
    state.set_gains(9.0, 8.0, 7.0);

    let (result, _) = run(b"PID,1.0", &state, &stats);
    assert_eq!(result, Err(DispatchError::MissingParams));
    assert_eq!(state.gains(), (9.0, 8.0, 7.0));
}

#[test]
fn test_pid_too_many_args_changes_nothing() {
    let state = AppState::new();
    let stats = LinkStats::new();

    let (result, _) = run(b"PID,1,2,3,4", &state, &stats);
    assert_eq!(result, Err(DispatchError::MissingParams));
    assert_eq!(state.gains(), (0.0, 0.0, 0.0));
}

#[test]
fn test_pid_unparseable_token_clamps_to_zero() {
    let state = AppState::new();
    let stats = LinkStats::new();

    let (result, _) = run(b"PID,abc,0.5,xyz", &state, &stats);
    assert!(result.is_ok());
    assert_eq!(state.gains(), (0.0, 0.5, 0.0));
}

#[test]
fn test_led_on_then_off() {
    let state = AppState::new();
    let stats = LinkStats::new();

    let (result, out) = run(b"LED,ON", &state, &stats);
    assert!(result.is_ok());
    assert!(state.led());
    assert!(out.contains("LED ON"));

    let (result, out) = run(b"LED,OFF", &state, &stats);
    assert!(result.is_ok());
    assert!(!state.led());
    assert!(out.contains("LED OFF"));
}

#[test]
fn test_led_rejects_other_values() {
    let state = AppState::new();
    let stats = LinkStats::new();

    let (result, _) = run(b"LED,BLUE", &state, &stats);
    assert_eq!(result, Err(DispatchError::BadArgument));
    assert!(!state.led());

    // Keyword and argument matching are case-sensitive
    let (result, _) = run(b"LED,on", &state, &stats);
    assert_eq!(result, Err(DispatchError::BadArgument));
}

#[test]
fn test_unknown_keyword_is_reported_not_fatal() {
    let state = AppState::new();
    let stats = LinkStats::new();

    let (result, _) = run(b"FOO,1,2", &state, &stats);
    assert_eq!(result, Err(DispatchError::UnknownCommand));
    assert_eq!(state.gains(), (0.0, 0.0, 0.0));
}

#[test]
fn test_keyword_match_is_case_sensitive() {
    let state = AppState::new();
    let stats = LinkStats::new();

    let (result, _) = run(b"pid,1,2,3", &state, &stats);
    assert_eq!(result, Err(DispatchError::UnknownCommand));
}

#[test]
fn test_empty_payload_is_unknown() {
    let state = AppState::new();
    let stats = LinkStats::new();

    let (result, _) = run(b"", &state, &stats);
    assert_eq!(result, Err(DispatchError::UnknownCommand));
}

#[test]
fn test_non_utf8_payload_is_rejected() {
    let state = AppState::new();
    let stats = LinkStats::new();

    let (result, _) = run(&[0xFF, 0xFE, b','], &state, &stats);
    assert_eq!(result, Err(DispatchError::BadPayload));
}

#[test]
fn test_status_reports_counters_and_state() {
    let state = AppState::new();
    let stats = LinkStats::new();
    state.set_gains(1.5, 0.25, 0.125);
    state.set_led(true);
    stats.note_rx_dropped();
    stats.note_cmd_error();

    let (result, out) = run(b"STATUS", &state, &stats);
    assert!(result.is_ok());
    assert!(out.contains("RustCmdPipeline"));
    assert!(out.contains("drops=1"));
    assert!(out.contains("errors=1"));
    assert!(out.contains("P=1.5"));
    assert!(out.contains("LED=ON"));
}

#[test]
fn test_status_with_args_fails_arity() {
    let state = AppState::new();
    let stats = LinkStats::new();

    let (result, _) = run(b"STATUS,now", &state, &stats);
    assert_eq!(result, Err(DispatchError::MissingParams));
}

#[test]
fn test_lenient_float_matches_atof_semantics() {
    assert_eq!(parse_float_lenient("1.0"), 1.0);
    assert_eq!(parse_float_lenient("-2.5e2"), -250.0);
    assert_eq!(parse_float_lenient("0.01"), 0.01);
    assert_eq!(parse_float_lenient("3garbage"), 3.0);
    assert_eq!(parse_float_lenient("garbage"), 0.0);
    assert_eq!(parse_float_lenient(""), 0.0);
}
