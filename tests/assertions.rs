mod common;

use common::{inbound, simulator};
use xcontactflow::{AssertionFailure, CallStatus, EngineConfig};

#[tokio::test(start_paused = true)]
async fn test_ordered_assertion_reports_mismatch() {
    let sim = simulator();
    let call = sim.start_call(inbound()).unwrap();
    call.press("123456782").unwrap();
    assert_eq!(call.wait().await, CallStatus::Ended);

    let err = call.expect().transfer().to_queue("Sales").await.unwrap_err();
    assert_eq!(
        err,
        AssertionFailure::Mismatch {
            expected: "to be transferred to queue 'Sales'".to_string(),
            got: "Support".to_string(),
        }
    );
    assert_eq!(
        err.to_string(),
        "expected to be transferred to queue 'Sales' but got 'Support'"
    );
}

#[tokio::test(start_paused = true)]
async fn test_ordered_prompts_must_come_in_order() {
    let sim = simulator();
    let call = sim.start_call(inbound()).unwrap();
    call.press("123456782").unwrap();
    assert_eq!(call.wait().await, CallStatus::Ended);

    let expect = call.expect();
    let err = expect.prompt().to_contain("balance").await.unwrap_err();
    assert!(matches!(err, AssertionFailure::Mismatch { ref got, .. } if got.starts_with("Welcome caller")));

    // The mismatch consumed the welcome prompt.
    assert_eq!(expect.position(), 1);
    expect.prompt().to_contain("account number").await.unwrap();
    expect.prompt().unordered().to_contain("Press 1").await.unwrap();
    expect.prompt().unordered().to_contain("balance").await.unwrap();
    expect.prompt().to_contain("balance").await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_assertion_on_ended_call_without_event() {
    let sim = simulator();
    let call = sim.start_call(inbound()).unwrap();
    call.press("123456782").unwrap();
    assert_eq!(call.wait().await, CallStatus::Ended);

    let err = call.expect().transfer().to_flow("Billing").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "expected to be transferred to flow 'Billing' but no matching event found"
    );
    let err = call.expect().lambda().unordered().to_be_invoked("fraud-check").await.unwrap_err();
    assert!(matches!(err, AssertionFailure::NotFound { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_never_fails_on_matching_event() {
    let sim = simulator();
    let call = sim.start_call(inbound()).unwrap();
    call.press("123456782").unwrap();
    assert_eq!(call.wait().await, CallStatus::Ended);

    let err = call.expect().attributes().never().to_be_set("language", "en-GB").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "expected never attribute 'language' to be set to 'en-GB' but got 'language=en-GB'"
    );
    call.expect().attributes().never().to_be_set("language", "fr-FR").await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_assertion_waits_for_live_call() {
    let sim = simulator();
    let call = sim.start_call(inbound()).unwrap();

    let expect = call.expect();
    let pending = tokio::spawn({
        let expect = expect.clone();
        async move { expect.transfer().unordered().to_queue("Support").await }
    });
    expect.prompt().unordered().to_contain("account number").await.unwrap();
    call.press("12345678").unwrap();
    call.press("2").unwrap();

    pending.await.unwrap().unwrap();
    assert_eq!(call.wait().await, CallStatus::Ended);
}

#[tokio::test(start_paused = true)]
async fn test_assertion_times_out_while_call_waits() {
    let sim = simulator().with_config(EngineConfig {
        assertion_timeout_ms: 1000,
        ..EngineConfig::default()
    });
    let call = sim.start_call(inbound()).unwrap();

    let err = call.expect().transfer().to_queue("Support").await.unwrap_err();
    assert!(matches!(err, AssertionFailure::NotFound { .. }));
    assert_eq!(call.status(), CallStatus::WaitingForInput);

    // Nothing has been transferred yet, so a never assertion holds until the
    // timeout.
    call.expect().transfer().never().to_queue("Support").await.unwrap();
}
