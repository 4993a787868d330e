use super::*;

#[test]
fn inline_without_limit() {
    let out = run_with_deadline("inline", None, || Ok(7u32)).unwrap();
    assert_eq!(out, 7);
}

#[test]
fn fast_call_returns_value() {
    let out = run_with_deadline("fast", Some(Duration::from_secs(5)), || Ok("done")).unwrap();
    assert_eq!(out, "done");
}

#[test]
fn errors_propagate_unchanged() {
    let err = run_with_deadline::<(), _>("failing", Some(Duration::from_secs(5)), || {
        Err(SlidecastError::validation("nope"))
    })
    .unwrap_err();
    assert!(matches!(err, SlidecastError::Validation(_)));
}

#[test]
fn slow_call_times_out() {
    let err = run_with_deadline("slow", Some(Duration::from_millis(20)), || {
        std::thread::sleep(Duration::from_millis(500));
        Ok(())
    })
    .unwrap_err();
    match err {
        SlidecastError::Timeout { operation, after } => {
            assert_eq!(operation, "slow");
            assert_eq!(after, Duration::from_millis(20));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
fn cancel_token_is_shared() {
    let token = CancelToken::new();
    let clone = token.clone();
    assert!(token.check().is_ok());
    clone.cancel();
    assert!(token.is_cancelled());
    assert!(matches!(token.check(), Err(SlidecastError::Cancelled)));
}
