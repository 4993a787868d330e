use super::*;

fn fps30() -> Fps {
    Fps::new(30, 1).unwrap()
}

#[test]
fn three_sections_over_ninety_seconds() {
    let plan = TimelinePlan::uniform(5, 90.0, 5.0, fps30()).unwrap();
    assert_eq!(plan.slots.len(), 5);
    for (i, slot) in plan.slots.iter().enumerate() {
        assert_eq!(slot.frame, Some(i));
        assert!((slot.duration_secs - 18.0).abs() < 1e-9);
        assert_eq!(slot.frame_span(), 540);
    }
    assert_eq!(plan.total_frames, 2700);
    assert!((plan.slots[4].end_secs() - 90.0).abs() < 1e-12);
}

#[test]
fn empty_sequence_uses_fallback() {
    let plan = TimelinePlan::uniform(0, 42.0, 5.0, fps30()).unwrap();
    assert!(plan.is_blank());
    assert_eq!(plan.slots.len(), 1);
    assert_eq!(plan.total_secs, 5.0);
    assert_eq!(plan.total_frames, 150);
    assert_eq!(plan.slots[0].frame_span(), 150);
}

#[test]
fn uneven_split_has_no_drift() {
    let fps = Fps::new(30000, 1001).unwrap();
    for (n, d) in [(7usize, 61.37), (3, 10.0), (11, 1.0), (2, 0.05)] {
        let plan = TimelinePlan::uniform(n, d, 5.0, fps).unwrap();
        let durations: f64 = plan.slots.iter().map(|s| s.duration_secs).sum();
        assert!((durations - d).abs() < 1e-9, "n={n} d={d}");

        let spans: u64 = plan.slots.iter().map(Slot::frame_span).sum();
        assert_eq!(spans, plan.total_frames);
        assert_eq!(plan.total_frames, fps.secs_to_frames_round(d));
        for pair in plan.slots.windows(2) {
            assert_eq!(pair[0].end_frame, pair[1].start_frame);
        }
    }
}

#[test]
fn slot_lookup_by_video_frame() {
    let plan = TimelinePlan::uniform(2, 2.0, 5.0, fps30()).unwrap();
    assert_eq!(plan.slot_at_frame(0).and_then(|s| s.frame), Some(0));
    assert_eq!(plan.slot_at_frame(29).and_then(|s| s.frame), Some(0));
    assert_eq!(plan.slot_at_frame(30).and_then(|s| s.frame), Some(1));
    assert!(plan.slot_at_frame(60).is_none());
}

#[test]
fn invalid_durations_are_rejected() {
    assert!(TimelinePlan::uniform(3, 0.0, 5.0, fps30()).is_err());
    assert!(TimelinePlan::uniform(3, f64::INFINITY, 5.0, fps30()).is_err());
    assert!(TimelinePlan::uniform(0, 10.0, -1.0, fps30()).is_err());
}

#[test]
fn short_narration_over_many_frames_hides_some() {
    // 10 slots of 0.01 s at 30 fps: each is a third of a video frame.
    let plan = TimelinePlan::uniform(10, 0.1, 5.0, fps30()).unwrap();
    assert_eq!(plan.total_frames, 3);
    let hidden: Vec<usize> = plan.hidden_frames().collect();
    assert_eq!(hidden.len(), 7);
    let shown: Vec<usize> = plan
        .slots
        .iter()
        .filter(|s| s.frame_span() > 0)
        .filter_map(|s| s.frame)
        .collect();
    assert_eq!(shown.len(), 3);
    assert!(shown.iter().all(|i| !hidden.contains(i)));
}

#[test]
fn regular_plans_hide_nothing() {
    assert_eq!(TimelinePlan::uniform(5, 90.0, 5.0, fps30()).unwrap().hidden_frames().count(), 0);
    assert_eq!(TimelinePlan::uniform(0, 0.0, 5.0, fps30()).unwrap().hidden_frames().count(), 0);
}
