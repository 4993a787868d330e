use super::*;

#[test]
fn audio_track_rejects_non_positive_duration() {
    assert!(AudioTrack::new("a.wav", 0.0).is_err());
    assert!(AudioTrack::new("a.wav", -1.0).is_err());
    assert!(AudioTrack::new("a.wav", f64::NAN).is_err());
    let t = AudioTrack::new("a.wav", 12.5).unwrap();
    assert_eq!(t.duration_secs(), 12.5);
    assert_eq!(t.path(), Path::new("a.wav"));
}

#[test]
fn scratch_track_removes_file_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("narration.wav");
    std::fs::write(&path, b"RIFF").unwrap();

    let track = AudioTrack::scratch(&path, 1.0).unwrap();
    assert!(path.exists());
    drop(track);
    assert!(!path.exists());
}

#[test]
fn borrowed_track_keeps_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keep.wav");
    std::fs::write(&path, b"RIFF").unwrap();
    drop(AudioTrack::new(&path, 1.0).unwrap());
    assert!(path.exists());
}

#[test]
fn blank_script_is_an_audio_error() {
    let dir = tempfile::tempdir().unwrap();
    let synth = CommandSynthesizer::new(NarrationConfig::default());
    let doc_script = NarrationScript::build(&crate::content::model::ContentDocument {
        topic: "t".into(),
        title: "t".into(),
        description: "   ".into(),
        sections: vec![],
        key_points: vec![],
        learning_objectives: vec![],
        fun_facts: vec![],
        language: "en".into(),
        depth: crate::content::model::Depth::Basic,
    });
    let err = synth.synthesize(&doc_script, dir.path()).unwrap_err();
    assert!(matches!(
        err,
        SlidecastError::Synthesis {
            stage: SynthesisStage::Audio,
            ..
        }
    ));
}

#[test]
fn missing_tts_command_is_an_audio_error() {
    let dir = tempfile::tempdir().unwrap();
    let synth = CommandSynthesizer::new(NarrationConfig {
        command: "slidecast-definitely-missing-tts".into(),
        ..NarrationConfig::default()
    });
    let doc_script = NarrationScript::build(&crate::content::model::ContentDocument {
        topic: "t".into(),
        title: "t".into(),
        description: "Hello there.".into(),
        sections: vec![],
        key_points: vec![],
        learning_objectives: vec![],
        fun_facts: vec![],
        language: "en".into(),
        depth: crate::content::model::Depth::Basic,
    });
    let err = synth.synthesize(&doc_script, dir.path()).unwrap_err();
    assert!(matches!(
        err,
        SlidecastError::Synthesis {
            stage: SynthesisStage::Audio,
            ..
        }
    ));
    // The script scratch file is cleaned up even on failure.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
