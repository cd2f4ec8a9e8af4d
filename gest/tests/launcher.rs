use gest::*;

fn finished(api_level: ApiLevel, object_count: u32, fps: f32) -> ValueMap {
    BenchmarkResult {
        fps,
        api_level,
        object_count,
    }
    .to_extras()
}

#[test]
fn test_format_result() {
    assert_eq!(format_result(5000, 42.5), "5,000 objects: 42.5 fps");
    assert_eq!(format_result(999, 60.0), "999 objects: 60.0 fps");
    assert_eq!(format_result(1_234_567, 12.345), "1,234,567 objects: 12.3 fps");
}

#[test]
fn test_result_updates_one_level() {
    let mut board = ResultsBoard::new();
    assert_eq!(board.display(ApiLevel::Gles2), None);
    assert_eq!(board.result(ApiLevel::Gles3).objects, 1000);

    assert!(board.on_activity_result(Some(&finished(ApiLevel::Gles3, 5000, 42.5))));
    assert_eq!(
        board.display(ApiLevel::Gles3),
        Some("5,000 objects: 42.5 fps".to_string())
    );
    assert_eq!(board.display(ApiLevel::Gles2), None);
    assert_eq!(*board.result(ApiLevel::Gles2), ApiResult::default());
}

#[test]
fn test_unfinished_result_ignored() {
    let mut board = ResultsBoard::new();
    board.set_last_fps(20.0, ApiLevel::Gles2, 3000);
    let before = board.clone();

    assert!(!board.on_activity_result(None));
    let mut extras = finished(ApiLevel::Gles2, 9000, 59.0);
    extras.insert(EXTRA_FINISHED.to_string(), Value::Bool(false));
    assert!(!board.on_activity_result(Some(&extras)));
    assert!(!board.on_activity_result(Some(&ValueMap::new())));
    assert_eq!(board, before);
}

#[test]
fn test_save_and_restore() {
    let mut board = ResultsBoard::new();
    board.set_last_fps(33.3, ApiLevel::Gles2, 2000);
    let state = board.save();
    assert!(state.gles2_ran);
    assert!(!state.gles3_ran);

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["gles2Ran"], serde_json::json!(true));
    assert_eq!(json["gles2FpsObjects"], serde_json::json!(2000));

    let mut restored = ResultsBoard::new();
    restored.set_last_fps(50.0, ApiLevel::Gles3, 7000);
    restored.restore(&state);
    assert_eq!(restored.result(ApiLevel::Gles2), board.result(ApiLevel::Gles2));
    assert_eq!(restored.result(ApiLevel::Gles3).fps, 50.0);
}

#[test]
fn test_saved_state_file() {
    let mut path = std::env::temp_dir();
    path.push(format!("gest-launcher-{}.json", std::process::id()));

    let mut board = ResultsBoard::new();
    board.set_last_fps(42.5, ApiLevel::Gles3, 5000);
    board.save().to_file(&path).unwrap();

    let state = SavedState::from_file(&path).unwrap();
    let mut restored = ResultsBoard::new();
    restored.restore(&state);
    assert_eq!(restored, board);
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(SavedState::from_file(&path), Err(JsonError::Io(_))));
}

#[test]
fn test_partial_saved_state() {
    let state: SavedState = serde_json::from_str(r#"{"gles3Ran": true, "gles3Fps": 12.5}"#).unwrap();
    assert!(!state.gles2_ran);
    assert_eq!(state.gles3_fps, 12.5);
    assert_eq!(state.gles3_fps_objects, 1000);

    let mut board = ResultsBoard::new();
    board.restore(&state);
    assert_eq!(
        board.display(ApiLevel::Gles3),
        Some("1,000 objects: 12.5 fps".to_string())
    );
    assert_eq!(board.display(ApiLevel::Gles2), None);
}

#[test]
fn test_default_saved_state_matches_new_board() {
    assert_eq!(ResultsBoard::new().save(), SavedState::default());
    assert_eq!(SavedState::default().gles2_fps_objects, 1000);

    let state: SavedState = serde_json::from_str("{}").unwrap();
    assert_eq!(state, SavedState::default());
}

#[test]
fn test_object_slider() {
    let slider = ObjectSlider::default();
    assert_eq!(slider.objects(), 1000);
    let slider = ObjectSlider { progress: 25 };
    assert_eq!(slider.objects(), 25_000);
    assert_eq!(slider.label(), "25,000 objects");
}

#[test]
fn test_about_text() {
    assert_eq!(about_text("Gest", Some("1.2.0")), "Gest\nVersion 1.2.0");
    assert_eq!(about_text("Gest", Some("nightly")), "Gest\nnightly");
    assert_eq!(about_text("Gest", None), "Gest");
}
