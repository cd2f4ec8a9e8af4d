use gest::*;
use std::convert::TryFrom;

fn request(api_level: i32, object_count: i32) -> BenchmarkRequest {
    BenchmarkRequest::new(api_level, object_count).unwrap()
}

#[test]
fn test_api_level() {
    assert_eq!(ApiLevel::try_from(2), Ok(ApiLevel::Gles2));
    assert_eq!(ApiLevel::try_from(3), Ok(ApiLevel::Gles3));
    assert_eq!(
        ApiLevel::try_from(1),
        Err(BenchmarkError::InvalidApiLevel(1))
    );
    assert_eq!(i32::from(ApiLevel::Gles3), 3);
    assert_eq!(ApiLevel::Gles2.to_string(), "GLES2");
}

#[test]
fn test_request_from_extras() {
    let request = BenchmarkRequest::from_extras(&ValueMap::new()).unwrap();
    assert_eq!(request.api_level, ApiLevel::Gles2);
    assert_eq!(request.object_count, 1000);

    let mut extras = ValueMap::new();
    extras.insert(EXTRA_API_LEVEL.to_string(), Value::Number(3.0));
    extras.insert(EXTRA_NUM_OBJECTS.to_string(), Value::Number(5000.0));
    let request = BenchmarkRequest::from_extras(&extras).unwrap();
    assert_eq!(request.api_level, ApiLevel::Gles3);
    assert_eq!(request.object_count, 5000);
    assert_eq!(BenchmarkRequest::from_extras(&request.to_extras()), Ok(request));

    extras.insert(EXTRA_NUM_OBJECTS.to_string(), Value::Number(0.0));
    assert_eq!(
        BenchmarkRequest::from_extras(&extras),
        Err(BenchmarkError::InvalidObjectCount(0))
    );
    extras.insert(EXTRA_API_LEVEL.to_string(), Value::Number(4.0));
    assert_eq!(
        BenchmarkRequest::from_extras(&extras),
        Err(BenchmarkError::InvalidApiLevel(4))
    );
}

#[test]
fn test_result_extras() {
    let result = BenchmarkResult {
        fps: 42.5,
        api_level: ApiLevel::Gles3,
        object_count: 5000,
    };
    let extras = result.to_extras();
    assert_eq!(extras.get(EXTRA_FINISHED), Some(&Value::Bool(true)));
    assert_eq!(extras.get(EXTRA_GLES_VERSION), Some(&Value::Number(3.0)));
    assert_eq!(BenchmarkResult::from_extras(&extras), Some(result));

    let mut unfinished = extras.clone();
    unfinished.insert(EXTRA_FINISHED.to_string(), Value::Bool(false));
    assert_eq!(BenchmarkResult::from_extras(&unfinished), None);
    unfinished.remove(EXTRA_FINISHED);
    assert_eq!(BenchmarkResult::from_extras(&unfinished), None);
}

#[test]
fn test_session_lifecycle() {
    let mut session = Session::new();
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.launch(request(2, 10)).is_err());

    session.configure().unwrap();
    session.launch(request(3, 2000)).unwrap();
    assert_eq!(session.state(), SessionState::Running(request(3, 2000)));
    assert!(session.report().is_err());

    assert_eq!(session.complete(55.0), Ok(true));
    assert_eq!(session.complete(12.0), Ok(false));
    let result = session.report().unwrap();
    assert_eq!(result.fps, 55.0);
    assert_eq!(result.api_level, ApiLevel::Gles3);
    assert_eq!(result.object_count, 2000);
    assert_eq!(session.state(), SessionState::Reported(result));
    assert_eq!(session.complete(1.0), Ok(false));

    match session.cancel() {
        Err(BenchmarkError::InvalidTransition { from, event }) => {
            assert_eq!(from, "reported");
            assert_eq!(event, "cancel");
        }
        other => panic!("unexpected {:?}", other),
    }

    session.configure().unwrap();
    assert_eq!(session.state(), SessionState::Configuring);
}

#[test]
fn test_session_cancel() {
    let mut session = Session::new();
    assert!(session.cancel().is_err());
    assert!(session.complete(30.0).is_err());

    session.configure().unwrap();
    session.launch(request(2, 1000)).unwrap();
    assert!(session.configure().is_err());
    session.cancel().unwrap();
    assert_eq!(session.state(), SessionState::Cancelled);
    assert!(session.complete(30.0).is_err());
    session.configure().unwrap();
}

#[test]
fn test_screen_reports_once() {
    let (mut screen, mut sender) = BenchmarkScreen::launch(&request(3, 5000).to_extras()).unwrap();
    assert_eq!(screen.request(), &request(3, 5000));
    assert_eq!(screen.poll(), None);

    let render = std::thread::spawn(move || sender.complete(42.5));
    assert!(render.join().unwrap());

    let extras = screen.poll().unwrap();
    assert_eq!(
        BenchmarkResult::from_extras(&extras),
        Some(BenchmarkResult {
            fps: 42.5,
            api_level: ApiLevel::Gles3,
            object_count: 5000,
        })
    );
    assert_eq!(screen.poll(), None);
    assert!(matches!(screen.state(), SessionState::Reported(_)));

    screen.destroy();
    assert!(matches!(screen.state(), SessionState::Reported(_)));
}

#[test]
fn test_screen_cancelled() {
    let (mut screen, sender) = BenchmarkScreen::launch(&ValueMap::new()).unwrap();
    drop(sender);
    assert_eq!(screen.poll(), None);
    assert_eq!(screen.state(), SessionState::Cancelled);

    let (mut screen, _sender) = BenchmarkScreen::launch(&ValueMap::new()).unwrap();
    screen.destroy();
    assert_eq!(screen.state(), SessionState::Cancelled);
    assert_eq!(screen.poll(), None);
}

#[test]
fn test_screen_rejects_bad_extras() {
    let mut extras = ValueMap::new();
    extras.insert(EXTRA_NUM_OBJECTS.to_string(), Value::Number(-5.0));
    assert_eq!(
        BenchmarkScreen::launch(&extras).err(),
        Some(BenchmarkError::InvalidObjectCount(-5))
    );
}

#[test]
fn test_value_map_from_json() {
    let json: serde_json::Value =
        serde_json::from_str(r#"{"finished": true, "resultFps": 41.5, "name": "x", "skip": null, "list": [1]}"#)
            .unwrap();
    let map = value_map_from_json(&json);
    assert_eq!(map.len(), 3);
    assert_eq!(map["finished"].as_bool(), Some(true));
    assert_eq!(map["resultFps"].as_f64(), Some(41.5));
    assert_eq!(map["name"].as_str(), Some("x"));
}
