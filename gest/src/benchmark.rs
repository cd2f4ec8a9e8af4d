use crate::*;
use std::convert::TryFrom;
use std::fmt;

pub const EXTRA_API_LEVEL: &str = "glesApiLevel";
pub const EXTRA_NUM_OBJECTS: &str = "numObjects";
pub const EXTRA_FINISHED: &str = "finished";
pub const EXTRA_RESULT_FPS: &str = "resultFps";
pub const EXTRA_GLES_VERSION: &str = "glesVersion";

pub const DEFAULT_API_LEVEL: i32 = 2;
pub const DEFAULT_OBJECT_COUNT: i32 = 1000;

/// GPU API tier a benchmark runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApiLevel {
    Gles2,
    Gles3,
}

impl ApiLevel {
    pub const ALL: [ApiLevel; 2] = [ApiLevel::Gles2, ApiLevel::Gles3];
}

impl TryFrom<i32> for ApiLevel {
    type Error = BenchmarkError;

    fn try_from(level: i32) -> Result<Self, Self::Error> {
        match level {
            2 => Ok(ApiLevel::Gles2),
            3 => Ok(ApiLevel::Gles3),
            _ => Err(BenchmarkError::InvalidApiLevel(level)),
        }
    }
}

impl From<ApiLevel> for i32 {
    fn from(api: ApiLevel) -> i32 {
        match api {
            ApiLevel::Gles2 => 2,
            ApiLevel::Gles3 => 3,
        }
    }
}

impl fmt::Display for ApiLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GLES{}", i32::from(*self))
    }
}

/// Parameters handed from the launcher to the benchmark screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkRequest {
    pub api_level: ApiLevel,
    pub object_count: u32,
}

impl BenchmarkRequest {
    /// Reads launch extras, falling back to API level 2 and 1000 objects.
    pub fn from_extras(extras: &ValueMap) -> Result<Self, BenchmarkError> {
        let level = extras
            .get(EXTRA_API_LEVEL)
            .and_then(Value::as_i32)
            .unwrap_or(DEFAULT_API_LEVEL);
        let count = extras
            .get(EXTRA_NUM_OBJECTS)
            .and_then(Value::as_i32)
            .unwrap_or(DEFAULT_OBJECT_COUNT);
        BenchmarkRequest::new(level, count)
    }

    pub fn new(api_level: i32, object_count: i32) -> Result<Self, BenchmarkError> {
        let request = BenchmarkRequest {
            api_level: ApiLevel::try_from(api_level)?,
            object_count: object_count.max(0) as u32,
        };
        if object_count <= 0 {
            return Err(BenchmarkError::InvalidObjectCount(object_count));
        }
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), BenchmarkError> {
        if self.object_count == 0 {
            return Err(BenchmarkError::InvalidObjectCount(0));
        }
        Ok(())
    }

    pub fn to_extras(&self) -> ValueMap {
        let mut extras = ValueMap::new();
        extras.insert(
            EXTRA_API_LEVEL.to_string(),
            Value::Number(i32::from(self.api_level) as f64),
        );
        extras.insert(
            EXTRA_NUM_OBJECTS.to_string(),
            Value::Number(self.object_count as f64),
        );
        extras
    }
}

/// Outcome of a finished run, returned to the launcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkResult {
    pub fps: f32,
    pub api_level: ApiLevel,
    pub object_count: u32,
}

impl BenchmarkResult {
    pub fn to_extras(&self) -> ValueMap {
        let mut extras = ValueMap::new();
        extras.insert(EXTRA_FINISHED.to_string(), Value::Bool(true));
        extras.insert(EXTRA_RESULT_FPS.to_string(), Value::Number(self.fps as f64));
        extras.insert(
            EXTRA_NUM_OBJECTS.to_string(),
            Value::Number(self.object_count as f64),
        );
        extras.insert(
            EXTRA_GLES_VERSION.to_string(),
            Value::Number(i32::from(self.api_level) as f64),
        );
        extras
    }

    /// `None` unless the extras carry `finished = true` and a valid API level.
    pub fn from_extras(extras: &ValueMap) -> Option<Self> {
        if !extras.get(EXTRA_FINISHED)?.as_bool()? {
            return None;
        }
        let fps = extras
            .get(EXTRA_RESULT_FPS)
            .and_then(Value::as_f64)
            .unwrap_or(0.0) as f32;
        let object_count = extras
            .get(EXTRA_NUM_OBJECTS)
            .and_then(Value::as_i32)
            .unwrap_or(DEFAULT_OBJECT_COUNT)
            .max(0) as u32;
        let level = extras
            .get(EXTRA_GLES_VERSION)
            .and_then(Value::as_i32)
            .unwrap_or(DEFAULT_API_LEVEL);
        Some(BenchmarkResult {
            fps,
            api_level: ApiLevel::try_from(level).ok()?,
            object_count,
        })
    }
}

/// Where a benchmark stands between the launcher and the results board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionState {
    Idle,
    Configuring,
    Running(BenchmarkRequest),
    Completed(BenchmarkResult),
    Reported(BenchmarkResult),
    Cancelled,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Configuring => "configuring",
            SessionState::Running(_) => "running",
            SessionState::Completed(_) => "completed",
            SessionState::Reported(_) => "reported",
            SessionState::Cancelled => "cancelled",
        }
    }
}

/// Request/response state machine of one benchmark run.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            state: SessionState::Idle,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn invalid(&self, event: &'static str) -> BenchmarkError {
        BenchmarkError::InvalidTransition {
            from: self.state.name(),
            event,
        }
    }

    /// Parameters are being chosen. Also starts a new round after a report or cancel.
    pub fn configure(&mut self) -> Result<(), BenchmarkError> {
        match self.state {
            SessionState::Idle
            | SessionState::Configuring
            | SessionState::Reported(_)
            | SessionState::Cancelled => {
                self.state = SessionState::Configuring;
                Ok(())
            }
            _ => Err(self.invalid("configure")),
        }
    }

    pub fn launch(&mut self, request: BenchmarkRequest) -> Result<(), BenchmarkError> {
        if self.state != SessionState::Configuring {
            return Err(self.invalid("launch"));
        }
        request.validate()?;
        self.state = SessionState::Running(request);
        Ok(())
    }

    /// Records the measured fps. Returns `false` when the run had already completed.
    pub fn complete(&mut self, fps: f32) -> Result<bool, BenchmarkError> {
        match self.state {
            SessionState::Running(request) => {
                self.state = SessionState::Completed(BenchmarkResult {
                    fps: fps.max(0.0),
                    api_level: request.api_level,
                    object_count: request.object_count,
                });
                Ok(true)
            }
            SessionState::Completed(_) | SessionState::Reported(_) => Ok(false),
            _ => Err(self.invalid("complete")),
        }
    }

    pub fn report(&mut self) -> Result<BenchmarkResult, BenchmarkError> {
        match self.state {
            SessionState::Completed(result) => {
                self.state = SessionState::Reported(result);
                Ok(result)
            }
            _ => Err(self.invalid("report")),
        }
    }

    /// Discards an in-flight run.
    pub fn cancel(&mut self) -> Result<(), BenchmarkError> {
        match self.state {
            SessionState::Running(_) => {
                self.state = SessionState::Cancelled;
                Ok(())
            }
            _ => Err(self.invalid("cancel")),
        }
    }
}
