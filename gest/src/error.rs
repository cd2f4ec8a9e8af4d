use std::fmt;

/// Failure to fetch a named asset from an [AssetSource](crate::AssetSource).
#[derive(Debug)]
pub enum AssetError {
    NotFound(String),
    Io(String, std::io::Error),
    Image(String, image::ImageError),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AssetError::NotFound(name) => write!(f, "asset '{}' not found", name),
            AssetError::Io(name, err) => write!(f, "can't read asset '{}' ({})", name, err),
            AssetError::Image(name, err) => write!(f, "can't decode image '{}' ({})", name, err),
        }
    }
}

impl std::error::Error for AssetError {}

/// Failure while loading a scene or one of its models.
#[derive(Debug)]
pub enum SceneError {
    Asset(AssetError),
    Obj { model: String, line: usize, reason: String },
    UndefinedHandle(u32),
    UndefinedCurve(String),
    UndefinedParticles(String),
    NoAnimationFrames,
    NotGenuine(usize),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SceneError::Asset(err) => write!(f, "{}", err),
            SceneError::Obj {
                model,
                line,
                reason,
            } => write!(f, "model '{}' line {}: {}", model, line, reason),
            SceneError::UndefinedHandle(handle) => write!(f, "undefined entity handle {}", handle),
            SceneError::UndefinedCurve(name) => write!(f, "undefined curve '{}'", name),
            SceneError::UndefinedParticles(name) => {
                write!(f, "undefined particle system '{}'", name)
            }
            SceneError::NoAnimationFrames => write!(f, "scene has no animation frames"),
            SceneError::NotGenuine(count) => write!(
                f,
                "expected exactly one gpu_text entity, found {}",
                count
            ),
        }
    }
}

impl std::error::Error for SceneError {}

impl From<AssetError> for SceneError {
    fn from(err: AssetError) -> SceneError {
        SceneError::Asset(err)
    }
}

/// Failure to bring up the GPU for a requested API level.
#[derive(Debug)]
pub enum RenderError {
    Window(winit::error::OsError),
    CreateSurface(wgpu::CreateSurfaceError),
    NoAdapter,
    RequestDevice(wgpu::RequestDeviceError),
    Unsupported(crate::ApiLevel),
    Surface(wgpu::SurfaceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RenderError::Window(err) => write!(f, "can't open window ({})", err),
            RenderError::CreateSurface(err) => write!(f, "can't create surface ({})", err),
            RenderError::NoAdapter => write!(f, "no compatible graphics adapter"),
            RenderError::RequestDevice(err) => write!(f, "can't create device ({})", err),
            RenderError::Unsupported(api) => write!(f, "{} is not supported here", api),
            RenderError::Surface(err) => write!(f, "surface lost ({})", err),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(err: wgpu::SurfaceError) -> RenderError {
        RenderError::Surface(err)
    }
}

/// Rejected benchmark parameters or session transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum BenchmarkError {
    InvalidApiLevel(i32),
    InvalidObjectCount(i32),
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },
}

impl fmt::Display for BenchmarkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BenchmarkError::InvalidApiLevel(level) => {
                write!(f, "API level must be 2 or 3, got {}", level)
            }
            BenchmarkError::InvalidObjectCount(count) => {
                write!(f, "object count must be positive, got {}", count)
            }
            BenchmarkError::InvalidTransition { from, event } => {
                write!(f, "can't {} while {}", event, from)
            }
        }
    }
}

impl std::error::Error for BenchmarkError {}

#[derive(Debug)]
pub enum JsonError {
    Serde(serde_json::error::Error),
    Io(std::io::Error),
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JsonError::Serde(err) => write!(f, "invalid JSON ({})", err),
            JsonError::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for JsonError {}

impl From<serde_json::error::Error> for JsonError {
    fn from(err: serde_json::error::Error) -> JsonError {
        JsonError::Serde(err)
    }
}

impl From<std::io::Error> for JsonError {
    fn from(err: std::io::Error) -> JsonError {
        JsonError::Io(err)
    }
}
