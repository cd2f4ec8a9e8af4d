use crate::*;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Objects per unit of slider progress.
pub const OBJECTS_PER_STEP: u32 = 1000;

/// Last known result for one API level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApiResult {
    pub ran: bool,
    pub fps: f32,
    pub objects: u32,
}

impl Default for ApiResult {
    fn default() -> Self {
        ApiResult {
            ran: false,
            fps: 0.0,
            objects: DEFAULT_OBJECT_COUNT as u32,
        }
    }
}

/// Persisted form of a [ResultsBoard].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedState {
    #[serde(rename = "gles2Ran")]
    pub gles2_ran: bool,
    #[serde(rename = "gles2Fps")]
    pub gles2_fps: f32,
    #[serde(rename = "gles2FpsObjects")]
    pub gles2_fps_objects: u32,
    #[serde(rename = "gles3Ran")]
    pub gles3_ran: bool,
    #[serde(rename = "gles3Fps")]
    pub gles3_fps: f32,
    #[serde(rename = "gles3FpsObjects")]
    pub gles3_fps_objects: u32,
}

impl Default for SavedState {
    fn default() -> Self {
        SavedState {
            gles2_ran: false,
            gles2_fps: 0.0,
            gles2_fps_objects: DEFAULT_OBJECT_COUNT as u32,
            gles3_ran: false,
            gles3_fps: 0.0,
            gles3_fps_objects: DEFAULT_OBJECT_COUNT as u32,
        }
    }
}

impl SavedState {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, JsonError> {
        let mut data = String::new();
        let mut file = File::open(path)?;
        file.read_to_string(&mut data)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        let data = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }
}

/// The launcher's summary of the last run per API level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsBoard {
    gles2: ApiResult,
    gles3: ApiResult,
}

impl ResultsBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn result(&self, api: ApiLevel) -> &ApiResult {
        match api {
            ApiLevel::Gles2 => &self.gles2,
            ApiLevel::Gles3 => &self.gles3,
        }
    }

    fn result_mut(&mut self, api: ApiLevel) -> &mut ApiResult {
        match api {
            ApiLevel::Gles2 => &mut self.gles2,
            ApiLevel::Gles3 => &mut self.gles3,
        }
    }

    pub fn set_last_fps(&mut self, fps: f32, api: ApiLevel, objects: u32) {
        *self.result_mut(api) = ApiResult {
            ran: true,
            fps,
            objects,
        };
    }

    /// Text shown for `api`, or `None` if it never ran.
    pub fn display(&self, api: ApiLevel) -> Option<String> {
        let result = self.result(api);
        if result.ran {
            Some(format_result(result.objects, result.fps))
        } else {
            None
        }
    }

    /// Applies the extras returned by a benchmark screen. Returns whether anything changed.
    pub fn on_activity_result(&mut self, extras: Option<&ValueMap>) -> bool {
        match extras.and_then(BenchmarkResult::from_extras) {
            Some(result) => {
                info!(
                    "{}: {}",
                    result.api_level,
                    format_result(result.object_count, result.fps)
                );
                self.set_last_fps(result.fps, result.api_level, result.object_count);
                true
            }
            None => false,
        }
    }

    pub fn save(&self) -> SavedState {
        SavedState {
            gles2_ran: self.gles2.ran,
            gles2_fps: self.gles2.fps,
            gles2_fps_objects: self.gles2.objects,
            gles3_ran: self.gles3.ran,
            gles3_fps: self.gles3.fps,
            gles3_fps_objects: self.gles3.objects,
        }
    }

    /// Replays the levels that ran in `state`; the others keep their current value.
    pub fn restore(&mut self, state: &SavedState) {
        if state.gles2_ran {
            self.set_last_fps(state.gles2_fps, ApiLevel::Gles2, state.gles2_fps_objects);
        }
        if state.gles3_ran {
            self.set_last_fps(state.gles3_fps, ApiLevel::Gles3, state.gles3_fps_objects);
        }
    }
}

/// Formats a result line, e.g. `5,000 objects: 42.5 fps`.
pub fn format_result(objects: u32, fps: f32) -> String {
    format!("{} objects: {:.1} fps", group_thousands(objects), fps)
}

pub fn group_thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Object-count picker; each step adds [OBJECTS_PER_STEP] objects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectSlider {
    pub progress: u32,
}

impl Default for ObjectSlider {
    fn default() -> Self {
        ObjectSlider { progress: 1 }
    }
}

impl ObjectSlider {
    pub fn objects(&self) -> u32 {
        self.progress.saturating_mul(OBJECTS_PER_STEP)
    }

    pub fn label(&self) -> String {
        format!("{} objects", group_thousands(self.objects()))
    }
}

/// Body of the About dialog. A missing version is logged and left out.
pub fn about_text(name: &str, version: Option<&str>) -> String {
    match version {
        Some(version) if version.starts_with(|c: char| c.is_ascii_digit()) => {
            format!("{}\nVersion {}", name, version)
        }
        Some(version) => format!("{}\n{}", name, version),
        None => {
            error!("can't determine the application version");
            name.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
