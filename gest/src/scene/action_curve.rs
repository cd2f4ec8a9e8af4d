use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveType {
    Bezier,
    Exponential,
}

impl CurveType {
    /// Unknown names fall back to [CurveType::Bezier].
    pub fn from_name(name: &str) -> Self {
        match name {
            "EXPO" => CurveType::Exponential,
            _ => CurveType::Bezier,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHandleType {
    AutoClamped,
}

impl KeyHandleType {
    pub fn from_name(_name: &str) -> Self {
        KeyHandleType::AutoClamped
    }
}

/// One key of an animation curve: a point `(x, y)` plus its two handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub curve_type: CurveType,
    pub left_handle_type: KeyHandleType,
    pub right_handle_type: KeyHandleType,
    pub hlx: f32,
    pub hly: f32,
    pub hrx: f32,
    pub hry: f32,
    pub x: f32,
    pub y: f32,
}

/// A scalar function of the frame number, keyed like an animation F-curve.
#[derive(Debug, Clone, Default)]
pub struct ActionCurve {
    keyframes: Vec<Keyframe>,
    // frame -> index of the key starting the span containing it
    lut: Vec<usize>,
    min_y: f32,
    max_y: f32,
}

impl ActionCurve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_key(&mut self, key: Keyframe) {
        self.keyframes.push(key);
        self.refresh();
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    fn refresh(&mut self) {
        if self.keyframes.len() < 2 {
            return;
        }

        self.keyframes
            .sort_by(|l, r| l.x.partial_cmp(&r.x).unwrap_or(Ordering::Equal));

        self.min_y = self
            .keyframes
            .iter()
            .map(|k| k.y)
            .fold(f32::INFINITY, f32::min);
        self.max_y = self
            .keyframes
            .iter()
            .map(|k| k.y)
            .fold(f32::NEG_INFINITY, f32::max);

        let last_frame = self.keyframes[self.keyframes.len() - 1].x.max(0.0) as usize;
        self.lut = vec![0; last_frame];
        let mut j = 0;
        for frame in 0..last_frame {
            while j + 2 < self.keyframes.len() && frame as f32 >= self.keyframes[j + 1].x {
                j += 1;
            }
            self.lut[frame] = j;
        }
    }

    /// Evaluates the curve at `frame`; frames outside the keyed range clamp to the end keys.
    /// With `normalized`, the result is rescaled so the key values span `0..1`.
    pub fn eval_at_frame(&self, frame: i32, normalized: bool) -> f32 {
        let y = match self.keyframes.len() {
            0 => return 0.0,
            1 => self.keyframes[0].y,
            len => {
                let first = &self.keyframes[0];
                let last = &self.keyframes[len - 1];
                if frame as f32 <= first.x {
                    first.y
                } else if frame as f32 >= last.x || frame as usize >= self.lut.len() {
                    last.y
                } else {
                    let j = self.lut[frame as usize];
                    let a = &self.keyframes[j];
                    let b = &self.keyframes[j + 1];
                    let span = b.x - a.x;
                    if span <= 0.0 {
                        b.y
                    } else {
                        let t = (frame as f32 - a.x) / span;
                        let tm = 1.0 - t;
                        tm * tm * tm * a.y
                            + 3.0 * t * tm * tm * a.hry
                            + 3.0 * t * t * tm * b.hly
                            + t * t * t * b.y
                    }
                }
            }
        };

        if normalized {
            let range = self.max_y - self.min_y;
            if range > 0.0 {
                (y - self.min_y) / range
            } else {
                0.0
            }
        } else {
            y
        }
    }
}
