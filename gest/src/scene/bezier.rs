use crate::*;
use cgmath::{InnerSpace, Vector3, Zero};

/// Control point of a poly-Bezier path with its incoming and outgoing handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierPoint {
    pub left: Vector3<f32>,
    pub right: Vector3<f32>,
    pub coord: Vector3<f32>,
}

/// A piecewise cubic path that particles follow.
///
/// Evaluate by curve parameter with [eval_simple](BezierCurve::eval_simple) or, once
/// [precalc_arclengths](BezierCurve::precalc_arclengths) ran, by normalized arc length
/// with [eval_arclen](BezierCurve::eval_arclen).
#[derive(Debug, Clone, Default)]
pub struct BezierCurve {
    points: Vec<BezierPoint>,
    arclength_lut: Vec<f32>,
    action: ActionCurve,
}

impl BezierCurve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `point` at `index`, growing the curve as needed.
    pub fn set_point(&mut self, index: usize, point: BezierPoint) {
        if index >= self.points.len() {
            self.points.resize(index + 1, point);
        }
        self.points[index] = point;
    }

    pub fn points(&self) -> &[BezierPoint] {
        &self.points
    }

    pub fn action(&self) -> &ActionCurve {
        &self.action
    }

    pub fn action_mut(&mut self) -> &mut ActionCurve {
        &mut self.action
    }

    fn eval_element(&self, pt: usize, t: f32) -> Vector3<f32> {
        let a = &self.points[pt];
        let b = &self.points[pt + 1];
        let ta = 1.0 - t;
        let c0 = ta * ta * ta;
        let c1 = 3.0 * ta * ta * t;
        let c2 = 3.0 * ta * t * t;
        let c3 = t * t * t;
        a.coord * c0 + a.right * c1 + b.left * c2 + b.coord * c3
    }

    /// Evaluates at curve parameter `t` in `0..=1`, spread evenly across segments.
    pub fn eval_simple(&self, t: f32) -> Vector3<f32> {
        match self.points.len() {
            0 => Vector3::zero(),
            1 => self.points[0].coord,
            n => {
                let scaled = t.max(0.0) * (n - 1) as f32;
                let segment = scaled as usize;
                if segment >= n - 1 {
                    self.eval_element(n - 2, 1.0)
                } else {
                    self.eval_element(segment, scaled - segment as f32)
                }
            }
        }
    }

    /// Evaluates at normalized arc length `s` in `0..=1`.
    pub fn eval_arclen(&self, s: f32) -> Vector3<f32> {
        self.eval_simple(self.arc_length_indexed(s))
    }

    /// Builds a `2^power`-entry table mapping arc length back to curve parameter.
    pub fn precalc_arclengths(&mut self, power: u32) {
        let count = 1usize << power;

        let mut lengths = Vec::with_capacity(count);
        lengths.push(0.0f32);
        let mut last = self.eval_simple(0.0);
        for i in 1..count {
            let p = self.eval_simple(i as f32 / count as f32);
            let total = lengths[i - 1] + (p - last).magnitude();
            lengths.push(total);
            last = p;
        }

        let total = lengths[count - 1];
        if total <= 0.0 {
            self.arclength_lut = (0..count).map(|i| i as f32 / count as f32).collect();
            return;
        }

        let mut lut = vec![0.0f32; count];
        for (i, length) in lengths.iter().enumerate() {
            let bucket = ((length / total) * (count - 1) as f32) as usize;
            lut[bucket.min(count - 1)] = i as f32 / count as f32;
        }

        // Unset buckets lie between two set ones; interpolate across the gap.
        for i in 1..count {
            if lut[i] != 0.0 {
                continue;
            }
            let mut left = i - 1;
            while left > 0 && lut[left] == 0.0 {
                left -= 1;
            }
            let mut right = i + 1;
            while right < count && lut[right] == 0.0 {
                right += 1;
            }
            let value_left = lut[left];
            let value_right = if right < count { lut[right] } else { 1.0 };
            let w = (i - left) as f32 / (right - left) as f32;
            lut[i] = value_left + (value_right - value_left) * w;
        }

        self.arclength_lut = lut;
    }

    fn arc_length_indexed(&self, s: f32) -> f32 {
        if s <= 0.0 || self.arclength_lut.is_empty() {
            return s.max(0.0);
        }
        let count = self.arclength_lut.len();
        let raw = s * count as f32;
        let index = (raw as usize).min(count - 1);
        let offset = (raw - index as f32).min(1.0);
        let right = (index + 1).min(count - 1);
        (1.0 - offset) * self.arclength_lut[index] + offset * self.arclength_lut[right]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_without_table_is_identity() {
        let curve = BezierCurve::new();
        assert_eq!(curve.arc_length_indexed(0.25), 0.25);
    }
}
