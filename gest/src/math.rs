//!
//! Transform helpers for the right-handed, `-z`-forward convention used by scene files.
//!
use cgmath::{InnerSpace, Matrix, Matrix4, Rad, Vector3, Vector4};

/// Maps OpenGL clip space (z in -1..1) onto wgpu clip space (z in 0..1).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Orthonormal basis `(A, B, C)` where `C` points against `fwd`.
fn basis(fwd: Vector3<f32>, up: Vector3<f32>) -> (Vector3<f32>, Vector3<f32>, Vector3<f32>) {
    let b = up.normalize();
    let c = -fwd.normalize();
    let a = b.cross(c).normalize();
    let b = c.cross(a);
    (a, b, c)
}

fn basis_matrix(fwd: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    let (a, b, c) = basis(fwd, up);
    Matrix4::from_cols(a.extend(0.0), b.extend(0.0), c.extend(0.0), Vector4::unit_w())
}

/// Local-to-world transform of an object at `pos` looking along `fwd`.
pub fn frame_change(pos: Vector3<f32>, fwd: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    Matrix4::from_translation(pos) * basis_matrix(fwd, up)
}

/// Inverse of [frame_change], i.e. the view matrix of a camera.
pub fn model_view(pos: Vector3<f32>, fwd: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    basis_matrix(fwd, up).transpose() * Matrix4::from_translation(-pos)
}

/// Perspective projection from a horizontal field of view in degrees.
pub fn perspective(horiz_fov: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let fov = horiz_fov.to_radians();
    let r = near * (0.5 * fov).tan();
    let t = r / aspect;
    #[rustfmt::skip]
    let m = Matrix4::new(
        near / r, 0.0, 0.0, 0.0,
        0.0, near / t, 0.0, 0.0,
        0.0, 0.0, -(far + near) / (far - near), -1.0,
        0.0, 0.0, -2.0 * far * near / (far - near), 0.0,
    );
    m
}

/// Orthographic projection spanning `-right..right` horizontally.
pub fn orthographic(right: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let top = right / aspect;
    #[rustfmt::skip]
    let m = Matrix4::new(
        1.0 / right, 0.0, 0.0, 0.0,
        0.0, 1.0 / top, 0.0, 0.0,
        0.0, 0.0, -2.0 / (far - near), 0.0,
        0.0, 0.0, -(far + near) / (far - near), 1.0,
    );
    m
}

/// Rotates the frame `(fwd, up)` about `axis` and returns the new `(fwd, up)`.
pub fn rotate_frame(
    pos: Vector3<f32>,
    fwd: Vector3<f32>,
    up: Vector3<f32>,
    axis: Vector3<f32>,
    angle: f32,
) -> (Vector3<f32>, Vector3<f32>) {
    let current = frame_change(pos, fwd, up);
    let rotated = Matrix4::from_axis_angle(axis.normalize(), Rad(angle)) * current;
    let fwd = -rotated.z.truncate().normalize();
    let up = rotated.y.truncate().normalize();
    (fwd, up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{vec3, SquareMatrix};

    fn assert_close(a: Matrix4<f32>, b: Matrix4<f32>) {
        let a: &[f32; 16] = a.as_ref();
        let b: &[f32; 16] = b.as_ref();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-4, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn model_view_inverts_frame_change() {
        let pos = vec3(1.0, -2.0, 3.5);
        let fwd = vec3(0.3, -0.2, -1.0);
        let up = vec3(0.0, 1.0, 0.1);
        assert_close(frame_change(pos, fwd, up) * model_view(pos, fwd, up), Matrix4::identity());
    }

    #[test]
    fn identity_frame_looks_down_negative_z() {
        let m = frame_change(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, -1.0), vec3(0.0, 1.0, 0.0));
        assert_close(m, Matrix4::identity());
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let p = perspective(90.0, 1.0, 1.0, 10.0);
        let near = p * Vector4::new(0.0, 0.0, -1.0, 1.0);
        let far = p * Vector4::new(0.0, 0.0, -10.0, 1.0);
        assert!((near.z / near.w + 1.0).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
        let edge = p * Vector4::new(1.0, 0.0, -1.0, 1.0);
        assert!((edge.x / edge.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rotating_a_full_turn_restores_the_frame() {
        let pos = vec3(0.0, 0.0, 0.0);
        let mut fwd = vec3(0.0, 0.0, -1.0);
        let mut up = vec3(0.0, 1.0, 0.0);
        let axis = vec3(1.0, 1.0, 0.0);
        for _ in 0..4 {
            let (f, u) = rotate_frame(pos, fwd, up, axis, std::f32::consts::FRAC_PI_2);
            fwd = f;
            up = u;
        }
        assert!((fwd - vec3(0.0, 0.0, -1.0)).magnitude() < 1e-4);
        assert!((up - vec3(0.0, 1.0, 0.0)).magnitude() < 1e-4);
    }
}
