use crate::*;
use cgmath::{vec3, Matrix4, Vector3, Zero};
use log::warn;

pub type EntityHandle = u32;

/// `frames_to_live` of an entity that never expires.
pub const IMMORTAL: i32 = -1;

/// Anything placed in the world: cameras, lights, props and particles.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub renderable: bool,
    pub render_model: usize,
    pub pos: Vector3<f32>,
    pub fwd: Vector3<f32>,
    pub up: Vector3<f32>,
    pub scale: Vector3<f32>,

    frame_known: bool,
    last_frame: u32,
    pub frames_to_live: i32,
    pub live: bool,

    // particle state
    pub initial_offset: Vector3<f32>,
    pub spin_axis: Vector3<f32>,
    pub spin_period: i32,
}

impl Default for Entity {
    fn default() -> Self {
        Entity {
            renderable: true,
            render_model: 0,
            pos: Vector3::zero(),
            fwd: vec3(0.0, 0.0, -1.0),
            up: vec3(0.0, 1.0, 0.0),
            scale: vec3(1.0, 1.0, 1.0),
            frame_known: false,
            last_frame: 0,
            frames_to_live: IMMORTAL,
            live: true,
            initial_offset: Vector3::zero(),
            spin_axis: vec3(0.0, 1.0, 0.0),
            spin_period: 60,
        }
    }
}

impl Entity {
    pub fn world_matrix(&self) -> Matrix4<f32> {
        frame_change(self.pos, self.fwd, self.up)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Projection times view for this entity acting as a camera or light.
    pub fn camera_matrix(&self, camera: &CameraInfo) -> Matrix4<f32> {
        camera.projection() * model_view(self.pos, self.fwd, self.up)
    }

    /// Like [camera_matrix](Entity::camera_matrix), but ignoring the camera position.
    pub fn skybox_matrix(&self, camera: &CameraInfo) -> Matrix4<f32> {
        camera.projection() * model_view(Vector3::zero(), self.fwd, self.up)
    }

    /// Counts down the remaining lifetime by the frames elapsed since the last call.
    pub fn update(&mut self, curr_frame: u32) {
        if !self.frame_known {
            self.frame_known = true;
            self.last_frame = curr_frame;
            if self.frames_to_live == 0 || self.frames_to_live < IMMORTAL {
                warn!(
                    "entity spawned with lifetime {}, removing it",
                    self.frames_to_live
                );
                self.live = false;
            }
        } else if self.frames_to_live > 0 {
            if curr_frame > self.last_frame {
                self.frames_to_live -= (curr_frame - self.last_frame) as i32;
            }
            self.last_frame = curr_frame;
            if self.frames_to_live <= 0 {
                self.live = false;
            }
        }
    }

    pub fn apply_rotation(&mut self, axis: Vector3<f32>, angle: f32) {
        let (fwd, up) = rotate_frame(self.pos, self.fwd, self.up, axis, angle);
        self.fwd = fwd;
        self.up = up;
    }
}

/// Projection parameters of a camera or light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraInfo {
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub right: f32,
    pub is_light: bool,
    pub is_ortho: bool,
}

impl Default for CameraInfo {
    fn default() -> Self {
        CameraInfo {
            fov: 60.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
            right: 1.0,
            is_light: false,
            is_ortho: false,
        }
    }
}

impl CameraInfo {
    pub fn projection(&self) -> Matrix4<f32> {
        if self.is_ortho {
            orthographic(self.right, self.aspect, self.near, self.far)
        } else {
            perspective(self.fov, self.aspect, self.near, self.far)
        }
    }
}
