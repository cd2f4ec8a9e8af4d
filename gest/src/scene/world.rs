use crate::*;
use cgmath::Vector3;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

/// Length of one animation frame (the scene is authored for 60 Hz).
pub const FRAME_DURATION_US: u64 = 16_667;
pub const ANIMATION_FPS: f32 = 60.0;

/// Pose an entity takes on a given animation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityPose {
    pub handle: EntityHandle,
    pub pos: Vector3<f32>,
    pub fwd: Vector3<f32>,
    pub up: Vector3<f32>,
    pub scale: Vector3<f32>,
}

/// The animated benchmark scene and its frame accounting.
pub struct World {
    pub render_models: Vec<RenderModel>,
    pub named_render_models: HashMap<String, usize>,
    pub entities: Vec<Entity>,
    pub camera_infos: BTreeMap<EntityHandle, CameraInfo>,
    pub current_camera: EntityHandle,
    pub current_light: EntityHandle,
    pub lights: Vec<EntityHandle>,
    pub curves: BTreeMap<String, BezierCurve>,
    pub particle_systems: BTreeMap<String, ParticleSystem>,
    pub skybox: Option<Skybox>,

    anim_frames: Vec<Vec<EntityPose>>,
    rng: StdRng,
    epoch: Instant,

    start_time: Option<u64>,
    curr_frame: u32,
    last_frame: u32,
    frames_shown: u32,
    fps: f32,
    done: bool,
}

impl Default for World {
    fn default() -> Self {
        World {
            render_models: Vec::new(),
            named_render_models: HashMap::new(),
            entities: Vec::new(),
            camera_infos: BTreeMap::new(),
            current_camera: 0,
            current_light: 0,
            lights: Vec::new(),
            curves: BTreeMap::new(),
            particle_systems: BTreeMap::new(),
            skybox: None,
            anim_frames: Vec::new(),
            rng: StdRng::seed_from_u64(PARTICLE_SEED),
            epoch: Instant::now(),
            start_time: None,
            curr_frame: 0,
            last_frame: 0,
            frames_shown: 0,
            fps: 0.0,
            done: false,
        }
    }
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_entity(&mut self, handle: EntityHandle, name: &str) -> &mut Entity {
        let index = handle as usize;
        if index >= self.entities.len() {
            self.entities.resize_with(index + 1, Entity::default);
        }
        let model = self.named_render_models.get(name).copied().unwrap_or(0);
        let entity = &mut self.entities[index];
        entity.render_model = model;
        entity
    }

    pub fn define_camera_or_light(&mut self, name: &str, handle: EntityHandle, is_light: bool) {
        self.add_entity(handle, name).renderable = false;
        let info = self.camera_infos.entry(handle).or_default();
        info.is_light = is_light;
        if is_light {
            self.lights.push(handle);
            self.current_light = handle;
        } else {
            self.current_camera = handle;
        }
    }

    /// Registers `model` under its name and returns its index.
    pub fn add_render_model(&mut self, model: RenderModel) -> usize {
        let index = self.render_models.len();
        self.named_render_models.insert(model.name.clone(), index);
        self.render_models.push(model);
        index
    }

    /// Defines a renderable entity drawn with the model called `name` (model 0 if unknown).
    pub fn define_entity(&mut self, name: &str, handle: EntityHandle) {
        self.add_entity(handle, name);
    }

    pub fn entity_mut(&mut self, handle: EntityHandle) -> Result<&mut Entity, SceneError> {
        self.entities
            .get_mut(handle as usize)
            .ok_or(SceneError::UndefinedHandle(handle))
    }

    pub fn camera_info_mut(&mut self, handle: EntityHandle) -> Result<&mut CameraInfo, SceneError> {
        self.camera_infos
            .get_mut(&handle)
            .ok_or(SceneError::UndefinedHandle(handle))
    }

    pub fn set_anim_pose(&mut self, frame: u32, pose: EntityPose) {
        let frame = frame as usize;
        if frame >= self.anim_frames.len() {
            self.anim_frames.resize_with(frame + 1, Vec::new);
        }
        self.anim_frames[frame].push(pose);
    }

    pub fn anim_frames(&self) -> &[Vec<EntityPose>] {
        &self.anim_frames
    }

    pub fn total_frames(&self) -> u32 {
        self.anim_frames.len() as u32
    }

    /// Points every camera (lights excepted) at the new drawable aspect ratio.
    pub fn reset_aspect_ratio(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let aspect = width as f32 / height as f32;
        for info in self.camera_infos.values_mut().filter(|i| !i.is_light) {
            info.aspect = aspect;
        }
    }

    pub fn camera(&self) -> Option<(&Entity, &CameraInfo)> {
        self.camera_pair(self.current_camera)
    }

    pub fn light(&self) -> Option<(&Entity, &CameraInfo)> {
        if self.lights.is_empty() {
            return None;
        }
        self.camera_pair(self.current_light)
    }

    fn camera_pair(&self, handle: EntityHandle) -> Option<(&Entity, &CameraInfo)> {
        let entity = self.entities.get(handle as usize)?;
        let info = self.camera_infos.get(&handle)?;
        Some((entity, info))
    }

    pub fn curr_frame(&self) -> u32 {
        self.curr_frame
    }

    pub fn frames_shown(&self) -> u32 {
        self.frames_shown
    }

    /// Whether the animation has played through once.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Average frame rate of the completed run; zero until [is_done](World::is_done).
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Advances the world to the current time. See [update_at](World::update_at).
    pub fn update(&mut self) -> bool {
        let now = self.epoch.elapsed().as_micros() as u64;
        self.update_at(now)
    }

    /// Time until the animation clock reaches its next frame boundary.
    pub fn micros_until_next_frame(&self) -> u64 {
        self.micros_until_next_frame_at(self.epoch.elapsed().as_micros() as u64)
    }

    /// Like [micros_until_next_frame](World::micros_until_next_frame), at `now_us`.
    /// Before the clock has started this is one whole frame.
    pub fn micros_until_next_frame_at(&self, now_us: u64) -> u64 {
        match self.start_time {
            Some(start) => FRAME_DURATION_US - now_us.saturating_sub(start) % FRAME_DURATION_US,
            None => FRAME_DURATION_US,
        }
    }

    /// Advances the world to `now_us` on the 60 Hz animation clock.
    ///
    /// Returns `true` when a new animation frame was reached and should be drawn.
    /// When the clock wraps past the last frame the run is over: the fraction of
    /// frames actually shown, scaled to 60, becomes the result.
    pub fn update_at(&mut self, now_us: u64) -> bool {
        if self.done || self.anim_frames.is_empty() {
            return false;
        }

        let start = *self.start_time.get_or_insert(now_us);
        let total = self.anim_frames.len() as u64;
        let frame = ((now_us.saturating_sub(start) / FRAME_DURATION_US) % total) as u32;
        self.curr_frame = frame;

        if self.frames_shown > 0 && frame == self.last_frame {
            return false;
        }

        if frame < self.last_frame {
            let total = total as u32;
            let dropped = total.saturating_sub(self.frames_shown);
            let drop_ratio = dropped as f32 / total as f32;
            self.fps = (ANIMATION_FPS * (1.0 - drop_ratio)).max(0.0).min(ANIMATION_FPS);
            self.done = true;
            info!(
                "run finished: {} of {} frames shown, {} dropped, {:.1} fps",
                self.frames_shown, total, dropped, self.fps
            );
            return false;
        }

        self.frames_shown += 1;
        self.apply_anim_frame(frame);

        let mut new_indices = Vec::with_capacity(self.entities.len());
        let mut deaths = 0u32;
        for (i, entity) in self.entities.iter_mut().enumerate() {
            entity.update(frame);
            if entity.live {
                new_indices.push(Some(i as EntityHandle - deaths));
            } else {
                new_indices.push(None);
                deaths += 1;
            }
        }

        let World {
            particle_systems,
            curves,
            entities,
            rng,
            ..
        } = self;
        for system in particle_systems.values_mut() {
            let path = system
                .follow_path
                .as_ref()
                .and_then(|name| curves.get(name));
            system.update(frame, entities, path, rng);
            system.remap(&new_indices, deaths);
        }

        self.entities.retain(|e| e.live);

        self.last_frame = frame;
        true
    }

    fn apply_anim_frame(&mut self, frame: u32) {
        if let Some(poses) = self.anim_frames.get(frame as usize) {
            for pose in poses.iter() {
                if let Some(entity) = self.entities.get_mut(pose.handle as usize) {
                    entity.pos = pose.pos;
                    entity.fwd = pose.fwd;
                    entity.up = pose.up;
                    entity.scale = pose.scale;
                }
            }
        }
    }
}
