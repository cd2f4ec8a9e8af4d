use crate::*;
use cgmath::{vec3, InnerSpace, Vector3};
use rand::rngs::StdRng;
use rand::Rng;
use std::f32::consts::PI;

/// Seed of the generator driving particle placement, fixed so runs are comparable.
pub const PARTICLE_SEED: u64 = 0xBA5E_FEA2;

/// Progress along the path past which a particle stops moving.
const PATH_END: f32 = 0.995;

/// Spawns entities over a frame range and moves them along a curve.
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    pub count: u32,
    pub begin: i32,
    pub end: i32,
    pub lifetime: i32,
    pub scale: f32,
    pub random_scale: f32,
    pub follow_path: Option<String>,
    pub models: Vec<usize>,

    remaining: u32,
    // one particle every `spawn_interval` frames...
    spawn_interval: i32,
    // ...or `per_frame` each frame plus one more every `extra_interval` frames
    per_frame: u32,
    extra_interval: i32,

    last_frame: i32,
    live: Vec<EntityHandle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `count` spawns, spread evenly over frames `begin..=end`.
    pub fn set_count_and_range(&mut self, count: u32, begin: i32, end: i32) {
        self.count = count;
        self.begin = begin;
        self.end = end;
        self.remaining = count;
        self.last_frame = begin - 1;
        self.spawn_interval = 0;
        self.per_frame = 0;
        self.extra_interval = 0;

        if count == 0 {
            return;
        }

        let on_interval = end - begin;
        if on_interval <= 0 {
            self.per_frame = count;
            return;
        }

        let interval = on_interval / count as i32;
        if interval > 0 {
            self.spawn_interval = interval;
            return;
        }

        let rate = count as f32 / on_interval as f32;
        self.per_frame = rate.floor() as u32;
        let extra_events = ((rate - rate.floor()) * on_interval as f32).round() as i32;
        if extra_events > 0 {
            self.extra_interval = (on_interval / extra_events).max(1);
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn live_particles(&self) -> &[EntityHandle] {
        &self.live
    }

    /// Number of particles the schedule asks for at `frame`.
    fn spawns_at(&self, frame: i32) -> u32 {
        let since_begin = frame - self.begin;
        if self.spawn_interval > 0 {
            if since_begin % self.spawn_interval == 0 {
                1
            } else {
                0
            }
        } else {
            let extra = self.extra_interval > 0 && since_begin % self.extra_interval == 0;
            self.per_frame + extra as u32
        }
    }

    /// Spawns the particles due since the previous call and advances all live ones.
    pub fn update(
        &mut self,
        frame: u32,
        entities: &mut Vec<Entity>,
        path: Option<&BezierCurve>,
        rng: &mut StdRng,
    ) {
        let frame = frame as i32;
        if frame >= self.begin && frame <= self.end.max(self.begin) {
            for i in (self.last_frame + 1).max(self.begin)..=frame {
                let due = self.spawns_at(i).min(self.remaining);
                for _ in 0..due {
                    self.remaining -= 1;
                    self.spawn(entities, i - frame, rng);
                }
            }
        }

        if let Some(path) = path {
            for &handle in self.live.iter() {
                if let Some(entity) = entities.get_mut(handle as usize) {
                    self.advance(entity, path);
                }
            }
        }

        self.last_frame = frame;
    }

    fn spawn(&mut self, entities: &mut Vec<Entity>, life_offset: i32, rng: &mut StdRng) {
        let handle = entities.len() as EntityHandle;
        let mut entity = Entity::default();

        // Catch-up spawns may be born dead; never let them become immortal.
        entity.frames_to_live = (self.lifetime + life_offset).max(0);
        if !self.models.is_empty() {
            entity.render_model = self.models[rng.gen_range(0..self.models.len())];
        }
        entity.initial_offset = vec3(
            rng.gen_range(-0.3..0.3),
            rng.gen_range(-0.3..0.3),
            rng.gen_range(-0.3..0.3),
        );
        entity.spin_axis = random_direction(rng);
        entity.spin_period = ((60.0 * rng.gen_range(0.8f32..1.2)) as i32).max(1);
        entity.fwd = random_direction(rng);
        entity.up = random_direction(rng);

        let s = self.scale + self.scale * self.random_scale * rng.gen_range(-0.5f32..0.5);
        entity.scale = vec3(s, s, s);

        entities.push(entity);
        self.live.push(handle);
    }

    fn advance(&self, entity: &mut Entity, path: &BezierCurve) {
        if self.lifetime <= 0 {
            return;
        }
        let progress = 2.0 * (self.lifetime - entity.frames_to_live) as f32 / self.lifetime as f32;
        if progress >= PATH_END {
            return;
        }
        entity.pos = path.eval_arclen(progress) + entity.initial_offset;
        let angle = 2.0 * PI / entity.spin_period as f32;
        let axis = entity.spin_axis;
        entity.apply_rotation(axis, angle);
    }

    /// Rewrites live handles after the world dropped dead entities.
    ///
    /// `new_indices` covers the entities that existed before this frame's spawns;
    /// handles past its end were spawned this frame and shift down by `deaths`.
    pub fn remap(&mut self, new_indices: &[Option<EntityHandle>], deaths: u32) {
        let known = new_indices.len();
        self.live
            .retain(|&h| h as usize >= known || new_indices[h as usize].is_some());
        for handle in self.live.iter_mut() {
            *handle = match new_indices.get(*handle as usize) {
                Some(Some(new_index)) => *new_index,
                _ => *handle - deaths,
            };
        }
    }
}

fn random_direction(rng: &mut StdRng) -> Vector3<f32> {
    let mut component = || {
        let sign = if rng.gen::<f32>() < 0.5 { -1.0 } else { 1.0 };
        sign * rng.gen_range(0.1f32..1.0)
    };
    let x = component();
    let y = component();
    let z = component();
    vec3(x, y, z).normalize()
}
