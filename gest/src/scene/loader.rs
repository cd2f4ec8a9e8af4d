use crate::*;
use cgmath::{vec3, Vector3};
use log::{debug, info};

/// Name of the scene every benchmark run loads.
pub const SCENE_FILE: &str = "gpu_stress_test.esys";

/// Entity name the scene must use exactly once.
pub const SIGNATURE_ENTITY: &str = "gpu_text";

/// Resolution of each curve's arc-length table, as a power of two.
pub const ARCLENGTH_LUT_POWER: u32 = 16;

/// One recognized line of a scene file.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    DefineCamera { name: String, handle: EntityHandle },
    DefineLight { name: String, handle: EntityHandle },
    DefineModel { name: String },
    DefineEntity { name: String, handle: EntityHandle },
    Perspective { handle: EntityHandle, fov: f32, aspect: f32, near: f32, far: f32 },
    Orthographic { handle: EntityHandle, aspect: f32, near: f32, far: f32, right: f32 },
    Scale { handle: EntityHandle, scale: Vector3<f32> },
    Frame { handle: EntityHandle, pos: Vector3<f32>, fwd: Vector3<f32>, up: Vector3<f32> },
    AnimFrame { frame: u32, pose: EntityPose },
    Prop { handle: EntityHandle, kind: String, key: String, value: String },
    DefineCurve { name: String },
    CurvePoint { curve: String, index: usize, point: BezierPoint },
    CurveAction { curve: String, action: String, key: Keyframe },
    DefineParticles { name: String },
    Particles {
        name: String,
        count: i32,
        begin: i32,
        end: i32,
        lifetime: i32,
        scale: f32,
        random_scale: f32,
        follow_path: String,
    },
    ParticlesModel { name: String, model: String },
}

fn floats<const N: usize>(tokens: &[&str]) -> Option<[f32; N]> {
    if tokens.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(tokens) {
        *slot = token.parse().ok()?;
    }
    Some(out)
}

fn v3(f: &[f32]) -> Vector3<f32> {
    vec3(f[0], f[1], f[2])
}

/// Parses one scene line; lines that match no command yield `None`.
pub fn parse_line(line: &str) -> Option<SceneCommand> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let command = match tokens.as_slice() {
        ["define", "camera", name, handle, ..] => SceneCommand::DefineCamera {
            name: name.to_string(),
            handle: handle.parse().ok()?,
        },
        ["define", "light", name, handle, ..] => SceneCommand::DefineLight {
            name: name.to_string(),
            handle: handle.parse().ok()?,
        },
        ["define", "model", name, ..] => SceneCommand::DefineModel {
            name: name.to_string(),
        },
        ["define", "entity", name, handle, ..] => SceneCommand::DefineEntity {
            name: name.to_string(),
            handle: handle.parse().ok()?,
        },
        ["define", "curve", name, ..] => SceneCommand::DefineCurve {
            name: name.to_string(),
        },
        ["define", "particles", name, ..] => SceneCommand::DefineParticles {
            name: name.to_string(),
        },
        ["set", "entityanim", frame, handle, rest @ ..] => {
            let f = floats::<12>(rest)?;
            SceneCommand::AnimFrame {
                frame: frame.parse().ok()?,
                pose: EntityPose {
                    handle: handle.parse().ok()?,
                    pos: v3(&f[0..3]),
                    fwd: v3(&f[3..6]),
                    up: v3(&f[6..9]),
                    scale: v3(&f[9..12]),
                },
            }
        }
        ["set", "curve", curve, index, _hl_type, _hr_type, rest @ ..] => {
            let f = floats::<9>(rest)?;
            SceneCommand::CurvePoint {
                curve: curve.to_string(),
                index: index.parse().ok()?,
                point: BezierPoint {
                    left: v3(&f[0..3]),
                    right: v3(&f[3..6]),
                    coord: v3(&f[6..9]),
                },
            }
        }
        ["set", "curveaction", curve, action, curve_type, hl_type, hr_type, rest @ ..] => {
            let [hlx, hly, hrx, hry, x, y] = floats::<6>(rest)?;
            SceneCommand::CurveAction {
                curve: curve.to_string(),
                action: action.to_string(),
                key: Keyframe {
                    curve_type: CurveType::from_name(curve_type),
                    left_handle_type: KeyHandleType::from_name(hl_type),
                    right_handle_type: KeyHandleType::from_name(hr_type),
                    hlx,
                    hly,
                    hrx,
                    hry,
                    x,
                    y,
                },
            }
        }
        ["set", "particles", name, count, begin, end, lifetime, scale, random_scale, follow_path, ..] => {
            SceneCommand::Particles {
                name: name.to_string(),
                count: count.parse().ok()?,
                begin: begin.parse().ok()?,
                end: end.parse().ok()?,
                lifetime: lifetime.parse().ok()?,
                scale: scale.parse().ok()?,
                random_scale: random_scale.parse().ok()?,
                follow_path: follow_path.to_string(),
            }
        }
        ["set", "particlesmodel", name, model, ..] => SceneCommand::ParticlesModel {
            name: name.to_string(),
            model: model.to_string(),
        },
        ["set", handle, "proj", rest @ ..] => {
            let [fov, aspect, near, far] = floats::<4>(rest)?;
            SceneCommand::Perspective {
                handle: handle.parse().ok()?,
                fov,
                aspect,
                near,
                far,
            }
        }
        ["set", handle, "orthoproj", rest @ ..] => {
            let [aspect, near, far, right] = floats::<4>(rest)?;
            SceneCommand::Orthographic {
                handle: handle.parse().ok()?,
                aspect,
                near,
                far,
                right,
            }
        }
        ["set", handle, "scale", rest @ ..] => SceneCommand::Scale {
            handle: handle.parse().ok()?,
            scale: v3(&floats::<3>(rest)?),
        },
        ["set", handle, "frame", rest @ ..] => {
            let f = floats::<9>(rest)?;
            SceneCommand::Frame {
                handle: handle.parse().ok()?,
                pos: v3(&f[0..3]),
                fwd: v3(&f[3..6]),
                up: v3(&f[6..9]),
            }
        }
        ["set", handle, "prop", kind @ ("int" | "float" | "str"), key, value, ..] => {
            SceneCommand::Prop {
                handle: handle.parse().ok()?,
                kind: kind.to_string(),
                key: key.to_string(),
                value: value.to_string(),
            }
        }
        _ => return None,
    };
    Some(command)
}

/// Builds a [World] by replaying scene commands.
pub struct SceneBuilder<'a> {
    assets: &'a dyn AssetSource,
    num_objects: u32,
    world: World,
    signature_count: usize,
}

impl<'a> SceneBuilder<'a> {
    /// `num_objects` replaces every particle system's own count.
    pub fn new(assets: &'a dyn AssetSource, num_objects: u32) -> Self {
        SceneBuilder {
            assets,
            num_objects,
            world: World::new(),
            signature_count: 0,
        }
    }

    fn define_model(&mut self, name: &str) -> Result<usize, SceneError> {
        let model = RenderModel::load(self.assets, name)?;
        Ok(self.world.add_render_model(model))
    }

    pub fn apply(&mut self, command: SceneCommand) -> Result<(), SceneError> {
        match command {
            SceneCommand::DefineCamera { name, handle } => {
                debug!("camera {} handle {}", name, handle);
                self.world.define_camera_or_light(&name, handle, false);
            }
            SceneCommand::DefineLight { name, handle } => {
                debug!("light {} handle {}", name, handle);
                self.world.define_camera_or_light(&name, handle, true);
            }
            SceneCommand::DefineModel { name } => {
                self.define_model(&name)?;
            }
            SceneCommand::DefineEntity { name, handle } => {
                debug!("entity {} handle {}", name, handle);
                if name == SIGNATURE_ENTITY {
                    self.signature_count += 1;
                }
                self.world.define_entity(&name, handle);
            }
            SceneCommand::Perspective {
                handle,
                fov,
                aspect,
                near,
                far,
            } => {
                let info = self.world.camera_info_mut(handle)?;
                info.fov = fov;
                info.aspect = aspect;
                info.near = near;
                info.far = far;
                info.right = 1.0;
                info.is_ortho = false;
            }
            SceneCommand::Orthographic {
                handle,
                aspect,
                near,
                far,
                right,
            } => {
                let info = self.world.camera_info_mut(handle)?;
                info.fov = 0.0;
                info.aspect = aspect;
                info.near = near;
                info.far = far;
                info.right = right;
                info.is_ortho = true;
            }
            SceneCommand::Scale { handle, scale } => {
                self.world.entity_mut(handle)?.scale = scale;
            }
            SceneCommand::Frame {
                handle,
                pos,
                fwd,
                up,
            } => {
                let entity = self.world.entity_mut(handle)?;
                entity.pos = pos;
                entity.fwd = fwd;
                entity.up = up;
            }
            SceneCommand::AnimFrame { frame, pose } => {
                self.world.set_anim_pose(frame, pose);
            }
            SceneCommand::Prop {
                handle,
                kind,
                key,
                value,
            } => {
                debug!("prop {} {} {} = {}", handle, kind, key, value);
            }
            SceneCommand::DefineCurve { name } => {
                self.world.curves.insert(name, BezierCurve::new());
            }
            SceneCommand::CurvePoint {
                curve,
                index,
                point,
            } => {
                self.world
                    .curves
                    .get_mut(&curve)
                    .ok_or(SceneError::UndefinedCurve(curve))?
                    .set_point(index, point);
            }
            SceneCommand::CurveAction { curve, action, key } => {
                debug!("curve {} action {} key at {}", curve, action, key.x);
                self.world
                    .curves
                    .get_mut(&curve)
                    .ok_or(SceneError::UndefinedCurve(curve))?
                    .action_mut()
                    .add_key(key);
            }
            SceneCommand::DefineParticles { name } => {
                self.world.particle_systems.insert(name, ParticleSystem::new());
            }
            SceneCommand::Particles {
                name,
                count,
                begin,
                end,
                lifetime,
                scale,
                random_scale,
                follow_path,
            } => {
                debug!(
                    "particles {}: count {} (using {}), frames {}..{}, lifetime {}",
                    name, count, self.num_objects, begin, end, lifetime
                );
                if !self.world.curves.contains_key(&follow_path) {
                    return Err(SceneError::UndefinedCurve(follow_path));
                }
                let system = self
                    .world
                    .particle_systems
                    .get_mut(&name)
                    .ok_or(SceneError::UndefinedParticles(name))?;
                system.set_count_and_range(self.num_objects, begin, end);
                system.lifetime = lifetime;
                system.scale = scale;
                system.random_scale = random_scale;
                system.follow_path = Some(follow_path);
            }
            SceneCommand::ParticlesModel { name, model } => {
                if !self.world.particle_systems.contains_key(&name) {
                    return Err(SceneError::UndefinedParticles(name));
                }
                let index = match self.world.named_render_models.get(&model) {
                    Some(index) => *index,
                    None => self.define_model(&model)?,
                };
                if let Some(system) = self.world.particle_systems.get_mut(&name) {
                    system.models.push(index);
                }
            }
        }
        Ok(())
    }

    /// Validates the scene and prepares curves and skybox.
    pub fn finish(mut self) -> Result<World, SceneError> {
        if self.signature_count != 1 {
            return Err(SceneError::NotGenuine(self.signature_count));
        }
        if self.world.total_frames() == 0 {
            return Err(SceneError::NoAnimationFrames);
        }
        let entity_count = self.world.entities.len();
        for poses in self.world.anim_frames().iter() {
            if let Some(pose) = poses.iter().find(|p| p.handle as usize >= entity_count) {
                return Err(SceneError::UndefinedHandle(pose.handle));
            }
        }

        for curve in self.world.curves.values_mut() {
            curve.precalc_arclengths(ARCLENGTH_LUT_POWER);
        }

        self.world.skybox = Skybox::load(self.assets);

        info!(
            "scene ready: {} entities, {} models, {} frames, {} particle systems, skybox {}",
            self.world.entities.len(),
            self.world.render_models.len(),
            self.world.total_frames(),
            self.world.particle_systems.len(),
            if self.world.skybox.is_some() { "on" } else { "off" }
        );
        Ok(self.world)
    }
}

impl World {
    /// Loads a scene from `source`, scaling its particle systems to `num_objects`.
    pub fn parse(
        assets: &dyn AssetSource,
        source: &str,
        num_objects: u32,
    ) -> Result<World, SceneError> {
        let mut builder = SceneBuilder::new(assets, num_objects);
        for line in source.lines() {
            if let Some(command) = parse_line(line) {
                builder.apply(command)?;
            }
        }
        builder.finish()
    }

    /// Loads [SCENE_FILE] from `assets`.
    pub fn load(assets: &dyn AssetSource, num_objects: u32) -> Result<World, SceneError> {
        let source = assets.load_string(SCENE_FILE)?;
        World::parse(assets, &source, num_objects)
    }
}
