use crate::*;
use bytemuck::{Pod, Zeroable};
use cgmath::{Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

/// Uploaded geometry and texture of a [RenderModel].
pub struct GpuModel {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    bind_group: wgpu::BindGroup,
}

impl GpuModel {
    fn new(device: &wgpu::Device, queue: &wgpu::Queue, layout: &wgpu::BindGroupLayout, model: &RenderModel) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&model.name),
            contents: bytemuck::cast_slice(&model.geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&model.name),
            contents: bytemuck::cast_slice(&model.geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let texture = load_texture(
            device,
            queue,
            &model.texture,
            create_sampler_repeat(device),
            Some(&model.name),
        );
        GpuModel {
            vertex_buffer,
            index_buffer,
            index_count: model.geometry.indices.len() as u32,
            bind_group: texture.bind_group_for(device, layout),
        }
    }
}

/// Transforms of one entity for the current and the previous frame.
#[derive(Debug, Clone, Copy)]
pub struct DrawObject {
    pub model: usize,
    pub visible: bool,
    pub world: Matrix4<f32>,
    pub prev_world: Matrix4<f32>,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SkyboxUniforms {
    pub view_proj: [[f32; 4]; 4],
}

pub struct SkyboxResources {
    vertex_buffer: wgpu::Buffer,
    pub uniforms: ShaderUniforms<SkyboxUniforms>,
    pub texture_layout: wgpu::BindGroupLayout,
    texture_bind_group: wgpu::BindGroup,
}

impl SkyboxResources {
    fn new(device: &wgpu::Device, queue: &wgpu::Queue, skybox: &Skybox) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox_vertices"),
            contents: bytemuck::cast_slice(&SKYBOX_POSITIONS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let texture = load_cubemap(device, queue, skybox, create_sampler_linear(device));
        let (texture_layout, texture_bind_group) = texture.create_bind_group(device);
        SkyboxResources {
            vertex_buffer,
            uniforms: ShaderUniforms::new(device, SkyboxUniforms::zeroed()),
            texture_layout,
            texture_bind_group,
        }
    }

    pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }

    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_bind_group(0, &self.uniforms.bind_group, &[]);
        pass.set_bind_group(1, &self.texture_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..SKYBOX_POSITIONS.len() as u32, 0..1);
    }
}

/// GPU copies of the world shared by both renderers.
pub struct SceneResources {
    models: Vec<GpuModel>,
    pub texture_layout: wgpu::BindGroupLayout,
    pub frame: ShaderUniforms<FrameUniforms>,
    pub objects: DynamicUniforms<ObjectUniforms>,
    pub skybox: Option<SkyboxResources>,
    pub has_light: bool,
    draws: Vec<DrawObject>,
    object_data: Vec<ObjectUniforms>,
}

impl SceneResources {
    pub fn new(surface: &Surface, world: &World) -> Self {
        let device = surface.device();
        let queue = surface.queue();
        let texture_layout = texture_bind_group_layout(
            device,
            wgpu::TextureViewDimension::D2,
            &create_sampler_repeat(device),
        );
        let models = world
            .render_models
            .iter()
            .map(|model| GpuModel::new(device, queue, &texture_layout, model))
            .collect();
        let skybox = world
            .skybox
            .as_ref()
            .map(|skybox| SkyboxResources::new(device, queue, skybox));

        SceneResources {
            models,
            texture_layout,
            frame: ShaderUniforms::new(device, FrameUniforms::default()),
            objects: DynamicUniforms::new(device, world.entities.len()),
            skybox,
            has_light: world.light().is_some(),
            draws: Vec::new(),
            object_data: Vec::new(),
        }
    }

    /// Recomputes all matrices from `world` and uploads them.
    ///
    /// Objects are tracked by entity index, so after entities die the previous
    /// transform of a slot may belong to a different entity.
    pub fn update(&mut self, surface: &Surface, world: &World, shadow_map_size: f32, depth_bias: f32) {
        let correction = OPENGL_TO_WGPU;
        let camera = world
            .camera()
            .map(|(entity, info)| (entity.camera_matrix(info), entity.skybox_matrix(info)));
        let (camera, skybox) = match camera {
            Some((camera, skybox)) => (correction * camera, correction * skybox),
            None => (Matrix4::identity(), Matrix4::identity()),
        };

        let mut frame = self.frame.data;
        frame.prev_camera = if self.draws.is_empty() {
            camera.into()
        } else {
            frame.camera
        };
        frame.camera = camera.into();
        if let Some((light, info)) = world.light() {
            frame.light = (correction * light.camera_matrix(info)).into();
            frame.light_pos = [light.pos.x, light.pos.y, light.pos.z, 1.0];
        }
        frame.viewport = [
            surface.width() as f32,
            surface.height() as f32,
            shadow_map_size,
            depth_bias,
        ];
        self.frame.data = frame;
        self.frame.update(surface.queue());

        if let Some(sky) = self.skybox.as_mut() {
            sky.uniforms.data.view_proj = skybox.into();
            sky.uniforms.update(surface.queue());
        }

        let known = self.draws.len();
        self.draws.resize_with(world.entities.len(), || DrawObject {
            model: 0,
            visible: false,
            world: Matrix4::identity(),
            prev_world: Matrix4::identity(),
        });
        for (i, (draw, entity)) in self.draws.iter_mut().zip(world.entities.iter()).enumerate() {
            let matrix = entity.world_matrix();
            draw.prev_world = if i < known { draw.world } else { matrix };
            draw.world = matrix;
            draw.model = entity.render_model;
            draw.visible = entity.renderable && entity.live;
        }

        self.object_data.clear();
        self.object_data.extend(self.draws.iter().map(|draw| ObjectUniforms {
            world: draw.world.into(),
            prev_world: draw.prev_world.into(),
        }));
        self.objects
            .update(surface.device(), surface.queue(), &self.object_data);
    }

    /// Issues one indexed draw per visible object.
    ///
    /// Object transforms go to `object_group`; the model texture to `texture_group` if given.
    pub fn draw_objects<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, object_group: u32, texture_group: Option<u32>) {
        let mut bound_model = None;
        for (i, draw) in self.draws.iter().enumerate().filter(|(_, d)| d.visible) {
            let model = match self.models.get(draw.model) {
                Some(model) => model,
                None => continue,
            };
            if bound_model != Some(draw.model) {
                if let Some(group) = texture_group {
                    pass.set_bind_group(group, &model.bind_group, &[]);
                }
                pass.set_vertex_buffer(0, model.vertex_buffer.slice(..));
                pass.set_index_buffer(model.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                bound_model = Some(draw.model);
            }
            pass.set_bind_group(object_group, &self.objects.bind_group, &[self.objects.offset(i)]);
            pass.draw_indexed(0..model.index_count, 0, 0..1);
        }
    }
}

#[rustfmt::skip]
const SKYBOX_POSITIONS: [[f32; 3]; 36] = [
    [-1.0,  1.0, -1.0], [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0],

    [-1.0, -1.0,  1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0],
    [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0],

    [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],

    [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],

    [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],

    [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0],
];
