//!
//! GPU renderers for the benchmark [World], one per [ApiLevel].
//!
mod advanced;
mod baseline;
mod resources;
mod surface;
mod texture;

use bytemuck::{Pod, Zeroable};
use std::marker::PhantomData;
use std::num::NonZeroU64;
use wgpu::util::DeviceExt;
use wgpu::{BindGroupLayout, ColorTargetState, CommandEncoder, DepthStencilState, RenderPipeline, ShaderModule};

pub use self::advanced::*;
pub use self::baseline::*;
pub use self::resources::*;
pub use self::surface::*;
pub use self::texture::*;

use super::*;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.6,
    b: 0.7,
    a: 0.0,
};

/// Draws the [World] into a frame.
pub trait Renderer {
    /// (Re)creates everything that depends on the drawable size.
    fn reinit(&mut self, surface: &Surface, world: &World, width: u32, height: u32);

    /// Takes camera, light and object matrices from the world for the next draw.
    fn pre_draw_update(&mut self, surface: &Surface, world: &World);

    /// Issue render commands for the frame into `target`.
    fn draw(&mut self, surface: &Surface, encoder: &mut CommandEncoder, target: &wgpu::TextureView);
}

/// Creates the renderer for `api`, failing if the device can't run it.
pub fn create_renderer(
    surface: &Surface,
    world: &World,
    api: ApiLevel,
) -> Result<Box<dyn Renderer>, RenderError> {
    if !surface.supports(api) {
        return Err(RenderError::Unsupported(api));
    }
    Ok(match api {
        ApiLevel::Gles2 => Box::new(BaselineRenderer::new(surface, world)),
        ApiLevel::Gles3 => Box::new(AdvancedRenderer::new(surface, world)),
    })
}

/// Per-frame constants shared by all draws.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct FrameUniforms {
    pub camera: [[f32; 4]; 4],
    pub prev_camera: [[f32; 4]; 4],
    pub light: [[f32; 4]; 4],
    pub light_pos: [f32; 4],
    /// Drawable width and height, shadow map size, depth bias.
    pub viewport: [f32; 4],
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Zeroable::zeroed()
    }
}

/// Per-object transforms, bound with a dynamic offset.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub world: [[f32; 4]; 4],
    pub prev_world: [[f32; 4]; 4],
}

/// Parameters of a full-screen filter pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct FilterUniforms {
    /// Blur step, or drawable size for the final pass.
    pub scale: [f32; 2],
    pub _pad: [f32; 2],
}

pub struct ShaderUniforms<T> {
    pub data: T,
    buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl<T: Pod> ShaderUniforms<T> {
    pub fn new(device: &wgpu::Device, data: T) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniforms_buffer"),
            contents: bytemuck::bytes_of(&data),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_layout_entry(false, None)],
            label: Some("uniforms_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("uniforms_bind_group"),
        });

        ShaderUniforms {
            data,
            buffer,
            bind_group_layout,
            bind_group,
        }
    }

    pub fn update(&mut self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&self.data));
    }
}

/// An array of uniform blocks addressed by dynamic offset, one per draw.
pub struct DynamicUniforms<T> {
    buffer: wgpu::Buffer,
    stride: u64,
    capacity: usize,
    staging: Vec<u8>,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
    _marker: PhantomData<T>,
}

impl<T: Pod> DynamicUniforms<T> {
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let size = std::mem::size_of::<T>() as u64;
        let align = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = (size + align - 1) / align * align;
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_layout_entry(true, NonZeroU64::new(size))],
            label: Some("dynamic_uniforms_bind_group_layout"),
        });
        let capacity = capacity.max(1);
        let (buffer, bind_group) = Self::allocate(device, &bind_group_layout, stride, capacity);
        DynamicUniforms {
            buffer,
            stride,
            capacity,
            staging: Vec::new(),
            bind_group_layout,
            bind_group,
            _marker: PhantomData,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("dynamic_uniforms_buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
                }),
            }],
            label: Some("dynamic_uniforms_bind_group"),
        });
        (buffer, bind_group)
    }

    /// Uploads `items`, growing the buffer when needed.
    pub fn update(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, items: &[T]) {
        if items.is_empty() {
            return;
        }
        if items.len() > self.capacity {
            self.capacity = items.len().next_power_of_two();
            let (buffer, bind_group) =
                Self::allocate(device, &self.bind_group_layout, self.stride, self.capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
        }

        let stride = self.stride as usize;
        self.staging.clear();
        self.staging.resize(stride * items.len(), 0);
        for (chunk, item) in self.staging.chunks_mut(stride).zip(items) {
            let bytes = bytemuck::bytes_of(item);
            chunk[..bytes.len()].copy_from_slice(bytes);
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }

    pub fn offset(&self, index: usize) -> wgpu::DynamicOffset {
        (self.stride * index as u64) as wgpu::DynamicOffset
    }
}

fn uniform_layout_entry(dynamic: bool, min_binding_size: Option<NonZeroU64>) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size,
        },
        count: None,
    }
}

pub fn simple_color_state(format: wgpu::TextureFormat) -> Option<ColorTargetState> {
    Some(ColorTargetState {
        format,
        blend: None,
        write_mask: wgpu::ColorWrites::ALL,
    })
}

pub fn simple_depth_state(compare: wgpu::CompareFunction, write: bool) -> Option<DepthStencilState> {
    Some(DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    })
}

/// Everything needed to build a render pipeline; one shader module holds both stages.
pub struct PipelineDesc<'a> {
    pub module: &'a ShaderModule,
    pub entry_points: [&'a str; 2],
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub bind_group_layouts: &'a [&'a BindGroupLayout],
    pub color_targets: &'a [Option<ColorTargetState>],
    pub depth_target: Option<DepthStencilState>,
    pub cull_mode: Option<wgpu::Face>,
    pub label: Option<&'a str>,
}

pub fn create_render_pipeline(device: &wgpu::Device, desc: PipelineDesc) -> RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: desc.label,
        bind_group_layouts: desc.bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: desc.label,
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: desc.module,
            entry_point: desc.entry_points[0],
            buffers: desc.vertex_buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.module,
            entry_point: desc.entry_points[1],
            targets: desc.color_targets,
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: desc.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: desc.depth_target,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

pub fn create_shader_module(device: &wgpu::Device, source: &str, label: &str) -> ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

/// Pipeline for full-screen passes drawing six vertices with no buffers.
pub fn create_fullscreen_pipeline(
    device: &wgpu::Device,
    module: &ShaderModule,
    fragment_entry: &str,
    bind_group_layouts: &[&BindGroupLayout],
    format: wgpu::TextureFormat,
    label: &str,
) -> RenderPipeline {
    create_render_pipeline(
        device,
        PipelineDesc {
            module,
            entry_points: ["vs_fullscreen", fragment_entry],
            vertex_buffers: &[],
            bind_group_layouts,
            color_targets: &[simple_color_state(format)],
            depth_target: None,
            cull_mode: None,
            label: Some(label),
        },
    )
}
