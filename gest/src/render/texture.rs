use crate::*;
use std::num::NonZeroU32;

/// A sampled texture with its view and sampler.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Sampler,
    pub view_dimension: wgpu::TextureViewDimension,
    pub width: u32,
    pub height: u32,
}

pub struct Sampler {
    pub sampler: wgpu::Sampler,
    pub binding_type: wgpu::SamplerBindingType,
    pub filterable: bool,
}

impl Texture {
    pub fn create_bind_group(&self, device: &wgpu::Device) -> (wgpu::BindGroupLayout, wgpu::BindGroup) {
        let layout = texture_bind_group_layout(device, self.view_dimension, &self.sampler);
        let bind_group = self.bind_group_for(device, &layout);
        (layout, bind_group)
    }

    pub fn bind_group_for(&self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler.sampler),
                },
            ],
            label: Some("texture_bind_group"),
        })
    }

    pub fn to_color_attachment(&self, clear: Option<wgpu::Color>) -> Option<wgpu::RenderPassColorAttachment> {
        Some(wgpu::RenderPassColorAttachment {
            view: &self.view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: match clear {
                    Some(color) => wgpu::LoadOp::Clear(color),
                    None => wgpu::LoadOp::Load,
                },
                store: true,
            },
        })
    }

    pub fn to_depth_attachment(&self, clear: Option<f32>) -> Option<wgpu::RenderPassDepthStencilAttachment> {
        Some(wgpu::RenderPassDepthStencilAttachment {
            view: &self.view,
            depth_ops: Some(wgpu::Operations {
                load: match clear {
                    Some(depth) => wgpu::LoadOp::Clear(depth),
                    None => wgpu::LoadOp::Load,
                },
                store: true,
            }),
            stencil_ops: None,
        })
    }
}

/// Layout for a texture at binding 0 and its sampler at binding 1.
pub fn texture_bind_group_layout(
    device: &wgpu::Device,
    view_dimension: wgpu::TextureViewDimension,
    sampler: &Sampler,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension,
                    sample_type: wgpu::TextureSampleType::Float {
                        filterable: sampler.filterable,
                    },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(sampler.binding_type),
                count: None,
            },
        ],
        label: Some("texture_bind_group_layout"),
    })
}

/// Layout for a depth texture read with `textureLoad`.
pub fn depth_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Depth,
            },
            count: None,
        }],
        label: Some("depth_bind_group_layout"),
    })
}

pub fn depth_bind_group(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, texture: &Texture) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(&texture.view),
        }],
        label: Some("depth_bind_group"),
    })
}

pub fn create_sampler_linear(device: &wgpu::Device) -> Sampler {
    create_sampler(device, wgpu::AddressMode::ClampToEdge, wgpu::FilterMode::Linear)
}

pub fn create_sampler_repeat(device: &wgpu::Device) -> Sampler {
    create_sampler(device, wgpu::AddressMode::Repeat, wgpu::FilterMode::Linear)
}

pub fn create_sampler_nearest(device: &wgpu::Device) -> Sampler {
    create_sampler(device, wgpu::AddressMode::ClampToEdge, wgpu::FilterMode::Nearest)
}

fn create_sampler(device: &wgpu::Device, address_mode: wgpu::AddressMode, filter: wgpu::FilterMode) -> Sampler {
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: filter,
        ..Default::default()
    });
    let filterable = filter == wgpu::FilterMode::Linear;
    Sampler {
        sampler,
        binding_type: if filterable {
            wgpu::SamplerBindingType::Filtering
        } else {
            wgpu::SamplerBindingType::NonFiltering
        },
        filterable,
    }
}

/// Uploads an RGBA8 image as a 2D texture.
pub fn load_texture(device: &wgpu::Device, queue: &wgpu::Queue, image: &Rgba8Image, sampler: Sampler, label: Option<&str>) -> Texture {
    upload_layers(
        device,
        queue,
        &image.pixels,
        [image.width, image.height, 1],
        wgpu::TextureViewDimension::D2,
        sampler,
        label,
    )
}

/// Uploads the six skybox faces as a cube texture.
pub fn load_cubemap(device: &wgpu::Device, queue: &wgpu::Queue, skybox: &Skybox, sampler: Sampler) -> Texture {
    let data: Vec<u8> = skybox
        .faces
        .iter()
        .flat_map(|face| face.pixels.iter().copied())
        .collect();
    upload_layers(
        device,
        queue,
        &data,
        [skybox.size, skybox.size, 6],
        wgpu::TextureViewDimension::Cube,
        sampler,
        Some("skybox"),
    )
}

fn upload_layers(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    data: &[u8],
    [width, height, layers]: [u32; 3],
    view_dimension: wgpu::TextureViewDimension,
    sampler: Sampler,
    label: Option<&str>,
) -> Texture {
    let format = wgpu::TextureFormat::Rgba8Unorm;
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: layers,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label,
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label,
        dimension: Some(view_dimension),
        ..Default::default()
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            aspect: wgpu::TextureAspect::All,
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        data,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: NonZeroU32::new(format.describe().block_size as u32 * width),
            rows_per_image: NonZeroU32::new(height),
        },
        size,
    );

    Texture {
        texture,
        view,
        sampler,
        view_dimension,
        width,
        height,
    }
}

/// A texture that can be rendered to and sampled afterwards.
pub fn create_render_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    sampler: Sampler,
    label: Option<&str>,
) -> Texture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label,
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    Texture {
        texture,
        view,
        sampler,
        view_dimension: wgpu::TextureViewDimension::D2,
        width,
        height,
    }
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32, label: Option<&str>) -> Texture {
    create_render_texture(
        device,
        width,
        height,
        DEPTH_FORMAT,
        create_sampler_nearest(device),
        label,
    )
}
