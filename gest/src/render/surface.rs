use crate::*;
use log::{info, warn};
use std::cell::RefCell;
use wgpu::{SurfaceError, SurfaceTexture};

/// Shadow-map and render-target size the advanced renderer needs.
pub const ADVANCED_TARGET_SIZE: u32 = 2048;

/// Formats the advanced renderer renders to and filters from.
pub const ADVANCED_FORMATS: [wgpu::TextureFormat; 2] =
    [wgpu::TextureFormat::R16Float, wgpu::TextureFormat::Rg16Float];

/// A presentable drawable with its device and queue.
pub struct Surface {
    surface: wgpu::Surface,
    surface_config: RefCell<wgpu::SurfaceConfiguration>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Surface {
    pub async fn new<W>(surface_size: [u32; 2], window_handle: &W) -> Result<Self, RenderError>
    where
        W: raw_window_handle::HasRawWindowHandle + raw_window_handle::HasRawDisplayHandle,
    {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            #[cfg(target_os = "macos")]
            backends: wgpu::Backends::METAL,
            #[cfg(target_os = "android")]
            backends: wgpu::Backends::VULKAN | wgpu::Backends::GL,
            #[cfg(not(any(target_os = "macos", target_os = "android")))]
            backends: wgpu::Backends::PRIMARY,
            dx12_shader_compiler: wgpu::Dx12Compiler::Fxc,
        });
        let surface =
            unsafe { instance.create_surface(window_handle) }.map_err(RenderError::CreateSurface)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        info!(
            "adapter: {} ({:?}, {:?})",
            adapter_info.name, adapter_info.backend, adapter_info.device_type
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                    label: None,
                },
                None,
            )
            .await
            .map_err(RenderError::RequestDevice)?;

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .first()
            .copied()
            .unwrap_or(wgpu::TextureFormat::Rgba8Unorm);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            #[cfg(target_os = "android")]
            format,
            #[cfg(not(target_os = "android"))]
            format: format.remove_srgb_suffix(),
            width: surface_size[0].max(1),
            height: surface_size[1].max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);

        Ok(Surface {
            surface,
            surface_config: RefCell::new(surface_config),
            adapter,
            device,
            queue,
        })
    }

    /// Reconfigures the swapchain; zero sizes are ignored.
    pub fn resize(&self, new_size: [u32; 2]) {
        if new_size[0] == 0 || new_size[1] == 0 {
            return;
        }
        {
            let mut config = self.surface_config.borrow_mut();
            config.width = new_size[0];
            config.height = new_size[1];
        }
        self.reconfigure();
    }

    pub fn reconfigure(&self) {
        self.surface
            .configure(&self.device, &self.surface_config.borrow());
    }

    /// Whether this device can run the renderer for `api`.
    ///
    /// Two color attachments are always available on wgpu devices, so only
    /// texture size and the half-float formats are checked.
    pub fn supports(&self, api: ApiLevel) -> bool {
        match api {
            ApiLevel::Gles2 => true,
            ApiLevel::Gles3 => {
                let limits = self.device.limits();
                if limits.max_texture_dimension_2d < ADVANCED_TARGET_SIZE {
                    warn!(
                        "{} needs {}px textures, device allows {}",
                        api, ADVANCED_TARGET_SIZE, limits.max_texture_dimension_2d
                    );
                    return false;
                }
                ADVANCED_FORMATS.iter().all(|format| {
                    let features = self.adapter.get_texture_format_features(*format);
                    let usable = features.allowed_usages.contains(
                        wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
                    ) && features
                        .flags
                        .contains(wgpu::TextureFormatFeatureFlags::FILTERABLE);
                    if !usable {
                        warn!("{} needs a renderable, filterable {:?}", api, format);
                    }
                    usable
                })
            }
        }
    }

    /// Largest shadow map the baseline renderer may allocate.
    pub fn max_shadow_map_size(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d.min(4096)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.surface_config.borrow().format
    }

    pub fn width(&self) -> u32 {
        self.surface_config.borrow().width
    }

    pub fn height(&self) -> u32 {
        self.surface_config.borrow().height
    }

    pub fn get_current_texture(&self) -> Result<SurfaceTexture, SurfaceError> {
        self.surface.get_current_texture()
    }
}
