use crate::*;

/// Color format of the offscreen scene target.
pub const SCENE_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const LIGHT_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R16Float;
pub const VELOCITY_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg16Float;

const SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/advanced.wgsl")
);

const NO_MOTION: wgpu::Color = wgpu::Color {
    r: 0.5,
    g: 0.5,
    b: 0.0,
    a: 0.0,
};

/// Blurred light-depth map and the passes that use it.
struct LitPasses {
    light_map: Texture,
    light_map_bind_group: wgpu::BindGroup,
    blur_map: Texture,
    blur_map_bind_group: wgpu::BindGroup,
    light_depth: Texture,
    horizontal: ShaderUniforms<FilterUniforms>,
    vertical: ShaderUniforms<FilterUniforms>,
    depth_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    scene_pipeline: wgpu::RenderPipeline,
    final_pipeline: wgpu::RenderPipeline,
    skybox_pipeline: Option<wgpu::RenderPipeline>,
}

/// Size-dependent targets of the scene pass.
struct SceneTargets {
    depth: Texture,
    color: Texture,
    color_bind_group: wgpu::BindGroup,
    velocity: Texture,
    velocity_bind_group: wgpu::BindGroup,
    params: ShaderUniforms<FilterUniforms>,
}

/// Renderer for [ApiLevel::Gles3]: blurred exponential shadow maps and a
/// per-pixel motion blur resolved from a velocity target.
pub struct AdvancedRenderer {
    resources: SceneResources,
    sampled_layout: wgpu::BindGroupLayout,
    lit: Option<LitPasses>,
    diffuse_pipeline: wgpu::RenderPipeline,
    skybox_pipeline: Option<wgpu::RenderPipeline>,
    targets: Option<SceneTargets>,
}

fn blur_step(horizontal: bool) -> FilterUniforms {
    let step = 2.0 / ADVANCED_TARGET_SIZE as f32;
    FilterUniforms {
        scale: if horizontal { [step, 0.0] } else { [0.0, step] },
        _pad: [0.0; 2],
    }
}

impl AdvancedRenderer {
    pub fn new(surface: &Surface, world: &World) -> Self {
        let device = surface.device();
        let resources = SceneResources::new(surface, world);
        let module = create_shader_module(device, SHADER, "advanced");
        let filter_module = create_shader_module(device, include_str!("shaders/filter.wgsl"), "filter");
        let skybox_module = resources
            .skybox
            .as_ref()
            .map(|_| create_shader_module(device, include_str!("shaders/skybox.wgsl"), "skybox"));
        let sampled_layout = texture_bind_group_layout(
            device,
            wgpu::TextureViewDimension::D2,
            &create_sampler_linear(device),
        );
        let vertex_buffers = [Vertex::layout()];

        let diffuse_pipeline = create_render_pipeline(
            device,
            PipelineDesc {
                module: &module,
                entry_points: ["vs_diffuse", "fs_diffuse"],
                vertex_buffers: &vertex_buffers,
                bind_group_layouts: &[
                    &resources.frame.bind_group_layout,
                    &resources.objects.bind_group_layout,
                    &resources.texture_layout,
                ],
                color_targets: &[simple_color_state(surface.format())],
                depth_target: simple_depth_state(wgpu::CompareFunction::Less, true),
                cull_mode: None,
                label: Some("advanced_diffuse"),
            },
        );

        let skybox_pipeline = match (skybox_module.as_ref(), resources.skybox.as_ref()) {
            (Some(module), Some(sky)) => Some(create_render_pipeline(
                device,
                PipelineDesc {
                    module,
                    entry_points: ["vs_main", "fs_main"],
                    vertex_buffers: &[SkyboxResources::vertex_layout()],
                    bind_group_layouts: &[&sky.uniforms.bind_group_layout, &sky.texture_layout],
                    color_targets: &[simple_color_state(surface.format())],
                    depth_target: simple_depth_state(wgpu::CompareFunction::LessEqual, false),
                    cull_mode: None,
                    label: Some("advanced_skybox"),
                },
            )),
            _ => None,
        };

        let lit = if resources.has_light {
            let size = ADVANCED_TARGET_SIZE;
            let light_map = create_render_texture(
                device,
                size,
                size,
                LIGHT_DEPTH_FORMAT,
                create_sampler_linear(device),
                Some("light_depth_map"),
            );
            let blur_map = create_render_texture(
                device,
                size,
                size,
                LIGHT_DEPTH_FORMAT,
                create_sampler_linear(device),
                Some("light_depth_blur"),
            );
            let light_depth = create_depth_texture(device, size, size, Some("light_depth"));
            let horizontal = ShaderUniforms::new(device, blur_step(true));
            let vertical = ShaderUniforms::new(device, blur_step(false));

            let depth_pipeline = create_render_pipeline(
                device,
                PipelineDesc {
                    module: &module,
                    entry_points: ["vs_depth", "fs_depth"],
                    vertex_buffers: &vertex_buffers,
                    bind_group_layouts: &[
                        &resources.frame.bind_group_layout,
                        &resources.objects.bind_group_layout,
                    ],
                    color_targets: &[simple_color_state(LIGHT_DEPTH_FORMAT)],
                    depth_target: simple_depth_state(wgpu::CompareFunction::Less, true),
                    cull_mode: None,
                    label: Some("advanced_light_depth"),
                },
            );
            let blur_pipeline = create_fullscreen_pipeline(
                device,
                &filter_module,
                "fs_blur",
                &[&sampled_layout, &horizontal.bind_group_layout],
                LIGHT_DEPTH_FORMAT,
                "advanced_blur",
            );
            let scene_pipeline = create_render_pipeline(
                device,
                PipelineDesc {
                    module: &module,
                    entry_points: ["vs_scene", "fs_scene"],
                    vertex_buffers: &vertex_buffers,
                    bind_group_layouts: &[
                        &resources.frame.bind_group_layout,
                        &resources.objects.bind_group_layout,
                        &resources.texture_layout,
                        &sampled_layout,
                    ],
                    color_targets: &[
                        simple_color_state(SCENE_COLOR_FORMAT),
                        simple_color_state(VELOCITY_FORMAT),
                    ],
                    depth_target: simple_depth_state(wgpu::CompareFunction::Less, true),
                    cull_mode: None,
                    label: Some("advanced_scene"),
                },
            );
            let final_pipeline = create_fullscreen_pipeline(
                device,
                &filter_module,
                "fs_motion_blur",
                &[&sampled_layout, &horizontal.bind_group_layout, &sampled_layout],
                surface.format(),
                "advanced_motion_blur",
            );
            let skybox_pipeline = match (skybox_module.as_ref(), resources.skybox.as_ref()) {
                (Some(module), Some(sky)) => Some(create_render_pipeline(
                    device,
                    PipelineDesc {
                        module,
                        entry_points: ["vs_main", "fs_velocity"],
                        vertex_buffers: &[SkyboxResources::vertex_layout()],
                        bind_group_layouts: &[&sky.uniforms.bind_group_layout, &sky.texture_layout],
                        color_targets: &[
                            simple_color_state(SCENE_COLOR_FORMAT),
                            simple_color_state(VELOCITY_FORMAT),
                        ],
                        depth_target: simple_depth_state(wgpu::CompareFunction::LessEqual, false),
                        cull_mode: None,
                        label: Some("advanced_skybox_velocity"),
                    },
                )),
                _ => None,
            };

            Some(LitPasses {
                light_map_bind_group: light_map.bind_group_for(device, &sampled_layout),
                light_map,
                blur_map_bind_group: blur_map.bind_group_for(device, &sampled_layout),
                blur_map,
                light_depth,
                horizontal,
                vertical,
                depth_pipeline,
                blur_pipeline,
                scene_pipeline,
                final_pipeline,
                skybox_pipeline,
            })
        } else {
            None
        };

        AdvancedRenderer {
            resources,
            sampled_layout,
            lit,
            diffuse_pipeline,
            skybox_pipeline,
            targets: None,
        }
    }

    fn draw_diffuse(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, targets: &SceneTargets) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("advanced_diffuse_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: true,
                },
            })],
            depth_stencil_attachment: targets.depth.to_depth_attachment(Some(1.0)),
        });
        pass.set_pipeline(&self.diffuse_pipeline);
        pass.set_bind_group(0, &self.resources.frame.bind_group, &[]);
        self.resources.draw_objects(&mut pass, 1, Some(2));
        if let (Some(pipeline), Some(sky)) = (self.skybox_pipeline.as_ref(), self.resources.skybox.as_ref()) {
            pass.set_pipeline(pipeline);
            sky.draw(&mut pass);
        }
    }

    fn draw_lit(&self, lit: &LitPasses, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, targets: &SceneTargets) {
        let resources = &self.resources;
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("advanced_light_depth_pass"),
                color_attachments: &[lit.light_map.to_color_attachment(Some(wgpu::Color::WHITE))],
                depth_stencil_attachment: lit.light_depth.to_depth_attachment(Some(1.0)),
            });
            pass.set_pipeline(&lit.depth_pipeline);
            pass.set_bind_group(0, &resources.frame.bind_group, &[]);
            resources.draw_objects(&mut pass, 1, None);
        }

        let blurs = [
            (&lit.light_map_bind_group, &lit.blur_map, &lit.horizontal),
            (&lit.blur_map_bind_group, &lit.light_map, &lit.vertical),
        ];
        for &(source, destination, params) in blurs.iter() {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("advanced_blur_pass"),
                color_attachments: &[destination.to_color_attachment(None)],
                depth_stencil_attachment: None,
            });
            pass.set_pipeline(&lit.blur_pipeline);
            pass.set_bind_group(0, source, &[]);
            pass.set_bind_group(1, &params.bind_group, &[]);
            pass.draw(0..6, 0..1);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("advanced_scene_pass"),
                color_attachments: &[
                    targets.color.to_color_attachment(Some(CLEAR_COLOR)),
                    targets.velocity.to_color_attachment(Some(NO_MOTION)),
                ],
                depth_stencil_attachment: targets.depth.to_depth_attachment(Some(1.0)),
            });
            pass.set_pipeline(&lit.scene_pipeline);
            pass.set_bind_group(0, &resources.frame.bind_group, &[]);
            pass.set_bind_group(3, &lit.light_map_bind_group, &[]);
            resources.draw_objects(&mut pass, 1, Some(2));
            if let (Some(pipeline), Some(sky)) = (lit.skybox_pipeline.as_ref(), resources.skybox.as_ref()) {
                pass.set_pipeline(pipeline);
                sky.draw(&mut pass);
            }
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("advanced_motion_blur_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: true,
                },
            })],
            depth_stencil_attachment: None,
        });
        pass.set_pipeline(&lit.final_pipeline);
        pass.set_bind_group(0, &targets.color_bind_group, &[]);
        pass.set_bind_group(1, &targets.params.bind_group, &[]);
        pass.set_bind_group(2, &targets.velocity_bind_group, &[]);
        pass.draw(0..6, 0..1);
    }
}

impl Renderer for AdvancedRenderer {
    fn reinit(&mut self, surface: &Surface, _world: &World, width: u32, height: u32) {
        let device = surface.device();
        let color = create_render_texture(
            device,
            width,
            height,
            SCENE_COLOR_FORMAT,
            create_sampler_linear(device),
            Some("scene_color"),
        );
        let velocity = create_render_texture(
            device,
            width,
            height,
            VELOCITY_FORMAT,
            create_sampler_linear(device),
            Some("scene_velocity"),
        );
        let params = ShaderUniforms::new(
            device,
            FilterUniforms {
                scale: [width as f32, height as f32],
                _pad: [0.0; 2],
            },
        );
        self.targets = Some(SceneTargets {
            depth: create_depth_texture(device, width, height, Some("scene_depth")),
            color_bind_group: color.bind_group_for(device, &self.sampled_layout),
            color,
            velocity_bind_group: velocity.bind_group_for(device, &self.sampled_layout),
            velocity,
            params,
        });
    }

    fn pre_draw_update(&mut self, surface: &Surface, world: &World) {
        self.resources
            .update(surface, world, ADVANCED_TARGET_SIZE as f32, 0.0);
    }

    fn draw(&mut self, _surface: &Surface, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let targets = match self.targets.as_ref() {
            Some(targets) => targets,
            None => return,
        };
        match self.lit.as_ref() {
            Some(lit) => self.draw_lit(lit, encoder, target, targets),
            None => self.draw_diffuse(encoder, target, targets),
        }
    }
}
