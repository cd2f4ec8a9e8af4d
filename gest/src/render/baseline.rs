use crate::*;

/// Bias subtracted from the light-space depth before the shadow test.
pub const SHADOW_DEPTH_BIAS: f32 = 0.0006;

const SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/baseline.wgsl")
);

struct ShadowPass {
    size: u32,
    map: Texture,
    bind_group: wgpu::BindGroup,
    depth_pipeline: wgpu::RenderPipeline,
    lit_pipeline: wgpu::RenderPipeline,
}

/// Renderer for [ApiLevel::Gles2]: one depth-only shadow pass from the light,
/// then the scene with a filtered shadow test.
pub struct BaselineRenderer {
    resources: SceneResources,
    shadow: Option<ShadowPass>,
    diffuse_pipeline: wgpu::RenderPipeline,
    skybox_pipeline: Option<wgpu::RenderPipeline>,
    depth: Option<Texture>,
}

impl BaselineRenderer {
    pub fn new(surface: &Surface, world: &World) -> Self {
        let device = surface.device();
        let resources = SceneResources::new(surface, world);
        let module = create_shader_module(device, SHADER, "baseline");
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
                label: Some("baseline_diffuse"),
            },
        );

        let shadow = if resources.has_light {
            let size = surface.max_shadow_map_size();
            let map = create_depth_texture(device, size, size, Some("shadow_map"));
            let shadow_layout = depth_bind_group_layout(device);
            let bind_group = depth_bind_group(device, &shadow_layout, &map);

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
                    color_targets: &[],
                    depth_target: simple_depth_state(wgpu::CompareFunction::Less, true),
                    cull_mode: None,
                    label: Some("baseline_shadow_depth"),
                },
            );
            let lit_pipeline = create_render_pipeline(
                device,
                PipelineDesc {
                    module: &module,
                    entry_points: ["vs_lit", "fs_lit"],
                    vertex_buffers: &vertex_buffers,
                    bind_group_layouts: &[
                        &resources.frame.bind_group_layout,
                        &resources.objects.bind_group_layout,
                        &resources.texture_layout,
                        &shadow_layout,
                    ],
                    color_targets: &[simple_color_state(surface.format())],
                    depth_target: simple_depth_state(wgpu::CompareFunction::Less, true),
                    cull_mode: None,
                    label: Some("baseline_lit"),
                },
            );
            Some(ShadowPass {
                size,
                map,
                bind_group,
                depth_pipeline,
                lit_pipeline,
            })
        } else {
            None
        };

        let skybox_pipeline = resources.skybox.as_ref().map(|sky| {
            let module = create_shader_module(device, include_str!("shaders/skybox.wgsl"), "skybox");
            create_render_pipeline(
                device,
                PipelineDesc {
                    module: &module,
                    entry_points: ["vs_main", "fs_main"],
                    vertex_buffers: &[SkyboxResources::vertex_layout()],
                    bind_group_layouts: &[&sky.uniforms.bind_group_layout, &sky.texture_layout],
                    color_targets: &[simple_color_state(surface.format())],
                    depth_target: simple_depth_state(wgpu::CompareFunction::LessEqual, false),
                    cull_mode: None,
                    label: Some("baseline_skybox"),
                },
            )
        });

        BaselineRenderer {
            resources,
            shadow,
            diffuse_pipeline,
            skybox_pipeline,
            depth: None,
        }
    }
}

impl Renderer for BaselineRenderer {
    fn reinit(&mut self, surface: &Surface, _world: &World, width: u32, height: u32) {
        self.depth = Some(create_depth_texture(
            surface.device(),
            width,
            height,
            Some("baseline_depth"),
        ));
    }

    fn pre_draw_update(&mut self, surface: &Surface, world: &World) {
        let shadow_size = self.shadow.as_ref().map_or(0, |s| s.size) as f32;
        self.resources
            .update(surface, world, shadow_size, SHADOW_DEPTH_BIAS);
    }

    fn draw(&mut self, _surface: &Surface, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let depth = match self.depth.as_ref() {
            Some(depth) => depth,
            None => return,
        };
        let resources = &self.resources;

        if let Some(shadow) = self.shadow.as_ref() {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("baseline_shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: shadow.map.to_depth_attachment(Some(1.0)),
            });
            pass.set_pipeline(&shadow.depth_pipeline);
            pass.set_bind_group(0, &resources.frame.bind_group, &[]);
            resources.draw_objects(&mut pass, 1, None);
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("baseline_scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: true,
                },
            })],
            depth_stencil_attachment: depth.to_depth_attachment(Some(1.0)),
        });
        match self.shadow.as_ref() {
            Some(shadow) => {
                pass.set_pipeline(&shadow.lit_pipeline);
                pass.set_bind_group(3, &shadow.bind_group, &[]);
            }
            None => pass.set_pipeline(&self.diffuse_pipeline),
        }
        pass.set_bind_group(0, &resources.frame.bind_group, &[]);
        resources.draw_objects(&mut pass, 1, Some(2));

        if let (Some(pipeline), Some(sky)) = (self.skybox_pipeline.as_ref(), resources.skybox.as_ref()) {
            pass.set_pipeline(pipeline);
            sky.draw(&mut pass);
        }
    }
}
