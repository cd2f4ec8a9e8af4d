use crate::*;
use log::{debug, info, warn};
use std::iter;

/// Outcome of one [BenchmarkView::on_draw_frame] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameStatus {
    /// A new animation frame was rendered and presented.
    Drawn,
    /// Nothing new to show yet.
    Idle,
    /// The run is over; carries the average fps.
    Finished(f32),
}

/// Drives the [World] and its [Renderer] from a host's per-frame and resize callbacks.
pub struct BenchmarkView {
    request: BenchmarkRequest,
    world: World,
    renderer: Option<Box<dyn Renderer>>,
    size: Option<[u32; 2]>,
    completion: CompletionSender,
}

impl BenchmarkView {
    /// Loads the benchmark scene sized to the requested object count.
    pub fn initialize(
        assets: &dyn AssetSource,
        request: &BenchmarkRequest,
        completion: CompletionSender,
    ) -> Result<Self, SceneError> {
        let world = World::load(assets, request.object_count)?;
        info!(
            "world loaded for {} with {} objects",
            request.api_level, request.object_count
        );
        Ok(BenchmarkView {
            request: *request,
            world,
            renderer: None,
            size: None,
            completion,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Adapts to a new drawable size, creating the renderer on first use.
    pub fn on_resize(&mut self, surface: &Surface, width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            debug!("ignoring resize to {}x{}", width, height);
            return Ok(());
        }
        if self.size == Some([width, height]) && self.renderer.is_some() {
            return Ok(());
        }

        surface.resize([width, height]);
        self.world.reset_aspect_ratio(width, height);

        if self.renderer.is_none() {
            self.renderer = Some(create_renderer(surface, &self.world, self.request.api_level)?);
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.reinit(surface, &self.world, width, height);
        }
        self.size = Some([width, height]);
        Ok(())
    }

    /// Advances the animation and draws if a new frame is due.
    ///
    /// Once the run is over the average fps is sent through the completion
    /// channel (once) and every later call reports [FrameStatus::Finished].
    pub fn on_draw_frame(&mut self, surface: &Surface) -> Result<FrameStatus, RenderError> {
        let renderer = match self.renderer.as_mut() {
            Some(renderer) => renderer,
            None => return Ok(FrameStatus::Idle),
        };

        if !self.world.update() {
            if self.world.is_done() {
                let fps = self.world.fps();
                if self.completion.complete(fps) {
                    info!("benchmark complete: {:.1} fps", fps);
                }
                return Ok(FrameStatus::Finished(fps));
            }
            return Ok(FrameStatus::Idle);
        }

        renderer.pre_draw_update(surface, &self.world);
        let output = match surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                warn!("surface lost, reconfiguring");
                surface.reconfigure();
                return Ok(FrameStatus::Idle);
            }
            Err(err) => return Err(err.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = surface
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        renderer.draw(surface, &mut encoder, &view);
        surface.queue().submit(iter::once(encoder.finish()));
        output.present();
        Ok(FrameStatus::Drawn)
    }
}
