use crate::*;
use log::{error, info};
use std::cell::RefCell;
use std::time::Duration;
use winit::{
    dpi::*,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    platform::run_return::EventLoopExtRunReturn,
    window::{Fullscreen, WindowBuilder},
};

/// A desktop window with its rendering [Surface].
pub struct Window {
    winit_window: winit::window::Window,
    events_loop: RefCell<EventLoop<()>>,
    pub surface: Surface,
}

/// What happened during one [Window::poll_events] call.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct WindowEvents {
    /// Escape or close; treated as back navigation.
    pub closed: bool,
    pub resized: Option<[u32; 2]>,
}

impl Window {
    pub async fn new(visible: bool, fullscreen: bool) -> Result<Self, RenderError> {
        let events_loop = EventLoop::new();

        let mut window_builder = WindowBuilder::new()
            .with_title("GPU Emulation Stress Test")
            .with_min_inner_size(LogicalSize::new(320.0, 240.0))
            .with_inner_size(LogicalSize::new(1280.0, 720.0))
            .with_visible(visible);
        if fullscreen {
            window_builder = window_builder.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let winit_window = window_builder
            .build(&events_loop)
            .map_err(RenderError::Window)?;
        winit_window.set_cursor_visible(false);
        let window_size = winit_window.inner_size();

        let surface = Surface::new([window_size.width, window_size.height], &winit_window).await?;

        Ok(Window {
            winit_window,
            events_loop: RefCell::new(events_loop),
            surface,
        })
    }

    pub fn size(&self) -> [u32; 2] {
        let size = self.winit_window.inner_size();
        [size.width, size.height]
    }

    pub fn poll_events(&self) -> WindowEvents {
        let mut events = WindowEvents::default();

        self.events_loop
            .borrow_mut()
            .run_return(|event, _, control_flow| match event {
                Event::WindowEvent {
                    window_id,
                    ref event,
                } if window_id == self.winit_window.id() => match event {
                    WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                virtual_keycode: Some(VirtualKeyCode::Escape),
                                state: ElementState::Pressed,
                                ..
                            },
                        ..
                    }
                    | WindowEvent::CloseRequested
                    | WindowEvent::Destroyed => {
                        events.closed = true;
                    }
                    WindowEvent::Resized(size) => {
                        events.resized = Some([size.width, size.height]);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        events.resized = Some([new_inner_size.width, new_inner_size.height]);
                    }
                    _ => (),
                },
                Event::RedrawEventsCleared => {
                    *control_flow = ControlFlow::Exit;
                    self.winit_window.request_redraw();
                }
                _ => {}
            });

        events
    }

    /// Runs `view` until `screen` reports a result or the window closes.
    ///
    /// Returns the result extras, or `None` if the run was cancelled.
    pub fn run_benchmark(
        &self,
        view: &mut BenchmarkView,
        screen: &mut BenchmarkScreen,
    ) -> Result<Option<ValueMap>, RenderError> {
        let [width, height] = self.size();
        view.on_resize(&self.surface, width, height)?;

        loop {
            let events = self.poll_events();
            if events.closed {
                info!("window closed");
                screen.destroy();
                return Ok(None);
            }
            if let Some([width, height]) = events.resized {
                view.on_resize(&self.surface, width, height)?;
            }

            match view.on_draw_frame(&self.surface) {
                Ok(FrameStatus::Idle) => {
                    let wait = view.world().micros_until_next_frame();
                    std::thread::sleep(Duration::from_micros(wait));
                }
                Ok(_) => {}
                Err(err) => {
                    error!("frame failed: {}", err);
                    screen.destroy();
                    return Err(err);
                }
            }

            match screen.poll() {
                Some(extras) => return Ok(Some(extras)),
                None if screen.state() == SessionState::Cancelled => return Ok(None),
                None => {}
            }
        }
    }
}
