//! Interactive preview window driver.
//!
//! winit delivers events one by one; cursor and resize events mutate the
//! pointer/viewport state strictly between frames, `RedrawRequested` renders
//! one frame, and `AboutToWait` schedules the next — unless the compositor
//! reported the window occluded, in which case scheduling stops until it
//! becomes visible again.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use glassfield::{Pointer, Viewport};

use crate::gpu::GpuState;
use crate::runtime::{SystemTimeSource, TimeSource};
use crate::types::RendererConfig;

pub(crate) fn run(config: &RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title("Glasspaper Preview")
        .with_inner_size(window_size)
        .build(&event_loop)
        .context("failed to create preview window")?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window.clone(), config)?;
    state.window().request_redraw();

    event_loop
        .run(move |event, elwt| {
            // Drive redraws via vblank by waiting between events.
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            elwt.exit();
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            state.pointer.handle_cursor_moved(position);
                        }
                        WindowEvent::Resized(new_size) => {
                            state.resize(new_size);
                        }
                        WindowEvent::ScaleFactorChanged {
                            mut inner_size_writer,
                            ..
                        } => {
                            // Keep the current logical size when the scale factor changes.
                            let _ = inner_size_writer.request_inner_size(state.size());
                        }
                        WindowEvent::Occluded(occluded) => {
                            state.set_hidden(occluded);
                            if !occluded {
                                state.window().request_redraw();
                            }
                        }
                        WindowEvent::RedrawRequested => match state.render_frame() {
                            Ok(()) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                state.resize(state.size());
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                tracing::error!("surface out of memory; exiting");
                                elwt.exit();
                            }
                            Err(other) => {
                                tracing::warn!("surface error: {other:?}; retrying next frame");
                            }
                        },
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    // Schedule the next frame unless the window is hidden;
                    // a later Occluded(false) restarts the loop.
                    if !state.hidden() {
                        state.window().request_redraw();
                    }
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

/// Aggregates window, GPU state, and input tracking for the preview path.
struct WindowState {
    window: Arc<Window>,
    gpu: GpuState,
    pointer: PointerTracker,
    time: SystemTimeSource,
    hidden: bool,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window.as_ref(), size, config)?;
        Ok(Self {
            window,
            gpu,
            pointer: PointerTracker::default(),
            time: SystemTimeSource::new(),
            hidden: false,
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    fn hidden(&self) -> bool {
        self.hidden
    }

    fn set_hidden(&mut self, hidden: bool) {
        if self.hidden != hidden {
            tracing::debug!(hidden, "visibility changed");
        }
        self.hidden = hidden;
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let pointer = self.pointer.resolve(self.gpu.viewport());
        let sample = self.time.sample();
        self.gpu.render_frame(pointer, sample)
    }
}

/// Tracks the cursor; until the first motion event the pointer rests at the
/// viewport center.
#[derive(Default)]
struct PointerTracker {
    position: Option<PhysicalPosition<f64>>,
}

impl PointerTracker {
    fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.position = Some(position);
    }

    fn resolve(&self, viewport: Viewport) -> Pointer {
        match self.position {
            Some(position) => Pointer {
                x: position.x as f32,
                y: position.y as f32,
            },
            None => Pointer::centered(viewport),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_rests_at_the_viewport_center() {
        let tracker = PointerTracker::default();
        let pointer = tracker.resolve(Viewport::new(800.0, 600.0));
        assert_eq!(pointer, Pointer { x: 400.0, y: 300.0 });
    }

    #[test]
    fn pointer_follows_the_cursor_once_seen() {
        let mut tracker = PointerTracker::default();
        tracker.handle_cursor_moved(PhysicalPosition::new(12.0, 34.0));
        let pointer = tracker.resolve(Viewport::new(800.0, 600.0));
        assert_eq!(pointer, Pointer { x: 12.0, y: 34.0 });
    }
}
