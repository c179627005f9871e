//! Wayland wallpaper driver: renders into a `wlr-layer-shell` background
//! surface and paces frames off compositor callbacks.
//!
//! Layer surfaces take no pointer input (keyboard interactivity is `None`),
//! so the pointer stays at its resting position in the viewport center and
//! the background animates on time alone.

use std::ffi::c_void;
use std::ptr::NonNull;
use std::result::Result as StdResult;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, RawDisplayHandle,
    RawWindowHandle, WaylandDisplayHandle, WaylandWindowHandle, WindowHandle,
};
use smithay_client_toolkit::reexports::client::{
    globals::registry_queue_init,
    protocol::{wl_output, wl_surface},
    Connection, Proxy, QueueHandle,
};
use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState},
    delegate_compositor, delegate_layer, delegate_output, delegate_registry,
    output::{OutputHandler, OutputInfo, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    shell::wlr_layer::{
        Anchor, KeyboardInteractivity, Layer, LayerShell, LayerShellHandler, LayerSurface,
        LayerSurfaceConfigure,
    },
    shell::WaylandSurface,
};
use winit::dpi::PhysicalSize;

use glassfield::Pointer;

use crate::gpu::GpuState;
use crate::runtime::{SystemTimeSource, TimeSource};
use crate::types::RendererConfig;

pub(crate) fn run(config: &RendererConfig) -> Result<()> {
    let conn = Connection::connect_to_env().context("failed to connect to Wayland compositor")?;
    let (globals, mut event_queue) =
        registry_queue_init(&conn).context("failed to initialize Wayland registry queue")?;
    let qh = event_queue.handle();

    let compositor =
        CompositorState::bind(&globals, &qh).context("wl_compositor is not available")?;
    let layer_shell =
        LayerShell::bind(&globals, &qh).context("layer shell protocol is not available")?;

    let registry_state = RegistryState::new(&globals);
    let output_state = OutputState::new(&globals, &qh);

    let surface = compositor.create_surface(&qh);
    let target_output = output_state.outputs().next();
    let initial_output_size = target_output
        .as_ref()
        .and_then(|output| output_state.info(output))
        .and_then(output_info_physical_size);

    let layer_surface = layer_shell.create_layer_surface(
        &qh,
        surface,
        Layer::Background,
        Some("glasspaper".to_string()),
        target_output.as_ref(),
    );
    layer_surface.set_anchor(Anchor::TOP | Anchor::BOTTOM | Anchor::LEFT | Anchor::RIGHT);
    layer_surface.set_keyboard_interactivity(KeyboardInteractivity::None);
    layer_surface.set_exclusive_zone(-1);
    layer_surface.commit();

    let mut state = WallpaperState::new(
        registry_state,
        output_state,
        layer_surface,
        config.clone(),
        target_output,
        initial_output_size,
    );

    if let Some(fps) = config.target_fps.filter(|fps| *fps > 0.0) {
        state.target_interval = Some(Duration::from_secs_f32(1.0 / fps));
        tracing::info!("wallpaper fps cap set to {:.1} FPS", fps);
    }

    loop {
        event_queue
            .blocking_dispatch(&mut state)
            .context("error while processing Wayland events")?;
        if state.should_exit {
            break;
        }
    }

    Ok(())
}

struct WallpaperState {
    registry_state: RegistryState,
    output_state: OutputState,
    layer_surface: LayerSurface,
    config: RendererConfig,
    gpu: Option<GpuState>,
    time: SystemTimeSource,
    frame_scheduled: bool,
    should_exit: bool,
    target_output: Option<wl_output::WlOutput>,
    last_output_size: Option<PhysicalSize<u32>>,
    // FPS cap state (None = render every callback).
    target_interval: Option<Duration>,
    accumulator: Duration,
    last_tick: Option<Instant>,
}

impl WallpaperState {
    fn new(
        registry_state: RegistryState,
        output_state: OutputState,
        layer_surface: LayerSurface,
        config: RendererConfig,
        target_output: Option<wl_output::WlOutput>,
        last_output_size: Option<PhysicalSize<u32>>,
    ) -> Self {
        Self {
            registry_state,
            output_state,
            layer_surface,
            config,
            gpu: None,
            time: SystemTimeSource::new(),
            frame_scheduled: false,
            should_exit: false,
            target_output,
            last_output_size,
            target_interval: None,
            accumulator: Duration::ZERO,
            last_tick: None,
        }
    }

    fn ensure_gpu(&mut self, conn: &Connection, size: PhysicalSize<u32>) -> Result<bool> {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(size);
            return Ok(false);
        }

        let handle = WaylandSurfaceHandle::new(conn, &self.layer_surface);
        let gpu = GpuState::new(&handle, size, &self.config)?;
        tracing::info!("initialised wallpaper surface {}x{}", size.width, size.height);
        self.gpu = Some(gpu);
        self.time.reset();
        self.accumulator = Duration::ZERO;
        self.last_tick = Some(Instant::now());
        Ok(true)
    }

    fn schedule_frame(&mut self, qh: &QueueHandle<Self>) {
        if self.frame_scheduled || self.gpu.is_none() {
            return;
        }
        let surface = self.layer_surface.wl_surface();
        surface.frame(qh, surface.clone());
        self.frame_scheduled = true;
        self.layer_surface.commit();
    }

    fn render_tick(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let pointer = Pointer::centered(gpu.viewport());
        let sample = self.time.sample();
        if let Err(err) = gpu.render_frame(pointer, sample) {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    let size = gpu.size();
                    gpu.resize(size);
                }
                wgpu::SurfaceError::OutOfMemory => {
                    tracing::error!("surface out of memory; exiting wallpaper loop");
                    self.should_exit = true;
                }
                other => {
                    tracing::warn!("surface error: {other:?}; retrying next frame");
                }
            }
        }
    }

    /// FPS pacing: true when this callback should actually render.
    fn should_render(&mut self) -> bool {
        let (Some(interval), Some(last)) = (self.target_interval, self.last_tick) else {
            return true;
        };
        let now = Instant::now();
        let delta = now.saturating_duration_since(last);
        self.last_tick = Some(now);
        self.accumulator = self.accumulator.saturating_add(delta);
        if self.accumulator + Duration::from_micros(250) < interval {
            false
        } else {
            // Subtract only one interval to avoid a burst after long gaps.
            self.accumulator = self.accumulator.saturating_sub(interval);
            true
        }
    }

    fn infer_output_size(&self) -> Option<PhysicalSize<u32>> {
        if let Some(output) = self.target_output.as_ref() {
            if let Some(info) = self.output_state.info(output) {
                return output_info_physical_size(info);
            }
        }
        self.last_output_size
    }

    fn resolve_configure_size(&self, new_size: (u32, u32)) -> PhysicalSize<u32> {
        if new_size.0 == 0 || new_size.1 == 0 {
            let fallback =
                PhysicalSize::new(self.config.surface_size.0, self.config.surface_size.1);
            self.infer_output_size().unwrap_or(fallback)
        } else {
            PhysicalSize::new(new_size.0.max(1), new_size.1.max(1))
        }
    }

    fn refresh_output_size(&mut self, output: &wl_output::WlOutput) {
        if let Some(info) = self.output_state.info(output) {
            let physical = output_info_physical_size(info);
            if self
                .target_output
                .as_ref()
                .map(|current| current == output)
                .unwrap_or(false)
            {
                self.last_output_size = physical;
            } else if self.target_output.is_none() {
                self.target_output = Some(output.clone());
                self.last_output_size = physical;
            }
        }
    }
}

impl CompositorHandler for WallpaperState {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_factor: i32,
    ) {
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
    }

    fn frame(
        &mut self,
        conn: &Connection,
        qh: &QueueHandle<Self>,
        surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
        if surface != self.layer_surface.wl_surface() {
            return;
        }

        self.frame_scheduled = false;

        if self.gpu.is_some() {
            if self.should_render() {
                self.render_tick();
            }
            // Always commit to keep callbacks flowing.
            self.layer_surface.commit();
        } else if let Some(size) = self.infer_output_size() {
            match self.ensure_gpu(conn, size) {
                Ok(true) => {
                    self.render_tick();
                    self.layer_surface.commit();
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::error!("failed to initialize GPU for wallpaper: {err:?}");
                    self.should_exit = true;
                    return;
                }
            }
        }

        self.schedule_frame(qh);
    }
}

impl LayerShellHandler for WallpaperState {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        self.should_exit = true;
    }

    fn configure(
        &mut self,
        conn: &Connection,
        qh: &QueueHandle<Self>,
        _layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        let size = self.resolve_configure_size(configure.new_size);
        self.layer_surface.set_size(size.width, size.height);
        self.last_output_size = Some(size);
        tracing::info!(
            "layer configure new_size={}x{} -> using {}x{}",
            configure.new_size.0,
            configure.new_size.1,
            size.width,
            size.height
        );

        match self.ensure_gpu(conn, size) {
            Ok(created) => {
                if created {
                    self.render_tick();
                    self.layer_surface.commit();
                }
            }
            Err(err) => {
                tracing::error!("failed to prepare GPU for wallpaper: {err:?}");
                self.should_exit = true;
                return;
            }
        }

        self.schedule_frame(qh);
    }
}

impl OutputHandler for WallpaperState {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        output: wl_output::WlOutput,
    ) {
        self.refresh_output_size(&output);
    }

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        output: wl_output::WlOutput,
    ) {
        self.refresh_output_size(&output);
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        output: wl_output::WlOutput,
    ) {
        if self
            .target_output
            .as_ref()
            .map(|current| current == &output)
            .unwrap_or(false)
        {
            self.target_output = None;
            self.last_output_size = None;
        }
    }
}

impl ProvidesRegistryState for WallpaperState {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    registry_handlers![OutputState];
}

delegate_compositor!(WallpaperState);
delegate_output!(WallpaperState);
delegate_layer!(WallpaperState);
delegate_registry!(WallpaperState);

/// Raw-handle shim that lets `wgpu` target the layer surface directly.
struct WaylandSurfaceHandle {
    display: *mut c_void,
    surface: *mut c_void,
}

impl WaylandSurfaceHandle {
    fn new(conn: &Connection, layer_surface: &LayerSurface) -> Self {
        let display = conn.backend().display_ptr() as *mut c_void;
        let surface = layer_surface.wl_surface().id().as_ptr() as *mut c_void;
        Self { display, surface }
    }
}

impl HasDisplayHandle for WaylandSurfaceHandle {
    fn display_handle(&self) -> StdResult<DisplayHandle<'_>, HandleError> {
        let display = NonNull::new(self.display).ok_or(HandleError::Unavailable)?;
        let wayland = WaylandDisplayHandle::new(display);
        let raw = RawDisplayHandle::Wayland(wayland);
        Ok(unsafe { DisplayHandle::borrow_raw(raw) })
    }
}

impl HasWindowHandle for WaylandSurfaceHandle {
    fn window_handle(&self) -> StdResult<WindowHandle<'_>, HandleError> {
        let surface = NonNull::new(self.surface).ok_or(HandleError::Unavailable)?;
        let wayland = WaylandWindowHandle::new(surface);
        let raw = RawWindowHandle::Wayland(wayland);
        Ok(unsafe { WindowHandle::borrow_raw(raw) })
    }
}

fn output_info_physical_size(info: OutputInfo) -> Option<PhysicalSize<u32>> {
    if let Some(mode) = info.modes.iter().find(|mode| mode.current) {
        let width = mode.dimensions.0.max(1) as u32;
        let height = mode.dimensions.1.max(1) as u32;
        return Some(PhysicalSize::new(width, height));
    }

    if let Some((width, height)) = info.logical_size {
        let scale = info.scale_factor.max(1) as u32;
        return Some(PhysicalSize::new(
            (width.max(1) as u32) * scale,
            (height.max(1) as u32) * scale,
        ));
    }

    None
}
