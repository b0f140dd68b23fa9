use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Local, NaiveDateTime, Timelike};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::debug_api::{start_debug_api, DebugApiConfig, DebugApiHandle};
use crate::renderer_wgpu::camera::SceneCamera;
use crate::renderer_wgpu::egui_bridge::EguiBridge;
use crate::renderer_wgpu::egui_pass::EguiPass;
use crate::renderer_wgpu::gpu_context::GpuContext;
use crate::renderer_wgpu::scene::{self, SceneRenderer};
use crate::scene_runtime::{SceneRuntime, SunTimesFetcher};
use crate::sky_core::config::SceneConfig;
use crate::ui::{ControlPanel, PanelAction, PanelView};

mod debug_commands;
mod event_loop;
mod screenshot;

pub use event_loop::run_event_loop;

pub struct AppState {
    window: &'static Window,
    gpu: GpuContext,
    renderer: SceneRenderer,
    camera: SceneCamera,
    runtime: SceneRuntime,
    fetcher: Option<SunTimesFetcher>,
    config: SceneConfig,
    last_frame: Instant,
    frame_time_ms: f32,
    elapsed_seconds: f32,
    frame_index: u64,
    needs_apply: bool,
    pending_actions: Vec<PanelAction>,
    debug_api: Option<DebugApiHandle>,
    last_telemetry_emit: Instant,
    screenshot_pending: Option<String>,
    egui_bridge: EguiBridge,
    egui_pass: EguiPass,
    pub(crate) control_panel: ControlPanel,
}

impl AppState {
    pub async fn new(window: &'static Window, debug_api_config: DebugApiConfig) -> Result<Self> {
        let config = SceneConfig::load();

        let gpu = GpuContext::new(window).await?;
        let camera = SceneCamera::new();
        let renderer = SceneRenderer::new(&gpu.device, &gpu.config, &config);

        let runtime = SceneRuntime::new(config.timelapse.speed_minutes_per_second);

        log::info!(
            "fetching sun times for {} ({}, {})",
            config.location.name,
            config.location.latitude,
            config.location.longitude
        );
        let fetcher = Some(SunTimesFetcher::spawn(
            config.location.latitude,
            config.location.longitude,
            Local::now().date_naive(),
        ));

        let debug_api = start_debug_api(&debug_api_config)?;
        if let Some(api) = &debug_api {
            log::info!("debug api listening on {}", api.bind_addr());
        }

        let scale_factor = window.scale_factor() as f32;
        let egui_bridge = EguiBridge::new(scale_factor, gpu.config.width, gpu.config.height);
        let egui_pass = EguiPass::new(&gpu.device, gpu.config.format);
        let control_panel = ControlPanel::new(config.timelapse.speed_minutes_per_second);

        Ok(Self {
            window,
            gpu,
            renderer,
            camera,
            runtime,
            fetcher,
            config,
            last_frame: Instant::now(),
            frame_time_ms: 0.0,
            elapsed_seconds: 0.0,
            frame_index: 0,
            needs_apply: false,
            pending_actions: Vec::new(),
            debug_api,
            last_telemetry_emit: Instant::now() - Duration::from_secs(1),
            screenshot_pending: None,
            egui_bridge,
            egui_pass,
            control_panel,
        })
    }

    pub(crate) fn push_action(&mut self, action: PanelAction) {
        self.pending_actions.push(action);
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
        self.egui_bridge
            .resize(self.gpu.config.width, self.gpu.config.height);
    }

    fn update(&mut self) {
        self.frame_index = self.frame_index.saturating_add(1);

        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frame_time_ms = self.frame_time_ms * 0.94 + (dt * 1000.0) * 0.06;
        self.elapsed_seconds += dt;

        let wall_now = Local::now().naive_local();

        self.apply_debug_commands(wall_now);
        self.drain_fetch(wall_now);

        // Panel clicks from the previous frame's egui pass land before
        // this frame's evaluation.
        let actions: Vec<_> = self
            .control_panel
            .take_actions()
            .into_iter()
            .chain(self.pending_actions.drain(..))
            .collect();
        for action in actions {
            self.apply_action(action, wall_now);
        }

        if self.runtime.update(dt, wall_now) {
            self.needs_apply = true;
        }

        if self.needs_apply {
            if let Some(params) = self.runtime.params() {
                self.renderer.apply(&self.gpu.queue, params);
            }
            self.needs_apply = false;
        }

        let view_proj = self.camera.view_projection(self.gpu.aspect());
        self.renderer
            .update_frame(&self.gpu.queue, view_proj, &self.camera, self.elapsed_seconds);

        self.publish_telemetry_if_due(wall_now);

        let stats = self.runtime.stats(wall_now);
        self.window.set_title(&format!(
            "city-sky | {:.1}ms ({:.0}fps) | {} | {} | {}",
            self.frame_time_ms,
            1000.0 / self.frame_time_ms.max(0.01),
            stats.mode,
            stats.scene_time.format("%H:%M:%S"),
            stats.period.unwrap_or("waiting for sun times"),
        ));
    }

    fn drain_fetch(&mut self, wall_now: NaiveDateTime) {
        let Some(fetcher) = &self.fetcher else {
            return;
        };
        let Some(result) = fetcher.try_take() else {
            return;
        };
        self.fetcher = None;

        match result {
            Ok(window) => {
                self.runtime.provide_window(window, wall_now);
                self.needs_apply = true;
            }
            Err(e) => {
                // No retry: the scene keeps its pre-bounds look.
                log::warn!("sun times fetch failed: {e:#}");
            }
        }
    }

    fn apply_action(&mut self, action: PanelAction, wall_now: NaiveDateTime) {
        match action {
            PanelAction::SetTimeMinutes(minutes) => {
                match wall_now.date().and_hms_opt(minutes / 60, minutes % 60, 0) {
                    Some(time) => {
                        self.runtime.set_time(time);
                        self.needs_apply = true;
                    }
                    None => log::warn!("ignoring out-of-range slider time: {minutes} minutes"),
                }
            }
            PanelAction::ResetNow => {
                self.runtime.reset_to_now(wall_now);
                self.needs_apply = true;
            }
            PanelAction::TogglePlayback => {
                self.runtime.toggle_playback(wall_now);
                self.needs_apply = true;
            }
            PanelAction::SetSpeed(value) => {
                if let Err(message) = self.runtime.set_speed(value) {
                    log::warn!("rejected timelapse speed: {message}");
                }
            }
        }
    }

    fn panel_view(&self, wall_now: NaiveDateTime) -> PanelView {
        let stats = self.runtime.stats(wall_now);
        PanelView {
            location_name: self.config.location.name.clone(),
            date_label: wall_now.format("%A, %B %-d").to_string(),
            sunrise: self
                .runtime
                .window()
                .map(|w| w.sunrise.format("%-I:%M %p").to_string()),
            sunset: self
                .runtime
                .window()
                .map(|w| w.sunset.format("%-I:%M %p").to_string()),
            period: stats.period.map(str::to_string),
            mode: stats.mode,
            playing: stats.playing,
            scene_minutes: Some(stats.scene_time.hour() * 60 + stats.scene_time.minute()),
            speed: stats.speed,
        }
    }

    fn render(&mut self) -> Result<(), SurfaceError> {
        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("city-sky-render-encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene-render-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(scene::clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer.render(&mut pass);
        }

        // egui overlay on top of the scene
        if self.control_panel.is_visible() {
            let wall_now = Local::now().naive_local();
            let panel_view = self.panel_view(wall_now);

            let raw_input = self.egui_bridge.take_raw_input();
            let full_output = self.egui_bridge.ctx().run(raw_input, |ctx| {
                self.control_panel.ui(ctx, &panel_view);
            });

            self.egui_bridge
                .handle_platform_output(self.window, &full_output.platform_output);

            let screen = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
                pixels_per_point: self.egui_bridge.pixels_per_point(),
            };

            self.egui_pass.render(
                &self.gpu.device,
                &self.gpu.queue,
                &mut encoder,
                &view,
                screen,
                full_output,
                self.egui_bridge.ctx(),
            );
        }

        if let Some(command_id) = self.screenshot_pending.take() {
            self.handle_screenshot(command_id, &output.texture, encoder);
            output.present();
            return Ok(());
        }

        self.gpu.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}
