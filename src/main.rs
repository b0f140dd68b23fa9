use anyhow::Context;
use winit::dpi::PhysicalSize;
use winit::event_loop::EventLoop;
use winit::window::WindowBuilder;

use city_sky::app::{self, AppState};
use city_sky::debug_api::DebugApiConfig;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let debug_api = DebugApiConfig::from_env_args()?;
    log::info!(
        "debug api enabled: {}, bind: {}",
        debug_api.enabled,
        debug_api.bind_addr
    );

    let event_loop = EventLoop::new()?;

    let window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title("city-sky")
            .with_inner_size(PhysicalSize::new(1280, 720))
            .build(&event_loop)
            .context("failed to create window")?,
    ));

    let app = pollster::block_on(AppState::new(window, debug_api))?;

    app::run_event_loop(app, event_loop)
}
