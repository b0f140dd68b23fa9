use anyhow::Result;
use wgpu::SurfaceError;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::AppState;
use crate::ui::PanelAction;

pub fn run_event_loop(mut app: AppState, event_loop: EventLoop<()>) -> Result<()> {
    event_loop.run(move |event, target| {
        target.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { window_id, event } if window_id == app.window.id() => {
                // F1 toggles the control panel (intercept before egui)
                if let WindowEvent::KeyboardInput {
                    event: ref key_event,
                    ..
                } = event
                {
                    if key_event.state == ElementState::Pressed
                        && matches!(key_event.physical_key, PhysicalKey::Code(KeyCode::F1))
                    {
                        app.control_panel.toggle();
                        return;
                    }
                }

                let egui_wants_event = if app.control_panel.is_visible() {
                    app.egui_bridge.on_window_event(&event)
                } else {
                    false
                };

                match event {
                    WindowEvent::CloseRequested => target.exit(),
                    WindowEvent::KeyboardInput { event, .. }
                        if !egui_wants_event
                            && event.state == ElementState::Pressed
                            && matches!(event.physical_key, PhysicalKey::Code(KeyCode::Space)) =>
                    {
                        app.push_action(PanelAction::TogglePlayback);
                    }
                    WindowEvent::KeyboardInput { event, .. }
                        if event.state == ElementState::Pressed
                            && matches!(event.physical_key, PhysicalKey::Code(KeyCode::Escape)) =>
                    {
                        if app.control_panel.is_visible() {
                            app.control_panel.toggle();
                        }
                    }
                    WindowEvent::Resized(size) => app.resize(size),
                    WindowEvent::RedrawRequested => {
                        app.update();
                        match app.render() {
                            Ok(()) => {}
                            Err(SurfaceError::Lost) => app.resize(app.gpu.size),
                            Err(SurfaceError::OutOfMemory) => target.exit(),
                            Err(SurfaceError::Timeout | SurfaceError::Outdated) => {}
                            Err(e) => {
                                log::error!("surface error: {e}");
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
