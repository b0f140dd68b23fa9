use egui::{Context, Event, Key, Modifiers, Pos2, RawInput, Rect, Vec2};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorIcon, Window};

/// Minimal winit-to-egui translation for the control panel. The panel
/// is sliders and buttons only, so this feeds pointer state, the
/// modifier keys (shift slows slider drags), and arrow keys; there is
/// no text input to forward.
pub struct EguiBridge {
    ctx: Context,
    events: Vec<Event>,
    pointer_pos: Pos2,
    modifiers: Modifiers,
    pixels_per_point: f32,
    screen_size: (u32, u32),
}

impl EguiBridge {
    pub fn new(pixels_per_point: f32, width: u32, height: u32) -> Self {
        Self {
            ctx: Context::default(),
            events: Vec::new(),
            pointer_pos: Pos2::ZERO,
            modifiers: Modifiers::NONE,
            pixels_per_point,
            screen_size: (width, height),
        }
    }

    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    pub fn pixels_per_point(&self) -> f32 {
        self.pixels_per_point
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.screen_size = (width, height);
    }

    /// Feed a winit WindowEvent. Returns true if egui wants the event
    /// (pointer over the panel, or a widget has keyboard focus).
    pub fn on_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let pos = Pos2::new(
                    position.x as f32 / self.pixels_per_point,
                    position.y as f32 / self.pixels_per_point,
                );
                self.pointer_pos = pos;
                self.events.push(Event::PointerMoved(pos));
                self.ctx.wants_pointer_input()
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(egui_button) = winit_button_to_egui(*button) {
                    self.events.push(Event::PointerButton {
                        pos: self.pointer_pos,
                        button: egui_button,
                        pressed: *state == ElementState::Pressed,
                        modifiers: self.modifiers,
                    });
                }
                self.ctx.wants_pointer_input()
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(x, y) => Vec2::new(*x, *y) * 24.0,
                    MouseScrollDelta::PixelDelta(d) => {
                        Vec2::new(d.x as f32, d.y as f32) / self.pixels_per_point
                    }
                };
                self.events.push(Event::MouseWheel {
                    unit: egui::MouseWheelUnit::Point,
                    delta: scroll,
                    modifiers: self.modifiers,
                });
                self.ctx.wants_pointer_input()
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;

                if let PhysicalKey::Code(code) = event.physical_key {
                    match code {
                        KeyCode::ShiftLeft | KeyCode::ShiftRight => {
                            self.modifiers.shift = pressed;
                        }
                        KeyCode::ControlLeft | KeyCode::ControlRight => {
                            self.modifiers.ctrl = pressed;
                            self.modifiers.command = pressed;
                        }
                        KeyCode::AltLeft | KeyCode::AltRight => {
                            self.modifiers.alt = pressed;
                        }
                        _ => {}
                    }

                    if let Some(key) = winit_key_to_egui(code) {
                        self.events.push(Event::Key {
                            key,
                            physical_key: None,
                            pressed,
                            repeat: false,
                            modifiers: self.modifiers,
                        });
                    }
                }

                self.ctx.wants_keyboard_input()
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.pixels_per_point = *scale_factor as f32;
                false
            }

            _ => false,
        }
    }

    /// Drain accumulated events into a RawInput for this frame.
    pub fn take_raw_input(&mut self) -> RawInput {
        let (w, h) = self.screen_size;
        let screen_rect = Rect::from_min_size(
            Pos2::ZERO,
            Vec2::new(
                w as f32 / self.pixels_per_point,
                h as f32 / self.pixels_per_point,
            ),
        );

        let mut raw = RawInput {
            screen_rect: Some(screen_rect),
            events: std::mem::take(&mut self.events),
            modifiers: self.modifiers,
            ..Default::default()
        };
        raw.viewports
            .entry(egui::ViewportId::ROOT)
            .or_default()
            .native_pixels_per_point = Some(self.pixels_per_point);
        raw
    }

    /// Apply egui platform output (cursor icon changes).
    pub fn handle_platform_output(&self, window: &Window, output: &egui::PlatformOutput) {
        let cursor = match output.cursor_icon {
            egui::CursorIcon::PointingHand => CursorIcon::Pointer,
            egui::CursorIcon::Grab => CursorIcon::Grab,
            egui::CursorIcon::Grabbing => CursorIcon::Grabbing,
            egui::CursorIcon::ResizeHorizontal => CursorIcon::EwResize,
            _ => CursorIcon::Default,
        };
        window.set_cursor_icon(cursor);
    }
}

fn winit_button_to_egui(button: MouseButton) -> Option<egui::PointerButton> {
    match button {
        MouseButton::Left => Some(egui::PointerButton::Primary),
        MouseButton::Right => Some(egui::PointerButton::Secondary),
        MouseButton::Middle => Some(egui::PointerButton::Middle),
        _ => None,
    }
}

fn winit_key_to_egui(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::ArrowDown => Some(Key::ArrowDown),
        KeyCode::ArrowUp => Some(Key::ArrowUp),
        KeyCode::ArrowLeft => Some(Key::ArrowLeft),
        KeyCode::ArrowRight => Some(Key::ArrowRight),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(Key::Enter),
        KeyCode::Tab => Some(Key::Tab),
        _ => None,
    }
}
