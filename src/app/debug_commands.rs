use std::time::{Duration, Instant};

use chrono::NaiveDateTime;

use crate::debug_api::{CommandAppliedEvent, CommandKind, TelemetrySnapshot};

use super::AppState;

impl AppState {
    pub(super) fn apply_debug_commands(&mut self, wall_now: NaiveDateTime) {
        let commands: Vec<_> = self
            .debug_api
            .as_mut()
            .map(|api| api.drain_commands())
            .unwrap_or_default();

        for command in commands {
            let applied = match command.command {
                CommandKind::SetSpeed { value } => match self.runtime.set_speed(value) {
                    Ok(speed) => CommandAppliedEvent {
                        id: command.id,
                        frame: self.frame_index,
                        ok: true,
                        message: "timelapse speed set".to_string(),
                        speed: Some(speed),
                    },
                    Err(message) => CommandAppliedEvent {
                        id: command.id,
                        frame: self.frame_index,
                        ok: false,
                        message,
                        speed: Some(self.runtime.speed()),
                    },
                },
                CommandKind::SetTime { hour, minute } => {
                    match wall_now.date().and_hms_opt(hour, minute, 0) {
                        Some(time) => {
                            self.runtime.set_time(time);
                            self.needs_apply = true;
                            CommandAppliedEvent {
                                id: command.id,
                                frame: self.frame_index,
                                ok: true,
                                message: format!("scene time set to {hour:02}:{minute:02}"),
                                speed: None,
                            }
                        }
                        None => CommandAppliedEvent {
                            id: command.id,
                            frame: self.frame_index,
                            ok: false,
                            message: format!("invalid time of day: {hour}:{minute}"),
                            speed: None,
                        },
                    }
                }
                CommandKind::SetPlaying { value } => {
                    self.runtime.set_playing(value, wall_now);
                    self.needs_apply = true;
                    CommandAppliedEvent {
                        id: command.id,
                        frame: self.frame_index,
                        ok: true,
                        message: if value {
                            "timelapse playing".to_string()
                        } else {
                            "timelapse paused".to_string()
                        },
                        speed: None,
                    }
                }
                CommandKind::ResetNow => {
                    self.runtime.reset_to_now(wall_now);
                    self.needs_apply = true;
                    CommandAppliedEvent {
                        id: command.id,
                        frame: self.frame_index,
                        ok: true,
                        message: "clock reset to wall time".to_string(),
                        speed: None,
                    }
                }
                CommandKind::TakeScreenshot => {
                    if self.screenshot_pending.is_some() {
                        CommandAppliedEvent {
                            id: command.id,
                            frame: self.frame_index,
                            ok: false,
                            message: "screenshot already pending".to_string(),
                            speed: None,
                        }
                    } else {
                        self.screenshot_pending = Some(command.id);
                        continue;
                    }
                }
            };

            if let Some(api) = &self.debug_api {
                api.publish_command_applied(applied);
            }
        }
    }

    pub(super) fn publish_telemetry_if_due(&mut self, wall_now: NaiveDateTime) {
        let Some(api) = &self.debug_api else {
            return;
        };

        if self.last_telemetry_emit.elapsed() < Duration::from_millis(100) {
            return;
        }

        let stats = self.runtime.stats(wall_now);
        let params = self.runtime.params();

        let telemetry = TelemetrySnapshot {
            frame: self.frame_index,
            frame_time_ms: self.frame_time_ms,
            fps: 1000.0 / self.frame_time_ms.max(0.01),
            clock_mode: stats.mode.to_string(),
            scene_time: stats
                .has_window
                .then(|| stats.scene_time.format("%H:%M:%S").to_string()),
            speed: stats.speed,
            period: stats.period.map(str::to_string),
            sun_y: params.map(|p| p.sun_position.y),
            stars_visible: params.map(|p| p.stars_visible),
            sunrise: self
                .runtime
                .window()
                .map(|w| w.sunrise.format("%H:%M:%S").to_string()),
            sunset: self
                .runtime
                .window()
                .map(|w| w.sunset.format("%H:%M:%S").to_string()),
            timestamp_ms: now_timestamp_ms(),
        };

        api.publish_telemetry(telemetry);
        self.last_telemetry_emit = Instant::now();
    }
}

fn now_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
