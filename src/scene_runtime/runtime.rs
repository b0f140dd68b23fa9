use chrono::NaiveDateTime;

use crate::sky_core::clock::{ClockState, SceneClock};
use crate::sky_core::state::{self, VisualParameters};
use crate::sky_core::suntimes::TimeWindow;

pub struct SceneStats {
    pub mode: &'static str,
    pub scene_time: NaiveDateTime,
    pub period: Option<&'static str>,
    pub playing: bool,
    pub speed: i32,
    pub has_window: bool,
}

/// Owns the virtual clock, the sunrise/sunset bounds, and the last
/// evaluated parameter bundle. All mutation happens on the frame loop
/// thread; UI and remote commands land here before the next frame's
/// evaluation, each forcing one immediate recompute.
pub struct SceneRuntime {
    clock: SceneClock,
    window: Option<TimeWindow>,
    params: Option<VisualParameters>,
}

impl SceneRuntime {
    pub fn new(speed_minutes_per_second: i32) -> Self {
        Self {
            clock: SceneClock::new(speed_minutes_per_second),
            window: None,
            params: None,
        }
    }

    /// Install sunrise/sunset bounds (fetch completion) and bring the
    /// scene up to date. Until this happens every evaluation is
    /// skipped; no partial parameters are ever produced.
    pub fn provide_window(&mut self, window: TimeWindow, wall_now: NaiveDateTime) {
        log::info!(
            "sun times: sunrise {} sunset {}",
            window.sunrise.time(),
            window.sunset.time()
        );
        self.window = Some(window);
        self.evaluate_at(self.clock.current_time(wall_now));
    }

    pub fn window(&self) -> Option<&TimeWindow> {
        self.window.as_ref()
    }

    pub fn params(&self) -> Option<&VisualParameters> {
        self.params.as_ref()
    }

    pub fn speed(&self) -> i32 {
        self.clock.speed()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    /// Per-frame driver. Returns true when the parameter bundle was
    /// recomputed and the renderer should re-upload.
    pub fn update(&mut self, dt_seconds: f32, wall_now: NaiveDateTime) -> bool {
        match self.clock.tick(dt_seconds, wall_now) {
            Some(instant) => self.evaluate_at(instant),
            None => false,
        }
    }

    pub fn set_time(&mut self, time: NaiveDateTime) {
        self.clock.set_time(time);
        self.evaluate_at(time);
    }

    pub fn reset_to_now(&mut self, wall_now: NaiveDateTime) {
        self.clock.reset_to_now();
        self.evaluate_at(wall_now);
    }

    pub fn toggle_playback(&mut self, wall_now: NaiveDateTime) {
        self.clock.toggle_playback(wall_now);
        self.evaluate_at(self.clock.current_time(wall_now));
    }

    pub fn set_playing(&mut self, playing: bool, wall_now: NaiveDateTime) {
        if self.clock.is_playing() != playing {
            self.toggle_playback(wall_now);
        }
    }

    pub fn set_speed(&mut self, speed: i32) -> Result<i32, String> {
        self.clock.set_speed(speed)
    }

    pub fn stats(&self, wall_now: NaiveDateTime) -> SceneStats {
        let mode = match self.clock.state() {
            ClockState::RealTime => "live",
            ClockState::Virtual { playing: true, .. } => "timelapse",
            ClockState::Virtual { playing: false, .. } => "paused",
        };
        SceneStats {
            mode,
            scene_time: self.clock.current_time(wall_now),
            period: self.params.as_ref().map(|p| p.period_label),
            playing: self.clock.is_playing(),
            speed: self.clock.speed(),
            has_window: self.window.is_some(),
        }
    }

    fn evaluate_at(&mut self, instant: NaiveDateTime) -> bool {
        let Some(window) = &self.window else {
            return false;
        };
        self.params = Some(state::evaluate(instant, window));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::SceneRuntime;
    use crate::sky_core::suntimes::TimeWindow;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn window() -> TimeWindow {
        TimeWindow::new(at(6, 30), at(19, 45)).unwrap()
    }

    #[test]
    fn nothing_is_evaluated_before_bounds_arrive() {
        let mut runtime = SceneRuntime::new(60);

        assert!(!runtime.update(1.5, at(12, 0)));
        assert!(runtime.params().is_none());

        runtime.set_time(at(15, 0));
        runtime.toggle_playback(at(15, 0));
        assert!(!runtime.update(1.0, at(12, 0)));
        assert!(runtime.params().is_none());
    }

    #[test]
    fn bounds_arrival_evaluates_immediately() {
        let mut runtime = SceneRuntime::new(60);
        runtime.provide_window(window(), at(13, 7));

        let params = runtime.params().expect("evaluated on arrival");
        assert_eq!(params.period_label, "Afternoon Daze");
    }

    #[test]
    fn slider_interaction_recomputes_before_the_next_frame() {
        let mut runtime = SceneRuntime::new(60);
        runtime.provide_window(window(), at(12, 0));

        runtime.set_time(at(2, 0));
        let params = runtime.params().unwrap();
        assert_eq!(params.period_label, "Deep into the Night");
        assert!(params.stars_visible);

        // The paused clock holds that state across frames.
        assert!(!runtime.update(5.0, at(12, 0)));
        assert_eq!(runtime.params().unwrap().period_label, "Deep into the Night");
    }

    #[test]
    fn timelapse_reevaluates_every_frame() {
        let mut runtime = SceneRuntime::new(60);
        runtime.provide_window(window(), at(12, 0));
        runtime.set_time(at(6, 0));
        runtime.toggle_playback(at(12, 0));

        // One second at 60x: 06:00 -> 07:00, into dawn->morning.
        assert!(runtime.update(1.0, at(12, 0)));
        assert_eq!(runtime.params().unwrap().period_label, "New Beginning Light");
    }

    #[test]
    fn stats_reflect_the_clock_mode() {
        let mut runtime = SceneRuntime::new(60);
        assert_eq!(runtime.stats(at(9, 0)).mode, "live");
        assert!(!runtime.stats(at(9, 0)).has_window);

        runtime.set_time(at(9, 30));
        assert_eq!(runtime.stats(at(9, 0)).mode, "paused");

        runtime.toggle_playback(at(9, 0));
        assert_eq!(runtime.stats(at(9, 0)).mode, "timelapse");

        runtime.reset_to_now(at(9, 0));
        assert_eq!(runtime.stats(at(9, 0)).mode, "live");
    }
}
