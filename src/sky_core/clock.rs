use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};

/// How the scene decides what time it is. Exactly one of:
/// live wall-clock sampling, or an explicit virtual instant that is
/// either frozen (slider) or advancing (timelapse).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    RealTime,
    Virtual { time: NaiveDateTime, playing: bool },
}

/// Real-time mode samples the wall clock at most this often.
pub const REAL_TIME_POLL_SECONDS: f32 = 1.0;

/// Timelapse speeds beyond a full day per second are rejected.
pub const MAX_SPEED_MINUTES_PER_SECOND: i32 = 1440;

/// The virtual-clock driver. Owns all timelapse state and is fed
/// explicit frame deltas and wall-clock instants, so it runs (and
/// tests) without any display loop behind it.
#[derive(Debug)]
pub struct SceneClock {
    state: ClockState,
    speed_minutes_per_second: i32,
    last_seen_minute: Option<u32>,
    poll_accum_seconds: f32,
}

impl SceneClock {
    pub fn new(speed_minutes_per_second: i32) -> Self {
        Self {
            state: ClockState::RealTime,
            speed_minutes_per_second,
            last_seen_minute: None,
            poll_accum_seconds: REAL_TIME_POLL_SECONDS,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn speed(&self) -> i32 {
        self.speed_minutes_per_second
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, ClockState::Virtual { playing: true, .. })
    }

    /// The instant the scene should currently be evaluated at.
    pub fn current_time(&self, wall_now: NaiveDateTime) -> NaiveDateTime {
        match self.state {
            ClockState::RealTime => wall_now,
            ClockState::Virtual { time, .. } => time,
        }
    }

    /// Slider interaction: freeze the clock at an explicit instant.
    /// Any running timelapse pauses.
    pub fn set_time(&mut self, time: NaiveDateTime) {
        self.state = ClockState::Virtual {
            time,
            playing: false,
        };
    }

    /// "Now" reset: back to live wall-clock sampling.
    pub fn reset_to_now(&mut self) {
        self.state = ClockState::RealTime;
        self.last_seen_minute = None;
        self.poll_accum_seconds = REAL_TIME_POLL_SECONDS;
    }

    /// Play/pause toggle. Starting from real time seeds the virtual
    /// clock with the current wall-clock instant.
    pub fn toggle_playback(&mut self, wall_now: NaiveDateTime) {
        self.state = match self.state {
            ClockState::RealTime => ClockState::Virtual {
                time: wall_now,
                playing: true,
            },
            ClockState::Virtual { time, playing } => ClockState::Virtual {
                time,
                playing: !playing,
            },
        };
    }

    /// Adjust the timelapse rate without touching the virtual instant.
    pub fn set_speed(&mut self, speed: i32) -> Result<i32, String> {
        if speed.abs() > MAX_SPEED_MINUTES_PER_SECOND {
            return Err(format!(
                "speed must be within +-{MAX_SPEED_MINUTES_PER_SECOND} minutes per second"
            ));
        }
        self.speed_minutes_per_second = speed;
        Ok(speed)
    }

    /// Per-frame advance. Returns the instant to re-evaluate the scene
    /// at, or `None` when nothing changed this frame:
    /// - playing: virtual time moves by speed * dt; crossing a calendar
    ///   day truncates to 00:00:00 of the day landed on (a reset, not
    ///   rollover arithmetic);
    /// - paused: never; only direct interaction moves a paused clock;
    /// - real time: at most one wall-clock sample per second, and a
    ///   recompute only when the minute value actually changed.
    pub fn tick(&mut self, dt_seconds: f32, wall_now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self.state {
            ClockState::Virtual {
                time,
                playing: true,
            } => {
                let delta_ms =
                    (self.speed_minutes_per_second as f64 * 60_000.0 * dt_seconds as f64).round();
                let mut advanced = time + Duration::milliseconds(delta_ms as i64);
                if advanced.date() != time.date() {
                    advanced = advanced.date().and_time(NaiveTime::MIN);
                }
                self.state = ClockState::Virtual {
                    time: advanced,
                    playing: true,
                };
                Some(advanced)
            }
            ClockState::Virtual { playing: false, .. } => None,
            ClockState::RealTime => {
                self.poll_accum_seconds += dt_seconds;
                if self.poll_accum_seconds < REAL_TIME_POLL_SECONDS {
                    return None;
                }
                self.poll_accum_seconds = 0.0;

                let minute_of_day = wall_now.hour() * 60 + wall_now.minute();
                if self.last_seen_minute == Some(minute_of_day) {
                    return None;
                }
                self.last_seen_minute = Some(minute_of_day);
                Some(wall_now)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ClockState, SceneClock};
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn timelapse_crossing_midnight_resets_to_the_start_of_the_new_day() {
        let mut clock = SceneClock::new(60);
        clock.set_time(at(23, 59));
        clock.toggle_playback(at(0, 0));

        // 60 simulated minutes per second for two seconds: two hours,
        // straight across midnight.
        let advanced = clock.tick(2.0, at(0, 0)).unwrap();
        let next_day = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        assert_eq!(advanced, next_day.and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn negative_speed_crossing_midnight_also_truncates() {
        let mut clock = SceneClock::new(-60);
        clock.set_time(at(0, 1));
        clock.toggle_playback(at(0, 0));

        let advanced = clock.tick(2.0, at(0, 0)).unwrap();
        let prev_day = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        assert_eq!(advanced, prev_day.and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn speed_change_mid_playback_keeps_the_current_instant() {
        let mut clock = SceneClock::new(60);
        clock.set_time(at(10, 0));
        clock.toggle_playback(at(0, 0));
        let after_first = clock.tick(1.0, at(0, 0)).unwrap();
        assert_eq!(after_first, at(11, 0));

        clock.set_speed(10).unwrap();
        match clock.state() {
            ClockState::Virtual { time, playing } => {
                assert_eq!(time, after_first);
                assert!(playing);
            }
            ClockState::RealTime => panic!("expected virtual state"),
        }

        let after_second = clock.tick(1.0, at(0, 0)).unwrap();
        assert_eq!(after_second, after_first + Duration::minutes(10));
    }

    #[test]
    fn out_of_range_speed_is_rejected_without_state_change() {
        let mut clock = SceneClock::new(60);
        assert!(clock.set_speed(100_000).is_err());
        assert_eq!(clock.speed(), 60);
    }

    #[test]
    fn paused_clock_never_advances_on_its_own() {
        let mut clock = SceneClock::new(60);
        clock.set_time(at(9, 0));
        for _ in 0..100 {
            assert_eq!(clock.tick(1.0, at(12, 0)), None);
        }
        assert_eq!(clock.current_time(at(12, 0)), at(9, 0));
    }

    #[test]
    fn slider_interaction_pauses_a_running_timelapse() {
        let mut clock = SceneClock::new(60);
        clock.toggle_playback(at(8, 0));
        assert!(clock.is_playing());

        clock.set_time(at(15, 30));
        assert!(!clock.is_playing());
        assert_eq!(clock.current_time(at(8, 0)), at(15, 30));
    }

    #[test]
    fn real_time_mode_recomputes_once_per_minute_change() {
        let mut clock = SceneClock::new(60);

        // First poll after construction samples immediately.
        assert_eq!(clock.tick(0.0, at(9, 15)), Some(at(9, 15)));

        // Same minute: polled but no recompute.
        assert_eq!(clock.tick(1.5, at(9, 15)), None);

        // Sub-second frames accumulate toward the poll gate.
        assert_eq!(clock.tick(0.4, at(9, 16)), None);
        assert_eq!(clock.tick(0.7, at(9, 16)), Some(at(9, 16)));
    }

    #[test]
    fn play_from_real_time_seeds_from_the_wall_clock() {
        let mut clock = SceneClock::new(60);
        clock.toggle_playback(at(14, 45));
        match clock.state() {
            ClockState::Virtual { time, playing } => {
                assert_eq!(time, at(14, 45));
                assert!(playing);
            }
            ClockState::RealTime => panic!("expected virtual state"),
        }

        clock.toggle_playback(at(20, 0));
        assert!(!clock.is_playing());
        // Pausing keeps the virtual instant; it does not resample.
        assert_eq!(clock.current_time(at(20, 0)), at(14, 45));
    }

    #[test]
    fn now_reset_returns_to_live_sampling() {
        let mut clock = SceneClock::new(60);
        clock.set_time(at(3, 0));
        clock.reset_to_now();
        assert_eq!(clock.state(), ClockState::RealTime);
        assert_eq!(clock.current_time(at(16, 20)), at(16, 20));
        // The next tick recomputes right away.
        assert_eq!(clock.tick(0.0, at(16, 20)), Some(at(16, 20)));
    }
}
