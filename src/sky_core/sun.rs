use chrono::NaiveDateTime;
use glam::Vec3;

pub const ORBIT_RADIUS: f32 = 60.0;
pub const ORBIT_Y_OFFSET: f32 = 5.0;
pub const ORBIT_DEPTH: f32 = -35.0;

/// Fraction of the sunrise-to-sunset span that has elapsed, clamped to
/// [-0.2, 1.2] so the sun can dip slightly below the horizon on either
/// side of the strict day window.
pub fn day_progress(now: NaiveDateTime, sunrise: NaiveDateTime, sunset: NaiveDateTime) -> f32 {
    let t = now.and_utc().timestamp_millis();
    let rise = sunrise.and_utc().timestamp_millis();
    let set = sunset.and_utc().timestamp_millis();
    let span = (set - rise).max(1);

    (((t - rise) as f64 / span as f64) as f32).clamp(-0.2, 1.2)
}

/// Map clamped day progress onto the sun's arc across the scene.
/// Progress 0.5 is the top of the arc; the 1.1 overscan pushes both
/// ends of the arc below the horizon line.
pub fn sun_position(progress: f32) -> Vec3 {
    let angle = (progress - 0.5) * std::f32::consts::PI * 1.1;
    Vec3::new(
        angle.sin() * ORBIT_RADIUS,
        angle.cos() * ORBIT_RADIUS + ORBIT_Y_OFFSET,
        ORBIT_DEPTH,
    )
}

/// Stars show only genuinely outside the daylight window. This is a
/// hard cut on day progress, independent of the smooth palette mix.
pub fn stars_visible(progress: f32) -> bool {
    progress < 0.0 || progress > 1.0
}

#[cfg(test)]
mod tests {
    use super::{day_progress, stars_visible, sun_position, ORBIT_RADIUS, ORBIT_Y_OFFSET};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn solar_midpoint_puts_the_sun_at_the_top_of_its_arc() {
        let progress = day_progress(at(13, 7), at(6, 30), at(19, 45));
        assert!((progress - 0.5).abs() < 0.01);

        let pos = sun_position(progress);
        assert!((pos.y - (ORBIT_RADIUS + ORBIT_Y_OFFSET)).abs() < 0.1);
        assert!(pos.x.abs() < 1.0);
    }

    #[test]
    fn progress_clamps_to_the_overscan_range() {
        assert_eq!(day_progress(at(0, 0), at(6, 30), at(19, 45)), -0.2);
        assert_eq!(day_progress(at(23, 59), at(6, 30), at(19, 45)), 1.2);
    }

    #[test]
    fn stars_show_outside_the_day_window_only() {
        let rise = at(6, 30);
        let set = at(19, 45);

        assert!(stars_visible(day_progress(at(3, 0), rise, set)));
        assert!(stars_visible(day_progress(at(22, 0), rise, set)));
        assert!(!stars_visible(day_progress(at(13, 7), rise, set)));
        // The boundary itself still counts as day.
        assert!(!stars_visible(day_progress(rise, rise, set)));
        assert!(!stars_visible(day_progress(set, rise, set)));
    }

    #[test]
    fn overscan_ends_sit_below_the_horizon() {
        assert!(sun_position(-0.2).y < 0.0);
        assert!(sun_position(1.2).y < 0.0);
    }
}
