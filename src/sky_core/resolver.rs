use chrono::NaiveDateTime;

use super::palette::Phase;

/// One hour, the span of most phase transitions.
pub const TRANSITION_HOUR_MS: i64 = 3_600_000;
/// The stretched golden-hour transition leading into sunset.
pub const LONG_TRANSITION_MS: i64 = 5_400_000;

/// The pair of adjacent phases an instant falls between, with the
/// normalized blend fraction and the display label for that stretch
/// of the day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseBlend {
    pub from: Phase,
    pub to: Phase,
    pub mix: f32,
    pub label: &'static str,
}

fn millis(t: NaiveDateTime) -> i64 {
    t.and_utc().timestamp_millis()
}

/// Normalized position inside an interval. A non-positive span means
/// the interval has collapsed (pathologically close sunrise/sunset);
/// degrade to a step instead of dividing toward NaN or infinity.
fn fraction(elapsed: i64, span: i64) -> f32 {
    if span <= 0 {
        return 1.0;
    }
    (elapsed as f64 / span as f64) as f32
}

/// Partition the day around sunrise and sunset into eight half-open,
/// contiguous intervals and locate `now` in them. Every instant maps to
/// exactly one (from, to, mix) triple; `mix` is clamped to [0, 1].
pub fn resolve_phase(
    now: NaiveDateTime,
    sunrise: NaiveDateTime,
    sunset: NaiveDateTime,
) -> PhaseBlend {
    let t = millis(now);
    let rise = millis(sunrise);
    let set = millis(sunset);

    let (from, to, mix, label) = if t < rise - TRANSITION_HOUR_MS {
        (Phase::Night, Phase::Night, 0.0, "Deep into the Night")
    } else if t < rise {
        (
            Phase::Night,
            Phase::Dawn,
            fraction(t - (rise - TRANSITION_HOUR_MS), TRANSITION_HOUR_MS),
            "The Softest Blue Hour",
        )
    } else if t < rise + TRANSITION_HOUR_MS {
        (
            Phase::Dawn,
            Phase::Morning,
            fraction(t - rise, TRANSITION_HOUR_MS),
            "New Beginning Light",
        )
    } else if t < rise + 2 * TRANSITION_HOUR_MS {
        (
            Phase::Morning,
            Phase::Noon,
            fraction(t - (rise + TRANSITION_HOUR_MS), TRANSITION_HOUR_MS),
            "Late Morning Shine",
        )
    } else if t < set - LONG_TRANSITION_MS {
        let start = rise + 2 * TRANSITION_HOUR_MS;
        (
            Phase::Noon,
            Phase::Afternoon,
            fraction(t - start, set - LONG_TRANSITION_MS - start),
            "Afternoon Daze",
        )
    } else if t < set {
        (
            Phase::Afternoon,
            Phase::Dusk,
            fraction(t - (set - LONG_TRANSITION_MS), LONG_TRANSITION_MS),
            "Golden Hour Glow",
        )
    } else if t < set + TRANSITION_HOUR_MS {
        (
            Phase::Dusk,
            Phase::Night,
            fraction(t - set, TRANSITION_HOUR_MS),
            "Twilight Vibes",
        )
    } else {
        (Phase::Night, Phase::Night, 0.0, "Deep into the Night")
    };

    PhaseBlend {
        from,
        to,
        mix: mix.clamp(0.0, 1.0),
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_phase, LONG_TRANSITION_MS, TRANSITION_HOUR_MS};
    use crate::sky_core::palette::Phase;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn sunrise() -> NaiveDateTime {
        at(6, 30, 0)
    }

    fn sunset() -> NaiveDateTime {
        at(19, 45, 0)
    }

    #[test]
    fn sunrise_instant_starts_the_dawn_to_morning_blend() {
        let blend = resolve_phase(sunrise(), sunrise(), sunset());
        assert_eq!(blend.from, Phase::Dawn);
        assert_eq!(blend.to, Phase::Morning);
        assert_eq!(blend.mix, 0.0);
        assert_eq!(blend.label, "New Beginning Light");
    }

    #[test]
    fn deep_night_before_and_after_the_day_window() {
        let before = resolve_phase(at(2, 0, 0), sunrise(), sunset());
        assert_eq!((before.from, before.to), (Phase::Night, Phase::Night));
        assert_eq!(before.mix, 0.0);
        assert_eq!(before.label, "Deep into the Night");

        let after = resolve_phase(at(23, 0, 0), sunrise(), sunset());
        assert_eq!((after.from, after.to), (Phase::Night, Phase::Night));
        assert_eq!(after.mix, 0.0);
    }

    #[test]
    fn mix_stays_normalized_across_a_full_day_sweep() {
        for minute in 0..(24 * 60) {
            let t = at(0, 0, 0) + Duration::minutes(minute);
            let blend = resolve_phase(t, sunrise(), sunset());
            assert!(
                (0.0..=1.0).contains(&blend.mix),
                "minute {minute}: mix {}",
                blend.mix
            );
        }
    }

    #[test]
    fn interval_boundaries_hand_off_continuously() {
        // A millisecond before sunrise the night->dawn blend is nearly
        // done; at sunrise the dawn->morning blend starts from zero.
        let before = resolve_phase(sunrise() - Duration::milliseconds(1), sunrise(), sunset());
        assert_eq!((before.from, before.to), (Phase::Night, Phase::Dawn));
        assert!(before.mix > 0.999);

        let exact = resolve_phase(sunrise(), sunrise(), sunset());
        assert_eq!(exact.mix, 0.0);

        let before_set = resolve_phase(sunset() - Duration::milliseconds(1), sunrise(), sunset());
        assert_eq!((before_set.from, before_set.to), (Phase::Afternoon, Phase::Dusk));
        assert!(before_set.mix > 0.999);

        let at_set = resolve_phase(sunset(), sunrise(), sunset());
        assert_eq!((at_set.from, at_set.to), (Phase::Dusk, Phase::Night));
        assert_eq!(at_set.mix, 0.0);
    }

    #[test]
    fn golden_hour_spans_the_long_transition() {
        let start = sunset() - Duration::milliseconds(LONG_TRANSITION_MS);
        let blend = resolve_phase(start, sunrise(), sunset());
        assert_eq!((blend.from, blend.to), (Phase::Afternoon, Phase::Dusk));
        assert_eq!(blend.mix, 0.0);
        assert_eq!(blend.label, "Golden Hour Glow");

        let midway = start + Duration::milliseconds(LONG_TRANSITION_MS / 2);
        let blend = resolve_phase(midway, sunrise(), sunset());
        assert!((blend.mix - 0.5).abs() < 1e-6);
    }

    #[test]
    fn degenerate_window_never_produces_a_non_finite_mix() {
        // Sunset barely after sunrise: the noon->afternoon span is
        // negative and the interval collapses.
        let rise = at(12, 0, 0);
        let set = rise + Duration::minutes(10);
        for minute in 0..(24 * 60) {
            let t = at(0, 0, 0) + Duration::minutes(minute);
            let blend = resolve_phase(t, rise, set);
            assert!(blend.mix.is_finite());
            assert!((0.0..=1.0).contains(&blend.mix));
        }
    }

    #[test]
    fn dusk_fades_to_night_within_one_transition_hour() {
        let t = sunset() + Duration::milliseconds(TRANSITION_HOUR_MS / 4);
        let blend = resolve_phase(t, sunrise(), sunset());
        assert_eq!((blend.from, blend.to), (Phase::Dusk, Phase::Night));
        assert!((blend.mix - 0.25).abs() < 1e-6);
        assert_eq!(blend.label, "Twilight Vibes");
    }
}
