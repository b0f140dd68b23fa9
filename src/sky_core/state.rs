use chrono::NaiveDateTime;
use glam::Vec3;

use super::interpolate;
use super::palette::Rgb;
use super::resolver;
use super::sun;
use super::suntimes::TimeWindow;

/// Fog blends toward an exponential-squared density in this range.
pub const FOG_DENSITY_SCALE: f32 = 0.05;
/// The fog picks up a darkened copy of the horizon color.
pub const FOG_COLOR_SCALE: f32 = 0.7;

/// Everything the renderer needs for one frame of the scene, computed
/// whole on every evaluation. Nothing in here persists or is patched
/// incrementally across frames.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualParameters {
    pub sun_color: Rgb,
    pub sky_top: Rgb,
    pub sky_bottom: Rgb,
    pub light_intensity: f32,
    pub glow_intensity: f32,
    pub fog_color: Rgb,
    pub fog_density: f32,
    pub skyline_tint: Rgb,
    pub skyline_emissive: Rgb,
    pub skyline_emissive_intensity: f32,
    pub skyline_opacity: f32,
    pub sun_position: Vec3,
    pub stars_visible: bool,
    pub period_label: &'static str,
}

/// Run the full pipeline for one instant: resolve the phase pair, blend
/// the palettes, derive the secondary quantities, and place the sun.
pub fn evaluate(now: NaiveDateTime, window: &TimeWindow) -> VisualParameters {
    let blend = resolver::resolve_phase(now, window.sunrise, window.sunset);
    let palette = interpolate::blend(blend.from.palette(), blend.to.palette(), blend.mix);
    let progress = sun::day_progress(now, window.sunrise, window.sunset);

    VisualParameters {
        sun_color: palette.sun,
        sky_top: palette.sky_top,
        sky_bottom: palette.sky_bottom,
        light_intensity: palette.light,
        glow_intensity: (palette.light * 1.5).max(0.4),
        fog_color: [
            palette.sky_bottom[0] * FOG_COLOR_SCALE,
            palette.sky_bottom[1] * FOG_COLOR_SCALE,
            palette.sky_bottom[2] * FOG_COLOR_SCALE,
        ],
        fog_density: palette.fog * FOG_DENSITY_SCALE,
        skyline_tint: palette.skyline,
        skyline_emissive: palette.emissive,
        skyline_emissive_intensity: (1.0 - palette.light) * (1.0 - palette.light),
        skyline_opacity: 0.9 - palette.light * 0.2,
        sun_position: sun::sun_position(progress),
        stars_visible: sun::stars_visible(progress),
        period_label: blend.label,
    }
}

#[cfg(test)]
mod tests {
    use super::evaluate;
    use crate::sky_core::palette::Phase;
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
    fn deep_night_reproduces_the_night_palette_exactly() {
        let params = evaluate(at(2, 0), &window());
        let night = Phase::Night.palette();

        assert_eq!(params.sun_color, night.sun);
        assert_eq!(params.sky_top, night.sky_top);
        assert_eq!(params.light_intensity, night.light);
        assert_eq!(params.skyline_emissive, night.emissive);
        assert_eq!(params.period_label, "Deep into the Night");
        assert!(params.stars_visible);
    }

    #[test]
    fn early_afternoon_blends_noon_toward_afternoon_near_the_arc_top() {
        // 13:07 sits in the noon->afternoon stretch, a whisker before
        // the solar midpoint of a 06:30..19:45 day.
        let params = evaluate(at(13, 7), &window());

        let noon = Phase::Noon.palette();
        let afternoon = Phase::Afternoon.palette();
        assert!(params.light_intensity < noon.light);
        assert!(params.light_intensity > afternoon.light);

        assert!(params.sun_position.y > 64.9);
        assert!(!params.stars_visible);
        assert_eq!(params.period_label, "Afternoon Daze");
    }

    #[test]
    fn derived_outputs_follow_their_formulas() {
        let params = evaluate(at(2, 0), &window());
        let night = Phase::Night.palette();

        // Low light clamps the glow to its floor.
        assert_eq!(params.glow_intensity, 0.4);
        assert!((params.fog_density - night.fog * 0.05).abs() < 1e-6);
        assert!((params.fog_color[2] - night.sky_bottom[2] * 0.7).abs() < 1e-6);
        assert!((params.skyline_opacity - (0.9 - night.light * 0.2)).abs() < 1e-6);
        assert!((params.skyline_emissive_intensity - 0.81).abs() < 1e-4);

        let midday = evaluate(at(11, 0), &window());
        assert!((midday.glow_intensity - midday.light_intensity * 1.5).abs() < 1e-6);
    }

    #[test]
    fn sunrise_scenario_from_the_window_contract() {
        let params = evaluate(at(6, 30), &window());
        // Mix 0 at the dawn->morning boundary: pure dawn palette.
        assert_eq!(params.sun_color, Phase::Dawn.palette().sun);
        assert_eq!(params.period_label, "New Beginning Light");
        assert!(!params.stars_visible);
    }
}
