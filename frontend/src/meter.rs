//! Peak meter transform and the stereo meter widget.

use egui::{Color32, Rect, Stroke, Ui, Vec2};
use mixdesk_types::mixer::{METER_CEILING_DB, METER_FLOOR_DB, SILENCE_DB, SILENCE_THRESHOLD};

/// Convert a linear peak amplitude to a meter position in percent.
///
/// The amplitude is converted to dB (anything at or below the silence
/// threshold counts as -100 dB), mapped linearly from the -80..+12 dB
/// scale onto 0..100, rounded to two decimals and clamped.
pub fn to_meter_percent(level: f64) -> f64 {
    let db = if level > SILENCE_THRESHOLD {
        20.0 * level.log10()
    } else {
        SILENCE_DB
    };
    let percent = (db - METER_FLOOR_DB) * 100.0 / (METER_CEILING_DB - METER_FLOOR_DB);
    let percent = (percent * 100.0).round() / 100.0;
    percent.clamp(0.0, 100.0)
}

/// Zone boundaries in dB on the meter scale.
const ZONE_GREEN_END_DB: f64 = -18.0;
const ZONE_YELLOW_END_DB: f64 = -6.0;
const ZONE_ORANGE_END_DB: f64 = 0.0;

/// Gap between the left and right bar
const BAR_GAP: f32 = 2.0;

/// Position of a dB value on the meter, 0.0-1.0.
fn db_to_fraction(db: f64) -> f32 {
    ((db - METER_FLOOR_DB) / (METER_CEILING_DB - METER_FLOOR_DB)).clamp(0.0, 1.0) as f32
}

/// Color zones as (start, end, color), bottom to top.
///
/// - Green: up to -18 dB
/// - Yellow: -18 dB to -6 dB
/// - Orange: -6 dB to 0 dB
/// - Red: above digital full scale
fn zones(bright: bool, muted: bool) -> [(f32, f32, Color32); 4] {
    let green_end = db_to_fraction(ZONE_GREEN_END_DB);
    let yellow_end = db_to_fraction(ZONE_YELLOW_END_DB);
    let orange_end = db_to_fraction(ZONE_ORANGE_END_DB);

    let colors = match (bright, muted) {
        (true, false) => [
            Color32::from_rgb(0, 220, 0),
            Color32::from_rgb(255, 220, 0),
            Color32::from_rgb(255, 165, 0),
            Color32::from_rgb(255, 0, 0),
        ],
        // Muted channels still meter, but greyed out
        (true, true) => [
            Color32::from_gray(150),
            Color32::from_gray(170),
            Color32::from_gray(185),
            Color32::from_gray(200),
        ],
        (false, false) => [
            Color32::from_rgb(0, 60, 0),
            Color32::from_rgb(60, 60, 0),
            Color32::from_rgb(60, 45, 0),
            Color32::from_rgb(60, 0, 0),
        ],
        (false, true) => [
            Color32::from_gray(40),
            Color32::from_gray(45),
            Color32::from_gray(50),
            Color32::from_gray(55),
        ],
    };

    [
        (0.0, green_end, colors[0]),
        (green_end, yellow_end, colors[1]),
        (yellow_end, orange_end, colors[2]),
        (orange_end, 1.0, colors[3]),
    ]
}

/// Draw one vertical bar filled up to `level` (0.0-1.0).
fn draw_vertical_bar(painter: &egui::Painter, rect: Rect, level: f32, muted: bool) {
    for (start, end, color) in zones(false, muted) {
        let zone_rect = Rect::from_min_max(
            egui::pos2(rect.min.x, rect.max.y - rect.height() * end),
            egui::pos2(rect.max.x, rect.max.y - rect.height() * start),
        );
        painter.rect(
            zone_rect,
            1.0,
            color,
            Stroke::NONE,
            egui::epaint::StrokeKind::Inside,
        );
    }

    if level > 0.0 {
        for (start, end, color) in zones(true, muted) {
            if level <= start {
                break;
            }
            let zone_level = level.min(end);
            let level_rect = Rect::from_min_max(
                egui::pos2(rect.min.x, rect.max.y - rect.height() * zone_level),
                egui::pos2(rect.max.x, rect.max.y - rect.height() * start),
            );
            painter.rect(
                level_rect,
                1.0,
                color,
                Stroke::NONE,
                egui::epaint::StrokeKind::Inside,
            );
        }
    }

    painter.rect(
        rect,
        1.0,
        Color32::TRANSPARENT,
        Stroke::new(1.0, Color32::from_gray(80)),
        egui::epaint::StrokeKind::Inside,
    );
}

/// Render a stereo meter. Levels are percentages; `None` draws an empty bar.
pub fn show_stereo(ui: &mut Ui, size: Vec2, left: Option<f64>, right: Option<f64>, muted: bool) {
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::hover());
    let painter = ui.painter();

    let bar_width = ((rect.width() - BAR_GAP) / 2.0).max(1.0);
    let left_rect = Rect::from_min_size(rect.min, Vec2::new(bar_width, rect.height()));
    let right_rect = Rect::from_min_size(
        egui::pos2(rect.min.x + bar_width + BAR_GAP, rect.min.y),
        Vec2::new(bar_width, rect.height()),
    );

    let to_fraction = |percent: Option<f64>| (percent.unwrap_or(0.0) / 100.0) as f32;
    draw_vertical_bar(painter, left_rect, to_fraction(left), muted);
    draw_vertical_bar(painter, right_rect, to_fraction(right), muted);

    response.on_hover_text(format!(
        "L {:.0}%  R {:.0}%",
        left.unwrap_or(0.0),
        right.unwrap_or(0.0)
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_maps_to_zero() {
        for level in [0.0, 1e-9, 1e-6, 1e-5, -0.5] {
            assert_eq!(to_meter_percent(level), 0.0, "level {level}");
        }
    }

    #[test]
    fn test_ceiling_maps_to_hundred() {
        // +12 dB is 10^(12/20) ~= 3.981
        for level in [3.99, 4.0, 10.0, 1000.0] {
            assert_eq!(to_meter_percent(level), 100.0, "level {level}");
        }
        let exact = 10f64.powf(METER_CEILING_DB / 20.0);
        assert_eq!(to_meter_percent(exact), 100.0);
    }

    #[test]
    fn test_minus_forty_db() {
        // 0.01 -> -40 dB -> 40/92 of the scale
        assert_eq!(to_meter_percent(0.01), 43.48);
    }

    #[test]
    fn test_full_scale() {
        // 0 dBFS sits at 80/92 of the scale
        assert_eq!(to_meter_percent(1.0), 86.96);
    }

    #[test]
    fn test_floor_of_scale() {
        // -80 dB is exactly the bottom; anything lower clamps there
        assert_eq!(to_meter_percent(1e-4), 0.0);
        assert_eq!(to_meter_percent(5e-5), 0.0);
    }

    #[test]
    fn test_rounded_to_two_decimals() {
        let mut level = 1e-5;
        while level < 5.0 {
            let percent = to_meter_percent(level);
            let scaled = percent * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-6, "{percent}");
            level *= 1.13;
        }
    }

    #[test]
    fn test_monotonic_and_bounded() {
        let mut previous = to_meter_percent(0.0);
        let mut level = 1e-7;
        while level < 20.0 {
            let percent = to_meter_percent(level);
            assert!((0.0..=100.0).contains(&percent));
            assert!(percent >= previous, "{level}: {percent} < {previous}");
            previous = percent;
            level *= 1.05;
        }
    }

    #[test]
    fn test_non_finite_input() {
        assert_eq!(to_meter_percent(f64::NAN), 0.0);
        assert_eq!(to_meter_percent(f64::INFINITY), 100.0);
    }

    #[test]
    fn test_zone_boundaries_are_ordered() {
        let z = zones(true, false);
        assert_eq!(z[0].0, 0.0);
        assert_eq!(z[3].1, 1.0);
        for pair in z.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
            assert!(pair[0].0 < pair[0].1);
        }
    }
}
