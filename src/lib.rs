use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use wasm_bindgen::prelude::*;

/// Default spin timing and wheel parameters
pub mod defaults {
    /// Nominal spin length. Drives both the completion timer and the CSS transition.
    pub const SPIN_DURATION_MS: u32 = 10_000;
    pub const FULL_REVOLUTIONS: u32 = 3;
    pub const DEBOUNCE_MS: f64 = 350.0;
    /// Spin audio stays at full volume until this fraction of the spin has elapsed.
    pub const FADE_START: f64 = 0.6;
    /// Spin audio is silent from this fraction onwards.
    pub const FADE_END: f64 = 0.85;
    /// Pointer position in the wheel's frame (SVG angles grow clockwise from +x, so 12 o'clock is 270).
    pub const POINTER_ANGLE: f64 = 270.0;
    /// Easing curve of the visual wheel transition.
    pub const SPIN_EASING: &str = "cubic-bezier(0.1, 0, 0.18, 1)";

    pub const MIN_NUMBER: i32 = 1;
    pub const MAX_NUMBER: i32 = 20;
    pub const VOLUME: f64 = 0.5;
}

pub mod celebration;
pub mod session;

/// Segment fill colors. Items cycle through this by position on the wheel.
pub const SEGMENT_COLORS: [&str; 5] = ["#8B0000", "#2E8B57", "#F59E0B", "#A0522D", "#D4AF37"];

/// Label colors matching `SEGMENT_COLORS` slot for slot.
pub const SEGMENT_TEXT_COLORS: [&str; 5] = ["#FFFFFF", "#FFFFFF", "#000000", "#FFFFFF", "#000000"];

/// Editable raffle settings. Edits build a new value instead of mutating in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaffleConfig {
    pub min: i32,
    pub max: i32,
    pub excluded: BTreeSet<i32>,
    pub volume: f64,
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            min: defaults::MIN_NUMBER,
            max: defaults::MAX_NUMBER,
            excluded: BTreeSet::new(),
            volume: defaults::VOLUME,
        }
    }
}

impl RaffleConfig {
    pub fn with_range(&self, min: i32, max: i32) -> Self {
        Self {
            min,
            max,
            ..self.clone()
        }
    }

    pub fn with_excluded(&self, excluded: BTreeSet<i32>) -> Self {
        Self {
            excluded,
            ..self.clone()
        }
    }

    /// Volume is clamped into `[0, 1]`; NaN falls back to silence.
    pub fn with_volume(&self, volume: f64) -> Self {
        Self {
            volume: clamp_volume(volume),
            ..self.clone()
        }
    }

    /// Number of values the wheel would show for this configuration.
    pub fn candidate_count(&self) -> usize {
        if self.min > self.max {
            return 0;
        }
        let span = self.max as i64 - self.min as i64 + 1;
        let span = usize::try_from(span).unwrap_or(usize::MAX);
        span.saturating_sub(self.excluded.range(self.min..=self.max).count())
    }
}

#[inline]
pub fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// One segment of the wheel. Colors are indices into the palette tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WheelItem {
    pub value: i32,
    pub color: usize,
    pub text_color: usize,
}

impl WheelItem {
    pub fn fill(&self) -> &'static str {
        SEGMENT_COLORS[self.color % SEGMENT_COLORS.len()]
    }

    pub fn text_fill(&self) -> &'static str {
        SEGMENT_TEXT_COLORS[self.text_color % SEGMENT_TEXT_COLORS.len()]
    }
}

/// Why a spin request was dropped. None of these are fatal; the caller just ignores the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpinRejection {
    /// Arrived inside the debounce window of the previous accepted request.
    Debounced,
    AlreadySpinning,
    /// A result is on screen and has not been claimed or reset yet.
    ResultPending,
    EmptyCandidateSet,
}

impl fmt::Display for SpinRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpinRejection::Debounced => write!(f, "Spin request dropped by debounce window"),
            SpinRejection::AlreadySpinning => write!(f, "The wheel is already spinning"),
            SpinRejection::ResultPending => {
                write!(f, "The previous winner has not been claimed or reset")
            }
            SpinRejection::EmptyCandidateSet => write!(f, "No numbers left to spin"),
        }
    }
}

impl std::error::Error for SpinRejection {}

/// Build the ordered wheel segments for `config`.
///
/// Every integer in `[min, max]` that is not excluded becomes one item, in ascending order.
/// Colors are assigned by output position, so an exclusion shifts the colors of everything after it.
/// An inverted or fully excluded range yields an empty vector.
pub fn generate_wheel_items(config: &RaffleConfig) -> Vec<WheelItem> {
    if config.min > config.max {
        debug!("Inverted range {}..={}, wheel is empty", config.min, config.max);
        return Vec::new();
    }

    let mut items = Vec::with_capacity(config.candidate_count());
    for value in config.min..=config.max {
        if config.excluded.contains(&value) {
            continue;
        }
        let slot = items.len() % SEGMENT_COLORS.len();
        items.push(WheelItem {
            value,
            color: slot,
            text_color: slot,
        });
    }
    items
}

/// Pick one item uniformly at random.
///
/// Returns the winning index together with the item, or `None` for an empty wheel.
pub fn pick_winner<'a, R: Rng>(
    items: &'a [WheelItem],
    rng: &mut R,
) -> Option<(usize, &'a WheelItem)> {
    if items.is_empty() {
        return None;
    }
    let index = rng.random_range(0..items.len());
    items.get(index).map(|item| (index, item))
}

/// Position of `value` on the wheel, if it is still a candidate.
pub fn index_of_value(items: &[WheelItem], value: i32) -> Option<usize> {
    items.binary_search_by_key(&value, |item| item.value).ok()
}

/// Request-level guard against duplicate triggers from overlapping input paths.
///
/// Measures from the last *accepted request*, not from the last completed spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinDebouncer {
    window_ms: f64,
    last_accepted_at: Option<f64>,
}

impl SpinDebouncer {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last_accepted_at: None,
        }
    }

    /// Returns `true` and records `now_ms` if the request is outside the window.
    pub fn admit(&mut self, now_ms: f64) -> bool {
        if let Some(last) = self.last_accepted_at {
            if now_ms - last < self.window_ms {
                return false;
            }
        }
        self.last_accepted_at = Some(now_ms);
        true
    }
}

/// Normalize an angle into `[0, 360)`.
#[inline]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let angle = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if angle >= 360.0 {
        0.0
    } else {
        angle
    }
}

/// Angular center of segment `index` out of `count`, measured from the wheel's zero reference.
///
/// Segment `k` spans `[k * 360/n, (k + 1) * 360/n)`.
#[inline]
pub fn segment_center_angle(index: usize, count: usize) -> f64 {
    let segment = 360.0 / count as f64;
    index as f64 * segment + segment / 2.0
}

/// Compute the next cumulative wheel rotation that lands the pointer on segment `index`.
///
/// The wheel always moves forward: the result is `current` plus the minimal forward adjustment
/// in `[0, 360)` plus `full_revolutions` whole turns, at least one. Pure arithmetic, no randomness.
///
/// # Arguments
/// * `current` - Cumulative rotation the wheel currently rests at, in degrees
/// * `index` - Winning segment position on the wheel
/// * `count` - Total number of segments (must be non-zero)
/// * `full_revolutions` - Whole turns added on top of the alignment; zero is treated as one
/// * `pointer_angle` - Fixed pointer position in the wheel's frame
pub fn plan_rotation(
    current: f64,
    index: usize,
    count: usize,
    full_revolutions: u32,
    pointer_angle: f64,
) -> f64 {
    let target = pointer_angle - segment_center_angle(index, count);
    let adjustment = normalize_degrees(target - current);
    current + adjustment + full_revolutions.max(1) as f64 * 360.0
}

/// Where segment `index` ends up after the wheel is rotated to `rotation`.
#[cfg(test)]
pub(crate) fn resting_angle(rotation: f64, index: usize, count: usize) -> f64 {
    normalize_degrees(rotation + segment_center_angle(index, count))
}

/// Gain for the looping spin sound at a given spin progress.
///
/// Full `base_volume` until `fade_start`, a linear ramp down to silence at `fade_end`,
/// then silence through completion.
pub fn spin_gain(progress: f64, base_volume: f64, fade_start: f64, fade_end: f64) -> f64 {
    let base = clamp_volume(base_volume);
    if progress >= fade_end {
        0.0
    } else if progress > fade_start {
        let fade_progress = (progress - fade_start) / (fade_end - fade_start);
        (base * (1.0 - fade_progress)).max(0.0)
    } else {
        base
    }
}

/// SVG geometry of a single wheel segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentGeometry {
    /// Path data for the wedge.
    pub path: String,
    pub label_x: f64,
    pub label_y: f64,
    /// Label rotation in degrees so text reads along the radius.
    pub label_rotation: f64,
}

/// Point on a circle of `radius` at `fraction` of a full turn, clockwise from +x in SVG space.
pub fn coordinates_for_fraction(fraction: f64, radius: f64) -> (f64, f64) {
    let theta = 2.0 * std::f64::consts::PI * fraction;
    (theta.cos() * radius, theta.sin() * radius)
}

/// Geometry for segment `index` of `total` on a wheel centered at (`center`, `center`).
///
/// Shares its zero reference and direction with [`plan_rotation`].
pub fn segment_geometry(index: usize, total: usize, radius: f64, center: f64) -> SegmentGeometry {
    let slice = 1.0 / total as f64;
    let start = index as f64 * slice;
    let end = start + slice;
    let (start_x, start_y) = coordinates_for_fraction(start, radius);

    let path = if total == 1 {
        // A single arc from a point back to itself renders nothing, so draw two halves.
        let (half_x, half_y) = coordinates_for_fraction(start + 0.5, radius);
        format!(
            "M {sx} {sy} A {r} {r} 0 1 1 {hx} {hy} A {r} {r} 0 1 1 {sx} {sy} Z",
            sx = center + start_x,
            sy = center + start_y,
            hx = center + half_x,
            hy = center + half_y,
            r = radius,
        )
    } else {
        let (end_x, end_y) = coordinates_for_fraction(end, radius);
        let large_arc = if slice > 0.5 { 1 } else { 0 };
        format!(
            "M {c} {c} L {sx} {sy} A {r} {r} 0 {large_arc} 1 {ex} {ey} Z",
            c = center,
            sx = center + start_x,
            sy = center + start_y,
            r = radius,
            ex = center + end_x,
            ey = center + end_y,
        )
    };

    let mid = start + slice / 2.0;
    let (label_x, label_y) = coordinates_for_fraction(mid, radius * 0.85);

    SegmentGeometry {
        path,
        label_x: center + label_x,
        label_y: center + label_y,
        label_rotation: mid * 360.0,
    }
}

/// Label font size in pixels, shrinking as the wheel gets crowded.
pub fn label_font_size(total: usize) -> f64 {
    let n = total.max(1) as f64;
    if total > 100 {
        (400.0 / n).max(8.0)
    } else if total > 50 {
        (600.0 / n).max(10.0)
    } else {
        (800.0 / n).clamp(16.0, 48.0)
    }
}

/// CSS `transition` value for the wheel, built from the same duration the spin timer uses.
pub fn spin_transition_css(duration_ms: u32) -> String {
    format!(
        "transform {}ms {}",
        duration_ms,
        defaults::SPIN_EASING
    )
}

/// Build wheel items for a host page.
///
/// Accepts a serialized `RaffleConfig` and returns the serialized item list,
/// or `null` if the input cannot be read.
#[wasm_bindgen]
pub fn wheel_items_js(config_js: JsValue) -> JsValue {
    let config: RaffleConfig = match serde_wasm_bindgen::from_value(config_js) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to deserialize raffle config: {}", e);
            return JsValue::NULL;
        }
    };
    serde_wasm_bindgen::to_value(&generate_wheel_items(&config)).unwrap_or(JsValue::NULL)
}

/// Rotation planner for host pages, using the default pointer and revolution count.
///
/// Returns `current` unchanged when `count` is zero or `index` is out of range.
#[wasm_bindgen]
pub fn plan_rotation_js(current: f64, index: usize, count: usize) -> f64 {
    if count == 0 || index >= count {
        return current;
    }
    plan_rotation(
        current,
        index,
        count,
        defaults::FULL_REVOLUTIONS,
        defaults::POINTER_ANGLE,
    )
}
