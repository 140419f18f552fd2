//! Component configuration with defaults, loaded leniently from JSON.
//!
//! Every key is optional. A key that is missing, has the wrong JSON type or
//! holds an out-of-range value keeps its default, so loading a JSON object
//! never fails. Only text that is not JSON at all is rejected.

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;
use crate::petal::Direction;
use crate::tilt::Axis;

pub const DEFAULT_PETAL_SPEED: f64 = 1.0;
pub const DEFAULT_PETAL_COUNT: usize = 100;
/// Upper bound on live petals; larger requests are clamped.
pub const MAX_PETAL_COUNT: usize = 1000;
pub const DEFAULT_PETAL_IMAGE: &str = "https://djjjk9bjm164h.cloudfront.net/petal.png";

pub const DEFAULT_MAX_TILT: f64 = 20.0;
pub const DEFAULT_PERSPECTIVE: f64 = 1000.0;
pub const DEFAULT_EASING: &str = "cubic-bezier(.03,.98,.52,.99)";
pub const DEFAULT_SCALE: f64 = 1.0;
pub const DEFAULT_TRANSITION_MS: u32 = 1000;

/// Falling-petal layer settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PetalConfig {
    /// Speed multiplier applied to every petal's velocity.
    pub speed: f64,
    /// Number of petals kept alive.
    pub count: usize,
    /// URL of the petal sprite.
    pub image_url: String,
    pub direction: Direction,
}

impl Default for PetalConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_PETAL_SPEED,
            count: DEFAULT_PETAL_COUNT,
            image_url: DEFAULT_PETAL_IMAGE.to_owned(),
            direction: Direction::Down,
        }
    }
}

impl PetalConfig {
    /// Reads `speed`, `count`, `image_url` and `direction` from a JSON object.
    pub fn from_json(params: &Value) -> Self {
        let defaults = Self::default();
        Self {
            speed: non_negative(params, "speed").unwrap_or(defaults.speed),
            count: params
                .get("count")
                .and_then(Value::as_u64)
                .map_or(defaults.count, clamp_petal_count),
            image_url: text(params, "image_url")
                .filter(|s| !s.is_empty())
                .map_or(defaults.image_url, str::to_owned),
            direction: text(params, "direction")
                .map_or(defaults.direction, Direction::from_name_or_down),
        }
    }

    /// Parses JSON text; empty text yields the defaults.
    pub fn from_json_str(text: &str) -> Result<Self, CoreError> {
        Ok(Self::from_json(&parse(text)?))
    }
}

/// Pointer tilt settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TiltConfig {
    /// Full swing in degrees between opposite edges of the element.
    pub max_tilt: f64,
    /// CSS perspective distance in pixels.
    pub perspective: f64,
    /// CSS timing function for the transform transition.
    pub easing: String,
    /// Uniform scale applied while tracking.
    pub scale: f64,
    /// Transition duration, also the delay before the leave reset.
    pub speed_ms: u32,
    /// Axis whose rotation is pinned to zero.
    pub disable_axis: Option<Axis>,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            max_tilt: DEFAULT_MAX_TILT,
            perspective: DEFAULT_PERSPECTIVE,
            easing: DEFAULT_EASING.to_owned(),
            scale: DEFAULT_SCALE,
            speed_ms: DEFAULT_TRANSITION_MS,
            disable_axis: None,
        }
    }
}

impl TiltConfig {
    /// Reads `max_tilt`, `perspective`, `easing`, `scale`, `speed` (ms) and
    /// `disable_axis` from a JSON object.
    pub fn from_json(params: &Value) -> Self {
        let defaults = Self::default();
        Self {
            max_tilt: finite(params, "max_tilt").unwrap_or(defaults.max_tilt),
            perspective: non_negative(params, "perspective").unwrap_or(defaults.perspective),
            easing: text(params, "easing")
                .filter(|s| !s.trim().is_empty())
                .map_or(defaults.easing, str::to_owned),
            scale: non_negative(params, "scale").unwrap_or(defaults.scale),
            speed_ms: params
                .get("speed")
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(defaults.speed_ms),
            disable_axis: text(params, "disable_axis").and_then(Axis::from_name_or_none),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, CoreError> {
        Ok(Self::from_json(&parse(text)?))
    }

    /// CSS `transition` value used on enter and on leave.
    pub fn transition(&self) -> String {
        format!("transform {}ms {}", self.speed_ms, self.easing)
    }
}

/// Converts a requested petal count, capping it at [`MAX_PETAL_COUNT`].
pub fn clamp_petal_count(requested: u64) -> usize {
    match usize::try_from(requested) {
        Ok(count) if count <= MAX_PETAL_COUNT => count,
        _ => {
            log::warn!("petal count {requested} capped at {MAX_PETAL_COUNT}");
            MAX_PETAL_COUNT
        }
    }
}

fn parse(text: &str) -> Result<Value, CoreError> {
    if text.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    Ok(serde_json::from_str(text)?)
}

fn finite(params: &Value, key: &str) -> Option<f64> {
    params
        .get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}

fn non_negative(params: &Value, key: &str) -> Option<f64> {
    let v = finite(params, key)?;
    if v < 0.0 {
        log::warn!("ignoring negative {key}: {v}");
        return None;
    }
    Some(v)
}

fn text<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- PetalConfig --

    #[test]
    fn petal_defaults() {
        let c = PetalConfig::default();
        assert_eq!(c.speed, 1.0);
        assert_eq!(c.count, 100);
        assert_eq!(c.direction, Direction::Down);
        assert!(c.image_url.ends_with("petal.png"));
    }

    #[test]
    fn petal_from_empty_object_is_default() {
        assert_eq!(PetalConfig::from_json(&json!({})), PetalConfig::default());
    }

    #[test]
    fn petal_from_json_reads_every_key() {
        let c = PetalConfig::from_json(&json!({
            "speed": 0.5,
            "count": 25,
            "image_url": "/petal.png",
            "direction": "diagonal",
        }));
        assert_eq!(c.speed, 0.5);
        assert_eq!(c.count, 25);
        assert_eq!(c.image_url, "/petal.png");
        assert_eq!(c.direction, Direction::Diagonal);
    }

    #[test]
    fn petal_wrong_types_keep_defaults() {
        let c = PetalConfig::from_json(&json!({
            "speed": "fast",
            "count": -3,
            "image_url": 7,
            "direction": 1,
        }));
        assert_eq!(c, PetalConfig::default());
    }

    #[test]
    fn petal_negative_speed_keeps_default() {
        let c = PetalConfig::from_json(&json!({"speed": -1.0}));
        assert_eq!(c.speed, DEFAULT_PETAL_SPEED);
    }

    #[test]
    fn petal_count_is_capped() {
        let c = PetalConfig::from_json(&json!({"count": 5000}));
        assert_eq!(c.count, MAX_PETAL_COUNT);
        let c = PetalConfig::from_json(&json!({"count": u64::MAX}));
        assert_eq!(c.count, MAX_PETAL_COUNT);
    }

    #[test]
    fn clamp_petal_count_keeps_counts_within_limit() {
        assert_eq!(clamp_petal_count(0), 0);
        assert_eq!(clamp_petal_count(1000), 1000);
        assert_eq!(clamp_petal_count(1001), MAX_PETAL_COUNT);
    }

    #[test]
    fn petal_unknown_direction_falls_back_to_down() {
        let c = PetalConfig::from_json(&json!({"direction": "sideways"}));
        assert_eq!(c.direction, Direction::Down);
    }

    #[test]
    fn petal_from_json_str_rejects_garbage() {
        assert!(matches!(
            PetalConfig::from_json_str("{speed:"),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn petal_from_blank_str_is_default() {
        assert_eq!(PetalConfig::from_json_str("  ").unwrap(), PetalConfig::default());
    }

    #[test]
    fn petal_serializes_direction_lowercase() {
        let v = serde_json::to_value(PetalConfig::default()).unwrap();
        assert_eq!(v["direction"], "down");
    }

    // -- TiltConfig --

    #[test]
    fn tilt_defaults() {
        let c = TiltConfig::default();
        assert_eq!(c.max_tilt, 20.0);
        assert_eq!(c.perspective, 1000.0);
        assert_eq!(c.scale, 1.0);
        assert_eq!(c.speed_ms, 1000);
        assert_eq!(c.disable_axis, None);
        assert_eq!(c.easing, "cubic-bezier(.03,.98,.52,.99)");
    }

    #[test]
    fn tilt_from_json_reads_every_key() {
        let c = TiltConfig::from_json(&json!({
            "max_tilt": 30,
            "perspective": 800,
            "easing": "ease-out",
            "scale": 1.1,
            "speed": 400,
            "disable_axis": "x",
        }));
        assert_eq!(c.max_tilt, 30.0);
        assert_eq!(c.perspective, 800.0);
        assert_eq!(c.easing, "ease-out");
        assert_eq!(c.scale, 1.1);
        assert_eq!(c.speed_ms, 400);
        assert_eq!(c.disable_axis, Some(Axis::X));
    }

    #[test]
    fn tilt_null_or_unknown_axis_is_none() {
        assert_eq!(TiltConfig::from_json(&json!({"disable_axis": null})).disable_axis, None);
        assert_eq!(TiltConfig::from_json(&json!({"disable_axis": "z"})).disable_axis, None);
    }

    #[test]
    fn tilt_oversized_speed_keeps_default() {
        let c = TiltConfig::from_json(&json!({"speed": u64::MAX}));
        assert_eq!(c.speed_ms, DEFAULT_TRANSITION_MS);
    }

    #[test]
    fn tilt_blank_easing_keeps_default() {
        let c = TiltConfig::from_json(&json!({"easing": "  "}));
        assert_eq!(c.easing, DEFAULT_EASING);
    }

    #[test]
    fn transition_combines_duration_and_easing() {
        let c = TiltConfig {
            speed_ms: 300,
            easing: "linear".into(),
            ..TiltConfig::default()
        };
        assert_eq!(c.transition(), "transform 300ms linear");
    }

    #[test]
    fn tilt_from_json_str_parses_object() {
        let c = TiltConfig::from_json_str(r#"{"scale": 1.1}"#).unwrap();
        assert_eq!(c.scale, 1.1);
    }
}
