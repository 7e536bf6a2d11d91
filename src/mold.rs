use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::api::MoldRequest;

pub const WALL_THICKNESS: RangeInclusive<f32> = 2.0..=20.0;
pub const MAX_WIDTH: RangeInclusive<f32> = 20.0..=300.0;
pub const MAX_HEIGHT: RangeInclusive<f32> = 20.0..=300.0;
pub const MAX_DEPTH: RangeInclusive<f32> = 10.0..=100.0;

/// `localStorage` key of the last used parameters.
pub const STORAGE_KEY: &str = "mold_params";

/// All lengths in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoldParams {
    pub wall_thickness: f32,
    pub max_width: f32,
    pub max_height: f32,
    pub max_depth: f32,
    pub include_registration_marks: bool,
    pub include_pouring_channel: bool,
}

impl Default for MoldParams {
    fn default() -> Self {
        Self {
            wall_thickness: 5.0,
            max_width: 100.0,
            max_height: 100.0,
            max_depth: 30.0,
            include_registration_marks: true,
            include_pouring_channel: true,
        }
    }
}

fn clamp_field(value: f32, range: &RangeInclusive<f32>, default: f32) -> f32 {
    if value.is_nan() {
        default
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

fn check_field(name: &str, value: f32, range: &RangeInclusive<f32>, errors: &mut Vec<String>) {
    if !range.contains(&value) {
        errors.push(format!(
            "{name} must be between {} and {} mm (got {value})",
            range.start(),
            range.end()
        ));
    }
}

impl MoldParams {
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            wall_thickness: clamp_field(self.wall_thickness, &WALL_THICKNESS, d.wall_thickness),
            max_width: clamp_field(self.max_width, &MAX_WIDTH, d.max_width),
            max_height: clamp_field(self.max_height, &MAX_HEIGHT, d.max_height),
            max_depth: clamp_field(self.max_depth, &MAX_DEPTH, d.max_depth),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        check_field("wall thickness", self.wall_thickness, &WALL_THICKNESS, &mut errors);
        check_field("max width", self.max_width, &MAX_WIDTH, &mut errors);
        check_field("max height", self.max_height, &MAX_HEIGHT, &mut errors);
        check_field("max depth", self.max_depth, &MAX_DEPTH, &mut errors);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    pub fn request(&self, depth_map: &str) -> MoldRequest {
        MoldRequest {
            depth_map: depth_map.to_string(),
            wall_thickness: self.wall_thickness,
            max_width: self.max_width,
            max_height: self.max_height,
            max_depth: self.max_depth,
            include_registration_marks: self.include_registration_marks,
            include_pouring_channel: self.include_pouring_channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(MoldParams::default().validate().is_ok());
    }

    #[test]
    fn validate_reports_every_bad_field() {
        let params = MoldParams {
            wall_thickness: 1.0,
            max_width: 500.0,
            ..MoldParams::default()
        };
        let errors = params.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("wall thickness"));
        assert!(errors[1].starts_with("max width"));
    }

    #[test]
    fn bounds_are_inclusive() {
        let params = MoldParams {
            wall_thickness: 20.0,
            max_width: 20.0,
            max_height: 300.0,
            max_depth: 10.0,
            ..MoldParams::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn clamped_pulls_values_into_range() {
        let params = MoldParams {
            wall_thickness: 25.0,
            max_width: 10.0,
            max_height: f32::NAN,
            max_depth: 55.0,
            include_registration_marks: false,
            include_pouring_channel: true,
        }
        .clamped();

        assert_eq!(params.wall_thickness, 20.0);
        assert_eq!(params.max_width, 20.0);
        assert_eq!(params.max_height, 100.0);
        assert_eq!(params.max_depth, 55.0);
        assert!(!params.include_registration_marks);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn request_carries_every_field() {
        let params = MoldParams {
            include_pouring_channel: false,
            ..MoldParams::default()
        };
        let json = serde_json::to_value(params.request("abc")).unwrap();
        assert_eq!(json["depth_map"], "abc");
        assert_eq!(json["wall_thickness"], 5.0);
        assert_eq!(json["max_depth"], 30.0);
        assert_eq!(json["include_registration_marks"], true);
        assert_eq!(json["include_pouring_channel"], false);
    }
}
