//! Weather presets and parameters
//!
//! Percentages are in `[0, 100]`, angles in degrees.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ContractError;

/// Complete set of environment parameters applied to the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct WeatherParameters {
    #[validate(range(min = 0.0, max = 100.0, message = "cloudiness must be within [0, 100]"))]
    pub cloudiness: f32,

    #[validate(range(min = 0.0, max = 100.0, message = "precipitation must be within [0, 100]"))]
    pub precipitation: f32,

    #[validate(range(
        min = 0.0,
        max = 100.0,
        message = "precipitation_deposits must be within [0, 100]"
    ))]
    pub precipitation_deposits: f32,

    #[validate(range(min = 0.0, max = 100.0, message = "wind_intensity must be within [0, 100]"))]
    pub wind_intensity: f32,

    #[validate(range(min = 0.0, max = 360.0, message = "sun_azimuth_angle must be within [0, 360]"))]
    pub sun_azimuth_angle: f32,

    #[validate(range(
        min = -90.0,
        max = 90.0,
        message = "sun_altitude_angle must be within [-90, 90]"
    ))]
    pub sun_altitude_angle: f32,

    #[validate(range(min = 0.0, max = 100.0, message = "fog_density must be within [0, 100]"))]
    pub fog_density: f32,

    /// Distance in meters where fog starts
    #[validate(range(min = 0.0, message = "fog_distance must be >= 0"))]
    pub fog_distance: f32,

    #[validate(range(min = 0.0, max = 100.0, message = "wetness must be within [0, 100]"))]
    pub wetness: f32,
}

impl WeatherParameters {
    /// Dark, foggy and rainy night
    pub const LOW_VISIBILITY_NIGHT: Self = Self {
        cloudiness: 90.0,
        precipitation: 60.0,
        precipitation_deposits: 60.0,
        wind_intensity: 30.0,
        sun_azimuth_angle: 0.0,
        sun_altitude_angle: -80.0,
        fog_density: 60.0,
        fog_distance: 0.0,
        wetness: 50.0,
    };

    pub const CLEAR_NOON: Self = Self {
        cloudiness: 5.0,
        precipitation: 0.0,
        precipitation_deposits: 0.0,
        wind_intensity: 10.0,
        sun_azimuth_angle: 0.0,
        sun_altitude_angle: 75.0,
        fog_density: 0.0,
        fog_distance: 0.0,
        wetness: 0.0,
    };

    /// Check every field against its allowed range
    ///
    /// Non-finite fields are rejected before the range checks.
    pub fn validated(self) -> Result<Self, ContractError> {
        if let Some((field, value)) = self.fields().into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(ContractError::config_validation(
                format!("weather.{field}"),
                format!("{field} must be finite, got {value}"),
            ));
        }
        self.validate()
            .map_err(|e| ContractError::from_validation("weather", e))?;
        Ok(self)
    }

    fn fields(&self) -> [(&'static str, f32); 9] {
        [
            ("cloudiness", self.cloudiness),
            ("precipitation", self.precipitation),
            ("precipitation_deposits", self.precipitation_deposits),
            ("wind_intensity", self.wind_intensity),
            ("sun_azimuth_angle", self.sun_azimuth_angle),
            ("sun_altitude_angle", self.sun_altitude_angle),
            ("fog_density", self.fog_density),
            ("fog_distance", self.fog_distance),
            ("wetness", self.wetness),
        ]
    }
}

impl Default for WeatherParameters {
    fn default() -> Self {
        Self::CLEAR_NOON
    }
}

/// Weather preset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherPreset {
    ClearNoon,
    CloudyNoon,
    WetNoon,
    HardRainNoon,
    ClearSunset,
    LowVisibilityNight,
    Custom(WeatherParameters),
}

impl WeatherPreset {
    /// Resolve the preset into concrete parameters
    pub fn parameters(&self) -> WeatherParameters {
        match self {
            Self::ClearNoon => WeatherParameters::CLEAR_NOON,
            Self::CloudyNoon => WeatherParameters {
                cloudiness: 60.0,
                ..WeatherParameters::CLEAR_NOON
            },
            Self::WetNoon => WeatherParameters {
                precipitation_deposits: 50.0,
                wetness: 60.0,
                ..WeatherParameters::CLEAR_NOON
            },
            Self::HardRainNoon => WeatherParameters {
                cloudiness: 100.0,
                precipitation: 100.0,
                precipitation_deposits: 90.0,
                wind_intensity: 100.0,
                wetness: 100.0,
                fog_density: 7.0,
                ..WeatherParameters::CLEAR_NOON
            },
            Self::ClearSunset => WeatherParameters {
                sun_azimuth_angle: 180.0,
                sun_altitude_angle: 15.0,
                ..WeatherParameters::CLEAR_NOON
            },
            Self::LowVisibilityNight => WeatherParameters::LOW_VISIBILITY_NIGHT,
            Self::Custom(params) => *params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_presets_are_in_range() {
        let presets = [
            WeatherPreset::ClearNoon,
            WeatherPreset::CloudyNoon,
            WeatherPreset::WetNoon,
            WeatherPreset::HardRainNoon,
            WeatherPreset::ClearSunset,
            WeatherPreset::LowVisibilityNight,
        ];
        for preset in presets {
            assert!(
                preset.parameters().validated().is_ok(),
                "{preset:?} out of range"
            );
        }
    }

    #[test]
    fn out_of_range_altitude_is_rejected() {
        let params = WeatherParameters {
            sun_altitude_angle: -120.0,
            ..WeatherParameters::LOW_VISIBILITY_NIGHT
        };
        let err = params.validated().unwrap_err().to_string();
        assert!(err.contains("weather.sun_altitude_angle"), "got: {err}");
    }

    #[test]
    fn negative_fog_distance_is_rejected() {
        let params = WeatherParameters {
            fog_distance: -1.0,
            ..WeatherParameters::LOW_VISIBILITY_NIGHT
        };
        assert!(params.validated().is_err());
    }

    #[test]
    fn non_finite_fields_are_rejected() {
        let nan_fog = WeatherParameters {
            fog_density: f32::NAN,
            ..WeatherParameters::LOW_VISIBILITY_NIGHT
        };
        let err = nan_fog.validated().unwrap_err().to_string();
        assert!(err.contains("weather.fog_density"), "got: {err}");

        let far_fog = WeatherParameters {
            fog_distance: f32::INFINITY,
            ..WeatherParameters::LOW_VISIBILITY_NIGHT
        };
        assert!(far_fog.validated().is_err());
    }

    #[test]
    fn preset_deserializes_from_snake_case() {
        let preset: WeatherPreset = serde_json::from_str(r#""low_visibility_night""#).unwrap();
        assert_eq!(preset.parameters(), WeatherParameters::LOW_VISIBILITY_NIGHT);
    }
}
