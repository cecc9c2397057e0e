//! Data processing between raw observations and persisted predictions.
//!
//! This crate turns resolved current/wind readings into the model's feature
//! vector, runs the regression model, and labels the resulting mass.

pub mod model;

/// Feature derivation for the regression model.
pub mod features {
    use chrono::NaiveDateTime;
    use mdp_utils::dates::day_of_year;
    use serde::Serialize;
    use std::f64::consts::PI;

    /// Number of model inputs.
    pub const FEATURE_COUNT: usize = 9;

    /// Column order the model artifact was trained with. Changing it breaks
    /// every existing artifact.
    pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
        "dayofyear",
        "day_sin",
        "day_cos",
        "wind_speed",
        "current_speed",
        "wind_u",
        "wind_v",
        "current_u",
        "current_v",
    ];

    /// The fixed-order model input.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

    impl FeatureVector {
        pub fn values(&self) -> &[f64; FEATURE_COUNT] {
            &self.0
        }
    }

    /// Split a (direction, speed) reading into orthogonal (u, v) components.
    pub fn components(direction_deg: f64, speed: f64) -> (f64, f64) {
        let rad = direction_deg.to_radians();
        (speed * rad.cos(), speed * rad.sin())
    }

    /// Build the feature vector for one site observation.
    pub fn build(
        at: &NaiveDateTime,
        current_dir: f64,
        current_speed: f64,
        wind_dir: f64,
        wind_speed: f64,
    ) -> FeatureVector {
        let (current_u, current_v) = components(current_dir, current_speed);
        let (wind_u, wind_v) = components(wind_dir, wind_speed);

        let day = f64::from(day_of_year(&at.date()));
        let angle = 2.0 * PI * day / 365.0;
        let (day_sin, day_cos) = (angle.sin(), angle.cos());

        log::debug!(
            "Features - dayofyear: {}, day_sin: {:.4}, day_cos: {:.4}, wind_speed: {:.2}, current_speed: {:.2}, \
             wind_u: {:.2}, wind_v: {:.2}, current_u: {:.2}, current_v: {:.2}",
            day, day_sin, day_cos, wind_speed, current_speed, wind_u, wind_v, current_u, current_v
        );

        FeatureVector([
            day,
            day_sin,
            day_cos,
            wind_speed,
            current_speed,
            wind_u,
            wind_v,
            current_u,
            current_v,
        ])
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::NaiveDate;

        fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        }

        #[test]
        fn test_components() {
            let (u, v) = components(0.0, 2.0);
            assert!((u - 2.0).abs() < 1e-12);
            assert!(v.abs() < 1e-12);

            let (u, v) = components(90.0, 3.0);
            assert!(u.abs() < 1e-12);
            assert!((v - 3.0).abs() < 1e-12);
        }

        #[test]
        fn test_build_order() {
            let features = build(&at(2025, 1, 1), 90.0, 10.0, 180.0, 4.0);
            let x = features.values();
            assert_eq!(x[0], 1.0);
            assert!((x[1] - (2.0 * PI / 365.0).sin()).abs() < 1e-12);
            assert!((x[2] - (2.0 * PI / 365.0).cos()).abs() < 1e-12);
            assert_eq!(x[3], 4.0);
            assert_eq!(x[4], 10.0);
            // wind from 180°: u = -4, v ≈ 0
            assert!((x[5] + 4.0).abs() < 1e-12);
            assert!(x[6].abs() < 1e-9);
            // current at 90°: u ≈ 0, v = 10
            assert!(x[7].abs() < 1e-9);
            assert!((x[8] - 10.0).abs() < 1e-12);
        }

        #[test]
        fn test_day_of_year_in_leap_year() {
            let features = build(&at(2024, 12, 31), 0.0, 0.0, 0.0, 0.0);
            assert_eq!(features.values()[0], 366.0);
        }
    }
}

/// Mass labels. The per-record status and the dashboard risk/action scales
/// are separate tables with different thresholds and must stay separate.
pub mod classify {
    use serde::{Deserialize, Serialize};
    use std::{fmt, str::FromStr};

    /// Per-record status stored with every prediction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum Status {
        Low,
        Medium,
        High,
    }

    impl Status {
        /// `< 200` LOW, `[200, 300)` MEDIUM, `>= 300` HIGH.
        pub fn for_mass(mass: f64) -> Self {
            if mass < 200.0 {
                Status::Low
            } else if mass < 300.0 {
                Status::Medium
            } else {
                Status::High
            }
        }

        pub fn as_str(&self) -> &'static str {
            match self {
                Status::Low => "LOW",
                Status::Medium => "MEDIUM",
                Status::High => "HIGH",
            }
        }
    }

    impl fmt::Display for Status {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    impl FromStr for Status {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "LOW" => Ok(Status::Low),
                "MEDIUM" => Ok(Status::Medium),
                "HIGH" => Ok(Status::High),
                other => Err(format!("unknown status label '{}'", other)),
            }
        }
    }

    /// Dashboard risk level for a site's latest prediction in a month.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum RiskLevel {
        High,
        Medium,
        Low,
    }

    impl RiskLevel {
        /// `>= 400` HIGH, `[250, 400)` MEDIUM, `< 250` LOW.
        pub fn for_mass(mass: f64) -> Self {
            if mass >= 400.0 {
                RiskLevel::High
            } else if mass >= 250.0 {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            }
        }
    }

    /// Dashboard follow-up action.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum Action {
        ImmediateCollection,
        EnhancedMonitoring,
        RegularInspection,
        Watch,
    }

    impl Action {
        /// `>= 400` immediate, `[300, 400)` enhanced, `[200, 300)` regular, `< 200` watch.
        pub fn for_mass(mass: f64) -> Self {
            if mass >= 400.0 {
                Action::ImmediateCollection
            } else if mass >= 300.0 {
                Action::EnhancedMonitoring
            } else if mass >= 200.0 {
                Action::RegularInspection
            } else {
                Action::Watch
            }
        }

        /// Counted as a routine check on the dashboard.
        pub fn is_routine(&self) -> bool {
            matches!(self, Action::RegularInspection | Action::Watch)
        }
    }

}
