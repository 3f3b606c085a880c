//! Planner construction parameters

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{RoboticsError, RoboticsResult};
use crate::utils::params;

/// Parameters shared by every planner. Each planner reads the fields it
/// needs and ignores the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Clearance kept between the path and any obstacle
    pub margin: f64,
    /// `step_search` calls per `step`
    pub iterations_per_step: usize,
    /// Iteration budget of the sampling planners
    pub max_iterations: usize,
    /// Longest tree extension
    pub step_length: f64,
    /// Probability of sampling the goal directly
    pub goal_sample_rate: f64,
    /// Neighborhood radius of the RRT* family
    pub search_radius: f64,
    /// Probability of sampling the waypoint cache while replanning
    pub waypoint_sampling_rate: f64,
    /// Cell size of the grid planners
    pub discretization_step: f64,
    /// Extra major axis length of the informed sampling ellipse
    pub informed_slack: f64,
    /// Keep improving after the first RRT* solution
    pub search_until_max_iterations: bool,
    /// Seed of the planner's random number generator
    pub seed: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            margin: 0.2,
            iterations_per_step: 10,
            max_iterations: 2000,
            step_length: 0.5,
            goal_sample_rate: 0.05,
            search_radius: 1.0,
            waypoint_sampling_rate: 0.4,
            discretization_step: 0.2,
            informed_slack: 0.0,
            search_until_max_iterations: true,
            seed: 0,
        }
    }
}

impl PlannerConfig {
    /// Read a config from a TOML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> RoboticsResult<Self> {
        let config: PlannerConfig = params::load(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RoboticsResult<()> {
        let positive = [
            ("step_length", self.step_length),
            ("search_radius", self.search_radius),
            ("discretization_step", self.discretization_step),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(RoboticsError::InvalidParameter(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(self.margin >= 0.0) || !(self.informed_slack >= 0.0) {
            return Err(RoboticsError::InvalidParameter(
                "margin and informed_slack must not be negative".to_string(),
            ));
        }
        if self.iterations_per_step == 0 {
            return Err(RoboticsError::InvalidParameter(
                "iterations_per_step must be at least 1".to_string(),
            ));
        }
        for (name, rate) in [
            ("goal_sample_rate", self.goal_sample_rate),
            ("waypoint_sampling_rate", self.waypoint_sampling_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(RoboticsError::InvalidParameter(format!(
                    "{} must be within [0, 1], got {}",
                    name, rate
                )));
            }
        }
        if self.goal_sample_rate + self.waypoint_sampling_rate > 1.0 {
            return Err(RoboticsError::InvalidParameter(
                "goal_sample_rate + waypoint_sampling_rate exceeds 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PlannerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = PlannerConfig { step_length: 0.0, ..Default::default() };
        assert!(config.validate().is_err());
        let config = PlannerConfig { goal_sample_rate: 1.5, ..Default::default() };
        assert!(config.validate().is_err());
        let config = PlannerConfig { iterations_per_step: 0, ..Default::default() };
        assert!(config.validate().is_err());
        let config = PlannerConfig { margin: -0.1, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: PlannerConfig = toml::from_str("step_length = 0.2\nseed = 9\n").unwrap();
        assert_eq!(config.step_length, 0.2);
        assert_eq!(config.seed, 9);
        assert_eq!(config.margin, PlannerConfig::default().margin);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("rust_motion_planning_planner_{}.toml", std::process::id()));
        std::fs::write(&path, "margin = 0.3\nmax_iterations = 50\n").unwrap();
        let config = PlannerConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(config.margin, 0.3);
        assert_eq!(config.max_iterations, 50);

        assert!(PlannerConfig::load("/nonexistent/planner.toml").is_err());
    }
}
