//! Planner selection by name

use std::fmt;
use std::str::FromStr;

use crate::common::{Point2D, RoboticsError, RoboticsResult, SearchAlgorithm};
use crate::mapping::WorldMap;
use super::config::PlannerConfig;
use super::dynamic_rrt::DynamicRrt;
use super::grid_search::{GridSearch, GridStrategy};
use super::informed_rrt_star::InformedRrtStar;
use super::rrt::Rrt;
use super::rrt_star::RrtStar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerKind {
    Grid(GridStrategy),
    Rrt,
    RrtStar,
    InformedRrtStar,
    DynamicRrt,
}

impl fmt::Display for PlannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerKind::Grid(strategy) => write!(f, "{}", strategy),
            PlannerKind::Rrt => write!(f, "rrt"),
            PlannerKind::RrtStar => write!(f, "rrt_star"),
            PlannerKind::InformedRrtStar => write!(f, "informed_rrt_star"),
            PlannerKind::DynamicRrt => write!(f, "dynamic_rrt"),
        }
    }
}

impl FromStr for PlannerKind {
    type Err = RoboticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rrt" => Ok(PlannerKind::Rrt),
            "rrt_star" => Ok(PlannerKind::RrtStar),
            "informed_rrt_star" => Ok(PlannerKind::InformedRrtStar),
            "dynamic_rrt" => Ok(PlannerKind::DynamicRrt),
            other => other
                .parse::<GridStrategy>()
                .map(PlannerKind::Grid)
                .map_err(|_| RoboticsError::InvalidParameter(format!("unknown planner '{}'", s))),
        }
    }
}

/// Build a boxed planner of `kind` after validating `config`
pub fn build_planner(
    kind: PlannerKind,
    map: &WorldMap,
    start: Point2D,
    config: &PlannerConfig,
) -> RoboticsResult<Box<dyn SearchAlgorithm>> {
    config.validate()?;
    let planner: Box<dyn SearchAlgorithm> = match kind {
        PlannerKind::Grid(strategy) => Box::new(GridSearch::new(map, start, strategy, config)),
        PlannerKind::Rrt => Box::new(Rrt::new(map, start, config.clone())),
        PlannerKind::RrtStar => Box::new(RrtStar::new(map, start, config.clone())),
        PlannerKind::InformedRrtStar => Box::new(InformedRrtStar::new(map, start, config.clone())),
        PlannerKind::DynamicRrt => Box::new(DynamicRrt::new(map, start, config.clone())),
    };
    Ok(planner)
}
