//
// Dynamic RRT simulation
//
// Drives a point robot through a randomly generated map of moving
// obstacles, replanning whenever the obstacles cut the current path.
//
// usage: dynamic_rrt_sim [planner.toml] [generation.toml]
//
use std::env;
use std::time::Instant;

use colored::{ColoredString, Colorize};
use log::{info, warn, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;

use rust_motion_planning::geometry::{BoundingBox, Circle};
use rust_motion_planning::mapping::GenerationConfig;
use rust_motion_planning::path_planning::DynamicRrt;
use rust_motion_planning::utils::params;
use rust_motion_planning::{
    ControlMode, Controller, PlannerConfig, Point2D, Pose2D, Robot, RoboticsResult, SearchAlgorithm, WorldMap,
};

const DT: f64 = 0.05;
const MAX_TICKS: usize = 4000;
const ROBOT_SPEED: f64 = 1.0;

struct PointRobot {
    pose: Pose2D,
}

impl Robot for PointRobot {
    fn pose(&self) -> Pose2D {
        self.pose
    }
}

impl PointRobot {
    /// Move toward `target` by at most `max_dist`, landing on it exactly when close
    fn drive(&mut self, target: &Pose2D, max_dist: f64) {
        let position = self.pose.position();
        let goal = target.position();
        let d = position.distance(&goal);
        if d <= max_dist {
            self.pose = Pose2D::new(goal.x, goal.y, target.yaw);
        } else {
            self.pose = Pose2D::new(
                position.x + max_dist * target.yaw.cos(),
                position.y + max_dist * target.yaw.sin(),
                target.yaw,
            );
        }
    }
}

fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info => "INF".normal(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold(),
    }
}

fn logger_init(min_level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let epoch = Instant::now();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{:10.6} {}] {}: {}",
                epoch.elapsed().as_secs_f64(),
                level_to_str(record.level()),
                record.target(),
                message
            ))
        })
        .level(min_level)
        .chain(std::io::stdout())
        .apply()
}

fn main() -> RoboticsResult<()> {
    if let Err(e) = logger_init(LevelFilter::Info) {
        eprintln!("logger setup failed: {}", e);
    }

    let args: Vec<String> = env::args().collect();
    let planner_config: PlannerConfig = match args.get(1) {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig { iterations_per_step: 50, max_iterations: 20000, ..Default::default() },
    };
    let generation_config: GenerationConfig = match args.get(2) {
        Some(path) => params::load(path)?,
        None => GenerationConfig {
            obs_count: 25,
            translate_rate: 0.3,
            translate_rotate_rate: 0.2,
            circular_rate: 0.1,
            ..Default::default()
        },
    };

    let start = Point2D::origin();
    let bounds = BoundingBox::new(-10.0, -10.0, 10.0, 10.0)?;
    let mut map = WorldMap::with_spatial_index(bounds, start, 0.5);
    let mut rng = StdRng::seed_from_u64(planner_config.seed);
    let placed = map.generate(&generation_config, start, &[Circle::at(start, 1.0)], &mut rng)?;
    info!("generated {} obstacles, goal at {:?}", placed, map.goal());

    let planner = DynamicRrt::new(&map, start, planner_config);
    let robot = PointRobot { pose: Pose2D::new(start.x, start.y, 0.0) };
    let mut controller = Controller::new(robot, Box::new(planner), 0.05, ControlMode::Incremental);

    let goal = map.goal();
    for tick in 0..MAX_TICKS {
        map.step_motion(DT);
        controller.step(&mut map);
        if controller.at_goal(&goal) {
            info!("goal reached after {} ticks ({:.2} s)", tick, tick as f64 * DT);
            return Ok(());
        }
        if controller.planner().has_terminated() {
            warn!("planner gave up after {} iterations", controller.planner().core().iterations);
            return Ok(());
        }
        if let Some(target) = controller.next() {
            controller.robot_mut().drive(&target, ROBOT_SPEED * DT);
        }
    }
    warn!("goal not reached within {} ticks", MAX_TICKS);
    Ok(())
}
