use rust_motion_planning::geometry::BoundingBox;
use rust_motion_planning::path_planning::{
    build_planner, segment_collides, DynamicRrt, GridSearch, GridStrategy, PlannerConfig, PlannerKind, Rrt,
};
use rust_motion_planning::{ControlMode, Controller, MotionLaw, Obstacle, Point2D, Pose2D, Robot, SearchAlgorithm, WorldMap};

fn boxed_map() -> WorldMap {
    let mut map = WorldMap::new(BoundingBox::new(-5.0, -5.0, 5.0, 5.0).unwrap(), Point2D::new(3.0, 0.0), 0.5);
    let id = map.add_obstacle(Obstacle::rectangle(Pose2D::origin(), 1.0, 1.0, MotionLaw::Static).unwrap());
    assert_eq!(id, Some(0));
    map
}

fn assert_clear(map: &WorldMap, start: Point2D, path: &[Point2D], clearance: f64) {
    let mut prev = start;
    for p in path {
        assert!(!segment_collides(map, &prev, p, clearance), "segment {:?} -> {:?} collides", prev, p);
        prev = *p;
    }
}

#[test]
fn grid_a_star_clears_box() {
    let mut map = boxed_map();
    let start = Point2D::new(-3.0, 0.0);
    let config = PlannerConfig { margin: 0.2, discretization_step: 0.2, iterations_per_step: 100, ..Default::default() };
    let mut planner = GridSearch::new(&map, start, GridStrategy::AStar, &config);
    planner.search(&mut map);

    assert!(planner.has_path());
    assert_eq!(planner.path().last(), Some(&Point2D::new(3.0, 0.0)));
    assert_clear(&map, start, &planner.path().points, 0.1);
    assert!(map.changes_enabled());
}

#[test]
fn uninformed_grid_searches_reach_goal() {
    for strategy in [GridStrategy::BreadthFirst, GridStrategy::DepthFirst, GridStrategy::BestFirst] {
        let mut map = boxed_map();
        let start = Point2D::new(-3.0, 0.0);
        let config = PlannerConfig { discretization_step: 0.25, iterations_per_step: 200, ..Default::default() };
        let mut planner = GridSearch::new(&map, start, strategy, &config);
        planner.search(&mut map);
        assert!(planner.has_path(), "{} found no path", strategy);
        assert_clear(&map, start, &planner.path().points, 0.1);
    }
}

#[test]
fn rrt_in_free_space() {
    let mut map = WorldMap::new(BoundingBox::new(-5.0, -5.0, 5.0, 5.0).unwrap(), Point2D::new(1.0, 0.0), 0.1);
    let config = PlannerConfig { step_length: 0.2, goal_sample_rate: 0.05, seed: 1, ..Default::default() };
    let mut planner = Rrt::new(&map, Point2D::origin(), config);
    planner.search(&mut map);

    assert!(planner.has_path());
    assert!(planner.path().length_from(&Point2D::origin()) >= 1.0 - 1e-9);
    // every hop is at most one step
    let mut prev = Point2D::origin();
    for p in &planner.path().points {
        assert!(prev.distance(p) <= 0.2 + 1e-9);
        prev = *p;
    }
}

#[test]
fn rrt_reaches_nearby_goal_within_step_bound() {
    // goal 1.0 away with step 0.2: most runs connect within 5 / 0.2 = 25 iterations
    // when the sampling box hugs the start and goal
    let bound = 25;
    let runs = 40;
    let mut within = 0;
    for seed in 0..runs {
        let mut map = WorldMap::new(BoundingBox::new(-0.5, -1.0, 1.5, 1.0).unwrap(), Point2D::new(1.0, 0.0), 0.1);
        let config = PlannerConfig {
            step_length: 0.2,
            goal_sample_rate: 0.05,
            iterations_per_step: 1,
            margin: 0.0,
            seed,
            ..Default::default()
        };
        let mut planner = Rrt::new(&map, Point2D::origin(), config);
        for _ in 0..bound {
            if planner.has_path() {
                break;
            }
            planner.step(&mut map);
        }
        if planner.has_path() {
            within += 1;
        }
    }
    assert!(within * 2 > runs, "{} of {} runs within {} iterations", within, runs, bound);
}

#[test]
fn dynamic_rrt_repairs_blocked_path() {
    let mut map = WorldMap::new(BoundingBox::new(-5.0, -5.0, 5.0, 5.0).unwrap(), Point2D::new(3.0, 0.0), 0.3);
    let start = Point2D::new(-3.0, 0.0);
    let config = PlannerConfig { goal_sample_rate: 0.1, iterations_per_step: 20, seed: 9, ..Default::default() };
    let mut planner = DynamicRrt::new(&map, start, config);
    for _ in 0..500 {
        if planner.has_path() {
            break;
        }
        planner.step(&mut map);
    }
    assert!(planner.has_path());
    assert!(planner.is_dynamic());
    if !map.changes_enabled() {
        map.enable();
    }

    // block one edge in the middle of the route
    let route: Vec<Point2D> = std::iter::once(start).chain(planner.path().points.iter().copied()).collect();
    let mut blocked = false;
    for i in (route.len() / 2)..(route.len() - 1) {
        let (a, b) = (route[i], route[i + 1]);
        let mid = Pose2D::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, 0.0);
        if map.add_obstacle(Obstacle::rectangle(mid, 0.2, 0.2, MotionLaw::Static).unwrap()).is_some() {
            blocked = true;
            break;
        }
    }
    assert!(blocked);

    assert!(planner.invalidate_nodes(&map) > 0);
    planner.trim();
    planner.extract_waypoints();
    assert!(planner.is_path_invalid());
    assert!(!planner.has_path());

    for _ in 0..1000 {
        if !planner.is_path_invalid() {
            break;
        }
        planner.step(&mut map);
    }
    assert!(!planner.is_path_invalid());
    assert!(planner.has_path());
    assert_eq!(planner.path().last(), Some(&Point2D::new(3.0, 0.0)));
    assert_clear(&map, start, &planner.path().points, 0.2);
    assert!(planner.waypoints().is_empty());
}

struct PointRobot {
    pose: Pose2D,
}

impl Robot for PointRobot {
    fn pose(&self) -> Pose2D {
        self.pose
    }
}

#[test]
fn controller_drives_around_box() {
    let mut map = boxed_map();
    let start = Point2D::new(-3.0, 0.0);
    let config = PlannerConfig { discretization_step: 0.25, iterations_per_step: 20, ..Default::default() };
    let planner = build_planner(PlannerKind::Grid(GridStrategy::AStar), &map, start, &config).unwrap();
    let robot = PointRobot { pose: Pose2D::new(start.x, start.y, 0.0) };
    let mut controller = Controller::new(robot, planner, 1e-9, ControlMode::Incremental);

    let goal = map.goal();
    let mut visited = vec![start];
    for _ in 0..500 {
        controller.step(&mut map);
        if controller.at_goal(&goal) {
            break;
        }
        if let Some(target) = controller.next() {
            controller.robot_mut().pose = target;
            visited.push(target.position());
        }
    }
    assert!(controller.at_goal(&goal));
    visited.dedup();
    assert_clear(&map, start, &visited[1..], 0.1);
}
