//! Geometry kernel: shapes, transforms, projections and intersection tests

pub mod bounds;
pub mod circle;
pub mod intersection;
pub mod polygon;
pub mod segment;

pub use bounds::BoundingBox;
pub use circle::Circle;
pub use intersection::{check_intersection, polygon_intersects, Shape};
pub use polygon::{Polygon, PolygonData};
pub use segment::{segment_buffer, Segment};
