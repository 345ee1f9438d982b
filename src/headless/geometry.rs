//! `Geometry2D` singleton.
//!
//! Only the point, segment, winding and hull queries are modelled;
//! triangulation and polygon offsetting are left to the native engine.

use super::classdb::ClassDef;
use super::{arg, HeadlessEngine};
use crate::bindings::backend::ObjectId;
use crate::bindings::variant::Variant;
use glam::Vec2;

const EPSILON: f32 = 1e-5;

pub(super) fn register(classes: &mut Vec<ClassDef>) {
    classes.push(
        ClassDef::new("Geometry2D", Some("Object"))
            .singleton()
            .method("is_point_in_circle", 2929491703, |_, _, args| {
                let point: Vec2 = arg(args, 0);
                let center: Vec2 = arg(args, 1);
                let radius: f64 = arg(args, 2);
                Variant::Bool(point.distance_squared(center) <= (radius * radius) as f32)
            })
            .method("is_point_in_polygon", 738277916, |_, _, args| {
                let point: Vec2 = arg(args, 0);
                let polygon: Vec<Vec2> = arg(args, 1);
                Variant::Bool(is_point_in_polygon(point, &polygon))
            })
            .method("segment_intersects_segment", 2058025344, GeometryService::segment_intersects_segment)
            .method("get_closest_point_to_segment", 4172901909, |_, _, args| {
                let point: Vec2 = arg(args, 0);
                Variant::Vector2(closest_point_to_segment(point, arg(args, 1), arg(args, 2)))
            })
            .method("is_polygon_clockwise", 1361156557, |_, _, args| {
                let polygon: Vec<Vec2> = arg(args, 0);
                Variant::Bool(is_polygon_clockwise(&polygon))
            })
            .method("convex_hull", 2004331998, |_, _, args| {
                let points: Vec<Vec2> = arg(args, 0);
                Variant::PackedVector2Array(convex_hull(points))
            }),
    );
}

/// 几何服务
pub struct GeometryService;

impl GeometryService {
    /// 相交点；不相交时返回 nil
    fn segment_intersects_segment(_engine: &HeadlessEngine, _id: ObjectId, args: &[Variant]) -> Variant {
        let from_a: Vec2 = arg(args, 0);
        let to_a: Vec2 = arg(args, 1);
        let from_b: Vec2 = arg(args, 2);
        let to_b: Vec2 = arg(args, 3);

        let r = to_a - from_a;
        let s = to_b - from_b;
        let denominator = r.perp_dot(s);
        if denominator.abs() < EPSILON {
            return Variant::Nil;
        }
        let offset = from_b - from_a;
        let t = offset.perp_dot(s) / denominator;
        let u = offset.perp_dot(r) / denominator;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Variant::Vector2(from_a + r * t)
        } else {
            Variant::Nil
        }
    }
}

fn closest_point_to_segment(point: Vec2, from: Vec2, to: Vec2) -> Vec2 {
    let segment = to - from;
    let length_squared = segment.length_squared();
    if length_squared == 0.0 {
        return from;
    }
    let t = ((point - from).dot(segment) / length_squared).clamp(0.0, 1.0);
    from + segment * t
}

/// 射线法
fn is_point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut previous = polygon[polygon.len() - 1];
    for &current in polygon {
        if (current.y > point.y) != (previous.y > point.y) {
            let x = (previous.x - current.x) * (point.y - current.y) / (previous.y - current.y) + current.x;
            if point.x < x {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

/// y 轴向下的坐标系中顺时针为正
fn is_polygon_clockwise(polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let sum: f32 = polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .map(|(a, b)| (b.x - a.x) * (b.y + a.y))
        .sum();
    sum > 0.0
}

/// Andrew 单调链；结果首尾相同
fn convex_hull(mut points: Vec<Vec2>) -> Vec<Vec2> {
    if points.len() < 3 {
        return points;
    }
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    let cross = |o: Vec2, a: Vec2, b: Vec2| (a - o).perp_dot(b - o);

    let mut hull: Vec<Vec2> = Vec::with_capacity(points.len() * 2);
    for &point in &points {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], point) <= 0.0 {
            hull.pop();
        }
        hull.push(point);
    }
    let lower_len = hull.len() + 1;
    for &point in points.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], point) <= 0.0 {
            hull.pop();
        }
        hull.push(point);
    }
    hull
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hull_of_collinear_points() {
        let hull = convex_hull(vec![Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)]);
        assert_eq!(hull.first(), hull.last());
        assert!(!hull.contains(&Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(!is_polygon_clockwise(&[Vec2::ZERO, Vec2::ONE]));
        assert!(!is_point_in_polygon(Vec2::ZERO, &[]));
        assert_eq!(closest_point_to_segment(Vec2::ONE, Vec2::ZERO, Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_parallel_segments_do_not_intersect() {
        let engine = HeadlessEngine::new();
        let id = engine.create_object_of("Geometry2D").unwrap();
        let args = [
            Variant::Vector2(Vec2::ZERO),
            Variant::Vector2(Vec2::new(1.0, 0.0)),
            Variant::Vector2(Vec2::new(0.0, 1.0)),
            Variant::Vector2(Vec2::new(1.0, 1.0)),
        ];
        assert_eq!(GeometryService::segment_intersects_segment(&engine, id, &args), Variant::Nil);
    }
}
