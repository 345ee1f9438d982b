//! `Geometry2D`: engine singleton with 2D geometry helpers.

use crate::bindings::call::{call_1, call_2, call_3, call_4};
use crate::bindings::class_info::EngineClass;
use crate::bindings::method_bind::MethodBind;
use crate::bindings::runtime;
use crate::bindings::string_name::StringName;
use crate::bindings::variant::{Variant, VariantArray};
use crate::classes::Object;
use crate::core::error::{BindingError, BindingResult};
use glam::Vec2;
use std::sync::OnceLock;

static IS_POINT_IN_CIRCLE: MethodBind =
    MethodBind::new("Geometry2D", "is_point_in_circle", 2929491703);
static IS_POINT_IN_POLYGON: MethodBind =
    MethodBind::new("Geometry2D", "is_point_in_polygon", 738277916);
static SEGMENT_INTERSECTS_SEGMENT: MethodBind =
    MethodBind::new("Geometry2D", "segment_intersects_segment", 2058025344);
static GET_CLOSEST_POINT_TO_SEGMENT: MethodBind =
    MethodBind::new("Geometry2D", "get_closest_point_to_segment", 4172901909);
static IS_POLYGON_CLOCKWISE: MethodBind =
    MethodBind::new("Geometry2D", "is_polygon_clockwise", 1361156557);
static CONVEX_HULL: MethodBind = MethodBind::new("Geometry2D", "convex_hull", 2004331998);
static TRIANGULATE_POLYGON: MethodBind =
    MethodBind::new("Geometry2D", "triangulate_polygon", 1389921771);
static OFFSET_POLYGON: MethodBind = MethodBind::new("Geometry2D", "offset_polygon", 3837618924);

crate::engine_enum! {
    /// Corner style for polygon offsetting.
    pub struct PolyJoinType {
        JOIN_SQUARE = 0,
        JOIN_ROUND = 1,
        JOIN_MITER = 2,
    }
}

crate::engine_class! {
    pub struct Geometry2D : Object {
        methods: [
            "is_point_in_circle",
            "is_point_in_polygon",
            "segment_intersects_segment",
            "get_closest_point_to_segment",
            "is_polygon_clockwise",
            "convex_hull",
            "triangulate_polygon",
            "offset_polygon",
        ],
        properties: [],
        signals: [],
    }
}

impl Geometry2D {
    /// The engine-owned instance, looked up once.
    pub fn singleton() -> BindingResult<Geometry2D> {
        static SINGLETON: OnceLock<Option<Geometry2D>> = OnceLock::new();
        SINGLETON
            .get_or_init(|| {
                let name = StringName::new(Self::CLASS_NAME);
                let id = runtime::backend().singleton(&name);
                if id.is_none() {
                    tracing::error!(target: "bindings", class = Self::CLASS_NAME, "Singleton not found");
                }
                id.map(|id| Self::from_object_unchecked(Object::from_id(id)))
            })
            .clone()
            .ok_or_else(|| BindingError::SingletonNotFound(Self::CLASS_NAME.to_string()))
    }

    pub fn is_point_in_circle(&self, point: Vec2, circle_position: Vec2, circle_radius: f32) -> bool {
        call_3(&IS_POINT_IN_CIRCLE, self.handle(), point, circle_position, circle_radius)
    }

    pub fn is_point_in_polygon(&self, point: Vec2, polygon: &[Vec2]) -> bool {
        call_2(&IS_POINT_IN_POLYGON, self.handle(), point, polygon.to_vec())
    }

    /// Intersection point, `None` if the segments do not cross.
    pub fn segment_intersects_segment(
        &self,
        from_a: Vec2,
        to_a: Vec2,
        from_b: Vec2,
        to_b: Vec2,
    ) -> Option<Vec2> {
        let hit: Variant = call_4(&SEGMENT_INTERSECTS_SEGMENT, self.handle(), from_a, to_a, from_b, to_b);
        hit.try_to::<Vec2>().ok()
    }

    pub fn get_closest_point_to_segment(&self, point: Vec2, s1: Vec2, s2: Vec2) -> Vec2 {
        call_3(&GET_CLOSEST_POINT_TO_SEGMENT, self.handle(), point, s1, s2)
    }

    pub fn is_polygon_clockwise(&self, polygon: &[Vec2]) -> bool {
        call_1(&IS_POLYGON_CLOCKWISE, self.handle(), polygon.to_vec())
    }

    pub fn convex_hull(&self, points: &[Vec2]) -> Vec<Vec2> {
        call_1(&CONVEX_HULL, self.handle(), points.to_vec())
    }

    /// Triangle indices into `polygon`, empty if triangulation failed.
    pub fn triangulate_polygon(&self, polygon: &[Vec2]) -> Vec<i32> {
        call_1(&TRIANGULATE_POLYGON, self.handle(), polygon.to_vec())
    }

    /// Inflates (`delta > 0`) or deflates the polygon with square corners.
    pub fn offset_polygon(&self, polygon: &[Vec2], delta: f32) -> Vec<Vec<Vec2>> {
        self.offset_polygon_ex(polygon, delta).done()
    }

    pub fn offset_polygon_ex(&self, polygon: &[Vec2], delta: f32) -> ExOffsetPolygon<'_> {
        ExOffsetPolygon {
            geometry: self,
            polygon: polygon.to_vec(),
            delta,
            join_type: PolyJoinType::JOIN_SQUARE,
        }
    }
}

#[must_use]
pub struct ExOffsetPolygon<'a> {
    geometry: &'a Geometry2D,
    polygon: Vec<Vec2>,
    delta: f32,
    join_type: PolyJoinType,
}

impl ExOffsetPolygon<'_> {
    pub fn join_type(mut self, join_type: PolyJoinType) -> Self {
        self.join_type = join_type;
        self
    }

    pub fn done(self) -> Vec<Vec<Vec2>> {
        let polygons: VariantArray = call_3(
            &OFFSET_POLYGON,
            self.geometry.handle(),
            self.polygon,
            self.delta,
            self.join_type,
        );
        polygons.iter().map(|polygon| polygon.to::<Vec<Vec2>>()).collect()
    }
}
