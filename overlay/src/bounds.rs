//! Axis-aligned bounds over overlay geometry.

use crate::math::{Mat4, Point3, Vec3, vec3_max, vec3_min};
use crate::store::PrimitiveStore;

/// An axis-aligned bounding box.
///
/// [`Aabb::EMPTY`] has inverted infinite extents so that expanding it by any
/// point yields a box containing exactly that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// A box containing nothing.
    pub const EMPTY: Self = Self {
        min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    /// Creates a box from its corners.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point of `points`.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.expand(p);
        }
        aabb
    }

    /// Whether the box contains no points.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grows the box to include `point`.
    pub fn expand(&mut self, point: &Vec3) {
        self.min = vec3_min(&self.min, point);
        self.max = vec3_max(&self.max, point);
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: vec3_min(&self.min, &other.min),
            max: vec3_max(&self.max, &other.max),
        }
    }

    /// Whether `point` lies inside or on the box.
    pub fn contains_point(&self, point: &Vec3) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Center of the box. Meaningless for an empty box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-size of the box along each axis. Meaningless for an empty box.
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
        ]
    }

    /// Bounds of this box after applying an affine transform.
    ///
    /// The result encloses all eight transformed corners, so it may be
    /// looser than the transformed geometry. An empty box stays empty.
    pub fn transformed(&self, transform: &Mat4) -> Self {
        if self.is_empty() {
            return Self::EMPTY;
        }
        let mut out = Self::EMPTY;
        for corner in self.corners() {
            let p = transform.transform_point(&Point3::from(corner));
            out.expand(&p.coords);
        }
        out
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Lazily recomputed bounds of everything in a [`PrimitiveStore`].
///
/// Only position changes invalidate the cache. Color, thickness and size
/// edits leave it untouched.
#[derive(Debug, Clone)]
pub struct BoundsCache {
    cached: Aabb,
    dirty: bool,
    recompute_count: u64,
}

impl BoundsCache {
    /// Creates a dirty cache; the first query computes the bounds.
    pub fn new() -> Self {
        Self {
            cached: Aabb::EMPTY,
            dirty: true,
            recompute_count: 0,
        }
    }

    /// Marks the cached bounds as stale.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Whether the next query will recompute.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// How many times the bounds were recomputed.
    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    /// Returns the bounds, recomputing them from `store` if stale.
    pub fn get(&mut self, store: &PrimitiveStore) -> Aabb {
        if self.dirty {
            self.cached = compute_bounds(store);
            self.dirty = false;
            self.recompute_count += 1;
        }
        self.cached
    }
}

impl Default for BoundsCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounds of every line endpoint, point position and triangle vertex.
pub fn compute_bounds(store: &PrimitiveStore) -> Aabb {
    let mut aabb = Aabb::EMPTY;
    for line in store.lines().values() {
        aabb.expand(&line.start);
        aabb.expand(&line.end);
    }
    for point in store.points().values() {
        aabb.expand(&point.position);
    }
    for group in store.material_groups().values() {
        for triangle in group.triangles().values() {
            for vertex in &triangle.vertices {
                aabb.expand(&vertex.position);
            }
        }
    }
    aabb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Color, Line, MaterialHandle, Point, Triangle};

    #[test]
    fn test_empty_aabb() {
        assert!(Aabb::EMPTY.is_empty());
        let mut aabb = Aabb::EMPTY;
        aabb.expand(&Vec3::new(1.0, 2.0, 3.0));
        assert!(!aabb.is_empty());
        assert_eq!(aabb.min, aabb.max);
    }

    #[test]
    fn test_from_points() {
        let points = [
            Vec3::new(1.0, -2.0, 3.0),
            Vec3::new(-1.0, 4.0, 0.0),
            Vec3::new(0.5, 0.0, -3.0),
        ];
        let aabb = Aabb::from_points(&points);
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 3.0));
        assert!(Aabb::from_points(&points[..0]).is_empty());
    }

    #[test]
    fn test_union_and_contains() {
        let a = Aabb::from_min_max(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let b = Aabb::from_min_max(Vec3::new(2.0, -1.0, 0.0), Vec3::new(3.0, 0.0, 0.5));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(u.max, Vec3::new(3.0, 1.0, 1.0));
        assert!(u.contains_point(&Vec3::new(2.5, 0.5, 0.5)));
        assert!(!a.contains_point(&Vec3::new(2.5, 0.5, 0.5)));
        assert_eq!(u.center(), Vec3::new(1.5, 0.0, 0.5));
        assert_eq!(u.extents(), Vec3::new(1.5, 1.0, 0.5));
    }

    #[test]
    fn test_transformed_translation() {
        let a = Aabb::from_min_max(Vec3::zeros(), Vec3::new(1.0, 2.0, 3.0));
        let t = Mat4::new_translation(&Vec3::new(10.0, 0.0, -1.0));
        let moved = a.transformed(&t);
        assert_eq!(moved.min, Vec3::new(10.0, 0.0, -1.0));
        assert_eq!(moved.max, Vec3::new(11.0, 2.0, 2.0));
        assert!(Aabb::EMPTY.transformed(&t).is_empty());
    }

    #[test]
    fn test_store_bounds() {
        let mut store = PrimitiveStore::new();
        store.add_line(Line::new(
            Vec3::zeros(),
            Vec3::new(10.0, 0.0, 0.0),
            Color::WHITE,
            1.0,
        ));
        store.add_point(Point::new(Vec3::new(0.0, 5.0, 0.0), Color::WHITE, 1.0));

        let aabb = compute_bounds(&store);
        assert_eq!(aabb.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(10.0, 5.0, 0.0));

        store.add_triangle(Triangle::flat(
            MaterialHandle(1),
            [
                Vec3::new(0.0, 0.0, -2.0),
                Vec3::x(),
                Vec3::y(),
            ],
            Color::WHITE,
        ));
        assert_eq!(compute_bounds(&store).min, Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_cache_recomputes_only_when_dirty() {
        let mut store = PrimitiveStore::new();
        let mut cache = BoundsCache::new();
        assert!(cache.get(&store).is_empty());
        assert_eq!(cache.recompute_count(), 1);

        cache.get(&store);
        assert_eq!(cache.recompute_count(), 1);

        store.add_point(Point::new(Vec3::new(1.0, 1.0, 1.0), Color::WHITE, 1.0));
        // The cache does not observe the store; staleness is signalled explicitly.
        assert!(cache.get(&store).is_empty());
        cache.invalidate();
        assert!(cache.is_dirty());
        assert_eq!(cache.get(&store).max, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(cache.recompute_count(), 2);
    }
}
