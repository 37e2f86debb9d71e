use crate::component::OverlayComponent;
use crate::listener::OverlayListener;
use crate::math::Vec3;
use crate::primitives::{Color, Line, LineId, Point, PointId};

impl<L: OverlayListener> OverlayComponent<L> {
    /// Add an axis-aligned box from min to max corners (12 edges).
    pub fn add_aabb(&mut self, min: Vec3, max: Vec3, color: Color, thickness: f32) -> Vec<LineId> {
        let c = [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(max.x, max.y, max.z),
            Vec3::new(min.x, max.y, max.z),
        ];
        const EDGES: [(usize, usize); 12] = [
            // Bottom face
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            // Top face
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
            // Vertical edges
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];
        EDGES
            .iter()
            .map(|&(a, b)| self.add_line(Line::new(c[a], c[b], color, thickness)))
            .collect()
    }

    /// Add a connected run of segments through `points`.
    ///
    /// A closed polyline also joins the last point back to the first.
    /// Fewer than two points add nothing.
    pub fn add_polyline(
        &mut self,
        points: &[Vec3],
        closed: bool,
        color: Color,
        thickness: f32,
    ) -> Vec<LineId> {
        if points.len() < 2 {
            return Vec::new();
        }
        let mut ids: Vec<LineId> = points
            .windows(2)
            .map(|w| self.add_line(Line::new(w[0], w[1], color, thickness)))
            .collect();
        if closed && points.len() > 2 {
            let (first, last) = (points[0], points[points.len() - 1]);
            ids.push(self.add_line(Line::new(last, first, color, thickness)));
        }
        ids
    }

    /// Add a circle in the plane spanned by two orthogonal axes.
    ///
    /// `segments` is clamped to at least 3.
    #[allow(clippy::too_many_arguments)]
    pub fn add_circle(
        &mut self,
        center: Vec3,
        radius: f32,
        axis_a: Vec3,
        axis_b: Vec3,
        segments: u32,
        color: Color,
        thickness: f32,
    ) -> Vec<LineId> {
        let segments = segments.max(3);
        let ring: Vec<Vec3> = (0..segments)
            .map(|i| {
                let angle = i as f32 * std::f32::consts::TAU / segments as f32;
                let (sin, cos) = angle.sin_cos();
                center + (axis_a * cos + axis_b * sin) * radius
            })
            .collect();
        self.add_polyline(&ring, true, color, thickness)
    }

    /// Add a grid on the XZ plane with `2 * half_count + 1` lines per axis.
    pub fn add_grid(
        &mut self,
        center: Vec3,
        cell_size: f32,
        half_count: u32,
        color: Color,
        thickness: f32,
    ) -> Vec<LineId> {
        let extent = cell_size * half_count as f32;
        let n = half_count as i32;
        let mut ids = Vec::with_capacity(2 * (2 * half_count as usize + 1));

        for i in -n..=n {
            let offset = i as f32 * cell_size;
            // Line along Z
            ids.push(self.add_line(Line::new(
                Vec3::new(center.x + offset, center.y, center.z - extent),
                Vec3::new(center.x + offset, center.y, center.z + extent),
                color,
                thickness,
            )));
            // Line along X
            ids.push(self.add_line(Line::new(
                Vec3::new(center.x - extent, center.y, center.z + offset),
                Vec3::new(center.x + extent, center.y, center.z + offset),
                color,
                thickness,
            )));
        }
        ids
    }

    /// Add a coordinate axes gizmo (R=X, G=Y, B=Z).
    pub fn add_axes(&mut self, center: Vec3, size: f32, thickness: f32) -> [LineId; 3] {
        [
            self.add_line(Line::new(center, center + Vec3::x() * size, Color::RED, thickness)),
            self.add_line(Line::new(center, center + Vec3::y() * size, Color::GREEN, thickness)),
            self.add_line(Line::new(center, center + Vec3::z() * size, Color::BLUE, thickness)),
        ]
    }

    /// Add one point per position, all sharing a color and size.
    pub fn add_point_cloud(&mut self, positions: &[Vec3], color: Color, size: f32) -> Vec<PointId> {
        positions
            .iter()
            .map(|&p| self.add_point(Point::new(p, color, size)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::component::{OverlayComponent, OverlayDescriptor};
    use crate::math::Vec3;
    use crate::primitives::{Color, MaterialHandle};

    fn overlay() -> OverlayComponent {
        OverlayComponent::new(OverlayDescriptor::new(MaterialHandle(1), MaterialHandle(2)))
    }

    #[test]
    fn aabb_adds_twelve_edges() {
        let mut o = overlay();
        let ids = o.add_aabb(Vec3::zeros(), Vec3::new(1.0, 2.0, 3.0), Color::WHITE, 1.0);
        assert_eq!(ids.len(), 12);
        assert_eq!(o.line_count(), 12);
        let b = o.bounds();
        assert_eq!(b.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn polyline_open_and_closed() {
        let mut o = overlay();
        let pts = [Vec3::zeros(), Vec3::x(), Vec3::y()];
        assert_eq!(o.add_polyline(&pts, false, Color::WHITE, 1.0).len(), 2);
        let closed = o.add_polyline(&pts, true, Color::WHITE, 1.0);
        assert_eq!(closed.len(), 3);
        let last = o.line(closed[2]).unwrap();
        assert_eq!(last.start, Vec3::y());
        assert_eq!(last.end, Vec3::zeros());
        assert!(o.add_polyline(&pts[..1], true, Color::WHITE, 1.0).is_empty());
    }

    #[test]
    fn circle_clamps_segments() {
        let mut o = overlay();
        let ids = o.add_circle(Vec3::zeros(), 1.0, Vec3::x(), Vec3::z(), 1, Color::WHITE, 1.0);
        assert_eq!(ids.len(), 3);
        let ids = o.add_circle(Vec3::zeros(), 2.0, Vec3::x(), Vec3::z(), 16, Color::WHITE, 1.0);
        assert_eq!(ids.len(), 16);
        for id in ids {
            let line = o.line(id).unwrap();
            assert!((line.start.norm() - 2.0).abs() < 1e-5);
            assert!(line.start.y.abs() < 1e-6);
        }
    }

    #[test]
    fn grid_line_count() {
        let mut o = overlay();
        let ids = o.add_grid(Vec3::zeros(), 1.0, 2, Color::WHITE, 1.0);
        assert_eq!(ids.len(), 10);
        let b = o.bounds();
        assert_eq!(b.min, Vec3::new(-2.0, 0.0, -2.0));
        assert_eq!(b.max, Vec3::new(2.0, 0.0, 2.0));
    }

    #[test]
    fn axes_are_colored_and_removable() {
        let mut o = overlay();
        let [x, y, z] = o.add_axes(Vec3::zeros(), 2.0, 1.0);
        assert_eq!(o.line(x).unwrap().color, Color::RED);
        assert_eq!(o.line(y).unwrap().end, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(o.line(z).unwrap().color, Color::BLUE);
        o.remove_line(y).unwrap();
        assert_eq!(o.line_count(), 2);
    }

    #[test]
    fn point_cloud_returns_ids_in_order() {
        let mut o = overlay();
        let pts = [Vec3::x(), Vec3::y(), Vec3::z()];
        let ids = o.add_point_cloud(&pts, Color::YELLOW, 4.0);
        for (id, p) in ids.iter().zip(pts.iter()) {
            assert_eq!(o.point(*id).unwrap().position, *p);
        }
        assert_eq!(o.render_data().vertex_count(), 12);
    }
}
