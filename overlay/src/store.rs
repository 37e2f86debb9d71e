//! Storage for overlay lines, points and per-material triangle groups.
//!
//! [`PrimitiveStore`] owns every primitive and the bookkeeping that lets a
//! [`TriangleId`] be removed without scanning: each triangle ID maps to a
//! `(material_index, index_in_group)` pair. Material groups are created on
//! the first triangle for a material and destroyed when their last triangle
//! is removed.
//!
//! The store is pure data. Notifying a renderer and invalidating bounds is
//! the job of [`OverlayComponent`](crate::OverlayComponent), which wraps it.

use std::collections::HashMap;

use crate::error::{HandleKind, OverlayError, Result};
use crate::primitives::{
    Color, Line, LineId, MaterialHandle, Point, PointId, Triangle, TriangleId,
};
use crate::sparse_array::SparseArray;

/// Number of material slots reserved ahead of the triangle groups.
///
/// Slot 0 is the line material, slot 1 the point material.
pub const RESERVED_MATERIAL_SLOTS: u32 = 2;

/// External material slot number of the line batch.
pub const LINE_MATERIAL_SLOT: u32 = 0;

/// External material slot number of the point batch.
pub const POINT_MATERIAL_SLOT: u32 = 1;

/// Converts a material-group index into its external material slot number.
#[inline]
pub const fn material_slot_for_group(material_index: u32) -> u32 {
    material_index + RESERVED_MATERIAL_SLOTS
}

/// All triangles currently drawn with one material.
#[derive(Debug, Clone)]
pub struct MaterialGroup {
    material: MaterialHandle,
    triangles: SparseArray<Triangle>,
}

impl MaterialGroup {
    fn new(material: MaterialHandle) -> Self {
        Self {
            material,
            triangles: SparseArray::new(),
        }
    }

    /// The material shared by every triangle in this group.
    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    /// The triangles of this group in slot order.
    pub fn triangles(&self) -> &SparseArray<Triangle> {
        &self.triangles
    }

    /// Number of live triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the group holds no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

/// Where a triangle lives inside the material groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TriangleLocation {
    material_index: u32,
    index_in_group: u32,
}

/// Result of [`PrimitiveStore::find_or_add_material_group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialGroupEntry {
    /// Index of the material group.
    pub index: u32,
    /// `true` if the group was created by this call.
    pub created: bool,
}

/// Result of adding or inserting a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedTriangle {
    pub id: TriangleId,
    /// The material group the triangle went into.
    pub group: MaterialGroupEntry,
}

/// Result of [`PrimitiveStore::remove_triangle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemovedTriangle {
    pub triangle: Triangle,
    /// Index of the material group destroyed because it became empty.
    pub released_group: Option<u32>,
}

/// Owner of all overlay primitives.
#[derive(Debug, Clone, Default)]
pub struct PrimitiveStore {
    lines: SparseArray<Line>,
    points: SparseArray<Point>,
    triangles: SparseArray<TriangleLocation>,
    material_groups: SparseArray<MaterialGroup>,
    material_indices: HashMap<MaterialHandle, u32>,
}

impl PrimitiveStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with slot capacity reserved for lines and points.
    pub fn with_capacity(lines: usize, points: usize) -> Self {
        Self {
            lines: SparseArray::with_capacity(lines),
            points: SparseArray::with_capacity(points),
            ..Self::default()
        }
    }

    // --- Lines ---

    /// Adds a line and returns its new ID.
    pub fn add_line(&mut self, line: Line) -> LineId {
        LineId::from_index(self.lines.add(line))
    }

    /// Adds a line at a specific ID.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::HandleInUse`] if `id` is occupied.
    pub fn insert_line(&mut self, id: LineId, line: Line) -> Result<()> {
        self.lines
            .insert_at(id.index(), line)
            .map_err(|_| in_use(HandleKind::Line, id.index()))
    }

    /// Changes the color of a line.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidHandle`] if `id` is not a live line.
    pub fn set_line_color(&mut self, id: LineId, color: Color) -> Result<()> {
        self.line_mut(id)?.color = color;
        Ok(())
    }

    /// Changes the thickness of a line.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidHandle`] if `id` is not a live line.
    pub fn set_line_thickness(&mut self, id: LineId, thickness: f32) -> Result<()> {
        self.line_mut(id)?.thickness = thickness;
        Ok(())
    }

    /// Removes a line, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidHandle`] if `id` is not a live line.
    pub fn remove_line(&mut self, id: LineId) -> Result<Line> {
        self.lines
            .remove_at(id.index())
            .ok_or_else(|| invalid(HandleKind::Line, id.index()))
    }

    /// Returns whether `id` addresses a live line.
    pub fn is_line_valid(&self, id: LineId) -> bool {
        self.lines.is_valid(id.index())
    }

    /// Returns the line at `id`, if live.
    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(id.index())
    }

    fn line_mut(&mut self, id: LineId) -> Result<&mut Line> {
        self.lines
            .get_mut(id.index())
            .ok_or_else(|| invalid(HandleKind::Line, id.index()))
    }

    // --- Points ---

    /// Adds a point and returns its new ID.
    pub fn add_point(&mut self, point: Point) -> PointId {
        PointId::from_index(self.points.add(point))
    }

    /// Adds a point at a specific ID.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::HandleInUse`] if `id` is occupied.
    pub fn insert_point(&mut self, id: PointId, point: Point) -> Result<()> {
        self.points
            .insert_at(id.index(), point)
            .map_err(|_| in_use(HandleKind::Point, id.index()))
    }

    /// Changes the color of a point.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidHandle`] if `id` is not a live point.
    pub fn set_point_color(&mut self, id: PointId, color: Color) -> Result<()> {
        self.point_mut(id)?.color = color;
        Ok(())
    }

    /// Changes the size of a point.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidHandle`] if `id` is not a live point.
    pub fn set_point_size(&mut self, id: PointId, size: f32) -> Result<()> {
        self.point_mut(id)?.size = size;
        Ok(())
    }

    /// Removes a point, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidHandle`] if `id` is not a live point.
    pub fn remove_point(&mut self, id: PointId) -> Result<Point> {
        self.points
            .remove_at(id.index())
            .ok_or_else(|| invalid(HandleKind::Point, id.index()))
    }

    /// Returns whether `id` addresses a live point.
    pub fn is_point_valid(&self, id: PointId) -> bool {
        self.points.is_valid(id.index())
    }

    /// Returns the point at `id`, if live.
    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.points.get(id.index())
    }

    fn point_mut(&mut self, id: PointId) -> Result<&mut Point> {
        self.points
            .get_mut(id.index())
            .ok_or_else(|| invalid(HandleKind::Point, id.index()))
    }

    // --- Triangles ---

    /// Returns the group index for `material`, creating the group if needed.
    ///
    /// A group created without a triangle stays until a triangle is added and
    /// removed again, or until [`clear`](Self::clear).
    pub fn find_or_add_material_group(&mut self, material: MaterialHandle) -> MaterialGroupEntry {
        if let Some(&index) = self.material_indices.get(&material) {
            return MaterialGroupEntry {
                index,
                created: false,
            };
        }

        let index = self.material_groups.add(MaterialGroup::new(material));
        self.material_indices.insert(material, index);
        log::debug!(
            "Created material group {} (slot {}) for {:?}",
            index,
            material_slot_for_group(index),
            material
        );
        MaterialGroupEntry {
            index,
            created: true,
        }
    }

    /// Adds a triangle to its material's group and returns its new ID.
    pub fn add_triangle(&mut self, triangle: Triangle) -> AddedTriangle {
        let group = self.find_or_add_material_group(triangle.material);
        let location = self.push_into_group(group.index, triangle);
        let id = TriangleId::from_index(self.triangles.add(location));
        AddedTriangle { id, group }
    }

    /// Adds a triangle at a specific ID.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::HandleInUse`] if `id` is occupied. The store is
    /// left unchanged in that case.
    pub fn insert_triangle(
        &mut self,
        id: TriangleId,
        triangle: Triangle,
    ) -> Result<AddedTriangle> {
        if self.triangles.is_valid(id.index()) {
            return Err(in_use(HandleKind::Triangle, id.index()));
        }

        let group = self.find_or_add_material_group(triangle.material);
        let location = self.push_into_group(group.index, triangle);
        self.triangles
            .insert_at(id.index(), location)
            .map_err(|_| in_use(HandleKind::Triangle, id.index()))?;
        Ok(AddedTriangle { id, group })
    }

    /// Removes a triangle, destroying its material group if it became empty.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidHandle`] if `id` is not a live triangle.
    pub fn remove_triangle(&mut self, id: TriangleId) -> Result<RemovedTriangle> {
        let location = self
            .triangles
            .remove_at(id.index())
            .ok_or_else(|| invalid(HandleKind::Triangle, id.index()))?;

        let group = self
            .material_groups
            .get_mut(location.material_index)
            .ok_or_else(|| invalid(HandleKind::MaterialGroup, location.material_index))?;
        let triangle = group
            .triangles
            .remove_at(location.index_in_group)
            .ok_or_else(|| invalid(HandleKind::Triangle, id.index()))?;

        let released_group = if group.is_empty() {
            self.release_material_group(location.material_index);
            Some(location.material_index)
        } else {
            None
        };

        Ok(RemovedTriangle {
            triangle,
            released_group,
        })
    }

    /// Returns whether `id` addresses a live triangle.
    pub fn is_triangle_valid(&self, id: TriangleId) -> bool {
        self.triangles.is_valid(id.index())
    }

    /// Returns the triangle at `id`, if live.
    pub fn triangle(&self, id: TriangleId) -> Option<&Triangle> {
        let location = self.triangles.get(id.index())?;
        self.material_groups
            .get(location.material_index)?
            .triangles
            .get(location.index_in_group)
    }

    /// Returns the material-group index a triangle belongs to.
    pub fn triangle_material_index(&self, id: TriangleId) -> Option<u32> {
        self.triangles.get(id.index()).map(|l| l.material_index)
    }

    fn push_into_group(&mut self, material_index: u32, triangle: Triangle) -> TriangleLocation {
        let index_in_group = match self.material_groups.get_mut(material_index) {
            Some(group) => group.triangles.add(triangle),
            // find_or_add_material_group always leaves the group in place.
            None => unreachable!("material group {material_index} missing"),
        };
        TriangleLocation {
            material_index,
            index_in_group,
        }
    }

    fn release_material_group(&mut self, material_index: u32) {
        if let Some(group) = self.material_groups.remove_at(material_index) {
            self.material_indices.remove(&group.material);
            log::debug!(
                "Released material group {} (slot {}) for {:?}",
                material_index,
                material_slot_for_group(material_index),
                group.material
            );
        }
    }

    // --- Whole-store ---

    /// Removes every primitive and material group.
    ///
    /// Returns the indices of the material groups that were live.
    pub fn clear(&mut self) -> Vec<u32> {
        let released: Vec<u32> = self.material_groups.iter().map(|(i, _)| i).collect();
        self.lines.clear();
        self.points.clear();
        self.triangles.clear();
        self.material_groups.clear();
        self.material_indices.clear();
        released
    }

    /// Number of material slots the renderer must provide.
    ///
    /// Two reserved slots plus the material-group high-water mark. Removing
    /// a group does not shrink this; [`clear`](Self::clear) resets it.
    pub fn material_slot_count(&self) -> u32 {
        self.material_groups.max_index() + RESERVED_MATERIAL_SLOTS
    }

    /// Returns the group index currently mapped to `material`.
    pub fn material_index(&self, material: MaterialHandle) -> Option<u32> {
        self.material_indices.get(&material).copied()
    }

    /// Returns the material of a live group.
    pub fn group_material(&self, material_index: u32) -> Option<MaterialHandle> {
        self.material_groups.get(material_index).map(|g| g.material)
    }

    /// All lines in slot order.
    pub fn lines(&self) -> &SparseArray<Line> {
        &self.lines
    }

    /// All points in slot order.
    pub fn points(&self) -> &SparseArray<Point> {
        &self.points
    }

    /// All live material groups in material-index order.
    pub fn material_groups(&self) -> &SparseArray<MaterialGroup> {
        &self.material_groups
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the store holds no primitives at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.points.is_empty() && self.triangles.is_empty()
    }
}

fn invalid(kind: HandleKind, index: u32) -> OverlayError {
    OverlayError::InvalidHandle { kind, index }
}

fn in_use(kind: HandleKind, index: u32) -> OverlayError {
    OverlayError::HandleInUse { kind, index }
}
