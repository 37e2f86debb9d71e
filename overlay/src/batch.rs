//! Conversion of a [`PrimitiveStore`] into flat GPU buffers.
//!
//! One build walks the store once and produces a single vertex buffer, a
//! single `u32` index buffer, and one [`DrawBatch`] per material:
//!
//! 1. lines, drawn with the line material (slot 0)
//! 2. points, drawn with the point material (slot 1)
//! 3. one batch per material group, ascending by material index (slot `n + 2`)
//!
//! Lines and points become zero-area quads (4 vertices, 6 indices) that the
//! overlay shader extrudes towards the camera using the `tangent_z` channel.
//! Triangles are copied verbatim (3 vertices, 3 indices).

use std::ops::Range;

use crate::math::{Vec3, safe_normalize, to_array3};
use crate::primitives::{Line, MaterialHandle, Point, TriangleVertex};
use crate::store::{
    LINE_MATERIAL_SLOT, POINT_MATERIAL_SLOT, PrimitiveStore, material_slot_for_group,
};
use crate::vertex::OverlayVertex;

/// Vertices emitted per line or point quad.
pub const QUAD_VERTICES: u32 = 4;
/// Indices emitted per line or point quad.
pub const QUAD_INDICES: u32 = 6;
/// Vertices and indices emitted per triangle.
pub const TRIANGLE_VERTICES: u32 = 3;

/// Local index pattern of a quad: triangles `(0, 1, 2)` and `(2, 3, 0)`.
const QUAD_INDEX_PATTERN: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Screen-space corner signs for the four vertices of a point quad.
const POINT_CORNERS: [[f32; 3]; 4] = [
    [1.0, -1.0, 0.0],
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [-1.0, -1.0, 0.0],
];

/// One draw call: a contiguous index range drawn with one material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawBatch {
    pub material: MaterialHandle,
    /// External material slot (0 = lines, 1 = points, `n + 2` = group `n`).
    pub material_slot: u32,
    /// Range into [`OverlayRenderData::indices`].
    pub index_range: Range<u32>,
    /// Range of vertices referenced by this batch.
    pub vertex_range: Range<u32>,
    /// Number of GPU triangles (two per line or point, one per triangle).
    pub primitive_count: u32,
}

impl DrawBatch {
    /// Number of indices in the batch.
    pub fn index_count(&self) -> u32 {
        self.index_range.end - self.index_range.start
    }

    /// Number of vertices in the batch.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_range.end - self.vertex_range.start
    }
}

/// Immutable output of one batch build.
///
/// Once built, render data is never modified; share it across threads
/// behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayRenderData {
    vertices: Vec<OverlayVertex>,
    indices: Vec<u32>,
    batches: Vec<DrawBatch>,
}

impl OverlayRenderData {
    /// All vertices of all batches.
    pub fn vertices(&self) -> &[OverlayVertex] {
        &self.vertices
    }

    /// All indices of all batches. Indices are absolute into [`vertices`](Self::vertices).
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Draw batches in submission order.
    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    /// The vertex buffer as raw bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// The index buffer as raw bytes for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

/// Builds [`OverlayRenderData`] from a store snapshot.
///
/// Borrows the store for the duration of the build. Building never fails:
/// the store only contains validated primitives.
pub struct BatchBuilder<'a> {
    store: &'a PrimitiveStore,
    line_material: MaterialHandle,
    point_material: MaterialHandle,
}

impl<'a> BatchBuilder<'a> {
    pub fn new(
        store: &'a PrimitiveStore,
        line_material: MaterialHandle,
        point_material: MaterialHandle,
    ) -> Self {
        Self {
            store,
            line_material,
            point_material,
        }
    }

    /// Total `(vertex_count, index_count)` the build will emit.
    pub fn buffer_sizes(&self) -> (usize, usize) {
        let quads = self.store.line_count() + self.store.point_count();
        let triangles = self.store.triangle_count();
        let tv = TRIANGLE_VERTICES as usize;
        (
            quads * QUAD_VERTICES as usize + triangles * tv,
            quads * QUAD_INDICES as usize + triangles * tv,
        )
    }

    /// Runs the build.
    pub fn build(&self) -> OverlayRenderData {
        let (vertex_count, index_count) = self.buffer_sizes();
        let mut out = OverlayRenderData {
            vertices: Vec::with_capacity(vertex_count),
            indices: Vec::with_capacity(index_count),
            batches: Vec::with_capacity(2 + self.store.material_groups().len()),
        };

        let lines = self.store.lines();
        if !lines.is_empty() {
            let batch = BatchWriter::begin(&out);
            for line in lines.values() {
                emit_line(&mut out, line);
            }
            batch.finish(&mut out, self.line_material, LINE_MATERIAL_SLOT);
        }

        let points = self.store.points();
        if !points.is_empty() {
            let batch = BatchWriter::begin(&out);
            for point in points.values() {
                emit_point(&mut out, point);
            }
            batch.finish(&mut out, self.point_material, POINT_MATERIAL_SLOT);
        }

        for (material_index, group) in self.store.material_groups().iter() {
            if group.is_empty() {
                continue;
            }
            let batch = BatchWriter::begin(&out);
            for triangle in group.triangles().values() {
                for vertex in &triangle.vertices {
                    emit_triangle_vertex(&mut out, vertex);
                }
            }
            batch.finish(
                &mut out,
                group.material(),
                material_slot_for_group(material_index),
            );
        }

        debug_assert_eq!(out.vertices.len(), vertex_count);
        debug_assert_eq!(out.indices.len(), index_count);
        log::trace!(
            "Built overlay render data: {} vertices, {} indices, {} batches",
            out.vertices.len(),
            out.indices.len(),
            out.batches.len()
        );
        out
    }
}

/// Records buffer positions at the start of a batch.
struct BatchWriter {
    first_index: u32,
    first_vertex: u32,
}

impl BatchWriter {
    fn begin(out: &OverlayRenderData) -> Self {
        Self {
            first_index: out.indices.len() as u32,
            first_vertex: out.vertices.len() as u32,
        }
    }

    fn finish(self, out: &mut OverlayRenderData, material: MaterialHandle, material_slot: u32) {
        let index_end = out.indices.len() as u32;
        let vertex_end = out.vertices.len() as u32;
        out.batches.push(DrawBatch {
            material,
            material_slot,
            index_range: self.first_index..index_end,
            vertex_range: self.first_vertex..vertex_end,
            primitive_count: (index_end - self.first_index) / 3,
        });
    }
}

fn overlay_vertex(
    position: &Vec3,
    tangent_z: [f32; 3],
    uv: [f32; 2],
    color: [u8; 4],
) -> OverlayVertex {
    OverlayVertex {
        position: to_array3(position),
        tangent_x: [0.0; 3],
        tangent_z,
        uv,
        color,
    }
}

fn push_quad_indices(out: &mut OverlayRenderData, base: u32) {
    out.indices.extend(QUAD_INDEX_PATTERN.iter().map(|i| base + i));
}

fn emit_line(out: &mut OverlayRenderData, line: &Line) {
    let base = out.vertices.len() as u32;
    let direction = safe_normalize(&(line.end - line.start));
    let forward = to_array3(&direction);
    let backward = to_array3(&-direction);
    let uv = [line.thickness, 0.0];
    let color = line.color.to_array();

    out.vertices.extend_from_slice(&[
        overlay_vertex(&line.start, backward, uv, color),
        overlay_vertex(&line.end, backward, uv, color),
        overlay_vertex(&line.end, forward, uv, color),
        overlay_vertex(&line.start, forward, uv, color),
    ]);
    push_quad_indices(out, base);
}

fn emit_point(out: &mut OverlayRenderData, point: &Point) {
    let base = out.vertices.len() as u32;
    let uv = [point.size, 0.0];
    let color = point.color.to_array();

    out.vertices.extend(
        POINT_CORNERS
            .iter()
            .map(|&corner| overlay_vertex(&point.position, corner, uv, color)),
    );
    push_quad_indices(out, base);
}

fn emit_triangle_vertex(out: &mut OverlayRenderData, vertex: &TriangleVertex) {
    let index = out.vertices.len() as u32;
    out.vertices.push(overlay_vertex(
        &vertex.position,
        to_array3(&vertex.normal),
        [vertex.uv.x, vertex.uv.y],
        vertex.color.to_array(),
    ));
    out.indices.push(index);
}
