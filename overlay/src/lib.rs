//! Overlay geometry batching for RedLilium Engine.
//!
//! Collects debug and editor overlay primitives (lines, points and
//! material-tagged triangles), keeps them addressable by stable IDs, and
//! turns them into GPU-ready vertex/index buffers with one draw batch per
//! material.
//!
//! # Architecture
//!
//! - [`PrimitiveStore`]: sparse storage with stable IDs and per-material triangle groups
//! - [`OverlayComponent`]: host-facing API that notifies an [`OverlayListener`]
//! - [`BatchBuilder`]: expands primitives into [`OverlayRenderData`]
//! - [`RenderDataHandoff`]: passes built render data to a render thread
//! - [`OverlayEditHistory`]: undo/redo over [`OverlayEdit`]s
//!
//! Batches are always emitted in the same order: lines (material slot 0),
//! points (slot 1), then one batch per triangle material group in ascending
//! group order (slot `group + 2`).
//!
//! # Usage
//!
//! ```
//! use redlilium_overlay::math::Vec3;
//! use redlilium_overlay::{
//!     Color, Line, MaterialHandle, OverlayComponent, OverlayDescriptor, Point, Triangle,
//! };
//!
//! let mut overlay = OverlayComponent::new(
//!     OverlayDescriptor::new(MaterialHandle(1), MaterialHandle(2)).with_label("gizmos"),
//! );
//!
//! let line = overlay.add_line(Line::new(Vec3::zeros(), Vec3::x(), Color::RED, 2.0));
//! overlay.add_point(Point::new(Vec3::y(), Color::GREEN, 4.0));
//! overlay.add_triangle(Triangle::flat(
//!     MaterialHandle(10),
//!     [Vec3::zeros(), Vec3::x(), Vec3::y()],
//!     Color::WHITE,
//! ));
//!
//! let data = overlay.render_data();
//! assert_eq!(data.batches().len(), 3);
//! assert_eq!(data.vertex_count(), 4 + 4 + 3);
//!
//! overlay.remove_line(line).unwrap();
//! assert!(!overlay.is_line_valid(line));
//! ```

mod batch;
mod bounds;
mod component;
mod draw_api;
mod edit;
mod error;
mod handoff;
mod listener;
pub mod math;
mod primitives;
mod sparse_array;
mod store;
mod vertex;

pub use batch::{BatchBuilder, DrawBatch, OverlayRenderData};
pub use bounds::{Aabb, BoundsCache, compute_bounds};
pub use component::{OverlayComponent, OverlayDescriptor};
pub use edit::{DEFAULT_MAX_UNDO, EditTarget, OverlayEdit, OverlayEditHistory};
pub use error::{HandleKind, OverlayError, Result};
pub use handoff::RenderDataHandoff;
pub use listener::{MaterialBindingTable, NoopListener, OverlayListener};
pub use primitives::{
    Color, Line, LineId, MaterialHandle, Point, PointId, Triangle, TriangleId, TriangleVertex,
};
pub use sparse_array::SparseArray;
pub use store::{
    AddedTriangle, LINE_MATERIAL_SLOT, MaterialGroup, MaterialGroupEntry, POINT_MATERIAL_SLOT,
    PrimitiveStore, RESERVED_MATERIAL_SLOTS, RemovedTriangle, material_slot_for_group,
};
pub use vertex::{OverlayVertex, VertexAttribute, VertexAttributeFormat, VertexAttributeSemantic};
