//! Overlay primitive types and their handles.

use crate::math::{Vec2, Vec3};

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Wraps a raw slot index.
            ///
            /// Used to restore a previously issued handle, e.g. when replaying
            /// an edit at its original ID.
            pub const fn from_index(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw slot index.
            pub const fn index(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

define_handle!(
    /// Handle to a line stored in an overlay.
    LineId,
    "LineId"
);
define_handle!(
    /// Handle to a point stored in an overlay.
    PointId,
    "PointId"
);
define_handle!(
    /// Handle to a triangle stored in an overlay.
    TriangleId,
    "TriangleId"
);

/// Opaque reference to a renderer-side material.
///
/// The overlay never interprets the value; it only groups triangles by it
/// and reports it back in draw batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(pub u64);

/// 8-bit RGBA color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Creates a color from all four channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Quantizes a `[0, 1]` float color, clamping out-of-range channels.
    pub fn from_f32(color: [f32; 4]) -> Self {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgba(q(color[0]), q(color[1]), q(color[2]), q(color[3]))
    }

    /// Returns the channels as `[r, g, b, a]`.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[u8; 4]> for Color {
    fn from(c: [u8; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }
}

/// A line segment, drawn as a camera-facing ribbon of the given thickness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Color,
    pub thickness: f32,
}

impl Line {
    pub fn new(start: Vec3, end: Vec3, color: Color, thickness: f32) -> Self {
        Self {
            start,
            end,
            color,
            thickness,
        }
    }
}

/// A point, drawn as a camera-facing square of the given size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: Vec3,
    pub color: Color,
    pub size: f32,
}

impl Point {
    pub fn new(position: Vec3, color: Color, size: f32) -> Self {
        Self {
            position,
            color,
            size,
        }
    }
}

/// One corner of an overlay triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleVertex {
    pub position: Vec3,
    pub uv: Vec2,
    pub normal: Vec3,
    pub color: Color,
}

impl TriangleVertex {
    pub fn new(position: Vec3, uv: Vec2, normal: Vec3, color: Color) -> Self {
        Self {
            position,
            uv,
            normal,
            color,
        }
    }

    /// A vertex with zero UV and the given normal and color.
    pub fn with_position(position: Vec3, normal: Vec3, color: Color) -> Self {
        Self::new(position, Vec2::zeros(), normal, color)
    }
}

/// A triangle drawn with its own material.
///
/// Triangles sharing a material are batched into one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub material: MaterialHandle,
    pub vertices: [TriangleVertex; 3],
}

impl Triangle {
    pub fn new(
        material: MaterialHandle,
        v0: TriangleVertex,
        v1: TriangleVertex,
        v2: TriangleVertex,
    ) -> Self {
        Self {
            material,
            vertices: [v0, v1, v2],
        }
    }

    /// Builds a flat-shaded triangle from three positions.
    ///
    /// The face normal follows counter-clockwise winding. Degenerate input
    /// produces a zero normal.
    pub fn flat(material: MaterialHandle, positions: [Vec3; 3], color: Color) -> Self {
        let edge_a = positions[1] - positions[0];
        let edge_b = positions[2] - positions[0];
        let normal = crate::math::safe_normalize(&edge_a.cross(&edge_b));
        let v = |p: Vec3, uv: Vec2| TriangleVertex::new(p, uv, normal, color);
        Self::new(
            material,
            v(positions[0], Vec2::new(0.0, 0.0)),
            v(positions[1], Vec2::new(1.0, 0.0)),
            v(positions[2], Vec2::new(0.0, 1.0)),
        )
    }

    /// Returns the three vertex positions.
    pub fn positions(&self) -> [Vec3; 3] {
        [
            self.vertices[0].position,
            self.vertices[1].position,
            self.vertices[2].position,
        ]
    }
}
