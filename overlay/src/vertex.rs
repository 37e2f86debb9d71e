/// GPU vertex shared by every overlay batch.
///
/// `tangent_z` carries per-primitive extrusion data for the overlay shader:
/// the signed line direction for lines, the corner sign `(±1, ±1, 0)` for
/// points, and the surface normal for triangles. `uv[0]` holds the line
/// thickness or point size for lines and points.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayVertex {
    pub position: [f32; 3],
    pub tangent_x: [f32; 3],
    pub tangent_z: [f32; 3],
    pub uv: [f32; 2],
    pub color: [u8; 4],
}

/// Data format of one vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four unsigned bytes normalized to `[0, 1]`.
    Unorm8x4,
}

impl VertexAttributeFormat {
    /// Size in bytes.
    pub fn size(&self) -> u32 {
        match self {
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Unorm8x4 => 4,
        }
    }
}

/// Semantic meaning of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeSemantic {
    Position,
    Tangent,
    Normal,
    TexCoord0,
    Color,
}

/// One attribute within [`OverlayVertex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub semantic: VertexAttributeSemantic,
    pub format: VertexAttributeFormat,
    /// Byte offset from the start of the vertex.
    pub offset: u32,
}

impl OverlayVertex {
    /// Byte stride of one vertex.
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;

    /// Attribute layout for building a renderer-side vertex layout.
    pub const ATTRIBUTES: [VertexAttribute; 5] = [
        VertexAttribute {
            semantic: VertexAttributeSemantic::Position,
            format: VertexAttributeFormat::Float3,
            offset: 0,
        },
        VertexAttribute {
            semantic: VertexAttributeSemantic::Tangent,
            format: VertexAttributeFormat::Float3,
            offset: 12,
        },
        VertexAttribute {
            semantic: VertexAttributeSemantic::Normal,
            format: VertexAttributeFormat::Float3,
            offset: 24,
        },
        VertexAttribute {
            semantic: VertexAttributeSemantic::TexCoord0,
            format: VertexAttributeFormat::Float2,
            offset: 36,
        },
        VertexAttribute {
            semantic: VertexAttributeSemantic::Color,
            format: VertexAttributeFormat::Unorm8x4,
            offset: 44,
        },
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_matches_attributes() {
        assert_eq!(OverlayVertex::STRIDE, 48);
        let last = OverlayVertex::ATTRIBUTES[OverlayVertex::ATTRIBUTES.len() - 1];
        assert_eq!(last.offset + last.format.size(), OverlayVertex::STRIDE);
    }

    #[test]
    fn test_attribute_offsets_contiguous() {
        for pair in OverlayVertex::ATTRIBUTES.windows(2) {
            assert_eq!(pair[0].offset + pair[0].format.size(), pair[1].offset);
        }
    }
}
