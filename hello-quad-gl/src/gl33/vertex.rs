//! Vertex formats, associated types and functions.
//!
//! A vertex is a type representing a point. Each field of a vertex type is a vertex attribute
//! which is fed to the vertex shader at a given location. The description of that mapping is a
//! [`VertexDesc`], obtained through the [`Vertex`] trait.

use gl::types::*;
use std::mem;

/// A type that can be uploaded in a vertex buffer.
///
/// # Unsafety
///
/// The returned description must match the memory layout of the type (which should then be
/// `#[repr(C)]`); otherwise, the GPU will read garbage.
pub unsafe trait Vertex: Copy {
  /// Describe the attributes of this vertex type, in declaration order.
  fn vertex_desc() -> VertexDesc;
}

/// A [`VertexDesc`] is a list of [`VertexBufferDesc`]s.
pub type VertexDesc = Vec<VertexBufferDesc>;

/// A vertex attribute bound to a shader location.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct VertexBufferDesc {
  /// Location of the attribute in the vertex shader (`layout (location = index)`).
  pub index: usize,
  /// Name of the attribute, only used for diagnostics.
  pub name: &'static str,
  /// Format of the attribute.
  pub attrib_desc: VertexAttribDesc,
}

impl VertexBufferDesc {
  pub fn new<A>(index: usize, name: &'static str) -> Self
  where
    A: VertexAttrib,
  {
    VertexBufferDesc {
      index,
      name,
      attrib_desc: A::VERTEX_ATTRIB_DESC,
    }
  }
}

/// Vertex attribute format. It gives information on how vertices should be passed to the GPU and
/// optimized in buffers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct VertexAttribDesc {
  /// Type of the attribute. See [`VertexAttribType`] for further details.
  pub ty: VertexAttribType,
  /// Dimension of the attribute. It should be in 1–4. See [`VertexAttribDim`] for further details.
  pub dim: VertexAttribDim,
  /// Size in bytes that a single element of the attribute takes. That is, if your attribute has
  /// a dimension set to 2, then the unit size should be the size of a single element (not two).
  pub unit_size: usize,
  /// Alignment of the attribute.
  pub align: usize,
}

/// Possible type of vertex attributes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum VertexAttribType {
  /// Signed integers, passed as-is.
  Integral,
  /// Unsigned integers, passed as-is.
  Unsigned,
  /// Unsigned integers, normalized to `[0; 1]` floats.
  Normalized,
  /// Floating-point numbers.
  Floating,
}

/// Possible dimension of vertex attributes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum VertexAttribDim {
  Dim1,
  Dim2,
  Dim3,
  Dim4,
}

impl VertexAttribDim {
  /// Number of components.
  pub fn size(self) -> GLint {
    match self {
      VertexAttribDim::Dim1 => 1,
      VertexAttribDim::Dim2 => 2,
      VertexAttribDim::Dim3 => 3,
      VertexAttribDim::Dim4 => 4,
    }
  }
}

/// Class of vertex attributes.
pub unsafe trait VertexAttrib {
  const VERTEX_ATTRIB_DESC: VertexAttribDesc;
}

// Macro to quickly implement VertexAttrib for a given type.
macro_rules! impl_vertex_attribute {
  ($t:ty, $q:ty, $ty:ident, $dim:ident) => {
    unsafe impl VertexAttrib for $t {
      const VERTEX_ATTRIB_DESC: VertexAttribDesc = VertexAttribDesc {
        ty: VertexAttribType::$ty,
        dim: VertexAttribDim::$dim,
        unit_size: mem::size_of::<$q>(),
        align: mem::align_of::<$q>(),
      };
    }
  };

  ($t:ty, $ty:ident) => {
    impl_vertex_attribute!($t, $t, $ty, Dim1);
    impl_vertex_attribute!([$t; 1], $t, $ty, Dim1);
    impl_vertex_attribute!([$t; 2], $t, $ty, Dim2);
    impl_vertex_attribute!([$t; 3], $t, $ty, Dim3);
    impl_vertex_attribute!([$t; 4], $t, $ty, Dim4);
  };
}

impl_vertex_attribute!(i32, Integral);
impl_vertex_attribute!(u32, Unsigned);
impl_vertex_attribute!(u8, Normalized);
impl_vertex_attribute!(f32, Floating);

/// Compute offsets for all the vertex components according to the alignments provided.
pub(crate) fn aligned_offsets(descriptors: &[VertexBufferDesc]) -> Vec<usize> {
  let mut offsets = Vec::with_capacity(descriptors.len());
  let mut off = 0;

  for desc in descriptors {
    let desc = &desc.attrib_desc;
    off = off_align(off, desc.align); // keep the current component descriptor aligned
    offsets.push(off);
    off += component_weight(desc);
  }

  offsets
}

// Align an offset.
#[inline]
fn off_align(off: usize, align: usize) -> usize {
  let a = align - 1;
  (off + a) & !a
}

// Weight in bytes of a vertex component.
fn component_weight(f: &VertexAttribDesc) -> usize {
  f.dim.size() as usize * f.unit_size
}

/// Weight in bytes of a single vertex, taking into account padding so that the vertex stay
/// correctly aligned.
pub(crate) fn vertex_stride(descriptors: &[VertexBufferDesc], offsets: &[usize]) -> usize {
  match (descriptors.last(), offsets.last()) {
    (Some(last), Some(off)) => off_align(
      off + component_weight(&last.attrib_desc),
      descriptors[0].attrib_desc.align,
    ),
    _ => 0,
  }
}

pub(crate) fn opengl_sized_type(f: &VertexAttribDesc) -> Option<GLenum> {
  match (f.ty, f.unit_size) {
    (VertexAttribType::Integral, 4) => Some(gl::INT),
    (VertexAttribType::Unsigned, 4) => Some(gl::UNSIGNED_INT),
    (VertexAttribType::Normalized, 1) => Some(gl::UNSIGNED_BYTE),
    (VertexAttribType::Floating, 4) => Some(gl::FLOAT),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[repr(C)]
  #[derive(Clone, Copy)]
  struct Colored {
    pos: [f32; 2],
    rgb: [u8; 3],
  }

  unsafe impl Vertex for Colored {
    fn vertex_desc() -> VertexDesc {
      vec![
        VertexBufferDesc::new::<[f32; 2]>(0, "pos"),
        VertexBufferDesc::new::<[u8; 3]>(1, "rgb"),
      ]
    }
  }

  #[test]
  fn vec3_position_layout() {
    let desc = vec![VertexBufferDesc::new::<[f32; 3]>(0, "pos")];
    let offsets = aligned_offsets(&desc);

    assert_eq!(offsets, vec![0]);
    assert_eq!(vertex_stride(&desc, &offsets), 12);
    assert_eq!(desc[0].attrib_desc.dim.size(), 3);
  }

  #[test]
  fn interleaved_layout_matches_repr_c() {
    let desc = Colored::vertex_desc();
    let offsets = aligned_offsets(&desc);

    assert_eq!(offsets, vec![0, 8]);
    assert_eq!(vertex_stride(&desc, &offsets), mem::size_of::<Colored>());
  }

  #[test]
  fn empty_layout_has_no_stride() {
    assert_eq!(vertex_stride(&[], &[]), 0);
  }

  #[test]
  fn sized_types() {
    assert_eq!(
      opengl_sized_type(&<[f32; 3]>::VERTEX_ATTRIB_DESC),
      Some(gl::FLOAT)
    );
    assert_eq!(
      opengl_sized_type(&<u8>::VERTEX_ATTRIB_DESC),
      Some(gl::UNSIGNED_BYTE)
    );

    let odd = VertexAttribDesc {
      ty: VertexAttribType::Floating,
      dim: VertexAttribDim::Dim1,
      unit_size: 8,
      align: 8,
    };
    assert_eq!(opengl_sized_type(&odd), None);
  }
}
