//! Tessellations.
//!
//! A [`Tess`] gathers a vertex array object, the vertex buffer it reads attributes from, an
//! optional index buffer and the primitive mode used to connect vertices. It’s built once with a
//! [`TessBuilder`] and rendered as many times as needed.

use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::fmt;
use std::os::raw::c_void;
use std::ptr;
use std::rc::Rc;

use crate::gl33::buffer::{Buffer, BufferTarget};
use crate::gl33::state::{Bind, GLState};
use crate::gl33::vertex::{
  aligned_offsets, opengl_sized_type, vertex_stride, Vertex, VertexAttribDesc, VertexAttribType,
  VertexBufferDesc,
};
use crate::gl33::GL33;

/// Vertices connection mode.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
  /// A single point.
  Point,
  /// A line, defined by two points.
  Line,
  /// A strip line, defined by at least two points and zero or many other ones.
  LineStrip,
  /// A triangle, defined by three points.
  Triangle,
  /// A triangle fan, defined by at least three points and zero or many other ones.
  TriangleFan,
  /// A triangle strip, defined by at least three points and zero or many other ones.
  TriangleStrip,
}

impl Mode {
  fn to_glenum(self) -> GLenum {
    match self {
      Mode::Point => gl::POINTS,
      Mode::Line => gl::LINES,
      Mode::LineStrip => gl::LINE_STRIP,
      Mode::Triangle => gl::TRIANGLES,
      Mode::TriangleFan => gl::TRIANGLE_FAN,
      Mode::TriangleStrip => gl::TRIANGLE_STRIP,
    }
  }
}

/// Possible errors that might occur when building a [`Tess`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TessError {
  /// No vertex was provided.
  NoVertices,
  /// An index refers to a vertex that doesn’t exist.
  IndexOutOfBounds {
    /// Position of the faulty index in the index list.
    position: usize,
    /// Value of the faulty index.
    index: u32,
    /// Number of vertices available.
    vert_nb: usize,
  },
  /// More vertices were requested for rendering than available. The first number is the
  /// available count, the second one the requested count.
  Overflow(usize, usize),
  /// A vertex attribute cannot be expressed with OpenGL types.
  UnsupportedVertexFormat(VertexBufferDesc),
}

impl fmt::Display for TessError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      TessError::NoVertices => f.write_str("tessellation has no vertex"),
      TessError::IndexOutOfBounds {
        position,
        index,
        vert_nb,
      } => write!(
        f,
        "index {} at position {} is out of bounds ({} vertices)",
        index, position, vert_nb
      ),
      TessError::Overflow(available, requested) => write!(
        f,
        "too many vertices to render: {} requested, {} available",
        requested, available
      ),
      TessError::UnsupportedVertexFormat(ref desc) => {
        write!(f, "unsupported vertex format for {}: {:?}", desc.name, desc.attrib_desc)
      }
    }
  }
}

impl error::Error for TessError {}

/// [`Tess`] builder.
pub struct TessBuilder<'a, V> {
  gl33: &'a mut GL33,
  vertices: Vec<V>,
  indices: Option<Vec<u32>>,
  mode: Mode,
  vert_nb: usize,
}

impl<'a, V> TessBuilder<'a, V>
where
  V: Vertex,
{
  /// Create a new builder, rendering points by default.
  pub fn new(gl33: &'a mut GL33) -> Self {
    TessBuilder {
      gl33,
      vertices: Vec::new(),
      indices: None,
      mode: Mode::Point,
      vert_nb: 0,
    }
  }

  /// Set the vertices.
  pub fn set_vertices(mut self, vertices: impl AsRef<[V]>) -> Self {
    self.vertices = vertices.as_ref().to_vec();
    self
  }

  /// Set the indices, switching to indexed rendering.
  pub fn set_indices(mut self, indices: impl AsRef<[u32]>) -> Self {
    self.indices = Some(indices.as_ref().to_vec());
    self
  }

  /// Set the primitive mode.
  pub fn set_mode(mut self, mode: Mode) -> Self {
    self.mode = mode;
    self
  }

  /// Set the number of vertices (or indices) to render.
  ///
  /// `0` (the default) renders everything.
  pub fn set_vertex_nb(mut self, nb: usize) -> Self {
    self.vert_nb = nb;
    self
  }

  /// Upload the data to the GPU and build the [`Tess`].
  pub fn build(self) -> Result<Tess<V>, TessError> {
    let vert_nb =
      guess_vert_nb_or_fail(self.vertices.len(), self.indices.as_deref(), self.vert_nb)?;
    let desc = V::vertex_desc();

    if let Some(desc) = desc
      .iter()
      .find(|d| opengl_sized_type(&d.attrib_desc).is_none())
    {
      return Err(TessError::UnsupportedVertexFormat(desc.clone()));
    }

    let TessBuilder {
      gl33,
      vertices,
      indices,
      mode,
      ..
    } = self;

    let mut vao: GLuint = 0;

    unsafe {
      gl::GenVertexArrays(1, &mut vao);

      // force binding the vertex array so that previously bound vertex arrays (possibly the same
      // handle) don’t prevent us from binding here
      gl33.state.borrow_mut().bind_vertex_array(vao, Bind::Forced);
    }

    let vertex_buffer = Buffer::from_slice(gl33, BufferTarget::Array, &vertices);
    set_vertex_pointers(&desc);

    // the element binding is recorded in the bound vao
    let index_buffer =
      indices.map(|indices| Buffer::from_slice(gl33, BufferTarget::ElementArray, &indices));

    log::debug!(
      "built tessellation: vao={}, {} vertices, {} indices, mode {:?}",
      vao,
      vertex_buffer.len(),
      index_buffer.as_ref().map_or(0, |b| b.len()),
      mode
    );

    Ok(Tess {
      mode,
      vert_nb,
      vao,
      _vertex_buffer: vertex_buffer,
      index_buffer,
      state: gl33.state.clone(),
    })
  }
}

/// Work out how many vertices (or indices) to render, or fail if the configuration is incoherent.
fn guess_vert_nb_or_fail(
  vertex_len: usize,
  indices: Option<&[u32]>,
  vert_nb: usize,
) -> Result<usize, TessError> {
  if vertex_len == 0 {
    return Err(TessError::NoVertices);
  }

  let available = match indices {
    Some(indices) => {
      if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|(_, i)| **i as usize >= vertex_len)
      {
        return Err(TessError::IndexOutOfBounds {
          position,
          index,
          vert_nb: vertex_len,
        });
      }

      indices.len()
    }

    None => vertex_len,
  };

  if vert_nb == 0 {
    Ok(available)
  } else if vert_nb > available {
    Err(TessError::Overflow(available, vert_nb))
  } else {
    Ok(vert_nb)
  }
}

/// GPU geometry: a vertex array with its vertex and index buffers.
#[derive(Debug)]
pub struct Tess<V> {
  mode: Mode,
  vert_nb: usize,
  vao: GLuint,
  // dropped after the vertex array, in declaration order
  _vertex_buffer: Buffer<V>,
  index_buffer: Option<Buffer<u32>>,
  state: Rc<RefCell<GLState>>,
}

impl<V> Drop for Tess<V> {
  fn drop(&mut self) {
    unsafe {
      self.state.borrow_mut().unbind_vertex_array();
      gl::DeleteVertexArrays(1, &self.vao);
    }
  }
}

impl<V> Tess<V> {
  /// Number of vertices (or indices, if indexed) rendered.
  pub fn vert_nb(&self) -> usize {
    self.vert_nb
  }

  pub(crate) unsafe fn render(&self) {
    let vert_nb = self.vert_nb as GLsizei;

    self
      .state
      .borrow_mut()
      .bind_vertex_array(self.vao, Bind::Cached);

    if self.index_buffer.is_some() {
      gl::DrawElements(
        self.mode.to_glenum(),
        vert_nb,
        gl::UNSIGNED_INT,
        ptr::null(),
      );
    } else {
      gl::DrawArrays(self.mode.to_glenum(), 0, vert_nb);
    }
  }
}

fn set_vertex_pointers(descriptors: &[VertexBufferDesc]) {
  // this function sets the vertex attribute pointer for the input list by computing:
  //   - The stride: this is easily computed, since it’s the size (bytes) of a single vertex.
  //   - The offsets: each attribute has a given offset in the buffer. This is computed by
  //     accumulating the size of all previously set attributes.
  let offsets = aligned_offsets(descriptors);
  let stride = vertex_stride(descriptors, &offsets) as GLsizei;

  for (desc, off) in descriptors.iter().zip(offsets) {
    set_component_format(stride, off, desc);
  }
}

fn set_component_format(stride: GLsizei, off: usize, desc: &VertexBufferDesc) {
  let attrib_desc: &VertexAttribDesc = &desc.attrib_desc;
  let index = desc.index as GLuint;
  let size = attrib_desc.dim.size();
  // formats were checked before the vao got created
  let ty = opengl_sized_type(attrib_desc).unwrap_or(gl::FLOAT);
  let pointer = ptr::null::<c_void>().wrapping_add(off);

  unsafe {
    match attrib_desc.ty {
      VertexAttribType::Floating => {
        gl::VertexAttribPointer(index, size, ty, gl::FALSE, stride, pointer);
      }

      VertexAttribType::Normalized => {
        gl::VertexAttribPointer(index, size, ty, gl::TRUE, stride, pointer);
      }

      VertexAttribType::Integral | VertexAttribType::Unsigned => {
        gl::VertexAttribIPointer(index, size, ty, stride, pointer);
      }
    }

    gl::EnableVertexAttribArray(index);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn no_vertices() {
    assert_eq!(
      guess_vert_nb_or_fail(0, None, 0),
      Err(TessError::NoVertices)
    );
    assert_eq!(
      guess_vert_nb_or_fail(0, Some(&[]), 0),
      Err(TessError::NoVertices)
    );
  }

  #[test]
  fn direct_render_uses_all_vertices() {
    assert_eq!(guess_vert_nb_or_fail(3, None, 0), Ok(3));
    assert_eq!(guess_vert_nb_or_fail(3, None, 2), Ok(2));
  }

  #[test]
  fn indexed_render_uses_all_indices() {
    assert_eq!(
      guess_vert_nb_or_fail(4, Some(&[0, 2, 3, 0, 1, 2]), 0),
      Ok(6)
    );
  }

  #[test]
  fn index_out_of_bounds() {
    assert_eq!(
      guess_vert_nb_or_fail(4, Some(&[0, 1, 4]), 0),
      Err(TessError::IndexOutOfBounds {
        position: 2,
        index: 4,
        vert_nb: 4
      })
    );
  }

  #[test]
  fn overflow() {
    assert_eq!(
      guess_vert_nb_or_fail(4, Some(&[0, 1, 2]), 6),
      Err(TessError::Overflow(3, 6))
    );
    assert_eq!(
      guess_vert_nb_or_fail(2, None, 3),
      Err(TessError::Overflow(2, 3))
    );
  }

  #[test]
  fn modes() {
    assert_eq!(Mode::Triangle.to_glenum(), gl::TRIANGLES);
    assert_eq!(Mode::Line.to_glenum(), gl::LINES);
    assert_eq!(Mode::TriangleStrip.to_glenum(), gl::TRIANGLE_STRIP);
  }

  #[test]
  fn error_display() {
    let e = TessError::IndexOutOfBounds {
      position: 5,
      index: 9,
      vert_nb: 4,
    };

    assert_eq!(
      e.to_string(),
      "index 9 at position 5 is out of bounds (4 vertices)"
    );
    assert_eq!(
      TessError::Overflow(3, 6).to_string(),
      "too many vertices to render: 6 requested, 3 available"
    );
  }
}
