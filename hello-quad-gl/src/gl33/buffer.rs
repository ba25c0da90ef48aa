//! OpenGL buffer implementation.

use crate::gl33::{
  state::{Bind, GLState},
  GL33,
};
use gl::types::*;
use std::{cell::RefCell, marker::PhantomData, mem, rc::Rc};

/// Binding point a buffer is uploaded to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BufferTarget {
  /// Vertex attributes (`GL_ARRAY_BUFFER`).
  Array,
  /// Vertex indices (`GL_ELEMENT_ARRAY_BUFFER`).
  ElementArray,
}

impl BufferTarget {
  pub(crate) fn to_glenum(self) -> GLenum {
    match self {
      BufferTarget::Array => gl::ARRAY_BUFFER,
      BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
    }
  }
}

/// OpenGL buffer.
///
/// The data is uploaded once with `GL_STATIC_DRAW` and never read back.
#[derive(Debug)]
pub struct Buffer<T> {
  handle: GLuint,
  len: usize,
  state: Rc<RefCell<GLState>>,
  _t: PhantomData<T>,
}

impl<T> Drop for Buffer<T> {
  fn drop(&mut self) {
    unsafe {
      self.state.borrow_mut().unbind_buffer(self.handle);
      gl::DeleteBuffers(1, &self.handle);
    }
  }
}

impl<T> Buffer<T>
where
  T: Copy,
{
  /// Create a buffer and upload `values` into it.
  ///
  /// Uploading to [`BufferTarget::ElementArray`] attaches the buffer to the currently bound vertex
  /// array.
  pub fn from_slice(gl33: &mut GL33, target: BufferTarget, values: &[T]) -> Self {
    let mut handle: GLuint = 0;

    unsafe {
      gl::GenBuffers(1, &mut handle);

      {
        let mut state = gl33.state.borrow_mut();

        match target {
          BufferTarget::Array => state.bind_array_buffer(handle, Bind::Forced),
          BufferTarget::ElementArray => state.bind_element_array_buffer(handle, Bind::Forced),
        }
      }

      gl::BufferData(
        target.to_glenum(),
        byte_len::<T>(values.len()) as GLsizeiptr,
        values.as_ptr() as _,
        gl::STATIC_DRAW,
      );
    }

    Buffer {
      handle,
      len: values.len(),
      state: gl33.state.clone(),
      _t: PhantomData,
    }
  }
}

impl<T> Buffer<T> {
  /// Length of the buffer (number of elements).
  #[inline]
  pub(crate) fn len(&self) -> usize {
    self.len
  }
}

/// Size in bytes of `len` elements of type `T`.
#[inline]
pub(crate) fn byte_len<T>(len: usize) -> usize {
  mem::size_of::<T>() * len
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn byte_len_of_vertex_and_index_arrays() {
    assert_eq!(byte_len::<[f32; 3]>(4), 48);
    assert_eq!(byte_len::<u32>(6), 24);
    assert_eq!(byte_len::<u8>(0), 0);
  }

  #[test]
  fn targets() {
    assert_eq!(BufferTarget::Array.to_glenum(), gl::ARRAY_BUFFER);
    assert_eq!(
      BufferTarget::ElementArray.to_glenum(),
      gl::ELEMENT_ARRAY_BUFFER
    );
  }
}
