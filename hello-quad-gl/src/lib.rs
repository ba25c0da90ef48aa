//! OpenGL backend.
//!
//! This crate exports an [OpenGL](https://www.khronos.org/opengl/) 3.3 core-profile backend for
//! hello-quad. It doesn’t create any window or context by itself: a windowing crate (such as
//! `hello-quad-glfw`) is expected to make a context current, load the GL symbols and then call
//! [`GL33::new`].
//!
//! The backend is intentionally tiny. It knows how to:
//!
//! - Compile and link a vertex / fragment shader pair into a [`Program`].
//! - Upload vertices and indices once into GPU buffers and gather them in a [`Tess`].
//! - Run a per-frame [`Pipeline`] that sets the viewport, clears the back buffer, picks the
//!   polygon rasterization mode and draws.

pub mod gl33;

pub use gl33::buffer::{Buffer, BufferTarget};
pub use gl33::pipeline::{Pipeline, PipelineState, PolygonMode, Viewport};
pub use gl33::shader::{Program, ProgramError, Stage, StageError, StageType};
pub use gl33::tess::{Mode, Tess, TessBuilder, TessError};
pub use gl33::vertex::{
  Vertex, VertexAttrib, VertexAttribDesc, VertexAttribDim, VertexAttribType, VertexBufferDesc,
  VertexDesc,
};
pub use gl33::{StateQueryError, GL33};
