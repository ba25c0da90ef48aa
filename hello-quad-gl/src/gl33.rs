//! OpenGL 3.3 backend.
//!
//! This module implements an OpenGL 3.3 backend. The backend type is [`GL33`].

pub mod buffer;
pub mod pipeline;
pub mod shader;
mod state;
pub mod tess;
pub mod vertex;

use self::state::GLState;
pub use self::state::StateQueryError;
use gl::types::*;
use std::cell::RefCell;
use std::ffi::CStr;
use std::rc::Rc;

/// An OpenGL 3.3 backend.
///
/// Every GPU resource created through this type shares the same cached graphics state.
#[derive(Debug)]
pub struct GL33 {
  pub(crate) state: Rc<RefCell<GLState>>,
}

impl GL33 {
  /// Create a new OpenGL 3.3 backend.
  ///
  /// A context must be current on the calling thread and the GL symbols must be loaded.
  pub fn new() -> Result<Self, StateQueryError> {
    GLState::new().map(|state| GL33 {
      state: Rc::new(RefCell::new(state)),
    })
  }

  /// OpenGL functions used by the backend that are not loaded.
  ///
  /// Call this after loading the GL symbols and before [`GL33::new`]: calling an unloaded
  /// function panics.
  pub fn missing_symbols() -> Vec<&'static str> {
    REQUIRED_SYMBOLS
      .iter()
      .filter(|(_, is_loaded)| !is_loaded())
      .map(|(name, _)| *name)
      .collect()
  }

  /// Vendor, renderer and version strings of the current context.
  pub fn info(&self) -> ContextInfo {
    unsafe {
      ContextInfo {
        vendor: get_string(gl::VENDOR),
        renderer: get_string(gl::RENDERER),
        version: get_string(gl::VERSION),
        glsl_version: get_string(gl::SHADING_LANGUAGE_VERSION),
      }
    }
  }
}

const REQUIRED_SYMBOLS: &[(&str, fn() -> bool)] = &[
  ("glGetIntegerv", gl::GetIntegerv::is_loaded),
  ("glGetFloatv", gl::GetFloatv::is_loaded),
  ("glGetString", gl::GetString::is_loaded),
  ("glViewport", gl::Viewport::is_loaded),
  ("glClearColor", gl::ClearColor::is_loaded),
  ("glClear", gl::Clear::is_loaded),
  ("glPolygonMode", gl::PolygonMode::is_loaded),
  ("glGenBuffers", gl::GenBuffers::is_loaded),
  ("glBindBuffer", gl::BindBuffer::is_loaded),
  ("glBufferData", gl::BufferData::is_loaded),
  ("glDeleteBuffers", gl::DeleteBuffers::is_loaded),
  ("glGenVertexArrays", gl::GenVertexArrays::is_loaded),
  ("glBindVertexArray", gl::BindVertexArray::is_loaded),
  ("glDeleteVertexArrays", gl::DeleteVertexArrays::is_loaded),
  ("glVertexAttribPointer", gl::VertexAttribPointer::is_loaded),
  ("glVertexAttribIPointer", gl::VertexAttribIPointer::is_loaded),
  ("glEnableVertexAttribArray", gl::EnableVertexAttribArray::is_loaded),
  ("glCreateShader", gl::CreateShader::is_loaded),
  ("glShaderSource", gl::ShaderSource::is_loaded),
  ("glCompileShader", gl::CompileShader::is_loaded),
  ("glGetShaderiv", gl::GetShaderiv::is_loaded),
  ("glGetShaderInfoLog", gl::GetShaderInfoLog::is_loaded),
  ("glDeleteShader", gl::DeleteShader::is_loaded),
  ("glCreateProgram", gl::CreateProgram::is_loaded),
  ("glAttachShader", gl::AttachShader::is_loaded),
  ("glDetachShader", gl::DetachShader::is_loaded),
  ("glLinkProgram", gl::LinkProgram::is_loaded),
  ("glGetProgramiv", gl::GetProgramiv::is_loaded),
  ("glGetProgramInfoLog", gl::GetProgramInfoLog::is_loaded),
  ("glUseProgram", gl::UseProgram::is_loaded),
  ("glDeleteProgram", gl::DeleteProgram::is_loaded),
  ("glDrawElements", gl::DrawElements::is_loaded),
  ("glDrawArrays", gl::DrawArrays::is_loaded),
];

/// Driver information.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContextInfo {
  pub vendor: String,
  pub renderer: String,
  pub version: String,
  pub glsl_version: String,
}

unsafe fn get_string(name: GLenum) -> String {
  let ptr = gl::GetString(name);

  if ptr.is_null() {
    String::from("<unknown>")
  } else {
    CStr::from_ptr(ptr as *const _).to_string_lossy().into_owned()
  }
}
