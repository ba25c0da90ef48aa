//! Shader stages and programs.
//!
//! A [`Program`] is made of a vertex [`Stage`] and a fragment [`Stage`]. Stages are compiled
//! independently, then linked together; once linked, the stages are not needed anymore and can be
//! dropped, which deletes them on the GPU side.

use crate::gl33::state::GLState;
use crate::gl33::GL33;
use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::ffi::CString;
use std::fmt;
use std::ptr::{null, null_mut};
use std::rc::Rc;

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StageType {
  /// Vertex shader.
  VertexShader,
  /// Fragment shader.
  FragmentShader,
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageType::VertexShader => f.write_str("vertex shader"),
      StageType::FragmentShader => f.write_str("fragment shader"),
    }
  }
}

/// Errors that shader stages can emit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StageError {
  /// Occurs when a shader fails to compile.
  CompilationFailed(StageType, String),
  /// Occurs when the driver refuses to allocate a shader object.
  CreationFailed(StageType),
  /// The source contains an interior nul byte and cannot be passed to the driver.
  InvalidSource(StageType),
}

impl StageError {
  /// Create a compilation error.
  pub fn compilation_failed(ty: StageType, reason: impl Into<String>) -> Self {
    StageError::CompilationFailed(ty, reason.into())
  }
}

impl fmt::Display for StageError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageError::CompilationFailed(ref ty, ref r) => write!(f, "{} compilation error: {}", ty, r),
      StageError::CreationFailed(ty) => write!(f, "cannot create {}", ty),
      StageError::InvalidSource(ty) => write!(f, "{} source contains a nul byte", ty),
    }
  }
}

impl error::Error for StageError {}

/// Errors that a [`Program`] can generate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProgramError {
  /// A shader stage failed to compile or validate its state.
  StageError(StageError),
  /// Program link failed. You can inspect the reason by looking at the contained `String`.
  LinkFailed(String),
  /// The driver refused to allocate a program object.
  CreationFailed,
}

impl ProgramError {
  /// Create a link error.
  pub fn link_failed(reason: impl Into<String>) -> Self {
    ProgramError::LinkFailed(reason.into())
  }
}

impl fmt::Display for ProgramError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ProgramError::StageError(ref e) => write!(f, "shader program has stage error: {}", e),
      ProgramError::LinkFailed(ref s) => write!(f, "shader program failed to link: {}", s),
      ProgramError::CreationFailed => f.write_str("cannot create shader program"),
    }
  }
}

impl error::Error for ProgramError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      ProgramError::StageError(e) => Some(e),
      _ => None,
    }
  }
}

impl From<StageError> for ProgramError {
  fn from(e: StageError) -> Self {
    ProgramError::StageError(e)
  }
}

/// A compiled shader stage.
#[derive(Debug)]
pub struct Stage {
  handle: GLuint,
}

impl Drop for Stage {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteShader(self.handle);
    }
  }
}

impl Stage {
  /// Compile a new shader stage.
  ///
  /// The GLSL pragma (`#version 330 core`) is prepended to `src`, which must not carry its own
  /// `#version` directive.
  pub fn new(_: &mut GL33, ty: StageType, src: &str) -> Result<Self, StageError> {
    let c_src = CString::new(glsl_pragma_src(src)).map_err(|_| StageError::InvalidSource(ty))?;

    unsafe {
      let handle = gl::CreateShader(opengl_shader_type(ty));

      if handle == 0 {
        return Err(StageError::CreationFailed(ty));
      }

      gl::ShaderSource(handle, 1, [c_src.as_ptr()].as_ptr(), null());
      gl::CompileShader(handle);

      let mut compiled: GLint = gl::FALSE.into();
      gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut compiled);

      if compiled == gl::TRUE.into() {
        log::debug!("compiled {}", ty);
        Ok(Stage { handle })
      } else {
        let mut log_len: GLint = 0;
        gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

        let mut log = vec![0u8; log_len.max(0) as usize];
        gl::GetShaderInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

        gl::DeleteShader(handle);

        Err(StageError::compilation_failed(ty, info_log_to_string(log)))
      }
    }
  }
}

/// A linked shader program.
#[derive(Debug)]
pub struct Program {
  pub(crate) handle: GLuint,
  pub(crate) state: Rc<RefCell<GLState>>,
}

impl Drop for Program {
  fn drop(&mut self) {
    let mut state = self.state.borrow_mut();

    if state.current_program() == self.handle {
      state.invalidate_shader_program();
    }

    unsafe {
      gl::DeleteProgram(self.handle);
    }
  }
}

impl Program {
  /// Link a vertex stage and a fragment stage together.
  pub fn from_stages(
    gl33: &mut GL33,
    vertex: &Stage,
    fragment: &Stage,
  ) -> Result<Self, ProgramError> {
    let handle = unsafe { gl::CreateProgram() };

    if handle == 0 {
      return Err(ProgramError::CreationFailed);
    }

    unsafe {
      gl::AttachShader(handle, vertex.handle);
      gl::AttachShader(handle, fragment.handle);
    }

    let program = Program {
      handle,
      state: gl33.state.clone(),
    };
    program.link()?;

    // the stages can now be freed whenever they drop
    unsafe {
      gl::DetachShader(handle, vertex.handle);
      gl::DetachShader(handle, fragment.handle);
    }

    Ok(program)
  }

  /// Compile a vertex and a fragment shader from sources and link them.
  ///
  /// The intermediary stages are deleted once the program is linked.
  pub fn from_strings(gl33: &mut GL33, vertex: &str, fragment: &str) -> Result<Self, ProgramError> {
    let vertex = Stage::new(gl33, StageType::VertexShader, vertex)?;
    let fragment = Stage::new(gl33, StageType::FragmentShader, fragment)?;

    Self::from_stages(gl33, &vertex, &fragment)
  }

  fn link(&self) -> Result<(), ProgramError> {
    let handle = self.handle;

    unsafe {
      gl::LinkProgram(handle);

      let mut linked: GLint = gl::FALSE.into();
      gl::GetProgramiv(handle, gl::LINK_STATUS, &mut linked);

      if linked == gl::TRUE.into() {
        Ok(())
      } else {
        let mut log_len: GLint = 0;
        gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

        let mut log = vec![0u8; log_len.max(0) as usize];
        gl::GetProgramInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

        Err(ProgramError::link_failed(info_log_to_string(log)))
      }
    }
  }

  pub(crate) unsafe fn use_program(&self) {
    self.state.borrow_mut().use_program(self.handle);
  }
}

fn opengl_shader_type(t: StageType) -> GLenum {
  match t {
    StageType::VertexShader => gl::VERTEX_SHADER,
    StageType::FragmentShader => gl::FRAGMENT_SHADER,
  }
}

const GLSL_PRAGMA: &str = "#version 330 core\n";

fn glsl_pragma_src(src: &str) -> String {
  let mut pragma = String::from(GLSL_PRAGMA);
  pragma.push_str(src);
  pragma
}

// Info logs are nul-terminated and might not be valid UTF-8 on some drivers.
fn info_log_to_string(mut log: Vec<u8>) -> String {
  if let Some(nul) = log.iter().position(|&b| b == 0) {
    log.truncate(nul);
  }

  String::from_utf8_lossy(&log).trim_end().to_owned()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::error::Error as _;

  #[test]
  fn pragma_is_prepended() {
    let src = glsl_pragma_src("void main() {}");

    assert!(src.starts_with("#version 330 core\n"));
    assert!(src.ends_with("void main() {}"));
  }

  #[test]
  fn info_log_is_cut_at_nul() {
    let log = b"0:3(1): error: syntax error\n\0garbage".to_vec();
    assert_eq!(info_log_to_string(log), "0:3(1): error: syntax error");
  }

  #[test]
  fn info_log_empty() {
    assert_eq!(info_log_to_string(Vec::new()), "");
    assert_eq!(info_log_to_string(vec![0]), "");
  }

  #[test]
  fn info_log_invalid_utf8_is_lossy() {
    let log = vec![b'o', b'k', 0xff, 0];
    assert_eq!(info_log_to_string(log), "ok\u{fffd}");
  }

  #[test]
  fn stage_error_display() {
    let e = StageError::compilation_failed(StageType::FragmentShader, "oops");
    assert_eq!(e.to_string(), "fragment shader compilation error: oops");
    assert_eq!(
      StageError::CreationFailed(StageType::VertexShader).to_string(),
      "cannot create vertex shader"
    );
  }

  #[test]
  fn program_error_wraps_stage_error() {
    let e: ProgramError = StageError::compilation_failed(StageType::VertexShader, "bad").into();

    assert_eq!(
      e.to_string(),
      "shader program has stage error: vertex shader compilation error: bad"
    );
    assert!(e.source().is_some());
    assert!(ProgramError::link_failed("nope").source().is_none());
  }

  #[test]
  fn shader_types() {
    assert_eq!(
      opengl_shader_type(StageType::VertexShader),
      gl::VERTEX_SHADER
    );
    assert_eq!(
      opengl_shader_type(StageType::FragmentShader),
      gl::FRAGMENT_SHADER
    );
  }
}
