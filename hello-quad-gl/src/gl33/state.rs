//! Graphics state.

use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::fmt;
use std::marker::PhantomData;

use crate::gl33::pipeline::PolygonMode;

// TLS synchronization barrier for `GLState`.
thread_local!(static TLS_ACQUIRE_GFX_STATE: RefCell<Option<()>> = RefCell::new(Some(())));

/// Cached value.
///
/// A cached value is used to prevent issuing costy GPU commands if we know the target value is
/// already set to what the command tries to set. For instance, if you ask for a clear color once,
/// that value will be set on the GPU and cached on our side. Later, if no other clear color setting
/// has occurred, asking for the same color again is a no-op GPU-wise.
///
/// Note: do not confuse [`Cached`] with [`Bind`]. The latter is for internal use only and
/// is used to either use the regular cache mechanism or override it to force a value to be
/// written. It cannot be used to invalidate a setting for later use.
#[derive(Debug)]
struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  /// Cache a value.
  fn new(initial: T) -> Self {
    Cached(Some(initial))
  }

  /// Explicitly invalidate a value.
  ///
  /// This is necessary when we want to be able to force a GPU command to run.
  fn invalidate(&mut self) {
    self.0 = None;
  }

  fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  /// Check if the cached value is invalid regarding a value.
  ///
  /// A non-cached value (i.e. empty) is always invalid whatever compared value. If a value is
  /// already cached, then it’s invalid if it’s not equal ([`PartialEq`]) to the input value.
  fn is_invalid(&self, new_val: &T) -> bool {
    match &self.0 {
      Some(ref t) => t != new_val,
      _ => true,
    }
  }
}

/// The graphics state.
///
/// This type represents the current state of a given graphics context. It acts
/// as a forward-gate to all the exposed features from the low-level API but
/// adds a small cache layer over it to prevent from issuing the same API call (with
/// the same parameters).
#[derive(Debug)]
pub struct GLState {
  _a: PhantomData<*const ()>, // !Send and !Sync

  // viewport
  viewport: Cached<[GLint; 4]>,

  // clear buffers
  clear_color: Cached<[GLfloat; 4]>,

  // rasterization
  polygon_mode: Cached<PolygonMode>,

  // array buffer
  bound_array_buffer: GLuint,

  // element buffer; unknown after a vertex array switch
  bound_element_array_buffer: Cached<GLuint>,

  // vertex array
  bound_vertex_array: GLuint,

  // shader program
  current_program: GLuint,
}

impl GLState {
  /// Create a new `GLState`.
  ///
  /// > Note: keep in mind you can create only one per thread.
  pub(crate) fn new() -> Result<Self, StateQueryError> {
    acquire_tls_token()?;
    unsafe { Self::get_from_context() }
  }

  /// Get a `GLState` from the current OpenGL context.
  unsafe fn get_from_context() -> Result<Self, StateQueryError> {
    let viewport = Cached::new(get_ctx_viewport()?);
    let clear_color = Cached::new(get_ctx_clear_color()?);
    // GL_FILL is the initial value of every fresh context
    let polygon_mode = Cached::new(PolygonMode::Fill);
    let bound_array_buffer = get_ctx_binding(gl::ARRAY_BUFFER_BINDING)?;
    let bound_element_array_buffer =
      Cached::new(get_ctx_binding(gl::ELEMENT_ARRAY_BUFFER_BINDING)?);
    let bound_vertex_array = get_ctx_binding(gl::VERTEX_ARRAY_BINDING)?;
    let current_program = get_ctx_binding(gl::CURRENT_PROGRAM)?;

    Ok(GLState {
      _a: PhantomData,
      viewport,
      clear_color,
      polygon_mode,
      bound_array_buffer,
      bound_element_array_buffer,
      bound_vertex_array,
      current_program,
    })
  }

  /// Invalidate the currently in-use shader program.
  pub fn invalidate_shader_program(&mut self) {
    self.current_program = 0;
  }

  pub(crate) unsafe fn set_viewport(&mut self, viewport: [GLint; 4]) {
    if self.viewport.is_invalid(&viewport) {
      gl::Viewport(viewport[0], viewport[1], viewport[2], viewport[3]);
      self.viewport.set(viewport);
    }
  }

  pub(crate) unsafe fn set_clear_color(&mut self, clear_color: [GLfloat; 4]) {
    if self.clear_color.is_invalid(&clear_color) {
      gl::ClearColor(
        clear_color[0],
        clear_color[1],
        clear_color[2],
        clear_color[3],
      );
      self.clear_color.set(clear_color);
    }
  }

  pub(crate) unsafe fn set_polygon_mode(&mut self, mode: PolygonMode) {
    if self.polygon_mode.is_invalid(&mode) {
      // core profile only accepts GL_FRONT_AND_BACK
      gl::PolygonMode(gl::FRONT_AND_BACK, mode.to_glenum());
      self.polygon_mode.set(mode);
    }
  }

  pub(crate) unsafe fn bind_array_buffer(&mut self, handle: GLuint, bind: Bind) {
    if bind.should_bind(self.bound_array_buffer, handle) {
      gl::BindBuffer(gl::ARRAY_BUFFER, handle);
      self.bound_array_buffer = handle;
    }
  }

  pub(crate) unsafe fn bind_element_array_buffer(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_element_array_buffer.is_invalid(&handle) {
      gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, handle);
      self.bound_element_array_buffer.set(handle);
    }
  }

  pub(crate) unsafe fn unbind_buffer(&mut self, handle: GLuint) {
    if self.bound_array_buffer == handle {
      self.bind_array_buffer(0, Bind::Cached);
    } else if !self.bound_element_array_buffer.is_invalid(&handle) {
      // the element binding belongs to the bound vertex array; deleting the buffer detaches it
      self.bound_element_array_buffer.set(0);
    }
  }

  pub(crate) unsafe fn bind_vertex_array(&mut self, handle: GLuint, bind: Bind) {
    if bind.should_bind(self.bound_vertex_array, handle) {
      gl::BindVertexArray(handle);
      self.vertex_array_bound(handle);
    }
  }

  fn vertex_array_bound(&mut self, handle: GLuint) {
    self.bound_vertex_array = handle;
    // each vertex array carries its own element array binding, which we don’t track
    self.bound_element_array_buffer.invalidate();
  }

  pub(crate) unsafe fn unbind_vertex_array(&mut self) {
    self.bind_vertex_array(0, Bind::Cached)
  }

  pub(crate) unsafe fn use_program(&mut self, handle: GLuint) {
    if self.current_program != handle {
      gl::UseProgram(handle);
      self.current_program = handle;
    }
  }

  pub(crate) fn current_program(&self) -> GLuint {
    self.current_program
  }
}

/// Should the binding be cached or forced to the provided value?
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Bind {
  Forced,
  Cached,
}

impl Bind {
  fn should_bind(self, current: GLuint, wanted: GLuint) -> bool {
    self == Bind::Forced || current != wanted
  }
}

fn acquire_tls_token() -> Result<(), StateQueryError> {
  TLS_ACQUIRE_GFX_STATE.with(|rc| {
    let mut inner = rc.borrow_mut();

    match inner.take() {
      Some(_) => Ok(()),
      None => Err(StateQueryError::UnavailableGLState),
    }
  })
}

/// An error that might happen when the context is queried.
#[non_exhaustive]
#[derive(Debug)]
pub enum StateQueryError {
  /// The graphics state is unavailable.
  ///
  /// That might occur if the current thread doesn’t support allocating a new graphics state. It
  /// might happen if you try to have more than one state on the same thread, for instance.
  UnavailableGLState,
  /// A binding query returned a negative object name.
  InvalidBinding(GLenum, GLint),
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StateQueryError::UnavailableGLState => write!(f, "unavailable graphics state"),
      StateQueryError::InvalidBinding(ref target, ref handle) => {
        write!(f, "invalid binding {} for target {:#x}", handle, target)
      }
    }
  }
}

impl error::Error for StateQueryError {}

unsafe fn get_ctx_viewport() -> Result<[GLint; 4], StateQueryError> {
  let mut data = [0; 4];
  gl::GetIntegerv(gl::VIEWPORT, data.as_mut_ptr());
  Ok(data)
}

unsafe fn get_ctx_clear_color() -> Result<[GLfloat; 4], StateQueryError> {
  let mut data = [0.; 4];
  gl::GetFloatv(gl::COLOR_CLEAR_VALUE, data.as_mut_ptr());
  Ok(data)
}

unsafe fn get_ctx_binding(target: GLenum) -> Result<GLuint, StateQueryError> {
  let mut handle = 0;
  gl::GetIntegerv(target, &mut handle);

  if handle < 0 {
    Err(StateQueryError::InvalidBinding(target, handle))
  } else {
    Ok(handle as GLuint)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn detached_state() -> GLState {
    GLState {
      _a: PhantomData,
      viewport: Cached::new([0, 0, 800, 600]),
      clear_color: Cached::new([0., 0., 0., 0.]),
      polygon_mode: Cached::new(PolygonMode::Fill),
      bound_array_buffer: 0,
      bound_element_array_buffer: Cached::new(0),
      bound_vertex_array: 0,
      current_program: 0,
    }
  }

  #[test]
  fn element_binding_is_unknown_after_vertex_array_switch() {
    let mut state = detached_state();
    assert!(!state.bound_element_array_buffer.is_invalid(&0));

    state.vertex_array_bound(4);

    assert_eq!(state.bound_vertex_array, 4);
    assert!(state.bound_element_array_buffer.is_invalid(&0));
    assert!(state.bound_element_array_buffer.is_invalid(&5));
  }

  #[test]
  fn deleting_the_current_program_resets_the_cache() {
    let mut state = detached_state();
    state.current_program = 3;

    state.invalidate_shader_program();
    assert_eq!(state.current_program(), 0);
  }

  #[test]
  fn cached_starts_valid_for_its_initial_value() {
    let cached = Cached::new([0.2, 0.3, 0.3, 1.]);

    assert!(!cached.is_invalid(&[0.2, 0.3, 0.3, 1.]));
    assert!(cached.is_invalid(&[0., 0., 0., 1.]));
  }

  #[test]
  fn cached_invalidate_forces_next_set() {
    let mut cached = Cached::new(PolygonMode::Fill);
    cached.invalidate();

    assert!(cached.is_invalid(&PolygonMode::Fill));
    assert!(cached.is_invalid(&PolygonMode::Line));

    cached.set(PolygonMode::Line);
    assert!(!cached.is_invalid(&PolygonMode::Line));
  }

  #[test]
  fn cached_bind_skips_same_handle() {
    assert!(!Bind::Cached.should_bind(3, 3));
    assert!(Bind::Cached.should_bind(3, 4));
  }

  #[test]
  fn forced_bind_always_binds() {
    assert!(Bind::Forced.should_bind(3, 3));
    assert!(Bind::Forced.should_bind(0, 7));
  }

  #[test]
  fn tls_token_is_acquired_once_per_thread() {
    std::thread::spawn(|| {
      assert!(acquire_tls_token().is_ok());
      assert!(matches!(
        acquire_tls_token(),
        Err(StateQueryError::UnavailableGLState)
      ));
    })
    .join()
    .unwrap();
  }

  #[test]
  fn state_query_error_display() {
    assert_eq!(
      StateQueryError::UnavailableGLState.to_string(),
      "unavailable graphics state"
    );
    assert_eq!(
      StateQueryError::InvalidBinding(0x8894, -1).to_string(),
      "invalid binding -1 for target 0x8894"
    );
  }
}
