//! [GLFW](https://crates.io/crates/glfw) backend for hello-quad.
//!
//! [`GlfwSurface::new_gl33`] opens a window with an OpenGL 3.3 core-profile, forward-compatible
//! context, makes it current, loads the OpenGL symbols and hands you back the event receiver along
//! with a [`GL33Context`] to render with.

#![deny(missing_docs)]

use glfw::{self, Context as _, Glfw, InitError, Window, WindowEvent, WindowMode};
use hello_quad_gl::{StateQueryError, GL33};
pub use hello_quad_windowing::{CursorMode, WindowDim, WindowOpt};
use std::{convert::Infallible, error, fmt, os::raw::c_void, sync::mpsc::Receiver};

/// Error that can be risen while creating a surface.
#[non_exhaustive]
#[derive(Debug)]
pub enum GlfwSurfaceError<E> {
  /// Initialization of the surface went wrong.
  ///
  /// This variant exposes a **glfw** error for further information about what went wrong.
  InitError(InitError),

  /// Window creation failed.
  WindowCreationFailed,

  /// No primary monitor detected.
  NoPrimaryMonitor,

  /// No available video mode.
  NoVideoMode,

  /// The OpenGL loader couldn’t resolve some of the functions the backend needs.
  ///
  /// The names of the missing functions are carried.
  LoaderFailed(Vec<&'static str>),

  /// The graphics state is not available.
  ///
  /// This error is generated when the initialization code is called on a thread on which the
  /// graphics state has already been acquired.
  GraphicsStateError(StateQueryError),

  /// User error.
  UserError(E),
}

impl<E> fmt::Display for GlfwSurfaceError<E>
where
  E: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GlfwSurfaceError::InitError(ref e) => write!(f, "initialization error: {}", e),
      GlfwSurfaceError::WindowCreationFailed => f.write_str("failed to create window"),
      GlfwSurfaceError::NoPrimaryMonitor => f.write_str("no primary monitor"),
      GlfwSurfaceError::NoVideoMode => f.write_str("no video mode"),
      GlfwSurfaceError::LoaderFailed(ref missing) => {
        write!(f, "failed to load OpenGL functions: {}", missing.join(", "))
      }
      GlfwSurfaceError::GraphicsStateError(ref e) => {
        write!(f, "failed to get graphics state: {}", e)
      }
      GlfwSurfaceError::UserError(ref e) => write!(f, "user error: {}", e),
    }
  }
}

impl<E> From<InitError> for GlfwSurfaceError<E> {
  fn from(e: InitError) -> Self {
    GlfwSurfaceError::InitError(e)
  }
}

impl<E> error::Error for GlfwSurfaceError<E>
where
  E: 'static + error::Error,
{
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GlfwSurfaceError::InitError(e) => Some(e),
      GlfwSurfaceError::GraphicsStateError(e) => Some(e),
      GlfwSurfaceError::UserError(e) => Some(e),
      _ => None,
    }
  }
}

// surface errors with no user error
type SurfaceError = GlfwSurfaceError<Infallible>;

/// GLFW surface.
///
/// This type is a helper that exposes two important concepts: the GLFW event receiver that you can use it with to
/// poll events and the [`GL33Context`], which allows you to perform the rendering part.
#[derive(Debug)]
pub struct GlfwSurface {
  /// Wrapped GLFW events queue.
  pub events_rx: Receiver<(f64, WindowEvent)>,

  /// Wrapped OpenGL context.
  pub context: GL33Context,
}

impl GlfwSurface {
  /// Initialize GLFW to provide an OpenGL 3.3 environment.
  ///
  /// `create_window` is handed the initialized [`Glfw`] object, with the context hints already set,
  /// and must return the window along with its event receiver.
  pub fn new<E>(
    create_window: impl FnOnce(
      &mut Glfw,
    )
      -> Result<(Window, Receiver<(f64, WindowEvent)>), GlfwSurfaceError<E>>,
  ) -> Result<Self, GlfwSurfaceError<E>> {
    #[cfg(feature = "log-errors")]
    let error_cbk = glfw::LOG_ERRORS;
    #[cfg(not(feature = "log-errors"))]
    let error_cbk = glfw::FAIL_ON_ERRORS;

    let mut glfw = glfw::init(error_cbk)?;

    // OpenGL hints
    glfw.window_hint(glfw::WindowHint::OpenGlProfile(
      glfw::OpenGlProfileHint::Core,
    ));
    glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
    glfw.window_hint(glfw::WindowHint::ContextVersionMajor(3));
    glfw.window_hint(glfw::WindowHint::ContextVersionMinor(3));

    let (mut window, events_rx) = create_window(&mut glfw)?;

    window.make_current();

    // init OpenGL
    gl::load_with(|s| window.get_proc_address(s) as *const c_void);
    check_gl_symbols::<E>()?;

    let gl = GL33::new().map_err(GlfwSurfaceError::GraphicsStateError)?;

    let info = gl.info();
    log::info!(
      "OpenGL {} (GLSL {}) on {} by {}",
      info.version,
      info.glsl_version,
      info.renderer,
      info.vendor
    );

    let context = GL33Context { window, gl };
    let surface = GlfwSurface { events_rx, context };

    Ok(surface)
  }

  /// Initialize GLFW and open a window described by `win_opt`.
  ///
  /// Key, close and framebuffer size events are polled.
  pub fn new_gl33(
    title: impl AsRef<str>,
    win_opt: WindowOpt,
  ) -> Result<Self, GlfwSurfaceError<Infallible>> {
    let title = title.as_ref();

    GlfwSurface::new(|glfw| -> Result<_, SurfaceError> {
      glfw.window_hint(glfw::WindowHint::Samples(win_opt.num_samples()));

      let (mut window, events_rx) = match *win_opt.dim() {
        WindowDim::Windowed { width, height } => glfw
          .create_window(width, height, title, WindowMode::Windowed)
          .ok_or(SurfaceError::WindowCreationFailed)?,

        WindowDim::Fullscreen => {
          glfw.with_primary_monitor(|glfw, monitor| -> Result<_, SurfaceError> {
            let monitor = monitor.ok_or(SurfaceError::NoPrimaryMonitor)?;
            let vmode = monitor
              .get_video_mode()
              .ok_or(SurfaceError::NoVideoMode)?;
            let (w, h) = (vmode.width, vmode.height);

            glfw
              .create_window(w, h, title, WindowMode::FullScreen(monitor))
              .ok_or(SurfaceError::WindowCreationFailed)
          })?
        }

        WindowDim::FullscreenRestricted { width, height } => {
          glfw.with_primary_monitor(|glfw, monitor| -> Result<_, SurfaceError> {
            let monitor = monitor.ok_or(SurfaceError::NoPrimaryMonitor)?;

            glfw
              .create_window(width, height, title, WindowMode::FullScreen(monitor))
              .ok_or(SurfaceError::WindowCreationFailed)
          })?
        }
      };

      window.set_key_polling(true);
      window.set_close_polling(true);
      window.set_framebuffer_size_polling(true);
      window.set_cursor_mode(cursor_mode(win_opt.cursor_mode()));

      log::info!("opened window “{}” ({:?})", title, win_opt.dim());

      Ok((window, events_rx))
    })
  }
}

// calling an unloaded GL function panics, so check them all before touching the context
fn check_gl_symbols<E>() -> Result<(), GlfwSurfaceError<E>> {
  let missing = GL33::missing_symbols();

  if missing.is_empty() {
    Ok(())
  } else {
    Err(GlfwSurfaceError::LoaderFailed(missing))
  }
}

fn cursor_mode(mode: CursorMode) -> glfw::CursorMode {
  match mode {
    CursorMode::Visible => glfw::CursorMode::Normal,
    CursorMode::Invisible => glfw::CursorMode::Hidden,
    CursorMode::Disabled => glfw::CursorMode::Disabled,
  }
}

/// OpenGL 3.3 context.
///
/// This type also re-exports the GLFW window, if you need access to it.
#[derive(Debug)]
pub struct GL33Context {
  /// Wrapped GLFW window.
  pub window: Window,

  /// OpenGL 3.3 state.
  gl: GL33,
}

impl GL33Context {
  /// Access the OpenGL backend.
  pub fn backend(&mut self) -> &mut GL33 {
    &mut self.gl
  }

  /// Size of the framebuffer, in pixels.
  pub fn size(&self) -> [u32; 2] {
    let (w, h) = self.window.get_framebuffer_size();
    [w.max(0) as u32, h.max(0) as u32]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cursor_modes() {
    assert_eq!(cursor_mode(CursorMode::Visible), glfw::CursorMode::Normal);
    assert_eq!(cursor_mode(CursorMode::Invisible), glfw::CursorMode::Hidden);
    assert_eq!(
      cursor_mode(CursorMode::Disabled),
      glfw::CursorMode::Disabled
    );
  }

  #[test]
  fn error_display() {
    let e: GlfwSurfaceError<Infallible> = GlfwSurfaceError::WindowCreationFailed;
    assert_eq!(e.to_string(), "failed to create window");

    let e: GlfwSurfaceError<Infallible> =
      GlfwSurfaceError::GraphicsStateError(StateQueryError::UnavailableGLState);
    assert_eq!(
      e.to_string(),
      "failed to get graphics state: unavailable graphics state"
    );
  }

  #[test]
  fn unloaded_symbols_are_reported() {
    match check_gl_symbols::<Infallible>() {
      Err(GlfwSurfaceError::LoaderFailed(missing)) => {
        assert!(missing.contains(&"glGetIntegerv"));
        assert!(missing.contains(&"glViewport"));
      }
      other => panic!("expected a loader failure, got {:?}", other),
    }
  }

  #[test]
  fn loader_failure_display() {
    use std::error::Error as _;

    let e: GlfwSurfaceError<Infallible> =
      GlfwSurfaceError::LoaderFailed(vec!["glGetIntegerv", "glViewport"]);

    assert_eq!(
      e.to_string(),
      "failed to load OpenGL functions: glGetIntegerv, glViewport"
    );
    assert!(e.source().is_none());
  }

  #[test]
  fn error_source() {
    use std::error::Error as _;

    let e: GlfwSurfaceError<Infallible> =
      GlfwSurfaceError::GraphicsStateError(StateQueryError::UnavailableGLState);
    assert!(e.source().is_some());

    let e: GlfwSurfaceError<Infallible> = GlfwSurfaceError::NoVideoMode;
    assert!(e.source().is_none());
  }
}
