//! Hello, quad.
//!
//! Open a window with an OpenGL 3.3 core-profile context, then draw a quad made of two triangles,
//! in wireframe, until the window is closed or <kbd>Escape</kbd> is pressed. <kbd>Space</kbd>
//! switches between wireframe and filled rendering.
//!
//! The program is split in three parts:
//!
//! - [`cli`], mapping command-line options onto window options.
//! - [`input`], turning GLFW events into [`InputAction`]s.
//! - [`quad`], owning the GPU resources and rendering frames out of input actions.
//!
//! [`run`] glues everything together.

pub mod cli;
pub mod input;
pub mod quad;

pub use cli::CLIOpts;
pub use input::{adapt_events, InputAction};
pub use quad::{FrameState, Quad, QuadError};

use glfw::Context as _;
use hello_quad_glfw::{GlfwSurface, GlfwSurfaceError};
use std::{convert::Infallible, error, fmt, iter};

/// What to do after a frame.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum LoopFeedback {
  Continue,
  Exit,
}

/// Errors that stop the program.
#[derive(Debug)]
pub enum AppError {
  /// The window or the OpenGL context couldn’t be created.
  Surface(GlfwSurfaceError<Infallible>),
  /// The quad couldn’t be set up.
  Quad(QuadError),
}

impl fmt::Display for AppError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      AppError::Surface(e) => write!(f, "cannot create the GLFW surface: {}", e),
      AppError::Quad(e) => write!(f, "{}", e),
    }
  }
}

impl error::Error for AppError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      AppError::Surface(e) => Some(e),
      AppError::Quad(e) => Some(e),
    }
  }
}

impl From<GlfwSurfaceError<Infallible>> for AppError {
  fn from(e: GlfwSurfaceError<Infallible>) -> Self {
    AppError::Surface(e)
  }
}

impl From<QuadError> for AppError {
  fn from(e: QuadError) -> Self {
    AppError::Quad(e)
  }
}

/// Open the window and render the quad until asked to quit.
pub fn run(cli_opts: CLIOpts) -> Result<(), AppError> {
  let surface = GlfwSurface::new_gl33(&cli_opts.title, cli_opts.window_opt())?;
  let mut context = surface.context;
  let events = surface.events_rx;

  let mut quad = Quad::bootstrap(context.backend(), cli_opts.polygon_mode())?;

  // the first frame gets the actual framebuffer size, which might differ from the requested window
  // size on high-DPI displays
  let [width, height] = context.size();
  let feedback = quad.render_frame(
    context.backend(),
    iter::once(InputAction::Resized { width, height }),
  );

  if feedback == LoopFeedback::Exit {
    return Ok(());
  }

  context.window.swap_buffers();

  'app: loop {
    if context.window.should_close() {
      break 'app;
    }

    // handle events
    context.window.glfw.poll_events();
    let actions = glfw::flush_messages(&events).flat_map(|(_, event)| adapt_events(event));

    match quad.render_frame(context.backend(), actions) {
      LoopFeedback::Continue => context.window.swap_buffers(),
      LoopFeedback::Exit => break 'app,
    }
  }

  log::info!("bye");

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use hello_quad_gl::TessError;
  use std::error::Error as _;

  #[test]
  fn app_error_display() {
    let e = AppError::from(GlfwSurfaceError::<Infallible>::NoPrimaryMonitor);
    assert_eq!(e.to_string(), "cannot create the GLFW surface: no primary monitor");
    assert!(e.source().is_some());

    let e = AppError::from(GlfwSurfaceError::<Infallible>::LoaderFailed(vec!["glClear"]));
    assert_eq!(
      e.to_string(),
      "cannot create the GLFW surface: failed to load OpenGL functions: glClear"
    );

    let e = AppError::from(QuadError::from(TessError::NoVertices));
    assert_eq!(e.to_string(), QuadError::Tess(TessError::NoVertices).to_string());
  }
}
