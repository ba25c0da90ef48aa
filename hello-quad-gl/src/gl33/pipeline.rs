//! Per-frame pipeline.
//!
//! A [`Pipeline`] is started once per frame with a [`PipelineState`]: it sets the viewport,
//! clears the back buffer and selects how polygons get rasterized. Geometry is then drawn through
//! it with a shader [`Program`].

use gl::types::*;
use std::cell::RefCell;
use std::rc::Rc;

use crate::gl33::shader::Program;
use crate::gl33::state::GLState;
use crate::gl33::tess::Tess;
use crate::gl33::GL33;

/// How polygons get rasterized.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PolygonMode {
  /// Filled polygons.
  Fill,
  /// Polygon edges only (wireframe).
  Line,
  /// Polygon vertices only.
  Point,
}

impl PolygonMode {
  pub(crate) fn to_glenum(self) -> GLenum {
    match self {
      PolygonMode::Fill => gl::FILL,
      PolygonMode::Line => gl::LINE,
      PolygonMode::Point => gl::POINT,
    }
  }

  /// Switch between filled and wireframe rendering.
  ///
  /// [`PolygonMode::Point`] switches to [`PolygonMode::Fill`].
  pub fn toggled(self) -> Self {
    match self {
      PolygonMode::Line => PolygonMode::Fill,
      PolygonMode::Fill | PolygonMode::Point => PolygonMode::Line,
    }
  }
}

/// The viewport being part of the [`PipelineState`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Viewport {
  /// The whole viewport is used. The position and dimension of the viewport rectangle are
  /// extracted from the framebuffer.
  Whole,
  /// The viewport is specific and the rectangle area is user-defined.
  Specific {
    /// The lower position on the X axis to start the viewport rectangle at.
    x: u32,
    /// The lower position on the Y axis to start the viewport rectangle at.
    y: u32,
    /// The width of the viewport.
    width: u32,
    /// The height of the viewport.
    height: u32,
  },
}

impl Viewport {
  /// Rectangle (`x`, `y`, `width`, `height`) to pass to `glViewport`, for a framebuffer of the
  /// given size.
  pub(crate) fn rect(self, size: [u32; 2]) -> [GLint; 4] {
    match self {
      Viewport::Whole => [0, 0, size[0] as GLint, size[1] as GLint],
      Viewport::Specific {
        x,
        y,
        width,
        height,
      } => [x as GLint, y as GLint, width as GLint, height as GLint],
    }
  }
}

/// Various customization options for pipelines.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineState {
  /// Color to use when clearing color buffers.
  pub clear_color: [f32; 4],
  /// Whether clearing color buffers.
  pub clear_color_enabled: bool,
  /// Viewport to use when rendering.
  pub viewport: Viewport,
  /// Rasterization mode for both front and back faces.
  pub polygon_mode: PolygonMode,
}

impl Default for PipelineState {
  /// Default [`PipelineState`]:
  ///
  /// - Clear color: `[0, 0, 0, 1]`.
  /// - Color is always cleared.
  /// - The viewport uses the whole framebuffer’s.
  /// - Polygons are filled.
  fn default() -> Self {
    PipelineState {
      clear_color: [0., 0., 0., 1.],
      clear_color_enabled: true,
      viewport: Viewport::Whole,
      polygon_mode: PolygonMode::Fill,
    }
  }
}

impl PipelineState {
  /// Create a default [`PipelineState`].
  ///
  /// See the documentation of the [`Default`] for further details.
  pub fn new() -> Self {
    Self::default()
  }

  /// Set the clear color.
  pub fn set_clear_color(self, clear_color: [f32; 4]) -> Self {
    Self {
      clear_color,
      ..self
    }
  }

  /// Enable clearing color buffers.
  pub fn enable_clear_color(self, clear_color_enabled: bool) -> Self {
    Self {
      clear_color_enabled,
      ..self
    }
  }

  /// Set the viewport.
  pub fn set_viewport(self, viewport: Viewport) -> Self {
    Self { viewport, ..self }
  }

  /// Set the polygon rasterization mode.
  pub fn set_polygon_mode(self, polygon_mode: PolygonMode) -> Self {
    Self {
      polygon_mode,
      ..self
    }
  }
}

/// A started pipeline.
///
/// Holds on the graphics state for the duration of a frame.
#[non_exhaustive]
pub struct Pipeline {
  state: Rc<RefCell<GLState>>,
}

impl GL33 {
  /// Start a new pipeline on the back buffer, of dimension `size`.
  pub fn new_pipeline(&mut self, size: [u32; 2], pipeline_state: &PipelineState) -> Pipeline {
    let PipelineState {
      clear_color,
      clear_color_enabled,
      viewport,
      polygon_mode,
    } = *pipeline_state;

    {
      let mut state = self.state.borrow_mut();

      unsafe {
        state.set_viewport(viewport.rect(size));
        state.set_clear_color(clear_color);

        if clear_color_enabled {
          gl::Clear(gl::COLOR_BUFFER_BIT);
        }

        state.set_polygon_mode(polygon_mode);
      }
    }

    Pipeline {
      state: self.state.clone(),
    }
  }
}

impl Pipeline {
  /// Draw a tessellation with a shader program.
  pub fn draw<V>(&self, program: &Program, tess: &Tess<V>) {
    debug_assert!(Rc::ptr_eq(&self.state, &program.state));

    unsafe {
      program.use_program();
      tess.render();
    }
  }
}
