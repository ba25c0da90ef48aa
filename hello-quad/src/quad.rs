//! The quad: two triangles sharing a diagonal, drawn with a single constant color.

use crate::input::InputAction;
use crate::LoopFeedback;
use hello_quad_gl::{
  Mode, PipelineState, PolygonMode, Program, ProgramError, Tess, TessBuilder, TessError, Vertex,
  VertexBufferDesc, VertexDesc, Viewport, GL33,
};
use std::{error, fmt};

const VS: &str = include_str!("simple-vs.glsl");
const FS: &str = include_str!("simple-fs.glsl");

/// Color the back buffer is cleared with, every frame.
pub const CLEAR_COLOR: [f32; 4] = [0.2, 0.3, 0.3, 1.];

/// Corners of the quad, in normalized device coordinates.
pub const VERTICES: [QuadVertex; 4] = [
  QuadVertex::new([0.5, 0.5, 0.]),   // top right
  QuadVertex::new([0.5, -0.5, 0.]),  // bottom right
  QuadVertex::new([-0.5, -0.5, 0.]), // bottom left
  QuadVertex::new([-0.5, 0.5, 0.]),  // top left
];

pub const INDICES: [u32; 6] = [
  0, 2, 3, // first triangle
  0, 1, 2, // second triangle
];

/// A vertex of the quad: only a position, bound at location 0.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadVertex {
  pub pos: [f32; 3],
}

impl QuadVertex {
  pub const fn new(pos: [f32; 3]) -> Self {
    QuadVertex { pos }
  }
}

unsafe impl Vertex for QuadVertex {
  fn vertex_desc() -> VertexDesc {
    vec![VertexBufferDesc::new::<[f32; 3]>(0, "pos")]
  }
}

/// Errors that might occur while setting up the quad.
#[non_exhaustive]
#[derive(Debug)]
pub enum QuadError {
  /// The shader program couldn’t be built.
  Program(ProgramError),
  /// The geometry couldn’t be uploaded.
  Tess(TessError),
}

impl fmt::Display for QuadError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      QuadError::Program(e) => write!(f, "cannot create the quad shader program: {}", e),
      QuadError::Tess(e) => write!(f, "cannot create the quad geometry: {}", e),
    }
  }
}

impl error::Error for QuadError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      QuadError::Program(e) => Some(e),
      QuadError::Tess(e) => Some(e),
    }
  }
}

impl From<ProgramError> for QuadError {
  fn from(e: ProgramError) -> Self {
    QuadError::Program(e)
  }
}

impl From<TessError> for QuadError {
  fn from(e: TessError) -> Self {
    QuadError::Tess(e)
  }
}

/// What the next frame looks like.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FrameState {
  pub size: [u32; 2],
  pub polygon_mode: PolygonMode,
  pub exit: bool,
}

impl FrameState {
  pub fn new(size: [u32; 2], polygon_mode: PolygonMode) -> Self {
    FrameState {
      size,
      polygon_mode,
      exit: false,
    }
  }

  /// Fold input actions into the state.
  ///
  /// Once a [`InputAction::Quit`] is seen, the state stays in exit mode and the remaining actions
  /// are ignored.
  pub fn apply(&mut self, actions: impl IntoIterator<Item = InputAction>) -> LoopFeedback {
    for action in actions {
      if self.exit {
        break;
      }

      match action {
        InputAction::Quit => self.exit = true,

        InputAction::TogglePolygonMode => {
          self.polygon_mode = self.polygon_mode.toggled();
          log::debug!("now rendering in {:?} mode", self.polygon_mode);
        }

        InputAction::Resized { width, height } => {
          self.size = [width, height];
        }
      }
    }

    if self.exit {
      LoopFeedback::Exit
    } else {
      LoopFeedback::Continue
    }
  }
}

/// GPU resources of the quad, along with its frame state.
pub struct Quad {
  program: Program,
  tess: Tess<QuadVertex>,
  frame: FrameState,
}

impl Quad {
  /// Compile the shaders and upload the quad.
  ///
  /// The frame size is unknown at that point; it’s expected to be fed with an
  /// [`InputAction::Resized`] before the first real frame.
  pub fn bootstrap(gl33: &mut GL33, polygon_mode: PolygonMode) -> Result<Self, QuadError> {
    let program = Program::from_strings(gl33, VS, FS)?;

    let tess = TessBuilder::new(gl33)
      .set_vertices(VERTICES)
      .set_indices(INDICES)
      .set_mode(Mode::Triangle)
      .build()?;

    log::info!(
      "quad ready: {} vertices, {} indices, {:?} mode",
      VERTICES.len(),
      tess.vert_nb(),
      polygon_mode
    );

    Ok(Quad {
      program,
      tess,
      frame: FrameState::new([0, 0], polygon_mode),
    })
  }

  /// Apply `actions`, then clear the back buffer and draw the quad, unless asked to exit.
  pub fn render_frame(
    &mut self,
    gl33: &mut GL33,
    actions: impl IntoIterator<Item = InputAction>,
  ) -> LoopFeedback {
    if let LoopFeedback::Exit = self.frame.apply(actions) {
      return LoopFeedback::Exit;
    }

    let pipeline_state = PipelineState::new()
      .set_clear_color(CLEAR_COLOR)
      .set_viewport(Viewport::Whole)
      .set_polygon_mode(self.frame.polygon_mode);

    let pipeline = gl33.new_pipeline(self.frame.size, &pipeline_state);
    pipeline.draw(&self.program, &self.tess);

    LoopFeedback::Continue
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::mem;

  #[test]
  fn quad_data() {
    assert_eq!(mem::size_of_val(&VERTICES), 12 * mem::size_of::<f32>());
    assert_eq!(mem::size_of::<QuadVertex>(), 12);
    assert_eq!(INDICES.len(), 6);
    assert!(INDICES.iter().all(|&i| (i as usize) < VERTICES.len()));
  }

  #[test]
  fn triangles_share_a_diagonal() {
    let (a, b) = INDICES.split_at(3);
    let shared = a.iter().filter(|&i| b.contains(i)).count();

    assert_eq!(shared, 2);
    assert!(VERTICES.iter().all(|v| v.pos[2] == 0.));
  }

  #[test]
  fn vertex_desc() {
    let desc = QuadVertex::vertex_desc();

    assert_eq!(desc.len(), 1);
    assert_eq!(desc[0].index, 0);
    assert_eq!(desc[0].name, "pos");
    assert_eq!(desc[0].attrib_desc.dim.size(), 3);
  }

  #[test]
  fn shaders_declare_no_version() {
    assert!(!VS.contains("#version"));
    assert!(!FS.contains("#version"));
    assert!(VS.contains("location = 0"));
  }

  #[test]
  fn frame_state_resize_and_toggle() {
    let mut frame = FrameState::new([0, 0], PolygonMode::Line);

    let feedback = frame.apply(vec![
      InputAction::Resized {
        width: 800,
        height: 600,
      },
      InputAction::TogglePolygonMode,
    ]);

    assert_eq!(feedback, LoopFeedback::Continue);
    assert_eq!(frame.size, [800, 600]);
    assert_eq!(frame.polygon_mode, PolygonMode::Fill);

    frame.apply(Some(InputAction::TogglePolygonMode));
    assert_eq!(frame.polygon_mode, PolygonMode::Line);
  }

  #[test]
  fn frame_state_no_action() {
    let mut frame = FrameState::new([640, 480], PolygonMode::Line);

    assert_eq!(frame.apply(None), LoopFeedback::Continue);
    assert_eq!(frame, FrameState::new([640, 480], PolygonMode::Line));
  }

  #[test]
  fn frame_state_quit_is_sticky() {
    let mut frame = FrameState::new([800, 600], PolygonMode::Line);

    let feedback = frame.apply(vec![
      InputAction::Quit,
      InputAction::Resized {
        width: 1,
        height: 1,
      },
    ]);

    assert_eq!(feedback, LoopFeedback::Exit);
    assert!(frame.exit);
    assert_eq!(frame.size, [800, 600]);
    assert_eq!(frame.apply(None), LoopFeedback::Exit);
  }

  #[test]
  fn error_display() {
    let e = QuadError::from(TessError::NoVertices);
    assert_eq!(
      e.to_string(),
      format!("cannot create the quad geometry: {}", TessError::NoVertices)
    );
  }
}
