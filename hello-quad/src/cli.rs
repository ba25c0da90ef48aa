//! Command-line options.

use hello_quad_gl::PolygonMode;
use hello_quad_windowing::{WindowDim, WindowOpt};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "hello-quad", about = "Draw a quad with OpenGL 3.3.")]
pub struct CLIOpts {
  #[structopt(long, default_value = "800")]
  /// Width of the window, in pixels.
  pub width: u32,

  #[structopt(long, default_value = "600")]
  /// Height of the window, in pixels.
  pub height: u32,

  #[structopt(short, long, default_value = "OpenGL - Creating a window")]
  /// Title of the window.
  pub title: String,

  #[structopt(long)]
  /// Render filled polygons instead of wireframe.
  pub fill: bool,

  #[structopt(short, long)]
  /// Number of samples to use for multisampling.
  pub samples: Option<u32>,

  #[structopt(short, long)]
  /// Open a fullscreen window on the primary monitor, at the requested size.
  pub fullscreen: bool,
}

impl CLIOpts {
  /// Window options matching these command-line options.
  pub fn window_opt(&self) -> WindowOpt {
    let dim = if self.fullscreen {
      WindowDim::FullscreenRestricted {
        width: self.width,
        height: self.height,
      }
    } else {
      WindowDim::Windowed {
        width: self.width,
        height: self.height,
      }
    };

    WindowOpt::default()
      .set_dim(dim)
      .set_num_samples(self.samples)
  }

  /// Polygon mode to start rendering with: wireframe, unless `--fill` is passed.
  pub fn polygon_mode(&self) -> PolygonMode {
    if self.fill {
      PolygonMode::Fill
    } else {
      PolygonMode::Line
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let opts = CLIOpts::from_iter(&["hello-quad"]);

    assert_eq!(opts.width, 800);
    assert_eq!(opts.height, 600);
    assert_eq!(opts.title, "OpenGL - Creating a window");
    assert!(!opts.fill);
    assert_eq!(opts.polygon_mode(), PolygonMode::Line);
    assert!(!opts.fullscreen);
    assert_eq!(opts.samples, None);

    let win_opt = opts.window_opt();
    assert_eq!(
      *win_opt.dim(),
      WindowDim::Windowed {
        width: 800,
        height: 600
      }
    );
    assert_eq!(win_opt.num_samples(), None);
  }

  #[test]
  fn custom_window() {
    let opts = CLIOpts::from_iter(&[
      "hello-quad",
      "--width",
      "1024",
      "--height",
      "768",
      "--samples",
      "4",
      "--fill",
    ]);

    assert!(opts.fill);
    assert_eq!(opts.polygon_mode(), PolygonMode::Fill);

    let win_opt = opts.window_opt();
    assert_eq!(
      *win_opt.dim(),
      WindowDim::Windowed {
        width: 1024,
        height: 768
      }
    );
    assert_eq!(win_opt.num_samples(), Some(4));
  }

  #[test]
  fn wireframe_unless_filled() {
    let wireframe = CLIOpts::from_iter(&["hello-quad", "--width", "640"]);
    assert_eq!(wireframe.polygon_mode(), PolygonMode::Line);

    let filled = CLIOpts::from_iter(&["hello-quad", "--fill"]);
    assert_eq!(filled.polygon_mode(), PolygonMode::Fill);
  }

  #[test]
  fn fullscreen_keeps_requested_size() {
    let opts = CLIOpts::from_iter(&["hello-quad", "-f", "--width", "1920", "--height", "1080"]);

    assert_eq!(
      *opts.window_opt().dim(),
      WindowDim::FullscreenRestricted {
        width: 1920,
        height: 1080
      }
    );
  }
}
