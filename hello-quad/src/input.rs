//! Window events, as seen by the quad.

use glfw::{Action, Key, WindowEvent};

/// A type used to pass “inputs” to the quad.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputAction {
  /// Quit the application.
  Quit,

  /// Switch between wireframe and filled rendering.
  TogglePolygonMode,

  /// Framebuffer size changed.
  Resized { width: u32, height: u32 },
}

/// Map a GLFW event to an [`InputAction`], if any.
pub fn adapt_events(event: WindowEvent) -> Option<InputAction> {
  match event {
    WindowEvent::Close | WindowEvent::Key(Key::Escape, _, Action::Press, _) => {
      Some(InputAction::Quit)
    }

    WindowEvent::Key(Key::Space, _, Action::Release, _) => Some(InputAction::TogglePolygonMode),

    WindowEvent::Key(key, _, Action::Press, _) => {
      log::debug!("key press: {:?}", key);
      None
    }

    WindowEvent::FramebufferSize(width, height) => {
      log::debug!("framebuffer resized to {}×{}", width, height);

      Some(InputAction::Resized {
        width: width.max(0) as _,
        height: height.max(0) as _,
      })
    }

    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use glfw::Modifiers;

  fn key(key: Key, action: Action) -> WindowEvent {
    WindowEvent::Key(key, 0, action, Modifiers::empty())
  }

  #[test]
  fn quit_on_close_or_escape() {
    assert_eq!(adapt_events(WindowEvent::Close), Some(InputAction::Quit));
    assert_eq!(
      adapt_events(key(Key::Escape, Action::Press)),
      Some(InputAction::Quit)
    );
    assert_eq!(adapt_events(key(Key::Escape, Action::Release)), None);
  }

  #[test]
  fn space_release_toggles() {
    assert_eq!(
      adapt_events(key(Key::Space, Action::Release)),
      Some(InputAction::TogglePolygonMode)
    );
    assert_eq!(adapt_events(key(Key::Space, Action::Press)), None);
  }

  #[test]
  fn resize() {
    assert_eq!(
      adapt_events(WindowEvent::FramebufferSize(1024, 768)),
      Some(InputAction::Resized {
        width: 1024,
        height: 768
      })
    );
    assert_eq!(
      adapt_events(WindowEvent::FramebufferSize(-1, 0)),
      Some(InputAction::Resized {
        width: 0,
        height: 0
      })
    );
  }

  #[test]
  fn other_keys_are_ignored() {
    assert_eq!(adapt_events(key(Key::A, Action::Press)), None);
    assert_eq!(adapt_events(key(Key::A, Action::Repeat)), None);
    assert_eq!(adapt_events(WindowEvent::Focus(true)), None);
  }
}
