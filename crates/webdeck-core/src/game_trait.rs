use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::input::ButtonEvent;

/// Down/up phase of a synthetic key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyTransition {
    Down,
    Up,
}

/// A synthetic DOM keyboard event in the vocabulary web games listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyStroke {
    /// Legacy `keyCode`/`which` value; older games key off this alone.
    pub key_code: u32,
    pub key: &'static str,
    pub code: &'static str,
}

impl KeyStroke {
    pub const ARROW_LEFT: KeyStroke = KeyStroke {
        key_code: 37,
        key: "ArrowLeft",
        code: "ArrowLeft",
    };
    pub const ARROW_UP: KeyStroke = KeyStroke {
        key_code: 38,
        key: "ArrowUp",
        code: "ArrowUp",
    };
    pub const ARROW_RIGHT: KeyStroke = KeyStroke {
        key_code: 39,
        key: "ArrowRight",
        code: "ArrowRight",
    };
    pub const ARROW_DOWN: KeyStroke = KeyStroke {
        key_code: 40,
        key: "ArrowDown",
        code: "ArrowDown",
    };

    /// Script that replays this stroke as a DOM `KeyboardEvent`, with the
    /// legacy `which`/`keyCode` properties pinned for games that read them.
    pub fn dispatch_script(&self, transition: KeyTransition) -> String {
        let kind = match transition {
            KeyTransition::Down => "keydown",
            KeyTransition::Up => "keyup",
        };
        format!(
            "(function(){{\n  var e = new KeyboardEvent('{kind}', {{key: {key}, code: {code}, bubbles: true, cancelable: true}});\n  Object.defineProperty(e, 'which', {{value: {which}}});\n  Object.defineProperty(e, 'keyCode', {{value: {which}}});\n  document.dispatchEvent(e);\n}})();",
            key = serde_json::json!(self.key),
            code = serde_json::json!(self.code),
            which = self.key_code,
        )
    }
}

/// One unit of work the embedding web surface executes against the page.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    /// Replay a synthetic keyboard event into the page.
    Key {
        transition: KeyTransition,
        stroke: KeyStroke,
    },
    /// Evaluate a script in the page (start buttons, audio unlock).
    Script(String),
    /// The game asked to end its session.
    Close,
}

impl SurfaceCommand {
    pub fn key_down(stroke: KeyStroke) -> Self {
        Self::Key {
            transition: KeyTransition::Down,
            stroke,
        }
    }

    pub fn key_up(stroke: KeyStroke) -> Self {
        Self::Key {
            transition: KeyTransition::Up,
            stroke,
        }
    }

    /// Script form of this command, if it is expressible as page script.
    pub fn as_script(&self) -> Option<String> {
        match self {
            Self::Key { transition, stroke } => Some(stroke.dispatch_script(*transition)),
            Self::Script(script) => Some(script.clone()),
            Self::Close => None,
        }
    }
}

/// Preferred orientation of the mounted surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Private, per-session game state.
///
/// One value is constructed per session by the owning descriptor and lives
/// until the session closes. Its job is translating controller transitions
/// into surface commands for the page hosting the game.
pub trait WebGameState {
    /// The remote content locator this state was built for.
    fn content_url(&self) -> &str;

    /// React to one controller transition.
    fn on_button(&mut self, event: ButtonEvent) -> Vec<SurfaceCommand>;

    /// Called when the owning session is torn down.
    fn teardown(&mut self) {}
}

/// A renderable unit bound to exactly one state instance.
pub trait GameRenderer {
    /// URL the hosting surface should load.
    fn content_url(&self) -> String;

    /// Preferred mount orientation.
    fn orientation(&self) -> Orientation {
        Orientation::Portrait
    }

    /// Forward a controller transition to the bound state. A `Close`
    /// command is consumed here and surfaces as a request on the session's
    /// close handle instead of reaching the page.
    fn forward_button(&mut self, event: ButtonEvent) -> Vec<SurfaceCommand>;

    /// Commands to run once the surface is mounted.
    fn on_mount(&mut self) -> Vec<SurfaceCommand> {
        Vec::new()
    }

    /// Called before the surface is unmounted.
    fn teardown(&mut self) {}
}

/// Tracks which keys are currently held inside the page so repeated down
/// transitions from the pad do not double-fire, and releases of keys that
/// were never pressed are swallowed.
#[derive(Debug, Default)]
pub struct KeyLatch {
    down: HashSet<KeyStroke>,
}

impl KeyLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch one transition, returning the command to emit if it changed
    /// the held set.
    pub fn apply(&mut self, stroke: KeyStroke, pressed: bool) -> Option<SurfaceCommand> {
        if pressed {
            self.down
                .insert(stroke)
                .then(|| SurfaceCommand::key_down(stroke))
        } else {
            self.down
                .remove(&stroke)
                .then(|| SurfaceCommand::key_up(stroke))
        }
    }

    /// Release commands for every key still held.
    pub fn drain(&mut self) -> Vec<SurfaceCommand> {
        self.down.drain().map(SurfaceCommand::key_up).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.down.is_empty()
    }
}

/// Generates the `GameRenderer` methods that are identical across surface
/// types: `content_url` and `forward_button`.
///
/// Requires the implementing struct to have `state: Rc<RefCell<S>>` and
/// `on_close: CloseHandle` fields, with `S` implementing `WebGameState`.
#[macro_export]
macro_rules! surface_boilerplate {
    () => {
        fn content_url(&self) -> String {
            self.state.borrow().content_url().to_string()
        }

        fn forward_button(
            &mut self,
            event: $crate::input::ButtonEvent,
        ) -> Vec<$crate::game_trait::SurfaceCommand> {
            let mut commands = self.state.borrow_mut().on_button(event);
            commands.retain(|command| {
                if matches!(command, $crate::game_trait::SurfaceCommand::Close) {
                    self.on_close.request();
                    false
                } else {
                    true
                }
            });
            commands
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_latch_dedupes_repeated_downs() {
        let mut latch = KeyLatch::new();
        assert_eq!(
            latch.apply(KeyStroke::ARROW_LEFT, true),
            Some(SurfaceCommand::key_down(KeyStroke::ARROW_LEFT))
        );
        assert_eq!(latch.apply(KeyStroke::ARROW_LEFT, true), None);
        assert_eq!(
            latch.apply(KeyStroke::ARROW_LEFT, false),
            Some(SurfaceCommand::key_up(KeyStroke::ARROW_LEFT))
        );
    }

    #[test]
    fn key_latch_swallows_unmatched_releases() {
        let mut latch = KeyLatch::new();
        assert_eq!(latch.apply(KeyStroke::ARROW_UP, false), None);
    }

    #[test]
    fn key_latch_drains_held_keys() {
        let mut latch = KeyLatch::new();
        latch.apply(KeyStroke::ARROW_LEFT, true);
        latch.apply(KeyStroke::ARROW_DOWN, true);
        let released = latch.drain();
        assert_eq!(released.len(), 2);
        assert!(latch.is_empty());
        assert!(
            released
                .iter()
                .all(|c| matches!(c, SurfaceCommand::Key { transition: KeyTransition::Up, .. }))
        );
    }

    #[test]
    fn dispatch_script_pins_legacy_key_code() {
        let script = KeyStroke::ARROW_RIGHT.dispatch_script(KeyTransition::Down);
        assert!(script.contains("keydown"));
        assert!(script.contains("\"ArrowRight\""));
        assert!(script.contains("{value: 39}"));
    }

    #[test]
    fn close_has_no_script_form() {
        assert!(SurfaceCommand::Close.as_script().is_none());
        assert!(
            SurfaceCommand::key_down(KeyStroke::ARROW_UP)
                .as_script()
                .is_some()
        );
    }
}
