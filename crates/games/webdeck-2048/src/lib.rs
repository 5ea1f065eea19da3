use std::cell::RefCell;
use std::rc::Rc;

use webdeck_core::game_trait::{GameRenderer, KeyLatch, KeyStroke, SurfaceCommand, WebGameState};
use webdeck_core::input::{ButtonEvent, ControllerButton};
use webdeck_core::registry::GameDescriptor;
use webdeck_core::session::CloseHandle;
use webdeck_core::surface_boilerplate;

const START_URL: &str = "https://axilleasiv.github.io/vue2048/";

/// Session state for the embedded 2048 board.
///
/// The board listens for plain arrow keys, so the d-pad maps straight onto
/// them; everything else is ignored apart from the close chord.
pub struct Game2048State {
    url: String,
    keys: KeyLatch,
}

impl Game2048State {
    fn new(url: String) -> Self {
        Self {
            url,
            keys: KeyLatch::new(),
        }
    }

    fn stroke_for(button: ControllerButton) -> Option<KeyStroke> {
        match button {
            ControllerButton::Left => Some(KeyStroke::ARROW_LEFT),
            ControllerButton::Right => Some(KeyStroke::ARROW_RIGHT),
            ControllerButton::Up => Some(KeyStroke::ARROW_UP),
            ControllerButton::Down => Some(KeyStroke::ARROW_DOWN),
            _ => None,
        }
    }
}

impl WebGameState for Game2048State {
    fn content_url(&self) -> &str {
        &self.url
    }

    fn on_button(&mut self, event: ButtonEvent) -> Vec<SurfaceCommand> {
        if matches!(
            event.button,
            ControllerButton::B | ControllerButton::Select | ControllerButton::Menu
        ) {
            return if event.pressed {
                vec![SurfaceCommand::Close]
            } else {
                Vec::new()
            };
        }
        Self::stroke_for(event.button)
            .and_then(|stroke| self.keys.apply(stroke, event.pressed))
            .into_iter()
            .collect()
    }

    fn teardown(&mut self) {
        self.keys.drain();
    }
}

/// Portrait web surface hosting the 2048 board.
pub struct Game2048Surface {
    state: Rc<RefCell<Game2048State>>,
    on_close: CloseHandle,
}

impl GameRenderer for Game2048Surface {
    surface_boilerplate!();
}

/// Catalog descriptor for 2048.
pub fn descriptor() -> GameDescriptor {
    GameDescriptor::new(
        "2048",
        "2048",
        START_URL,
        "icon-2048",
        || Game2048State::new(START_URL.to_string()),
        |state, on_close| Game2048Surface { state, on_close },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use webdeck_core::game_trait::KeyTransition;
    use webdeck_core::test_helpers as contract;

    #[test]
    fn dpad_maps_to_arrow_keys() {
        let mut state = Game2048State::new(START_URL.to_string());
        let commands = state.on_button(ButtonEvent::press(ControllerButton::Left));
        assert_eq!(
            commands,
            vec![SurfaceCommand::key_down(KeyStroke::ARROW_LEFT)]
        );
        let commands = state.on_button(ButtonEvent::release(ControllerButton::Left));
        assert_eq!(commands, vec![SurfaceCommand::key_up(KeyStroke::ARROW_LEFT)]);
    }

    #[test]
    fn unmapped_buttons_do_nothing() {
        let mut state = Game2048State::new(START_URL.to_string());
        for button in [
            ControllerButton::A,
            ControllerButton::X,
            ControllerButton::Start,
            ControllerButton::UpLeft,
        ] {
            assert!(state.on_button(ButtonEvent::press(button)).is_empty());
        }
    }

    #[test]
    fn teardown_releases_held_keys() {
        let mut state = Game2048State::new(START_URL.to_string());
        state.on_button(ButtonEvent::press(ControllerButton::Up));
        state.teardown();
        // A later release has nothing left to release.
        assert!(
            state
                .on_button(ButtonEvent::release(ControllerButton::Up))
                .is_empty()
        );
    }

    #[test]
    fn held_direction_does_not_double_fire() {
        let mut state = Game2048State::new(START_URL.to_string());
        let first = state.on_button(ButtonEvent::press(ControllerButton::Right));
        let second = state.on_button(ButtonEvent::press(ControllerButton::Right));
        assert!(matches!(
            first.as_slice(),
            [SurfaceCommand::Key {
                transition: KeyTransition::Down,
                ..
            }]
        ));
        assert!(second.is_empty());
    }

    #[test]
    fn state_exposes_content_url() {
        contract::contract_state_exposes_content_url(&descriptor());
    }

    #[test]
    fn renderer_binds_same_state() {
        contract::contract_renderer_binds_same_state(&descriptor());
    }

    #[test]
    fn close_chord_requests_close() {
        for button in [
            ControllerButton::B,
            ControllerButton::Select,
            ControllerButton::Menu,
        ] {
            contract::contract_close_chord_requests_close(&descriptor(), button);
            contract::contract_release_never_closes(&descriptor(), button);
        }
    }

    #[test]
    fn repeated_press_is_latched() {
        contract::contract_repeated_press_is_latched(&descriptor(), ControllerButton::Left);
    }
}
