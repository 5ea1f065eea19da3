use std::cell::RefCell;
use std::rc::Rc;

use webdeck_core::game_trait::{GameRenderer, KeyLatch, KeyStroke, SurfaceCommand, WebGameState};
use webdeck_core::input::{ButtonEvent, ControllerButton};
use webdeck_core::registry::GameDescriptor;
use webdeck_core::session::CloseHandle;
use webdeck_core::surface_boilerplate;

const START_URL: &str = "https://hextris.io/";

/// Clicks through Hextris's start/restart overlay, preferring the restart
/// button when the game-over screen is showing.
const BOOTSTRAP_SCRIPT: &str = "(function(){\n  var restart = document.getElementById('restart');\n  if (restart && restart.offsetParent !== null) { restart.click(); return; }\n  var start = document.getElementById('startBtn');\n  if (start) { start.click(); }\n})();";

/// Session state for the embedded Hextris game.
///
/// Stays in \"press start\" mode until the first confirm-class press has
/// dismissed the overlay; after that, confirm rotates the hexagon.
pub struct HextrisState {
    url: String,
    keys: KeyLatch,
    needs_start: bool,
}

impl HextrisState {
    fn new(url: String) -> Self {
        Self {
            url,
            keys: KeyLatch::new(),
            needs_start: true,
        }
    }

    fn stroke_for(button: ControllerButton) -> Option<KeyStroke> {
        match button {
            ControllerButton::Left => Some(KeyStroke::ARROW_LEFT),
            ControllerButton::Right => Some(KeyStroke::ARROW_RIGHT),
            ControllerButton::Down => Some(KeyStroke::ARROW_DOWN),
            _ => None,
        }
    }

    fn is_confirm(button: ControllerButton) -> bool {
        matches!(
            button,
            ControllerButton::A | ControllerButton::B | ControllerButton::Y | ControllerButton::Start
        )
    }
}

impl WebGameState for HextrisState {
    fn content_url(&self) -> &str {
        &self.url
    }

    fn on_button(&mut self, event: ButtonEvent) -> Vec<SurfaceCommand> {
        if matches!(
            event.button,
            ControllerButton::X | ControllerButton::Select | ControllerButton::Menu
        ) {
            return if event.pressed {
                vec![SurfaceCommand::Close]
            } else {
                Vec::new()
            };
        }

        if Self::is_confirm(event.button) {
            if !event.pressed {
                return self
                    .keys
                    .apply(KeyStroke::ARROW_UP, false)
                    .into_iter()
                    .collect();
            }
            if self.needs_start {
                self.needs_start = false;
                return vec![SurfaceCommand::Script(BOOTSTRAP_SCRIPT.to_string())];
            }
            // Rotate once the board is live.
            return self
                .keys
                .apply(KeyStroke::ARROW_UP, true)
                .into_iter()
                .collect();
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

/// Portrait web surface hosting Hextris.
pub struct HextrisSurface {
    state: Rc<RefCell<HextrisState>>,
    on_close: CloseHandle,
}

impl GameRenderer for HextrisSurface {
    surface_boilerplate!();
}

/// Catalog descriptor for Hextris.
pub fn descriptor() -> GameDescriptor {
    GameDescriptor::new(
        "hextris",
        "Hextris",
        START_URL,
        "icon-hextris",
        || HextrisState::new(START_URL.to_string()),
        |state, on_close| HextrisSurface { state, on_close },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use webdeck_core::test_helpers as contract;

    #[test]
    fn first_confirm_bootstraps_instead_of_rotating() {
        let mut state = HextrisState::new(START_URL.to_string());
        let commands = state.on_button(ButtonEvent::press(ControllerButton::A));
        assert!(matches!(
            commands.as_slice(),
            [SurfaceCommand::Script(script)] if script.contains("startBtn")
        ));

        state.on_button(ButtonEvent::release(ControllerButton::A));
        let commands = state.on_button(ButtonEvent::press(ControllerButton::A));
        assert_eq!(commands, vec![SurfaceCommand::key_down(KeyStroke::ARROW_UP)]);
    }

    #[test]
    fn movement_keys_map_to_arrows() {
        let mut state = HextrisState::new(START_URL.to_string());
        assert_eq!(
            state.on_button(ButtonEvent::press(ControllerButton::Left)),
            vec![SurfaceCommand::key_down(KeyStroke::ARROW_LEFT)]
        );
        assert_eq!(
            state.on_button(ButtonEvent::press(ControllerButton::Down)),
            vec![SurfaceCommand::key_down(KeyStroke::ARROW_DOWN)]
        );
        assert_eq!(
            state.on_button(ButtonEvent::release(ControllerButton::Left)),
            vec![SurfaceCommand::key_up(KeyStroke::ARROW_LEFT)]
        );
    }

    #[test]
    fn up_is_not_mapped() {
        // Rotation comes from confirm presses, never from the d-pad.
        let mut state = HextrisState::new(START_URL.to_string());
        assert!(
            state
                .on_button(ButtonEvent::press(ControllerButton::Up))
                .is_empty()
        );
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
            ControllerButton::X,
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
