use std::cell::RefCell;
use std::rc::Rc;

use webdeck_core::game_trait::{
    GameRenderer, KeyLatch, KeyStroke, Orientation, SurfaceCommand, WebGameState,
};
use webdeck_core::input::{ButtonEvent, ControllerButton};
use webdeck_core::registry::GameDescriptor;
use webdeck_core::session::CloseHandle;
use webdeck_core::surface_boilerplate;

const START_URL: &str = "https://hexgl.bkcore.com/play/";

const KEY_A: KeyStroke = KeyStroke {
    key_code: 65,
    key: "a",
    code: "KeyA",
};
const KEY_D: KeyStroke = KeyStroke {
    key_code: 68,
    key: "d",
    code: "KeyD",
};

/// Kicks every loaded sound once a user gesture has arrived; browsers
/// refuse autoplay before that.
const AUDIO_UNLOCK_SCRIPT: &str = "(function(){\n  for (var id in bkcore.Audio.sounds) {\n    var sound = bkcore.Audio.sounds[id];\n    if (sound.play) {\n      sound.play().catch(function(e) { console.log('Audio play failed:', e); });\n    }\n  }\n})();";

/// Session state for the embedded HexGL racer.
pub struct HexGlState {
    url: String,
    keys: KeyLatch,
    audio_unlocked: bool,
}

impl HexGlState {
    fn new(url: String) -> Self {
        Self {
            url,
            keys: KeyLatch::new(),
            audio_unlocked: false,
        }
    }

    fn stroke_for(button: ControllerButton) -> Option<KeyStroke> {
        match button {
            ControllerButton::Up => Some(KeyStroke::ARROW_UP),
            ControllerButton::Down => Some(KeyStroke::ARROW_DOWN),
            ControllerButton::Left => Some(KeyStroke::ARROW_LEFT),
            ControllerButton::Right => Some(KeyStroke::ARROW_RIGHT),
            // Air-brake keys on the face buttons, mirroring keyboard play.
            ControllerButton::A => Some(KEY_D),
            ControllerButton::Y => Some(KEY_A),
            _ => None,
        }
    }
}

impl WebGameState for HexGlState {
    fn content_url(&self) -> &str {
        &self.url
    }

    fn on_button(&mut self, event: ButtonEvent) -> Vec<SurfaceCommand> {
        let mut commands = Vec::new();
        if event.pressed && !self.audio_unlocked {
            self.audio_unlocked = true;
            commands.push(SurfaceCommand::Script(AUDIO_UNLOCK_SCRIPT.to_string()));
        }

        if matches!(
            event.button,
            ControllerButton::X | ControllerButton::Select | ControllerButton::Menu
        ) {
            if event.pressed {
                commands.push(SurfaceCommand::Close);
            }
            return commands;
        }

        if let Some(stroke) = Self::stroke_for(event.button)
            && let Some(command) = self.keys.apply(stroke, event.pressed)
        {
            commands.push(command);
        }
        commands
    }

    fn teardown(&mut self) {
        self.keys.drain();
    }
}

/// Landscape web surface hosting HexGL.
pub struct HexGlSurface {
    state: Rc<RefCell<HexGlState>>,
    on_close: CloseHandle,
}

impl GameRenderer for HexGlSurface {
    surface_boilerplate!();

    fn orientation(&self) -> Orientation {
        Orientation::Landscape
    }
}

/// Catalog descriptor for HexGL.
pub fn descriptor() -> GameDescriptor {
    GameDescriptor::new(
        "hexgl",
        "HexGL",
        START_URL,
        "icon-hexgl",
        || HexGlState::new(START_URL.to_string()),
        |state, on_close| HexGlSurface { state, on_close },
    )
}
