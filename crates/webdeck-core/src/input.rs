use serde::{Deserialize, Serialize};

/// Physical buttons reported by the paired controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerButton {
    Up,
    UpLeft,
    UpRight,
    Down,
    DownLeft,
    DownRight,
    Left,
    Right,
    A,
    B,
    X,
    Y,
    Select,
    Start,
    Menu,
}

impl ControllerButton {
    /// Every button the transport can report, for enumeration in tests
    /// and host-side mapping tables.
    pub const ALL: [ControllerButton; 15] = [
        Self::Up,
        Self::UpLeft,
        Self::UpRight,
        Self::Down,
        Self::DownLeft,
        Self::DownRight,
        Self::Left,
        Self::Right,
        Self::A,
        Self::B,
        Self::X,
        Self::Y,
        Self::Select,
        Self::Start,
        Self::Menu,
    ];
}

/// One decoded button transition from the controller transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEvent {
    pub button: ControllerButton,
    pub pressed: bool,
}

impl ButtonEvent {
    pub fn press(button: ControllerButton) -> Self {
        Self {
            button,
            pressed: true,
        }
    }

    pub fn release(button: ControllerButton) -> Self {
        Self {
            button,
            pressed: false,
        }
    }
}

/// Logical action classes the launcher grid reacts to.
///
/// The grid only distinguishes the four cardinal directions and a confirm
/// class; diagonals and system buttons collapse to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavAction {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Other,
}

impl From<ControllerButton> for NavAction {
    fn from(button: ControllerButton) -> Self {
        match button {
            ControllerButton::Up => Self::Up,
            ControllerButton::Down => Self::Down,
            ControllerButton::Left => Self::Left,
            ControllerButton::Right => Self::Right,
            ControllerButton::A | ControllerButton::B | ControllerButton::X | ControllerButton::Y => {
                Self::Confirm
            },
            _ => Self::Other,
        }
    }
}

impl NavAction {
    /// Whether this action moves the cursor.
    pub fn is_directional(self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }
}
