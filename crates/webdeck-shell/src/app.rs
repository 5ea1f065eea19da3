use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use webdeck_core::focus::{FocusNavigator, FocusOutcome};
use webdeck_core::game_trait::SurfaceCommand;
use webdeck_core::input::ButtonEvent;
use webdeck_core::registry::{GameId, GameRegistry};
use webdeck_core::repeat::HoldRepeater;
use webdeck_core::session::{Session, SessionController};

use crate::config::ShellConfig;

/// Menu actions bound to the three header cells, in slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuCommand {
    Library,
    Search,
    Settings,
}

impl MenuCommand {
    /// Command for a committed header slot, if the slot is one.
    pub fn for_slot(slot: usize) -> Option<Self> {
        match slot {
            0 => Some(Self::Library),
            1 => Some(Self::Search),
            2 => Some(Self::Settings),
            _ => None,
        }
    }
}

/// Observable results of feeding the shell input or time.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    /// The launcher cursor moved.
    FocusMoved(usize),
    /// A header cell was committed.
    MenuInvoked(MenuCommand),
    /// A game session started; its renderer is ready to mount.
    SessionStarted { game: GameId, session: Uuid },
    /// The active session ended; the host should unmount its surface.
    SessionClosed,
    /// Work for the mounted surface to execute.
    Surface(SurfaceCommand),
}

/// Session-scoped composition root.
///
/// Owns the focus navigator, the hold repeater, and the session
/// controller. One shell is constructed per launcher screen by the
/// embedding container and handed the decoded controller feed; nothing
/// here is a process-wide singleton.
///
/// While a session is active, every transition is forwarded to its
/// renderer; the launcher grid resumes receiving input when the session
/// closes.
pub struct Shell {
    navigator: FocusNavigator,
    repeater: HoldRepeater,
    sessions: SessionController,
    items_count: usize,
}

impl Shell {
    pub fn new(registry: GameRegistry, config: &ShellConfig) -> Self {
        Self {
            navigator: FocusNavigator::with_mode(config.grid_mode),
            repeater: HoldRepeater::new(config.repeat_initial_delay(), config.repeat_interval()),
            sessions: SessionController::new(registry),
            items_count: 0,
        }
    }

    /// The currently highlighted slot.
    pub fn focused(&self) -> usize {
        self.navigator.focused()
    }

    pub fn registry(&self) -> &GameRegistry {
        self.sessions.registry()
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.sessions.active()
    }

    pub fn items_count(&self) -> usize {
        self.items_count
    }

    /// Dynamic body size from the content loader. Negative counts are
    /// normalized to zero; the new size applies from the next transition.
    pub fn set_item_count(&mut self, count: i64) {
        self.items_count = count.max(0) as usize;
    }

    /// Route one decoded controller transition.
    pub fn handle_button(&mut self, event: ButtonEvent, now: Duration) -> Vec<ShellEvent> {
        if self.sessions.active().is_some() {
            return self.forward_to_session(event);
        }
        self.repeater.observe(event, now);
        self.navigate(event, false)
    }

    /// Advance time: synthesize held-direction repeats and honor pending
    /// close requests.
    pub fn tick(&mut self, now: Duration) -> Vec<ShellEvent> {
        let mut events = Vec::new();
        if self.sessions.poll_close() {
            events.push(ShellEvent::SessionClosed);
        }
        if self.sessions.active().is_none()
            && let Some(repeat) = self.repeater.poll(now)
        {
            events.extend(self.navigate(repeat, true));
        }
        events
    }

    /// Host-initiated launch by id, bypassing the grid (touch selection).
    pub fn launch(&mut self, id: &GameId) -> Vec<ShellEvent> {
        self.repeater.cancel();
        match self.sessions.activate_id(id) {
            Some(session) => vec![ShellEvent::SessionStarted {
                game: session.game_id().clone(),
                session: session.id(),
            }],
            None => Vec::new(),
        }
    }

    /// Host-initiated close of the active session. Idempotent.
    pub fn close_active(&mut self) -> Vec<ShellEvent> {
        if self.sessions.active().is_some() {
            self.sessions.close();
            vec![ShellEvent::SessionClosed]
        } else {
            Vec::new()
        }
    }

    fn forward_to_session(&mut self, event: ButtonEvent) -> Vec<ShellEvent> {
        let commands = self
            .sessions
            .active_mut()
            .map(|session| session.renderer_mut().forward_button(event))
            .unwrap_or_default();
        let mut events: Vec<ShellEvent> = commands.into_iter().map(ShellEvent::Surface).collect();
        if self.sessions.poll_close() {
            events.push(ShellEvent::SessionClosed);
        }
        events
    }

    fn navigate(&mut self, event: ButtonEvent, synthesized: bool) -> Vec<ShellEvent> {
        match self.navigator.handle(event, self.items_count) {
            FocusOutcome::Unchanged => {
                // A synthesized repeat that hits a boundary ends the hold.
                if synthesized {
                    self.repeater.cancel();
                }
                Vec::new()
            },
            FocusOutcome::Moved(slot) => vec![ShellEvent::FocusMoved(slot)],
            FocusOutcome::Commit(slot) => self.commit(slot),
        }
    }

    fn commit(&mut self, slot: usize) -> Vec<ShellEvent> {
        if let Some(menu) = MenuCommand::for_slot(slot) {
            return vec![ShellEvent::MenuInvoked(menu)];
        }
        match self.sessions.activate_slot(slot) {
            Some(session) => {
                let started = ShellEvent::SessionStarted {
                    game: session.game_id().clone(),
                    session: session.id(),
                };
                self.repeater.cancel();
                vec![started]
            },
            None => Vec::new(),
        }
    }
}
