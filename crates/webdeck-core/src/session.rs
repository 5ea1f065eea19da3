use std::cell::Cell;
use std::rc::Rc;

use uuid::Uuid;

use crate::focus::BODY_START;
use crate::game_trait::GameRenderer;
use crate::registry::{GameId, GameRegistry, SharedState};

/// Cloneable close-request flag shared between the controller, the mounted
/// surface, and the hosting container.
///
/// Requesting close never tears anything down directly; the owning
/// controller honors the request on its next `poll_close`. That keeps the
/// close affordance safe to invoke from inside event processing, where
/// re-entering the controller would not be.
#[derive(Debug, Clone, Default)]
pub struct CloseHandle(Rc<Cell<bool>>);

impl CloseHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the owning controller to end the session.
    pub fn request(&self) {
        self.0.set(true);
    }

    pub fn is_requested(&self) -> bool {
        self.0.get()
    }
}

/// The live pairing of one game's state object and its renderer.
///
/// Both halves were produced by the same descriptor; the session exists
/// exactly from `activate` to the matching `close`.
pub struct Session {
    id: Uuid,
    game_id: GameId,
    state: SharedState,
    renderer: Box<dyn GameRenderer>,
    close: CloseHandle,
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    /// The renderable unit the host should mount.
    pub fn renderer(&self) -> &dyn GameRenderer {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> &mut dyn GameRenderer {
        self.renderer.as_mut()
    }

    /// Handle the host's close affordance invokes to end the session.
    pub fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }

    pub fn close_requested(&self) -> bool {
        self.close.is_requested()
    }
}

/// Owns the at-most-one active session and the catalog it launches from.
pub struct SessionController {
    registry: GameRegistry,
    active: Option<Session>,
}

impl SessionController {
    pub fn new(registry: GameRegistry) -> Self {
        Self {
            registry,
            active: None,
        }
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    pub fn active(&self) -> Option<&Session> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut Session> {
        self.active.as_mut()
    }

    /// Launch the game at `index` in the catalog, replacing any active
    /// session. The old session is fully torn down before the new state
    /// is constructed.
    ///
    /// A miss means the commit raced a catalog change; it is dropped
    /// quietly and nothing happens.
    pub fn activate(&mut self, index: usize) -> Option<&Session> {
        if index >= self.registry.len() {
            tracing::debug!(
                index,
                catalog = self.registry.len(),
                "Dropped commit outside the catalog"
            );
            return None;
        }
        self.close();

        let descriptor = self.registry.by_index(index)?;
        let close = CloseHandle::new();
        let handle = descriptor.make_state();
        let (state, renderer) = descriptor.make_renderer(handle, close.clone());
        let session = Session {
            id: Uuid::new_v4(),
            game_id: descriptor.id().clone(),
            state,
            renderer,
            close,
        };
        tracing::debug!(session = %session.id, game = %session.game_id, "Session started");
        self.active = Some(session);
        self.active.as_ref()
    }

    /// Resolve a committed grid slot into a catalog launch.
    ///
    /// Header slots belong to the shell's menu dispatcher and are left
    /// untouched; body slots map through the fixed header offset.
    pub fn activate_slot(&mut self, slot: usize) -> Option<&Session> {
        if slot < BODY_START {
            return None;
        }
        self.activate(slot - BODY_START)
    }

    /// Launch a game by id, for hosts that select outside the grid
    /// (e.g. a touch tap on a catalog cell).
    pub fn activate_id(&mut self, id: &GameId) -> Option<&Session> {
        let index = self
            .registry
            .all()
            .iter()
            .position(|descriptor| descriptor.id() == id)?;
        self.activate(index)
    }

    /// Tear down the active session: renderer first (unmount), then the
    /// state object. No-op when nothing is active.
    pub fn close(&mut self) {
        if let Some(mut session) = self.active.take() {
            session.renderer.teardown();
            session.state.borrow_mut().teardown();
            tracing::debug!(session = %session.id, game = %session.game_id, "Session closed");
        }
    }

    /// Honor a pending close request from the surface or the host.
    /// Returns whether a session was closed.
    pub fn poll_close(&mut self) -> bool {
        if self.active.as_ref().is_some_and(Session::close_requested) {
            self.close();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ButtonEvent, ControllerButton};
    use crate::test_helpers::{probe_descriptor, probe_log, probe_registry};

    #[test]
    fn activate_builds_a_paired_session() {
        let log = probe_log();
        let mut controller = SessionController::new(probe_registry(&["alpha", "beta"], &log));
        let session = controller.activate(1).expect("beta should resolve");
        assert_eq!(session.game_id(), &GameId::new("beta"));
        assert_eq!(session.renderer().content_url(), "https://games.example/beta/");
        assert!(controller.active().is_some());
    }

    #[test]
    fn activate_replaces_with_teardown_before_construction() {
        let log = probe_log();
        let mut controller = SessionController::new(probe_registry(&["alpha"], &log));
        controller.activate(0);
        controller.activate(0);
        assert_eq!(
            *log.borrow(),
            vec![
                "state:new",
                "surface:teardown",
                "state:teardown",
                "state:new",
            ]
        );
        assert!(controller.active().is_some());
    }

    #[test]
    fn close_is_idempotent() {
        let log = probe_log();
        let mut controller = SessionController::new(probe_registry(&["alpha"], &log));
        controller.close();
        assert!(log.borrow().is_empty());

        controller.activate(0);
        controller.close();
        controller.close();
        assert_eq!(
            log.borrow().iter().filter(|e| *e == "state:teardown").count(),
            1
        );
        assert!(controller.active().is_none());
    }

    #[test]
    fn out_of_range_commit_is_dropped() {
        let log = probe_log();
        let mut controller = SessionController::new(probe_registry(&["alpha"], &log));
        assert!(controller.activate(5).is_none());
        assert!(controller.active().is_none());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn header_slots_are_not_launches() {
        let log = probe_log();
        let mut controller = SessionController::new(probe_registry(&["alpha", "beta"], &log));
        for slot in 0..BODY_START {
            assert!(controller.activate_slot(slot).is_none());
        }
        // Slot 4 maps to catalog index 1.
        let session = controller.activate_slot(4).expect("slot 4 resolves");
        assert_eq!(session.game_id(), &GameId::new("beta"));
    }

    #[test]
    fn activate_by_id_replaces_the_running_game() {
        let log = probe_log();
        let mut controller = SessionController::new(probe_registry(&["alpha", "beta"], &log));
        controller.activate_id(&GameId::new("beta"));
        assert_eq!(controller.active().unwrap().game_id(), &GameId::new("beta"));

        controller.activate_id(&GameId::new("alpha"));
        assert_eq!(controller.active().unwrap().game_id(), &GameId::new("alpha"));

        assert!(controller.activate_id(&GameId::new("missing")).is_none());
        // An unknown id leaves the running game alone.
        assert_eq!(controller.active().unwrap().game_id(), &GameId::new("alpha"));
    }

    #[test]
    fn close_handle_round_trips_through_poll() {
        let log = probe_log();
        let mut controller = SessionController::new(probe_registry(&["alpha"], &log));
        controller.activate(0);
        assert!(!controller.poll_close());

        controller
            .active()
            .map(Session::close_handle)
            .expect("session is active")
            .request();
        assert!(controller.poll_close());
        assert!(controller.active().is_none());
        assert!(!controller.poll_close());
    }

    #[test]
    fn game_requested_close_travels_the_handle() {
        // The probe state emits Close on a Select press; the surface
        // converts it into a close request.
        let log = probe_log();
        let mut controller = SessionController::new(probe_registry(&["alpha"], &log));
        controller.activate(0);
        let commands = controller
            .active_mut()
            .expect("session is active")
            .renderer_mut()
            .forward_button(ButtonEvent::press(ControllerButton::Select));
        assert!(commands.is_empty());
        assert!(controller.poll_close());
    }

    #[test]
    fn probe_descriptor_metadata_is_exposed() {
        let log = probe_log();
        let descriptor = probe_descriptor("alpha", &log);
        assert_eq!(descriptor.content_url(), "https://games.example/alpha/");
        assert_eq!(descriptor.icon().0, "icon-alpha");
    }
}
