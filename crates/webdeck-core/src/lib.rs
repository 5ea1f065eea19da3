pub mod focus;
pub mod game_trait;
pub mod input;
pub mod registry;
pub mod repeat;
pub mod session;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::focus::{FocusNavigator, FocusOutcome};
    use crate::game_trait::{GameRenderer, SurfaceCommand, WebGameState};
    use crate::input::{ButtonEvent, ControllerButton};
    use crate::registry::{GameDescriptor, GameRegistry};
    use crate::session::CloseHandle;

    /// Shared log of lifecycle events recorded by probe plugins.
    pub type ProbeLog = Rc<RefCell<Vec<String>>>;

    pub fn probe_log() -> ProbeLog {
        Rc::new(RefCell::new(Vec::new()))
    }

    /// Minimal game state used to observe descriptor and session plumbing.
    /// Emits a `Close` command on a Select press.
    pub struct ProbeState {
        url: String,
        log: ProbeLog,
    }

    impl WebGameState for ProbeState {
        fn content_url(&self) -> &str {
            &self.url
        }

        fn on_button(&mut self, event: ButtonEvent) -> Vec<SurfaceCommand> {
            if event.button == ControllerButton::Select && event.pressed {
                return vec![SurfaceCommand::Close];
            }
            Vec::new()
        }

        fn teardown(&mut self) {
            self.log.borrow_mut().push("state:teardown".into());
        }
    }

    /// Surface paired with `ProbeState`.
    pub struct ProbeSurface {
        state: Rc<RefCell<ProbeState>>,
        on_close: CloseHandle,
        log: ProbeLog,
    }

    impl GameRenderer for ProbeSurface {
        crate::surface_boilerplate!();

        fn teardown(&mut self) {
            self.log.borrow_mut().push("surface:teardown".into());
        }
    }

    /// Descriptor wired to the probe state and surface, recording
    /// lifecycle events into `log`.
    pub fn probe_descriptor(id: &str, log: &ProbeLog) -> GameDescriptor {
        let url = format!("https://games.example/{id}/");
        let state_log = Rc::clone(log);
        let surface_log = Rc::clone(log);
        let state_url = url.clone();
        GameDescriptor::new(
            id,
            id.to_uppercase(),
            url,
            format!("icon-{id}"),
            move || {
                state_log.borrow_mut().push("state:new".into());
                ProbeState {
                    url: state_url.clone(),
                    log: Rc::clone(&state_log),
                }
            },
            move |state, on_close| ProbeSurface {
                state,
                on_close,
                log: Rc::clone(&surface_log),
            },
        )
    }

    /// Registry of probe descriptors with the given ids.
    pub fn probe_registry(ids: &[&str], log: &ProbeLog) -> GameRegistry {
        GameRegistry::new(ids.iter().map(|id| probe_descriptor(id, log)).collect())
    }

    /// Press each button in order, returning the last outcome.
    pub fn drive(
        navigator: &mut FocusNavigator,
        buttons: &[ControllerButton],
        items_count: usize,
    ) -> FocusOutcome {
        let mut outcome = FocusOutcome::Unchanged;
        for &button in buttons {
            outcome = navigator.handle(ButtonEvent::press(button), items_count);
        }
        outcome
    }

    // ================================================================
    // Plugin Contract Tests
    // ================================================================
    // Generic suite every game plugin must pass. Game crates call these
    // from their own #[cfg(test)] modules with a concrete descriptor.

    /// A fresh state must expose the exact content locator of its
    /// descriptor.
    pub fn contract_state_exposes_content_url(descriptor: &GameDescriptor) {
        let state = descriptor.make_state();
        assert_eq!(
            state.content_url(),
            descriptor.content_url(),
            "state must be built for the descriptor's content URL"
        );
    }

    /// The renderer must report the URL of the exact state it was bound
    /// to, which is the descriptor's.
    pub fn contract_renderer_binds_same_state(descriptor: &GameDescriptor) {
        let handle = descriptor.make_state();
        let (state, renderer) = descriptor.make_renderer(handle, CloseHandle::new());
        assert_eq!(renderer.content_url(), state.borrow().content_url());
        assert_eq!(renderer.content_url(), descriptor.content_url());
    }

    /// Pressing a close-chord button must raise the close request, and the
    /// `Close` command must not leak to the surface.
    pub fn contract_close_chord_requests_close(
        descriptor: &GameDescriptor,
        close_button: ControllerButton,
    ) {
        let close = CloseHandle::new();
        let (_state, mut renderer) = descriptor.make_renderer(descriptor.make_state(), close.clone());
        let commands = renderer.forward_button(ButtonEvent::press(close_button));
        assert!(
            close.is_requested(),
            "{close_button:?} press must request close"
        );
        assert!(
            !commands
                .iter()
                .any(|command| matches!(command, SurfaceCommand::Close)),
            "Close must be consumed by the renderer, not forwarded"
        );
    }

    /// Releasing a close-chord button must not end the session.
    pub fn contract_release_never_closes(
        descriptor: &GameDescriptor,
        close_button: ControllerButton,
    ) {
        let close = CloseHandle::new();
        let (_state, mut renderer) = descriptor.make_renderer(descriptor.make_state(), close.clone());
        renderer.forward_button(ButtonEvent::release(close_button));
        assert!(
            !close.is_requested(),
            "{close_button:?} release must not request close"
        );
    }

    /// A second press of a latched key button must not double-fire the
    /// key-down into the page.
    pub fn contract_repeated_press_is_latched(
        descriptor: &GameDescriptor,
        button: ControllerButton,
    ) {
        let (_state, mut renderer) =
            descriptor.make_renderer(descriptor.make_state(), CloseHandle::new());
        renderer.forward_button(ButtonEvent::press(button));
        let second = renderer.forward_button(ButtonEvent::press(button));
        assert!(
            !second.iter().any(|command| {
                matches!(
                    command,
                    SurfaceCommand::Key {
                        transition: crate::game_trait::KeyTransition::Down,
                        ..
                    }
                )
            }),
            "{button:?} held press must not re-fire key-down"
        );
    }
}
