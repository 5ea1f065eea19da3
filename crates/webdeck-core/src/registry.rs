use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::game_trait::{GameRenderer, WebGameState};
use crate::session::CloseHandle;

/// Unique identifier for a registered game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to a catalog icon asset; the core never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconRef(pub String);

/// Shared, type-erased session state.
pub type SharedState = Rc<RefCell<dyn WebGameState>>;

type StateFactory = Box<dyn Fn() -> GameStateHandle>;
type RendererBinder = Box<dyn FnOnce(CloseHandle) -> Box<dyn GameRenderer>>;

/// A freshly constructed game state awaiting its renderer.
///
/// The handle carries the erased state together with a one-shot renderer
/// binder captured by the same descriptor, so a renderer can only ever be
/// attached to the state it was constructed alongside. The pairing is
/// fixed when the descriptor is built; no downcast exists that could
/// cross two games.
pub struct GameStateHandle {
    shared: SharedState,
    bind: RendererBinder,
}

impl GameStateHandle {
    /// The content locator the state was built for.
    pub fn content_url(&self) -> String {
        self.shared.borrow().content_url().to_string()
    }

    pub(crate) fn bind_renderer(self, on_close: CloseHandle) -> (SharedState, Box<dyn GameRenderer>) {
        let renderer = (self.bind)(on_close);
        (self.shared, renderer)
    }
}

/// Static, immutable description of one pluggable game.
pub struct GameDescriptor {
    id: GameId,
    name: String,
    content_url: String,
    icon: IconRef,
    make_state: StateFactory,
}

impl GameDescriptor {
    /// Build a descriptor from typed constructors.
    ///
    /// `make_state` and `make_renderer` are erased together, which is what
    /// guarantees the renderer always receives the concrete state type it
    /// was written for.
    pub fn new<S, R>(
        id: impl Into<String>,
        name: impl Into<String>,
        content_url: impl Into<String>,
        icon: impl Into<String>,
        make_state: impl Fn() -> S + 'static,
        make_renderer: impl Fn(Rc<RefCell<S>>, CloseHandle) -> R + Clone + 'static,
    ) -> Self
    where
        S: WebGameState + 'static,
        R: GameRenderer + 'static,
    {
        let factory: StateFactory = Box::new(move || {
            let state = Rc::new(RefCell::new(make_state()));
            let shared: SharedState = state.clone();
            let make_renderer = make_renderer.clone();
            let bind: RendererBinder =
                Box::new(move |on_close| Box::new(make_renderer(state, on_close)));
            GameStateHandle { shared, bind }
        });
        Self {
            id: GameId::new(id),
            name: name.into(),
            content_url: content_url.into(),
            icon: IconRef(icon.into()),
            make_state: factory,
        }
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_url(&self) -> &str {
        &self.content_url
    }

    pub fn icon(&self) -> &IconRef {
        &self.icon
    }

    /// Construct a fresh, independently owned session state.
    pub fn make_state(&self) -> GameStateHandle {
        (self.make_state)()
    }

    /// Bind a renderer to a state produced by this descriptor, threading
    /// the close handle through to the surface unchanged.
    pub fn make_renderer(
        &self,
        state: GameStateHandle,
        on_close: CloseHandle,
    ) -> (SharedState, Box<dyn GameRenderer>) {
        state.bind_renderer(on_close)
    }
}

impl fmt::Debug for GameDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("content_url", &self.content_url)
            .field("icon", &self.icon)
            .finish_non_exhaustive()
    }
}

/// Ordered catalog of game descriptors.
///
/// Insertion order is display order. The registry is read-only after
/// construction; changing the catalog means building a new one.
#[derive(Debug, Default)]
pub struct GameRegistry {
    games: Vec<GameDescriptor>,
}

impl GameRegistry {
    /// Build a registry, dropping any descriptor whose id repeats an
    /// earlier entry.
    pub fn new(games: Vec<GameDescriptor>) -> Self {
        let mut unique: Vec<GameDescriptor> = Vec::with_capacity(games.len());
        for game in games {
            if unique.iter().any(|existing| existing.id() == game.id()) {
                tracing::warn!(id = %game.id(), "Dropped duplicate game descriptor");
                continue;
            }
            unique.push(game);
        }
        Self { games: unique }
    }

    /// All descriptors in display order.
    pub fn all(&self) -> &[GameDescriptor] {
        &self.games
    }

    /// Descriptor at a 0-based catalog position.
    pub fn by_index(&self, index: usize) -> Option<&GameDescriptor> {
        self.games.get(index)
    }

    pub fn by_id(&self, id: &GameId) -> Option<&GameDescriptor> {
        self.games.iter().find(|game| game.id() == id)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
