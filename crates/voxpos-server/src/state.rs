//! Application state: catalog, session carts and the voice assistant

use rustc_hash::FxHashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use voxpos_ai::{OrderAssistant, Prompts};
use voxpos_cart::Cart;
use voxpos_driver::TurnConfig;
use voxpos_menu::Catalog;

/// Session used when a request does not name one.
pub const DEFAULT_SESSION: &str = "default";

/// Handle to one session's cart. Holding the lock serializes turns.
pub type SessionCart = Arc<Mutex<Cart>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Menu, read on every turn, written by the menu API
    pub catalog: Arc<RwLock<Catalog>>,
    /// Session registry
    pub sessions: Arc<RwLock<FxHashMap<String, SessionCart>>>,
    /// Voice collaborators; `None` when no API key is configured
    pub assistant: Option<Arc<OrderAssistant>>,
    pub turn_config: TurnConfig,
}

impl AppState {
    pub fn new(catalog: Catalog, assistant: Option<OrderAssistant>) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            sessions: Arc::new(RwLock::new(FxHashMap::default())),
            assistant: assistant.map(Arc::new),
            turn_config: TurnConfig::default(),
        }
    }

    pub fn with_turn_config(mut self, config: TurnConfig) -> Self {
        self.turn_config = config;
        self
    }

    /// Get the cart for `id`, creating an empty one on first use.
    pub async fn session(&self, id: &str) -> SessionCart {
        if let Some(cart) = self.sessions.read().await.get(id) {
            return cart.clone();
        }
        self.sessions
            .write()
            .await
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Cart::new())))
            .clone()
    }

    /// Existing session only.
    pub async fn existing_session(&self, id: &str) -> Option<SessionCart> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Drop a session from the registry, returning its cart handle.
    pub async fn end_session(&self, id: &str) -> Option<SessionCart> {
        self.sessions.write().await.remove(id)
    }

    /// Prompts for the catalog as it is right now.
    pub async fn prompts(&self) -> Prompts {
        Prompts::for_catalog(&*self.catalog.read().await)
    }
}
