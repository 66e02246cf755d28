//! Identity <-> access-code registry.
//!
//! One live code per identity, held in a pair of mirrored maps so lookups go
//! both ways in constant time. Every mutation is persisted through a
//! [`store::RegistryStore`]; persistence failures are logged and swallowed so
//! a full disk degrades durability, never availability.

pub mod store;

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{AccessCode, UserId};

use self::store::{RegistryDocument, RegistryStore};

/// Result of [`LinkRegistry::get_or_create`]: the live code plus whether this
/// call minted it. Callers phrase their reply differently for a brand new
/// link than for a repeat lookup.
#[derive(Clone, Debug)]
pub struct IssuedCode {
    pub code: AccessCode,
    pub created: bool,
}

#[derive(Debug, Default)]
struct RegistryState {
    user_to_code: HashMap<UserId, AccessCode>,
    code_to_user: HashMap<AccessCode, UserId>,
}

impl RegistryState {
    /// Rebuild from a persisted document, keeping only pairs that invert
    /// cleanly. Hand edits and partial writes may leave orphaned halves;
    /// dropping them keeps the mirror invariant true from the first lookup.
    fn from_document(doc: &RegistryDocument) -> Self {
        let mut state = Self::default();
        for (user_key, code) in &doc.user_to_code {
            let Ok(user) = user_key.parse::<i64>() else {
                continue;
            };
            if doc.code_to_user.get(code).map(String::as_str) != Some(user_key.as_str()) {
                continue;
            }
            state.bind(UserId(user), AccessCode(code.clone()));
        }
        state
    }

    fn to_document(&self) -> RegistryDocument {
        let mut doc = RegistryDocument::default();
        for (user, code) in &self.user_to_code {
            doc.user_to_code.insert(user.0.to_string(), code.0.clone());
            doc.code_to_user.insert(code.0.clone(), user.0.to_string());
        }
        doc
    }

    fn bind(&mut self, user: UserId, code: AccessCode) {
        self.user_to_code.insert(user, code.clone());
        self.code_to_user.insert(code, user);
    }

    fn unbind(&mut self, user: UserId) {
        if let Some(old) = self.user_to_code.remove(&user) {
            self.code_to_user.remove(&old);
        }
    }
}

/// Bidirectional identity <-> code registry.
///
/// All reads and read-modify-write sequences go through one async lock, so a
/// rotation is atomic as far as any resolver can observe: either the old
/// binding is visible or the new one, never a torn pair.
pub struct LinkRegistry {
    state: Mutex<RegistryState>,
    store: Box<dyn RegistryStore>,
}

impl LinkRegistry {
    /// Build a registry over `store`, hydrating from whatever snapshot it
    /// holds. A missing document means an empty registry; a corrupt one is
    /// logged and also means an empty registry. Startup never fails here.
    pub fn new(store: Box<dyn RegistryStore>) -> Self {
        let doc = match store.load() {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("[REGISTRY] failed to load bindings, starting empty: {e}");
                RegistryDocument::default()
            }
        };
        Self {
            state: Mutex::new(RegistryState::from_document(&doc)),
            store,
        }
    }

    /// Registry with no durable backing. Bindings last until the process
    /// exits.
    pub fn in_memory() -> Self {
        Self::new(Box::new(store::MemoryStore))
    }

    /// Return the owner's live code, minting one if they have none.
    /// Idempotent between rotations.
    pub async fn get_or_create(&self, owner: UserId) -> IssuedCode {
        let mut state = self.state.lock().await;
        if let Some(code) = state.user_to_code.get(&owner) {
            return IssuedCode {
                code: code.clone(),
                created: false,
            };
        }
        let code = AccessCode::generate();
        state.bind(owner, code.clone());
        self.persist(&state);
        IssuedCode {
            code,
            created: true,
        }
    }

    /// Invalidate the owner's current code, if any, and issue a fresh one.
    /// Works as first-time issuance for owners who never had a link.
    pub async fn rotate(&self, owner: UserId) -> AccessCode {
        let mut state = self.state.lock().await;
        state.unbind(owner);
        let code = AccessCode::generate();
        state.bind(owner, code.clone());
        self.persist(&state);
        code
    }

    /// Resolve a code to its owner. `None` for codes never issued or rotated
    /// away. Never mutates anything.
    pub async fn resolve(&self, code: &AccessCode) -> Option<UserId> {
        self.state.lock().await.code_to_user.get(code).copied()
    }

    fn persist(&self, state: &RegistryState) {
        if let Err(e) = self.store.save(&state.to_document()) {
            eprintln!("[REGISTRY] failed to persist bindings: {e}");
        }
    }
}
