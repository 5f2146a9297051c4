//! The student's identity record, persisted as one JSON envelope.
//!
//! `IdentityStore` is an explicitly owned container: whoever needs the
//! profile gets an `Rc<IdentityStore<_>>` handed in, and can subscribe to be
//! told when `set` replaces it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use school_dash_shared::store_state::PersistedProfile;
use school_dash_shared::{DashResult, UserProfile};

use crate::storage::KeyValueStore;

type Listener = Rc<dyn Fn(Option<&UserProfile>)>;

/// Handle returned by [`IdentityStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

pub struct IdentityStore<S: KeyValueStore> {
    storage: S,
    key: String,
    profile: RefCell<Option<UserProfile>>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_id: Cell<u64>,
}

impl<S: KeyValueStore> IdentityStore<S> {
    /// Read the stored profile back; missing or malformed payloads load as absent
    pub fn load(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let profile = match storage.get_json::<PersistedProfile>(&key) {
            Ok(Some(envelope)) => envelope.into_profile(),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Ignoring unreadable profile under '{key}': {e}");
                None
            }
        };

        if let Some(profile) = &profile {
            let report = profile.validate();
            for error in &report.errors {
                log::warn!("Stored profile incomplete: {error}");
            }
            for warning in &report.warnings {
                log::debug!("Stored profile: {warning}");
            }
        }

        log::debug!("Identity store loaded (profile present: {})", profile.is_some());

        Self {
            storage,
            key,
            profile: RefCell::new(profile),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn get(&self) -> Option<UserProfile> {
        self.profile.borrow().clone()
    }

    /// Replace the whole profile, write it through, and notify subscribers.
    ///
    /// The in-memory profile is replaced even when the write fails; the
    /// write error is returned so the caller can surface it.
    pub fn set(&self, profile: UserProfile) -> DashResult<()> {
        let persisted = self
            .storage
            .set_json(&self.key, &PersistedProfile::new(Some(profile.clone())));
        if let Err(e) = &persisted {
            log::error!("Failed to persist profile: {e}");
        }

        *self.profile.borrow_mut() = Some(profile);
        self.notify();

        persisted
    }

    pub fn subscribe(&self, listener: impl Fn(Option<&UserProfile>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn notify(&self) {
        // Listeners may call back into the store, so no borrow is held while they run
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        let profile = self.get();

        for listener in listeners {
            listener(profile.as_ref());
        }
    }
}
