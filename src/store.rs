use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tokio::sync::mpsc;
use tokio::task::LocalSet;

use crate::identity::{Identity, IdentityCell, Subscription};
use crate::profile::Profile;
use crate::service::ProfileService;
use crate::{ProfileError, Result};

struct Inner<S> {
    service: S,
    identity: IdentityCell,
    profile: RefCell<Option<Rc<Profile>>>,
    fetches: Cell<usize>,
}

impl<S: ProfileService> Inner<S> {
    async fn load(&self, identity: Option<Identity>) -> Result<Rc<Profile>> {
        let identity = identity.ok_or(ProfileError::NoIdentity)?;
        let email = identity
            .lookup_email()
            .ok_or(ProfileError::NoEmail)?;

        self.fetches.set(self.fetches.get() + 1);
        let record = self.service.fetch_profile(email).await?;

        let profile = Rc::new(Profile::from(record));
        self.profile.replace(Some(profile.clone()));
        Ok(profile)
    }
}

/// Current user's display profile, kept in sync with an [`IdentityCell`].
///
/// The store lives on a single thread. Reloads triggered by [`watch`]
/// run as local tasks of the given [`LocalSet`] and only make progress
/// while it is driven. Reloads are neither ordered nor cancelled: when
/// identity changes overlap, whichever fetch completes last decides the
/// profile.
///
/// [`watch`]: ProfileStore::watch
pub struct ProfileStore<S> {
    inner: Rc<Inner<S>>,
}

impl<S> Clone for ProfileStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: ProfileService + 'static> ProfileStore<S> {
    pub fn new(service: S, identity: IdentityCell) -> Self {
        Self {
            inner: Rc::new(Inner {
                service,
                identity,
                profile: RefCell::new(None),
                fetches: Cell::new(0),
            }),
        }
    }

    /// Snapshot of the last successfully loaded profile.
    pub fn current_profile(&self) -> Option<Rc<Profile>> {
        self.inner.profile.borrow().clone()
    }

    /// Reload the profile of the current identity. Never fails: on any
    /// error the previous profile is kept.
    pub async fn reload(&self) {
        let outcome = self.try_reload().await;
        // Failures are absorbed here, readers keep the stale profile
        settle(outcome);
    }

    /// Same as [`reload`](Self::reload) but reports why a load did not apply.
    pub async fn try_reload(&self) -> Result<Rc<Profile>> {
        let identity = self.inner.identity.get();
        self.inner.load(identity).await
    }

    /// Reload on every identity change, starting with the current value.
    ///
    /// Changes are queued to a driver task on `local`, so notifying the
    /// identity cell never needs a runtime context. Queued changes are
    /// loaded the next time `local` is driven.
    pub fn watch(&self, local: &LocalSet) -> Subscription {
        let (tx, mut rx) = mpsc::unbounded_channel::<Option<Identity>>();

        let store = Rc::downgrade(&self.inner);
        local.spawn_local(async move {
            while let Some(identity) = rx.recv().await {
                let Some(inner) = store.upgrade() else {
                    log::trace!("profile: store dropped, stopping watch");
                    return;
                };
                // One task per change so slow fetches do not hold back
                // later ones
                tokio::task::spawn_local(async move {
                    let outcome = inner.load(identity).await;
                    // Failures are absorbed here, readers keep the stale
                    // profile
                    settle(outcome);
                });
            }
            log::trace!("profile: subscription dropped, stopping watch");
        });

        self.inner.identity.subscribe(move |identity| {
            // Fails only once the LocalSet and its driver are gone, then
            // there is nobody left to reload for
            let _ = tx.send(identity.cloned());
        })
    }

    /// Number of fetches issued to the data service.
    pub fn reload_count(&self) -> usize {
        self.inner.fetches.get()
    }
}

fn settle(outcome: Result<Rc<Profile>>) {
    match outcome {
        Ok(profile) => {
            log::debug!("profile: loaded for {:?}", profile.email)
        }
        Err(e) if e.is_skip() => {
            log::debug!("profile: reload skipped, {}", e)
        }
        Err(e) => log::warn!("profile: reload failed, {}", e),
    }
}
