use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Authenticated user handle supplied by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
}

impl Identity {
    pub fn new<S: Into<String>>(id: S, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            email,
        }
    }

    /// The email to look the profile up by. Empty strings count as absent.
    pub fn lookup_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .filter(|email| !email.is_empty())
    }
}

type Listener = Rc<dyn Fn(Option<&Identity>)>;

struct Registry {
    value: RefCell<Option<Identity>>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_id: Cell<u64>,
}

/// Holds the current identity and notifies subscribers when it changes.
///
/// Cloning yields another handle to the same cell.
#[derive(Clone)]
pub struct IdentityCell {
    inner: Rc<Registry>,
}

impl IdentityCell {
    pub fn new(initial: Option<Identity>) -> Self {
        Self {
            inner: Rc::new(Registry {
                value: RefCell::new(initial),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn get(&self) -> Option<Identity> {
        self.inner.value.borrow().clone()
    }

    /// Replace the identity, notifying listeners in subscription order.
    ///
    /// Setting an equal value is a no-op: re-emitting the same identity,
    /// e.g. after a token refresh, does not notify and so does not reload.
    pub fn set(&self, value: Option<Identity>) {
        if *self.inner.value.borrow() == value {
            log::trace!("identity: unchanged, skipping notification");
            return;
        }
        *self.inner.value.borrow_mut() = value;

        // Snapshot so listeners may subscribe or unsubscribe while notified
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        log::debug!(
            "identity: changed, notifying {} listeners",
            listeners.len()
        );

        let current = self.get();
        for listener in listeners {
            listener(current.as_ref());
        }
    }

    /// Register a listener. It is invoked right away with the current value
    /// and again on every change until the subscription is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(Option<&Identity>) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let listener: Listener = Rc::new(listener);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, listener.clone()));

        let current = self.get();
        listener(current.as_ref());

        Subscription {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl Default for IdentityCell {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Handle of a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .listeners
                .borrow_mut()
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seen() -> (Rc<RefCell<Vec<Option<String>>>>, impl Fn(Option<&Identity>))
    {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let listener = move |identity: Option<&Identity>| {
            sink.borrow_mut()
                .push(identity.and_then(|i| i.email.clone()));
        };
        (log, listener)
    }

    #[test]
    fn subscribe_fires_immediately_even_when_absent() {
        let cell = IdentityCell::new(None);
        let (log, listener) = seen();

        let _subscription = cell.subscribe(listener);

        assert_eq!(*log.borrow(), vec![None]);
    }

    #[test]
    fn notifies_on_change_only() {
        let cell = IdentityCell::new(None);
        let (log, listener) = seen();
        let _subscription = cell.subscribe(listener);

        let b = Identity::new("1", Some("b@x.com".to_owned()));
        cell.set(Some(b.clone()));
        cell.set(Some(b));
        cell.set(None);

        assert_eq!(
            *log.borrow(),
            vec![None, Some("b@x.com".to_owned()), None]
        );
    }

    #[test]
    fn dropped_subscription_is_not_notified() {
        let cell = IdentityCell::default();
        let (log, listener) = seen();
        let subscription = cell.subscribe(listener);
        assert_eq!(cell.listener_count(), 1);

        subscription.unsubscribe();
        assert_eq!(cell.listener_count(), 0);

        cell.set(Some(Identity::new("1", None)));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn empty_email_is_not_a_lookup_key() {
        assert_eq!(
            Identity::new("1", Some(String::new())).lookup_email(),
            None
        );
        assert_eq!(Identity::new("1", None).lookup_email(), None);
        assert_eq!(
            Identity::new("1", Some("a@x.com".to_owned())).lookup_email(),
            Some("a@x.com")
        );
    }
}
