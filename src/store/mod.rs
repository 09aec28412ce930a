//! Dispatch store
//!
//! Holds one immutable state value and a list of listeners. Every mutation is
//! an action: a pure function from the current state to a [`Transition`].
//! Listeners only hear about transitions that actually changed something.

use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Outcome of an action
#[derive(Debug, Clone, PartialEq)]
pub enum Transition<S> {
    /// Nothing changed; no commit, no notification
    Unchanged,
    /// Replace the current state
    Changed(S),
}

impl<S> Transition<S> {
    pub fn is_changed(&self) -> bool {
        matches!(self, Transition::Changed(_))
    }

    /// The new state, or `current` when unchanged
    pub fn into_state_or(self, current: S) -> S {
        match self {
            Transition::Unchanged => current,
            Transition::Changed(next) => next,
        }
    }
}

/// Handle returned by [`Store::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<S> = Box<dyn FnMut(&S) + Send>;

/// Caller-owned state container
pub struct Store<S> {
    state: Arc<S>,
    listeners: Vec<(SubscriptionId, Listener<S>)>,
    next_id: u64,
}

impl<S> Store<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: Arc::new(initial),
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Shared handle to the current state
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&self.state)
    }

    /// Run `action` against the current state and commit the result.
    ///
    /// Returns `true` when the state was replaced.
    pub fn dispatch<F>(&mut self, action: F) -> bool
    where
        F: FnOnce(&S) -> Transition<S>,
    {
        match action(self.state.as_ref()) {
            Transition::Unchanged => {
                trace!("Action produced no change");
                false
            }
            Transition::Changed(next) => {
                self.state = Arc::new(next);
                trace!(listeners = self.listeners.len(), "State replaced, notifying");
                for (_, listener) in self.listeners.iter_mut() {
                    listener(self.state.as_ref());
                }
                true
            }
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&S) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; `false` if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<S: Default> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
