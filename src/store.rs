//! Reducer-driven state container with change subscriptions

use crate::error::Result;

/// Pure state transition
pub type Reducer<S, A> = fn(&S, A) -> Result<S>;

/// Handle returned by [`Store::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<S> = Box<dyn FnMut(&S)>;

/// Holds one state value, applies actions through a reducer and tells
/// subscribers about every replacement
pub struct Store<S, A> {
    state: S,
    reducer: Reducer<S, A>,
    listeners: Vec<(SubscriptionId, Listener<S>)>,
    next_id: u64,
}

impl<S, A> Store<S, A> {
    pub fn new(state: S, reducer: Reducer<S, A>) -> Self {
        Self {
            state,
            reducer,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Apply `action` through the reducer. On error the state is untouched.
    pub fn dispatch(&mut self, action: A) -> Result<()> {
        let next = (self.reducer)(&self.state, action)?;
        self.state = next;
        self.notify();
        Ok(())
    }

    /// Overwrite the state without going through the reducer
    pub fn replace(&mut self, state: S) {
        self.state = state;
        self.notify();
    }

    pub fn subscribe<F>(&mut self, on_change: F) -> SubscriptionId
    where
        F: FnMut(&S) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(on_change)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.state);
        }
    }
}
