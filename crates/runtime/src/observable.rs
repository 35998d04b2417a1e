/// Handle returned by [`Observable::subscribe`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Box<dyn FnMut(&T)>;

/// A value that pushes itself to subscribers whenever it changes.
///
/// Owners recompute the value from its inputs and call [`Observable::set`];
/// setting an equal value is a no-op, so subscribers only see real changes.
/// Subscribers run synchronously, in subscription order.
pub struct Observable<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
}

impl<T: PartialEq> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Store `value`; returns `true` (and notifies) if it differs.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        for (_, f) in &mut self.subscribers {
            f(&self.value);
        }
        true
    }

    pub fn subscribe(&mut self, f: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.subscribers.push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: PartialEq + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
