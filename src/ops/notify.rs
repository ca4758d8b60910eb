use std::cell::Cell;
use std::rc::{Rc, Weak};

/// Payload-free "state changed" broadcast.
///
/// `publish` only raises a flag on each subscription; observers pick it up
/// with [`Subscription::take`] on their next loop iteration, so they never
/// run inside the mutation that caused the change. Repeated publishes before
/// a `take` coalesce into a single delivery.
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    subscribers: Vec<Weak<Cell<bool>>>,
}

/// Receiving end of a [`ChangeNotifier`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    dirty: Rc<Cell<bool>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription {
        let dirty = Rc::new(Cell::new(false));
        self.subscribers.push(Rc::downgrade(&dirty));
        Subscription { dirty }
    }

    pub fn publish(&mut self) {
        self.subscribers.retain(|weak| match weak.upgrade() {
            Some(flag) => {
                flag.set(true);
                true
            }
            None => false,
        });
    }

    /// Number of live subscriptions as of the last publish
    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Subscription {
    /// Report whether anything changed since the last call, and reset.
    pub fn take(&self) -> bool {
        self.dirty.replace(false)
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.dirty.get()
    }
}
