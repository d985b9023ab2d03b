/// Deferred-callback queue with cancellation tokens.
///
/// Stands in for `setTimeout` / `requestAnimationFrame`: callers schedule a
/// payload either for the next frame or for a point on the kiosk clock and
/// get back a [`TaskToken`]. Cancelling the token guarantees the payload is
/// never returned by [`Timeline::drain_due`].
///
/// Key properties:
/// - Total ordering on `(due, token)`; next-frame tasks sort first.
/// - Tasks scheduled while a drained batch is being handled wait for the
///   next drain, so a self-rescheduling frame task runs once per frame.
/// - Cancellation does not perturb the order of remaining tasks.
use foundation::time::Time;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskToken(u64);

impl TaskToken {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Key {
    due: Time,
    token: TaskToken,
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        // Total ordering: (due, token)
        self.due
            .cmp(&other.due)
            .then_with(|| self.token.cmp(&other.token))
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
struct Item<T> {
    key: Key,
    payload: T,
}

#[derive(Debug)]
pub struct Timeline<T> {
    next_token: u64,
    items: Vec<Item<T>>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            next_token: 0,
            items: Vec::new(),
        }
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Schedules `payload` for the next drain (the next animation frame).
    pub fn schedule_next_frame(&mut self, payload: T) -> TaskToken {
        self.push(Time::ZERO, payload)
    }

    /// Schedules `payload` for the first drain at or after `at`.
    pub fn schedule_at(&mut self, at: Time, payload: T) -> TaskToken {
        self.push(at, payload)
    }

    fn push(&mut self, due: Time, payload: T) -> TaskToken {
        let token = TaskToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.items.push(Item {
            key: Key { due, token },
            payload,
        });
        token
    }

    /// Cancels a pending task. Returns `false` if it already ran or was
    /// cancelled before.
    pub fn cancel(&mut self, token: TaskToken) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.key.token != token);
        self.items.len() != before
    }

    pub fn is_pending(&self, token: TaskToken) -> bool {
        self.items.iter().any(|i| i.key.token == token)
    }

    /// Earliest due time among pending timer tasks, ignoring next-frame tasks.
    pub fn next_deadline(&self) -> Option<Time> {
        self.items
            .iter()
            .map(|i| i.key.due)
            .filter(|due| *due > Time::ZERO)
            .min()
    }

    /// Removes and returns every task due at `now`, in `(due, token)` order.
    pub fn drain_due(&mut self, now: Time) -> Vec<(TaskToken, T)> {
        let mut due = Vec::new();
        let mut idx = 0;
        while idx < self.items.len() {
            if self.items[idx].key.due <= now {
                due.push(self.items.swap_remove(idx));
            } else {
                idx += 1;
            }
        }
        due.sort_by(|a, b| a.key.cmp(&b.key));
        due.into_iter().map(|i| (i.key.token, i.payload)).collect()
    }
}
