use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Entry<T> {
    id: TimerId,
    due_at: i64,
    period: Option<i64>,
    task: T,
}

/// Owned replacement for free-floating `setTimeout`/`setInterval` handles.
///
/// Time is plain epoch milliseconds supplied by the caller, so the queue never
/// reads a clock itself and can be stepped deterministically.
#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    seq: u64,
    heap: BinaryHeap<Reverse<(i64, u64, u64)>>,
    entries: Vec<Entry<T>>,
}

impl<T: Clone> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            seq: 0,
            heap: BinaryHeap::new(),
            entries: Vec::new(),
        }
    }

    pub fn schedule_once(&mut self, now: i64, delay_ms: i64, task: T) -> TimerId {
        self.insert(now + delay_ms.max(0), None, task)
    }

    /// First run happens one `period_ms` after `now`.
    pub fn schedule_every(&mut self, now: i64, period_ms: i64, task: T) -> TimerId {
        let period = period_ms.max(1);
        self.insert(now + period, Some(period), task)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        before != self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.heap.clear();
    }

    #[cfg(test)]
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_due(&self) -> Option<i64> {
        self.entries.iter().map(|entry| entry.due_at).min()
    }

    /// Pops the earliest task due at or before `now`, with its due time.
    /// Periodic entries fire once per call however many periods were missed,
    /// then re-arm on their period grid strictly after `now`.
    pub fn pop_due(&mut self, now: i64) -> Option<(i64, T)> {
        loop {
            let Reverse((due_at, _, raw_id)) = *self.heap.peek()?;
            if due_at > now {
                return None;
            }
            self.heap.pop();
            let id = TimerId(raw_id);
            let Some(index) = self
                .entries
                .iter()
                .position(|entry| entry.id == id && entry.due_at == due_at)
            else {
                continue;
            };
            let entry = &mut self.entries[index];
            let task = entry.task.clone();
            match entry.period {
                Some(period) => {
                    entry.due_at += period * ((now - due_at) / period + 1);
                    let next = entry.due_at;
                    self.push_heap(next, id);
                }
                None => {
                    self.entries.swap_remove(index);
                }
            }
            return Some((due_at, task));
        }
    }

    fn insert(&mut self, due_at: i64, period: Option<i64>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due_at,
            period,
            task,
        });
        self.push_heap(due_at, id);
        id
    }

    fn push_heap(&mut self, due_at: i64, id: TimerId) {
        self.seq += 1;
        self.heap.push(Reverse((due_at, self.seq, id.0)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn one_shot_fires_once_when_due() {
        let mut timers = TimerQueue::new();
        timers.schedule_once(0, 500, "reveal");

        assert_eq!(timers.pop_due(499), None);
        assert_eq!(timers.pop_due(500), Some((500, "reveal")));
        assert_eq!(timers.pop_due(10_000), None);
        assert!(timers.is_empty());
    }

    #[test]
    fn equal_due_times_keep_schedule_order() {
        let mut timers = TimerQueue::new();
        timers.schedule_once(0, 100, "first");
        timers.schedule_once(0, 100, "second");
        timers.schedule_once(0, 50, "earliest");

        assert_eq!(timers.pop_due(100), Some((50, "earliest")));
        assert_eq!(timers.pop_due(100), Some((100, "first")));
        assert_eq!(timers.pop_due(100), Some((100, "second")));
    }

    #[test]
    fn periodic_task_rearms_until_cancelled() {
        let mut timers = TimerQueue::new();
        let id = timers.schedule_every(0, 1_000, "tick");

        assert_eq!(timers.pop_due(1_000), Some((1_000, "tick")));
        assert_eq!(timers.pop_due(1_999), None);
        assert_eq!(timers.next_due(), Some(2_000));
        assert_eq!(timers.pop_due(2_000), Some((2_000, "tick")));
        assert_eq!(timers.next_due(), Some(3_000));

        assert!(timers.cancel(id));
        assert!(!timers.is_scheduled(id));
        assert_eq!(timers.pop_due(100_000), None);
    }

    #[test]
    fn missed_periods_collapse_into_one_run() {
        let mut timers = TimerQueue::new();
        timers.schedule_every(0, 1_000, "tick");

        assert_eq!(timers.pop_due(8 * 3_600_000 + 250), Some((1_000, "tick")));
        assert_eq!(timers.pop_due(8 * 3_600_000 + 250), None);
        assert_eq!(timers.next_due(), Some(8 * 3_600_000 + 1_000));
    }

    #[test]
    fn cancel_unknown_timer_is_a_no_op() {
        let mut timers: TimerQueue<&str> = TimerQueue::new();
        let id = timers.schedule_once(0, 10, "gone");
        timers.clear();
        assert!(!timers.cancel(id));
    }
}
