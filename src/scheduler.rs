//! Host-style timers: repeating intervals plus one-shot frame requests.
//!
//! Nothing here runs callbacks.  `due` reports which tasks are owed at a
//! given wall time and the caller runs them, checking `is_live` first so a
//! task cancelled by an earlier one in the same batch is skipped.

/// Work the session schedules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Task {
    SpawnEnemy,
    SpawnPowerUp,
    Frame,
}

/// Identifies one scheduled timer.  Ids are never reused, so a handle that
/// has been cancelled stays dead forever.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Clone, Debug)]
struct Timer {
    handle: TimerHandle,
    task: Task,
    /// `None` for one-shot requests.
    period: Option<u64>,
    next_due: u64,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, task: Task, period: Option<u64>, next_due: u64) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer { handle, task, period, next_due });
        handle
    }

    /// Repeat `task` every `period` ms, first firing at `now + period`.
    pub fn set_interval(&mut self, task: Task, period: u64, now: u64) -> TimerHandle {
        self.insert(task, Some(period.max(1)), now + period.max(1))
    }

    /// Run `task` once, at the next pump.
    pub fn request_once(&mut self, task: Task, now: u64) -> TimerHandle {
        self.insert(task, None, now)
    }

    pub fn cancel(&mut self, handle: TimerHandle) {
        self.timers.retain(|t| t.handle != handle);
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_live(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    /// Number of live timers running `task`.
    pub fn count(&self, task: Task) -> usize {
        self.timers.iter().filter(|t| t.task == task).count()
    }

    /// Every firing owed at or before `now`, ordered by due time (then by
    /// creation order).  Intervals catch up one firing per elapsed period and
    /// are rescheduled; one-shot requests are consumed here but stay live
    /// until the returned batch has been handled.
    pub fn due(&mut self, now: u64) -> Vec<(u64, TimerHandle, Task)> {
        let mut fired = Vec::new();
        for timer in &mut self.timers {
            match timer.period {
                Some(period) => {
                    while timer.next_due <= now {
                        fired.push((timer.next_due, timer.handle, timer.task));
                        timer.next_due += period;
                    }
                }
                None if timer.next_due <= now => {
                    fired.push((timer.next_due, timer.handle, timer.task));
                    timer.next_due = u64::MAX;
                }
                None => {}
            }
        }
        fired.sort_by_key(|&(at, handle, _)| (at, handle));
        fired
    }

    /// Drop one-shot requests that have already been handed out by `due`.
    pub fn retire_fired(&mut self) {
        self.timers
            .retain(|t| t.period.is_some() || t.next_due != u64::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_fires_once_per_period() {
        let mut s = Scheduler::new();
        s.set_interval(Task::SpawnEnemy, 2_000, 0);
        assert!(s.due(1_999).is_empty());
        assert_eq!(s.due(2_000).len(), 1);
        assert_eq!(s.due(7_000).len(), 2); // 4000, 6000
    }

    #[test]
    fn cancelled_handle_is_dead() {
        let mut s = Scheduler::new();
        let h = s.set_interval(Task::SpawnPowerUp, 10_000, 0);
        s.cancel(h);
        assert!(!s.is_live(h));
        assert!(s.due(50_000).is_empty());
    }

    #[test]
    fn one_shot_fires_once() {
        let mut s = Scheduler::new();
        let h = s.request_once(Task::Frame, 5);
        assert_eq!(s.due(5), vec![(5, h, Task::Frame)]);
        assert!(s.is_live(h));
        s.retire_fired();
        assert!(!s.is_live(h));
        assert!(s.due(100).is_empty());
    }

    #[test]
    fn batches_are_time_ordered() {
        let mut s = Scheduler::new();
        s.set_interval(Task::SpawnPowerUp, 3, 0);
        s.set_interval(Task::SpawnEnemy, 2, 0);
        let order: Vec<_> = s.due(6).into_iter().map(|(at, _, task)| (at, task)).collect();
        assert_eq!(
            order,
            vec![
                (2, Task::SpawnEnemy),
                (3, Task::SpawnPowerUp),
                (4, Task::SpawnEnemy),
                (6, Task::SpawnPowerUp),
                (6, Task::SpawnEnemy),
            ]
        );
    }
}
