//! Time-triggered callbacks resolved against a clock.
//!
//! Every node owns a `Scheduler<Tree>`: its callbacks receive the whole tree
//! and may restructure it. The scheduler itself never reads a clock; the
//! owner pushes the current time in with [`Scheduler::set_clock_time`] once per
//! frame, and until that has happened nothing can be scheduled.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use log::trace;

use crate::error::SchedulerError;

/// Handle to a scheduled callback, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

type Callback<C> = Box<dyn FnMut(&mut C)>;

/// A task taken out of the scheduler because it is due.
///
/// Run it with [`DueTask::run`], then hand it back with
/// [`Scheduler::finish`] so repeating tasks are re-enqueued.
pub struct DueTask<C: ?Sized> {
    id: TaskId,
    seq: u64,
    execution_time: f64,
    interval: Option<f64>,
    callback: Callback<C>,
}

impl<C: ?Sized> DueTask<C> {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn execution_time(&self) -> f64 {
        self.execution_time
    }

    pub fn run(&mut self, context: &mut C) {
        (self.callback)(context);
    }
}

pub struct Scheduler<C: ?Sized> {
    clock_time: Option<f64>,
    /// Added since the last `take_due`, unsorted.
    pending: Vec<DueTask<C>>,
    /// Sorted by `(execution_time, seq)`.
    active: Vec<DueTask<C>>,
    /// Taken by `take_due` and not yet finished.
    in_flight: HashSet<TaskId>,
    next_id: u64,
}

impl<C: ?Sized> Default for Scheduler<C> {
    fn default() -> Self {
        Self {
            clock_time: None,
            pending: Vec::new(),
            active: Vec::new(),
            in_flight: HashSet::new(),
            next_id: 0,
        }
    }
}

impl<C: ?Sized> fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("clock_time", &self.clock_time)
            .field("pending", &self.pending.len())
            .field("active", &self.active.len())
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

fn by_due_time<C: ?Sized>(a: &DueTask<C>, b: &DueTask<C>) -> Ordering {
    a.execution_time
        .partial_cmp(&b.execution_time)
        .unwrap_or(Ordering::Equal)
        .then(a.seq.cmp(&b.seq))
}

impl<C: ?Sized> Scheduler<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock_time(&self) -> Option<f64> {
        self.clock_time
    }

    pub fn has_clock(&self) -> bool {
        self.clock_time.is_some()
    }

    pub fn set_clock_time(&mut self, time: f64) {
        self.clock_time = Some(time);
    }

    /// Number of tasks waiting to run, including repeating ones.
    pub fn len(&self) -> usize {
        self.pending.len() + self.active.len() + self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn now(&self) -> Result<f64, SchedulerError> {
        self.clock_time.ok_or(SchedulerError::NoClock)
    }

    fn enqueue(
        &mut self,
        execution_time: f64,
        interval: Option<f64>,
        callback: Callback<C>,
    ) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(DueTask {
            id,
            seq: id.0,
            execution_time,
            interval,
            callback,
        });
        id
    }

    /// Run `callback` on the next update.
    pub fn add<F>(&mut self, callback: F) -> Result<TaskId, SchedulerError>
    where
        F: FnMut(&mut C) + 'static,
    {
        let now = self.now()?;
        Ok(self.enqueue(now, None, Box::new(callback)))
    }

    /// Run `callback` once, `delay` ms from now.
    pub fn add_delayed<F>(&mut self, delay: f64, callback: F) -> Result<TaskId, SchedulerError>
    where
        F: FnMut(&mut C) + 'static,
    {
        let now = self.now()?;
        Ok(self.enqueue(now + delay, None, Box::new(callback)))
    }

    /// Run `callback` every `interval` ms, the first time `interval` ms from
    /// now. Due times accumulate from the previous due time, not from when the
    /// task actually ran, so late frames do not make the schedule drift.
    pub fn add_repeating<F>(&mut self, interval: f64, callback: F) -> Result<TaskId, SchedulerError>
    where
        F: FnMut(&mut C) + 'static,
    {
        if !(interval.is_finite() && interval > 0.0) {
            return Err(SchedulerError::InvalidInterval(interval));
        }
        let now = self.now()?;
        Ok(self.enqueue(now + interval, Some(interval), Box::new(callback)))
    }

    /// Cancel a task that has not run yet (or a repeating one). Unknown or
    /// already-completed ids are ignored.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if let Some(index) = self.pending.iter().position(|task| task.id == id) {
            self.pending.remove(index);
            return true;
        }
        if let Some(index) = self.active.iter().position(|task| task.id == id) {
            self.active.remove(index);
            return true;
        }
        if self.in_flight.remove(&id) {
            return true;
        }
        trace!("cancel of unknown task {:?} ignored", id);
        false
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
        self.active.clear();
        self.in_flight.clear();
    }

    /// Remove and return every task due at the current clock time, earliest
    /// first.
    pub fn take_due(&mut self) -> Vec<DueTask<C>> {
        let Some(now) = self.clock_time else {
            return Vec::new();
        };

        if !self.pending.is_empty() {
            self.active.append(&mut self.pending);
            self.active.sort_by(by_due_time);
        }

        let due_count = self
            .active
            .iter()
            .position(|task| task.execution_time > now)
            .unwrap_or(self.active.len());

        let due: Vec<_> = self.active.drain(..due_count).collect();
        self.in_flight.extend(due.iter().map(|task| task.id));
        due
    }

    /// Whether a taken task is still wanted (it may have been cancelled by a
    /// task that ran before it in the same batch).
    pub fn is_live(&self, id: TaskId) -> bool {
        self.in_flight.contains(&id)
    }

    /// Hand back a task returned by [`take_due`](Self::take_due).
    ///
    /// Repeating tasks go back into the pending buffer with their due time
    /// advanced by one interval. At most one run per task happens per update,
    /// even if several intervals have elapsed.
    pub fn finish(&mut self, mut task: DueTask<C>) {
        if !self.in_flight.remove(&task.id) {
            return;
        }
        if let Some(interval) = task.interval {
            task.execution_time += interval;
            self.pending.push(task);
        }
    }

    /// Set the clock time and run everything due, in order.
    pub fn update(&mut self, time: f64, context: &mut C) -> usize {
        self.set_clock_time(time);
        let mut ran = 0;
        for mut task in self.take_due() {
            if !self.is_live(task.id) {
                continue;
            }
            task.run(context);
            ran += 1;
            self.finish(task);
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_task(label: &'static str) -> impl FnMut(&mut Vec<(&'static str, f64)>) {
        move |log: &mut Vec<(&'static str, f64)>| log.push((label, 0.0))
    }

    #[test]
    fn test_requires_clock() {
        let mut scheduler: Scheduler<Vec<(&str, f64)>> = Scheduler::new();
        assert_eq!(scheduler.add(log_task("a")), Err(SchedulerError::NoClock));
        assert_eq!(
            scheduler.add_delayed(10.0, log_task("a")),
            Err(SchedulerError::NoClock)
        );
    }

    #[test]
    fn test_runs_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.set_clock_time(0.0);
        scheduler.add_delayed(10.0, log_task("10")).unwrap();
        scheduler.add_delayed(5.0, log_task("5")).unwrap();
        scheduler.add_delayed(20.0, log_task("20")).unwrap();

        let mut log = Vec::new();
        assert_eq!(scheduler.update(7.0, &mut log), 1);
        assert_eq!(scheduler.update(25.0, &mut log), 2);
        let order: Vec<_> = log.iter().map(|(label, _)| *label).collect();
        assert_eq!(order, vec!["5", "10", "20"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_same_due_time_keeps_insertion_order() {
        let mut scheduler = Scheduler::new();
        scheduler.set_clock_time(0.0);
        scheduler.add(log_task("first")).unwrap();
        scheduler.add(log_task("second")).unwrap();

        let mut log = Vec::new();
        scheduler.update(0.0, &mut log);
        assert_eq!(log[0].0, "first");
        assert_eq!(log[1].0, "second");
    }

    #[test]
    fn test_repeating_accumulates_without_drift() {
        let mut scheduler = Scheduler::new();
        scheduler.set_clock_time(0.0);
        scheduler
            .add_repeating(10.0, |log: &mut Vec<f64>| log.push(0.0))
            .unwrap();

        let mut runs = Vec::new();
        scheduler.update(13.0, &mut runs);
        assert_eq!(runs.len(), 1);

        // Next due time is 20, not 13 + 10.
        scheduler.update(20.0, &mut runs);
        assert_eq!(runs.len(), 2);

        // A long stall yields one catch-up run per update.
        scheduler.update(100.0, &mut runs);
        assert_eq!(runs.len(), 3);
        scheduler.update(100.0, &mut runs);
        assert_eq!(runs.len(), 4);
    }

    #[test]
    fn test_invalid_interval() {
        let mut scheduler: Scheduler<()> = Scheduler::new();
        scheduler.set_clock_time(0.0);
        assert_eq!(
            scheduler.add_repeating(0.0, |_| {}),
            Err(SchedulerError::InvalidInterval(0.0))
        );
        assert!(scheduler.add_repeating(f64::NAN, |_| {}).is_err());
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        scheduler.set_clock_time(0.0);
        let id = scheduler.add_delayed(5.0, log_task("never")).unwrap();
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));

        let mut log = Vec::new();
        scheduler.update(10.0, &mut log);
        assert!(log.is_empty());
    }

    #[test]
    fn test_cancel_after_run_is_noop() {
        let mut scheduler = Scheduler::new();
        scheduler.set_clock_time(0.0);
        let id = scheduler.add(log_task("once")).unwrap();
        let mut log = Vec::new();
        scheduler.update(0.0, &mut log);
        assert!(!scheduler.cancel(id));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_cancel_while_in_flight() {
        let mut scheduler = Scheduler::new();
        scheduler.set_clock_time(0.0);
        let id = scheduler
            .add_repeating(1.0, |count: &mut u32| *count += 1)
            .unwrap();

        scheduler.set_clock_time(1.0);
        let due = scheduler.take_due();
        assert_eq!(due.len(), 1);
        assert!(scheduler.cancel(id));
        for task in due {
            assert!(!scheduler.is_live(task.id()));
            scheduler.finish(task);
        }

        let mut count = 0;
        scheduler.update(50.0, &mut count);
        assert_eq!(count, 0);
    }
}
