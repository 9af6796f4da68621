//! Frame-driven task driver.
//!
//! Every animation on the wall (momentum, snap, the scale loop and the edge
//! stretch timer) is a [`FrameTask`]: a body stepped once per frame for as long
//! as its predicate holds. A task is cancelled by revoking its handle; a
//! revoked task is never stepped again.

use std::time::Instant;

/// Result of advancing a task by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Done,
}

impl Flow {
    pub fn continue_if(predicate: bool) -> Self {
        if predicate { Flow::Continue } else { Flow::Done }
    }
}

/// A body that can be stepped once per frame against some context `C`.
pub trait FrameStep<C: ?Sized> {
    fn step(&mut self, ctx: &mut C, now: Instant) -> Flow;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// Hands out unique task handles.
#[derive(Debug, Default)]
pub struct TaskIds {
    next: u64,
}

impl TaskIds {
    pub fn spawn<T>(&mut self, body: T) -> FrameTask<T> {
        self.next += 1;
        FrameTask {
            handle: TaskHandle(self.next),
            body,
            frames: 0,
        }
    }
}

#[derive(Debug)]
pub struct FrameTask<T> {
    handle: TaskHandle,
    body: T,
    frames: u32,
}

impl<T> FrameTask<T> {
    pub fn handle(&self) -> TaskHandle {
        self.handle
    }

    pub fn body(&self) -> &T {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut T {
        &mut self.body
    }

    /// Number of frames this task has been stepped.
    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn tick<C: ?Sized>(&mut self, ctx: &mut C, now: Instant) -> Flow
    where
        T: FrameStep<C>,
    {
        self.frames += 1;
        self.body.step(ctx, now)
    }
}

/// Holds at most one running task; starting another revokes the previous one.
#[derive(Debug)]
pub struct TaskSlot<T> {
    task: Option<FrameTask<T>>,
}

impl<T> Default for TaskSlot<T> {
    fn default() -> Self {
        Self { task: None }
    }
}

impl<T> TaskSlot<T> {
    /// Installs `task`, returning whichever task it displaced.
    pub fn start(&mut self, task: FrameTask<T>) -> Option<FrameTask<T>> {
        self.task.replace(task)
    }

    /// Revokes the running task only if it is still the one `handle` names.
    pub fn revoke(&mut self, handle: TaskHandle) -> Option<FrameTask<T>> {
        if self.handle() == Some(handle) {
            self.task.take()
        } else {
            None
        }
    }

    pub fn cancel(&mut self) -> Option<FrameTask<T>> {
        self.task.take()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn handle(&self) -> Option<TaskHandle> {
        self.task.as_ref().map(FrameTask::handle)
    }

    pub fn get(&self) -> Option<&T> {
        self.task.as_ref().map(FrameTask::body)
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.task.as_mut().map(FrameTask::body_mut)
    }

    /// Steps the running task. A task that reports [`Flow::Done`] is removed and returned.
    pub fn tick<C: ?Sized>(&mut self, ctx: &mut C, now: Instant) -> Option<FrameTask<T>>
    where
        T: FrameStep<C>,
    {
        let task = self.task.as_mut()?;
        match task.tick(ctx, now) {
            Flow::Continue => None,
            Flow::Done => self.task.take(),
        }
    }
}

/// Finishes on the first frame at or after its due time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delay {
    due: Instant,
}

impl Delay {
    pub fn until(due: Instant) -> Self {
        Self { due }
    }

    pub fn due(&self) -> Instant {
        self.due
    }
}

impl FrameStep<()> for Delay {
    fn step(&mut self, _ctx: &mut (), now: Instant) -> Flow {
        Flow::continue_if(now < self.due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Countdown(u32);

    impl FrameStep<Vec<u32>> for Countdown {
        fn step(&mut self, log: &mut Vec<u32>, _now: Instant) -> Flow {
            log.push(self.0);
            self.0 = self.0.saturating_sub(1);
            Flow::continue_if(self.0 > 0)
        }
    }

    #[test]
    fn runs_while_predicate_holds() {
        let mut ids = TaskIds::default();
        let mut slot = TaskSlot::default();
        slot.start(ids.spawn(Countdown(3)));
        let mut log = Vec::new();
        let now = Instant::now();
        assert!(slot.tick(&mut log, now).is_none());
        assert!(slot.tick(&mut log, now).is_none());
        let finished = slot.tick(&mut log, now).expect("task should finish");
        assert_eq!(finished.frames(), 3);
        assert_eq!(log, vec![3, 2, 1]);
        assert!(!slot.is_running());
        assert!(slot.tick(&mut log, now).is_none());
    }

    #[test]
    fn stale_handle_does_not_revoke_newer_task() {
        let mut ids = TaskIds::default();
        let mut slot = TaskSlot::default();
        let first = ids.spawn(Countdown(5));
        let stale = first.handle();
        slot.start(first);
        let displaced = slot.start(ids.spawn(Countdown(5)));
        assert_eq!(displaced.map(|t| t.handle()), Some(stale));
        assert!(slot.revoke(stale).is_none());
        assert!(slot.is_running());
        let current = slot.handle().unwrap();
        assert!(slot.revoke(current).is_some());
        assert!(!slot.is_running());
    }
}
