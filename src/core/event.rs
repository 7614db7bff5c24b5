//! # Event: a name-addressed bucket of executions.
//!
//! Owned by the registry; never handed out to callers. Keeps executions in
//! registration order, which is the order fan-out follows.
//!
//! ## Fan-out
//! ```text
//! emit(name, args)
//!   └─► snapshot = [E1, E2, E3]   (taken under the registry lock, then released)
//!         ├─► E1.trigger(args.clone())
//!         ├─► E2.trigger(args.clone())   ← E1 removing itself does not shift E2/E3
//!         └─► E3.trigger(args)
//! ```

use std::sync::Arc;

use crate::core::execution::{Execution, ExecutionSnapshot, Trigger};
use crate::core::{EventId, ExecutionId};

pub(crate) struct Event<A> {
    name: Arc<str>,
    id: EventId,
    executions: Vec<Arc<Execution<A>>>,
}

impl<A> Event<A> {
    pub(crate) fn new(name: Arc<str>, id: EventId) -> Self {
        Self {
            name,
            id,
            executions: Vec::new(),
        }
    }

    pub(crate) fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub(crate) fn id(&self) -> EventId {
        self.id
    }

    pub(crate) fn push(&mut self, execution: Arc<Execution<A>>) {
        self.executions.push(execution);
    }

    /// Removes one execution, preserving the order of the others.
    pub(crate) fn remove(&mut self, id: ExecutionId) -> Option<Arc<Execution<A>>> {
        let pos = self.executions.iter().position(|e| e.id() == id)?;
        Some(self.executions.remove(pos))
    }

    pub(crate) fn contains(&self, id: ExecutionId) -> bool {
        self.executions.iter().any(|e| e.id() == id)
    }

    /// Detaches every execution, leaving the event empty.
    pub(crate) fn take_all(&mut self) -> Vec<Arc<Execution<A>>> {
        std::mem::take(&mut self.executions)
    }

    /// Stable copy of the current executions for one fan-out.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Execution<A>>> {
        self.executions.clone()
    }

    pub(crate) fn describe(&self) -> Vec<ExecutionSnapshot> {
        self.executions.iter().map(|e| e.snapshot()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.executions.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.executions.is_empty()
    }
}

/// Counts of what one fan-out did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FanOut {
    pub started: usize,
    pub dropped: usize,
    pub skipped: usize,
}

/// Triggers every execution of `snapshot` in registration order.
///
/// Each execution gets its own clone of `args`; the last one takes ownership.
pub(crate) fn fan_out<A: Clone + Send + 'static>(
    snapshot: &[Arc<Execution<A>>],
    args: A,
) -> FanOut {
    let mut out = FanOut::default();
    let Some((last, rest)) = snapshot.split_last() else {
        return out;
    };

    let mut record = |t: Trigger| match t {
        Trigger::Started => out.started += 1,
        Trigger::Dropped => out.dropped += 1,
        Trigger::Skipped => out.skipped += 1,
    };

    for exec in rest {
        record(exec.trigger(args.clone()));
    }
    record(last.trigger(args));
    out
}
