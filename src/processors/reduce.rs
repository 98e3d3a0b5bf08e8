//! Rolling reduction over a sliding count window.

use super::Processor;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::key::Key;
use std::collections::VecDeque;
use std::sync::Arc;

/// The user reduction: folds the current accumulator and the ring of the
/// last `count` events into a new accumulator event.
pub type ReduceFn<K> =
    Arc<dyn Fn(Option<&Event<K>>, &[Event<K>]) -> Result<Event<K>> + Send + Sync>;

/// Keeps a ring of the last `count` events; on every input, the iteratee
/// folds `(accumulator, ring)` into a new accumulator, which is emitted.
pub struct RollingReduce<K: Key> {
    count: usize,
    iteratee: ReduceFn<K>,
    ring: VecDeque<Event<K>>,
    accumulator: Option<Event<K>>,
}

impl<K: Key> RollingReduce<K> {
    /// Build a rolling reducer over windows of `count >= 1` events,
    /// optionally seeding the accumulator.
    pub fn new(count: usize, iteratee: ReduceFn<K>, accumulator: Option<Event<K>>) -> Result<Self> {
        if count == 0 {
            return Err(Error::InvalidFieldSpec(
                "rolling reduce needs a window of at least one event".to_string(),
            ));
        }
        Ok(Self {
            count,
            iteratee,
            ring: VecDeque::with_capacity(count),
            accumulator,
        })
    }
}

impl<K: Key> Processor for RollingReduce<K> {
    type In = Event<K>;
    type Out = Event<K>;

    fn process(&mut self, event: Self::In) -> Result<Vec<Self::Out>> {
        self.ring.push_back(event);
        if self.ring.len() > self.count {
            self.ring.pop_front();
        }
        let acc = (self.iteratee)(self.accumulator.as_ref(), self.ring.make_contiguous())?;
        self.accumulator = Some(acc.clone());
        Ok(vec![acc])
    }
}
