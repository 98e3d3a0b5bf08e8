//! Streaming windower: buckets a live event stream into window
//! collections.

use super::Processor;
use crate::collection::SortedCollection;
use crate::error::Result;
use crate::event::Event;
use crate::grouped::GroupBy;
use crate::key::Key;
use crate::time::Time;
use crate::window::Window;
use std::collections::BTreeMap;

/// What a window node emits downstream: the composite window key
/// (`[<group>::]<index>`) and the window's current collection.
pub type KeyedCollection<K> = (String, SortedCollection<K>);

/// When the windower emits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Trigger {
    /// Emit the updated collection of every window the input touched.
    #[default]
    PerEvent,
    /// Emit each window exactly once, when the first event past its end
    /// arrives and the window is dropped from tracking.
    OnDiscardedWindow,
}

/// Configuration for [`Windower`].
#[derive(Clone)]
pub struct WindowOptions {
    /// The window family events are bucketed into.
    pub window: Window,
    /// The emission policy.
    pub trigger: Trigger,
    /// Optional grouping; group names prefix the emitted window keys.
    pub group_by: Option<GroupBy<Time>>,
}

impl WindowOptions {
    /// Per-event emission, no grouping.
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self {
            window,
            trigger: Trigger::PerEvent,
            group_by: None,
        }
    }

    /// Set the emission policy.
    #[must_use]
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Prefix window keys with a per-event group.
    #[must_use]
    pub fn group_by(mut self, group: GroupBy<Time>) -> Self {
        self.group_by = Some(group);
        self
    }
}

struct TrackedWindow {
    end: Time,
    collection: SortedCollection<Time>,
}

/// Routes each incoming event into the windows containing its timestamp,
/// emitting `(window key, collection)` tuples per the trigger.
///
/// Windows are tracked until an event at or past their end arrives, at
/// which point they are dropped (and, under
/// [`Trigger::OnDiscardedWindow`], emitted once, complete).
pub struct Windower {
    options: WindowOptions,
    tracked: BTreeMap<String, TrackedWindow>,
}

impl Windower {
    /// A fresh windower tracking no windows.
    #[must_use]
    pub fn new(options: WindowOptions) -> Self {
        Self {
            options,
            tracked: BTreeMap::new(),
        }
    }

    /// Number of currently open windows.
    #[must_use]
    pub fn open_windows(&self) -> usize {
        self.tracked.len()
    }
}

impl Processor for Windower {
    type In = Event<Time>;
    type Out = KeyedCollection<Time>;

    fn process(&mut self, event: Self::In) -> Result<Vec<Self::Out>> {
        let group = self.options.group_by.as_ref().map(|g| g.key_for(&event));
        let mut touched = Vec::new();
        for index in self.options.window.index_set(event.timestamp()) {
            let key = match &group {
                Some(g) => format!("{g}::{index}"),
                None => index.to_string(),
            };
            let tracked = self.tracked.entry(key.clone()).or_insert_with(|| TrackedWindow {
                end: index.end(),
                collection: SortedCollection::new(Vec::new()),
            });
            tracked.collection = tracked.collection.add_event(event.clone());
            touched.push(key);
        }

        let mut out = Vec::new();
        if self.options.trigger == Trigger::PerEvent {
            for key in &touched {
                if let Some(tracked) = self.tracked.get(key) {
                    out.push((key.clone(), tracked.collection.clone()));
                }
            }
        }

        // Windows whose end has passed cannot receive further events;
        // drop them, emitting each once under the discard trigger.
        let expired: Vec<String> = self
            .tracked
            .iter()
            .filter(|(_, tw)| tw.end <= event.timestamp())
            .map(|(k, _)| k.clone())
            .collect();
        for key in expired {
            if let Some(tracked) = self.tracked.remove(&key) {
                if self.options.trigger == Trigger::OnDiscardedWindow {
                    out.push((key, tracked.collection));
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::Duration;
    use crate::processors::run;

    fn events(times: &[i64]) -> Vec<Event<Time>> {
        times
            .iter()
            .enumerate()
            .map(|(i, &ms)| Event::of(Time::from_ms(ms), i as f64 + 1.0))
            .collect()
    }

    #[test]
    fn per_event_trigger_emits_on_every_input() {
        let options = WindowOptions::new(Window::fixed(Duration::seconds(30)));
        let mut windower = Windower::new(options);
        let out = run(&mut windower, events(&[0, 15_000, 45_000])).unwrap();
        let keys: Vec<&str> = out.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["30s-0", "30s-0", "30s-1"]);
        // second emission of 30s-0 carries both events
        assert_eq!(out[1].1.size(), 2);
    }

    #[test]
    fn discard_trigger_emits_each_window_once_and_complete() {
        let options = WindowOptions::new(Window::fixed(Duration::seconds(30)))
            .trigger(Trigger::OnDiscardedWindow);
        let mut windower = Windower::new(options);
        let out = run(&mut windower, events(&[0, 15_000, 45_000, 65_000])).unwrap();
        let keys: Vec<&str> = out.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["30s-0", "30s-1"]);
        assert_eq!(out[0].1.size(), 2);
        assert_eq!(out[1].1.size(), 1);
        assert_eq!(windower.open_windows(), 1); // 30s-2 is still open
    }
}
