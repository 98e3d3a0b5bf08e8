//! The streaming graph: push-based processor nodes and typed facades.
//!
//! A stream is a tree of nodes. Feeding an input to the root
//! ([`EventStream::add_event`]) synchronously runs the entire observer
//! subtree to completion: each node transforms the input into zero or more
//! outputs and pushes every output to its observers in attach order, one
//! branch running fully before the next begins. Errors are never swallowed
//! per event; a failing processor unwinds straight back to the
//! `add_event` caller.
//!
//! Two facades wrap the node tree, chosen by the output type of the
//! current tail:
//!
//! - [`EventStream`]: the tail emits events. Offers the per-event
//!   transforms (`map`, `filter`, `select`, `collapse`, `fill`, rolling
//!   `reduce`) and — for `Time`-keyed tails — `align`, `rate`, and
//!   `window`.
//! - [`KeyedCollectionStream`]: the tail emits `(window key, collection)`
//!   tuples (from a window node). Offers `aggregate`, which re-keys the
//!   tuples into `Index`-keyed events and returns an `EventStream` again.
//!
//! Facades are cheap clones of `(root, tail)` handles. Chaining twice from
//! the same facade attaches two observers to one tail, which is how
//! branches are built; observers are only ever appended to an existing
//! tail, so the graph is acyclic by construction.
//!
//! # Example
//! ```
//! use tideflow::stream::event_input;
//! use tideflow::{Event, Time};
//!
//! let stream = event_input::<Time>();
//! let doubled = stream.map(|e: Event<Time>| {
//!     let v = e.get_f64("value").unwrap_or(0.0);
//!     e.set("value", v * 2.0)
//! });
//! let out = doubled.collect();
//!
//! stream.add_event(Event::of(Time::from_ms(0), 21.0)).unwrap();
//! assert_eq!(out.items()[0].get_f64("value"), Some(42.0));
//! ```

use crate::aggregation::AggregationSpec;
use crate::collection::SortedCollection;
use crate::error::Result;
use crate::event::Event;
use crate::index::Index;
use crate::key::Key;
use crate::processors::{
    Aggregator, Align, AlignOptions, Collapse, Fill, FillOptions, KeyedCollection, Processor,
    Rate, RateOptions, ReduceFn, RollingReduce, Select, WindowOptions, Windower,
};
use crate::reducers::Reducer;
use crate::time::{Time, TimeRange};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

/// The blanket bound for anything flowing through a stream: nodes hand
/// inputs across `Arc`-shared observers, so stream items must be
/// cloneable and thread-safe.
pub trait StreamInput: Clone + Send + Sync + 'static {}
impl<T: Clone + Send + Sync + 'static> StreamInput for T {}

/// A node input port: anything that can receive a pushed value.
pub trait Sink<T>: Send + Sync {
    /// Receive one value, running this node and its whole subtree.
    fn set(&self, input: T) -> Result<()>;
}

/// A node output port: anything observers can be attached to.
pub trait Emitter<T>: Send + Sync {
    /// Append an observer; it will receive every future output, after all
    /// previously attached observers.
    fn add_observer(&self, observer: Arc<dyn Sink<T>>);
}

/// An ordered observer list.
struct Observers<T> {
    list: Mutex<Vec<Arc<dyn Sink<T>>>>,
}

impl<T: StreamInput> Observers<T> {
    fn new() -> Self {
        Self {
            list: Mutex::new(Vec::new()),
        }
    }

    fn add(&self, observer: Arc<dyn Sink<T>>) {
        self.list.lock().unwrap().push(observer);
    }

    fn emit(&self, value: T) -> Result<()> {
        // Snapshot the list so downstream work never runs under the lock.
        let observers = self.list.lock().unwrap().clone();
        for observer in &observers {
            observer.set(value.clone())?;
        }
        Ok(())
    }
}

/// The root node: forwards whatever it is fed to its observers.
pub struct SourceNode<T> {
    observers: Observers<T>,
}

impl<T: StreamInput> SourceNode<T> {
    /// A source with no observers yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            observers: Observers::new(),
        }
    }
}

impl<T: StreamInput> Default for SourceNode<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StreamInput> Sink<T> for SourceNode<T> {
    fn set(&self, input: T) -> Result<()> {
        self.observers.emit(input)
    }
}

impl<T: StreamInput> Emitter<T> for SourceNode<T> {
    fn add_observer(&self, observer: Arc<dyn Sink<T>>) {
        self.observers.add(observer);
    }
}

/// Wraps a [`Processor`] as a stream node: each input is processed and
/// every output pushed to the observers in order.
pub struct ProcessorNode<P: Processor> {
    processor: Mutex<P>,
    observers: Observers<P::Out>,
}

impl<P> ProcessorNode<P>
where
    P: Processor + Send,
    P::Out: StreamInput,
{
    /// Wrap a processor.
    #[must_use]
    pub fn new(processor: P) -> Self {
        Self {
            processor: Mutex::new(processor),
            observers: Observers::new(),
        }
    }
}

impl<P> Sink<P::In> for ProcessorNode<P>
where
    P: Processor + Send,
    P::In: Send,
    P::Out: StreamInput,
{
    fn set(&self, input: P::In) -> Result<()> {
        let outputs = self.processor.lock().unwrap().process(input)?;
        for output in outputs {
            self.observers.emit(output)?;
        }
        Ok(())
    }
}

impl<P> Emitter<P::Out> for ProcessorNode<P>
where
    P: Processor + Send,
    P::In: Send,
    P::Out: StreamInput,
{
    fn add_observer(&self, observer: Arc<dyn Sink<P::Out>>) {
        self.observers.add(observer);
    }
}

/// A stateless closure lifted into a [`Processor`].
struct Apply<I, O, F> {
    f: F,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O, F> Apply<I, O, F>
where
    F: FnMut(I) -> Result<Vec<O>>,
{
    fn new(f: F) -> Self {
        Self {
            f,
            _types: PhantomData,
        }
    }
}

impl<I, O, F> Processor for Apply<I, O, F>
where
    F: FnMut(I) -> Result<Vec<O>>,
{
    type In = I;
    type Out = O;

    fn process(&mut self, input: I) -> Result<Vec<O>> {
        (self.f)(input)
    }
}

/// Terminal node invoking a user callback per item.
struct CallbackNode<T> {
    callback: Box<dyn Fn(&T) + Send + Sync>,
}

impl<T: StreamInput> Sink<T> for CallbackNode<T> {
    fn set(&self, input: T) -> Result<()> {
        (self.callback)(&input);
        Ok(())
    }
}

/// Terminal node accumulating items for later inspection (mostly tests
/// and batch-over-stream flows).
struct CollectorNode<T> {
    items: Arc<Mutex<Vec<T>>>,
}

impl<T: StreamInput> Sink<T> for CollectorNode<T> {
    fn set(&self, input: T) -> Result<()> {
        self.items.lock().unwrap().push(input);
        Ok(())
    }
}

/// Read handle onto a collector node's accumulated output.
#[derive(Clone)]
pub struct Collector<T> {
    items: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone> Collector<T> {
    /// Snapshot of everything collected so far.
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.items.lock().unwrap().clone()
    }

    /// Number of items collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    /// True when nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().unwrap().is_empty()
    }
}

/// A stream facade whose tail emits `Event<K>`. `In` is the root's input
/// type; every facade derived from one root shares it.
pub struct EventStream<In: StreamInput, K: Key> {
    source: Arc<SourceNode<In>>,
    tail: Arc<dyn Emitter<Event<K>>>,
}

impl<In: StreamInput, K: Key> Clone for EventStream<In, K> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            tail: Arc::clone(&self.tail),
        }
    }
}

/// A stream facade whose tail emits `(window key, collection)` tuples.
pub struct KeyedCollectionStream<In: StreamInput, K: Key> {
    source: Arc<SourceNode<In>>,
    tail: Arc<dyn Emitter<KeyedCollection<K>>>,
}

impl<In: StreamInput, K: Key> Clone for KeyedCollectionStream<In, K> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            tail: Arc::clone(&self.tail),
        }
    }
}

/// A new stream rooted at an event input.
#[must_use]
pub fn event_input<K: Key>() -> EventStream<Event<K>, K> {
    let source = Arc::new(SourceNode::new());
    EventStream {
        tail: source.clone(),
        source,
    }
}

/// A new stream rooted at a keyed-collection input (for driving the
/// aggregation side directly, e.g. replaying persisted windows).
#[must_use]
pub fn collection_input<K: Key>() -> KeyedCollectionStream<KeyedCollection<K>, K> {
    let source = Arc::new(SourceNode::new());
    KeyedCollectionStream {
        tail: source.clone(),
        source,
    }
}

impl<In: StreamInput, K: Key> EventStream<In, K> {
    /// Feed one input to the stream's root and run the whole graph.
    pub fn add_input(&self, input: In) -> Result<()> {
        self.source.set(input)
    }

    fn chain<K2, P>(&self, processor: P) -> EventStream<In, K2>
    where
        K2: Key,
        P: Processor<In = Event<K>, Out = Event<K2>> + Send + 'static,
    {
        let node = Arc::new(ProcessorNode::new(processor));
        self.tail.add_observer(node.clone());
        EventStream {
            source: Arc::clone(&self.source),
            tail: node,
        }
    }

    /// Transform every event.
    #[must_use]
    pub fn map<K2: Key>(
        &self,
        f: impl Fn(Event<K>) -> Event<K2> + Send + 'static,
    ) -> EventStream<In, K2> {
        self.chain(Apply::new(move |e| Ok(vec![f(e)])))
    }

    /// Transform every event into zero or more events.
    #[must_use]
    pub fn flat_map<K2: Key>(
        &self,
        f: impl Fn(Event<K>) -> Vec<Event<K2>> + Send + 'static,
    ) -> EventStream<In, K2> {
        self.chain(Apply::new(move |e| Ok(f(e))))
    }

    /// Drop events failing the predicate.
    #[must_use]
    pub fn filter(&self, pred: impl Fn(&Event<K>) -> bool + Send + 'static) -> Self {
        self.chain(Apply::new(move |e| {
            Ok(if pred(&e) { vec![e] } else { Vec::new() })
        }))
    }

    /// Retain only the listed top-level fields of every event.
    #[must_use]
    pub fn select(&self, fields: &[&str]) -> Self {
        self.chain(Select::new(fields))
    }

    /// Collapse the listed fields of every event into one output field.
    #[must_use]
    pub fn collapse(
        &self,
        fields: &[&str],
        out_name: &str,
        reducer: Reducer,
        append: bool,
    ) -> Self {
        self.chain(Collapse::new(fields, out_name, reducer, append))
    }

    /// Rolling reduction over the last `count` events.
    pub fn reduce(
        &self,
        count: usize,
        iteratee: ReduceFn<K>,
        accumulator: Option<Event<K>>,
    ) -> Result<Self> {
        Ok(self.chain(RollingReduce::new(count, iteratee, accumulator)?))
    }

    /// Fill missing values.
    pub fn fill(&self, options: FillOptions) -> Result<Self> {
        Ok(self.chain(Fill::new(options)?))
    }

    /// Invoke `callback` for every event reaching this point. The facade
    /// is handed back so further branches can still be attached.
    pub fn on_event(&self, callback: impl Fn(&Event<K>) + Send + Sync + 'static) -> Self {
        self.tail.add_observer(Arc::new(CallbackNode {
            callback: Box::new(callback),
        }));
        self.clone()
    }

    /// Attach a collector and return its read handle.
    #[must_use]
    pub fn collect(&self) -> Collector<Event<K>> {
        let items = Arc::new(Mutex::new(Vec::new()));
        self.tail.add_observer(Arc::new(CollectorNode {
            items: Arc::clone(&items),
        }));
        Collector { items }
    }
}

impl<S: Key, K: Key> EventStream<Event<S>, K> {
    /// Feed one event to the stream's root.
    pub fn add_event(&self, event: Event<S>) -> Result<()> {
        self.add_input(event)
    }
}

impl<In: StreamInput> EventStream<In, Time> {
    /// Resample onto period boundaries.
    #[must_use]
    pub fn align(&self, options: AlignOptions) -> Self {
        self.chain(Align::new(options))
    }

    /// Per-second rate of change between consecutive events; the result
    /// is `TimeRange`-keyed.
    #[must_use]
    pub fn rate(&self, options: RateOptions) -> EventStream<In, TimeRange> {
        self.chain(Rate::new(options))
    }

    /// Bucket events into windows, switching to the keyed-collection
    /// facade.
    #[must_use]
    pub fn window(&self, options: WindowOptions) -> KeyedCollectionStream<In, Time> {
        let node = Arc::new(ProcessorNode::new(Windower::new(options)));
        self.tail.add_observer(node.clone());
        KeyedCollectionStream {
            source: Arc::clone(&self.source),
            tail: node,
        }
    }
}

impl<In: StreamInput, K: Key> KeyedCollectionStream<In, K> {
    /// Feed one input to the stream's root and run the whole graph.
    pub fn add_input(&self, input: In) -> Result<()> {
        self.source.set(input)
    }

    /// Reduce every emitted window into one `Index`-keyed event per the
    /// spec, switching back to the event facade.
    pub fn aggregate(&self, spec: AggregationSpec) -> Result<EventStream<In, Index>> {
        let node = Arc::new(ProcessorNode::new(Aggregator::<K>::new(spec)?));
        self.tail.add_observer(node.clone());
        Ok(EventStream {
            source: Arc::clone(&self.source),
            tail: node,
        })
    }

    /// Invoke `callback` for every `(window key, collection)` tuple.
    pub fn on_emit(
        &self,
        callback: impl Fn(&KeyedCollection<K>) + Send + Sync + 'static,
    ) -> Self {
        self.tail.add_observer(Arc::new(CallbackNode {
            callback: Box::new(callback),
        }));
        self.clone()
    }

    /// Attach a collector and return its read handle.
    #[must_use]
    pub fn collect(&self) -> Collector<KeyedCollection<K>> {
        let items = Arc::new(Mutex::new(Vec::new()));
        self.tail.add_observer(Arc::new(CollectorNode {
            items: Arc::clone(&items),
        }));
        Collector { items }
    }
}

impl<K: Key> KeyedCollectionStream<KeyedCollection<K>, K> {
    /// Feed one keyed collection to the stream's root.
    pub fn add_collection(&self, key: impl Into<String>, collection: SortedCollection<K>) -> Result<()> {
        self.add_input((key.into(), collection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observers_run_in_attach_order() {
        let stream = event_input::<Time>();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&log);
        stream.on_event(move |_| first.lock().unwrap().push("first"));
        let second = Arc::clone(&log);
        stream.on_event(move |_| second.lock().unwrap().push("second"));

        stream.add_event(Event::of(Time::from_ms(0), 1.0)).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn branches_share_upstream_work() {
        let stream = event_input::<Time>();
        let shared = stream.map(|e: Event<Time>| {
            let v = e.get_f64("value").unwrap_or(0.0);
            e.set("value", v + 1.0)
        });
        let evens = shared
            .filter(|e| (e.get_f64("value").unwrap_or(0.0) as i64) % 2 == 0)
            .collect();
        let all = shared.collect();

        for i in 0..4 {
            stream.add_event(Event::of(Time::from_ms(i), i as f64)).unwrap();
        }
        assert_eq!(all.len(), 4);
        assert_eq!(evens.len(), 2);
    }

    #[test]
    fn keyed_collection_roots_feed_aggregation() {
        let stream = collection_input::<Time>();
        let out = stream
            .aggregate(
                AggregationSpec::new().field(
                    "n",
                    "value",
                    crate::reducers::count(crate::reducers::Missing::Ignore),
                ),
            )
            .unwrap()
            .collect();

        let coll: SortedCollection<Time> =
            [Event::of(Time::from_ms(0), 1.0)].into_iter().collect();
        stream.add_collection("30s-0", coll).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.items()[0].key_string(), "30s-0");
    }
}
