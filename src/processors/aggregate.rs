//! Streaming aggregation: window collections to indexed events.

use super::window::KeyedCollection;
use super::Processor;
use crate::aggregation::AggregationSpec;
use crate::error::Result;
use crate::event::Event;
use crate::index::Index;
use crate::key::Key;
use crate::windowed::WindowKey;
use std::marker::PhantomData;

/// Consumes `(window key, collection)` tuples and emits one
/// `Index`-keyed event per tuple, its data computed by the aggregation
/// spec. A `group::index` composite key is split and the group dropped;
/// the index part keys the output.
pub struct Aggregator<K: Key> {
    spec: AggregationSpec,
    _key: PhantomData<K>,
}

impl<K: Key> Aggregator<K> {
    /// Validate the spec and build the node.
    pub fn new(spec: AggregationSpec) -> Result<Self> {
        spec.validate()?;
        Ok(Self {
            spec,
            _key: PhantomData,
        })
    }
}

impl<K: Key> Processor for Aggregator<K> {
    type In = KeyedCollection<K>;
    type Out = Event<Index>;

    fn process(&mut self, input: Self::In) -> Result<Vec<Self::Out>> {
        let (key, collection) = input;
        let window_key = WindowKey::parse(&key);
        let index = Index::parse(window_key.index())?;
        let data = self.spec.apply(&collection);
        Ok(vec![Event::new(index, data)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::SortedCollection;
    use crate::reducers::{self, Missing};
    use crate::time::Time;

    #[test]
    fn tuples_become_indexed_events() {
        let spec = AggregationSpec::new().field("avg", "value", reducers::avg(Missing::Ignore));
        let mut agg = Aggregator::new(spec).unwrap();

        let coll: SortedCollection<Time> = [
            Event::of(Time::from_ms(0), 1.0),
            Event::of(Time::from_ms(15_000), 2.0),
        ]
        .into_iter()
        .collect();

        let out = agg.process(("30s-0".to_string(), coll)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].key_string(), "30s-0");
        assert_eq!(out[0].get_f64("avg"), Some(1.5));
    }

    #[test]
    fn group_prefixes_are_stripped() {
        let spec = AggregationSpec::new().field("n", "value", reducers::count(Missing::Ignore));
        let mut agg = Aggregator::new(spec).unwrap();
        let coll: SortedCollection<Time> =
            [Event::of(Time::from_ms(0), 1.0)].into_iter().collect();
        let out = agg.process(("in::30s-0".to_string(), coll)).unwrap();
        assert_eq!(out[0].key_string(), "30s-0");
    }
}
