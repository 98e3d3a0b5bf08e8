//! Field selection as a processor.

use super::Processor;
use crate::error::Result;
use crate::event::Event;
use crate::key::Key;
use std::marker::PhantomData;

/// Emits each event with only the listed top-level fields retained.
pub struct Select<K: Key> {
    fields: Vec<String>,
    _key: PhantomData<K>,
}

impl<K: Key> Select<K> {
    /// Retain only `fields`.
    #[must_use]
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(ToString::to_string).collect(),
            _key: PhantomData,
        }
    }
}

impl<K: Key> Processor for Select<K> {
    type In = Event<K>;
    type Out = Event<K>;

    fn process(&mut self, event: Self::In) -> Result<Vec<Self::Out>> {
        let fields: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        Ok(vec![event.select(&fields)])
    }
}
