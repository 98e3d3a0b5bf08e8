//! Multi-field collapse as a processor.

use super::Processor;
use crate::error::Result;
use crate::event::Event;
use crate::key::Key;
use crate::reducers::Reducer;
use std::marker::PhantomData;

/// Emits each event with the listed fields reduced into one output field
/// (see [`Event::collapse`]).
pub struct Collapse<K: Key> {
    fields: Vec<String>,
    out_name: String,
    reducer: Reducer,
    append: bool,
    _key: PhantomData<K>,
}

impl<K: Key> Collapse<K> {
    /// Collapse `fields` into `out_name` via `reducer`; `append` keeps the
    /// original fields alongside the result.
    #[must_use]
    pub fn new(fields: &[&str], out_name: impl Into<String>, reducer: Reducer, append: bool) -> Self {
        Self {
            fields: fields.iter().map(ToString::to_string).collect(),
            out_name: out_name.into(),
            reducer,
            append,
            _key: PhantomData,
        }
    }
}

impl<K: Key> Processor for Collapse<K> {
    type In = Event<K>;
    type Out = Event<K>;

    fn process(&mut self, event: Self::In) -> Result<Vec<Self::Out>> {
        let fields: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        Ok(vec![event.collapse(
            &fields,
            &self.out_name,
            &self.reducer,
            self.append,
        )])
    }
}
