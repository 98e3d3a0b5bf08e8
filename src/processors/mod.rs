//! Stateful event-to-events transformers.
//!
//! A [`Processor`] turns one incoming event into zero, one, or many
//! outgoing events, holding whatever bounded history it needs between
//! calls (the alignment processor remembers the previous event, linear
//! fill buffers a run of missing values, the windower tracks open
//! windows).
//!
//! The same processors back both execution styles:
//!
//! - **Batch**: collection methods (`align`, `rate`, `fill`, ...) run a
//!   fresh processor across the collection's events via [`run`].
//! - **Streaming**: a processor is wrapped in a stream node and fed one
//!   event per `add_event` (see [`crate::stream`]).

pub mod aggregate;
pub mod align;
pub mod collapse;
pub mod fill;
pub mod rate;
pub mod reduce;
pub mod select;
pub mod window;

pub use aggregate::Aggregator;
pub use align::{Align, AlignMethod, AlignOptions};
pub use collapse::Collapse;
pub use fill::{Fill, FillMethod, FillOptions};
pub use rate::{Rate, RateOptions};
pub use reduce::{ReduceFn, RollingReduce};
pub use select::Select;
pub use window::{KeyedCollection, Trigger, WindowOptions, Windower};

use crate::error::Result;

/// A stateful transform from one input to zero-or-more outputs.
///
/// State is owned exclusively by the processor and mutated only inside
/// `process`; a failing call propagates to the caller untouched (the core
/// never swallows per-event errors).
pub trait Processor {
    /// Incoming item type.
    type In;
    /// Outgoing item type.
    type Out;

    /// Transform one input, updating internal state.
    fn process(&mut self, input: Self::In) -> Result<Vec<Self::Out>>;
}

/// Drive a processor across a whole input sequence (batch mode).
pub fn run<P: Processor>(
    processor: &mut P,
    inputs: impl IntoIterator<Item = P::In>,
) -> Result<Vec<P::Out>> {
    let mut out = Vec::new();
    for input in inputs {
        out.extend(processor.process(input)?);
    }
    Ok(out)
}
