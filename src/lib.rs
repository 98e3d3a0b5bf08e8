//! # Tideflow
//!
//! A **time-series processing library** for Rust: events keyed by time,
//! grouped and windowed, flowing through a graph of stream processors that
//! align, fill, rate-convert, aggregate, reduce, and re-key the data.
//!
//! ## Key Features
//!
//! - **Three key variants** - instants ([`Time`]), intervals
//!   ([`TimeRange`]), and named window buckets ([`Index`])
//! - **Immutable collections** - [`Collection`] and [`SortedCollection`]
//!   with `map`/`filter`/`flat_map`/`aggregate`, structural sharing
//!   throughout
//! - **Grouping and windowing** - [`GroupedCollection`] and
//!   [`WindowedCollection`] with per-group parallel aggregation
//! - **Stateful processors** - align, fill (zero/pad/linear), rate,
//!   rolling reduce, select, collapse; one implementation serving both
//!   batch and streaming execution
//! - **A push-based stream graph** - typed facades over a node tree;
//!   synchronous, ordered, branchable
//! - **Built-in reducers** - `sum`, `avg`, `min`, `max`, `median`,
//!   `percentile`, `stdev`, `count`, `first`, `last`, `keep`,
//!   `difference`, each with selectable missing-value policies
//!
//! ## Quick Start
//!
//! ```
//! use tideflow::*;
//! use tideflow::reducers::{avg, Missing};
//!
//! # fn main() -> anyhow::Result<()> {
//! // Build a half-minute averaged view of an irregular series.
//! let series: SortedCollection<Time> = [
//!     (0, 1.0), (15_000, 2.0), (45_000, 3.0), (65_000, 4.0),
//! ]
//! .into_iter()
//! .map(|(ms, v)| Event::of(Time::from_ms(ms), v))
//! .collect();
//!
//! let windowed = series.window(&Window::fixed(Duration::seconds(30)));
//! let spec = AggregationSpec::new().field("avg", "value", avg(Missing::Ignore));
//! let per_window = windowed.aggregate(&spec)?;
//!
//! let avgs = per_window.get("_").unwrap();
//! assert_eq!(avgs.at(0).unwrap().key_string(), "30s-0");
//! assert_eq!(avgs.at(0).unwrap().get_f64("avg"), Some(1.5));
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Events and keys
//!
//! An [`Event<K>`] is an immutable `(key, data)` pair. The data payload is
//! a JSON-shaped tree addressed by dot-paths (`"net.in.bytes"`); `set`
//! returns a new event and leaves the receiver untouched. The key is one
//! of:
//!
//! - [`Time`] - a millisecond instant,
//! - [`TimeRange`] - an ordered `(begin, end)` interval,
//! - [`Index`] - a string naming one repetition of a window, such as
//!   `30s-4` or `2015-07`, parseable back into its range.
//!
//! ### Collections
//!
//! A [`Collection`] is an immutable ordered bag of events; a
//! [`SortedCollection`] additionally guarantees chronological order and
//! offers `bisect`/`slice`/`crop`. Batch processing chains collection
//! methods; every step returns a new collection.
//!
//! ### Streaming
//!
//! A stream is a tree of processor nodes. [`stream::event_input`] makes a
//! root; facade methods (`align`, `rate`, `window`, `aggregate`, ...)
//! append nodes and return new facades. `add_event` pushes one event
//! through the whole graph synchronously:
//!
//! ```
//! use tideflow::*;
//! use tideflow::processors::{Trigger, WindowOptions};
//! use tideflow::reducers::{avg, Missing};
//!
//! # fn main() -> anyhow::Result<()> {
//! let input = stream::event_input::<Time>();
//! let averages = input
//!     .window(WindowOptions::new(Window::fixed(Duration::seconds(30)))
//!         .trigger(Trigger::OnDiscardedWindow))
//!     .aggregate(AggregationSpec::new().field("avg", "value", avg(Missing::Ignore)))?
//!     .collect();
//!
//! for (ms, v) in [(0, 1.0), (15_000, 2.0), (45_000, 3.0), (65_000, 4.0)] {
//!     input.add_event(Event::of(Time::from_ms(ms), v))?;
//! }
//! assert_eq!(averages.len(), 2); // 30s-0 and 30s-1 completed
//! # Ok(())
//! # }
//! ```
//!
//! ### Windows and periods
//!
//! A [`Period`] is a repeating frequency with an alignment offset; a
//! [`Window`] pairs a duration with a period, describing fixed or sliding
//! interval families. [`Window::index_set`] computes which windows contain
//! an instant.
//!
//! ## Error Handling
//!
//! Fallible operations return [`Result`] with the typed [`Error`] enum.
//! The core never catches: an error unwinds through the stream graph to
//! the `add_event` caller. Non-fatal anomalies (a non-numeric value under
//! linear interpolation, a suppressed negative rate) log a `tracing`
//! warning and null the affected field instead.
//!
//! ## Module Overview
//!
//! - [`event`] - the `Event` type and its static operations
//! - [`collection`] - `Collection` / `SortedCollection`
//! - [`grouped`] / [`windowed`] - grouped and windowed views
//! - [`processors`] - the stateful transforms
//! - [`reducers`] - reduction functions and missing-value policies
//! - [`stream`] - the push-based node graph and facades
//! - [`wire`] - columns/points JSON interchange
//! - [`testing`] - builders and assertions for tests

pub mod aggregation;
pub mod collection;
pub mod duration;
pub mod error;
pub mod event;
pub mod grouped;
pub mod index;
pub mod key;
pub mod period;
pub mod processors;
pub mod reducers;
pub mod stream;
pub mod testing;
pub mod time;
pub mod value;
pub mod window;
pub mod windowed;
pub mod wire;

// General re-exports
pub use aggregation::AggregationSpec;
pub use collection::{Collection, Dedup, SortedCollection};
pub use duration::Duration;
pub use error::{Error, Result};
pub use event::Event;
pub use grouped::{GroupBy, GroupedCollection};
pub use index::Index;
pub use key::{Key, KeyKind};
pub use period::Period;
pub use processors::{
    AlignMethod, AlignOptions, FillMethod, FillOptions, Processor, RateOptions, Trigger,
    WindowOptions,
};
pub use reducers::{Missing, Reducer};
pub use stream::{EventStream, KeyedCollectionStream};
pub use time::{Time, TimeRange};
pub use window::Window;
pub use windowed::{WindowKey, WindowedCollection};
