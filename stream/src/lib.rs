//! Fluent lazy sequence pipelines.
//!
//! A [`Stream`] wraps a borrowed or owned sequence source and exposes
//! chainable transformations (map, filter, take, split, join, chunk, …)
//! that each return a new lazily-evaluated pipeline. Nothing touches the
//! underlying elements until a terminal operation (collect, run, count,
//! reduce, …) performs the single traversal that forces evaluation.
//!
//! ```
//! use stream::Stream;
//!
//! let doubled = Stream::range(1, 5)
//!     .map(|value| value * 2)
//!     .filter(|value| *value < 5)
//!     .collect();
//!
//! assert_eq!(doubled, stream::Vector::from(vec![2, 4]));
//! ```
//!
//! Pipelines stay inert until a terminal operation runs:
//!
//! ```
//! use std::cell::Cell;
//! use stream::Stream;
//!
//! let calls = Cell::new(0);
//! let values = vec![1, 2, 3];
//! let pipeline = Stream::of(&values).each(|_| calls.set(calls.get() + 1));
//! assert_eq!(calls.get(), 0);
//!
//! pipeline.run();
//! assert_eq!(calls.get(), 3);
//! ```
//!
//! Pipelines over `Stream::of` borrow their source and are valid only as
//! long as it lives; `Stream::of_vector` and `Stream::range` own theirs.
//! Materialized results use the persistent [`Vector`] type, so collecting
//! and regrouping share structure instead of copying.

pub mod error;
pub mod pipeline;
pub(crate) mod stage;

pub use error::StreamError;
pub use pipeline::Stream;

/// Persistent vector used for all materialized sequences.
pub use im_rc::Vector;
