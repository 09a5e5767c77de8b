//! The fluent pipeline surface.
//!
//! [`Stream`] values describe how to produce a sequence; they hold no
//! materialized data beyond their source. Chain methods wrap the current
//! pipeline in a further stage and cost nothing per element; terminal
//! operations perform the single traversal that ends laziness.

use std::ops::ControlFlow;
use std::rc::Rc;

use im_rc::Vector;
use num_traits::Zero;

use crate::error::StreamError;
use crate::stage::{
    ChunkStage, EachStage, FilterStage, JoinStage, MapStage, RangeStage, SingleStage, SkipStage,
    SliceStage, Stage, SplitStage, TakeStage, UniqStage, VectorStage, WithIndexStage,
};


/// A lazily-evaluated sequence of `T`.
///
/// Cloning a `Stream` is cheap (an `Rc` bump) and yields an independent
/// handle onto the same immutable pipeline, so a common prefix can be
/// extended into several divergent pipelines. Traversal only happens when a
/// terminal operation runs, and an unconsumed pipeline never touches its
/// source.
///
/// Pipelines built over a borrowed slice (`Stream::of`) are tied to the
/// source's lifetime; pipelines over owned sources (`of_vector`, `range`,
/// `single`) carry no such coupling.
pub struct Stream<'a, T> {
    stage: Rc<dyn Stage<T> + 'a>,
}

impl<'a, T> Clone for Stream<'a, T> {
    fn clone(&self) -> Self {
        Self {
            stage: Rc::clone(&self.stage),
        }
    }
}

impl<'a> Stream<'a, i64> {
    /// Lazily enumerates the inclusive interval `[begin, end]`.
    ///
    /// `end < begin` yields the empty sequence.
    pub fn range(begin: i64, end: i64) -> Self {
        Stream::from_stage(Rc::new(RangeStage { begin, end }))
    }
}

impl<'a, T: 'a> Stream<'a, T> {
    fn from_stage(stage: Rc<dyn Stage<T> + 'a>) -> Self {
        Self { stage }
    }

    /// Wraps an external slice by reference, without copying elements.
    ///
    /// The returned pipeline is valid only as long as the slice it borrows.
    pub fn of(items: &'a [T]) -> Self
    where
        T: Clone,
    {
        Stream::from_stage(Rc::new(SliceStage { items }))
    }

    /// Wraps an owned persistent vector. Sharing is structural, so handing
    /// a `Vector` over costs nothing regardless of its length.
    pub fn of_vector(items: Vector<T>) -> Self
    where
        T: Clone,
    {
        Stream::from_stage(Rc::new(VectorStage { items }))
    }

    /// A sequence of exactly one element.
    pub fn single(value: T) -> Self
    where
        T: Clone,
    {
        Stream::from_stage(Rc::new(SingleStage { value }))
    }

    // ------------------------------------------------------------------
    // Chain operations
    // ------------------------------------------------------------------

    /// Transforms each element with `mapper`, evaluated once per element
    /// during terminal traversal.
    pub fn map<U, F>(&self, mapper: F) -> Stream<'a, U>
    where
        U: 'a,
        F: Fn(T) -> U + 'a,
    {
        Stream::from_stage(Rc::new(MapStage {
            source: Rc::clone(&self.stage),
            mapper,
        }))
    }

    /// Invokes `effect` for each element during traversal, yielding the
    /// element unchanged. Callers mutate captured state through `Cell` or
    /// `RefCell`.
    pub fn each<F>(&self, effect: F) -> Stream<'a, T>
    where
        F: Fn(&T) + 'a,
    {
        Stream::from_stage(Rc::new(EachStage {
            source: Rc::clone(&self.stage),
            effect,
        }))
    }

    /// Keeps the elements for which `predicate` holds, preserving order.
    pub fn filter<F>(&self, predicate: F) -> Stream<'a, T>
    where
        F: Fn(&T) -> bool + 'a,
    {
        Stream::from_stage(Rc::new(FilterStage {
            source: Rc::clone(&self.stage),
            predicate,
        }))
    }

    /// Drops the elements for which `predicate` holds; the exact
    /// complement of [`Stream::filter`].
    pub fn reject<F>(&self, predicate: F) -> Stream<'a, T>
    where
        F: Fn(&T) -> bool + 'a,
    {
        self.filter(move |value| !predicate(value))
    }

    /// Yields at most the first `limit` elements, stopping the upstream
    /// walk as soon as the limit is reached.
    pub fn take(&self, limit: usize) -> Stream<'a, T> {
        Stream::from_stage(Rc::new(TakeStage {
            source: Rc::clone(&self.stage),
            limit,
        }))
    }

    /// Drops the first `count` elements, yielding the rest.
    pub fn skip(&self, count: usize) -> Stream<'a, T> {
        Stream::from_stage(Rc::new(SkipStage {
            source: Rc::clone(&self.stage),
            count,
        }))
    }

    /// Splits the sequence into contiguous groups delimited by `token`.
    ///
    /// The token is excluded from the output. Consecutive tokens and tokens
    /// at either boundary produce empty groups; an empty input produces no
    /// groups.
    pub fn split_by(&self, token: T) -> Stream<'a, Vector<T>>
    where
        T: Clone + PartialEq,
    {
        Stream::from_stage(Rc::new(SplitStage {
            source: Rc::clone(&self.stage),
            token,
        }))
    }

    /// Flattens a sequence of element groups one nesting level, preserving
    /// order.
    pub fn join<U>(&self) -> Stream<'a, U>
    where
        T: IntoIterator<Item = U>,
        U: 'a,
    {
        Stream::from_stage(Rc::new(JoinStage {
            source: Rc::clone(&self.stage),
        }))
    }

    /// Pairs each element with its position, starting from 0.
    ///
    /// Counts the sequence first, then fetches each position by walking the
    /// source again, so the cost over a single-pass source is one partial
    /// walk per element.
    pub fn with_index(&self) -> Stream<'a, (usize, T)> {
        Stream::from_stage(Rc::new(WithIndexStage {
            source: Rc::clone(&self.stage),
        }))
    }

    /// Keeps each distinct value once, in first-occurrence order.
    ///
    /// Re-walks the upstream prefix once per element, so only equality of
    /// the element type is required.
    pub fn uniq(&self) -> Stream<'a, T>
    where
        T: PartialEq,
    {
        Stream::from_stage(Rc::new(UniqStage {
            source: Rc::clone(&self.stage),
        }))
    }

    /// Groups the sequence into consecutive chunks of `size` elements; the
    /// final chunk is shorter when the length is not a multiple of `size`.
    ///
    /// `size` must be at least 1.
    pub fn chunk_every(&self, size: usize) -> Result<Stream<'a, Vector<T>>, StreamError>
    where
        T: Clone,
    {
        if size == 0 {
            return Err(StreamError::InvalidArgument {
                operation: "chunk_every",
                message: "chunk size must be at least 1".to_string(),
            });
        }
        Ok(Stream::from_stage(Rc::new(ChunkStage {
            source: Rc::clone(&self.stage),
            size,
        })))
    }

    /// Folds the sequence into a single value, left to right from
    /// `initial`.
    ///
    /// The fold runs immediately; the result is wrapped as a one-element
    /// pipeline so it keeps composing.
    pub fn reduce<A, F>(&self, initial: A, folder: F) -> Stream<'a, A>
    where
        A: Clone + 'a,
        F: Fn(A, T) -> A,
    {
        let mut accumulator = initial;
        let _ = self.stage.traverse(&mut |value| {
            accumulator = folder(accumulator.clone(), value);
            ControlFlow::Continue(())
        });
        Stream::single(accumulator)
    }

    // ------------------------------------------------------------------
    // Terminal operations
    // ------------------------------------------------------------------

    /// Forces full traversal, materializing every element in order. This is
    /// the single point where laziness ends.
    ///
    /// Collecting the same pipeline twice over an unchanged source yields
    /// identical results.
    pub fn collect(&self) -> Vector<T>
    where
        T: Clone,
    {
        let mut items = Vector::new();
        let _ = self.stage.traverse(&mut |value| {
            items.push_back(value);
            ControlFlow::Continue(())
        });
        items
    }

    /// Forces traversal for its side effects and discards the elements.
    pub fn run(&self) {
        let _ = self.stage.traverse(&mut |_| ControlFlow::Continue(()));
    }

    /// The total number of elements.
    pub fn count(&self) -> usize {
        let mut total = 0usize;
        let _ = self.stage.traverse(&mut |_| {
            total += 1;
            ControlFlow::Continue(())
        });
        total
    }

    /// The number of elements equal to `value`.
    pub fn count_of(&self, value: &T) -> usize
    where
        T: PartialEq,
    {
        let mut occurrences = 0usize;
        let _ = self.stage.traverse(&mut |candidate| {
            if candidate == *value {
                occurrences += 1;
            }
            ControlFlow::Continue(())
        });
        occurrences
    }

    /// Whether any element equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.count_of(value) > 0
    }

    /// The earliest element, or `None` on an empty sequence. Stops the
    /// traversal at the first element.
    pub fn first(&self) -> Option<T> {
        let mut found = None;
        let _ = self.stage.traverse(&mut |value| {
            found = Some(value);
            ControlFlow::Break(())
        });
        found
    }

    /// The earliest element matching `predicate`, stopping the traversal at
    /// the hit.
    pub fn find<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        let mut found = None;
        let _ = self.stage.traverse(&mut |value| {
            if predicate(&value) {
                found = Some(value);
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        found
    }

    /// The minimum element by natural ordering; the first one wins among
    /// equals. Fails with [`StreamError::EmptySequence`] on zero elements.
    pub fn min(&self) -> Result<T, StreamError>
    where
        T: Ord,
    {
        let mut smallest: Option<T> = None;
        let _ = self.stage.traverse(&mut |value| {
            match &smallest {
                Some(current) if *current <= value => {}
                _ => smallest = Some(value),
            }
            ControlFlow::Continue(())
        });
        smallest.ok_or(StreamError::EmptySequence { operation: "min" })
    }

    /// The maximum element by natural ordering; the first one wins among
    /// equals. Fails with [`StreamError::EmptySequence`] on zero elements.
    pub fn max(&self) -> Result<T, StreamError>
    where
        T: Ord,
    {
        let mut largest: Option<T> = None;
        let _ = self.stage.traverse(&mut |value| {
            match &largest {
                Some(current) if *current >= value => {}
                _ => largest = Some(value),
            }
            ControlFlow::Continue(())
        });
        largest.ok_or(StreamError::EmptySequence { operation: "max" })
    }

    /// The arithmetic sum of all elements, starting from the zero of the
    /// element type. An empty sequence sums to zero.
    pub fn sum(&self) -> T
    where
        T: Zero,
    {
        let mut total = T::zero();
        let _ = self.stage.traverse(&mut |value| {
            total = std::mem::replace(&mut total, T::zero()) + value;
            ControlFlow::Continue(())
        });
        total
    }

    /// Whether every element satisfies `predicate`: the matching count
    /// equals the total count. Vacuously true on an empty sequence.
    pub fn all<F>(&self, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let (matching, total) = self.count_matches(predicate);
        matching == total
    }

    /// Whether at least one element satisfies `predicate`: the matching
    /// count is positive.
    pub fn any<F>(&self, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let (matching, _) = self.count_matches(predicate);
        matching > 0
    }

    fn count_matches<F>(&self, predicate: F) -> (usize, usize)
    where
        F: Fn(&T) -> bool,
    {
        let mut matching = 0usize;
        let mut total = 0usize;
        let _ = self.stage.traverse(&mut |value| {
            total += 1;
            if predicate(&value) {
                matching += 1;
            }
            ControlFlow::Continue(())
        });
        (matching, total)
    }
}

impl<'a, K: 'a, V: 'a> Stream<'a, (K, V)> {
    /// Projects the first component of each pair, preserving order.
    pub fn keys(&self) -> Stream<'a, K> {
        self.map(|(key, _)| key)
    }

    /// Projects the second component of each pair, preserving order.
    pub fn values(&self) -> Stream<'a, V> {
        self.map(|(_, value)| value)
    }
}
