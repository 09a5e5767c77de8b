//! Lazy pipeline stages.
//!
//! A pipeline is a chain of [`Stage`] values, each wrapping its `Rc`-shared
//! predecessor together with the per-element logic of one operation. Stages
//! are immutable once built and compose by nesting; nothing touches the
//! underlying source until a terminal operation drives [`Stage::traverse`].

use std::ops::ControlFlow;
use std::rc::Rc;

use im_rc::Vector;


/// Receives elements one at a time and decides whether traversal continues.
pub(crate) type Sink<'s, T> = dyn FnMut(T) -> ControlFlow<()> + 's;

/// One link in a transformation pipeline.
///
/// `traverse` feeds every produced element to `sink` in order, stopping as
/// soon as the sink (or an internal limit such as `take`) breaks. Traversal
/// borrows the stage immutably, so a stage may be walked any number of
/// times, including re-entrantly while an outer walk of the same stage is
/// in progress. `uniq` and `with_index` rely on that.
pub(crate) trait Stage<T> {
    fn traverse(&self, sink: &mut Sink<'_, T>) -> ControlFlow<()>;
}

// ============================================================================
// Sources
// ============================================================================

/// Borrowing view over a slice; elements are cloned out on demand.
pub(crate) struct SliceStage<'a, T> {
    pub(crate) items: &'a [T],
}

impl<T: Clone> Stage<T> for SliceStage<'_, T> {
    fn traverse(&self, sink: &mut Sink<'_, T>) -> ControlFlow<()> {
        for item in self.items {
            if sink(item.clone()).is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}

/// Owned persistent vector source.
pub(crate) struct VectorStage<T> {
    pub(crate) items: Vector<T>,
}

impl<T: Clone> Stage<T> for VectorStage<T> {
    fn traverse(&self, sink: &mut Sink<'_, T>) -> ControlFlow<()> {
        for item in self.items.iter() {
            if sink(item.clone()).is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}

/// Owned inclusive integer progression. Empty when `end < begin`.
pub(crate) struct RangeStage {
    pub(crate) begin: i64,
    pub(crate) end: i64,
}

impl Stage<i64> for RangeStage {
    fn traverse(&self, sink: &mut Sink<'_, i64>) -> ControlFlow<()> {
        for value in self.begin..=self.end {
            if sink(value).is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}

/// A sequence of exactly one element.
pub(crate) struct SingleStage<T> {
    pub(crate) value: T,
}

impl<T: Clone> Stage<T> for SingleStage<T> {
    fn traverse(&self, sink: &mut Sink<'_, T>) -> ControlFlow<()> {
        sink(self.value.clone())
    }
}

// ============================================================================
// Per-element transforms
// ============================================================================

/// Applies a mapper to each upstream element.
pub(crate) struct MapStage<'a, T, F> {
    pub(crate) source: Rc<dyn Stage<T> + 'a>,
    pub(crate) mapper: F,
}

impl<'a, T, U, F> Stage<U> for MapStage<'a, T, F>
where
    F: Fn(T) -> U,
{
    fn traverse(&self, sink: &mut Sink<'_, U>) -> ControlFlow<()> {
        self.source
            .traverse(&mut |value| sink((self.mapper)(value)))
    }
}

/// Invokes a side effect per element, yielding the element unchanged.
pub(crate) struct EachStage<'a, T, F> {
    pub(crate) source: Rc<dyn Stage<T> + 'a>,
    pub(crate) effect: F,
}

impl<'a, T, F> Stage<T> for EachStage<'a, T, F>
where
    F: Fn(&T),
{
    fn traverse(&self, sink: &mut Sink<'_, T>) -> ControlFlow<()> {
        self.source.traverse(&mut |value| {
            (self.effect)(&value);
            sink(value)
        })
    }
}

/// Keeps elements matching a predicate, order preserved.
pub(crate) struct FilterStage<'a, T, F> {
    pub(crate) source: Rc<dyn Stage<T> + 'a>,
    pub(crate) predicate: F,
}

impl<'a, T, F> Stage<T> for FilterStage<'a, T, F>
where
    F: Fn(&T) -> bool,
{
    fn traverse(&self, sink: &mut Sink<'_, T>) -> ControlFlow<()> {
        self.source.traverse(&mut |value| {
            if (self.predicate)(&value) {
                sink(value)
            } else {
                ControlFlow::Continue(())
            }
        })
    }
}

/// Yields at most the first `limit` elements, then cuts the upstream walk.
pub(crate) struct TakeStage<'a, T> {
    pub(crate) source: Rc<dyn Stage<T> + 'a>,
    pub(crate) limit: usize,
}

impl<T> Stage<T> for TakeStage<'_, T> {
    fn traverse(&self, sink: &mut Sink<'_, T>) -> ControlFlow<()> {
        if self.limit == 0 {
            return ControlFlow::Continue(());
        }
        let mut remaining = self.limit;
        self.source.traverse(&mut |value| {
            remaining -= 1;
            let flow = sink(value);
            if remaining == 0 {
                ControlFlow::Break(())
            } else {
                flow
            }
        })
    }
}

/// Drops the first `count` elements, yielding the rest.
pub(crate) struct SkipStage<'a, T> {
    pub(crate) source: Rc<dyn Stage<T> + 'a>,
    pub(crate) count: usize,
}

impl<T> Stage<T> for SkipStage<'_, T> {
    fn traverse(&self, sink: &mut Sink<'_, T>) -> ControlFlow<()> {
        let mut remaining = self.count;
        self.source.traverse(&mut |value| {
            if remaining > 0 {
                remaining -= 1;
                ControlFlow::Continue(())
            } else {
                sink(value)
            }
        })
    }
}

// ============================================================================
// Structural transforms
// ============================================================================

/// Splits the sequence into groups delimited by a token.
///
/// String-split semantics: the token itself is dropped, consecutive tokens
/// and tokens at either boundary produce empty groups, and an empty input
/// produces no groups at all.
pub(crate) struct SplitStage<'a, T> {
    pub(crate) source: Rc<dyn Stage<T> + 'a>,
    pub(crate) token: T,
}

impl<T> Stage<Vector<T>> for SplitStage<'_, T>
where
    T: Clone + PartialEq,
{
    fn traverse(&self, sink: &mut Sink<'_, Vector<T>>) -> ControlFlow<()> {
        let mut group = Vector::new();
        let mut seen_any = false;
        let mut cut_short = false;
        let _ = self.source.traverse(&mut |value| {
            seen_any = true;
            if value == self.token {
                let flow = sink(std::mem::take(&mut group));
                if flow.is_break() {
                    cut_short = true;
                }
                flow
            } else {
                group.push_back(value);
                ControlFlow::Continue(())
            }
        });
        if cut_short {
            return ControlFlow::Break(());
        }
        if seen_any {
            // The group after the last token, possibly empty.
            sink(group)
        } else {
            ControlFlow::Continue(())
        }
    }
}

/// Flattens a sequence of element groups one nesting level.
pub(crate) struct JoinStage<'a, G> {
    pub(crate) source: Rc<dyn Stage<G> + 'a>,
}

impl<G, U> Stage<U> for JoinStage<'_, G>
where
    G: IntoIterator<Item = U>,
{
    fn traverse(&self, sink: &mut Sink<'_, U>) -> ControlFlow<()> {
        self.source.traverse(&mut |group| {
            for item in group {
                if sink(item).is_break() {
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        })
    }
}

/// Consecutive non-overlapping groups of `size` elements; the final group
/// is shorter when the input length is not a multiple of `size`.
///
/// `size` is validated to be at least 1 before the stage is constructed.
pub(crate) struct ChunkStage<'a, T> {
    pub(crate) source: Rc<dyn Stage<T> + 'a>,
    pub(crate) size: usize,
}

impl<T: Clone> Stage<Vector<T>> for ChunkStage<'_, T> {
    fn traverse(&self, sink: &mut Sink<'_, Vector<T>>) -> ControlFlow<()> {
        let mut group = Vector::new();
        let mut cut_short = false;
        let _ = self.source.traverse(&mut |value| {
            group.push_back(value);
            if group.len() == self.size {
                let flow = sink(std::mem::take(&mut group));
                if flow.is_break() {
                    cut_short = true;
                }
                flow
            } else {
                ControlFlow::Continue(())
            }
        });
        if cut_short {
            return ControlFlow::Break(());
        }
        if group.is_empty() {
            ControlFlow::Continue(())
        } else {
            sink(group)
        }
    }
}

// ============================================================================
// Aggregate-derived transforms
// ============================================================================

/// Pairs each element with its position, index first.
///
/// Walks the source once to learn the length, then once more per position
/// to fetch the element. Positional access over a single-pass source costs
/// a partial walk per index.
pub(crate) struct WithIndexStage<'a, T> {
    pub(crate) source: Rc<dyn Stage<T> + 'a>,
}

impl<T> Stage<(usize, T)> for WithIndexStage<'_, T> {
    fn traverse(&self, sink: &mut Sink<'_, (usize, T)>) -> ControlFlow<()> {
        let mut total = 0usize;
        let _ = self.source.traverse(&mut |_| {
            total += 1;
            ControlFlow::Continue(())
        });
        for index in 0..total {
            let mut position = 0usize;
            let mut picked = None;
            let _ = self.source.traverse(&mut |value| {
                if position == index {
                    picked = Some(value);
                    ControlFlow::Break(())
                } else {
                    position += 1;
                    ControlFlow::Continue(())
                }
            });
            let Some(value) = picked else {
                // The source shrank between walks; stop rather than invent
                // elements.
                return ControlFlow::Continue(());
            };
            if sink((index, value)).is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}

/// Keeps each distinct value once, in first-occurrence order.
///
/// The element at position `i` is kept iff it does not occur among the
/// first `i` elements, checked by re-walking the upstream prefix once per
/// element. Quadratic in comparisons, but requires only `PartialEq` of the
/// element type, never `Hash`.
pub(crate) struct UniqStage<'a, T> {
    pub(crate) source: Rc<dyn Stage<T> + 'a>,
}

impl<T: PartialEq> Stage<T> for UniqStage<'_, T> {
    fn traverse(&self, sink: &mut Sink<'_, T>) -> ControlFlow<()> {
        let mut index = 0usize;
        self.source.traverse(&mut |value| {
            let prefix = index;
            index += 1;
            let mut occurrences = 0usize;
            let mut walked = 0usize;
            let _ = self.source.traverse(&mut |candidate| {
                if walked == prefix {
                    return ControlFlow::Break(());
                }
                walked += 1;
                if candidate == value {
                    occurrences += 1;
                }
                ControlFlow::Continue(())
            });
            if occurrences == 0 {
                sink(value)
            } else {
                ControlFlow::Continue(())
            }
        })
    }
}
