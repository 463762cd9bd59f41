//! Filter contract and the priority-ordered two-phase dispatch.
//!
//! Filters declare an integer order. Strictly negative orders run in the
//! pre-request phase, where only the outgoing request is visible; zero and
//! positive orders run in the post-request phase with both views. The
//! registry keys filters by that order in a [`PriorityMap`] and dispatch
//! walks the two half-ranges in ascending order, each bucket in
//! registration order.

use std::any::Any;
use std::fmt;
use std::io;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::collections::PriorityMap;
use crate::context::{RequestInformation, ResponseInformation};

/// Well-known dispatch priorities.
pub mod order {
    /// Before the exchange; only the outgoing request is visible.
    pub const PRE_REQUEST: i32 = -10;
    /// First thing after a response exists, so later post filters observe
    /// decoded bytes.
    pub const POST_REQUEST_DECODE: i32 = 1;
    /// After a response exists.
    pub const POST_REQUEST: i32 = 10;
}

/// Error raised inside a filter.
///
/// Propagates synchronously to the dispatcher's caller and aborts the
/// remaining filters of that phase; there is no partial-failure
/// continuation. Callers needing isolation must wrap individual filters.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("filter failed: {reason}")]
    Failed { reason: String },

    #[error("filter io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl FilterError {
    pub fn failed<S: ToString>(reason: S) -> Self {
        Self::Failed { reason: reason.to_string() }
    }
}

/// A unit of request/response side-effecting behavior with a declared
/// dispatch priority.
///
/// Implementations must not assume any ordering relative to filters at
/// other priorities beyond the pre/post split and ascending numeric order.
pub trait Filter: Send + Sync {
    /// Declared dispatch priority.
    fn order(&self) -> i32;

    /// Observes or mutates the exchange. `response` is `None` in the
    /// pre-request phase.
    fn filter(
        &self,
        request: &mut dyn RequestInformation,
        response: Option<&mut dyn ResponseInformation>,
    ) -> Result<(), FilterError>;

    fn as_any(&self) -> &dyn Any;

    /// Structural equality against another filter, used to drop duplicate
    /// registrations at one priority.
    fn filter_eq(&self, other: &dyn Filter) -> bool;
}

/// Shared handle the registry stores; equality delegates to
/// [`Filter::filter_eq`].
#[derive(Clone)]
pub(crate) struct FilterHandle(pub(crate) Arc<dyn Filter>);

impl PartialEq for FilterHandle {
    fn eq(&self, other: &Self) -> bool {
        self.0.filter_eq(other.0.as_ref())
    }
}

impl fmt::Debug for FilterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterHandle").field("order", &self.0.order()).finish()
    }
}

/// Registry of filters keyed by priority, with two-phase dispatch.
///
/// Cloning deep-copies the priority tree and its buckets; the filter
/// objects themselves are immutable configuration and stay shared.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    filters: PriorityMap<i32, FilterHandle>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self { filters: PriorityMap::new() }
    }

    /// Registers a filter at its declared priority. Re-registering a
    /// structurally equal filter at the same priority is a no-op; returns
    /// whether the filter was added.
    pub fn register(&mut self, filter: Arc<dyn Filter>) -> bool {
        self.filters.put(filter.order(), FilterHandle(filter))
    }

    /// Total number of registered filters across all priorities.
    pub fn len(&self) -> usize {
        self.filters.iter().map(|(_, bucket)| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Runs every strictly negative priority bucket in ascending order,
    /// stopping at the first filter error.
    pub fn run_pre_request(&self, request: &mut dyn RequestInformation) -> Result<(), FilterError> {
        for (order, bucket) in self.filters.sub_map(i32::MIN, 0, true, false) {
            debug!(order = *order, count = bucket.len(), "running pre-request filters");
            for handle in bucket {
                handle.0.filter(request, None)?;
            }
        }
        Ok(())
    }

    /// Runs every zero-or-positive priority bucket in ascending order,
    /// stopping at the first filter error.
    pub fn run_post_request(
        &self,
        request: &mut dyn RequestInformation,
        response: &mut dyn ResponseInformation,
    ) -> Result<(), FilterError> {
        for (order, bucket) in self.filters.sub_map(0, i32::MAX, true, true) {
            debug!(order = *order, count = bucket.len(), "running post-request filters");
            for handle in bucket {
                handle.0.filter(request, Some(&mut *response))?;
            }
        }
        Ok(())
    }
}
