use super::DisplayItem;
use crate::service::ServiceError;
use crate::{log_debug, timings_enabled};
use std::time::Instant;

/// Most rows the upstream service hands back for a single request.
pub const UPSTREAM_PAGE_CAP: usize = 50;

/// Source of additional menu rows. An empty result means nothing more will come.
pub trait MenuFeed<A, P> {
    fn fetch_more(&mut self, wanted: usize) -> Result<Vec<DisplayItem<A, P>>, ServiceError>;
}

/// Offset/count access to a remote result set. No total is known up front.
pub trait ResultProvider {
    type Item;

    fn fetch(&mut self, offset: usize, count: usize) -> Result<Vec<Self::Item>, ServiceError>;
}

/// Ceiling on how far a listing may page and how many rows one request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub max_offset: usize,
    pub limit: usize,
}

impl PageLimits {
    pub fn new(max_offset: usize, page_size: usize) -> Self {
        let limit = page_size
            .min(max_offset)
            .min(UPSTREAM_PAGE_CAP)
            .max(1);
        Self { max_offset, limit }
    }
}

/// Adapts a [`ResultProvider`] to the engine's fetch-more contract.
///
/// Stops asking once a request came back short, came back empty, or the offset
/// reached `max_offset`. The offset only advances when a request succeeds.
pub struct PagedFeed<R, F> {
    provider: R,
    to_item: F,
    limits: PageLimits,
    next_offset: usize,
    received: usize,
    started: bool,
}

impl<R, F> PagedFeed<R, F> {
    pub fn new(provider: R, limits: PageLimits, to_item: F) -> Self {
        Self {
            provider,
            to_item,
            limits,
            next_offset: 0,
            received: 0,
            started: false,
        }
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    pub fn next_offset(&self) -> usize {
        self.next_offset
    }

    fn has_more(&self) -> bool {
        if !self.started {
            return true;
        }
        self.received > 0
            && self.received >= self.next_offset
            && self.next_offset < self.limits.max_offset
    }
}

impl<A, P, R, F> MenuFeed<A, P> for PagedFeed<R, F>
where
    R: ResultProvider,
    F: FnMut(R::Item) -> DisplayItem<A, P>,
{
    fn fetch_more(&mut self, wanted: usize) -> Result<Vec<DisplayItem<A, P>>, ServiceError> {
        if !self.has_more() {
            return Ok(Vec::new());
        }
        let remaining = self.limits.max_offset.saturating_sub(self.next_offset);
        let count = wanted.max(1).min(self.limits.limit).min(remaining);
        if count == 0 {
            return Ok(Vec::new());
        }

        let started_at = Instant::now();
        let rows = match self.provider.fetch(self.next_offset, count) {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(offset = self.next_offset, count, error = %err, "page fetch failed");
                log_debug(&format!(
                    "page fetch failed at offset {}: {err}",
                    self.next_offset
                ));
                return Err(err);
            }
        };
        tracing::debug!(
            offset = self.next_offset,
            count,
            received = rows.len(),
            "fetched page"
        );
        if timings_enabled() {
            log_debug(&format!(
                "timing|page_fetch|offset={}|count={count}|rows={}|ms={}",
                self.next_offset,
                rows.len(),
                started_at.elapsed().as_millis()
            ));
        }

        self.started = true;
        self.next_offset += count;
        self.received += rows.len();
        Ok(rows.into_iter().map(&mut self.to_item).collect())
    }
}
