use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::{coordinate::Coordinate, tile_coord::TileCoord};

/// Delay before a failed tile may be requested again. The delay doubles with every consecutive
/// failure of the same tile, up to `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
}

impl Backoff {
    pub fn delay(&self, attempts: u32) -> Duration {
        let exponent = attempts.saturating_sub(1).min(16);
        self.base.saturating_mul(1 << exponent).min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(250),
            max: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Failure {
    attempts: u32,
    retry_at: Instant,
}

/// Tiles waiting to be fetched, and tiles currently being fetched.
///
/// A tile is in at most one of the two sets. Pending tiles are kept in priority order, the
/// front being the next to be dispatched.
#[derive(Debug, Default)]
pub struct FetchQueue {
    pending: Vec<TileCoord>,
    in_flight: HashSet<TileCoord>,
    failures: HashMap<TileCoord, Failure>,
    backoff: Backoff,
}

impl FetchQueue {
    pub fn new(backoff: Backoff) -> Self {
        Self {
            backoff,
            ..Self::default()
        }
    }

    /// Queue a tile for fetching. Returns `false` if it is already pending, in flight, or
    /// waiting out the backoff of an earlier failure.
    pub fn enqueue(&mut self, tile_id: TileCoord, now: Instant) -> bool {
        if self.pending.contains(&tile_id) || self.in_flight.contains(&tile_id) {
            return false;
        }
        if let Some(failure) = self.failures.get(&tile_id) {
            if failure.retry_at > now {
                log::trace!("Tile {tile_id:?} is backing off");
                return false;
            }
        }

        self.pending.push(tile_id);
        true
    }

    /// Stop waiting for tiles that are no longer required. Tiles in flight are not affected.
    pub fn retain_all(&mut self, required: &HashSet<TileCoord>) {
        self.pending.retain(|tile_id| required.contains(tile_id));
        self.failures.retain(|tile_id, _| required.contains(tile_id));
    }

    /// Order pending tiles by the distance of their middle to `center`, nearest first. Ties
    /// keep their insertion order.
    pub fn prioritize(&mut self, center: Coordinate) {
        let mut keyed: Vec<(f64, TileCoord)> = self
            .pending
            .iter()
            .map(|tile_id| {
                let center = center.zoom_to(tile_id.zoom() as f64);
                (tile_id.center().distance(&center), *tile_id)
            })
            .collect();
        keyed.sort_by(|(a, _), (b, _)| a.total_cmp(b));

        self.pending = keyed.into_iter().map(|(_, tile_id)| tile_id).collect();
    }

    /// Move up to `count` of the highest priority tiles into the in-flight set and return them.
    pub fn dispatch(&mut self, count: usize) -> Vec<TileCoord> {
        let count = count.min(self.pending.len());
        let dispatched: Vec<TileCoord> = self.pending.drain(..count).collect();
        self.in_flight.extend(dispatched.iter().copied());
        dispatched
    }

    /// The fetch of a tile succeeded.
    pub fn complete(&mut self, tile_id: &TileCoord) {
        self.in_flight.remove(tile_id);
        self.pending.retain(|pending| pending != tile_id);
        self.failures.remove(tile_id);
    }

    /// The fetch of a tile failed. It may be queued again once its backoff has passed.
    pub fn fail(&mut self, tile_id: &TileCoord, now: Instant) {
        self.in_flight.remove(tile_id);
        self.pending.retain(|pending| pending != tile_id);

        let attempts = self
            .failures
            .get(tile_id)
            .map_or(1, |failure| failure.attempts + 1);
        let delay = self.backoff.delay(attempts);
        log::debug!("Tile {tile_id:?} failed {attempts} times, retrying in {delay:?}");

        self.failures.insert(
            *tile_id,
            Failure {
                attempts,
                retry_at: now + delay,
            },
        );
    }

    pub fn is_pending(&self, tile_id: &TileCoord) -> bool {
        self.pending.contains(tile_id)
    }

    pub fn is_in_flight(&self, tile_id: &TileCoord) -> bool {
        self.in_flight.contains(tile_id)
    }

    /// Pending tiles in priority order.
    pub fn pending(&self) -> &[TileCoord] {
        &self.pending
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    /// Drop all pending tiles and failure records. Tiles in flight stay tracked until they
    /// complete, so they are not requested twice.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.failures.clear();
    }

    /// Check that no tile is both pending and in flight, nor either while also cached.
    pub(crate) fn consistent(&self, cached: impl Fn(&TileCoord) -> bool) -> bool {
        self.pending
            .iter()
            .all(|tile_id| !self.in_flight.contains(tile_id) && !cached(tile_id))
            && self.in_flight.iter().all(|tile_id| !cached(tile_id))
    }
}
