//! Schedule retrieval off the monitor thread.
//!
//! Every request runs on its own worker thread and is tagged with a
//! generation number. Only the outcome of the most recent request is ever
//! handed back to the loop; results from superseded requests are dropped when
//! they arrive, so overlapping fetches resolve last-write-wins. There is no
//! retry: a failed fetch is reported once and the previous schedule stays.

use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::geo::Coordinate;
use crate::provider::{DayTimings, TimingsProvider};
use crate::schedule::ScheduleOfDay;

/// Result of one fetch request.
#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    pub date: NaiveDate,
    pub coordinate: Coordinate,
    pub result: Result<DayTimings>,
}

/// Issues fetches and filters their outcomes by generation.
pub struct FetchCoordinator {
    provider: Arc<dyn TimingsProvider>,
    sender: Sender<FetchOutcome>,
    receiver: Receiver<FetchOutcome>,
    latest: u64,
    pending: bool,
}

impl FetchCoordinator {
    pub fn new(provider: Arc<dyn TimingsProvider>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            provider,
            sender,
            receiver,
            latest: 0,
            pending: false,
        }
    }

    /// Start a fetch, superseding any request still in flight.
    pub fn request(&mut self, date: NaiveDate, coordinate: Coordinate) -> u64 {
        self.latest += 1;
        self.pending = true;

        let generation = self.latest;
        let provider = Arc::clone(&self.provider);
        let sender = self.sender.clone();

        thread::spawn(move || {
            let result = provider.fetch(date, coordinate);
            // The loop may have shut down; nothing to deliver to then
            let _ = sender.send(FetchOutcome {
                generation,
                date,
                coordinate,
                result,
            });
        });

        generation
    }

    /// Whether the latest request has not reported back yet.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Non-blocking: the latest request's outcome if it has arrived.
    pub fn poll(&mut self) -> Option<FetchOutcome> {
        while let Ok(outcome) = self.receiver.try_recv() {
            if let Some(outcome) = self.accept(outcome) {
                return Some(outcome);
            }
        }
        None
    }

    /// Block up to `timeout` (real time) for the latest request's outcome.
    pub fn wait(&mut self, timeout: Duration) -> Option<FetchOutcome> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(outcome) => {
                    if let Some(outcome) = self.accept(outcome) {
                        return Some(outcome);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None;
                }
            }
        }
    }

    fn accept(&mut self, outcome: FetchOutcome) -> Option<FetchOutcome> {
        // Superseded
        if outcome.generation != self.latest {
            return None;
        }
        self.pending = false;
        Some(outcome)
    }
}

/// The last successfully retrieved timings.
///
/// A failed fetch never clears the slot. The schedule is only offered for
/// the coordinate it was retrieved for, so after a location change the
/// engine sees "not ready" until the new location's timings arrive.
#[derive(Debug, Default)]
pub struct ScheduleSlot {
    timings: Option<DayTimings>,
}

impl ScheduleSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, timings: DayTimings) {
        self.timings = Some(timings);
    }

    /// Timings retrieved for `coordinate`, if any.
    pub fn timings_for(&self, coordinate: &Coordinate) -> Option<&DayTimings> {
        self.timings.as_ref().filter(|t| t.is_for(coordinate))
    }

    pub fn schedule_for(&self, coordinate: &Coordinate) -> Option<&ScheduleOfDay> {
        self.timings_for(coordinate).map(|t| &t.schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockTimingsProvider;
    use crate::provider::test_support::day_timings;
    use anyhow::anyhow;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn riyadh() -> Coordinate {
        Coordinate::new(24.7136, 46.6753).unwrap()
    }

    fn jeddah() -> Coordinate {
        Coordinate::new(21.4858, 39.1925).unwrap()
    }

    #[test]
    fn test_successful_fetch_is_delivered() {
        let mut provider = MockTimingsProvider::new();
        provider
            .expect_fetch()
            .times(1)
            .returning(|date, coordinate| Ok(day_timings(date, coordinate)));

        let mut fetcher = FetchCoordinator::new(Arc::new(provider));
        let generation = fetcher.request(date(), riyadh());
        assert!(fetcher.is_pending());

        let outcome = fetcher.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.generation, generation);
        assert!(outcome.result.unwrap().is_for(&riyadh()));
        assert!(!fetcher.is_pending());
    }

    #[test]
    fn test_failed_fetch_is_reported() {
        let mut provider = MockTimingsProvider::new();
        provider
            .expect_fetch()
            .returning(|_, _| Err(anyhow!("network unreachable")));

        let mut fetcher = FetchCoordinator::new(Arc::new(provider));
        fetcher.request(date(), riyadh());

        let outcome = fetcher.wait(Duration::from_secs(5)).unwrap();
        assert!(outcome.result.is_err());
    }

    #[test]
    fn test_overlapping_fetches_last_write_wins() {
        let mut provider = MockTimingsProvider::new();
        // The first (Riyadh) request is slow and resolves after the second
        provider.expect_fetch().returning(|date, coordinate| {
            if coordinate.latitude > 24.0 {
                thread::sleep(Duration::from_millis(300));
            }
            Ok(day_timings(date, coordinate))
        });

        let mut fetcher = FetchCoordinator::new(Arc::new(provider));
        fetcher.request(date(), riyadh());
        let second = fetcher.request(date(), jeddah());

        let outcome = fetcher.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.generation, second);
        assert_eq!(outcome.coordinate, jeddah());

        // The slow Riyadh result arrives later and is discarded
        thread::sleep(Duration::from_millis(500));
        assert!(fetcher.poll().is_none());
    }

    #[test]
    fn test_slow_newer_request_still_wins() {
        let mut provider = MockTimingsProvider::new();
        // Here the newer (Jeddah) request is the slow one
        provider.expect_fetch().returning(|date, coordinate| {
            if coordinate.latitude < 24.0 {
                thread::sleep(Duration::from_millis(200));
            }
            Ok(day_timings(date, coordinate))
        });

        let mut fetcher = FetchCoordinator::new(Arc::new(provider));
        fetcher.request(date(), riyadh());
        fetcher.request(date(), jeddah());

        let outcome = fetcher.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.coordinate, jeddah());
    }

    #[test]
    fn test_slot_only_serves_matching_location() {
        let mut slot = ScheduleSlot::new();
        assert!(slot.schedule_for(&riyadh()).is_none());

        slot.store(day_timings(date(), riyadh()));
        assert!(slot.schedule_for(&riyadh()).is_some());
        assert!(slot.schedule_for(&jeddah()).is_none());
        // Returning to the stored location serves the kept timings again
        assert!(slot.timings_for(&riyadh()).is_some());
    }
}
