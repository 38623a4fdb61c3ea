//! Per-period document sequence counters.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDate;

use fleetbooks_core::{DomainError, DomainResult};

use crate::document::{DocumentKind, DocumentNumber};

/// Hands out unique, strictly increasing document numbers scoped by
/// `(kind, issue date)`.
///
/// Counters live in memory; `seed` restores them from persisted state (e.g.
/// the highest stored sequence for today) so numbering resumes after a restart
/// instead of colliding.
#[derive(Debug, Default)]
pub struct SequenceNumberGenerator {
    counters: RwLock<HashMap<(DocumentKind, NaiveDate), u32>>,
}

impl SequenceNumberGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next number in the `(kind, issued_on)` scope. Safe under concurrent
    /// callers; two calls never return the same number.
    pub fn next(&self, kind: DocumentKind, issued_on: NaiveDate) -> DomainResult<DocumentNumber> {
        let mut counters = self
            .counters
            .write()
            .map_err(|_| DomainError::conflict("sequence counter lock poisoned"))?;

        let counter = counters.entry((kind, issued_on)).or_insert(0);
        *counter += 1;
        DocumentNumber::new(kind, issued_on, *counter)
    }

    /// Raise the scope's counter to `last_sequence` so the next number issued
    /// is `last_sequence + 1`. Seeding below the current counter is a no-op
    /// (sequences never move backwards).
    pub fn seed(
        &self,
        kind: DocumentKind,
        issued_on: NaiveDate,
        last_sequence: u32,
    ) -> DomainResult<()> {
        let mut counters = self
            .counters
            .write()
            .map_err(|_| DomainError::conflict("sequence counter lock poisoned"))?;

        let counter = counters.entry((kind, issued_on)).or_insert(0);
        if last_sequence > *counter {
            *counter = last_sequence;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    #[test]
    fn sequences_increment_within_a_scope() {
        let generator = SequenceNumberGenerator::new();
        let first = generator.next(DocumentKind::Invoice, day(23)).unwrap();
        let second = generator.next(DocumentKind::Invoice, day(23)).unwrap();

        assert_eq!(first.to_string(), "INV250823001");
        assert_eq!(second.to_string(), "INV250823002");
    }

    #[test]
    fn kinds_and_dates_count_independently() {
        let generator = SequenceNumberGenerator::new();
        generator.next(DocumentKind::Invoice, day(23)).unwrap();
        generator.next(DocumentKind::Invoice, day(23)).unwrap();

        // A different kind on the same day starts from 1.
        let repair = generator.next(DocumentKind::Repair, day(23)).unwrap();
        assert_eq!(repair.sequence(), 1);

        // The same kind on the next day starts from 1.
        let next_day = generator.next(DocumentKind::Invoice, day(24)).unwrap();
        assert_eq!(next_day.sequence(), 1);
    }

    #[test]
    fn seeding_resumes_from_persisted_state() {
        let generator = SequenceNumberGenerator::new();
        generator.seed(DocumentKind::Invoice, day(23), 41).unwrap();

        let next = generator.next(DocumentKind::Invoice, day(23)).unwrap();
        assert_eq!(next.sequence(), 42);

        // Seeding below the current counter never rewinds it.
        generator.seed(DocumentKind::Invoice, day(23), 5).unwrap();
        let after = generator.next(DocumentKind::Invoice, day(23)).unwrap();
        assert_eq!(after.sequence(), 43);
    }

    #[test]
    fn concurrent_callers_get_unique_numbers() {
        let generator = Arc::new(SequenceNumberGenerator::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let generator = Arc::clone(&generator);
            handles.push(std::thread::spawn(move || {
                let mut issued = Vec::new();
                for _ in 0..50 {
                    issued.push(
                        generator
                            .next(DocumentKind::Invoice, day(23))
                            .unwrap()
                            .to_string(),
                    );
                }
                issued
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for number in handle.join().unwrap() {
                assert!(seen.insert(number), "duplicate document number issued");
            }
        }
        assert_eq!(seen.len(), 400);

        let next = generator.next(DocumentKind::Invoice, day(23)).unwrap();
        assert_eq!(next.sequence(), 401);
    }
}
