//! Bounded in-memory price store with insert-if-absent semantics.
//!
//! Deduplication is keyed on (commodity, exact timestamp): repeated scrapes
//! inside the same tick produce identical keys and are skipped, never
//! duplicated. Records are immutable, so no further locking discipline is
//! needed beyond the store's own mutex.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::scrape::types::PriceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    SkippedDuplicate,
}

#[derive(Debug)]
pub struct PriceStore {
    inner: Mutex<Vec<PriceRecord>>,
    cap: usize,
}

impl PriceStore {
    /// Capacity is clamped to 1..=100_000; a zero cap would drain every
    /// record straight after inserting it.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
            cap: cap.clamp(1, 100_000),
        }
    }

    /// Insert unless a record with the same commodity and exact timestamp
    /// already exists. Oldest records are dropped past capacity.
    pub fn insert_if_absent(&self, rec: PriceRecord) -> InsertOutcome {
        let mut v = self.inner.lock().expect("price store mutex poisoned");
        if v.iter()
            .any(|r| r.commodity == rec.commodity && r.timestamp == rec.timestamp)
        {
            return InsertOutcome::SkippedDuplicate;
        }
        v.push(rec);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
        InsertOutcome::Inserted
    }

    /// Newest record per commodity, ordered by commodity name.
    pub fn latest(&self) -> Vec<PriceRecord> {
        let v = self.inner.lock().expect("price store mutex poisoned");
        let mut newest: BTreeMap<String, PriceRecord> = BTreeMap::new();
        for r in v.iter() {
            match newest.get(&r.commodity) {
                Some(cur) if cur.timestamp >= r.timestamp => {}
                _ => {
                    newest.insert(r.commodity.clone(), r.clone());
                }
            }
        }
        newest.into_values().collect()
    }

    /// History ordered by timestamp descending, optionally filtered by a
    /// case-insensitive substring of the commodity display name.
    pub fn history(&self, commodity: Option<&str>, limit: usize) -> Vec<PriceRecord> {
        let v = self.inner.lock().expect("price store mutex poisoned");
        let needle = commodity.map(|c| c.to_lowercase());
        let mut out: Vec<PriceRecord> = v
            .iter()
            .filter(|r| match &needle {
                Some(n) => r.commodity.to_lowercase().contains(n),
                None => true,
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        out.truncate(limit);
        out
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("price store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn rec(commodity: &str, price: f64, hour: u32) -> PriceRecord {
        let ts = Utc.with_ymd_and_hms(2025, 8, 21, hour, 0, 0).unwrap();
        PriceRecord::new(commodity, price, Some(0.5), "$/tonne", "https://x", ts).unwrap()
    }

    #[test]
    fn exact_timestamp_duplicates_are_skipped() {
        let store = PriceStore::with_capacity(10);
        assert_eq!(
            store.insert_if_absent(rec("Wheat (H2)", 345.0, 9)),
            InsertOutcome::Inserted
        );
        assert_eq!(
            store.insert_if_absent(rec("Wheat (H2)", 999.0, 9)),
            InsertOutcome::SkippedDuplicate
        );
        // Same timestamp, different commodity: not a duplicate.
        assert_eq!(
            store.insert_if_absent(rec("Barley (feed)", 310.0, 9)),
            InsertOutcome::Inserted
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn zero_capacity_still_keeps_the_newest_record() {
        let store = PriceStore::with_capacity(0);
        assert_eq!(
            store.insert_if_absent(rec("Wheat (H2)", 340.0, 8)),
            InsertOutcome::Inserted
        );
        assert_eq!(store.len(), 1);

        store.insert_if_absent(rec("Wheat (H2)", 345.0, 12));
        assert_eq!(store.len(), 1);
        assert_eq!(store.latest()[0].price, 345.0);
    }

    #[test]
    fn latest_picks_newest_per_commodity() {
        let store = PriceStore::with_capacity(10);
        store.insert_if_absent(rec("Wheat (H2)", 340.0, 8));
        store.insert_if_absent(rec("Wheat (H2)", 345.0, 12));
        store.insert_if_absent(rec("Barley (feed)", 310.0, 9));

        let latest = store.latest();
        assert_eq!(latest.len(), 2);
        let wheat = latest.iter().find(|r| r.commodity == "Wheat (H2)").unwrap();
        assert_eq!(wheat.price, 345.0);
    }

    #[test]
    fn history_is_descending_and_filterable() {
        let store = PriceStore::with_capacity(10);
        store.insert_if_absent(rec("Wheat (H2)", 340.0, 8));
        store.insert_if_absent(rec("Wheat (H2)", 345.0, 12));
        store.insert_if_absent(rec("Barley (feed)", 310.0, 9));

        let all = store.history(None, 100);
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

        let wheat = store.history(Some("wheat"), 100);
        assert_eq!(wheat.len(), 2);
        assert_eq!(wheat[0].price, 345.0);

        let capped = store.history(None, 1);
        assert_eq!(capped.len(), 1);
    }
}
