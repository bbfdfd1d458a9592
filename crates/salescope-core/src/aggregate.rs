use std::collections::{BTreeMap, BTreeSet};

use crate::calendar::{Granularity, period_key};
use crate::types::{Metric, SaleRecord};

/// Finalized totals for one period key.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodBucket {
    pub units: f64,
    pub net_amount: f64,
    pub unique_receipts: usize,
}

impl PeriodBucket {
    pub fn metric_value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Units => self.units,
            Metric::NetAmount => self.net_amount,
            Metric::Receipts => self.unique_receipts as f64,
        }
    }
}

/// Result of one aggregation pass. `skipped_undated` counts records that
/// carried no usable date and were excluded from every bucket.
#[derive(Debug, Clone, Default)]
pub struct AggregateOutcome {
    pub buckets: BTreeMap<String, PeriodBucket>,
    pub skipped_undated: usize,
}

#[derive(Debug, Default)]
struct BucketAccumulator {
    units: f64,
    net_amount: f64,
    receipt_numbers: BTreeSet<String>,
}

/// Groups already-filtered records into per-period totals.
///
/// Receipt dedup is deliberately two-pass: receipt numbers accumulate
/// into a per-bucket set while records are folded, and the unique count
/// is taken from the set's size only after the fold completes. Two
/// records sharing a receipt number in one bucket count once.
pub fn aggregate_by_period(records: &[SaleRecord], granularity: Granularity) -> AggregateOutcome {
    let mut accumulators: BTreeMap<String, BucketAccumulator> = BTreeMap::new();
    let mut skipped_undated = 0usize;

    for record in records {
        let Some(date) = record.date else {
            skipped_undated += 1;
            continue;
        };

        let key = period_key(granularity, date);
        let entry = accumulators.entry(key).or_default();
        entry.units += record.quantity_or_zero();
        entry.net_amount += record.net_amount_or_zero();
        if let Some(receipt) = record.countable_receipt() {
            entry.receipt_numbers.insert(receipt.to_string());
        }
    }

    let buckets = accumulators
        .into_iter()
        .map(|(key, acc)| {
            (
                key,
                PeriodBucket {
                    units: acc.units,
                    net_amount: acc.net_amount,
                    unique_receipts: acc.receipt_numbers.len(),
                },
            )
        })
        .collect();

    AggregateOutcome {
        buckets,
        skipped_undated,
    }
}
