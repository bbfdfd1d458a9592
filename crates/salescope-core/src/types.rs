use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Receipt-type literal marking a refund. Refund rows still contribute to
/// unit and amount totals, but never to the unique-receipt count.
pub const REFUND_RECEIPT_TYPE: &str = "Reembolso";

/// One normalized sales transaction, as handed over by ingestion.
///
/// `date` is `None` when the source row carried an unparseable or missing
/// date; such records are excluded from all bucketing and only counted
/// for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    pub date: Option<NaiveDate>,
    pub receipt_number: String,
    pub receipt_type: String,
    pub category: String,
    pub article: String,
    pub quantity: f64,
    pub net_amount: f64,
}

impl SaleRecord {
    pub fn is_refund(&self) -> bool {
        self.receipt_type == REFUND_RECEIPT_TYPE
    }

    /// The trimmed receipt number this record contributes to the
    /// unique-receipt set, if any.
    pub fn countable_receipt(&self) -> Option<&str> {
        if self.is_refund() {
            return None;
        }
        let trimmed = self.receipt_number.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed)
    }

    pub fn quantity_or_zero(&self) -> f64 {
        if self.quantity.is_finite() {
            self.quantity
        } else {
            0.0
        }
    }

    pub fn net_amount_or_zero(&self) -> f64 {
        if self.net_amount.is_finite() {
            self.net_amount
        } else {
            0.0
        }
    }
}

/// The three charted metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Units,
    Receipts,
    NetAmount,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Units, Metric::Receipts, Metric::NetAmount];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Units => "units",
            Self::Receipts => "receipts",
            Self::NetAmount => "net_amount",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Units => "Units sold",
            Self::Receipts => "Receipts issued",
            Self::NetAmount => "Net sales",
        }
    }

    /// Only the monetary metric goes through the inflation normalizer.
    pub const fn is_currency(self) -> bool {
        matches!(self, Self::NetAmount)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "units" => Some(Self::Units),
            "receipts" => Some(Self::Receipts),
            "net_amount" => Some(Self::NetAmount),
            _ => None,
        }
    }
}

/// Category/article scope shared by the real range and the projection
/// history. `None` means "all".
#[derive(Debug, Clone, Default)]
pub struct RecordScope {
    pub category: Option<String>,
    pub article: Option<String>,
}

impl RecordScope {
    pub fn matches(&self, record: &SaleRecord) -> bool {
        if let Some(category) = &self.category
            && record.category != *category
        {
            return false;
        }
        if let Some(article) = &self.article
            && record.article != *article
        {
            return false;
        }
        true
    }
}
