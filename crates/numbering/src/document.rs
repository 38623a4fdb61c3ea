//! Human-readable document numbers.
//!
//! A number is `PREFIX + yymmdd + sequence`, e.g. `INV250823001` for the first
//! invoice issued on 2025-08-23. The sequence is zero-padded to three digits
//! and widens naturally past 999.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use fleetbooks_core::{DomainError, DomainResult};

/// Kind of numbered document, determining its prefix.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Invoice,
    Repair,
}

impl DocumentKind {
    pub fn prefix(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INV",
            DocumentKind::Repair => "RPR",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "INV" => Some(DocumentKind::Invoice),
            "RPR" => Some(DocumentKind::Repair),
            _ => None,
        }
    }
}

/// A typed document number: kind, issue date, per-day sequence.
///
/// Serializes as its canonical string form, which is what gets persisted and
/// printed on documents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DocumentNumber {
    kind: DocumentKind,
    issued_on: NaiveDate,
    sequence: u32,
}

impl DocumentNumber {
    pub fn new(kind: DocumentKind, issued_on: NaiveDate, sequence: u32) -> DomainResult<Self> {
        if sequence == 0 {
            return Err(DomainError::validation(
                "document sequence starts at 1, got 0",
            ));
        }
        Ok(Self {
            kind,
            issued_on,
            sequence,
        })
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn issued_on(&self) -> NaiveDate {
        self.issued_on
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl core::fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}{}{:03}",
            self.kind.prefix(),
            self.issued_on.format("%y%m%d"),
            self.sequence
        )
    }
}

impl FromStr for DocumentNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Shortest valid form: 3-char prefix, 6-digit date, 3-digit sequence.
        if s.len() < 12 || !s.is_ascii() {
            return Err(DomainError::invalid_id(format!(
                "document number too short or non-ascii: {s:?}"
            )));
        }

        let kind = DocumentKind::from_prefix(&s[..3]).ok_or_else(|| {
            DomainError::invalid_id(format!("unknown document prefix: {:?}", &s[..3]))
        })?;

        let date_part = &s[3..9];
        if !date_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_id(format!(
                "document date must be six digits: {date_part:?}"
            )));
        }
        let yy: i32 = date_part[..2].parse().map_err(|_| {
            DomainError::invalid_id(format!("bad document year: {:?}", &date_part[..2]))
        })?;
        let mm: u32 = date_part[2..4].parse().map_err(|_| {
            DomainError::invalid_id(format!("bad document month: {:?}", &date_part[2..4]))
        })?;
        let dd: u32 = date_part[4..6].parse().map_err(|_| {
            DomainError::invalid_id(format!("bad document day: {:?}", &date_part[4..6]))
        })?;
        let issued_on = NaiveDate::from_ymd_opt(2000 + yy, mm, dd).ok_or_else(|| {
            DomainError::invalid_id(format!("document date does not exist: {date_part}"))
        })?;

        let sequence: u32 = s[9..]
            .parse()
            .map_err(|_| DomainError::invalid_id(format!("bad document sequence: {:?}", &s[9..])))?;

        Self::new(kind, issued_on, sequence)
            .map_err(|_| DomainError::invalid_id(format!("document sequence must be >= 1: {s}")))
    }
}

impl Serialize for DocumentNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocumentNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_with_prefix_date_and_padded_sequence() {
        let n = DocumentNumber::new(DocumentKind::Invoice, date(2025, 8, 23), 1).unwrap();
        assert_eq!(n.to_string(), "INV250823001");

        let r = DocumentNumber::new(DocumentKind::Repair, date(2025, 8, 23), 7).unwrap();
        assert_eq!(r.to_string(), "RPR250823007");
    }

    #[test]
    fn sequence_widens_past_three_digits() {
        let n = DocumentNumber::new(DocumentKind::Invoice, date(2025, 8, 23), 1000).unwrap();
        assert_eq!(n.to_string(), "INV2508231000");
        assert_eq!(n.to_string().parse::<DocumentNumber>().unwrap(), n);
    }

    #[test]
    fn parses_canonical_strings() {
        let n: DocumentNumber = "INV250823042".parse().unwrap();
        assert_eq!(n.kind(), DocumentKind::Invoice);
        assert_eq!(n.issued_on(), date(2025, 8, 23));
        assert_eq!(n.sequence(), 42);
    }

    #[test]
    fn rejects_malformed_strings() {
        for raw in [
            "XYZ250823001", // unknown prefix
            "INV25082001",  // too short
            "INV25ab23001", // non-digit date
            "INV251345001", // month 13 does not exist
            "INV250823000", // sequence 0
            "INV250823xyz", // non-digit sequence
        ] {
            let err = raw.parse::<DocumentNumber>().unwrap_err();
            match err {
                DomainError::InvalidId(_) => {}
                other => panic!("expected InvalidId for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn serializes_as_canonical_string() {
        let n = DocumentNumber::new(DocumentKind::Repair, date(2026, 1, 2), 12).unwrap();
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, "\"RPR260102012\"");
        let back: DocumentNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, n);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: formatting then parsing recovers the typed number for any
        /// date in the two-digit-year century and any positive sequence.
        #[test]
        fn format_parse_round_trips(
            days in 0u64..36_500u64,
            seq in 1u32..5_000u32,
            repair in proptest::bool::ANY
        ) {
            let issued_on = date(2000, 1, 1) + chrono::Days::new(days);
            let kind = if repair { DocumentKind::Repair } else { DocumentKind::Invoice };
            let n = DocumentNumber::new(kind, issued_on, seq).unwrap();
            let parsed: DocumentNumber = n.to_string().parse().unwrap();
            prop_assert_eq!(parsed, n);
        }
    }
}
