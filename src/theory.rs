//! Qualitative comparison of the two record contract designs
//!
//! Static content: ratings on a 1-5 scale (5 is best) and a feature table.
//! Nothing here is measured.

use std::fmt::Write as _;

use prettytable::format::consts::FORMAT_BOX_CHARS;
use prettytable::{Cell, Row, Table};

use crate::contract::ContractVariant;

/// Highest rating
pub const MAX_RATING: u8 = 5;

/// One rated category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rating {
    /// Category name
    pub category: &'static str,
    /// Full-data contract
    pub basic: u8,
    /// Hash-only contract
    pub lightweight: u8,
}

/// Ratings per category.
pub const RATINGS: [Rating; 5] = [
    Rating {
        category: "Time Efficiency",
        basic: 3,
        lightweight: 4,
    },
    Rating {
        category: "Space Efficiency",
        basic: 1,
        lightweight: 4,
    },
    Rating {
        category: "Security",
        basic: 5,
        lightweight: 3,
    },
    Rating {
        category: "Gas Efficiency",
        basic: 1,
        lightweight: 5,
    },
    Rating {
        category: "Scalability",
        basic: 2,
        lightweight: 5,
    },
];

/// One line of the feature table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    /// Aspect compared
    pub functionality: &'static str,
    /// Full-data contract
    pub basic: &'static str,
    /// Hash-only contract
    pub lightweight: &'static str,
}

/// Feature comparison.
pub const FEATURES: [Feature; 7] = [
    Feature {
        functionality: "Retrieving Data",
        basic: "getRecord() (full on-chain data)",
        lightweight: "getRecordHash() (hash only)",
    },
    Feature {
        functionality: "Time Complexity",
        basic: "O(1)",
        lightweight: "O(1) for hash lookup, O(k) for verification",
    },
    Feature {
        functionality: "Space Complexity",
        basic: "O(n × m) (all attributes stored)",
        lightweight: "O(n) (only hashes stored)",
    },
    Feature {
        functionality: "Gas Cost",
        basic: "High (full data written)",
        lightweight: "Low (one hash written)",
    },
    Feature {
        functionality: "Deleting Data",
        basic: "deleteRecord() (full record)",
        lightweight: "deleteRecord() (hash only, off-chain copy remains)",
    },
    Feature {
        functionality: "Verification & Security",
        basic: "No explicit verification needed",
        lightweight: "verifyRecord() (integrity via hashing)",
    },
    Feature {
        functionality: "Existence Checks",
        basic: "Not implemented",
        lightweight: "recordExists()",
    },
];

/// Ratings as a table with a star bar per contract.
#[must_use]
pub fn ratings_table() -> String {
    let mut table = Table::new();
    table.set_format(*FORMAT_BOX_CHARS);
    table.set_titles(Row::new(vec![
        Cell::new("Category"),
        Cell::new(ContractVariant::Basic.contract_name()),
        Cell::new(ContractVariant::Lightweight.contract_name()),
    ]));
    for rating in RATINGS {
        table.add_row(Row::new(vec![
            Cell::new(rating.category),
            Cell::new(&stars(rating.basic)),
            Cell::new(&stars(rating.lightweight)),
        ]));
    }
    table.to_string()
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(MAX_RATING));
    format!(
        "{}{} {rating}/{MAX_RATING}",
        "★".repeat(filled),
        "☆".repeat(usize::from(MAX_RATING) - filled)
    )
}

/// Feature comparison table.
#[must_use]
pub fn features_table() -> String {
    let mut table = Table::new();
    table.set_format(*FORMAT_BOX_CHARS);
    table.set_titles(Row::new(vec![
        Cell::new("Functionality"),
        Cell::new(ContractVariant::Basic.contract_name()),
        Cell::new(ContractVariant::Lightweight.contract_name()),
    ]));
    for feature in FEATURES {
        table.add_row(Row::new(vec![
            Cell::new(feature.functionality),
            Cell::new(feature.basic),
            Cell::new(feature.lightweight),
        ]));
    }
    table.to_string()
}

/// Whole page: ratings, features and the conclusion.
#[must_use]
pub fn render() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Theoretical comparison: full-data vs hash-only record contract\n");
    let _ = writeln!(out, "Ratings (1-{MAX_RATING}, higher is better)");
    out.push_str(&ratings_table());
    let _ = writeln!(out, "\nFeature comparison");
    out.push_str(&features_table());
    let _ = writeln!(out, "\nConclusion");
    let _ = writeln!(
        out,
        "  {}: more secure, costly because every attribute lives on-chain.",
        ContractVariant::Basic
    );
    let _ = writeln!(
        out,
        "  {}: scalable and cheap, integrity depends on the off-chain copy.",
        ContractVariant::Lightweight
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratings_in_range() {
        for rating in RATINGS {
            assert!((1..=MAX_RATING).contains(&rating.basic));
            assert!((1..=MAX_RATING).contains(&rating.lightweight));
        }
        let basic: Vec<u8> = RATINGS.iter().map(|r| r.basic).collect();
        assert_eq!(basic, vec![3, 1, 5, 1, 2]);
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(3), "★★★☆☆ 3/5");
        assert_eq!(stars(5), "★★★★★ 5/5");
    }

    #[test]
    fn test_render_contains_sections() {
        let page = render();
        assert!(page.contains("Gas Efficiency"));
        assert!(page.contains("Existence Checks"));
        assert!(page.contains("LightweightContract"));
    }
}
