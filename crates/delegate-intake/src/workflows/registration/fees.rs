use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Registration fee before any discount, in whole currency units.
pub const BASE_FEE: i64 = 79_000;

/// Largest combined discount promised in public copy. Not enforced by the
/// calculator; breakdowns above it are flagged instead.
pub const ADVERTISED_MAX_DISCOUNT: i64 = 20_000;

/// Discount categories the calculator recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiscountTag {
    #[serde(rename = "IELTS")]
    Ielts,
    #[serde(rename = "SAT")]
    Sat,
}

impl DiscountTag {
    pub const ALL: [DiscountTag; 2] = [DiscountTag::Ielts, DiscountTag::Sat];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "IELTS" => Some(Self::Ielts),
            "SAT" => Some(Self::Sat),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DiscountTag::Ielts => "IELTS",
            DiscountTag::Sat => "SAT",
        }
    }

    pub const fn amount(self) -> i64 {
        match self {
            DiscountTag::Ielts => 10_000,
            DiscountTag::Sat => 10_000,
        }
    }
}

/// Derived fee summary; recomputed whenever shown, never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub original_fee: i64,
    pub discount: i64,
    pub final_fee: i64,
}

impl FeeBreakdown {
    pub fn exceeds_advertised_cap(&self) -> bool {
        self.discount > ADVERTISED_MAX_DISCOUNT
    }
}

/// Maps discount-eligibility tags to a [`FeeBreakdown`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FeeCalculator;

impl FeeCalculator {
    /// Unrecognised tags are ignored and each recognised tag counts once.
    /// The final fee is not floored at zero.
    pub fn calculate<I, S>(&self, tags: I) -> FeeBreakdown
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let recognised = Self::recognised(tags);
        let discount: i64 = recognised.iter().map(|tag| tag.amount()).sum();

        FeeBreakdown {
            original_fee: BASE_FEE,
            discount,
            final_fee: BASE_FEE - discount,
        }
    }

    pub fn recognised<I, S>(tags: I) -> BTreeSet<DiscountTag>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter()
            .filter_map(|tag| DiscountTag::parse(tag.as_ref()))
            .collect()
    }
}
