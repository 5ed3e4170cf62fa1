//! Finding purchases similar to one being recorded.
//!
//! Manufacturers publish variants of one product under catalog numbers that
//! share a numeric stem: `32-381`, `32-381A`, `32-381SF`, and so on. When the
//! collector records a purchase, earlier purchases from the same manufacturer
//! whose catalog numbers share the new one's leading digit run are offered as
//! "similar". An exact catalog-number match, when one exists, is the only
//! useful answer and replaces the looser prefix matches.
//!
//! The repository narrows candidates by manufacturer and prefix; the ranking
//! here re-checks both, so it is correct over any candidate list.

use std::cmp::Ordering;

use crate::domain::entities::Purchase;

/// How the returned purchases relate to the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Catalog numbers are identical.
    Exact,
    /// Catalog numbers share the leading digit run.
    Prefix,
}

/// Purchases similar to a candidate, best matches only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimilarPurchases {
    kind: Option<MatchKind>,
    purchases: Vec<Purchase>,
}

impl SimilarPurchases {
    pub fn none() -> Self {
        Self::default()
    }

    /// `None` when nothing matched.
    pub fn kind(&self) -> Option<MatchKind> {
        self.kind
    }

    pub fn purchases(&self) -> &[Purchase] {
        &self.purchases
    }

    pub fn into_purchases(self) -> Vec<Purchase> {
        self.purchases
    }

    pub fn is_empty(&self) -> bool {
        self.purchases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.purchases.len()
    }
}

impl IntoIterator for SimilarPurchases {
    type Item = Purchase;
    type IntoIter = std::vec::IntoIter<Purchase>;

    fn into_iter(self) -> Self::IntoIter {
        self.purchases.into_iter()
    }
}

/// Leading run of ASCII decimal digits in a catalog number.
///
/// `"32-381A"` gives `"32"`, `"4D-022"` gives `"4"`, `"R3045"` gives `""`.
pub fn catalog_number_digits(catalog_number: &str) -> &str {
    let end = catalog_number
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(catalog_number.len());
    &catalog_number[..end]
}

/// Whether `other` is similar to `candidate`: a different record from the
/// same manufacturer whose catalog number starts with the candidate's digit
/// run.
pub fn is_similar(candidate: &Purchase, other: &Purchase) -> bool {
    let digits = catalog_number_digits(&candidate.catalog_number);
    !digits.is_empty()
        && other.id != candidate.id
        && other.manufacturer == candidate.manufacturer
        && other.catalog_number.starts_with(digits)
}

/// Rank candidate purchases against `candidate`.
///
/// Exact catalog-number matches win outright; otherwise every prefix match is
/// returned. Results are ordered by catalog number, then purchase date
/// (undated last), then id.
pub fn similar_purchases(
    candidate: &Purchase,
    found: impl IntoIterator<Item = Purchase>,
) -> SimilarPurchases {
    let mut matches: Vec<Purchase> = found
        .into_iter()
        .filter(|other| is_similar(candidate, other))
        .collect();

    if matches.is_empty() {
        return SimilarPurchases::none();
    }

    let kind = if matches
        .iter()
        .any(|other| other.catalog_number == candidate.catalog_number)
    {
        matches.retain(|other| other.catalog_number == candidate.catalog_number);
        MatchKind::Exact
    } else {
        MatchKind::Prefix
    };

    matches.sort_by(display_order);

    SimilarPurchases {
        kind: Some(kind),
        purchases: matches,
    }
}

fn display_order(a: &Purchase, b: &Purchase) -> Ordering {
    a.catalog_number
        .cmp(&b.catalog_number)
        .then_with(|| match (a.date, b.date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.id.cmp(&b.id))
}
