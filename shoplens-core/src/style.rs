//! Style consensus filter.
//!
//! The consensus style of a search is the style label of the best-ranked
//! engine identifier that actually resolved to a catalog entry. Resolved
//! entries that do not share it are dropped.
//!
//! Entries without a style label (absent or empty) are handled by
//! [`StylePolicy`]:
//!
//! | Policy | Unstyled anchor | Unstyled non-anchor entries |
//! |---|---|---|
//! | `Strict` (default) | returned alone | never match |
//! | `MatchUnstyled` | matches other unstyled entries | match an unstyled anchor |

use tracing::debug;

use crate::catalog::{CatalogEntry, Identifier};

/// How entries without a style label take part in the consensus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StylePolicy {
    /// An unstyled entry equals nothing, not even another unstyled entry.
    #[default]
    Strict,
    /// Unstyled entries form one style of their own.
    MatchUnstyled,
}

/// The entry whose style defines the consensus: lowest index in `rank_order`.
///
/// Entries whose identifier does not appear in `rank_order` rank last.
pub fn consensus_anchor<'a>(
    entries: &'a [CatalogEntry],
    rank_order: &[Identifier],
) -> Option<&'a CatalogEntry> {
    entries
        .iter()
        .enumerate()
        .min_by_key(|(position, entry)| {
            let rank = rank_order
                .iter()
                .position(|id| *id == entry.id)
                .unwrap_or(usize::MAX);
            (rank, *position)
        })
        .map(|(_, entry)| entry)
}

/// Consensus style label; `None` when there are no entries or the anchor is unstyled.
pub fn consensus_style<'a>(
    entries: &'a [CatalogEntry],
    rank_order: &[Identifier],
) -> Option<&'a str> {
    consensus_anchor(entries, rank_order).and_then(CatalogEntry::style_label)
}

/// Keep only entries sharing the consensus style, in resolver order.
pub fn filter_by_consensus_style(
    entries: Vec<CatalogEntry>,
    rank_order: &[Identifier],
    policy: StylePolicy,
) -> Vec<CatalogEntry> {
    let Some(anchor) = consensus_anchor(&entries, rank_order) else {
        return Vec::new();
    };
    let anchor_id = anchor.id.clone();
    let consensus = anchor.style_label().map(str::to_owned);

    debug!(
        anchor = %anchor_id,
        style = consensus.as_deref().unwrap_or("<none>"),
        "Derived consensus style"
    );

    entries
        .into_iter()
        .filter(|entry| match (&consensus, entry.style_label()) {
            (Some(style), Some(label)) => style == label,
            (Some(_), None) | (None, Some(_)) => false,
            (None, None) => match policy {
                StylePolicy::MatchUnstyled => true,
                StylePolicy::Strict => entry.id == anchor_id,
            },
        })
        .collect()
}
