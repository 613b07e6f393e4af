//! Filtering and ordering of candidate pools.

use crate::completion::CompletionItem;

/// Upper bound on the number of candidates returned for one request.
pub const MAX_RESULTS: usize = 20;

/// Filters `items` by `partial` and orders the survivors.
///
/// A candidate survives when its insert text contains `partial`, ignoring
/// case. Candidates starting with `partial` come first; each tier is in
/// code-point order of the insert text. At most [`MAX_RESULTS`] candidates
/// are returned.
#[must_use]
pub fn rank(items: Vec<CompletionItem>, partial: &str) -> Vec<CompletionItem> {
    rank_by(items, partial, |item| item.insert_text.as_str())
}

/// Like [`rank`], but matches `partial` against `key(item)` instead of the
/// whole insert text.
pub(crate) fn rank_by<F>(
    items: Vec<CompletionItem>,
    partial: &str,
    key: F,
) -> Vec<CompletionItem>
where
    F: Fn(&CompletionItem) -> &str,
{
    let needle = partial.to_lowercase();
    let mut tiered: Vec<(bool, CompletionItem)> = items
        .into_iter()
        .filter_map(|item| {
            let haystack = key(&item).to_lowercase();
            if !haystack.contains(&needle) {
                return None;
            }
            Some((!haystack.starts_with(&needle), item))
        })
        .collect();
    tiered.sort_by(|(left_tier, left), (right_tier, right)| {
        left_tier
            .cmp(right_tier)
            .then_with(|| key(left).cmp(key(right)))
    });
    tiered
        .into_iter()
        .map(|(_, item)| item)
        .take(MAX_RESULTS)
        .collect()
}
