//! Dense order assignment for drag-reordered category lists.

use bantin_api_types::{Category, OrderUpdate};

/// Build the bulk order payload for a reordered visible set.
///
/// Every item gets `order = position + 1` (1-based, dense, contiguous), not
/// just the moved ones; the payload describes the whole sequence the user
/// sees. Fewer than two items cannot change order; `None` means no request
/// should be issued. Renumbering covers only the provided set; rows on other
/// pages keep their server-side values.
pub fn plan_reorder(items: &[Category]) -> Option<Vec<OrderUpdate>> {
    if items.len() < 2 {
        return None;
    }

    Some(
        items
            .iter()
            .enumerate()
            .map(|(position, category)| OrderUpdate {
                id: category.id,
                order: i32::try_from(position).map_or(i32::MAX, |p| p.saturating_add(1)),
            })
            .collect(),
    )
}

/// Move the item with `id` to `target` (clamped to the sequence bounds),
/// shifting everything in between. Returns `false` when `id` is absent.
pub fn reposition(items: &mut Vec<Category>, id: i64, target: usize) -> bool {
    let Some(from) = items.iter().position(|c| c.id == id) else {
        return false;
    };
    let item = items.remove(from);
    let target = target.min(items.len());
    items.insert(target, item);
    true
}
