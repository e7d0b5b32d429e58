//! Pure list-reorder transforms.
//!
//! The dashboard carries two deliberately different reorder semantics:
//!
//! - [`reorder`]: move-and-shift, used by the main dashboard grid. The card
//!   at `from` is lifted out and reinserted at `to`; everything in between
//!   shifts by one, and `order` values are renumbered `0..n-1`.
//! - [`swap_order`]: order-swap, used by the goal-category grid. Only the
//!   two named cards trade `order` values; no other card moves.
//!
//! Keeping both as pure functions keeps the drag-and-drop layer a dumb
//! invoker: it picks the function for its page type and hands the result to
//! the engine.

use crate::model::CardLayout;

/// Renumber `order` fields to `0..n-1` in current list sequence.
pub fn renumber(cards: &mut [CardLayout]) {
    for (position, card) in cards.iter_mut().enumerate() {
        card.order = position as u32;
    }
}

/// Sort a list by `order` (stable, so equal orders keep relative sequence).
pub fn sorted_by_order(cards: &[CardLayout]) -> Vec<CardLayout> {
    let mut sorted = cards.to_vec();
    sorted.sort_by_key(|card| card.order);
    sorted
}

/// Move the element at `from` to position `to`, shifting the elements in
/// between, then renumber. Out-of-range indexes leave the list unchanged.
pub fn reorder(cards: &[CardLayout], from: usize, to: usize) -> Vec<CardLayout> {
    let mut result = cards.to_vec();
    if from >= result.len() || to >= result.len() {
        return result;
    }
    let moved = result.remove(from);
    result.insert(to, moved);
    renumber(&mut result);
    result
}

/// Swap the `order` values of the cards with ids `a` and `b`. If either id
/// is absent the list is returned unchanged.
pub fn swap_order(cards: &[CardLayout], a: &str, b: &str) -> Vec<CardLayout> {
    let mut result = cards.to_vec();
    let pos_a = result.iter().position(|card| card.id == a);
    let pos_b = result.iter().position(|card| card.id == b);
    if let (Some(pos_a), Some(pos_b)) = (pos_a, pos_b) {
        let order_a = result[pos_a].order;
        result[pos_a].order = result[pos_b].order;
        result[pos_b].order = order_a;
    }
    result
}
