//! Drag-and-drop reordering helpers.

/// Move the element at `from` so that it ends up at index `to`.
///
/// Elements between the two positions shift by one; everything else keeps its
/// relative order. Returns `false` (leaving `items` untouched) when either
/// index is out of range.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    true
}
