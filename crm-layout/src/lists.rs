//! Pure list operations behind drag-and-drop.
//!
//! A drop is a removal from the source list followed by an insertion into the
//! destination list. Neither function mutates its input.

/// `list` without `id`, or `None` when `id` is not present.
pub fn remove_from(list: &[String], id: &str) -> Option<Vec<String>> {
    let idx = list.iter().position(|item| item == id)?;
    let mut next = list.to_vec();
    next.remove(idx);
    Some(next)
}

/// `list` with `id` inserted at `index`, clamped to the list length.
/// `None` appends.
pub fn insert_at(list: &[String], id: &str, index: Option<usize>) -> Vec<String> {
    let mut next = list.to_vec();
    let idx = index.map_or(next.len(), |i| i.min(next.len()));
    next.insert(idx, id.to_string());
    next
}
