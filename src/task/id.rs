// src/task/id.rs

//! Task identifiers: `task-001`, `task-002`, ...

/// Prefix shared by every generated id.
pub const ID_PREFIX: &str = "task-";

/// Render the id for sequence number `n` (zero-padded to three digits).
pub fn format_id(n: u64) -> String {
    format!("{ID_PREFIX}{n:03}")
}

/// Numeric part of a generated id, or `None` for ids that do not follow the
/// `task-NNN` scheme (e.g. hand-edited documents).
pub fn id_number(id: &str) -> Option<u64> {
    id.strip_prefix(ID_PREFIX)?.parse().ok()
}

/// Sort key that orders ids by sequence number, so `task-1000` follows
/// `task-999`. Foreign ids sort after generated ones, by name.
pub fn id_sort_key(id: &str) -> (u64, &str) {
    (id_number(id).unwrap_or(u64::MAX), id)
}

/// Next sequence number given the highest number ever issued and the ids
/// currently present.
pub fn next_id_number<'a>(last_issued: u64, existing: impl IntoIterator<Item = &'a str>) -> u64 {
    let highest_present = existing
        .into_iter()
        .filter_map(id_number)
        .max()
        .unwrap_or(0);
    last_issued.max(highest_present) + 1
}
