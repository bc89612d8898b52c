use std::collections::{HashMap, HashSet};

use crate::task::Task;

/// Window within which a task counts as recently created.
pub const RECENT_TASK_WINDOW_MS: u64 = 24 * 60 * 60 * 1000;

/// The fields client-side search matches against. Tracker tasks and linked
/// issues both browse through the same views, so the engine is generic over
/// this seam.
pub trait SearchRecord {
    fn primary_id(&self) -> &str;
    fn secondary_id(&self) -> Option<&str> {
        None
    }
    fn display_name(&self) -> &str;
    fn parent_id(&self) -> Option<&str> {
        None
    }
}

impl SearchRecord for Task {
    fn primary_id(&self) -> &str {
        self.id.as_str()
    }

    fn secondary_id(&self) -> Option<&str> {
        self.custom_id.as_deref()
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent.as_ref().map(|parent| parent.as_str())
    }
}

/// Case-insensitive substring filter over primary id, secondary id and
/// display name. A blank query keeps the input untouched; otherwise the
/// result is the matching subset in input order, unranked.
pub fn filter_by_query<'a, T: SearchRecord>(records: &'a [T], query: &str) -> Vec<&'a T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|record| {
            record.primary_id().to_lowercase().contains(&needle)
                || record
                    .secondary_id()
                    .is_some_and(|id| id.to_lowercase().contains(&needle))
                || record.display_name().to_lowercase().contains(&needle)
        })
        .collect()
}

/// Heuristic gate for attempting a direct-id lookup alongside substring
/// search. False positives and negatives are fine; the lookup is merged
/// best-effort, never authoritative.
pub fn looks_like_identifier(query: &str) -> bool {
    let trimmed = query.trim();
    (5..=20).contains(&trimmed.len())
        && trimmed
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-')
}

/// Roots and one level of children, partitioned by declared parent id.
#[derive(Debug)]
pub struct TaskGrouping<'a, T> {
    pub roots: Vec<&'a T>,
    children: Vec<(String, Vec<&'a T>)>,
    root_ids: HashSet<&'a str>,
}

impl<'a, T> TaskGrouping<'a, T> {
    pub fn children_of(&self, parent_id: &str) -> &[&'a T] {
        self.children
            .iter()
            .find(|(id, _)| id == parent_id)
            .map(|(_, group)| group.as_slice())
            .unwrap_or(&[])
    }

    /// Child groups whose declared parent is absent from the loaded set.
    /// Rendered after all parented groups rather than dropped; parent
    /// references are not validated.
    pub fn orphan_groups(&self) -> impl Iterator<Item = (&str, &[&'a T])> + '_ {
        self.children
            .iter()
            .filter(|(id, _)| !self.root_ids.contains(id.as_str()))
            .map(|(id, group)| (id.as_str(), group.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.roots.len()
            + self
                .children
                .iter()
                .map(|(_, group)| group.len())
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Single-pass partition: a record is a root iff it declares no parent;
/// otherwise it joins the group keyed by its parent id, preserving input
/// order within each group and first-seen order across groups.
pub fn group_by_parent<T: SearchRecord>(records: &[T]) -> TaskGrouping<'_, T> {
    let mut roots = Vec::new();
    let mut children: Vec<(String, Vec<&T>)> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut root_ids = HashSet::new();

    for record in records {
        match record.parent_id() {
            None => {
                root_ids.insert(record.primary_id());
                roots.push(record);
            }
            Some(parent_id) => match group_index.get(parent_id) {
                Some(&index) => children[index].1.push(record),
                None => {
                    group_index.insert(parent_id.to_owned(), children.len());
                    children.push((parent_id.to_owned(), vec![record]));
                }
            },
        }
    }

    TaskGrouping {
        roots,
        children,
        root_ids,
    }
}

/// Fold a direct-id lookup hit into an already filtered list. The hit is
/// prepended when new; an id already present leaves the list untouched so
/// the secondary channel never introduces a duplicate.
pub fn merge_direct_lookup<'a, T: SearchRecord>(
    mut filtered: Vec<&'a T>,
    direct_hit: Option<&'a T>,
) -> Vec<&'a T> {
    let Some(hit) = direct_hit else {
        return filtered;
    };
    if filtered
        .iter()
        .any(|record| record.primary_id() == hit.primary_id())
    {
        return filtered;
    }
    filtered.insert(0, hit);
    filtered
}

/// Pure recency check over the wire's epoch-millisecond string. Callers
/// supply `now_ms`; an unparseable timestamp is never recent.
pub fn is_recently_created(created_at_ms: &str, now_ms: u64, window_ms: u64) -> bool {
    let Ok(created) = created_at_ms.trim().parse::<u64>() else {
        return false;
    };
    now_ms.saturating_sub(created) < window_ms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{StatusCategory, TaskStatus};
    use crate::TaskId;

    fn task(id: &str, custom_id: Option<&str>, name: &str, parent: Option<&str>) -> Task {
        Task {
            id: TaskId::from(id),
            custom_id: custom_id.map(str::to_owned),
            name: name.to_owned(),
            status: TaskStatus {
                status: "open".to_owned(),
                color: "#aaaaaa".to_owned(),
                category: StatusCategory::Open,
            },
            date_created: "1700000000000".to_owned(),
            url: format!("https://example.test/t/{id}"),
            parent: parent.map(TaskId::from),
            assignees: Vec::new(),
        }
    }

    fn ids<'a>(records: &[&'a Task]) -> Vec<&'a str> {
        records.iter().map(|task| task.id.as_str()).collect()
    }

    #[test]
    fn blank_query_returns_full_input_in_order() {
        let tasks = vec![task("a", None, "First", None), task("b", None, "Second", None)];
        for query in ["", "   ", "\t"] {
            let filtered = filter_by_query(&tasks, query);
            assert_eq!(ids(&filtered), ["a", "b"]);
        }
    }

    #[test]
    fn filter_is_case_insensitive_across_all_fields() {
        let tasks = vec![
            task("86daaaa", Some("DEV-101"), "Fix Login Bug", None),
            task("86dbbbb", None, "Polish onboarding", None),
        ];
        for query in ["FIX LOGIN", "fix login", "dev-101", "86DAAAA"] {
            let filtered = filter_by_query(&tasks, query);
            assert_eq!(ids(&filtered), ["86daaaa"], "query {query:?}");
        }
    }

    #[test]
    fn filter_preserves_relative_order_of_matches() {
        let tasks = vec![
            task("a", None, "alpha sync", None),
            task("b", None, "beta", None),
            task("c", None, "alpha review", None),
        ];
        let filtered = filter_by_query(&tasks, "alpha");
        assert_eq!(ids(&filtered), ["a", "c"]);
    }

    #[test]
    fn identifier_heuristic_bounds() {
        assert!(looks_like_identifier("86dxk2p"));
        assert!(looks_like_identifier(" DEV-1234 "));
        assert!(looks_like_identifier("abc_de"));
        assert!(!looks_like_identifier("abcd"));
        assert!(!looks_like_identifier("this query has spaces"));
        assert!(!looks_like_identifier("123456789012345678901"));
        assert!(!looks_like_identifier("dev#42!"));
    }

    #[test]
    fn grouping_partitions_every_task_exactly_once() {
        let tasks = vec![
            task("p1", None, "Parent one", None),
            task("c1", None, "Child one", Some("p1")),
            task("p2", None, "Parent two", None),
            task("c2", None, "Child two", Some("p1")),
            task("c3", None, "Child three", Some("p2")),
        ];
        let grouping = group_by_parent(&tasks);
        assert_eq!(ids(&grouping.roots), ["p1", "p2"]);
        assert_eq!(ids(grouping.children_of("p1")), ["c1", "c2"]);
        assert_eq!(ids(grouping.children_of("p2")), ["c3"]);
        assert_eq!(grouping.len(), tasks.len());
        assert_eq!(grouping.orphan_groups().count(), 0);
    }

    #[test]
    fn orphan_children_are_kept_under_their_declared_parent() {
        let tasks = vec![task("a", None, "Stray child", Some("ghost"))];
        let grouping = group_by_parent(&tasks);
        assert!(grouping.roots.is_empty());
        assert_eq!(ids(grouping.children_of("ghost")), ["a"]);
        let orphans: Vec<_> = grouping.orphan_groups().map(|(id, _)| id).collect();
        assert_eq!(orphans, ["ghost"]);
        assert_eq!(grouping.len(), 1);
    }

    #[test]
    fn direct_hit_already_present_is_not_duplicated() {
        let tasks = vec![task("x", None, "Existing", None)];
        let hit = task("x", None, "Existing", None);
        let merged = merge_direct_lookup(tasks.iter().collect(), Some(&hit));
        assert_eq!(ids(&merged), ["x"]);
    }

    #[test]
    fn new_direct_hit_is_prepended() {
        let tasks = vec![task("x", None, "Existing", None)];
        let hit = task("y", None, "Looked up", None);
        let merged = merge_direct_lookup(tasks.iter().collect(), Some(&hit));
        assert_eq!(ids(&merged), ["y", "x"]);
    }

    #[test]
    fn recency_window_comparison() {
        let now = 1_700_000_050_000;
        assert!(is_recently_created("1700000000000", now, RECENT_TASK_WINDOW_MS));
        let twenty_five_hours_later = 1_700_000_000_000 + 25 * 60 * 60 * 1000;
        assert!(!is_recently_created(
            "1700000000000",
            twenty_five_hours_later,
            RECENT_TASK_WINDOW_MS
        ));
        assert!(!is_recently_created("garbage", now, RECENT_TASK_WINDOW_MS));
    }
}
