//! Blocking-relationship graph built from an issue snapshot.
//!
//! The graph is a derived, read-only view: it is built in one pass from a
//! complete list of issues and never mutated afterwards. Callers that change
//! issues throw the graph away and build a new one.
//!
//! # Edge Direction Convention
//!
//! Edges point from **dependent to blocker**: if issue X lists B in its
//! `blocked_by`, the edge is `X -> B`. Both query directions come from this
//! single edge store:
//!
//! - outgoing edges of X are X's blockers ([`DependencyGraph::get_blockers`])
//! - incoming edges of B are the issues B blocks ([`DependencyGraph::get_blocked_by_this`])
//!
//! so the two views are exact transposes by construction.
//!
//! # Dangling References
//!
//! A `blocked_by` entry naming an unknown ID still produces a node and an
//! edge. The dangling node is not counted by [`DependencyGraph::len`] and,
//! because it never appears in any caller's open-issue set, it never blocks.
//!
//! # Cycles
//!
//! Building never rejects cycles. [`DependencyGraph::detect_cycle`] is the
//! guard callers run before committing a new edge. Traversals use explicit
//! stacks with visited sets, so a cyclic graph is still walked in bounded
//! time.

use crate::domain::{Issue, IssueId, IssueStatus};
use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Immutable snapshot of blocking relationships.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Nodes hold issue IDs; an edge `a -> b` means `a` is blocked by `b`.
    graph: DiGraph<IssueId, ()>,

    /// Node lookup for every ID seen, including dangling blocker IDs.
    node_map: HashMap<IssueId, NodeIndex>,

    /// IDs of the issues the graph was built from.
    all_ids: HashSet<IssueId>,
}

impl DependencyGraph {
    /// Build the graph from a complete issue list.
    ///
    /// Runs in O(issues + edges). Repeated blocker IDs within one issue
    /// collapse to a single edge.
    #[must_use]
    pub fn build(issues: &[Issue]) -> Self {
        let mut built = Self::default();

        for issue in issues {
            built.node_for(&issue.id);
            built.all_ids.insert(issue.id.clone());
        }

        for issue in issues {
            let dependent = built.node_map[&issue.id];
            let mut seen = HashSet::with_capacity(issue.blocked_by.len());
            for blocker_id in issue.blocked_by.iter().filter(|&id| seen.insert(id)) {
                let blocker = built.node_for(blocker_id);
                built.graph.add_edge(dependent, blocker, ());
            }
        }

        built
    }

    fn node_for(&mut self, id: &IssueId) -> NodeIndex {
        if let Some(&node) = self.node_map.get(id) {
            return node;
        }
        let node = self.graph.add_node(id.clone());
        self.node_map.insert(id.clone(), node);
        node
    }

    /// Number of issues the graph was built from.
    #[must_use]
    pub fn len(&self) -> usize {
        self.all_ids.len()
    }

    /// Whether the graph was built from an empty issue list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all_ids.is_empty()
    }

    /// Total number of blocking edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether any of `id`'s direct blockers is in `open_ids`.
    ///
    /// What counts as open is up to the caller.
    #[must_use]
    pub fn is_blocked(&self, id: &IssueId, open_ids: &HashSet<IssueId>) -> bool {
        self.node_map.get(id).is_some_and(|&node| {
            self.graph
                .neighbors_directed(node, Direction::Outgoing)
                .any(|blocker| open_ids.contains(&self.graph[blocker]))
        })
    }

    /// Issues from `open_issues` that are ready to work on.
    ///
    /// An issue is ready when it is open, not manually marked blocked, and
    /// none of its blockers is among the open issues of the same slice.
    /// Blockers that are closed, or absent from the slice, do not block.
    /// Input order is preserved.
    #[must_use]
    pub fn get_unblocked<'a>(&self, open_issues: &'a [Issue]) -> Vec<&'a Issue> {
        let open_ids: HashSet<IssueId> = open_issues
            .iter()
            .filter(|issue| issue.is_open())
            .map(|issue| issue.id.clone())
            .collect();

        open_issues
            .iter()
            .filter(|issue| {
                issue.is_open()
                    && issue.status != IssueStatus::Blocked
                    && !self.is_blocked(&issue.id, &open_ids)
            })
            .collect()
    }

    /// Whether adding "`from_id` is blocked by `to_id`" would create a cycle.
    ///
    /// Walks `to_id`'s blockers transitively and reports whether `from_id`
    /// is reached. A self-dependency is always a cycle.
    #[must_use]
    pub fn detect_cycle(&self, from_id: &IssueId, to_id: &IssueId) -> bool {
        if from_id == to_id {
            return true;
        }
        let Some(&start) = self.node_map.get(to_id) else {
            return false;
        };

        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(node) = dfs.next(&self.graph) {
            if self.graph[node] == *from_id {
                return true;
            }
        }
        false
    }

    /// Direct blockers of `id` (empty if unknown).
    #[must_use]
    pub fn get_blockers(&self, id: &IssueId) -> BTreeSet<IssueId> {
        self.neighbor_ids(id, Direction::Outgoing)
    }

    /// Issues that list `id` as a direct blocker (empty if unknown).
    #[must_use]
    pub fn get_blocked_by_this(&self, id: &IssueId) -> BTreeSet<IssueId> {
        self.neighbor_ids(id, Direction::Incoming)
    }

    fn neighbor_ids(&self, id: &IssueId, direction: Direction) -> BTreeSet<IssueId> {
        self.node_map
            .get(id)
            .map(|&node| {
                self.graph
                    .neighbors_directed(node, direction)
                    .map(|n| self.graph[n].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All transitive blockers of `id`, deepest first.
    ///
    /// Every blocker appears before any issue it transitively blocks, and
    /// `id` itself is never included. Direct blockers are visited in
    /// ascending ID order, which fixes the order among independent
    /// blockers. On a cyclic graph each node is still visited once; the
    /// order is then not meaningful.
    #[must_use]
    pub fn get_transitive_blockers(&self, id: &IssueId) -> Vec<IssueId> {
        let Some(&start) = self.node_map.get(id) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut visited = HashSet::from([start]);
        let mut stack = vec![(start, self.sorted_blockers(start).into_iter())];

        // Post-order: a node is emitted once all of its blockers are.
        while let Some((node, pending)) = stack.last_mut() {
            let node = *node;
            match pending.next() {
                Some(blocker) => {
                    if visited.insert(blocker) {
                        stack.push((blocker, self.sorted_blockers(blocker).into_iter()));
                    }
                }
                None => {
                    stack.pop();
                    if node != start {
                        result.push(self.graph[node].clone());
                    }
                }
            }
        }

        result
    }

    fn sorted_blockers(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut blockers: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        blockers.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        blockers
    }

    /// Whether the edge set is free of cycles.
    ///
    /// Only true if every edge was added behind [`Self::detect_cycle`].
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        algo::toposort(&self.graph, None).is_ok()
    }

    /// `(dependent, blocker)` pairs whose blocker is not a known issue.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<(IssueId, IssueId)> {
        let mut dangling: Vec<(IssueId, IssueId)> = self
            .graph
            .node_indices()
            .filter(|&n| !self.all_ids.contains(&self.graph[n]))
            .flat_map(|n| {
                self.graph
                    .neighbors_directed(n, Direction::Incoming)
                    .map(move |dependent| (self.graph[dependent].clone(), self.graph[n].clone()))
            })
            .collect();
        dangling.sort();
        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn issue(id: &str, status: IssueStatus, blocked_by: &[&str]) -> Issue {
        let now = Utc::now();
        Issue {
            id: IssueId::new(id),
            title: format!("Issue {id}"),
            status,
            priority: 2,
            issue_type: Default::default(),
            description: String::new(),
            design_notes: String::new(),
            acceptance_criteria: vec![],
            labels: vec![],
            blocked_by: blocked_by.iter().map(|b| IssueId::new(*b)).collect(),
            parent: None,
            comments: vec![],
            created_at: now - Duration::seconds(60),
            updated_at: now,
            closed_at: None,
        }
    }

    fn open(id: &str, blocked_by: &[&str]) -> Issue {
        issue(id, IssueStatus::Open, blocked_by)
    }

    fn id(s: &str) -> IssueId {
        IssueId::new(s)
    }

    fn ids(list: &[&str]) -> Vec<IssueId> {
        list.iter().map(|s| id(s)).collect()
    }

    fn set(list: &[&str]) -> BTreeSet<IssueId> {
        list.iter().map(|s| id(s)).collect()
    }

    fn ready_ids(graph: &DependencyGraph, issues: &[Issue]) -> Vec<IssueId> {
        graph
            .get_unblocked(issues)
            .into_iter()
            .map(|i| i.id.clone())
            .collect()
    }

    /// D blocked by B and C, both blocked by A.
    fn diamond() -> Vec<Issue> {
        vec![
            open("a", &[]),
            open("b", &["a"]),
            open("c", &["a"]),
            open("d", &["b", "c"]),
        ]
    }

    #[test]
    fn test_build_records_both_directions() {
        let graph = DependencyGraph::build(&diamond());

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.get_blockers(&id("d")), set(&["b", "c"]));
        assert_eq!(graph.get_blocked_by_this(&id("a")), set(&["b", "c"]));
        assert!(graph.get_blockers(&id("a")).is_empty());
        assert!(graph.get_blocked_by_this(&id("d")).is_empty());
    }

    #[test]
    fn test_build_collapses_repeated_blockers() {
        let graph = DependencyGraph::build(&[open("a", &[]), open("b", &["a", "a"])]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_build_collapses_interleaved_repeats_per_issue() {
        let graph = DependencyGraph::build(&[
            open("a", &[]),
            open("c", &[]),
            open("b", &["a", "c", "a", "c", "a"]),
            open("d", &["a", "a"]),
        ]);

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.get_blockers(&id("b")), set(&["a", "c"]));
        assert_eq!(graph.get_blocked_by_this(&id("a")), set(&["b", "d"]));
    }

    #[test]
    fn test_build_wide_fan_in_has_one_edge_per_blocker() {
        let blockers: Vec<String> = (0..2_000).map(|n| format!("w{n}")).collect();
        let mut issues: Vec<Issue> = blockers.iter().map(|b| open(b, &[])).collect();
        let mut repeated: Vec<&str> = blockers.iter().map(String::as_str).collect();
        repeated.extend(blockers.iter().map(String::as_str));
        issues.push(open("sink", &repeated));

        let graph = DependencyGraph::build(&issues);
        assert_eq!(graph.edge_count(), 2_000);
        assert_eq!(graph.get_blockers(&id("sink")).len(), 2_000);
    }

    #[test]
    fn test_build_keeps_dangling_reference() {
        let graph = DependencyGraph::build(&[open("a", &["ghost"])]);

        assert_eq!(graph.len(), 1);
        assert!(graph.get_blockers(&id("ghost")).is_empty());
        assert_eq!(graph.get_blockers(&id("a")), set(&["ghost"]));
        assert_eq!(graph.dangling_references(), vec![(id("a"), id("ghost"))]);
    }

    #[test]
    fn test_unknown_id_queries_are_empty() {
        let graph = DependencyGraph::build(&diamond());
        assert!(graph.get_blockers(&id("zzz")).is_empty());
        assert!(graph.get_blocked_by_this(&id("zzz")).is_empty());
        assert!(graph.get_transitive_blockers(&id("zzz")).is_empty());
    }

    #[test]
    fn test_is_blocked_uses_caller_open_set() {
        let graph = DependencyGraph::build(&diamond());
        let all: HashSet<IssueId> = ids(&["a", "b", "c", "d"]).into_iter().collect();
        let only_a: HashSet<IssueId> = ids(&["a"]).into_iter().collect();

        assert!(graph.is_blocked(&id("d"), &all));
        assert!(!graph.is_blocked(&id("d"), &only_a));
        assert!(graph.is_blocked(&id("b"), &only_a));
        assert!(!graph.is_blocked(&id("a"), &all));
    }

    #[test]
    fn test_get_unblocked_excludes_closed_and_manually_blocked() {
        let issues = vec![
            issue("closed", IssueStatus::Closed, &[]),
            issue("manual", IssueStatus::Blocked, &[]),
            issue("working", IssueStatus::InProgress, &[]),
            open("free", &[]),
        ];
        let graph = DependencyGraph::build(&issues);
        assert_eq!(ready_ids(&graph, &issues), ids(&["working", "free"]));
    }

    #[test]
    fn test_get_unblocked_ignores_closed_blockers() {
        let issues = vec![
            issue("a", IssueStatus::Closed, &[]),
            open("b", &["a"]),
            open("c", &["b"]),
        ];
        let graph = DependencyGraph::build(&issues);
        assert_eq!(ready_ids(&graph, &issues), ids(&["b"]));
    }

    #[test]
    fn test_get_unblocked_treats_manually_blocked_blocker_as_open() {
        let issues = vec![issue("a", IssueStatus::Blocked, &[]), open("b", &["a"])];
        let graph = DependencyGraph::build(&issues);
        assert!(ready_ids(&graph, &issues).is_empty());
    }

    #[test]
    fn test_get_unblocked_dangling_blocker_does_not_block() {
        let issues = vec![open("a", &["ghost"])];
        let graph = DependencyGraph::build(&issues);
        assert_eq!(ready_ids(&graph, &issues), ids(&["a"]));
    }

    #[test]
    fn test_get_unblocked_only_slice_members_block() {
        let all = vec![open("a", &[]), open("b", &["a"])];
        let graph = DependencyGraph::build(&all);
        let without_a = vec![all[1].clone()];
        assert_eq!(ready_ids(&graph, &without_a), ids(&["b"]));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let graph = DependencyGraph::build(&diamond());
        assert!(graph.detect_cycle(&id("a"), &id("a")));
        assert!(DependencyGraph::default().detect_cycle(&id("x"), &id("x")));
    }

    #[test]
    fn test_detect_cycle_on_chain() {
        let graph = DependencyGraph::build(&[open("a", &[]), open("b", &["a"]), open("c", &["b"])]);
        assert!(graph.detect_cycle(&id("a"), &id("c")));
        assert!(graph.detect_cycle(&id("a"), &id("b")));
        assert!(!graph.detect_cycle(&id("c"), &id("a")));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let graph = DependencyGraph::build(&diamond());
        assert!(!graph.detect_cycle(&id("d"), &id("a")));
        assert!(graph.detect_cycle(&id("a"), &id("d")));
    }

    #[test]
    fn test_added_edge_is_caught_in_reverse() {
        let mut issues = vec![open("a", &[]), open("b", &[])];
        let before = DependencyGraph::build(&issues);
        assert!(!before.detect_cycle(&id("a"), &id("b")));

        issues[0].blocked_by.push(id("b"));
        let after = DependencyGraph::build(&issues);
        assert!(after.detect_cycle(&id("b"), &id("a")));
    }

    #[test]
    fn test_detect_cycle_unknown_target_is_false() {
        let graph = DependencyGraph::build(&diamond());
        assert!(!graph.detect_cycle(&id("a"), &id("nowhere")));
    }

    #[test]
    fn test_transitive_blockers_on_chain() {
        let graph = DependencyGraph::build(&[open("a", &[]), open("b", &["a"]), open("c", &["b"])]);
        assert_eq!(graph.get_transitive_blockers(&id("c")), ids(&["a", "b"]));
        assert_eq!(graph.get_transitive_blockers(&id("b")), ids(&["a"]));
        assert!(graph.get_transitive_blockers(&id("a")).is_empty());
    }

    #[test]
    fn test_transitive_blockers_on_diamond() {
        let graph = DependencyGraph::build(&diamond());
        let order = graph.get_transitive_blockers(&id("d"));

        assert_eq!(order.len(), 3);
        assert_eq!(order[0], id("a"));
        assert!(!order.contains(&id("d")));
        assert_eq!(order, ids(&["a", "b", "c"]));
    }

    #[test]
    fn test_transitive_blockers_terminate_on_cycle() {
        // Built directly so the cycle bypasses the add-time guard.
        let issues = vec![open("a", &["c"]), open("b", &["a"]), open("c", &["b"])];
        let graph = DependencyGraph::build(&issues);

        let order = graph.get_transitive_blockers(&id("a"));
        assert_eq!(order.len(), 2);
        assert!(!order.contains(&id("a")));
        assert!(!graph.is_acyclic());
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let depth = 50_000;
        let issues: Vec<Issue> = (0..depth)
            .map(|i| {
                let name = format!("n{i:06}");
                if i == 0 {
                    open(&name, &[])
                } else {
                    let prev = format!("n{:06}", i - 1);
                    open(&name, &[prev.as_str()])
                }
            })
            .collect();
        let graph = DependencyGraph::build(&issues);
        let last = id(&format!("n{:06}", depth - 1));

        let order = graph.get_transitive_blockers(&last);
        assert_eq!(order.len(), depth - 1);
        assert_eq!(order[0], id("n000000"));
        assert!(graph.detect_cycle(&id("n000000"), &last));
    }
}
