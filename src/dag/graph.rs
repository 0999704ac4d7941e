// src/dag/graph.rs

use std::collections::BTreeMap;

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graphmap::DiGraphMap;

use crate::errors::{Result, TaskGraphError};
use crate::task::{Task, TaskId, id_sort_key};

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Direct dependencies: tasks that must complete before this one can run.
    deps: Vec<TaskId>,
    /// Direct dependents: tasks that depend on this one.
    dependents: Vec<TaskId>,
}

/// In-memory dependency graph keyed by task id.
///
/// Built from a task slice on demand; it is never persisted. Unlike the task
/// records themselves this makes no assumptions about validity: dangling
/// references are kept in `deps` but produce no dependent edge, and cycles
/// are representable so that [`DependencyGraph::cycles`] can report them.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: BTreeMap<TaskId, DagNode>,
    /// Ids in insertion order, for deterministic traversal.
    order: Vec<TaskId>,
}

impl DependencyGraph {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut nodes: BTreeMap<TaskId, DagNode> = BTreeMap::new();
        let mut order = Vec::with_capacity(tasks.len());

        // First pass: create nodes with their dependency lists.
        for task in tasks {
            if !nodes.contains_key(&task.id) {
                order.push(task.id.clone());
            }
            nodes.insert(
                task.id.clone(),
                DagNode {
                    deps: task.dependencies.clone(),
                    dependents: Vec::new(),
                },
            );
        }

        // Second pass: populate dependents based on deps.
        for task_id in order.iter() {
            let deps = nodes
                .get(task_id)
                .map(|n| n.deps.clone())
                .unwrap_or_default();

            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    if !dep_node.dependents.contains(task_id) {
                        dep_node.dependents.push(task_id.clone());
                    }
                }
            }
        }

        for node in nodes.values_mut() {
            node.dependents.sort_by(|a, b| id_sort_key(a).cmp(&id_sort_key(b)));
        }

        Self { nodes, order }
    }

    /// All task ids, in insertion order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that list it as a dependency),
    /// ordered by id.
    pub fn dependents_of(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Build a petgraph view with edges `dep -> task` for every resolvable
    /// dependency.
    fn as_graphmap(&self) -> DiGraphMap<&str, ()> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for id in self.order.iter() {
            graph.add_node(id.as_str());
        }

        for id in self.order.iter() {
            for dep in self.dependencies_of(id) {
                if self.contains(dep) {
                    graph.add_edge(dep.as_str(), id.as_str(), ());
                }
            }
        }

        graph
    }

    /// Every dependency cycle in the graph.
    ///
    /// Each strongly connected component with more than one member is a
    /// cycle; members are returned in id order. Self-dependencies are reported
    /// separately by validation and are not included here. The search covers
    /// the whole graph, so every cycle is found, not just the first one.
    pub fn cycles(&self) -> Vec<Vec<TaskId>> {
        let graph = self.as_graphmap();

        let mut cycles: Vec<Vec<TaskId>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|component| {
                let mut ids: Vec<TaskId> = component.into_iter().map(str::to_string).collect();
                ids.sort_by(|a, b| id_sort_key(a).cmp(&id_sort_key(b)));
                ids
            })
            .collect();

        cycles.sort_by(|a, b| id_sort_key(&a[0]).cmp(&id_sort_key(&b[0])));
        cycles
    }

    /// Ids ordered so that every task comes after all of its dependencies.
    pub fn topological_order(&self) -> Result<Vec<TaskId>> {
        let graph = self.as_graphmap();

        match toposort(&graph, None) {
            Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
            Err(cycle) => Err(TaskGraphError::DagCycle(format!(
                "cycle detected in task graph involving task '{}'",
                cycle.node_id()
            ))),
        }
    }
}
