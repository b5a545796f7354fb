//! Task graph domain model: the DAG a goal decomposes into.
//!
//! Grounded on the teacher's `domain::models::dag` module — `TaskGraph`
//! plays the role of that module's `TaskDag`, generalized from a flat
//! task-queue view to the planner's node/edge shape (`nodes` keyed by id,
//! `edges` mapping a task to the ids that depend on it).

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Status of a task node within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Ready,
    Running,
    Complete,
    Failed,
    Blocked,
    Canceled,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Result of an agent's execution of one task node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub content: String,
    pub model: String,
    pub tokens_used: u32,
}

/// A single node in a decomposed goal's task graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNode {
    pub id: Uuid,
    pub description: String,
    pub agent_id: Option<Uuid>,
    #[serde(default)]
    pub dependencies: Vec<Uuid>,
    #[serde(default)]
    pub status: TaskStatus,
    pub result: Option<AgentResponse>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl TaskNode {
    pub fn new(description: impl Into<String>, agent_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            agent_id,
            dependencies: Vec::new(),
            status: TaskStatus::Pending,
            result: None,
            metadata: HashMap::new(),
        }
    }

    /// Ready once every listed dependency has completed.
    pub fn is_ready(&self, completed: &HashSet<Uuid>) -> bool {
        self.dependencies.iter().all(|d| completed.contains(d))
    }
}

/// Errors raised while validating or scheduling a task graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DagError {
    #[error("task graph contains a dependency cycle")]
    CycleDetected,
    #[error("task {0} depends on unknown task {1}")]
    MissingDependency(Uuid, Uuid),
    #[error("task graph has no root tasks to start from")]
    InvalidStructure,
}

/// Aggregate stats describing a graph's shape, surfaced to operators and
/// used by the executor to size its concurrency semaphore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub root_count: usize,
    pub leaf_count: usize,
    pub wave_count: usize,
    pub max_parallelism: usize,
}

/// The decomposition of a user goal into dependent task nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskGraph {
    pub nodes: HashMap<Uuid, TaskNode>,
    /// task id -> ids of tasks that depend on it (the reverse of `dependencies`)
    pub edges: HashMap<Uuid, Vec<Uuid>>,
    pub root_goal: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl TaskGraph {
    pub fn new(root_goal: impl Into<String>, nodes: Vec<TaskNode>) -> Result<Self, DagError> {
        let mut by_id: HashMap<Uuid, TaskNode> = HashMap::new();
        for n in nodes {
            by_id.insert(n.id, n);
        }
        let mut edges: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for node in by_id.values() {
            for dep in &node.dependencies {
                if !by_id.contains_key(dep) {
                    return Err(DagError::MissingDependency(node.id, *dep));
                }
                edges.entry(*dep).or_default().push(node.id);
            }
        }
        let graph = Self {
            nodes: by_id,
            edges,
            root_goal: root_goal.into(),
            metadata: HashMap::new(),
        };
        graph.ensure_acyclic()?;
        Ok(graph)
    }

    fn ensure_acyclic(&self) -> Result<(), DagError> {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        for id in self.nodes.keys() {
            if !visited.contains(id) && self.has_cycle_from(*id, &mut visited, &mut rec_stack) {
                return Err(DagError::CycleDetected);
            }
        }
        Ok(())
    }

    fn has_cycle_from(
        &self,
        id: Uuid,
        visited: &mut HashSet<Uuid>,
        rec_stack: &mut HashSet<Uuid>,
    ) -> bool {
        visited.insert(id);
        rec_stack.insert(id);
        if let Some(node) = self.nodes.get(&id) {
            for dep in &node.dependencies {
                if !visited.contains(dep) {
                    if self.has_cycle_from(*dep, visited, rec_stack) {
                        return true;
                    }
                } else if rec_stack.contains(dep) {
                    return true;
                }
            }
        }
        rec_stack.remove(&id);
        false
    }

    /// Kahn's algorithm: a single valid linear ordering respecting
    /// dependencies. `execution_waves` is the form the executor actually
    /// drives; this is exposed for display/debugging.
    pub fn topological_sort(&self) -> Result<Vec<Uuid>, DagError> {
        let mut in_degree: HashMap<Uuid, usize> = self
            .nodes
            .keys()
            .map(|id| (*id, 0usize))
            .collect();
        for node in self.nodes.values() {
            for dep in &node.dependencies {
                *in_degree.entry(node.id).or_insert(0) += 1;
                let _ = dep;
            }
        }
        let mut queue: VecDeque<Uuid> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut ordered = Vec::with_capacity(self.nodes.len());
        while let Some(id) = queue.pop_front() {
            ordered.push(id);
            if let Some(dependents) = self.edges.get(&id) {
                for dependent in dependents {
                    let entry = in_degree.entry(*dependent).or_insert(0);
                    *entry -= 1;
                    if *entry == 0 {
                        queue.push_back(*dependent);
                    }
                }
            }
        }
        if ordered.len() != self.nodes.len() {
            return Err(DagError::CycleDetected);
        }
        Ok(ordered)
    }

    /// Groups tasks into waves: each wave is every task whose dependencies
    /// are satisfied by the previous waves, executable concurrently.
    pub fn execution_waves(&self) -> Result<Vec<Vec<Uuid>>, DagError> {
        let mut completed: HashSet<Uuid> = HashSet::new();
        let mut remaining: HashSet<Uuid> = self.nodes.keys().copied().collect();
        let mut waves = Vec::new();

        while !remaining.is_empty() {
            let ready: Vec<Uuid> = remaining
                .iter()
                .filter(|id| self.nodes[id].is_ready(&completed))
                .copied()
                .collect();
            if ready.is_empty() {
                return Err(DagError::CycleDetected);
            }
            for id in &ready {
                remaining.remove(id);
                completed.insert(*id);
            }
            waves.push(ready);
        }
        Ok(waves)
    }

    pub fn roots(&self) -> Vec<Uuid> {
        self.nodes
            .values()
            .filter(|n| n.dependencies.is_empty())
            .map(|n| n.id)
            .collect()
    }

    pub fn leaves(&self) -> Vec<Uuid> {
        self.nodes
            .values()
            .filter(|n| !self.edges.contains_key(&n.id) || self.edges[&n.id].is_empty())
            .map(|n| n.id)
            .collect()
    }

    pub fn stats(&self) -> Result<GraphStats, DagError> {
        let waves = self.execution_waves()?;
        Ok(GraphStats {
            total_nodes: self.nodes.len(),
            root_count: self.roots().len(),
            leaf_count: self.leaves().len(),
            wave_count: waves.len(),
            max_parallelism: waves.iter().map(Vec::len).max().unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(deps: &[Uuid]) -> TaskNode {
        let mut n = TaskNode::new("do something", None);
        n.dependencies = deps.to_vec();
        n
    }

    #[test]
    fn linear_chain_produces_one_wave_per_node() {
        let a = node(&[]);
        let b = node(&[a.id]);
        let c = node(&[b.id]);
        let graph = TaskGraph::new("goal", vec![a.clone(), b.clone(), c.clone()]).unwrap();
        let waves = graph.execution_waves().unwrap();
        assert_eq!(waves, vec![vec![a.id], vec![b.id], vec![c.id]]);
    }

    #[test]
    fn independent_tasks_share_a_wave() {
        let a = node(&[]);
        let b = node(&[]);
        let graph = TaskGraph::new("goal", vec![a.clone(), b.clone()]).unwrap();
        let waves = graph.execution_waves().unwrap();
        assert_eq!(waves.len(), 1);
        assert_eq!(waves[0].len(), 2);
    }

    #[test]
    fn cycle_is_rejected_at_construction() {
        let mut a = node(&[]);
        let mut b = node(&[]);
        a.dependencies.push(b.id);
        b.dependencies.push(a.id);
        let err = TaskGraph::new("goal", vec![a, b]).unwrap_err();
        assert_eq!(err, DagError::CycleDetected);
    }

    #[test]
    fn missing_dependency_is_rejected() {
        let ghost = Uuid::new_v4();
        let a = node(&[ghost]);
        let err = TaskGraph::new("goal", vec![a]).unwrap_err();
        assert!(matches!(err, DagError::MissingDependency(_, _)));
    }

    #[test]
    fn topological_sort_respects_dependencies() {
        let a = node(&[]);
        let b = node(&[a.id]);
        let graph = TaskGraph::new("goal", vec![a.clone(), b.clone()]).unwrap();
        let order = graph.topological_sort().unwrap();
        let pos_a = order.iter().position(|id| *id == a.id).unwrap();
        let pos_b = order.iter().position(|id| *id == b.id).unwrap();
        assert!(pos_a < pos_b);
    }

    #[test]
    fn stats_report_max_parallelism() {
        let a = node(&[]);
        let b = node(&[]);
        let c = node(&[a.id, b.id]);
        let graph = TaskGraph::new("goal", vec![a, b, c]).unwrap();
        let stats = graph.stats().unwrap();
        assert_eq!(stats.wave_count, 2);
        assert_eq!(stats.max_parallelism, 2);
    }
}
