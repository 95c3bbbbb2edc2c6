//! A small generic directed graph.
//!
//! An edge `X -> Y` reads "Y depends on X": X has to be visited before Y
//! in a prerequisite traversal. Adjacency is kept in ordered sets, so every
//! traversal is deterministic for a given set of nodes and edges.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Returned when a traversal order is requested from a cyclic graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("graph contains a cycle: {cycle:?}")]
pub struct CycleError<T> {
    /// One cycle of the graph, closed on itself (first == last).
    pub cycle: Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Directed graph over nodes of type `T`.
#[derive(Debug, Clone)]
pub struct Digraph<T> {
    successors: BTreeMap<T, BTreeSet<T>>,
    predecessors: BTreeMap<T, BTreeSet<T>>,
}

impl<T: Ord + Clone> Default for Digraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Clone> Digraph<T> {
    /// Empty graph.
    pub fn new() -> Self {
        Self {
            successors: BTreeMap::new(),
            predecessors: BTreeMap::new(),
        }
    }

    /// Add a node. Returns false if it was already present.
    pub fn add_node(&mut self, node: T) -> bool {
        if self.successors.contains_key(&node) {
            return false;
        }
        self.predecessors.insert(node.clone(), BTreeSet::new());
        self.successors.insert(node, BTreeSet::new());
        true
    }

    /// Add the edge `start -> end`, creating missing endpoints.
    ///
    /// Self edges are rejected and duplicate edges are ignored; both
    /// return false.
    pub fn add_edge(&mut self, start: T, end: T) -> bool {
        if start == end {
            return false;
        }
        self.add_node(start.clone());
        self.add_node(end.clone());

        let added = self
            .successors
            .get_mut(&start)
            .is_some_and(|next| next.insert(end.clone()));
        if added && let Some(prev) = self.predecessors.get_mut(&end) {
            prev.insert(start);
        }
        added
    }

    /// Whether `node` was added.
    pub fn contains_node(&self, node: &T) -> bool {
        self.successors.contains_key(node)
    }

    /// Whether the edge `start -> end` exists.
    pub fn contains_edge(&self, start: &T, end: &T) -> bool {
        self.successors
            .get(start)
            .is_some_and(|next| next.contains(end))
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.successors.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.successors.values().map(BTreeSet::len).sum()
    }

    /// All nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.successors.keys()
    }

    /// Direct successors of `node` (the nodes that depend on it).
    pub fn successors(&self, node: &T) -> impl Iterator<Item = &T> {
        self.successors.get(node).into_iter().flatten()
    }

    /// Direct predecessors of `node` (the nodes it depends on).
    pub fn predecessors(&self, node: &T) -> impl Iterator<Item = &T> {
        self.predecessors.get(node).into_iter().flatten()
    }

    /// Find a cycle, returned as a closed path (first == last).
    ///
    /// Depth-first search with three marks, run on an explicit stack. When
    /// several cycles exist, any one of them may be returned.
    pub fn has_cycle(&self) -> Option<Vec<T>> {
        let mut marks: BTreeMap<&T, Mark> = self
            .successors
            .keys()
            .map(|node| (node, Mark::Unvisited))
            .collect();

        for root in self.successors.keys() {
            if marks.get(root) != Some(&Mark::Unvisited) {
                continue;
            }
            marks.insert(root, Mark::OnStack);
            let mut stack = vec![(root, self.successors[root].iter())];

            loop {
                let Some((node, next_nodes)) = stack.last_mut() else {
                    break;
                };
                let node = *node;
                match next_nodes.next() {
                    Some(next) => match marks.get(next).copied().unwrap_or(Mark::Unvisited) {
                        Mark::Unvisited => {
                            marks.insert(next, Mark::OnStack);
                            stack.push((next, self.successors[next].iter()));
                        }
                        Mark::OnStack => {
                            let start = stack.iter().position(|(n, _)| *n == next)?;
                            let mut cycle: Vec<T> =
                                stack[start..].iter().map(|(n, _)| (*n).clone()).collect();
                            cycle.push(next.clone());
                            return Some(cycle);
                        }
                        Mark::Done => {}
                    },
                    None => {
                        marks.insert(node, Mark::Done);
                        stack.pop();
                    }
                }
            }
        }
        None
    }

    /// Order the nodes so each one comes after all of its predecessors.
    ///
    /// Among nodes that are ready at the same time the smallest comes first.
    pub fn prerequisite_traversal_order(&self) -> Result<Vec<T>, CycleError<T>> {
        if let Some(cycle) = self.has_cycle() {
            return Err(CycleError { cycle });
        }

        let mut waiting_on: BTreeMap<&T, usize> = self
            .predecessors
            .iter()
            .map(|(node, prev)| (node, prev.len()))
            .collect();
        let mut ready: BTreeSet<&T> = waiting_on
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(node, _)| *node)
            .collect();

        let mut order = Vec::with_capacity(self.node_count());
        while let Some(node) = ready.pop_first() {
            order.push(node.clone());
            for next in self.successors(node) {
                if let Some(count) = waiting_on.get_mut(next) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(next);
                    }
                }
            }
        }
        Ok(order)
    }

    /// Every node reachable from `start` over one or more edges.
    pub fn reachable_from(&self, start: &T) -> BTreeSet<T> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<&T> = self.successors(start).collect();
        while let Some(node) = queue.pop_front() {
            if seen.insert(node.clone()) {
                queue.extend(self.successors(node));
            }
        }
        seen
    }

    /// Breadth-first shortest path from `start` to `end`, both included.
    pub fn shortest_path(&self, start: &T, end: &T) -> Option<Vec<T>> {
        if !self.contains_node(start) || !self.contains_node(end) {
            return None;
        }
        if start == end {
            return Some(vec![start.clone()]);
        }

        let mut parent: BTreeMap<&T, &T> = BTreeMap::new();
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for next in self.successors(node) {
                if next == start || parent.contains_key(next) {
                    continue;
                }
                parent.insert(next, node);
                if next == end {
                    let mut path = vec![end.clone()];
                    let mut current = end;
                    while let Some(prev) = parent.get(current) {
                        path.push((*prev).clone());
                        current = *prev;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }
}
