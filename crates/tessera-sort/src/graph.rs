//! Renders-over dependency graph.
//!
//! Node `a` depending on node `b` means `b` must be drawn first and `a`
//! renders over it. Resolution is a depth-first topological sort that
//! breaks cycles instead of failing: on a back edge the cycle is read off
//! the DFS stack, the edge with the greatest key pair is dropped, and the
//! sort starts over.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

/// Directed renders-over graph over gathered set indices.
#[derive(Debug, Clone, Default)]
pub struct RenderGraph {
    dependencies: Vec<Vec<usize>>,
    edge_count: usize,
}

/// Result of [`RenderGraph::resolve_order`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedOrder {
    /// Every node, dependencies before dependents.
    pub order: Vec<usize>,
    /// Edges removed to break cycles, as `(dependent, dependency)`.
    pub broken: Vec<(usize, usize)>,
}

impl RenderGraph {
    /// Graph with `nodes` nodes and no edges.
    pub fn new(nodes: usize) -> Self {
        Self {
            dependencies: vec![Vec::new(); nodes],
            edge_count: 0,
        }
    }

    /// Record that `over` renders over `under`.
    pub fn add_edge(&mut self, over: usize, under: usize) {
        if over == under || under >= self.dependencies.len() {
            return;
        }
        let Some(deps) = self.dependencies.get_mut(over) else {
            return;
        };
        if !deps.contains(&under) {
            deps.push(under);
            self.edge_count += 1;
        }
    }

    /// Nodes that `node` renders over, in insertion order.
    pub fn dependencies(&self, node: usize) -> &[usize] {
        self.dependencies
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.dependencies.len()
    }

    /// Number of distinct edges added.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn remove_edge(&mut self, over: usize, under: usize) {
        if let Some(deps) = self.dependencies.get_mut(over)
            && let Some(pos) = deps.iter().position(|&d| d == under)
        {
            deps.remove(pos);
            self.edge_count -= 1;
        }
    }

    /// Topologically order all nodes, visiting roots in index order.
    ///
    /// `keys[node]` ranks edges for cycle breaking: within a cycle the edge
    /// whose `(keys[dependent], keys[dependency])` is greatest is removed.
    pub fn resolve_order<K: Ord>(&mut self, keys: &[K]) -> ResolvedOrder {
        let mut broken = Vec::new();
        loop {
            match self.try_order(keys) {
                Ok(order) => return ResolvedOrder { order, broken },
                Err(edge) => {
                    self.remove_edge(edge.0, edge.1);
                    broken.push(edge);
                }
            }
        }
    }

    /// One DFS pass. Returns the edge to drop if a cycle is found.
    fn try_order<K: Ord>(&self, keys: &[K]) -> Result<Vec<usize>, (usize, usize)> {
        let n = self.dependencies.len();
        let mut state = vec![VisitState::Unvisited; n];
        let mut order = Vec::with_capacity(n);
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for start in 0..n {
            if state[start] != VisitState::Unvisited {
                continue;
            }
            state[start] = VisitState::InProgress;
            stack.push((start, 0));

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let deps = &self.dependencies[node];
                if top.1 < deps.len() {
                    let dep = deps[top.1];
                    top.1 += 1;
                    match state[dep] {
                        VisitState::Unvisited => {
                            state[dep] = VisitState::InProgress;
                            stack.push((dep, 0));
                        }
                        VisitState::InProgress => {
                            return Err(Self::weakest_edge(&stack, node, dep, keys));
                        }
                        VisitState::Done => {}
                    }
                } else {
                    state[node] = VisitState::Done;
                    order.push(node);
                    stack.pop();
                }
            }
        }

        Ok(order)
    }

    /// Greatest-keyed edge of the cycle closed by `node -> dep`.
    fn weakest_edge<K: Ord>(
        stack: &[(usize, usize)],
        node: usize,
        dep: usize,
        keys: &[K],
    ) -> (usize, usize) {
        let start = stack.iter().position(|&(n, _)| n == dep).unwrap_or(0);
        let path = &stack[start..];
        path.windows(2)
            .map(|w| (w[0].0, w[1].0))
            .chain(std::iter::once((node, dep)))
            .max_by(|a, b| (&keys[a.0], &keys[a.1]).cmp(&(&keys[b.0], &keys[b.1])))
            .unwrap_or((node, dep))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(order: &[usize], node: usize) -> usize {
        order.iter().position(|&n| n == node).expect("node in order")
    }

    #[test]
    fn test_dependencies_come_first() {
        let mut graph = RenderGraph::new(4);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(3, 0);
        let resolved = graph.resolve_order(&[0, 1, 2, 3]);

        assert!(resolved.broken.is_empty());
        assert_eq!(resolved.order.len(), 4);
        assert!(position(&resolved.order, 2) < position(&resolved.order, 1));
        assert!(position(&resolved.order, 1) < position(&resolved.order, 0));
        assert!(position(&resolved.order, 0) < position(&resolved.order, 3));
    }

    #[test]
    fn test_duplicate_and_self_edges_ignored() {
        let mut graph = RenderGraph::new(2);
        graph.add_edge(0, 1);
        graph.add_edge(0, 1);
        graph.add_edge(1, 1);
        graph.add_edge(0, 9);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_cycle_breaks_greatest_edge() {
        let mut graph = RenderGraph::new(3);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(2, 0);
        let resolved = graph.resolve_order(&[10, 20, 30]);

        assert_eq!(resolved.broken, vec![(2, 0)]);
        assert_eq!(resolved.order, vec![2, 1, 0]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_independent_cycles_each_break_once() {
        let mut graph = RenderGraph::new(4);
        graph.add_edge(0, 1);
        graph.add_edge(1, 0);
        graph.add_edge(2, 3);
        graph.add_edge(3, 2);
        let resolved = graph.resolve_order(&[0, 1, 2, 3]);

        assert_eq!(resolved.broken.len(), 2);
        assert_eq!(resolved.order.len(), 4);
    }
}
