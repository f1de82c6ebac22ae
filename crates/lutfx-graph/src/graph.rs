//! Declarative node graph container.
//!
//! A [`NodeGraph`] is plain data: a list of nodes and a list of links between
//! their ports. Hosts turn it into native node-group contents; the
//! [`GraphInterpreter`](crate::GraphInterpreter) evaluates it directly.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{GraphError, GraphResult, Op};

/// Node identifier, unique within a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One port of one node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    /// Node id.
    pub node: NodeId,
    /// Port index on that node.
    pub port: usize,
}

impl PortRef {
    /// Creates a port reference.
    pub fn new(node: impl Into<NodeId>, port: usize) -> Self {
        Self {
            node: node.into(),
            port,
        }
    }
}

/// Directed connection from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Output port.
    pub from: PortRef,
    /// Input port.
    pub to: PortRef,
}

/// A node: id, operator and editor location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique id.
    pub id: NodeId,
    /// Operator and its parameters.
    pub op: Op,
    /// Grid position for display in a node editor.
    pub location: [i32; 2],
}

/// A named graph of pure operators.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeGraph {
    /// Group name.
    pub name: String,
    /// Nodes in insertion order.
    pub nodes: Vec<Node>,
    /// Links between node ports.
    pub links: Vec<Link>,
}

impl NodeGraph {
    /// Creates an empty graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Adds a node and returns its id.
    pub fn add(&mut self, id: &str, op: Op, location: [i32; 2]) -> NodeId {
        let id = NodeId::new(id);
        self.nodes.push(Node {
            id: id.clone(),
            op,
            location,
        });
        id
    }

    /// Connects output `from_port` of `from` to input `to_port` of `to`.
    pub fn connect(&mut self, from: &NodeId, from_port: usize, to: &NodeId, to_port: usize) {
        self.links.push(Link {
            from: PortRef::new(from.clone(), from_port),
            to: PortRef::new(to.clone(), to_port),
        });
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }

    /// The link driving an input port, if any.
    pub fn input_link(&self, node: &str, port: usize) -> Option<&Link> {
        self.links
            .iter()
            .find(|l| l.to.node.as_str() == node && l.to.port == port)
    }

    /// Names of all textures referenced by image nodes.
    pub fn textures(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|n| match &n.op {
            Op::Image { texture } => Some(texture.as_str()),
            _ => None,
        })
    }

    /// Checks ids, ports and acyclicity, returning node indices in
    /// dependency order.
    pub fn topological_order(&self) -> GraphResult<Vec<usize>> {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if index.insert(node.id.as_str(), i).is_some() {
                return Err(GraphError::DuplicateNode(node.id.to_string()));
            }
        }

        let mut in_degree = vec![0usize; self.nodes.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        let mut driven = HashMap::new();

        for link in &self.links {
            let from = *index
                .get(link.from.node.as_str())
                .ok_or_else(|| GraphError::UnknownNode(link.from.node.to_string()))?;
            let to = *index
                .get(link.to.node.as_str())
                .ok_or_else(|| GraphError::UnknownNode(link.to.node.to_string()))?;

            if link.from.port >= self.nodes[from].op.outputs() {
                return Err(GraphError::InvalidPort {
                    node: link.from.node.to_string(),
                    port: link.from.port,
                    direction: "output",
                });
            }
            if link.to.port >= self.nodes[to].op.inputs() {
                return Err(GraphError::InvalidPort {
                    node: link.to.node.to_string(),
                    port: link.to.port,
                    direction: "input",
                });
            }
            if driven.insert((to, link.to.port), from).is_some() {
                return Err(GraphError::InputConflict {
                    node: link.to.node.to_string(),
                    port: link.to.port,
                });
            }

            in_degree[to] += 1;
            dependents[from].push(to);
        }

        // Kahn's algorithm; ready nodes are taken in insertion order so the
        // result is deterministic.
        let mut ready: VecDeque<usize> = (0..self.nodes.len()).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(i) = ready.pop_front() {
            order.push(i);
            for &d in &dependents[i] {
                in_degree[d] -= 1;
                if in_degree[d] == 0 {
                    ready.push_back(d);
                }
            }
        }

        if order.len() != self.nodes.len() {
            let stuck = (0..self.nodes.len())
                .find(|&i| in_degree[i] > 0)
                .map(|i| self.nodes[i].id.to_string())
                .unwrap_or_default();
            return Err(GraphError::Cycle(stuck));
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MathOp;

    fn add_op() -> Op {
        Op::Math {
            op: MathOp::Add,
            defaults: [0.0, 0.0],
        }
    }

    #[test]
    fn order_respects_links() {
        let mut g = NodeGraph::new("g");
        let out = g.add("out", Op::GroupOutput, [2, 0]);
        let sum = g.add("sum", add_op(), [1, 0]);
        let one = g.add("one", Op::Value { value: 1.0 }, [0, 0]);
        g.connect(&one, 0, &sum, 0);
        g.connect(&sum, 0, &out, 0);

        let order = g.topological_order().unwrap();
        let pos = |id: &str| order.iter().position(|&i| g.nodes[i].id.as_str() == id).unwrap();
        assert!(pos("one") < pos("sum"));
        assert!(pos("sum") < pos("out"));
    }

    #[test]
    fn cycle_is_rejected() {
        let mut g = NodeGraph::new("g");
        let a = g.add("a", add_op(), [0, 0]);
        let b = g.add("b", add_op(), [1, 0]);
        g.connect(&a, 0, &b, 0);
        g.connect(&b, 0, &a, 0);
        assert!(matches!(g.topological_order(), Err(GraphError::Cycle(_))));
    }

    #[test]
    fn bad_links_are_rejected() {
        let mut g = NodeGraph::new("g");
        let a = g.add("a", Op::Value { value: 1.0 }, [0, 0]);
        let b = g.add("b", add_op(), [1, 0]);
        g.connect(&a, 0, &b, 2);
        assert!(matches!(
            g.topological_order(),
            Err(GraphError::InvalidPort { direction: "input", .. })
        ));

        let mut g = NodeGraph::new("g");
        let a = g.add("a", Op::Value { value: 1.0 }, [0, 0]);
        let b = g.add("b", add_op(), [1, 0]);
        g.connect(&a, 0, &b, 0);
        g.connect(&a, 0, &b, 0);
        assert!(matches!(g.topological_order(), Err(GraphError::InputConflict { .. })));

        let mut g = NodeGraph::new("g");
        let a = g.add("a", Op::Value { value: 1.0 }, [0, 0]);
        g.connect(&a, 0, &NodeId::from("ghost"), 0);
        assert!(matches!(g.topological_order(), Err(GraphError::UnknownNode(_))));

        let mut g = NodeGraph::new("g");
        g.add("a", Op::Value { value: 1.0 }, [0, 0]);
        g.add("a", Op::Value { value: 2.0 }, [0, 1]);
        assert!(matches!(g.topological_order(), Err(GraphError::DuplicateNode(_))));
    }
}
