//! JSON replanning scenarios.
//!
//! A scenario names its nodes, lists weighted edges, picks a source and a
//! goal, and scripts a sequence of graph mutations to replay between
//! `compute` calls:
//!
//! ```json
//! {
//!   "edges": [{"from": "A", "to": "B", "cost": 1.0}],
//!   "source": "A",
//!   "goal": "B",
//!   "events": [{"op": "set_cost", "from": "A", "to": "B", "cost": 4.0}]
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::error::{Error, Result};
use crate::graph::MemoryGraph;

/// Minimum Jaro-Winkler similarity for a name to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.7;

/// Maximum number of suggestions attached to an unknown-name error.
const MAX_SUGGESTIONS: usize = 3;

/// Edge declaration inside a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    /// Cost attribute value; edges without one use the default weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Also insert the reverse edge with the same cost.
    #[serde(default)]
    pub bidirectional: bool,
}

/// Scripted graph mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScenarioEvent {
    SetCost {
        from: String,
        to: String,
        cost: f64,
    },
    AddEdge {
        from: String,
        to: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cost: Option<f64>,
    },
    RemoveEdge {
        from: String,
        to: String,
    },
    AddNode {
        node: String,
    },
    RemoveNode {
        node: String,
    },
    /// Move the planner's current position.
    MoveSource {
        node: String,
    },
}

impl fmt::Display for ScenarioEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioEvent::SetCost { from, to, cost } => {
                write!(f, "set cost {from} -> {to} to {cost}")
            }
            ScenarioEvent::AddEdge { from, to, cost } => match cost {
                Some(cost) => write!(f, "add edge {from} -> {to} ({cost})"),
                None => write!(f, "add edge {from} -> {to}"),
            },
            ScenarioEvent::RemoveEdge { from, to } => write!(f, "remove edge {from} -> {to}"),
            ScenarioEvent::AddNode { node } => write!(f, "add node {node}"),
            ScenarioEvent::RemoveNode { node } => write!(f, "remove node {node}"),
            ScenarioEvent::MoveSource { node } => write!(f, "move source to {node}"),
        }
    }
}

/// Replanning scenario document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Declared node names. Names that only appear in `edges` are declared
    /// implicitly, after these.
    #[serde(default)]
    pub nodes: Vec<String>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
    pub source: String,
    pub goal: String,
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
    /// Planner configuration override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<PlannerConfig>,
}

impl Scenario {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| Error::ScenarioRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Configuration the scenario asks for, or the defaults.
    pub fn planner_config(&self) -> PlannerConfig {
        self.config.clone().unwrap_or_default()
    }

    /// Materialise the initial graph.
    pub fn build(&self) -> Result<ScenarioGraph> {
        let config = self.planner_config();
        let mut built = ScenarioGraph {
            graph: MemoryGraph::new(),
            names: NodeNames::default(),
            source: 0,
            goal: 0,
            cost_attribute: config.cost_attribute,
        };

        for name in &self.nodes {
            let id = built.names.declare(name);
            built.graph.add_node(id);
        }

        for edge in &self.edges {
            let from = built.names.declare(&edge.from);
            let to = built.names.declare(&edge.to);
            built.insert_edge(from, to, edge.cost)?;
            if edge.bidirectional {
                built.insert_edge(to, from, edge.cost)?;
            }
        }

        built.source = built.names.id(&self.source)?;
        built.goal = built.names.id(&self.goal)?;
        Ok(built)
    }
}

/// Bidirectional mapping between scenario node names and graph ids.
#[derive(Debug, Clone, Default)]
pub struct NodeNames {
    by_name: BTreeMap<String, u32>,
    names: Vec<String>,
}

impl NodeNames {
    /// Id for `name`, allocating a new one the first time it is seen.
    pub fn declare(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Id of a declared name.
    pub fn id(&self, name: &str) -> Result<u32> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownNodeName {
                name: name.to_string(),
                suggestions: self.fuzzy_matches(name, MAX_SUGGESTIONS),
            })
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    /// Render a node for display, falling back to its numeric id.
    pub fn label(&self, id: u32) -> String {
        self.name(id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{id}"))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Declared names most similar to `name`, best first.
    pub fn fuzzy_matches(&self, name: &str, limit: usize) -> Vec<String> {
        let mut scored: Vec<(f64, &String)> = self
            .names
            .iter()
            .map(|candidate| (strsim::jaro_winkler(name, candidate), candidate))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, candidate)| candidate.clone())
            .collect()
    }
}

/// What applying a scenario event asks of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventEffect {
    /// The graph changed; the planner sees it through its subscription.
    GraphChanged,
    /// The current position moved to this node.
    MoveSource(u32),
}

/// Graph built from a scenario together with its name index and anchors.
#[derive(Debug)]
pub struct ScenarioGraph {
    pub graph: MemoryGraph<u32>,
    pub names: NodeNames,
    pub source: u32,
    pub goal: u32,
    cost_attribute: String,
}

impl ScenarioGraph {
    /// Apply a scripted mutation through the graph's own mutators.
    pub fn apply(&mut self, event: &ScenarioEvent) -> Result<EventEffect> {
        match event {
            ScenarioEvent::SetCost { from, to, cost } => {
                validate_cost(*cost)?;
                let from = self.names.id(from)?;
                let to = self.names.id(to)?;
                let attribute = self.cost_attribute.clone();
                if !self.graph.set_edge_attribute(from, to, &attribute, *cost) {
                    return Err(self.missing_edge(from, to));
                }
            }
            ScenarioEvent::AddEdge { from, to, cost } => {
                let from = self.names.declare(from);
                let to = self.names.declare(to);
                self.insert_edge(from, to, *cost)?;
            }
            ScenarioEvent::RemoveEdge { from, to } => {
                let from = self.names.id(from)?;
                let to = self.names.id(to)?;
                if !self.graph.remove_edge(from, to) {
                    return Err(self.missing_edge(from, to));
                }
            }
            ScenarioEvent::AddNode { node } => {
                let id = self.names.declare(node);
                self.graph.add_node(id);
            }
            ScenarioEvent::RemoveNode { node } => {
                let id = self.names.id(node)?;
                self.graph.remove_node(id);
            }
            ScenarioEvent::MoveSource { node } => {
                let id = self.names.id(node)?;
                self.source = id;
                return Ok(EventEffect::MoveSource(id));
            }
        }
        Ok(EventEffect::GraphChanged)
    }

    fn insert_edge(&mut self, from: u32, to: u32, cost: Option<f64>) -> Result<()> {
        match cost {
            Some(cost) => {
                validate_cost(cost)?;
                let attribute = self.cost_attribute.clone();
                self.graph
                    .add_edge_with_attribute(from, to, &attribute, cost);
            }
            None => {
                self.graph.add_edge(from, to);
            }
        }
        Ok(())
    }

    fn missing_edge(&self, from: u32, to: u32) -> Error {
        Error::InvalidScenario {
            message: format!(
                "no edge {} -> {}",
                self.names.label(from),
                self.names.label(to)
            ),
        }
    }
}

fn validate_cost(cost: f64) -> Result<()> {
    if cost.is_nan() || cost < 0.0 {
        return Err(Error::InvalidScenario {
            message: format!("edge cost must be non-negative, got {cost}"),
        });
    }
    Ok(())
}
