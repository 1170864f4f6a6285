use crate::config::PlannerConfig;
use crate::graph::Graph;

/// Resolves traversal cost between adjacent nodes from an edge attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct CostFunction {
    attribute: String,
    default_weight: f64,
}

impl CostFunction {
    pub fn new(attribute: impl Into<String>, default_weight: f64) -> Self {
        Self {
            attribute: attribute.into(),
            default_weight,
        }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.cost_attribute.clone(), config.default_weight)
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn default_weight(&self) -> f64 {
        self.default_weight
    }

    /// Cost of moving between `x` and `y`.
    ///
    /// The directed edge `x -> y` is consulted first, then `y -> x`. Returns
    /// `NaN` when no edge connects the two nodes; callers must check for it
    /// before comparing.
    pub fn cost<G: Graph>(&self, graph: &G, x: G::Node, y: G::Node) -> f64 {
        let (from, to) = if graph.has_edge(x, y) {
            (x, y)
        } else if graph.has_edge(y, x) {
            (y, x)
        } else {
            return f64::NAN;
        };

        graph
            .edge_attribute(from, to, &self.attribute)
            .unwrap_or(self.default_weight)
    }

    /// Like [`CostFunction::cost`] but maps the missing-edge sentinel to
    /// `+inf` so the result is safe to compare.
    pub fn traversal<G: Graph>(&self, graph: &G, x: G::Node, y: G::Node) -> f64 {
        let cost = self.cost(graph, x, y);
        if cost.is_nan() {
            f64::INFINITY
        } else {
            cost
        }
    }
}

impl Default for CostFunction {
    fn default() -> Self {
        Self::from_config(&PlannerConfig::default())
    }
}
