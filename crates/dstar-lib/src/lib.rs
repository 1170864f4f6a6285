//! Incremental D* replanning library.
//!
//! This crate keeps per-node shortest-path state for a goal across repeated
//! planning cycles over a graph whose edge costs and topology change between
//! cycles. Graph mutations arrive as change notifications and only re-open
//! the affected region instead of restarting the search.
//!
//! # Example
//!
//! ```
//! use dstar_lib::{DStarPlanner, MemoryGraph};
//!
//! let mut graph = MemoryGraph::new();
//! graph.add_edge_with_cost("A", "B", 1.0);
//! graph.add_edge_with_cost("B", "D", 1.0);
//! graph.add_edge_with_cost("A", "C", 1.0);
//! graph.add_edge_with_cost("C", "D", 1.0);
//!
//! let mut planner = DStarPlanner::default();
//! planner.initialize(&mut graph, "A", "D")?;
//! planner.compute(&graph)?;
//! assert_eq!(planner.path_cost("A"), Some(2.0));
//!
//! graph.set_edge_cost("B", "D", 10.0);
//! planner.compute(&graph)?;
//! assert_eq!(planner.extract_path("A")?, vec!["A", "C", "D"]);
//! # Ok::<(), dstar_lib::Error>(())
//! ```

#![deny(warnings)]

pub mod changes;
pub mod config;
pub mod cost;
pub mod error;
pub mod generators;
pub mod graph;
pub mod path;
pub mod planner;
pub mod queue;
pub mod scenario;
pub mod state;

pub use config::PlannerConfig;
pub use cost::CostFunction;
pub use error::{Error, Result};
pub use generators::{chain_graph, grid_graph, grid_graph_with, grid_id};
pub use graph::{
    Graph, GraphEvent, MemoryGraph, NodeRef, ObservableGraph, Subscription, SubscriptionId,
};
pub use path::{dijkstra_distances, route_cost};
pub use planner::{ComputeOutcome, DStarPlanner};
pub use queue::OpenQueue;
pub use scenario::{EdgeSpec, EventEffect, NodeNames, Scenario, ScenarioEvent, ScenarioGraph};
pub use state::{SearchState, StateTable, Tag};
