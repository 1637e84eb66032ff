//! hn-graph: topology layer for heatnet.
//!
//! Provides:
//! - Core graph data structures (Junction, Branch, Incidence, Graph)
//! - Incremental graph builder that rejects dangling references up front
//! - Signed adjacency and connected-component queries for the solver
//!
//! # Example
//!
//! ```
//! use hn_graph::GraphBuilder;
//!
//! let mut builder = GraphBuilder::new();
//! let supply = builder.add_junction("supply");
//! let ret = builder.add_junction("return");
//! builder.add_branch("feed pipe", supply, ret).unwrap();
//! builder.add_branch("return pipe", ret, supply).unwrap();
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.junctions().len(), 2);
//! assert_eq!(graph.degree(supply), 2);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub(crate) mod validate;

pub use builder::GraphBuilder;
pub use error::{TopologyError, TopologyResult};
pub use graph::{Direction, Edge, Graph, Incidence, Vertex};
