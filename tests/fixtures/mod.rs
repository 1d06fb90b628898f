pub mod sample_graphs;
pub mod services;
