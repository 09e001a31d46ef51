pub mod fold;
pub mod graph;
pub mod render;
pub mod types;
