pub mod chart;
pub mod text_tree;
