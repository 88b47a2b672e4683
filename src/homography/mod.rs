pub mod pose;
pub mod solver;
