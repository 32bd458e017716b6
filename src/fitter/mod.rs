pub mod common;
pub mod models;
pub mod peak_fitter;
pub mod solver;
pub mod statistics;
