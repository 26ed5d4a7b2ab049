//! aeroql - a strict, deterministic, pull-based query engine
//!
//! Reads integer tables from CSV files described by a schema file and answers
//! one SQL SELECT at a time through a tree of volcano-style operators.

pub mod catalog;
pub mod cli;
pub mod data;
pub mod executor;
pub mod observability;
pub mod planner;
