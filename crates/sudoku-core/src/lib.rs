//! Core Sudoku engine: grid model, puzzle generation, and solving
//!
//! This crate provides the pure, synchronous pieces of the game: a 9x9
//! [`Grid`] with constraint checks, a randomized backtracking [`Generator`]
//! that produces a solved grid and carves a [`Puzzle`] of calibrated
//! difficulty from it, and a backtracking [`Solver`] for diagnostics and
//! uniqueness checks.

mod generator;
mod grid;
mod solver;

pub use generator::{Generator, GeneratorConfig, Puzzle};
pub use grid::{Difficulty, Grid, Position};
pub use solver::Solver;
