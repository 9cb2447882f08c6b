use crate::{Grid, Position};

/// Backtracking Sudoku solver
pub struct Solver;

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Create a new solver
    pub fn new() -> Self {
        Self
    }

    /// Solve the puzzle, returning the solved grid if one exists. Returns
    /// `None` when the givens already conflict or no completion exists.
    pub fn solve(&self, grid: &Grid) -> Option<Grid> {
        if !grid.is_consistent() {
            return None;
        }
        let mut working = *grid;
        if self.solve_recursive(&mut working) {
            Some(working)
        } else {
            None
        }
    }

    /// Count solutions up to a limit
    pub fn count_solutions(&self, grid: &Grid, limit: usize) -> usize {
        if !grid.is_consistent() {
            return 0;
        }
        let mut working = *grid;
        let mut count = 0;
        self.count_solutions_recursive(&mut working, &mut count, limit);
        count
    }

    /// Check if the puzzle has exactly one solution
    pub fn has_unique_solution(&self, grid: &Grid) -> bool {
        self.count_solutions(grid, 2) == 1
    }

    fn solve_recursive(&self, grid: &mut Grid) -> bool {
        let pos = match Position::all().find(|&p| grid.is_empty(p)) {
            Some(pos) => pos,
            None => return true,
        };

        for value in 1..=9 {
            if grid.is_valid_placement(pos, value) {
                grid.set(pos, value);
                if self.solve_recursive(grid) {
                    return true;
                }
                grid.set(pos, 0);
            }
        }
        false
    }

    fn count_solutions_recursive(&self, grid: &mut Grid, count: &mut usize, limit: usize) {
        if *count >= limit {
            return;
        }

        let pos = match Position::all().find(|&p| grid.is_empty(p)) {
            Some(pos) => pos,
            None => {
                *count += 1;
                return;
            }
        };

        for value in 1..=9 {
            if *count >= limit {
                return;
            }
            if grid.is_valid_placement(pos, value) {
                grid.set(pos, value);
                self.count_solutions_recursive(grid, count, limit);
                grid.set(pos, 0);
            }
        }
    }
}
