//! Basic example of using the Sudoku engine

use sudoku_core::{Difficulty, Generator, Grid, Solver};

fn main() {
    // Generate a puzzle
    println!("Generating a Medium difficulty puzzle...\n");
    let mut generator = Generator::new();
    let puzzle = generator.generate(Difficulty::Medium);

    println!("Generated puzzle:");
    println!("{}", puzzle.puzzle);

    // Show some stats
    println!("Given cells: {}", puzzle.puzzle.filled_count());
    println!("Empty cells: {}", puzzle.removed_count());

    println!("\nSolution it was carved from:");
    println!("{}", puzzle.solution);

    // Solve the masked grid independently
    println!("Solving the puzzle from scratch...\n");
    let solver = Solver::new();
    if let Some(solution) = solver.solve(&puzzle.puzzle) {
        println!("Solution:");
        println!("{}", solution);
    } else {
        println!("No solution found (this shouldn't happen for a generated puzzle!)");
    }

    // Parse a puzzle from a string
    println!("--- Parsing a puzzle from string ---\n");
    let puzzle_string = "530070000600195000098000060800060003400803001700020006060000280000419005000080079";
    if let Some(grid) = Grid::from_string(puzzle_string) {
        println!("Parsed puzzle:");
        println!("{}", grid);

        // Check uniqueness
        let solutions = solver.count_solutions(&grid, 2);
        println!("Number of solutions (up to 2): {}", solutions);
        println!("Unique solution: {}", solver.has_unique_solution(&grid));
    }
}
