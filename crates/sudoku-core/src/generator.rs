use crate::{Difficulty, Grid, Position};
use serde::{Deserialize, Serialize};

/// Configuration for puzzle generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Target difficulty
    pub difficulty: Difficulty,
    /// Number of cells carved out of the solved grid
    pub cells_to_remove: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::medium()
    }
}

impl GeneratorConfig {
    pub fn easy() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            cells_to_remove: Difficulty::Easy.cells_to_remove(),
        }
    }

    pub fn medium() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            cells_to_remove: Difficulty::Medium.cells_to_remove(),
        }
    }

    pub fn hard() -> Self {
        Self {
            difficulty: Difficulty::Hard,
            cells_to_remove: Difficulty::Hard.cells_to_remove(),
        }
    }
}

/// A generated puzzle: the masked grid, the full solution it was carved from,
/// and the difficulty used to carve it.
///
/// Every non-zero cell of `puzzle` equals the corresponding cell of `solution`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Puzzle {
    pub puzzle: Grid,
    pub solution: Grid,
    pub difficulty: Difficulty,
}

impl Puzzle {
    /// Whether the cell at `pos` is a given (pre-filled, never player-editable)
    pub fn is_given(&self, pos: Position) -> bool {
        !self.puzzle.is_empty(pos)
    }

    /// Whether `value` is the correct digit for the cell at `pos`
    pub fn check_candidate(&self, pos: Position, value: u8) -> bool {
        self.solution.get(pos) == value
    }

    /// Number of cells carved out of the solution
    pub fn removed_count(&self) -> usize {
        self.puzzle.empty_count()
    }
}

/// Sudoku puzzle generator
pub struct Generator {
    config: GeneratorConfig,
    rng: SimpleRng,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// Create a new generator with default configuration
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::default(),
            rng: SimpleRng::new(),
        }
    }

    /// Create a generator with custom configuration
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            config,
            rng: SimpleRng::new(),
        }
    }

    /// Create a generator with a specific seed for reproducibility
    pub fn with_seed(seed: u64) -> Self {
        Self {
            config: GeneratorConfig::default(),
            rng: SimpleRng::with_seed(seed),
        }
    }

    /// Generate a puzzle at the given difficulty
    pub fn generate(&mut self, difficulty: Difficulty) -> Puzzle {
        let config = match difficulty {
            Difficulty::Easy => GeneratorConfig::easy(),
            Difficulty::Medium => GeneratorConfig::medium(),
            Difficulty::Hard => GeneratorConfig::hard(),
        };

        self.config = config;
        self.generate_with_config()
    }

    /// Generate a puzzle with the current configuration
    pub fn generate_with_config(&mut self) -> Puzzle {
        let solution = self.generate_solved_grid();
        let difficulty = self.config.difficulty;
        let cells_to_remove = self.config.cells_to_remove;
        self.carve_counted(solution, difficulty, cells_to_remove)
    }

    /// Generate a completely filled valid grid using randomized backtracking.
    ///
    /// Cells are visited in row-major order with an explicit cursor rather
    /// than recursion. Each cell holds a shuffled candidate order and an index
    /// of the next candidate to try; a dead end steps the cursor back and
    /// resumes the previous cell at its next untried candidate.
    pub fn generate_solved_grid(&mut self) -> Grid {
        let mut grid = Grid::new();
        let mut orders = [[0u8; 9]; 81];
        for order in orders.iter_mut() {
            *order = [1, 2, 3, 4, 5, 6, 7, 8, 9];
            self.shuffle(order);
        }
        let mut next_candidate = [0usize; 81];

        let mut cursor = 0;
        while cursor < 81 {
            let pos = Position::new(cursor / 9, cursor % 9);
            let mut placed = false;
            while next_candidate[cursor] < 9 {
                let value = orders[cursor][next_candidate[cursor]];
                next_candidate[cursor] += 1;
                if grid.is_valid_placement(pos, value) {
                    grid.set(pos, value);
                    placed = true;
                    break;
                }
            }

            if placed {
                cursor += 1;
            } else {
                // Dead end: reshuffle this cell for its next visit, then back
                // up and clear the previous cell so it retries. The first cell
                // always accepts a candidate, so the cursor never underflows.
                next_candidate[cursor] = 0;
                self.shuffle(&mut orders[cursor]);
                cursor -= 1;
                grid.set(Position::new(cursor / 9, cursor % 9), 0);
            }
        }

        grid
    }

    /// Carve a puzzle out of a solved grid by zeroing the difficulty's target
    /// number of cells, each picked uniformly at random among still-filled
    /// cells
    pub fn carve(&mut self, solution: Grid, difficulty: Difficulty) -> Puzzle {
        self.carve_counted(solution, difficulty, difficulty.cells_to_remove())
    }

    fn carve_counted(&mut self, solution: Grid, difficulty: Difficulty, count: usize) -> Puzzle {
        let mut puzzle = solution;
        let target = count.min(81);

        let mut removed = 0;
        while removed < target {
            let pos = Position::new(self.rng.next_usize(9), self.rng.next_usize(9));
            if !puzzle.is_empty(pos) {
                puzzle.set(pos, 0);
                removed += 1;
            }
        }

        Puzzle {
            puzzle,
            solution,
            difficulty,
        }
    }

    /// Shuffle a slice using Fisher-Yates
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.rng.next_usize(i + 1);
            slice.swap(i, j);
        }
    }
}

/// Simple PRNG for no-std compatibility
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new() -> Self {
        // Use getrandom for WASM-compatible random seeding
        let mut seed_bytes = [0u8; 8];
        getrandom::getrandom(&mut seed_bytes).unwrap_or_else(|_| {
            // Fallback: use a static counter if getrandom fails
            static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
            let counter = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            seed_bytes = counter.to_le_bytes();
        });
        let seed = u64::from_le_bytes(seed_bytes);
        Self::with_seed(seed)
    }

    fn with_seed(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        // PCG-like PRNG
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let xorshifted = (((self.state >> 18) ^ self.state) >> 27) as u32;
        let rot = (self.state >> 59) as u32;
        (xorshifted.rotate_right(rot)) as u64
    }

    fn next_usize(&mut self, bound: usize) -> usize {
        (self.next_u64() as usize) % bound
    }
}
