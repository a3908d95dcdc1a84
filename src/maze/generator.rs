//! Maze generation using a randomized recursive backtracker.
//!
//! This module provides functionality to carve a perfect maze into a square grid of
//! [`CellState`]s, starting from a fixed cell and stepping two cells at a time.
//!
//! # Algorithm
//!
//! 1. Every cell starts as [`CellState::Wall`].
//! 2. The current cell is opened. The four two-step directions are shuffled with a
//!    uniform permutation and tried in that order.
//! 3. For each direction whose target is in bounds and still a wall, the intermediate
//!    cell and the target are opened and carving continues from the target.
//! 4. When every direction of a cell is exhausted, carving resumes at the cell that
//!    reached it.
//!
//! The depth-first traversal runs on an explicit heap stack, so grids of any size carve
//! without touching the call stack.
//!
//! After carving, the start cell, the exit cell and the exit's outer neighbour are forced
//! open unconditionally. When the carve never reached them they can end up disconnected
//! from the rest of the maze; no connectivity re-check is made.
//!
//! # Examples
//!
//! ```rust
//! use corridor::maze::generator::{Cell, CellState, MazeGenerator};
//!
//! let maze = MazeGenerator::new().generate(48, 48, Cell::new(1, 1)).unwrap();
//! assert_eq!(maze.get(1, 1), Some(CellState::Open));
//! assert_eq!(maze.get(47, 46), Some(CellState::Open));
//! ```
use rand::prelude::*;
use std::fmt;

use crate::errors::MazeError;
use crate::math::coordinates::Direction;

/// Represents a cell in the maze grid
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Row index of the cell (world Z axis)
    pub row: usize,
    /// Column index of the cell (world X axis)
    pub col: usize,
}

impl Cell {
    /// Creates a new Cell with the given coordinates
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns the cell `distance` steps away in `direction`, if it stays non-negative.
    pub fn step(self, direction: Direction, distance: usize) -> Option<Cell> {
        let (row_delta, col_delta) = direction.grid_step();
        let row = self.row.checked_add_signed(row_delta * distance as isize)?;
        let col = self.col.checked_add_signed(col_delta * distance as isize)?;
        Some(Cell::new(row, col))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Occupancy of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    Wall,
    Open,
}

/// A generated maze: a `width` x `height` occupancy grid plus its start and exit cells.
///
/// Immutable once generated. Cells are stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
    start: Cell,
    exit: Cell,
}

impl Maze {
    /// Creates a maze with every cell set to [`CellState::Wall`].
    fn filled(width: usize, height: usize, start: Cell, exit: Cell) -> Self {
        Self {
            width,
            height,
            cells: vec![CellState::Wall; width * height],
            start,
            exit,
        }
    }

    /// Parses a maze from text rows, where `#` is a wall and any other character is open.
    ///
    /// Rows shorter than the longest row are padded with walls.
    ///
    /// # Example
    /// ```text
    /// #####
    /// #   #
    /// #####
    /// ```
    pub fn parse(text: &str, start: Cell, exit: Cell) -> Result<Self, MazeError> {
        let rows: Vec<&str> = text.lines().collect();
        let height = rows.len();
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);

        let mut maze = Self::filled(width, height, start, exit);
        for (row_idx, line) in rows.iter().enumerate() {
            for (col_idx, c) in line.chars().enumerate() {
                if c != '#' {
                    maze.set(Cell::new(row_idx, col_idx), CellState::Open);
                }
            }
        }

        maze.validate()?;
        Ok(maze)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn exit(&self) -> Cell {
        self.exit
    }

    /// State of the cell at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<CellState> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.cells.get(row * self.width + col).copied()
    }

    /// Like [`Maze::get`] but accepts signed indices, returning `None` for negatives.
    pub fn get_signed(&self, row: i64, col: i64) -> Option<CellState> {
        if row < 0 || col < 0 {
            return None;
        }
        self.get(row as usize, col as usize)
    }

    /// True only for in-bounds wall cells.
    pub fn is_wall(&self, cell: Cell) -> bool {
        self.get(cell.row, cell.col) == Some(CellState::Wall)
    }

    /// True only for in-bounds open cells.
    pub fn is_open(&self, cell: Cell) -> bool {
        self.get(cell.row, cell.col) == Some(CellState::Open)
    }

    fn set(&mut self, cell: Cell, state: CellState) {
        if cell.row < self.height && cell.col < self.width {
            self.cells[cell.row * self.width + cell.col] = state;
        }
    }

    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == CellState::Wall).count()
    }

    /// Percentage of cells that are walls.
    pub fn wall_density(&self) -> f32 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.wall_count() as f32 / self.total_cells() as f32 * 100.0
    }

    /// Iterates over the grid one row at a time.
    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> {
        self.cells.chunks(self.width.max(1))
    }

    /// Iterates over every wall cell in row-major order.
    pub fn wall_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == CellState::Wall)
            .map(|(idx, _)| Cell::new(idx / self.width, idx % self.width))
    }

    /// Open cells 4-adjacent to `cell`.
    pub fn open_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| cell.step(direction, 1))
            .filter(|neighbor| self.is_open(*neighbor))
    }

    /// Checks the grid is well formed: consistent size and at least one open cell.
    pub fn validate(&self) -> Result<(), MazeError> {
        if self.width == 0 || self.height == 0 {
            return Err(MazeError::Malformed("maze has no cells".to_string()));
        }
        if self.cells.len() != self.width * self.height {
            return Err(MazeError::Malformed(format!(
                "expected {} cells, found {}",
                self.width * self.height,
                self.cells.len()
            )));
        }
        if !self.cells.contains(&CellState::Open) {
            return Err(MazeError::Malformed("maze has no open cells".to_string()));
        }
        Ok(())
    }
}

/// Renders the grid as rows of `#` (wall) and ` ` (open).
impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: String = row
                .iter()
                .map(|state| match state {
                    CellState::Wall => '#',
                    CellState::Open => ' ',
                })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Anything able to produce a maze for a session.
///
/// The session only depends on this capability, so hosts can supply fixed layouts.
pub trait MazeSource {
    /// Produces a maze of the given size with the given start and exit cells open.
    fn generate_maze(
        &mut self,
        width: usize,
        height: usize,
        start: Cell,
        exit: Cell,
    ) -> Result<Maze, MazeError>;
}

/// Randomized recursive-backtracker maze generator.
///
/// Every call uses fresh thread-local randomness; there is no seed.
#[derive(Debug, Default, Clone, Copy)]
pub struct MazeGenerator;

impl MazeGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Default exit for a grid: one cell in from the bottom-right corner.
    pub fn default_exit(width: usize, height: usize) -> Cell {
        Cell::new(height.saturating_sub(2), width.saturating_sub(2))
    }

    /// Generates a maze carved from `start`, with the exit at [`MazeGenerator::default_exit`].
    pub fn generate(&self, width: usize, height: usize, start: Cell) -> Result<Maze, MazeError> {
        self.generate_with_exit(width, height, start, Self::default_exit(width, height))
    }

    /// Generates a maze carved from `start`, forcing `start`, `exit` and the cell beyond
    /// the exit (one row further from the start side) open afterwards.
    pub fn generate_with_exit(
        &self,
        width: usize,
        height: usize,
        start: Cell,
        exit: Cell,
    ) -> Result<Maze, MazeError> {
        build_maze(&mut thread_rng(), width, height, start, exit)
    }
}

impl MazeSource for MazeGenerator {
    fn generate_maze(
        &mut self,
        width: usize,
        height: usize,
        start: Cell,
        exit: Cell,
    ) -> Result<Maze, MazeError> {
        self.generate_with_exit(width, height, start, exit)
    }
}

fn build_maze<R: Rng + ?Sized>(
    rng: &mut R,
    width: usize,
    height: usize,
    start: Cell,
    exit: Cell,
) -> Result<Maze, MazeError> {
    if width < 3 || height < 3 {
        return Err(MazeError::TooSmall { width, height });
    }
    for (role, cell) in [("start", start), ("exit", exit)] {
        if cell.row >= height || cell.col >= width {
            return Err(MazeError::CellOutOfBounds {
                role,
                cell,
                width,
                height,
            });
        }
    }

    let mut maze = Maze::filled(width, height, start, exit);
    carve_passages(&mut maze, start, rng);
    force_open_endpoints(&mut maze);
    maze.validate()?;
    Ok(maze)
}

/// One suspended carve call: the cell and the directions it still has to try.
struct CarveFrame {
    cell: Cell,
    directions: [Direction; 4],
    next: usize,
}

impl CarveFrame {
    fn new<R: Rng + ?Sized>(cell: Cell, rng: &mut R) -> Self {
        let mut directions = Direction::ALL;
        directions.shuffle(rng);
        Self {
            cell,
            directions,
            next: 0,
        }
    }
}

/// Carves passages from `start` with an explicit stack, mirroring the recursive
/// shuffle-and-carve order exactly.
pub(crate) fn carve_passages<R: Rng + ?Sized>(maze: &mut Maze, start: Cell, rng: &mut R) {
    maze.set(start, CellState::Open);
    let mut stack = vec![CarveFrame::new(start, rng)];

    while let Some(frame) = stack.last_mut() {
        if frame.next >= frame.directions.len() {
            stack.pop();
            continue;
        }
        let direction = frame.directions[frame.next];
        frame.next += 1;
        let cell = frame.cell;

        let Some(target) = cell.step(direction, 2) else {
            continue;
        };
        if !maze.is_wall(target) {
            continue;
        }
        if let Some(between) = cell.step(direction, 1) {
            maze.set(between, CellState::Open);
        }
        maze.set(target, CellState::Open);
        stack.push(CarveFrame::new(target, rng));
    }
}

/// Opens the start, the exit and the exit's neighbour on the far side.
fn force_open_endpoints(maze: &mut Maze) {
    let start = maze.start;
    let exit = maze.exit;
    maze.set(start, CellState::Open);
    maze.set(exit, CellState::Open);
    if exit.row + 1 < maze.height {
        maze.set(Cell::new(exit.row + 1, exit.col), CellState::Open);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use std::collections::{HashSet, VecDeque};

    fn reachable_from(maze: &Maze, start: Cell) -> HashSet<Cell> {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            for neighbor in maze.open_neighbors(cell) {
                if seen.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        seen
    }

    fn open_cells(maze: &Maze) -> Vec<Cell> {
        (0..maze.height())
            .flat_map(|row| (0..maze.width()).map(move |col| Cell::new(row, col)))
            .filter(|cell| maze.is_open(*cell))
            .collect()
    }

    /// Tests the documented 48x48 example: start and both exit cells are open.
    #[test]
    fn test_forced_cells_open_on_level_one_grid() {
        for _ in 0..5 {
            let maze = MazeGenerator::new()
                .generate(48, 48, Cell::new(1, 1))
                .unwrap();
            assert_eq!(maze.get(1, 1), Some(CellState::Open));
            assert_eq!(maze.get(47, 46), Some(CellState::Open));
            assert_eq!(maze.get(46, 46), Some(CellState::Open));
        }
    }

    /// Tests that cells with two even coordinates are never carved (only forced).
    #[test]
    fn test_even_even_cells_stay_walls() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut maze = Maze::filled(21, 21, Cell::new(1, 1), Cell::new(19, 19));
        carve_passages(&mut maze, Cell::new(1, 1), &mut rng);
        for row in (0..21).step_by(2) {
            for col in (0..21).step_by(2) {
                assert!(maze.is_wall(Cell::new(row, col)), "({row}, {col}) carved");
            }
        }
    }

    /// Tests rejection of grids too small to carve.
    #[test]
    fn test_too_small_grid_is_rejected() {
        let result = MazeGenerator::new().generate(2, 10, Cell::new(0, 0));
        assert!(matches!(result, Err(MazeError::TooSmall { width: 2, height: 10 })));
    }

    /// Tests rejection of a start cell outside the grid.
    #[test]
    fn test_start_out_of_bounds_is_rejected() {
        let result = MazeGenerator::new().generate(10, 10, Cell::new(10, 1));
        assert!(matches!(
            result,
            Err(MazeError::CellOutOfBounds { role: "start", .. })
        ));
    }

    /// Tests that a large grid carves without overflowing the call stack.
    #[test]
    fn test_large_grid_carves() {
        let maze = MazeGenerator::new()
            .generate(401, 401, Cell::new(1, 1))
            .unwrap();
        // Every odd/odd cell is reachable on an odd-sized grid.
        assert!(maze.is_open(Cell::new(399, 399)));
    }

    /// Tests text parsing and display agree.
    #[test]
    fn test_parse_and_display() {
        let text = "#####\n#  ##\n#####\n";
        let maze = Maze::parse(text, Cell::new(1, 1), Cell::new(1, 2)).unwrap();
        assert_eq!(maze.width(), 5);
        assert_eq!(maze.height(), 3);
        assert_eq!(maze.get(1, 2), Some(CellState::Open));
        assert_eq!(maze.to_string(), text);
        assert_eq!(maze.wall_count(), 13);
    }

    /// Tests that an all-wall grid is reported as malformed.
    #[test]
    fn test_parse_all_walls_is_malformed() {
        let result = Maze::parse("###\n###\n###", Cell::new(1, 1), Cell::new(1, 1));
        assert!(matches!(result, Err(MazeError::Malformed(_))));
    }

    proptest! {
        /// Carved cells form a single tree: all reachable from the start and
        /// exactly one fewer adjacency than cells.
        #[test]
        fn prop_carve_is_perfect_maze(width in 3usize..40, height in 3usize..40, seed: u64) {
            let mut rng = StdRng::seed_from_u64(seed);
            let start = Cell::new(1, 1);
            let mut maze = Maze::filled(width, height, start, start);
            carve_passages(&mut maze, start, &mut rng);

            let open = open_cells(&maze);
            let reachable = reachable_from(&maze, start);
            prop_assert_eq!(reachable.len(), open.len());

            let edges: usize = open
                .iter()
                .map(|cell| maze.open_neighbors(*cell).count())
                .sum::<usize>() / 2;
            prop_assert_eq!(edges + 1, open.len());
        }

        /// Start and exit are open after generation for any grid and exit choice.
        #[test]
        fn prop_endpoints_forced_open(
            width in 3usize..32,
            height in 3usize..32,
            exit_row in 0usize..32,
            exit_col in 0usize..32,
            seed: u64,
        ) {
            let exit = Cell::new(exit_row % height, exit_col % width);
            let mut rng = StdRng::seed_from_u64(seed);
            let maze = build_maze(&mut rng, width, height, Cell::new(1, 1), exit).unwrap();
            prop_assert!(maze.is_open(Cell::new(1, 1)));
            prop_assert!(maze.is_open(exit));
            if exit.row + 1 < height {
                prop_assert!(maze.is_open(Cell::new(exit.row + 1, exit.col)));
            }
        }
    }
}
