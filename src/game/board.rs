use std::collections::{HashSet, VecDeque};

use rand::Rng;
use tracing::warn;

use super::types::{CellValue, Coord, PlayerId, RevealedCell};

const DISPLACEMENTS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub is_mine: bool,
    pub adjacent_mines: u8,
    pub revealed_by: Option<PlayerId>,
}

impl Cell {
    pub fn value(&self) -> CellValue {
        if self.is_mine {
            CellValue::MINE
        } else {
            CellValue::Count(self.adjacent_mines)
        }
    }
}

/// Result of revealing a single target cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealOutcome {
    pub cells: Vec<RevealedCell>,
    pub hit_mine: bool,
}

/// Minefield stored row-major: the cell at `(x, y)` lives at `y * width + x`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: u16,
    height: u16,
    mine_count: u32,
    cells: Vec<Cell>,
}

impl Board {
    /// Generates a board whose mines avoid `safe` and its neighbors
    pub fn generate(width: u16, height: u16, mine_count: u32, safe: Coord) -> Self {
        Self::generate_with_rng(width, height, mine_count, safe, &mut rand::rng())
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(
        width: u16,
        height: u16,
        mine_count: u32,
        safe: Coord,
        rng: &mut R,
    ) -> Self {
        let total = u32::from(width) * u32::from(height);
        let mut mine_count = mine_count;
        if mine_count >= total {
            warn!(
                requested = mine_count,
                total_cells = total,
                "Mine count does not fit the board, clamping"
            );
            mine_count = total.saturating_sub(1);
        }

        let mut board = Self::empty(width, height);
        let mut forbidden = vec![false; board.cells.len()];
        forbidden[board.index(safe)] = true;

        let zone: Vec<Coord> = board.neighbors(safe).collect();
        if mine_count as usize <= board.cells.len() - 1 - zone.len() {
            for coord in zone {
                let index = board.index(coord);
                forbidden[index] = true;
            }
        } else {
            warn!(
                mines = mine_count,
                total_cells = total,
                "Board too dense to keep the opening zone clear, only the first cell is safe"
            );
        }

        let mut placed = 0;
        while placed < mine_count {
            let coord = Coord::new(rng.random_range(0..width), rng.random_range(0..height));
            let index = board.index(coord);
            if forbidden[index] || board.cells[index].is_mine {
                continue;
            }
            board.cells[index].is_mine = true;
            placed += 1;
        }

        board.mine_count = mine_count;
        board.compute_counts();
        board
    }

    /// Builds a board with mines at exactly the given positions
    pub fn from_mines(width: u16, height: u16, mines: &[Coord]) -> Self {
        let mut board = Self::empty(width, height);
        for &coord in mines {
            let index = board.index(coord);
            if !board.cells[index].is_mine {
                board.cells[index].is_mine = true;
                board.mine_count += 1;
            }
        }
        board.compute_counts();
        board
    }

    fn empty(width: u16, height: u16) -> Self {
        let len = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            mine_count: 0,
            cells: vec![Cell::default(); len],
        }
    }

    fn compute_counts(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                let coord = Coord::new(x, y);
                let index = self.index(coord);
                if self.cells[index].is_mine {
                    continue;
                }
                let count = self
                    .neighbors(coord)
                    .filter(|&n| self.cells[self.index(n)].is_mine)
                    .count();
                self.cells[index].adjacent_mines = count as u8;
            }
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn mine_count(&self) -> u32 {
        self.mine_count
    }

    fn index(&self, coord: Coord) -> usize {
        usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x)
    }

    pub fn cell(&self, coord: Coord) -> &Cell {
        &self.cells[self.index(coord)]
    }

    /// In-bounds neighbors of `coord`, up to eight
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> {
        let (width, height) = (i32::from(self.width), i32::from(self.height));
        DISPLACEMENTS.iter().filter_map(move |&(dx, dy)| {
            let x = i32::from(coord.x) + dx;
            let y = i32::from(coord.y) + dy;
            ((0..width).contains(&x) && (0..height).contains(&y))
                .then(|| Coord::new(x as u16, y as u16))
        })
    }

    /// Every mine position in row-major order
    pub fn mines(&self) -> impl Iterator<Item = Coord> + '_ {
        let width = usize::from(self.width);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_mine)
            .map(move |(index, _)| Coord::new((index % width) as u16, (index / width) as u16))
    }

    /// Reveals `origin` on behalf of `by`.
    ///
    /// A mine discloses every mine on the board. Anything else is flood filled
    /// breadth-first through zero cells; flagged and already revealed cells are
    /// skipped, and every newly revealed cell is recorded in `revealed` and
    /// appears in the outcome exactly once.
    pub fn reveal(
        &mut self,
        origin: Coord,
        by: &str,
        revealed: &mut HashSet<Coord>,
        flagged: &HashSet<Coord>,
    ) -> RevealOutcome {
        if revealed.contains(&origin) || flagged.contains(&origin) {
            return RevealOutcome::default();
        }

        if self.cell(origin).is_mine {
            let cells = self
                .mines()
                .map(|coord| RevealedCell {
                    x: coord.x,
                    y: coord.y,
                    value: CellValue::MINE,
                })
                .collect();
            return RevealOutcome {
                cells,
                hit_mine: true,
            };
        }

        let mut cells = Vec::new();
        let mut visited = vec![false; self.cells.len()];
        let mut queue = VecDeque::from([origin]);
        visited[self.index(origin)] = true;

        while let Some(coord) = queue.pop_front() {
            if !revealed.insert(coord) {
                continue;
            }
            let index = self.index(coord);
            let cell = &mut self.cells[index];
            cell.revealed_by = Some(by.to_string());
            cells.push(RevealedCell {
                x: coord.x,
                y: coord.y,
                value: cell.value(),
            });

            if cell.adjacent_mines != 0 {
                continue;
            }
            let next: Vec<Coord> = self.neighbors(coord).collect();
            for neighbor in next {
                let n = self.index(neighbor);
                if visited[n] || flagged.contains(&neighbor) || revealed.contains(&neighbor) {
                    continue;
                }
                visited[n] = true;
                queue.push_back(neighbor);
            }
        }

        RevealOutcome {
            cells,
            hit_mine: false,
        }
    }
}
