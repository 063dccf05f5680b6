use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use std::fmt;

pub const MIN_SIZE: usize = 4;
pub const MAX_SIZE: usize = 8;
pub const MAX_CELLS: usize = MAX_SIZE * MAX_SIZE;

/// Scan order for the eight compass directions, as (dx, dy).
pub const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1), // NW
    (0, -1),  // N
    (1, -1),  // NE
    (1, 0),   // E
    (1, 1),   // SE
    (0, 1),   // S
    (-1, 1),  // SW
    (-1, 0),  // W
];

/// Axis pairs used by the stability test: NW-SE, N-S, NE-SW, E-W.
const AXES: [((i32, i32), (i32, i32)); 4] = [
    ((-1, -1), (1, 1)),
    ((0, -1), (0, 1)),
    ((1, -1), (-1, 1)),
    ((1, 0), (-1, 0)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Black,
    White,
}

impl Side {
    pub const BOTH: [Self; 2] = [Self::Black, Self::White];

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Black => 0,
            Self::White => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Black => write!(f, "Black"),
            Self::White => write!(f, "White"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Disk(Side),
}

/// Result of a coordinate read. Reads outside the board yield `OffBoard`
/// instead of panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    OffBoard,
    Empty,
    Disk(Side),
}

impl From<Cell> for Tile {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => Self::Empty,
            Cell::Disk(side) => Self::Disk(side),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counts {
    pub empty: u32,
    pub black: u32,
    pub white: u32,
}

impl Counts {
    pub const fn of(&self, side: Side) -> u32 {
        match side {
            Side::Black => self.black,
            Side::White => self.white,
        }
    }

    /// `self[us] - self[them]` as a signed value.
    #[allow(clippy::cast_possible_wrap)]
    pub const fn diff(&self, us: Side, them: Side) -> i32 {
        self.of(us) as i32 - self.of(them) as i32
    }

    fn add(&mut self, cell: Cell) {
        match cell {
            Cell::Empty => self.empty += 1,
            Cell::Disk(Side::Black) => self.black += 1,
            Cell::Disk(Side::White) => self.white += 1,
        }
    }

    fn add_disk(&mut self, side: Side) {
        self.add(Cell::Disk(side));
    }
}

/// The four board symmetries treated as equivalent by the transposition
/// cache. Every one of them is its own inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permutation {
    Identity = 0,
    Rotate180 = 1,
    Transpose = 2,
    AntiTranspose = 3,
}

impl Permutation {
    pub const ALL: [Self; 4] = [
        Self::Identity,
        Self::Rotate180,
        Self::Transpose,
        Self::AntiTranspose,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Maps a cell index of an `size`x`size` board through this symmetry.
    pub const fn apply(self, index: usize, size: usize) -> usize {
        let x = index % size;
        let y = index / size;
        let max = size - 1;
        match self {
            Self::Identity => index,
            Self::Rotate180 => size * size - 1 - index,
            Self::Transpose => x * size + y,
            Self::AntiTranspose => (max - x) * size + (max - y),
        }
    }
}

/// Packed board contents plus the side to move; used as the transposition
/// lookup key. Two bits per cell fit a full 8x8 board in a `u128`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardKey {
    cells: u128,
    side: Side,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: u8,
    #[serde(with = "BigArray")]
    cells: [Cell; MAX_CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self::standard(MAX_SIZE)
    }
}

impl Board {
    pub const fn is_supported_size(size: usize) -> bool {
        size >= MIN_SIZE && size <= MAX_SIZE && size % 2 == 0
    }

    /// # Panics
    /// Panics if `size` is not an even number between 4 and 8.
    #[must_use]
    pub fn empty(size: usize) -> Self {
        assert!(
            Self::is_supported_size(size),
            "unsupported board size {size}"
        );
        #[allow(clippy::cast_possible_truncation)]
        Self {
            size: size as u8,
            cells: [Cell::Empty; MAX_CELLS],
        }
    }

    /// Empty board with the four-disk starting position in the centre.
    #[must_use]
    pub fn standard(size: usize) -> Self {
        let mut board = Self::empty(size);
        let mid = size / 2 - 1;
        board.set(board.index(mid, mid), Cell::Disk(Side::White));
        board.set(board.index(mid + 1, mid), Cell::Disk(Side::Black));
        board.set(board.index(mid, mid + 1), Cell::Disk(Side::Black));
        board.set(board.index(mid + 1, mid + 1), Cell::Disk(Side::White));
        board
    }

    pub const fn size(&self) -> usize {
        self.size as usize
    }

    pub const fn len(&self) -> usize {
        self.size() * self.size()
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn index(&self, x: usize, y: usize) -> usize {
        y * self.size() + x
    }

    pub const fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.size(), index / self.size())
    }

    /// Index of `(x, y)`, or `None` when it lies outside the board.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    pub const fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        let size = self.size() as i32;
        if x < 0 || y < 0 || x >= size || y >= size {
            None
        } else {
            Some(self.index(x as usize, y as usize))
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Tile {
        self.index_of(x, y)
            .map_or(Tile::OffBoard, |i| Tile::from(self.cells[i]))
    }

    pub fn cell(&self, index: usize) -> Cell {
        self.cells.get(index).copied().unwrap_or_default()
    }

    pub fn set(&mut self, index: usize, cell: Cell) {
        if index < self.len() {
            self.cells[index] = cell;
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells[..self.len()]
    }

    fn signed_coords(&self, index: usize) -> (i32, i32) {
        let (x, y) = self.coords(index);
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        (x as i32, y as i32)
    }

    /// Bit mask of opponent disks captured by `side` playing at `index`
    /// along one direction; zero when the run is not closed by a `side` disk.
    fn run_mask(&self, side: Side, index: usize, (dx, dy): (i32, i32)) -> u64 {
        let opponent = side.opposite();
        let (mut x, mut y) = self.signed_coords(index);
        let mut mask = 0u64;
        loop {
            x += dx;
            y += dy;
            match self.get(x, y) {
                Tile::Disk(s) if s == opponent => {
                    if let Some(i) = self.index_of(x, y) {
                        mask |= 1 << i;
                    }
                }
                Tile::Disk(_) => return mask,
                Tile::Empty | Tile::OffBoard => return 0,
            }
        }
    }

    /// Every disk `side` would flip by playing at `index`, as a bit mask.
    pub fn flips_for(&self, side: Side, index: usize) -> u64 {
        if index >= self.len() || self.cells[index] != Cell::Empty {
            return 0;
        }
        DIRECTIONS
            .iter()
            .fold(0, |mask, &dir| mask | self.run_mask(side, index, dir))
    }

    pub fn is_legal(&self, side: Side, index: usize) -> bool {
        index < self.len()
            && self.cells[index] == Cell::Empty
            && DIRECTIONS
                .iter()
                .any(|&dir| self.run_mask(side, index, dir) != 0)
    }

    pub fn legal_moves_for(&self, side: Side) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| self.is_legal(side, i))
            .collect()
    }

    /// Places a `side` disk at `index` and flips every sandwiched opponent
    /// run. Returns the mask of flipped cells.
    ///
    /// # Panics
    /// Panics if the placement is not legal for `side`; callers must only
    /// pass positions from the legal move list.
    pub fn place_and_flip(&mut self, side: Side, index: usize) -> u64 {
        let flipped = self.flips_for(side, index);
        assert!(
            flipped != 0,
            "illegal placement at {index} for {side}"
        );
        let mut rest = flipped;
        while rest != 0 {
            let i = rest.trailing_zeros() as usize;
            self.cells[i] = Cell::Disk(side);
            rest &= rest - 1;
        }
        self.cells[index] = Cell::Disk(side);
        flipped
    }

    pub fn counts(&self) -> Counts {
        let mut counts = Counts::default();
        for &cell in self.cells() {
            counts.add(cell);
        }
        counts
    }

    pub fn empty_count(&self) -> usize {
        self.cells().iter().filter(|c| **c == Cell::Empty).count()
    }

    /// Disks with at least one empty neighbour.
    pub fn frontier_counts(&self) -> Counts {
        let mut counts = Counts::default();
        for index in 0..self.len() {
            let Cell::Disk(side) = self.cells[index] else {
                continue;
            };
            let (x, y) = self.signed_coords(index);
            if DIRECTIONS
                .iter()
                .any(|&(dx, dy)| self.get(x + dx, y + dy) == Tile::Empty)
            {
                counts.add_disk(side);
            }
        }
        counts
    }

    /// Disks on the corners and the two cells flanking each corner.
    pub fn edge_counts(&self) -> Counts {
        let mut counts = Counts::default();
        for index in self.edge_cells() {
            if let Cell::Disk(side) = self.cells[index] {
                counts.add_disk(side);
            }
        }
        counts
    }

    fn edge_cells(&self) -> [usize; 12] {
        let max = self.size() - 1;
        [
            self.index(0, 0),
            self.index(1, 0),
            self.index(0, 1),
            self.index(max, 0),
            self.index(max - 1, 0),
            self.index(max, 1),
            self.index(0, max),
            self.index(1, max),
            self.index(0, max - 1),
            self.index(max, max),
            self.index(max - 1, max),
            self.index(max, max - 1),
        ]
    }

    /// Disks that can no longer be flipped. Propagates inward from each
    /// corner rather than testing every cell.
    pub fn stable_counts(&self) -> Counts {
        let mut counts = Counts::default();
        let mut stable = [None; MAX_CELLS];
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let max = self.size() as i32 - 1;
        self.stable_from_corner((0, 0), (1, 1), None, &mut stable, &mut counts);
        self.stable_from_corner((0, max), (1, -1), None, &mut stable, &mut counts);
        self.stable_from_corner((max, 0), (-1, 1), None, &mut stable, &mut counts);
        self.stable_from_corner((max, max), (-1, -1), None, &mut stable, &mut counts);
        counts
    }

    fn stable_from_corner(
        &self,
        (x, y): (i32, i32),
        (dx, dy): (i32, i32),
        target: Option<Side>,
        stable: &mut [Option<Side>; MAX_CELLS],
        counts: &mut Counts,
    ) {
        let Tile::Disk(disk) = self.get(x, y) else {
            return;
        };
        let target = target.unwrap_or(disk);
        if disk != target {
            return;
        }

        self.mark_if_stable(x, y, disk, stable, counts);

        let mut ix = x + dx;
        while self.get(ix, y) == Tile::Disk(target) {
            if self.mark_if_stable(ix, y, target, stable, counts) {
                break;
            }
            ix += dx;
        }

        let mut iy = y + dy;
        while self.get(x, iy) == Tile::Disk(target) {
            if self.mark_if_stable(x, iy, target, stable, counts) {
                break;
            }
            iy += dy;
        }

        self.stable_from_corner((x + dx, y + dy), (dx, dy), Some(target), stable, counts);
    }

    /// Returns `true` when the cell was already known to be stable, which
    /// ends the current walk.
    fn mark_if_stable(
        &self,
        x: i32,
        y: i32,
        disk: Side,
        stable: &mut [Option<Side>; MAX_CELLS],
        counts: &mut Counts,
    ) -> bool {
        let Some(index) = self.index_of(x, y) else {
            return false;
        };
        if stable[index].is_some() {
            return true;
        }
        let anchored = |(ax, ay): (i32, i32)| match self.index_of(x + ax, y + ay) {
            None => true,
            Some(i) => stable[i] == Some(disk),
        };
        if AXES.iter().all(|&(a, b)| anchored(a) || anchored(b)) {
            stable[index] = Some(disk);
            counts.add_disk(disk);
        }
        false
    }

    /// The board viewed through `perm`.
    #[must_use]
    pub fn permuted(&self, perm: Permutation) -> Self {
        let mut out = Self::empty(self.size());
        for i in 0..self.len() {
            out.cells[i] = self.cells[perm.apply(i, self.size())];
        }
        out
    }

    /// Identity, 180 degree rotation, transpose and anti-transpose, in that
    /// order. Entry 0 is always an unchanged copy.
    pub fn permutations(&self) -> [Self; 4] {
        Permutation::ALL.map(|perm| self.permuted(perm))
    }

    pub const fn permute_index(&self, perm: Permutation, index: usize) -> usize {
        perm.apply(index, self.size())
    }

    pub fn key(&self, side: Side) -> BoardKey {
        self.permuted_key(Permutation::Identity, side)
    }

    /// Key of `self.permuted(perm)` without materialising the board.
    pub fn permuted_key(&self, perm: Permutation, side: Side) -> BoardKey {
        let size = self.size();
        let mut cells = 0u128;
        for i in 0..self.len() {
            let bits: u128 = match self.cells[perm.apply(i, size)] {
                Cell::Empty => 0,
                Cell::Disk(Side::Black) => 1,
                Cell::Disk(Side::White) => 2,
            };
            cells |= bits << (2 * i);
        }
        BoardKey { cells, side }
    }

    /// One character per cell: `_` empty, `0` black, `1` white.
    pub fn to_board_string(&self) -> String {
        self.cells()
            .iter()
            .map(|cell| match cell {
                Cell::Empty => '_',
                Cell::Disk(Side::Black) => '0',
                Cell::Disk(Side::White) => '1',
            })
            .collect()
    }

    /// Inverse of [`Board::to_board_string`]; `None` on a malformed string.
    pub fn from_board_string(s: &str) -> Option<Self> {
        let len = s.chars().count();
        let size = (1..=MAX_SIZE).find(|n| n * n == len)?;
        if !Self::is_supported_size(size) {
            return None;
        }
        let mut board = Self::empty(size);
        for (i, ch) in s.chars().enumerate() {
            board.cells[i] = match ch {
                '_' => Cell::Empty,
                '0' => Cell::Disk(Side::Black),
                '1' => Cell::Disk(Side::White),
                _ => return None,
            };
        }
        Some(board)
    }

    /// Algebraic name of a cell, e.g. `d3` (column letter, row number).
    pub fn square_name(&self, index: usize) -> String {
        let (x, y) = self.coords(index);
        #[allow(clippy::cast_possible_truncation)]
        let file = char::from(b'a' + x as u8);
        format!("{file}{}", y + 1)
    }

    /// Parses an algebraic square name such as `d3`.
    pub fn parse_square(&self, name: &str) -> Option<usize> {
        let mut chars = name.trim().chars();
        let file = chars.next()?.to_ascii_lowercase();
        let rank: usize = chars.as_str().parse().ok()?;
        if !file.is_ascii_lowercase() || rank == 0 {
            return None;
        }
        let x = (file as usize).checked_sub('a' as usize)?;
        let y = rank - 1;
        (x < self.size() && y < self.size()).then(|| self.index(x, y))
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.to_board_string())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for x in 0..self.size() {
            #[allow(clippy::cast_possible_truncation)]
            write!(f, " {}", char::from(b'a' + x as u8))?;
        }
        writeln!(f)?;
        for y in 0..self.size() {
            write!(f, "{:>2}", y + 1)?;
            for x in 0..self.size() {
                let ch = match self.cells[self.index(x, y)] {
                    Cell::Empty => '.',
                    Cell::Disk(Side::Black) => 'X',
                    Cell::Disk(Side::White) => 'O',
                };
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
