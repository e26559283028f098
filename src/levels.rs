//! Level layouts
//!
//! A level is a grid of fixed-size cells written as text:
//! `0` empty, `1` normal, `2` strong, `3` unbreakable. Layouts come from a
//! JSON level pack, the built-in classic level, or seeded random generation.
//!
//! Loaders fail soft. Bad or missing data is logged and yields an empty
//! layout, which the session treats as a level that can never be cleared.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{BRICK_HEIGHT, BRICK_ORIGIN_X, BRICK_ORIGIN_Y, BRICK_SPACING, BRICK_WIDTH};
use crate::error::{Error, Result};
use crate::settings::Difficulty;
use crate::sim::{Brick, Rect};
use crate::tuning::Tuning;

/// Columns in generated and classic layouts
pub const GRID_COLS: usize = 10;
/// Rows in the classic first level
pub const CLASSIC_ROWS: usize = 5;
/// Regeneration attempts before falling back to an all-normal layout
const MAX_GENERATE_ATTEMPTS: u32 = 16;

/// One grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Normal,
    Strong,
    Unbreakable,
}

impl Cell {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Cell::Empty),
            '1' => Some(Cell::Normal),
            '2' => Some(Cell::Strong),
            '3' => Some(Cell::Unbreakable),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '0',
            Cell::Normal => '1',
            Cell::Strong => '2',
            Cell::Unbreakable => '3',
        }
    }

    pub fn is_breakable(self) -> bool {
        matches!(self, Cell::Normal | Cell::Strong)
    }
}

/// Screen rectangle of the cell at `row`, `col`
pub fn cell_rect(row: usize, col: usize) -> Rect {
    Rect::new(
        BRICK_ORIGIN_X + col as f32 * (BRICK_WIDTH + BRICK_SPACING),
        BRICK_ORIGIN_Y + row as f32 * (BRICK_HEIGHT + BRICK_SPACING),
        BRICK_WIDTH,
        BRICK_HEIGHT,
    )
}

/// A parsed layout (rows may differ in length)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelGrid {
    rows: Vec<Vec<Cell>>,
}

impl LevelGrid {
    /// Parse a text grid. Blank lines and whitespace between cells are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let row_index = rows.len();
            let row = line
                .chars()
                .filter(|c| !c.is_whitespace())
                .enumerate()
                .map(|(col, found)| {
                    Cell::from_char(found).ok_or(Error::BadGridCell {
                        row: row_index,
                        col,
                        found,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }
        if rows.is_empty() {
            return Err(Error::EmptyGrid);
        }
        Ok(Self { rows })
    }

    /// Rectangular grid filled with one cell type
    pub fn filled(rows: usize, cols: usize, cell: Cell) -> Self {
        Self {
            rows: vec![vec![cell; cols]; rows],
        }
    }

    /// The classic first level: five rows of normal bricks
    pub fn classic() -> Self {
        Self::filled(CLASSIC_ROWS, GRID_COLS, Cell::Normal)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn breakable_count(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|c| c.is_breakable())
            .count()
    }

    pub fn to_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_char()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Cells reachable from the top row through 4-neighbour steps that never
    /// enter an unbreakable cell.
    pub fn reachable(&self) -> Vec<Vec<bool>> {
        let mut seen: Vec<Vec<bool>> = self.rows.iter().map(|r| vec![false; r.len()]).collect();
        let mut queue = VecDeque::new();

        let top = self.rows.first().map(Vec::as_slice).unwrap_or_default();
        for (col, cell) in top.iter().enumerate() {
            if *cell != Cell::Unbreakable {
                seen[0][col] = true;
                queue.push_back((0usize, col));
            }
        }

        while let Some((row, col)) = queue.pop_front() {
            let mut neighbours = Vec::with_capacity(4);
            if row > 0 {
                neighbours.push((row - 1, col));
            }
            neighbours.push((row + 1, col));
            if col > 0 {
                neighbours.push((row, col - 1));
            }
            neighbours.push((row, col + 1));

            for (r, c) in neighbours {
                match self.get(r, c) {
                    Some(cell) if cell != Cell::Unbreakable && !seen[r][c] => {
                        seen[r][c] = true;
                        queue.push_back((r, c));
                    }
                    _ => {}
                }
            }
        }

        seen
    }

    /// Empty every breakable cell the ball could never reach
    pub fn prune_unreachable(&mut self) -> usize {
        let reachable = self.reachable();
        let mut pruned = 0;
        for (row, flags) in self.rows.iter_mut().zip(&reachable) {
            for (cell, ok) in row.iter_mut().zip(flags) {
                if cell.is_breakable() && !ok {
                    *cell = Cell::Empty;
                    pruned += 1;
                }
            }
        }
        pruned
    }

    /// Build the brick list, row by row. Strong bricks roll 2 or 3 hits.
    pub fn bricks(&self, tuning: &Tuning, rng: &mut impl Rng) -> Vec<Brick> {
        let mut bricks = Vec::new();
        for (row, cells) in self.rows.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let rect = cell_rect(row, col);
                match cell {
                    Cell::Empty => {}
                    Cell::Normal => bricks.push(Brick::normal(rect, tuning.normal_points)),
                    Cell::Strong => {
                        bricks.push(Brick::strong_random(rect, tuning.strong_points, rng))
                    }
                    Cell::Unbreakable => bricks.push(Brick::unbreakable(rect)),
                }
            }
        }
        bricks
    }
}

/// Relative cell weights for random generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellWeights {
    pub empty: u32,
    pub normal: u32,
    pub strong: u32,
    pub unbreakable: u32,
}

impl CellWeights {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                empty: 20,
                normal: 60,
                strong: 15,
                unbreakable: 5,
            },
            Difficulty::Medium => Self {
                empty: 15,
                normal: 50,
                strong: 25,
                unbreakable: 10,
            },
            Difficulty::Hard => Self {
                empty: 10,
                normal: 40,
                strong: 35,
                unbreakable: 15,
            },
        }
    }

    fn pick(&self, rng: &mut impl Rng) -> Cell {
        let total = self.empty + self.normal + self.strong + self.unbreakable;
        if total == 0 {
            return Cell::Normal;
        }
        let mut roll = rng.random_range(0..total);
        for (weight, cell) in [
            (self.empty, Cell::Empty),
            (self.normal, Cell::Normal),
            (self.strong, Cell::Strong),
            (self.unbreakable, Cell::Unbreakable),
        ] {
            if roll < weight {
                return cell;
            }
            roll -= weight;
        }
        Cell::Normal
    }
}

/// Rows in a generated layout
pub fn generated_rows(difficulty: Difficulty) -> usize {
    match difficulty {
        Difficulty::Easy => 5,
        Difficulty::Medium => 6,
        Difficulty::Hard => 7,
    }
}

/// Per-level seed so each level differs between runs but replays within one
pub fn level_seed(run_seed: u64, level: u32) -> u64 {
    (level as u64)
        .wrapping_mul(2654435761)
        .wrapping_add(run_seed)
}

/// Weighted random layout where every breakable brick is reachable from the top
pub fn generate_random(difficulty: Difficulty, rng: &mut impl Rng) -> LevelGrid {
    let weights = CellWeights::for_difficulty(difficulty);
    let rows = generated_rows(difficulty);

    for attempt in 1..=MAX_GENERATE_ATTEMPTS {
        let mut grid = LevelGrid {
            rows: (0..rows)
                .map(|_| (0..GRID_COLS).map(|_| weights.pick(rng)).collect())
                .collect(),
        };
        let pruned = grid.prune_unreachable();
        if grid.breakable_count() > 0 {
            log::debug!(
                "Generated {:?} layout on attempt {} ({} unreachable cells emptied)",
                difficulty,
                attempt,
                pruned
            );
            return grid;
        }
    }

    log::warn!(
        "No playable {:?} layout after {} attempts; using all-normal grid",
        difficulty,
        MAX_GENERATE_ATTEMPTS
    );
    LevelGrid::filled(rows, GRID_COLS, Cell::Normal)
}

/// Supplies the brick layout for each level of a run
pub trait LevelLoader {
    /// Number of levels in a run at this difficulty
    fn level_count(&self, difficulty: Difficulty) -> u32;

    /// Bricks for `level` (0-based). Never fails: bad data yields an empty layout.
    fn load(&self, difficulty: Difficulty, level: u32, seed: u64, tuning: &Tuning) -> Vec<Brick>;
}

/// Classic first level followed by random levels
#[derive(Debug, Clone)]
pub struct DefaultLevels {
    levels: u32,
}

impl DefaultLevels {
    pub fn new(levels: u32) -> Self {
        Self {
            levels: levels.max(1),
        }
    }
}

impl Default for DefaultLevels {
    fn default() -> Self {
        Self::new(3)
    }
}

impl LevelLoader for DefaultLevels {
    fn level_count(&self, _difficulty: Difficulty) -> u32 {
        self.levels
    }

    fn load(&self, difficulty: Difficulty, level: u32, seed: u64, tuning: &Tuning) -> Vec<Brick> {
        let mut rng = Pcg32::seed_from_u64(level_seed(seed, level));
        let grid = if level == 0 {
            LevelGrid::classic()
        } else {
            generate_random(difficulty, &mut rng)
        };
        grid.bricks(tuning, &mut rng)
    }
}

/// One level in a pack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDef {
    #[serde(default)]
    pub name: Option<String>,
    /// Text grid rows
    pub rows: Vec<String>,
}

/// Ordered levels per difficulty
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelPack {
    pub levels: HashMap<Difficulty, Vec<LevelDef>>,
}

impl LevelPack {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| Error::Json {
            what: "level pack",
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    fn level(&self, difficulty: Difficulty, level: u32) -> Option<&LevelDef> {
        self.levels
            .get(&difficulty)
            .and_then(|list| list.get(level as usize))
    }
}

impl LevelLoader for LevelPack {
    fn level_count(&self, difficulty: Difficulty) -> u32 {
        self.levels
            .get(&difficulty)
            .map_or(0, |list| list.len() as u32)
    }

    fn load(&self, difficulty: Difficulty, level: u32, seed: u64, tuning: &Tuning) -> Vec<Brick> {
        let Some(def) = self.level(difficulty, level) else {
            log::warn!("Level pack has no {:?} level {}", difficulty, level + 1);
            return Vec::new();
        };

        match LevelGrid::parse(&def.rows.join("\n")) {
            Ok(grid) => {
                if let Some(name) = &def.name {
                    log::info!("Loading level '{}'", name);
                }
                let mut rng = Pcg32::seed_from_u64(level_seed(seed, level));
                grid.bricks(tuning, &mut rng)
            }
            Err(e) => {
                log::warn!("{:?} level {}: {}", difficulty, level + 1, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::BrickKind;
    use proptest::prelude::*;

    #[test]
    fn test_parse_grid() {
        let grid = LevelGrid::parse("0123\n\n 1 1 \n").unwrap();
        assert_eq!(grid.rows().len(), 2);
        assert_eq!(grid.get(0, 2), Some(Cell::Strong));
        assert_eq!(grid.get(1, 1), Some(Cell::Normal));
        assert_eq!(grid.get(1, 2), None);
        assert_eq!(grid.breakable_count(), 4);
        assert_eq!(grid.to_text(), "0123\n11");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(LevelGrid::parse("  \n\n"), Err(Error::EmptyGrid)));
        match LevelGrid::parse("111\n1x1") {
            Err(Error::BadGridCell { row, col, found }) => {
                assert_eq!((row, col, found), (1, 1, 'x'));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_classic_geometry() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(0);
        let bricks = LevelGrid::classic().bricks(&tuning, &mut rng);
        assert_eq!(bricks.len(), 50);
        assert!(bricks.iter().all(|b| b.kind == BrickKind::Normal && b.points == 100));
        assert_eq!(bricks[0].rect, Rect::new(35.0, 50.0, 70.0, 25.0));
        assert_eq!(bricks[1].rect.pos.x, 110.0);
        assert_eq!(bricks[GRID_COLS].rect.pos.y, 80.0);
        assert_eq!(bricks[49].rect.right(), 35.0 + 9.0 * 75.0 + 70.0);
    }

    #[test]
    fn test_cell_kinds() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(0);
        let bricks = LevelGrid::parse("0123").unwrap().bricks(&tuning, &mut rng);
        assert_eq!(bricks.len(), 3);
        assert_eq!(bricks[0].kind, BrickKind::Normal);
        assert_eq!(bricks[1].kind, BrickKind::Strong);
        assert!((2..=3).contains(&bricks[1].hits_required));
        assert_eq!(bricks[1].points, 300);
        assert_eq!(bricks[2].kind, BrickKind::Unbreakable);
        // Column index is kept even when cells are empty
        assert_eq!(bricks[0].rect.pos.x, 110.0);
    }

    #[test]
    fn test_walled_off_bricks_are_pruned() {
        let mut grid = LevelGrid::parse("333\n313\n333\n010").unwrap();
        assert_eq!(grid.prune_unreachable(), 2);
        assert_eq!(grid.breakable_count(), 0);

        // A gap in the wall lets the flood through
        let mut grid = LevelGrid::parse("303\n313\n010").unwrap();
        assert_eq!(grid.prune_unreachable(), 0);
        assert_eq!(grid.breakable_count(), 2);
    }

    #[test]
    fn test_random_levels_replay() {
        let loader = DefaultLevels::new(4);
        let tuning = Tuning::default();
        let a = loader.load(Difficulty::Hard, 2, 77, &tuning);
        let b = loader.load(Difficulty::Hard, 2, 77, &tuning);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.rect, y.rect);
            assert_eq!(x.kind, y.kind);
            assert_eq!(x.hits_required, y.hits_required);
        }
        assert_eq!(loader.load(Difficulty::Hard, 0, 77, &tuning).len(), 50);
        assert_eq!(loader.level_count(Difficulty::Easy), 4);
    }

    #[test]
    fn test_level_pack() {
        let json = r#"{
            "levels": {
                "Easy": [
                    { "name": "Warmup", "rows": ["111", "030"] },
                    { "rows": ["1?1"] }
                ]
            }
        }"#;
        let pack = LevelPack::from_json(json).unwrap();
        let tuning = Tuning::default();
        assert_eq!(pack.level_count(Difficulty::Easy), 2);
        assert_eq!(pack.level_count(Difficulty::Hard), 0);
        assert_eq!(pack.load(Difficulty::Easy, 0, 1, &tuning).len(), 4);
        // Bad cell and missing level both fail soft
        assert!(pack.load(Difficulty::Easy, 1, 1, &tuning).is_empty());
        assert!(pack.load(Difficulty::Easy, 5, 1, &tuning).is_empty());
        assert!(pack.load(Difficulty::Hard, 0, 1, &tuning).is_empty());
    }

    #[test]
    fn test_bad_pack_document() {
        assert!(matches!(
            LevelPack::from_json("{ \"levels\": 3 }"),
            Err(Error::Json { what: "level pack", .. })
        ));
        assert!(matches!(
            LevelPack::from_file(Path::new("/no/such/pack.json")),
            Err(Error::Io { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_generated_levels_are_playable(seed in any::<u64>(), d in 0usize..3) {
            let difficulty = Difficulty::ALL[d];
            let mut rng = Pcg32::seed_from_u64(seed);
            let grid = generate_random(difficulty, &mut rng);
            prop_assert!(grid.breakable_count() > 0);
            let reachable = grid.reachable();
            for (r, row) in grid.rows().iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    if cell.is_breakable() {
                        prop_assert!(reachable[r][c]);
                    }
                }
            }
        }
    }
}
