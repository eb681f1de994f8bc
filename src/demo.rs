//! Deterministic autoplay driving a board for the CLI and viewer.
//!
//! Pieces are drawn from a seeded `StdRng`; each one gets a random rotation and
//! a random lateral offset, then is dropped. Completed planes are removed
//! right away.

use blockout::grid::Size3;
use blockout::{Board, Cell, MoveResult, PieceSet, Point3, PrepareError, Rotation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Settings for one autoplay run.
#[derive(Debug, Clone, Copy)]
pub struct DemoConfig {
    pub size: Size3,
    pub set: PieceSet,
    pub seed: u32,
    /// Upper bound on pieces to place.
    pub pieces: usize,
}

/// Totals of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemoStats {
    pub pieces_placed: usize,
    pub planes_removed: usize,
    pub game_over: bool,
}

/// The settled grid after one piece.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub label: String,
    pub size: Size3,
    pub cells: Vec<Cell>,
}

impl Snapshot {
    fn capture(board: &Board, label: String) -> Self {
        Self {
            label,
            size: board.size(),
            cells: board.cells().to_vec(),
        }
    }
}

/// Plays up to `config.pieces` pieces, calling `on_settle` after each piece
/// has settled and any planes it completed were removed.
pub fn run(
    config: &DemoConfig,
    mut on_settle: impl FnMut(&Board, &DemoStats),
) -> Result<(Board, DemoStats), PrepareError> {
    let mut rng = StdRng::seed_from_u64(u64::from(config.seed));
    let count = config.set.piece_count();

    let mut board = Board::with_size(config.size, config.set, rng.random_range(0..count))?;
    let mut stats = DemoStats::default();

    while stats.pieces_placed < config.pieces {
        if !board.insert_piece(config.set, rng.random_range(0..count)) {
            stats.game_over = true;
            info!(pieces = stats.pieces_placed, "well is full");
            break;
        }

        place(&mut board, &mut rng);
        stats.pieces_placed += 1;

        let completed = board.full_planes().len();
        if completed > 0 {
            info!(planes = ?board.full_planes(), "planes completed");
            stats.planes_removed += completed;
            board.remove_full_planes();
        }

        on_settle(&board, &stats);
    }

    debug!(?stats, "demo finished");
    Ok((board, stats))
}

/// Runs the demo and records a snapshot after every piece.
pub fn run_with_snapshots(config: &DemoConfig) -> Result<Vec<Snapshot>, PrepareError> {
    let mut snapshots = Vec::new();
    run(config, |board, stats| {
        let label = format!(
            "piece {} - {} planes removed",
            stats.pieces_placed, stats.planes_removed
        );
        snapshots.push(Snapshot::capture(board, label));
    })?;
    Ok(snapshots)
}

/// Naive placement: step down to make room, try a random rotation, shift
/// to a random column, drop.
fn place(board: &mut Board, rng: &mut impl Rng) {
    const DOWN: Point3 = Point3::new(0, 0, 1);

    for _ in 0..2 {
        if board.move_piece(DOWN) == MoveResult::Consolidated {
            return;
        }
    }

    let rotation = Rotation::new(
        rng.random_range(0..4),
        rng.random_range(0..4),
        rng.random_range(0..4),
    );
    // a blocked rotation just keeps the current orientation
    let _ = board.rotate_piece(rotation);

    // the spawn column sits near the middle; reach either wall
    let size = board.size();
    let reach = |extent: usize| (extent / 2) as i32;
    let shift_x = rng.random_range(-reach(size.x)..=reach(size.x));
    let shift_y = rng.random_range(-reach(size.y)..=reach(size.y));
    slide(board, Point3::new(shift_x.signum(), 0, 0), shift_x.unsigned_abs());
    slide(board, Point3::new(0, shift_y.signum(), 0), shift_y.unsigned_abs());

    board.drop_piece();
}

fn slide(board: &mut Board, step: Point3, steps: u32) {
    for _ in 0..steps {
        if board.move_piece(step) != MoveResult::Ok {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockout::MINIMUM_SIZE;

    fn config(seed: u32, pieces: usize) -> DemoConfig {
        DemoConfig {
            size: MINIMUM_SIZE,
            set: PieceSet::Basic,
            seed,
            pieces,
        }
    }

    #[test]
    fn test_run_is_reproducible() {
        let (first_board, first) = run(&config(42, 60), |_, _| {}).unwrap();
        let (second_board, second) = run(&config(42, 60), |_, _| {}).unwrap();
        assert_eq!(first, second);
        assert_eq!(first_board.cells(), second_board.cells());
    }

    #[test]
    fn test_run_stops_at_piece_limit_or_game_over() {
        let (_, stats) = run(&config(3, 25), |_, _| {}).unwrap();
        assert!(stats.pieces_placed <= 25);
        assert!(stats.game_over || stats.pieces_placed == 25);
    }

    #[test]
    fn test_settled_cells_keep_invariants() {
        run(&config(11, 200), |board, _| {
            assert!(board.full_planes().is_empty());
            let size = board.size();
            for z in 0..size.z {
                for cell in board.grid().plane(z) {
                    if z < board.top() {
                        assert!(cell.is_empty(), "cell above top at plane {z}");
                    }
                    if !cell.is_solid() {
                        assert_eq!(cell.visible_face_count(), 0);
                    }
                }
            }
        })
        .unwrap();
    }

    #[test]
    fn test_snapshot_per_piece() {
        let (_, stats) = run(&config(5, 30), |_, _| {}).unwrap();
        let snapshots = run_with_snapshots(&config(5, 30)).unwrap();
        assert_eq!(snapshots.len(), stats.pieces_placed);
        assert!(snapshots
            .iter()
            .all(|snapshot| snapshot.cells.len() == 250));
    }

    #[test]
    fn test_run_rejects_small_well() {
        let mut small = config(1, 10);
        small.size = Size3::new(5, 5, 4);
        assert!(matches!(
            run(&small, |_, _| {}),
            Err(PrepareError::TooSmall { .. })
        ));
    }
}
