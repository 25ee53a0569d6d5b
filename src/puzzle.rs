//! A sliding-tile (N-puzzle) A* solver, bundled purely as a stress
//! workload: every node expansion buffers its board through the pool, so
//! running a solve puts the allocator under the bursty,
//! size-clustered allocation pattern the design notes call out, without
//! needing a synthetic load generator.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use rand::Rng;

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::safe_api::PoolHandle;

/// A board is a flattened `side * side` grid; tile `0` is the blank.
pub type Board = Vec<u8>;

fn manhattan_distance(board: &[u8], side: usize) -> u32 {
    let mut total = 0u32;
    for (idx, &tile) in board.iter().enumerate() {
        if tile == 0 {
            continue;
        }
        let goal_idx = (tile - 1) as usize;
        let (gx, gy) = (goal_idx % side, goal_idx / side);
        let (x, y) = (idx % side, idx / side);
        total += (gx as i32 - x as i32).unsigned_abs() + (gy as i32 - y as i32).unsigned_abs();
    }
    total
}

fn neighbors(blank: usize, side: usize) -> Vec<(u8, usize)> {
    let (x, y) = (blank % side, blank / side);
    let mut out = Vec::with_capacity(4);
    if x > 0 {
        out.push((b'L', blank - 1));
    }
    if x + 1 < side {
        out.push((b'R', blank + 1));
    }
    if y > 0 {
        out.push((b'U', blank - side));
    }
    if y + 1 < side {
        out.push((b'D', blank + side));
    }
    out
}

struct Node {
    board: Board,
    blank: usize,
    g: u32,
    h: u32,
    path: Vec<u8>,
}

impl Node {
    fn f(&self) -> u32 {
        self.g + self.h
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.f() == other.f()
    }
}
impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // `BinaryHeap` is a max-heap; reverse so the lowest f-score wins.
        other.f().cmp(&self.f())
    }
}
impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Builds a scrambled starting board by taking `moves` random legal
/// steps from the solved state, guaranteeing solvability.
pub fn scramble(side: usize, moves: u32, rng: &mut impl Rng) -> Board {
    let mut board: Board = (1..(side * side) as u8).chain(std::iter::once(0)).collect();
    let mut blank = board.len() - 1;
    for _ in 0..moves {
        let options = neighbors(blank, side);
        let (_, next_blank) = options[rng.gen_range(0..options.len())];
        board.swap(blank, next_blank);
        blank = next_blank;
    }
    board
}

/// Solves one N-puzzle instance with A* search, buffering each expanded
/// node's board through a pool allocation.
pub struct Solver {
    side: usize,
    pool: PoolHandle,
}

impl Solver {
    /// Build a solver for a `side x side` puzzle. The pool is sized to
    /// comfortably hold several thousand concurrently-buffered boards.
    pub fn new(side: usize) -> Result<Self, PoolError> {
        let block_size = (side * side) as u32;
        let capacity = block_size.saturating_mul(8192).max(block_size * 4 + 1);
        let pool = PoolHandle::new(PoolConfig::new(capacity, block_size))?;
        Ok(Self { side, pool })
    }

    /// Run A* from `start` to the solved board, returning the sequence
    /// of moves (`b'L'/b'R'/b'U'/b'D'`), or `None` if the pool was
    /// exhausted or the search space was exhausted first.
    pub fn solve(&self, start: Board) -> Option<Vec<u8>> {
        let side = self.side;
        let blank = start.iter().position(|&t| t == 0)?;
        let h = manhattan_distance(&start, side);

        let mut frontier = BinaryHeap::new();
        let mut visited: HashSet<Board> = HashSet::new();
        visited.insert(start.clone());
        frontier.push(Node {
            board: start,
            blank,
            g: 0,
            h,
            path: Vec::new(),
        });

        while let Some(node) = frontier.pop() {
            if node.h == 0 {
                return Some(node.path);
            }

            // Buffer the board being expanded through the pool; this is
            // the only reason the allocator is in this module at all.
            let mut scratch = self.pool.allocate((side * side) as u32)?;
            scratch.copy_from_slice(&node.board);

            for (dir, next_blank) in neighbors(node.blank, side) {
                let mut candidate = scratch.to_vec();
                candidate.swap(node.blank, next_blank);
                if visited.contains(&candidate) {
                    continue;
                }
                visited.insert(candidate.clone());
                let h = manhattan_distance(&candidate, side);
                let mut path = node.path.clone();
                path.push(dir);
                frontier.push(Node {
                    board: candidate,
                    blank: next_blank,
                    g: node.g + 1,
                    h,
                    path,
                });
            }
        }
        None
    }
}
