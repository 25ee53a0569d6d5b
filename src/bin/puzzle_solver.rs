//! Reads two integers from stdin — puzzle side length and scramble
//! depth — solves the resulting N-puzzle with pool-backed A*, and
//! prints the move sequence.

use std::io::{self, Read};

use blockpool::puzzle::{scramble, Solver};
use rand::thread_rng;

fn read_two_integers() -> io::Result<(usize, u32)> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    let mut tokens = input.split_whitespace();
    let side = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "expected puzzle side length"))?;
    let scramble_moves = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "expected scramble depth"))?;
    Ok((side, scramble_moves))
}

fn main() {
    env_logger::init();

    let (side, scramble_moves) = match read_two_integers() {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("puzzle_solver: {err}");
            std::process::exit(1);
        }
    };

    if side < 2 {
        eprintln!("puzzle_solver: side length must be at least 2");
        std::process::exit(1);
    }

    let solver = match Solver::new(side) {
        Ok(solver) => solver,
        Err(err) => {
            eprintln!("puzzle_solver: could not size the pool: {err}");
            std::process::exit(1);
        }
    };

    let mut rng = thread_rng();
    let board = scramble(side, scramble_moves, &mut rng);
    log::info!("solving a {side}x{side} puzzle scrambled by {scramble_moves} moves");

    match solver.solve(board) {
        Some(path) => {
            let moves: String = path.iter().map(|&b| b as char).collect();
            println!("solved in {} moves: {moves}", path.len());
        }
        None => {
            println!("no solution found (pool exhausted or search space exhausted)");
        }
    }
}
