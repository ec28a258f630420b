use std::io::{self, BufRead};
use std::str::FromStr;
use std::thread;

use crate::board::{Board, ChessMove, Color, File, Piece, Rank, Square};
use crate::position::Position;
use crate::search::{self, SearchState};
use crate::types::{
    EngineConfig, DEFAULT_MOVETIME_MS, DEFAULT_MOVE_OVERHEAD_MS, MAX_HASH_MB, MAX_MAX_NODES,
    MAX_MOVE_OVERHEAD_MS, MAX_THREADS, MIN_HASH_MB, MIN_MOVE_OVERHEAD_MS, MIN_THREADS,
};

/// Run the UCI command loop against stdin/stdout.
///
/// `go` spawns the search on a worker thread so `stop`/further input keeps being read
/// while it runs; every other command blocks until any in-flight search has finished.
pub fn run() {
    let stdin = io::stdin();

    let mut pos = Position::new();
    let mut config = EngineConfig::default();
    let mut state = SearchState::new(config.hash_mb);
    let mut search_thread: Option<thread::JoinHandle<(SearchState, Position)>> = None;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(err) => {
                log::warn!("stdin read error: {err}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens[0] {
            "uci" => {
                println!("id name kestrel");
                println!("id author kestrel contributors");
                println!(
                    "option name Threads type spin default {} min {} max {}",
                    config.threads, MIN_THREADS, MAX_THREADS
                );
                println!(
                    "option name Hash type spin default {} min {} max {}",
                    config.hash_mb, MIN_HASH_MB, MAX_HASH_MB
                );
                println!(
                    "option name Move Overhead type spin default {} min {} max {}",
                    DEFAULT_MOVE_OVERHEAD_MS, MIN_MOVE_OVERHEAD_MS, MAX_MOVE_OVERHEAD_MS
                );
                println!("option name Max Nodes type spin default 0 min 0 max {MAX_MAX_NODES}");
                println!("option name BookPath type string default {}", config.book_path);
                println!("option name SyzygyPath type string default {}", config.syzygy_path);
                println!("uciok");
            }
            "isready" => {
                join_search(&mut search_thread, &mut state, &mut pos);
                println!("readyok");
            }
            "ucinewgame" => {
                join_search(&mut search_thread, &mut state, &mut pos);
                pos.reset();
                state.new_game();
            }
            "position" => {
                join_search(&mut search_thread, &mut state, &mut pos);
                parse_position(&tokens, &mut pos);
            }
            "go" => {
                join_search(&mut search_thread, &mut state, &mut pos);
                let go_params = parse_go(&tokens);
                let time_limit_ms = go_params.compute_time_ms(pos.side_to_move(), config.move_overhead_ms);
                let depth = go_params.depth;
                let nodes = go_params.nodes.or_else(|| {
                    if config.max_nodes > 0 { Some(config.max_nodes) } else { None }
                });

                let moved_state = std::mem::replace(&mut state, SearchState::new(config.hash_mb));
                let moved_pos = pos.clone();

                search_thread = Some(thread::spawn(move || {
                    let mut moved_state = moved_state;
                    let mut moved_pos = moved_pos;
                    let start = std::time::Instant::now();
                    let result = search::choose_best_move(&mut moved_pos, &mut moved_state, depth, nodes, time_limit_ms);
                    let elapsed_ms = start.elapsed().as_millis().max(1) as u64;
                    let nps = result.nodes * 1000 / elapsed_ms;
                    println!(
                        "info depth {} score {} nodes {} time {} nps {}",
                        result.depth,
                        search::format_score(result.score),
                        result.nodes,
                        elapsed_ms,
                        nps
                    );
                    match result.best_move {
                        Some(mv) => println!("bestmove {mv}"),
                        None => println!("bestmove 0000"),
                    }
                    (moved_state, moved_pos)
                }));
            }
            "stop" => {
                join_search(&mut search_thread, &mut state, &mut pos);
            }
            "setoption" => {
                join_search(&mut search_thread, &mut state, &mut pos);
                parse_setoption(&tokens, &mut config, &mut state);
            }
            "quit" => {
                join_search(&mut search_thread, &mut state, &mut pos);
                break;
            }
            "d" | "print" => {
                println!("{}", pos.board());
            }
            other => {
                log::warn!("unrecognized UCI command: {other}");
            }
        }
    }
}

fn join_search(
    handle: &mut Option<thread::JoinHandle<(SearchState, Position)>>,
    state: &mut SearchState,
    pos: &mut Position,
) {
    if let Some(h) = handle.take() {
        match h.join() {
            Ok((returned_state, returned_pos)) => {
                *state = returned_state;
                *pos = returned_pos;
            }
            Err(_) => log::warn!("search thread panicked; state and position retain prior values"),
        }
    }
}

struct GoParams {
    depth: Option<u8>,
    nodes: Option<u64>,
    movetime: Option<u64>,
    wtime: Option<u64>,
    btime: Option<u64>,
    winc: Option<u64>,
    binc: Option<u64>,
    moves_to_go: Option<u64>,
    infinite: bool,
}

impl GoParams {
    fn new() -> Self {
        Self {
            depth: None,
            nodes: None,
            movetime: None,
            wtime: None,
            btime: None,
            winc: None,
            binc: None,
            moves_to_go: None,
            infinite: false,
        }
    }

    /// Compute the time budget in milliseconds, reserving `move_overhead_ms` off whatever
    /// clock-derived allocation would otherwise be spent.
    ///
    /// When `go` carries no time information at all (no `movetime`, no `wtime`/`btime`,
    /// not `infinite`, and no explicit `depth`/`nodes` either), falls back to a default
    /// 3.0s move time rather than searching unbounded.
    fn compute_time_ms(&self, side: Color, move_overhead_ms: u64) -> u64 {
        if self.infinite {
            return 0;
        }
        if let Some(mt) = self.movetime {
            return mt.saturating_sub(move_overhead_ms);
        }

        let (my_time, my_inc) = if side == Color::White {
            (self.wtime.unwrap_or(0), self.winc.unwrap_or(0))
        } else {
            (self.btime.unwrap_or(0), self.binc.unwrap_or(0))
        };

        if my_time == 0 {
            if self.depth.is_none() && self.nodes.is_none() {
                return DEFAULT_MOVETIME_MS.saturating_sub(move_overhead_ms);
            }
            return 0;
        }

        let moves_left = self.moves_to_go.unwrap_or(30);
        let base = my_time / moves_left.max(1);
        let inc_bonus = my_inc * 3 / 4;
        let allocated = (base + inc_bonus).min(my_time * 4 / 5);
        allocated.saturating_sub(move_overhead_ms)
    }
}

fn parse_go(tokens: &[&str]) -> GoParams {
    let mut params = GoParams::new();
    let mut i = 1;

    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                i += 1;
                if i < tokens.len() {
                    params.depth = tokens[i].parse().ok();
                }
            }
            "nodes" => {
                i += 1;
                if i < tokens.len() {
                    params.nodes = tokens[i].parse().ok();
                }
            }
            "movetime" => {
                i += 1;
                if i < tokens.len() {
                    params.movetime = tokens[i].parse().ok();
                }
            }
            "wtime" => {
                i += 1;
                if i < tokens.len() {
                    params.wtime = tokens[i].parse().ok();
                }
            }
            "btime" => {
                i += 1;
                if i < tokens.len() {
                    params.btime = tokens[i].parse().ok();
                }
            }
            "winc" => {
                i += 1;
                if i < tokens.len() {
                    params.winc = tokens[i].parse().ok();
                }
            }
            "binc" => {
                i += 1;
                if i < tokens.len() {
                    params.binc = tokens[i].parse().ok();
                }
            }
            "movestogo" => {
                i += 1;
                if i < tokens.len() {
                    params.moves_to_go = tokens[i].parse().ok();
                }
            }
            "infinite" => {
                params.infinite = true;
            }
            _ => {}
        }
        i += 1;
    }

    params
}

fn parse_position(tokens: &[&str], pos: &mut Position) {
    if tokens.len() < 2 {
        log::warn!("malformed position command: {tokens:?}");
        return;
    }

    let mut idx = 1;
    let mut board = Board::default();

    if tokens[idx] == "startpos" {
        idx += 1;
    } else if tokens[idx] == "fen" {
        idx += 1;
        let mut fen_parts: Vec<&str> = Vec::new();
        while idx < tokens.len() && tokens[idx] != "moves" && fen_parts.len() < 6 {
            fen_parts.push(tokens[idx]);
            idx += 1;
        }
        if fen_parts.len() < 4 {
            log::warn!("malformed FEN in position command: {tokens:?}");
            return;
        }
        match Board::from_str(&fen_parts.join(" ")) {
            Ok(b) => board = b,
            Err(err) => {
                log::warn!("unparseable FEN {:?}: {err}", fen_parts.join(" "));
                return;
            }
        }
    } else {
        log::warn!("malformed position command: {tokens:?}");
        return;
    }

    pos.reset();
    if let Err(err) = pos.set_from_fen(&board.to_string()) {
        log::warn!("failed to adopt parsed board: {err}");
        return;
    }

    if idx < tokens.len() && tokens[idx] == "moves" {
        idx += 1;
        for &move_str in &tokens[idx..] {
            match parse_uci_move(pos.board(), move_str) {
                Some(mv) => pos.push(mv),
                None => log::warn!("illegal or unparseable move in position command: {move_str}"),
            }
        }
    }
}

fn parse_uci_move(board: &Board, move_str: &str) -> Option<ChessMove> {
    if move_str.len() < 4 {
        return None;
    }
    let bytes = move_str.as_bytes();

    let src_file = bytes[0].wrapping_sub(b'a');
    let src_rank = bytes[1].wrapping_sub(b'1');
    let dst_file = bytes[2].wrapping_sub(b'a');
    let dst_rank = bytes[3].wrapping_sub(b'1');

    if src_file >= 8 || src_rank >= 8 || dst_file >= 8 || dst_rank >= 8 {
        return None;
    }

    let src = Square::make_square(
        Rank::from_index(src_rank as usize),
        File::from_index(src_file as usize),
    );
    let dst = Square::make_square(
        Rank::from_index(dst_rank as usize),
        File::from_index(dst_file as usize),
    );

    let promo = if move_str.len() >= 5 {
        match bytes[4] {
            b'q' => Some(Piece::Queen),
            b'r' => Some(Piece::Rook),
            b'b' => Some(Piece::Bishop),
            b'n' => Some(Piece::Knight),
            _ => None,
        }
    } else {
        None
    };

    let mv = ChessMove::new(src, dst, promo);
    if board.legal(mv) {
        Some(mv)
    } else {
        None
    }
}

fn parse_setoption(tokens: &[&str], config: &mut EngineConfig, state: &mut SearchState) {
    let name_idx = tokens.iter().position(|&t| t == "name");
    let value_idx = tokens.iter().position(|&t| t == "value");

    let (Some(ni), Some(vi)) = (name_idx, value_idx) else {
        log::warn!("malformed setoption command: {tokens:?}");
        return;
    };

    let name: String = tokens[ni + 1..vi].join(" ");
    let value: String = tokens[vi + 1..].join(" ");

    match name.as_str() {
        "Threads" => match value.parse::<u32>() {
            Ok(n) => config.threads = n.clamp(MIN_THREADS, MAX_THREADS),
            Err(_) => log::warn!("invalid Threads value: {value}"),
        },
        "Hash" => match value.parse::<usize>() {
            Ok(mb) => {
                config.hash_mb = mb.clamp(MIN_HASH_MB, MAX_HASH_MB);
                state.resize_tt(config.hash_mb);
            }
            Err(_) => log::warn!("invalid Hash value: {value}"),
        },
        "Move Overhead" => match value.parse::<u64>() {
            Ok(ms) => config.move_overhead_ms = ms.clamp(MIN_MOVE_OVERHEAD_MS, MAX_MOVE_OVERHEAD_MS),
            Err(_) => log::warn!("invalid Move Overhead value: {value}"),
        },
        "Max Nodes" => match value.parse::<u64>() {
            Ok(n) => config.max_nodes = n.min(MAX_MAX_NODES),
            Err(_) => log::warn!("invalid Max Nodes value: {value}"),
        },
        "BookPath" => {
            config.book_path = value.clone();
            state.load_book(&value);
        }
        "SyzygyPath" => {
            config.syzygy_path = value.clone();
            state.load_syzygy(&value);
        }
        other => log::warn!("unrecognized UCI option: {other}"),
    }
}
