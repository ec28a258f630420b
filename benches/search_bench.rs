use std::str::FromStr;
use kestrel::board::{Board, MoveGen};
use kestrel::position::Position;
use kestrel::search::{choose_best_move, SearchState};
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_search(c: &mut Criterion) {
    kestrel::board::init();

    c.bench_function("search_depth_3_startpos", |b| {
        b.iter(|| {
            let mut pos = Position::new();
            let mut state = SearchState::new(16);
            state.silent = true;
            choose_best_move(&mut pos, &mut state, Some(3), None, 0)
        })
    });

    let kiwipete = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    c.bench_function("search_depth_3_kiwipete", |b| {
        b.iter(|| {
            let mut pos = Position::new();
            pos.set_from_fen(kiwipete).unwrap();
            let mut state = SearchState::new(16);
            state.silent = true;
            choose_best_move(&mut pos, &mut state, Some(3), None, 0)
        })
    });

    c.bench_function("search_depth_4_startpos", |b| {
        b.iter(|| {
            let mut pos = Position::new();
            let mut state = SearchState::new(16);
            state.silent = true;
            choose_best_move(&mut pos, &mut state, Some(4), None, 0)
        })
    });
}

fn bench_movegen(c: &mut Criterion) {
    kestrel::board::init();
    let board = Board::default();
    c.bench_function("movegen_startpos", |b| {
        b.iter(|| { let moves: Vec<_> = MoveGen::new_legal(&board).collect(); moves.len() })
    });

    let kiwipete = Board::from_str(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
    ).unwrap();
    c.bench_function("movegen_kiwipete", |b| {
        b.iter(|| { let moves: Vec<_> = MoveGen::new_legal(&kiwipete).collect(); moves.len() })
    });
}

criterion_group!(benches, bench_search, bench_movegen);
criterion_main!(benches);
