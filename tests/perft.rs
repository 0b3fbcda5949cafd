//! Move generator validation against published perft node counts.

use kaskelot::game::movegen::perft;
use kaskelot::game::Position;

type PerftCase = (&'static str, &'static [(u32, u64)]);

// https://www.chessprogramming.org/Perft_Results
const POSITIONS: &[PerftCase] = &[
    (
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        &[(1, 20), (2, 400), (3, 8_902), (4, 197_281), (5, 4_865_609)],
    ),
    // Kiwipete
    (
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        &[(1, 48), (2, 2_039), (3, 97_862), (4, 4_085_603)],
    ),
    // Endgame with en passant and promotion traps
    (
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        &[(1, 14), (2, 191), (3, 2_812), (4, 43_238), (5, 674_624)],
    ),
    // Promotion-heavy
    (
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        &[(1, 6), (2, 264), (3, 9_467), (4, 422_333)],
    ),
    // Castling rights edge cases
    (
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        &[(1, 44), (2, 1_486), (3, 62_379), (4, 2_103_487)],
    ),
    // Quiet middlegame
    (
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/3P1N1P/PPP1NPP1/R2Q1RK1 w - - 0 10",
        &[(1, 42), (2, 1_892), (3, 76_031), (4, 3_288_373)],
    ),
];

fn run_depth_range(min_depth: u32, max_depth: u32) {
    let mut failures = Vec::new();
    let mut total = 0;

    for (fen, expectations) in POSITIONS {
        let mut pos = Position::from_fen(fen).unwrap();
        for &(depth, expected) in expectations.iter() {
            if !(min_depth..=max_depth).contains(&depth) {
                continue;
            }

            let nodes = perft(&mut pos, depth);
            if nodes != expected {
                failures.push(format!(
                    "{fen} depth {depth}: got {nodes}, expected {expected}"
                ));
            }
            total += 1;
        }
    }

    assert!(
        failures.is_empty(),
        "perft failed for {}/{} cases:\n  {}",
        failures.len(),
        total,
        failures.join("\n  ")
    );
}

#[test]
fn perft_shallow() {
    run_depth_range(1, 3);
}

#[test]
fn perft_deep() {
    run_depth_range(4, 5);
}

#[test]
fn perft_leaves_position_untouched() {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    let mut pos = Position::from_fen(fen).unwrap();
    let key = pos.key();
    perft(&mut pos, 3);
    assert_eq!(pos.to_fen(), fen);
    assert_eq!(pos.key(), key);
}

#[test]
fn uci_round_trip_through_legal_moves() {
    let fens = [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "4k3/8/8/3Pp3/8/8/8/4K3 w - e6 0 2",
    ];
    for fen in fens {
        let mut pos = Position::from_fen(fen).unwrap();
        let moves = kaskelot::game::movegen::legal(&mut pos);
        for &m in moves.iter() {
            let resolved = pos.find_move(&m.uci()).unwrap();
            assert_eq!(resolved, m, "round trip failed for {m} in {fen}");
        }
    }
}
