use hexevo_engine::{Axis, Board, BoardConfig, Cell, FirstPlayer, InvalidMove, Player, WinSignal};
use rand::{Rng, SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg64Mcg;

/// Plays uniformly random alternating moves until somebody wins.
fn play_random_game<R>(board: &mut Board, rng: &mut R) -> (Player, usize)
where
    R: Rng + ?Sized,
{
    let mut placements = 0;
    loop {
        let moves = board.feasible_moves();
        let cell = *moves
            .choose(rng)
            .expect("a full board always has a winner");
        let player = board.to_move();
        placements += 1;
        if let WinSignal::Won(winner) = board.place(cell, player).unwrap() {
            assert_eq!(winner, player);
            return (winner, placements);
        }
    }
}

#[test]
fn every_random_game_has_exactly_one_winner() {
    let mut rng = Pcg64Mcg::seed_from_u64(0x5eed);
    for size in 1..=9 {
        for axis in [Axis::Rows, Axis::Columns] {
            let config = BoardConfig {
                size,
                first_player: FirstPlayer::Random,
                a_connects: axis,
            };
            let mut board = Board::with_rng(config, &mut rng).unwrap();
            for _ in 0..20 {
                board.reset_with(&mut rng);
                let (winner, placements) = play_random_game(&mut board, &mut rng);
                assert!(placements <= size * size);
                assert_eq!(board.winner(), Some(winner));
                assert_eq!(board.status(), WinSignal::Won(winner));
                assert_eq!(board.history().len(), placements);

                // the game is over for both players
                assert!(board.feasible_moves().is_empty());
                let empty: Vec<usize> = board.snapshot().empty_cells().collect();
                for player in Player::ALL {
                    for &cell in &empty {
                        assert_eq!(
                            board.place(cell, player),
                            Err(InvalidMove::GameOver { winner })
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn shuffled_alternating_games_always_end_with_a_winner() {
    let mut rng = Pcg64Mcg::seed_from_u64(11);
    for size in 2..=7 {
        let mut cells: Vec<usize> = (0..size * size).collect();
        for i in (1..cells.len()).rev() {
            cells.swap(i, rng.random_range(0..=i));
        }
        let mut board = Board::new(BoardConfig::with_size(size)).unwrap();
        let mut winner = None;
        for (turn, cell) in cells.iter().enumerate() {
            let player = if turn % 2 == 0 { Player::A } else { Player::B };
            match board.place(*cell, player) {
                Ok(WinSignal::Won(p)) => {
                    winner = Some(p);
                    break;
                }
                Ok(WinSignal::Ongoing) => {}
                Err(err) => panic!("unexpected error: {err}"),
            }
        }
        assert!(winner.is_some(), "size {size} ended without a winner");
    }
}

#[test]
fn replayed_games_match_and_flip_round_trips() {
    let mut rng = Pcg64Mcg::seed_from_u64(99);
    let config = BoardConfig::with_size(6);
    let mut board = Board::new(config).unwrap();
    for _ in 0..10 {
        board.reset_with(&mut rng);
        play_random_game(&mut board, &mut rng);

        let replayed = Board::replay(config, board.history()).unwrap();
        assert_eq!(replayed, board);

        let mut flipped = board.clone();
        flipped.flip();
        for index in 0..board.num_cells() {
            let mirrored = board.num_cells() - 1 - index;
            assert_eq!(flipped.cell(mirrored), board.cell(index));
            assert_eq!(
                flipped.chain_edges(mirrored),
                board.chain_edges(index).map(|e| e.swapped())
            );
        }
        flipped.flip();
        assert_eq!(flipped, board);
    }
}

#[test]
fn snapshot_matches_board_cells() {
    let mut board = Board::new(BoardConfig::with_size(3)).unwrap();
    board.place(4, Player::A).unwrap();
    board.place(0, Player::B).unwrap();
    let snapshot = board.snapshot();
    assert_eq!(snapshot.to_string(), "B . .\n. A .\n. . .");
    assert_eq!(snapshot.cell(4), Cell::Stone(Player::A));
    assert_eq!(snapshot.empty_cells().count(), 7);
}
