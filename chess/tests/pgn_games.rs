use chess::pgn::{
    parse_game, parse_game_with_options, parse_games, GameResult, ParserOptions, PgnErrorKind,
    PgnReader, SanError, SyntaxError,
};
use chess::{FenErrorKind, PieceColor, Position, Square};

mod main_line {
    use super::*;

    #[test]
    fn short_game_main_line() {
        let games = parse_games("1. e4 e5 2. Nf3 *").unwrap();
        assert_eq!(games.len(), 1);
        let game = &games[0];

        assert!(game.headers.is_empty());
        assert_eq!(game.result, GameResult::Ongoing);
        let notations: Vec<&str> = game
            .tree
            .main_line_moves()
            .map(|n| n.notation.as_str())
            .collect();
        assert_eq!(notations, vec!["e4", "e5", "Nf3"]);
        assert_eq!(game.tree.ply_count(), 3);
    }

    #[test]
    fn main_line_length_matches_plies() {
        let text = "1. d4 Nf6 2. c4 e6 3. Nc3 Bb4 4. e3 O-O 5. Bd3 d5 6. Nf3 c5 7. O-O Nc6 1/2-1/2";
        let game = parse_games(text).unwrap().remove(0);
        assert_eq!(game.tree.ply_count(), 14);
        assert_eq!(game.result, GameResult::Draw);

        let movers: Vec<PieceColor> = game.tree.main_line_moves().map(|n| n.mover).collect();
        for (ply, mover) in movers.iter().enumerate() {
            let expected = if ply % 2 == 0 { PieceColor::White } else { PieceColor::Black };
            assert_eq!(*mover, expected);
        }
        let last = game.tree.main_line_moves().last().unwrap();
        assert_eq!(last.counter, 7);
        assert_eq!(last.notation, "Nc6");
    }

    #[test]
    fn each_node_carries_the_position_after_its_move() {
        let game = parse_games("1. e4 e5 2. Nf3 *").unwrap().remove(0);
        let nf3 = game.tree.main_line_moves().last().unwrap();
        assert_eq!(
            nf3.position.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn headers_keep_their_order() {
        let text = "[Event \"Hoogovens\"]\n[Site \"Wijk aan Zee\"]\n[Date \"1999.01.20\"]\n\
                    [White \"Kasparov\"]\n[Black \"Topalov\"]\n[Result \"1-0\"]\n\n1. e4 d6 1-0";
        let game = parse_games(text).unwrap().remove(0);
        let names: Vec<String> = game.headers.iter().map(|(tag, _)| tag.to_string()).collect();
        assert_eq!(names, vec!["Event", "Site", "Date", "White", "Black", "Result"]);
        assert_eq!(game.result, GameResult::WhiteWins);
    }
}

mod variations {
    use super::*;

    #[test]
    fn side_line_is_rooted_before_the_varied_move() {
        let game = parse_games("1. e4 e5 (1... c5) 2. Nf3 *").unwrap().remove(0);
        let tree = &game.tree;
        let main: Vec<_> = tree.line(tree.main_line()).collect();
        assert_eq!(main.len(), 3);

        let e4 = tree.node(main[0]);
        let e5 = tree.node(main[1]);
        assert_eq!(e5.variations.len(), 1);

        let side = tree.variation(e5.variations[0]);
        assert_eq!(side.position, e4.position);
        assert_eq!(side.depth, 1);
        assert_eq!(side.branch_of, Some(main[1]));

        let side_moves: Vec<&str> = tree
            .line(e5.variations[0])
            .map(|id| tree.node(id).notation.as_str())
            .collect();
        assert_eq!(side_moves, vec!["c5"]);
    }

    #[test]
    fn nested_variations_and_annotations() {
        let text = "1. e4 e5 2. Nf3 $1 {Developing.} (2. f4 exf4 (2... d5) 3. Nf3) \
                    (2. Bc4) 2... Nc6 !? *";
        let game = parse_games(text).unwrap().remove(0);
        let tree = &game.tree;
        let main: Vec<_> = tree.line(tree.main_line()).collect();

        let nf3 = tree.node(main[2]);
        assert_eq!(nf3.nags, vec![1]);
        assert_eq!(nf3.commentary.as_deref(), Some("Developing."));
        assert_eq!(nf3.variations.len(), 2);

        let kings_gambit: Vec<_> = tree.line(nf3.variations[0]).collect();
        assert_eq!(kings_gambit.len(), 3);
        let exf4 = tree.node(kings_gambit[1]);
        assert_eq!(exf4.variations.len(), 1);
        assert_eq!(tree.depth(tree.line(exf4.variations[0]).next().unwrap()), 2);

        assert_eq!(tree.node(main[3]).nags, vec![5]);
        assert_eq!(tree.ply_count(), 4);
    }

    #[test]
    fn variation_depth_limit() {
        let options = ParserOptions { max_variation_depth: 1 };
        let ok = parse_game_with_options("1. e4 (1. d4) e5 *", 0, options).unwrap();
        assert!(ok.is_some());

        let err = parse_game_with_options("1. e4 (1. d4 (1. c4)) e5 *", 0, options).unwrap_err();
        assert_eq!(err.kind, PgnErrorKind::Syntax(SyntaxError::VariationTooDeep(1)));
        assert_eq!(err.offset, 13);
    }

    #[test]
    fn unbalanced_parentheses() {
        let err = parse_games("1. e4 (1. d4 e5 *").unwrap_err();
        assert_eq!(err.kind, PgnErrorKind::Syntax(SyntaxError::ResultInVariation));

        let err = parse_games("1. e4 (1. d4").unwrap_err();
        assert_eq!(err.kind, PgnErrorKind::Syntax(SyntaxError::UnterminatedVariation));
        assert_eq!(err.offset, 6);

        let err = parse_games("1. e4 e5) *").unwrap_err();
        assert_eq!(err.kind, PgnErrorKind::Syntax(SyntaxError::UnmatchedVariationClose));
        assert_eq!(err.offset, 8);

        let err = parse_games("(1. d4) 1. e4 *").unwrap_err();
        assert_eq!(err.kind, PgnErrorKind::Syntax(SyntaxError::VariationWithoutMove));
    }
}

mod setup {
    use super::*;

    #[test]
    fn fen_header_sets_the_start_position() {
        let text = "[SetUp \"1\"]\n[FEN \"k7/n1PB4/1K6/8/8/8/8/8 w - - 0 50\"]\n\n\
                    50.Bc6+ Nxc6 51.c8=Q+ Nb8 52.Qb7# 1-0";
        let game = parse_games(text).unwrap().remove(0);

        let notations: Vec<&str> = game
            .tree
            .main_line_moves()
            .map(|n| n.notation.as_str())
            .collect();
        assert_eq!(notations, vec!["Bc6+", "Nxc6", "c8=Q+", "Nb8", "Qb7#"]);
        let counters: Vec<u32> = game.tree.main_line_moves().map(|n| n.counter).collect();
        assert_eq!(counters, vec![50, 50, 51, 51, 52]);
        assert_eq!(game.result, GameResult::WhiteWins);
        assert_eq!(
            game.tree.start_position(),
            &"k7/n1PB4/1K6/8/8/8/8/8 w - - 0 50".parse::<Position>().unwrap()
        );
    }

    #[test]
    fn fen_header_without_setup_is_honoured() {
        let text = "[FEN \"4k3/8/8/8/8/8/8/4K2R w K - 0 1\"]\n1. O-O *";
        let game = parse_games(text).unwrap().remove(0);
        let castle = game.tree.main_line_moves().next().unwrap();
        assert_eq!(castle.notation, "O-O");
        assert!(castle.position.piece_at(Square::parse("g1").unwrap()).is_some());
    }

    #[test]
    fn black_to_move_from_fen() {
        let text = "[FEN \"4k3/8/8/8/8/8/8/R3K3 b - - 3 40\"]\n40... Kd7 41. Ra7+ *";
        let game = parse_games(text).unwrap().remove(0);
        let counters: Vec<u32> = game.tree.main_line_moves().map(|n| n.counter).collect();
        assert_eq!(counters, vec![40, 41]);
    }

    #[test]
    fn malformed_fen_header() {
        let text = "[Event \"x\"]\n[FEN \"8/8/8 w - - 0 1\"]\n1. e4 *";
        let err = parse_games(text).unwrap_err();
        assert_eq!(err.kind, PgnErrorKind::MalformedFen(FenErrorKind::MalformedBoard));
        assert_eq!(err.offset, 12);
        assert_eq!(err.document, 0);
    }
}

mod moves {
    use super::*;

    #[test]
    fn illegal_move_reports_offset() {
        let err = parse_games("1. e4 e5 2. Ke3 *").unwrap_err();
        assert_eq!(
            err.kind,
            PgnErrorKind::IllegalOrAmbiguousMove {
                san: "Ke3".into(),
                reason: SanError::NoLegalMove
            }
        );
        assert_eq!(err.offset, 12);
        assert!(err.excerpt.contains("Ke3"));
    }

    #[test]
    fn ambiguous_move_is_rejected() {
        let text = "[FEN \"4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1\"]\n1. Nd2 *";
        let err = parse_games(text).unwrap_err();
        assert!(matches!(
            err.kind,
            PgnErrorKind::IllegalOrAmbiguousMove { reason: SanError::AmbiguousMove(2), .. }
        ));
    }

    #[test]
    fn castling_and_promotion_spellings() {
        let text = "[FEN \"r3k3/6P1/8/8/8/8/8/R3K2R w KQq - 0 1\"]\n1. 0-0 O-O-O 2. g8Q Rxg8 *";
        let game = parse_games(text).unwrap().remove(0);
        let notations: Vec<&str> = game
            .tree
            .main_line_moves()
            .map(|n| n.notation.as_str())
            .collect();
        assert_eq!(notations, vec!["O-O", "O-O-O", "g8=Q", "Rxg8+"]);
    }

    #[test]
    fn detached_ellipsis_after_comment() {
        let game = parse_games("1. e4 {Best by test.} 1. ... e5 2 \u{2026} Nf3 *")
            .unwrap()
            .remove(0);
        let moves: Vec<_> = game.tree.main_line_moves().collect();
        assert_eq!(moves.len(), 3);
        assert_eq!(moves[0].commentary.as_deref(), Some("Best by test."));
        assert_eq!(moves[1].notation, "e5");
        assert_eq!(moves[1].mover, PieceColor::Black);
        assert_eq!(moves[2].notation, "Nf3");
    }
}

mod documents {
    use super::*;

    const TWO_GAMES: &str =
        "[Event \"First\"]\n\n1. e4 e5 1-0\n\n[Event \"Second\"]\n\n1. d4 d5 0-1\n";

    #[test]
    fn multiple_documents_are_read_lazily() {
        let games: Vec<_> = PgnReader::new(TWO_GAMES).collect::<Result<_, _>>().unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].headers.get("Event"), Some("First"));
        assert_eq!(games[1].result, GameResult::BlackWins);
    }

    #[test]
    fn game_index_selection() {
        let second = parse_game(TWO_GAMES, 1).unwrap().unwrap();
        assert_eq!(second.headers.get("Event"), Some("Second"));
        assert!(parse_game(TWO_GAMES, 2).unwrap().is_none());
    }

    #[test]
    fn error_names_the_failing_document() {
        let text = format!("{TWO_GAMES}\n1. e4 e4 *");
        let mut reader = PgnReader::new(&text);
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        assert_eq!(err.document, 2);
        assert!(reader.next().is_none());
    }

    #[test]
    fn earlier_failure_blocks_later_index() {
        let text = format!("1. e4 e4 *\n\n{TWO_GAMES}");
        let err = parse_game(&text, 1).unwrap_err();
        assert_eq!(err.document, 0);
    }

    #[test]
    fn header_after_movetext_is_an_error() {
        let err = parse_games("1. e4 e5\n[Event \"x\"]").unwrap_err();
        assert_eq!(err.kind, PgnErrorKind::Syntax(SyntaxError::HeaderInMovetext));
    }
}
