#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::config::SwissConfig;
    use crate::error::TournamentError;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn create_tournament(names: &[&str], rounds: u32) -> (SwissTournament, Vec<Uuid>) {
        init_logger();
        let mut tournament =
            SwissTournament::new("Weekly Blitz".to_string(), SwissConfig::with_rounds(rounds)).unwrap();
        let ids: Vec<Uuid> = names.iter().map(|_| Uuid::new_v4()).collect();
        for (id, name) in ids.iter().zip(names) {
            assert!(tournament.join(*id, name.to_string()).unwrap());
        }
        (tournament, ids)
    }

    fn finish_round(tournament: &mut SwissTournament, round: u32, winner_is_player1: bool) {
        let pending: Vec<(PairingId, Uuid)> = tournament
            .round_pairings(round)
            .into_iter()
            .filter(|p| !p.is_finished())
            .map(|p| (p.id, if winner_is_player1 { p.player1_id } else { p.player2_id.unwrap() }))
            .collect();
        for (id, winner) in pending {
            tournament.record_result(id, Some(winner)).unwrap();
        }
    }

    #[test]
    fn test_tournament_creation() {
        let (tournament, ids) = create_tournament(&["Alice", "Bob", "Charlie"], 5);

        assert_eq!(tournament.status, TournamentStatus::Open);
        assert_eq!(tournament.current_round, 0);
        assert_eq!(tournament.ledger().len(), 3);
        for (seed, id) in ids.iter().enumerate() {
            let participant = tournament.participant(*id).unwrap();
            assert_eq!(participant.seed, seed as u32);
            assert_eq!(participant.points, 0.0);
            assert_eq!(participant.games_played(), 0);
        }
    }

    #[test]
    fn test_rejoin_is_noop_and_leave_keeps_seeds() {
        let (mut tournament, ids) = create_tournament(&["Alice", "Bob", "Charlie"], 3);

        assert!(!tournament.join(ids[0], "Alice again".to_string()).unwrap());
        assert_eq!(tournament.participant(ids[0]).unwrap().name, "Alice");

        assert!(tournament.leave(ids[1]).unwrap());
        assert!(!tournament.leave(ids[1]).unwrap());
        let late = Uuid::new_v4();
        tournament.join(late, "Dave".to_string()).unwrap();
        assert_eq!(tournament.participant(late).unwrap().seed, 3);
    }

    #[test]
    fn test_join_after_start_is_rejected() {
        let (mut tournament, _) = create_tournament(&["Alice", "Bob"], 3);
        tournament.start().unwrap();

        let err = tournament.join(Uuid::new_v4(), "Late".to_string()).unwrap_err();
        assert!(matches!(err, TournamentError::InvalidTransition(_)));
        assert!(tournament.leave(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_max_participants() {
        init_logger();
        let config = SwissConfig {
            max_participants: Some(2),
            ..SwissConfig::default()
        };
        let mut tournament = SwissTournament::new("Capped".to_string(), config).unwrap();
        tournament.join(Uuid::new_v4(), "A".to_string()).unwrap();
        tournament.join(Uuid::new_v4(), "B".to_string()).unwrap();
        assert!(tournament.join(Uuid::new_v4(), "C".to_string()).is_err());
    }

    #[test]
    fn test_start_requires_two_participants() {
        let (mut tournament, _) = create_tournament(&["Alice"], 3);

        let err = tournament.start().unwrap_err();
        assert_eq!(err, TournamentError::InsufficientParticipants { required: 2, found: 1 });
        assert_eq!(tournament.status, TournamentStatus::Open);
        assert!(tournament.history().is_empty());
    }

    #[test]
    fn test_start_twice_is_invalid() {
        let (mut tournament, _) = create_tournament(&["Alice", "Bob"], 3);
        tournament.start().unwrap();
        assert!(matches!(tournament.start(), Err(TournamentError::InvalidTransition(_))));
    }

    #[test]
    fn test_round_one_parity() {
        for n in 2..=9 {
            let names: Vec<String> = (0..n).map(|i| format!("P{}", i)).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let (mut tournament, ids) = create_tournament(&refs, 3);
            let pairings = tournament.start().unwrap();

            let games = pairings.iter().filter(|p| !p.is_bye()).count();
            let byes = pairings.iter().filter(|p| p.is_bye()).count();
            assert_eq!(games, n / 2);
            assert_eq!(byes, n % 2);

            let mut seen = HashSet::new();
            for pairing in &pairings {
                let (p1, p2) = pairing.players();
                assert!(seen.insert(p1));
                if let Some(p2) = p2 {
                    assert!(seen.insert(p2));
                }
            }
            assert_eq!(seen.len(), ids.len());
        }
    }

    #[test]
    fn test_bye_is_immediately_scored() {
        let (mut tournament, ids) = create_tournament(&["Alice", "Bob", "Charlie"], 3);
        let pairings = tournament.start().unwrap();

        let bye = pairings.iter().find(|p| p.is_bye()).unwrap();
        assert_eq!(bye.player1_id, ids[2]);
        assert_eq!(bye.status, PairingStatus::Finished);
        assert_eq!(bye.winner_id, Some(ids[2]));
        assert!(bye.finished_at.is_some());

        let standings = tournament.standings();
        let charlie = standings.iter().find(|p| p.player_id == ids[2]).unwrap();
        assert_eq!(charlie.points, 1.0);
        assert_eq!(charlie.wins, 1);
        assert_eq!(charlie.tiebreak_score, 0.0);
    }

    #[test]
    fn test_five_player_scenario() {
        let (mut tournament, ids) = create_tournament(&["A", "B", "C", "D", "E"], 3);
        let (a, b, c, d, e) = (ids[0], ids[1], ids[2], ids[3], ids[4]);

        let round1 = tournament.start().unwrap();
        assert_eq!(
            round1.iter().map(Pairing::players).collect::<Vec<_>>(),
            vec![(a, Some(b)), (c, Some(d)), (e, None)]
        );
        assert_eq!(tournament.participant(e).unwrap().points, 1.0);

        tournament.record_result(round1[0].id, Some(a)).unwrap();
        tournament.record_result(round1[1].id, None).unwrap();

        let order: Vec<(Uuid, f32)> = tournament
            .standings()
            .iter()
            .map(|p| (p.player_id, p.points))
            .collect();
        assert_eq!(order, vec![(a, 1.0), (e, 1.0), (c, 0.5), (d, 0.5), (b, 0.0)]);
        assert_eq!(tournament.sonneborn_berger(a).unwrap(), 0.0);
        assert_eq!(tournament.sonneborn_berger(e).unwrap(), 0.0);
        assert_eq!(tournament.sonneborn_berger(c).unwrap(), 0.25);
        assert_eq!(tournament.buchholz(c).unwrap(), 0.5);

        let round2 = match tournament.advance_round().unwrap() {
            RoundAdvance::NextRound(pairings) => pairings,
            other => panic!("expected next round, got {:?}", other),
        };
        assert_eq!(
            round2.iter().map(Pairing::players).collect::<Vec<_>>(),
            vec![(a, Some(e)), (c, Some(b)), (d, None)]
        );
        assert!(!round2.iter().any(|p| p.involves(a) && p.involves(b)));
        assert!(!round2.iter().any(|p| p.is_bye() && p.player1_id == e));
        assert_eq!(tournament.current_round, 2);
    }

    #[test]
    fn test_generate_pairings_is_idempotent() {
        let (mut tournament, _) = create_tournament(&["A", "B", "C", "D", "E"], 3);
        tournament.start().unwrap();
        finish_round(&mut tournament, 1, true);

        let first = tournament.generate_pairings(2).unwrap();
        let rows = tournament.history().len();
        let second = tournament.generate_pairings(2).unwrap();

        assert!(!first.is_replay());
        assert!(second.is_replay());
        assert_eq!(first.pairings(), second.pairings());
        assert_eq!(tournament.history().len(), rows);

        let round1 = tournament.generate_pairings(1).unwrap();
        assert!(round1.is_replay());
        assert_eq!(round1.pairings().len(), 3);
    }

    #[test]
    fn test_bye_is_not_scored_twice_on_replay() {
        let (mut tournament, ids) = create_tournament(&["A", "B", "C"], 3);
        tournament.start().unwrap();
        tournament.generate_pairings(1).unwrap();
        assert_eq!(tournament.participant(ids[2]).unwrap().points, 1.0);
    }

    #[test]
    fn test_record_result_is_idempotent() {
        let (mut tournament, ids) = create_tournament(&["A", "B"], 3);
        let pairing = tournament.start().unwrap()[0].clone();

        let first = tournament.record_result(pairing.id, Some(ids[1])).unwrap();
        let snapshot: Vec<Participant> = tournament.standings().into_iter().cloned().collect();
        let second = tournament.record_result(pairing.id, Some(ids[1])).unwrap();
        let conflicting = tournament.record_result(pairing.id, None).unwrap();
        let after: Vec<Participant> = tournament.standings().into_iter().cloned().collect();

        assert!(!first.is_replay());
        assert!(second.is_replay());
        assert!(conflicting.is_replay());
        assert_eq!(conflicting.pairing().winner_id, Some(ids[1]));
        assert_eq!(snapshot, after);
        assert_eq!(tournament.participant(ids[1]).unwrap().wins, 1);
        assert_eq!(tournament.participant(ids[0]).unwrap().losses, 1);
    }

    #[test]
    fn test_record_result_errors() {
        let (mut tournament, _) = create_tournament(&["A", "B"], 3);
        let pairing = tournament.start().unwrap()[0].clone();

        assert_eq!(
            tournament.record_result(99, None).unwrap_err(),
            TournamentError::PairingNotFound(99)
        );
        let stranger = Uuid::new_v4();
        assert_eq!(
            tournament.record_result(pairing.id, Some(stranger)).unwrap_err(),
            TournamentError::WinnerNotInPairing { pairing: pairing.id, player: stranger }
        );
        assert!(!tournament.pairing(pairing.id).unwrap().is_finished());
    }

    #[test]
    fn test_out_of_order_round_is_not_ready() {
        let (mut tournament, _) = create_tournament(&["A", "B", "C", "D"], 4);
        tournament.start().unwrap();

        assert_eq!(
            tournament.generate_pairings(2).unwrap_err(),
            TournamentError::RoundNotReady { round: 2, blocking_round: 1 }
        );
        assert!(matches!(
            tournament.advance_round(),
            Err(TournamentError::RoundNotReady { .. })
        ));

        finish_round(&mut tournament, 1, true);
        assert_eq!(
            tournament.generate_pairings(3).unwrap_err(),
            TournamentError::RoundNotReady { round: 3, blocking_round: 1 }
        );
        assert!(tournament.generate_pairings(2).is_ok());
    }

    #[test]
    fn test_generate_before_start_or_out_of_range() {
        let (mut tournament, _) = create_tournament(&["A", "B"], 2);
        assert!(matches!(
            tournament.generate_pairings(1),
            Err(TournamentError::InvalidTransition(_))
        ));
        assert!(matches!(
            tournament.advance_round(),
            Err(TournamentError::InvalidTransition(_))
        ));

        tournament.start().unwrap();
        assert!(matches!(
            tournament.generate_pairings(0),
            Err(TournamentError::InvalidTransition(_))
        ));
        assert!(matches!(
            tournament.generate_pairings(3),
            Err(TournamentError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_tournament_completion() {
        let (mut tournament, ids) = create_tournament(&["A", "B", "C", "D"], 3);
        tournament.start().unwrap();

        for round in 1..=3 {
            finish_round(&mut tournament, round, true);
            let advance = tournament.advance_round().unwrap();
            if round < 3 {
                assert!(matches!(advance, RoundAdvance::NextRound(_)));
                assert_eq!(tournament.status, TournamentStatus::InProgress);
            } else {
                assert!(matches!(advance, RoundAdvance::Finished(_)));
            }
        }

        assert_eq!(tournament.status, TournamentStatus::Finished);
        assert!(tournament.finished_at.is_some());
        assert!(matches!(
            tournament.generate_pairings(4),
            Err(TournamentError::InvalidTransition(_))
        ));
        assert!(matches!(
            tournament.generate_pairings(3),
            Err(TournamentError::InvalidTransition(_))
        ));
        assert!(matches!(
            tournament.advance_round().unwrap(),
            RoundAdvance::AlreadyFinished(_)
        ));

        let winner = tournament.winner().unwrap();
        assert_eq!(winner.player_id, tournament.standings()[0].player_id);
        assert!(ids.contains(&winner.player_id));
        assert_eq!(winner.points, 3.0);
    }

    #[test]
    fn test_winner_is_none_while_running() {
        let (mut tournament, _) = create_tournament(&["A", "B"], 1);
        tournament.start().unwrap();
        assert!(tournament.winner().is_none());
    }

    #[test]
    fn test_standings_order_tiebreak_chain() {
        let mut ledger = StandingsLedger::default();
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            ledger.add(*id, format!("P{}", i));
        }
        // All on two points; later seeds carry better tie-breaks.
        for id in &ids {
            let p = ledger.get_mut(*id).unwrap();
            p.points = 2.0;
        }
        ledger.get_mut(ids[3]).unwrap().sonneborn_berger = 1.5;
        ledger.get_mut(ids[2]).unwrap().tiebreak_score = 3.0;
        ledger.get_mut(ids[1]).unwrap().wins = 2;

        let order: Vec<Uuid> = ledger.get_standings().iter().map(|p| p.player_id).collect();
        assert_eq!(order, vec![ids[3], ids[2], ids[1], ids[0]]);
        assert_eq!(ledger.rank_of(ids[0]), Some(4));
        assert_eq!(ledger.rank_of(Uuid::new_v4()), None);
    }

    #[test]
    fn test_history_queries() {
        let (mut tournament, ids) = create_tournament(&["A", "B", "C"], 3);
        tournament.start().unwrap();
        finish_round(&mut tournament, 1, true);
        tournament.advance_round().unwrap();

        assert!(tournament.has_played(ids[0], ids[1]));
        assert!(tournament.has_played(ids[1], ids[0]));
        assert!(!tournament.has_played(ids[0], ids[0]));

        let history = tournament.get_history(ids[2]).unwrap();
        assert_eq!(history[0].round, 1);
        assert!(history[0].is_bye());
        assert_eq!(history.len(), 2);
        assert!(tournament.pairing_for(ids[2], 2).is_some());
        assert!(!tournament.pending_pairings().is_empty());
        assert!(tournament.get_history(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_snapshot_round_trip_rebuilds_caches() {
        let (mut tournament, ids) = create_tournament(&["A", "B", "C", "D", "E"], 3);
        tournament.start().unwrap();
        finish_round(&mut tournament, 1, false);
        tournament.advance_round().unwrap();

        let json = tournament.to_json().unwrap();
        let restored = SwissTournament::from_json(&json).unwrap();

        assert_eq!(restored.id, tournament.id);
        assert_eq!(restored.current_round, 2);
        assert_eq!(restored.status, TournamentStatus::InProgress);
        for id in &ids {
            assert_eq!(restored.participant(*id).unwrap(), tournament.participant(*id).unwrap());
        }
    }

    #[test]
    fn test_rebuild_from_history_repairs_stale_counters() {
        let (mut tournament, ids) = create_tournament(&["A", "B", "C", "D"], 3);
        tournament.start().unwrap();
        finish_round(&mut tournament, 1, true);
        let expected: Vec<Participant> = tournament.standings().into_iter().cloned().collect();

        tournament.ledger.get_mut(ids[0]).unwrap().points = 42.0;
        tournament.ledger.get_mut(ids[3]).unwrap().sonneborn_berger = 7.0;
        tournament.rebuild_from_history().unwrap();

        let rebuilt: Vec<Participant> = tournament.standings().into_iter().cloned().collect();
        assert_eq!(rebuilt, expected);
    }
}
