//! Integration tests for the room system: registry, room actors, and the
//! game clock, all on paused Tokio time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use wordrush_protocol::{
    GameEndReason, PlayerId, RoomStatus, RoundEndReason, ServerEvent,
};
use wordrush_room::{
    GameConfig, PlayerSender, RegistryConfig, RoomError, RoomRegistry, is_valid_code,
};
use wordrush_words::{StaticWordSource, WordCache};

type Events = mpsc::UnboundedReceiver<ServerEvent>;

// =========================================================================
// Helpers
// =========================================================================

const ALICE: PlayerId = PlayerId(1);
const BOB: PlayerId = PlayerId(2);

fn registry_with(config: RegistryConfig, words: &[&str]) -> RoomRegistry<StaticWordSource> {
    let source = StaticWordSource::from_pairs(words.iter().map(|w| (*w, "a hint")));
    RoomRegistry::new(config, Arc::new(WordCache::new(source)))
}

fn registry(words: &[&str]) -> RoomRegistry<StaticWordSource> {
    registry_with(RegistryConfig::default(), words)
}

fn channel() -> (PlayerSender, Events) {
    mpsc::unbounded_channel()
}

/// Receives events until one matches `pred`, returning everything received
/// including the match.
async fn collect_until<F>(rx: &mut Events, mut pred: F) -> Vec<ServerEvent>
where
    F: FnMut(&ServerEvent) -> bool,
{
    let mut seen = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(600), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("room channel closed");
        let done = pred(&event);
        seen.push(event);
        if done {
            return seen;
        }
    }
}

fn is_game_ended(event: &ServerEvent) -> bool {
    matches!(event, ServerEvent::GameEnded { .. })
}

fn count<F: Fn(&ServerEvent) -> bool>(events: &[ServerEvent], f: F) -> usize {
    events.iter().filter(|e| f(e)).count()
}

/// Alice creates a room and Bob joins it. Returns both event streams.
async fn two_player_room(
    reg: &mut RoomRegistry<StaticWordSource>,
) -> (wordrush_room::RoomHandle, Events, Events) {
    let (alice_tx, alice_rx) = channel();
    let (bob_tx, bob_rx) = channel();
    let ticket = reg.create_room(ALICE, "Alice", alice_tx).unwrap();
    reg.join_room(BOB, ticket.room_code.as_str(), "Bob", bob_tx)
        .await
        .unwrap();
    (ticket.handle, alice_rx, bob_rx)
}

// =========================================================================
// Registry: create / join
// =========================================================================

#[tokio::test]
async fn test_create_room_makes_creator_host() {
    let mut reg = registry(&["apple"]);
    let (tx, mut rx) = channel();
    let ticket = reg.create_room(ALICE, "  Alice ", tx).unwrap();

    assert!(is_valid_code(&ticket.room_code));
    assert_eq!(reg.room_count(), 1);
    assert_eq!(reg.room_codes(), vec![ticket.room_code.clone()]);

    let events = collect_until(&mut rx, |e| matches!(e, ServerEvent::RoomState(_))).await;
    let ServerEvent::RoomState(snapshot) = &events[0] else {
        panic!("expected room_state");
    };
    assert_eq!(snapshot.status, RoomStatus::Lobby);
    assert_eq!(snapshot.host, Some(ALICE));
    assert_eq!(snapshot.players[0].nickname, "Alice");
}

#[tokio::test]
async fn test_create_room_codes_are_unique() {
    let mut reg = registry(&["apple"]);
    let mut codes = Vec::new();
    for id in 1..=20 {
        let ticket = reg
            .create_room(PlayerId(id), "Player", channel().0)
            .unwrap();
        codes.push(ticket.room_code);
    }
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), 20);
}

#[tokio::test]
async fn test_create_room_rejects_blank_nickname() {
    let mut reg = registry(&["apple"]);
    let result = reg.create_room(ALICE, "   ", channel().0);
    assert!(matches!(result, Err(RoomError::InvalidNickname)));
    assert_eq!(reg.room_count(), 0);
}

#[tokio::test]
async fn test_create_room_capacity_exceeded() {
    let config = RegistryConfig {
        max_rooms: 1,
        ..RegistryConfig::default()
    };
    let mut reg = registry_with(config, &["apple"]);
    reg.create_room(ALICE, "Alice", channel().0).unwrap();

    let result = reg.create_room(BOB, "Bob", channel().0);
    assert!(matches!(result, Err(RoomError::CapacityExceeded(1))));
    assert_eq!(reg.status().active_rooms, 1);
}

#[tokio::test]
async fn test_create_room_refused_while_paused() {
    let mut reg = registry(&["apple"]);
    reg.set_enabled(false);
    let result = reg.create_room(ALICE, "Alice", channel().0);
    assert!(matches!(result, Err(RoomError::GamePaused)));
    assert!(!reg.status().enabled);

    reg.set_enabled(true);
    assert!(reg.create_room(ALICE, "Alice", channel().0).is_ok());
}

#[tokio::test]
async fn test_player_can_only_be_in_one_room() {
    let mut reg = registry(&["apple"]);
    let ticket = reg.create_room(ALICE, "Alice", channel().0).unwrap();

    let again = reg.create_room(ALICE, "Alice", channel().0);
    assert!(matches!(again, Err(RoomError::AlreadyInRoom(ALICE, _))));
    let join = reg
        .join_room(ALICE, ticket.room_code.as_str(), "Alice2", channel().0)
        .await;
    assert!(matches!(join, Err(RoomError::AlreadyInRoom(ALICE, _))));
}

#[tokio::test]
async fn test_join_room_normalizes_code() {
    let mut reg = registry(&["apple"]);
    let ticket = reg.create_room(ALICE, "Alice", channel().0).unwrap();
    let typed = format!("  {} ", ticket.room_code.as_str().to_lowercase());

    let joined = reg.join_room(BOB, &typed, "Bob", channel().0).await.unwrap();
    assert_eq!(joined.room_code, ticket.room_code);
    assert_eq!(reg.player_room(BOB), Some(&ticket.room_code));
}

#[tokio::test]
async fn test_join_room_not_found() {
    let mut reg = registry(&["apple"]);
    let result = reg.join_room(BOB, "ZZZZZZ", "Bob", channel().0).await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[tokio::test]
async fn test_join_room_full_and_duplicate_nickname() {
    let mut reg = registry(&["apple"]);
    let ticket = reg.create_room(ALICE, "Alice", channel().0).unwrap();
    let code = ticket.room_code.as_str().to_owned();

    let dup = reg.join_room(BOB, &code, "ALICE", channel().0).await;
    assert!(matches!(dup, Err(RoomError::DuplicateNickname(_))));
    assert!(reg.player_room(BOB).is_none());

    for (id, name) in [(2, "Bob"), (3, "Carol"), (4, "Dave")] {
        reg.join_room(PlayerId(id), &code, name, channel().0)
            .await
            .unwrap();
    }
    let full = reg.join_room(PlayerId(5), &code, "Eve", channel().0).await;
    assert!(matches!(full, Err(RoomError::RoomFull(_))));

    let info = reg.room_info(&ticket.room_code).await.unwrap();
    assert_eq!(info.player_count, 4);
    assert_eq!(info.max_players, 4);
}

#[tokio::test(start_paused = true)]
async fn test_join_room_after_start_is_not_joinable() {
    let mut reg = registry(&["apple"]);
    let (handle, _a, _b) = two_player_room(&mut reg).await;
    handle.start_game(ALICE).await.unwrap();

    let code = handle.code().as_str().to_owned();
    let result = reg.join_room(PlayerId(3), &code, "Carol", channel().0).await;
    assert!(matches!(result, Err(RoomError::NotJoinable(_))));
}

#[tokio::test]
async fn test_handle_for_unknown_player() {
    let reg = registry(&["apple"]);
    assert!(matches!(
        reg.handle_for(ALICE),
        Err(RoomError::NotInRoom(ALICE))
    ));
}

// =========================================================================
// Starting a game
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_start_game_requires_host() {
    let mut reg = registry(&["apple"]);
    let (handle, _a, _b) = two_player_room(&mut reg).await;

    assert!(matches!(handle.start_game(BOB).await, Err(RoomError::NotHost)));
    handle.start_game(ALICE).await.unwrap();
    assert!(matches!(
        handle.start_game(ALICE).await,
        Err(RoomError::AlreadyStarted)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_start_game_refused_while_paused() {
    let mut reg = registry(&["apple"]);
    let (handle, _a, _b) = two_player_room(&mut reg).await;

    reg.gate().set_enabled(false);
    assert!(matches!(
        handle.start_game(ALICE).await,
        Err(RoomError::GamePaused)
    ));
    assert_eq!(handle.info().await.unwrap().status, RoomStatus::Lobby);
}

#[tokio::test(start_paused = true)]
async fn test_supply_failure_keeps_room_in_lobby() {
    let mut reg = registry(&[]);
    let (handle, _a, _b) = two_player_room(&mut reg).await;

    let result = handle.start_game(ALICE).await;
    assert!(matches!(result, Err(RoomError::Supply(_))));
    assert_eq!(handle.info().await.unwrap().status, RoomStatus::Lobby);

    // The room is still usable.
    assert!(matches!(
        handle.start_game(BOB).await,
        Err(RoomError::NotHost)
    ));
}

// =========================================================================
// Playing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_five_words_no_guesses_runs_six_rounds_then_time_up() {
    let mut reg = registry(&["apple", "kite", "moon", "lamp", "rose"]);
    let (handle, mut alice_rx, _bob_rx) = two_player_room(&mut reg).await;

    let started = Instant::now();
    handle.start_game(ALICE).await.unwrap();
    let events = collect_until(&mut alice_rx, is_game_ended).await;

    assert_eq!(Instant::now() - started, Duration::from_secs(180));
    assert_eq!(
        count(&events, |e| matches!(e, ServerEvent::RoundStarted { .. })),
        6
    );
    assert_eq!(
        count(&events, |e| matches!(
            e,
            ServerEvent::RoundEnded {
                reason: RoundEndReason::TimedOut,
                ..
            }
        )),
        5
    );

    let Some(ServerEvent::GameEnded {
        reason,
        rankings,
        winner_ids,
    }) = events.last()
    else {
        panic!("expected game_ended last");
    };
    assert_eq!(*reason, GameEndReason::TimeUp);
    assert_eq!(rankings.len(), 2);
    assert!(rankings.iter().all(|p| p.score == 0));
    assert_eq!(winner_ids, &vec![ALICE, BOB]);
    assert_eq!(handle.info().await.unwrap().status, RoomStatus::Finished);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_report_remaining_game_time() {
    let mut reg = registry(&["apple"]);
    let (handle, mut alice_rx, _bob_rx) = two_player_room(&mut reg).await;
    handle.start_game(ALICE).await.unwrap();

    let events = collect_until(&mut alice_rx, |e| matches!(e, ServerEvent::Tick { .. })).await;
    assert_eq!(
        events.last(),
        Some(&ServerEvent::Tick {
            remaining_ms: 179_000
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_correct_guess_scores_and_ends_round() {
    let mut reg = registry(&["apple", "kite"]);
    let (handle, mut alice_rx, _bob_rx) = two_player_room(&mut reg).await;
    handle.start_game(ALICE).await.unwrap();

    let events = collect_until(&mut alice_rx, |e| {
        matches!(e, ServerEvent::RoundStarted { .. })
    })
    .await;
    let Some(ServerEvent::RoundStarted { masked_word, .. }) = events.last() else {
        panic!("expected round_started");
    };
    let word = if masked_word.starts_with('A') { "apple" } else { "kite" };

    tokio::time::sleep(Duration::from_secs(10)).await;
    handle.submit_guess(BOB, format!("  {} ", word.to_uppercase())).await.unwrap();

    let events = collect_until(&mut alice_rx, |e| {
        matches!(e, ServerEvent::RoundEnded { .. })
    })
    .await;
    let Some(ServerEvent::RoundEnded {
        reason,
        word: solved,
        winner,
        points_awarded,
    }) = events.last()
    else {
        panic!("expected round_ended");
    };
    assert_eq!(*reason, RoundEndReason::Guessed);
    assert_eq!(solved, word);
    assert_eq!(winner.as_ref().unwrap().player_id, BOB);
    assert_eq!(winner.as_ref().unwrap().nickname, "Bob");
    assert_eq!(*points_awarded, 67);

    let snapshot = handle.snapshot().await.unwrap();
    let bob = snapshot.players.iter().find(|p| p.id == BOB).unwrap();
    assert_eq!(bob.score, 67);
}

#[tokio::test(start_paused = true)]
async fn test_simultaneous_correct_guesses_only_first_counts() {
    let mut reg = registry(&["apple"]);
    let (handle, mut alice_rx, _bob_rx) = two_player_room(&mut reg).await;
    handle.start_game(ALICE).await.unwrap();

    handle.submit_guess(ALICE, "apple".into()).await.unwrap();
    handle.submit_guess(BOB, "apple".into()).await.unwrap();

    let events = collect_until(&mut alice_rx, is_game_ended).await;
    assert_eq!(
        count(&events, |e| matches!(e, ServerEvent::RoundEnded { .. })),
        1
    );
    let Some(ServerEvent::GameEnded {
        reason, winner_ids, ..
    }) = events.last()
    else {
        panic!("expected game_ended");
    };
    assert_eq!(*reason, GameEndReason::WordPoolExhausted);
    assert_eq!(winner_ids, &vec![ALICE]);

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.players[0].score, 100);
    assert_eq!(snapshot.players[1].score, 0);
    while let Ok(event) = alice_rx.try_recv() {
        assert!(!matches!(event, ServerEvent::RoundEnded { .. }));
    }
}

#[tokio::test(start_paused = true)]
async fn test_round_times_out_without_winner() {
    let mut reg = registry(&["apple", "kite"]);
    let (handle, mut alice_rx, _bob_rx) = two_player_room(&mut reg).await;

    let started = Instant::now();
    handle.start_game(ALICE).await.unwrap();
    let events = collect_until(&mut alice_rx, |e| {
        matches!(e, ServerEvent::RoundEnded { .. })
    })
    .await;

    assert_eq!(Instant::now() - started, Duration::from_secs(30));
    assert!(matches!(
        events.last(),
        Some(ServerEvent::RoundEnded {
            reason: RoundEndReason::TimedOut,
            winner: None,
            points_awarded: 0,
            ..
        })
    ));
    assert_eq!(
        count(&events, |e| matches!(e, ServerEvent::Tick { .. })),
        30
    );
}

// =========================================================================
// Disconnects and cleanup
// =========================================================================

#[tokio::test]
async fn test_lobby_host_leaving_hands_over_host() {
    let mut reg = registry(&["apple"]);
    let (handle, _alice_rx, mut bob_rx) = two_player_room(&mut reg).await;

    assert!(!reg.disconnect(ALICE).await);
    let events = collect_until(&mut bob_rx, |e| {
        matches!(e, ServerEvent::RoomState(s) if s.players.len() == 1)
    })
    .await;
    let Some(ServerEvent::RoomState(snapshot)) = events.last() else {
        panic!("expected room_state");
    };
    assert_eq!(snapshot.host, Some(BOB));

    assert!(reg.disconnect(BOB).await);
    assert_eq!(reg.room_count(), 0);
    assert!(matches!(
        handle.info().await,
        Err(RoomError::Unavailable(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_mid_game_disconnect_keeps_player_offline() {
    let mut reg = registry(&["apple"]);
    let (handle, mut alice_rx, _bob_rx) = two_player_room(&mut reg).await;
    handle.start_game(ALICE).await.unwrap();

    assert!(!reg.disconnect(BOB).await);
    let events = collect_until(&mut alice_rx, |e| {
        matches!(e, ServerEvent::RoomState(s) if s.players.iter().any(|p| !p.connected))
    })
    .await;
    let Some(ServerEvent::RoomState(snapshot)) = events.last() else {
        panic!("expected room_state");
    };
    assert_eq!(snapshot.status, RoomStatus::InGame);
    assert_eq!(snapshot.players.len(), 2);

    let info = handle.info().await.unwrap();
    assert_eq!(info.connected_count, 1);
    assert!(reg.player_room(BOB).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_all_players_leaving_destroys_room() {
    let mut reg = registry(&["apple"]);
    let (handle, _alice_rx, _bob_rx) = two_player_room(&mut reg).await;
    handle.start_game(ALICE).await.unwrap();

    assert!(!reg.disconnect(ALICE).await);
    assert!(reg.disconnect(BOB).await);
    assert_eq!(reg.room_count(), 0);
    assert!(matches!(
        handle.info().await,
        Err(RoomError::Unavailable(_))
    ));

    // No stray timer wakes up a destroyed room.
    tokio::time::sleep(Duration::from_secs(200)).await;
    assert_eq!(reg.room_count(), 0);
}

#[tokio::test]
async fn test_disconnect_unknown_player_is_noop() {
    let mut reg = registry(&["apple"]);
    assert!(!reg.disconnect(ALICE).await);
}

// =========================================================================
// Play again
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_play_again_returns_to_lobby_and_restarts() {
    let mut reg = registry(&["apple"]);
    let (handle, mut alice_rx, _bob_rx) = two_player_room(&mut reg).await;

    assert!(matches!(
        handle.play_again(ALICE).await,
        Err(RoomError::NotFinished)
    ));

    handle.start_game(ALICE).await.unwrap();
    handle.submit_guess(BOB, "apple".into()).await.unwrap();
    collect_until(&mut alice_rx, is_game_ended).await;

    assert!(matches!(
        handle.play_again(BOB).await,
        Err(RoomError::NotHost)
    ));
    handle.play_again(ALICE).await.unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.status, RoomStatus::Lobby);
    assert!(snapshot.players.iter().all(|p| p.score == 0));

    handle.start_game(ALICE).await.unwrap();
    assert_eq!(handle.info().await.unwrap().status, RoomStatus::InGame);
}

#[tokio::test(start_paused = true)]
async fn test_game_end_hands_host_to_connected_player() {
    let config = RegistryConfig {
        game: GameConfig {
            game_duration: Duration::from_secs(60),
            ..GameConfig::default()
        },
        ..RegistryConfig::default()
    };
    let mut reg = registry_with(config, &["apple", "kite"]);
    let (handle, _alice_rx, mut bob_rx) = two_player_room(&mut reg).await;
    handle.start_game(ALICE).await.unwrap();
    reg.disconnect(ALICE).await;

    let events = collect_until(&mut bob_rx, is_game_ended).await;
    assert!(matches!(
        events.last(),
        Some(ServerEvent::GameEnded {
            reason: GameEndReason::TimeUp,
            ..
        })
    ));

    handle.play_again(BOB).await.unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.host, Some(BOB));
    assert_eq!(snapshot.players.len(), 1);
}
