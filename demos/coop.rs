//! Two players cooperating on one session, end to end

use std::sync::Arc;

use sudoku_coop::{
    MemoryProfileStore, MemorySessionStore, Profile, ProfileStore, SessionEngine,
};
use sudoku_core::Difficulty;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), sudoku_coop::SessionError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let sessions = Arc::new(MemorySessionStore::new());
    let profiles = Arc::new(MemoryProfileStore::new());
    let engine = SessionEngine::new(sessions, profiles.clone());

    // Profiles normally come from the account service; seed two players.
    profiles.put(&Profile::new("alice", "Alice")).await?;
    profiles.put(&Profile::new("bob", "Bob")).await?;

    // Alice creates a session; its id is the share code.
    let session = engine
        .create_session(Difficulty::Easy, "alice", "Alice")
        .await?;
    println!("Share code: {}", session.id);
    println!("\nPuzzle:\n{}", session.puzzle);

    // Bob follows the share code; the subscription sees the session start.
    let mut snapshots = engine.subscribe(&session.id).await?;
    let session = engine.join_session(&session.id, "bob", "Bob").await?;
    snapshots.changed().await.ok();
    println!(
        "Subscriber sees: status {}, {} players",
        snapshots.borrow().status,
        snapshots.borrow().players.len()
    );

    // A wrong guess is rejected without touching the board.
    let open = session.board.empty_positions()[0];
    let right = session.solution.get(open);
    let wrong = if right == 9 { 1 } else { right + 1 };
    let response = engine
        .submit_move(&session.id, "bob", open.row, open.col, wrong)
        .await?;
    println!(
        "Bob tries {} at ({}, {}): accepted = {}",
        wrong, open.row, open.col, response.accepted
    );

    // Fill the rest cooperatively, taking turns.
    let solution = session.solution;
    for (i, pos) in session.board.empty_positions().into_iter().enumerate() {
        let mover = if i % 2 == 0 { "alice" } else { "bob" };
        engine
            .submit_move(&session.id, mover, pos.row, pos.col, solution.get(pos))
            .await?;
    }

    let finished = engine.get_session(&session.id).await?;
    println!("\nFinal board:\n{}", finished.board);
    println!("Status: {}", finished.status);
    for player in &finished.players {
        println!("{}: {} points", player.display_name, player.score);
    }

    println!("\nLast moves:");
    for record in finished.recent_moves(5) {
        println!(
            "  {} put {} at ({}, {})",
            record.display_name, record.value, record.row, record.col
        );
    }

    println!("\nLeaderboard:");
    for profile in engine.leaderboard(10).await? {
        println!(
            "  {} - level {}, {} xp, streak {}",
            profile.display_name, profile.level, profile.experience, profile.streak
        );
    }

    Ok(())
}
