//! Plays one scripted round against the in-memory collaborators.
//!
//! ```text
//! RUST_LOG=debug cargo run -p console-round -- 7
//! ```
//!
//! The optional argument seeds the engine; the same seed plays the same
//! round.

use spyglass::prelude::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const GROUP: GroupId = GroupId(-100_200_300);
const PLAYERS: [i64; 6] = [101, 102, 103, 104, 105, 106];

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .init();
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

async fn play(
    engine: &GameEngine<InMemorySessionStore, InMemoryCatalog>,
) -> Result<(), SpyglassError> {
    let settings = GameSettings::new(4, 10, 20, "en")?;

    let session = engine.create_session(GROUP).await?;
    let session_id = session.id();
    for id in PLAYERS {
        engine.join(session_id, UserId(id), &settings).await?;
    }
    // Someone tries to join twice; the engine says no.
    if let Err(e) = engine.join(session_id, UserId(PLAYERS[0]), &settings).await {
        tracing::warn!(kind = %e.kind(), "rejected: {e}");
    }
    engine.pass(session_id, UserId(PLAYERS[5]));

    let round = engine.start_round(session_id, &settings).await?;
    tracing::info!(
        location = round.location.name(settings.language()),
        spies = ?round.spies,
        order = ?round.turn_order,
        "round dealt"
    );

    for &player in &round.turn_order {
        let card = engine.reveal_role(session_id, player, settings.language()).await?;
        tracing::info!(%player, ?card, "role revealed");
    }

    // One lap of questions.
    for _ in 0..round.turn_order.len() {
        let next = engine.advance_turn(session_id).await?;
        tracing::info!(%next, "turn");
    }

    // The first spy takes a near miss at the location, then everyone
    // votes for the player after them in the turn order.
    let spy = round.spies[0];
    let near_miss = misspell(round.location.name(settings.language()));
    let guess = engine
        .submit_guess(session_id, spy, &near_miss, settings.language())
        .await?;
    tracing::info!(
        %spy,
        guess = %near_miss,
        verdict = ?guess.verdict,
        similarity = guess.similarity,
        "spy guessed"
    );
    if guess.verdict.ends_session() {
        return Ok(());
    }

    let order = &round.turn_order;
    for (i, &voter) in order.iter().enumerate() {
        let accused = order[(i + 1) % order.len()];
        let receipt = engine.cast_vote(session_id, voter, accused).await?;
        if let Some(resolution) = receipt.resolution {
            tracing::info!(
                tally = ?resolution.tally,
                outcome = ?resolution.outcome,
                "votes resolved"
            );
        }
    }

    let finished = engine.session(session_id).await?;
    tracing::info!(status = %finished.status(), "round over");
    Ok(())
}

/// Swaps the last two characters, e.g. "Bank" -> "Bakn".
fn misspell(name: &str) -> String {
    let mut chars: Vec<char> = name.chars().collect();
    let n = chars.len();
    if n >= 2 {
        chars.swap(n - 1, n - 2);
    }
    chars.into_iter().collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut builder = GameEngineBuilder::new();
    if let Some(seed) = std::env::args().nth(1) {
        builder = builder.seed(seed.parse()?);
    }
    let engine = builder.build(InMemorySessionStore::new(), InMemoryCatalog::with_defaults());

    play(&engine).await?;
    Ok(())
}
