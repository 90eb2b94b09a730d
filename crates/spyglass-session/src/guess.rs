//! The spy's location guess.
//!
//! Free-text guesses are scored against the true location name on a
//! 0–100 scale and sorted into three bands:
//!
//! ```text
//!   0 ──────────── 69 │ 70 ─────── 84 │ 85 ──────── 100
//!        Wrong        │     Close     │     Correct
//!   (spy loses, end)  │ (try again)   │  (spy wins, end)
//! ```

use chrono::{DateTime, Utc};
use spyglass_protocol::{GuessResult, GuessVerdict, SessionStatus, UserId};

use crate::{Session, SessionError};

/// Lowest similarity that counts as a correct guess.
pub const CORRECT_THRESHOLD: u8 = 85;

/// Lowest similarity that counts as a close guess.
pub const CLOSE_THRESHOLD: u8 = 70;

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Scores how similar two strings are.
///
/// Implementations must return 0–100, be symmetric, ignore case, and give
/// 100 for identical inputs.
pub trait SimilarityScorer: Send + Sync {
    fn score(&self, guess: &str, target: &str) -> u8;
}

/// Normalized Levenshtein similarity: `100 × (1 − distance / longer length)`,
/// truncated, after trimming and lowercasing both sides.
///
/// Truncation keeps a score below a band threshold from being reported at
/// the threshold: 84.6 is 84, not 85. Integer arithmetic keeps exact
/// ratios such as 17/20 at exactly 85.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinScorer;

impl SimilarityScorer for LevenshteinScorer {
    fn score(&self, guess: &str, target: &str) -> u8 {
        let guess = guess.trim().to_lowercase();
        let target = target.trim().to_lowercase();
        let longest = guess.chars().count().max(target.chars().count());
        if longest == 0 {
            return 100;
        }
        let distance = strsim::levenshtein(&guess, &target).min(longest);
        let percent = 100 * (longest - distance) / longest;
        u8::try_from(percent).unwrap_or(100)
    }
}

/// Sorts a similarity score into its band.
pub fn classify(similarity: u8) -> GuessVerdict {
    if similarity >= CORRECT_THRESHOLD {
        GuessVerdict::Correct
    } else if similarity >= CLOSE_THRESHOLD {
        GuessVerdict::Close
    } else {
        GuessVerdict::Wrong
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

impl Session {
    /// Scores a spy's guess against the location name in `language`.
    ///
    /// A correct or wrong guess finishes the session and reveals the
    /// location. A close guess changes nothing.
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] unless InProgress
    /// - [`SessionError::NotInRoster`] if `user_id` isn't playing
    /// - [`SessionError::NotSpy`] if `user_id` isn't a spy
    pub fn submit_guess(
        &mut self,
        user_id: UserId,
        guess: &str,
        language: &str,
        scorer: &dyn SimilarityScorer,
        now: DateTime<Utc>,
    ) -> Result<GuessResult, SessionError> {
        self.require(SessionStatus::InProgress, "guess the location")?;
        let entry = self
            .entry(user_id)
            .ok_or(SessionError::NotInRoster(user_id))?;
        if !entry.is_spy {
            return Err(SessionError::NotSpy(user_id));
        }
        let location = self
            .location()
            .cloned()
            .ok_or_else(|| self.invalid("guess without a location"))?;

        let similarity = scorer.score(guess, location.name(language));
        let verdict = classify(similarity);

        let revealed = if verdict.ends_session() {
            self.mark_finished(now);
            Some(location)
        } else {
            None
        };

        Ok(GuessResult {
            verdict,
            similarity,
            revealed,
        })
    }
}
