use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

/// Challenges not answered within this window are dropped.
const CHALLENGE_TTL: Duration = Duration::from_secs(10 * 60);

/// A math question handed to the client before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeView {
    pub challenge_id: String,
    pub question: String,
}

#[derive(Debug)]
struct OpenChallenge {
    answer: i64,
    issued_at: Instant,
}

/// Issues and verifies single-use math challenges.
///
/// A challenge is consumed on its first verification attempt; a wrong answer
/// therefore always forces the client onto a fresh question. Issuance is
/// unauthenticated, so unanswered challenges carry a TTL and expired entries
/// are swept on every issue and verify to keep the store bounded.
#[derive(Debug)]
pub struct ChallengeStore {
    open: Mutex<HashMap<String, OpenChallenge>>,
    ttl: Duration,
}

impl Default for ChallengeStore {
    fn default() -> Self {
        Self::with_ttl(CHALLENGE_TTL)
    }
}

impl ChallengeStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            open: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn issue(&self) -> ChallengeView {
        let (question, answer) = generate(&mut rand::thread_rng());
        let id = Uuid::new_v4().to_string();
        let mut guard = self.open.lock().expect("challenge mutex poisoned");
        sweep(&mut guard, self.ttl);
        guard.insert(
            id.clone(),
            OpenChallenge {
                answer,
                issued_at: Instant::now(),
            },
        );
        ChallengeView {
            challenge_id: id,
            question,
        }
    }

    /// Consume the challenge and compare the typed answer against the
    /// precomputed result. Unknown, already-used, or expired ids fail.
    pub fn verify(&self, challenge_id: &str, answer: &str) -> bool {
        let expected = {
            let mut guard = self.open.lock().expect("challenge mutex poisoned");
            sweep(&mut guard, self.ttl);
            guard.remove(challenge_id)
        };
        match (expected, answer.trim().parse::<i64>()) {
            (Some(open), Ok(given)) => {
                open.issued_at.elapsed() < self.ttl && open.answer == given
            }
            _ => false,
        }
    }

    #[cfg(test)]
    fn open_count(&self) -> usize {
        self.open.lock().expect("challenge mutex poisoned").len()
    }
}

fn sweep(open: &mut HashMap<String, OpenChallenge>, ttl: Duration) {
    open.retain(|_, challenge| challenge.issued_at.elapsed() < ttl);
}

fn generate<R: Rng>(rng: &mut R) -> (String, i64) {
    let a = rng.gen_range(1..=20i64);
    let b = rng.gen_range(1..=10i64);
    if rng.gen_bool(0.5) {
        (format!("{a} + {b}"), a + b)
    } else {
        // Keep subtraction results non-negative.
        let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
        (format!("{hi} - {lo}"), hi - lo)
    }
}
