use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Characters a tracking code suffix is drawn from.
pub const TRACKING_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const TRACKING_SUFFIX_LEN: usize = 8;

pub const DEFAULT_TRACKING_PREFIX: &str = "DSP";

/// Opaque identifier handed back to the caller with each receipt.
///
/// Format: `<PREFIX>-<8 chars from A-Z0-9>`. Codes are random, never stored and
/// never checked for collisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingCode(String);

impl TrackingCode {
    /// Draw a fresh code, each suffix character uniform over [`TRACKING_ALPHABET`].
    pub fn generate<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> Self {
        let suffix: String = (0..TRACKING_SUFFIX_LEN)
            .map(|_| TRACKING_ALPHABET[rng.gen_range(0..TRACKING_ALPHABET.len())] as char)
            .collect();
        Self(format!("{}-{}", prefix, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The random part after the last `-`.
    pub fn suffix(&self) -> &str {
        self.0.rsplit('-').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where tracking codes come from. Injected into the request handler so tests
/// can pin the random stream.
pub trait TrackingCodeSource: Send + Sync {
    fn next_code(&self) -> TrackingCode;
}

/// Production source backed by the thread-local RNG.
#[derive(Debug, Clone)]
pub struct RandomCodeSource {
    prefix: String,
}

impl RandomCodeSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for RandomCodeSource {
    fn default() -> Self {
        Self::new(DEFAULT_TRACKING_PREFIX)
    }
}

impl TrackingCodeSource for RandomCodeSource {
    fn next_code(&self) -> TrackingCode {
        TrackingCode::generate(&self.prefix, &mut rand::thread_rng())
    }
}

/// Reproducible source: same seed, same sequence of codes.
pub struct SeededCodeSource {
    prefix: String,
    rng: Mutex<StdRng>,
}

impl SeededCodeSource {
    pub fn new(prefix: impl Into<String>, seed: u64) -> Self {
        Self {
            prefix: prefix.into(),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl TrackingCodeSource for SeededCodeSource {
    fn next_code(&self) -> TrackingCode {
        // A poisoned lock still holds a usable RNG state.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        TrackingCode::generate(&self.prefix, &mut *rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn assert_well_formed(code: &TrackingCode) {
        let raw = code.as_str();
        assert_eq!(raw.len(), 12, "unexpected length for {}", raw);
        assert!(raw.starts_with("DSP-"));
        assert!(raw[4..]
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
    }

    #[test]
    fn test_generated_codes_are_well_formed() {
        let source = RandomCodeSource::default();
        for _ in 0..500 {
            assert_well_formed(&source.next_code());
        }
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let a = SeededCodeSource::new("DSP", 7);
        let b = SeededCodeSource::new("DSP", 7);

        for _ in 0..10 {
            let code = a.next_code();
            assert_well_formed(&code);
            assert_eq!(code, b.next_code());
        }
    }

    #[test]
    fn test_suffix_characters_cover_alphabet_uniformly() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts: HashMap<char, usize> = HashMap::new();
        let trials = 10_000;

        for _ in 0..trials {
            let code = TrackingCode::generate("DSP", &mut rng);
            for c in code.suffix().chars() {
                *counts.entry(c).or_default() += 1;
            }
        }

        assert_eq!(counts.len(), TRACKING_ALPHABET.len());

        // 80k draws over 36 symbols: ~2222 each, sd ~46.
        let expected = (trials * TRACKING_SUFFIX_LEN) as f64 / TRACKING_ALPHABET.len() as f64;
        for (c, count) in counts {
            let ratio = count as f64 / expected;
            assert!(
                (0.8..1.2).contains(&ratio),
                "character {} drawn {} times (expected ~{:.0})",
                c,
                count,
                expected
            );
        }
    }

    #[test]
    fn test_suffix_strips_prefix() {
        let code = TrackingCode::generate("DSP", &mut StdRng::seed_from_u64(11));
        assert_eq!(code.suffix().len(), TRACKING_SUFFIX_LEN);
        assert_eq!(code.as_str(), format!("DSP-{}", code.suffix()));
    }
}
