use level_core::{
    GenerationConfig, GenerationError, Level, Pattern, derive_attempt_seed, generate_level,
};

const ATTEMPTS: u64 = 8;

/// First derived seed whose pattern phase completes, with its level.
fn generate(base: &GenerationConfig, seed: u64) -> (u64, Level) {
    for attempt in 0..ATTEMPTS {
        let derived = derive_attempt_seed(seed, attempt);
        let config = GenerationConfig { seed: Some(derived), ..base.clone() };
        match generate_level(&config) {
            Ok(level) => return (derived, level),
            Err(GenerationError::Pattern { .. } | GenerationError::NoGrowthEdge(_)) => continue,
            Err(error) => panic!("seed {seed}: {error}"),
        }
    }
    panic!("seed {seed}: every attempt failed")
}

fn level_signature(seed: u64) -> (u64, Vec<Pattern>, Vec<u8>) {
    let (derived, level) = generate(&GenerationConfig::default(), seed);
    (derived, level.generated.applied, level.drawing.canonical_bytes())
}

#[test]
fn test_determinism_identical_seeds_produce_same_drawing() {
    for seed in [1, 12345, u64::MAX] {
        let first = level_signature(seed);
        assert!(!first.1.is_empty(), "seed {seed} should apply patterns");
        assert_eq!(first, level_signature(seed), "seed {seed} must reproduce the same level");
    }
}

#[test]
fn test_determinism_different_seeds_produce_different_levels() {
    let signatures: Vec<_> = (100..110).map(level_signature).collect();
    assert!(
        signatures.windows(2).any(|pair| pair[0] != pair[1]),
        "different seeds should probably produce different levels"
    );
}

#[test]
fn test_determinism_fingerprint_is_stable_across_runs() {
    let config = GenerationConfig { pattern_count: 3, ..Default::default() };
    let (first_seed, first) = generate(&config, 7);
    let (second_seed, second) = generate(&config, 7);
    assert_eq!(first_seed, second_seed);
    assert_eq!(first.drawing.fingerprint(), second.drawing.fingerprint());
}
