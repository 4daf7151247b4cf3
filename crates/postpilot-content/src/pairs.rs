//! Service/location pair sampling.

use rand::Rng;
use rand::rngs::StdRng;

use postpilot_types::{MAX_SERVICE_LOCATION_PAIRS, ServiceLocationPair};

/// Attempts before giving up on finding another distinct pair.
const MAX_ATTEMPTS: usize = 20;

/// Randomly pair services with locations, rejecting exact duplicates,
/// up to `min(|services|, |locations|, 4)` pairs.
///
/// The RNG is injected so callers can pin a seed for deterministic
/// tests; production seeds from entropy for content variety.
pub fn sample_pairs(
    services: &[String],
    locations: &[String],
    rng: &mut StdRng,
) -> Vec<ServiceLocationPair> {
    let target = services
        .len()
        .min(locations.len())
        .min(MAX_SERVICE_LOCATION_PAIRS);
    let mut pairs: Vec<ServiceLocationPair> = Vec::with_capacity(target);

    let mut attempts = 0;
    while pairs.len() < target && attempts < MAX_ATTEMPTS {
        attempts += 1;
        let pair = ServiceLocationPair {
            service: services[rng.gen_range(0..services.len())].clone(),
            location: locations[rng.gen_range(0..locations.len())].clone(),
        };
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pair_count_bounded_by_smaller_side() {
        let services = strings(&["Plumbing"]);
        let locations = strings(&["Tampa", "Brooksville", "Spring Hill"]);
        let mut rng = StdRng::seed_from_u64(7);
        let pairs = sample_pairs(&services, &locations, &mut rng);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].service, "Plumbing");
    }

    #[test]
    fn test_pairs_capped_at_four_and_unique() {
        let services = strings(&["A", "B", "C", "D", "E", "F"]);
        let locations = strings(&["X", "Y", "Z", "W", "V"]);
        let mut rng = StdRng::seed_from_u64(42);
        let pairs = sample_pairs(&services, &locations, &mut rng);
        assert_eq!(pairs.len(), MAX_SERVICE_LOCATION_PAIRS);
        for (i, a) in pairs.iter().enumerate() {
            for b in &pairs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_seeded_sampling_is_deterministic() {
        let services = strings(&["A", "B", "C"]);
        let locations = strings(&["X", "Y", "Z"]);
        let a = sample_pairs(&services, &locations, &mut StdRng::seed_from_u64(11));
        let b = sample_pairs(&services, &locations, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_inputs_yield_no_pairs() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(sample_pairs(&[], &strings(&["X"]), &mut rng).is_empty());
        assert!(sample_pairs(&strings(&["A"]), &[], &mut rng).is_empty());
    }
}
