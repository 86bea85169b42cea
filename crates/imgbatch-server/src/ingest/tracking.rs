//! Batch tracking ids
//!
//! A tracking id is `req` followed by a five-digit number. Ids are not
//! checked for uniqueness; two batches drawing the same number share a
//! status lookup.

use rand::Rng;

pub const TRACKING_ID_PREFIX: &str = "req";

const TRACKING_NUMBER_MIN: u32 = 10_000;
const TRACKING_NUMBER_MAX: u32 = 99_999;

/// Draw a fresh tracking id from the thread-local generator
pub fn generate_tracking_id() -> String {
    generate_tracking_id_with(&mut rand::thread_rng())
}

pub fn generate_tracking_id_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let number = rng.gen_range(TRACKING_NUMBER_MIN..=TRACKING_NUMBER_MAX);
    format!("{TRACKING_ID_PREFIX}{number}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_well_formed(id: &str) {
        let digits = id.strip_prefix(TRACKING_ID_PREFIX).unwrap();
        assert_eq!(digits.len(), 5, "unexpected id {id}");
        let number: u32 = digits.parse().unwrap();
        assert!((TRACKING_NUMBER_MIN..=TRACKING_NUMBER_MAX).contains(&number));
    }

    #[test]
    fn test_generated_ids_are_well_formed() {
        for _ in 0..1_000 {
            assert_well_formed(&generate_tracking_id());
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = generate_tracking_id_with(&mut StdRng::seed_from_u64(7));
        let b = generate_tracking_id_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_well_formed(&a);
    }
}
