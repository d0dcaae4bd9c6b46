use rand::Rng;

/// Default answer alphabet: digits, then lower- and upper-case ASCII letters.
pub const DEFAULT_ALPHABET: &str =
    "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[inline(always)]
pub(crate) fn rand_below<R: Rng + ?Sized>(rng: &mut R, bound: u32) -> u32 {
    if bound == 0 {
        0
    } else {
        rng.gen_range(0..bound)
    }
}

/// Draws `len` characters from `alphabet`, uniformly and with replacement.
///
/// `alphabet` must not be empty.
pub fn random_text<R: Rng + ?Sized>(rng: &mut R, alphabet: &[char], len: usize) -> String {
    let mut result = String::with_capacity(len);
    for _ in 0..len {
        result.push(alphabet[rng.gen_range(0..alphabet.len())]);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn length_matches() {
        let alphabet: Vec<char> = DEFAULT_ALPHABET.chars().collect();
        let mut rng = StdRng::seed_from_u64(1);
        for len in [1, 4, 6, 32] {
            let text = random_text(&mut rng, &alphabet, len);
            assert_eq!(text.chars().count(), len);
            assert!(text.chars().all(|c| alphabet.contains(&c)));
        }
    }

    #[test]
    fn single_char_alphabet() {
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(random_text(&mut rng, &['A'], 1), "A");
        assert_eq!(random_text(&mut rng, &['z'], 5), "zzzzz");
    }

    #[test]
    fn non_ascii_alphabet() {
        let alphabet = ['Ж', 'Щ', 'λ'];
        let mut rng = StdRng::seed_from_u64(3);
        let text = random_text(&mut rng, &alphabet, 10);
        assert_eq!(text.chars().count(), 10);
        assert!(text.chars().all(|c| alphabet.contains(&c)));
    }

    #[test]
    fn same_seed_same_text() {
        let alphabet: Vec<char> = DEFAULT_ALPHABET.chars().collect();
        let a = random_text(&mut StdRng::seed_from_u64(42), &alphabet, 8);
        let b = random_text(&mut StdRng::seed_from_u64(42), &alphabet, 8);
        assert_eq!(a, b);
    }

    #[test]
    fn rand_below_zero_bound() {
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(rand_below(&mut rng, 0), 0);
        assert!(rand_below(&mut rng, 3) < 3);
    }
}
