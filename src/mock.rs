use anyhow::{bail, Result};
use rand::Rng;

/// How eagerly the mocking transform flips case, in `[0, 1]`.
///
/// `0` never flips (one case for the whole line), `1` flips on every
/// letter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiversityBias(f64);

impl DiversityBias {
    pub fn new(value: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            bail!("diversity_bias must be between 0 and 1, got {}", value);
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for DiversityBias {
    fn default() -> Self {
        Self(0.6)
    }
}

/// Turn `text` into sPonGeMoCk text.
///
/// The first letter gets a random case. Each later letter flips case with
/// probability `p`, where `p` starts at the bias, resets to it after every
/// flip, and otherwise creeps towards 1 by `(1 - p) * bias`. Everything
/// that is not a letter is copied through and leaves `p` alone.
pub fn mock<R: Rng + ?Sized>(text: &str, bias: DiversityBias, rng: &mut R) -> String {
    let bias = bias.value();
    let mut out = String::with_capacity(text.len());
    let mut upper: Option<bool> = None;
    let mut swap_chance = bias;

    for c in text.chars() {
        if !c.is_alphabetic() {
            out.push(c);
            continue;
        }

        let next = match upper {
            None => rng.gen_bool(0.5),
            Some(was_upper) => {
                if rng.gen::<f64>() < swap_chance {
                    swap_chance = bias;
                    !was_upper
                } else {
                    swap_chance += (1.0 - swap_chance) * bias;
                    was_upper
                }
            }
        };
        upper = Some(next);
        out.push(with_case(c, next));
    }

    out
}

// Letters whose case mapping expands (e.g. 'ß' -> "SS") are left as-is.
fn with_case(c: char, upper: bool) -> char {
    let mapped: Vec<char> = if upper {
        c.to_uppercase().collect()
    } else {
        c.to_lowercase().collect()
    };
    match mapped.as_slice() {
        [m] => *m,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bias(value: f64) -> DiversityBias {
        DiversityBias::new(value).unwrap()
    }

    fn flips(text: &str) -> usize {
        let letters: Vec<bool> = text
            .chars()
            .filter(|c| c.is_alphabetic())
            .map(|c| c.is_uppercase())
            .collect();
        letters.windows(2).filter(|w| w[0] != w[1]).count()
    }

    #[test]
    fn test_empty_input() {
        let mut rng = StdRng::seed_from_u64(1);
        for b in [0.0, 0.3, 0.6, 1.0] {
            assert_eq!(mock("", bias(b), &mut rng), "");
        }
    }

    #[test]
    fn test_preserves_shape() {
        let input = "Fortnite is the best game ever! 100% (really)";
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = mock(input, DiversityBias::default(), &mut rng);
            assert_eq!(out.chars().count(), input.chars().count());
            for (a, b) in input.chars().zip(out.chars()) {
                if a.is_alphabetic() {
                    assert_eq!(a.to_ascii_lowercase(), b.to_ascii_lowercase());
                } else {
                    assert_eq!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_zero_bias_keeps_one_case() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = mock("Hello, World and everyone", bias(0.0), &mut rng);
            assert!(
                out == "HELLO, WORLD AND EVERYONE" || out == "hello, world and everyone",
                "unexpected output: {}",
                out
            );
        }
    }

    #[test]
    fn test_full_bias_alternates() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = mock("spongebob squarepants", bias(1.0), &mut rng);
            assert!(
                out == "sPoNgEbOb SqUaRePaNtS" || out == "SpOnGeBoB sQuArEpAnTs",
                "unexpected output: {}",
                out
            );
        }
    }

    #[test]
    fn test_higher_bias_flips_more() {
        let input = "a".repeat(2000);
        let mut rng = StdRng::seed_from_u64(7);
        let low = flips(&mock(&input, bias(0.2), &mut rng));
        let mid = flips(&mock(&input, bias(0.5), &mut rng));
        let high = flips(&mock(&input, bias(0.8), &mut rng));
        assert!(low < mid, "{} !< {}", low, mid);
        assert!(mid < high, "{} !< {}", mid, high);
    }

    #[test]
    fn test_unmappable_letters_pass_through() {
        let mut rng = StdRng::seed_from_u64(3);
        let out = mock("ßßß", bias(1.0), &mut rng);
        assert_eq!(out, "ßßß");
    }

    #[test]
    fn test_bias_range_is_validated() {
        assert!(DiversityBias::new(0.0).is_ok());
        assert!(DiversityBias::new(1.0).is_ok());
        assert!(DiversityBias::new(-0.1).is_err());
        assert!(DiversityBias::new(1.5).is_err());
        assert!(DiversityBias::new(f64::NAN).is_err());
    }
}
