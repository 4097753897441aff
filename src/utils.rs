use rand::Rng;

/// Draw one category from a weighted discrete distribution.
///
/// `choices` pairs each category with its relative weight. Weights must be
/// non-negative and sum to a positive total; relative weights are enough,
/// they do not have to sum to 1. Consumes exactly one uniform draw from
/// `rng`, keeping the generator's draw sequence reproducible.
pub fn weighted_choice<'a, T, R: Rng + ?Sized>(rng: &mut R, choices: &'a [(T, f64)]) -> Result<&'a T, String> {
    let total: f64 = choices.iter().map(|(_, w)| w).sum();
    if choices.is_empty() || choices.iter().any(|(_, w)| !w.is_finite() || *w < 0.0) || total <= 0.0 {
        return Err("weighted choice requires non-negative weights with a positive sum".to_string());
    }

    let roll = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (category, weight) in choices {
        cumulative += weight;
        if roll < cumulative {
            return Ok(category);
        }
    }

    // Floating-point accumulation can leave `roll` a hair past the final
    // edge; the last positively-weighted category owns that edge.
    choices
        .iter()
        .rev()
        .find(|(_, w)| *w > 0.0)
        .map(|(category, _)| category)
        .ok_or_else(|| "weighted choice requires at least one positive weight".to_string())
}

/// Round to a fixed number of decimal places, half away from zero.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn zero_weight_categories_are_never_drawn() {
        let mut rng = SmallRng::seed_from_u64(7);
        let choices = [("never", 0.0), ("always", 1.0)];
        for _ in 0..200 {
            assert_eq!(*weighted_choice(&mut rng, &choices).unwrap(), "always");
        }
    }

    #[test]
    fn single_category_is_returned() {
        let mut rng = SmallRng::seed_from_u64(7);
        let choices = [(42, 0.25)];
        assert_eq!(*weighted_choice(&mut rng, &choices).unwrap(), 42);
    }

    #[test]
    fn all_positive_categories_are_reachable() {
        let mut rng = SmallRng::seed_from_u64(7);
        let choices = [("a", 0.5), ("b", 0.5)];
        let mut seen_a = false;
        let mut seen_b = false;
        for _ in 0..200 {
            match *weighted_choice(&mut rng, &choices).unwrap() {
                "a" => seen_a = true,
                "b" => seen_b = true,
                other => panic!("unexpected category {}", other),
            }
        }
        assert!(seen_a && seen_b);
    }

    #[test]
    fn degenerate_weight_sets_are_rejected() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert!(weighted_choice::<&str, _>(&mut rng, &[]).is_err());
        assert!(weighted_choice(&mut rng, &[("a", 0.0)]).is_err());
        assert!(weighted_choice(&mut rng, &[("a", -1.0), ("b", 2.0)]).is_err());
        assert!(weighted_choice(&mut rng, &[("a", f64::NAN)]).is_err());
    }

    #[test]
    fn rounding_half_away_from_zero() {
        assert_eq!(round_to(123.4567, 2), 123.46);
        assert_eq!(round_to(64.66666, 1), 64.7);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
    }
}
