use rand::Rng;

/// Uniform index choice over `0..len`.
///
/// # Panics
/// Panics if `len` is zero.
pub(crate) fn random_index<R: Rng>(rng: &mut R, len: usize) -> usize {
    rng.gen_range(0..len)
}

/// Weighted index choice, where item `i` has weight `weights[i]`
/// and `total` is the sum of all weights. Falls back to a uniform
/// choice when the total weight is not positive.
///
/// # Panics
/// Panics if `weights` is empty.
pub(crate) fn weighted_index<R: Rng>(rng: &mut R, weights: &[f64], total: f64) -> usize {
    if !(total > 0.0) {
        return rng.gen_range(0..weights.len());
    }
    let chosen = rng.gen::<f64>() * total;
    let mut accumulated = 0.0;
    for (i, weight) in weights.iter().enumerate() {
        accumulated += weight;
        if accumulated > chosen {
            return i;
        }
    }
    weights.len() - 1
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;

    #[test]
    fn weighted_index_respects_weights() {
        // StepRng yields 0.0 from gen::<f64>, so the first
        // positively-weighted item is always chosen.
        let mut rng = StepRng::new(0, 0);
        assert_eq!(super::weighted_index(&mut rng, &[0.0, 2.0, 1.0], 3.0), 1);
    }

    #[test]
    fn weighted_index_degrades_to_uniform_on_zero_total() {
        let mut rng = StepRng::new(0, 0);
        let i = super::weighted_index(&mut rng, &[0.0, 0.0], 0.0);
        assert!(i < 2);
    }
}
