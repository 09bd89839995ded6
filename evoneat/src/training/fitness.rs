use crate::training::NegativeFitnessError;

use serde::{Deserialize, Serialize};

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A genome's score: one primary value, plus any number of secondary
/// tie-breaker values.
///
/// Fitness values form a total order. The primary scores are compared
/// first; ties fall through to the secondary scores element-wise, and
/// if one value simply has more secondary scores than the other, the
/// longer one wins. Scores must be non-negative and non-NaN.
///
/// # Examples
/// ```
/// use evoneat::Fitness;
///
/// let survived_longer = Fitness::with_secondary(10.0, vec![3.0, 7.0]).unwrap();
/// let died_early = Fitness::with_secondary(10.0, vec![3.0, 2.0]).unwrap();
/// assert!(survived_longer > died_early);
///
/// // A higher primary score beats any secondary scores.
/// let outscored = Fitness::new(11.0).unwrap();
/// assert!(outscored > survived_longer);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fitness {
    primary: f64,
    secondary: Vec<f64>,
}

impl Fitness {
    /// Creates a fitness with only a primary score.
    pub fn new(primary: f64) -> Result<Fitness, NegativeFitnessError> {
        Fitness::with_secondary(primary, Vec::new())
    }

    /// Creates a fitness with a primary score and ordered
    /// secondary tie-breaker scores.
    pub fn with_secondary(
        primary: f64,
        secondary: Vec<f64>,
    ) -> Result<Fitness, NegativeFitnessError> {
        if primary < 0.0 {
            return Err(NegativeFitnessError(primary));
        }
        if let Some(&bad) = secondary.iter().find(|&&s| s < 0.0) {
            return Err(NegativeFitnessError(bad));
        }
        Ok(Fitness { primary, secondary })
    }

    /// The zero fitness, which every other fitness outranks.
    pub const fn zero() -> Fitness {
        Fitness {
            primary: 0.0,
            secondary: Vec::new(),
        }
    }

    /// Returns the primary score.
    pub fn score(&self) -> f64 {
        self.primary
    }

    /// Returns the secondary tie-breaker scores.
    pub fn secondary_scores(&self) -> &[f64] {
        &self.secondary
    }

    /// Totally orders two fitness values: by primary score, then by
    /// each secondary score in turn, then by secondary score count.
    ///
    /// # Panics
    /// Panics if a NaN score is encountered.
    pub fn compare(&self, other: &Fitness) -> Ordering {
        match cmp_score(self.primary, other.primary) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        for (a, b) in self.secondary.iter().zip(&other.secondary) {
            match cmp_score(*a, *b) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        self.secondary.len().cmp(&other.secondary.len())
    }

    /// Returns the greater of two fitness values.
    pub fn max(a: Fitness, b: Fitness) -> Fitness {
        if a.compare(&b) == Ordering::Less {
            b
        } else {
            a
        }
    }

    /// Returns the lesser of two fitness values.
    pub fn min(a: Fitness, b: Fitness) -> Fitness {
        if a.compare(&b) == Ordering::Greater {
            b
        } else {
            a
        }
    }
}

fn cmp_score(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b)
        .expect("uncomparable fitness value detected (NaN)")
}

impl PartialEq for Fitness {
    fn eq(&self, other: &Fitness) -> bool {
        self.primary == other.primary && self.secondary == other.secondary
    }
}

impl PartialOrd for Fitness {
    fn partial_cmp(&self, other: &Fitness) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

/// Combines two fitness values score-wise. The shorter secondary
/// sequence is padded with zeros.
impl Add for Fitness {
    type Output = Fitness;

    fn add(self, rhs: Fitness) -> Fitness {
        merge(self, rhs, |a, b| a + b)
    }
}

impl Sub for Fitness {
    type Output = Fitness;

    fn sub(self, rhs: Fitness) -> Fitness {
        merge(self, rhs, |a, b| a - b)
    }
}

impl Mul<f64> for Fitness {
    type Output = Fitness;

    fn mul(mut self, rhs: f64) -> Fitness {
        self.primary *= rhs;
        for s in &mut self.secondary {
            *s *= rhs;
        }
        self
    }
}

impl Div<f64> for Fitness {
    type Output = Fitness;

    fn div(self, rhs: f64) -> Fitness {
        self * (1.0 / rhs)
    }
}

impl Neg for Fitness {
    type Output = Fitness;

    fn neg(self) -> Fitness {
        self * -1.0
    }
}

fn merge(mut a: Fitness, mut b: Fitness, op: impl Fn(f64, f64) -> f64) -> Fitness {
    let len = a.secondary.len().max(b.secondary.len());
    a.secondary.resize(len, 0.0);
    b.secondary.resize(len, 0.0);
    Fitness {
        primary: op(a.primary, b.primary),
        secondary: a
            .secondary
            .iter()
            .zip(&b.secondary)
            .map(|(&x, &y)| op(x, y))
            .collect(),
    }
}

impl fmt::Display for Fitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.primary)?;
        if !self.secondary.is_empty() {
            write!(f, " (")?;
            for (i, s) in self.secondary.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:.3}", s)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitness(primary: f64, secondary: &[f64]) -> Fitness {
        Fitness::with_secondary(primary, secondary.to_vec()).unwrap()
    }

    #[test]
    fn primary_score_dominates_secondaries() {
        assert!(fitness(6.0, &[]) > fitness(5.0, &[100.0, 100.0]));
    }

    #[test]
    fn secondary_scores_break_ties_element_wise() {
        assert!(fitness(5.0, &[1.0, 2.0]) > fitness(5.0, &[1.0, 1.0]));
        assert!(fitness(5.0, &[1.0]) < fitness(5.0, &[2.0]));
    }

    #[test]
    fn more_secondary_scores_win_a_full_tie() {
        assert!(fitness(5.0, &[1.0, 0.0]) > fitness(5.0, &[1.0]));
        assert_eq!(
            fitness(5.0, &[1.0]).compare(&fitness(5.0, &[1.0])),
            Ordering::Equal,
        );
    }

    #[test]
    fn max_and_min_select_by_the_total_order() {
        let low = fitness(5.0, &[1.0]);
        let high = fitness(5.0, &[2.0]);
        assert_eq!(Fitness::max(low.clone(), high.clone()), high);
        assert_eq!(Fitness::min(low.clone(), high.clone()), low);
        // Ties keep the first argument.
        assert_eq!(Fitness::max(low.clone(), low.clone()), low);
        assert_eq!(Fitness::min(low.clone(), low.clone()), low);
    }

    #[test]
    fn negative_scores_are_rejected() {
        assert!(Fitness::new(-1.0).is_err());
        assert!(Fitness::with_secondary(1.0, vec![0.5, -0.5]).is_err());
    }

    #[test]
    #[should_panic(expected = "uncomparable fitness value")]
    fn comparing_nan_panics() {
        let _ = fitness(f64::NAN, &[]).compare(&Fitness::zero());
    }

    #[test]
    fn arithmetic_pads_shorter_secondary_sequences() {
        let sum = fitness(1.0, &[2.0, 3.0]) + fitness(1.0, &[4.0]);
        assert_eq!(sum, fitness(2.0, &[6.0, 3.0]));

        let scaled = fitness(4.0, &[2.0]) / 4.0;
        assert_eq!(scaled, fitness(1.0, &[0.5]));
    }
}
