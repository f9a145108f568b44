//! Phase arithmetic
//!
//! A `Phase` is a rational multiple of π, normalized so the numerator lies
//! in (-1, 1] (in units of `denominator`) and `gcd(numerator, denominator) == 1`.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use num_rational::Ratio;

/// A rational multiple of π: `numerator / denominator * π`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Phase(Ratio<i64>);

impl Phase {
    pub const ZERO: Phase = Phase(Ratio::new_raw(0, 1));
    pub const PI: Phase = Phase(Ratio::new_raw(1, 1));

    /// Build a normalized phase from a `numerator / denominator * π` fraction.
    ///
    /// `denominator` must be strictly positive. The numerator is reduced
    /// modulo `2 * denominator` into `(-denominator, denominator]` before the
    /// fraction is put in lowest terms.
    pub fn new(numerator: i64, denominator: i64) -> Self {
        assert!(denominator > 0, "phase denominator must be positive");
        let period = 2 * denominator;
        let mut num = numerator.rem_euclid(period);
        if num > denominator {
            num -= period;
        }
        Phase(Ratio::new(num, denominator))
    }

    pub fn pi_2() -> Self {
        Phase::new(1, 2)
    }

    pub fn neg_pi_2() -> Self {
        Phase::new(-1, 2)
    }

    pub fn numerator(&self) -> i64 {
        *self.0.numer()
    }

    pub fn denominator(&self) -> i64 {
        *self.0.denom()
    }

    /// `true` when this phase is an integer multiple of π (0 or π, mod 2π).
    pub fn is_n_pi(&self) -> bool {
        self.denominator() == 1
    }

    /// `true` when this phase is a Clifford phase (multiple of π/2).
    pub fn is_clifford(&self) -> bool {
        self.denominator() <= 2
    }

    pub fn is_zero(&self) -> bool {
        self.numerator() == 0
    }

    /// `true` for exactly ±π/2.
    pub fn is_pi_2(&self) -> bool {
        self.denominator() == 2
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::ZERO
    }
}

impl Add for Phase {
    type Output = Phase;
    fn add(self, rhs: Phase) -> Phase {
        let sum = self.0 + rhs.0;
        Phase::new(*sum.numer(), *sum.denom())
    }
}

impl Sub for Phase {
    type Output = Phase;
    fn sub(self, rhs: Phase) -> Phase {
        self + (-rhs)
    }
}

impl Neg for Phase {
    type Output = Phase;
    fn neg(self) -> Phase {
        Phase::new(-self.numerator(), self.denominator())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (num, den) = (self.numerator(), self.denominator());
        if num == 0 {
            return write!(f, "0");
        }
        if den == 1 {
            return if num == 1 { write!(f, "π") } else { write!(f, "{}π", num) };
        }
        write!(f, "{}π/{}", num, den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_into_range() {
        let p = Phase::new(5, 2);
        // 5/2 mod 2 = 1/2
        assert_eq!(p, Phase::new(1, 2));
    }

    #[test]
    fn reduces_to_lowest_terms() {
        assert_eq!(Phase::new(2, 4), Phase::new(1, 2));
    }

    #[test]
    fn two_pi_normalizes_to_zero() {
        assert_eq!(Phase::new(2, 1), Phase::ZERO);
    }

    #[test]
    fn addition_matches_hopf_scenario() {
        // 1/3 + 2/3 + 1 == 2 (mod 2) == 0
        let p = Phase::new(1, 3) + Phase::new(2, 3) + Phase::PI;
        assert_eq!(p, Phase::ZERO);
    }

    #[test]
    fn is_n_pi_and_clifford() {
        assert!(Phase::ZERO.is_n_pi());
        assert!(Phase::PI.is_n_pi());
        assert!(Phase::pi_2().is_clifford());
        assert!(!Phase::pi_2().is_n_pi());
        assert!(!Phase::new(1, 4).is_clifford());
    }

    #[test]
    fn negation() {
        assert_eq!(-Phase::pi_2(), Phase::neg_pi_2());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_phase() -> impl Strategy<Value = Phase> {
        (-64i64..=64, 1i64..=32).prop_map(|(n, d)| Phase::new(n, d))
    }

    proptest! {
        #[test]
        fn new_is_always_in_lowest_terms_and_normalized(n in -200i64..=200, d in 1i64..=16) {
            let p = Phase::new(n, d);
            prop_assert!(p.denominator() > 0);
            prop_assert!(p.numerator() > -p.denominator() && p.numerator() <= p.denominator());
            let g = {
                fn gcd(a: u64, b: u64) -> u64 {
                    if b == 0 { a.max(1) } else { gcd(b, a % b) }
                }
                gcd(p.numerator().unsigned_abs(), p.denominator().unsigned_abs())
            };
            prop_assert_eq!(g, 1);
        }

        #[test]
        fn addition_is_commutative(a in arb_phase(), b in arb_phase()) {
            prop_assert_eq!(a + b, b + a);
        }

        #[test]
        fn addition_is_associative(a in arb_phase(), b in arb_phase(), c in arb_phase()) {
            prop_assert_eq!((a + b) + c, a + (b + c));
        }

        #[test]
        fn adding_negation_is_zero(a in arb_phase()) {
            prop_assert_eq!(a + (-a), Phase::ZERO);
        }

        #[test]
        fn double_negation_is_identity(a in arb_phase()) {
            prop_assert_eq!(-(-a), a);
        }

        #[test]
        fn subtraction_then_addition_round_trips(a in arb_phase(), b in arb_phase()) {
            prop_assert_eq!((a - b) + b, a);
        }
    }
}
