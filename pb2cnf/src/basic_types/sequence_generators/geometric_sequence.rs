use super::SequenceGenerator;

/// `f(0) = a`, `f(i) = floor(f(i - 1) * m)`.
///
/// Intermediate values are truncated, so for fractional `m` this differs from `a * m^i`.
/// Overflow is not handled.
#[derive(Debug, Copy, Clone)]
pub struct GeometricSequence {
    current_value: i64,
    multiplication_factor: f64,
}

impl GeometricSequence {
    pub fn new(starting_value: i64, multiplication_factor: f64) -> GeometricSequence {
        GeometricSequence {
            current_value: starting_value,
            multiplication_factor,
        }
    }
}

impl SequenceGenerator for GeometricSequence {
    fn next(&mut self) -> i64 {
        let value = self.current_value;
        self.current_value = (self.current_value as f64 * self.multiplication_factor) as i64;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubling_gives_powers_of_two() {
        let mut sequence = GeometricSequence::new(1, 2.0);
        for exponent in 0..40 {
            assert_eq!(1_i64 << exponent, sequence.next());
        }
    }

    #[test]
    fn fractional_factor_truncates_each_step() {
        let mut sequence = GeometricSequence::new(10, 1.5);
        let values: Vec<i64> = (0..6).map(|_| sequence.next()).collect();
        assert_eq!(vec![10, 15, 22, 33, 49, 73], values);
    }
}
