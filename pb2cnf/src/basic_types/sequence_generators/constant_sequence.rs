use super::SequenceGenerator;

/// Yields the same value forever.
#[derive(Debug, Copy, Clone)]
pub struct ConstantSequence {
    value: i64,
}

impl ConstantSequence {
    pub fn new(value: i64) -> ConstantSequence {
        ConstantSequence { value }
    }
}

impl SequenceGenerator for ConstantSequence {
    fn next(&mut self) -> i64 {
        self.value
    }
}
