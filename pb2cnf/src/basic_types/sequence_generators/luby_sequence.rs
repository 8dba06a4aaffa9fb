use super::SequenceGenerator;

/// The Luby sequence `1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, ...` scaled by a base value.
///
/// Each element is produced in constant time with Knuth's reluctant doubling.
#[derive(Debug, Copy, Clone)]
pub struct LubySequence {
    u: i64,
    v: i64,
    base_value: i64,
}

impl LubySequence {
    pub fn new(base_value: i64) -> LubySequence {
        LubySequence {
            u: 1,
            v: 1,
            base_value,
        }
    }
}

impl SequenceGenerator for LubySequence {
    fn next(&mut self) -> i64 {
        let value = self.v;
        if (self.u & -self.u) == self.v {
            self.u += 1;
            self.v = 1;
        } else {
            self.v *= 2;
        }
        value * self.base_value
    }
}
