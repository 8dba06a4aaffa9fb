use std::fmt::Debug;

pub trait SequenceGenerator: Debug {
    fn next(&mut self) -> i64;
}

impl<T: SequenceGenerator + ?Sized> SequenceGenerator for Box<T> {
    fn next(&mut self) -> i64 {
        (**self).next()
    }
}
