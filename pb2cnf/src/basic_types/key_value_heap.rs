//! A max-heap over the keys `0..n` with `f64` values.
//!
//! Keys can be removed temporarily and restored later with their old value; values of removed
//! keys keep being updated by [`KeyValueHeap::increment`] and [`KeyValueHeap::divide_values`].
//! The SAT solver uses it to order variables by activity.

use crate::pb2cnf_assert_moderate;

#[derive(Default, Debug, Clone)]
pub struct KeyValueHeap {
    /// The values in heap order; the value of key `k` is at `map_key_to_position[k]`.
    values: Vec<f64>,
    map_key_to_position: Vec<u32>,
    map_position_to_key: Vec<u32>,
    /// Positions `[0, end_position)` form the heap, later positions hold the removed keys.
    end_position: u32,
}

impl KeyValueHeap {
    pub fn new() -> KeyValueHeap {
        KeyValueHeap::default()
    }

    /// The key with the largest value without removing it. O(1).
    pub fn peek_max(&self) -> Option<u32> {
        if self.is_empty() {
            None
        } else {
            Some(self.map_position_to_key[0])
        }
    }

    pub fn get_value(&self, key: u32) -> f64 {
        pb2cnf_assert_moderate!((key as usize) < self.map_key_to_position.len());
        self.values[self.map_key_to_position[key as usize] as usize]
    }

    /// Removes and returns the key with the largest value. O(log n).
    pub fn pop_max(&mut self) -> Option<u32> {
        let best_key = self.peek_max()?;
        self.delete_key(best_key);
        Some(best_key)
    }

    /// Adds `increment` to the value of `key`, also when the key is currently removed.
    pub fn increment(&mut self, key: u32, increment: f64) {
        let position = self.map_key_to_position[key as usize];
        self.values[position as usize] += increment;
        if self.is_key_present(key) {
            self.sift_up(position);
        }
    }

    /// Puts a removed key back into the heap with its recorded value; no-op if present.
    pub fn restore_key(&mut self, key: u32) {
        if !self.is_key_present(key) {
            let position = self.map_key_to_position[key as usize];
            pb2cnf_assert_moderate!(position >= self.end_position);
            self.swap_positions(position, self.end_position);
            self.end_position += 1;
            self.sift_up(self.end_position - 1);
        }
    }

    /// Removes the key from the heap but remembers its value; no-op if absent.
    pub fn delete_key(&mut self, key: u32) {
        if self.is_key_present(key) {
            let position = self.map_key_to_position[key as usize];
            self.swap_positions(position, self.end_position - 1);
            self.end_position -= 1;
            if position < self.end_position {
                self.sift_down(position);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end_position == 0
    }

    pub fn len(&self) -> usize {
        self.end_position as usize
    }

    pub fn num_keys(&self) -> usize {
        self.values.len()
    }

    pub fn is_key_present(&self, key: u32) -> bool {
        self.map_key_to_position[key as usize] < self.end_position
    }

    /// Adds the key `num_keys()` with the given value to the heap.
    pub fn grow(&mut self, value: f64) {
        let new_key = self.values.len() as u32;
        self.values.push(value);
        self.map_key_to_position.push(new_key);
        self.map_position_to_key.push(new_key);
        // Removed keys occupy the tail, so the new key is moved in front of them.
        self.swap_positions(self.end_position, new_key);
        self.end_position += 1;
        self.sift_up(self.end_position - 1);
    }

    /// Divides every value, including those of removed keys. O(n).
    pub fn divide_values(&mut self, divisor: f64) {
        for value in self.values.iter_mut() {
            *value /= divisor;
        }
    }

    fn swap_positions(&mut self, a: u32, b: u32) {
        let a = a as usize;
        let b = b as usize;

        let key_a = self.map_position_to_key[a] as usize;
        let key_b = self.map_position_to_key[b] as usize;

        self.values.swap(a, b);
        self.map_position_to_key.swap(a, b);
        self.map_key_to_position.swap(key_a, key_b);
    }

    fn sift_up(&mut self, mut position: u32) {
        while position > 0 {
            let parent_position = KeyValueHeap::get_parent_position(position);
            if self.values[parent_position as usize] >= self.values[position as usize] {
                break;
            }
            self.swap_positions(parent_position, position);
            position = parent_position;
        }
    }

    fn sift_down(&mut self, mut position: u32) {
        pb2cnf_assert_moderate!(position < self.end_position);

        while !self.is_heap_locally(position) {
            let largest_child_position = self.get_largest_child_position(position);
            self.swap_positions(largest_child_position, position);
            position = largest_child_position;
        }
    }

    fn is_heap_locally(&self, position: u32) -> bool {
        let left_child_position = KeyValueHeap::get_left_child_position(position);
        let right_child_position = KeyValueHeap::get_right_child_position(position);
        let value = self.values[position as usize];

        self.is_leaf(position)
            || (value >= self.values[left_child_position as usize]
                && (right_child_position >= self.end_position
                    || value >= self.values[right_child_position as usize]))
    }

    fn is_leaf(&self, position: u32) -> bool {
        KeyValueHeap::get_left_child_position(position) >= self.end_position
    }

    fn get_largest_child_position(&self, position: u32) -> u32 {
        pb2cnf_assert_moderate!(!self.is_leaf(position));

        let left_child_position = KeyValueHeap::get_left_child_position(position);
        let right_child_position = KeyValueHeap::get_right_child_position(position);

        if right_child_position < self.end_position
            && self.values[right_child_position as usize]
                > self.values[left_child_position as usize]
        {
            right_child_position
        } else {
            left_child_position
        }
    }

    fn get_parent_position(child_position: u32) -> u32 {
        pb2cnf_assert_moderate!(child_position > 0, "root has no parent");
        (child_position - 1) / 2
    }

    fn get_left_child_position(position: u32) -> u32 {
        2 * position + 1
    }

    fn get_right_child_position(position: u32) -> u32 {
        2 * position + 2
    }
}

#[cfg(test)]
mod tests {
    use super::KeyValueHeap;

    fn heap_with(values: &[f64]) -> KeyValueHeap {
        let mut heap = KeyValueHeap::new();
        for value in values {
            heap.grow(*value);
        }
        heap
    }

    #[test]
    fn keys_are_popped_in_decreasing_value_order() {
        let mut heap = heap_with(&[5.0, 1.0, 8.0, 3.0, 8.5, 0.0]);

        let order: Vec<u32> = std::iter::from_fn(|| heap.pop_max()).collect();

        assert_eq!(vec![4, 2, 0, 3, 1, 5], order);
        assert!(heap.is_empty());
    }

    #[test]
    fn popping_an_empty_heap_returns_none() {
        let mut heap = KeyValueHeap::new();
        assert_eq!(None, heap.pop_max());
    }

    #[test]
    fn root_larger_than_its_only_child_stays_in_place() {
        let mut heap = heap_with(&[10.0, 1.0, 5.0]);
        heap.delete_key(0);

        assert_eq!(Some(2), heap.pop_max());
        assert_eq!(Some(1), heap.pop_max());
        assert_eq!(None, heap.pop_max());
    }

    #[test]
    fn removed_keys_keep_their_value_and_receive_increments() {
        let mut heap = heap_with(&[1.0, 2.0, 3.0]);
        heap.delete_key(0);
        heap.increment(0, 5.0);
        assert_eq!(Some(2), heap.peek_max());

        heap.restore_key(0);
        assert_eq!(Some(0), heap.peek_max());
        assert_eq!(6.0, heap.get_value(0));
    }

    #[test]
    fn growing_after_removals_keeps_removed_keys_out() {
        let mut heap = heap_with(&[1.0, 2.0]);
        heap.delete_key(1);
        heap.grow(0.5);

        assert_eq!(2, heap.len());
        assert!(!heap.is_key_present(1));
        assert!(heap.is_key_present(2));
        assert_eq!(Some(0), heap.pop_max());
        assert_eq!(Some(2), heap.pop_max());
    }

    #[test]
    fn dividing_scales_every_value() {
        let mut heap = heap_with(&[4.0, 8.0]);
        heap.delete_key(0);
        heap.divide_values(4.0);

        assert_eq!(1.0, heap.get_value(0));
        assert_eq!(2.0, heap.get_value(1));
    }
}
