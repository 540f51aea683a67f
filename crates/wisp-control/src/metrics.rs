// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fixed-size storage for rolling frame statistics.

/// A fixed-size circular buffer of samples.
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    data: [T; N],
    index: usize,
    count: usize,
}

impl<T: Default + Copy, const N: usize> RingBuffer<T, N> {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self {
            data: [T::default(); N],
            index: 0,
            count: 0,
        }
    }

    /// Pushes a sample, overwriting the oldest one when full.
    pub fn push(&mut self, value: T) {
        self.data[self.index] = value;
        self.index = (self.index + 1) % N;
        if self.count < N {
            self.count += 1;
        }
    }

    /// Number of samples held.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns `true` if no sample has been pushed since the last clear.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Forgets every sample.
    pub fn clear(&mut self) {
        self.index = 0;
        self.count = 0;
    }

    /// The most recent sample.
    pub fn latest(&self) -> Option<T> {
        (self.count > 0).then(|| self.data[(self.index + N - 1) % N])
    }

    /// Iterates samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let start = (self.index + N - self.count) % N;
        (0..self.count).map(move |i| &self.data[(start + i) % N])
    }
}

impl<T: Default + Copy, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingBuffer<u64, N> {
    /// Integer mean of the samples, `0` when empty.
    pub fn average(&self) -> u64 {
        if self.count == 0 {
            return 0;
        }
        self.iter().sum::<u64>() / self.count as u64
    }

    /// Population variance of the samples, in squared sample units. `0.0`
    /// with fewer than two samples.
    ///
    /// High variance in frame durations means uneven pacing even when the
    /// average is on target.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let mean = self.iter().sum::<u64>() as f64 / self.count as f64;
        let sum_sq: f64 = self
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum();
        sum_sq / self.count as f64
    }

    /// Smallest sample.
    pub fn min(&self) -> Option<u64> {
        self.iter().copied().min()
    }

    /// Largest sample.
    pub fn max(&self) -> Option<u64> {
        self.iter().copied().max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_push_and_iter() {
        let mut rb = RingBuffer::<u64, 3>::new();
        rb.push(1);
        rb.push(2);
        assert_eq!(rb.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        rb.push(3);
        rb.push(4); // Overwrites 1

        assert_eq!(rb.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(rb.count(), 3);
        assert_eq!(rb.latest(), Some(4));
    }

    #[test]
    fn test_ring_buffer_average_over_pushed_count() {
        let mut rb = RingBuffer::<u64, 16>::new();
        assert_eq!(rb.average(), 0);
        rb.push(10);
        rb.push(20);
        assert_eq!(rb.average(), 15);
    }

    #[test]
    fn test_ring_buffer_average_is_rolling() {
        let mut rb = RingBuffer::<u64, 4>::new();
        for v in [100, 100, 100, 100, 500, 500, 500, 500] {
            rb.push(v);
        }
        assert_eq!(rb.average(), 500);
    }

    #[test]
    fn test_ring_buffer_variance() {
        let mut rb = RingBuffer::<u64, 4>::new();
        rb.push(10);
        assert_eq!(rb.variance(), 0.0);
        rb.push(20);
        rb.push(30);
        rb.push(40);
        assert_eq!(rb.variance(), 125.0);
    }

    #[test]
    fn test_ring_buffer_min_max_and_clear() {
        let mut rb = RingBuffer::<u64, 4>::new();
        assert_eq!(rb.min(), None);
        rb.push(7);
        rb.push(3);
        rb.push(9);
        assert_eq!(rb.min(), Some(3));
        assert_eq!(rb.max(), Some(9));

        rb.clear();
        assert!(rb.is_empty());
        assert_eq!(rb.latest(), None);
        assert_eq!(rb.capacity(), 4);
    }
}
