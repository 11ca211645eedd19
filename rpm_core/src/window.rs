//! Fixed-capacity rolling window of per-sample RPM readings.
//!
//! Backed by a preallocated ring so push/evict is O(1) and nothing is
//! allocated per sample. Iteration runs oldest to newest.

#[derive(Debug, Clone)]
pub struct RollingWindow {
    buf: Vec<f64>,
    // index of the oldest element
    head: usize,
    len: usize,
}

impl RollingWindow {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0.0; capacity.max(1)],
            head: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    /// Append a reading, returning the evicted oldest one when full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let cap = self.buf.len();
        if self.len < cap {
            let idx = (self.head + self.len) % cap;
            self.buf[idx] = value;
            self.len += 1;
            None
        } else {
            let evicted = self.buf[self.head];
            self.buf[self.head] = value;
            self.head = (self.head + 1) % cap;
            Some(evicted)
        }
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Most recent reading.
    pub fn latest(&self) -> Option<f64> {
        if self.len == 0 {
            None
        } else {
            Some(self.buf[(self.head + self.len - 1) % self.buf.len()])
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        let cap = self.buf.len();
        (0..self.len).map(move |i| self.buf[(self.head + i) % cap])
    }

    /// Copy the contents, oldest first.
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }
}
