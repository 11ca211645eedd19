//! Single-writer, multi-reader published value.
//!
//! The writer swaps in a whole new `Arc<T>`; readers clone the `Arc` under a
//! short read lock and keep a consistent value for as long as they like.

use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
pub struct Published<T> {
    inner: RwLock<Arc<T>>,
}

impl<T> Published<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(Arc::new(value)),
        }
    }

    /// Replace the published value.
    pub fn store(&self, value: T) {
        let value = Arc::new(value);
        match self.inner.write() {
            Ok(mut g) => *g = value,
            // a panicked writer cannot leave a torn Arc behind
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    /// Current value.
    pub fn load(&self) -> Arc<T> {
        match self.inner.read() {
            Ok(g) => Arc::clone(&g),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn readers_see_whole_values() {
        let p = Arc::new(Published::new(vec![0_u32; 64]));
        let writer = {
            let p = Arc::clone(&p);
            thread::spawn(move || {
                for i in 1..=200_u32 {
                    p.store(vec![i; 64]);
                }
            })
        };
        for _ in 0..200 {
            let v = p.load();
            assert!(v.iter().all(|x| *x == v[0]));
        }
        writer.join().unwrap();
        assert_eq!(p.load()[0], 200);
    }
}
