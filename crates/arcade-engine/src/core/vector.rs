//! Recyclable 2D vectors.
//!
//! Hot paths (collision resolution) borrow scratch vectors from a small free
//! list instead of allocating fresh ones every frame. A [`PooledVec`] is
//! owned by whoever acquired it; [`VectorPool::release`] consumes it, so a
//! released vector can neither be read again nor released twice.
//!
//! Plain `glam::Vec2` values are used everywhere else.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

use glam::Vec2;

/// Default number of vectors kept on the free list.
pub const DEFAULT_POOL_CAPACITY: usize = 50;

/// A mutable `(x, y)` pair backed by a recyclable allocation.
///
/// All mutating operations work in place and return `&mut Self` so they chain:
/// `v.subtract(other).normalize().scale(2.0)`.
#[derive(Debug, PartialEq)]
pub struct PooledVec {
    inner: Box<Vec2>,
}

impl PooledVec {
    pub fn x(&self) -> f32 {
        self.inner.x
    }

    pub fn y(&self) -> f32 {
        self.inner.y
    }

    pub fn get(&self) -> Vec2 {
        *self.inner
    }

    pub fn set(&mut self, x: f32, y: f32) -> &mut Self {
        *self.inner = Vec2::new(x, y);
        self
    }

    pub fn add(&mut self, other: Vec2) -> &mut Self {
        *self.inner += other;
        self
    }

    pub fn subtract(&mut self, other: Vec2) -> &mut Self {
        *self.inner -= other;
        self
    }

    pub fn scale(&mut self, factor: f32) -> &mut Self {
        *self.inner *= factor;
        self
    }

    /// Normalize in place. A zero-length vector becomes `(0, 0)`.
    pub fn normalize(&mut self) -> &mut Self {
        *self.inner = self.inner.normalize_or_zero();
        self
    }

    /// Rotate in place by `radians` (counter-clockwise in a y-up frame).
    pub fn rotate(&mut self, radians: f32) -> &mut Self {
        *self.inner = Vec2::from_angle(radians).rotate(*self.inner);
        self
    }

    /// Turn this direction into its normal: rotate by a quarter turn, `(x, y) -> (y, -x)`.
    pub fn to_normal(&mut self) -> &mut Self {
        *self.inner = to_normal(*self.inner);
        self
    }

    pub fn dot(&self, other: Vec2) -> f32 {
        self.inner.dot(other)
    }

    pub fn length(&self) -> f32 {
        self.inner.length()
    }

    /// Address of the backing storage, for identity checks.
    pub fn storage_ptr(&self) -> *const Vec2 {
        &*self.inner as *const Vec2
    }
}

impl Deref for PooledVec {
    type Target = Vec2;

    fn deref(&self) -> &Vec2 {
        &self.inner
    }
}

impl DerefMut for PooledVec {
    fn deref_mut(&mut self) -> &mut Vec2 {
        &mut self.inner
    }
}

/// Quarter-turn of a direction, `(x, y) -> (y, -x)`.
#[inline]
pub fn to_normal(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// Bounded free list of vector allocations, guarded by a single lock.
///
/// Construct one per application (or per test) and share it by reference or `Arc`.
#[derive(Debug)]
pub struct VectorPool {
    free: Mutex<Vec<Box<Vec2>>>,
    capacity: usize,
}

impl VectorPool {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Get a vector initialised to `(x, y)`, reusing a released allocation when one is free.
    pub fn acquire(&self, x: f32, y: f32) -> PooledVec {
        let recycled = self.lock().pop();
        let mut inner = recycled.unwrap_or_default();
        *inner = Vec2::new(x, y);
        PooledVec { inner }
    }

    pub fn acquire_from(&self, v: Vec2) -> PooledVec {
        self.acquire(v.x, v.y)
    }

    /// Return a vector to the free list. Discarded when the list is full.
    pub fn release(&self, v: PooledVec) {
        let mut free = self.lock();
        if free.len() < self.capacity {
            free.push(v.inner);
        }
    }

    /// Number of allocations currently waiting on the free list.
    pub fn available(&self) -> usize {
        self.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Box<Vec2>>> {
        self.free.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for VectorPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn release_then_acquire_reuses_storage() {
        let pool = VectorPool::new();
        let v = pool.acquire(1.0, 2.0);
        let ptr = v.storage_ptr();
        pool.release(v);

        let again = pool.acquire(5.0, 6.0);
        assert_eq!(again.storage_ptr(), ptr);
        assert_eq!(again.get(), Vec2::new(5.0, 6.0));
    }

    #[test]
    fn held_vectors_never_alias() {
        let pool = VectorPool::new();
        pool.release(pool.acquire(0.0, 0.0));

        let a = pool.acquire(1.0, 0.0);
        let b = pool.acquire(0.0, 1.0);
        assert_ne!(a.storage_ptr(), b.storage_ptr());
    }

    #[test]
    fn free_list_is_bounded() {
        let pool = VectorPool::with_capacity(2);
        let held: Vec<_> = (0..5).map(|i| pool.acquire(i as f32, 0.0)).collect();
        for v in held {
            pool.release(v);
        }
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn operations_chain_in_place() {
        let pool = VectorPool::new();
        let mut v = pool.acquire(3.0, 4.0);
        v.subtract(Vec2::new(3.0, 0.0)).normalize().scale(2.0);
        assert_eq!(v.get(), Vec2::new(0.0, 2.0));

        v.to_normal();
        assert_eq!(v.get(), Vec2::new(2.0, 0.0));
        assert_eq!(v.dot(Vec2::new(1.0, 1.0)), 2.0);
    }

    #[test]
    fn normalizing_zero_yields_zero() {
        let pool = VectorPool::new();
        let mut v = pool.acquire(0.0, 0.0);
        v.normalize();
        assert_eq!(v.get(), Vec2::ZERO);
    }

    #[test]
    fn rotate_quarter_turn() {
        let pool = VectorPool::new();
        let mut v = pool.acquire(1.0, 0.0);
        v.rotate(std::f32::consts::FRAC_PI_2);
        assert!((v.x() - 0.0).abs() < 1e-6);
        assert!((v.y() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn concurrent_acquire_release() {
        let pool = Arc::new(VectorPool::with_capacity(8));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for i in 0..1000 {
                        let v = pool.acquire(t as f32, i as f32);
                        assert_eq!(v.get(), Vec2::new(t as f32, i as f32));
                        pool.release(v);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(pool.available() <= pool.capacity());
    }
}
