// src/pool.rs
//! Fixed sample pools and the uniform random selector drawing from them.

use rand::Rng;
use thiserror::Error;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("sample pool `{name}` is empty")]
    Empty { name: &'static str },
}

/// Ordered, non-empty, immutable sequence of candidate values.
#[derive(Debug, Clone)]
pub struct SamplePool<T> {
    name: &'static str,
    items: Vec<T>,
}

impl<T> SamplePool<T> {
    /// Fails with [`PoolError::Empty`] when `items` is empty.
    pub fn new(name: &'static str, items: Vec<T>) -> Result<Self, PoolError> {
        if items.is_empty() {
            return Err(PoolError::Empty { name });
        }
        Ok(Self { name, items })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    // always false for a constructed pool
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn contains(&self, v: &T) -> bool
    where
        T: PartialEq,
    {
        self.items.contains(v)
    }

    /// Uniform draw using the thread-local RNG.
    pub fn select(&self) -> &T {
        self.select_with(&mut rand::rng())
    }

    pub fn select_with<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        // non-empty by construction
        &self.items[rng.random_range(0..self.items.len())]
    }
}

/// Uniform draw from a raw slice. An empty slice is an error, never a default.
pub fn select<T>(items: &[T]) -> Result<&T, PoolError> {
    select_with(items, &mut rand::rng())
}

pub fn select_with<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Result<&'a T, PoolError> {
    if items.is_empty() {
        return Err(PoolError::Empty { name: "<slice>" });
    }
    Ok(&items[rng.random_range(0..items.len())])
}

/// Random `[A-Za-z]` string of exactly `len` characters.
pub fn alphabetic_string(len: usize) -> String {
    alphabetic_string_with(&mut rand::rng(), len)
}

pub fn alphabetic_string_with<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}
