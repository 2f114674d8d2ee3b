//! Precomputed tables for updating Rabin fingerprints one byte at a time.

use tracing::debug;

use crate::errors::InvalidTableError;
use crate::poly::{Polynomial, POLY64};

/// Maximal number of bytes in the window of a rolling hash.
pub const MAX_WINDOW_SIZE: usize = 64;

/// Default window size.
pub const DEFAULT_WINDOW_SIZE: usize = 64;

/// Lookup tables derived from a generator polynomial and a window size.
///
/// The table is immutable after construction and can be shared by reference between
/// any number of [`RollingHash`][crate::hash::RollingHash] instances.
#[derive(Debug, Clone)]
pub struct RabinTable {
    /// Generator polynomial.
    polynomial: Polynomial,
    /// Degree of the generator polynomial.
    degree: u32,
    /// Mask for the `degree` low bits of a fingerprint.
    mask: u64,
    /// Number of bytes in the window.
    window_size: usize,
    /// `top * x^degree mod P` for the byte shifted out at the top.
    push: [u64; 256],
    /// `byte * x^(8 * (window_size - 1)) mod P` for the byte leaving the window.
    pop: [u64; 256],
}

impl RabinTable {
    /// Build the tables for the given polynomial and window size.
    ///
    /// The polynomial must have a degree of at least `8` and the window size must be
    /// in the range `1..=MAX_WINDOW_SIZE`. Irreducibility is not checked.
    pub fn new(polynomial: Polynomial, window_size: usize) -> Result<Self, InvalidTableError> {
        let degree = match polynomial.degree() {
            Some(degree) if degree >= 8 => degree,
            _ => return Err(InvalidTableError::PolynomialDegree(polynomial.raw())),
        };
        if window_size == 0 || window_size > MAX_WINDOW_SIZE {
            return Err(InvalidTableError::WindowSize(window_size));
        }
        let mut push = [0; 256];
        let mut pop = [0; 256];
        // Any byte that has been in the window for `window_size - 1` further shifts has
        // been multiplied by this power of `x`.
        let outgoing = polynomial.pow_x(8 * (window_size as u32 - 1));
        let overflow = polynomial.pow_x(degree);
        for byte in 0..256u64 {
            push[byte as usize] = polynomial.mul_mod(byte, overflow);
            pop[byte as usize] = polynomial.mul_mod(byte, outgoing);
        }
        debug!(%polynomial, degree, window_size, "built Rabin table");
        Ok(Self {
            polynomial,
            degree,
            mask: u64::MAX >> (64 - degree),
            window_size,
            push,
            pop,
        })
    }

    /// Generator polynomial of the table.
    pub fn polynomial(&self) -> Polynomial {
        self.polynomial
    }

    /// Degree of the generator polynomial and width of fingerprints in bits.
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Number of bytes covered by a fingerprint.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Append a byte to the fingerprint `hash`.
    ///
    /// Computes `hash * x^8 + byte mod P`.
    #[inline(always)]
    pub(crate) fn push(&self, hash: u64, byte: u8) -> u64 {
        let top = (hash >> (self.degree - 8)) as usize;
        (((hash << 8) | u64::from(byte)) & self.mask) ^ self.push[top]
    }

    /// Remove the contribution of the oldest byte of a full window from `hash`.
    #[inline(always)]
    pub(crate) fn pop(&self, hash: u64, byte: u8) -> u64 {
        hash ^ self.pop[byte as usize]
    }
}

impl Default for RabinTable {
    fn default() -> Self {
        Self::new(POLY64, DEFAULT_WINDOW_SIZE).expect("default parameters are valid")
    }
}
