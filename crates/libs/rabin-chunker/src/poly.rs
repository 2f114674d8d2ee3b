//! Arithmetic on polynomials over GF(2).
//!
//! A polynomial is represented by a `u64` whose bit `i` is the coefficient of `x^i`.
//! Addition and subtraction are both XOR. All shifts below are explicitly bounded so
//! that no result depends on overflowing shifts.

/// Irreducible polynomial of degree 63 used for fingerprinting by default.
pub const POLY64: Polynomial = Polynomial::new(0xbfe6b8a5bf378d83);

/// Polynomial over GF(2) including its leading term.
///
/// The arithmetic methods panic for the zero polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Polynomial(u64);

impl Polynomial {
    /// Create a polynomial from its raw coefficients.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw coefficients of the polynomial.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Degree of the polynomial or `None` for the zero polynomial.
    pub const fn degree(self) -> Option<u32> {
        if self.0 == 0 {
            None
        } else {
            Some(63 - self.0.leading_zeros())
        }
    }

    /// Reduce `value` modulo the polynomial.
    ///
    /// # Panics
    ///
    /// Panics if the polynomial is zero.
    pub fn reduce(self, mut value: u64) -> u64 {
        let degree = self.degree().expect("polynomial must not be zero");
        while value != 0 {
            let value_degree = 63 - value.leading_zeros();
            if value_degree < degree {
                break;
            }
            value ^= self.0 << (value_degree - degree);
        }
        value
    }

    /// Multiply the residue `value` by `x` modulo the polynomial.
    #[inline]
    fn mul_x(self, value: u64, degree: u32) -> u64 {
        // `value` has degree below `degree <= 63`, so the shift never loses bits.
        let shifted = value << 1;
        if shifted >> degree & 1 == 1 {
            shifted ^ self.0
        } else {
            shifted
        }
    }

    /// Compute `a * b` modulo the polynomial.
    ///
    /// Both operands are reduced first, so arbitrary values are accepted.
    pub fn mul_mod(self, a: u64, b: u64) -> u64 {
        let degree = self.degree().expect("polynomial must not be zero");
        let mut a = self.reduce(a);
        let mut b = self.reduce(b);
        let mut product = 0;
        while b != 0 {
            if b & 1 == 1 {
                product ^= a;
            }
            a = self.mul_x(a, degree);
            b >>= 1;
        }
        product
    }

    /// Compute `x^exponent` modulo the polynomial.
    pub fn pow_x(self, exponent: u32) -> u64 {
        let degree = self.degree().expect("polynomial must not be zero");
        let mut value = self.reduce(1);
        for _ in 0..exponent {
            value = self.mul_x(value, degree);
        }
        value
    }

    /// Fingerprint of the given bytes computed bit by bit without any tables.
    ///
    /// The bytes are interpreted as a polynomial with the first byte's most
    /// significant bit as the highest coefficient. The result is that polynomial
    /// modulo `self`. This is slow and only meant as a reference for the table-driven
    /// [`RollingHash`][crate::hash::RollingHash].
    pub fn fingerprint(self, bytes: &[u8]) -> u64 {
        let degree = self.degree().expect("polynomial must not be zero");
        let mut value = 0;
        for byte in bytes {
            for bit in (0..8).rev() {
                value = self.mul_x(value, degree) ^ u64::from(byte >> bit & 1);
            }
        }
        value
    }
}

impl From<u64> for Polynomial {
    fn from(raw: u64) -> Self {
        Self::new(raw)
    }
}

impl std::fmt::Display for Polynomial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree() {
        assert_eq!(Polynomial::new(0).degree(), None);
        assert_eq!(Polynomial::new(1).degree(), Some(0));
        assert_eq!(Polynomial::new((1 << 7) - 1).degree(), Some(6));
        assert_eq!(Polynomial::new(1 << 7).degree(), Some(7));
        assert_eq!(Polynomial::new((1 << 7) + 1).degree(), Some(7));
        assert_eq!(POLY64.degree(), Some(63));
    }

    #[test]
    fn test_reduce() {
        assert_eq!(Polynomial::new(3).reduce(7), 1);
        assert_eq!(Polynomial::new(4).reduce(7), 3);
        assert_eq!(Polynomial::new(2).reduce(7), 1);
        assert_eq!(Polynomial::new(8).reduce(16), 0);
        assert_eq!(Polynomial::new(8).reduce(19), 3);
        assert_eq!(Polynomial::new(4).reduce(19), 3);
        assert_eq!(POLY64.reduce(POLY64.raw()), 0);
        assert_eq!(POLY64.reduce(u64::MAX), u64::MAX ^ POLY64.raw());
    }

    #[test]
    fn test_mul_mod() {
        // x^2 + x + 1 is irreducible, GF(4) has `x * x = x + 1`.
        let gf4 = Polynomial::new(0b111);
        assert_eq!(gf4.mul_mod(0b10, 0b10), 0b11);
        assert_eq!(gf4.mul_mod(0b11, 0b11), 0b10);
        assert_eq!(gf4.mul_mod(0b10, 0b11), 0b01);
        // Multiplying by `x^k` agrees with shifting in zero bits.
        for k in [0, 1, 8, 63, 64, 200] {
            assert_eq!(POLY64.mul_mod(0xdeadbeef, POLY64.pow_x(k)), {
                let mut value = 0xdeadbeef;
                for _ in 0..k {
                    value = POLY64.mul_mod(value, 2);
                }
                value
            });
        }
    }

    #[test]
    fn test_fingerprint() {
        assert_eq!(POLY64.fingerprint(&[]), 0);
        assert_eq!(POLY64.fingerprint(&[0x42]), 0x42);
        assert_eq!(POLY64.fingerprint(&[0, 0, 0x42]), 0x42);
        // Eight bytes exceed the degree and must be reduced.
        let bytes = [0xff; 8];
        assert_eq!(POLY64.fingerprint(&bytes), POLY64.reduce(u64::MAX));
        // Appending a byte multiplies by `x^8` and adds the byte.
        let prefix = b"content defined chunking";
        let mut extended = prefix.to_vec();
        extended.push(0x17);
        assert_eq!(
            POLY64.fingerprint(&extended),
            POLY64.mul_mod(POLY64.fingerprint(prefix), 1 << 8) ^ 0x17
        );
    }
}
