//! Group helpers over Ristretto255.
//!
//! Hash-to-scalar, the secondary generator used for key fragment
//! commitments, and Lagrange interpolation at zero.

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use sha2::{Digest, Sha512};

/// Secondary generator `U`. Nobody knows its discrete log relative to `G`.
pub(crate) static COMMITMENT_GENERATOR: Lazy<RistrettoPoint> = Lazy::new(|| {
    RistrettoPoint::hash_from_bytes::<Sha512>(b"dataproxy-pre commitment generator U")
});

/// Domain tags for the hash-to-scalar calls.
pub(crate) mod domain {
    pub const CAPSULE: &[u8] = b"dataproxy-pre/capsule";
    pub const NON_INTERACTIVE: &[u8] = b"dataproxy-pre/non-interactive";
    pub const SHARE_INDEX: &[u8] = b"dataproxy-pre/share-index";
}

/// The standard basepoint `G`.
pub(crate) fn generator() -> RistrettoPoint {
    RISTRETTO_BASEPOINT_POINT
}

/// A uniformly random non-zero scalar.
pub(crate) fn random_nonzero_scalar() -> Scalar {
    loop {
        let s = Scalar::random(&mut OsRng);
        if s != Scalar::ZERO {
            return s;
        }
    }
}

/// Hash a domain tag and a sequence of points to a scalar.
///
/// Inputs are compressed and length-prefixed so that no two distinct
/// input sequences share an encoding.
pub(crate) fn hash_to_scalar(domain: &[u8], points: &[&RistrettoPoint], extra: &[&[u8]]) -> Scalar {
    let mut hasher = Sha512::new();
    hasher.update((domain.len() as u64).to_le_bytes());
    hasher.update(domain);
    for point in points {
        hasher.update(point.compress().as_bytes());
    }
    for bytes in extra {
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    Scalar::from_hash(hasher)
}

/// Evaluate a polynomial with the given coefficients at `x`.
pub(crate) fn poly_eval(coeffs: &[Scalar], x: Scalar) -> Scalar {
    // Horner's rule, highest degree first.
    coeffs
        .iter()
        .rev()
        .fold(Scalar::ZERO, |acc, coeff| acc * x + coeff)
}

/// Lagrange basis coefficient of `xs[i]` evaluated at zero.
///
/// `xs` must be pairwise distinct; callers dedupe first.
pub(crate) fn lambda_at_zero(xs: &[Scalar], i: usize) -> Scalar {
    // l_i(0) = prod_{j != i} x_j / (x_j - x_i)
    let x_i = xs[i];
    xs.iter()
        .enumerate()
        .filter(|(j, _)| *j != i)
        .fold(Scalar::ONE, |acc, (_, x_j)| {
            acc * x_j * (x_j - x_i).invert()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_commitment_generator_is_not_basepoint() {
        assert_ne!(*COMMITMENT_GENERATOR, generator());
    }

    #[test]
    fn test_hash_to_scalar_domain_separated() {
        let p = generator();
        let a = hash_to_scalar(domain::CAPSULE, &[&p], &[]);
        let b = hash_to_scalar(domain::SHARE_INDEX, &[&p], &[]);
        assert_ne!(a, b);
        assert_eq!(a, hash_to_scalar(domain::CAPSULE, &[&p], &[]));
    }

    #[test]
    fn test_interpolation_recovers_constant_term() {
        let coeffs: Vec<Scalar> = (0..3).map(|_| random_nonzero_scalar()).collect();
        let xs: Vec<Scalar> = (0..3).map(|_| random_nonzero_scalar()).collect();
        let ys: Vec<Scalar> = xs.iter().map(|x| poly_eval(&coeffs, *x)).collect();

        let recovered = (0..xs.len()).fold(Scalar::ZERO, |acc, i| {
            acc + ys[i] * lambda_at_zero(&xs, i)
        });
        assert_eq!(recovered, coeffs[0]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_any_quorum_interpolates(degree in 0usize..5, extra in 0usize..3) {
            let coeffs: Vec<Scalar> = (0..=degree).map(|_| random_nonzero_scalar()).collect();
            let xs: Vec<Scalar> = (0..=degree + extra).map(|_| random_nonzero_scalar()).collect();
            let ys: Vec<Scalar> = xs.iter().map(|x| poly_eval(&coeffs, *x)).collect();

            let recovered = (0..xs.len()).fold(Scalar::ZERO, |acc, i| {
                acc + ys[i] * lambda_at_zero(&xs, i)
            });
            prop_assert_eq!(recovered, coeffs[0]);
        }
    }
}
