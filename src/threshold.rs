// Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Polynomial secret sharing over the secp256k1 scalar field.
//!
//! A degree-`t` polynomial `f` hides the secret at `f(0)`; each participant
//! holds the evaluation at its own identifier. Any `t+1` evaluations
//! recombine to `f(0)` through Lagrange interpolation at zero.

use crate::errors::{Error, Result};
use k256::{elliptic_curve::Field, Scalar};
use rand::{CryptoRng, RngCore};
use tracing::error;

/// Sample a random degree-`t` polynomial with the given constant term.
/// Coefficients are returned lowest-order first.
pub(crate) fn random_polynomial<R: RngCore + CryptoRng>(
    t: usize,
    constant: Scalar,
    rng: &mut R,
) -> Vec<Scalar> {
    let mut coefficients = Vec::with_capacity(t + 1);
    coefficients.push(constant);
    for _ in 0..t {
        coefficients.push(Scalar::random(&mut *rng));
    }
    coefficients
}

/// Evaluate a polynomial (lowest-order coefficient first) at `x` by
/// Horner's rule.
pub(crate) fn evaluate_polynomial(coefficients: &[Scalar], x: &Scalar) -> Scalar {
    coefficients
        .iter()
        .rev()
        .fold(Scalar::ZERO, |acc, coef| acc * x + coef)
}

/// Compute the Lagrange coefficient at zero for `my_point` with respect to
/// the full set of interpolation `points` (which must contain `my_point`).
///
/// Multiplying each share by its coefficient turns a polynomial sharing
/// into an additive sharing of `f(0)` over the chosen signer set.
pub(crate) fn lagrange_coefficient_at_zero(
    my_point: &Scalar,
    points: &[Scalar],
) -> Result<Scalar> {
    let mut result = Scalar::ONE;
    for point in points {
        if point != my_point {
            let numerator = Scalar::ZERO - point;
            let denominator = *my_point - point;
            let inv = Option::<Scalar>::from(denominator.invert()).ok_or_else(|| {
                error!("Lagrange interpolation points must be distinct");
                Error::InternalInvariantFailed
            })?;
            result *= numerator * inv;
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::init_testing;

    fn evaluate_at_points(coefficients: &[Scalar], points: &[Scalar]) -> Vec<Scalar> {
        points
            .iter()
            .map(|x| evaluate_polynomial(coefficients, x))
            .collect()
    }

    #[test]
    fn polynomial_evaluation_at_zero_returns_the_constant() {
        let mut rng = init_testing();
        let secret = Scalar::random(&mut rng);
        let coefficients = random_polynomial(3, secret, &mut rng);
        assert_eq!(evaluate_polynomial(&coefficients, &Scalar::ZERO), secret);
    }

    #[test]
    fn interpolation_recovers_the_secret_from_any_large_enough_subset() {
        let mut rng = init_testing();
        let t = 3;
        let secret = Scalar::random(&mut rng);
        let coefficients = random_polynomial(t, secret, &mut rng);

        // A degree-3 polynomial needs 4 points; try every quorum size from
        // there up to 7.
        for quorum in (t + 1)..=7 {
            let points: Vec<Scalar> = (1..=quorum as u32)
                .map(|i| Scalar::from(i as u64))
                .collect();
            let values = evaluate_at_points(&coefficients, &points);

            let reconstructed = values
                .iter()
                .zip(&points)
                .map(|(value, point)| {
                    *value * lagrange_coefficient_at_zero(point, &points).unwrap()
                })
                .fold(Scalar::ZERO, |acc, x| acc + x);

            assert_eq!(reconstructed, secret);
        }
    }

    #[test]
    fn too_few_points_interpolate_to_garbage() {
        let mut rng = init_testing();
        let t = 3;
        let secret = Scalar::random(&mut rng);
        let coefficients = random_polynomial(t, secret, &mut rng);

        let points: Vec<Scalar> = (1..=t as u32).map(|i| Scalar::from(i as u64)).collect();
        let values = evaluate_at_points(&coefficients, &points);

        let reconstructed = values
            .iter()
            .zip(&points)
            .map(|(value, point)| *value * lagrange_coefficient_at_zero(point, &points).unwrap())
            .fold(Scalar::ZERO, |acc, x| acc + x);

        assert_ne!(reconstructed, secret);
    }

    #[test]
    fn interpolation_works_at_arbitrary_identifier_points() {
        let mut rng = init_testing();
        let t = 2;
        let secret = Scalar::random(&mut rng);
        let coefficients = random_polynomial(t, secret, &mut rng);

        // Identifiers need not be consecutive.
        let points: Vec<Scalar> = [7u64, 13, 101].iter().map(|i| Scalar::from(*i)).collect();
        let values = evaluate_at_points(&coefficients, &points);

        let reconstructed = values
            .iter()
            .zip(&points)
            .map(|(value, point)| *value * lagrange_coefficient_at_zero(point, &points).unwrap())
            .fold(Scalar::ZERO, |acc, x| acc + x);

        assert_eq!(reconstructed, secret);
    }
}
