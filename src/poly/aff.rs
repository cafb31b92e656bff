//! Affine functions.
//!
//! An affine function is a constant plus a linear combination of the
//! dimensions of its space: `aff(x) = c0 + c1*x1 + ... + cn*xn + d1*p1 + ...`
//! where `x` are set/input dimensions and `p` are parameters.

use num_integer::Integer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// An affine function over a fixed space.
///
/// The coefficient vector lengths encode the space: an `Aff` built over a
/// given space has exactly one dimension coefficient per set/input dimension
/// and one parameter coefficient per parameter. Mixing functions from
/// different spaces is a contract violation, checked in debug builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aff {
    /// Constant term.
    pub constant: i64,
    /// Coefficients for set/input dimensions.
    pub coeffs: Vec<i64>,
    /// Coefficients for parameter dimensions.
    pub param_coeffs: Vec<i64>,
}

impl Aff {
    /// The zero function.
    pub fn zero(n_dim: usize, n_param: usize) -> Self {
        Self {
            constant: 0,
            coeffs: vec![0; n_dim],
            param_coeffs: vec![0; n_param],
        }
    }

    /// A constant function.
    pub fn constant(value: i64, n_dim: usize, n_param: usize) -> Self {
        Self {
            constant: value,
            ..Self::zero(n_dim, n_param)
        }
    }

    /// The function selecting one set/input dimension.
    pub fn var(dim: usize, n_dim: usize, n_param: usize) -> Self {
        let mut aff = Self::zero(n_dim, n_param);
        aff.coeffs[dim] = 1;
        aff
    }

    /// The function selecting one parameter dimension.
    pub fn param(idx: usize, n_dim: usize, n_param: usize) -> Self {
        let mut aff = Self::zero(n_dim, n_param);
        aff.param_coeffs[idx] = 1;
        aff
    }

    /// True if no dimension or parameter coefficient is non-zero.
    pub fn is_constant(&self) -> bool {
        self.coeffs.iter().all(|&c| c == 0) && self.param_coeffs.iter().all(|&c| c == 0)
    }

    /// The constant value, if this is a constant function.
    pub fn as_constant(&self) -> Option<i64> {
        if self.is_constant() {
            Some(self.constant)
        } else {
            None
        }
    }

    /// Number of set/input dimensions.
    pub fn n_dim(&self) -> usize {
        self.coeffs.len()
    }

    /// Number of parameter dimensions.
    pub fn n_param(&self) -> usize {
        self.param_coeffs.len()
    }

    /// Evaluate under concrete dimension and parameter values.
    pub fn evaluate(&self, dim_values: &[i64], param_values: &[i64]) -> i64 {
        debug_assert_eq!(dim_values.len(), self.coeffs.len());
        debug_assert_eq!(param_values.len(), self.param_coeffs.len());
        let mut result = self.constant;
        for (c, v) in self.coeffs.iter().zip(dim_values) {
            result += c * v;
        }
        for (c, v) in self.param_coeffs.iter().zip(param_values) {
            result += c * v;
        }
        result
    }

    /// Scale every coefficient by a constant.
    pub fn scale(&self, factor: i64) -> Self {
        Self {
            constant: self.constant * factor,
            coeffs: self.coeffs.iter().map(|&c| c * factor).collect(),
            param_coeffs: self.param_coeffs.iter().map(|&c| c * factor).collect(),
        }
    }

    /// Divide by a constant, exactly. Returns `None` unless the divisor
    /// divides every coefficient and the constant, since an inexact division
    /// would no longer be this function.
    pub fn exact_div(&self, divisor: i64) -> Option<Self> {
        if divisor == 0 {
            return None;
        }
        let all = std::iter::once(&self.constant)
            .chain(&self.coeffs)
            .chain(&self.param_coeffs);
        for &c in all {
            if c % divisor != 0 {
                return None;
            }
        }
        Some(Self {
            constant: self.constant / divisor,
            coeffs: self.coeffs.iter().map(|&c| c / divisor).collect(),
            param_coeffs: self.param_coeffs.iter().map(|&c| c / divisor).collect(),
        })
    }

    /// GCD of all coefficients (1 for the zero function).
    pub fn gcd(&self) -> i64 {
        let mut g = self.constant.abs();
        for &c in self.coeffs.iter().chain(&self.param_coeffs) {
            g = g.gcd(&c.abs());
        }
        if g == 0 {
            1
        } else {
            g
        }
    }

    /// Normalize by dividing out the coefficient GCD.
    pub fn normalize(&self) -> Self {
        let g = self.gcd();
        if g <= 1 {
            self.clone()
        } else {
            self.exact_div(g).unwrap_or_else(|| self.clone())
        }
    }

    /// Render with the given dimension and parameter names.
    pub fn to_string_with_names(&self, dim_names: &[String], param_names: &[String]) -> String {
        let mut parts = Vec::new();
        let term = |c: i64, name: &str| match c {
            1 => name.to_string(),
            -1 => format!("-{}", name),
            _ => format!("{}*{}", c, name),
        };
        for (i, &c) in self.coeffs.iter().enumerate() {
            if c != 0 {
                let default_name = format!("d{}", i);
                let name = dim_names.get(i).map(|s| s.as_str()).unwrap_or(&default_name);
                parts.push(term(c, name));
            }
        }
        for (i, &c) in self.param_coeffs.iter().enumerate() {
            if c != 0 {
                let default_name = format!("p{}", i);
                let name = param_names
                    .get(i)
                    .map(|s| s.as_str())
                    .unwrap_or(&default_name);
                parts.push(term(c, name));
            }
        }
        if self.constant != 0 || parts.is_empty() {
            parts.push(self.constant.to_string());
        }
        parts.join(" + ").replace("+ -", "- ")
    }
}

impl Add for Aff {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        debug_assert_eq!(self.coeffs.len(), other.coeffs.len());
        debug_assert_eq!(self.param_coeffs.len(), other.param_coeffs.len());
        Self {
            constant: self.constant + other.constant,
            coeffs: self
                .coeffs
                .iter()
                .zip(&other.coeffs)
                .map(|(&a, &b)| a + b)
                .collect(),
            param_coeffs: self
                .param_coeffs
                .iter()
                .zip(&other.param_coeffs)
                .map(|(&a, &b)| a + b)
                .collect(),
        }
    }
}

impl Sub for Aff {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self + (-other)
    }
}

impl Neg for Aff {
    type Output = Self;

    fn neg(self) -> Self {
        self.scale(-1)
    }
}

impl fmt::Display for Aff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_names(&[], &[]))
    }
}
