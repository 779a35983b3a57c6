//! # Unit Types
//!
//! Type-safe wrappers for the units used at the engine boundary and inside
//! the formulas. These remain lightweight (just f64 wrappers) and serialize
//! as bare numbers.
//!
//! ## Boundary vs. Internal Units
//!
//! Collaborators hand the engine:
//! - Length: millimetres (mm)
//! - Stress: megapascals (MPa = N/mm²)
//! - Force: kilonewtons (kN)
//! - Moment: kilonewton-metres (kN·m)
//!
//! Every formula runs in newtons and millimetres, so forces and moments are
//! converted exactly once, when a calculation starts:
//!
//! ```rust
//! use rc_core::units::{Kn, KnM, NMm, Newtons};
//!
//! let v: Newtons = Kn(100.0).into();
//! assert_eq!(v.0, 100_000.0);
//!
//! let m: NMm = KnM(150.0).into();
//! assert_eq!(m.0, 150.0e6);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Length / Area
// ============================================================================

/// Length in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mm(pub f64);

/// Area in square millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqMm(pub f64);

impl SqMm {
    /// Area of a circular bar of the given diameter
    pub fn of_bar(diameter: Mm) -> Self {
        SqMm(std::f64::consts::PI * diameter.0.powi(2) / 4.0)
    }
}

// ============================================================================
// Stress
// ============================================================================

/// Stress in megapascals (N/mm²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mpa(pub f64);

// ============================================================================
// Force
// ============================================================================

/// Force in newtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Newtons(pub f64);

/// Force in kilonewtons (1 kN = 1000 N)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kn(pub f64);

impl From<Kn> for Newtons {
    fn from(kn: Kn) -> Self {
        Newtons(kn.0 * 1.0e3)
    }
}

impl From<Newtons> for Kn {
    fn from(n: Newtons) -> Self {
        Kn(n.0 / 1.0e3)
    }
}

// ============================================================================
// Moment
// ============================================================================

/// Moment in newton-millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NMm(pub f64);

/// Moment in kilonewton-metres (1 kN·m = 10⁶ N·mm)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnM(pub f64);

impl From<KnM> for NMm {
    fn from(knm: KnM) -> Self {
        NMm(knm.0 * 1.0e6)
    }
}

impl From<NMm> for KnM {
    fn from(nmm: NMm) -> Self {
        KnM(nmm.0 / 1.0e6)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Mm);
impl_arithmetic!(SqMm);
impl_arithmetic!(Mpa);
impl_arithmetic!(Newtons);
impl_arithmetic!(Kn);
impl_arithmetic!(NMm);
impl_arithmetic!(KnM);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_conversion() {
        let n: Newtons = Kn(1.5).into();
        assert_eq!(n.0, 1500.0);
        let back: Kn = n.into();
        assert_eq!(back.0, 1.5);
    }

    #[test]
    fn test_moment_conversion() {
        let nmm: NMm = KnM(2.0).into();
        assert_eq!(nmm.0, 2.0e6);
        let back: KnM = nmm.into();
        assert!((back.0 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_bar_area() {
        // 8 mm bar: π·64/4 = 50.27 mm²
        assert!((SqMm::of_bar(Mm(8.0)).0 - 50.265).abs() < 0.01);
    }

    #[test]
    fn test_arithmetic() {
        let a = Mm(450.0);
        let b = Mm(50.0);
        assert_eq!((a + b).0, 500.0);
        assert_eq!((a - b).0, 400.0);
        assert_eq!((a * 2.0).0, 900.0);
        assert_eq!((a / 2.0).0, 225.0);
    }

    #[test]
    fn test_serialization() {
        let m = KnM(12.5);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "12.5");
        let roundtrip: KnM = serde_json::from_str(&json).unwrap();
        assert_eq!(m, roundtrip);
    }
}
