//! Reinforcing Bars
//!
//! Standard bar diameters, bar areas and masses, and the design
//! stress-strain relationship of reinforcement (IS 456 Fig. 23).
//!
//! ## Compression-Steel Stress
//!
//! Mild steel (fy ≤ 250 MPa) is elasto-plastic. High-yield bars follow a
//! curve that leaves linearity at 0.8·fyd and reaches fyd at an inelastic
//! strain of 0.002. The curve is tabulated as *strain in terms of stress*,
//! so the inverse (stress from strain) is found by bounded bisection:
//!
//! ```text
//! ε(σ) = σ/Es + ε_inelastic(σ)        (monotone increasing on [0, fyd])
//! find σ such that ε(σ) = ε_sc        (tolerance 1e-6 MPa, ≤ 100 halvings)
//! ```

use serde::{Deserialize, Serialize};

use super::ES_MPA;

/// Standard bar diameters (mm), smallest first
pub const STANDARD_DIAMETERS_MM: [f64; 8] = [8.0, 10.0, 12.0, 16.0, 20.0, 25.0, 28.0, 32.0];

/// Density of steel (kg/m³)
const STEEL_DENSITY_KG_M3: f64 = 7850.0;

/// Stress tolerance for the bisection solve (MPa)
const STRESS_TOLERANCE_MPA: f64 = 1e-6;

/// Hard cap on bisection iterations
const MAX_BISECTION_ITERATIONS: u32 = 100;

/// Points of the high-yield design curve: (σ / fyd, inelastic strain)
const COLD_WORKED_CURVE: [(f64, f64); 6] = [
    (0.80, 0.0000),
    (0.85, 0.0001),
    (0.90, 0.0003),
    (0.95, 0.0007),
    (0.975, 0.0010),
    (1.00, 0.0020),
];

/// Cross-sectional area of one bar (mm²)
pub fn bar_area_mm2(diameter_mm: f64) -> f64 {
    std::f64::consts::PI * diameter_mm.powi(2) / 4.0
}

/// Mass of one metre of bar (kg/m), the familiar φ²/162
pub fn bar_mass_kg_per_m(diameter_mm: f64) -> f64 {
    bar_area_mm2(diameter_mm) * 1.0e-6 * STEEL_DENSITY_KG_M3
}

/// Design stress-strain curve family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SteelCurve {
    /// Elastic up to fyd, then perfectly plastic
    MildSteel,
    /// Non-linear knee between 0.8·fyd and fyd
    ColdWorked,
}

impl SteelCurve {
    /// Select the curve for a yield strength
    pub fn for_fy(fy_mpa: f64) -> Self {
        if fy_mpa <= 250.0 {
            SteelCurve::MildSteel
        } else {
            SteelCurve::ColdWorked
        }
    }
}

/// Outcome of a stress-from-strain solve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressSolve {
    /// Design stress (MPa)
    pub stress_mpa: f64,
    /// Bisection steps taken (0 when a closed-form branch applied)
    pub iterations: u32,
    /// True when the strain is past the yield plateau
    pub yielded: bool,
}

/// Total strain reached at design stress `stress_mpa`.
pub fn steel_strain_at_stress(fy_mpa: f64, stress_mpa: f64) -> f64 {
    let fyd = 0.87 * fy_mpa;
    let elastic = stress_mpa / ES_MPA;
    match SteelCurve::for_fy(fy_mpa) {
        SteelCurve::MildSteel => elastic,
        SteelCurve::ColdWorked => {
            let ratio = stress_mpa / fyd;
            elastic + inelastic_strain(ratio)
        }
    }
}

fn inelastic_strain(stress_ratio: f64) -> f64 {
    let (first_ratio, _) = COLD_WORKED_CURVE[0];
    if stress_ratio <= first_ratio {
        return 0.0;
    }
    for pair in COLD_WORKED_CURVE.windows(2) {
        let (r0, e0) = pair[0];
        let (r1, e1) = pair[1];
        if stress_ratio <= r1 {
            return e0 + (e1 - e0) * (stress_ratio - r0) / (r1 - r0);
        }
    }
    COLD_WORKED_CURVE[COLD_WORKED_CURVE.len() - 1].1
}

/// Design stress in reinforcement for a given strain magnitude.
///
/// Non-positive strain returns zero stress; callers treat that as the bar
/// not being in compression.
pub fn design_steel_stress(fy_mpa: f64, strain: f64) -> StressSolve {
    let fyd = 0.87 * fy_mpa;
    if strain <= 0.0 {
        return StressSolve { stress_mpa: 0.0, iterations: 0, yielded: false };
    }

    match SteelCurve::for_fy(fy_mpa) {
        SteelCurve::MildSteel => {
            let elastic = strain * ES_MPA;
            StressSolve {
                stress_mpa: elastic.min(fyd),
                iterations: 0,
                yielded: elastic >= fyd,
            }
        }
        SteelCurve::ColdWorked => {
            if strain >= steel_strain_at_stress(fy_mpa, fyd) {
                return StressSolve { stress_mpa: fyd, iterations: 0, yielded: true };
            }
            let mut lo = 0.0;
            let mut hi = fyd;
            let mut iterations = 0;
            while hi - lo > STRESS_TOLERANCE_MPA && iterations < MAX_BISECTION_ITERATIONS {
                let mid = 0.5 * (lo + hi);
                if steel_strain_at_stress(fy_mpa, mid) < strain {
                    lo = mid;
                } else {
                    hi = mid;
                }
                iterations += 1;
            }
            StressSolve {
                stress_mpa: 0.5 * (lo + hi),
                iterations,
                yielded: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_properties() {
        assert!((bar_area_mm2(16.0) - 201.06).abs() < 0.01);
        // 16 mm bar ≈ 1.58 kg/m
        assert!((bar_mass_kg_per_m(16.0) - 1.578).abs() < 0.01);
    }

    #[test]
    fn test_mild_steel_is_elasto_plastic() {
        let below = design_steel_stress(250.0, 0.0005);
        assert!((below.stress_mpa - 100.0).abs() < 1e-9);
        assert!(!below.yielded);

        let above = design_steel_stress(250.0, 0.003);
        assert!((above.stress_mpa - 217.5).abs() < 1e-9);
        assert!(above.yielded);
    }

    #[test]
    fn test_cold_worked_elastic_region() {
        // 0.8·fyd for Fe415 = 288.84 MPa at strain 0.0014442
        let solve = design_steel_stress(415.0, 0.001);
        assert!((solve.stress_mpa - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_cold_worked_knee_matches_table() {
        // Point 0.95·fyd: strain = 0.95·361.05/2e5 + 0.0007
        let fyd = 0.87 * 415.0;
        let strain = 0.95 * fyd / ES_MPA + 0.0007;
        let solve = design_steel_stress(415.0, strain);
        assert!((solve.stress_mpa - 0.95 * fyd).abs() < 1e-3);
        assert!(solve.iterations > 0 && solve.iterations <= 100);
    }

    #[test]
    fn test_cold_worked_plateau() {
        let solve = design_steel_stress(500.0, 0.0035);
        assert!((solve.stress_mpa - 435.0).abs() < 1e-9);
        assert!(solve.yielded);
    }

    #[test]
    fn test_negative_strain_gives_zero() {
        let solve = design_steel_stress(415.0, -0.0002);
        assert_eq!(solve.stress_mpa, 0.0);
    }

    #[test]
    fn test_stress_monotone_in_strain() {
        let mut last = 0.0;
        for i in 1..60 {
            let strain = i as f64 * 0.0001;
            let s = design_steel_stress(500.0, strain).stress_mpa;
            assert!(s >= last - 1e-6);
            last = s;
        }
    }
}
