//! Blast design calculators.
//!
//! Pure metric formulas used by the router for calculator requests: powder
//! factor and charge per hole, scaled distance, starter rules of thumb, a
//! parametric Langefors–Kihlström burden/spacing rule, and a cartridge count
//! estimate. Lengths are metres, hole and cartridge diameters are millimetres,
//! densities are kg/m³ and masses kg.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;

/// Feet to metres.
pub const FT_TO_M: f64 = 0.3048;
/// Pounds to kilograms.
pub const LB_TO_KG: f64 = 0.453_592_37;

pub fn mm_to_m(mm: f64) -> f64 {
    mm / 1000.0
}

pub fn ft_to_m(ft: f64) -> f64 {
    ft * FT_TO_M
}

pub fn lb_to_kg(lb: f64) -> f64 {
    lb * LB_TO_KG
}

/// Cross-section area (m²) of a hole with diameter `diameter_m`.
pub fn circle_area(diameter_m: f64) -> f64 {
    let r = diameter_m / 2.0;
    PI * r * r
}

/// Design inputs used whenever a request does not give a value explicitly.
///
/// Field aliases match the `key=value` names users type (`h`, `rho`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignDefaults {
    /// Bench height H (m).
    #[serde(alias = "h")]
    pub bench_height: f64,
    /// Subdrill J (m).
    #[serde(alias = "j")]
    pub subdrill: f64,
    /// Stemming T (m).
    #[serde(alias = "t")]
    pub stemming: f64,
    /// Burden B (m).
    #[serde(alias = "b")]
    pub burden: f64,
    /// Spacing S (m).
    #[serde(alias = "s")]
    pub spacing: f64,
    /// Hole diameter D (mm).
    #[serde(alias = "d")]
    pub hole_diameter_mm: f64,
    /// Explosive density ρ (kg/m³).
    #[serde(alias = "rho")]
    pub explosive_density: f64,
    /// Langefors–Kihlström burden coefficient k.
    pub lk_k: f64,
    /// Langefors–Kihlström spacing/burden ratio α.
    pub lk_alpha: f64,
    /// Langefors–Kihlström energy/rock factor F.
    pub lk_f: f64,
    /// Cartridge length (m).
    pub cartridge_length: f64,
    /// Cartridge diameter (mm).
    pub cartridge_diameter_mm: f64,
    /// Cartridge density (kg/m³).
    pub cartridge_density: f64,
}

impl Default for DesignDefaults {
    fn default() -> Self {
        Self {
            bench_height: 10.0,
            subdrill: 0.5,
            stemming: 2.0,
            burden: 3.0,
            spacing: 3.5,
            hole_diameter_mm: 165.0,
            explosive_density: 1000.0,
            lk_k: 30.0,
            lk_alpha: 1.25,
            lk_f: 1.0,
            cartridge_length: 0.40,
            cartridge_diameter_mm: 83.0,
            cartridge_density: 1100.0,
        }
    }
}

impl DesignDefaults {
    /// Reads defaults from a JSON object; missing fields keep their default.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let defaults: Self = serde_json::from_str(&data)?;
        tracing::info!(path = %path.display(), "Design defaults loaded");
        Ok(defaults)
    }
}

/// Charged column length H + J − T, never negative.
pub fn charged_length(bench_height: f64, subdrill: f64, stemming: f64) -> f64 {
    (bench_height + subdrill - stemming).max(0.0)
}

/// Result of [`powder_factor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowderFactor {
    /// kg/m³; 0.0 when the rock volume is not positive.
    pub powder_factor: f64,
    pub charge_per_hole: f64,
    pub charged_length: f64,
    pub rock_volume: f64,
}

/// Powder factor for one bench hole.
///
/// charge = ρ × π(D/2)² × (H + J − T), volume = B × S × H, PF = charge / volume.
pub fn powder_factor(
    bench_height: f64,
    burden: f64,
    spacing: f64,
    subdrill: f64,
    stemming: f64,
    hole_diameter_mm: f64,
    density: f64,
) -> PowderFactor {
    let area = circle_area(mm_to_m(hole_diameter_mm));
    let charged_length = charged_length(bench_height, subdrill, stemming);
    let charge_per_hole = density * area * charged_length;
    let rock_volume = burden * spacing * bench_height;
    let powder_factor = if rock_volume > 0.0 {
        charge_per_hole / rock_volume
    } else {
        0.0
    };
    PowderFactor {
        powder_factor,
        charge_per_hole,
        charged_length,
        rock_volume,
    }
}

/// Scaled distance (m/√kg) = distance / √(charge per delay).
///
/// `None` when the charge is not positive.
pub fn scaled_distance(distance_m: f64, charge_kg: f64) -> Option<f64> {
    if charge_kg <= 0.0 {
        return None;
    }
    Some(distance_m / charge_kg.sqrt())
}

/// Burden and spacing pair (m).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurdenSpacing {
    pub burden: f64,
    pub spacing: f64,
}

/// Parametric Langefors–Kihlström rule: B = k·(D/1000)·√F, S = α·B.
///
/// Negative F is clamped to zero.
pub fn lk_burden_spacing(hole_diameter_mm: f64, k: f64, alpha: f64, f: f64) -> BurdenSpacing {
    let burden = k * mm_to_m(hole_diameter_mm) * f.max(0.0).sqrt();
    BurdenSpacing {
        burden,
        spacing: alpha * burden,
    }
}

/// Starter rules of thumb for bench blasting (m).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarterRules {
    pub burden: f64,
    pub spacing: f64,
    pub stemming: f64,
}

/// B ≈ 30·D, S ≈ 1.25·B, T ≈ 25·D, with D in metres.
pub fn starter_rules(hole_diameter_mm: f64) -> StarterRules {
    let d = mm_to_m(hole_diameter_mm);
    let burden = 30.0 * d;
    StarterRules {
        burden,
        spacing: 1.25 * burden,
        stemming: 25.0 * d,
    }
}

/// Result of [`cartridge_estimate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartridgeEstimate {
    pub count: u64,
    pub mass_per_cartridge: f64,
    pub total_mass: f64,
}

/// Nobel-style packaged explosive estimate: cartridges needed to fill the
/// charged length (rounded up) and their mass.
///
/// A non-positive cartridge length yields zero cartridges. Counts beyond
/// `u64::MAX` saturate.
pub fn cartridge_estimate(
    charged_length: f64,
    cartridge_length: f64,
    cartridge_diameter_mm: f64,
    cartridge_density: f64,
) -> CartridgeEstimate {
    let volume = circle_area(mm_to_m(cartridge_diameter_mm)) * cartridge_length;
    let mass_per_cartridge = cartridge_density * volume;
    let count = if cartridge_length > 0.0 {
        (charged_length / cartridge_length).ceil().max(0.0) as u64
    } else {
        0
    };
    CartridgeEstimate {
        count,
        mass_per_cartridge,
        total_mass: count as f64 * mass_per_cartridge,
    }
}
