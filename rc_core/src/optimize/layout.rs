//! # Reinforcement Layout
//!
//! Chooses a diameter, bar count and layer arrangement for a required
//! tension steel area.
//!
//! ## Search Space
//!
//! One candidate per diameter in the configured set, taken in the order
//! the settings list them:
//!
//! ```text
//! clear width   W  = b − 2·(cover + φstirrup)
//! clear spacing s  ≥ max(φ, aggregate + 5)                (IS 456 cl. 26.3.2)
//! bars/layer    nL = ⌊(W + s) / (φ + s)⌋                  (must be ≥ 2)
//! bar count     n  = max(⌈As,req / (πφ²/4)⌉, 2)
//! layers        L  = ⌈n / nL⌉                             (must be ≤ max layers)
//! ```
//!
//! The candidate set is finite and fixed, so the search always terminates
//! and identical inputs always choose the identical layout: candidates are
//! ranked by the objective and the first enumerated wins a tie.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::code_tables::clause;
use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::materials::{bar_area_mm2, bar_mass_kg_per_m};
use crate::settings::LayoutSettings;

/// Extra clearance over the aggregate size for horizontal bar spacing (mm)
const AGGREGATE_CLEARANCE_MM: f64 = 5.0;

/// Fewest bars allowed in a layer (one at each stirrup corner)
const MIN_BARS_PER_LAYER: u32 = 2;

/// What the layout search minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutObjective {
    /// Least steel mass per metre
    MinWeight,
    /// Fewest bars
    MinBarCount,
    /// Fewest layers, then fewest bars
    MinCongestion,
}

impl LayoutObjective {
    pub fn display_name(&self) -> &'static str {
        match self {
            LayoutObjective::MinWeight => "minimum weight",
            LayoutObjective::MinBarCount => "minimum bar count",
            LayoutObjective::MinCongestion => "minimum congestion",
        }
    }
}

/// Inputs to the layout search.
///
/// ## JSON Example
///
/// ```json
/// {
///   "required_area_mm2": 936.0,
///   "width_mm": 230.0,
///   "clear_cover_mm": 25.0,
///   "stirrup_diameter_mm": 8.0,
///   "objective": "MinBarCount"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRequest {
    /// Tension steel area to provide (mm²)
    pub required_area_mm2: f64,
    /// Web width (mm)
    pub width_mm: f64,
    /// Clear cover to the stirrups (mm)
    pub clear_cover_mm: f64,
    pub stirrup_diameter_mm: f64,
    /// Overrides the settings objective
    #[serde(default)]
    pub objective: Option<LayoutObjective>,
    /// Overrides the settings layer limit
    #[serde(default)]
    pub max_layers: Option<u32>,
    /// Only diameters at or above this are tried (mm)
    #[serde(default)]
    pub min_diameter_mm: Option<f64>,
    /// Only diameters at or below this are tried (mm)
    #[serde(default)]
    pub max_diameter_mm: Option<f64>,
}

impl LayoutRequest {
    pub fn new(required_area_mm2: f64, width_mm: f64, clear_cover_mm: f64, stirrup_diameter_mm: f64) -> Self {
        LayoutRequest {
            required_area_mm2,
            width_mm,
            clear_cover_mm,
            stirrup_diameter_mm,
            objective: None,
            max_layers: None,
            min_diameter_mm: None,
            max_diameter_mm: None,
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        require_positive("required_area_mm2", self.required_area_mm2)?;
        require_positive("width_mm", self.width_mm)?;
        require_non_negative("clear_cover_mm", self.clear_cover_mm)?;
        require_non_negative("stirrup_diameter_mm", self.stirrup_diameter_mm)?;
        if self.max_layers == Some(0) {
            return Err(CalcError::invalid_input("max_layers", "0", "At least one layer is required"));
        }
        Ok(())
    }

    /// Width between the inside faces of the stirrups (mm)
    pub fn clear_width_mm(&self) -> f64 {
        self.width_mm - 2.0 * (self.clear_cover_mm + self.stirrup_diameter_mm)
    }
}

/// A chosen arrangement of tension bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebarLayout {
    pub diameter_mm: f64,
    pub bar_count: u32,
    pub layers: u32,
    /// Bars in each layer, tension face first
    pub bars_per_layer: Vec<u32>,
    /// Smallest horizontal clear spacing over all layers (mm)
    pub clear_spacing_mm: f64,
    /// Vertical clear gap between layers (mm)
    pub layer_gap_mm: f64,
    pub area_provided_mm2: f64,
    pub weight_kg_per_m: f64,
    /// Centroid of the bars measured from the tension face (mm)
    pub centroid_from_tension_face_mm: f64,
}

/// Hard constraint that ruled out every candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum BindingConstraint {
    /// Two bars of the smallest tried diameter do not fit at minimum spacing
    WidthTooNarrow {
        diameter_mm: f64,
        clear_width_mm: f64,
        min_spacing_mm: f64,
    },
    /// Every diameter that fits the width needs more layers than allowed
    LayerLimitExceeded { max_layers: u32, fewest_layers_needed: u32 },
    /// The diameter filters left nothing to try
    NoDiameters,
}

impl BindingConstraint {
    pub fn describe(&self) -> String {
        match self {
            BindingConstraint::WidthTooNarrow { diameter_mm, clear_width_mm, min_spacing_mm } => format!(
                "insufficient width at minimum spacing for the smallest tried diameter: \
                 2 × {:.0} mm bars at {:.0} mm clear spacing need {:.0} mm, {:.0} mm available ({})",
                diameter_mm,
                min_spacing_mm,
                2.0 * diameter_mm + min_spacing_mm,
                clear_width_mm,
                clause::BAR_SPACING
            ),
            BindingConstraint::LayerLimitExceeded { max_layers, fewest_layers_needed } => format!(
                "layer limit exceeded: best candidate needs {} layers, {} allowed",
                fewest_layers_needed, max_layers
            ),
            BindingConstraint::NoDiameters => "no bar diameter within the requested range".to_string(),
        }
    }
}

/// Result of the layout search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome")]
pub enum LayoutOutcome {
    Feasible {
        layout: RebarLayout,
        objective: LayoutObjective,
        /// Number of feasible candidates compared
        candidates: usize,
    },
    Infeasible {
        constraint: BindingConstraint,
        reason: String,
    },
}

impl LayoutOutcome {
    pub fn is_feasible(&self) -> bool {
        matches!(self, LayoutOutcome::Feasible { .. })
    }

    pub fn layout(&self) -> Option<&RebarLayout> {
        match self {
            LayoutOutcome::Feasible { layout, .. } => Some(layout),
            LayoutOutcome::Infeasible { .. } => None,
        }
    }
}

/// Why a single diameter was rejected
enum Rejection {
    TooWide { clear_width_mm: f64, min_spacing_mm: f64 },
    TooManyLayers { layers: u32 },
}

/// Spread `count` bars over layers holding at most `per_layer`, keeping at
/// least two bars in the last layer.
fn distribute(count: u32, per_layer: u32) -> Vec<u32> {
    let mut layers = Vec::new();
    let mut remaining = count;
    while remaining > 0 {
        let take = remaining.min(per_layer);
        layers.push(take);
        remaining -= take;
    }
    let n = layers.len();
    if n > 1 && layers[n - 1] < MIN_BARS_PER_LAYER {
        let shift = MIN_BARS_PER_LAYER - layers[n - 1];
        layers[n - 2] -= shift;
        layers[n - 1] += shift;
    }
    layers
}

fn candidate(
    request: &LayoutRequest,
    settings: &LayoutSettings,
    diameter: f64,
    max_layers: u32,
) -> Result<RebarLayout, Rejection> {
    let clear_width = request.clear_width_mm();
    let min_spacing = diameter.max(settings.aggregate_size_mm + AGGREGATE_CLEARANCE_MM);
    let per_layer = if clear_width > 0.0 {
        ((clear_width + min_spacing) / (diameter + min_spacing)).floor() as u32
    } else {
        0
    };
    if per_layer < MIN_BARS_PER_LAYER {
        return Err(Rejection::TooWide { clear_width_mm: clear_width, min_spacing_mm: min_spacing });
    }

    let area = bar_area_mm2(diameter);
    let needed = (request.required_area_mm2 / area).ceil().max(MIN_BARS_PER_LAYER as f64);
    let too_many = || Rejection::TooManyLayers {
        layers: (needed / per_layer as f64).ceil().min(u32::MAX as f64) as u32,
    };
    if needed > u32::MAX as f64 {
        return Err(too_many());
    }
    let mut count = needed as u32;
    // A lone bar cannot sit in a layer of its own
    if per_layer == MIN_BARS_PER_LAYER && count % 2 == 1 {
        count = count.checked_add(1).ok_or_else(too_many)?;
    }
    let layers = count.div_ceil(per_layer);
    if layers > max_layers {
        return Err(Rejection::TooManyLayers { layers });
    }

    let bars_per_layer = distribute(count, per_layer);
    let clear_spacing = bars_per_layer
        .iter()
        .map(|&k| (clear_width - k as f64 * diameter) / (k - 1) as f64)
        .fold(f64::INFINITY, f64::min);

    // Vertical gap: IS 456 cl. 26.3.2(b)
    let layer_gap = settings.min_layer_gap_mm.max(diameter).max(2.0 * settings.aggregate_size_mm / 3.0);
    let first_layer = request.clear_cover_mm + request.stirrup_diameter_mm + diameter / 2.0;
    let moment: f64 = bars_per_layer
        .iter()
        .enumerate()
        .map(|(i, &k)| k as f64 * (first_layer + i as f64 * (diameter + layer_gap)))
        .sum();

    Ok(RebarLayout {
        diameter_mm: diameter,
        bar_count: count,
        layers,
        bars_per_layer,
        clear_spacing_mm: clear_spacing,
        layer_gap_mm: layer_gap,
        area_provided_mm2: count as f64 * area,
        weight_kg_per_m: count as f64 * bar_mass_kg_per_m(diameter),
        centroid_from_tension_face_mm: moment / count as f64,
    })
}

/// True when `a` ranks strictly ahead of `b` under the objective
fn better(objective: LayoutObjective, a: &RebarLayout, b: &RebarLayout) -> bool {
    let key = |l: &RebarLayout| match objective {
        LayoutObjective::MinWeight => (l.weight_kg_per_m, l.bar_count as f64, l.layers as f64),
        LayoutObjective::MinBarCount => (l.bar_count as f64, l.weight_kg_per_m, l.layers as f64),
        LayoutObjective::MinCongestion => (l.layers as f64, l.bar_count as f64, l.weight_kg_per_m),
    };
    key(a) < key(b)
}

/// Every feasible candidate, in enumeration order.
pub fn candidate_layouts(request: &LayoutRequest, settings: &LayoutSettings) -> CalcResult<Vec<RebarLayout>> {
    request.validate()?;
    settings.validate()?;
    let max_layers = request.max_layers.unwrap_or(settings.max_layers);
    Ok(diameters(request, settings)
        .filter_map(|d| candidate(request, settings, d, max_layers).ok())
        .collect())
}

fn diameters<'a>(request: &'a LayoutRequest, settings: &'a LayoutSettings) -> impl Iterator<Item = f64> + 'a {
    settings.diameters_mm.iter().copied().filter(move |&d| {
        request.min_diameter_mm.map_or(true, |lo| d >= lo) && request.max_diameter_mm.map_or(true, |hi| d <= hi)
    })
}

/// Choose a layout for the required area.
#[instrument(skip_all, fields(area = request.required_area_mm2, width = request.width_mm))]
pub fn optimize_layout(request: &LayoutRequest, settings: &LayoutSettings) -> CalcResult<LayoutOutcome> {
    request.validate()?;
    settings.validate()?;
    let objective = request.objective.unwrap_or(settings.objective);
    let max_layers = request.max_layers.unwrap_or(settings.max_layers);

    let mut best: Option<RebarLayout> = None;
    let mut feasible = 0;
    let mut narrowest: Option<(f64, f64, f64)> = None;
    let mut fewest_layers: Option<u32> = None;
    let mut tried = 0;

    for diameter in diameters(request, settings) {
        tried += 1;
        match candidate(request, settings, diameter, max_layers) {
            Ok(layout) => {
                feasible += 1;
                debug!(diameter, count = layout.bar_count, layers = layout.layers, "feasible candidate");
                if best.as_ref().map_or(true, |b| better(objective, &layout, b)) {
                    best = Some(layout);
                }
            }
            Err(Rejection::TooWide { clear_width_mm, min_spacing_mm }) => {
                if narrowest.map_or(true, |(d, _, _)| diameter < d) {
                    narrowest = Some((diameter, clear_width_mm, min_spacing_mm));
                }
            }
            Err(Rejection::TooManyLayers { layers }) => {
                fewest_layers = Some(fewest_layers.map_or(layers, |f| f.min(layers)));
            }
        }
    }

    if let Some(layout) = best {
        return Ok(LayoutOutcome::Feasible { layout, objective, candidates: feasible });
    }

    let constraint = match (tried, fewest_layers, narrowest) {
        (0, _, _) => BindingConstraint::NoDiameters,
        (_, Some(layers), _) => BindingConstraint::LayerLimitExceeded { max_layers, fewest_layers_needed: layers },
        (_, None, Some((diameter_mm, clear_width_mm, min_spacing_mm))) => {
            BindingConstraint::WidthTooNarrow { diameter_mm, clear_width_mm, min_spacing_mm }
        }
        (_, None, None) => {
            return Err(CalcError::Internal { message: "layout search rejected nothing yet found nothing".to_string() })
        }
    };
    let reason = constraint.describe();
    debug!(%reason, "no feasible layout");
    Ok(LayoutOutcome::Infeasible { constraint, reason })
}
