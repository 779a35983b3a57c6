//! # Detailing Optimizers
//!
//! Discrete searches that turn design results into buildable reinforcement:
//!
//! - [`layout`] - Diameter, count and layers for a required steel area
//! - [`cutting`] - Stock-bar cutting plans for a bar mark
//!
//! Both searches are bounded by construction: the layout search visits one
//! candidate per configured diameter, and the exact cutting search stops
//! at a node limit.

pub mod cutting;
pub mod layout;

pub use cutting::{
    plan_cutting, CutRequirement, CuttingPlan, CuttingRequest, CuttingStrategy, PlanStrategy, StockBar, StockUsage,
};
pub use layout::{
    candidate_layouts, optimize_layout, BindingConstraint, LayoutObjective, LayoutOutcome, LayoutRequest, RebarLayout,
};
