//! # rc_core - Reinforced Concrete Beam Design Engine
//!
//! `rc_core` designs and checks reinforced concrete beams to the IS 456:2000
//! limit-state method: flexure (rectangular, doubly reinforced, flanged),
//! shear, deflection and crack width, with multi-case compliance checking
//! and detailing optimizers for bar layout and stock cutting.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions from inputs to result values
//! - **JSON-First**: All inputs and results implement Serialize/Deserialize
//! - **Rich Errors**: Validation failures are structured errors; design
//!   infeasibilities and table range substitutions are data inside results
//! - **Injected Tables**: Code tables are passed explicitly, never global mutable state
//!
//! ## Quick Start
//!
//! ```rust
//! use rc_core::calculations::flexure::design_singly_reinforced;
//! use rc_core::code_tables::CodeTables;
//! use rc_core::materials::Materials;
//! use rc_core::section::Section;
//!
//! let section = Section::rectangular(230.0, 450.0, 500.0, 25.0);
//! let materials = Materials::new(25.0, 500.0);
//! let result = design_singly_reinforced(&section, &materials, 150.0, CodeTables::standard()).unwrap();
//!
//! assert!(result.passes());
//! println!("Ast = {:.0} mm² ({})", result.ast_required_mm2, result.reason);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Flexure, shear, serviceability and the compliance orchestrator
//! - [`optimize`] - Reinforcement layout and cutting-stock optimizers
//! - [`code_tables`] - IS 456 lookup tables with range warnings
//! - [`section`] - Beam cross-section geometry
//! - [`materials`] - Concrete and steel grades, bar properties
//! - [`settings`] - Tunable defaults (TOML)
//! - [`schema`] - Versioned envelope for serialized results
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - [`logging`] - `tracing` subscriber setup

pub mod calculations;
pub mod code_tables;
pub mod errors;
pub mod logging;
pub mod materials;
pub mod optimize;
pub mod schema;
pub mod section;
pub mod settings;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{check_batch, check_beam, summarize, BeamDefinition, DesignAction, LoadCase};
pub use code_tables::CodeTables;
pub use errors::{CalcError, CalcResult};
pub use materials::Materials;
pub use schema::{ResultEnvelope, SCHEMA_VERSION};
pub use section::Section;
pub use settings::DesignSettings;
