//! # doml-mc
//!
//! Requirement verification for DOML infrastructure models: a
//! metamodel-driven SMT encoding, the DOMLR requirement DSL compiler, and
//! a parallel verification driver.
//!
//! ## Module structure (dependency order)
//!
//! ```text
//! driver     → partitions requirements across workers, runs the solver,
//!              assembles a VerificationReport
//!   ↓
//! domlr      → the DOMLR DSL: lex/parse/resolve/lower/polarity
//! builtins   → the per-version built-in requirement catalog
//!   ↓
//! encoding   → metamodel + Intermediate Model -> Z3 sorts/relations/axioms
//!   ↓
//! im         → Intermediate Model: normalized, identifier-keyed entity graph
//! metamodel  → versioned class/attribute/association schemas
//!   ↓
//! result     → the three-valued verdict and report types
//! base       → interning, spans, line/column positions
//! external   → trait contracts for out-of-scope collaborators (XMI, CSP, reports)
//! ```
//!
//! ## Pipeline
//!
//! A caller that already has an [`im::ObjectGraph`] (from its own XMI
//! adapter or otherwise) drives the pipeline directly:
//!
//! ```ignore
//! let registry = metamodel::MetamodelRegistry::global();
//! let im = im::build(registry, version, &object_graph)?;
//! let domlr_source = domlr::compile(&domlr_text)?;
//! let report = driver::run(registry, version, &im, &domlr_source, &options)?;
//! println!("{report}");
//! ```

pub mod base;
pub mod builtins;
pub mod domlr;
pub mod driver;
pub mod encoding;
pub mod error;
pub mod external;
pub mod im;
pub mod metamodel;
pub mod result;

pub use error::VerificationError;
