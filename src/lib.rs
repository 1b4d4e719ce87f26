//! # Draupnir-RS: Structural Copy-Paste Detection Engine
//!
//! A clone detection engine that finds duplicated logic across function
//! bodies, even after renames and light edits. Source is lowered into
//! canonical syntax trees and compared structurally:
//!
//! - **Canonical Trees**: language-neutral function trees with positional
//!   parameters canonicalized away
//! - **Structural Hashing**: literal, index and usage hash passes over
//!   every subtree, so renamed variables still collide
//! - **Run Matching**: greedy longest-run matching of consecutive
//!   duplicated statements between function pairs
//! - **Nested Block Search**: recursive descent into loop and branch
//!   bodies, so a flat body can match the inside of a loop
//! - **Reporting**: ranked JSON, Markdown and HTML reports with byte spans
//!   mapped back to source lines
//!
//! ## Performance Features
//!
//! - Parallel function-pair comparison via work stealing
//! - One hashing pass per function, reused across every pair
//! - Optional wall-clock deadline for very large corpora
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CLI / Library API                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Core Passes   │  Detectors   │  Language    │  I/O         │
//! │                │              │  Front-ends  │              │
//! │ • Canonicalize │ • Clone      │ • Python     │ • Discovery  │
//! │ • Scopes       │   finder     │              │ • Reports    │
//! │ • Weights      │ • Run        │              │              │
//! │ • Hashing      │   matcher    │              │              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! use draupnir_rs::{CloneDetector, DraupnirConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let detector = CloneDetector::new(DraupnirConfig::default())?;
//!     let analysis = detector.analyze_paths(&[PathBuf::from("./src")])?;
//!
//!     for record in &analysis.records {
//!         println!(
//!             "{} duplicates {} over {} statements",
//!             record.function_a.qualified(),
//!             record.function_b.qualified(),
//!             record.run_length,
//!         );
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Canonical trees and preparation passes
pub mod core {
    //! Core data structures and the per-function preparation passes.

    pub mod canonicalize;
    pub mod config;
    pub mod errors;
    pub mod hashing;
    pub mod metrics;
    pub mod prepare;
    pub mod scopes;
    pub mod tree;
}

// Detection algorithms over prepared functions
pub mod detectors {
    //! Clone detection over prepared functions.

    pub mod clones;
}

// Language-specific front-ends
pub mod lang {
    //! Language front-ends lowering source into canonical trees.

    pub mod common;
    pub mod python;
}

// File discovery and report output
pub mod io {
    //! Source file discovery and report rendering.

    pub mod reports;
    pub mod walk;
}

// Re-export primary types for convenience
pub use crate::core::config::{DraupnirConfig, ReportFormat};
pub use crate::core::errors::{DraupnirError, Result, ResultExt};
pub use crate::detectors::clones::{CloneAnalysis, CloneDetector, CloneRecord};
pub use crate::io::reports::ReportGenerator;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
