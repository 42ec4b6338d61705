//! Constraint-based academic timetable optimizer.
//!
//! Assigns lecture and lab sessions to faculty, classrooms and time slots
//! across student divisions, around classes that are already fixed, and
//! returns several diverse timetable options ranked by efficiency.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimeSlot`, `Faculty`, `Classroom`,
//!   `Division`, `ClassRequirement`, `Placement`, `ScheduleCandidate`,
//!   `Conflict`, `OptimizationResult`
//! - **`validation`**: Input integrity checks (duplicate ids, unknown
//!   references, malformed slots)
//! - **`conflict`**: Double-booking and soft-constraint detection
//! - **`generator`**: Randomized most-constrained-first backtracking on a
//!   rayon worker pool
//! - **`ranker`**: Efficiency score, KPIs, diversity filter, suggestions
//! - **`optimizer`**: The `optimize` entry point
//! - **`api`**: JSON wire layer for the timetable frontend
//! - **`config`**, **`error`**, **`logging`**: Ambient plumbing
//!
//! # Example
//!
//! ```
//! use timetable_optimizer::models::{
//!     ClassRequirement, Classroom, Division, Faculty, ReferenceData, TimeSlot,
//! };
//!
//! let reference = ReferenceData::new()
//!     .with_slot(TimeSlot::hourly("1", 9, 10))
//!     .with_slot(TimeSlot::hourly("2", 10, 11))
//!     .with_faculty(Faculty::new("F1").with_subject("Algorithms"))
//!     .with_classroom(Classroom::lecture("A-101"))
//!     .with_division(Division::new("SE-A"))
//!     .with_requirement(ClassRequirement::new("R1", "Algorithms").with_division("SE-A"));
//!
//! let results = timetable_optimizer::optimize(&reference, &[], 3).unwrap();
//! assert_eq!(results.len(), 3);
//! assert!(results[0].efficiency >= results[2].efficiency);
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod api;
pub mod config;
pub mod conflict;
pub mod error;
pub mod generator;
pub mod logging;
pub mod models;
pub mod optimizer;
pub mod ranker;
pub mod validation;

pub use error::OptimizeError;
pub use generator::CancelToken;
pub use optimizer::{optimize, Optimizer};
