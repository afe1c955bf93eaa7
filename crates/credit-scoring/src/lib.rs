//! Credit pre-screening library.
//!
//! Validates applicant attributes, derives the 70% cash-flow estimate, assembles the ordered
//! feature vector and evaluates it against a pre-trained random-forest artifact. The
//! [`scoring::dashboard`] module turns the outcome into the view model rendered by the HTTP and
//! CLI surfaces.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
