//! Document parsing entry points.
//!
//! # Responsibility
//! - Split documents into metadata and body with caller-selected strictness.
//! - Render metadata and body back to document text.
//!
//! # See also
//! - `crate::service::note_service` for the full parse pipeline.

pub mod frontmatter;
