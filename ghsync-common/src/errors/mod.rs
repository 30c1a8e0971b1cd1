//! Error catalog and definitions for ghsync.
//!
//! Each subsystem defines its own `thiserror` enum next to its code; this
//! module provides the cross-cutting catalog of stable error codes with
//! operator-facing remediation steps.
//!
//! # Error Code Ranges
//!
//! | Range      | Category  | Description                            |
//! |------------|-----------|----------------------------------------|
//! | E001-E099  | Config    | Configuration and pre-flight errors    |
//! | E100-E199  | Issuance  | Decryption, signing, token exchange    |
//! | E200-E299  | Records   | Repo list parsing and classification   |
//! | E300-E399  | Git       | Clone, pull, and remote errors         |
//! | E500-E599  | Internal  | Internal/unexpected errors             |

pub mod catalog;

pub use catalog::{ErrorCategory, ErrorCode, ErrorEntry};
