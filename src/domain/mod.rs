//! Domain types for the margin calculator.
//!
//! This module provides:
//! - The seller's input record and its single resolution step to canonical form
//! - Calculator results and the qualitative status
//! - Marketplace identifiers with their fee presets
//! - A lossless decimal type for amounts rendered as text

pub mod decimal;
pub mod input;
pub mod platform;
pub mod result;

pub use decimal::Decimal;
pub use input::{MarginInput, ResolvedInput, TaxType, DEFAULT_VAT_RATE};
pub use platform::{lookup, FeePreset, Platform, PlatformParseError};
pub use result::{MarginResult, Status};
