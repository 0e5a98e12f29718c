//! Chip variant definitions and lookup
//!
//! The ISD1700 family spans ten part numbers that share one command set but
//! differ in storage capacity and timing. Everything variant-specific lives
//! in the static [`VariantDescriptor`] table so the rest of the driver can
//! consult it by value instead of branching on the part number.

mod types;
mod variants;

pub use types::{DeviceType, VariantDescriptor};
pub use variants::{variant_by_device_id, VARIANTS};
