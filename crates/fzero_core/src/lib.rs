//! Codec for the battery-backed save memory (SRAM) of the SNES game F-Zero.
//!
//! The 2048-byte image holds 512 meaningful bytes: a signature, three league
//! record tables with their checksums, an unlock byte and a second signature.
//! [`save::Save`] decodes and encodes the whole image, [`merge`] combines
//! several images, and [`core_api`] wraps both for front ends.

pub mod bits;
pub mod checksum;
pub mod core_api;
pub mod diagnostics;
pub mod layout;
pub mod league;
pub mod merge;
pub mod record;
pub mod save;
pub mod time;
