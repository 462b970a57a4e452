//! Devicetree fragment generation from EC pin-assignment data.
//!
//! A board's pin assignment lives in a spreadsheet with one pin column per
//! chip model. This crate resolves each assigned pin against the chosen
//! chip's multiplexing tables and writes the devicetree fragment the firmware
//! build includes: named peripheral stanzas, `status = "okay"` overrides for
//! every peripheral in use, and optional per-controller `gpio-line-names`
//! tables. A second entry point recovers the same line-name tables from an
//! already-compiled devicetree blob.

pub mod chip;
pub mod chips;
pub mod dtb;
pub mod generate;
pub mod line_names;
pub mod named_gpios;
pub mod pins;
pub mod readers;

pub use crate::{
    chip::{Chip, ChipRegistry},
    pins::{Pin, PinSet, PinType},
    readers::{Reader, ReaderRegistry},
};
