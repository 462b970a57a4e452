//! Devicetree fragment generation.
//!
//! The generator walks the four category groupings in a fixed order, asks the
//! chip to resolve each record, and emits one stanza per resolved record.
//! Unresolved or misfiled records are logged and skipped; generation always
//! runs to completion and describes whatever did resolve.

use std::io::Write;

use anyhow::Result;
use chrono::Datelike;

use crate::{
    chip::Chip,
    line_names::{Anchor, LineNameTable},
    pins::{Category, Pin, PinSet},
};

// File header for the generated fragment.
const HEADER: &str = r#"/* Copyright $YEAR The EC Authors
 * SPDX-License-Identifier: Apache-2.0
 *
 * This file is auto-generated by ec-pinmap - do not edit!
 */
"#;

/// Generate the fragment with the current year in the header.
pub fn generate(
    out: &mut impl Write,
    pins: &mut PinSet,
    chip: &mut dyn Chip,
    names: bool,
) -> Result<()> {
    generate_with_year(out, pins, chip, names, chrono::Utc::now().year())
}

/// Generate the fragment. Output is byte-identical for identical inputs and
/// year.
pub fn generate_with_year(
    out: &mut impl Write,
    pins: &mut PinSet,
    chip: &mut dyn Chip,
    names: bool,
    year: i32,
) -> Result<()> {
    write!(out, "{}", HEADER.replace("$YEAR", &year.to_string()))?;
    writeln!(out, "\n/ {{")?;

    let mut line_names = LineNameTable::new();

    adc_block(out, &mut pins.adc, chip)?;
    gpio_block(out, &mut pins.gpio, chip, &mut line_names)?;
    i2c_block(out, &mut pins.i2c, chip)?;
    pwm_block(out, &mut pins.pwm, chip)?;

    writeln!(out, "}};")?;

    // One enable override per distinct node the chip recorded.
    for node in chip.enabled_nodes() {
        writeln!(out, "\n&{node} {{\n\tstatus = \"okay\";\n}};")?;
    }

    if names {
        line_names.emit(out, Anchor::Label)?;
    }

    Ok(())
}

/// True if the record belongs in the block being generated. A record filed
/// under the wrong category by the reader is logged and skipped.
fn expected_type(pin: &Pin, category: Category) -> bool {
    if pin.pin_type.category() == category {
        return true;
    }
    log::warn!(
        "signal '{}' has type {} which does not belong in the {} block, skipped",
        pin.signal,
        pin.pin_type,
        category
    );
    false
}

fn skip_unresolved(pin: &Pin, capability: &str) {
    log::warn!(
        "no {} on pin '{}' (signal '{}'), skipped",
        capability,
        pin.pin,
        pin.signal
    );
}

fn open_block(out: &mut impl Write, compatible: &str) -> Result<()> {
    writeln!(out, "\n\tnamed-{compatible} {{")?;
    writeln!(out, "\t\tcompatible = \"named-{compatible}\";\n")?;
    Ok(())
}

fn close_block(out: &mut impl Write) -> Result<()> {
    writeln!(out, "\t}};")?;
    Ok(())
}

fn adc_block(out: &mut impl Write, records: &mut [Pin], chip: &mut dyn Chip) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    records.sort_by(|a, b| a.signal.cmp(&b.signal));

    open_block(out, "adc-channels")?;
    for pin in records.iter() {
        if !expected_type(pin, Category::Adc) {
            continue;
        }
        let Some(channel) = chip.adc(&pin.pin) else {
            skip_unresolved(pin, "ADC channel");
            continue;
        };

        let ident = pin.ident();
        writeln!(out, "\t\tadc_{ident}: {ident} {{")?;
        if !pin.enum_name.is_empty() {
            writeln!(out, "\t\t\tenum-name = \"{}\";", pin.enum_name)?;
        }
        writeln!(out, "\t\t\tio-channels = <&adc0 {channel}>;")?;
        writeln!(out, "\t\t}};")?;
    }
    close_block(out)
}

fn gpio_block(
    out: &mut impl Write,
    records: &mut [Pin],
    chip: &mut dyn Chip,
    line_names: &mut LineNameTable,
) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    records.sort_by(|a, b| a.signal.cmp(&b.signal));

    open_block(out, "gpios")?;
    for pin in records.iter() {
        if !expected_type(pin, Category::Gpio) {
            continue;
        }
        let Some((controller, offset)) = chip.gpio(&pin.pin) else {
            skip_unresolved(pin, "GPIO");
            continue;
        };
        // All GPIO categories carry a flags expression.
        let flags = pin.pin_type.gpio_flags().unwrap();

        let ident = pin.ident();
        writeln!(out, "\t\tgpio_{ident}: {ident} {{")?;
        writeln!(out, "\t\t\tgpios = <&{controller} {offset} {flags}>;")?;
        if !pin.enum_name.is_empty() {
            writeln!(out, "\t\t\tenum-name = \"{}\";", pin.enum_name)?;
        }
        writeln!(out, "\t\t}};")?;

        if let Err(e) = line_names.record(&controller, offset as usize, &ident) {
            log::warn!(
                "line name '{}' for {} pin {}: {}, skipped",
                ident,
                controller,
                offset,
                e
            );
        }
    }
    close_block(out)
}

fn i2c_block(out: &mut impl Write, records: &mut [Pin], chip: &mut dyn Chip) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    // Signal names do not correlate with physical bus grouping, so this block
    // orders by the resolved bus label instead. Resolution therefore happens
    // up front, and the resolved label is reused for emission so enable
    // targets accumulate once per record.
    records.sort_by(|a, b| a.signal.cmp(&b.signal));

    let mut resolved = Vec::new();
    for pin in records.iter() {
        if !expected_type(pin, Category::I2c) {
            continue;
        }
        let Some(bus) = chip.i2c(&pin.pin) else {
            skip_unresolved(pin, "I2C bus");
            continue;
        };
        resolved.push((bus, pin));
    }
    resolved.sort_by(|a, b| a.0.cmp(&b.0));

    open_block(out, "i2c-ports")?;
    for (bus, pin) in resolved {
        let ident = pin.ident();
        writeln!(out, "\t\ti2c_{ident}: {ident} {{")?;
        writeln!(out, "\t\t\ti2c-port = <&{bus}>;")?;
        if !pin.enum_name.is_empty() {
            writeln!(out, "\t\t\tenum-names = \"{}\";", pin.enum_name)?;
        }
        writeln!(out, "\t\t}};")?;
    }
    close_block(out)
}

fn pwm_block(out: &mut impl Write, records: &mut [Pin], chip: &mut dyn Chip) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    records.sort_by(|a, b| a.signal.cmp(&b.signal));

    open_block(out, "pwms")?;
    for pin in records.iter() {
        if !expected_type(pin, Category::Pwm) {
            continue;
        }
        let Some(node) = chip.pwm(&pin.pin) else {
            skip_unresolved(pin, "PWM channel");
            continue;
        };
        let polarity = match pin.pin_type {
            crate::pins::PinType::PwmInvert => 1,
            _ => 0,
        };

        let ident = pin.ident();
        writeln!(out, "\t\tpwm_{ident}: {ident} {{")?;
        writeln!(out, "\t\t\tpwms = <&{node} 0 {polarity}>;")?;
        if !pin.enum_name.is_empty() {
            writeln!(out, "\t\t\tenum-name = \"{}\";", pin.enum_name)?;
        }
        writeln!(out, "\t\t}};")?;
    }
    close_block(out)
}
