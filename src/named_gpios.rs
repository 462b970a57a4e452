//! Line-name extraction from a compiled devicetree blob.
//!
//! Boards that never went through the spreadsheet flow still declare their
//! named GPIOs in the compiled tree. This walks the blob, pairs every
//! `named-gpios` child with its controller, and emits the same contiguous
//! `gpio-line-names` arrays the spreadsheet generator produces.

use std::{collections::HashMap, io::Write};

use anyhow::Result;

use crate::{
    dtb::Node,
    line_names::{Anchor, LineNameTable},
};

/// Pin count assumed for controllers that do not declare `ngpios`.
const DEFAULT_NGPIOS: u32 = 32;

/// Number of cells in a `gpios` reference: controller handle, pin offset,
/// flags.
const GPIO_CELLS: usize = 3;

pub fn extract(out: &mut impl Write, root: &Node) -> Result<()> {
    let mut table = LineNameTable::new();
    let mut by_handle: HashMap<u32, &str> = HashMap::new();

    // Controllers first, so every line reference below can be validated
    // against a declared pin count.
    root.walk(&mut |node| {
        if !node.has_prop("gpio-controller") {
            return;
        }
        let Some(handle) = node.prop_u32("phandle") else {
            log::warn!(
                "GPIO controller '{}' has no usable phandle, skipped",
                node.name()
            );
            return;
        };
        let ngpios = node.prop_u32("ngpios").unwrap_or(DEFAULT_NGPIOS);
        table.add_controller(node.name(), ngpios as usize);
        by_handle.insert(handle, node.name());
    });

    for group in root.find_all(&|node| node.prop_string_list("compatible").contains(&"named-gpios"))
    {
        for line in group.children() {
            let Some(gpios) = line.prop_raw("gpios") else {
                log::warn!("named line '{}' has no gpios property, skipped", line.name());
                continue;
            };
            if gpios.len() != GPIO_CELLS * 4 {
                log::warn!(
                    "named line '{}' has a malformed gpios property ({} bytes), skipped",
                    line.name(),
                    gpios.len()
                );
                continue;
            }

            let cell = |i: usize| u32::from_be_bytes(gpios[i * 4..i * 4 + 4].try_into().unwrap());
            let handle = cell(0);
            let offset = cell(1);
            // cell(2) is the flags word, which line naming does not use.

            let Some(controller) = by_handle.get(&handle) else {
                log::warn!(
                    "named line '{}' references unknown controller handle {}, skipped",
                    line.name(),
                    handle
                );
                continue;
            };

            if let Err(e) = table.assign(controller, offset as usize, line.name()) {
                log::warn!(
                    "named line '{}' on {} pin {}: {}, skipped",
                    line.name(),
                    controller,
                    offset,
                    e
                );
            }
        }
    }

    table.emit(out, Anchor::Node)
}
