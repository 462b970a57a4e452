//! Per-controller GPIO line-name arrays.
//!
//! Firmware debug tooling indexes these arrays by pin offset, so emission must
//! be contiguous from slot 0 through the highest assigned offset with empty
//! strings filling unassigned slots. Both the spreadsheet generator and the
//! compiled-blob extractor feed this table.

use std::{collections::BTreeMap, fmt, io::Write};

use anyhow::Result;

/// How a controller stanza is referenced in the emitted fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `&gpioa { ... };`, overriding a labelled node.
    Label,
    /// `gpio@40081000 { ... };`, keyed by the controller's own node name.
    Node,
}

/// Why an assignment was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignError {
    UnknownController,
    /// Offset is outside the controller's declared pin count.
    OutOfRange { capacity: usize },
    /// The slot already holds a name; first assignment wins.
    Occupied,
}

impl fmt::Display for AssignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignError::UnknownController => write!(f, "unknown controller"),
            AssignError::OutOfRange { capacity } => {
                write!(f, "offset outside the controller's {capacity} pins")
            }
            AssignError::Occupied => write!(f, "slot already named"),
        }
    }
}

#[derive(Debug)]
struct Controller {
    names: Vec<String>,
    /// Declared pin count; `None` grows on demand (spreadsheet path).
    capacity: Option<usize>,
    /// Highest offset that received a name; `None` means emit nothing.
    max_assigned: Option<usize>,
}

impl Controller {
    fn assign(&mut self, offset: usize, name: &str) -> Result<(), AssignError> {
        if let Some(capacity) = self.capacity {
            if offset >= capacity {
                return Err(AssignError::OutOfRange { capacity });
            }
        }
        if offset >= self.names.len() {
            self.names.resize(offset + 1, String::new());
        }
        if !self.names[offset].is_empty() {
            return Err(AssignError::Occupied);
        }

        self.names[offset] = name.to_string();
        self.max_assigned = Some(self.max_assigned.map_or(offset, |max| max.max(offset)));
        Ok(())
    }
}

/// Line names collected for all controllers of one run.
#[derive(Debug, Default)]
pub struct LineNameTable {
    controllers: BTreeMap<String, Controller>,
}

impl LineNameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register a controller with a declared pin count.
    ///
    /// Assignments via [`assign`](Self::assign) are bounds-checked against the
    /// count, and the controller emits nothing until a slot is named.
    pub fn add_controller(&mut self, name: &str, capacity: usize) {
        self.controllers
            .entry(name.to_string())
            .or_insert(Controller {
                names: Vec::new(),
                capacity: Some(capacity),
                max_assigned: None,
            });
    }

    /// Name a slot of a pre-registered controller.
    pub fn assign(&mut self, controller: &str, offset: usize, name: &str) -> Result<(), AssignError> {
        self.controllers
            .get_mut(controller)
            .ok_or(AssignError::UnknownController)?
            .assign(offset, name)
    }

    /// Name a slot, creating the controller on first use (no declared pin
    /// count, so offsets are unbounded).
    pub fn record(&mut self, controller: &str, offset: usize, name: &str) -> Result<(), AssignError> {
        self.controllers
            .entry(controller.to_string())
            .or_insert(Controller {
                names: Vec::new(),
                capacity: None,
                max_assigned: None,
            })
            .assign(offset, name)
    }

    /// True if no controller has any named slot.
    pub fn is_empty(&self) -> bool {
        self.controllers
            .values()
            .all(|controller| controller.max_assigned.is_none())
    }

    /// Emit one `gpio-line-names` stanza per controller with at least one
    /// named slot, controllers in lexicographic order, each array contiguous
    /// from slot 0 through the controller's highest named offset.
    pub fn emit(&self, out: &mut impl Write, anchor: Anchor) -> Result<()> {
        for (name, controller) in &self.controllers {
            let Some(max_assigned) = controller.max_assigned else {
                continue;
            };

            match anchor {
                Anchor::Label => writeln!(out, "\n&{name} {{")?,
                Anchor::Node => writeln!(out, "\n{name} {{")?,
            }
            writeln!(out, "\tgpio-line-names =")?;
            for offset in 0..=max_assigned {
                let line = controller.names.get(offset).map_or("", String::as_str);
                let terminator = if offset == max_assigned { ';' } else { ',' };
                writeln!(out, "\t\t\"{line}\"{terminator}")?;
            }
            writeln!(out, "}};")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn emitted(table: &LineNameTable, anchor: Anchor) -> String {
        let mut out = Vec::new();
        table.emit(&mut out, anchor).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn interior_slots_fill_with_empty_strings() {
        let mut table = LineNameTable::new();
        table.record("gpioa", 4, "ec_wp_l").unwrap();
        table.record("gpioa", 1, "ec_int").unwrap();

        assert_eq!(
            emitted(&table, Anchor::Label),
            "\n&gpioa {\n\
             \tgpio-line-names =\n\
             \t\t\"\",\n\
             \t\t\"ec_int\",\n\
             \t\t\"\",\n\
             \t\t\"\",\n\
             \t\t\"ec_wp_l\";\n\
             };\n"
        );
    }

    #[test]
    fn controllers_emit_in_lexicographic_order() {
        let mut table = LineNameTable::new();
        table.record("gpiof", 0, "late").unwrap();
        table.record("gpioa", 0, "early").unwrap();

        let out = emitted(&table, Anchor::Label);
        let first = out.find("&gpioa").unwrap();
        let second = out.find("&gpiof").unwrap();
        assert!(first < second);
    }

    #[test]
    fn unnamed_controller_emits_nothing() {
        let mut table = LineNameTable::new();
        table.add_controller("gpio@40081000", 32);
        assert!(table.is_empty());
        assert_eq!(emitted(&table, Anchor::Node), "");
    }

    #[test]
    fn first_assignment_wins() {
        let mut table = LineNameTable::new();
        table.record("gpioa", 2, "first").unwrap();
        assert_eq!(
            table.record("gpioa", 2, "second"),
            Err(AssignError::Occupied)
        );

        let out = emitted(&table, Anchor::Label);
        assert!(out.contains("\"first\""));
        assert!(!out.contains("\"second\""));
    }

    #[test]
    fn assignment_bounds() {
        let mut table = LineNameTable::new();
        table.add_controller("gpio@0", 8);

        assert_eq!(
            table.assign("gpio@1", 0, "x"),
            Err(AssignError::UnknownController)
        );
        assert_eq!(
            table.assign("gpio@0", 8, "x"),
            Err(AssignError::OutOfRange { capacity: 8 })
        );
        table.assign("gpio@0", 7, "x").unwrap();
    }

    #[test]
    fn node_anchor_has_no_reference_sigil() {
        let mut table = LineNameTable::new();
        table.add_controller("gpio@40081000", 16);
        table.assign("gpio@40081000", 0, "ec_wp_l").unwrap();

        assert_eq!(
            emitted(&table, Anchor::Node),
            "\ngpio@40081000 {\n\
             \tgpio-line-names =\n\
             \t\t\"ec_wp_l\";\n\
             };\n"
        );
    }
}
