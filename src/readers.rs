//! Pin-assignment sources.
//!
//! A reader turns one input format into a [`PinSet`]. The spreadsheet export
//! carries one pin column per chip model, so a reader is always asked for a
//! specific chip's view of the source.

use std::{collections::HashMap, path::Path, str::FromStr};

use anyhow::{ensure, Context, Result};

use crate::pins::{Pin, PinSet, PinType};

pub trait Reader {
    /// Registry name of the input format.
    fn name(&self) -> &'static str;

    /// Read all pin records wired for `chip` from `path`.
    fn read(&self, chip: &str, path: &Path) -> Result<PinSet>;
}

/// The catalog of input formats available to a run. Lookup semantics match
/// [`ChipRegistry`](crate::chip::ChipRegistry): first exact match wins.
#[derive(Default)]
pub struct ReaderRegistry {
    readers: Vec<Box<dyn Reader>>,
}

impl ReaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All supported input formats, in registration order.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(CsvReader));
        registry
    }

    pub fn register(&mut self, reader: Box<dyn Reader>) {
        self.readers.push(reader);
    }

    pub fn find(&self, name: &str) -> Option<&dyn Reader> {
        self.readers
            .iter()
            .find(|reader| reader.name() == name)
            .map(|reader| reader.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.readers.iter().map(|reader| reader.name()).collect()
    }
}

// ----------------------------------------------------------------------------
// CSV spreadsheet export

/// One spreadsheet row. The fixed columns are named; everything else is a
/// per-chip pin column captured by header name.
#[derive(Debug, serde::Deserialize)]
struct Row {
    #[serde(rename = "Signal Name")]
    signal: String,
    #[serde(rename = "Type")]
    pin_type: String,
    #[serde(rename = "Enum")]
    enum_name: String,
    #[serde(flatten)]
    pins: HashMap<String, String>,
}

pub struct CsvReader;

impl Reader for CsvReader {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn read(&self, chip: &str, path: &Path) -> Result<PinSet> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("could not open '{}'", path.display()))?;

        read_records(chip, reader).with_context(|| format!("reading '{}'", path.display()))
    }
}

fn read_records<R: std::io::Read>(chip: &str, mut reader: csv::Reader<R>) -> Result<PinSet> {
    let headers = reader.headers()?.clone();
    ensure!(
        headers.iter().any(|header| header == chip),
        "no pin column for chip '{chip}'"
    );

    let mut pins = PinSet::default();
    for (index, result) in reader.deserialize().enumerate() {
        // Header row is line 1, so the first record is line 2.
        let line = index + 2;
        let row: Row = result.with_context(|| format!("line {line}"))?;

        let pin = match row.pins.get(chip) {
            // An empty cell means the signal is not routed on this chip.
            Some(pin) if !pin.is_empty() => pin,
            _ => continue,
        };
        let Ok(pin_type) = PinType::from_str(&row.pin_type) else {
            log::warn!(
                "line {line}: unknown signal type '{}' for '{}' (expected one of {}), skipped",
                row.pin_type,
                row.signal,
                PinType::tokens().join(", ")
            );
            continue;
        };

        pins.push(Pin::new(pin_type, pin, row.signal, row.enum_name));
    }

    Ok(pins)
}

#[cfg(test)]
mod test {
    use super::*;

    fn read_csv(contents: &str) -> Result<PinSet> {
        read_csv_for_chip(contents, "it81302")
    }

    fn read_csv_for_chip(contents: &str, chip: &str) -> Result<PinSet> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes());
        read_records(chip, reader)
    }

    #[test]
    fn reads_rows_into_categories() {
        let pins = read_csv(
            "Signal Name,Type,Enum,it81302,npcx993\n\
             EC_ADC_1,ADC,ENUM_ADC_1,C1,A5\n\
             EC_WP_L,INPUT,,D1,A1\n\
             EC_I2C_SENSOR,I2C_CLK,,B1,C1\n\
             EC_FAN,PWM,,A1,E1\n",
        )
        .unwrap();

        assert_eq!(pins.len(), 4);
        assert_eq!(
            pins.adc[0],
            Pin::new(PinType::Adc, "C1", "EC_ADC_1", "ENUM_ADC_1")
        );
        assert_eq!(pins.gpio[0], Pin::new(PinType::Input, "D1", "EC_WP_L", ""));
        assert_eq!(pins.i2c[0].pin, "B1");
        assert_eq!(pins.pwm[0].pin, "A1");
    }

    #[test]
    fn chip_column_selects_the_pin() {
        let contents = "Signal Name,Type,Enum,it81302,npcx993\n\
                        EC_WP_L,INPUT,,D1,A1\n";

        let ite = read_csv_for_chip(contents, "it81302").unwrap();
        let npcx = read_csv_for_chip(contents, "npcx993").unwrap();
        assert_eq!(ite.gpio[0].pin, "D1");
        assert_eq!(npcx.gpio[0].pin, "A1");
    }

    #[test]
    fn unrouted_signal_is_skipped() {
        let pins = read_csv(
            "Signal Name,Type,Enum,it81302\n\
             EC_WP_L,INPUT,,D1\n\
             EC_OTHER_BOARD_ONLY,INPUT,,\n",
        )
        .unwrap();

        assert_eq!(pins.len(), 1);
        assert_eq!(pins.gpio[0].signal, "EC_WP_L");
    }

    #[test]
    fn unknown_type_token_skips_the_row() {
        let pins = read_csv(
            "Signal Name,Type,Enum,it81302\n\
             EC_WP_L,INPUT,,D1\n\
             EC_WEIRD,NOT_A_TYPE,,D2\n",
        )
        .unwrap();

        assert_eq!(pins.len(), 1);
    }

    #[test]
    fn missing_chip_column_is_fatal() {
        let result = read_csv_for_chip(
            "Signal Name,Type,Enum,npcx993\n\
             EC_WP_L,INPUT,,A1\n",
            "it81302",
        );

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("it81302"), "{message}");
    }

    #[test]
    fn whitespace_is_trimmed() {
        let pins = read_csv(
            "Signal Name,Type,Enum,it81302\n\
             EC_WP_L , INPUT , , D1\n",
        )
        .unwrap();

        assert_eq!(pins.gpio[0], Pin::new(PinType::Input, "D1", "EC_WP_L", ""));
    }

    #[test]
    fn registry_finds_csv() {
        let registry = ReaderRegistry::standard();
        assert_eq!(registry.names(), vec!["csv"]);
        assert!(registry.find("csv").is_some());
        assert!(registry.find("tsv").is_none());
    }
}
