use strum::IntoEnumIterator as _;

/// The peripheral category a pin record belongs to, i.e. which block of the
/// generated fragment it is emitted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Adc,
    Gpio,
    I2c,
    Pwm,
}

/// Logical signal types, as they appear in the `Type` column of a
/// pin-assignment spreadsheet.
///
/// The `L` suffix marks active-low signals, `Pu`/`Pd` are inputs with pull-up
/// or pull-down, and `Od` variants are open-drain outputs with their initial
/// level.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
pub enum PinType {
    #[strum(serialize = "ADC")]
    Adc,
    #[strum(serialize = "PWM")]
    Pwm,
    #[strum(serialize = "PWM_INVERT")]
    PwmInvert,
    #[strum(serialize = "I2C_CLK")]
    I2cClk,
    #[strum(serialize = "INPUT")]
    Input,
    #[strum(serialize = "INPUT_L")]
    InputL,
    #[strum(serialize = "INPUT_PU")]
    InputPu,
    #[strum(serialize = "INPUT_PD")]
    InputPd,
    #[strum(serialize = "OUTPUT")]
    Output,
    #[strum(serialize = "OUTPUT_L")]
    OutputL,
    #[strum(serialize = "OUTPUT_ODH")]
    OutputOdHigh,
    #[strum(serialize = "OUTPUT_ODL")]
    OutputOdLow,
}

impl PinType {
    /// The generator block this signal type is routed to.
    pub fn category(&self) -> Category {
        use PinType::*;

        match self {
            Adc => Category::Adc,
            Pwm | PwmInvert => Category::Pwm,
            I2cClk => Category::I2c,
            Input | InputL | InputPu | InputPd | Output | OutputL | OutputOdHigh | OutputOdLow => {
                Category::Gpio
            }
        }
    }

    /// The devicetree flags expression for a GPIO signal type.
    ///
    /// Returns `None` for non-GPIO types.
    pub fn gpio_flags(&self) -> Option<&'static str> {
        use PinType::*;

        match self {
            Input => Some("GPIO_INPUT"),
            InputL => Some("(GPIO_INPUT | GPIO_ACTIVE_LOW)"),
            InputPu => Some("GPIO_INPUT_PULL_UP"),
            InputPd => Some("GPIO_INPUT_PULL_DOWN"),
            Output => Some("GPIO_OUTPUT"),
            OutputL => Some("(GPIO_OUTPUT | GPIO_ACTIVE_LOW)"),
            OutputOdHigh => Some("GPIO_ODR_HIGH"),
            OutputOdLow => Some("GPIO_ODR_LOW"),
            _ => None,
        }
    }

    /// All spreadsheet tokens, for use in diagnostics.
    pub fn tokens() -> Vec<&'static str> {
        PinType::iter().map(|t| t.into()).collect()
    }
}

/// One logical signal read from the pin-assignment source.
#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    /// Signal type.
    pub pin_type: PinType,
    /// Physical pin identifier. Opaque to the generator; only the chip's
    /// resolvers interpret it.
    pub pin: String,
    /// Net/signal name from the board schematic.
    pub signal: String,
    /// Optional symbolic enum name, empty when absent.
    pub enum_name: String,
}

impl Pin {
    pub fn new(
        pin_type: PinType,
        pin: impl Into<String>,
        signal: impl Into<String>,
        enum_name: impl Into<String>,
    ) -> Self {
        Self {
            pin_type,
            pin: pin.into(),
            signal: signal.into(),
            enum_name: enum_name.into(),
        }
    }

    /// The generated identifier, used as node name and line name.
    pub fn ident(&self) -> String {
        self.signal.to_ascii_lowercase()
    }
}

/// All pin records of one board, grouped by peripheral category.
#[derive(Debug, Default)]
pub struct PinSet {
    pub adc: Vec<Pin>,
    pub gpio: Vec<Pin>,
    pub i2c: Vec<Pin>,
    pub pwm: Vec<Pin>,
}

impl PinSet {
    /// Route a record to its category grouping.
    pub fn push(&mut self, pin: Pin) {
        match pin.pin_type.category() {
            Category::Adc => self.adc.push(pin),
            Category::Gpio => self.gpio.push(pin),
            Category::I2c => self.i2c.push(pin),
            Category::Pwm => self.pwm.push(pin),
        }
    }

    /// Total number of records across all categories.
    pub fn len(&self) -> usize {
        self.adc.len() + self.gpio.len() + self.i2c.len() + self.pwm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn type_tokens_round_trip() {
        for pin_type in PinType::iter() {
            let token = pin_type.as_ref();
            assert_eq!(PinType::from_str(token).unwrap(), pin_type);
        }

        assert!(PinType::from_str("BOGUS").is_err());
    }

    #[test]
    fn categories() {
        assert_eq!(PinType::Adc.category(), Category::Adc);
        assert_eq!(PinType::Pwm.category(), Category::Pwm);
        assert_eq!(PinType::PwmInvert.category(), Category::Pwm);
        assert_eq!(PinType::I2cClk.category(), Category::I2c);
        assert_eq!(PinType::InputPu.category(), Category::Gpio);
        assert_eq!(PinType::OutputOdLow.category(), Category::Gpio);
    }

    #[test]
    fn gpio_flags_for_gpio_types_only() {
        for pin_type in PinType::iter() {
            assert_eq!(
                pin_type.gpio_flags().is_some(),
                pin_type.category() == Category::Gpio,
                "{pin_type:?}"
            );
        }
    }

    #[test]
    fn push_routes_by_category() {
        let mut pins = PinSet::default();
        pins.push(Pin::new(PinType::Adc, "A1", "EC_ADC_1", ""));
        pins.push(Pin::new(PinType::Output, "B2", "EC_LED", ""));
        pins.push(Pin::new(PinType::I2cClk, "C3", "EC_I2C_SENSOR", ""));
        pins.push(Pin::new(PinType::PwmInvert, "D4", "EC_FAN", ""));

        assert_eq!(pins.adc.len(), 1);
        assert_eq!(pins.gpio.len(), 1);
        assert_eq!(pins.i2c.len(), 1);
        assert_eq!(pins.pwm.len(), 1);
        assert_eq!(pins.len(), 4);
    }

    #[test]
    fn ident_is_lowercased_signal() {
        let pin = Pin::new(PinType::Input, "A4", "EC_WP_L", "");
        assert_eq!(pin.ident(), "ec_wp_l");
    }
}
