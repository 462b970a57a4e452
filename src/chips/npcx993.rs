use std::collections::HashMap;

use crate::chip::{enabled_nodes, Chip};

/// Nuvoton NPCX993 pin multiplexing, keyed by BGA ball.
///
/// GPIO groups are hex-named (`gpio0`..`gpiof`, eight pins each), I2C clock
/// lines appear as `I2C<controller>_SCL<port>`, and each PWM channel has its
/// own node.
const PINS: &[(&str, &str)] = &[
    ("A1", "GPIO00"),
    ("A2", "GPIO01"),
    ("A3", "GPIO02"),
    ("A4", "GPIO03"),
    ("A5", "GPIO45/ADC0"),
    ("A6", "GPIO44/ADC1"),
    ("A7", "GPIO43/ADC2"),
    ("A8", "GPIO42/ADC3"),
    ("B1", "GPIO10"),
    ("B2", "GPIO11"),
    ("B3", "GPIO12"),
    ("B4", "GPIO13"),
    ("B5", "GPIO41/ADC4"),
    ("B6", "GPIO40/ADC5"),
    ("C1", "GPIOB5/I2C0_SCL0"),
    ("C2", "GPIOB4/I2C0_SDA0"),
    ("C3", "GPIO90/I2C1_SCL0"),
    ("C4", "GPIO87/I2C1_SDA0"),
    ("C5", "GPIO92/I2C2_SCL0"),
    ("C6", "GPIO91/I2C2_SDA0"),
    ("C7", "GPIOD1/I2C3_SCL0"),
    ("C8", "GPIOD0/I2C3_SDA0"),
    ("D1", "GPIOB3/I2C7_SCL0"),
    ("D2", "GPIOB2/I2C7_SDA0"),
    ("E1", "GPIOC3/PWM0"),
    ("E2", "GPIOC2/PWM1"),
    ("E3", "GPIOC4/PWM2"),
    ("E4", "GPIO80/PWM3"),
    ("E5", "GPIOB6/PWM4"),
    ("E6", "GPIOB7/PWM5"),
    ("E7", "GPIOC0/PWM6"),
    ("E8", "GPIO60/PWM7"),
    ("F1", "GPIO53/TA1"),
    ("F2", "GPIO73/TA2"),
    ("F3", "GPIOE1"),
    ("F4", "GPIOE2"),
    ("F5", "GPIOE3"),
    ("F6", "GPIOE4"),
    ("F7", "GPIOE5"),
    ("F8", "GPIOF0"),
    ("G1", "GPIO61"),
    ("G2", "GPIO62"),
    ("G3", "GPIO63"),
    ("G4", "GPIO64"),
    ("G5", "GPIO65"),
    ("G6", "GPIO66"),
    ("G7", "GPIO67"),
    ("G8", "GPIO72"),
];

pub struct Npcx993 {
    pins: HashMap<&'static str, &'static str>,
    enables: Vec<String>,
}

impl Npcx993 {
    pub fn new() -> Self {
        Self {
            pins: PINS.iter().copied().collect(),
            enables: Vec::new(),
        }
    }

    fn tokens(&self, pin: &str) -> impl Iterator<Item = &'static str> + '_ {
        self.pins
            .get(pin)
            .copied()
            .into_iter()
            .flat_map(|descriptor| descriptor.split('/'))
    }
}

impl Default for Npcx993 {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an `I2C<x>_SCL<y>` clock-line token into its controller and port
/// numbers.
fn i2c_token(token: &str) -> Option<(&str, &str)> {
    let rest = token.strip_prefix("I2C")?;
    let (controller, port) = rest.split_once("_SCL")?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if all_digits(controller) && all_digits(port) {
        Some((controller, port))
    } else {
        None
    }
}

impl Chip for Npcx993 {
    fn name(&self) -> &'static str {
        "npcx993"
    }

    fn enabled_nodes(&self) -> Vec<String> {
        enabled_nodes(&self.enables)
    }

    fn adc(&mut self, pin: &str) -> Option<String> {
        let channel = self
            .tokens(pin)
            .find_map(|token| super::numeric_suffix(token, "ADC"))?;
        self.enables.push("adc0".to_string());
        Some(channel.to_string())
    }

    fn gpio(&mut self, pin: &str) -> Option<(String, u32)> {
        self.tokens(pin).find_map(super::gpio_token)
    }

    fn i2c(&mut self, pin: &str) -> Option<String> {
        let (controller, port) = self.tokens(pin).find_map(i2c_token)?;
        let bus = format!("i2c{controller}_{port}");
        // The bus node and the controller serving it are distinct nodes, and
        // both must be switched on.
        self.enables.push(bus.clone());
        self.enables.push(format!("i2c_ctrl{controller}"));
        Some(bus)
    }

    fn pwm(&mut self, pin: &str) -> Option<String> {
        let channel = self
            .tokens(pin)
            .find_map(|token| super::numeric_suffix(token, "PWM"))?;
        let node = format!("pwm{channel}");
        self.enables.push(node.clone());
        Some(node)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unknown_pin_resolves_to_none() {
        let mut chip = Npcx993::new();
        assert_eq!(chip.adc("Z9"), None);
        assert_eq!(chip.gpio("Z9"), None);
        assert_eq!(chip.i2c("Z9"), None);
        assert_eq!(chip.pwm("Z9"), None);
        assert!(chip.enabled_nodes().is_empty());
    }

    #[test]
    fn adc_channel_and_enable() {
        let mut chip = Npcx993::new();
        assert_eq!(chip.adc("A5").unwrap(), "0");
        assert_eq!(chip.adc("B6").unwrap(), "5");
        assert_eq!(chip.enabled_nodes(), vec!["adc0"]);
    }

    #[test]
    fn gpio_hex_group_names() {
        let mut chip = Npcx993::new();
        assert_eq!(chip.gpio("A5").unwrap(), ("gpio4".to_string(), 5));
        assert_eq!(chip.gpio("C1").unwrap(), ("gpiob".to_string(), 5));
        assert_eq!(chip.gpio("F8").unwrap(), ("gpiof".to_string(), 0));
    }

    #[test]
    fn i2c_bus_and_controller_enables() {
        let mut chip = Npcx993::new();
        assert_eq!(chip.i2c("C1").unwrap(), "i2c0_0");
        // SDA lines do not identify a bus.
        assert_eq!(chip.i2c("C2"), None);
        assert_eq!(chip.enabled_nodes(), vec!["i2c0_0", "i2c_ctrl0"]);
    }

    #[test]
    fn i2c_high_controller_number() {
        let mut chip = Npcx993::new();
        assert_eq!(chip.i2c("D1").unwrap(), "i2c7_0");
        assert_eq!(chip.enabled_nodes(), vec!["i2c7_0", "i2c_ctrl7"]);
    }

    #[test]
    fn pwm_node_and_enable() {
        let mut chip = Npcx993::new();
        assert_eq!(chip.pwm("E4").unwrap(), "pwm3");
        assert_eq!(chip.pwm("E8").unwrap(), "pwm7");
        assert_eq!(chip.enabled_nodes(), vec!["pwm3", "pwm7"]);
    }

    #[test]
    fn i2c_token_shapes() {
        assert_eq!(i2c_token("I2C0_SCL0"), Some(("0", "0")));
        assert_eq!(i2c_token("I2C7_SCL0"), Some(("7", "0")));
        assert_eq!(i2c_token("I2C0_SDA0"), None);
        assert_eq!(i2c_token("I2C_SCL0"), None);
        assert_eq!(i2c_token("SMCLK0"), None);
    }
}
