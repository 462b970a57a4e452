use std::collections::HashMap;

use crate::chip::{enabled_nodes, Chip};

/// ITE IT81302 pin multiplexing, keyed by BGA ball.
///
/// ADC channels share the GPI group, I2C clock lines appear as `SMCLK<n>`,
/// and PWM outputs share the GPA group.
const PINS: &[(&str, &str)] = &[
    ("A1", "GPA0/PWM0"),
    ("A2", "GPA1/PWM1"),
    ("A3", "GPA2/PWM2"),
    ("A4", "GPA3/PWM3"),
    ("A5", "GPA4/PWM4"),
    ("A6", "GPA5/PWM5"),
    ("B1", "GPB3/SMCLK0"),
    ("B2", "GPB4/SMDAT0"),
    ("B3", "GPC1/SMCLK1"),
    ("B4", "GPC2/SMDAT1"),
    ("B5", "GPF6/SMCLK2"),
    ("B6", "GPF7/SMDAT2"),
    ("C1", "GPI0/ADC0"),
    ("C2", "GPI1/ADC1"),
    ("C3", "GPI2/ADC2"),
    ("C4", "GPI3/ADC3"),
    ("C5", "GPI4/ADC4"),
    ("C6", "GPI5/ADC5"),
    ("C7", "GPI6/ADC6"),
    ("C8", "GPI7/ADC7"),
    ("D1", "GPB0"),
    ("D2", "GPB1"),
    ("D3", "GPB2"),
    ("D4", "GPB5"),
    ("D5", "GPC0"),
    ("D6", "GPC4"),
    ("D7", "GPC6"),
    ("D8", "GPC7"),
    ("E1", "GPD0"),
    ("E2", "GPD1"),
    ("E3", "GPD2"),
    ("E4", "GPD3"),
    ("E5", "GPE0"),
    ("E6", "GPE1"),
    ("E7", "GPE2"),
    ("E8", "GPE3/KSO12"),
    ("F1", "GPG0"),
    ("F2", "GPG1"),
    ("F3", "GPG2/SSCK"),
    ("F4", "GPG6/MOSI"),
    ("F5", "GPH0/TACH0A"),
    ("F6", "GPH1/TACH1A"),
    ("F7", "GPH2"),
    ("G1", "GPJ0"),
    ("G2", "GPJ1"),
    ("G3", "GPJ2"),
    ("G4", "GPJ3"),
    ("G5", "GPOH5"),
    ("G6", "GPOH6"),
];

pub struct It81302 {
    pins: HashMap<&'static str, &'static str>,
    enables: Vec<String>,
}

impl It81302 {
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

impl Default for It81302 {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip for It81302 {
    fn name(&self) -> &'static str {
        "it81302"
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
        let port = self
            .tokens(pin)
            .find_map(|token| super::numeric_suffix(token, "SMCLK"))?;
        let bus = format!("i2c{port}");
        self.enables.push(bus.clone());
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
