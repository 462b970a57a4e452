/// A chip model's pin-multiplexing knowledge.
///
/// Each resolver maps a physical pin token to a peripheral reference for one
/// capability. Unknown or unsuitable pins resolve to `None`; resolvers never
/// fail. Successful resolutions record the devicetree nodes that must be
/// switched on for the reference to function.
pub trait Chip {
    /// Registry name of the chip model.
    fn name(&self) -> &'static str;

    /// All devicetree nodes recorded as required by successful resolutions,
    /// lexicographically sorted with duplicates collapsed.
    fn enabled_nodes(&self) -> Vec<String>;

    /// Resolve a pin to an ADC channel reference.
    fn adc(&mut self, pin: &str) -> Option<String>;

    /// Resolve a pin to a GPIO controller label and pin offset.
    fn gpio(&mut self, pin: &str) -> Option<(String, u32)>;

    /// Resolve a pin to an I2C bus node label.
    fn i2c(&mut self, pin: &str) -> Option<String>;

    /// Resolve a pin to a PWM node label.
    fn pwm(&mut self, pin: &str) -> Option<String>;
}

/// Sort and collapse an enable-target accumulator for emission.
///
/// Resolvers append one target per successful call, so the accumulator may
/// hold duplicates; adjacent elimination after sorting leaves exactly one
/// entry per distinct target.
pub fn enabled_nodes(accumulated: &[String]) -> Vec<String> {
    let mut nodes = accumulated.to_vec();
    nodes.sort();
    nodes.dedup();
    nodes
}

/// The catalog of chip models available to a run.
///
/// Built once in `main` from the statically known set and passed down by
/// reference. Lookup is first-match-wins: of two registrations under the same
/// name, the earlier one is found.
#[derive(Default)]
pub struct ChipRegistry {
    chips: Vec<Box<dyn Chip>>,
}

impl ChipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All supported chip models, in registration order.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::chips::It81302::new()));
        registry.register(Box::new(crate::chips::Npcx993::new()));
        registry
    }

    pub fn register(&mut self, chip: Box<dyn Chip>) {
        self.chips.push(chip);
    }

    /// Find a chip by its exact, case-sensitive name.
    pub fn find(&mut self, name: &str) -> Option<&mut (dyn Chip + 'static)> {
        self.chips
            .iter_mut()
            .find(|chip| chip.name() == name)
            .map(|chip| chip.as_mut())
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.chips.iter().map(|chip| chip.name()).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct FakeChip {
        name: &'static str,
        tag: &'static str,
    }

    impl Chip for FakeChip {
        fn name(&self) -> &'static str {
            self.name
        }

        fn enabled_nodes(&self) -> Vec<String> {
            Vec::new()
        }

        fn adc(&mut self, _pin: &str) -> Option<String> {
            Some(self.tag.to_string())
        }

        fn gpio(&mut self, _pin: &str) -> Option<(String, u32)> {
            None
        }

        fn i2c(&mut self, _pin: &str) -> Option<String> {
            None
        }

        fn pwm(&mut self, _pin: &str) -> Option<String> {
            None
        }
    }

    #[test]
    fn find_is_case_sensitive() {
        let mut registry = ChipRegistry::new();
        registry.register(Box::new(FakeChip {
            name: "alpha",
            tag: "1",
        }));

        assert!(registry.find("alpha").is_some());
        assert!(registry.find("Alpha").is_none());
        assert!(registry.find("beta").is_none());
    }

    #[test]
    fn duplicate_name_first_registered_wins() {
        let mut registry = ChipRegistry::new();
        registry.register(Box::new(FakeChip {
            name: "alpha",
            tag: "first",
        }));
        registry.register(Box::new(FakeChip {
            name: "alpha",
            tag: "second",
        }));

        let chip = registry.find("alpha").unwrap();
        assert_eq!(chip.adc("A1").unwrap(), "first");
    }

    #[test]
    fn names_in_registration_order() {
        let mut registry = ChipRegistry::new();
        registry.register(Box::new(FakeChip {
            name: "zeta",
            tag: "",
        }));
        registry.register(Box::new(FakeChip {
            name: "alpha",
            tag: "",
        }));

        assert_eq!(registry.names(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn standard_registry_contents() {
        let mut registry = ChipRegistry::standard();
        assert_eq!(registry.names(), vec!["it81302", "npcx993"]);
        assert!(registry.find("it81302").is_some());
        assert!(registry.find("npcx993").is_some());
    }

    #[test]
    fn enabled_nodes_sorts_and_dedups() {
        let accumulated = [
            "pwm3".to_string(),
            "adc0".to_string(),
            "pwm3".to_string(),
            "i2c0".to_string(),
            "adc0".to_string(),
        ];
        assert_eq!(enabled_nodes(&accumulated), vec!["adc0", "i2c0", "pwm3"]);
    }
}
