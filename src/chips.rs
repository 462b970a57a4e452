//! Chip models and their pin-multiplexing tables.
//!
//! A physical pin maps to a descriptor string listing the signals multiplexed
//! onto it, e.g. `"GPI3/ADC3"`. Resolvers scan the `/`-separated sub-tokens
//! for the pattern their capability understands.

pub use self::{it81302::It81302, npcx993::Npcx993};

mod it81302;
mod npcx993;

/// Strip `prefix` and return the remainder if it is a non-empty run of
/// decimal digits.
fn numeric_suffix<'a>(token: &'a str, prefix: &str) -> Option<&'a str> {
    let suffix = token.strip_prefix(prefix)?;
    if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
        Some(suffix)
    } else {
        None
    }
}

/// Parse a GPIO sub-token: a `GPIO`/`GPO`/`GP` prefix followed by exactly one
/// controller character and one decimal digit.
///
/// Returns the controller node label and the pin offset. A non-decimal offset
/// character is treated as no match.
fn gpio_token(token: &str) -> Option<(String, u32)> {
    // Longest prefix first, so e.g. `GPIO95` is not consumed as `GP` + `IO95`.
    let rest = ["GPIO", "GPO", "GP"]
        .iter()
        .find_map(|prefix| token.strip_prefix(prefix))?;

    let mut chars = rest.chars();
    let controller = chars.next()?;
    let offset = chars.next()?.to_digit(10)?;
    if chars.next().is_some() || !controller.is_ascii_alphanumeric() {
        return None;
    }

    Some((
        format!("gpio{}", controller.to_ascii_lowercase()),
        offset,
    ))
}
