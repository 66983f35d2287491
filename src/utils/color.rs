//! Hex colour helpers shared by validation and renderers.

/// True for `#RGB` or `#RRGGBB`.
pub fn is_hex_color(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse `#RRGGBB` (or `#RGB`) into its channels.
pub fn parse_hex(value: &str) -> Option<(u8, u8, u8)> {
    if !is_hex_color(value) {
        return None;
    }
    let hex = value.trim_start_matches('#');

    if hex.len() == 3 {
        let expand = |i: usize| u8::from_str_radix(&hex[i..i + 1].repeat(2), 16).ok();
        return Some((expand(0)?, expand(1)?, expand(2)?));
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Coloured block for terminals with truecolor support; plain bullet otherwise.
pub fn ansi_swatch(value: &str) -> String {
    match parse_hex(value) {
        Some((r, g, b)) => format!("\x1b[38;2;{};{};{}m■\x1b[0m", r, g, b),
        None => "•".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#ff0000"));
        assert!(is_hex_color("#F57"));
        assert!(!is_hex_color("ff0000"));
        assert!(!is_hex_color("#ff00"));
        assert!(!is_hex_color("#gg0000"));
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#ff8000"), Some((255, 128, 0)));
        assert_eq!(parse_hex("#f80"), Some((255, 136, 0)));
        assert_eq!(parse_hex("red"), None);
    }

    #[test]
    fn test_ansi_swatch() {
        assert_eq!(ansi_swatch("#ff0000"), "\x1b[38;2;255;0;0m■\x1b[0m");
        assert_eq!(ansi_swatch(""), "•");
    }
}
