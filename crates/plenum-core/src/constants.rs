//! Shared identity constants.

/// Server version, taken from the workspace manifest at build time.
/// Surfaced through `system.ping` so clients can log what they talk to.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short product name used in logs and user-facing banners.
pub const NAME: &str = "plenum";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_has_three_numeric_segments() {
        let mut segments = 0;
        for part in VERSION.split('.') {
            let _: u32 = part.parse().expect("semver segment");
            segments += 1;
        }
        assert_eq!(segments, 3);
    }

    #[test]
    fn name_fits_in_a_log_prefix() {
        assert_eq!(NAME, NAME.to_lowercase());
        assert!(!NAME.contains(char::is_whitespace));
    }
}
