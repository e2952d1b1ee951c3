/// Version written to `world.json` by this build.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Accepts any save this build can read. Saves from a newer build are
/// rejected rather than partially understood.
pub fn check_format_version(version: u32) -> Result<(), String> {
    if version == 0 || version > CURRENT_FORMAT_VERSION {
        return Err(format!(
            "unsupported save format version {version}; current version is {CURRENT_FORMAT_VERSION}"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_format_version, CURRENT_FORMAT_VERSION};

    #[test]
    fn current_version_is_accepted() {
        assert!(check_format_version(CURRENT_FORMAT_VERSION).is_ok());
    }

    #[test]
    fn newer_and_zero_versions_are_rejected() {
        let err = check_format_version(CURRENT_FORMAT_VERSION + 1).expect_err("newer must fail");
        assert!(err.contains("unsupported save format version 2"), "{err}");
        assert!(check_format_version(0).is_err());
    }
}
