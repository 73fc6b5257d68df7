//! Build metadata shared across the binary and library.
//! Includes the generated version.rs from the build script, providing a single
//! source of truth.

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Package version from Cargo.toml
pub fn package_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// Version string used for `--version` output
pub fn long_version() -> String {
    format!("{} ({}, built {})", package_version(), git_hash(), build_time())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_version_contains_build_metadata() {
        let version = long_version();
        assert!(version.starts_with(package_version()));
        assert!(version.contains(git_hash()));
        assert!(version.contains(build_time()));
    }
}
