//! Environment provenance attached to emitted aggregates
//!
//! Provenance is advisory: it never takes part in the verdict, and a
//! missing variable or build cache simply leaves the field empty or absent.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default location of the CMake cache probed for compiler details
pub const DEFAULT_CMAKE_CACHE: &str = "build/CMakeCache.txt";

/// Runner and toolchain identifiers for one gate run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub runner_os: String,
    pub image_os: String,
    pub image_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmake_cxx_compiler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmake_cxx_compiler_version: Option<String>,
}

impl Provenance {
    /// Collect from the process environment and the CMake cache at `cmake_cache`
    pub fn collect(cmake_cache: &Path) -> Self {
        Self::collect_with(|name| std::env::var(name).ok(), cmake_cache)
    }

    /// Collect using `lookup` for environment variables
    pub fn collect_with<F>(lookup: F, cmake_cache: &Path) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let cache = fs::read_to_string(cmake_cache);
        let (cmake_cxx_compiler, cmake_cxx_compiler_version) = match cache {
            Ok(text) => parse_cmake_cache(&text),
            Err(e) => {
                tracing::debug!(
                    path = %cmake_cache.display(),
                    error = %e,
                    "no CMake cache, compiler provenance omitted"
                );
                (None, None)
            }
        };

        Self {
            runner_os: lookup("RUNNER_OS").unwrap_or_default(),
            image_os: lookup("ImageOS").unwrap_or_default(),
            image_version: lookup("ImageVersion").unwrap_or_default(),
            cmake_cxx_compiler,
            cmake_cxx_compiler_version,
        }
    }
}

/// Extract the C++ compiler path and version from CMake cache text
pub fn parse_cmake_cache(text: &str) -> (Option<String>, Option<String>) {
    let lookup = |pattern: &str| {
        Regex::new(pattern)
            .ok()?
            .captures(text)
            .map(|caps| caps[1].trim().to_string())
    };

    (
        lookup(r"CMAKE_CXX_COMPILER:.*=(.*)"),
        lookup(r"CMAKE_CXX_COMPILER_VERSION:.*=(.*)"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const CACHE: &str = "\
// This is the CMakeCache file.
CMAKE_BUILD_TYPE:STRING=Release
CMAKE_CXX_COMPILER:FILEPATH=/usr/bin/c++\r
CMAKE_CXX_COMPILER_AR:FILEPATH=/usr/bin/gcc-ar-13
//CXX compiler version
CMAKE_CXX_COMPILER_VERSION:INTERNAL=13.2.0
";

    #[test]
    fn test_parse_cmake_cache() {
        let (compiler, version) = parse_cmake_cache(CACHE);
        assert_eq!(compiler.as_deref(), Some("/usr/bin/c++"));
        assert_eq!(version.as_deref(), Some("13.2.0"));
    }

    #[test]
    fn test_parse_cmake_cache_without_entries() {
        assert_eq!(parse_cmake_cache("CMAKE_C_COMPILER:FILEPATH=/usr/bin/cc\n"), (None, None));
    }

    #[test]
    fn test_collect_with_lookup_and_cache() {
        let temp_dir = TempDir::new().unwrap();
        let cache = temp_dir.path().join("CMakeCache.txt");
        fs::write(&cache, CACHE).unwrap();

        let env: HashMap<&str, &str> = [("RUNNER_OS", "Linux"), ("ImageOS", "ubuntu24")].into();
        let prov = Provenance::collect_with(|name| env.get(name).map(|v| v.to_string()), &cache);

        assert_eq!(prov.runner_os, "Linux");
        assert_eq!(prov.image_os, "ubuntu24");
        assert_eq!(prov.image_version, "");
        assert_eq!(prov.cmake_cxx_compiler_version.as_deref(), Some("13.2.0"));
    }

    #[test]
    fn test_missing_cache_is_not_an_error() {
        let prov = Provenance::collect_with(|_| None, Path::new("/nonexistent/CMakeCache.txt"));
        assert_eq!(prov, Provenance::default());

        let json = serde_json::to_value(&prov).unwrap();
        assert!(json.get("cmake_cxx_compiler").is_none());
        assert_eq!(json["runner_os"], "");
    }

    #[test]
    #[serial]
    fn test_collect_reads_process_environment() {
        std::env::set_var("ImageVersion", "20240101.1");
        let prov = Provenance::collect(Path::new("/nonexistent/CMakeCache.txt"));
        std::env::remove_var("ImageVersion");

        assert_eq!(prov.image_version, "20240101.1");
    }
}
