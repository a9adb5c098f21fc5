//! Source languages and C++ standard levels.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Language a translation unit is compiled as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Plain C (`.c` sources, typically vendored third-party code)
    C,
    /// C++ (everything else)
    #[default]
    #[serde(alias = "cpp", alias = "c++")]
    Cxx,
}

impl Language {
    /// Classify a source file by extension.
    ///
    /// Only `.c` (in any case) is plain C; the compiler is always told the
    /// language explicitly, so headers, `.cc` and module interfaces are C++.
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.to_string_lossy().eq_ignore_ascii_case("c") => Language::C,
            _ => Language::Cxx,
        }
    }

    /// Get the language name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "c++",
        }
    }
}

/// Minimum C++ standard a module requires.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum CppStandard {
    /// C++14
    #[default]
    #[serde(rename = "14", alias = "c++14", alias = "cpp14")]
    Cpp14,
    /// C++17
    #[serde(rename = "17", alias = "c++17", alias = "cpp17")]
    Cpp17,
    /// C++20 and later; maps to the compiler's "latest" mode
    #[serde(rename = "20", alias = "c++20", alias = "cpp20", alias = "latest")]
    Cpp20,
}

impl CppStandard {
    /// Get the `/std:` value understood by cl and clang-cl.
    pub fn as_msvc_flag_value(&self) -> &'static str {
        match self {
            CppStandard::Cpp14 => "c++14",
            CppStandard::Cpp17 => "c++17",
            CppStandard::Cpp20 => "c++latest",
        }
    }
}

impl std::str::FromStr for CppStandard {
    type Err = CppStandardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "14" | "c++14" | "cpp14" => Ok(CppStandard::Cpp14),
            "17" | "c++17" | "cpp17" => Ok(CppStandard::Cpp17),
            "20" | "c++20" | "cpp20" | "latest" => Ok(CppStandard::Cpp20),
            _ => Err(CppStandardParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid C++ standard string.
#[derive(Debug, Clone)]
pub struct CppStandardParseError(pub String);

impl std::fmt::Display for CppStandardParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid C++ standard '{}', valid values: 14, 17, 20",
            self.0
        )
    }
}

impl std::error::Error for CppStandardParseError {}

impl std::fmt::Display for CppStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "C++{}",
            match self {
                CppStandard::Cpp14 => "14",
                CppStandard::Cpp17 => "17",
                CppStandard::Cpp20 => "20",
            }
        )
    }
}
