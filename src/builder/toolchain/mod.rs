//! MSVC-family toolchain description.
//!
//! This module resolves which compiler, linker, librarian and resource
//! compiler a target builds with, and exposes the per-family flag table
//! that argument building consults.
//!
//! Toolchain resolution priority:
//! 1. Toolchain config file (`.vcgraph/toolchain.toml` or the global config)
//! 2. Tools found on PATH for the configured compiler family

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

mod detect;
pub mod environment;
pub mod family;

pub use detect::resolve_environment;
pub use environment::{PlatformSettings, ToolPaths, ToolchainEnvironment};
pub use family::{CompilerFamily, FamilyFlags, FlagPair, WarningStyle};

/// A concrete compiler release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CompilerKind {
    #[serde(rename = "vs2015")]
    VisualStudio2015,
    #[serde(rename = "vs2017")]
    VisualStudio2017,
    #[serde(rename = "vs2019")]
    VisualStudio2019,
    #[default]
    #[serde(rename = "vs2022")]
    VisualStudio2022,
    Clang,
    Intel,
}

impl CompilerKind {
    /// Get the flag dialect this compiler speaks.
    pub fn family(&self) -> CompilerFamily {
        match self {
            CompilerKind::Clang => CompilerFamily::Clang,
            CompilerKind::Intel => CompilerFamily::Intel,
            _ => CompilerFamily::Msvc,
        }
    }

    /// Visual Studio release year, for cl.exe releases.
    pub fn visual_studio_year(&self) -> Option<u32> {
        match self {
            CompilerKind::VisualStudio2015 => Some(2015),
            CompilerKind::VisualStudio2017 => Some(2017),
            CompilerKind::VisualStudio2019 => Some(2019),
            CompilerKind::VisualStudio2022 => Some(2022),
            CompilerKind::Clang | CompilerKind::Intel => None,
        }
    }

    /// Whether this is cl.exe from the given Visual Studio release or later.
    pub fn is_visual_studio_at_least(&self, year: u32) -> bool {
        self.visual_studio_year().is_some_and(|y| y >= year)
    }

    /// Default MSVC toolset version bundled with this compiler.
    pub fn default_toolchain_version(&self) -> semver::Version {
        match self {
            CompilerKind::VisualStudio2015 => semver::Version::new(14, 0, 24215),
            CompilerKind::VisualStudio2017 => semver::Version::new(14, 16, 27023),
            CompilerKind::VisualStudio2019 => semver::Version::new(14, 29, 30133),
            _ => semver::Version::new(14, 38, 33130),
        }
    }

    /// Executable names for compiler, linker, librarian.
    pub fn tool_names(
        &self,
        allow_clang_linker: bool,
    ) -> (&'static str, &'static str, &'static str) {
        match self {
            CompilerKind::Clang if allow_clang_linker => ("clang-cl", "lld-link", "llvm-lib"),
            CompilerKind::Clang => ("clang-cl", "link", "lib"),
            CompilerKind::Intel => ("icl", "xilink", "xilib"),
            _ => ("cl", "link", "lib"),
        }
    }

    /// Get the display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerKind::VisualStudio2015 => "Visual Studio 2015",
            CompilerKind::VisualStudio2017 => "Visual Studio 2017",
            CompilerKind::VisualStudio2019 => "Visual Studio 2019",
            CompilerKind::VisualStudio2022 => "Visual Studio 2022",
            CompilerKind::Clang => "Clang",
            CompilerKind::Intel => "Intel C++",
        }
    }
}

impl fmt::Display for CompilerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompilerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vs2015" => Ok(CompilerKind::VisualStudio2015),
            "vs2017" => Ok(CompilerKind::VisualStudio2017),
            "vs2019" => Ok(CompilerKind::VisualStudio2019),
            "vs2022" | "msvc" => Ok(CompilerKind::VisualStudio2022),
            "clang" | "clang-cl" => Ok(CompilerKind::Clang),
            "intel" | "icl" => Ok(CompilerKind::Intel),
            _ => Err(format!(
                "unknown compiler `{}` (expected vs2015, vs2017, vs2019, vs2022, clang or intel)",
                s
            )),
        }
    }
}

/// Target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    #[default]
    X64,
    Arm64,
    X86,
}

impl Architecture {
    /// Value for the linker's `/MACHINE:` switch.
    pub fn machine(&self) -> &'static str {
        match self {
            Architecture::X64 => "x64",
            Architecture::Arm64 => "ARM64",
            Architecture::X86 => "x86",
        }
    }

    /// Target triple passed to clang-cl.
    pub fn clang_target(&self) -> &'static str {
        match self {
            Architecture::X64 => "x86_64-pc-windows-msvc",
            Architecture::Arm64 => "aarch64-pc-windows-msvc",
            Architecture::X86 => "i686-pc-windows-msvc",
        }
    }

    pub fn is_64bit(&self) -> bool {
        matches!(self, Architecture::X64 | Architecture::Arm64)
    }

    /// Whether SSE switches apply.
    pub fn is_x86_family(&self) -> bool {
        matches!(self, Architecture::X64 | Architecture::X86)
    }
}

/// Target operating system flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TargetPlatform {
    #[default]
    #[serde(alias = "win64")]
    Win64,
    #[serde(alias = "hololens")]
    HoloLens,
}
