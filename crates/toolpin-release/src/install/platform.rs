//! Machine identity → release naming identifiers

use super::error::ReleaseError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    MacOS,
    Windows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    Arm64,
}

impl Os {
    pub const ALL: [Os; 3] = [Os::Linux, Os::MacOS, Os::Windows];

    /// Maps a raw OS name (`std::env::consts::OS` or a Node-style alias)
    pub fn from_raw(raw: &str) -> Result<Self, ReleaseError> {
        match raw {
            "linux" => Ok(Os::Linux),
            "macos" | "darwin" => Ok(Os::MacOS),
            "windows" | "win32" => Ok(Os::Windows),
            _ => Err(ReleaseError::UnsupportedPlatform { os: raw.to_string() }),
        }
    }

    /// Identifier used in upstream asset names
    pub fn release_id(self) -> &'static str {
        match self {
            Os::Linux => "Linux",
            Os::MacOS => "Darwin",
            Os::Windows => "Windows",
        }
    }
}

impl Arch {
    pub const ALL: [Arch; 2] = [Arch::X86_64, Arch::Arm64];

    /// Maps a raw architecture name (`std::env::consts::ARCH` or a Node-style alias)
    pub fn from_raw(raw: &str) -> Result<Self, ReleaseError> {
        match raw {
            "x86_64" | "x64" | "amd64" => Ok(Arch::X86_64),
            "aarch64" | "arm64" => Ok(Arch::Arm64),
            _ => Err(ReleaseError::UnsupportedArchitecture {
                arch: raw.to_string(),
            }),
        }
    }

    /// Identifier used in upstream asset names
    pub fn release_id(self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.release_id())
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.release_id())
    }
}

/// Raw, unvalidated identity of the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineIdentity {
    pub os: String,
    pub arch: String,
}

impl MachineIdentity {
    /// Identity of the running process
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }

    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }
}

/// Validated (os, arch) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformKey {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformKey {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Both halves must be known; architecture is checked first
    pub fn from_identity(identity: &MachineIdentity) -> Result<Self, ReleaseError> {
        let arch = Arch::from_raw(&identity.arch)?;
        let os = Os::from_raw(&identity.os)?;
        Ok(Self { os, arch })
    }
}

/// Platform of the running process
pub fn detect_platform() -> Result<PlatformKey, ReleaseError> {
    PlatformKey::from_identity(&MachineIdentity::current())
}

/// Executable file name for `tool` on `os`
pub fn binary_name(tool: &str, os: Os) -> String {
    match os {
        Os::Windows => format!("{}.exe", tool),
        Os::Linux | Os::MacOS => tool.to_string(),
    }
}
