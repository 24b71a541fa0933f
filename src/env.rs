use std::env;
use std::fmt;

/// Operating system and architecture identifiers used in release asset names.
///
/// Assets follow the Go toolchain naming (`linux`, `darwin`, `windows` and
/// `amd64`, `arm64`, `386`, `arm`), so the Rust target names are mapped onto it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this binary was compiled for. Self-update assumes every
    /// deployed host matches it.
    pub fn current() -> Self {
        let (os, arch) = platform_keys();
        Self::new(os, arch)
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

fn platform_keys() -> (&'static str, &'static str) {
    let os = if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "darwin"
    } else {
        env::consts::OS
    };

    let arch = if cfg!(target_arch = "x86_64") {
        "amd64"
    } else if cfg!(target_arch = "aarch64") {
        "arm64"
    } else if cfg!(target_arch = "x86") {
        "386"
    } else if cfg!(target_arch = "arm") {
        "arm"
    } else {
        env::consts::ARCH
    };

    (os, arch)
}
