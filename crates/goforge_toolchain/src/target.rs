//! Target platform conventions of the gc toolchain.

use goforge_config::ConfigError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A target architecture and the file-name conventions derived from it.
///
/// Each architecture has a digit that names its tools and object files:
/// `8` for 386, `6` for amd64, `5` for arm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetArch {
    /// 32-bit x86 ("386").
    I386,
    /// 64-bit x86 ("amd64").
    Amd64,
    /// ARM ("arm").
    Arm,
}

impl TargetArch {
    /// The configuration name of this architecture.
    pub fn name(self) -> &'static str {
        match self {
            TargetArch::I386 => "386",
            TargetArch::Amd64 => "amd64",
            TargetArch::Arm => "arm",
        }
    }

    /// The tool-naming digit for this architecture.
    pub fn letter(self) -> char {
        match self {
            TargetArch::I386 => '8',
            TargetArch::Amd64 => '6',
            TargetArch::Arm => '5',
        }
    }

    /// The object-file extension produced by this architecture's compiler.
    pub fn object_ext(self) -> &'static str {
        match self {
            TargetArch::I386 => ".8",
            TargetArch::Amd64 => ".6",
            TargetArch::Arm => ".5",
        }
    }

    /// The default compiler executable name (`8g`, `6g`, `5g`).
    pub fn compiler_name(self) -> String {
        format!("{}g", self.letter())
    }

    /// The default linker executable name (`8l`, `6l`, `5l`).
    pub fn linker_name(self) -> String {
        format!("{}l", self.letter())
    }
}

impl FromStr for TargetArch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "386" => Ok(TargetArch::I386),
            "amd64" => Ok(TargetArch::Amd64),
            "arm" => Ok(TargetArch::Arm),
            other => Err(ConfigError::ValidationError(format!(
                "unknown architecture '{other}' (expected 386, amd64, or arm)"
            ))),
        }
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A target operating system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetOs {
    /// Linux.
    Linux,
    /// macOS ("darwin").
    Darwin,
    /// FreeBSD.
    Freebsd,
    /// Windows.
    Windows,
    /// Native Client.
    Nacl,
}

impl TargetOs {
    /// The configuration name of this operating system.
    pub fn name(self) -> &'static str {
        match self {
            TargetOs::Linux => "linux",
            TargetOs::Darwin => "darwin",
            TargetOs::Freebsd => "freebsd",
            TargetOs::Windows => "windows",
            TargetOs::Nacl => "nacl",
        }
    }

    /// The executable-file extension for this operating system.
    pub fn exe_ext(self) -> &'static str {
        match self {
            TargetOs::Windows => ".exe",
            _ => "",
        }
    }
}

impl FromStr for TargetOs {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linux" => Ok(TargetOs::Linux),
            "darwin" => Ok(TargetOs::Darwin),
            "freebsd" => Ok(TargetOs::Freebsd),
            "windows" => Ok(TargetOs::Windows),
            "nacl" => Ok(TargetOs::Nacl),
            other => Err(ConfigError::ValidationError(format!(
                "unknown operating system '{other}' (expected linux, darwin, freebsd, windows, or nacl)"
            ))),
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The (operating system, architecture) pair a toolchain is specialized for.
///
/// Determines the cache-directory layout and the file-name conventions of
/// everything the bootstrap builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Target {
    /// The target operating system.
    pub os: TargetOs,
    /// The target architecture.
    pub arch: TargetArch,
}

impl Target {
    /// Parses a target from the configuration's goos/goarch strings.
    pub fn parse(goos: &str, goarch: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            os: goos.parse()?,
            arch: goarch.parse()?,
        })
    }

    /// The per-target tools directory, relative to the cache root:
    /// `<os>/<arch>/tools`.
    pub fn cache_subpath(&self) -> PathBuf {
        PathBuf::from(self.os.name())
            .join(self.arch.name())
            .join("tools")
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arch_conventions() {
        assert_eq!(TargetArch::I386.letter(), '8');
        assert_eq!(TargetArch::Amd64.letter(), '6');
        assert_eq!(TargetArch::Arm.letter(), '5');
        assert_eq!(TargetArch::I386.object_ext(), ".8");
        assert_eq!(TargetArch::Amd64.object_ext(), ".6");
        assert_eq!(TargetArch::Arm.object_ext(), ".5");
        assert_eq!(TargetArch::Amd64.compiler_name(), "6g");
        assert_eq!(TargetArch::Amd64.linker_name(), "6l");
    }

    #[test]
    fn arch_parse_known() {
        assert_eq!("386".parse::<TargetArch>().unwrap(), TargetArch::I386);
        assert_eq!("amd64".parse::<TargetArch>().unwrap(), TargetArch::Amd64);
        assert_eq!("arm".parse::<TargetArch>().unwrap(), TargetArch::Arm);
    }

    #[test]
    fn arch_parse_unknown() {
        let err = "mips".parse::<TargetArch>().unwrap_err();
        assert!(format!("{err}").contains("unknown architecture 'mips'"));
    }

    #[test]
    fn exe_ext_only_on_windows() {
        assert_eq!(TargetOs::Windows.exe_ext(), ".exe");
        assert_eq!(TargetOs::Linux.exe_ext(), "");
        assert_eq!(TargetOs::Darwin.exe_ext(), "");
        assert_eq!(TargetOs::Freebsd.exe_ext(), "");
        assert_eq!(TargetOs::Nacl.exe_ext(), "");
    }

    #[test]
    fn os_parse_unknown() {
        let err = "plan9".parse::<TargetOs>().unwrap_err();
        assert!(format!("{err}").contains("unknown operating system"));
    }

    #[test]
    fn cache_subpath_layout() {
        let target = Target::parse("linux", "amd64").unwrap();
        assert_eq!(target.cache_subpath(), PathBuf::from("linux/amd64/tools"));
    }

    #[test]
    fn display() {
        let target = Target::parse("darwin", "386").unwrap();
        assert_eq!(format!("{target}"), "darwin/386");
    }
}
