//! The resolved toolchain view: concrete tool paths and invocation environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use goforge_config::{ConfigError, WorkspaceConfig};

use crate::target::Target;

/// A validated toolchain resolved from workspace configuration.
///
/// Carries the parsed [`Target`], the compiler and linker executable paths
/// (explicit from configuration, or the per-architecture defaults under
/// `<goroot>/bin`), and the environment overlay every tool invocation runs
/// with.
#[derive(Clone, Debug)]
pub struct Toolchain {
    /// The (OS, architecture) pair this toolchain builds for.
    pub target: Target,
    /// Root of the Go installation.
    pub goroot: PathBuf,
    /// Path to the compiler executable.
    pub compiler: PathBuf,
    /// Path to the linker executable.
    pub linker: PathBuf,
    env: BTreeMap<String, String>,
}

impl Toolchain {
    /// Resolves a toolchain from a validated [`WorkspaceConfig`].
    ///
    /// Fails if the configured goos/goarch pair is unknown. Compiler and
    /// linker default to `<goroot>/bin/<N>g` and `<goroot>/bin/<N>l`.
    pub fn from_config(config: &WorkspaceConfig) -> Result<Self, ConfigError> {
        let section = &config.toolchain;
        let target = Target::parse(&section.goos, &section.goarch)?;
        let goroot = PathBuf::from(&section.goroot);

        let compiler = match &section.compiler {
            Some(path) => PathBuf::from(path),
            None => goroot.join("bin").join(target.arch.compiler_name()),
        };
        let linker = match &section.linker {
            Some(path) => PathBuf::from(path),
            None => goroot.join("bin").join(target.arch.linker_name()),
        };

        let mut env = BTreeMap::new();
        env.insert("GOOS".to_string(), section.goos.clone());
        env.insert("GOARCH".to_string(), section.goarch.clone());
        env.insert("GOROOT".to_string(), section.goroot.clone());
        for (key, value) in &config.env {
            env.insert(key.clone(), value.clone());
        }

        Ok(Self {
            target,
            goroot,
            compiler,
            linker,
            env,
        })
    }

    /// The environment overlay applied to every tool invocation:
    /// GOOS/GOARCH/GOROOT plus the configuration's `[env]` extras.
    pub fn invocation_env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Appends the target's executable extension to a tool name.
    pub fn executable_name(&self, base: &str) -> String {
        format!("{base}{}", self.target.os.exe_ext())
    }

    /// The bin directory of the Go installation.
    pub fn bin_dir(&self) -> PathBuf {
        self.goroot.join("bin")
    }

    /// Returns the path a freshly built tool would have in `dir`.
    pub fn tool_path(&self, dir: &Path, base: &str) -> PathBuf {
        dir.join(self.executable_name(base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goforge_config::load_config_from_str;

    fn config(toml: &str) -> WorkspaceConfig {
        load_config_from_str(toml).unwrap()
    }

    #[test]
    fn defaults_follow_architecture() {
        let toolchain = Toolchain::from_config(&config(
            "[toolchain]\ngoos = \"linux\"\ngoarch = \"amd64\"\ngoroot = \"/opt/go\"\n",
        ))
        .unwrap();
        assert_eq!(toolchain.compiler, PathBuf::from("/opt/go/bin/6g"));
        assert_eq!(toolchain.linker, PathBuf::from("/opt/go/bin/6l"));
    }

    #[test]
    fn explicit_paths_override_defaults() {
        let toolchain = Toolchain::from_config(&config(
            r#"
[toolchain]
goos = "linux"
goarch = "386"
goroot = "/opt/go"
compiler = "/custom/8g"
linker = "/custom/8l"
"#,
        ))
        .unwrap();
        assert_eq!(toolchain.compiler, PathBuf::from("/custom/8g"));
        assert_eq!(toolchain.linker, PathBuf::from("/custom/8l"));
    }

    #[test]
    fn unknown_target_is_rejected() {
        let result = Toolchain::from_config(&config(
            "[toolchain]\ngoos = \"linux\"\ngoarch = \"sparc\"\ngoroot = \"/opt/go\"\n",
        ));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn invocation_env_layers_extras() {
        let toolchain = Toolchain::from_config(&config(
            r#"
[toolchain]
goos = "darwin"
goarch = "arm"
goroot = "/opt/go"

[env]
GOPATH = "/home/u/go"
"#,
        ))
        .unwrap();
        let env = toolchain.invocation_env();
        assert_eq!(env.get("GOOS").map(String::as_str), Some("darwin"));
        assert_eq!(env.get("GOARCH").map(String::as_str), Some("arm"));
        assert_eq!(env.get("GOROOT").map(String::as_str), Some("/opt/go"));
        assert_eq!(env.get("GOPATH").map(String::as_str), Some("/home/u/go"));
    }

    #[test]
    fn executable_name_per_os() {
        let win = Toolchain::from_config(&config(
            "[toolchain]\ngoos = \"windows\"\ngoarch = \"386\"\ngoroot = \"C:/go\"\n",
        ))
        .unwrap();
        assert_eq!(win.executable_name("dep"), "dep.exe");

        let linux = Toolchain::from_config(&config(
            "[toolchain]\ngoos = \"linux\"\ngoarch = \"amd64\"\ngoroot = \"/opt/go\"\n",
        ))
        .unwrap();
        assert_eq!(linux.executable_name("dep"), "dep");
    }
}
