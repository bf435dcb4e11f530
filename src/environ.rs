use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{self, Command};

use crate::error::Error;

/// Target architecture for the import-library paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Arch {
    X86,
    X86_64,
    Arm,
    Aarch64,
}

impl Arch {
    /// Directory name the SDK uses for this architecture under `Lib` and
    /// `bin`.
    pub(crate) fn sdk_leaf(self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x64",
            Arch::Arm => "arm",
            Arch::Aarch64 => "arm64",
        }
    }

    pub(crate) fn host() -> Self {
        if cfg!(target_arch = "x86") {
            Arch::X86
        } else if cfg!(target_arch = "arm") {
            Arch::Arm
        } else if cfg!(target_arch = "aarch64") {
            Arch::Aarch64
        } else {
            Arch::X86_64
        }
    }
}

impl argh::FromArgValue for Arch {
    fn from_arg_value(value: &str) -> Result<Self, String> {
        match value {
            "x86" => Ok(Arch::X86),
            "x64" | "x86_64" => Ok(Arch::X86_64),
            "arm" => Ok(Arch::Arm),
            "arm64" | "aarch64" => Ok(Arch::Aarch64),
            _ => Err(format!("unknown architecture: {}", value)),
        }
    }
}

const INCLUDE_LEAVES: [&str; 5] = ["ucrt", "shared", "um", "winrt", "cppwinrt"];
const LIB_LEAVES: [&str; 2] = ["ucrt", "um"];

/// The include and import-library directories exposed to the compiler, in
/// search order. Paths are joined verbatim; nothing checks that they exist,
/// matching the toolchain's own lenient search-path handling.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SearchPaths {
    pub(crate) include: Vec<PathBuf>,
    pub(crate) lib: Vec<PathBuf>,
}

impl SearchPaths {
    pub(crate) fn compute(root: &str, version: &str, arch: Arch) -> Self {
        let include_root = PathBuf::from(root).join("Include").join(version);
        let lib_root = PathBuf::from(root).join("Lib").join(version);
        SearchPaths {
            include: INCLUDE_LEAVES
                .iter()
                .map(|leaf| include_root.join(leaf))
                .collect(),
            lib: LIB_LEAVES
                .iter()
                .map(|leaf| lib_root.join(leaf).join(arch.sdk_leaf()))
                .collect(),
        }
    }

    /// The `INCLUDE` and `LIB` variables, each a `;`-joined list in search
    /// order.
    pub(crate) fn vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("INCLUDE", join_paths(&self.include)),
            ("LIB", join_paths(&self.lib)),
        ]
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(";")
}

pub(crate) fn print_environment(paths: &SearchPaths) {
    for (key, value) in paths.vars() {
        println!("{}={}", key, value);
    }
}

/// Apply the computed variables to this process and hand over to an
/// interactive shell. There is no process-image replacement here: the shell
/// runs as a child inheriting the environment, and its exit code becomes
/// ours once it terminates, so this function does not return on success.
pub(crate) fn apply_and_relaunch(paths: &SearchPaths) -> Result<(), Error> {
    for (key, value) in paths.vars() {
        env::set_var(key, value);
    }
    let status = Command::new(interactive_shell())
        .status()
        .map_err(Error::Launch)?;
    process::exit(status.code().unwrap_or(1));
}

#[cfg(windows)]
fn interactive_shell() -> OsString {
    env::var_os("ComSpec").unwrap_or_else(|| "cmd.exe".into())
}

#[cfg(not(windows))]
fn interactive_shell() -> OsString {
    env::var_os("SHELL").unwrap_or_else(|| "/bin/sh".into())
}
