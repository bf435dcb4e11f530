mod deploy;
mod environ;
mod error;
mod winkits;

use std::error::Error as StdError;

use argh::FromArgs;
use environ::{Arch, SearchPaths};
use error::Error;
use winkits::{InstalledRoots, SystemRoots};

#[derive(FromArgs)]
/// Configure the development environment for the native Windows toolchain
struct Args {
    /// apply INCLUDE/LIB and launch an interactive shell (the default)
    #[argh(switch)]
    setenv: bool,

    /// print the computed environment as KEY=value lines
    #[argh(switch)]
    env: bool,

    /// copy the ucrt and winsdk module maps into the SDK tree
    #[argh(switch)]
    deploy: bool,

    /// print the detected SDK root and every installed version
    #[argh(switch)]
    list_sdks: bool,

    /// architecture for the library paths: x86, x64, arm or arm64
    /// (default: host)
    #[argh(option, default = "Arch::host()")]
    arch: Arch,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Operation {
    SetEnv,
    Env,
    Deploy,
    ListSdks,
}

impl Args {
    fn operation(&self) -> Result<Operation, &'static str> {
        let chosen = [
            (self.setenv, Operation::SetEnv),
            (self.env, Operation::Env),
            (self.deploy, Operation::Deploy),
            (self.list_sdks, Operation::ListSdks),
        ];
        let mut ops = chosen.iter().filter(|(on, _)| *on).map(|(_, op)| *op);
        match (ops.next(), ops.next()) {
            (None, _) => Ok(Operation::SetEnv),
            (Some(op), None) => Ok(op),
            (Some(_), Some(_)) => {
                Err("choose at most one of --setenv, --env, --deploy, --list-sdks")
            }
        }
    }
}

fn discover(roots: &dyn InstalledRoots, arch: Arch) -> Result<SearchPaths, Error> {
    let root = roots.installation_root()?;
    let version = winkits::select_version(roots)?;
    Ok(SearchPaths::compute(&root, &version, arch))
}

fn run(roots: &dyn InstalledRoots, operation: Operation, arch: Arch) -> Result<(), Error> {
    match operation {
        Operation::ListSdks => {
            println!("Detected Windows 10 SDK Dir: {}", roots.installation_root()?);
            println!("Detected Windows 10 SDK Versions:");
            for version in roots.sdk_versions()? {
                println!("  - {}", version);
            }
            Ok(())
        }
        Operation::Env => {
            environ::print_environment(&discover(roots, arch)?);
            Ok(())
        }
        Operation::SetEnv => environ::apply_and_relaunch(&discover(roots, arch)?),
        Operation::Deploy => deploy::deploy_module_maps(roots),
    }
}

fn main() -> Result<(), Box<dyn StdError>> {
    let args: Args = argh::from_env();
    let operation = args.operation()?;
    run(&SystemRoots, operation, args.arch)?;
    Ok(())
}

use ctor::ctor;

#[ctor]
fn install_extensions() {
    color_backtrace::install();
    // Deploy warnings and progress go through `log`; default to info so they
    // show up without RUST_LOG set.
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();
}
