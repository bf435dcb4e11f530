use std::env::VarError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("no Windows 10 SDK installation found")]
    NotFound,
    #[error("could not read the installed SDK roots: {0}")]
    StoreRead(#[source] io::Error),
    #[error("environment variable {name}: {source}")]
    Environment { name: &'static str, source: VarError },
    #[error("could not copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("could not launch shell: {0}")]
    Launch(#[source] io::Error),
}
