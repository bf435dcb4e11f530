use std::io;

use crate::error::Error;

/// Read-only view of the `Installed Roots` registry key for the Windows 10
/// SDK. On Windows this is backed by the registry; elsewhere a filesystem
/// fallback keyed off `DEVENV_SDK_ROOT` stands in so the tool stays usable
/// against an SDK copied onto another host.
pub(crate) trait InstalledRoots {
    /// Base directory under which the SDK versions are installed
    /// (`KitsRoot10`).
    fn installation_root(&self) -> Result<String, Error>;

    /// Every installed SDK version label. The underlying store gives no
    /// ordering guarantee; callers must not assume the result is sorted.
    fn sdk_versions(&self) -> Result<Vec<String>, Error>;
}

/// Pick the version used for all downstream operations.
// TODO: query a comparable version value and choose the highest; the registry
// enumerates subkeys in unspecified order, so "first" is not necessarily the
// newest installed SDK.
pub(crate) fn select_version(roots: &dyn InstalledRoots) -> Result<String, Error> {
    roots.sdk_versions()?.into_iter().next().ok_or(Error::NotFound)
}

fn store_err(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::NotFound {
        Error::NotFound
    } else {
        Error::StoreRead(e)
    }
}

pub(crate) struct SystemRoots;

#[cfg(windows)]
const INSTALLED_ROOTS_KEY: &str = r"SOFTWARE\Microsoft\Windows Kits\Installed Roots";
#[cfg(windows)]
const KITS_ROOT_10: &str = "KitsRoot10";

#[cfg(windows)]
impl InstalledRoots for SystemRoots {
    fn installation_root(&self) -> Result<String, Error> {
        use winreg::enums::*;
        use winreg::RegKey;

        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let key = hklm.open_subkey(INSTALLED_ROOTS_KEY).map_err(store_err)?;
        key.get_value(KITS_ROOT_10).map_err(store_err)
    }

    fn sdk_versions(&self) -> Result<Vec<String>, Error> {
        use winreg::enums::*;
        use winreg::RegKey;

        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let key = hklm.open_subkey(INSTALLED_ROOTS_KEY).map_err(store_err)?;
        key.enum_keys()
            .collect::<Result<Vec<_>, _>>()
            .map_err(Error::StoreRead)
    }
}

#[cfg(not(windows))]
impl InstalledRoots for SystemRoots {
    fn installation_root(&self) -> Result<String, Error> {
        match std::env::var("DEVENV_SDK_ROOT") {
            Ok(root) => Ok(root),
            Err(std::env::VarError::NotPresent) => Err(Error::NotFound),
            Err(source) => Err(Error::Environment {
                name: "DEVENV_SDK_ROOT",
                source,
            }),
        }
    }

    fn sdk_versions(&self) -> Result<Vec<String>, Error> {
        let include = std::path::Path::new(&self.installation_root()?).join("Include");
        let mut versions = Vec::new();
        for entry in std::fs::read_dir(&include).map_err(store_err)? {
            let entry = entry.map_err(Error::StoreRead)?;
            if let Some(name) = entry.file_name().to_str() {
                versions.push(name.to_string());
            }
        }
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeRoots {
        root: &'static str,
        versions: Vec<&'static str>,
    }

    impl InstalledRoots for FakeRoots {
        fn installation_root(&self) -> Result<String, Error> {
            Ok(self.root.to_string())
        }

        fn sdk_versions(&self) -> Result<Vec<String>, Error> {
            Ok(self.versions.iter().map(|v| v.to_string()).collect())
        }
    }

    #[test]
    fn first_enumerated_version_wins() {
        let roots = FakeRoots {
            root: r"C:\SDK",
            versions: vec!["10.0.1", "10.0.2"],
        };
        assert_eq!(select_version(&roots).unwrap(), "10.0.1");
    }

    #[test]
    fn no_versions_is_not_found() {
        let roots = FakeRoots {
            root: r"C:\SDK",
            versions: vec![],
        };
        assert!(matches!(select_version(&roots), Err(Error::NotFound)));
    }

    #[test]
    fn empty_enumeration_is_not_a_read_error() {
        // Zero subkeys is a valid state; the store itself read fine.
        let roots = FakeRoots {
            root: r"C:\SDK",
            versions: vec![],
        };
        assert!(roots.sdk_versions().unwrap().is_empty());
    }

    #[test]
    fn missing_value_maps_to_not_found() {
        let e = io::Error::new(io::ErrorKind::NotFound, "no such value");
        assert!(matches!(store_err(e), Error::NotFound));
    }

    #[test]
    fn other_failures_map_to_read_error() {
        let e = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        assert!(matches!(store_err(e), Error::StoreRead(_)));
    }
}
