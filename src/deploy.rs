use std::env;
use std::fs;
use std::path::PathBuf;

use crate::error::Error;
use crate::winkits::{self, InstalledRoots};

/// One module map to copy into the SDK tree.
#[derive(Debug)]
pub(crate) struct CopyTask {
    pub(crate) source: PathBuf,
    pub(crate) destination: PathBuf,
}

/// The fixed deployment list: the ucrt and winsdk module maps shipped under
/// `<SDKROOT>/usr/share`, placed next to the headers they describe. The
/// `.1` destination suffix matches the installed layout this tool has always
/// produced.
pub(crate) fn module_map_tasks(sdkroot: &str, sdk_dir: &str, version: &str) -> Vec<CopyTask> {
    let share = PathBuf::from(sdkroot).join("usr").join("share");
    let include = PathBuf::from(sdk_dir).join("Include").join(version);
    vec![
        CopyTask {
            source: share.join("ucrt.modulemap"),
            destination: include.join("ucrt").join("module.modulemap.1"),
        },
        CopyTask {
            source: share.join("winsdk.modulemap"),
            destination: include.join("um").join("module.modulemap.1"),
        },
    ]
}

/// Copy every task whose source exists, overwriting the destination, and
/// invoke `progress` once per successful copy. A missing source is a warning,
/// not a failure; a copy failure for a present source (including a missing
/// destination directory) aborts the run.
pub(crate) fn copy_files<F>(tasks: &[CopyTask], mut progress: F) -> Result<(), Error>
where
    F: FnMut(&CopyTask),
{
    for task in tasks {
        if !task.source.exists() {
            log::warn!("{} does not exist, skipping", task.source.display());
            continue;
        }
        fs::copy(&task.source, &task.destination).map_err(|source| Error::Copy {
            from: task.source.clone(),
            to: task.destination.clone(),
            source,
        })?;
        progress(task);
    }
    Ok(())
}

pub(crate) fn deploy_module_maps(roots: &dyn InstalledRoots) -> Result<(), Error> {
    let sdkroot = env::var("SDKROOT").map_err(|source| Error::Environment {
        name: "SDKROOT",
        source,
    })?;
    let sdk_dir = roots.installation_root()?;
    let version = winkits::select_version(roots)?;
    let tasks = module_map_tasks(&sdkroot, &sdk_dir, &version);
    copy_files(&tasks, |task| {
        log::info!(
            "deployed {} -> {}",
            task.source.display(),
            task.destination.display()
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn tree_with_destinations() -> (tempfile::TempDir, Vec<CopyTask>) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap().to_string();
        let tasks = module_map_tasks(&root, &root, "10.0.1");
        for task in &tasks {
            fs::create_dir_all(task.destination.parent().unwrap()).unwrap();
        }
        (dir, tasks)
    }

    #[test]
    fn task_list_is_fixed() {
        let tasks = module_map_tasks("toolchain", "sdk", "10.0.1");
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].source.ends_with("ucrt.modulemap"));
        assert!(tasks[1].source.ends_with("winsdk.modulemap"));
        for task in &tasks {
            assert!(task.destination.ends_with("module.modulemap.1"));
        }
    }

    #[test]
    fn missing_sources_are_skipped() {
        let (_dir, tasks) = tree_with_destinations();
        let copied = Cell::new(0);
        copy_files(&tasks, |_| copied.set(copied.get() + 1)).unwrap();
        assert_eq!(copied.get(), 0);
    }

    #[test]
    fn partial_deployment_succeeds() {
        let (_dir, tasks) = tree_with_destinations();
        fs::create_dir_all(tasks[0].source.parent().unwrap()).unwrap();
        fs::write(&tasks[0].source, "module ucrt {}").unwrap();

        let copied = Cell::new(0);
        copy_files(&tasks, |_| copied.set(copied.get() + 1)).unwrap();
        assert_eq!(copied.get(), 1);
        assert_eq!(
            fs::read_to_string(&tasks[0].destination).unwrap(),
            "module ucrt {}"
        );
        assert!(!tasks[1].destination.exists());
    }

    #[test]
    fn deployment_overwrites() {
        let (_dir, tasks) = tree_with_destinations();
        fs::create_dir_all(tasks[0].source.parent().unwrap()).unwrap();
        fs::write(&tasks[0].source, "new").unwrap();
        fs::write(&tasks[0].destination, "old").unwrap();

        copy_files(&tasks[..1], |_| {}).unwrap();
        assert_eq!(fs::read_to_string(&tasks[0].destination).unwrap(), "new");
    }

    #[test]
    fn missing_destination_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap().to_string();
        let tasks = module_map_tasks(&root, &root, "10.0.1");
        fs::create_dir_all(tasks[0].source.parent().unwrap()).unwrap();
        fs::write(&tasks[0].source, "module ucrt {}").unwrap();

        let result = copy_files(&tasks, |_| {});
        assert!(matches!(result, Err(Error::Copy { .. })));
    }
}
