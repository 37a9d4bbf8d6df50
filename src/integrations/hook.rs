//! Git pre-commit hook installer.
//!
//! Writes a small shell script that shells out to `skelly update`.
//! Refuses to overwrite a hook it didn't write (keyed by a marker
//! comment) unless `force` is set.

use std::io;
use std::path::Path;

const MARKER: &str = "# managed-by: skelly install-hook";

fn script() -> String {
    format!("#!/bin/sh\n{MARKER}\nskelly update >/dev/null 2>&1 || true\n")
}

#[derive(Debug, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    Skipped,
}

pub fn install(git_dir: &Path, force: bool) -> io::Result<InstallOutcome> {
    let hooks_dir = git_dir.join("hooks");
    std::fs::create_dir_all(&hooks_dir)?;
    let hook_path = hooks_dir.join("pre-commit");

    if hook_path.exists() {
        let existing = std::fs::read_to_string(&hook_path).unwrap_or_default();
        if !existing.contains(MARKER) && !force {
            return Ok(InstallOutcome::Skipped);
        }
    }

    std::fs::write(&hook_path, script())?;
    set_executable(&hook_path)?;
    Ok(InstallOutcome::Installed)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
