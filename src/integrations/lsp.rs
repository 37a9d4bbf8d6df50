//! Optional language-server integration for `definition`/`references`.
//!
//! A thin, best-effort boundary: no protocol handshake, just shelling
//! out to a configured binary and parsing `path:line:column` tuples
//! from stdout. Any failure silently degrades to the parser-only
//! navigation result.

use std::path::PathBuf;
use std::process::Command;

pub trait CommandRunner {
    fn run(&self, dir: &std::path::Path, binary: &str, args: &[&str]) -> Option<String>;
}

pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, dir: &std::path::Path, binary: &str, args: &[&str]) -> Option<String> {
        let output = Command::new(binary).args(args).current_dir(dir).output().ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8(output.stdout).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: PathBuf,
    pub line: u32,
    pub column: u32,
}

/// Ask `binary` (invoked as `binary <args> <query>`) for locations and
/// parse `path:line:column` tuples, one per line. Returns `None` on any
/// failure or unparsable output — callers fall back to C9 results.
pub fn query_locations(runner: &dyn CommandRunner, dir: &std::path::Path, binary: &str, args: &[&str]) -> Option<Vec<Location>> {
    let stdout = runner.run(dir, binary, args)?;
    let locations: Vec<Location> = stdout.lines().filter_map(parse_location).collect();
    if locations.is_empty() {
        None
    } else {
        Some(locations)
    }
}

fn parse_location(line: &str) -> Option<Location> {
    let mut parts = line.rsplitn(3, ':');
    let column: u32 = parts.next()?.parse().ok()?;
    let line_no: u32 = parts.next()?.parse().ok()?;
    let path = parts.next()?;
    if path.is_empty() {
        return None;
    }
    Some(Location { path: PathBuf::from(path), line: line_no, column })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeRunner(Option<&'static str>);

    impl CommandRunner for FakeRunner {
        fn run(&self, _dir: &std::path::Path, _binary: &str, _args: &[&str]) -> Option<String> {
            self.0.map(|s| s.to_string())
        }
    }

    #[test]
    fn parses_path_line_column_tuples() {
        let runner = FakeRunner(Some("src/a.go:10:4\nsrc/b.go:2:1\n"));
        let locs = query_locations(&runner, std::path::Path::new("."), "gopls", &["definition"]).unwrap();
        assert_eq!(locs.len(), 2);
        assert_eq!(locs[0].line, 10);
        assert_eq!(locs[0].column, 4);
    }

    #[test]
    fn missing_binary_degrades_to_none() {
        let runner = FakeRunner(None);
        assert!(query_locations(&runner, std::path::Path::new("."), "missing", &[]).is_none());
    }

    #[test]
    fn unparsable_output_degrades_to_none() {
        let runner = FakeRunner(Some("not a location\n"));
        assert!(query_locations(&runner, std::path::Path::new("."), "gopls", &[]).is_none());
    }
}
