//! End-to-end scenarios driving the orchestrator pipelines directly
//! against small synthetic repositories under a tempdir.

use skelly::config::Settings;
use skelly::output::OutputFormat;
use skelly::orchestrator::{generate, status, update};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

#[test]
fn s1_single_file_go_generate() {
    let dir = tempdir().unwrap();
    write(dir.path(), "demo.go", "package d\nfunc A(){B()}\nfunc B(){}\n");
    let settings = Settings::default();

    let report = generate(dir.path(), &settings, None, OutputFormat::Text).unwrap();
    assert_eq!(report.files_parsed, 1);
    assert_eq!(report.symbols, 2);

    let artifacts = settings.artifacts_path(dir.path());
    assert!(artifacts.join("index.txt").exists());
    assert!(artifacts.join("graph.txt").exists());
    assert!(artifacts.join("nav-index.json").exists());
    assert!(artifacts.join(".state.json").exists());

    let graph_txt = fs::read_to_string(artifacts.join("graph.txt")).unwrap();
    assert_eq!(graph_txt.lines().count(), 2);
    let a_line = graph_txt.lines().find(|l| l.contains("|function|A|")).unwrap();
    assert!(a_line.contains("demo.go|2|function|B"));
    let b_line = graph_txt.lines().find(|l| l.contains("|function|B|")).unwrap();
    assert!(b_line.contains("demo.go|1|function|A"));
}

#[test]
fn s2_idempotent_repeat_rewrites_nothing() {
    let dir = tempdir().unwrap();
    write(dir.path(), "demo.go", "package d\nfunc A(){B()}\nfunc B(){}\n");
    let settings = Settings::default();

    let first = generate(dir.path(), &settings, None, OutputFormat::Text).unwrap();
    assert!(first.artifacts_written > 0);

    let artifacts = settings.artifacts_path(dir.path());
    let before_graph: Vec<u8> = fs::read(artifacts.join("graph.txt")).unwrap();
    let before_state: Vec<u8> = fs::read(artifacts.join(".state.json")).unwrap();

    let second = generate(dir.path(), &settings, None, OutputFormat::Text).unwrap();
    assert_eq!(second.artifacts_written, 0);

    let after_graph = fs::read(artifacts.join("graph.txt")).unwrap();
    assert_eq!(before_graph, after_graph);

    // `.state.json` carries an `updated_at` stamp per file; a repeat
    // run touching no source file must not re-stamp anything either.
    let after_state = fs::read(artifacts.join(".state.json")).unwrap();
    assert_eq!(before_state, after_state);
}

#[test]
fn s3_incremental_add_picks_up_new_callee() {
    let dir = tempdir().unwrap();
    write(dir.path(), "demo.go", "package d\nfunc A(){B()}\nfunc B(){}\n");
    let settings = Settings::default();
    generate(dir.path(), &settings, None, OutputFormat::Text).unwrap();

    write(dir.path(), "demo.go", "package d\nfunc A(){B();C()}\nfunc B(){}\nfunc C(){}\n");

    let report = update(dir.path(), &settings, OutputFormat::Text, true).unwrap();
    assert_eq!(report.changed, vec!["demo.go".to_string()]);
    assert!(!report.regenerated);

    let artifacts = settings.artifacts_path(dir.path());
    let graph_txt = fs::read_to_string(artifacts.join("graph.txt")).unwrap();
    assert!(graph_txt.contains("|function|C|"));
    let a_line = graph_txt.lines().find(|l| l.contains("|function|A|")).unwrap();
    assert!(a_line.contains("demo.go|2|function|B"));
    assert!(a_line.contains("demo.go|3|function|C"));
}

#[test]
fn s4_language_filtered_generate_excludes_other_languages() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.go", "package d\nfunc A(){}\n");
    write(dir.path(), "b.py", "def b():\n    pass\n");
    write(dir.path(), "c.rb", "def c\nend\n");
    let settings = Settings::default();

    let report = generate(dir.path(), &settings, Some("go,python"), OutputFormat::Text).unwrap();
    assert_eq!(report.files_parsed, 2);

    let artifacts = settings.artifacts_path(dir.path());
    let index = fs::read_to_string(artifacts.join("index.txt")).unwrap();
    assert!(index.contains("a.go"));
    assert!(index.contains("b.py"));
    assert!(!index.contains("c.rb"));
}

#[test]
fn s5_ambiguous_callee_name_is_discarded() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.go", "package d\nfunc dup(){}\n");
    write(dir.path(), "b.go", "package d\nfunc dup(){}\n");
    write(dir.path(), "c.go", "package d\nfunc run(){dup()}\n");
    let settings = Settings::default();

    generate(dir.path(), &settings, None, OutputFormat::Text).unwrap();
    let artifacts = settings.artifacts_path(dir.path());
    let graph_txt = fs::read_to_string(artifacts.join("graph.txt")).unwrap();
    let run_line = graph_txt.lines().find(|l| l.contains("|function|run|")).unwrap();
    // fields: id|5|name|kind|signature|callers|callees -- callees is the last field
    let callees = run_line.rsplit('|').next().unwrap();
    assert!(callees.is_empty());
}

#[test]
fn s6_import_alias_resolution_picks_correct_file() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "api/main.ts",
        "import {helper as h} from \"./util\"\nexport function run(){ h() }\n",
    );
    write(dir.path(), "api/util.ts", "export function helper(){}\n");
    write(dir.path(), "other/util.ts", "export function helper(){}\n");
    let settings = Settings::default();

    generate(dir.path(), &settings, None, OutputFormat::Text).unwrap();
    let artifacts = settings.artifacts_path(dir.path());
    let graph_txt = fs::read_to_string(artifacts.join("graph.txt")).unwrap();
    let run_line = graph_txt.lines().find(|l| l.contains("|function|run|")).unwrap();
    assert!(run_line.contains("api/util.ts"));
    assert!(!run_line.contains("other/util.ts"));
}

#[test]
fn status_reports_without_writing_artifacts() {
    let dir = tempdir().unwrap();
    write(dir.path(), "demo.go", "package d\nfunc A(){}\n");
    let settings = Settings::default();
    generate(dir.path(), &settings, None, OutputFormat::Text).unwrap();

    let artifacts = settings.artifacts_path(dir.path());
    let before = fs::read(artifacts.join("index.txt")).unwrap();

    write(dir.path(), "demo.go", "package d\nfunc A(){}\nfunc B(){}\n");
    let report = status(dir.path(), &settings).unwrap();
    assert_eq!(report.changed, vec!["demo.go".to_string()]);

    let after = fs::read(artifacts.join("index.txt")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn deleting_a_file_is_reflected_by_update() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.go", "package d\nfunc A(){}\n");
    write(dir.path(), "b.go", "package d\nfunc B(){}\n");
    let settings = Settings::default();
    generate(dir.path(), &settings, None, OutputFormat::Text).unwrap();

    fs::remove_file(dir.path().join("b.go")).unwrap();
    let report = update(dir.path(), &settings, OutputFormat::Text, false).unwrap();
    assert_eq!(report.deleted, vec!["b.go".to_string()]);

    let artifacts = settings.artifacts_path(dir.path());
    let index = fs::read_to_string(artifacts.join("index.txt")).unwrap();
    assert!(!index.contains("b.go"));
}
