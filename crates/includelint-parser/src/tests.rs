//! Extended tests for the includelint parser
//!
//! Most of these run the real clang frontend on a small on-disk tree and
//! return early when clang is not installed. The rest run a shell script
//! printing canned preprocessor output in its place.

use super::*;
use includelint_core::CompileCommand;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn create_source_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("inc/a")).unwrap();
    fs::create_dir_all(root.join("inc/b")).unwrap();

    fs::write(root.join("inc/a/a.h"), "#pragma once\nint a;\n").unwrap();
    fs::write(root.join("inc/b/b.h"), "#pragma once\n#include \"a.h\"\n").unwrap();
    fs::write(
        root.join("src/main.c"),
        "#include \"a.h\"\n#include \"b.h\"\nint main(void) { return a; }\n",
    )
    .unwrap();

    temp
}

fn clang() -> Option<ClangFrontend> {
    ClangFrontend::new().ok()
}

/// Test that every inclusion, including the skipped re-inclusion, gets its file
#[test]
fn test_clang_reports_included_files() {
    let Some(frontend) = clang() else {
        return;
    };

    let temp = create_source_tree();
    let command = CompileCommand::new(
        temp.path(),
        "src/main.c",
        vec![
            "clang".to_string(),
            "-Iinc/a".to_string(),
            "-Iinc/b".to_string(),
            "-c".to_string(),
            "src/main.c".to_string(),
            "-o".to_string(),
            "main.o".to_string(),
        ],
    );

    let extracted = IncludeDirectoryExtractor::default().extract(&command);
    assert_eq!(extracted.arguments, vec!["-Iinc/a", "-Iinc/b"]);

    let tu = frontend
        .parse(&ParseRequest {
            directory: &command.directory,
            filename: &command.filename,
            arguments: &extracted.arguments,
            options: ParseOptions::preprocessing_record(),
        })
        .unwrap();

    let found: Vec<(String, Option<PathBuf>)> = tu
        .inclusion_directives()
        .filter(|(node, _)| node.location.is_some())
        .map(|(_, d)| (d.spelling.clone(), d.included_file.clone()))
        .collect();

    assert_eq!(
        found,
        vec![
            ("a.h".to_string(), Some(PathBuf::from("inc/a/a.h"))),
            ("b.h".to_string(), Some(PathBuf::from("inc/b/b.h"))),
            ("a.h".to_string(), Some(PathBuf::from("inc/a/a.h"))),
        ]
    );
    assert!(tu.diagnostics.is_empty(), "{:?}", tu.diagnostics);
}

/// Test that a missing header is a diagnostic, not an error
#[test]
fn test_clang_missing_header_is_diagnostic() {
    let Some(frontend) = clang() else {
        return;
    };

    let temp = create_source_tree();
    fs::write(temp.path().join("src/broken.c"), "#include \"missing.h\"\n").unwrap();

    let arguments = vec!["-Iinc/a".to_string()];
    let tu = frontend
        .parse(&ParseRequest {
            directory: temp.path(),
            filename: "src/broken.c",
            arguments: &arguments,
            options: ParseOptions::preprocessing_record(),
        })
        .unwrap();

    assert!(!tu.diagnostics.is_empty());
    assert!(tu
        .inclusion_directives()
        .all(|(_, d)| d.included_file.is_none() || d.spelling != "missing.h"));
}

/// Preprocessed output of `#include "x.h"` twice; `x.h` is found through
/// `-iquote inc/q` and skipped the second time.
#[cfg(unix)]
const QUOTED_TWICE: &str = r#"# 1 "src/main.c"
# 1 "<built-in>" 1
# 1 "<built-in>" 3
#define __clang__ 1
# 1 "<command line>" 1
# 1 "<built-in>" 2
# 1 "src/main.c" 2
#include "x.h" /* clang -E -dI */
# 1 "src/main.c"
# 1 "inc/q/x.h" 1
#define X_H
# 2 "src/main.c" 2
#include "x.h" /* clang -E -dI */
# 3 "src/main.c"
"#;

/// Write an executable standing in for clang: prints `output`, reports a
/// fatal error on stderr and exits with status 1.
#[cfg(unix)]
fn fake_clang(dir: &std::path::Path, output: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-clang");
    let script = format!(
        "#!/bin/sh\ncat <<'OUTPUT'\n{}OUTPUT\necho \"src/main.c:3:10: fatal error: 'gone.h' file not found\" >&2\nexit 1\n",
        output
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Test that a failing clang run still yields a walkable tree with diagnostics
#[cfg(unix)]
#[test]
fn test_failed_run_keeps_tree_and_diagnostics() {
    let temp = create_source_tree();
    fs::create_dir_all(temp.path().join("inc/q")).unwrap();
    fs::write(temp.path().join("inc/q/x.h"), "#pragma once\n").unwrap();
    fs::write(temp.path().join("inc/a/x.h"), "#pragma once\n").unwrap();

    let frontend = ClangFrontend::with_path(fake_clang(temp.path(), QUOTED_TWICE));
    let arguments: Vec<String> = ["-iquote", "inc/q", "-Iinc/a"].iter().map(|s| s.to_string()).collect();

    let tu = frontend
        .parse(&ParseRequest {
            directory: temp.path(),
            filename: "src/main.c",
            arguments: &arguments,
            options: ParseOptions::preprocessing_record(),
        })
        .unwrap();

    let found: Vec<(String, Option<PathBuf>)> = tu
        .inclusion_directives()
        .map(|(_, d)| (d.spelling.clone(), d.included_file.clone()))
        .collect();

    assert_eq!(
        found,
        vec![
            ("x.h".to_string(), Some(PathBuf::from("inc/q/x.h"))),
            ("x.h".to_string(), Some(PathBuf::from("inc/q/x.h"))),
        ]
    );
    assert_eq!(tu.diagnostics.len(), 1);
    assert!(tu.diagnostics[0].contains("file not found"));
}
