//! Integration tests that run the btor2ex binary on the fixture designs.

use std::path::PathBuf;
use std::process::{Command, Output};

fn designs_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("designs")
}

fn btor2ex(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_btor2ex"))
        .args(args)
        .output()
        .expect("failed to run btor2ex")
}

fn design(name: &str) -> String {
    designs_dir().join(name).display().to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn safe_design_prints_safe() {
    let out = btor2ex(&[&design("reg_en.safe.btor"), "--solver", "exhaustive"]);
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out), "SAFE");
}

#[test]
fn unsafe_design_prints_unsafe_and_exits_zero() {
    let out = btor2ex(&[&design("reg_en.bad.btor"), "--solver", "exhaustive"]);
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out), "UNSAFE: please see log for trace");
    // The model goes to the log.
    let log = String::from_utf8_lossy(&out.stderr);
    assert!(log.contains("en_1"), "{log}");
}

#[test]
fn fixtures_reach_expected_verdicts() {
    for (name, expected) in [
        ("no_bad.btor", "SAFE"),
        ("unsat_constraint.btor", "SAFE"),
        ("counter.btor", "UNSAFE: please see log for trace"),
    ] {
        let out = btor2ex(&[&design(name), "-b", "2", "--solver", "exhaustive"]);
        assert!(out.status.success(), "{name}: {out:?}");
        assert_eq!(stdout(&out), expected, "{name}");
    }
}

#[test]
fn schedule_does_not_change_the_verdict() {
    let out = btor2ex(&[
        &design("reg_en.safe.btor"),
        "--solver",
        "exhaustive",
        "--schedule",
        "4",
        "--bound",
        "2",
    ]);
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out), "SAFE");
}

#[test]
fn emit_schedule_prints_spliced_design() {
    let out = btor2ex(&[&design("reg_en.btor"), "--emit-schedule", "--schedule", "4"]);
    assert!(out.status.success(), "{out:?}");
    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 28);
    assert_eq!(lines[22], "23 sort bitvec 2");
    assert_eq!(lines[25], "26 state 23 fv__counter");
    assert_eq!(lines[27], "28 next 23 26 27");
}

#[test]
fn parse_errors_exit_with_one() {
    let dir = std::env::temp_dir().join(format!("btor2ex-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("broken.btor");
    std::fs::write(&path, "1 sort bitvec 4\n2 frobnicate 1 1\n").unwrap();

    let out = btor2ex(&[path.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("frobnicate"), "{err}");
}

#[test]
fn ill_sorted_design_is_a_parse_error() {
    let dir = std::env::temp_dir().join(format!("btor2ex-cli-sorts-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("ill_sorted.btor");
    std::fs::write(
        &path,
        "1 sort bitvec 1\n2 sort bitvec 4\n3 input 2 x\n4 input 1 y\n5 eq 1 3 4\n6 bad 5\n",
    )
    .unwrap();

    let out = btor2ex(&[path.to_str().unwrap(), "--solver", "exhaustive"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty(), "{out:?}");
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("sort mismatch"), "{err}");
}

#[test]
fn missing_file_exits_with_one() {
    let out = btor2ex(&[&design("does_not_exist.btor")]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn search_space_limit_is_an_error() {
    let out = btor2ex(&[
        &design("reg_en.safe.btor"),
        "--solver",
        "exhaustive",
        "--max-free-bits",
        "1",
    ]);
    assert_eq!(out.status.code(), Some(1));
}

#[cfg(not(feature = "z3"))]
#[test]
fn z3_without_feature_is_an_error() {
    let out = btor2ex(&[&design("reg_en.safe.btor"), "--solver", "z3"]);
    assert_eq!(out.status.code(), Some(1));

    // No silent fallback to the enumerating solver.
    let out = btor2ex(&[&design("reg_en.safe.btor")]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty(), "{out:?}");
    assert!(String::from_utf8_lossy(&out.stderr).contains("z3"));
}

#[cfg(feature = "z3")]
#[test]
fn default_solver_is_z3() {
    let out = btor2ex(&[&design("reg_en.bad.btor"), "-v"]);
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out), "UNSAFE: please see log for trace");
    let log = String::from_utf8_lossy(&out.stderr);
    assert!(log.contains("solver=z3"), "{log}");
}

#[cfg(feature = "z3")]
#[test]
fn z3_matches_exhaustive_verdicts() {
    for name in ["reg_en.safe.btor", "reg_en.bad.btor", "counter.btor"] {
        let a = btor2ex(&[&design(name), "--solver", "exhaustive"]);
        let b = btor2ex(&[&design(name), "--solver", "z3", "--timeout-ms", "10000"]);
        assert_eq!(stdout(&a), stdout(&b), "{name}");
    }
}
