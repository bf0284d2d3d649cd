//! Lifecycle tests for the DIAMOND wrapper, driven by a shell-script
//! stand-in for the real binary. They verify the two-stage invocation,
//! the empty-result and failure contracts, and that no temporary file
//! survives a run on either path.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use iris::tools::diamond::{DiamondAligner, Sensitivity};

/// Stand-in that builds an index file and writes an empty result set.
const NO_HIT_STUB: &str = r#"#!/bin/sh
cmd="$1"; shift
db=""; out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -d) db="$2"; shift ;;
    -o) out="$2"; shift ;;
  esac
  shift
done
case "$cmd" in
  makedb) : > "${db}.dmnd" ;;
  blastp) : > "$out" ;;
esac
exit 0
"#;

/// Stand-in that reports a single alignment.
const ONE_HIT_STUB: &str = r#"#!/bin/sh
cmd="$1"; shift
db=""; out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -d) db="$2"; shift ;;
    -o) out="$2"; shift ;;
  esac
  shift
done
case "$cmd" in
  makedb) : > "${db}.dmnd" ;;
  blastp) printf 'Seq 0\tsp|P38398|BRCA1_HUMAN\t100.0\t3\t0\t0\t1\t3\t1\t3\t1.0e-5\t20.1\n' > "$out" ;;
esac
exit 0
"#;

/// Stand-in whose index build always fails.
const FAILING_STUB: &str = "#!/bin/sh\nexit 1\n";

fn write_stub(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("diamond");
    fs::write(&path, body).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn write_reference(dir: &Path) -> PathBuf {
    let path = dir.join("ref.fa");
    fs::write(&path, ">sp|P38398|BRCA1_HUMAN\nMDLSALRVEE\n").unwrap();
    path
}

/// Run-scoped artifacts left behind in `dir`, if any.
fn leftover_temp_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("tmp_") || n.starts_with("reference_"))
        .collect();
    names.sort();
    names
}

#[test]
fn zero_homology_run_returns_empty_result_and_leaves_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(dir.path(), NO_HIT_STUB);
    let reference = write_reference(dir.path());

    let aligner = DiamondAligner::new(stub).unwrap().with_base_dir(dir.path());
    let result = aligner
        .align(&["MKV".into()], &reference, Sensitivity::default(), None)
        .unwrap();

    assert_eq!(result, Some(Vec::new()));
    assert!(leftover_temp_files(dir.path()).is_empty());
}

#[test]
fn successful_run_parses_typed_records() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(dir.path(), ONE_HIT_STUB);
    let reference = write_reference(dir.path());

    let aligner = DiamondAligner::new(stub).unwrap().with_base_dir(dir.path());
    let records = aligner
        .align(&["MDL".into()], &reference, Sensitivity::Fast, None)
        .unwrap()
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].query_accession, "Seq 0");
    assert_eq!(records[0].target_accession, "sp|P38398|BRCA1_HUMAN");
    assert_eq!(records[0].alignment_length, 3);
    assert!(leftover_temp_files(dir.path()).is_empty());
}

#[test]
fn failing_aligner_yields_absent_result_and_leaves_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(dir.path(), FAILING_STUB);
    let reference = write_reference(dir.path());

    let aligner = DiamondAligner::new(stub).unwrap().with_base_dir(dir.path());
    let result = aligner
        .align(&["MKV".into()], &reference, Sensitivity::default(), None)
        .unwrap();

    assert_eq!(result, None);
    assert!(leftover_temp_files(dir.path()).is_empty());
}

#[test]
fn user_supplied_output_path_survives_cleanup() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(dir.path(), ONE_HIT_STUB);
    let reference = write_reference(dir.path());
    let out = dir.path().join("hits.tsv");

    let aligner = DiamondAligner::new(stub).unwrap().with_base_dir(dir.path());
    let records = aligner
        .align(&["MDL".into()], &reference, Sensitivity::default(), Some(&out))
        .unwrap()
        .unwrap();

    assert_eq!(records.len(), 1);
    assert!(out.exists(), "caller-requested output file was removed");
    assert!(leftover_temp_files(dir.path()).is_empty());
}
