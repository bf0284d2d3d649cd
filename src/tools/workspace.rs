//! Run-scoped temporary files for one aligner invocation.
//!
//! Every artifact name embeds a random run identifier, so concurrent runs
//! sharing a working directory never collide and cleanup of one run can
//! never touch another run's files. Cleanup is guarded by existence checks:
//! a run that crashed before producing its output must not error while
//! removing what little it did create.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

use crate::bio::fasta::{write_fasta, FastaRecord};
use crate::Result;

/// Handle owning the temporary files of a single aligner run.
#[derive(Debug)]
pub struct RunWorkspace {
    id: String,
    base: PathBuf,
}

impl RunWorkspace {
    /// New workspace rooted in the current working directory.
    pub fn new() -> Self {
        Self::in_dir(".")
    }

    /// New workspace rooted in `base`.
    pub fn in_dir(base: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            base: base.into(),
        }
    }

    /// The run identifier embedded in every artifact name.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Staged query FASTA file.
    pub fn input_path(&self) -> PathBuf {
        self.base.join(format!("tmp_{}.fa", self.id))
    }

    /// Default aligner output file.
    pub fn output_path(&self) -> PathBuf {
        self.base.join(format!("tmp_{}_out.tsv", self.id))
    }

    /// Reference index name handed to the aligner (it appends `.dmnd`).
    pub fn index_stem(&self) -> PathBuf {
        self.base.join(format!("reference_{}", self.id))
    }

    /// Reference index artifact the aligner actually writes.
    pub fn index_path(&self) -> PathBuf {
        self.base.join(format!("reference_{}.dmnd", self.id))
    }

    /// Write query sequences to the staged input file, one `Seq <idx>`
    /// record per sequence.
    pub fn stage(&self, sequences: &[String]) -> Result<PathBuf> {
        let records: Vec<FastaRecord> = sequences
            .iter()
            .enumerate()
            .map(|(idx, seq)| FastaRecord {
                id: format!("Seq {idx}"),
                seq: seq.clone(),
            })
            .collect();

        let path = self.input_path();
        write_fasta(&path, &records)?;
        Ok(path)
    }

    /// Delete the input, output, and index artifacts of this run. Missing
    /// files are skipped; a partially-completed run is normal.
    pub fn cleanup(&self) -> Result<()> {
        for path in [self.input_path(), self.output_path(), self.index_path()] {
            remove_if_present(&path)?;
        }
        Ok(())
    }
}

impl Default for RunWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RunWorkspace {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            warn!("failed to remove temporary files for run {}: {e}", self.id);
        }
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn artifact_names_embed_the_run_id() {
        let ws = RunWorkspace::in_dir("/tmp");
        let id = ws.id().to_string();
        assert!(ws.input_path().to_str().unwrap().contains(&id));
        assert!(ws.output_path().to_str().unwrap().contains(&id));
        assert!(ws.index_path().to_str().unwrap().contains(&id));
    }

    #[test]
    fn two_workspaces_never_share_artifact_names() {
        let a = RunWorkspace::in_dir("/tmp");
        let b = RunWorkspace::in_dir("/tmp");
        assert_ne!(a.input_path(), b.input_path());
        assert_ne!(a.index_path(), b.index_path());
    }

    #[test]
    fn stage_writes_one_record_per_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let ws = RunWorkspace::in_dir(dir.path());
        let path = ws.stage(&["MKVLAA".into(), "PAWHEAE".into()]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, ">Seq 0\nMKVLAA\n>Seq 1\nPAWHEAE\n");
    }

    #[test]
    fn cleanup_removes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let ws = RunWorkspace::in_dir(dir.path());
        ws.stage(&["MKV".into()]).unwrap();
        std::fs::write(ws.output_path(), "out").unwrap();
        std::fs::write(ws.index_path(), "idx").unwrap();

        ws.cleanup().unwrap();
        assert!(!ws.input_path().exists());
        assert!(!ws.output_path().exists());
        assert!(!ws.index_path().exists());
    }

    #[test]
    fn cleanup_tolerates_a_partial_run() {
        let dir = tempfile::tempdir().unwrap();
        let ws = RunWorkspace::in_dir(dir.path());
        // Input staged, but the aligner never produced output or an index.
        ws.stage(&["MKV".into()]).unwrap();
        ws.cleanup().unwrap();
        assert!(!ws.input_path().exists());
    }

    #[test]
    fn drop_cleans_up_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let input = {
            let ws = RunWorkspace::in_dir(dir.path());
            ws.stage(&["MKV".into()]).unwrap();
            ws.input_path()
        };
        assert!(!input.exists());
    }
}
