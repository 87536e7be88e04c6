
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::metadata::{self, PairwiseRow};


/// Contract with the external pairwise rigid-body aligner: one blocking
/// invocation per object pair, emitting a pairwise metadata table, signaling
/// failure by a non-zero exit status.
pub struct PairwiseAligner {
	pub executable: PathBuf,
	pub max_tilt: f64,
	pub resolution_cutoff: f64,
	pub angular_step: f64
}

impl PairwiseAligner {

	pub fn command(&self, volume1: &Path, volume2: &Path, out_table: &Path) -> Command {
		let mut cmd = Command::new(&self.executable);
		cmd
			.arg("--i1").arg(volume1)
			.arg("--i2").arg(volume2)
			.arg("--maxTilt").arg(self.max_tilt.to_string())
			.arg("--maxRes").arg(self.resolution_cutoff.to_string())
			.arg("--angStep").arg(self.angular_step.to_string())
			.arg("-o").arg(out_table);
		cmd
	}

	/// run the aligner for one pair and read back the table it wrote
	pub fn align_pair(&self, volume1: &Path, volume2: &Path, out_table: &Path) -> Result<Vec<PairwiseRow>> {

		let mut cmd = self.command(volume1, volume2, out_table);
		debug!("aligner command: {:?}", cmd);

		let status = cmd.status()
			.context(format!("Failed to launch pairwise aligner: {}", self.executable.to_string_lossy()))?;
		if !status.success() {
			bail!("Pairwise aligner failed with {} for command: {:?}", status, cmd);
		}

		metadata::read_pairwise(out_table)
			.context("Pairwise aligner did not write a readable table")
	}
}
