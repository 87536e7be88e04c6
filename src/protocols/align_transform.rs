
use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::args::{Args, ArgsConfig};
use crate::geometry::RigidTransform;
use crate::metadata::{self, AlignmentRow};


pub const PROTOCOL_ID: &'static str = "align-transform";


/// Rotate a set of alignments to a common reference: an external volume aligner
/// finds the transform between a reference average and a moving average, and
/// that transform is applied to every alignment of the moving set.
pub fn run(args: &Args, args_config: &ArgsConfig) -> Result<()> {

	let at_args = AlignTransformArgs::from(args, args_config)?;

	// find the axis transform between the two averages
	let mut cmd = Command::new(&at_args.executable);
	cmd
		.arg("--i1").arg(&at_args.reference_volume)
		.arg("--i2").arg(&at_args.moving_volume)
		.arg("--local")
		.arg("--dontScale")
		.arg("--copyGeo").arg(&at_args.matrix_file);
	debug!("volume aligner command: {:?}", cmd);

	let status = cmd.status()
		.context(format!("Failed to launch volume aligner: {}", at_args.executable.to_string_lossy()))?;
	if !status.success() {
		bail!("Volume aligner failed with {} for command: {:?}", status, cmd);
	}

	let axis = metadata::read_matrix4(&at_args.matrix_file)?;

	// re-reference every alignment of the moving set
	let rows = metadata::read_alignment(&at_args.input_table)?;
	let aligned = rows.iter()
		.map(|row| {
			let transform = RigidTransform::new(axis*row.to_transform().matrix());
			Ok(AlignmentRow::from_transform(row.object.clone(), &transform)?)
		})
		.collect::<Result<Vec<_>>>()?;
	metadata::write_alignment(&at_args.output_table, &aligned)?;

	info!("re-referenced {} alignments to {}", aligned.len(), at_args.output_table.to_string_lossy());

	Ok(())
}


struct AlignTransformArgs {
	reference_volume: PathBuf,
	moving_volume: PathBuf,
	input_table: PathBuf,
	output_table: PathBuf,
	matrix_file: PathBuf,
	executable: PathBuf
}

impl AlignTransformArgs {

	fn from(args: &Args, args_config: &ArgsConfig) -> Result<AlignTransformArgs> {
		Ok(AlignTransformArgs {
			reference_volume: args.get_from_group("atrans", "reference")
				.require()?
				.value()
				.into(),
			moving_volume: args.get_from_group("atrans", "moving")
				.require()?
				.value()
				.into(),
			input_table: args.get_from_group("atrans", "input")
				.require()?
				.value()
				.into(),
			output_table: args.get_from_group("atrans", "output")
				.require()?
				.value()
				.into(),
			matrix_file: args.get_from_group("atrans", "matrix")
				.or("align_axis.txt".to_string())
				.value()
				.into(),
			executable: args.get_from_group("atrans", "exec")
				.or_config(args_config)
				.or("tomo_volume_align".to_string())
				.value()
				.into()
		})
	}
}
