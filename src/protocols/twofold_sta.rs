
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use nalgebra::Vector3;
use tracing::info;

use crate::aligner::PairwiseAligner;
use crate::args::{Args, ArgsConfig};
use crate::conciliate::conciliate;
use crate::geometry::RigidTransform;
use crate::metadata::{self, AlignmentRow, PairwiseRow};
use crate::objects::{ObjectKind, ObjectSet, OutputBuilder, OutputMode};


pub const PROTOCOL_ID: &'static str = "twofold-sta";


pub fn run(args: &Args, args_config: &ArgsConfig) -> Result<()> {

	let tf_args = TwofoldArgs::from(args, args_config)?;

	// convert input: load the subtomogram population
	let set = metadata::read_objects(&tf_args.input_table)?;
	if set.kind != ObjectKind::Subtomograms {
		bail!("twofold STA takes subtomograms, got: {}", set.kind.block_name());
	}
	info!("subtomograms: {}", set.objects.len());

	// align pairs: one external aligner run per pair
	let pairwise = align_pairs(&set, &tf_args)?;
	info!("pairwise measurements: {}", pairwise.len());

	// conciliate the pairwise alignments into one rotation per subtomogram
	let ids = set.objects.iter()
		.map(|obj| obj.object_id.clone())
		.collect::<Vec<_>>();
	let mut measurements = HashMap::new();
	for row in &pairwise {
		measurements.insert(
			(resolve_id(&set, &row.object1), resolve_id(&set, &row.object2)),
			row.rotation()
		);
	}
	let rotations = conciliate(&ids, &measurements)?;

	// create output: re-attach one alignment row per subtomogram
	let mode =
		if tf_args.resume {
			OutputMode::Resume
		} else {
			OutputMode::Fresh
		};
	let mut output = OutputBuilder::new(&tf_args.output_table, mode)?;
	for (obj, rotation) in set.objects.iter().zip(&rotations) {
		let transform = RigidTransform::from_parts(rotation, &Vector3::zeros());
		output.push(AlignmentRow::from_transform(obj.object_id.clone(), &transform)?);
	}
	let count = output.len();
	output.write()?;
	info!("wrote {} alignments to {}", count, tf_args.output_table.to_string_lossy());

	Ok(())
}


fn align_pairs(set: &ObjectSet, tf_args: &TwofoldArgs) -> Result<Vec<PairwiseRow>> {

	fs::create_dir_all(&tf_args.work_dir)
		.context("Failed to create work dir")?;

	let mut rows = Vec::new();
	for i in 0 .. set.objects.len() {
		for j in i + 1 .. set.objects.len() {
			let pair_table = tf_args.work_dir.join(format!("pair_{:04}_{:04}.xmd", i, j));
			let pair_rows = tf_args.aligner.align_pair(
				&set.objects[i].path,
				&set.objects[j].path,
				&pair_table
			)?;
			rows.extend(pair_rows);
		}
	}

	// keep the collected table around for inspection and reruns
	metadata::write_pairwise(tf_args.work_dir.join("pairwise.xmd"), &rows)?;

	Ok(rows)
}


/// The aligner identifies objects by the file paths it was given; map those
/// back to object ids. Anything unrecognized passes through unchanged and is
/// rejected downstream as a malformed record.
fn resolve_id(set: &ObjectSet, name: &str) -> String {
	set.objects.iter()
		.find(|obj| obj.object_id == name || obj.path.to_string_lossy() == name)
		.map(|obj| obj.object_id.clone())
		.unwrap_or_else(|| name.to_string())
}


struct TwofoldArgs {
	input_table: PathBuf,
	output_table: PathBuf,
	work_dir: PathBuf,
	resume: bool,
	aligner: PairwiseAligner
}

impl TwofoldArgs {

	fn from(args: &Args, args_config: &ArgsConfig) -> Result<TwofoldArgs> {
		Ok(TwofoldArgs {
			input_table: args.get_from_group("twofold", "input")
				.require()?
				.value()
				.into(),
			output_table: args.get_from_group("twofold", "output")
				.require()?
				.value()
				.into(),
			work_dir: args.get_from_group("twofold", "work")
				.or("twofold".to_string())
				.value()
				.into(),
			resume: args.get_from_group("twofold", "resume")
				.into_bool()?
				.or(false)
				.value(),
			aligner: PairwiseAligner {
				executable: args.get_from_group("align", "exec")
					.or_config(args_config)
					.or("tomo_twofold_align".to_string())
					.value()
					.into(),
				max_tilt: args.get_from_group("align", "max_tilt")
					.or_config(args_config)
					.into_f64()?
					.or(60.0)
					.value(),
				resolution_cutoff: args.get_from_group("align", "max_res")
					.or_config(args_config)
					.into_f64()?
					.or(20.0)
					.value(),
				angular_step: args.get_from_group("align", "ang_step")
					.or_config(args_config)
					.into_f64()?
					.or(5.0)
					.value()
			}
		})
	}
}
