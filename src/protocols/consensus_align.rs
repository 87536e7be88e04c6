
use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing::info;

use crate::args::{Args, ArgsConfig};
use crate::geometry::quaternion;
use crate::metadata::{self, ScoredRow};


pub const PROTOCOL_ID: &'static str = "consensus-align";


/// Score how well two alignments of the same population agree, by quaternion
/// distance. 0° means the alignments match exactly; 180° is maximal disagreement.
pub fn run(args: &Args, _args_config: &ArgsConfig) -> Result<()> {

	let c_args = ConsensusArgs::from(args)?;

	let first = metadata::read_alignment(&c_args.first_table)?;
	let second = metadata::read_alignment(&c_args.second_table)?;
	let second = second.iter()
		.map(|row| (row.object.as_str(), row))
		.collect::<HashMap<_,_>>();

	// score the objects the two alignments have in common
	let mut scores = Vec::new();
	for row1 in &first {
		let Some(row2) = second.get(row1.object.as_str())
			else { continue; };

		let q1 = quaternion::from_rotation(&row1.to_transform().rotation());
		let q2 = quaternion::from_rotation(&row2.to_transform().rotation());

		// q and -q are the same rotation, so keep the better of the two signs
		let distance = quaternion::distance(&q1, &q2)
			.min(quaternion::distance(&q1, &(-q2)));

		scores.push(ScoredRow {
			object: row1.object.clone(),
			distance: distance.to_degrees()
		});
	}

	if scores.is_empty() {
		bail!("the two alignments have no objects in common");
	}

	metadata::write_scores(&c_args.output_table, &scores)?;

	// summary statistics for the run report
	let n = scores.len() as f64;
	let mean = scores.iter().map(|s| s.distance).sum::<f64>()/n;
	let std = (scores.iter().map(|s| (s.distance - mean)*(s.distance - mean)).sum::<f64>()/n).sqrt();
	let outliers = scores.iter()
		.filter(|s| (s.distance - mean).abs() > 3.0*std)
		.count();
	info!(
		"scored {} objects: mean distance {:.2}°, std {:.2}°, outliers {:.1}%",
		scores.len(),
		mean,
		std,
		100.0*(outliers as f64)/n
	);

	Ok(())
}


struct ConsensusArgs {
	first_table: PathBuf,
	second_table: PathBuf,
	output_table: PathBuf
}

impl ConsensusArgs {

	fn from(args: &Args) -> Result<ConsensusArgs> {
		Ok(ConsensusArgs {
			first_table: args.get_from_group("consensus", "first")
				.require()?
				.value()
				.into(),
			second_table: args.get_from_group("consensus", "second")
				.require()?
				.value()
				.into(),
			output_table: args.get_from_group("consensus", "output")
				.require()?
				.value()
				.into()
		})
	}
}
