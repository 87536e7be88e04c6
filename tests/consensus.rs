
mod util;


use assert_fs::TempDir;
use predicates::prelude::*;

use tomo_align::metadata::{self, AlignmentRow};

use crate::util::cmd::{cmd, AssertExt};


fn row(object: &str, rot: f64, tilt: f64, psi: f64) -> AlignmentRow {
	AlignmentRow {
		object: object.to_string(),
		shift_x: 0.0,
		shift_y: 0.0,
		shift_z: 0.0,
		rot,
		tilt,
		psi
	}
}


#[test]
fn scores_matching_and_diverging_alignments() {

	let dir = TempDir::new().unwrap();
	let first_table = dir.path().join("first.xmd");
	let second_table = dir.path().join("second.xmd");
	let scores_table = dir.path().join("scores.xmd");

	// v1 agrees exactly, v2 disagrees by a 90° in-plane rotation,
	// v3 only exists in the first set and is skipped
	metadata::write_alignment(&first_table, &[
		row("v1", 40.0, 70.0, -10.0),
		row("v2", 0.0, 0.0, 0.0),
		row("v3", 15.0, 5.0, 25.0)
	]).unwrap();
	metadata::write_alignment(&second_table, &[
		row("v1", 40.0, 70.0, -10.0),
		row("v2", 90.0, 0.0, 0.0)
	]).unwrap();

	cmd()
		.current_dir(dir.path())
		.arg("consensus-align")
		.arg("-consensus_first").arg(&first_table)
		.arg("-consensus_second").arg(&second_table)
		.arg("-consensus_output").arg(&scores_table)
		.assert()
		.print_stdout()
		.print_stderr()
		.success();

	let scores = metadata::read_scores(&scores_table).unwrap();
	assert_eq!(scores.len(), 2);

	assert_eq!(scores[0].object, "v1");
	assert!(scores[0].distance.abs() < 1e-3, "same alignment scored {}", scores[0].distance);

	// a 90° rotation is 45° apart in quaternion distance
	assert_eq!(scores[1].object, "v2");
	assert!((scores[1].distance - 45.0).abs() < 1e-3, "diverging alignment scored {}", scores[1].distance);
}


#[test]
fn fails_without_common_objects() {

	let dir = TempDir::new().unwrap();
	let first_table = dir.path().join("first.xmd");
	let second_table = dir.path().join("second.xmd");

	metadata::write_alignment(&first_table, &[row("v1", 0.0, 0.0, 0.0)]).unwrap();
	metadata::write_alignment(&second_table, &[row("other", 0.0, 0.0, 0.0)]).unwrap();

	cmd()
		.current_dir(dir.path())
		.arg("consensus-align")
		.arg("-consensus_first").arg(&first_table)
		.arg("-consensus_second").arg(&second_table)
		.arg("-consensus_output").arg(dir.path().join("scores.xmd"))
		.assert()
		.print_stdout()
		.print_stderr()
		.failure()
		.stdout(predicate::str::contains("no objects in common"));
}
