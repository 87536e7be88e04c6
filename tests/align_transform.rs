
mod util;


use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_fs::TempDir;
use nalgebra::Matrix4;
use predicates::prelude::*;

use tomo_align::metadata::{self, AlignmentRow};

use crate::util::cmd::{cmd, AssertExt};


/// a stand-in volume aligner that always finds a 90° rotation about z
/// with a (1,2,3) shift, written to the --copyGeo path
fn write_fake_aligner(dir: &Path) -> PathBuf {
	let path = dir.join("fake_volume_aligner.sh");
	fs::write(&path, r#"#!/bin/sh
while [ $# -gt 0 ]; do
	case "$1" in
		--copyGeo) out="$2"; shift 2 ;;
		*) shift ;;
	esac
done
cat > "$out" <<EOF
0 -1 0 1
1 0 0 2
0 0 1 3
0 0 0 1
EOF
"#).unwrap();
	fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
	path
}


#[test]
fn re_references_alignments_by_the_axis_transform() {

	let dir = TempDir::new().unwrap();
	let aligner = write_fake_aligner(dir.path());
	let input_table = dir.path().join("alignment.xmd");
	let output_table = dir.path().join("re_referenced.xmd");

	metadata::write_alignment(&input_table, &[
		AlignmentRow {
			object: "v1".to_string(),
			shift_x: 0.5,
			shift_y: -1.0,
			shift_z: 0.0,
			rot: 30.0,
			tilt: 0.0,
			psi: 0.0
		},
		AlignmentRow {
			object: "v2".to_string(),
			shift_x: 0.0,
			shift_y: 0.0,
			shift_z: 0.0,
			rot: 0.0,
			tilt: 45.0,
			psi: 10.0
		}
	]).unwrap();

	cmd()
		.current_dir(dir.path())
		.arg("align-transform")
		.arg("-atrans_reference").arg(dir.path().join("reference.mrc"))
		.arg("-atrans_moving").arg(dir.path().join("moving.mrc"))
		.arg("-atrans_input").arg(&input_table)
		.arg("-atrans_output").arg(&output_table)
		.arg("-atrans_matrix").arg(dir.path().join("axis.txt"))
		.arg("-atrans_exec").arg(&aligner)
		.assert()
		.print_stdout()
		.print_stderr()
		.success();

	let axis = Matrix4::from_row_slice(&[
		0.0, -1.0, 0.0, 1.0,
		1.0,  0.0, 0.0, 2.0,
		0.0,  0.0, 1.0, 3.0,
		0.0,  0.0, 0.0, 1.0
	]);

	let input = metadata::read_alignment(&input_table).unwrap();
	let output = metadata::read_alignment(&output_table).unwrap();
	assert_eq!(output.len(), 2);

	for (row_in, row_out) in input.iter().zip(&output) {
		assert_eq!(row_out.object, row_in.object);
		let expected = axis*row_in.to_transform().matrix();
		let diff = (row_out.to_transform().matrix() - expected).abs().max();
		assert!(diff < 1e-4, "{}: transform differs by {}", row_out.object, diff);
	}
}


#[test]
fn fails_when_the_aligner_fails() {

	let dir = TempDir::new().unwrap();
	let input_table = dir.path().join("alignment.xmd");
	metadata::write_alignment(&input_table, &[]).unwrap();

	let aligner = dir.path().join("broken_aligner.sh");
	fs::write(&aligner, "#!/bin/sh\nexit 2\n").unwrap();
	fs::set_permissions(&aligner, fs::Permissions::from_mode(0o755)).unwrap();

	cmd()
		.current_dir(dir.path())
		.arg("align-transform")
		.arg("-atrans_reference").arg(dir.path().join("reference.mrc"))
		.arg("-atrans_moving").arg(dir.path().join("moving.mrc"))
		.arg("-atrans_input").arg(&input_table)
		.arg("-atrans_output").arg(dir.path().join("out.xmd"))
		.arg("-atrans_exec").arg(&aligner)
		.assert()
		.print_stdout()
		.print_stderr()
		.failure()
		.stdout(predicate::str::contains("Volume aligner failed"));
}
