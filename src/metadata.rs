
// plain-text metadata tables, one labeled column block per file:
//
//   data_<block>
//   loop_
//    _label1
//    _label2
//   value1 value2
//   ...

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use nalgebra::{Matrix3, Vector3};

use crate::geometry::{self, AlignmentConvention, Decomposition, EulerAngles, RigidTransform};
use crate::objects::{ObjectKind, ObjectSet, TomoObject};


/// one pairwise rotation estimate, as emitted by the external pairwise aligner
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseRow {
	pub object1: String,
	pub object2: String,
	pub rot: f64,
	pub tilt: f64,
	pub psi: f64
}

impl PairwiseRow {

	pub fn from_rotation(object1: String, object2: String, rotation: &Matrix3<f64>) -> Self {
		let angles = EulerAngles::from_matrix(rotation);
		Self {
			object1,
			object2,
			rot: angles.rot,
			tilt: angles.tilt,
			psi: angles.psi
		}
	}

	pub fn rotation(&self) -> Matrix3<f64> {
		EulerAngles::new(self.rot, self.tilt, self.psi)
			.matrix()
	}
}


/// one object alignment, written back for the host to re-attach
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRow {
	pub object: String,
	pub shift_x: f64,
	pub shift_y: f64,
	pub shift_z: f64,
	pub rot: f64,
	pub tilt: f64,
	pub psi: f64
}

impl AlignmentRow {

	/// volume-alignment (3D) convention, matching [`Self::to_transform`]
	pub fn from_transform(object: String, transform: &RigidTransform) -> crate::error::Result<Self> {
		let d = geometry::decompose(transform, AlignmentConvention::ThreeD)?;
		Ok(Self {
			object,
			shift_x: d.shift[0],
			shift_y: d.shift[1],
			shift_z: d.shift[2],
			rot: d.angles.rot,
			tilt: d.angles.tilt,
			psi: d.angles.psi
		})
	}

	pub fn to_transform(&self) -> RigidTransform {
		geometry::compose(
			&Decomposition {
				shift: Vector3::new(self.shift_x, self.shift_y, self.shift_z),
				angles: EulerAngles::new(self.rot, self.tilt, self.psi),
				flip: false
			},
			AlignmentConvention::ThreeD
		)
	}
}


/// per-object alignment consensus score, in degrees of quaternion distance
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRow {
	pub object: String,
	pub distance: f64
}


const PAIRWISE_BLOCK: &'static str = "pairwise";
const PAIRWISE_LABELS: &'static [&'static str] = &["_image1", "_image2", "_angleRot", "_angleTilt", "_anglePsi"];

const ALIGNMENT_BLOCK: &'static str = "alignment";
const ALIGNMENT_LABELS: &'static [&'static str] = &["_image", "_shiftX", "_shiftY", "_shiftZ", "_angleRot", "_angleTilt", "_anglePsi"];

const SCORES_BLOCK: &'static str = "scores";
const SCORES_LABELS: &'static [&'static str] = &["_image", "_alignmentDistance"];

const OBJECTS_LABELS: &'static [&'static str] = &["_itemId", "_image", "_samplingRate"];


pub fn read_pairwise(path: impl AsRef<Path>) -> Result<Vec<PairwiseRow>> {
	let rows = read_table(path.as_ref(), PAIRWISE_BLOCK, PAIRWISE_LABELS)?;
	rows.into_iter()
		.map(|row| Ok(PairwiseRow {
			object1: row[0].clone(),
			object2: row[1].clone(),
			rot: parse_f64(&row[2])?,
			tilt: parse_f64(&row[3])?,
			psi: parse_f64(&row[4])?
		}))
		.collect()
}


pub fn write_pairwise(path: impl AsRef<Path>, rows: &[PairwiseRow]) -> Result<()> {
	write_table(path.as_ref(), PAIRWISE_BLOCK, PAIRWISE_LABELS, rows.iter()
		.map(|row| vec![
			row.object1.clone(),
			row.object2.clone(),
			format_f64(row.rot),
			format_f64(row.tilt),
			format_f64(row.psi)
		]))
}


pub fn read_alignment(path: impl AsRef<Path>) -> Result<Vec<AlignmentRow>> {
	let rows = read_table(path.as_ref(), ALIGNMENT_BLOCK, ALIGNMENT_LABELS)?;
	rows.into_iter()
		.map(|row| Ok(AlignmentRow {
			object: row[0].clone(),
			shift_x: parse_f64(&row[1])?,
			shift_y: parse_f64(&row[2])?,
			shift_z: parse_f64(&row[3])?,
			rot: parse_f64(&row[4])?,
			tilt: parse_f64(&row[5])?,
			psi: parse_f64(&row[6])?
		}))
		.collect()
}


pub fn write_alignment(path: impl AsRef<Path>, rows: &[AlignmentRow]) -> Result<()> {
	write_table(path.as_ref(), ALIGNMENT_BLOCK, ALIGNMENT_LABELS, rows.iter()
		.map(|row| vec![
			row.object.clone(),
			format_f64(row.shift_x),
			format_f64(row.shift_y),
			format_f64(row.shift_z),
			format_f64(row.rot),
			format_f64(row.tilt),
			format_f64(row.psi)
		]))
}


pub fn read_scores(path: impl AsRef<Path>) -> Result<Vec<ScoredRow>> {
	let rows = read_table(path.as_ref(), SCORES_BLOCK, SCORES_LABELS)?;
	rows.into_iter()
		.map(|row| Ok(ScoredRow {
			object: row[0].clone(),
			distance: parse_f64(&row[1])?
		}))
		.collect()
}


pub fn write_scores(path: impl AsRef<Path>, rows: &[ScoredRow]) -> Result<()> {
	write_table(path.as_ref(), SCORES_BLOCK, SCORES_LABELS, rows.iter()
		.map(|row| vec![
			row.object.clone(),
			format_f64(row.distance)
		]))
}


pub fn read_objects(path: impl AsRef<Path>) -> Result<ObjectSet> {
	let path = path.as_ref();

	// the block name carries the object kind
	let block = read_block_name(path)?;
	let kind = ObjectKind::from_block_name(&block)
		.context(format!("Unrecognized object kind: {}", block))?;

	let rows = read_table(path, kind.block_name(), OBJECTS_LABELS)?;
	let objects = rows.into_iter()
		.map(|row| Ok(TomoObject {
			object_id: row[0].clone(),
			path: row[1].clone().into(),
			sampling_rate: parse_f64(&row[2])?
		}))
		.collect::<Result<Vec<_>>>()?;

	Ok(ObjectSet {
		kind,
		objects
	})
}


pub fn write_objects(path: impl AsRef<Path>, set: &ObjectSet) -> Result<()> {
	write_table(path.as_ref(), set.kind.block_name(), OBJECTS_LABELS, set.objects.iter()
		.map(|obj| vec![
			obj.object_id.clone(),
			obj.path.to_string_lossy().to_string(),
			format_f64(obj.sampling_rate)
		]))
}


/// a whitespace-separated matrix dump, as written by external aligners
pub fn read_matrix4(path: impl AsRef<Path>) -> Result<nalgebra::Matrix4<f64>> {
	let path = path.as_ref();
	let text = std::fs::read_to_string(path)
		.context(format!("Failed to read matrix file: {}", path.to_string_lossy()))?;
	let values = text.split_whitespace()
		.map(parse_f64)
		.collect::<Result<Vec<_>>>()?;
	if values.len() != 16 {
		bail!("Expected 16 matrix elements, found {} in: {}", values.len(), path.to_string_lossy());
	}
	Ok(nalgebra::Matrix4::from_row_slice(&values))
}


fn parse_f64(value: impl AsRef<str>) -> Result<f64> {
	let value = value.as_ref();
	f64::from_str(value)
		.context(format!("value was not an f64: {}", value))
}


fn format_f64(value: f64) -> String {
	format!("{:.6}", value)
}


fn read_block_name(path: &Path) -> Result<String> {
	let text = std::fs::read_to_string(path)
		.context(format!("Failed to read metadata file: {}", path.to_string_lossy()))?;
	text.lines()
		.map(str::trim)
		.find_map(|line| line.strip_prefix("data_"))
		.map(|name| name.to_string())
		.context(format!("No data block in metadata file: {}", path.to_string_lossy()))
}


fn read_table(path: &Path, block: &str, labels: &[&str]) -> Result<Vec<Vec<String>>> {

	let text = std::fs::read_to_string(path)
		.context(format!("Failed to read metadata file: {}", path.to_string_lossy()))?;

	let mut lines = text.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty() && !line.starts_with('#'));

	// header: block name, then loop_, then the column labels in order
	let header = lines.next()
		.context("Metadata file is empty")?;
	if header != format!("data_{}", block) {
		bail!("Expected block data_{}, found: {}", block, header);
	}
	let loop_line = lines.next()
		.context("Metadata block has no loop_")?;
	if loop_line != "loop_" {
		bail!("Expected loop_, found: {}", loop_line);
	}
	for expected in labels {
		let label = lines.next()
			.context("Metadata block is missing column labels")?;
		if label != *expected {
			bail!("Expected column {}, found: {}", expected, label);
		}
	}

	// the rest are data rows
	let mut rows = Vec::new();
	for line in lines {
		let row = line.split_whitespace()
			.map(|v| v.to_string())
			.collect::<Vec<_>>();
		if row.len() != labels.len() {
			bail!("Expected {} columns, found {} in row: {}", labels.len(), row.len(), line);
		}
		rows.push(row);
	}

	Ok(rows)
}


fn write_table(
	path: &Path,
	block: &str,
	labels: &[&str],
	rows: impl Iterator<Item=Vec<String>>
) -> Result<()> {

	let mut file = File::create(path)
		.context(format!("Failed to open file for writing: {}", path.to_string_lossy()))?;
	let mut writer = BufWriter::new(&mut file);

	writeln!(writer, "data_{}", block)?;
	writeln!(writer, "loop_")?;
	for label in labels {
		writeln!(writer, " {}", label)?;
	}
	for row in rows {
		writeln!(writer, "{}", row.join(" "))?;
	}

	// write buffers should be flushed before dropping
	writer.flush()?;

	Ok(())
}
