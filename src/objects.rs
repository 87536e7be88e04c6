
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::metadata::{self, AlignmentRow};


/// The host object collections this tool touches. A closed set: protocols
/// match on it instead of inspecting type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
	Tomograms,
	TiltSeries,
	Subtomograms
}

impl ObjectKind {

	pub fn block_name(&self) -> &'static str {
		match self {
			Self::Tomograms => "tomograms",
			Self::TiltSeries => "tilt_series",
			Self::Subtomograms => "subtomograms"
		}
	}

	pub fn from_block_name(name: &str) -> Option<Self> {
		match name {
			"tomograms" => Some(Self::Tomograms),
			"tilt_series" => Some(Self::TiltSeries),
			"subtomograms" => Some(Self::Subtomograms),
			_ => None
		}
	}
}


/// one host object: identifier, image location, sampling rate in Å/voxel
#[derive(Debug, Clone, PartialEq)]
pub struct TomoObject {
	pub object_id: String,
	pub path: PathBuf,
	pub sampling_rate: f64
}


#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSet {
	pub kind: ObjectKind,
	pub objects: Vec<TomoObject>
}

impl ObjectSet {

	pub fn find(&self, object_id: &str) -> Option<&TomoObject> {
		self.objects.iter()
			.find(|obj| obj.object_id == object_id)
	}
}


/// whether an output table starts empty or continues a previous run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
	Fresh,
	Resume
}


/// Accumulates output alignment rows and writes them in one pass.
///
/// The caller states up front whether it is starting fresh or resuming an
/// earlier table, rather than the writer inferring that from what happens
/// to be on disk.
pub struct OutputBuilder {
	path: PathBuf,
	rows: Vec<AlignmentRow>
}

impl OutputBuilder {

	pub fn new(path: impl AsRef<Path>, mode: OutputMode) -> Result<Self> {
		let path = path.as_ref().to_path_buf();
		let rows = match mode {
			OutputMode::Fresh => Vec::new(),
			OutputMode::Resume => metadata::read_alignment(&path)
				.context(format!("Cannot resume output table: {}", path.to_string_lossy()))?
		};
		Ok(Self {
			path,
			rows
		})
	}

	pub fn push(&mut self, row: AlignmentRow) {
		self.rows.push(row);
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn write(self) -> Result<()> {
		metadata::write_alignment(&self.path, &self.rows)
	}
}
