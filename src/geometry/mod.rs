
pub mod euler;
pub mod quaternion;

pub use euler::EulerAngles;

use nalgebra::{Matrix3, Matrix4, Vector3};

use crate::error::{Result, TomoAlignError};


/// How a transform matrix is interpreted when converting to and from
/// shift/angle form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentConvention {

	/// direct pose, handedness flips are invalid
	None,

	/// 2D image alignment: flips live in the top-left 2x2 block
	TwoD,

	/// 3D volume alignment: flips live in the top-left 3x3 block
	ThreeD,

	/// projection transform: the matrix maps object space to reference space,
	/// so it is inverted before extracting shifts and angles
	Projection
}

impl AlignmentConvention {

	pub fn label(&self) -> &'static str {
		match self {
			Self::None => "none",
			Self::TwoD => "2d",
			Self::ThreeD => "3d",
			Self::Projection => "projection"
		}
	}
}


/// 4x4 homogeneous rigid-body transform: orthonormal 3x3 rotation block
/// (possibly with a handedness flip), translation column, [0,0,0,1] bottom row.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidTransform {
	matrix: Matrix4<f64>
}

impl RigidTransform {

	pub fn identity() -> Self {
		Self {
			matrix: Matrix4::identity()
		}
	}

	pub fn new(matrix: Matrix4<f64>) -> Self {
		Self {
			matrix
		}
	}

	pub fn from_parts(rotation: &Matrix3<f64>, shift: &Vector3<f64>) -> Self {
		let mut matrix = Matrix4::<f64>::identity();
		matrix.fixed_view_mut::<3,3>(0, 0).copy_from(rotation);
		matrix.fixed_view_mut::<3,1>(0, 3).copy_from(shift);
		Self {
			matrix
		}
	}

	pub fn matrix(&self) -> &Matrix4<f64> {
		&self.matrix
	}

	pub fn rotation(&self) -> Matrix3<f64> {
		self.matrix.fixed_view::<3,3>(0, 0).into_owned()
	}

	pub fn shift(&self) -> Vector3<f64> {
		self.matrix.fixed_view::<3,1>(0, 3).into_owned()
	}
}


/// shift/angle form of a transform, as stored in alignment metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
	pub shift: Vector3<f64>,
	pub angles: EulerAngles,
	pub flip: bool
}


pub fn decompose(transform: &RigidTransform, convention: AlignmentConvention) -> Result<Decomposition> {

	let mut matrix = *transform.matrix();
	let mut flip = false;

	match convention {

		AlignmentConvention::TwoD => {
			let det = matrix.fixed_view::<2,2>(0, 0).into_owned().determinant();
			if det < 0.0 {
				flip = true;
				// negate the in-plane part of the first row, force the out-of-plane element
				matrix[(0,0)] = -matrix[(0,0)];
				matrix[(0,1)] = -matrix[(0,1)];
				matrix[(2,2)] = 1.0;
			}
		}

		AlignmentConvention::ThreeD => {
			let det = matrix.fixed_view::<3,3>(0, 0).into_owned().determinant();
			if det < 0.0 {
				flip = true;
				for c in 0 .. 4 {
					matrix[(0,c)] = -matrix[(0,c)];
				}
				matrix[(3,3)] = 1.0;
			}
		}

		AlignmentConvention::None | AlignmentConvention::Projection => {
			let det = matrix.fixed_view::<3,3>(0, 0).into_owned().determinant();
			if det < 0.0 {
				return Err(TomoAlignError::InvalidTransform {
					convention: convention.label()
				});
			}
		}
	}

	// a projection transform is inverted before reading off shifts and angles,
	// and the shift is negated relative to the direct case
	let inverse = convention == AlignmentConvention::Projection;
	let (rotation, shift) =
		if inverse {
			let inv = matrix.try_inverse()
				.ok_or(TomoAlignError::InvalidTransform {
					convention: convention.label()
				})?;
			(
				inv.fixed_view::<3,3>(0, 0).into_owned(),
				-inv.fixed_view::<3,1>(0, 3).into_owned()
			)
		} else {
			(
				matrix.fixed_view::<3,3>(0, 0).into_owned(),
				matrix.fixed_view::<3,1>(0, 3).into_owned()
			)
		};

	// angles are the negated z-y-z decomposition, in degrees
	let (ai, aj, ak) = euler::euler_from_matrix_zyz(&rotation);
	let angles = EulerAngles {
		rot: (-ai).to_degrees(),
		tilt: (-aj).to_degrees(),
		psi: (-ak).to_degrees()
	};

	Ok(Decomposition {
		shift,
		angles,
		flip
	})
}


/// Inverse of [`decompose`] for unflipped transforms: rebuilds the matrix from
/// shift/angle form. The flip flag is not re-applied, so a flipped decomposition
/// does not round-trip through here.
pub fn compose(decomposition: &Decomposition, convention: AlignmentConvention) -> RigidTransform {

	let angles = &decomposition.angles;
	let rotation = euler::euler_to_matrix_zyz(
		(-angles.rot).to_radians(),
		(-angles.tilt).to_radians(),
		(-angles.psi).to_radians()
	);

	match convention {

		// the decomposition described the inverted matrix with a negated shift:
		// [R | -s]⁻¹ = [Rᵀ | Rᵀs]
		AlignmentConvention::Projection => RigidTransform::from_parts(
			&rotation.transpose(),
			&(rotation.transpose()*decomposition.shift)
		),

		_ => RigidTransform::from_parts(&rotation, &decomposition.shift)
	}
}
