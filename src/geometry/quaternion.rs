
use nalgebra::{Matrix3, Quaternion, Rotation3, UnitQuaternion};


/// unit quaternion encoding the same rotation as the matrix
pub fn from_rotation(m: &Matrix3<f64>) -> Quaternion<f64> {
	UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(*m))
		.into_inner()
}


/// Geodesic angle between two unit quaternions, in radians.
///
/// q and -q encode the same rotation, and this primitive deliberately does not
/// collapse that ambiguity: a caller comparing rotations evaluates both
/// `distance(q1, q2)` and `distance(q1, -q2)` and keeps the minimum.
pub fn distance(q1: &Quaternion<f64>, q2: &Quaternion<f64>) -> f64 {
	q1.coords.dot(&q2.coords)
		.clamp(-1.0, 1.0)
		.acos()
}


#[cfg(test)]
mod tests {

	use nalgebra::Vector3;

	use super::*;


	fn quat(axis: Vector3<f64>, angle: f64) -> Quaternion<f64> {
		UnitQuaternion::from_axis_angle(&nalgebra::Unit::new_normalize(axis), angle)
			.into_inner()
	}


	#[test]
	fn symmetric() {
		let q1 = quat(Vector3::new(1.0, 0.0, 0.0), 0.7);
		let q2 = quat(Vector3::new(0.0, 1.0, 1.0), -1.3);
		assert!((distance(&q1, &q2) - distance(&q2, &q1)).abs() < 1e-12);
	}


	#[test]
	fn zero_for_same_quaternion() {
		let q = quat(Vector3::new(1.0, 2.0, 3.0), 0.9);
		assert!(distance(&q, &q).abs() < 1e-6);
	}


	#[test]
	fn double_cover() {
		// -q is the same rotation, but the naive distance to it is π:
		// the minimum over both signs is what vanishes
		let q = quat(Vector3::new(0.0, 0.0, 1.0), 1.1);
		let neg = -q;
		assert!((distance(&q, &neg) - std::f64::consts::PI).abs() < 1e-6);
		assert!(distance(&q, &q).min(distance(&q, &neg)).abs() < 1e-6);
		assert!(distance(&neg, &neg).min(distance(&neg, &q)).abs() < 1e-6);
	}
}
