
// z-y-z Euler angles, static axes
// the triple (ai, aj, ak) maps to the rotation Rz(ak)·Ry(aj)·Rz(ai)

use nalgebra::Matrix3;


const EPS: f64 = f64::EPSILON*4.0;


pub fn euler_to_matrix_zyz(ai: f64, aj: f64, ak: f64) -> Matrix3<f64> {

	// axis order z-y-z carries odd parity, so the angles enter negated
	let (ai, aj, ak) = (-ai, -aj, -ak);

	let (si, sj, sk) = (ai.sin(), aj.sin(), ak.sin());
	let (ci, cj, ck) = (ai.cos(), aj.cos(), ak.cos());
	let (cc, cs) = (ci*ck, ci*sk);
	let (sc, ss) = (si*ck, si*sk);

	let mut m = Matrix3::<f64>::identity();
	m[(2,2)] = cj;
	m[(2,1)] = sj*si;
	m[(2,0)] = sj*ci;
	m[(1,2)] = sj*sk;
	m[(1,1)] = -cj*ss + cc;
	m[(1,0)] = -cj*cs - sc;
	m[(0,2)] = -sj*ck;
	m[(0,1)] = cj*sc + cs;
	m[(0,0)] = cj*cc - ss;
	m
}


pub fn euler_from_matrix_zyz(m: &Matrix3<f64>) -> (f64, f64, f64) {

	let sy = (m[(2,1)]*m[(2,1)] + m[(2,0)]*m[(2,0)]).sqrt();

	let (ax, ay, az) =
		if sy > EPS {
			(
				m[(2,1)].atan2(m[(2,0)]),
				sy.atan2(m[(2,2)]),
				m[(1,2)].atan2(-m[(0,2)])
			)
		} else {
			// tilt is 0 or π: the first and last rotations collapse into one
			(
				(-m[(1,0)]).atan2(m[(1,1)]),
				sy.atan2(m[(2,2)]),
				0.0
			)
		};

	(-ax, -ay, -az)
}


/// Euler angle triple in degrees, z-y-z convention.
///
/// `matrix`/`from_matrix` use the direct reading shared with the metadata tables:
/// (rot, tilt, psi) maps to Rz(rot)·Ry(tilt)·Rz(psi).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
	pub rot: f64,
	pub tilt: f64,
	pub psi: f64
}

impl EulerAngles {

	pub fn new(rot: f64, tilt: f64, psi: f64) -> Self {
		Self {
			rot,
			tilt,
			psi
		}
	}

	pub fn matrix(&self) -> Matrix3<f64> {
		euler_to_matrix_zyz(
			self.psi.to_radians(),
			self.tilt.to_radians(),
			self.rot.to_radians()
		)
	}

	pub fn from_matrix(m: &Matrix3<f64>) -> Self {
		let (ai, aj, ak) = euler_from_matrix_zyz(m);
		Self {
			rot: ak.to_degrees(),
			tilt: aj.to_degrees(),
			psi: ai.to_degrees()
		}
	}

	/// the 2D in-plane angle folds the first and third Euler components together
	pub fn in_plane(&self) -> f64 {
		self.rot + self.psi
	}
}
