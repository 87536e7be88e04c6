
// Rotation synchronization by spectral relaxation: the top-3 eigenspace of the
// pairwise consistency matrix approximates a rank-3 rotation frame shared across
// all objects, generalizing two-object Procrustes alignment to N objects at once.

use std::collections::HashMap;

use nalgebra::{DMatrix, Matrix3};
use tracing::debug;

use crate::error::{Result, TomoAlignError};


// top eigenvalues this small mean the measurement graph carries no usable signal
const MIN_EIGENVALUE: f64 = 1e-6;


/// Reconcile sparse pairwise rotation estimates into one rotation per object.
///
/// `objects` fixes the index order of the output. `pairwise` maps object-id pairs
/// to the relative rotation estimated for that pair alone; not all pairs need be
/// present, but every object must appear in at least one. The result is correct
/// up to one global rotation common to all objects, with quality depending on how
/// well-connected and well-conditioned the measurement graph is.
///
/// This is a pure function of its inputs and safe to call concurrently for
/// independent alignment problems.
pub fn conciliate(
	objects: &[String],
	pairwise: &HashMap<(String,String),Matrix3<f64>>
) -> Result<Vec<Matrix3<f64>>> {

	let n = objects.len();
	if n < 2 {
		return Err(TomoAlignError::UnderdeterminedAlignment {
			reason: format!("need at least 2 objects, got {}", n)
		});
	}

	let indices = objects.iter()
		.enumerate()
		.map(|(i, id)| (id.as_str(), i))
		.collect::<HashMap<_,_>>();

	// block consistency matrix: identity on the diagonal blocks,
	// R and Rᵀ on the blocks of each observed pair, zero elsewhere
	let mut m = DMatrix::<f64>::zeros(3*n, 3*n);
	for i in 0 .. 3*n {
		m[(i,i)] = 1.0;
	}

	let mut measured = vec![false; n];
	for ((id1, id2), rotation) in pairwise {
		let i1 = *indices.get(id1.as_str())
			.ok_or_else(|| TomoAlignError::MalformedRecord {
				object_id: id1.clone()
			})?;
		let i2 = *indices.get(id2.as_str())
			.ok_or_else(|| TomoAlignError::MalformedRecord {
				object_id: id2.clone()
			})?;
		measured[i1] = true;
		measured[i2] = true;
		m.fixed_view_mut::<3,3>(3*i1, 3*i2).copy_from(rotation);
		m.fixed_view_mut::<3,3>(3*i2, 3*i1).copy_from(&rotation.transpose());
	}

	if let Some(i) = measured.iter().position(|m| !m) {
		return Err(TomoAlignError::UnderdeterminedAlignment {
			reason: format!("object has no pairwise measurements: {}", objects[i])
		});
	}

	debug!("conciliating {} objects from {} pairwise measurements", n, pairwise.len());

	// spectral relaxation: keep the three largest eigenpairs,
	// ordered ascending so the dominant eigenvector lands in the last column
	let eigen = m.symmetric_eigen();
	let mut order = (0 .. 3*n).collect::<Vec<_>>();
	order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
	let top = &order[3*n - 3 ..];

	if eigen.eigenvalues[top[0]] <= MIN_EIGENVALUE {
		return Err(TomoAlignError::UnderdeterminedAlignment {
			reason: "consistency matrix has a degenerate top-3 eigenspace".to_string()
		});
	}

	// scale each eigenvector by the square root of its eigenvalue
	let mut basis = DMatrix::<f64>::zeros(3*n, 3);
	for (c, &e) in top.iter().enumerate() {
		let scale = eigen.eigenvalues[e].sqrt();
		basis.column_mut(c).copy_from(&(&eigen.eigenvectors.column(e)*scale));
	}

	// reshape into one 3x3 block per object
	let mut rotations = (0 .. n)
		.map(|i| basis.fixed_view::<3,3>(3*i, 0).into_owned())
		.collect::<Vec<_>>();

	// Eigenvectors are determined only up to sign, which can leave every block
	// with the wrong handedness. Flipping the last basis column restores proper
	// rotations without disturbing relative orientations. This is a heuristic
	// disambiguation, not a proof of picking the correct branch.
	if rotations[0].determinant() < 0.0 {
		for rotation in &mut rotations {
			rotation[(0,2)] = -rotation[(0,2)];
			rotation[(1,2)] = -rotation[(1,2)];
			rotation[(2,2)] = -rotation[(2,2)];
		}
	}

	Ok(rotations)
}
