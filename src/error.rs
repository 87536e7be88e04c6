
use thiserror::Error;


/// Errors raised by the transform and conciliation core.
///
/// None of these are retried internally: a failed conversion aborts that conversion,
/// and a failed conciliation aborts the whole run, since a partial answer would be
/// meaningless to the caller.
#[derive(Error, Debug)]
pub enum TomoAlignError {

	/// The rotation block of a transform has a negative determinant under a
	/// convention that forbids handedness flips.
	#[error("Invalid transform: the rotation block has a negative determinant, which convention {convention} does not allow")]
	InvalidTransform {
		convention: &'static str
	},

	/// The pairwise measurement graph cannot determine a joint alignment.
	#[error("Underdetermined alignment: {reason}")]
	UnderdeterminedAlignment {
		reason: String
	},

	/// A pairwise record references an object outside the input population.
	#[error("Malformed record: unknown object id: {object_id}")]
	MalformedRecord {
		object_id: String
	}
}


pub type Result<T> = std::result::Result<T,TomoAlignError>;
