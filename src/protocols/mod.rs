
mod twofold_sta;
mod consensus_align;
mod align_transform;


use anyhow::{anyhow, Result};

use crate::args::{Args, ArgsConfig};


pub fn run(protocol_id: &str, args: &Args, args_config: &ArgsConfig) -> Result<()> {
	// NOTE: can't match on constants, so use if-else here
	if protocol_id == twofold_sta::PROTOCOL_ID {
		twofold_sta::run(args, args_config)
	} else if protocol_id == consensus_align::PROTOCOL_ID {
		consensus_align::run(args, args_config)
	} else if protocol_id == align_transform::PROTOCOL_ID {
		align_transform::run(args, args_config)
	} else {
		Err(anyhow!("unrecognized protocol id: {}", protocol_id))
	}
}
