
use std::collections::VecDeque;
use std::{env, fs};
use std::ops::Deref;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use display_error_chain::ErrorChainExt;
use tracing::{error, info};

use tomo_align::{logging, protocols};
use tomo_align::args::{Args, ArgsConfig};
use tomo_align::logging::ResultExt;


fn main() -> ExitCode {

	// init logging
	let Ok(_) = logging::init("tomo_align=trace")
		.log_err()
		else { return ExitCode::FAILURE; };

	if let Err(e) = run() {
		error!("{}", e.deref().chain());
		return ExitCode::FAILURE
	}

	// we finished! =)
	ExitCode::SUCCESS
}


#[tracing::instrument(skip_all, name = "TomoAlign")]
fn run() -> Result<()> {

	// find the protocol to run
	let mut args = env::args().into_iter().collect::<VecDeque<_>>();
	args.pop_front(); // ignore the executable path, no info there
	let protocol_id = args.pop_front()
		.context("missing protocol id as first argument")?;
	info!("protocol: {}", protocol_id);

	// parse the rest of the arguments
	let args = Args::from(args);

	// load the args config, if there is one
	let args_config_path = args.get("args_config")
		.or("config/tomo_align.toml".to_string())
		.value();
	let args_config_path = PathBuf::from(args_config_path);
	let args_config =
		if args_config_path.exists() {
			let text = fs::read_to_string(&args_config_path)
				.context(format!("Failed to read args config file: {}", args_config_path.to_string_lossy()))?;
			ArgsConfig::from(text)
				.context(format!("Failed to parse args config file: {}", args_config_path.to_string_lossy()))?
		} else {
			ArgsConfig::empty()
		};

	// run the protocol with the rest of the args
	protocols::run(protocol_id.as_str(), &args, &args_config)
}
