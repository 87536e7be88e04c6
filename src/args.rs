
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};


pub struct Args {
	args: HashMap<String,String>
}

impl Args {

	pub fn from(raw: VecDeque<String>) -> Self {

		// parse the arguments as a key-value map
		let mut args = HashMap::<String,String>::new();
		let mut iter = raw.iter();
		loop {
			let Some(arg) = iter.next()
				.map(String::as_str)
				else { break; };

			const PREDECESSOR: &str = "-";
			if arg.starts_with(PREDECESSOR) {

				// trim off the - and look for an = in the middle
				let arg = &arg[PREDECESSOR.len()..];
				let mut parts = arg.splitn(2, "=");

				// the argument key is always the first part
				let Some(key) = parts.next()
					else { continue; };

				// the value is either the part after the first =, or the next argument
				let Some(value) = parts.next()
					.or_else(|| iter.next().map(String::as_str))
					else { continue; };
				args.insert(key.to_string(), value.to_string());
			}
		}

		Self {
			args
		}
	}

	pub fn get(&self, name: impl AsRef<str>) -> Arg<Option<String>> {
		let name = name.as_ref();
		Arg {
			name: name.to_string(),
			value: self.args.get(name)
				.cloned()
		}
	}

	pub fn get_from_group(&self, group: impl AsRef<str>, name: impl AsRef<str>) -> Arg<Option<String>> {
		self.get(&format!("{}_{}", group.as_ref(), name.as_ref()))
	}
}


pub struct Arg<T> {
	name: String,
	value: T
}

impl<T> Arg<T> {

	pub fn map<F,R>(self, f: F) -> Arg<R>
	where
		F: FnOnce(T) -> R
	{
		Arg {
			name: self.name,
			value: f(self.value)
		}
	}

	pub fn try_map<F,R>(self, f: F) -> Result<Arg<R>>
		where
			F: FnOnce(T) -> Result<R>
	{
		let name = self.name.clone();
		let value = f(self.value)
			.context(format!("Failed to map argument: {}", name))?;
		Ok(Arg {
			name: self.name,
			value
		})
	}

	pub fn value(self) -> T {
		self.value
	}
}

impl<T> Arg<Option<T>> {

	pub fn require(self) -> Result<Arg<T>> {
		self.try_map(|value| {
			value
				.context("Argument is required")
		})
	}

	pub fn or(self, default: T) -> Arg<T> {
		self.map(|value| {
			value.unwrap_or(default)
		})
	}
}

impl Arg<Option<String>> {

	pub fn into_u32(self) -> Result<Arg<Option<u32>>> {
		self.try_map(|value| {
			value.map(|value| {
				u32::from_str(&value)
					.context(format!("value was not a u32: {}", value))
			})
			.transpose()
		})
	}

	pub fn into_f64(self) -> Result<Arg<Option<f64>>> {
		self.try_map(|value| {
			value.map(|value| {
				f64::from_str(&value)
					.context(format!("value was not an f64: {}", value))
			})
			.transpose()
		})
	}

	pub fn into_bool(self) -> Result<Arg<Option<bool>>> {
		self.try_map(|value| {
			value.map(|value| {
				match value.as_str() {
					"true" | "True" | "yes" => Ok(true),
					"false" | "False" | "no" => Ok(false),
					_ => bail!("value was not a bool: {}", value)
				}
			})
			.transpose()
		})
	}

	pub fn into_path(self) -> Arg<Option<PathBuf>> {
		self.map(|value| {
			value.map(PathBuf::from)
		})
	}

	/// fill in the default declared in the args config, when there is one
	pub fn or_config(self, config: &ArgsConfig) -> Arg<Option<String>> {
		let name = self.name.clone();
		self.map(|value| {
			value.or_else(|| config.default_for(&name))
		})
	}

	/// fall back to the default declared in the args config
	pub fn or_default(self, config: &ArgsConfig) -> Result<Arg<String>> {
		let name = self.name.clone();
		self.try_map(|value| {
			match value {
				Some(value) => Ok(value),
				None => config.default_for(&name)
					.context("Argument has no value and no configured default")
			}
		})
	}
}

impl Arg<String> {

	pub fn into_u32(self) -> Result<Arg<u32>> {
		self.try_map(|value| {
			u32::from_str(&value)
				.context(format!("value was not a u32: {}", value))
		})
	}

	pub fn into_f64(self) -> Result<Arg<f64>> {
		self.try_map(|value| {
			f64::from_str(&value)
				.context(format!("value was not an f64: {}", value))
		})
	}
}


/// defaults for argument groups, loaded from a TOML file
///
/// each top-level table is an argument group and each entry is the default
/// value for the argument named `<group>_<name>` on the command line
pub struct ArgsConfig {
	doc: toml::Table
}

impl ArgsConfig {

	pub fn from(text: impl AsRef<str>) -> Result<Self> {
		let doc = toml::Table::from_str(text.as_ref())
			.context("Failed to parse args config")?;
		Ok(Self {
			doc
		})
	}

	pub fn empty() -> Self {
		Self {
			doc: toml::Table::new()
		}
	}

	pub fn default_for(&self, key: &str) -> Option<String> {
		for (group, values) in &self.doc {
			let Some(name) = key.strip_prefix(group.as_str())
				.and_then(|rest| rest.strip_prefix('_'))
				else { continue; };
			let Some(value) = values.as_table()
				.and_then(|table| table.get(name))
				else { continue; };
			return Some(match value {
				toml::Value::String(s) => s.clone(),
				other => other.to_string()
			});
		}
		None
	}
}


#[cfg(test)]
mod tests {

	use super::*;


	fn args(raw: &[&str]) -> Args {
		Args::from(raw.iter().map(|s| s.to_string()).collect())
	}


	#[test]
	fn key_value_pairs() {
		let args = args(&["-twofold_max_tilt", "50", "-twofold_output=out.xmd"]);
		assert_eq!(args.get("twofold_max_tilt").value(), Some("50".to_string()));
		assert_eq!(args.get("twofold_output").value(), Some("out.xmd".to_string()));
		assert_eq!(args.get("nope").value(), None);
	}


	#[test]
	fn conversions() {
		let args = args(&["-a", "5", "-b", "2.5", "-c", "true"]);
		assert_eq!(args.get("a").into_u32().unwrap().value(), Some(5));
		assert_eq!(args.get("b").into_f64().unwrap().value(), Some(2.5));
		assert_eq!(args.get("c").into_bool().unwrap().value(), Some(true));
		assert!(args.get("b").into_u32().is_err());
	}


	#[test]
	fn config_defaults() {
		let config = ArgsConfig::from(r#"
			[twofold]
			max_tilt = 60.0
			angular_step = 5.0

			[align]
			exec = "tomo_twofold_align"
		"#).unwrap();

		let args = args(&["-twofold_max_tilt", "50"]);
		assert_eq!(
			args.get("twofold_max_tilt").or_default(&config).unwrap().into_f64().unwrap().value(),
			50.0
		);
		assert_eq!(
			args.get("twofold_angular_step").or_default(&config).unwrap().into_f64().unwrap().value(),
			5.0
		);
		assert_eq!(
			args.get("align_exec").or_default(&config).unwrap().value(),
			"tomo_twofold_align"
		);
		assert!(args.get("twofold_missing").or_default(&config).is_err());
	}
}
