use gest::*;
use serde::Deserialize;
use std::error::Error;
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::prelude::*;

pub const DEFAULT_ASSETS_DIR: &str = "assets";
pub const DEFAULT_RESULTS_FILE: &str = "gest-results.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub api_level: i32,
    pub objects: i32,
    pub assets: String,
    pub results: String,
    pub log: Option<String>,
    pub verbose: bool,
    #[serde(skip)]
    pub about: bool,
    #[serde(skip)]
    pub results_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_level: DEFAULT_API_LEVEL,
            objects: DEFAULT_OBJECT_COUNT,
            assets: DEFAULT_ASSETS_DIR.to_string(),
            results: DEFAULT_RESULTS_FILE.to_string(),
            log: None,
            verbose: false,
            about: false,
            results_only: false,
        }
    }
}

impl Config {
    pub fn request(&self) -> Result<BenchmarkRequest, BenchmarkError> {
        BenchmarkRequest::new(self.api_level, self.objects)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Cli(clap::Error),
    Json(String, JsonError),
    InvalidNumber { arg: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Cli(err) => write!(f, "{}", err),
            ConfigError::Json(arg, err) => write!(f, "can't read configuration '{}' ({})", arg, err),
            ConfigError::InvalidNumber { arg, value } => {
                write!(f, "invalid value '{}' for --{}", value, arg)
            }
        }
    }
}

impl Error for ConfigError {}

impl From<clap::Error> for ConfigError {
    fn from(err: clap::Error) -> ConfigError {
        ConfigError::Cli(err)
    }
}

/// Reads `arg` as inline JSON, falling back to a file path.
fn from_json(arg: &str) -> Result<Config, JsonError> {
    if let Ok(config) = serde_json::from_str(arg) {
        Ok(config)
    } else {
        let mut data = String::new();
        let mut file = File::open(arg)?;
        file.read_to_string(&mut data)?;

        let config = serde_json::from_str(&data)?;
        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(arg: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidNumber {
        arg,
        value: value.to_string(),
    })
}

pub fn cmd_parse() -> Result<Config, ConfigError> {
    parse_args(std::env::args_os())
}

pub fn parse_args<I, T>(args: I) -> Result<Config, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    use clap::{App, AppSettings, Arg};

    let matches = App::new("GPU Emulation Stress Test")
        .version(env!("CARGO_PKG_VERSION"))
        .author("The GPU Emulation Stress Test Developers")
        .about("Renders an animated scene and reports the average frame rate")
        .arg(
            Arg::with_name("api")
                .long("api")
                .short("a")
                .value_name("2|3")
                .possible_values(&["2", "3"])
                .help("Selects the renderer (2: shadow map, 3: blurred shadows and motion blur)"),
        )
        .arg(
            Arg::with_name("objects")
                .long("objects")
                .short("n")
                .value_name("N")
                .help("Sets the number of particle objects"),
        )
        .arg(
            Arg::with_name("slider")
                .long("slider")
                .value_name("P")
                .conflicts_with("objects")
                .help("Sets the object count in slider steps of 1000"),
        )
        .arg(
            Arg::with_name("assets")
                .long("assets")
                .value_name("DIR")
                .help("Directory holding the scene and its models"),
        )
        .arg(
            Arg::with_name("results")
                .long("results")
                .short("r")
                .value_name("FILE")
                .help("File the results board is restored from and saved to"),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .short("c")
                .value_name("FILE|JSON")
                .number_of_values(1)
                .help("Sets defaults from a JSON object, e.g. {\"apiLevel\": 3, \"objects\": 5000}"),
        )
        .arg(
            Arg::with_name("log")
                .long("log")
                .value_name("FILE")
                .help("Writes the log to a file instead of stderr"),
        )
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .takes_value(false)
                .help("Logs scene commands and other debug output"),
        )
        .arg(
            Arg::with_name("about")
                .long("about")
                .takes_value(false)
                .help("Prints the application name and version"),
        )
        .arg(
            Arg::with_name("results_only")
                .long("results-only")
                .takes_value(false)
                .help("Prints the results board and exits without running"),
        )
        .setting(AppSettings::UnifiedHelpMessage)
        .get_matches_from_safe(args)?;

    let mut config = if let Some(config_str) = matches.value_of("config") {
        from_json(config_str).map_err(|err| ConfigError::Json(config_str.to_string(), err))?
    } else {
        Config::default()
    };

    if let Some(api) = matches.value_of("api") {
        config.api_level = parse_number("api", api)?;
    }
    if let Some(objects) = matches.value_of("objects") {
        config.objects = parse_number("objects", objects)?;
    }
    if let Some(slider) = matches.value_of("slider") {
        let slider = ObjectSlider {
            progress: parse_number("slider", slider)?,
        };
        config.objects = slider.objects().min(i32::MAX as u32) as i32;
    }
    if let Some(assets) = matches.value_of("assets") {
        config.assets = assets.to_string();
    }
    if let Some(results) = matches.value_of("results") {
        config.results = results.to_string();
    }
    if let Some(log) = matches.value_of("log") {
        config.log = Some(log.to_string());
    }
    if matches.is_present("verbose") {
        config.verbose = true;
    }
    config.about = matches.is_present("about");
    config.results_only = matches.is_present("results_only");

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, ConfigError> {
        parse_args(std::iter::once("gest").chain(args.iter().cloned()))
    }

    #[test]
    fn defaults_without_flags() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.request().unwrap().api_level, ApiLevel::Gles2);
        assert_eq!(config.request().unwrap().object_count, 1000);
    }

    #[test]
    fn flags_override_json() {
        let config = parse(&[
            "--config",
            r#"{"apiLevel": 3, "objects": 5000, "assets": "data"}"#,
            "--objects",
            "7000",
        ])
        .unwrap();
        assert_eq!(config.api_level, 3);
        assert_eq!(config.objects, 7000);
        assert_eq!(config.assets, "data");
        assert_eq!(config.results, DEFAULT_RESULTS_FILE);
    }

    #[test]
    fn slider_steps_by_thousand() {
        let config = parse(&["--slider", "12", "--api", "3"]).unwrap();
        assert_eq!(config.objects, 12_000);
        assert_eq!(config.api_level, 3);
    }

    #[test]
    fn rejects_bad_values() {
        match parse(&["--api", "4"]) {
            Err(ConfigError::Cli(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
        match parse(&["--objects", "many"]) {
            Err(ConfigError::InvalidNumber { arg: "objects", .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
        match parse(&["--config", "/nonexistent/gest.json"]) {
            Err(ConfigError::Json(..)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn zero_objects_fail_validation() {
        let config = parse(&["--objects", "0"]).unwrap();
        assert_eq!(
            config.request(),
            Err(BenchmarkError::InvalidObjectCount(0))
        );
    }
}
