use config::Config as eConfig;
use serde::{Deserialize, Serialize};

use crate::routines::initialization::Init;

/// Settings for a pLSA run
///
/// All sections have serde defaults, so a [Settings] can be built from a
/// partial TOML file, from environment variables with the `PLSACORE_`
/// prefix, or constructed directly with [Settings::default] and adjusted
/// field by field.
#[derive(Debug, Deserialize, Clone, Serialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub config: Config,
    #[serde(default)]
    pub fit: Fit,
    #[serde(default)]
    pub refit: Refit,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub output: Output,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Config {
    /// Number of latent topics to fit
    #[serde(default = "default_topics")]
    pub n_topics: usize,
    /// Strategy used to seed the factor matrices
    #[serde(default)]
    pub init: Init,
    /// Seed for all random draws: the random initialization strategy and
    /// the document seeding performed by refits
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            n_topics: default_topics(),
            init: Init::default(),
            seed: default_seed(),
        }
    }
}

/// Iteration budget for full fits, where both factor matrices are estimated
#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Fit {
    /// Maximum number of EM cycles
    #[serde(default = "default_fit_cycles")]
    pub cycles: usize,
    /// Number of cycles between log-likelihood convergence tests
    #[serde(default = "default_fit_test_every")]
    pub cycles_per_test: usize,
    /// Relative log-likelihood improvement below which the fit stops
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Sparsity cutoff for joint probabilities in the expectation step
    #[serde(default = "default_fit_threshold")]
    pub probability_threshold: f64,
}

impl Default for Fit {
    fn default() -> Self {
        Fit {
            cycles: default_fit_cycles(),
            cycles_per_test: default_fit_test_every(),
            tolerance: default_tolerance(),
            probability_threshold: default_fit_threshold(),
        }
    }
}

/// Iteration budget for refits, where only document mixtures are estimated
///
/// Fewer cycles, more frequent testing and a tighter sparsity cutoff than
/// [Fit], since only one of the two factor matrices moves.
#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Refit {
    #[serde(default = "default_refit_cycles")]
    pub cycles: usize,
    #[serde(default = "default_refit_test_every")]
    pub cycles_per_test: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_refit_threshold")]
    pub probability_threshold: f64,
}

impl Default for Refit {
    fn default() -> Self {
        Refit {
            cycles: default_refit_cycles(),
            cycles_per_test: default_refit_test_every(),
            tolerance: default_tolerance(),
            probability_threshold: default_refit_threshold(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Log {
    /// Log level, one of `trace`, `debug`, `info`, `warn` or `error`
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file, written inside the output folder
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: default_log_level(),
            file: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Output {
    /// Whether to write result files after a fit
    #[serde(default = "default_false")]
    pub write: bool,
    /// Folder in which result files are written
    #[serde(default = "default_output_folder")]
    pub path: String,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            write: default_false(),
            path: default_output_folder(),
        }
    }
}

/// Read [Settings] from a TOML file, with `PLSACORE_`-prefixed environment
/// variables taking precedence over file values.
pub fn read_settings(path: impl Into<String>) -> Result<Settings, config::ConfigError> {
    let settings_path = path.into();

    let parsed = eConfig::builder()
        .add_source(config::File::with_name(&settings_path).format(config::FileFormat::Toml))
        .add_source(config::Environment::with_prefix("PLSACORE").separator("_"))
        .build()?;

    parsed.try_deserialize()
}

// *********************************
// Default values for deserializing
// *********************************
fn default_false() -> bool {
    false
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_folder() -> String {
    "outputs".to_string()
}

fn default_topics() -> usize {
    10
}

fn default_seed() -> u64 {
    347
}

fn default_fit_cycles() -> usize {
    100
}

fn default_fit_test_every() -> usize {
    10
}

fn default_refit_cycles() -> usize {
    50
}

fn default_refit_test_every() -> usize {
    5
}

fn default_tolerance() -> f64 {
    1e-3
}

fn default_fit_threshold() -> f64 {
    1e-32
}

fn default_refit_threshold() -> f64 {
    1e-16
}
