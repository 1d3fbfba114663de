use crate::retry::Backoff;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

const KUBECONFIG_FLAG: &str = "kubeconfig";

#[derive(Debug, Parser)]
#[command(about = "Restart every pod whose name contains 'database'")]
pub struct Config {
    /// Turn debug logs on
    #[arg(long)]
    debug: bool,

    /// Path to the kube config file (defaults to ~/.kube/config, empty for in-cluster config)
    #[arg(long, value_parser = clap::builder::OsStringValueParser::new())]
    kubeconfig: Option<OsString>,

    /// Maximum read-modify-write attempts per pod when updates conflict
    #[arg(
        long,
        env = "POD_RESTARTER_RETRY_ATTEMPTS",
        default_value_t = 5,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    retry_attempts: u32,

    /// Delay before retrying a conflicting update
    #[arg(long, env = "POD_RESTARTER_RETRY_DELAY", default_value = "10ms")]
    retry_delay: humantime::Duration,
}

impl Config {
    /// Parses the process arguments, accepting `-kubeconfig` as well as `--kubeconfig`.
    pub fn from_env_args() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// The kubeconfig to load, or `None` when the client configuration should be inferred.
    pub fn kubeconfig_path(&self) -> Option<PathBuf> {
        match &self.kubeconfig {
            Some(path) if path.is_empty() => None,
            Some(path) => Some(PathBuf::from(path)),
            None => default_kubeconfig_path(|key| std::env::var_os(key)),
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff {
            max_attempts: self.retry_attempts,
            initial_delay: self.retry_delay.into(),
            ..Default::default()
        }
    }
}

fn home_dir<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<OsString>,
{
    ["HOME", "USERPROFILE"]
        .into_iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub(crate) fn default_kubeconfig_path<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<OsString>,
{
    home_dir(lookup).map(|home| home.join(".kube").join("config"))
}

/// Rewrites the single-dash `-kubeconfig` spelling into the long form clap expects.
pub(crate) fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let single_dash = format!("-{KUBECONFIG_FLAG}");
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some(s) if s == single_dash || s.starts_with(&format!("{single_dash}=")) => {
                OsString::from(format!("-{s}"))
            }
            _ => arg,
        })
        .collect()
}
