use crate::restart::{RestartError, MATCH_SUBSTRING};
use std::fmt;
use std::io::{self, Write};

/// What happened to one enumerated pod.
#[derive(Debug)]
pub enum PodOutcome {
    NoMatch {
        namespace: String,
        name: String,
    },
    Restarted {
        namespace: String,
        name: String,
    },
    Failed {
        namespace: String,
        name: String,
        error: RestartError,
    },
}

impl PodOutcome {
    /// The (namespace, name) of the pod this outcome is about.
    pub fn pod(&self) -> (&str, &str) {
        match self {
            Self::NoMatch { namespace, name }
            | Self::Restarted { namespace, name }
            | Self::Failed {
                namespace, name, ..
            } => (namespace.as_str(), name.as_str()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for PodOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Keyed by namespace only, so it repeats for every non-matching pod there.
            Self::NoMatch { namespace, .. } => write!(
                f,
                "No Pod in namespace {namespace} contains '{MATCH_SUBSTRING}' in its name"
            ),
            Self::Restarted { namespace, name } => {
                write!(f, "Pod {name} in namespace {namespace} redeployed successfully")
            }
            Self::Failed {
                namespace,
                name,
                error,
            } => write!(
                f,
                "Failed to redeploy pod {name} in namespace {namespace}: {error}"
            ),
        }
    }
}

/// Plain-text status lines for the operator, one per pod.
pub struct Reporter<W> {
    out: W,
}

impl Reporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn listing(&mut self) -> io::Result<()> {
        writeln!(self.out, "Get all pods in the cluster...")
    }

    pub fn redeploying(&mut self, namespace: &str, name: &str) -> io::Result<()> {
        writeln!(self.out, "Redeploying pod {name} in namespace {namespace}")
    }

    pub fn outcome(&mut self, outcome: &PodOutcome) -> io::Result<()> {
        writeln!(self.out, "{outcome}")
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
