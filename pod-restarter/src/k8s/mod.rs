mod annotations;
mod pods;
mod session;

pub use annotations::{is_controller_managed, set_restarted_at};
#[cfg(test)]
pub use annotations::RESTARTED_AT_ANNOTATION;
pub use pods::{is_conflict, pod_key, PodStore};
pub use session::ClusterSession;
