use chrono::{DateTime, SecondsFormat, Utc};
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;

/// The annotation `kubectl rollout restart` stamps on pod templates.
pub const RESTARTED_AT_ANNOTATION: &str = "kubectl.kubernetes.io/restartedAt";

pub fn restart_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn set_restarted_at(pod: &mut Pod, at: DateTime<Utc>) {
    pod.annotations_mut()
        .insert(RESTARTED_AT_ANNOTATION.to_owned(), restart_timestamp(at));
}

/// Whether a controller (ReplicaSet, StatefulSet, ...) owns the pod.
pub fn is_controller_managed(pod: &Pod) -> bool {
    pod.owner_references()
        .iter()
        .any(|owner| owner.controller == Some(true))
}
