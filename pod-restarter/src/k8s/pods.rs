use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;

/// The pod operations the restart pass needs from the control plane.
pub trait PodStore {
    /// Every pod in every namespace, in whatever order the API server returns them.
    async fn list_all(&self) -> kube::Result<Vec<Pod>>;

    async fn get(&self, namespace: &str, name: &str) -> kube::Result<Pod>;

    /// Full-object update. Fails with a 409 when `pod` carries a stale resource version.
    async fn replace(&self, pod: &Pod) -> kube::Result<Pod>;
}

pub fn pod_key(pod: &Pod) -> (String, String) {
    (pod.namespace().unwrap_or_default(), pod.name_any())
}

pub fn is_conflict(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(response) if response.code == 409)
}
