//! KE-005: API version resolution per kind.
//!
//! [`ApiVersions`] is the seam the enricher resolves through. The default
//! [`ResourceVersioning`] table maps kinds to their API group version and can
//! be tuned from the `api_versions` section of kenrich.yaml.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Resolves the API version to use for a kind.
pub trait ApiVersions {
    /// `None` leaves the fragment's apiVersion unset.
    fn for_kind(&self, kind: &str) -> Option<String>;
}

impl<F> ApiVersions for F
where
    F: Fn(&str) -> Option<String>,
{
    fn for_kind(&self, kind: &str) -> Option<String> {
        self(kind)
    }
}

/// API group versions used for each kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceVersioning {
    pub core: String,
    pub apps: String,
    pub batch: String,
    pub networking: String,
    pub rbac: String,
    pub autoscaling: String,
    pub policy: String,
    pub storage: String,
    pub apiextensions: String,
    pub openshift_apps: String,
    pub openshift_build: String,
    pub openshift_image: String,
    pub openshift_route: String,
    pub openshift_template: String,
    pub openshift_project: String,
    pub openshift_authorization: String,
    pub openshift_oauth: String,

    /// Per-kind versions, checked before the group table
    pub overrides: IndexMap<String, String>,
}

impl Default for ResourceVersioning {
    fn default() -> Self {
        Self {
            core: "v1".to_string(),
            apps: "apps/v1".to_string(),
            batch: "batch/v1".to_string(),
            networking: "networking.k8s.io/v1".to_string(),
            rbac: "rbac.authorization.k8s.io/v1".to_string(),
            autoscaling: "autoscaling/v2".to_string(),
            policy: "policy/v1".to_string(),
            storage: "storage.k8s.io/v1".to_string(),
            apiextensions: "apiextensions.k8s.io/v1".to_string(),
            openshift_apps: "apps.openshift.io/v1".to_string(),
            openshift_build: "build.openshift.io/v1".to_string(),
            openshift_image: "image.openshift.io/v1".to_string(),
            openshift_route: "route.openshift.io/v1".to_string(),
            openshift_template: "template.openshift.io/v1".to_string(),
            openshift_project: "project.openshift.io/v1".to_string(),
            openshift_authorization: "authorization.openshift.io/v1".to_string(),
            openshift_oauth: "oauth.openshift.io/v1".to_string(),
            overrides: IndexMap::new(),
        }
    }
}

impl ResourceVersioning {
    /// Add a per-kind override.
    pub fn with_override(mut self, kind: impl Into<String>, version: impl Into<String>) -> Self {
        self.overrides.insert(kind.into(), version.into());
        self
    }

    /// The version for `kind`; kinds outside every known group get the core version.
    pub fn version_for(&self, kind: &str) -> &str {
        if let Some(v) = self.overrides.get(kind) {
            return v;
        }
        match kind {
            "Deployment" | "StatefulSet" | "DaemonSet" | "ReplicaSet" | "ControllerRevision" => {
                &self.apps
            }
            "Job" | "CronJob" => &self.batch,
            "Ingress" | "IngressClass" | "NetworkPolicy" => &self.networking,
            "Role" | "RoleBinding" | "ClusterRole" | "ClusterRoleBinding" => &self.rbac,
            "HorizontalPodAutoscaler" => &self.autoscaling,
            "PodDisruptionBudget" => &self.policy,
            "StorageClass" | "VolumeAttachment" | "CSIDriver" => &self.storage,
            "CustomResourceDefinition" => &self.apiextensions,
            "DeploymentConfig" => &self.openshift_apps,
            "BuildConfig" | "Build" => &self.openshift_build,
            "ImageStream" | "ImageStreamTag" | "ImageStreamImport" => &self.openshift_image,
            "Route" => &self.openshift_route,
            "Template" => &self.openshift_template,
            "Project" | "ProjectRequest" => &self.openshift_project,
            "PolicyBinding" | "RoleBindingRestriction" => &self.openshift_authorization,
            "OAuthClient" => &self.openshift_oauth,
            _ => &self.core,
        }
    }
}

impl ApiVersions for ResourceVersioning {
    fn for_kind(&self, kind: &str) -> Option<String> {
        Some(self.version_for(kind).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ke005_defaults_by_group() {
        let v = ResourceVersioning::default();
        assert_eq!(v.version_for("Service"), "v1");
        assert_eq!(v.version_for("ConfigMap"), "v1");
        assert_eq!(v.version_for("Deployment"), "apps/v1");
        assert_eq!(v.version_for("CronJob"), "batch/v1");
        assert_eq!(v.version_for("Ingress"), "networking.k8s.io/v1");
        assert_eq!(v.version_for("ClusterRoleBinding"), "rbac.authorization.k8s.io/v1");
        assert_eq!(v.version_for("DeploymentConfig"), "apps.openshift.io/v1");
        assert_eq!(v.version_for("Route"), "route.openshift.io/v1");
    }

    #[test]
    fn test_ke005_unknown_kind_is_core() {
        let v = ResourceVersioning::default();
        assert_eq!(v.for_kind("CustomThing").as_deref(), Some("v1"));
    }

    #[test]
    fn test_ke005_override_wins() {
        let v = ResourceVersioning::default().with_override("Deployment", "extensions/v1beta1");
        assert_eq!(v.version_for("Deployment"), "extensions/v1beta1");
        assert_eq!(v.version_for("StatefulSet"), "apps/v1");
    }

    #[test]
    fn test_ke005_partial_yaml_keeps_defaults() {
        let v: ResourceVersioning = serde_yaml_ng::from_str(
            r#"
apps: apps/v1beta2
overrides:
  Widget: example.com/v1alpha1
"#,
        )
        .unwrap();
        assert_eq!(v.apps, "apps/v1beta2");
        assert_eq!(v.core, "v1");
        assert_eq!(v.version_for("Widget"), "example.com/v1alpha1");
    }

    #[test]
    fn test_ke005_closure_resolver() {
        let resolver = |kind: &str| (kind == "Foo").then(|| "foo/v1".to_string());
        assert_eq!(resolver.for_kind("Foo").as_deref(), Some("foo/v1"));
        assert!(resolver.for_kind("Bar").is_none());
    }
}
