//! Rendered bundle: every generated file keyed by its role.

use crate::templates::{endpoint_xml, policy_xml, proxy_xml, script_js, target_xml};
use apigen_intent::{PolicyKind, ProxyDescriptor};

/// Root directory of every bundle archive.
pub const BUNDLE_ROOT: &str = "apiproxy";

/// The logical role of a generated file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileRole {
    /// Top-level `APIProxy` descriptor.
    ProxyDescriptor,
    /// `default` proxy endpoint.
    ProxyEndpoint,
    /// `default` target endpoint.
    TargetEndpoint,
    /// One policy descriptor.
    Policy(PolicyKind),
    /// JavaScript transformation resource.
    Script,
}

impl FileRole {
    /// Archive path for this role.
    #[must_use]
    pub fn path(&self, proxy_name: &str) -> String {
        match self {
            Self::ProxyDescriptor => format!("{BUNDLE_ROOT}/{proxy_name}.xml"),
            Self::ProxyEndpoint => format!("{BUNDLE_ROOT}/proxies/default.xml"),
            Self::TargetEndpoint => format!("{BUNDLE_ROOT}/targets/default.xml"),
            Self::Policy(kind) => format!("{BUNDLE_ROOT}/policies/{kind}.xml"),
            Self::Script => format!("{BUNDLE_ROOT}/resources/jsc/transformation.js"),
        }
    }
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    /// What the file is.
    pub role: FileRole,
    /// Path inside the archive.
    pub path: String,
    /// Generated text.
    pub contents: String,
}

/// All files generated for one descriptor, in archive order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBundle {
    proxy_name: String,
    files: Vec<BundleFile>,
}

impl RenderedBundle {
    /// Name of the proxy this bundle declares.
    #[must_use]
    pub fn proxy_name(&self) -> &str {
        &self.proxy_name
    }

    /// Files in archive order.
    #[must_use]
    pub fn files(&self) -> &[BundleFile] {
        &self.files
    }

    /// Text generated for a role, if present.
    #[must_use]
    pub fn get(&self, role: &FileRole) -> Option<&str> {
        self.files
            .iter()
            .find(|f| &f.role == role)
            .map(|f| f.contents.as_str())
    }

    fn push(&mut self, role: FileRole, contents: String) {
        let path = role.path(&self.proxy_name);
        self.files.push(BundleFile {
            role,
            path,
            contents,
        });
    }
}

/// Renders every file for a descriptor.
///
/// `request` is the original request text; the spike arrest body re-derives
/// its rate from it.
#[must_use]
pub fn render(descriptor: &ProxyDescriptor, request: &str) -> RenderedBundle {
    let mut bundle = RenderedBundle {
        proxy_name: descriptor.name.clone(),
        files: Vec::with_capacity(descriptor.policies.len() + 4),
    };

    bundle.push(
        FileRole::ProxyDescriptor,
        proxy_xml(&descriptor.name, &descriptor.policies),
    );
    bundle.push(
        FileRole::ProxyEndpoint,
        endpoint_xml(&descriptor.name, &descriptor.base_path, &descriptor.policies),
    );
    bundle.push(FileRole::TargetEndpoint, target_xml(&descriptor.target_url));

    for kind in &descriptor.policies {
        bundle.push(FileRole::Policy(kind.clone()), policy_xml(kind, request));
    }

    if descriptor.needs_script() {
        bundle.push(
            FileRole::Script,
            script_js(&descriptor.transformation_intent),
        );
    }

    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use apigen_intent::extract;
    use proptest::prelude::*;

    #[test]
    fn layout_matches_archive_contract() {
        let request = "Create a proxy named users with api key, cors and javascript \
            to combine firstName and lastName";
        let bundle = render(&extract(request), request);

        let paths: Vec<&str> = bundle.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "apiproxy/users.xml",
                "apiproxy/proxies/default.xml",
                "apiproxy/targets/default.xml",
                "apiproxy/policies/VerifyAPIKey.xml",
                "apiproxy/policies/CORS.xml",
                "apiproxy/policies/JavaScript.xml",
                "apiproxy/resources/jsc/transformation.js",
            ]
        );
    }

    #[test]
    fn script_present_only_with_javascript() {
        let request = "proxy plain pointing to https://plain.example.com";
        let bundle = render(&extract(request), request);
        assert!(bundle.get(&FileRole::Script).is_none());
        assert_eq!(bundle.files().len(), 3);
    }

    #[test]
    fn name_combination_request_renders_combination_script() {
        let request = "Create a proxy user-transform that will combine firstName and lastName \
            into fullName using JavaScript.";
        let bundle = render(&extract(request), request);
        assert_eq!(
            bundle.get(&FileRole::Script),
            Some(crate::templates::NAME_COMBINATION_SCRIPT)
        );
    }

    #[test]
    fn spike_arrest_body_tracks_request_text() {
        let request = "proxy burst-guard with spike arrest at 4 requests per sec";
        let bundle = render(&extract(request), request);
        let body = bundle
            .get(&FileRole::Policy(PolicyKind::SpikeArrest))
            .unwrap();
        assert!(body.contains("<Rate>4ps</Rate>"));
    }

    proptest! {
        #[test]
        fn rendering_is_byte_identical(request in "[ -~]{0,160}") {
            let descriptor = extract(&request);
            prop_assert_eq!(render(&descriptor, &request), render(&descriptor, &request));
        }
    }
}
