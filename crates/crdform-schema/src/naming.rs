//! Name translation between Kubernetes wire names and Terraform display names

/// Attribute names Terraform reserves for meta-arguments
const RESERVED_NAMES: &[&str] = &[
    "connection",
    "count",
    "depends_on",
    "for_each",
    "lifecycle",
    "provider",
    "provisioner",
];

/// Convert a camelCase (or PascalCase) wire name to snake_case
///
/// Acronym runs stay together: `podCIDR` -> `pod_cidr`, `URLPath` -> `url_path`.
/// Characters that are not ASCII alphanumerics become underscores.
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            out.push('_');
            continue;
        }

        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }

        out.push(c.to_ascii_lowercase());
    }

    collapse_underscores(&out)
}

/// Display name for a wire name, escaping Terraform meta-argument names
pub fn display_name(wire_name: &str) -> String {
    let snake = camel_to_snake(wire_name);
    if RESERVED_NAMES.contains(&snake.as_str()) {
        format!("{}_", snake)
    } else {
        snake
    }
}

/// Terraform resource type name for one CRD version
///
/// `<provider>_<group with . and - as _>_<kind lowercased>_<version>`
pub fn resource_type_name(provider: &str, group: &str, kind: &str, version: &str) -> String {
    let group = group.replace(['.', '-'], "_");
    if group.is_empty() {
        format!("{}_{}_{}", provider, kind.to_lowercase(), version)
    } else {
        format!("{}_{}_{}_{}", provider, group, kind.to_lowercase(), version)
    }
}

fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(camel_to_snake("apiVersion"), "api_version");
        assert_eq!(camel_to_snake("secretName"), "secret_name");
        assert_eq!(camel_to_snake("podCIDR"), "pod_cidr");
        assert_eq!(camel_to_snake("URLPath"), "url_path");
        assert_eq!(camel_to_snake("ipv4Address"), "ipv4_address");
        assert_eq!(camel_to_snake("tlsConfig"), "tls_config");
        assert_eq!(camel_to_snake("name"), "name");
        assert_eq!(camel_to_snake("x-kubernetes-field"), "x_kubernetes_field");
        assert_eq!(camel_to_snake("$ref"), "ref");
    }

    #[test]
    fn test_display_name_escapes_reserved() {
        assert_eq!(display_name("count"), "count_");
        assert_eq!(display_name("dependsOn"), "depends_on_");
        assert_eq!(display_name("replicas"), "replicas");
    }

    #[test]
    fn test_resource_type_name() {
        assert_eq!(
            resource_type_name("k8s", "cert-manager.io", "Certificate", "v1"),
            "k8s_cert_manager_io_certificate_v1"
        );
        assert_eq!(
            resource_type_name("k8s", "monitoring.coreos.com", "ServiceMonitor", "v1"),
            "k8s_monitoring_coreos_com_servicemonitor_v1"
        );
        assert_eq!(
            resource_type_name("k8s", "", "ConfigMap", "v1"),
            "k8s_configmap_v1"
        );
    }
}
