//! Utility functions

/// Attribute descriptor or numeric OID
pub fn is_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        Some(c) if c.is_ascii_digit() => {
            name.split('.')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
        }
        _ => false,
    }
}

/// `DC=corp,DC=example,DC=com` -> `corp.example.com`
pub fn domain_from_base_dn(base_dn: &str) -> Option<String> {
    let labels: Vec<&str> = base_dn
        .split(',')
        .filter_map(|rdn| {
            let (attr, value) = rdn.trim().split_once('=')?;
            attr.trim()
                .eq_ignore_ascii_case("dc")
                .then(|| value.trim())
                .filter(|v| !v.is_empty())
        })
        .collect();

    if labels.is_empty() {
        None
    } else {
        Some(labels.join(".").to_ascii_lowercase())
    }
}

/// `corp.example.com` -> `DC=corp,DC=example,DC=com`
pub fn base_dn_from_domain(domain: &str) -> Option<String> {
    let labels: Vec<&str> = domain.trim().split('.').collect();
    if labels.iter().any(|l| l.is_empty()) {
        return None;
    }
    Some(
        labels
            .iter()
            .map(|l| format!("DC={}", l))
            .collect::<Vec<_>>()
            .join(","),
    )
}
