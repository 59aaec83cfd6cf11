//! Role claim extraction
//!
//! Identity providers put roles under different claim names (namespaced
//! custom claims, `roles`, `scope`...). Every configured candidate is probed
//! in every claim set and the results are unioned.

use super::token::ClaimSet;
use serde_json::Value;
use std::collections::HashSet;

/// Collect the unique role identifiers found under `candidates` in `sources`.
///
/// Array values contribute their string elements; string values are split on
/// whitespace. Absent sources are skipped. Order is first insertion.
pub fn collect_roles(sources: &[Option<&ClaimSet>], candidates: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut roles = Vec::new();
    let mut add = |role: &str| {
        if seen.insert(role.to_string()) {
            roles.push(role.to_string());
        }
    };

    for claims in sources.iter().flatten() {
        for name in candidates {
            match claims.get(name) {
                Some(Value::Array(items)) => {
                    items.iter().filter_map(Value::as_str).for_each(&mut add);
                }
                Some(Value::String(value)) => {
                    value.split_whitespace().for_each(&mut add);
                }
                _ => {}
            }
        }
    }

    roles
}

/// Case-sensitive membership check
pub fn has_role(roles: &[String], role: &str) -> bool {
    roles.iter().any(|r| r == role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> ClaimSet {
        value.as_object().cloned().unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_union_across_sources() {
        let id_token = claims(json!({ "roles": ["admin", "user"] }));
        let access_token = claims(json!({ "scope": "openid admin" }));

        let roles = collect_roles(
            &[Some(&id_token), Some(&access_token)],
            &names(&["roles", "scope"]),
        );

        let found: HashSet<_> = roles.iter().map(String::as_str).collect();
        assert_eq!(found, HashSet::from(["admin", "user", "openid"]));
        assert_eq!(roles.len(), 3);
    }

    #[test]
    fn test_all_sources_absent() {
        let roles = collect_roles(&[None, None, None], &names(&["roles"]));
        assert!(roles.is_empty());
        assert!(collect_roles(&[], &names(&["roles"])).is_empty());
    }

    #[test]
    fn test_insertion_order_and_dedup() {
        let first = claims(json!({ "https://tenant.example/roles": ["editor", "admin"] }));
        let second = claims(json!({ "roles": "admin  viewer\teditor" }));

        let roles = collect_roles(
            &[Some(&first), None, Some(&second)],
            &names(&["https://tenant.example/roles", "roles"]),
        );
        assert_eq!(roles, names(&["editor", "admin", "viewer"]));
    }

    #[test]
    fn test_every_candidate_is_probed() {
        let token = claims(json!({ "roles": ["admin"], "scope": "read write" }));
        let roles = collect_roles(&[Some(&token)], &names(&["roles", "scope"]));
        assert_eq!(roles, names(&["admin", "read", "write"]));
    }

    #[test]
    fn test_ignores_empty_and_non_string_values() {
        let token = claims(json!({
            "roles": ["admin", 7, null, {"x": 1}],
            "scope": "",
            "groups": 12,
            "other": null
        }));
        let roles = collect_roles(
            &[Some(&token)],
            &names(&["roles", "scope", "groups", "other", "missing"]),
        );
        assert_eq!(roles, names(&["admin"]));
    }

    #[test]
    fn test_case_sensitive() {
        let token = claims(json!({ "roles": ["Admin", "admin"] }));
        let roles = collect_roles(&[Some(&token)], &names(&["roles"]));
        assert_eq!(roles.len(), 2);
        assert!(has_role(&roles, "admin"));
        assert!(!has_role(&roles, "ADMIN"));
    }
}
