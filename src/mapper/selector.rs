//! Label selector matching

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement};

/// Whether `labels` satisfy a workload label selector
///
/// Every `matchLabels` pair must be present and equal and every
/// `matchExpressions` entry must hold. A selector with neither part matches
/// nothing.
pub fn matches_label_selector(selector: &LabelSelector, labels: &BTreeMap<String, String>) -> bool {
    let match_labels = selector.match_labels.as_ref();
    let expressions = selector.match_expressions.as_ref();

    let has_labels = match_labels.is_some_and(|m| !m.is_empty());
    let has_expressions = expressions.is_some_and(|e| !e.is_empty());
    if !has_labels && !has_expressions {
        return false;
    }

    let labels_match = match_labels
        .map(|m| m.iter().all(|(k, v)| labels.get(k) == Some(v)))
        .unwrap_or(true);

    labels_match
        && expressions
            .map(|e| e.iter().all(|req| requirement_matches(req, labels)))
            .unwrap_or(true)
}

fn requirement_matches(req: &LabelSelectorRequirement, labels: &BTreeMap<String, String>) -> bool {
    let values: &[String] = req.values.as_deref().unwrap_or_default();
    let value = labels.get(&req.key);
    match req.operator.as_str() {
        "In" => value.is_some_and(|v| values.contains(v)),
        "NotIn" => value.is_none_or(|v| !values.contains(v)),
        "Exists" => value.is_some(),
        "DoesNotExist" => value.is_none(),
        other => {
            tracing::debug!(operator = other, key = %req.key, "Unknown selector operator");
            false
        }
    }
}

/// Whether `labels` are a superset of a Service selector; empty matches nothing
pub fn matches_service_selector(
    selector: &BTreeMap<String, String>,
    labels: &BTreeMap<String, String>,
) -> bool {
    !selector.is_empty() && selector.iter().all(|(k, v)| labels.get(k) == Some(v))
}

/// Render a selector as `k=v,k2 in (a,b)` for edge descriptions
pub fn describe_label_selector(selector: &LabelSelector) -> String {
    let mut parts: Vec<String> = selector
        .match_labels
        .iter()
        .flatten()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    for req in selector.match_expressions.iter().flatten() {
        let values = req.values.as_deref().unwrap_or_default().join(",");
        parts.push(match req.operator.as_str() {
            "In" => format!("{} in ({})", req.key, values),
            "NotIn" => format!("{} notin ({})", req.key, values),
            "Exists" => req.key.clone(),
            "DoesNotExist" => format!("!{}", req.key),
            other => format!("{} {} ({})", req.key, other, values),
        });
    }
    parts.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn requirement(key: &str, operator: &str, values: &[&str]) -> LabelSelectorRequirement {
        LabelSelectorRequirement {
            key: key.to_string(),
            operator: operator.to_string(),
            values: Some(values.iter().map(|v| v.to_string()).collect()),
        }
    }

    #[test]
    fn test_match_labels_subset() {
        let selector = LabelSelector {
            match_labels: Some(labels(&[("app", "web")])),
            ..Default::default()
        };

        assert!(matches_label_selector(&selector, &labels(&[("app", "web"), ("tier", "fe")])));
        assert!(!matches_label_selector(&selector, &labels(&[("app", "api")])));
        assert!(!matches_label_selector(&selector, &labels(&[])));
    }

    #[test]
    fn test_match_expressions_must_all_hold() {
        let selector = LabelSelector {
            match_labels: Some(labels(&[("app", "web")])),
            match_expressions: Some(vec![
                requirement("tier", "In", &["fe", "edge"]),
                requirement("canary", "DoesNotExist", &[]),
                requirement("env", "NotIn", &["dev"]),
            ]),
        };

        assert!(matches_label_selector(
            &selector,
            &labels(&[("app", "web"), ("tier", "edge")])
        ));
        assert!(!matches_label_selector(
            &selector,
            &labels(&[("app", "web"), ("tier", "edge"), ("canary", "true")])
        ));
        assert!(!matches_label_selector(
            &selector,
            &labels(&[("app", "web"), ("tier", "edge"), ("env", "dev")])
        ));
        assert!(!matches_label_selector(
            &selector,
            &labels(&[("app", "web"), ("tier", "be")])
        ));
    }

    #[test]
    fn test_expressions_only_selector() {
        let selector = LabelSelector {
            match_expressions: Some(vec![requirement("app", "Exists", &[])]),
            ..Default::default()
        };

        assert!(matches_label_selector(&selector, &labels(&[("app", "x")])));
        assert!(!matches_label_selector(&selector, &labels(&[("role", "x")])));
    }

    #[test]
    fn test_empty_selector_matches_nothing() {
        let selector = LabelSelector::default();
        assert!(!matches_label_selector(&selector, &labels(&[("app", "web")])));
        assert!(!matches_service_selector(&BTreeMap::new(), &labels(&[("app", "web")])));
    }

    #[test]
    fn test_unknown_operator_is_false() {
        let selector = LabelSelector {
            match_expressions: Some(vec![requirement("app", "Matches", &["web"])]),
            ..Default::default()
        };
        assert!(!matches_label_selector(&selector, &labels(&[("app", "web")])));
    }

    #[test]
    fn test_service_selector_superset() {
        let selector = labels(&[("app", "web"), ("tier", "fe")]);
        assert!(matches_service_selector(
            &selector,
            &labels(&[("app", "web"), ("tier", "fe"), ("pod-template-hash", "abc")])
        ));
        assert!(!matches_service_selector(&selector, &labels(&[("app", "web")])));
    }

    #[test]
    fn test_describe_selector() {
        let selector = LabelSelector {
            match_labels: Some(labels(&[("app", "web")])),
            match_expressions: Some(vec![requirement("tier", "In", &["fe", "edge"])]),
        };
        assert_eq!(describe_label_selector(&selector), "app=web,tier in (fe,edge)");
    }
}
