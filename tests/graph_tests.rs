//! Resource graph tests
//!
//! Identity, ordering and snapshot behavior of the shared graph.

use std::thread;

use kube_mapper::graph::ResourceGraph;
use kube_mapper::models::{
    Relationship, RelationshipKind, Resource, ResourceId, ResourceKind, ResourceStatus,
};

fn resource(kind: ResourceKind, namespace: &str, name: &str) -> Resource {
    Resource::new(ResourceId::new(kind, namespace, name))
}

#[test]
fn test_graph_creation() {
    let graph = ResourceGraph::new();
    assert_eq!(graph.resource_count(), 0);
    assert_eq!(graph.relationship_count(), 0);
    assert!(graph.resources_of_kind(ResourceKind::Pod).is_empty());
}

#[test]
fn test_add_resource_reports_first_insertion() {
    let graph = ResourceGraph::new();
    assert!(graph.add_resource(resource(ResourceKind::Pod, "default", "web-a")));
    assert!(!graph.add_resource(
        resource(ResourceKind::Pod, "default", "web-a")
            .with_status(ResourceStatus::new("Failed", false, "")),
    ));

    assert_eq!(graph.resource_count(), 1);
    let stored = graph
        .get(&ResourceId::new(ResourceKind::Pod, "default", "web-a"))
        .unwrap();
    assert_ne!(stored.status.phase, "Failed");
}

#[test]
fn test_same_name_in_other_kind_or_namespace_is_distinct() {
    let graph = ResourceGraph::new();
    graph.add_resource(resource(ResourceKind::Service, "default", "web"));
    graph.add_resource(resource(ResourceKind::Deployment, "default", "web"));
    graph.add_resource(resource(ResourceKind::Service, "staging", "web"));
    assert_eq!(graph.resource_count(), 3);
}

#[test]
fn test_resources_sorted_by_namespace_then_name() {
    let graph = ResourceGraph::new();
    for (ns, name) in [("prod", "b"), ("dev", "z"), ("prod", "a"), ("dev", "a")] {
        graph.add_resource(resource(ResourceKind::ConfigMap, ns, name));
    }

    let order: Vec<String> = graph
        .resources_of_kind(ResourceKind::ConfigMap)
        .iter()
        .map(|r| format!("{}/{}", r.namespace(), r.name()))
        .collect();
    assert_eq!(order, vec!["dev/a", "dev/z", "prod/a", "prod/b"]);
}

#[test]
fn test_relationships_are_not_deduplicated() {
    let graph = ResourceGraph::new();
    let ingress = ResourceId::new(ResourceKind::Ingress, "default", "site");
    let service = ResourceId::new(ResourceKind::Service, "default", "frontend");
    for description in ["site.example.com/static", "site.example.com/", "site.example.com/"] {
        graph.add_relationship(Relationship::new(
            ingress.clone(),
            service.clone(),
            RelationshipKind::Exposes,
            description,
        ));
    }

    let descriptions: Vec<String> = graph
        .relationships_from(&ingress, RelationshipKind::Exposes)
        .into_iter()
        .map(|r| r.description)
        .collect();
    assert_eq!(
        descriptions,
        vec!["site.example.com/", "site.example.com/", "site.example.com/static"]
    );
}

#[test]
fn test_relationships_filtered_by_kind_and_direction() {
    let graph = ResourceGraph::new();
    let deployment = ResourceId::new(ResourceKind::Deployment, "default", "web");
    let config_map = ResourceId::new(ResourceKind::ConfigMap, "default", "settings");
    let pod = ResourceId::new(ResourceKind::Pod, "default", "web-a");
    graph.add_relationship(Relationship::new(
        deployment.clone(),
        pod.clone(),
        RelationshipKind::Owns,
        "app=web",
    ));
    graph.add_relationship(Relationship::new(
        deployment.clone(),
        config_map.clone(),
        RelationshipKind::Uses,
        "volume",
    ));

    assert_eq!(graph.relationships_from(&deployment, RelationshipKind::Owns).len(), 1);
    assert_eq!(graph.relationships_to(&config_map, RelationshipKind::Uses).len(), 1);
    assert!(graph.relationships_to(&deployment, RelationshipKind::Uses).is_empty());
    assert!(graph.relationships_from(&pod, RelationshipKind::Owns).is_empty());
}

#[test]
fn test_incoming_relationships_sorted_by_source() {
    let graph = ResourceGraph::new();
    let config_map = ResourceId::new(ResourceKind::ConfigMap, "default", "settings");
    for name in ["web-b", "web", "web-a"] {
        graph.add_relationship(Relationship::new(
            ResourceId::new(ResourceKind::Pod, "default", name),
            config_map.clone(),
            RelationshipKind::Uses,
            "environment",
        ));
    }

    let sources: Vec<String> = graph
        .relationships_to(&config_map, RelationshipKind::Uses)
        .into_iter()
        .map(|r| r.source.name)
        .collect();
    assert_eq!(sources, vec!["web", "web-a", "web-b"]);
}

#[test]
fn test_concurrent_writers() {
    let graph = ResourceGraph::new();
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let graph = graph.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    let id = format!("pod-{}", i);
                    graph.add_resource(resource(ResourceKind::Pod, "default", &id));
                    graph.add_relationship(Relationship::new(
                        ResourceId::new(ResourceKind::Service, "default", "web"),
                        ResourceId::new(ResourceKind::Pod, "default", &id),
                        RelationshipKind::Targets,
                        format!("worker {}", worker),
                    ));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(graph.resource_count(), 25);
    assert_eq!(graph.relationship_count(), 200);
}

#[test]
fn test_snapshot_serializes_in_id_order() {
    let graph = ResourceGraph::new();
    graph.add_resource(resource(ResourceKind::Namespace, "", "default"));
    graph.add_resource(resource(ResourceKind::Pod, "default", "web-b"));
    graph.add_resource(resource(ResourceKind::Pod, "default", "web-a"));
    graph.add_resource(resource(ResourceKind::IngressClass, "", "nginx"));

    let snapshot = graph.snapshot();
    assert_eq!(snapshot.namespaces, vec!["default"]);
    let value = serde_json::to_value(&snapshot).unwrap();
    let pods: Vec<&str> = value["resources"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["kind"] == "Pod")
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(pods, vec!["web-a", "web-b"]);

    let class = value["resources"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["kind"] == "IngressClass")
        .unwrap();
    assert!(class.get("namespace").is_none());
}
