use super::*;
use crate::affected_resources;
use ingress_controller_core::{Change, Secret};
use ingress_controller_k8s_api::Labels;
use kubert::index::IndexNamespacedResource;
use std::collections::BTreeSet;

fn ids(names: &[&str]) -> BTreeSet<ResourceId> {
    names
        .iter()
        .map(|n| ResourceId::new("default", *n))
        .collect()
}

#[test]
fn minion_change_resyncs_master() {
    let test = TestConfig::default();
    test.index
        .write()
        .apply(mk_master("default", "cafe", "cafe.example.com"));
    test.index
        .write()
        .apply(mk_master("default", "tea", "tea.example.com"));
    test.index
        .write()
        .apply(mk_minion("default", "coffee", "cafe.example.com", &["/coffee"]));

    let change = Change::RoutingResource {
        id: ResourceId::new("default", "coffee"),
        minion_hosts: vec!["cafe.example.com".to_string(), "tea.example.com".to_string()],
        master_hosts: vec![],
    };
    assert_eq!(
        affected_resources(&*test.index.read(), &test.admission, &change),
        ids(&["cafe", "coffee", "tea"])
    );
}

#[test]
fn master_change_resyncs_minions() {
    let test = TestConfig::default();
    test.index
        .write()
        .apply(mk_minion("default", "coffee", "cafe.example.com", &["/coffee"]));
    test.index
        .write()
        .apply(mk_minion("default", "tea", "cafe.example.com", &["/tea"]));
    test.index
        .write()
        .apply(mk_master("default", "cafe", "cafe.example.com"));

    let change = Change::RoutingResource {
        id: ResourceId::new("default", "cafe"),
        minion_hosts: vec![],
        master_hosts: vec!["cafe.example.com".to_string()],
    };
    assert_eq!(
        affected_resources(&*test.index.read(), &test.admission, &change),
        ids(&["cafe", "coffee", "tea"])
    );
}

#[test]
fn deleted_resource_is_affected() {
    let test = TestConfig::default();
    let change = Change::RoutingResource {
        id: ResourceId::new("default", "gone"),
        minion_hosts: vec![],
        master_hosts: vec![],
    };
    assert_eq!(
        affected_resources(&*test.index.read(), &test.admission, &change),
        ids(&["gone"])
    );
}

#[test]
fn deleted_master_resyncs_minions_and_next_master() {
    let test = TestConfig::default();
    let mut rx = test.index.write().subscribe();
    test.index
        .write()
        .apply(mk_master("default", "cafe", "cafe.example.com"));
    test.index
        .write()
        .apply(mk_master("default", "cafe2", "cafe.example.com"));
    test.index
        .write()
        .apply(mk_minion("default", "coffee", "cafe.example.com", &["/coffee"]));
    while rx.try_recv().is_ok() {}

    <crate::Index as IndexNamespacedResource<k8s::Ingress>>::delete(
        &mut test.index.write(),
        "default".to_string(),
        "cafe".to_string(),
    );
    let change = rx.try_recv().expect("delete must be published");
    assert_eq!(
        change,
        Change::RoutingResource {
            id: ResourceId::new("default", "cafe"),
            minion_hosts: vec![],
            master_hosts: vec!["cafe.example.com".to_string()],
        }
    );
    assert_eq!(
        affected_resources(&*test.index.read(), &test.admission, &change),
        ids(&["cafe", "cafe2", "coffee"])
    );
}

#[test]
fn moved_master_resyncs_both_hosts() {
    let test = TestConfig::default();
    let mut rx = test.index.write().subscribe();
    test.index
        .write()
        .apply(mk_master("default", "cafe", "cafe.example.com"));
    test.index
        .write()
        .apply(mk_minion("default", "coffee", "cafe.example.com", &["/coffee"]));
    test.index
        .write()
        .apply(mk_minion("default", "tea", "tea.example.com", &["/tea"]));
    while rx.try_recv().is_ok() {}

    test.index
        .write()
        .apply(mk_master("default", "cafe", "tea.example.com"));
    let change = rx.try_recv().expect("update must be published");
    assert_eq!(
        change,
        Change::RoutingResource {
            id: ResourceId::new("default", "cafe"),
            minion_hosts: vec![],
            master_hosts: vec!["cafe.example.com".to_string(), "tea.example.com".to_string()],
        }
    );
    assert_eq!(
        affected_resources(&*test.index.read(), &test.admission, &change),
        ids(&["cafe", "coffee", "tea"])
    );
}

#[test]
fn demoted_master_resyncs_minions() {
    let test = TestConfig::default();
    let mut rx = test.index.write().subscribe();
    test.index
        .write()
        .apply(mk_master("default", "cafe", "cafe.example.com"));
    test.index
        .write()
        .apply(mk_minion("default", "coffee", "cafe.example.com", &["/coffee"]));
    while rx.try_recv().is_ok() {}

    test.index
        .write()
        .apply(mk_ingress("default", "cafe", "cafe.example.com", None));
    let change = rx.try_recv().expect("update must be published");
    assert_eq!(
        affected_resources(&*test.index.read(), &test.admission, &change),
        ids(&["cafe", "coffee"])
    );
}

#[test]
fn service_and_pod_changes() {
    let test = TestConfig::default();
    test.index.write().apply(mk_ingress(
        "default",
        "cafe",
        "cafe.example.com",
        Some(vec![mk_path("/coffee", "coffee-svc", 80)]),
    ));
    test.index.write().apply(mk_ingress(
        "default",
        "tea",
        "tea.example.com",
        Some(vec![mk_path("/tea", "tea-svc", 80)]),
    ));
    test.index.write().apply(mk_service(
        "default",
        "coffee-svc",
        [("app", "coffee")],
        vec![mk_service_port(None, 80, None)],
    ));
    test.index.write().apply(mk_service(
        "default",
        "tea-svc",
        [("app", "tea")],
        vec![mk_service_port(None, 80, None)],
    ));

    let index = test.index.read();
    assert_eq!(
        affected_resources(
            &*index,
            &test.admission,
            &Change::Service(ResourceId::new("default", "coffee-svc"))
        ),
        ids(&["cafe"])
    );

    // A relabeled pod affects the services that selected it before and after.
    let relabeled = Change::Pod {
        id: ResourceId::new("default", "pod-0"),
        labels: vec![
            Labels::from_iter(Some(("app", "coffee"))),
            Labels::from_iter(Some(("app", "tea"))),
        ],
    };
    assert_eq!(
        affected_resources(&*index, &test.admission, &relabeled),
        ids(&["cafe", "tea"])
    );

    let unselected = Change::Pod {
        id: ResourceId::new("default", "pod-1"),
        labels: vec![Labels::from_iter(Some(("app", "juice")))],
    };
    assert!(affected_resources(&*index, &test.admission, &unselected).is_empty());
}

#[test]
fn secret_change() {
    let test = TestConfig::default();
    test.index.write().apply(with_tls(
        mk_ingress("default", "cafe", "cafe.example.com", Some(vec![])),
        "cafe-tls",
    ));
    test.index.write().apply(mk_secret(
        "default",
        "cafe-tls",
        Secret::TLS_TYPE,
        &["tls.crt", "tls.key"],
    ));

    assert_eq!(
        affected_resources(
            &*test.index.read(),
            &test.admission,
            &Change::Secret(ResourceId::new("default", "cafe-tls"))
        ),
        ids(&["cafe"])
    );
}
