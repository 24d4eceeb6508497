//! Tag index and filter queries.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use metrology_core::{Instrument, TagSet};
use metrology_registry::instruments::{Counter, Meter};
use metrology_registry::Registry;

fn tags(pairs: &[(&str, &str)]) -> TagSet {
    pairs.iter().copied().collect()
}

fn same(a: &Arc<dyn Instrument>, b: &Arc<impl Instrument>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

#[test]
fn filter_returns_remaining_tags() {
    let reg = Registry::new();
    let m = reg.meter(tags(&[("env", "prod"), ("host", "a")])).unwrap();

    let hits: Vec<_> = reg.filter(&tags(&[("env", "prod")])).collect();
    assert_eq!(hits.len(), 1);
    assert!(same(&hits[0].0, &m));
    assert_eq!(hits[0].1, tags(&[("host", "a")]));

    assert_eq!(reg.filter(&tags(&[("env", "dev")])).count(), 0);
}

#[test]
fn multi_tag_filter_intersects() {
    let reg = Registry::new();
    let first = reg.counter(tags(&[("env", "prod"), ("host", "a")])).unwrap();
    reg.counter(tags(&[("env", "prod"), ("host", "b")])).unwrap();
    reg.counter(tags(&[("env", "dev"), ("host", "a")])).unwrap();

    let hits: Vec<_> = reg.filter(&tags(&[("env", "prod"), ("host", "a")])).collect();
    assert_eq!(hits.len(), 1);
    assert!(same(&hits[0].0, &first));
    assert!(hits[0].1.is_empty());

    let prod: Vec<_> = reg.filter(&tags(&[("env", "prod")])).collect();
    assert_eq!(prod.len(), 2);
    let mut hosts: Vec<String> = prod
        .iter()
        .map(|(_, rest)| rest.get("host").unwrap().to_string())
        .collect();
    hosts.sort();
    assert_eq!(hosts, vec!["a", "b"]);
}

#[test]
fn filter_with_unknown_pair_matches_nothing() {
    let reg = Registry::new();
    reg.counter(tags(&[("env", "prod"), ("host", "a")])).unwrap();
    assert_eq!(reg.filter(&tags(&[("env", "prod"), ("dc", "eu")])).count(), 0);
}

#[test]
fn empty_filter_matches_nothing() {
    let reg = Registry::new();
    reg.counter(tags(&[("env", "prod")])).unwrap();
    reg.counter("plain").unwrap();
    assert_eq!(reg.filter(&TagSet::new()).count(), 0);
}

#[test]
fn plain_names_are_never_indexed() {
    let reg = Registry::new();
    let c = reg.counter("requests").unwrap();
    let as_dyn: Arc<dyn Instrument> = c;
    assert!(reg.tags_of(&as_dyn).is_none());
}

#[test]
fn tag_order_does_not_create_new_entries() {
    let reg = Registry::new();
    let a = reg.counter(TagSet::new().with("host", "a").with("env", "prod")).unwrap();
    let b = reg.counter(TagSet::new().with("env", "prod").with("host", "a")).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.filter(&tags(&[("host", "a")])).count(), 1);
}

#[test]
fn install_reindexes_tags() {
    let reg = Registry::new();
    let key = tags(&[("env", "prod"), ("host", "a")]);
    let old = reg.meter(key.clone()).unwrap();
    let new = reg.install(key.clone(), Arc::new(Meter::new()));

    let hits: Vec<_> = reg.filter(&tags(&[("env", "prod")])).collect();
    assert_eq!(hits.len(), 1);
    assert!(same(&hits[0].0, &new));
    assert!(!same(&hits[0].0, &old));
    assert_eq!(hits[0].1, tags(&[("host", "a")]));

    let stored = reg.get(key).unwrap();
    assert!(same(&stored, &new));
    assert_eq!(reg.tags_of(&stored), Some(tags(&[("env", "prod"), ("host", "a")])));
}

#[test]
fn one_instance_under_two_tag_sets_keeps_latest_tags() {
    let reg = Registry::new();
    let shared = Arc::new(Counter::new());
    reg.add(tags(&[("env", "prod"), ("svc", "api")]), Arc::clone(&shared)).unwrap();
    reg.add(tags(&[("env", "prod"), ("svc", "web")]), Arc::clone(&shared)).unwrap();

    let hits: Vec<_> = reg.filter(&tags(&[("env", "prod")])).collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].1, tags(&[("svc", "web")]));
    assert_eq!(reg.len(), 2);
}

#[test]
fn replacing_one_of_two_shared_tag_sets_keeps_the_other_indexed() {
    let reg = Registry::new();
    let api = tags(&[("env", "prod"), ("svc", "api")]);
    let web = tags(&[("env", "prod"), ("svc", "web")]);
    let shared = Arc::new(Counter::new());
    reg.add(api.clone(), Arc::clone(&shared)).unwrap();
    reg.add(web.clone(), Arc::clone(&shared)).unwrap();

    let fresh = reg.install(web, Arc::new(Counter::new()));

    let survivor = reg.get(api).unwrap();
    assert!(same(&survivor, &shared));
    assert_eq!(reg.tags_of(&survivor), Some(tags(&[("env", "prod"), ("svc", "api")])));

    let hits: Vec<_> = reg.filter(&tags(&[("svc", "api")])).collect();
    assert_eq!(hits.len(), 1);
    assert!(same(&hits[0].0, &shared));
    assert_eq!(hits[0].1, tags(&[("env", "prod")]));

    let prod: Vec<_> = reg.filter(&tags(&[("env", "prod")])).collect();
    assert_eq!(prod.len(), 2);
    assert!(prod.iter().any(|(m, _)| same(m, &shared)));
    assert!(prod.iter().any(|(m, _)| same(m, &fresh)));

    let web_hits: Vec<_> = reg.filter(&tags(&[("svc", "web")])).collect();
    assert_eq!(web_hits.len(), 1);
    assert!(same(&web_hits[0].0, &fresh));
}

#[test]
fn replacing_the_first_of_two_shared_tag_sets_keeps_the_latest() {
    let reg = Registry::new();
    let api = tags(&[("env", "prod"), ("svc", "api")]);
    let web = tags(&[("env", "prod"), ("svc", "web")]);
    let shared = Arc::new(Counter::new());
    reg.add(api.clone(), Arc::clone(&shared)).unwrap();
    reg.add(web, Arc::clone(&shared)).unwrap();

    reg.install(api, Arc::new(Meter::new()));

    assert_eq!(reg.filter(&tags(&[("svc", "web")])).count(), 1);
    assert_eq!(reg.filter(&tags(&[("env", "prod")])).count(), 2);
    let api_hits: Vec<_> = reg.filter(&tags(&[("svc", "api")])).collect();
    assert_eq!(api_hits.len(), 1);
    assert!(!same(&api_hits[0].0, &shared));
}
