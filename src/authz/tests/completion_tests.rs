//! Integration tests for the domain completion map and listings

mod common;

use common::*;
use rolematrix_authz::DomainExport;
use rolematrix_core::{Division, DivisionType, PolicyEngine};

fn policy() -> Vec<rolematrix_core::PolicyTuple> {
    vec![
        tuple(&["role:root:0", "dom:Company", "news", "read"]),
        tuple(&["role:organiser:1", "dom:Company", "exhibition", "all_limited"]),
        tuple(&["role:organiser:1", "dom:marketing", "news", "all"]),
        tuple(&["role:organiser:1", "dom:marketing", "news", "delete", "deny"]),
        tuple(&["role:member:2", "dom:marketing", "news_tag", "read"]),
        tuple(&["role:guest:0", "dom:Guest", "request_form", "create"]),
        tuple(&["user:ian", "dom:marketing", "account", "all"]),
    ]
}

#[test]
fn test_completion_matches_role_resolution() {
    let resolver = default_resolver();
    let tuples = policy();

    let completion = resolver.complete_all(&tuples).unwrap();
    assert_eq!(completion.len(), 3);
    assert_eq!(completion.role_count(), 5);

    for (domain, role, matrix) in completion.iter() {
        let direct = resolver.resolve_role(role, domain, &tuples).unwrap();
        assert_eq!(matrix, &direct, "{} in {}", role, domain);
        assert_eq!(matrix.len(), 56);
    }
}

#[test]
fn test_completion_content() {
    let completion = default_resolver().complete_all(&policy()).unwrap();

    let organiser = completion
        .get(&dom("dom:marketing"), &role("role:organiser:1"))
        .unwrap();
    assert_eq!(organiser.allowed("news", "update"), Some(true));
    assert_eq!(organiser.allowed("news", "delete"), Some(false));
    assert_eq!(organiser.allowed("news", "delete_limited"), Some(false));
    // the user row never reaches any role
    assert_eq!(organiser.allowed("account", "read"), Some(false));

    let company_organiser = completion
        .get(&dom("dom:Company"), &role("role:organiser:1"))
        .unwrap();
    assert_eq!(company_organiser.allowed("exhibition", "read"), Some(true));
    assert_eq!(company_organiser.allowed("exhibition", "create"), Some(false));
    assert_eq!(company_organiser.allowed("exhibition", "create_limited"), Some(true));

    let guest = completion.get(&dom("dom:Guest"), &role("role:guest:0")).unwrap();
    assert_eq!(guest.allowed_count(), 2);

    assert!(completion
        .get(&dom("dom:Company"), &role("role:root:0"))
        .unwrap()
        .is_all_allow());
    assert!(completion.get(&dom("dom:marketing"), &role("role:root:0")).is_none());
}

#[test]
fn test_completion_export_round_trip() {
    let completion = default_resolver().complete_all(&policy()).unwrap();

    let json = serde_json::to_string(&completion).unwrap();
    let export: Vec<DomainExport> = serde_json::from_str(&json).unwrap();

    assert_eq!(export, completion.to_export());
    let company = &export[0];
    assert_eq!(company.domain, "dom:Company");
    let levels: Vec<_> = company.roles.iter().map(|r| r.level).collect();
    assert_eq!(levels, vec![0, 1]);
}

#[test]
fn test_empty_policy_completion() {
    let completion = default_resolver().complete_all(&[]).unwrap();
    assert!(completion.is_empty());
    assert_eq!(completion.to_export().len(), 0);
}

#[test]
fn test_listings_follow_engine_snapshot() {
    let resolver = default_resolver();
    let tuples = policy();
    let ian = user(
        "user:ian",
        &[("role:organiser:1", "dom:marketing"), ("role:member:2", "dom:marketing")],
    );
    let engine = engine_for(&tuples, std::slice::from_ref(&ian));
    assert_eq!(engine.raw_policy().unwrap().len(), tuples.len());

    let users = resolver.list_users(&engine, std::slice::from_ref(&ian)).unwrap();
    let news_tag = users[0]
        .permissions
        .iter()
        .find(|r| r.object == "news_tag")
        .unwrap();
    assert_eq!(news_tag.allowed_actions().collect::<Vec<_>>(), vec!["read"]);
    // direct user grants in the user's domains are merged too
    let account = users[0]
        .permissions
        .iter()
        .find(|r| r.object == "account")
        .unwrap();
    assert_eq!(account.allowed_actions().count(), 7);

    let divisions = vec![
        Division::new(dom("dom:marketing"), DivisionType::Division)
            .with_role("organiser", 1)
            .with_role("member", 2),
        Division::new(dom("dom:Guest"), DivisionType::Guest).with_role("guest", 0),
    ];
    let listed = resolver.list_divisions(&engine, &divisions).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[1].kind, DivisionType::Guest);

    let flat = resolver.list_division_roles(&engine, &divisions).unwrap();
    assert_eq!(flat.len(), 3);
    assert_eq!(flat[2].role, role("role:guest:0"));
    assert_eq!(flat[0].permissions, listed[0].roles[0].permissions);
}
