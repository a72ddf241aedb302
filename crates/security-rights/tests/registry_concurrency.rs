//! Concurrent registration and lookup against one registry.

use security_model::EntityKind;
use security_rights::{standard, RightDescription, RightRegistry, RuleState};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_assigns_unique_ordinals() {
    let registry = Arc::new(RightRegistry::new());

    let mut handles = Vec::new();
    for i in 0..32 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::task::spawn_blocking(move || {
            registry
                .define(&RightDescription::new(
                    format!("extension-{}", i),
                    RuleState::Deny,
                    RuleState::Deny,
                ))
                .unwrap()
        }));
    }

    let mut ordinals = Vec::new();
    for handle in handles {
        let right = handle.await.unwrap();
        ordinals.push(right.ordinal().unwrap());
    }
    ordinals.sort_unstable();

    let expected: Vec<usize> = (8..40).collect();
    assert_eq!(ordinals, expected);
    assert_eq!(registry.len(), 40);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_identical_registrations_share_one_right() {
    let registry = Arc::new(RightRegistry::new());
    let description = RightDescription::new("publish", RuleState::Deny, RuleState::Allow)
        .implies([standard::VIEW])
        .targets([EntityKind::Space]);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let registry = Arc::clone(&registry);
        let description = description.clone();
        handles.push(tokio::task::spawn_blocking(move || registry.define(&description).unwrap()));
    }

    let mut rights = Vec::new();
    for handle in handles {
        rights.push(handle.await.unwrap());
    }

    assert_eq!(registry.len(), 9);
    for right in &rights {
        assert!(right.same_as(&rights[0]));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_only_see_complete_rights() {
    let registry = Arc::new(RightRegistry::new());

    let writer = {
        let registry = Arc::clone(&registry);
        tokio::task::spawn_blocking(move || {
            for i in 0..40 {
                registry
                    .define(
                        &RightDescription::new(format!("late-{}", i), RuleState::Allow, RuleState::Deny)
                            .targets([EntityKind::Document]),
                    )
                    .unwrap();
            }
        })
    };

    let mut readers = Vec::new();
    for _ in 0..4 {
        let registry = Arc::clone(&registry);
        readers.push(tokio::task::spawn_blocking(move || {
            for _ in 0..500 {
                let snapshot = registry.snapshot();
                let documents = snapshot.enabled_rights_for(EntityKind::Document);
                for right in snapshot.rights() {
                    // every published right is fully indexed in its snapshot
                    assert!(snapshot.is_registered(right));
                    assert!(snapshot.all().contains(right));
                    if right.name().starts_with("late-") {
                        assert!(documents.contains(right));
                        assert!(snapshot.default_allowed().contains(right));
                    }
                }
            }
        }));
    }

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
    assert_eq!(registry.len(), 48);
}
