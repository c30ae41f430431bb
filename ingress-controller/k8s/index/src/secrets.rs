use crate::{admission::Admission, error::SecretError};
use ingress_controller_core::{ResourceId, Secret, SnapshotStore};
use ingress_controller_k8s_api::{self as k8s, ResourceExt};
use std::collections::BTreeSet;

pub(crate) fn secret(secret: k8s::Secret) -> Secret {
    let id = ResourceId::new(
        secret.namespace().expect("Secret must have a namespace"),
        secret.name_unchecked(),
    );
    let keys = secret
        .data
        .into_iter()
        .flat_map(|d| d.into_keys())
        .chain(secret.string_data.into_iter().flat_map(|d| d.into_keys()))
        .collect();

    Secret {
        id,
        type_: secret.type_,
        keys,
    }
}

/// Finds the owned routing resources in `namespace` that reference the named secret, either
/// through a TLS binding or through the JWT key annotation.
///
/// Minions are matched on their own annotations and reported by their own identity; mapping them
/// to their master is left to the caller.
pub fn find_resources_referencing_secret<S: SnapshotStore>(
    store: &S,
    admission: &Admission,
    namespace: &str,
    name: &str,
) -> BTreeSet<ResourceId> {
    store
        .routing_resources_in(namespace)
        .into_iter()
        .filter(|r| admission.owns(r))
        .filter(|r| r.references_secret(name))
        .map(|r| r.id.clone())
        .collect()
}

pub fn validate_tls_secret<S: SnapshotStore>(
    store: &S,
    namespace: &str,
    name: &str,
) -> Result<(), SecretError> {
    let secret = lookup(store, namespace, name)?;
    check_type(&secret, Secret::TLS_TYPE)?;
    check_key(&secret, Secret::TLS_CERT_KEY)?;
    check_key(&secret, Secret::TLS_PRIVATE_KEY_KEY)
}

pub fn validate_jwk_secret<S: SnapshotStore>(
    store: &S,
    namespace: &str,
    name: &str,
) -> Result<(), SecretError> {
    let secret = lookup(store, namespace, name)?;
    check_type(&secret, Secret::JWK_TYPE)?;
    check_key(&secret, Secret::JWK_KEY)
}

fn lookup<S: SnapshotStore>(
    store: &S,
    namespace: &str,
    name: &str,
) -> Result<std::sync::Arc<Secret>, SecretError> {
    store
        .secret(namespace, name)
        .ok_or_else(|| SecretError::NotFound(ResourceId::new(namespace, name)))
}

fn check_type(secret: &Secret, expected: &'static str) -> Result<(), SecretError> {
    if secret.type_.as_deref() != Some(expected) {
        return Err(SecretError::InvalidType {
            secret: secret.id.clone(),
            expected,
            actual: secret.type_.clone(),
        });
    }
    Ok(())
}

fn check_key(secret: &Secret, key: &'static str) -> Result<(), SecretError> {
    if !secret.has_key(key) {
        return Err(SecretError::MissingKey {
            secret: secret.id.clone(),
            key,
        });
    }
    Ok(())
}
