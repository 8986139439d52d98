//! Split descriptors into the ones that already exist and the ones to create.

use std::future::Future;

use crate::error::Result;

/// Partition `entities` by `has_index`, creating the missing ones in order.
///
/// `create` receives each entity without an index and returns it with the
/// index of the freshly created object. Returns `(found, created)`, both in
/// the relative order of `entities`. The first creation error aborts the call.
pub async fn reconcile<T, P, F, Fut>(
    entities: Vec<T>,
    has_index: P,
    mut create: F,
) -> Result<(Vec<T>, Vec<T>)>
where
    P: Fn(&T) -> bool,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let (found, missing): (Vec<T>, Vec<T>) = entities.into_iter().partition(|e| has_index(e));

    let mut created = Vec::with_capacity(missing.len());
    for entity in missing {
        created.push(create(entity).await?);
    }

    Ok((found, created))
}
