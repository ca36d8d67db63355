//! Hierarchy-aware wrappers around `show_by_id` and `drop`.
//!
//! The warehouse answers "does not exist or not authorized" whether the
//! object, its schema or its database is missing. These wrappers probe the
//! ancestors of the identifier, innermost first, to find out which level is
//! actually gone.

use std::future::Future;

use snowddl_core::{Ancestor, Error, ErrorKind, ObjectIdentifier, Result};
use tracing::{debug, info};

use crate::client::Client;
use crate::context::Context;
use crate::driver::Driver;

/// Outcome of an ancestor walk.
struct Walk {
    errors: Vec<Error>,
    ancestor_missing: bool,
}

async fn walk_ancestors<D: Driver>(
    client: &Client<D>,
    ctx: &Context,
    id: &impl ObjectIdentifier,
    original: Error,
) -> Walk {
    let mut errors = vec![original];
    for ancestor in id.ancestors() {
        let probe = match &ancestor {
            Ancestor::Schema(schema) => client.schemas().show_by_id(ctx, schema).await.map(|_| ()),
            Ancestor::Database(database) => {
                client.databases().show_by_id(ctx, database).await.map(|_| ())
            }
        };
        match probe {
            Ok(()) => debug!(ancestor = ?ancestor, "Ancestor exists"),
            Err(err) if err.is(ErrorKind::ObjectNotFound) => {
                info!(id = %id, ancestor = ?ancestor, "Ancestor does not exist");
                errors.push(err);
                return Walk {
                    errors,
                    ancestor_missing: true,
                };
            }
            Err(err) => errors.push(err),
        }
    }
    Walk {
        errors,
        ancestor_missing: false,
    }
}

fn joined(errors: Vec<Error>) -> Error {
    // `errors` always starts with the original error.
    Error::join(errors).unwrap_or(Error::Joined(Vec::new()))
}

/// Calls `show_by_id`, explaining ambiguous "does not exist" errors.
///
/// `ObjectNotFound` is returned unchanged. For the two ambiguous kinds the
/// ancestors of `id` are looked up (schema, then database) and every error
/// collected on the way is joined to the original one. The walk stops at
/// the first ancestor that does not exist. Account-level identifiers have
/// no ancestors, so their error comes back as is.
pub async fn safe_show_by_id<D, I, T, F, Fut>(
    client: &Client<D>,
    ctx: &Context,
    id: &I,
    show_by_id: F,
) -> Result<T>
where
    D: Driver,
    I: ObjectIdentifier,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match show_by_id().await {
        Ok(object) => Ok(object),
        Err(err) if err.kind() == ErrorKind::ObjectNotFound => Err(err),
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::ObjectNotExistOrAuthorized
                    | ErrorKind::DoesNotExistOrOperationCannotBePerformed
            ) =>
        {
            let walk = walk_ancestors(client, ctx, id, err).await;
            Err(joined(walk.errors))
        }
        Err(err) => Err(err),
    }
}

/// Calls `drop`, treating a missing ancestor as success.
///
/// When the drop fails with "does not exist or not authorized" the
/// ancestors of `id` are probed; if one of them is confirmed missing the
/// object is gone too and `Ok(())` is returned. Otherwise the original error
/// is returned, joined with whatever the probes reported.
pub async fn safe_drop<D, I, F, Fut>(
    client: &Client<D>,
    ctx: &Context,
    id: &I,
    drop: F,
) -> Result<()>
where
    D: Driver,
    I: ObjectIdentifier,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    match drop().await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::ObjectNotExistOrAuthorized => {
            let walk = walk_ancestors(client, ctx, id, err).await;
            if walk.ancestor_missing {
                info!(id = %id, "Drop skipped: ancestor already gone");
                Ok(())
            } else {
                Err(joined(walk.errors))
            }
        }
        Err(err) => Err(err),
    }
}
