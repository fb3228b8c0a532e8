/// Shared best-effort cache invalidation
///
/// Both services invalidate derived cache entries after writes through
/// these helpers rather than duplicating the swallow-and-log pattern.
/// Invalidation is delete-based (the next read recomputes), deletions for
/// multiple users are issued concurrently, and failures are already
/// swallowed inside the cache client.
///
/// No ordering is guaranteed relative to concurrent reads: a read racing a
/// write may observe either the pre- or post-write aggregate, bounded by
/// the 60 second TTL.

use futures::future;
use uuid::Uuid;

use super::client::Cache;
use super::keys;

/// Deduplicates user IDs, preserving first-occurrence order
fn unique_users(user_ids: &[Uuid]) -> Vec<Uuid> {
    let mut unique = Vec::with_capacity(user_ids.len());
    for id in user_ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}

/// Invalidates the cached project list of every given user
pub async fn project_lists(cache: &Cache, user_ids: &[Uuid]) {
    let deletes = unique_users(user_ids)
        .into_iter()
        .map(|uid| {
            let key = keys::project_list(uid);
            async move { cache.delete(&key).await }
        })
        .collect::<Vec<_>>();

    future::join_all(deletes).await;
}

/// Invalidates the cached task stats of every given user for one project
///
/// The caller passes whichever identities a write touched (actor,
/// assignees, creator); duplicates are filtered here.
pub async fn task_stats(cache: &Cache, project_id: Uuid, user_ids: &[Uuid]) {
    let deletes = unique_users(user_ids)
        .into_iter()
        .map(|uid| {
            let key = keys::task_stats(project_id, uid);
            async move { cache.delete(&key).await }
        })
        .collect::<Vec<_>>();

    future::join_all(deletes).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_users_filters_duplicates() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert_eq!(unique_users(&[a, b, a, a, b]), vec![a, b]);
        assert!(unique_users(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_invalidation_with_disabled_cache_is_noop() {
        let cache = Cache::disabled();
        let project = Uuid::new_v4();
        let users = [Uuid::new_v4(), Uuid::new_v4()];

        // Must complete without error even with no cache behind it
        project_lists(&cache, &users).await;
        task_stats(&cache, project, &users).await;
    }
}
