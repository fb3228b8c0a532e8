/// Cache key builders
///
/// Two derived entries exist, both pure performance shortcuts with a 60
/// second TTL: a user's project list and a per-(project, user) task
/// statistics payload. Losing either never loses correctness.

use uuid::Uuid;

/// TTL for all cached aggregates, in seconds
pub const CACHE_TTL_SECS: u64 = 60;

/// Key for a user's cached project list
pub fn project_list(user_id: Uuid) -> String {
    format!("projects:{}", user_id)
}

/// Key for a (project, user) cached task-status histogram
pub fn task_stats(project_id: Uuid, user_id: Uuid) -> String {
    format!("stats:{}:{}", project_id, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats() {
        let user = Uuid::new_v4();
        let project = Uuid::new_v4();

        assert_eq!(project_list(user), format!("projects:{}", user));
        assert_eq!(
            task_stats(project, user),
            format!("stats:{}:{}", project, user)
        );
    }
}
