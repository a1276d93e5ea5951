use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use super::types::Job;

/// Immutable point-in-time view of every job the engine knows about.
///
/// Keeps the job tree exactly as the server returned it and a depth-first
/// index keyed by full job name. The first job seen under a name owns it;
/// later duplicates stay in the tree but are not indexed.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    captured_at: DateTime<Utc>,
    jobs: Vec<Job>,
    #[serde(skip)]
    order: Vec<Vec<usize>>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl StateSnapshot {
    pub fn new(roots: Vec<Job>, captured_at: DateTime<Utc>) -> Self {
        let mut order = Vec::new();
        let mut by_name = HashMap::new();
        let mut path = Vec::new();
        for (i, job) in roots.iter().enumerate() {
            path.push(i);
            index_job(job, &mut path, &mut order, &mut by_name);
            path.pop();
        }

        Self {
            captured_at,
            jobs: roots,
            order,
            by_name,
        }
    }

    /// Snapshot stamped with the current time.
    pub fn now(roots: Vec<Job>) -> Self {
        Self::new(roots, Utc::now())
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Top-level jobs in server order, children nested.
    pub fn roots(&self) -> &[Job] {
        &self.jobs
    }

    /// Every indexed job, folders included, depth-first in server order.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> + '_ {
        self.order.iter().map(|path| self.resolve(path))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.jobs().map(|job| job.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Job> {
        self.by_name
            .get(name)
            .map(|&position| self.resolve(&self.order[position]))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of jobs whose latest build failed.
    pub fn broken_count(&self) -> usize {
        self.jobs().filter(|job| job.is_broken()).count()
    }

    fn resolve(&self, path: &[usize]) -> &Job {
        let mut job = &self.jobs[path[0]];
        for &child in &path[1..] {
            job = &job.children[child];
        }
        job
    }
}

fn index_job(
    job: &Job,
    path: &mut Vec<usize>,
    order: &mut Vec<Vec<usize>>,
    by_name: &mut HashMap<String, usize>,
) {
    if by_name.contains_key(&job.name) {
        warn!(
            event = "core.snapshot.duplicate_job_ignored",
            job = %job.name,
            "Job name already indexed; keeping the first occurrence"
        );
    } else {
        by_name.insert(job.name.clone(), order.len());
        order.push(path.clone());
    }

    for (i, child) in job.children.iter().enumerate() {
        path.push(i);
        index_job(child, path, order, by_name);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{Build, BuildResult};

    fn job(name: &str, result: Option<BuildResult>) -> Job {
        let job = Job::new(name, format!("https://ci/job/{}/", name));
        match result {
            Some(r) => job.with_last_build(Build::new(1, r, format!("https://ci/job/{}/1/", name))),
            None => job,
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = StateSnapshot::now(Vec::new());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len(), 0);
        assert_eq!(snapshot.broken_count(), 0);
    }

    #[test]
    fn test_flattens_folders_depth_first() {
        let folder = job("platform", None).with_children(vec![
            job("platform/api", Some(BuildResult::Success)),
            job("platform/web", Some(BuildResult::Failure)),
        ]);
        let snapshot = StateSnapshot::now(vec![
            job("alpha", Some(BuildResult::Success)),
            folder,
            job("zeta", Some(BuildResult::Failure)),
        ]);

        let names: Vec<&str> = snapshot.names().collect();
        assert_eq!(
            names,
            vec!["alpha", "platform", "platform/api", "platform/web", "zeta"]
        );
        assert_eq!(snapshot.roots().len(), 3);
        assert_eq!(snapshot.len(), 5);
        assert_eq!(
            snapshot.get("platform/web").unwrap().last_result(),
            Some(BuildResult::Failure)
        );
        assert!(snapshot.contains("platform"));
        assert!(!snapshot.contains("web"));
    }

    #[test]
    fn test_broken_count() {
        let snapshot = StateSnapshot::now(vec![
            job("a", Some(BuildResult::Failure)),
            job("b", Some(BuildResult::Unstable)),
            job("c", Some(BuildResult::Failure)),
            job("d", None),
        ]);
        assert_eq!(snapshot.broken_count(), 2);
    }

    #[test]
    fn test_duplicate_name_first_wins() {
        let snapshot = StateSnapshot::now(vec![
            job("api", Some(BuildResult::Success)),
            job("api", Some(BuildResult::Failure)),
        ]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.get("api").unwrap().last_result(),
            Some(BuildResult::Success)
        );
        assert_eq!(snapshot.roots().len(), 2);
    }

    #[test]
    fn test_serializes_tree_only() {
        let snapshot = StateSnapshot::now(vec![job("api", Some(BuildResult::Success))]);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("captured_at").is_some());
        assert_eq!(json["jobs"][0]["name"], "api");
        assert!(json.get("order").is_none());
        assert!(json.get("by_name").is_none());
    }
}
