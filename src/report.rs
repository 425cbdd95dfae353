use std::path::Path;

use crate::error::SyncError;

/// Terminal state of one remote file.
#[derive(Debug)]
pub enum SyncStatus {
    New,
    Updated,
    Unchanged,
    Failed(SyncError),
}

#[derive(Debug)]
pub struct FileOutcome {
    pub name: String,
    pub status: SyncStatus,
}

/// File names per category, in processing order.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub new: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub failed: Vec<String>,
}

impl SyncReport {
    /// Fold per-file outcomes into the four category lists.
    pub fn from_outcomes(outcomes: &[FileOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut report, outcome| {
            let bucket = match outcome.status {
                SyncStatus::New => &mut report.new,
                SyncStatus::Updated => &mut report.updated,
                SyncStatus::Unchanged => &mut report.unchanged,
                SyncStatus::Failed(_) => &mut report.failed,
            };
            bucket.push(outcome.name.clone());
            report
        })
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Closing summary. `backup_dir` is the run's backup directory if at
    /// least one pre-overwrite copy was made.
    pub fn print_summary(&self, backup_dir: Option<&Path>) {
        println!();
        println!("=== Update Completed ===");
        println!("New files: {}", self.new.len());
        for name in &self.new {
            println!("  + {name}");
        }

        println!();
        println!("Updated: {}", self.updated.len());
        for name in &self.updated {
            println!("  ↻ {name}");
        }

        println!();
        println!("Unchanged: {}", self.unchanged.len());

        if !self.failed.is_empty() {
            println!();
            println!("Failed: {}", self.failed.len());
            for name in &self.failed {
                println!("  ✗ {name}");
            }
        }

        println!();
        match backup_dir {
            Some(dir) => println!("Backup location: {}", dir.display()),
            None => println!("(No backup created since there were no changes)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn outcome(name: &str, status: SyncStatus) -> FileOutcome {
        FileOutcome {
            name: name.to_string(),
            status,
        }
    }

    #[test]
    fn outcomes_fold_into_categories_in_order() {
        let outcomes = vec![
            outcome("b.cpp", SyncStatus::Updated),
            outcome("a.hpp", SyncStatus::Unchanged),
            outcome("c.cpp", SyncStatus::New),
            outcome(
                "d.cpp",
                SyncStatus::Failed(SyncError::Network(String::from("timed out"))),
            ),
            outcome("e.hpp", SyncStatus::New),
        ];
        let report = SyncReport::from_outcomes(&outcomes);
        assert_eq!(report.new, vec!["c.cpp", "e.hpp"]);
        assert_eq!(report.updated, vec!["b.cpp"]);
        assert_eq!(report.unchanged, vec!["a.hpp"]);
        assert_eq!(report.failed, vec!["d.cpp"]);
        assert!(report.has_failures());
    }

    #[test]
    fn empty_outcomes_have_no_failures() {
        let report = SyncReport::from_outcomes(&[]);
        assert!(!report.has_failures());
    }
}
