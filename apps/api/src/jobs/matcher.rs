use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::job::Job;

/// The (CGPA, branch, academic year) a student is matched on.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EligibilityCriteria {
    pub cgpa: f64,
    pub branch: String,
    pub year: i16,
}

impl EligibilityCriteria {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = Vec::new();
        if !(0.0..=10.0).contains(&self.cgpa) {
            errors.push("cgpa must be between 0 and 10");
        }
        if self.branch.trim().is_empty() {
            errors.push("branch is required");
        }
        if !(1..=5).contains(&self.year) {
            errors.push("year must be between 1 and 5");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors.join("; ")))
        }
    }
}

/// A job matches when it is open and the student clears every threshold.
/// An empty `allowed_branches` list means any branch may apply.
pub fn is_eligible(job: &Job, criteria: &EligibilityCriteria, now: DateTime<Utc>) -> bool {
    if !job.is_active || job.application_deadline < now {
        return false;
    }
    if job.min_cgpa > criteria.cgpa {
        return false;
    }
    let branch = criteria.branch.trim();
    let branch_allowed = job.allowed_branches.is_empty()
        || job
            .allowed_branches
            .iter()
            .any(|b| b.trim().eq_ignore_ascii_case(branch));
    branch_allowed && job.academic_year.contains(&criteria.year)
}

pub fn filter_eligible(
    jobs: Vec<Job>,
    criteria: &EligibilityCriteria,
    now: DateTime<Utc>,
) -> Vec<Job> {
    jobs.into_iter()
        .filter(|job| is_eligible(job, criteria, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn job(min_cgpa: f64, branches: &[&str], years: &[i16], deadline_in_days: i64) -> Job {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4(),
            title: "Graduate Engineer".into(),
            company: "Acme".into(),
            description: None,
            location: None,
            salary: None,
            job_type: None,
            min_cgpa,
            allowed_branches: branches.iter().map(|b| b.to_string()).collect(),
            academic_year: years.to_vec(),
            application_deadline: now + Duration::days(deadline_in_days),
            is_active: true,
            institution_id: None,
            posted_by: None,
            created_at: now,
            applications_count: 0,
        }
    }

    fn student(cgpa: f64, branch: &str, year: i16) -> EligibilityCriteria {
        EligibilityCriteria {
            cgpa,
            branch: branch.into(),
            year,
        }
    }

    #[test]
    fn test_cgpa_threshold_is_inclusive() {
        let j = job(7.5, &[], &[4], 5);
        assert!(is_eligible(&j, &student(7.5, "CSE", 4), Utc::now()));
        assert!(!is_eligible(&j, &student(7.49, "CSE", 4), Utc::now()));
    }

    #[test]
    fn test_empty_branch_list_is_unrestricted() {
        let j = job(0.0, &[], &[3], 5);
        assert!(is_eligible(&j, &student(6.0, "Mechanical", 3), Utc::now()));
    }

    #[test]
    fn test_branch_must_be_listed() {
        let j = job(0.0, &["CSE", "IT"], &[4], 5);
        assert!(is_eligible(&j, &student(6.0, "it", 4), Utc::now()));
        assert!(!is_eligible(&j, &student(6.0, "ECE", 4), Utc::now()));
    }

    #[test]
    fn test_academic_year_must_match() {
        let j = job(0.0, &[], &[3, 4], 5);
        assert!(!is_eligible(&j, &student(9.0, "CSE", 2), Utc::now()));
    }

    #[test]
    fn test_inactive_job_excluded() {
        let mut j = job(0.0, &[], &[4], 5);
        j.is_active = false;
        assert!(!is_eligible(&j, &student(9.0, "CSE", 4), Utc::now()));
    }

    #[test]
    fn test_passed_deadline_excluded_for_every_student() {
        let j = job(0.0, &[], &[1, 2, 3, 4, 5], -1);
        for year in 1..=5 {
            for cgpa in [0.0, 5.0, 10.0] {
                assert!(!is_eligible(&j, &student(cgpa, "CSE", year), Utc::now()));
            }
        }
    }

    #[test]
    fn test_filter_keeps_only_matches() {
        let jobs = vec![
            job(6.0, &["CSE"], &[4], 3),
            job(9.5, &["CSE"], &[4], 3),
            job(6.0, &["ECE"], &[4], 3),
            job(6.0, &["CSE"], &[4], -3),
        ];
        let keep_id = jobs[0].id;
        let eligible = filter_eligible(jobs, &student(8.0, "CSE", 4), Utc::now());
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, keep_id);
    }

    #[test]
    fn test_criteria_validation() {
        assert!(student(8.0, "CSE", 4).validate().is_ok());
        assert!(student(12.0, " ", 0).validate().is_err());
    }
}
