use serde_json::Value;

use super::{normalize_job, AdzunaJob, DisplayName, ExternalJobsResponse, ResultSource};

/// Total the demo payload advertises; only the first two postings are listed.
pub const DEMO_TOTAL_COUNT: u64 = 5;

fn display(name: &str) -> Option<DisplayName> {
    Some(DisplayName {
        display_name: Some(name.to_string()),
    })
}

/// Fixed results served when external credentials are not configured.
pub fn demo_response(page: u32) -> ExternalJobsResponse {
    let postings = vec![
        AdzunaJob {
            id: Some(Value::String("demo-1".to_string())),
            title: Some("Software Engineer - Graduate Trainee".to_string()),
            description: Some(
                "Join the platform team building internal developer tooling. \
                 Open to final-year B.Tech students."
                    .to_string(),
            ),
            redirect_url: Some("https://example.com/jobs/demo-1".to_string()),
            created: Some("2026-01-15T09:00:00Z".to_string()),
            company: display("TechCorp Solutions"),
            location: display("Bengaluru, Karnataka"),
            salary_min: Some(600000.0),
            salary_max: Some(900000.0),
            contract_time: Some("full_time".to_string()),
        },
        AdzunaJob {
            id: Some(Value::String("demo-2".to_string())),
            title: Some("Data Analyst Intern".to_string()),
            description: Some(
                "Six-month internship analysing product usage data with SQL and Python."
                    .to_string(),
            ),
            redirect_url: Some("https://example.com/jobs/demo-2".to_string()),
            created: Some("2026-01-20T09:00:00Z".to_string()),
            company: display("DataWorks Analytics"),
            location: display("Hyderabad, Telangana"),
            salary_min: None,
            salary_max: None,
            contract_time: Some("contract".to_string()),
        },
    ];

    ExternalJobsResponse {
        count: DEMO_TOTAL_COUNT,
        page,
        source: ResultSource::Demo,
        results: postings.into_iter().map(normalize_job).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_payload_shape() {
        let response = demo_response(1);
        assert_eq!(response.count, 5);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].company, "TechCorp Solutions");
        assert_eq!(response.results[0].salary, "600000 - 900000");
        assert_eq!(response.results[1].salary, "Not disclosed");
    }
}
