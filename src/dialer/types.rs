// src/dialer/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Templated fields read aloud by the call pathway. Batch calls identify
/// the caller by candidate id in `user_name`; direct applications carry the
/// applicant's phone number and experience as well.
#[derive(Debug, Clone, Serialize)]
pub struct CallScript {
    pub full_name: String,
    pub job_title: String,
    pub location: String,
    pub pay: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_experience: Option<String>,
}

/// Payload for placing an outbound call.
#[derive(Debug, Serialize)]
pub struct OutboundCall {
    pub phone_number: String,
    pub pathway_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    pub pronunciation_guide: serde_json::Value,
    pub wait_for_greeting: bool,
    pub noise_cancellation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
    pub request_data: CallScript,
}

#[derive(Debug, Deserialize)]
pub struct CallCreated {
    pub call_id: Option<String>,
    pub status: Option<String>,
    pub message: Option<String>,
}

/// Vendor-side call record, fetched by id. Only the fields the workflow
/// reads; the rest of the response is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CallDetails {
    pub call_id: Option<String>,
    pub status: Option<String>,
    pub completed: Option<bool>,
    pub summary: Option<String>,
}

impl CallDetails {
    pub fn is_completed(&self) -> bool {
        self.completed.unwrap_or(false)
            || self
                .status
                .as_deref()
                .map(|s| s.eq_ignore_ascii_case("completed"))
                .unwrap_or(false)
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeRequest {
    pub goal: String,
    pub questions: Vec<(String, String)>,
}

impl AnalyzeRequest {
    /// The fixed intent question every completed call is analyzed with.
    pub fn intent() -> Self {
        Self {
            goal: "Analyze caller's response to job opportunity".to_string(),
            questions: vec![(
                "Based on the caller's response, categorize their interest: \
                 Answer 'yes' if genuinely interested in the job, 'no' if not \
                 interested/declined, or 'later' if they said they're busy/call \
                 later/call back later/will call you back"
                    .to_string(),
                "string".to_string(),
            )],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeResponse {
    pub answers: Option<Vec<serde_json::Value>>,
}

/// Coarse post-call label. `Unknown` means the analysis ran but produced a
/// label outside the expected set; `Error` means analysis itself failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Yes,
    No,
    Later,
    Unknown,
    Error,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Yes => "yes",
            Intent::No => "no",
            Intent::Later => "later",
            Intent::Unknown => "unknown",
            Intent::Error => "error",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "yes" => Intent::Yes,
            "no" => Intent::No,
            "later" => Intent::Later,
            _ => Intent::Unknown,
        }
    }

    /// Pull the intent out of an analyze response. The vendor returns
    /// `answers[0]` either as an object with an `answer` field or as a bare
    /// string, depending on the pathway version.
    pub fn from_answers(response: &AnalyzeResponse) -> Self {
        let first = match response.answers.as_ref().and_then(|a| a.first()) {
            Some(value) => value,
            None => return Intent::Unknown,
        };

        let label = match first {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Object(map) => map
                .get("answer")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            _ => String::new(),
        };

        Intent::from_label(&label)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
