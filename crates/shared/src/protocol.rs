use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{SearchParams, SearchResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub params: SearchParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl SearchRequest {
    pub fn new(params: SearchParams) -> Self {
        Self {
            params,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_missing_limit() {
        let req = SearchRequest::new(SearchParams::from_fields([("keyword", "art")]));
        let value = serde_json::to_value(&req).expect("serialize");
        assert_eq!(value["params"]["keyword"], "art");
        assert!(value.get("limit").is_none());
    }

    #[test]
    fn response_parses_rfc3339_timestamp() {
        let raw = r#"{
            "results": [{
                "title": "t", "category": "c", "region": "r",
                "score": 4.5, "description": "d"
            }],
            "generated_at": "2024-05-01T09:30:00Z"
        }"#;
        let resp: SearchResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(resp.results.len(), 1);
        assert_eq!(resp.generated_at.to_rfc3339(), "2024-05-01T09:30:00+00:00");
    }
}
