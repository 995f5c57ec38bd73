use serde::Deserialize;

#[derive(Debug, Clone, Default)]
pub struct ResultFilter {
    pub class: Option<String>,
    pub subject: Option<String>,
    pub test_id: Option<i64>,
    /// Matches against student name or registration number.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ListResultsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub class: Option<String>,
    pub subject: Option<String>,
    pub test_id: Option<i64>,
    pub search: Option<String>,
}

impl ListResultsQuery {
    pub fn filter(&self) -> ResultFilter {
        ResultFilter {
            class: self.class.clone(),
            subject: self.subject.clone(),
            test_id: self.test_id,
            search: self.search.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ExportResultsQuery {
    /// "doc" (default) or "xlsx".
    pub format: Option<String>,
    pub class: Option<String>,
    pub subject: Option<String>,
    pub test_id: Option<i64>,
    pub search: Option<String>,
}

impl ExportResultsQuery {
    pub fn filter(&self) -> ResultFilter {
        ResultFilter {
            class: self.class.clone(),
            subject: self.subject.clone(),
            test_id: self.test_id,
            search: self.search.clone(),
        }
    }
}
