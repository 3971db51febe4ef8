use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub created_by: String,
    pub created_date: String,
    pub text: String,
    #[serde(default = "default_public")]
    pub public: bool,
}

fn default_public() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub case_number: String,
    pub summary: String,
    pub status: String,
    pub severity: String,
    #[serde(default)]
    pub case_type: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub alternate_id: Option<String>,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub group_number: Option<String>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_date: String,
    #[serde(default)]
    pub last_modified_by: String,
    #[serde(default)]
    pub last_modified_date: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub view_uri: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Case {
    pub fn is_closed(&self) -> bool {
        self.status.to_ascii_lowercase().starts_with("closed")
    }

    /// Leading digit of the severity ("3 (Normal)" -> '3').
    pub fn severity_level(&self) -> char {
        self.severity.chars().next().unwrap_or('?')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseGroup {
    pub number: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub id: String,
    pub title: String,
    /// Knowledge state: WIP, UNVERIFIED or VERIFIED.
    pub state: String,
    #[serde(default)]
    pub moderation_state: Option<String>,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub view_uri: Option<String>,
    #[serde(default)]
    pub issue: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub root_cause: Option<String>,
    #[serde(default)]
    pub diagnostic_steps: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub uuid: String,
    pub file_name: String,
    pub length: u64,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_date: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortField {
    #[default]
    #[value(name = "caseNumber")]
    CaseNumber,
    #[value(name = "createdDate")]
    CreatedDate,
    #[value(name = "lastModifiedDate")]
    LastModifiedDate,
    #[value(name = "severity")]
    Severity,
    #[value(name = "status")]
    Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Which cases a listing asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseFilter {
    pub include_closed: bool,
    /// Group numbers; empty means every group.
    pub group_numbers: Vec<String>,
    pub only_ungrouped: bool,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl CaseFilter {
    pub fn matches(&self, case: &Case) -> bool {
        if !self.include_closed && case.is_closed() {
            return false;
        }
        match case.group_number.as_deref() {
            None => self.group_numbers.is_empty() || self.only_ungrouped,
            Some(_) if self.only_ungrouped && self.group_numbers.is_empty() => false,
            Some(group) => {
                self.group_numbers.is_empty() || self.group_numbers.iter().any(|g| g == group)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub versions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub name: String,
    #[serde(default)]
    pub service_level: String,
    #[serde(default)]
    pub sla: String,
    #[serde(default)]
    pub support_level: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

/// Case attribute whose allowed values come from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseField {
    Type,
    Severity,
    Status,
}

impl CaseField {
    pub fn noun(self) -> &'static str {
        match self {
            CaseField::Type => "type",
            CaseField::Severity => "severity",
            CaseField::Status => "status",
        }
    }
}

/// Everything needed to open a case. `None` fields take the service default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCase {
    pub summary: String,
    pub product: String,
    pub version: String,
    pub description: String,
    pub severity: Option<String>,
    pub group_number: Option<String>,
}

/// Attribute changes for an existing case; `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseUpdate {
    pub case_type: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub alternate_id: Option<String>,
    pub product: Option<String>,
    pub version: Option<String>,
}

impl CaseUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn apply(&self, case: &mut Case) {
        let set = |field: &mut String, value: &Option<String>| {
            if let Some(value) = value {
                field.clone_from(value);
            }
        };
        set(&mut case.case_type, &self.case_type);
        set(&mut case.severity, &self.severity);
        set(&mut case.status, &self.status);
        set(&mut case.product, &self.product);
        set(&mut case.version, &self.version);
        if self.alternate_id.is_some() {
            case.alternate_id.clone_from(&self.alternate_id);
        }
    }
}

/// A file on its way to a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    pub file_name: String,
    pub description: String,
    pub public: bool,
    pub content: Vec<u8>,
}
