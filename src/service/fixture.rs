use super::{
    Attachment, Case, CaseField, CaseFilter, CaseGroup, CaseUpdate, Comment, Entitlement,
    NewAttachment, NewCase, Product, ServiceError, Solution, SortField, SortOrder, TicketService,
    SERVICE_ROW_CAP,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Attachment metadata plus its body, as stored in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureAttachment {
    #[serde(flatten)]
    pub meta: Attachment,
    #[serde(default)]
    pub content: String,
}

/// JSON snapshot of a ticketing account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub cases: Vec<Case>,
    pub groups: Vec<CaseGroup>,
    pub solutions: Vec<Solution>,
    /// Attachments keyed by case number.
    pub attachments: BTreeMap<String, Vec<FixtureAttachment>>,
    pub products: Vec<Product>,
    pub entitlements: Vec<Entitlement>,
    pub values: CaseValues,
}

/// Allowed case attribute values. Missing lists fall back to the stock ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseValues {
    pub types: Vec<String>,
    pub severities: Vec<String>,
    pub statuses: Vec<String>,
}

impl Default for CaseValues {
    fn default() -> Self {
        let owned = |values: &[&str]| values.iter().map(|v| v.to_string()).collect();
        Self {
            types: owned(&["Defect / Bug", "Feature / Enhancement", "Information", "Other"]),
            severities: owned(&["1 (Urgent)", "2 (High)", "3 (Normal)", "4 (Low)"]),
            statuses: owned(&["Waiting on Customer", "Waiting on Red Hat", "Closed"]),
        }
    }
}

const CREATED_BY: &str = "support-tool";
const DEFAULT_SEVERITY: &str = "3 (Normal)";
const NEW_CASE_STATUS: &str = "Waiting on Red Hat";

/// Offline service answering from a snapshot. Comments added during the run are kept
/// in memory only. Requests are capped at [`SERVICE_ROW_CAP`] rows like the real API.
#[derive(Debug, Default)]
pub struct FixtureService {
    snapshot: RefCell<Snapshot>,
}

impl FixtureService {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RefCell::new(snapshot),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture '{}'", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("failed to parse fixture '{}'", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(raw)?;
        Ok(Self::new(snapshot))
    }
}

fn page<T: Clone>(items: &[T], offset: usize, count: usize) -> Vec<T> {
    let count = count.min(SERVICE_ROW_CAP);
    items.iter().skip(offset).take(count).cloned().collect()
}

fn sort_cases(cases: &mut [Case], field: SortField, order: SortOrder) {
    cases.sort_by(|a, b| {
        let ordering = match field {
            SortField::CaseNumber => a.case_number.cmp(&b.case_number),
            SortField::CreatedDate => a.created_date.cmp(&b.created_date),
            SortField::LastModifiedDate => a.last_modified_date.cmp(&b.last_modified_date),
            SortField::Severity => a.severity.cmp(&b.severity),
            SortField::Status => a.status.cmp(&b.status),
        };
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

fn solution_matches(solution: &Solution, terms: &[String]) -> bool {
    let haystack = [
        Some(solution.title.as_str()),
        solution.issue.as_deref(),
        solution.resolution.as_deref(),
        solution.environment.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase();
    terms.iter().all(|term| haystack.contains(term.as_str()))
}

fn find_case_mut<'a>(
    snapshot: &'a mut Snapshot,
    case_number: &str,
) -> Result<&'a mut Case, ServiceError> {
    snapshot
        .cases
        .iter_mut()
        .find(|case| case.case_number == case_number)
        .ok_or_else(|| ServiceError::NotFound(format!("case {case_number}")))
}

/// One past the highest numeric case number, zero padded to eight digits.
fn next_case_number(cases: &[Case]) -> String {
    let next = cases
        .iter()
        .filter_map(|case| case.case_number.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        + 1;
    format!("{next:08}")
}

fn rejected(reason: String) -> ServiceError {
    ServiceError::Request {
        status: 400,
        reason,
    }
}

fn now_stamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("@{secs}")
}

impl TicketService for FixtureService {
    fn list_cases(
        &self,
        filter: &CaseFilter,
        offset: usize,
        count: usize,
    ) -> Result<Vec<Case>, ServiceError> {
        let snapshot = self.snapshot.borrow();
        let mut matching: Vec<Case> = snapshot
            .cases
            .iter()
            .filter(|case| filter.matches(case))
            .cloned()
            .collect();
        sort_cases(&mut matching, filter.sort_field, filter.sort_order);
        Ok(page(&matching, offset, count))
    }

    fn get_case(&self, case_number: &str) -> Result<Case, ServiceError> {
        self.snapshot
            .borrow()
            .cases
            .iter()
            .find(|case| case.case_number == case_number)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("case {case_number}")))
    }

    fn search_solutions(
        &self,
        query: &str,
        offset: usize,
        count: usize,
    ) -> Result<Vec<Solution>, ServiceError> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return Err(ServiceError::Request {
                status: 400,
                reason: "empty search query".to_string(),
            });
        }
        let snapshot = self.snapshot.borrow();
        let matching: Vec<Solution> = snapshot
            .solutions
            .iter()
            .filter(|solution| solution_matches(solution, &terms))
            .cloned()
            .collect();
        Ok(page(&matching, offset, count))
    }

    fn get_solution(&self, id: &str) -> Result<Solution, ServiceError> {
        self.snapshot
            .borrow()
            .solutions
            .iter()
            .find(|solution| solution.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("solution {id}")))
    }

    fn list_attachments(&self, case_number: &str) -> Result<Vec<Attachment>, ServiceError> {
        self.get_case(case_number)?;
        Ok(self
            .snapshot
            .borrow()
            .attachments
            .get(case_number)
            .map(|items| items.iter().map(|item| item.meta.clone()).collect())
            .unwrap_or_default())
    }

    fn get_attachment(
        &self,
        case_number: &str,
        uuid: &str,
    ) -> Result<(Attachment, Vec<u8>), ServiceError> {
        self.snapshot
            .borrow()
            .attachments
            .get(case_number)
            .and_then(|items| items.iter().find(|item| item.meta.uuid == uuid))
            .map(|item| (item.meta.clone(), item.content.clone().into_bytes()))
            .ok_or_else(|| {
                ServiceError::NotFound(format!("attachment {uuid} on case {case_number}"))
            })
    }

    fn add_comment(
        &self,
        case_number: &str,
        text: &str,
        public: bool,
    ) -> Result<(), ServiceError> {
        let mut snapshot = self.snapshot.borrow_mut();
        let case = find_case_mut(&mut snapshot, case_number)?;
        case.comments.insert(
            0,
            Comment {
                created_by: CREATED_BY.to_string(),
                created_date: now_stamp(),
                text: text.to_string(),
                public,
            },
        );
        Ok(())
    }

    fn list_groups(&self) -> Result<Vec<CaseGroup>, ServiceError> {
        Ok(self.snapshot.borrow().groups.clone())
    }

    fn create_case(&self, new_case: &NewCase) -> Result<String, ServiceError> {
        for (label, value) in [
            ("summary", &new_case.summary),
            ("product", &new_case.product),
            ("version", &new_case.version),
            ("description", &new_case.description),
        ] {
            if value.trim().is_empty() {
                return Err(rejected(format!("a case requires a {label}")));
            }
        }
        let mut snapshot = self.snapshot.borrow_mut();
        let case_number = next_case_number(&snapshot.cases);
        let stamp = now_stamp();
        snapshot.cases.push(Case {
            case_number: case_number.clone(),
            summary: new_case.summary.clone(),
            status: NEW_CASE_STATUS.to_string(),
            severity: new_case
                .severity
                .clone()
                .unwrap_or_else(|| DEFAULT_SEVERITY.to_string()),
            case_type: String::new(),
            product: new_case.product.clone(),
            version: new_case.version.clone(),
            alternate_id: None,
            contact_name: CREATED_BY.to_string(),
            owner: String::new(),
            group_number: new_case.group_number.clone(),
            created_by: CREATED_BY.to_string(),
            created_date: stamp.clone(),
            last_modified_by: CREATED_BY.to_string(),
            last_modified_date: stamp,
            description: Some(new_case.description.clone()),
            view_uri: None,
            comments: Vec::new(),
        });
        Ok(case_number)
    }

    fn update_case(&self, case_number: &str, update: &CaseUpdate) -> Result<Case, ServiceError> {
        let mut snapshot = self.snapshot.borrow_mut();
        let case = find_case_mut(&mut snapshot, case_number)?;
        update.apply(case);
        case.last_modified_by = CREATED_BY.to_string();
        case.last_modified_date = now_stamp();
        Ok(case.clone())
    }

    fn add_attachment(
        &self,
        case_number: &str,
        attachment: &NewAttachment,
    ) -> Result<Attachment, ServiceError> {
        if attachment.file_name.is_empty() {
            return Err(rejected("an attachment requires a file name".to_string()));
        }
        let mut snapshot = self.snapshot.borrow_mut();
        find_case_mut(&mut snapshot, case_number)?;
        let uploaded = snapshot.attachments.values().map(Vec::len).sum::<usize>();
        let meta = Attachment {
            uuid: format!("uuid-{}", uploaded + 1),
            file_name: attachment.file_name.clone(),
            length: attachment.content.len() as u64,
            created_by: CREATED_BY.to_string(),
            created_date: now_stamp(),
            description: Some(attachment.description.clone()),
        };
        snapshot
            .attachments
            .entry(case_number.to_string())
            .or_default()
            .push(FixtureAttachment {
                meta: meta.clone(),
                content: String::from_utf8_lossy(&attachment.content).into_owned(),
            });
        Ok(meta)
    }

    fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.snapshot.borrow().products.clone())
    }

    fn list_values(&self, field: CaseField) -> Result<Vec<String>, ServiceError> {
        let snapshot = self.snapshot.borrow();
        let values = match field {
            CaseField::Type => &snapshot.values.types,
            CaseField::Severity => &snapshot.values.severities,
            CaseField::Status => &snapshot.values.statuses,
        };
        Ok(values.clone())
    }

    fn list_entitlements(&self) -> Result<Vec<Entitlement>, ServiceError> {
        Ok(self.snapshot.borrow().entitlements.clone())
    }
}
