//! Ticketing service contract and the offline implementations shipped with the tool.

mod error;
mod fixture;
mod offline;
mod types;

use std::rc::Rc;

pub use error::ServiceError;
pub use fixture::{CaseValues, FixtureAttachment, FixtureService, Snapshot};
pub use offline::OfflineService;
pub use types::{
    Attachment, Case, CaseField, CaseFilter, CaseGroup, CaseUpdate, Comment, Entitlement,
    NewAttachment, NewCase, Product, SortField, SortOrder, Solution,
};

/// Rows the upstream service returns for one request, whatever the caller asks for.
pub const SERVICE_ROW_CAP: usize = 50;

/// Remote ticketing API. Every call blocks until the service answers.
pub trait TicketService {
    fn list_cases(
        &self,
        filter: &CaseFilter,
        offset: usize,
        count: usize,
    ) -> Result<Vec<Case>, ServiceError>;
    fn get_case(&self, case_number: &str) -> Result<Case, ServiceError>;
    fn search_solutions(
        &self,
        query: &str,
        offset: usize,
        count: usize,
    ) -> Result<Vec<Solution>, ServiceError>;
    fn get_solution(&self, id: &str) -> Result<Solution, ServiceError>;
    fn list_attachments(&self, case_number: &str) -> Result<Vec<Attachment>, ServiceError>;
    fn get_attachment(
        &self,
        case_number: &str,
        uuid: &str,
    ) -> Result<(Attachment, Vec<u8>), ServiceError>;
    fn add_comment(&self, case_number: &str, text: &str, public: bool)
        -> Result<(), ServiceError>;
    fn list_groups(&self) -> Result<Vec<CaseGroup>, ServiceError>;
    /// Opens a case and returns its number.
    fn create_case(&self, case: &NewCase) -> Result<String, ServiceError>;
    fn update_case(&self, case_number: &str, update: &CaseUpdate) -> Result<Case, ServiceError>;
    fn add_attachment(
        &self,
        case_number: &str,
        attachment: &NewAttachment,
    ) -> Result<Attachment, ServiceError>;
    fn list_products(&self) -> Result<Vec<Product>, ServiceError>;
    /// Allowed values for a case attribute, in display order.
    fn list_values(&self, field: CaseField) -> Result<Vec<String>, ServiceError>;
    fn list_entitlements(&self) -> Result<Vec<Entitlement>, ServiceError>;
}

/// Shared handle used by every command in one process.
pub type ServiceHandle = Rc<dyn TicketService>;
