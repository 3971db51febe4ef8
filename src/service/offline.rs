use super::{
    Attachment, Case, CaseField, CaseFilter, CaseGroup, CaseUpdate, Entitlement, NewAttachment,
    NewCase, Product, ServiceError, Solution, TicketService,
};

/// Stand-in used when no service is configured; every call fails with a connection error.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineService;

fn unreachable_service<T>() -> Result<T, ServiceError> {
    Err(ServiceError::Connection(
        "no ticketing service configured; pass --fixture or set SUPPORT_TOOL_FIXTURE".to_string(),
    ))
}

impl TicketService for OfflineService {
    fn list_cases(&self, _: &CaseFilter, _: usize, _: usize) -> Result<Vec<Case>, ServiceError> {
        unreachable_service()
    }

    fn get_case(&self, _: &str) -> Result<Case, ServiceError> {
        unreachable_service()
    }

    fn search_solutions(&self, _: &str, _: usize, _: usize) -> Result<Vec<Solution>, ServiceError> {
        unreachable_service()
    }

    fn get_solution(&self, _: &str) -> Result<Solution, ServiceError> {
        unreachable_service()
    }

    fn list_attachments(&self, _: &str) -> Result<Vec<Attachment>, ServiceError> {
        unreachable_service()
    }

    fn get_attachment(&self, _: &str, _: &str) -> Result<(Attachment, Vec<u8>), ServiceError> {
        unreachable_service()
    }

    fn add_comment(&self, _: &str, _: &str, _: bool) -> Result<(), ServiceError> {
        unreachable_service()
    }

    fn list_groups(&self) -> Result<Vec<CaseGroup>, ServiceError> {
        unreachable_service()
    }

    fn create_case(&self, _: &NewCase) -> Result<String, ServiceError> {
        unreachable_service()
    }

    fn update_case(&self, _: &str, _: &CaseUpdate) -> Result<Case, ServiceError> {
        unreachable_service()
    }

    fn add_attachment(&self, _: &str, _: &NewAttachment) -> Result<Attachment, ServiceError> {
        unreachable_service()
    }

    fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        unreachable_service()
    }

    fn list_values(&self, _: CaseField) -> Result<Vec<String>, ServiceError> {
        unreachable_service()
    }

    fn list_entitlements(&self) -> Result<Vec<Entitlement>, ServiceError> {
        unreachable_service()
    }
}
