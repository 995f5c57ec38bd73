pub mod academic_service;
pub mod admin_service;
pub mod audit_service;
pub mod export_service;
pub mod question_service;
pub mod result_service;
pub mod staff_service;
pub mod student_service;
pub mod test_service;
pub mod upload_service;
