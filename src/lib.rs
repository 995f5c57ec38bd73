pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    academic_service::AcademicService, admin_service::AdminService, audit_service::AuditService,
    question_service::QuestionService, result_service::ResultService, staff_service::StaffService,
    student_service::StudentService, test_service::TestService, upload_service::UploadService,
};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub admin_service: AdminService,
    pub test_service: TestService,
    pub question_service: QuestionService,
    pub result_service: ResultService,
    pub student_service: StudentService,
    pub academic_service: AcademicService,
    pub staff_service: StaffService,
    pub audit_service: AuditService,
    pub upload_service: UploadService,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        let config = crate::config::get_config();

        let upload_service = UploadService::new(&config.uploads_dir, config.max_upload_bytes);
        let admin_service = AdminService::new(pool.clone());
        let test_service = TestService::new(pool.clone());
        let question_service = QuestionService::new(pool.clone(), upload_service.clone());
        let result_service = ResultService::new(pool.clone());
        let student_service = StudentService::new(pool.clone());
        let academic_service = AcademicService::new(pool.clone());
        let staff_service = StaffService::new(pool.clone());
        let audit_service = AuditService::new(pool.clone());

        Self {
            pool,
            admin_service,
            test_service,
            question_service,
            result_service,
            student_service,
            academic_service,
            staff_service,
            audit_service,
            upload_service,
        }
    }
}
