//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod alerts;
mod announcements;
mod applicants;
mod assignments;
mod attendance;
mod classes;
mod files;
mod grades;
mod id_counters;
mod materials;
mod quizzes;
mod sections;
mod submissions;
mod users;

use crate::config::AppConfig;
use crate::errors::{Result, SchoolSystemError};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按全局配置连接数据库并迁移
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::with_connection(db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(storage)
    }

    /// 使用已建立的连接，运行迁移
    pub async fn with_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| SchoolSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| SchoolSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| SchoolSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(SchoolSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    alerts::{
        entities::{Alert, OverdueCandidate},
        requests::NewAlert,
    },
    announcements::entities::Announcement,
    applicants::{
        entities::{Applicant, ApplicantDetail, ApplicantStatus},
        requests::{ApplicantListQuery, NewApplication},
        responses::{ApplicantListResponse, ApprovalOutcome},
    },
    assignments::{
        entities::{Assignment, StudentAssignment},
        requests::{AssignmentListQuery, AssignmentUpdate, NewAssignment},
        responses::AssignmentListResponse,
    },
    attendance::{
        entities::{AttendanceRecord, AttendanceWithStudent},
        requests::AttendanceUpsert,
    },
    classes::{
        entities::{Class, ClassDetail},
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
    files::entities::File,
    grades::{
        entities::{Grade, GradeDetail},
        requests::GradeUpsert,
    },
    materials::{entities::LearningMaterial, requests::CreateMaterialRequest},
    profiles::entities::{Parent, Student, StudentSummary, Teacher},
    quizzes::{
        entities::{Quiz, QuizAnswer, QuizAttempt, QuizQuestion},
        requests::{CreateQuizRequest, ScoredAnswer},
    },
    sections::{
        entities::Section,
        requests::{SectionListQuery, UpdateSectionRequest},
        responses::SectionListResponse,
    },
    submissions::{
        entities::{Submission, SubmissionWithStudent},
        requests::SubmissionUpsert,
    },
    users::{
        entities::User,
        requests::{NewUser, UserListQuery, UserUpdate},
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: NewUser, phone: Option<String>) -> Result<User> {
        self.create_user_impl(user, phone).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 角色资料
    async fn get_profile_number(&self, user: &User) -> Result<Option<String>> {
        self.get_profile_number_impl(user).await
    }

    async fn get_teacher_by_id(&self, id: i64) -> Result<Option<Teacher>> {
        self.get_teacher_by_id_impl(id).await
    }

    async fn get_teacher_by_user_id(&self, user_id: i64) -> Result<Option<Teacher>> {
        self.get_teacher_by_user_id_impl(user_id).await
    }

    async fn get_parent_by_id(&self, id: i64) -> Result<Option<Parent>> {
        self.get_parent_by_id_impl(id).await
    }

    async fn get_parent_by_user_id(&self, user_id: i64) -> Result<Option<Parent>> {
        self.get_parent_by_user_id_impl(user_id).await
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    async fn get_student_by_user_id(&self, user_id: i64) -> Result<Option<Student>> {
        self.get_student_by_user_id_impl(user_id).await
    }

    async fn get_student_summary(&self, student_id: i64) -> Result<Option<StudentSummary>> {
        self.get_student_summary_impl(student_id).await
    }

    async fn list_children(&self, parent_id: i64) -> Result<Vec<StudentSummary>> {
        self.list_children_impl(parent_id).await
    }

    async fn list_section_students(&self, section_id: i64) -> Result<Vec<StudentSummary>> {
        self.list_section_students_impl(section_id).await
    }

    // 招生
    async fn create_application(&self, application: NewApplication) -> Result<ApplicantDetail> {
        self.create_application_impl(application).await
    }

    async fn get_applicant_by_id(&self, id: i64) -> Result<Option<ApplicantDetail>> {
        self.get_applicant_by_id_impl(id).await
    }

    async fn get_applicant_by_user_id(&self, user_id: i64) -> Result<Option<Applicant>> {
        self.get_applicant_by_user_id_impl(user_id).await
    }

    async fn list_applicants_with_pagination(
        &self,
        query: ApplicantListQuery,
    ) -> Result<ApplicantListResponse> {
        self.list_applicants_with_pagination_impl(query).await
    }

    async fn update_applicant_review_status(
        &self,
        id: i64,
        status: ApplicantStatus,
    ) -> Result<Applicant> {
        self.update_applicant_review_status_impl(id, status).await
    }

    async fn approve_applicant(
        &self,
        id: i64,
        parent_id: i64,
        section_id: i64,
    ) -> Result<ApprovalOutcome> {
        self.approve_applicant_impl(id, parent_id, section_id).await
    }

    async fn reject_applicant(&self, id: i64, reason: &str) -> Result<ApplicantDetail> {
        self.reject_applicant_impl(id, reason).await
    }

    // 分区
    async fn create_section(&self, grade_level: &str, name: &str) -> Result<Section> {
        self.create_section_impl(grade_level, name).await
    }

    async fn get_section_by_id(&self, id: i64) -> Result<Option<Section>> {
        self.get_section_by_id_impl(id).await
    }

    async fn list_sections_with_pagination(
        &self,
        query: SectionListQuery,
    ) -> Result<SectionListResponse> {
        self.list_sections_with_pagination_impl(query).await
    }

    async fn update_section(
        &self,
        id: i64,
        update: UpdateSectionRequest,
    ) -> Result<Option<Section>> {
        self.update_section_impl(id, update).await
    }

    async fn delete_section(&self, id: i64) -> Result<bool> {
        self.delete_section_impl(id).await
    }

    // 课程
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class> {
        self.create_class_impl(class).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn get_class_detail(&self, class_id: i64) -> Result<Option<ClassDetail>> {
        self.get_class_detail_impl(class_id).await
    }

    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        self.list_classes_with_pagination_impl(query).await
    }

    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        self.update_class_impl(class_id, update).await
    }

    async fn delete_class(&self, class_id: i64) -> Result<bool> {
        self.delete_class_impl(class_id).await
    }

    // 作业
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        self.create_assignment_impl(assignment).await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn list_assignments_with_pagination(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse> {
        self.list_assignments_with_pagination_impl(query).await
    }

    async fn list_student_assignments(
        &self,
        student_id: i64,
        section_id: i64,
    ) -> Result<Vec<StudentAssignment>> {
        self.list_student_assignments_impl(student_id, section_id)
            .await
    }

    async fn update_assignment(
        &self,
        id: i64,
        update: AssignmentUpdate,
    ) -> Result<Option<Assignment>> {
        self.update_assignment_impl(id, update).await
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool> {
        self.delete_assignment_impl(id).await
    }

    // 作业提交
    async fn upsert_submission(
        &self,
        submission: SubmissionUpsert,
    ) -> Result<(Submission, Option<String>)> {
        self.upsert_submission_impl(submission).await
    }

    async fn list_submissions_for_assignment(
        &self,
        assignment_id: i64,
    ) -> Result<Vec<SubmissionWithStudent>> {
        self.list_submissions_for_assignment_impl(assignment_id)
            .await
    }

    // 成绩
    async fn upsert_grade(&self, grade: GradeUpsert) -> Result<Grade> {
        self.upsert_grade_impl(grade).await
    }

    async fn list_class_grades(
        &self,
        class_id: i64,
        assignment_id: Option<i64>,
    ) -> Result<Vec<GradeDetail>> {
        self.list_class_grades_impl(class_id, assignment_id).await
    }

    async fn list_student_grades(
        &self,
        student_id: i64,
        class_id: Option<i64>,
    ) -> Result<Vec<GradeDetail>> {
        self.list_student_grades_impl(student_id, class_id).await
    }

    // 考勤
    async fn upsert_attendance(
        &self,
        records: Vec<AttendanceUpsert>,
    ) -> Result<Vec<AttendanceRecord>> {
        self.upsert_attendance_impl(records).await
    }

    async fn list_attendance(
        &self,
        class_id: i64,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<AttendanceWithStudent>> {
        self.list_attendance_impl(class_id, start_date, end_date)
            .await
    }

    async fn list_student_attendance(&self, student_id: i64) -> Result<Vec<AttendanceRecord>> {
        self.list_student_attendance_impl(student_id).await
    }

    // 测验
    async fn create_quiz(
        &self,
        quiz: CreateQuizRequest,
        created_by: i64,
    ) -> Result<(Quiz, Vec<QuizQuestion>)> {
        self.create_quiz_impl(quiz, created_by).await
    }

    async fn get_quiz_by_id(&self, id: i64) -> Result<Option<Quiz>> {
        self.get_quiz_by_id_impl(id).await
    }

    async fn get_quiz_questions(&self, quiz_id: i64) -> Result<Vec<QuizQuestion>> {
        self.get_quiz_questions_impl(quiz_id).await
    }

    async fn list_quizzes(&self, class_id: i64, published_only: bool) -> Result<Vec<Quiz>> {
        self.list_quizzes_impl(class_id, published_only).await
    }

    async fn start_quiz_attempt(&self, quiz: &Quiz, student_id: i64) -> Result<QuizAttempt> {
        self.start_quiz_attempt_impl(quiz, student_id).await
    }

    async fn get_quiz_attempt(&self, id: i64) -> Result<Option<QuizAttempt>> {
        self.get_quiz_attempt_impl(id).await
    }

    async fn list_attempt_answers(&self, attempt_id: i64) -> Result<Vec<QuizAnswer>> {
        self.list_attempt_answers_impl(attempt_id).await
    }

    async fn submit_quiz_attempt(
        &self,
        attempt_id: i64,
        answers: Vec<ScoredAnswer>,
        score: f64,
    ) -> Result<QuizAttempt> {
        self.submit_quiz_attempt_impl(attempt_id, answers, score)
            .await
    }

    // 公告
    async fn create_announcement(
        &self,
        class_id: Option<i64>,
        author_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Announcement> {
        self.create_announcement_impl(class_id, author_id, title, content)
            .await
    }

    async fn get_announcement_by_id(&self, id: i64) -> Result<Option<Announcement>> {
        self.get_announcement_by_id_impl(id).await
    }

    async fn list_announcements(&self, class_id: Option<i64>) -> Result<Vec<Announcement>> {
        self.list_announcements_impl(class_id).await
    }

    async fn delete_announcement(&self, id: i64) -> Result<bool> {
        self.delete_announcement_impl(id).await
    }

    // 学习资料
    async fn create_material(
        &self,
        material: CreateMaterialRequest,
        uploaded_by: i64,
    ) -> Result<LearningMaterial> {
        self.create_material_impl(material, uploaded_by).await
    }

    async fn get_material_by_id(&self, id: i64) -> Result<Option<LearningMaterial>> {
        self.get_material_by_id_impl(id).await
    }

    async fn list_materials(&self, class_id: i64) -> Result<Vec<LearningMaterial>> {
        self.list_materials_impl(class_id).await
    }

    async fn delete_material(&self, id: i64) -> Result<bool> {
        self.delete_material_impl(id).await
    }

    // 家长提醒
    async fn list_overdue_candidates(&self, now: i64) -> Result<Vec<OverdueCandidate>> {
        self.list_overdue_candidates_impl(now).await
    }

    async fn create_alert_if_absent(&self, alert: NewAlert) -> Result<bool> {
        self.create_alert_if_absent_impl(alert).await
    }

    async fn list_parent_alerts(&self, parent_id: i64, limit: u64) -> Result<Vec<Alert>> {
        self.list_parent_alerts_impl(parent_id, limit).await
    }

    async fn mark_alert_viewed(&self, alert_id: i64, parent_id: i64) -> Result<bool> {
        self.mark_alert_viewed_impl(alert_id, parent_id).await
    }

    async fn mark_all_alerts_viewed(&self, parent_id: i64) -> Result<u64> {
        self.mark_all_alerts_viewed_impl(parent_id).await
    }

    async fn count_unread_alerts(&self, parent_id: i64) -> Result<i64> {
        self.count_unread_alerts_impl(parent_id).await
    }

    // 文件模块
    async fn upload_file(
        &self,
        token: &str,
        file_name: &str,
        file_size: i64,
        file_type: &str,
        user_id: i64,
    ) -> Result<File> {
        self.upload_file_impl(token, file_name, file_size, file_type, user_id)
            .await
    }

    async fn get_file_by_token(&self, token: &str) -> Result<Option<File>> {
        self.get_file_by_token_impl(token).await
    }

    async fn delete_file(&self, token: &str) -> Result<bool> {
        self.delete_file_impl(token).await
    }
}

/// 测试用内存库与数据构造
#[cfg(test)]
pub(crate) mod test_support {
    use super::SeaOrmStorage;
    use crate::models::applicants::{entities::Gender, requests::NewApplication};
    use crate::models::assignments::{entities::AssignmentStatus, requests::NewAssignment};
    use crate::models::classes::{entities::Class, requests::CreateClassRequest};
    use crate::models::profiles::entities::{Parent, Student, Teacher};
    use crate::models::sections::entities::Section;
    use crate::models::users::{
        entities::{User, UserRole, UserStatus},
        requests::NewUser,
    };
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    /// 单连接内存库：每个连接各自一份数据，池大小必须为 1
    pub(crate) async fn memory_storage() -> SeaOrmStorage {
        let opt = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opt)
            .await
            .unwrap();
        SeaOrmStorage::with_connection(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
            .await
            .unwrap()
    }

    pub(crate) fn new_user(email: &str, role: UserRole) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role,
            status: UserStatus::Active,
            first_name: "Test".to_string(),
            last_name: email.split('@').next().unwrap_or("User").to_string(),
        }
    }

    pub(crate) fn new_application(email: &str, reference_code: &str) -> NewApplication {
        NewApplication {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: "Juan".to_string(),
            last_name: "Dela Cruz".to_string(),
            reference_code: reference_code.to_string(),
            application_type: Default::default(),
            gender: Gender::Male,
            birthdate: "2012-05-01".to_string(),
            grade_level_applied: Some("Grade 7".to_string()),
            guardian_name: None,
            contact_number: None,
            address: None,
            personal_info: None,
        }
    }

    /// due_date 为 unix 秒
    pub(crate) fn new_assignment(
        class_id: i64,
        created_by: i64,
        status: AssignmentStatus,
        due_date: i64,
    ) -> NewAssignment {
        NewAssignment {
            class_id,
            title: format!("Worksheet due {due_date}"),
            description: None,
            due_date,
            max_score: 100.0,
            status,
            created_by,
        }
    }

    pub(crate) async fn seed_section(storage: &SeaOrmStorage, grade: &str, name: &str) -> Section {
        storage.create_section_impl(grade, name).await.unwrap()
    }

    pub(crate) async fn seed_teacher(storage: &SeaOrmStorage, email: &str) -> (Teacher, User) {
        let user = storage
            .create_user_impl(new_user(email, UserRole::Teacher), None)
            .await
            .unwrap();
        let teacher = storage
            .get_teacher_by_user_id_impl(user.id)
            .await
            .unwrap()
            .unwrap();
        (teacher, user)
    }

    pub(crate) async fn seed_parent(storage: &SeaOrmStorage, email: &str) -> Parent {
        let user = storage
            .create_user_impl(new_user(email, UserRole::Parent), None)
            .await
            .unwrap();
        storage
            .get_parent_by_user_id_impl(user.id)
            .await
            .unwrap()
            .unwrap()
    }

    /// 直接建学生账号并指定家长与分区
    pub(crate) async fn seed_student(
        storage: &SeaOrmStorage,
        email: &str,
        parent_id: Option<i64>,
        section_id: Option<i64>,
    ) -> Student {
        use crate::entity::prelude::{StudentActiveModel, Students};
        use sea_orm::{ActiveModelTrait, EntityTrait, Set};

        let user = storage
            .create_user_impl(new_user(email, UserRole::Student), None)
            .await
            .unwrap();
        let student = storage
            .get_student_by_user_id_impl(user.id)
            .await
            .unwrap()
            .unwrap();

        let model = Students::find_by_id(student.id)
            .one(&storage.db)
            .await
            .unwrap()
            .unwrap();
        let mut model: StudentActiveModel = model.into();
        model.parent_id = Set(parent_id);
        model.section_id = Set(section_id);
        model.update(&storage.db).await.unwrap().into_student()
    }

    pub(crate) async fn seed_class(
        storage: &SeaOrmStorage,
        section_id: i64,
        teacher_id: i64,
        subject: &str,
    ) -> Class {
        storage
            .create_class_impl(CreateClassRequest {
                section_id,
                teacher_id,
                subject_name: subject.to_string(),
                schedule: Some("MWF 08:00".to_string()),
            })
            .await
            .unwrap()
    }
}
