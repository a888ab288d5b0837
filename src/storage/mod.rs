use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户并按角色建立资料（教师/家长/学生编号）
    async fn create_user(&self, user: NewUser, phone: Option<String>) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户，角色变化时补建资料
    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<Option<User>>;
    async fn delete_user(&self, id: i64) -> Result<bool>;
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    async fn count_users(&self) -> Result<u64>;

    /// 角色资料
    // 角色对应的编号
    async fn get_profile_number(&self, user: &User) -> Result<Option<String>>;
    async fn get_teacher_by_id(&self, id: i64) -> Result<Option<Teacher>>;
    async fn get_teacher_by_user_id(&self, user_id: i64) -> Result<Option<Teacher>>;
    async fn get_parent_by_id(&self, id: i64) -> Result<Option<Parent>>;
    async fn get_parent_by_user_id(&self, user_id: i64) -> Result<Option<Parent>>;
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;
    async fn get_student_by_user_id(&self, user_id: i64) -> Result<Option<Student>>;
    async fn get_student_summary(&self, student_id: i64) -> Result<Option<StudentSummary>>;
    async fn list_children(&self, parent_id: i64) -> Result<Vec<StudentSummary>>;
    async fn list_section_students(&self, section_id: i64) -> Result<Vec<StudentSummary>>;

    /// 招生
    // 报名：建用户 + 申请编号 + 申请记录，单事务
    async fn create_application(&self, application: NewApplication) -> Result<ApplicantDetail>;
    async fn get_applicant_by_id(&self, id: i64) -> Result<Option<ApplicantDetail>>;
    async fn get_applicant_by_user_id(&self, user_id: i64) -> Result<Option<Applicant>>;
    async fn list_applicants_with_pagination(
        &self,
        query: ApplicantListQuery,
    ) -> Result<ApplicantListResponse>;
    // under_review / waitlisted
    async fn update_applicant_review_status(
        &self,
        id: i64,
        status: ApplicantStatus,
    ) -> Result<Applicant>;
    // 录取，单事务
    async fn approve_applicant(
        &self,
        id: i64,
        parent_id: i64,
        section_id: i64,
    ) -> Result<ApprovalOutcome>;
    async fn reject_applicant(&self, id: i64, reason: &str) -> Result<ApplicantDetail>;

    /// 分区
    async fn create_section(&self, grade_level: &str, name: &str) -> Result<Section>;
    async fn get_section_by_id(&self, id: i64) -> Result<Option<Section>>;
    async fn list_sections_with_pagination(
        &self,
        query: SectionListQuery,
    ) -> Result<SectionListResponse>;
    async fn update_section(
        &self,
        id: i64,
        update: UpdateSectionRequest,
    ) -> Result<Option<Section>>;
    // 有学生或课程时返回冲突
    async fn delete_section(&self, id: i64) -> Result<bool>;

    /// 课程
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class>;
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    async fn get_class_detail(&self, class_id: i64) -> Result<Option<ClassDetail>>;
    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse>;
    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>>;
    async fn delete_class(&self, class_id: i64) -> Result<bool>;

    /// 作业
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    async fn list_assignments_with_pagination(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse>;
    // 学生所在分区的已发布作业及其提交
    async fn list_student_assignments(
        &self,
        student_id: i64,
        section_id: i64,
    ) -> Result<Vec<StudentAssignment>>;
    async fn update_assignment(
        &self,
        id: i64,
        update: AssignmentUpdate,
    ) -> Result<Option<Assignment>>;
    async fn delete_assignment(&self, id: i64) -> Result<bool>;

    /// 作业提交
    // 返回被覆盖的旧文件 token（重复提交且换了文件时）
    async fn upsert_submission(
        &self,
        submission: SubmissionUpsert,
    ) -> Result<(Submission, Option<String>)>;
    async fn list_submissions_for_assignment(
        &self,
        assignment_id: i64,
    ) -> Result<Vec<SubmissionWithStudent>>;

    /// 成绩
    async fn upsert_grade(&self, grade: GradeUpsert) -> Result<Grade>;
    async fn list_class_grades(
        &self,
        class_id: i64,
        assignment_id: Option<i64>,
    ) -> Result<Vec<GradeDetail>>;
    async fn list_student_grades(
        &self,
        student_id: i64,
        class_id: Option<i64>,
    ) -> Result<Vec<GradeDetail>>;

    /// 考勤
    async fn upsert_attendance(&self, records: Vec<AttendanceUpsert>)
    -> Result<Vec<AttendanceRecord>>;
    async fn list_attendance(
        &self,
        class_id: i64,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<AttendanceWithStudent>>;
    async fn list_student_attendance(&self, student_id: i64) -> Result<Vec<AttendanceRecord>>;

    /// 测验
    async fn create_quiz(
        &self,
        quiz: CreateQuizRequest,
        created_by: i64,
    ) -> Result<(Quiz, Vec<QuizQuestion>)>;
    async fn get_quiz_by_id(&self, id: i64) -> Result<Option<Quiz>>;
    async fn get_quiz_questions(&self, quiz_id: i64) -> Result<Vec<QuizQuestion>>;
    async fn list_quizzes(&self, class_id: i64, published_only: bool) -> Result<Vec<Quiz>>;
    // 复用未提交的作答，否则按次数上限新建
    async fn start_quiz_attempt(&self, quiz: &Quiz, student_id: i64) -> Result<QuizAttempt>;
    async fn get_quiz_attempt(&self, id: i64) -> Result<Option<QuizAttempt>>;
    async fn list_attempt_answers(&self, attempt_id: i64) -> Result<Vec<QuizAnswer>>;
    // 写入答案并关闭作答，单事务
    async fn submit_quiz_attempt(
        &self,
        attempt_id: i64,
        answers: Vec<ScoredAnswer>,
        score: f64,
    ) -> Result<QuizAttempt>;

    /// 公告
    async fn create_announcement(
        &self,
        class_id: Option<i64>,
        author_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Announcement>;
    async fn get_announcement_by_id(&self, id: i64) -> Result<Option<Announcement>>;
    // 全校公告 + 指定课程公告
    async fn list_announcements(&self, class_id: Option<i64>) -> Result<Vec<Announcement>>;
    async fn delete_announcement(&self, id: i64) -> Result<bool>;

    /// 学习资料
    async fn create_material(
        &self,
        material: CreateMaterialRequest,
        uploaded_by: i64,
    ) -> Result<LearningMaterial>;
    async fn get_material_by_id(&self, id: i64) -> Result<Option<LearningMaterial>>;
    async fn list_materials(&self, class_id: i64) -> Result<Vec<LearningMaterial>>;
    async fn delete_material(&self, id: i64) -> Result<bool>;

    /// 家长提醒
    async fn list_overdue_candidates(&self, now: i64) -> Result<Vec<OverdueCandidate>>;
    // 已存在相同键的未读提醒时不重复创建；成绩提醒则刷新其内容
    async fn create_alert_if_absent(&self, alert: NewAlert) -> Result<bool>;
    async fn list_parent_alerts(&self, parent_id: i64, limit: u64) -> Result<Vec<Alert>>;
    async fn mark_alert_viewed(&self, alert_id: i64, parent_id: i64) -> Result<bool>;
    async fn mark_all_alerts_viewed(&self, parent_id: i64) -> Result<u64>;
    async fn count_unread_alerts(&self, parent_id: i64) -> Result<i64>;

    /// 文件
    async fn upload_file(
        &self,
        token: &str,
        file_name: &str,
        file_size: i64,
        file_type: &str,
        user_id: i64,
    ) -> Result<File>;
    async fn get_file_by_token(&self, token: &str) -> Result<Option<File>>;
    async fn delete_file(&self, token: &str) -> Result<bool>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
