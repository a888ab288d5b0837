use super::entities::SubmissionStatus;

/// 提交 upsert 参数，multipart 解析后由服务层构造
#[derive(Debug, Clone)]
pub struct SubmissionUpsert {
    pub assignment_id: i64,
    pub student_id: i64,
    pub file_token: String,
    pub file_name: String,
    pub status: SubmissionStatus,
    pub submitted_at: i64,
}
