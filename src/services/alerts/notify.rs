//! 家长提醒的生成与读取
//!
//! 这里的函数都不返回错误：存储失败只记日志，返回空值或 0，调用方的主流程不受影响。

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::models::{
    alerts::{
        entities::{Alert, AlertType},
        requests::NewAlert,
    },
    attendance::entities::AttendanceStatus,
    classes::entities::Class,
    grades::entities::Grade,
};
use crate::storage::Storage;

/// 扫描逾期未交的作业，返回新建的提醒数
pub async fn generate_overdue_assignment_alerts(storage: &Arc<dyn Storage>, now: i64) -> i64 {
    let candidates = match storage.list_overdue_candidates(now).await {
        Ok(candidates) => candidates,
        Err(e) => {
            error!("Overdue alert sweep failed: {}", e);
            return 0;
        }
    };

    let mut created = 0;
    for candidate in candidates {
        let alert = NewAlert {
            parent_id: candidate.parent_id,
            student_id: candidate.student_id,
            assignment_id: Some(candidate.assignment_id),
            alert_type: AlertType::OverdueAssignment,
            message: candidate.message(),
        };
        match storage.create_alert_if_absent(alert).await {
            Ok(true) => created += 1,
            Ok(false) => {}
            Err(e) => warn!(
                "Failed to create overdue alert for student {} / assignment {}: {}",
                candidate.student_id, candidate.assignment_id, e
            ),
        }
    }

    info!("Overdue alert sweep created {} alert(s)", created);
    created
}

pub async fn notify_grade_posted(storage: &Arc<dyn Storage>, grade: &Grade) {
    let student = match storage.get_student_summary(grade.student_id).await {
        Ok(Some(student)) => student,
        Ok(None) => return,
        Err(e) => {
            warn!("Grade alert skipped, student lookup failed: {}", e);
            return;
        }
    };
    let Some(parent_id) = student.parent_id else {
        return;
    };

    let subject = match storage.get_class_by_id(grade.class_id).await {
        Ok(Some(class)) => class.subject_name,
        _ => "a class".to_string(),
    };
    let assignment_title = match grade.assignment_id {
        Some(id) => storage
            .get_assignment_by_id(id)
            .await
            .ok()
            .flatten()
            .map(|a| a.title),
        None => None,
    };

    let message = match assignment_title {
        Some(title) => format!(
            "{} received {} on \"{}\" in {}.",
            student.full_name(),
            grade.score,
            title,
            subject
        ),
        None => format!(
            "{} received an overall grade of {} in {}.",
            student.full_name(),
            grade.score,
            subject
        ),
    };

    let alert = NewAlert {
        parent_id,
        student_id: student.id,
        assignment_id: grade.assignment_id,
        alert_type: AlertType::GradePosted,
        message,
    };
    if let Err(e) = storage.create_alert_if_absent(alert).await {
        warn!("Failed to create grade alert for student {}: {}", student.id, e);
    }
}

/// 缺勤或迟到时通知家长，其他状态忽略
pub async fn notify_attendance_issue(
    storage: &Arc<dyn Storage>,
    student_id: i64,
    class: &Class,
    date: &str,
    status: AttendanceStatus,
) {
    if !status.is_issue() {
        return;
    }

    let student = match storage.get_student_summary(student_id).await {
        Ok(Some(student)) => student,
        Ok(None) => return,
        Err(e) => {
            warn!("Attendance alert skipped, student lookup failed: {}", e);
            return;
        }
    };
    let Some(parent_id) = student.parent_id else {
        return;
    };

    let alert = NewAlert {
        parent_id,
        student_id,
        assignment_id: None,
        alert_type: AlertType::AttendanceIssue,
        message: format!(
            "{} was marked {} in {} on {}.",
            student.full_name(),
            status,
            class.subject_name,
            date
        ),
    };
    if let Err(e) = storage.create_alert_if_absent(alert).await {
        warn!("Failed to create attendance alert for student {}: {}", student_id, e);
    }
}

pub async fn get_parent_alerts(storage: &Arc<dyn Storage>, parent_id: i64) -> Vec<Alert> {
    let limit = AppConfig::get().alerts.inbox_limit;
    storage
        .list_parent_alerts(parent_id, limit)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to load alerts for parent {}: {}", parent_id, e);
            Vec::new()
        })
}

pub async fn mark_alert_viewed(storage: &Arc<dyn Storage>, alert_id: i64, parent_id: i64) -> bool {
    storage
        .mark_alert_viewed(alert_id, parent_id)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to mark alert {} viewed: {}", alert_id, e);
            false
        })
}

pub async fn mark_all_alerts_viewed(storage: &Arc<dyn Storage>, parent_id: i64) -> u64 {
    storage
        .mark_all_alerts_viewed(parent_id)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to mark alerts viewed for parent {}: {}", parent_id, e);
            0
        })
}

pub async fn get_unread_alert_count(storage: &Arc<dyn Storage>, parent_id: i64) -> i64 {
    storage
        .count_unread_alerts(parent_id)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to count unread alerts for parent {}: {}", parent_id, e);
            0
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::entities::AssignmentStatus;
    use crate::models::grades::requests::GradeUpsert;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::*;

    struct Fixture {
        storage: Arc<dyn Storage>,
        raw: SeaOrmStorage,
        parent_id: i64,
        student_id: i64,
        class: Class,
        teacher_user_id: i64,
    }

    async fn fixture() -> Fixture {
        let raw = memory_storage().await;
        let section = seed_section(&raw, "Grade 7", "Rizal").await;
        let (teacher, teacher_user) = seed_teacher(&raw, "t@school.test").await;
        let class = seed_class(&raw, section.id, teacher.id, "Science").await;
        let parent = seed_parent(&raw, "p@school.test").await;
        let student = seed_student(&raw, "kid@school.test", Some(parent.id), Some(section.id)).await;
        Fixture {
            storage: Arc::new(raw.clone()),
            raw,
            parent_id: parent.id,
            student_id: student.id,
            class,
            teacher_user_id: teacher_user.id,
        }
    }

    #[actix_web::test]
    async fn test_overdue_sweep_is_deduplicated() {
        let fx = fixture().await;
        let now = chrono::Utc::now().timestamp();
        fx.storage
            .create_assignment(new_assignment(
                fx.class.id,
                fx.teacher_user_id,
                AssignmentStatus::Published,
                now - 3600,
            ))
            .await
            .unwrap();
        // 未来的作业和草稿不产生提醒
        fx.storage
            .create_assignment(new_assignment(
                fx.class.id,
                fx.teacher_user_id,
                AssignmentStatus::Published,
                now + 3600,
            ))
            .await
            .unwrap();
        fx.storage
            .create_assignment(new_assignment(
                fx.class.id,
                fx.teacher_user_id,
                AssignmentStatus::Draft,
                now - 3600,
            ))
            .await
            .unwrap();

        assert_eq!(generate_overdue_assignment_alerts(&fx.storage, now).await, 1);
        assert_eq!(generate_overdue_assignment_alerts(&fx.storage, now).await, 0);

        let alerts = get_parent_alerts(&fx.storage, fx.parent_id).await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::OverdueAssignment);
        assert_eq!(get_unread_alert_count(&fx.storage, fx.parent_id).await, 1);
    }

    #[actix_web::test]
    async fn test_attendance_and_grade_alerts() {
        let fx = fixture().await;

        notify_attendance_issue(
            &fx.storage,
            fx.student_id,
            &fx.class,
            "2025-03-03",
            AttendanceStatus::Present,
        )
        .await;
        assert_eq!(get_unread_alert_count(&fx.storage, fx.parent_id).await, 0);

        notify_attendance_issue(
            &fx.storage,
            fx.student_id,
            &fx.class,
            "2025-03-03",
            AttendanceStatus::Absent,
        )
        .await;

        let grade = fx
            .storage
            .upsert_grade(GradeUpsert {
                student_id: fx.student_id,
                class_id: fx.class.id,
                assignment_id: None,
                score: 91.0,
                remarks: None,
                feedback_emoji: None,
                graded_by: fx.teacher_user_id,
            })
            .await
            .unwrap();
        notify_grade_posted(&fx.storage, &grade).await;

        let alerts = get_parent_alerts(&fx.storage, fx.parent_id).await;
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().any(|a| a.alert_type == AlertType::GradePosted
            && a.message.contains("overall grade of 91")));
        assert!(alerts.iter().any(|a| a.alert_type == AlertType::AttendanceIssue
            && a.message.contains("absent")));

        let first = alerts[0].id;
        assert!(mark_alert_viewed(&fx.storage, first, fx.parent_id).await);
        assert!(mark_alert_viewed(&fx.storage, first, fx.parent_id).await);
        assert!(!mark_alert_viewed(&fx.storage, first, fx.parent_id + 100).await);
        assert_eq!(get_unread_alert_count(&fx.storage, fx.parent_id).await, 1);
        assert_eq!(mark_all_alerts_viewed(&fx.storage, fx.parent_id).await, 1);
        assert_eq!(get_unread_alert_count(&fx.storage, fx.parent_id).await, 0);
    }

    #[actix_web::test]
    async fn test_alert_reads_fail_open() {
        let fx = fixture().await;
        fx.raw.db.clone().close().await.unwrap();

        assert!(get_parent_alerts(&fx.storage, fx.parent_id).await.is_empty());
        assert_eq!(get_unread_alert_count(&fx.storage, fx.parent_id).await, 0);
        assert_eq!(mark_all_alerts_viewed(&fx.storage, fx.parent_id).await, 0);
        assert_eq!(
            generate_overdue_assignment_alerts(&fx.storage, chrono::Utc::now().timestamp()).await,
            0
        );
    }
}
