//! 考勤存储操作

use super::SeaOrmStorage;
use crate::entity::attendance::{ActiveModel, Column, Entity as Attendance};
use crate::errors::{Result, SchoolSystemError};
use crate::models::attendance::{
    entities::{AttendanceRecord, AttendanceWithStudent},
    requests::AttendanceUpsert,
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};

impl SeaOrmStorage {
    /// 批量 upsert，键为 (学生, 课程, 日期)，整批在同一事务
    pub async fn upsert_attendance_impl(
        &self,
        records: Vec<AttendanceUpsert>,
    ) -> Result<Vec<AttendanceRecord>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;
        let mut saved = Vec::with_capacity(records.len());

        for record in records {
            let model = ActiveModel {
                student_id: Set(record.student_id),
                class_id: Set(record.class_id),
                attendance_date: Set(record.attendance_date.clone()),
                status: Set(record.status.to_string()),
                remarks: Set(record.remarks),
                recorded_by: Set(record.recorded_by),
                recorded_at: Set(now),
                ..Default::default()
            };

            Attendance::insert(model)
                .on_conflict(
                    OnConflict::columns([Column::StudentId, Column::ClassId, Column::AttendanceDate])
                        .update_columns([
                            Column::Status,
                            Column::Remarks,
                            Column::RecordedBy,
                            Column::RecordedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(|e| SchoolSystemError::database_operation(format!("保存考勤失败: {e}")))?;

            let row = Attendance::find()
                .filter(Column::StudentId.eq(record.student_id))
                .filter(Column::ClassId.eq(record.class_id))
                .filter(Column::AttendanceDate.eq(record.attendance_date.as_str()))
                .one(&txn)
                .await?
                .ok_or_else(|| SchoolSystemError::database_operation("考勤写入后未找到"))?;
            saved.push(row.into_record());
        }

        txn.commit().await?;
        Ok(saved)
    }

    /// 日期区间含两端，日期为 YYYY-MM-DD 可直接按字符串比较
    pub async fn list_attendance_impl(
        &self,
        class_id: i64,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<AttendanceWithStudent>> {
        let rows = Attendance::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::AttendanceDate.gte(start_date))
            .filter(Column::AttendanceDate.lte(end_date))
            .order_by_asc(Column::AttendanceDate)
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询考勤失败: {e}")))?;

        let labels = self
            .student_labels(rows.iter().map(|r| r.student_id).collect())
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let (student_number, student_name) =
                    labels.get(&r.student_id).cloned().unwrap_or_default();
                AttendanceWithStudent {
                    record: r.into_record(),
                    student_number,
                    student_name,
                }
            })
            .collect())
    }

    pub async fn list_student_attendance_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<AttendanceRecord>> {
        let rows = Attendance::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::AttendanceDate)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询学生考勤失败: {e}")))?;

        Ok(rows.into_iter().map(|r| r.into_record()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::entities::{AttendanceCounts, AttendanceStatus};
    use crate::storage::sea_orm_storage::test_support::{
        memory_storage, seed_class, seed_section, seed_student, seed_teacher,
    };

    fn entry(student_id: i64, class_id: i64, date: &str, status: AttendanceStatus) -> AttendanceUpsert {
        AttendanceUpsert {
            student_id,
            class_id,
            attendance_date: date.to_string(),
            status,
            remarks: None,
            recorded_by: 1,
        }
    }

    #[actix_web::test]
    async fn test_recording_same_day_twice_updates_row() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (teacher, _) = seed_teacher(&storage, "t@school.test").await;
        let class = seed_class(&storage, section.id, teacher.id, "Math").await;
        let student = seed_student(&storage, "s@school.test", None, Some(section.id)).await;

        let first = storage
            .upsert_attendance_impl(vec![entry(student.id, class.id, "2025-03-03", AttendanceStatus::Absent)])
            .await
            .unwrap();
        let second = storage
            .upsert_attendance_impl(vec![entry(student.id, class.id, "2025-03-03", AttendanceStatus::Excused)])
            .await
            .unwrap();
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(second[0].status, AttendanceStatus::Excused);

        let rows = storage
            .list_attendance_impl(class.id, "2025-03-03", "2025-03-03")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].student_number, student.student_number);
    }

    #[actix_web::test]
    async fn test_history_range_is_inclusive() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (teacher, _) = seed_teacher(&storage, "t@school.test").await;
        let class = seed_class(&storage, section.id, teacher.id, "Math").await;
        let student = seed_student(&storage, "s@school.test", None, Some(section.id)).await;

        storage
            .upsert_attendance_impl(vec![
                entry(student.id, class.id, "2025-03-01", AttendanceStatus::Present),
                entry(student.id, class.id, "2025-03-02", AttendanceStatus::Late),
                entry(student.id, class.id, "2025-03-05", AttendanceStatus::Absent),
            ])
            .await
            .unwrap();

        let rows = storage
            .list_attendance_impl(class.id, "2025-03-01", "2025-03-02")
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        let all = storage.list_student_attendance_impl(student.id).await.unwrap();
        let counts = AttendanceCounts::from_statuses(all.iter().map(|r| &r.status));
        assert_eq!(counts.total, 3);
        assert_eq!(counts.late, 1);
    }
}
