//! 按 (类型, 年份) 递增的编号生成

use super::SeaOrmStorage;
use crate::entity::id_counters::{ActiveModel, Column, Entity as IdCounters};
use crate::errors::{Result, SchoolSystemError};
use crate::models::profiles::entities::{IdentifierKind, format_identifier};
use chrono::Datelike;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, ExprTrait, QueryFilter, Set, TransactionTrait,
};

/// 在给定连接（通常是调用方的事务）上取下一个编号
///
/// 单条 upsert 完成递增，随后在同一连接上读回，保证并发下编号唯一且连续。
pub(crate) async fn next_identifier_in<C: ConnectionTrait>(
    conn: &C,
    kind: IdentifierKind,
    year: i32,
) -> Result<String> {
    let model = ActiveModel {
        counter_type: Set(kind.counter_type().to_string()),
        year: Set(year),
        last_number: Set(1),
        ..Default::default()
    };

    IdCounters::insert(model)
        .on_conflict(
            OnConflict::columns([Column::CounterType, Column::Year])
                .value(
                    Column::LastNumber,
                    Expr::col((IdCounters, Column::LastNumber)).add(1),
                )
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .map_err(|e| SchoolSystemError::database_operation(format!("递增编号计数器失败: {e}")))?;

    let counter = IdCounters::find()
        .filter(Column::CounterType.eq(kind.counter_type()))
        .filter(Column::Year.eq(year))
        .one(conn)
        .await
        .map_err(|e| SchoolSystemError::database_operation(format!("读取编号计数器失败: {e}")))?
        .ok_or_else(|| {
            SchoolSystemError::database_operation(format!(
                "编号计数器缺失: {} {}",
                kind.counter_type(),
                year
            ))
        })?;

    Ok(format_identifier(kind, year, counter.last_number))
}

pub(crate) fn current_year() -> i32 {
    chrono::Utc::now().year()
}

impl SeaOrmStorage {
    /// 独立事务中生成编号
    pub async fn next_identifier_impl(&self, kind: IdentifierKind) -> Result<String> {
        let txn = self.db.begin().await?;
        let identifier = next_identifier_in(&txn, kind, current_year()).await?;
        txn.commit().await?;
        Ok(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::memory_storage;

    #[actix_web::test]
    async fn test_first_call_of_year_starts_at_one() {
        let storage = memory_storage().await;
        let id = next_identifier_in(&storage.db, IdentifierKind::Student, 2025)
            .await
            .unwrap();
        assert_eq!(id, "BFPS-2025-0001");
    }

    #[actix_web::test]
    async fn test_numbers_are_sequential_per_kind_and_year() {
        let storage = memory_storage().await;
        for expected in ["EMP-2025-0001", "EMP-2025-0002", "EMP-2025-0003"] {
            let id = next_identifier_in(&storage.db, IdentifierKind::Teacher, 2025)
                .await
                .unwrap();
            assert_eq!(id, expected);
        }

        // 不同年份、不同类型各自计数
        let id = next_identifier_in(&storage.db, IdentifierKind::Teacher, 2026)
            .await
            .unwrap();
        assert_eq!(id, "EMP-2026-0001");
        let id = next_identifier_in(&storage.db, IdentifierKind::Parent, 2025)
            .await
            .unwrap();
        assert_eq!(id, "P-2025-0001");
    }

    #[actix_web::test]
    async fn test_rolled_back_transaction_does_not_consume_number() {
        let storage = memory_storage().await;
        {
            let txn = storage.db.begin().await.unwrap();
            next_identifier_in(&txn, IdentifierKind::Applicant, 2025)
                .await
                .unwrap();
            txn.rollback().await.unwrap();
        }
        let id = next_identifier_in(&storage.db, IdentifierKind::Applicant, 2025)
            .await
            .unwrap();
        assert_eq!(id, "APP-2025-0001");
    }

    #[actix_web::test]
    async fn test_next_identifier_uses_current_year() {
        let storage = memory_storage().await;
        let id = storage
            .next_identifier_impl(IdentifierKind::Student)
            .await
            .unwrap();
        assert_eq!(id, format!("BFPS-{}-0001", current_year()));
    }

    #[actix_web::test]
    async fn test_concurrent_issue_over_pooled_file_db_is_gapless() {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
        use std::time::Duration;

        const TASKS: usize = 40;

        // 多连接必须落盘，内存库每个连接各自一份
        let path = std::env::temp_dir().join(format!("ids-{}.db", uuid::Uuid::new_v4()));
        let opt = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10));
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(opt)
            .await
            .unwrap();
        let storage =
            SeaOrmStorage::with_connection(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
                .await
                .unwrap();

        let results = futures_util::future::join_all(
            (0..TASKS).map(|_| storage.next_identifier_impl(IdentifierKind::Student)),
        )
        .await;
        let mut ids: Vec<String> = results.into_iter().map(|r| r.unwrap()).collect();
        ids.sort();

        let year = current_year();
        let expected: Vec<String> = (1..=TASKS)
            .map(|n| format!("BFPS-{year}-{n:04}"))
            .collect();
        assert_eq!(ids, expected);

        drop(storage);
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }
}
