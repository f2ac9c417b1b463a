//! Report repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::reports;
use crate::entities::sea_orm_active_enums::ReportType;

/// Fields for filing a report.
#[derive(Debug, Clone)]
pub struct NewReport {
    /// Reporting user.
    pub user_id: Uuid,
    /// Pet the report concerns, if known.
    pub pet_id: Option<Uuid>,
    /// Report kind.
    pub report_type: ReportType,
    /// Free-text message.
    pub message: String,
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Files a new report.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: NewReport) -> Result<reports::Model, DbErr> {
        let report = reports::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(input.user_id),
            pet_id: Set(input.pet_id),
            report_type: Set(input.report_type),
            message: Set(input.message),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now().into()),
        };

        report.insert(&self.db).await
    }

    /// All active reports filed by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<reports::Model>, DbErr> {
        reports::Entity::find()
            .filter(reports::Column::UserId.eq(user_id))
            .filter(reports::Column::IsActive.eq(true))
            .order_by_desc(reports::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Hard-deletes every report filed by a user (account-deletion cascade).
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_by_user(&self, user_id: Uuid) -> Result<u64, DbErr> {
        let result = reports::Entity::delete_many()
            .filter(reports::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
