use crate::domain::{
    models::directory::{Location, Organization, Room, ServiceOffered, Student, Tutor},
    ports::DirectoryRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub struct SqliteDirectoryRepo {
    pool: SqlitePool,
}

impl SqliteDirectoryRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn in_list<'a>(select: &str, ids: &[String]) -> QueryBuilder<'a, Sqlite> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(select);
    qb.push(" WHERE id IN (");
    let mut list = qb.separated(", ");
    for id in ids {
        list.push_bind(id.clone());
    }
    list.push_unseparated(")");
    qb
}

#[async_trait]
impl DirectoryRepository for SqliteDirectoryRepo {
    async fn find_organization(&self, id: &str) -> Result<Option<Organization>, AppError> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_location(&self, id: &str) -> Result<Option<Location>, AppError> {
        sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_service(&self, id: &str) -> Result<Option<ServiceOffered>, AppError> {
        sqlx::query_as::<_, ServiceOffered>("SELECT * FROM services_offered WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_tutor(&self, id: &str) -> Result<Option<Tutor>, AppError> {
        sqlx::query_as::<_, Tutor>("SELECT * FROM tutors WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn tutor_serves_location(&self, tutor_id: &str, location_id: &str) -> Result<bool, AppError> {
        let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM tutor_locations WHERE tutor_id = ? AND location_id = ?")
            .bind(tutor_id).bind(location_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;
        Ok(found.is_some())
    }
    async fn find_rooms(&self, ids: &[String]) -> Result<Vec<Room>, AppError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        in_list("SELECT * FROM rooms", ids).build_query_as::<Room>().fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_students(&self, ids: &[String]) -> Result<Vec<Student>, AppError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        in_list("SELECT * FROM students", ids).build_query_as::<Student>().fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
