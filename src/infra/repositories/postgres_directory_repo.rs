use crate::domain::{
    models::directory::{Location, Organization, Room, ServiceOffered, Student, Tutor},
    ports::DirectoryRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresDirectoryRepo {
    pool: PgPool,
}

impl PostgresDirectoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryRepository for PostgresDirectoryRepo {
    async fn find_organization(&self, id: &str) -> Result<Option<Organization>, AppError> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_location(&self, id: &str) -> Result<Option<Location>, AppError> {
        sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_service(&self, id: &str) -> Result<Option<ServiceOffered>, AppError> {
        sqlx::query_as::<_, ServiceOffered>("SELECT * FROM services_offered WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_tutor(&self, id: &str) -> Result<Option<Tutor>, AppError> {
        sqlx::query_as::<_, Tutor>("SELECT * FROM tutors WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn tutor_serves_location(&self, tutor_id: &str, location_id: &str) -> Result<bool, AppError> {
        let found = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM tutor_locations WHERE tutor_id = $1 AND location_id = $2)")
            .bind(tutor_id).bind(location_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(found)
    }
    async fn find_rooms(&self, ids: &[String]) -> Result<Vec<Room>, AppError> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ANY($1)").bind(ids).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_students(&self, ids: &[String]) -> Result<Vec<Student>, AppError> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = ANY($1)").bind(ids).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
