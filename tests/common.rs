use scheduling_backend::{
    api::router::create_router,
    config::Config,
    infra::factory::sqlite_state,
    state::AppState,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use chrono::Utc;
use std::str::FromStr;
use tower::ServiceExt;
use serde_json::Value;

/// Directory rows every test starts from.
///
/// `location` is served by `tutor` and `tutor_b`; `other_location` belongs
/// to the same organization but shares none of its rooms, students or services.
#[allow(dead_code)]
pub struct Fixture {
    pub org: String,
    pub location: String,
    pub other_location: String,
    pub service: String,
    pub premium_service: String,
    pub other_service: String,
    pub tutor: String,
    pub tutor_b: String,
    pub unassigned_tutor: String,
    pub room: String,
    pub room_b: String,
    pub other_room: String,
    pub student: String,
    pub student_b: String,
    pub student_c: String,
    pub archived_student: String,
    pub other_student: String,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            db_max_connections: None,
        };

        let state = Arc::new(sqlite_state(&config, pool.clone()));
        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    /// Seeds one organization with the given default buffer and its directory rows.
    pub async fn seed(&self, buffer_minutes: i32) -> Fixture {
        let now = Utc::now();
        let id = |prefix: &str| format!("{}-{}", prefix, Uuid::new_v4());

        let fx = Fixture {
            org: id("org"),
            location: id("loc"),
            other_location: id("loc"),
            service: id("svc"),
            premium_service: id("svc"),
            other_service: id("svc"),
            tutor: id("tutor"),
            tutor_b: id("tutor"),
            unassigned_tutor: id("tutor"),
            room: id("room"),
            room_b: id("room"),
            other_room: id("room"),
            student: id("student"),
            student_b: id("student"),
            student_c: id("student"),
            archived_student: id("student"),
            other_student: id("student"),
        };

        sqlx::query("INSERT INTO organizations (id, name, default_buffer_minutes, created_at) VALUES (?, ?, ?, ?)")
            .bind(&fx.org).bind("Tutoring Co").bind(buffer_minutes).bind(now)
            .execute(&self.pool).await.unwrap();

        for (loc, name) in [(&fx.location, "Downtown"), (&fx.other_location, "Uptown")] {
            sqlx::query("INSERT INTO locations (id, organization_id, name, created_at) VALUES (?, ?, ?, ?)")
                .bind(loc).bind(&fx.org).bind(name).bind(now)
                .execute(&self.pool).await.unwrap();
        }

        for (svc, loc, rate) in [
            (&fx.service, &fx.location, Some(6000_i64)),
            (&fx.premium_service, &fx.location, Some(9000_i64)),
            (&fx.other_service, &fx.other_location, None),
        ] {
            sqlx::query("INSERT INTO services_offered (id, location_id, name, hourly_rate_cents, created_at) VALUES (?, ?, ?, ?, ?)")
                .bind(svc).bind(loc).bind("Math").bind(rate).bind(now)
                .execute(&self.pool).await.unwrap();
        }

        for tutor in [&fx.tutor, &fx.tutor_b, &fx.unassigned_tutor] {
            sqlx::query("INSERT INTO tutors (id, organization_id, name, created_at) VALUES (?, ?, ?, ?)")
                .bind(tutor).bind(&fx.org).bind("Tutor").bind(now)
                .execute(&self.pool).await.unwrap();
        }
        for tutor in [&fx.tutor, &fx.tutor_b] {
            sqlx::query("INSERT INTO tutor_locations (tutor_id, location_id) VALUES (?, ?)")
                .bind(tutor).bind(&fx.location)
                .execute(&self.pool).await.unwrap();
        }

        for (room, loc) in [(&fx.room, &fx.location), (&fx.room_b, &fx.location), (&fx.other_room, &fx.other_location)] {
            sqlx::query("INSERT INTO rooms (id, location_id, name, created_at) VALUES (?, ?, ?, ?)")
                .bind(room).bind(loc).bind("Room").bind(now)
                .execute(&self.pool).await.unwrap();
        }

        for (student, loc, archived_at) in [
            (&fx.student, &fx.location, None),
            (&fx.student_b, &fx.location, None),
            (&fx.student_c, &fx.location, None),
            (&fx.archived_student, &fx.location, Some(now)),
            (&fx.other_student, &fx.other_location, None),
        ] {
            sqlx::query("INSERT INTO students (id, location_id, name, archived_at, created_at) VALUES (?, ?, ?, ?, ?)")
                .bind(student).bind(loc).bind("Student").bind(archived_at).bind(now)
                .execute(&self.pool).await.unwrap();
        }

        fx
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(body)).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    /// Creates an entry or series and returns the response body, panicking on failure.
    pub async fn create(&self, body: Value) -> Value {
        let (status, created) = self.post("/api/v1/schedule-entries", body).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", created);
        created
    }

    pub async fn entry(&self, id: &str) -> Value {
        let (status, body) = self.get(&format!("/api/v1/schedule-entries/{}", id)).await;
        assert_eq!(status, StatusCode::OK, "entry {} not readable: {}", id, body);
        body
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

/// Body for an ad hoc booking of `fx.tutor` at `fx.location`.
#[allow(dead_code)]
pub fn entry_body(fx: &Fixture, start_at: &str, duration_minutes: i32) -> Value {
    serde_json::json!({
        "organization_id": fx.org,
        "location_id": fx.location,
        "service_offered_id": fx.service,
        "tutor_id": fx.tutor,
        "start_at": start_at,
        "duration_minutes": duration_minutes,
    })
}

/// Ids of a series in start order.
#[allow(dead_code)]
pub async fn series_ids(app: &TestApp, fx: &Fixture, series_id: &str) -> Vec<String> {
    let (status, body) = app
        .get(&format!("/api/v1/locations/{}/schedule-entries?series_id={}&archived=all", fx.location, series_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    body.as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect()
}
