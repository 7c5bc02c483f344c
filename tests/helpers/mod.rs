#![allow(dead_code)]

use std::{path::PathBuf, str::FromStr};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use pensum::{
    AppState,
    config::{Config, DatabaseConfig, IdentityConfig, LogConfig, ServerConfig, TeacherConfig},
};
use pensum_shared::{State, TeacherPolicy};
use serde_json::Value;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use sqlx_migrator::{Migrate, Plan};
use tower::ServiceExt;

pub const TEACHER: &str = "teacher@pensum.localhost";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_owned(),
            max_connections: 1,
        },
        identity: IdentityConfig {
            secret: "test_secret_key_minimum_32_characters_long".to_owned(),
            issuer: "pensum-identity".to_owned(),
            audience: "pensum".to_owned(),
        },
        teacher: TeacherConfig {
            emails: vec![TEACHER.to_owned()],
        },
        log: LogConfig::default(),
    }
}

pub async fn setup_test_app(path: PathBuf) -> anyhow::Result<TestApp> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;
    let mut conn = pool.acquire().await?;
    pensum_db::migrator()?
        .run(&mut conn, &Plan::apply_all())
        .await?;
    drop(conn);

    let config = test_config();
    let state = State::single(pool.clone());
    let app_state = AppState {
        command: pensum_course::Command::new(
            state.clone(),
            TeacherPolicy::new(config.teacher.emails.iter().cloned()),
        ),
        query: pensum_course::Query::new(state),
        config: config.clone(),
        pool,
    };

    Ok(TestApp {
        router: pensum::router(app_state),
        config,
    })
}

pub struct TestApp {
    pub router: Router,
    pub config: Config,
}

impl TestApp {
    pub fn token(&self, user_id: &str, email: &str) -> String {
        pensum::auth::generate_token(&self.config.identity, user_id, email, 3600).unwrap()
    }

    pub fn teacher_token(&self) -> String {
        self.token("user_teacher", TEACHER)
    }

    pub fn student_token(&self, user_id: &str) -> String {
        self.token(user_id, &format!("{user_id}@pensum.localhost"))
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok((status, value))
    }
}
