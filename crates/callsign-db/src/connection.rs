//! Opening the user database: connect, authenticate, select and migrate.
//!
//! A [`DbManager`] only exists once the schema is current, so nothing
//! can hand out a repository over an unmigrated database.

use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;
use crate::repository::SurrealUserRepository;
use crate::schema::run_migrations;

/// Root credentials for a server started with authentication.
#[derive(Debug, Clone)]
pub struct DbCredentials {
    pub username: String,
    pub password: String,
}

/// Where the user database lives.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address, e.g. `127.0.0.1:8000`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// `None` skips sign-in (server running with `--unauthenticated`).
    pub credentials: Option<DbCredentials>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "callsign".into(),
            database: "main".into(),
            credentials: Some(DbCredentials {
                username: "root".into(),
                password: "root".into(),
            }),
        }
    }
}

/// A migrated database handle.
#[derive(Clone)]
pub struct DbManager<C: Connection = Client> {
    db: Surreal<C>,
}

impl DbManager<Client> {
    /// Connect over WebSocket, sign in when credentials are configured,
    /// then [`open`](Self::open) the configured namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            authenticated = config.credentials.is_some(),
            "Connecting to user database"
        );

        let db = Surreal::new::<Ws>(config.url.as_str()).await?;
        if let Some(credentials) = &config.credentials {
            db.signin(Root {
                username: credentials.username.clone(),
                password: credentials.password.clone(),
            })
            .await?;
        }

        Self::open(db, &config.namespace, &config.database).await
    }
}

impl<C: Connection> DbManager<C> {
    /// Select `namespace`/`database` on an established client and apply
    /// pending migrations.
    pub async fn open(db: Surreal<C>, namespace: &str, database: &str) -> Result<Self, DbError> {
        db.use_ns(namespace).use_db(database).await?;
        run_migrations(&db).await?;

        info!(namespace, database, "User database ready");
        Ok(Self { db })
    }

    /// A user store sharing this connection.
    pub fn users(&self) -> SurrealUserRepository<C> {
        SurrealUserRepository::new(self.db.clone())
    }

    pub fn client(&self) -> &Surreal<C> {
        &self.db
    }
}
