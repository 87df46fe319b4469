use actix_web::web;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use validator::Validate;

use crate::config::{AppData, Config};
use crate::db::apply_schema;
use crate::errors::AppError;
use crate::handlers::resource::Resource;
use crate::models::{PersistenceObject, StoreError};
use crate::utils::validation::required;

fn test_config() -> Config {
    Config::from_lookup(|_| None).expect("default config")
}

/// App data whose pool never connects successfully; any database access
/// turns into a store error.
pub fn lazy_app_data() -> web::Data<AppData> {
    let db = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://nobody@127.0.0.1:1/nothing")
        .expect("lazy pool");
    web::Data::new(AppData { config: test_config(), db })
}

/// App data backed by the database at `DTB_TEST_DATABASE_URL`, with the schema applied.
pub async fn database_app_data() -> web::Data<AppData> {
    let url = std::env::var("DTB_TEST_DATABASE_URL").expect("DTB_TEST_DATABASE_URL must be set");
    let db = PgPoolOptions::new()
        .connect(&url)
        .await
        .expect("connect to test database");
    apply_schema(&db, include_str!("../schema.sql"))
        .await
        .expect("apply schema");
    web::Data::new(AppData { config: test_config(), db })
}

/// Rows of the in-memory `Note` entity.
static NOTES: Mutex<BTreeMap<String, Note>> = Mutex::new(BTreeMap::new());

/// Reported as present by `Note::exists` although no row backs it, so
/// mutating statements against it touch zero rows.
pub const VANISHED_NOTE_ID: &str = "vanished-note";

/// Entity kept in process memory; runs the request pipeline without a database.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub note_id: String,
    pub text: String,
}

#[derive(Deserialize, Validate, Debug)]
pub struct NoteRequest {
    #[validate(required)]
    text: Option<String>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct NoteResponse {
    note_id: String,
    text: String,
}

fn notes() -> MutexGuard<'static, BTreeMap<String, Note>> {
    NOTES.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl PersistenceObject for Note {
    const TYPE_NAME: &'static str = "note";

    fn id(&self) -> &str {
        &self.note_id
    }

    async fn exists(_db: &PgPool, id: &str) -> Result<bool, StoreError> {
        Ok(id == VANISHED_NOTE_ID || notes().contains_key(id))
    }

    async fn get(_db: &PgPool, id: &str) -> Result<Self, StoreError> {
        notes().get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn save(&self, _db: &PgPool) -> Result<(), StoreError> {
        notes().insert(self.note_id.clone(), self.clone());
        Ok(())
    }

    async fn update(&self, _db: &PgPool) -> Result<(), StoreError> {
        match notes().get_mut(&self.note_id) {
            Some(note) => {
                *note = self.clone();
                Ok(())
            }
            None => Err(StoreError::NoRowsAffected),
        }
    }

    async fn delete(_db: &PgPool, id: &str) -> Result<(), StoreError> {
        notes().remove(id).map(|_| ()).ok_or(StoreError::NoRowsAffected)
    }

    async fn list_all(_db: &PgPool) -> Result<Vec<Self>, StoreError> {
        Ok(notes().values().cloned().collect())
    }
}

impl Resource for Note {
    const COLLECTION: &'static str = "notes";

    type Request = NoteRequest;
    type Response = NoteResponse;

    fn from_request(id: String, request: NoteRequest) -> Result<Self, AppError> {
        Ok(Note { note_id: id, text: required(request.text)? })
    }

    fn to_response(&self) -> NoteResponse {
        NoteResponse { note_id: self.note_id.clone(), text: self.text.clone() }
    }
}
