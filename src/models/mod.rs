pub mod entry;
pub mod event_pref;
pub mod speaker;
pub mod survey;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};

/// Create any missing tables on startup. Idempotent.
pub async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, entry::Entity).await?;
    create_table(db, speaker::Entity).await?;
    create_table(db, survey::Entity).await?;
    create_table(db, event_pref::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}

/// Whether a save failed on a uniqueness constraint (duplicate slug).
/// SQLite reports these as "UNIQUE constraint failed" in the driver error.
pub fn is_unique_violation(err: &DbErr) -> bool {
    match err {
        DbErr::Exec(runtime) | DbErr::Query(runtime) => {
            runtime.to_string().contains("UNIQUE constraint failed")
        }
        _ => false,
    }
}
