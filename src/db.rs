// connexion BD + création du schéma à partir des entités

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};

use crate::config::AppConfig;
use crate::models::{
    favorite, ingredient, recipe, recipe_ingredient, recipe_tag, shopping_cart, subscription, tag,
    users,
};

pub async fn establish_connection(config: &AppConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging_level(log::LevelFilter::Debug);

    Database::connect(options).await
}

/// Crée les tables manquantes, dans l'ordre des clés étrangères
pub async fn create_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    create_table(db, users::Entity).await?;
    create_table(db, tag::Entity).await?;
    create_table(db, ingredient::Entity).await?;
    create_table(db, recipe::Entity).await?;
    create_table(db, recipe_tag::Entity).await?;
    create_table(db, recipe_ingredient::Entity).await?;
    create_table(db, favorite::Entity).await?;
    create_table(db, shopping_cart::Entity).await?;
    create_table(db, subscription::Entity).await?;

    Ok(())
}

async fn create_table<C, E>(db: &C, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(backend.build(&statement)).await?;
    log::debug!("Table ready: {}", entity.table_name());
    Ok(())
}

/// Base SQLite en mémoire avec le schéma complet.
/// Une seule connexion : chaque connexion SQLite en mémoire a sa propre base.
#[cfg(test)]
pub async fn test_connection() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    create_schema(&db).await.expect("Failed to create schema");
    db
}
