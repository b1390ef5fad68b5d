//! Database connection bootstrap. A thin wrapper over sea-orm's own
//! pool; transaction sharing across requests was dropped from the
//! teacher's version (see DESIGN.md) since no route here needs it.

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::error::AppError;

pub async fn connect(database_url: &str) -> Result<DatabaseConnection, AppError> {
    let mut opts = ConnectOptions::new(database_url.to_owned());
    opts.sqlx_logging(false);
    Database::connect(opts).await.map_err(AppError::from)
}
