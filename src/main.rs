use pawbook::api::{self, ApiContext};
use pawbook::{config, db, init_tracing};

#[tokio::main]
async fn main() {
    init_tracing();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let db_path = config::database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).expect("Cannot create data directory");
    }

    // Opening runs pending migrations; the connection itself is per-request.
    let conn = db::open_database(&db_path).expect("Database initialization failed");
    drop(conn);
    tracing::info!(path = %db_path.display(), "database ready");

    let ctx = ApiContext::new(db_path);
    api::serve(ctx, config::server_addr())
        .await
        .expect("error while running Pawbook");
}
