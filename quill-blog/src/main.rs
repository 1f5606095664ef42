use quill_blog::{application, AppState};
use quill_core::{init_tracing, QuillConfig, ServerConfig};
use quill_data_sqlx::{Database, DatabaseConfig};
use quill_security::{SessionCodec, SessionConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = QuillConfig::load("dev")?;
    let server = config.section::<ServerConfig>()?;
    let db_config = config.section::<DatabaseConfig>()?;
    let session_config = config.section::<SessionConfig>()?;

    let db = Database::connect(&db_config).await?;
    let state = AppState::new(db.clone(), SessionCodec::new(session_config));
    if config.get_or("db.bootstrap", false) {
        state.create_tables().await?;
    }

    info!(profile = %config.profile(), "server started at http://{}...", server.addr());
    application(state, &server.templates)?
        .on_stop(move || async move { db.close().await })
        .serve(&server.addr())
        .await
}
