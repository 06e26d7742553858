use rsvp_app::seeder::{Seeder, category::CategorySeeder};
use rsvp_core::config::load_config;
use rsvp_db::db::connection::{connect, create_pool};
use rsvp_db::db::migrate::run_migrations;
use rsvp_db::db::query::{category, event, user};
use rsvp_service::context::ServiceContext;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting RSVP");

    let config = load_config()?;

    tracing::debug!(
        max_connections = config.database.max_connections,
        logging = %config.logging.level,
        start_time_tolerance_secs = config.validation.start_time_tolerance_secs,
        "Configuration loaded"
    );

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    run_migrations(&config.database.url).await?;

    let pool = create_pool(
        &config.database.url,
        u32::from(config.database.max_connections),
    )
    .await?;
    let mut conn = connect(&pool).await?;

    let seeded = CategorySeeder::from_config(&config.seed)
        .seed(&mut conn)
        .await?;

    let users = user::count_users(&mut conn).await?;
    let ctx = ServiceContext::from_settings(&config);
    let events = event::count_events(&mut conn).await?;
    let current_events = event::load_events(
        &mut conn,
        event::EventFilter::new().active().current(ctx.now()),
    )
    .await?
    .len();
    let active_categories =
        category::load_categories(&mut conn, category::CategoryFilter::new().active())
            .await?
            .len();

    tracing::info!(
        seeded,
        users,
        events,
        current_events,
        active_categories,
        "Database ready"
    );

    Ok(())
}
