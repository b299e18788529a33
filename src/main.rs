use newsletter::{config::AppConfig, App, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // We have a different logging mechanism for production
    #[cfg(not(debug_assertions))]
    {
        newsletter::init_production_tracing()
    }
    #[cfg(debug_assertions)]
    {
        newsletter::init_dbg_tracing();
    }

    let config = AppConfig::load()?;
    let app = App::build_from_config(config).await?;

    newsletter::serve(app).await?;

    Ok(())
}
