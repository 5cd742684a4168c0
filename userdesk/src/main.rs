use userdesk::AppSettings;
use userdesk_core::{init_tracing, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load("dev")?;
    let settings: AppSettings = config.section()?;
    init_tracing(settings.json_logs);
    tracing::info!(profile = config.profile(), "configuration loaded");

    userdesk::run(settings).await
}
