use clap::Parser;
use serde::Serialize;
use sge_admin::api::ApiClient;
use sge_admin::config::{CliConfig, Command, DateCommand, ReportKind, TomlConfig};
use sge_admin::core::dates;
use sge_admin::core::export::export_collection;
use sge_admin::core::store::AppStore;
use sge_admin::domain::model::{
    Course, Enrollment, EntityKind, Evaluation, Grade, Offer, Professor, Student, Subject,
};
use sge_admin::domain::ports::{ConfigProvider, Resource, ResourceKey};
use sge_admin::utils::{logger, validation::Validate};
use sge_admin::{Notifier, Result, SgeError};
use std::sync::Arc;

/// Runs a generic per-resource handler for the concrete type behind `kind`.
macro_rules! dispatch {
    ($kind:expr, $handler:ident ( $($arg:expr),* )) => {
        match $kind {
            EntityKind::Students => $handler::<Student>($($arg),*).await,
            EntityKind::Courses => $handler::<Course>($($arg),*).await,
            EntityKind::Professors => $handler::<Professor>($($arg),*).await,
            EntityKind::Subjects => $handler::<Subject>($($arg),*).await,
            EntityKind::Offers => $handler::<Offer>($($arg),*).await,
            EntityKind::Evaluations => $handler::<Evaluation>($($arg),*).await,
            EntityKind::Enrollments => $handler::<Enrollment>($($arg),*).await,
            EntityKind::Grades => $handler::<Grade>($($arg),*).await,
        }
    };
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 載入 TOML 配置 (可選)
    let toml_config = match &config.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(toml_config) => Some(toml_config),
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(e.exit_code());
            }
        },
        None => None,
    };

    // 初始化日誌
    let level = toml_config.as_ref().and_then(|c| c.log_level());
    let json_logs = config.log_json || toml_config.as_ref().is_some_and(|c| c.json_logs());
    if json_logs {
        logger::init_json_logger(config.verbose, level);
    } else {
        logger::init_cli_logger(config.verbose, level);
    }

    tracing::info!("Starting sge-admin");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let setup = match toml_config {
        Some(mut toml_config) => {
            toml_config.apply_overrides(config.api_base_url.as_deref(), config.timeout_seconds);
            connect(&toml_config)
        }
        None => connect(&config),
    };

    let (client, notifier) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = run(config.command, client, notifier).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn connect<C: ConfigProvider + Validate>(config: &C) -> Result<(ApiClient, Arc<Notifier>)> {
    config.validate()?;
    tracing::info!("🔗 API base URL: {}", config.api_base_url());

    let notifier = Arc::new(Notifier::new(config.dedup_window()));
    let client = ApiClient::from_config(config)?.with_notifier(notifier.clone());
    Ok((client, notifier))
}

async fn run(command: Command, client: ApiClient, notifier: Arc<Notifier>) -> Result<()> {
    match command {
        Command::List { entity } => dispatch!(entity, list_records(&client)),
        Command::Get { entity, key } => dispatch!(entity, get_record(&client, &key)),
        Command::Create { entity, data } => dispatch!(entity, create_record(&client, &data)),
        Command::Update { entity, key, data } => {
            dispatch!(entity, update_record(&client, &key, &data))
        }
        Command::Delete { entity, key } => dispatch!(entity, delete_record(&client, &key)),
        Command::Export {
            entity,
            format,
            output,
        } => {
            let table = export_collection(&client, entity, format).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, table)?;
                    tracing::info!("📁 Export saved to: {}", path);
                    println!("📁 Export saved to: {}", path);
                }
                None => print!("{}", table),
            }
            Ok(())
        }
        Command::Dashboard => dashboard(client, notifier).await,
        Command::Report { kind } => match kind {
            ReportKind::CourseStatistics => print_json(&client.course_statistics().await?),
            ReportKind::OffersComplete => print_json(&client.offers_complete_report().await?),
        },
        Command::Date { command } => convert_date(command),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn list_records<E: Resource>(client: &ApiClient) -> Result<()> {
    let records = client.list::<E>().await?;
    tracing::info!("Fetched {} {} records", records.len(), E::KIND);
    print_json(&records)
}

async fn get_record<E: Resource>(client: &ApiClient, key: &[String]) -> Result<()> {
    let key = <E::Key as ResourceKey>::from_segments(key)?;
    print_json(&client.get::<E>(&key).await?)
}

async fn create_record<E: Resource>(client: &ApiClient, data: &str) -> Result<()> {
    let record: E = serde_json::from_str(data)?;
    let ack = client.create(&record).await?;
    tracing::info!("✅ Created {} record", E::KIND);
    print_json(&ack)
}

async fn update_record<E: Resource>(client: &ApiClient, key: &[String], data: &str) -> Result<()> {
    let key = <E::Key as ResourceKey>::from_segments(key)?;
    let record: E = serde_json::from_str(data)?;
    let ack = client.update(&key, &record).await?;
    tracing::info!("✅ Updated {} {}", E::KIND, key);
    print_json(&ack)
}

async fn delete_record<E: Resource>(client: &ApiClient, key: &[String]) -> Result<()> {
    let key = <E::Key as ResourceKey>::from_segments(key)?;
    let ack = client.delete::<E>(&key).await?;
    tracing::info!("✅ Deleted {} {}", E::KIND, key);
    print_json(&ack)
}

async fn dashboard(client: ApiClient, notifier: Arc<Notifier>) -> Result<()> {
    let mut store = AppStore::new(client.clone(), notifier);
    let summary = store.load_all().await;

    let report = match client.dashboard_report().await {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::warn!("Dashboard report unavailable: {}", e);
            None
        }
    };

    let failed: Vec<&str> = summary.failed.iter().map(|k| k.name()).collect();
    print_json(&serde_json::json!({
        "counts": summary.counts,
        "failed": failed,
        "report": report,
    }))
}

fn convert_date(command: DateCommand) -> Result<()> {
    let (text, converted) = match command {
        DateCommand::ToIso { text } => {
            let converted = dates::to_iso(&text);
            (text, converted)
        }
        DateCommand::ToLocalized { text } => {
            let converted = dates::to_localized(&text);
            (text, converted)
        }
    };

    let converted = converted.ok_or_else(|| SgeError::ValidationError {
        message: format!("'{}' is not a recognizable date", text),
    })?;
    println!("{}", converted);
    Ok(())
}
