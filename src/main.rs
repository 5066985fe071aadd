use std::process::ExitCode;
use std::sync::Arc;

use chrono::Local;
use clap::Parser;
use tracing::error;

use chronoslot::calendar::google::GoogleCalendarService;
use chronoslot::cli::Cli;
use chronoslot::config::SchedulerConfig;
use chronoslot::logging;
use chronoslot::pipeline::Pipeline;
use chronoslot::stores::DbPool;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match SchedulerConfig::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            return ExitCode::from(err.exit_code() as u8);
        }
    };

    if let Err(err) = logging::init_logging(&config.log_dir) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::from(err.exit_code() as u8);
    }

    let db = match DbPool::new(&config.database_path) {
        Ok(db) => db,
        Err(err) => {
            error!(error = %err, "failed to open database");
            return ExitCode::from(err.exit_code() as u8);
        }
    };

    let calendar = Arc::new(GoogleCalendarService::new(
        config.calendar.calendar_id.clone(),
        config.calendar_tags.clone(),
        config.calendar.time_zone.clone(),
        config.calendar.oauth(),
    ));

    let pipeline = Pipeline::new(calendar, config);
    let now = Local::now().fixed_offset();

    let conn = match db.get_connection() {
        Ok(conn) => conn,
        Err(err) => {
            error!(error = %err, "failed to open database connection");
            return ExitCode::from(err.exit_code() as u8);
        }
    };

    match pipeline.run(&conn, now, cli.dry_run, cli.erase_owned).await {
        Ok(events) => {
            println!("placed {} task(s)", events.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "scheduling run failed");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
