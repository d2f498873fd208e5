use launch_app::{run, AppConfig};

fn main() {
    tracing_subscriber::fmt::init();
    let config = AppConfig::from_env().unwrap_or_default();
    match run(config) {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("Failed to render launch report: {err}"),
        },
        Err(err) => eprintln!("Launch simulation failed: {err:#}"),
    }
}
