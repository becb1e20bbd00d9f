use clap::Parser;
use colored::*;
use log::*;
use netlog::adb::AdbServer;
use netlog::capture::{Capture, CaptureOptions, CaptureReport};
use netlog::cli::Cli;
use netlog::config::Config;
use netlog::device::{AdbDevice, DeviceManager};
use netlog::error::Result;
use netlog::progress::ProgressFactory;
use netlog::signal::Interrupt;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    // Listen before touching the device so an early ctrl-C is not lost.
    let interrupt = Interrupt::listen();

    match run(&cli, interrupt).await {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, interrupt: Interrupt) -> Result<CaptureReport> {
    let config = Config::load();
    if let Some(adb_path) = &cli.adb_path {
        AdbServer::set_adb_path(adb_path.clone());
    }
    let (host, port) = cli.address(&config);

    let manager = DeviceManager::with_address(host.clone(), port);
    let target = manager.get_target_device(&cli.device_serials(&config)).await?;
    info!("Using device {}", target.display_name());

    let device = AdbDevice::new(host, port, target.id);
    let options = CaptureOptions::new(cli.package.clone())
        .with_force(cli.force)
        .with_output(cli.output_path(&config));

    let mut capture = Capture::new(&device, options).with_progress(ProgressFactory::for_stdout());
    let result = capture.run(interrupt.wait()).await;
    debug!("Capture states: {:?}", capture.history());
    result
}

fn print_report(report: &CaptureReport) {
    for warning in &report.warnings {
        println!("{} {}", "Warning:".yellow().bold(), warning);
    }
    println!(
        "Wrote {} ({} bytes)",
        format!("\"{}\"", report.artifact.local.display()).bright_cyan(),
        report.bytes
    );
}
