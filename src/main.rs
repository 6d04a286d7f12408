//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `tlsbatch` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! One URL is sent as a single request; several URLs go out as one batch.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::process;

use tlsbatch::config::Opt;
use tlsbatch::initialization::{init_logger_with, init_transport};
use tlsbatch::{BatchExecutor, Config, RequestExecutor, RequestOptions, Response, Session};

async fn run(opt: &Opt, config: &Config) -> Result<Vec<Response>> {
    let transport = init_transport(config).context("Failed to initialize bridge transport")?;
    let session = Session::from_config(transport, config)
        .temporary(true)
        .build();

    let options = opt
        .parsed_headers()
        .into_iter()
        .fold(RequestOptions::new(), |options, (name, value)| {
            options.header(name, value)
        });

    if let [url] = opt.urls.as_slice() {
        let response = session
            .request(&opt.method, url, options)
            .await
            .with_context(|| format!("Request to {url} failed"))?;
        return Ok(vec![response]);
    }

    let mut batch = opt
        .urls
        .iter()
        .map(|url| {
            RequestExecutor::new(
                Arc::clone(&session),
                opt.method.as_str(),
                url.as_str(),
                None,
                options.clone(),
            )
        })
        .collect::<Result<BatchExecutor, _>>()
        .context("Invalid request")?;
    batch
        .execute_pool()
        .await
        .with_context(|| format!("Batch of {} requests failed", opt.urls.len()))
}

fn print_response(response: &Response, show_body: bool) {
    let status = if response.ok() {
        response.to_string().green()
    } else {
        response.to_string().red()
    };
    let elapsed = response.elapsed().unwrap_or(Duration::ZERO);
    println!(
        "{} {} {} ({:.0?})",
        status,
        response.reason(),
        response.url(),
        elapsed
    );
    if show_body {
        println!("{}", response.raw().text_lossy(response.encoding()));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();
    let config = Config::from(&opt);

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    match run(&opt, &config).await {
        Ok(responses) => {
            for response in &responses {
                print_response(response, opt.show_body);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("tlsbatch error: {:#}", e);
            process::exit(1);
        }
    }
}
