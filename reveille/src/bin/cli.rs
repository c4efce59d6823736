//! Command-line interface for the alarm clock.
//!
//! Talks to a running `reveille-clockd` through its HTTP API.

use std::env;

use anyhow::Result;

use reveille::api_client;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        usage();
        std::process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "status" => cmd_status().await?,
        "press" => match args.get(2) {
            Some(button) => cmd_press(button).await?,
            None => {
                eprintln!("Usage: reveille-cli press <button>");
                std::process::exit(1);
            }
        },
        "dismiss" => cmd_dismiss().await?,
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("Run without arguments to see usage.");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn usage() {
    eprintln!("Usage: reveille-cli <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status            Show the clock face");
    eprintln!("  press <button>    Press a button: mode-toggle, increment, decrement,");
    eprintln!("                    confirm-or-silence, alarm-toggle");
    eprintln!("  dismiss           Silence a ringing alarm");
    eprintln!();
    eprintln!("Environment:");
    eprintln!(
        "  REVEILLE_API_URL  API base URL (default: {})",
        api_client::DEFAULT_BASE_URL
    );
}

/// Build an API client, honoring REVEILLE_API_URL if set.
fn make_client() -> api_client::Client {
    match env::var("REVEILLE_API_URL") {
        Ok(url) => api_client::Client::with_base_url(url),
        Err(_) => api_client::Client::new(),
    }
}

async fn cmd_status() -> Result<()> {
    let client = make_client();
    let status = client.get_status().await?;

    println!("Time:     {}", status.time);
    println!(
        "Alarm:    {} ({})",
        status.alarm,
        if status.alarm_enabled { "on" } else { "off" }
    );
    if let Some(field) = &status.editing {
        println!("Editing:  {field}");
    }
    println!("Ringing:  {}", if status.ringing { "yes" } else { "no" });
    println!(
        "Speaker:  {}",
        if status.notifier_connected {
            "connected"
        } else {
            "disconnected"
        }
    );

    Ok(())
}

async fn cmd_press(button: &str) -> Result<()> {
    make_client().press(button).await?;
    println!("Pressed {button}");
    Ok(())
}

async fn cmd_dismiss() -> Result<()> {
    make_client().dismiss().await?;
    println!("Dismiss sent");
    Ok(())
}
