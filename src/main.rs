use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{interval_at, Instant};

use rps_client::config::ClientConfig;
use rps_client::flow::{FlowState, NoticeLevel, ResetFlowController};
use rps_client::services::verification::HttpVerificationService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("{}, falling back to defaults", e);
            ClientConfig::default()
        }
    };
    tracing::info!("Using API at {}", config.api_base_url);

    let service =
        Arc::new(HttpVerificationService::new(&config).context("Failed to build HTTP client")?);
    let mut controller = ResetFlowController::new(service);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Result Processing System — password reset");
    loop {
        match controller.state() {
            FlowState::LoggingIn => {
                println!("\nPress Enter to start a password reset, or type 'q' to quit.");
                let line = read_line(&mut lines).await?;
                if line.trim() == "q" {
                    break;
                }
                controller.forgot_password();
            }
            FlowState::AwaitingEmail => {
                let prefilled = controller.session().email.clone();
                if prefilled.is_empty() {
                    println!("\nEmail ('b' to go back):");
                } else {
                    println!("\nEmail [{}] ('b' to go back):", prefilled);
                }
                let line = read_line(&mut lines).await?;
                let input = line.trim();
                if input == "b" {
                    controller.back();
                } else if input.is_empty() && !prefilled.is_empty() {
                    controller.submit_email(&prefilled).await;
                } else {
                    controller.submit_email(input).await;
                }
                print_notice(&mut controller);
            }
            FlowState::AwaitingOtp => {
                run_otp_step(&mut controller, &mut lines).await?;
            }
            FlowState::AwaitingNewPassword => {
                println!("\nNew password:");
                let new_password = read_line(&mut lines).await?;
                println!("Confirm password:");
                let confirm = read_line(&mut lines).await?;
                controller
                    .submit_new_password(new_password.trim(), confirm.trim())
                    .await;
                print_notice(&mut controller);
                if controller.state() == FlowState::LoggingIn {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// The OTP step runs its own loop so the countdown keeps ticking while
/// the prompt waits for input.
async fn run_otp_step(
    controller: &mut ResetFlowController,
    lines: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<()> {
    println!(
        "\nOTP sent. Time remaining: {}. Type digits (or paste the full code),",
        controller.timer().format_mmss()
    );
    println!("'<' for backspace, 'r' to resend, 'b' to go back.");

    let mut ticker = interval_at(
        Instant::now() + Duration::from_secs(1),
        Duration::from_secs(1),
    );
    let mut announced_expiry = false;

    while controller.state() == FlowState::AwaitingOtp {
        tokio::select! {
            _ = ticker.tick() => {
                controller.tick();
                if controller.otp_expired() && !announced_expiry {
                    announced_expiry = true;
                    println!("OTP expired. Type 'r' to resend or 'b' to go back.");
                } else if controller.timer().is_urgent() && !controller.timer().is_expired()
                    && controller.timer().remaining_seconds() % 10 == 0
                {
                    println!("Time remaining: {}", controller.timer().format_mmss());
                }
            }
            line = lines.next_line() => {
                let line = line?.unwrap_or_default();
                match line.trim() {
                    "b" => controller.back(),
                    "r" => {
                        controller.resend_otp().await;
                        if !controller.otp_expired() {
                            announced_expiry = false;
                            println!(
                                "Time remaining: {}. Focus on cell {}.",
                                controller.timer().format_mmss(),
                                controller.otp_entry().focus() + 1
                            );
                        }
                    }
                    "<" => controller.otp_entry_mut().press_backspace(),
                    text if text.chars().count() > 1 => controller.otp_entry_mut().paste(text),
                    text => {
                        if let Some(ch) = text.chars().next() {
                            controller.otp_entry_mut().press_key(ch);
                        }
                    }
                }
                print_notice(controller);
                if controller.can_verify() {
                    controller.submit_otp().await;
                    print_notice(controller);
                }
            }
        }
    }

    Ok(())
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<String> {
    Ok(lines
        .next_line()
        .await
        .context("Failed to read stdin")?
        .unwrap_or_default())
}

fn print_notice(controller: &mut ResetFlowController) {
    if let Some(notice) = controller.take_notice() {
        match notice.level {
            NoticeLevel::Info => println!("[ok] {}", notice.message),
            NoticeLevel::Error => println!("[error] {}", notice.message),
        }
    }
}
