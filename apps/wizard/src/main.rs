mod api;
mod config;
mod error;
mod identity;
mod models;
mod workflow;

use std::io::{self, Write};

use chrono::Utc;

use api::ApiClient;
use config::Config;
use error::WorkflowError;
use identity::EnvIdentity;
use workflow::assemble;
use workflow::availability::AvailabilityIndex;
use workflow::calendar::MonthCursor;
use workflow::selection::time_windows_for;
use workflow::wizard::{FlowKind, Step, Wizard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let client = ApiClient::new(config.api_url.clone());

    tracing::info!("fetching availability for service {}", config.offering.id);
    let slots = client.fetch_slots(&config.offering.id).await?;
    let index = AvailabilityIndex::build(&slots);

    if index.is_empty() {
        println!("No bookable dates for this service right now.");
        return Ok(());
    }
    println!(
        "{} bookable date(s) between {} and {}.",
        index.len(),
        index.dates().next().unwrap(),
        index.dates().last().unwrap(),
    );

    let flow = match prompt("Flow ([b]ooking / [q]uote): ")?.as_str() {
        "q" | "quote" => FlowKind::Quote,
        _ => FlowKind::Booking,
    };

    run_wizard(flow, &index, &config, &client).await
}

/// Drive one wizard session over stdin until it completes or the user
/// cancels.
async fn run_wizard(
    flow: FlowKind,
    index: &AvailabilityIndex,
    config: &Config,
    client: &ApiClient,
) -> anyhow::Result<()> {
    let mut wizard = Wizard::new(flow);
    let mut cursor = index
        .dates()
        .next()
        .map(MonthCursor::containing)
        .unwrap_or_else(|| MonthCursor::containing(Utc::now().date_naive()));

    loop {
        match wizard.step() {
            Step::DateSelection => {
                render_month(cursor, index);
                let input = prompt("[n]ext / [p]rev month, day number, or quit: ")?;
                match input.as_str() {
                    "n" => cursor = cursor.next(),
                    "p" => cursor = cursor.prev(),
                    "quit" => return Ok(()),
                    day => {
                        let Some(date) = day.parse().ok().and_then(|d| cursor.date(d)) else {
                            println!("Not a day in {}.", cursor.label());
                            continue;
                        };
                        match wizard.choose_date(date, index) {
                            Ok(()) => {
                                wizard.advance()?;
                            }
                            // Transient notice; the selection is untouched.
                            Err(err) => println!("{err}"),
                        }
                    }
                }
            }

            Step::TimeSelection => {
                let date = wizard.selection().selected_date().expect("date gated");
                let windows = time_windows_for(date, index, wizard.selection());
                if windows.is_empty() {
                    println!("No available time slots on {date}.");
                }
                for (i, window) in windows.iter().enumerate() {
                    let mark = if window.selected { "x" } else { " " };
                    println!("  [{mark}] {} {}", i + 1, window.label);
                }
                let input = prompt("Slot number to toggle, [c]ontinue, or [b]ack: ")?;
                match input.as_str() {
                    "b" => {
                        wizard.back();
                    }
                    "c" => {
                        if let Err(err) = wizard.advance() {
                            println!("{err}");
                        }
                    }
                    n => {
                        let Some(window) = n
                            .parse::<usize>()
                            .ok()
                            .and_then(|i| i.checked_sub(1))
                            .and_then(|i| windows.get(i))
                        else {
                            println!("No such slot.");
                            continue;
                        };
                        match wizard.toggle_slot(&window.slot_id, index) {
                            Ok(outcome) => tracing::debug!("toggle: {outcome:?}"),
                            Err(err) => println!("{err}"),
                        }
                    }
                }
            }

            Step::DetailEntry => {
                match flow {
                    FlowKind::Booking => {
                        let fields = wizard.fields_mut();
                        fields.event_name = prompt("Event name: ")?;
                        fields.event_type = prompt("Event type: ")?;
                        fields.guest_count =
                            prompt("Number of guests: ")?.parse().unwrap_or(0);
                        fields.customer_notes = prompt("Notes (optional): ")?;
                        read_acceptance_flags(wizard.fields_mut())?;
                    }
                    FlowKind::Quote => {
                        wizard.fields_mut().budget = prompt("Budget: ")?;
                    }
                }
                if let Err(err) = wizard.advance() {
                    println!("{err}");
                    if prompt("[b]ack or retry entry: ")?.as_str() == "b" {
                        wizard.back();
                    }
                }
            }

            Step::BillingEntry => {
                {
                    let fields = wizard.fields_mut();
                    fields.billing_address.street = prompt("Street: ")?;
                    fields.billing_address.city = prompt("City: ")?;
                    fields.billing_address.state = prompt("State: ")?;
                    fields.billing_address.country = prompt("Country: ")?;
                    fields.billing_address.postal = prompt("Postal code: ")?;
                }
                read_acceptance_flags(wizard.fields_mut())?;
                if let Err(err) = wizard.advance() {
                    println!("{err}");
                    if prompt("[b]ack or retry entry: ")?.as_str() == "b" {
                        wizard.back();
                    }
                }
            }

            Step::Review => {
                println!("── Review ──");
                println!("{}", wizard.review_summary());
                match prompt("[s]ubmit / [b]ack / [q]uit: ")?.as_str() {
                    "s" => {
                        // Controls stay blocked until the call resolves; there
                        // is no way to abort an in-flight submission.
                        let result = assemble::submit(
                            &mut wizard,
                            &config.offering,
                            &EnvIdentity,
                            client,
                        )
                        .await;
                        if let Err(WorkflowError::MissingIdentity) = result {
                            println!("You are not logged in; set GALA_CUSTOMER_ID and restart.");
                            return Ok(());
                        }
                    }
                    "b" => {
                        wizard.back();
                    }
                    _ => {
                        wizard.cancel();
                        return Ok(());
                    }
                }
            }

            Step::Submitted => {
                println!("Reservation submitted. See you there!");
                return Ok(());
            }

            Step::Failed => {
                // The server's message, verbatim.
                println!(
                    "Submission failed: {}",
                    wizard.failure_message().unwrap_or("unknown error")
                );
                match prompt("[r]etry or [q]uit: ")?.as_str() {
                    "r" => {
                        wizard.retry();
                    }
                    _ => return Ok(()),
                }
            }
        }
    }
}

/// Print one month with available days marked.
fn render_month(cursor: MonthCursor, index: &AvailabilityIndex) {
    println!("── {} ──", cursor.label());
    println!(" Su  Mo  Tu  We  Th  Fr  Sa");
    for week in cursor.grid().chunks(7) {
        let row: Vec<String> = week
            .iter()
            .map(|cell| match cell {
                Some(day) => {
                    let available = cursor
                        .date(*day)
                        .is_some_and(|date| index.is_available(date));
                    if available {
                        format!("{day:>3}*")
                    } else {
                        format!("{day:>3} ")
                    }
                }
                None => "    ".to_string(),
            })
            .collect();
        println!("{}", row.join(""));
    }
    println!("(* = has available slots)");
}

fn read_acceptance_flags(
    fields: &mut workflow::wizard::WizardFields,
) -> anyhow::Result<()> {
    fields.terms_accepted = prompt_yes("Accept terms of service? [y/n]: ")?;
    fields.cancellation_policy_accepted = prompt_yes("Accept cancellation policy? [y/n]: ")?;
    fields.liability_waiver_signed = prompt_yes("Sign liability waiver? [y/n]: ")?;
    Ok(())
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_yes(label: &str) -> anyhow::Result<bool> {
    Ok(matches!(prompt(label)?.as_str(), "y" | "yes"))
}
