//! The interactive menu
//!
//! Every entry collects its arguments with `dialoguer` prompts and then runs
//! the same command the subcommand would. A failed action is reported and the
//! menu carries on; a failed prompt (no terminal, interrupted input) ends the
//! session.

use std::path::Path;

use chrono::NaiveDate;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use lifelink::{BloodGroup, RecordId};

use super::{
    Donate, camp, donor, inventory, match_pending, parse_date, parse_id, report, request,
    terminal::Colorize,
};

const MAIN_MENU: [&str; 5] = ["Donor", "Recipient", "Admin", "Donation camps", "Exit"];

const DONOR_MENU: [&str; 5] = [
    "Register as a donor",
    "Donate blood",
    "View my details and eligibility",
    "Register for a camp",
    "Back",
];

const RECIPIENT_MENU: [&str; 3] = ["Request blood", "View requests", "Back"];

const ADMIN_MENU: [&str; 11] = [
    "View inventory",
    "Add stock",
    "Low stock alerts",
    "Remove expired units",
    "Match pending requests",
    "List donors",
    "Search eligible donors",
    "List pending requests",
    "Cancel a request",
    "Report",
    "Back",
];

const CAMP_MENU: [&str; 4] = ["Schedule a camp", "Register a donor", "List camps", "Back"];

const PRIORITIES: [&str; 3] = ["Critical", "Urgent", "Normal"];

/// Runs the menu until the operator chooses to exit.
pub fn run(root: &Path, today: NaiveDate) -> anyhow::Result<()> {
    let theme = ColorfulTheme::default();
    println!("{}", "LifeLink blood bank".info());
    println!("{}", format!("Data in {}, today is {today}", root.display()).dim());

    loop {
        let choice = Select::with_theme(&theme)
            .with_prompt("Main menu")
            .items(&MAIN_MENU[..])
            .default(0)
            .interact()?;

        match choice {
            0 => donor_menu(&theme, root, today)?,
            1 => recipient_menu(&theme, root, today)?,
            2 => admin_menu(&theme, root, today)?,
            3 => camp_menu(&theme, root)?,
            _ => break,
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Prints a failed action without leaving the menu.
fn report_failure(result: anyhow::Result<()>) {
    if let Err(e) = result {
        println!("{}", format!("❌ {e:#}").warning());
    }
}

fn choose(theme: &ColorfulTheme, prompt: &str, items: &[&str]) -> dialoguer::Result<usize> {
    Select::with_theme(theme)
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()
}

fn donor_menu(theme: &ColorfulTheme, root: &Path, today: NaiveDate) -> anyhow::Result<()> {
    loop {
        match choose(theme, "Donor", &DONOR_MENU)? {
            0 => report_failure(prompt_donor(theme)?.run(root)),
            1 => {
                let command = Donate {
                    donor: prompt_id(theme, "Donor ID")?,
                    camp: prompt_optional_id(theme, "Camp ID (leave empty if none)")?,
                };
                report_failure(command.run(root, today));
            }
            2 => {
                let command = donor::Show {
                    id: prompt_id(theme, "Donor ID")?,
                };
                report_failure(command.run(root, today));
            }
            3 => report_failure(prompt_camp_registration(theme)?.run(root)),
            _ => return Ok(()),
        }
    }
}

fn recipient_menu(theme: &ColorfulTheme, root: &Path, today: NaiveDate) -> anyhow::Result<()> {
    loop {
        match choose(theme, "Recipient", &RECIPIENT_MENU)? {
            0 => report_failure(prompt_request(theme)?.run(root, today)),
            1 => report_failure(request::List::default().run(root)),
            _ => return Ok(()),
        }
    }
}

fn admin_menu(theme: &ColorfulTheme, root: &Path, today: NaiveDate) -> anyhow::Result<()> {
    loop {
        match choose(theme, "Admin", &ADMIN_MENU)? {
            0 => report_failure(inventory::show(root, today)),
            1 => {
                let command = inventory::Add {
                    group: prompt_group(theme, "Blood group")?,
                    count: Input::with_theme(theme)
                        .with_prompt("Number of units")
                        .default(1)
                        .interact_text()?,
                };
                report_failure(command.run(root, today));
            }
            2 => report_failure(inventory::low(root, today)),
            3 => report_failure(inventory::prune(root, today)),
            4 => report_failure(match_pending(root, today)),
            5 => report_failure(donor::List::default().run(root, today)),
            6 => {
                let command = donor::Search {
                    group: prompt_group(theme, "Blood group")?,
                };
                report_failure(command.run(root, today));
            }
            7 => {
                let command = request::List {
                    status: Some(lifelink::RequestStatus::Pending),
                };
                report_failure(command.run(root));
            }
            8 => {
                let id = prompt_id(theme, "Request ID")?;
                let confirmed = Confirm::with_theme(theme)
                    .with_prompt(format!("Cancel request {id}?"))
                    .default(false)
                    .interact()?;
                if confirmed {
                    report_failure(request::Cancel { id }.run(root));
                }
            }
            9 => report_failure(report::Report::default().run(root, today)),
            _ => return Ok(()),
        }
    }
}

fn camp_menu(theme: &ColorfulTheme, root: &Path) -> anyhow::Result<()> {
    loop {
        match choose(theme, "Donation camps", &CAMP_MENU)? {
            0 => {
                let date: String = Input::with_theme(theme)
                    .with_prompt("Date (YYYY-MM-DD)")
                    .validate_with(|input: &String| parse_date(input).map(|_| ()))
                    .interact_text()?;
                let command = camp::Create {
                    date: parse_date(&date).map_err(anyhow::Error::msg)?,
                    location: prompt_text(theme, "Location", false)?,
                    organizer: prompt_text(theme, "Organizer", true)?,
                };
                report_failure(command.run(root));
            }
            1 => report_failure(prompt_camp_registration(theme)?.run(root)),
            2 => report_failure(camp::list(root)),
            _ => return Ok(()),
        }
    }
}

fn prompt_donor(theme: &ColorfulTheme) -> dialoguer::Result<donor::Register> {
    let name = prompt_text(theme, "Name", false)?;
    let age = Input::with_theme(theme).with_prompt("Age").interact_text()?;
    let weight = Input::with_theme(theme)
        .with_prompt("Weight (kg)")
        .interact_text()?;
    let group = prompt_group(theme, "Blood group")?;
    let contact = prompt_text(theme, "Contact", true)?;
    let address = prompt_text(theme, "Address", true)?;

    let last_donation: String = Input::with_theme(theme)
        .with_prompt("Last donation date (YYYY-MM-DD, leave empty if never)")
        .allow_empty(true)
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Ok(())
            } else {
                parse_date(input).map(|_| ())
            }
        })
        .interact_text()?;

    Ok(donor::Register {
        name,
        age,
        weight,
        group,
        contact,
        address,
        last_donation: parse_date(&last_donation).ok(),
    })
}

fn prompt_request(theme: &ColorfulTheme) -> dialoguer::Result<request::Create> {
    let patient = prompt_text(theme, "Patient name", false)?;
    let group = prompt_group(theme, "Blood group needed")?;
    let units = Input::with_theme(theme)
        .with_prompt("Units needed")
        .default(1)
        .interact_text()?;
    let priority = match choose(theme, "Priority", &PRIORITIES)? {
        0 => request::PriorityArg::Critical,
        1 => request::PriorityArg::Urgent,
        _ => request::PriorityArg::Normal,
    };

    Ok(request::Create {
        patient,
        group,
        units,
        priority,
    })
}

fn prompt_camp_registration(theme: &ColorfulTheme) -> anyhow::Result<camp::Register> {
    Ok(camp::Register {
        camp: prompt_id(theme, "Camp ID")?,
        donor: prompt_id(theme, "Donor ID")?,
    })
}

fn prompt_text(
    theme: &ColorfulTheme,
    prompt: &str,
    allow_empty: bool,
) -> dialoguer::Result<String> {
    Input::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .interact_text()
}

fn prompt_group(theme: &ColorfulTheme, prompt: &str) -> dialoguer::Result<BloodGroup> {
    let labels = BloodGroup::ALL.map(BloodGroup::as_str);
    let index = choose(theme, prompt, &labels)?;
    Ok(BloodGroup::ALL[index])
}

fn prompt_id(theme: &ColorfulTheme, prompt: &str) -> anyhow::Result<RecordId> {
    let input: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .validate_with(|input: &String| parse_id(input).map(|_| ()))
        .interact_text()?;
    parse_id(&input).map_err(anyhow::Error::msg)
}

fn prompt_optional_id(
    theme: &ColorfulTheme,
    prompt: &str,
) -> dialoguer::Result<Option<RecordId>> {
    let input: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Ok(())
            } else {
                parse_id(input).map(|_| ())
            }
        })
        .interact_text()?;
    Ok(parse_id(&input).ok())
}
