//! Plain-text cards for the terminal

use shared_types::{format_phone_display, CallSummary, NoteStatus, OrgNote, Organization, OrganizationStatus};
use std::fmt::Write;

use crate::discovery::Progress;

const BAR_WIDTH: usize = 30;

pub fn status_badge(status: OrganizationStatus) -> &'static str {
    match status {
        OrganizationStatus::Ready => "[ready]",
        OrganizationStatus::Calling => "[calling...]",
        OrganizationStatus::Scheduled => "[scheduled]",
        OrganizationStatus::Completed => "[call completed]",
    }
}

pub fn note_badge(status: NoteStatus) -> &'static str {
    match status {
        NoteStatus::Onboarded => "[onboarded]",
        NoteStatus::Unsure => "[unsure]",
        NoteStatus::Declined => "[declined]",
        NoteStatus::Callback => "[call back]",
        NoteStatus::Pending => "[pending]",
        NoteStatus::Interested => "[interested]",
        NoteStatus::NotAvailable => "[not available]",
    }
}

fn push_summary(out: &mut String, summary: &CallSummary) {
    let _ = writeln!(out, "  Notes:     {}", summary.summary);
    if let Some(contact) = &summary.contact_name {
        let _ = writeln!(out, "  Contact:   {contact}");
    }
    if let Some(interested) = summary.interested {
        let _ = writeln!(out, "  Interested: {}", if interested { "yes" } else { "no" });
    }
    if let Some(availability) = &summary.availability {
        let _ = writeln!(out, "  Availability: {availability}");
    }
    if let Some(callback) = &summary.callback_date {
        let _ = writeln!(out, "  Call back: {callback}");
    }
    for step in summary.next_steps.iter().flatten() {
        let _ = writeln!(out, "  - {step}");
    }
}

/// One organization card; `index` is the number shown to the user
pub fn render_card(index: usize, organization: &Organization) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}. {} {}",
        index,
        organization.name,
        status_badge(organization.status)
    );
    if !organization.description.is_empty() {
        let _ = writeln!(out, "  {}", organization.description);
    }
    if !organization.address.is_empty() {
        let _ = writeln!(out, "  Address:   {}", organization.address);
    }
    if !organization.categories.is_empty() {
        let _ = writeln!(out, "  Tags:      {}", organization.categories.join(", "));
    }
    if let Some(phone) = &organization.phone {
        let _ = writeln!(out, "  Phone:     {}", format_phone_display(phone));
    }
    if let Some(url) = &organization.url {
        let _ = writeln!(out, "  Website:   {url}");
    }
    if let Some(when) = &organization.scheduled_time {
        let _ = writeln!(out, "  Scheduled: {when}");
    }
    if let Some(summary) = &organization.call_notes {
        push_summary(&mut out, summary);
    }
    out
}

pub fn render_cards(organizations: &[Organization]) -> String {
    if organizations.is_empty() {
        return "No organizations found. Try a broader mission or a different location.\n"
            .to_string();
    }
    organizations
        .iter()
        .enumerate()
        .map(|(i, org)| render_card(i + 1, org))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_notes(notes: &[OrgNote]) -> String {
    if notes.is_empty() {
        return "No calls recorded yet.\n".to_string();
    }

    let mut out = String::new();
    for note in notes {
        let _ = writeln!(out, "{} {}", note.name, note_badge(note.status));
        if let Some(phone) = &note.phone {
            let _ = writeln!(out, "  Phone:     {}", format_phone_display(phone));
        }
        if let Some(summary) = &note.summary {
            let _ = writeln!(out, "  Notes:     {summary}");
        }
        if let Some(contact) = &note.contact_name {
            let _ = writeln!(out, "  Contact:   {contact}");
        }
        if let Some(callback) = &note.callback_date {
            let _ = writeln!(out, "  Call back: {callback}");
        }
        for step in &note.next_steps {
            let _ = writeln!(out, "  - {step}");
        }
    }
    out
}

/// `[#########.....]  45% Searching...`
pub fn render_progress(progress: &Progress) -> String {
    let filled = BAR_WIDTH * usize::from(progress.percent.min(100)) / 100;
    format!(
        "[{}{}] {:>3}% {}",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        progress.percent,
        progress.label
    )
}
