// Turns a watched entity into the alert shown to its owner.

use roomwatch_common::alert::{Alert, AlertLevel};
use roomwatch_common::entity::{EntityStatus, WatchedEntity};

pub const NO_DESCRIPTION: &str = "(no description)";

/// Build the alert for `entity`, or `None` when its status is not watched
/// or nobody is assigned yet.
pub fn alert_for(entity: &WatchedEntity) -> Option<Alert> {
    let status = entity.classify();
    if status == EntityStatus::Other {
        return None;
    }
    let assignee = entity.assignee()?;
    let subject = report_subject(&entity.category);

    let (title, level, stamped_at) = match status {
        EntityStatus::InProgress => (
            format!("{assignee} is handling your {subject}"),
            AlertLevel::Info,
            entity.status_timestamps.accepted_at,
        ),
        EntityStatus::Resolved => (
            format!("{assignee} resolved your {subject}"),
            AlertLevel::Success,
            entity.status_timestamps.resolved_at,
        ),
        EntityStatus::Other => return None,
    };

    Some(Alert {
        title,
        detail: detail_text(&entity.description),
        level,
        timestamp: stamped_at.unwrap_or(entity.updated_at),
    })
}

fn report_subject(category: &str) -> String {
    match category.trim() {
        "" => "report".to_owned(),
        category => format!("{category} report"),
    }
}

fn detail_text(description: &str) -> String {
    match description.trim() {
        "" => NO_DESCRIPTION.to_owned(),
        description => description.to_owned(),
    }
}
