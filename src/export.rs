use crate::models::StudentRecord;

// No quoting: a comma inside a name shifts the status column.
pub fn build_csv(roster: &[StudentRecord]) -> String {
    let mut lines = Vec::with_capacity(roster.len() + 1);
    lines.push("Name,Status".to_string());
    for record in roster {
        lines.push(format!("{},{}", record.name, record.status.as_str()));
    }
    lines.join("\n")
}

pub fn export_filename(date: &str, group: &str) -> String {
    format!("attendance-{date}-{group}.csv")
}
