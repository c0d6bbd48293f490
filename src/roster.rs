use crate::models::{Status, StudentRecord};

// Ids are creation timestamps in epoch milliseconds; bump past the current
// maximum so two adds within the same millisecond stay distinct.
pub fn next_record_id(roster: &[StudentRecord], now_millis: i64) -> i64 {
    let max_id = roster.iter().map(|record| record.id).max().unwrap_or(0);
    now_millis.max(max_id + 1)
}

pub fn add_student(roster: &mut Vec<StudentRecord>, name: &str, now_millis: i64) -> bool {
    let name = name.trim();
    if name.is_empty() {
        return false;
    }

    let id = next_record_id(roster, now_millis);
    roster.push(StudentRecord {
        id,
        name: name.to_string(),
        status: Status::Present,
    });
    true
}

pub fn update_status(roster: &mut [StudentRecord], id: i64, status: Status) -> bool {
    match roster.iter_mut().find(|record| record.id == id) {
        Some(record) => {
            record.status = status;
            true
        }
        None => false,
    }
}

pub fn delete_student(roster: &mut Vec<StudentRecord>, id: i64) -> bool {
    let before = roster.len();
    roster.retain(|record| record.id != id);
    roster.len() != before
}
