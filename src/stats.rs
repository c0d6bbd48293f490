use crate::models::{Status, StatusTally, StudentRecord};

pub fn tally(roster: &[StudentRecord]) -> StatusTally {
    let mut counts = StatusTally::default();
    for record in roster {
        match record.status {
            Status::Present => counts.present += 1,
            Status::Absent => counts.absent += 1,
            Status::Late => counts.late += 1,
        }
    }
    counts
}
