use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GROUPS: &[&str] = &["6A", "6B", "7A", "7B", "8A", "8B"];
pub const DEFAULT_GROUP: &str = "7A";

pub fn is_valid_group(group: &str) -> bool {
    GROUPS.contains(&group)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Present,
    Absent,
    Late,
}

impl Status {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Present" => Some(Self::Present),
            "Absent" => Some(Self::Absent),
            "Late" => Some(Self::Late),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Late => "Late",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: i64,
    pub name: String,
    pub status: Status,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    pub rosters: BTreeMap<String, Vec<StudentRecord>>,
}

#[derive(Debug, Clone)]
pub struct RosterKey {
    pub date: String,
    pub group: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusTally {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
}

impl StatusTally {
    pub fn total(&self) -> usize {
        self.present + self.absent + self.late
    }
}

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    pub date: Option<String>,
    pub group: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AddStudentRequest {
    pub name: String,
    pub date: Option<String>,
    pub group: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub id: i64,
    pub status: String,
    pub date: Option<String>,
    pub group: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteStudentRequest {
    pub id: i64,
    pub date: Option<String>,
    pub group: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClearRosterRequest {
    #[serde(default)]
    pub confirm: bool,
    pub date: Option<String>,
    pub group: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub authenticated: bool,
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub date: String,
    pub group: String,
    pub students: Vec<StudentRecord>,
    pub summary: StatusTally,
}
