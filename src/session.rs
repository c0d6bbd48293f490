use std::env;

// Demo gate only: a shared passphrase compared in the clear, not real
// authentication.
pub const DEFAULT_PASSPHRASE: &str = "teacher123";

pub fn resolve_passphrase() -> String {
    env::var("ATTENDANCE_PASSPHRASE").unwrap_or_else(|_| DEFAULT_PASSPHRASE.to_string())
}

pub fn verify(candidate: &str, passphrase: &str) -> bool {
    candidate == passphrase
}
