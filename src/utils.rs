//! Small shared helpers

use rand::Rng;
use std::io::Write;
use std::path::Path;

/// Decimal digit string of the given length (device/traffic identifiers)
pub fn random_number(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
}

/// Append one labeled entry to the conversation log. Log failures are
/// reported to stderr but never interrupt the conversation.
pub fn log_to_file(text: &str, log_type: &str, log_path: &Path) {
    let entry = format!("{}: {}\n\n", log_type, text);

    let result = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(log_path)
        .and_then(|mut file| file.write_all(entry.as_bytes()));

    if let Err(err) = result {
        eprintln!("Error: {}", err);
    }
}
