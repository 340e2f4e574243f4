//! Certificate code synthesis.

use rand::Rng;

/// Length in characters of a synthesized certificate code.
pub const CODE_LENGTH: usize = 32;

/// Generate a random certificate code: 32 lowercase hex characters
/// (128 bits of entropy).
///
/// Global uniqueness is guaranteed by the database constraint; callers
/// retry with a fresh code on the (vanishingly unlikely) collision.
pub fn generate_code() -> String {
    use std::fmt::Write;

    let bytes: [u8; CODE_LENGTH / 2] = rand::rng().random();
    let mut code = String::with_capacity(CODE_LENGTH);
    for byte in bytes {
        let _ = write!(code, "{byte:02x}");
    }
    code
}

/// Whether a caller-supplied code should be replaced by a synthesized one.
pub fn needs_generated_code(code: Option<&str>) -> bool {
    match code {
        None => true,
        Some(value) => value.trim().is_empty(),
    }
}
