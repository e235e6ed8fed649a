// util.rs

use std::io::Write;

use rust_decimal::Decimal;

/// `writeln!` that treats a closed pipe as success.
pub fn emit<W: Write + ?Sized, S: AsRef<str>>(w: &mut W, s: S) -> std::io::Result<()> {
    match writeln!(w, "{}", s.as_ref()) {
        Err(ref e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Rounds to `precision` places and drops trailing zeros.
pub fn format_result(value: Decimal, precision: u32) -> String {
    value.round_dp(precision).normalize().to_string()
}
