use console::{style, Emoji};

pub static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
pub static CROSS: Emoji<'_, '_> = Emoji("✗ ", "[ERR] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "");

/// Create a clickable hyperlink using OSC 8 escape sequence.
/// Falls back to plain text display in unsupporting terminals.
pub fn hyperlink(url: &str, text: &str) -> String {
    format!("\x1b]8;;{}\x07{}\x1b]8;;\x07", url, text)
}

pub fn print_success(msg: &str) {
    println!("{}{}", CHECK, style(msg).green());
}

pub fn print_error(msg: &str) {
    eprintln!("{}{}", CROSS, style(msg).red());
}

pub fn print_warning(msg: &str) {
    eprintln!("{}{}", WARN, style(msg).yellow());
}

pub fn print_info(msg: &str) {
    println!("  {} {}", style("→").dim(), msg);
}

pub fn print_header(msg: &str) {
    println!();
    println!("{}", style(msg).cyan().bold());
    println!("{}", style("─".repeat(msg.chars().count())).dim());
}

pub fn print_key_value(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        style(format!("{:>12}:", key)).dim(),
        style("│").dim(),
        value
    );
}

/// Print a unified diff with removed lines red and added lines green.
pub fn print_diff(diff: &str) {
    for line in diff.lines() {
        let styled = if line.starts_with("---") || line.starts_with("+++") {
            style(line).bold()
        } else if line.starts_with("@@") {
            style(line).cyan()
        } else if line.starts_with('-') {
            style(line).red()
        } else if line.starts_with('+') {
            style(line).green()
        } else {
            style(line)
        };
        println!("{}", styled);
    }
}
