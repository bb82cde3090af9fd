use console::style;
use dialoguer::{theme::ColorfulTheme, Password};

use crate::error::{Error, Result};
use crate::ui;

/// Explain where to get a Beaker token and read it without echoing.
pub fn prompt_for_token() -> Result<String> {
    println!(
        "  Please go to {} and create an account.",
        style("https://beaker.org").yellow()
    );
    println!(
        "  Once you've done that, copy your user token from {} and enter it below.",
        style(ui::hyperlink("https://beaker.org/user", "https://beaker.org/user")).yellow()
    );
    println!();

    Password::with_theme(&ColorfulTheme::default())
        .with_prompt("User token")
        .interact()
        .map_err(|e| Error::Config(format!("failed to read user token: {}", e)))
}
