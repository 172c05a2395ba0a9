//! Admin user provisioning.
//!
//! Prompts on the terminal for a username (unless given with `-u`), a
//! password and its confirmation, then stores the Argon2id hash.

use std::io::{self, BufRead, Write};

use contact_desk_server::db::{AdminUserRepository, create_pool};
use contact_desk_server::services::AuthService;

use super::{CommandError, database_url};

/// Create a new admin user interactively.
///
/// Returns the new admin's ID.
pub async fn create_user(username: Option<String>) -> Result<i32, CommandError> {
    let (username, password) = {
        let mut input = io::stdin().lock();
        let mut out = io::stdout().lock();

        let username = match username {
            Some(u) => u,
            None => prompt(&mut input, &mut out, "Username: ")?,
        };
        let password = prompt(&mut input, &mut out, "Password: ")?;
        let confirm = prompt(&mut input, &mut out, "Confirm password: ")?;
        check_confirmation(&password, &confirm)?;
        (username, password)
    };

    let database_url = database_url()?;
    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;
    let users = AdminUserRepository::new(pool);

    let user = AuthService::new(&users)
        .create_admin(&username, &password)
        .await?;

    writeln!(io::stdout().lock(), "Admin user '{}' created (id {}).", user.username, user.id)?;
    Ok(user.id.as_i32())
}

/// Print `label` and read one line, without its trailing newline.
fn prompt(
    input: &mut impl BufRead,
    out: &mut impl Write,
    label: &str,
) -> Result<String, CommandError> {
    write!(out, "{label}")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

fn check_confirmation(password: &str, confirm: &str) -> Result<(), CommandError> {
    if password == confirm {
        Ok(())
    } else {
        Err(CommandError::PasswordMismatch)
    }
}
