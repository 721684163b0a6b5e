//! `admin` subcommand handlers.

use super::output::Output;
use crate::admin::{AdminAccounts, BootstrapOutcome, InitialAdmin};
use crate::types::Result;

/// Creates the admin unless the email is already registered.
pub async fn create(
    accounts: &AdminAccounts,
    initial: &InitialAdmin,
    output: &Output,
) -> Result<BootstrapOutcome> {
    let outcome = accounts.bootstrap_initial_admin(initial).await?;

    match &outcome {
        BootstrapOutcome::Created(admin) => output.success(&format!(
            "Admin user created: {} (ID: {})",
            admin.email, admin.id
        )),
        BootstrapOutcome::AlreadyExists(existing) if existing.is_admin() => {
            output.info(&format!("Admin user {} already exists", existing.email))
        }
        BootstrapOutcome::AlreadyExists(existing) => output.warning(&format!(
            "{} is registered as a buyer; no admin was created",
            existing.email
        )),
        BootstrapOutcome::TakenByDeveloper(developer) => output.warning(&format!(
            "{} is registered as a developer; no admin was created",
            developer.email
        )),
    }

    Ok(outcome)
}

/// Prints every admin with its status. Returns how many were listed.
pub async fn list(accounts: &AdminAccounts, output: &Output) -> Result<usize> {
    let admins = accounts.list_admins().await?;

    output.header(&format!("Found {} admin user(s)", admins.len()));
    if admins.is_empty() {
        output.hint("Create one with: novadom-server admin create");
        return Ok(0);
    }

    let rows: Vec<Vec<String>> = admins
        .iter()
        .map(|admin| {
            vec![
                admin.id.to_string(),
                admin.email.clone(),
                format!("{} {}", admin.first_name, admin.last_name),
                output.status_label(admin.is_active),
            ]
        })
        .collect();
    output.table(&["ID", "Email", "Name", "Status"], &rows);

    Ok(admins.len())
}

pub async fn deactivate(accounts: &AdminAccounts, email: &str, output: &Output) -> Result<()> {
    let admin = accounts.deactivate_admin(email).await?;
    output.success(&format!("Admin user {} deactivated", admin.email));
    Ok(())
}
