use std::fmt::Write;

use tracing::instrument;

use crate::{
    models::{ApiKey, Application},
    repositories::{ApplicationRepository, RepositoryError},
};

use super::{Command, MenuError, MenuIo, Selection, OPTIONS_TEXT};

/// Result of running one [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applications(Vec<Application>),
    Application(Application),
    ApplicationMissing(String),
    ApiKeyRetired { app_id: String, value: String },
    /// The command referred to something that does not exist.
    NotFound(String),
}

/// Runs the menu until an exit key is pressed.
///
/// Not-found errors are shown and the loop carries on. Any other error ends the loop
/// and is returned.
pub async fn run_menu(
    io: &mut impl MenuIo,
    applications: &ApplicationRepository,
) -> Result<(), MenuError> {
    loop {
        io.write("\n")?;
        io.write_line(OPTIONS_TEXT)?;

        let key = io.read_key()?;
        let operation = match Selection::from_key(key) {
            Selection::Exit => break,
            Selection::Ignored => continue,
            Selection::Operation(operation) => operation,
        };
        io.write("\n")?;

        let mut answers = Vec::with_capacity(operation.prompts().len());
        for prompt in operation.prompts() {
            answers.push(io.prompt(prompt)?);
        }

        let Some(command) = operation.into_command(answers) else {
            tracing::debug!(?operation, "Skipping operation with an empty answer");
            continue;
        };

        let outcome = execute(applications, command).await?;
        io.write(&render(&outcome))?;
    }

    io.write_line("Demo exiting...")?;
    Ok(())
}

/// Runs a command against the repository.
#[instrument(level = "debug", skip(applications))]
pub async fn execute(
    applications: &ApplicationRepository,
    command: Command,
) -> Result<Outcome, RepositoryError> {
    let result = match command {
        Command::GetApplicationsByUser { user_id } => applications
            .get_all_applications_by_user(&user_id)
            .await
            .map(Outcome::Applications),
        Command::GetApplication { app_id } => {
            applications
                .get_application(&app_id)
                .await
                .map(|app| match app {
                    Some(app) => Outcome::Application(app),
                    None => Outcome::ApplicationMissing(app_id),
                })
        }
        Command::CreateApplication {
            user_id,
            app_id,
            app_name,
        } => applications
            .create_application(Application::new(user_id, app_id, app_name))
            .await
            .map(Outcome::Application),
        Command::CreateApiKey { app_id, key_name } => applications
            .create_api_key(&app_id, ApiKey::generate(key_name))
            .await
            .map(Outcome::Application),
        Command::RegenerateApiKey { app_id, value } => applications
            .regenerate_api_key(&app_id, &value)
            .await
            .map(Outcome::Application),
        Command::UpdateApiKeyLabel {
            app_id,
            value,
            label,
        } => applications
            .update_api_key_label(&app_id, &value, &label)
            .await
            .map(Outcome::Application),
        Command::RetireApiKey { app_id, value } => applications
            .retire_api_key(&app_id, &value)
            .await
            .map(|_| Outcome::ApiKeyRetired { app_id, value }),
    };

    match result {
        Err(e) if e.is_not_found() => {
            tracing::warn!(error = %e, "Command referred to a missing resource");
            Ok(Outcome::NotFound(e.to_string()))
        }
        other => other,
    }
}

pub fn render(outcome: &Outcome) -> String {
    let mut text = String::new();
    // Writing to a String never fails.
    let _ = match outcome {
        Outcome::Applications(apps) if apps.is_empty() => {
            writeln!(text, "\nNo applications found.")
        }
        Outcome::Applications(apps) => apps
            .iter()
            .try_for_each(|app| writeln!(text, "\n{}", app)),
        Outcome::Application(app) => writeln!(text, "\n{}", app),
        Outcome::ApplicationMissing(app_id) => {
            writeln!(text, "\nApplication `{}` was not found.", app_id)
        }
        Outcome::ApiKeyRetired { app_id, value } => {
            writeln!(text, "\nApi key `{}` retired from `{}`.", value, app_id)
        }
        Outcome::NotFound(message) => writeln!(text, "\n{}.", message),
    };
    text
}
