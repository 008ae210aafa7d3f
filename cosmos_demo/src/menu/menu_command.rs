pub const OPTIONS_TEXT: &str = "\
OPTIONS:

a: Get Applications by userId
b: Get Application by appId
c: Create application
d: Create Api key
e: Regenerate Api key
f: Update Api key label
g: Delete (retire) Api key
x or SPACE: Exit";

const USER_ID: &str = "Please enter UserId: ";
const APP_ID: &str = "Please enter AppId: ";
const APP_NAME: &str = "Please enter a name for the application: ";
const KEY_NAME: &str = "Please enter a name for the new key: ";
const EXISTING_KEY: &str = "Please enter the existing value for the key to be regenerated: ";
const API_KEY: &str = "Please enter ApiKey: ";
const KEY_LABEL: &str = "Please enter a new label name for the api key: ";

/// What a single keystroke at the menu means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Exit,
    Ignored,
    Operation(Operation),
}

impl Selection {
    pub fn from_key(key: char) -> Self {
        match key {
            ' ' | 'x' | 'X' => Selection::Exit,
            'a' => Selection::Operation(Operation::GetApplicationsByUser),
            'b' => Selection::Operation(Operation::GetApplication),
            'c' => Selection::Operation(Operation::CreateApplication),
            'd' => Selection::Operation(Operation::CreateApiKey),
            'e' => Selection::Operation(Operation::RegenerateApiKey),
            'f' => Selection::Operation(Operation::UpdateApiKeyLabel),
            'g' => Selection::Operation(Operation::RetireApiKey),
            _ => Selection::Ignored,
        }
    }
}

/// A menu entry before its prompts have been answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetApplicationsByUser,
    GetApplication,
    CreateApplication,
    CreateApiKey,
    RegenerateApiKey,
    UpdateApiKeyLabel,
    RetireApiKey,
}

impl Operation {
    /// Prompts asked for this operation, in order.
    pub fn prompts(&self) -> &'static [&'static str] {
        match self {
            Operation::GetApplicationsByUser => &[USER_ID],
            Operation::GetApplication => &[APP_ID],
            Operation::CreateApplication => &[USER_ID, APP_ID, APP_NAME],
            Operation::CreateApiKey => &[APP_ID, KEY_NAME],
            Operation::RegenerateApiKey => &[APP_ID, EXISTING_KEY],
            Operation::UpdateApiKeyLabel => &[APP_ID, API_KEY, KEY_LABEL],
            Operation::RetireApiKey => &[APP_ID, API_KEY],
        }
    }

    /// Builds the command from the answers to [`prompts`](Self::prompts).
    ///
    /// Returns `None` if any answer is empty or an answer is missing.
    pub fn into_command(self, answers: Vec<String>) -> Option<Command> {
        if answers.len() != self.prompts().len() || answers.iter().any(|a| a.is_empty()) {
            return None;
        }
        let mut answers = answers.into_iter();
        let mut next = || answers.next().unwrap_or_default();

        let command = match self {
            Operation::GetApplicationsByUser => Command::GetApplicationsByUser { user_id: next() },
            Operation::GetApplication => Command::GetApplication { app_id: next() },
            Operation::CreateApplication => Command::CreateApplication {
                user_id: next(),
                app_id: next(),
                app_name: next(),
            },
            Operation::CreateApiKey => Command::CreateApiKey {
                app_id: next(),
                key_name: next(),
            },
            Operation::RegenerateApiKey => Command::RegenerateApiKey {
                app_id: next(),
                value: next(),
            },
            Operation::UpdateApiKeyLabel => Command::UpdateApiKeyLabel {
                app_id: next(),
                value: next(),
                label: next(),
            },
            Operation::RetireApiKey => Command::RetireApiKey {
                app_id: next(),
                value: next(),
            },
        };
        Some(command)
    }
}

/// A fully answered menu request, ready to run against the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    GetApplicationsByUser {
        user_id: String,
    },
    GetApplication {
        app_id: String,
    },
    CreateApplication {
        user_id: String,
        app_id: String,
        app_name: String,
    },
    CreateApiKey {
        app_id: String,
        key_name: String,
    },
    RegenerateApiKey {
        app_id: String,
        value: String,
    },
    UpdateApiKeyLabel {
        app_id: String,
        value: String,
        label: String,
    },
    RetireApiKey {
        app_id: String,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::{Command, Operation, Selection};

    fn answers(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn from_key_maps_exit_keys() {
        for key in [' ', 'x', 'X'] {
            assert_eq!(Selection::from_key(key), Selection::Exit);
        }
    }

    #[test]
    fn from_key_ignores_unknown_keys() {
        for key in ['h', 'A', '1', '\n'] {
            assert_eq!(Selection::from_key(key), Selection::Ignored);
        }
    }

    #[test]
    fn from_key_maps_every_operation() {
        let keys = "abcdefg".chars().map(Selection::from_key).collect::<Vec<_>>();

        assert_eq!(
            keys,
            vec![
                Selection::Operation(Operation::GetApplicationsByUser),
                Selection::Operation(Operation::GetApplication),
                Selection::Operation(Operation::CreateApplication),
                Selection::Operation(Operation::CreateApiKey),
                Selection::Operation(Operation::RegenerateApiKey),
                Selection::Operation(Operation::UpdateApiKeyLabel),
                Selection::Operation(Operation::RetireApiKey),
            ]
        );
    }

    #[test]
    fn into_command_assigns_answers_in_prompt_order() {
        // Arrange
        let operation = Operation::UpdateApiKeyLabel;

        // Act
        let command = operation.into_command(answers(&["app1", "v1", "label"]));

        // Assert
        assert_eq!(
            command,
            Some(Command::UpdateApiKeyLabel {
                app_id: "app1".to_string(),
                value: "v1".to_string(),
                label: "label".to_string(),
            })
        );
    }

    #[test]
    fn into_command_rejects_any_empty_answer() {
        assert_eq!(
            Operation::CreateApplication.into_command(answers(&["user1", "", "name"])),
            None
        );
        assert_eq!(Operation::GetApplicationsByUser.into_command(answers(&[""])), None);
    }

    #[test]
    fn into_command_rejects_missing_answers() {
        assert_eq!(Operation::RetireApiKey.into_command(answers(&["app1"])), None);
    }
}
