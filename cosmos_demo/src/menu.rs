//! Interactive single-keystroke menu over the repositories.
//!
//! A keystroke and its prompt answers are parsed into a [`Command`], executed against
//! an [`ApplicationRepository`](crate::repositories::ApplicationRepository) into an
//! [`Outcome`], and the outcome is rendered as text. Only [`run_menu`] touches the
//! terminal, through [`MenuIo`].

mod menu_command;
mod menu_error;
mod menu_io;
mod menu_runner;

pub use menu_command::*;
pub use menu_error::*;
pub use menu_io::*;
pub use menu_runner::*;
