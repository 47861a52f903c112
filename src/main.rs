use std::sync::Arc;

use anyhow::{anyhow, Result};
use derive_more::Display;
use inquire::{Confirm, DateSelect, Password, PasswordDisplayMode, Select, Text};
use signup::account::{
    self, SignupData, CONFIRM_PASSWORD, DATE_OF_BIRTH, EMAIL, PASSWORD, POLICY, USERNAME,
};
use signup::clock::SystemClock;
use signup::consts::{LOG_FILE, LOG_FILE_ENV, LOG_LEVEL};
use signup::form::{FormError, FormState, LogSink};
use signup::models::{FieldName, FieldValue};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

const PASSWORD_HELP: &str = "Password should contain at least 8 characters, 1 special symbol \
                             character, 1 number, 1 uppercase letter";

type MenuExit = Option<()>;
const MENU_EXIT: MenuExit = None;
const MENU_LOOP: MenuExit = Some(());

/// Représente un menu texte
trait Menu {
    /// Implémente le contenu du menu. La valeur de retour doit être None si le menu souhaite
    /// terminer, ou Some(()) s'il faut le relancer.
    fn enter(&mut self) -> Result<MenuExit>;

    /// Lance le menu en boucle, en interceptant les erreurs, sauf si le menu souhaite quitter.
    fn enter_loop(&mut self) {
        while let Some(result) = self.enter().transpose() {
            if let Err(error) = result {
                eprintln!("Error: {error}");
            }
        }
    }
}

/// Champs du formulaire, dans l'ordre d'affichage
#[derive(Debug, Clone, Copy, EnumIter, Display)]
enum Field {
    #[display("Username")]
    Username,
    #[display("Date of birth")]
    DateOfBirth,
    #[display("Email")]
    Email,
    #[display("Password")]
    Password,
    #[display("Confirm password")]
    ConfirmPassword,
    #[display("Terms and Conditions")]
    Policy,
}

impl Field {
    fn name(self) -> FieldName {
        let name = match self {
            Field::Username => USERNAME,
            Field::DateOfBirth => DATE_OF_BIRTH,
            Field::Email => EMAIL,
            Field::Password => PASSWORD,
            Field::ConfirmPassword => CONFIRM_PASSWORD,
            Field::Policy => POLICY,
        };
        FieldName::from(name)
    }
}

fn password_prompt(label: &str) -> Password<'_> {
    Password::new(label)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_display_toggle_enabled()
}

pub struct App {
    form: FormState,
    sink: LogSink,
}

impl App {
    pub fn new(form: FormState, sink: LogSink) -> Self {
        App { form, sink }
    }

    pub fn start(&mut self) -> Result<()> {
        println!("Let's get you started");
        self.enter_loop();
        Ok(())
    }

    /// Demande la valeur d'un champ. Répondre compte comme une modification, quitter la
    /// question comme une sortie du champ.
    fn prompt(&mut self, field: Field) -> Result<()> {
        let name = field.name();
        let label = format!("{field}:");
        let current = self.form.value(&name).cloned();

        let value = match field {
            Field::Username | Field::Email => {
                let initial = current.as_ref().and_then(FieldValue::as_text).unwrap_or("");
                FieldValue::from(Text::new(&label).with_initial_value(initial).prompt()?)
            }
            Field::DateOfBirth => {
                let mut select = DateSelect::new(&label);
                if let Some(date) = current.as_ref().and_then(FieldValue::as_date) {
                    select = select.with_default(date);
                }
                FieldValue::from(select.prompt()?)
            }
            Field::Password => FieldValue::from(
                password_prompt(&label)
                    .with_help_message(PASSWORD_HELP)
                    .prompt()?,
            ),
            Field::ConfirmPassword => FieldValue::from(password_prompt(&label).prompt()?),
            Field::Policy => {
                let accepted = current.as_ref().and_then(FieldValue::as_flag).unwrap_or(false);
                FieldValue::from(
                    Confirm::new(
                        "I agree to the Terms and Conditions and Privacy Policy of this app.",
                    )
                    .with_default(accepted)
                    .prompt()?,
                )
            }
        };

        self.form.on_field_change(name.clone(), value)?;
        self.form.on_field_blur(name.clone())?;

        if let Some(message) = self.form.visible_error(&name) {
            println!("  ! {message}");
        }
        Ok(())
    }

    fn print_errors(&self) {
        for (field, message) in self.form.visible_errors() {
            println!("  ! {field}: {message}");
        }
    }

    fn submit(&mut self) -> Result<MenuExit> {
        match self.form.on_submit(&mut self.sink) {
            Ok(record) => {
                let data = SignupData::try_from(&record)?;
                println!("[*] Account created for {}.", data.username);
                Ok(MENU_EXIT)
            }
            Err(FormError::NotSubmittable(failures)) => {
                self.print_errors();
                Err(anyhow!("{} field(s) still need attention", failures.len()))
            }
            Err(other) => Err(other.into()),
        }
    }
}

impl Menu for App {
    fn enter(&mut self) -> Result<MenuExit> {
        #[derive(EnumIter, Display, PartialEq)]
        enum Choice {
            #[display("Fill in the form")]
            FillIn,
            #[display("Edit a field")]
            Edit,
            #[display("Create Account")]
            CreateAccount,
            #[display("Quit")]
            Exit,
        }

        let submittable = self.form.is_submittable();
        let choices = Choice::iter()
            .filter(|choice| *choice != Choice::CreateAccount || submittable)
            .collect();

        match Select::new("What do you want to do?", choices).prompt()? {
            Choice::FillIn => {
                for field in Field::iter() {
                    self.prompt(field)?;
                }
                Ok(MENU_LOOP)
            }
            Choice::Edit => {
                let field = Select::new("Which field?", Field::iter().collect()).prompt()?;
                self.prompt(field)?;
                Ok(MENU_LOOP)
            }
            Choice::CreateAccount => self.submit(),
            Choice::Exit => Ok(MENU_EXIT),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let log_file = std::env::var(LOG_FILE_ENV).unwrap_or_else(|_| LOG_FILE.to_owned());
    simple_logging::log_to_file(&log_file, LOG_LEVEL)?;

    let form = account::new_form(Arc::new(SystemClock));
    App::new(form, account::log_sink()).start()
}
