use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, field_error},
    view_password::NewViewPassword,
};

pub const DUPLICATE_VIEW_PASSWORD_MSG: &str = "View password with this Password already exists.";

const MAX_LENGTH: usize = 100;

/// The raw fields of the form for adding a view password.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ViewPasswordFormData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewPasswordFormErrors {
    pub label: Option<String>,
    pub password: Option<String>,
}

fn check_length(value: &str) -> Result<(), String> {
    let length = value.chars().count();

    if value.is_empty() {
        Err("This field is required.".to_owned())
    } else if length > MAX_LENGTH {
        Err(format!(
            "Ensure this value has at most {MAX_LENGTH} characters (it has {length})."
        ))
    } else {
        Ok(())
    }
}

impl ViewPasswordFormData {
    /// Check both fields, returning the view password to save or the error for each invalid field.
    ///
    /// The label is trimmed but the password is kept exactly as typed.
    pub fn validate(&self) -> Result<NewViewPassword, ViewPasswordFormErrors> {
        let label = self.label.trim();

        match (check_length(label), check_length(&self.password)) {
            (Ok(()), Ok(())) => Ok(NewViewPassword {
                password: self.password.clone(),
                label: label.to_owned(),
            }),
            (label, password) => Err(ViewPasswordFormErrors {
                label: label.err(),
                password: password.err(),
            }),
        }
    }
}

/// The form for adding a view password, re-rendered in place with any errors.
pub fn view_password_form(values: &ViewPasswordFormData, errors: &ViewPasswordFormErrors) -> Markup {
    html! {
        form
            id="view-password-form"
            hx-post=(endpoints::VIEW_PASSWORDS_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            div
            {
                label for="label" class=(FORM_LABEL_STYLE) { "Label" }

                input
                    type="text"
                    name="label"
                    id="label"
                    placeholder="e.g., 'Mom', 'Dad', 'Sister'"
                    maxlength=(MAX_LENGTH)
                    value=(values.label)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.label.as_deref()))
            }

            div
            {
                label for="password" class=(FORM_LABEL_STYLE) { "Password" }

                input
                    type="text"
                    name="password"
                    id="password"
                    autocomplete="off"
                    maxlength=(MAX_LENGTH)
                    value=(values.password)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.password.as_deref()))
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add password" }
        }
    }
}
