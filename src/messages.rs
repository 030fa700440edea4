//! Localized user-facing strings.
//!
//! The service ships two catalogues: English and Brazilian Portuguese. The active
//! one is picked once from configuration and shared by the service and the
//! validation boundary.

use std::fmt;
use std::str::FromStr;

/// Language of the messages returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Pt,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" => Ok(Locale::En),
            "pt" | "pt-br" => Ok(Locale::Pt),
            other => Err(format!("unsupported locale '{}'", other)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Pt => write!(f, "pt"),
        }
    }
}

/// Messages raised by the user service.
#[derive(Debug)]
pub struct Messages {
    pub user_not_found: &'static str,
    pub email_taken: &'static str,
    pub cpf_taken: &'static str,
    pub incorrect_password: &'static str,
    pub old_password_required: &'static str,
    pub user_updated: &'static str,
    pub user_deleted: &'static str,
    pub fetch_users_failed: &'static str,
    pub fetch_user_failed: &'static str,
    pub create_failed: &'static str,
    pub update_failed: &'static str,
    pub delete_failed: &'static str,
}

static EN: Messages = Messages {
    user_not_found: "User not found.",
    email_taken: "This email is already registered in our system.",
    cpf_taken: "This cpf is already registered in our system.",
    incorrect_password: "Incorrect password.",
    old_password_required: "Old password is required to change the password.",
    user_updated: "User updated successfully.",
    user_deleted: "User deleted successfully.",
    fetch_users_failed: "Failed to fetch users.",
    fetch_user_failed: "Failed to fetch user.",
    create_failed: "Failed to create user.",
    update_failed: "Failed to update user.",
    delete_failed: "Failed to delete user.",
};

static PT: Messages = Messages {
    user_not_found: "Usuário não encontrado.",
    email_taken: "Esse email já se encontra cadastrado em nosso sistema.",
    cpf_taken: "Esse cpf já se encontra cadastrado em nosso sistema.",
    incorrect_password: "Senha incorreta.",
    old_password_required: "Senha antiga: Campo obrigatório para alterar a senha.",
    user_updated: "Usuário atualizado com sucesso.",
    user_deleted: "Usuário excluído.",
    fetch_users_failed: "Falha ao buscar usuários.",
    fetch_user_failed: "Falha ao buscar usuário.",
    create_failed: "Falha ao criar usuário.",
    update_failed: "Falha ao atualizar usuário.",
    delete_failed: "Falha ao remover usuário.",
};

impl Locale {
    pub fn messages(self) -> &'static Messages {
        match self {
            Locale::En => &EN,
            Locale::Pt => &PT,
        }
    }

    /// Message for a failed field rule.
    ///
    /// `field` is the wire name of the input field and `code` the rule that
    /// failed. `value` is echoed by the CPF checksum message.
    pub fn field_message(self, field: &str, code: &str, value: Option<&str>) -> String {
        let label = self.field_label(field);
        match (self, field, code) {
            (Locale::En, _, "type") => format!("{}: Must be a string.", label),
            (Locale::Pt, _, "type") => format!("{}: Precisa ser uma string.", label),
            (Locale::En, "cpf", "required") => "CPF field is required.".to_string(),
            (Locale::Pt, "cpf", "required") => "Campo CPF é obrigatório.".to_string(),
            (Locale::En, "cpf", "length") => "CPF field must be exactly 11 characters.".to_string(),
            (Locale::Pt, "cpf", "length") => {
                "Campo CPF deve ser igual a 11 caracteres.".to_string()
            }
            (Locale::En, "cpf", _) => {
                format!("The value ({}) is not a valid CPF.", value.unwrap_or_default())
            }
            (Locale::Pt, "cpf", _) => {
                format!("O valor ({}) não é um CPF valido.", value.unwrap_or_default())
            }
            (Locale::En, _, "required") => format!("{}: Required field.", label),
            (Locale::Pt, _, "required") => format!("{}: Campo obrigatório.", label),
            (Locale::En, _, "email") => format!("{}: invalid email.", label),
            (Locale::Pt, _, "email") => format!("{}: email inválido.", label),
            (Locale::En, _, "min_length") => format!(
                "{}: Must be at least {} characters long.",
                label,
                min_length(field)
            ),
            (Locale::Pt, _, "min_length") => format!(
                "{}: Precisa ter pelo menos {} caracteres.",
                label,
                min_length(field)
            ),
            (Locale::En, _, "max_length") => {
                format!("{}: Maximum of {} characters.", label, max_length(field))
            }
            (Locale::Pt, _, "max_length") => {
                format!("{}: Máximo de {} caracteres.", label, max_length(field))
            }
            (Locale::En, _, _) => format!("{}: Invalid value.", label),
            (Locale::Pt, _, _) => format!("{}: Valor inválido.", label),
        }
    }

    fn field_label(self, field: &str) -> &'static str {
        match (self, field) {
            (Locale::En, "name") => "Name",
            (Locale::Pt, "name") => "Nome",
            (_, "email") => "Email",
            (_, "cpf") => "CPF",
            (Locale::En, "password") => "Password",
            (Locale::Pt, "password") => "Senha",
            (Locale::En, "oldPassword") => "Old password",
            (Locale::Pt, "oldPassword") => "Senha antiga",
            (Locale::En, _) => "Field",
            (Locale::Pt, _) => "Campo",
        }
    }
}

/// Minimum lengths enforced by the input validators, by wire field name.
pub fn min_length(field: &str) -> usize {
    match field {
        "name" => crate::models::user::NAME_MIN_LENGTH,
        _ => crate::models::user::PASSWORD_MIN_LENGTH,
    }
}

/// Maximum lengths enforced by the input validators, by wire field name.
pub fn max_length(field: &str) -> usize {
    match field {
        "email" => crate::models::user::EMAIL_MAX_LENGTH,
        _ => crate::models::user::NAME_MAX_LENGTH,
    }
}
