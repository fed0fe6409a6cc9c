use std::sync::Arc;

use uuid::Uuid;

use super::auth::{AccountError, AccountService, SessionToken};
use crate::intake::domain::{InterestField, InterestFieldId};
use crate::intake::repository::{InterestFieldRepository, RepositoryError};

const MIN_PASSWORD_LEN: usize = 8;

/// Error raised by the interest-field CRUD.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("field label must not be empty")]
    BlankLabel,
    #[error("interest field not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Admin-managed job categories gating the public form's target-job options.
pub struct InterestFieldService<F> {
    repository: Arc<F>,
}

impl<F> InterestFieldService<F>
where
    F: InterestFieldRepository + 'static,
{
    pub fn new(repository: Arc<F>) -> Self {
        Self { repository }
    }

    pub fn list(&self) -> Result<Vec<InterestField>, SettingsError> {
        Ok(self.repository.list_all()?)
    }

    /// New fields start visible, matching the original admin panel default.
    pub fn create(&self, label: &str) -> Result<InterestField, SettingsError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(SettingsError::BlankLabel);
        }

        let field = InterestField {
            id: InterestFieldId(Uuid::new_v4().to_string()),
            field: label.to_string(),
            visible: true,
        };
        Ok(self.repository.insert(field)?)
    }

    pub fn update(
        &self,
        id: &InterestFieldId,
        label: &str,
        visible: bool,
    ) -> Result<InterestField, SettingsError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(SettingsError::BlankLabel);
        }

        let mut field = self
            .repository
            .fetch(id)?
            .ok_or(SettingsError::NotFound)?;
        field.field = label.to_string();
        field.visible = visible;
        self.repository.update(field.clone())?;
        Ok(field)
    }

    pub fn delete(&self, id: &InterestFieldId) -> Result<(), SettingsError> {
        match self.repository.delete(id) {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(SettingsError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    /// Flip whether the field shows up on the public form.
    pub fn toggle_visibility(&self, id: &InterestFieldId) -> Result<InterestField, SettingsError> {
        let mut field = self
            .repository
            .fetch(id)?
            .ok_or(SettingsError::NotFound)?;
        field.visible = !field.visible;
        self.repository.update(field.clone())?;
        Ok(field)
    }
}

/// Error raised by the password-change form.
#[derive(Debug, thiserror::Error)]
pub enum PasswordChangeError {
    #[error("New passwords do not match")]
    Mismatch,
    #[error("Password must be at least 8 characters long")]
    TooShort,
    #[error(transparent)]
    Account(#[from] AccountError),
}

/// Validate the change-password form and forward it to the account service.
pub fn change_password<A: AccountService>(
    accounts: &A,
    token: &SessionToken,
    current: &str,
    new: &str,
    confirm: &str,
) -> Result<(), PasswordChangeError> {
    if new != confirm {
        return Err(PasswordChangeError::Mismatch);
    }
    if new.len() < MIN_PASSWORD_LEN {
        return Err(PasswordChangeError::TooShort);
    }
    accounts.update_password(token, current, new)?;
    Ok(())
}
