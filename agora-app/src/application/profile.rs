use super::ports::AccountStore;
use crate::domain::{IdentityUser, NewAccount, Profile, RegisterProfile, UpdateProfile};
use agora_errors::{AppError, FieldErrors};
use std::sync::Arc;

/// Maps the signed-in identity user onto the application account.
pub struct ProfileResolver<S: AccountStore> {
    store: Arc<S>,
}

impl<S: AccountStore> Clone for ProfileResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: AccountStore> ProfileResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// `Ok(None)` means the user still has to complete registration.
    pub async fn resolve(&self, identity: &IdentityUser) -> Result<Option<Profile>, AppError> {
        let account = self.store.find_by_identity(&identity.id).await?;
        Ok(account.map(|account| Profile::new(account, identity.email.clone())))
    }

    pub async fn require(&self, identity: &IdentityUser) -> Result<Profile, AppError> {
        self.resolve(identity)
            .await?
            .ok_or(AppError::RegistrationIncomplete)
    }

    pub async fn register(
        &self,
        identity: &IdentityUser,
        form: RegisterProfile,
    ) -> Result<Profile, AppError> {
        let full_name = required_name(&form.full_name)?;
        if self.store.find_by_identity(&identity.id).await?.is_some() {
            return Err(AppError::Conflict(
                "Un profil existe déjà pour ce compte".to_string(),
            ));
        }

        let account = self
            .store
            .insert(NewAccount {
                identity_user_id: identity.id.clone(),
                full_name,
                image_url: form.image_url.filter(|u| !u.is_empty()),
                role: form.role,
            })
            .await?;
        tracing::info!(account_id = account.id, role = %account.role, "account registered");
        Ok(Profile::new(account, identity.email.clone()))
    }

    pub async fn update(&self, profile: &Profile, form: UpdateProfile) -> Result<Profile, AppError> {
        let full_name = required_name(&form.full_name)?;
        let account = self
            .store
            .update_profile(
                profile.user_id(),
                full_name,
                form.image_url.filter(|u| !u.is_empty()),
            )
            .await?;
        Ok(Profile::new(account, profile.email.clone()))
    }
}

fn required_name(full_name: &str) -> Result<String, FieldErrors> {
    let full_name = full_name.trim();
    if full_name.is_empty() {
        let mut errors = FieldErrors::new();
        errors.push("full_name", "Le nom complet est requis");
        return Err(errors);
    }
    Ok(full_name.to_string())
}
