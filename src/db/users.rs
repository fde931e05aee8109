use std::sync::Arc;

use super::documents::{from_documents, to_document, DocumentStore, USERS};
use crate::{
    error::{AppError, AppResult},
    models::User,
};

#[derive(Clone)]
pub struct UserRepository {
    docs: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    /// Inserts a user; e-mail addresses must be unique
    pub async fn create(&self, user: &User) -> AppResult<()> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        self.docs.insert(USERS, to_document(user)?).await.map_err(|e| match e {
            AppError::Conflict(_) => AppError::Conflict("User already exists".to_string()),
            other => other,
        })
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.find_one("email", email).await
    }

    pub async fn find_by_id(&self, user_id: &str) -> AppResult<Option<User>> {
        self.find_one("user_id", user_id).await
    }

    pub async fn delete(&self, user_id: &str) -> AppResult<bool> {
        Ok(self.docs.delete_many(USERS, "user_id", user_id).await? > 0)
    }

    async fn find_one(&self, field: &str, value: &str) -> AppResult<Option<User>> {
        let docs = self.docs.find_by(USERS, field, value).await?;
        Ok(from_documents::<User>(docs)?.into_iter().next())
    }
}
