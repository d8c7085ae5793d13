use serde::Deserialize;

use crate::error::AppError;

/// Body of both `POST /categories` and `PUT /categories/:id`.
#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    pub title: String,
}

impl CategoryPayload {
    pub fn into_title(self) -> Result<String, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("title is required".into()));
        }
        Ok(title)
    }
}
