//! Builders for test data.

use tramites_core::NewRequest;
use uuid::Uuid;

/// Builder for [`NewRequest`] values with unique defaults.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    user_id: String,
    title: String,
    description: Option<String>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            user_id: format!("user-{}", Uuid::new_v4().simple()),
            title: "Solicitud de prueba".to_string(),
            description: None,
        }
    }
}

impl RequestBuilder {
    /// Creates a builder with a random user and a default title.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filing user.
    #[must_use]
    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builds the request payload.
    pub fn build(self) -> NewRequest {
        NewRequest { user_id: self.user_id, title: self.title, description: self.description }
    }
}
