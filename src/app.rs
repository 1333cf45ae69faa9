//! Firebase App
//!
//! The App is the named configuration object that Firestore and Storage
//! instances hang off. Query equality and event names are scoped by the
//! app name, so two apps never see each other's listener events.

use crate::error::FirebaseError;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Name used when [`AppOptions::app_name`] is not set
pub const DEFAULT_APP_NAME: &str = "[DEFAULT]";

const GS_SCHEME: &str = "gs://";

/// Process-wide registry of apps by name
static APP_INSTANCES: Lazy<RwLock<HashMap<String, App>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Firebase App instance
///
/// At most one App exists per name; [`App::create`] hands back the
/// registered instance when the name is taken.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

struct AppInner {
    name: String,
    options: AppOptions,
}

/// Firebase App configuration options
#[derive(Clone, Debug, Default)]
pub struct AppOptions {
    /// Firebase API key
    pub api_key: String,
    /// Google Cloud project ID
    pub project_id: String,
    /// App name (optional, defaults to "[DEFAULT]")
    pub app_name: Option<String>,
    /// Default storage bucket, with or without the `gs://` scheme
    pub storage_bucket: Option<String>,
}

impl AppOptions {
    fn validate(&self) -> Result<(), FirebaseError> {
        if self.api_key.is_empty() {
            return Err(FirebaseError::ApiKeyNotConfigured);
        }
        if self.project_id.is_empty() {
            return Err(FirebaseError::internal("Project ID cannot be empty"));
        }
        if matches!(self.app_name.as_deref(), Some("")) {
            return Err(FirebaseError::internal("App name cannot be empty"));
        }
        if let Some(bucket) = &self.storage_bucket {
            if bucket.trim_start_matches(GS_SCHEME).trim_matches('/').is_empty() {
                return Err(FirebaseError::internal("Storage bucket cannot be empty"));
            }
        }
        Ok(())
    }
}

impl App {
    /// Register an app, or return the one already registered under its name
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// use firebase_bridge_sdk::{App, AppOptions};
    ///
    /// let options = AppOptions {
    ///     api_key: "YOUR_API_KEY".to_string(),
    ///     project_id: "your-project-id".to_string(),
    ///     storage_bucket: Some("your-project-id.appspot.com".to_string()),
    ///     ..Default::default()
    /// };
    /// let app = App::create(options).await?;
    /// assert_eq!(app.name(), "[DEFAULT]");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(options: AppOptions) -> Result<Self, FirebaseError> {
        options.validate()?;

        let name = options
            .app_name
            .clone()
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());

        let mut instances = APP_INSTANCES.write().await;
        if let Some(app) = instances.get(&name) {
            return Ok(app.clone());
        }

        let app = App {
            inner: Arc::new(AppInner {
                name: name.clone(),
                options,
            }),
        };
        instances.insert(name.clone(), app.clone());
        tracing::debug!(app = %name, "firebase app created");

        Ok(app)
    }

    /// The app registered as `[DEFAULT]`
    pub async fn get_instance() -> Result<Self, FirebaseError> {
        Self::get_instance_with_name(DEFAULT_APP_NAME).await
    }

    /// The app registered under `name`
    pub async fn get_instance_with_name(name: &str) -> Result<Self, FirebaseError> {
        let instances = APP_INSTANCES.read().await;
        instances.get(name).cloned().ok_or_else(|| {
            FirebaseError::Internal(format!(
                "Firebase App '{}' not found. Call App::create() first.",
                name
            ))
        })
    }

    /// Names of every registered app
    pub async fn apps() -> Vec<String> {
        let mut names: Vec<String> = APP_INSTANCES.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove this app from the registry
    ///
    /// Existing handles stay usable; a later [`App::create`] with the same
    /// name registers a fresh instance.
    pub async fn delete(&self) -> bool {
        let mut instances = APP_INSTANCES.write().await;
        match instances.get(&self.inner.name) {
            Some(registered) if Arc::ptr_eq(&registered.inner, &self.inner) => {
                instances.remove(&self.inner.name);
                tracing::debug!(app = %self.inner.name, "firebase app deleted");
                true
            }
            _ => false,
        }
    }

    /// App name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Options the app was created with
    pub fn options(&self) -> &AppOptions {
        &self.inner.options
    }

    /// Default bucket as a `gs://` URL, if one is configured
    pub fn default_bucket_url(&self) -> Option<String> {
        self.inner.options.storage_bucket.as_deref().map(|bucket| {
            let bare = bucket.trim_start_matches(GS_SCHEME).trim_end_matches('/');
            format!("{}{}", GS_SCHEME, bare)
        })
    }

    /// Scope a module event name to this app
    pub fn event_name(&self, event: &str) -> String {
        format!("{}-{}", self.inner.name, event)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").field("name", &self.inner.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(name: &str) -> AppOptions {
        AppOptions {
            api_key: "test-api-key".to_string(),
            project_id: "test-project".to_string(),
            app_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_app() {
        let app = App::create(options("test-app")).await.expect("Failed to create app");
        assert_eq!(app.name(), "test-app");
        assert!(App::apps().await.contains(&"test-app".to_string()));
    }

    #[tokio::test]
    async fn test_create_app_singleton() {
        let app1 = App::create(options("test-app-2")).await.unwrap();
        let app2 = App::create(options("test-app-2")).await.unwrap();

        assert!(Arc::ptr_eq(&app1.inner, &app2.inner));
    }

    #[tokio::test]
    async fn test_invalid_options() {
        let no_key = AppOptions {
            api_key: String::new(),
            ..options("no-key")
        };
        assert!(matches!(
            App::create(no_key).await,
            Err(FirebaseError::ApiKeyNotConfigured)
        ));

        let empty_bucket = AppOptions {
            storage_bucket: Some("gs://".to_string()),
            ..options("empty-bucket")
        };
        assert!(App::create(empty_bucket).await.is_err());
        assert!(App::create(options("")).await.is_err());
    }

    #[tokio::test]
    async fn test_default_app_name() {
        let options = AppOptions {
            app_name: None,
            ..options("unused")
        };

        let app = App::create(options).await.expect("Failed to create app");
        assert_eq!(app.name(), DEFAULT_APP_NAME);
        assert!(App::get_instance().await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_unregisters() {
        let app = App::create(options("short-lived")).await.unwrap();
        assert!(app.delete().await);
        assert!(!app.delete().await);
        assert!(App::get_instance_with_name("short-lived").await.is_err());

        let again = App::create(options("short-lived")).await.unwrap();
        assert!(!Arc::ptr_eq(&app.inner, &again.inner));
        assert!(!app.delete().await);
    }

    #[tokio::test]
    async fn test_default_bucket_url() {
        let with_scheme = App::create(AppOptions {
            storage_bucket: Some("gs://bucket-a/".to_string()),
            ..options("bucket-a")
        })
        .await
        .unwrap();
        assert_eq!(with_scheme.default_bucket_url().as_deref(), Some("gs://bucket-a"));

        let bare = App::create(AppOptions {
            storage_bucket: Some("bucket-b.appspot.com".to_string()),
            ..options("bucket-b")
        })
        .await
        .unwrap();
        assert_eq!(
            bare.default_bucket_url().as_deref(),
            Some("gs://bucket-b.appspot.com")
        );

        let none = App::create(options("no-bucket")).await.unwrap();
        assert_eq!(none.default_bucket_url(), None);
    }

    #[tokio::test]
    async fn test_event_name_is_app_scoped() {
        let app = App::create(options("scoped")).await.unwrap();
        assert_eq!(
            app.event_name("firestore_collection_sync_event:3"),
            "scoped-firestore_collection_sync_event:3"
        );
    }
}
