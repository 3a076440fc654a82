//! Admin context
//!
//! One [`AdminContext`] is built per process and handed to every view. It
//! owns the resource client, the session store (registered as the client's
//! auth-failure listener), the query cache and the mutation coordinator.
//!
//! Reads come in pairs: a synchronous accessor returning the cached
//! [`QueryEntry`] (scheduling a refetch when needed), and a `fetch_*` variant
//! that waits for the data.

use crate::cache::{QueryCache, QueryEntry, QueryOptions};
use crate::client::ResourceClient;
use crate::config::SdkConfig;
use crate::error::{ApiError, ConfigError, ErrorKind, Result};
use crate::keys::{self, QueryKey};
use crate::mutation::{MutationCoordinator, MutationOutcome, MutationTarget, Operation};
use crate::session::SessionStore;
use crate::traits::{Resource, Validate};
use crate::types::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// Dependency root for the dashboard
///
/// # Example
///
/// ```rust,ignore
/// let context = AdminContext::new(SdkConfig::from_env())?;
/// context.session().initialize().await;
///
/// let colleges = context.fetch_colleges().await?;
/// let outcome = context.delete_college(&colleges[0].id).await;
/// assert!(outcome.is_success());
/// ```
#[derive(Clone)]
pub struct AdminContext {
    client: ResourceClient,
    session: SessionStore,
    cache: QueryCache,
    mutations: MutationCoordinator,
}

impl AdminContext {
    pub fn new(config: SdkConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let client = ResourceClient::new(config.client)?;
        let session = SessionStore::new(Arc::new(client.clone()));
        client.set_auth_listener(session.auth_listener());

        let cache = QueryCache::new(config.cache);
        let mutations = MutationCoordinator::with_config(cache.clone(), config.mutations);

        info!(base_url = %client.config().base_url, "Admin context ready");
        Ok(Self {
            client,
            session,
            cache,
            mutations,
        })
    }

    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn mutations(&self) -> &MutationCoordinator {
        &self.mutations
    }

    // ==================== Queries ====================

    pub fn colleges(&self) -> QueryEntry {
        let client = self.client.clone();
        self.query(College::list_key(), move || {
            let client = client.clone();
            async move { client.list_colleges().await }
        })
    }

    pub async fn fetch_colleges(&self) -> Result<Vec<College>> {
        let client = self.client.clone();
        self.load(College::list_key(), move || {
            let client = client.clone();
            async move { client.list_colleges().await }
        })
        .await
    }

    pub fn college(&self, id: &str) -> QueryEntry {
        let (client, id) = (self.client.clone(), id.to_string());
        self.query(College::detail_key(&id), move || {
            let (client, id) = (client.clone(), id.clone());
            async move { client.get_college(&id).await }
        })
    }

    pub async fn fetch_college(&self, id: &str) -> Result<College> {
        let (client, id) = (self.client.clone(), id.to_string());
        self.load(College::detail_key(&id), move || {
            let (client, id) = (client.clone(), id.clone());
            async move { client.get_college(&id).await }
        })
        .await
    }

    pub fn programs(&self) -> QueryEntry {
        let client = self.client.clone();
        self.query(Program::list_key(), move || {
            let client = client.clone();
            async move { client.list_programs().await }
        })
    }

    pub async fn fetch_programs(&self) -> Result<Vec<Program>> {
        let client = self.client.clone();
        self.load(Program::list_key(), move || {
            let client = client.clone();
            async move { client.list_programs().await }
        })
        .await
    }

    pub fn program(&self, id: &str) -> QueryEntry {
        let (client, id) = (self.client.clone(), id.to_string());
        self.query(Program::detail_key(&id), move || {
            let (client, id) = (client.clone(), id.clone());
            async move { client.get_program(&id).await }
        })
    }

    pub async fn fetch_program(&self, id: &str) -> Result<Program> {
        let (client, id) = (self.client.clone(), id.to_string());
        self.load(Program::detail_key(&id), move || {
            let (client, id) = (client.clone(), id.clone());
            async move { client.get_program(&id).await }
        })
        .await
    }

    pub fn gallery_images(&self) -> QueryEntry {
        let client = self.client.clone();
        self.query(GalleryImage::list_key(), move || {
            let client = client.clone();
            async move { client.list_gallery_images().await }
        })
    }

    pub async fn fetch_gallery_images(&self) -> Result<Vec<GalleryImage>> {
        let client = self.client.clone();
        self.load(GalleryImage::list_key(), move || {
            let client = client.clone();
            async move { client.list_gallery_images().await }
        })
        .await
    }

    pub fn gallery_image(&self, id: &str) -> QueryEntry {
        let (client, id) = (self.client.clone(), id.to_string());
        self.query(GalleryImage::detail_key(&id), move || {
            let (client, id) = (client.clone(), id.clone());
            async move { client.get_gallery_image(&id).await }
        })
    }

    pub async fn fetch_gallery_image(&self, id: &str) -> Result<GalleryImage> {
        let (client, id) = (self.client.clone(), id.to_string());
        self.load(GalleryImage::detail_key(&id), move || {
            let (client, id) = (client.clone(), id.clone());
            async move { client.get_gallery_image(&id).await }
        })
        .await
    }

    pub fn gallery_by_college(&self, college_id: &str) -> QueryEntry {
        let (client, id) = (self.client.clone(), college_id.to_string());
        self.query(keys::gallery_by_college(&id), move || {
            let (client, id) = (client.clone(), id.clone());
            async move { client.list_gallery_by_college(&id).await }
        })
    }

    pub async fn fetch_gallery_by_college(&self, college_id: &str) -> Result<Vec<GalleryImage>> {
        let (client, id) = (self.client.clone(), college_id.to_string());
        self.load(keys::gallery_by_college(&id), move || {
            let (client, id) = (client.clone(), id.clone());
            async move { client.list_gallery_by_college(&id).await }
        })
        .await
    }

    pub fn inquiries(&self) -> QueryEntry {
        let client = self.client.clone();
        self.query(Inquiry::list_key(), move || {
            let client = client.clone();
            async move { client.list_inquiries().await }
        })
    }

    pub async fn fetch_inquiries(&self) -> Result<Vec<Inquiry>> {
        let client = self.client.clone();
        self.load(Inquiry::list_key(), move || {
            let client = client.clone();
            async move { client.list_inquiries().await }
        })
        .await
    }

    pub fn inquiry(&self, id: &str) -> QueryEntry {
        let (client, id) = (self.client.clone(), id.to_string());
        self.query(Inquiry::detail_key(&id), move || {
            let (client, id) = (client.clone(), id.clone());
            async move { client.get_inquiry(&id).await }
        })
    }

    pub async fn fetch_inquiry(&self, id: &str) -> Result<Inquiry> {
        let (client, id) = (self.client.clone(), id.to_string());
        self.load(Inquiry::detail_key(&id), move || {
            let (client, id) = (client.clone(), id.clone());
            async move { client.get_inquiry(&id).await }
        })
        .await
    }

    pub fn form_submissions(&self) -> QueryEntry {
        let client = self.client.clone();
        self.query(FormSubmission::list_key(), move || {
            let client = client.clone();
            async move { client.list_form_submissions().await }
        })
    }

    pub async fn fetch_form_submissions(&self) -> Result<Vec<FormSubmission>> {
        let client = self.client.clone();
        self.load(FormSubmission::list_key(), move || {
            let client = client.clone();
            async move { client.list_form_submissions().await }
        })
        .await
    }

    pub fn form_submission(&self, id: &str) -> QueryEntry {
        let (client, id) = (self.client.clone(), id.to_string());
        self.query(FormSubmission::detail_key(&id), move || {
            let (client, id) = (client.clone(), id.clone());
            async move { client.get_form_submission(&id).await }
        })
    }

    pub async fn fetch_form_submission(&self, id: &str) -> Result<FormSubmission> {
        let (client, id) = (self.client.clone(), id.to_string());
        self.load(FormSubmission::detail_key(&id), move || {
            let (client, id) = (client.clone(), id.clone());
            async move { client.get_form_submission(&id).await }
        })
        .await
    }

    // ==================== Colleges ====================

    pub async fn create_college(&self, input: &CollegeInput) -> MutationOutcome<College> {
        let target = write_target::<College>(Operation::Create);
        self.write(target, None, async {
            input.validate()?;
            self.client.create_college(input).await
        })
        .await
    }

    pub async fn update_college(&self, id: &str, input: &CollegeInput) -> MutationOutcome<College> {
        let target = write_target::<College>(Operation::Update);
        self.write(target, Some(id), async {
            input.validate()?;
            self.client.update_college(id, input).await
        })
        .await
    }

    pub async fn update_college_with_media(
        &self,
        id: &str,
        update: &CollegeMediaUpdate,
    ) -> MutationOutcome<College> {
        let target = write_target::<College>(Operation::Update);
        self.write(target, Some(id), async {
            update.college.validate()?;
            self.client.update_college_with_media(id, update).await
        })
        .await
    }

    pub async fn delete_college(&self, id: &str) -> MutationOutcome<()> {
        let target = write_target::<College>(Operation::Delete);
        self.write(target, Some(id), self.client.delete_college(id))
            .await
    }

    pub async fn upload_college_logo(
        &self,
        id: &str,
        image: &Attachment,
    ) -> MutationOutcome<MediaUploadResponse> {
        let target = write_target::<College>(Operation::Upload);
        self.write(target, Some(id), async {
            require_image(Some(image))?;
            self.client.upload_college_logo(id, image).await
        })
        .await
    }

    pub async fn upload_college_banner(
        &self,
        id: &str,
        image: &Attachment,
    ) -> MutationOutcome<MediaUploadResponse> {
        let target = write_target::<College>(Operation::Upload);
        self.write(target, Some(id), async {
            require_image(Some(image))?;
            self.client.upload_college_banner(id, image).await
        })
        .await
    }

    pub async fn upload_faculty_image(
        &self,
        college_id: &str,
        faculty_id: &str,
        image: &Attachment,
    ) -> MutationOutcome<MediaUploadResponse> {
        let target = write_target::<College>(Operation::Upload);
        self.write(target, Some(college_id), async {
            require_image(Some(image))?;
            self.client
                .upload_faculty_image(college_id, faculty_id, image)
                .await
        })
        .await
    }

    // ==================== Programs ====================

    pub async fn create_program(&self, input: &ProgramInput) -> MutationOutcome<Program> {
        let target = write_target::<Program>(Operation::Create);
        self.write(target, None, async {
            input.validate()?;
            self.client.create_program(input).await
        })
        .await
    }

    pub async fn update_program(&self, id: &str, input: &ProgramInput) -> MutationOutcome<Program> {
        let target = write_target::<Program>(Operation::Update);
        self.write(target, Some(id), async {
            input.validate()?;
            self.client.update_program(id, input).await
        })
        .await
    }

    pub async fn delete_program(&self, id: &str) -> MutationOutcome<()> {
        let target = write_target::<Program>(Operation::Delete);
        self.write(target, Some(id), self.client.delete_program(id))
            .await
    }

    // ==================== Gallery ====================

    pub async fn upload_gallery_image(
        &self,
        upload: &GalleryUpload,
    ) -> MutationOutcome<GalleryImage> {
        let target = write_target::<GalleryImage>(Operation::Upload);
        self.write(target, None, async {
            require_image(upload.image.as_ref())?;
            upload.validate()?;
            self.client.upload_gallery_image(upload).await
        })
        .await
    }

    /// Edit an image's metadata; `upload.image` replaces the file when set
    pub async fn update_gallery_image(
        &self,
        id: &str,
        upload: &GalleryUpload,
    ) -> MutationOutcome<GalleryImage> {
        let target = write_target::<GalleryImage>(Operation::Update);
        self.write(target, Some(id), async {
            upload.validate()?;
            self.client.update_gallery_image(id, upload).await
        })
        .await
    }

    pub async fn delete_gallery_image(&self, id: &str) -> MutationOutcome<()> {
        let target = write_target::<GalleryImage>(Operation::Delete);
        self.write(target, Some(id), self.client.delete_gallery_image(id))
            .await
    }

    // ==================== Inquiries ====================

    pub async fn create_inquiry(&self, input: &InquiryInput) -> MutationOutcome<Inquiry> {
        let target = write_target::<Inquiry>(Operation::Create);
        self.write(target, None, async {
            input.validate()?;
            self.client.create_inquiry(input).await
        })
        .await
    }

    pub async fn delete_inquiry(&self, id: &str) -> MutationOutcome<()> {
        let target = write_target::<Inquiry>(Operation::Delete);
        self.write(target, Some(id), self.client.delete_inquiry(id))
            .await
    }

    // ==================== Form submissions ====================

    pub async fn create_form_submission(
        &self,
        input: &FormSubmissionInput,
    ) -> MutationOutcome<FormSubmission> {
        let target = write_target::<FormSubmission>(Operation::Create);
        self.write(target, None, async {
            input.validate()?;
            self.client.create_form_submission(input).await
        })
        .await
    }

    pub async fn update_form_submission(
        &self,
        id: &str,
        input: &FormSubmissionInput,
    ) -> MutationOutcome<FormSubmission> {
        let target = write_target::<FormSubmission>(Operation::Update);
        self.write(target, Some(id), async {
            input.validate()?;
            self.client.update_form_submission(id, input).await
        })
        .await
    }

    pub async fn delete_form_submission(&self, id: &str) -> MutationOutcome<()> {
        let target = write_target::<FormSubmission>(Operation::Delete);
        self.write(target, Some(id), self.client.delete_form_submission(id))
            .await
    }

    // ==================== Helpers ====================

    fn query<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> QueryEntry
    where
        T: Serialize + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.cache.get(&key, fetcher, QueryOptions::default())
    }

    async fn load<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let entry = self
            .cache
            .fetch(&key, fetcher, QueryOptions::default())
            .await;
        resolve_entry(entry)
    }

    async fn write<T, Fut>(
        &self,
        target: MutationTarget,
        id: Option<&str>,
        call: Fut,
    ) -> MutationOutcome<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        self.mutations
            .mutate(target, keys::affected_keys(&target, id), call)
            .await
    }
}

/// Turn a resolved entry into the typed payload or its error
fn resolve_entry<T: DeserializeOwned>(entry: QueryEntry) -> Result<T> {
    if let Some(err) = entry.error {
        return Err(err);
    }
    let data = entry.data.ok_or_else(|| {
        ApiError::new(ErrorKind::ServerError, format!("No data for {}", entry.key))
    })?;
    Ok(serde_json::from_value(data)?)
}

fn write_target<R: Resource>(operation: Operation) -> MutationTarget {
    MutationTarget::new(R::KIND, operation)
}

fn require_image(image: Option<&Attachment>) -> Result<()> {
    match image {
        Some(image) if !image.is_empty() => Ok(()),
        _ => Err(ApiError::new(ErrorKind::Validation, "An image file is required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::QueryStatus;
    use crate::config::ClientConfig;
    use crate::mutation::ResourceKind;

    fn entry(data: Option<serde_json::Value>, error: Option<ApiError>) -> QueryEntry {
        QueryEntry {
            status: if error.is_some() {
                QueryStatus::Error
            } else {
                QueryStatus::Success
            },
            data,
            error,
            ..QueryEntry::idle(keys::colleges())
        }
    }

    #[test]
    fn test_resolve_prefers_error() {
        let err = ApiError::network("down");
        let result: Result<Vec<String>> =
            resolve_entry(entry(Some(serde_json::json!(["cached"])), Some(err.clone())));
        assert_eq!(result.unwrap_err(), err);
    }

    #[test]
    fn test_resolve_decodes_data() {
        let result: Result<Vec<String>> =
            resolve_entry(entry(Some(serde_json::json!(["a"])), None));
        assert_eq!(result.unwrap(), vec!["a".to_string()]);

        let result: Result<Vec<String>> = resolve_entry(entry(None, None));
        assert_eq!(result.unwrap_err().kind, ErrorKind::ServerError);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SdkConfig {
            client: ClientConfig::with_base_url("ftp://campus"),
            ..Default::default()
        };
        assert!(matches!(
            AdminContext::new(config),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_gallery_upload_requires_image() {
        let context = AdminContext::new(SdkConfig::default()).unwrap();
        let upload = GalleryUpload {
            title: "Gate".into(),
            category: "campus".into(),
            alt: "Main gate".into(),
            ..Default::default()
        };

        let outcome = context.upload_gallery_image(&upload).await;

        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let record = &context.mutations().records()[0];
        assert!(record.error.is_some());
        assert_eq!(
            record.target,
            MutationTarget::new(ResourceKind::GalleryImage, Operation::Upload)
        );
    }
}
