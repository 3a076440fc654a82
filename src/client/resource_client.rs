//! Resource client for the campus admin API

use super::multipart;
use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError, ErrorKind, Result};
use crate::traits::{AuthApi, AuthFailureListener, Resource};
use crate::types::*;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the admin API.
///
/// Cookies set by `/auth/login` are kept and sent with every later request.
/// Cheap to clone; clones share the connection pool, the cookie jar and the
/// auth-failure listener.
///
/// # Example
///
/// ```rust,ignore
/// use campus_sdk::{ClientConfig, ResourceClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ResourceClient::new(ClientConfig::with_base_url("http://localhost:3000"))?;
///
/// let colleges = client.list_colleges().await?;
/// for college in &colleges {
///     println!("{} ({})", college.name, college.short_name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ResourceClient {
    config: ClientConfig,
    http: Client,
    listener: Arc<OnceLock<Arc<dyn AuthFailureListener>>>,
}

/// Error body shape: `{message, errors}`
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<Value>,
}

impl ResourceClient {
    pub fn new(config: ClientConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let http = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            http,
            listener: Arc::new(OnceLock::new()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Register the receiver of authorization failures.
    ///
    /// Only the first registration takes effect; returns whether this one did.
    pub fn set_auth_listener(&self, listener: Arc<dyn AuthFailureListener>) -> bool {
        self.listener.set(listener).is_ok()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    fn item_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url,
            collection,
            urlencoding::encode(id)
        )
    }

    // ==================== Colleges ====================

    pub async fn list_colleges(&self) -> Result<Vec<College>> {
        self.list::<College>("Failed to fetch colleges").await
    }

    pub async fn get_college(&self, id: &str) -> Result<College> {
        self.get_one::<College>(id, "Failed to fetch college").await
    }

    pub async fn create_college(&self, input: &CollegeInput) -> Result<College> {
        let request = self.http.post(self.url(College::PATH)).json(input);
        self.send(request, "Failed to create college").await
    }

    pub async fn update_college(&self, id: &str, input: &CollegeInput) -> Result<College> {
        let request = self.http.put(self.item_url(College::PATH, id)).json(input);
        self.send(request, "Failed to update college").await
    }

    /// Replace a college's fields and images in one multipart request
    pub async fn update_college_with_media(
        &self,
        id: &str,
        update: &CollegeMediaUpdate,
    ) -> Result<College> {
        let form = multipart::college_media_form(update)?;
        let request = self
            .http
            .put(self.item_url(College::PATH, id))
            .multipart(form);
        self.send(request, "Failed to update college").await
    }

    pub async fn delete_college(&self, id: &str) -> Result<()> {
        self.delete_one::<College>(id, "Failed to delete college").await
    }

    pub async fn upload_college_logo(
        &self,
        id: &str,
        image: &Attachment,
    ) -> Result<MediaUploadResponse> {
        let url = format!("{}/upload-logo", self.item_url(College::PATH, id));
        let request = self.http.post(url).multipart(multipart::image_form(image)?);
        self.send(request, "Failed to upload logo").await
    }

    pub async fn upload_college_banner(
        &self,
        id: &str,
        image: &Attachment,
    ) -> Result<MediaUploadResponse> {
        let url = format!("{}/upload-banner", self.item_url(College::PATH, id));
        let request = self.http.post(url).multipart(multipart::image_form(image)?);
        self.send(request, "Failed to upload banner").await
    }

    pub async fn upload_faculty_image(
        &self,
        college_id: &str,
        faculty_id: &str,
        image: &Attachment,
    ) -> Result<MediaUploadResponse> {
        let url = format!(
            "{}/faculty/{}/upload-image",
            self.item_url(College::PATH, college_id),
            urlencoding::encode(faculty_id)
        );
        let request = self.http.post(url).multipart(multipart::image_form(image)?);
        self.send(request, "Failed to upload faculty image").await
    }

    // ==================== Programs ====================

    pub async fn list_programs(&self) -> Result<Vec<Program>> {
        self.list::<Program>("Failed to fetch programs").await
    }

    pub async fn get_program(&self, id: &str) -> Result<Program> {
        self.get_one::<Program>(id, "Failed to fetch program").await
    }

    pub async fn create_program(&self, input: &ProgramInput) -> Result<Program> {
        let request = self.http.post(self.url(Program::PATH)).json(input);
        self.send(request, "Failed to create program").await
    }

    pub async fn update_program(&self, id: &str, input: &ProgramInput) -> Result<Program> {
        let request = self.http.put(self.item_url(Program::PATH, id)).json(input);
        self.send(request, "Failed to update program").await
    }

    pub async fn delete_program(&self, id: &str) -> Result<()> {
        self.delete_one::<Program>(id, "Failed to delete program").await
    }

    // ==================== Gallery ====================

    pub async fn list_gallery_images(&self) -> Result<Vec<GalleryImage>> {
        let request = self.http.get(self.url(GalleryImage::PATH));
        let envelope: Envelope<Vec<GalleryImage>> =
            self.send(request, "Failed to fetch gallery images").await?;
        Ok(envelope.data)
    }

    /// Fetch one image; the API answers a missing id with `data: null`
    pub async fn get_gallery_image(&self, id: &str) -> Result<GalleryImage> {
        let url = format!(
            "{}/id?id={}",
            self.url(GalleryImage::PATH),
            urlencoding::encode(id)
        );
        let envelope: Envelope<Option<GalleryImage>> = self
            .send(self.http.get(url), "Failed to fetch gallery image")
            .await?;
        envelope.data.ok_or_else(|| {
            ApiError::new(
                ErrorKind::NotFound,
                envelope
                    .message
                    .unwrap_or_else(|| format!("Gallery image {} not found", id)),
            )
        })
    }

    pub async fn list_gallery_by_college(&self, college_id: &str) -> Result<Vec<GalleryImage>> {
        let url = format!(
            "{}/college/{}",
            self.url(GalleryImage::PATH),
            urlencoding::encode(college_id)
        );
        let envelope: Envelope<Vec<GalleryImage>> = self
            .send(self.http.get(url), "Failed to fetch gallery images")
            .await?;
        Ok(envelope.data)
    }

    pub async fn upload_gallery_image(&self, upload: &GalleryUpload) -> Result<GalleryImage> {
        let url = format!("{}/upload", self.url(GalleryImage::PATH));
        let request = self
            .http
            .post(url)
            .multipart(multipart::gallery_form(upload)?);
        let envelope: Envelope<GalleryImage> =
            self.send(request, "Failed to upload image").await?;
        Ok(envelope.data)
    }

    pub async fn update_gallery_image(
        &self,
        id: &str,
        upload: &GalleryUpload,
    ) -> Result<GalleryImage> {
        let request = self
            .http
            .put(self.item_url(GalleryImage::PATH, id))
            .multipart(multipart::gallery_form(upload)?);
        let envelope: Envelope<GalleryImage> =
            self.send(request, "Failed to update image").await?;
        Ok(envelope.data)
    }

    pub async fn delete_gallery_image(&self, id: &str) -> Result<()> {
        self.delete_one::<GalleryImage>(id, "Failed to delete image")
            .await
    }

    // ==================== Inquiries ====================

    pub async fn list_inquiries(&self) -> Result<Vec<Inquiry>> {
        self.list::<Inquiry>("Failed to fetch inquiries").await
    }

    pub async fn get_inquiry(&self, id: &str) -> Result<Inquiry> {
        self.get_one::<Inquiry>(id, "Failed to fetch inquiry").await
    }

    pub async fn create_inquiry(&self, input: &InquiryInput) -> Result<Inquiry> {
        let request = self.http.post(self.url(Inquiry::PATH)).json(input);
        self.send(request, "Failed to create inquiry").await
    }

    pub async fn delete_inquiry(&self, id: &str) -> Result<()> {
        self.delete_one::<Inquiry>(id, "Failed to delete inquiry").await
    }

    // ==================== Form submissions ====================

    pub async fn list_form_submissions(&self) -> Result<Vec<FormSubmission>> {
        let request = self.http.get(self.url(FormSubmission::PATH));
        let list: FormList = self
            .send(request, "Failed to fetch form submissions")
            .await?;
        Ok(list.data)
    }

    pub async fn get_form_submission(&self, id: &str) -> Result<FormSubmission> {
        self.get_one::<FormSubmission>(id, "Failed to fetch form submission")
            .await
    }

    pub async fn create_form_submission(
        &self,
        input: &FormSubmissionInput,
    ) -> Result<FormSubmission> {
        let request = self.http.post(self.url(FormSubmission::PATH)).json(input);
        self.send(request, "Failed to create form submission").await
    }

    pub async fn update_form_submission(
        &self,
        id: &str,
        input: &FormSubmissionInput,
    ) -> Result<FormSubmission> {
        let request = self
            .http
            .put(self.item_url(FormSubmission::PATH, id))
            .json(input);
        self.send(request, "Failed to update form submission").await
    }

    pub async fn delete_form_submission(&self, id: &str) -> Result<()> {
        self.delete_one::<FormSubmission>(id, "Failed to delete form submission")
            .await
    }

    // ==================== Helpers ====================

    async fn list<R: Resource>(&self, fallback: &str) -> Result<Vec<R>> {
        let request = self.http.get(self.url(R::PATH));
        self.send(request, fallback).await
    }

    async fn get_one<R: Resource>(&self, id: &str, fallback: &str) -> Result<R> {
        let request = self.http.get(self.item_url(R::PATH, id));
        self.send(request, fallback).await
    }

    async fn delete_one<R: Resource>(&self, id: &str, fallback: &str) -> Result<()> {
        let request = self.http.delete(self.item_url(R::PATH, id));
        let response = self.dispatch(request, fallback).await?;
        self.check_status(response, fallback, true).await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T> {
        let response = self.dispatch(request, fallback).await?;
        self.handle_response(response, fallback, true).await
    }

    /// Send a request on behalf of the auth endpoints.
    ///
    /// These never report authorization failures to the listener. Any 2xx is
    /// accepted: an empty or non-JSON body decodes to `T::default()`.
    async fn send_auth<T: DeserializeOwned + Default>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T> {
        let response = self.dispatch(request, fallback).await?;
        let response = self.check_status(response, fallback, false).await?;
        let body = response.bytes().await.unwrap_or_default();
        Ok(lenient_body(&body))
    }

    async fn dispatch(&self, request: RequestBuilder, fallback: &str) -> Result<Response> {
        request.send().await.map_err(|err| {
            warn!(error = %err, "{}", fallback);
            ApiError::network(format!("{}: {}", fallback, err))
        })
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        fallback: &str,
        notify: bool,
    ) -> Result<T> {
        let response = self.check_status(response, fallback, notify).await?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| ApiError::network(format!("{}: {}", fallback, err)))?;

        serde_json::from_slice(&body).map_err(|err| {
            warn!(status, error = %err, "Response body did not decode");
            ApiError {
                status: Some(status),
                ..ApiError::new(
                    ErrorKind::ServerError,
                    format!("{}: unexpected response ({})", fallback, err),
                )
            }
        })
    }

    async fn check_status(
        &self,
        response: Response,
        fallback: &str,
        notify: bool,
    ) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), url = %response.url(), "Request succeeded");
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let err = error_from_body(status.as_u16(), &body, fallback);
        debug!(status = status.as_u16(), kind = %err.kind, "Request failed");

        if notify && err.is_unauthorized() {
            if let Some(listener) = self.listener.get() {
                listener.on_unauthorized(&err);
            }
        }
        Err(err)
    }
}

fn lenient_body<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    if body.iter().all(u8::is_ascii_whitespace) {
        return T::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|err| {
        debug!(error = %err, "Ignoring undecodable auth response body");
        T::default()
    })
}

/// Normalize a non-success response body into an [`ApiError`]
fn error_from_body(status: u16, body: &[u8], fallback: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = parsed
        .message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());

    ApiError::from_status(status, message).with_field_errors(field_errors(parsed.errors))
}

/// `errors` may be `{field: message}`, `{field: {message}}` or `[message]`
fn field_errors(errors: Option<Value>) -> BTreeMap<String, String> {
    let describe = |value: &Value| match value {
        Value::String(message) => Some(message.clone()),
        Value::Object(inner) => inner
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    };

    match errors {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(field, value)| describe(value).map(|message| (field.clone(), message)))
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(describe)
            .enumerate()
            .map(|(i, message)| (i.to_string(), message))
            .collect(),
        _ => BTreeMap::new(),
    }
}

#[async_trait]
impl AuthApi for ResourceClient {
    /// Any authenticated read will do; `/colleges` is the cheapest
    async fn probe(&self) -> Result<Option<String>> {
        let request = self.http.get(self.url(College::PATH));
        let response = self
            .dispatch(request, "Failed to verify session")
            .await?;
        self.check_status(response, "Failed to verify session", false)
            .await?;
        Ok(None)
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        let request = self.http.post(self.url("auth/login")).json(credentials);
        self.send_auth(request, "An error occurred during login")
            .await
    }

    async fn logout(&self) -> Result<()> {
        let request = self.http.get(self.url("auth/logout"));
        let response = self
            .dispatch(request, "An error occurred during logout")
            .await?;
        self.check_status(response, "An error occurred during logout", false)
            .await?;
        Ok(())
    }

    async fn register(&self, credentials: &Credentials) -> Result<MessageResponse> {
        let request = self.http.post(self.url("auth/register")).json(credentials);
        self.send_auth(request, "An error occurred during registration")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ResourceClient {
        ResourceClient::new(ClientConfig::with_base_url("http://localhost:3000/")).unwrap()
    }

    #[test]
    fn test_urls_encode_ids() {
        let client = client();
        assert_eq!(client.url("colleges"), "http://localhost:3000/colleges");
        assert_eq!(
            client.item_url("colleges", "a b/c"),
            "http://localhost:3000/colleges/a%20b%2Fc"
        );
    }

    #[test]
    fn test_error_message_from_body() {
        let body = json!({"message": "Name already taken"}).to_string();
        let err = error_from_body(409, body.as_bytes(), "Failed to create college");
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Name already taken");
        assert_eq!(err.status, Some(409));
    }

    #[test]
    fn test_error_message_fallback() {
        let err = error_from_body(500, b"<html>oops</html>", "Failed to fetch colleges");
        assert_eq!(err.kind, ErrorKind::ServerError);
        assert_eq!(err.message, "Failed to fetch colleges");

        let err = error_from_body(404, br#"{"message": ""}"#, "Failed to fetch college");
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, "Failed to fetch college");
    }

    #[test]
    fn test_field_errors_shapes() {
        let body = json!({
            "message": "Validation failed",
            "errors": {"name": "Name is required", "email": {"message": "Invalid email"}, "x": 1}
        })
        .to_string();
        let err = error_from_body(400, body.as_bytes(), "fallback");
        assert_eq!(err.field_errors.len(), 2);
        assert_eq!(err.field_errors["email"], "Invalid email");

        let body = json!({"errors": ["first", "second"]}).to_string();
        let err = error_from_body(422, body.as_bytes(), "fallback");
        assert_eq!(err.message, "fallback");
        assert_eq!(err.field_errors["1"], "second");
    }

    #[test]
    fn test_lenient_auth_body() {
        let empty: LoginResponse = lenient_body(b"");
        assert_eq!(empty, LoginResponse::default());

        let text: LoginResponse = lenient_body(b"Logged in");
        assert_eq!(text.username, None);

        let json: LoginResponse = lenient_body(br#"{"username": "dean"}"#);
        assert_eq!(json.username.as_deref(), Some("dean"));
    }

    #[test]
    fn test_listener_registers_once() {
        struct Noop;
        impl AuthFailureListener for Noop {
            fn on_unauthorized(&self, _error: &ApiError) {}
        }

        let client = client();
        assert!(client.set_auth_listener(Arc::new(Noop)));
        assert!(!client.clone().set_auth_listener(Arc::new(Noop)));
    }
}
