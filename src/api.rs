//! REST client for the Candlr backend.
//!
//! - `GET  /health` and `GET /api/prompts` for status and prompt templates
//! - `POST /api/extract-subject`, `/api/generate-image`, `/api/create-depth-map`
//!   for the AI steps (JSON in, base64 image out)
//! - `POST /api/generate-mold` returning the STL as a binary attachment
//!
//! Requests go through the browser `fetch` via `gloo-net`. Outside the browser
//! every call fails with [`ApiError::Unavailable`].

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

#[cfg(target_arch = "wasm32")]
use gloo_net::http::{Request, Response};

use crate::error::ApiError;
use crate::wizard::Stage;

pub const DEFAULT_MOLD_FILENAME: &str = "candle_mold.stl";

/// Marker the backend puts in front of `prompt_used` when it had to fall
/// back to local processing.
const FALLBACK_MARKER: &str = "[FALLBACK";

#[derive(Debug, Clone, Serialize)]
pub struct ImageInput {
    /// Base64 payload or `data:` URI.
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptInput {
    pub prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessedImageResponse {
    pub processed_image: String,
    pub prompt_used: String,
    pub model_used: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedImageResponse {
    pub generated_image: String,
    pub prompt_used: String,
    pub model_used: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepthMapResponse {
    pub depth_map: String,
    pub prompt_used: String,
    pub model_used: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoldRequest {
    pub depth_map: String,
    pub wall_thickness: f32,
    pub max_width: f32,
    pub max_height: f32,
    pub max_depth: f32,
    pub include_registration_marks: bool,
    pub include_pouring_channel: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PromptTemplate {
    pub prompt: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PromptTemplates {
    pub extract_subject: PromptTemplate,
    /// Contains a `{user_prompt}` placeholder.
    pub generate_image: PromptTemplate,
    pub create_depth_map: PromptTemplate,
    pub generate_mold: PromptTemplate,
}

impl PromptTemplates {
    pub fn template(&self, stage: Stage) -> &PromptTemplate {
        match stage {
            Stage::ExtractSubject => &self.extract_subject,
            Stage::GenerateImage => &self.generate_image,
            Stage::CreateDepthMap => &self.create_depth_map,
            Stage::GenerateMold => &self.generate_mold,
        }
    }

    /// Prompt text to show while `stage` runs.
    pub fn for_stage(&self, stage: Stage, user_prompt: Option<&str>) -> String {
        let text = &self.template(stage).prompt;
        match user_prompt {
            Some(p) => text.replace("{user_prompt}", p),
            None => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Health {
    pub status: String,
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// What every AI step hands back, whichever endpoint produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput {
    pub image_base64: String,
    pub prompt_used: String,
    pub model_used: String,
}

impl StageOutput {
    pub fn is_fallback(&self) -> bool {
        self.prompt_used.trim_start().starts_with(FALLBACK_MARKER)
    }
}

impl From<ProcessedImageResponse> for StageOutput {
    fn from(r: ProcessedImageResponse) -> Self {
        Self { image_base64: r.processed_image, prompt_used: r.prompt_used, model_used: r.model_used }
    }
}

impl From<GeneratedImageResponse> for StageOutput {
    fn from(r: GeneratedImageResponse) -> Self {
        Self { image_base64: r.generated_image, prompt_used: r.prompt_used, model_used: r.model_used }
    }
}

impl From<DepthMapResponse> for StageOutput {
    fn from(r: DepthMapResponse) -> Self {
        Self { image_base64: r.depth_map, prompt_used: r.prompt_used, model_used: r.model_used }
    }
}

/// The generated STL, as downloaded.
#[derive(Clone, PartialEq)]
pub struct MoldFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for MoldFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoldFile")
            .field("filename", &self.filename)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// `key=value` parameters of a header, with quoted values unquoted.
/// Separators inside quotes belong to the value.
fn header_params(header: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut part = String::new();
    let mut value = None::<String>;
    let mut quoted = false;
    let mut chars = header.chars();

    let mut flush = |part: &mut String, value: &mut Option<String>| {
        if let Some(v) = value.take() {
            params.push((part.trim().to_ascii_lowercase(), v.trim().to_string()));
        }
        part.clear();
    };

    while let Some(c) = chars.next() {
        match (c, value.as_mut()) {
            ('"', Some(_)) => quoted = !quoted,
            ('\\', Some(v)) if quoted => v.extend(chars.next()),
            (';', _) if !quoted => flush(&mut part, &mut value),
            ('=', None) => value = Some(String::new()),
            (c, Some(v)) => v.push(c),
            (c, None) => part.push(c),
        }
    }
    flush(&mut part, &mut value);
    params
}

/// Picks the file name out of a `Content-Disposition` header.
///
/// `filename*=UTF-8''...` wins over `filename=`; directories are stripped.
pub fn filename_from_disposition(header: Option<&str>) -> String {
    let Some(header) = header else {
        return DEFAULT_MOLD_FILENAME.to_string();
    };

    let mut plain = None;
    let mut extended = None;
    for (key, value) in header_params(header) {
        match key.as_str() {
            "filename*" => {
                // charset'language'percent-encoded, where `+` is literal
                let encoded = value.rsplit_once('\'').map_or(value.as_str(), |(_, v)| v);
                extended = Some(percent_decode_str(encoded).decode_utf8_lossy().into_owned());
            }
            "filename" => plain = Some(value),
            _ => {}
        }
    }

    extended
        .or(plain)
        .and_then(|name| {
            name.rsplit(['/', '\\'])
                .next()
                .map(str::trim)
                .filter(|n| !n.is_empty() && *n != "." && *n != "..")
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_MOLD_FILENAME.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiClient {
    base: String,
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self { base: base.trim_end_matches('/').to_string() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    pub async fn health(&self) -> Result<Health, ApiError> {
        self.get_json("health").await
    }

    pub async fn prompts(&self) -> Result<PromptTemplates, ApiError> {
        self.get_json("api/prompts").await
    }

    pub async fn extract_subject(&self, image: String) -> Result<StageOutput, ApiError> {
        let r: ProcessedImageResponse = self.post_json("api/extract-subject", &ImageInput { image }).await?;
        Ok(r.into())
    }

    pub async fn generate_image(&self, prompt: String) -> Result<StageOutput, ApiError> {
        let r: GeneratedImageResponse = self.post_json("api/generate-image", &PromptInput { prompt }).await?;
        Ok(r.into())
    }

    pub async fn create_depth_map(&self, image: String) -> Result<StageOutput, ApiError> {
        let r: DepthMapResponse = self.post_json("api/create-depth-map", &ImageInput { image }).await?;
        Ok(r.into())
    }

    pub async fn generate_mold(&self, request: &MoldRequest) -> Result<MoldFile, ApiError> {
        let (filename, bytes) = self.post_binary("api/generate-mold", request).await?;
        if bytes.is_empty() {
            return Err(ApiError::Decode("mold download was empty".into()));
        }
        Ok(MoldFile { filename, bytes })
    }
}

fn decode_json<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(target_arch = "wasm32")]
fn network<E: std::fmt::Display>(e: E) -> ApiError {
    ApiError::Network(e.to_string())
}

#[cfg(target_arch = "wasm32")]
impl ApiClient {
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let started = js_sys::Date::now();
        log::info!("GET {url}");
        let response = Request::get(&url).send().await.map_err(network)?;
        let result = read_json(response).await;
        log::info!("GET {url} finished in {:.0}ms", js_sys::Date::now() - started);
        result
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let url = self.url(path);
        let started = js_sys::Date::now();
        log::info!("POST {url}");
        let response = Request::post(&url).json(body).map_err(network)?.send().await.map_err(network)?;
        let result = read_json(response).await;
        log::info!("POST {url} finished in {:.0}ms", js_sys::Date::now() - started);
        result
    }

    async fn post_binary<B: Serialize>(&self, path: &str, body: &B) -> Result<(String, Vec<u8>), ApiError> {
        let url = self.url(path);
        let started = js_sys::Date::now();
        log::info!("POST {url}");
        let response = Request::post(&url).json(body).map_err(network)?.send().await.map_err(network)?;
        if !response.ok() {
            return Err(read_failure(&response).await);
        }
        let filename = filename_from_disposition(response.headers().get("content-disposition").as_deref());
        let bytes = response.binary().await.map_err(network)?;
        log::info!(
            "POST {url} returned {} bytes in {:.0}ms",
            bytes.len(),
            js_sys::Date::now() - started
        );
        Ok((filename, bytes))
    }
}

#[cfg(target_arch = "wasm32")]
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.ok() {
        return Err(read_failure(&response).await);
    }
    let text = response.text().await.map_err(network)?;
    decode_json(&text)
}

#[cfg(target_arch = "wasm32")]
async fn read_failure(response: &Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let err = ApiError::from_response(status, &body);
    log::error!("{} failed: {err}", response.url());
    err
}

// --------------------------- non-wasm fallbacks ---------------------------

#[cfg(not(target_arch = "wasm32"))]
impl ApiClient {
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        log::warn!("GET {} skipped: {}", self.url(path), ApiError::Unavailable);
        Err(ApiError::Unavailable)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, _body: &B) -> Result<T, ApiError> {
        log::warn!("POST {} skipped: {}", self.url(path), ApiError::Unavailable);
        Err(ApiError::Unavailable)
    }

    async fn post_binary<B: Serialize>(&self, path: &str, _body: &B) -> Result<(String, Vec<u8>), ApiError> {
        log::warn!("POST {} skipped: {}", self.url(path), ApiError::Unavailable);
        Err(ApiError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates() -> PromptTemplates {
        decode_json(
            r#"{
                "extract_subject": {"prompt": "Extract the subject", "model": "content-model"},
                "generate_image": {"prompt": "Create an image of:\n\nSubject: {user_prompt}\n", "model": "content-model"},
                "create_depth_map": {"prompt": "Make a depth map", "model": "content-model"},
                "generate_mold": {"prompt": "Converting depth map to 3D mesh geometry (local processing)", "model": "numpy-stl"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn urls_join_cleanly() {
        assert_eq!(ApiClient::new("").url("api/prompts"), "/api/prompts");
        assert_eq!(ApiClient::new("http://localhost:8000/").url("/health"), "http://localhost:8000/health");
    }

    #[test]
    fn prompt_for_generation_substitutes_user_text() {
        let t = templates();
        assert_eq!(
            t.for_stage(Stage::GenerateImage, Some("a sleeping fox")),
            "Create an image of:\n\nSubject: a sleeping fox\n"
        );
        assert_eq!(t.for_stage(Stage::CreateDepthMap, Some("ignored")), "Make a depth map");
        assert_eq!(t.template(Stage::GenerateMold).model, "numpy-stl");
    }

    #[test]
    fn stage_responses_normalise() {
        let r: DepthMapResponse = decode_json(
            r#"{"depth_map": "iVBOR", "prompt_used": "[FALLBACK - Luminance-based depth map]\n\n...", "model_used": "Local processing"}"#,
        )
        .unwrap();
        let out = StageOutput::from(r);
        assert_eq!(out.image_base64, "iVBOR");
        assert!(out.is_fallback());

        let r: ProcessedImageResponse =
            decode_json(r#"{"processed_image": "abc", "prompt_used": "Extract", "model_used": "m"}"#).unwrap();
        assert!(!StageOutput::from(r).is_fallback());
    }

    #[test]
    fn missing_fields_are_decode_errors() {
        let err = decode_json::<GeneratedImageResponse>(r#"{"generated_image": "abc"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn health_status() {
        let h: Health = decode_json(r#"{"status": "healthy"}"#).unwrap();
        assert!(h.is_healthy());
        assert!(!Health { status: "degraded".into() }.is_healthy());
    }

    #[test]
    fn disposition_filenames() {
        assert_eq!(
            filename_from_disposition(Some("attachment; filename=candle_mold.stl")),
            "candle_mold.stl"
        );
        assert_eq!(
            filename_from_disposition(Some(r#"attachment; filename="fox mold.stl""#)),
            "fox mold.stl"
        );
        assert_eq!(
            filename_from_disposition(Some(
                "attachment; filename=fallback.stl; filename*=UTF-8''r%C3%A9sum%C3%A9.stl"
            )),
            "résumé.stl"
        );
        assert_eq!(filename_from_disposition(Some("attachment; filename=../../etc/x.stl")), "x.stl");
        assert_eq!(filename_from_disposition(Some("attachment")), DEFAULT_MOLD_FILENAME);
        assert_eq!(filename_from_disposition(Some("attachment; filename=\"\"")), DEFAULT_MOLD_FILENAME);
        assert_eq!(filename_from_disposition(None), DEFAULT_MOLD_FILENAME);
    }

    #[test]
    fn extended_filenames_keep_plus_signs() {
        assert_eq!(
            filename_from_disposition(Some("attachment; filename*=UTF-8''fox+owl.stl")),
            "fox+owl.stl"
        );
        assert_eq!(filename_from_disposition(Some("attachment; filename=fox+owl.stl")), "fox+owl.stl");
    }

    #[test]
    fn quoted_filenames_may_contain_separators() {
        assert_eq!(
            filename_from_disposition(Some(r#"attachment; filename="a;b.stl"; size=12"#)),
            "a;b.stl"
        );
        assert_eq!(
            filename_from_disposition(Some(r#"attachment; filename="say \"hi\".stl""#)),
            r#"say "hi".stl"#
        );
        assert_eq!(
            header_params(r#"attachment; filename="x=y.stl""#),
            vec![("filename".to_string(), "x=y.stl".to_string())]
        );
    }

    #[test]
    fn requests_serialize_with_backend_field_names() {
        let body = serde_json::to_value(ImageInput { image: "data:image/png;base64,AAA".into() }).unwrap();
        assert_eq!(body, serde_json::json!({"image": "data:image/png;base64,AAA"}));
        let body = serde_json::to_value(PromptInput { prompt: "owl".into() }).unwrap();
        assert_eq!(body, serde_json::json!({"prompt": "owl"}));
    }
}
