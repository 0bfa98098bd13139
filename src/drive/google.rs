//! Google Drive API v3 backend
//!
//! Implements [`DriveApi`] over the Drive REST API with a bearer access token.
//! Requests are issued one at a time through an [`HttpClient`] and are never
//! retried.

use std::path::Path;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use reqwest::header::LOCATION;
use reqwest::{Method, StatusCode};
use snafu::OptionExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::drive::api::{DriveApi, ItemKind, RemoteItem, export_format};
use crate::drive::constants::{FILE_FIELDS, FOLDER_MIME_TYPE, LIST_PAGE_SIZE, PROGRESS_STEP_BYTES};
use crate::drive::http::{HttpClient, HttpRequest, HttpResponse, HttpStream};
use crate::drive::types::{ApiErrorResponse, DriveFile, FileMetadata, FilesListResponse};
use crate::drive::utils::progress::ConsoleProgressReporter;
use crate::error::{Error, MissingUploadSessionSnafu, Result, UnsupportedExportSnafu};

/// Google Drive REST client.
#[derive(Clone)]
pub struct GoogleDrive {
    http: Arc<dyn HttpClient>,
    access_token: String,
    api_base: String,
    upload_base: String,
}

impl GoogleDrive {
    pub fn with_endpoints(
        http: Arc<dyn HttpClient>,
        access_token: String,
        api_base: String,
        upload_base: String,
    ) -> Self {
        Self {
            http,
            access_token,
            api_base: api_base.trim_end_matches('/').to_string(),
            upload_base: upload_base.trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, method: Method, url: String) -> HttpRequest {
        HttpRequest::new(method, url)
            .bearer(&self.access_token)
            .query("supportsAllDrives", "true")
    }

    /// Execute a buffered request and map failures to typed errors.
    async fn send(&self, request: HttpRequest, id: &str) -> Result<HttpResponse> {
        let response = self.http.execute(request).await?;
        if response.status.is_success() {
            return Ok(response);
        }
        log::warn!(
            "Drive API request failed: status={} id={id}",
            response.status
        );
        Err(classify_failure(
            response.status,
            &String::from_utf8_lossy(&response.body),
            id,
        ))
    }

    /// Run a files.list query, following page tokens until exhausted.
    async fn list_query(&self, query: &str, folder_id: &str) -> Result<Vec<RemoteItem>> {
        let fields = format!("nextPageToken,files({FILE_FIELDS})");
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .request(Method::GET, format!("{}/files", self.api_base))
                .query("q", query)
                .query("fields", fields.as_str())
                .query("pageSize", LIST_PAGE_SIZE.to_string())
                .query("orderBy", "name")
                .query("includeItemsFromAllDrives", "true");
            if let Some(token) = &page_token {
                request = request.query("pageToken", token.as_str());
            }

            let page: FilesListResponse = self.send(request, folder_id).await?.json()?;
            items.extend(page.files.into_iter().map(RemoteItem::from));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        log::debug!("listed {} item(s) for query {query}", items.len());
        Ok(items)
    }

    /// Open a resumable upload session and return its session URL.
    async fn start_upload_session(
        &self,
        method: Method,
        url: String,
        metadata: &FileMetadata<'_>,
        mime_type: &str,
        content_length: usize,
        target: &str,
    ) -> Result<String> {
        let request = self
            .request(method, url)
            .query("uploadType", "resumable")
            .query("fields", FILE_FIELDS)
            .header("X-Upload-Content-Type", mime_type)
            .header("X-Upload-Content-Length", content_length.to_string())
            .json(metadata)?;
        let response = self.send(request, target).await?;

        response
            .header(LOCATION.as_str())
            .map(str::to_string)
            .context(MissingUploadSessionSnafu)
    }

    /// Push the whole content to an upload session in one request.
    async fn finish_upload(
        &self,
        session_url: String,
        mime_type: &str,
        content: Bytes,
        target: &str,
    ) -> Result<RemoteItem> {
        let request = HttpRequest::new(Method::PUT, session_url)
            .bearer(&self.access_token)
            .body(mime_type, content);
        let file: DriveFile = self.send(request, target).await?.json()?;
        Ok(file.into())
    }

    /// Start fetching the content of a file, exporting Google-native documents.
    async fn open_content(&self, item: &RemoteItem) -> Result<HttpStream> {
        let request = if item.is_google_native() {
            let format = export_format(&item.mime_type).context(UnsupportedExportSnafu {
                name: item.name.clone(),
                mime_type: item.mime_type.clone(),
            })?;
            self.request(
                Method::GET,
                format!("{}/files/{}/export", self.api_base, item.id),
            )
            .query("mimeType", format.mime_type)
        } else {
            self.request(Method::GET, format!("{}/files/{}", self.api_base, item.id))
                .query("alt", "media")
        };

        let response = self.http.execute_stream(request).await?;
        if response.status.is_success() {
            return Ok(response);
        }
        let status = response.status;
        let body = response.collect().await.unwrap_or_default();
        log::warn!("Drive API request failed: status={status} id={}", item.id);
        Err(classify_failure(
            status,
            &String::from_utf8_lossy(&body),
            &item.id,
        ))
    }

    fn progress(item: &RemoteItem, response: &HttpStream) -> ConsoleProgressReporter {
        let total = response
            .content_length
            .or(Some(item.size))
            .filter(|size| *size > 0);
        ConsoleProgressReporter::new(
            format!("Download {}", item.name),
            total,
            PROGRESS_STEP_BYTES,
        )
    }

    async fn write_stream(
        item: &RemoteItem,
        mut response: HttpStream,
        file: &mut fs::File,
    ) -> Result<u64> {
        let mut reporter = Self::progress(item, &response);
        let mut written = 0u64;
        while let Some(chunk) = response.body.try_next().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            reporter.maybe_report(written);
        }
        file.flush().await?;
        reporter.finish(written);
        Ok(written)
    }
}

impl DriveApi for GoogleDrive {
    async fn get_item(&self, id: &str) -> Result<RemoteItem> {
        log::debug!("get_item id={id}");
        let request = self
            .request(Method::GET, format!("{}/files/{id}", self.api_base))
            .query("fields", FILE_FIELDS);
        let file: DriveFile = self.send(request, id).await?.json()?;
        Ok(file.into())
    }

    async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteItem>> {
        let query = format!("'{}' in parents and trashed = false", escape_query(folder_id));
        self.list_query(&query, folder_id).await
    }

    async fn find_child(
        &self,
        folder_id: &str,
        name: &str,
        kind: ItemKind,
    ) -> Result<Option<RemoteItem>> {
        let query = child_query(folder_id, name, kind);
        let items = self.list_query(&query, folder_id).await?;
        Ok(items.into_iter().find(|item| item.name == name))
    }

    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<RemoteItem> {
        log::debug!("create_folder parent_id={parent_id} name={name}");
        let metadata = FileMetadata {
            name: Some(name),
            mime_type: Some(FOLDER_MIME_TYPE),
            parents: vec![parent_id],
        };
        let request = self
            .request(Method::POST, format!("{}/files", self.api_base))
            .query("fields", FILE_FIELDS)
            .json(&metadata)?;
        let file: DriveFile = self.send(request, parent_id).await?.json()?;
        Ok(file.into())
    }

    async fn create_file(
        &self,
        folder_id: &str,
        name: &str,
        mime_type: &str,
        content: Bytes,
    ) -> Result<RemoteItem> {
        log::debug!(
            "create_file folder_id={folder_id} name={name} size={}",
            content.len()
        );
        let metadata = FileMetadata {
            name: Some(name),
            mime_type: None,
            parents: vec![folder_id],
        };
        let session = self
            .start_upload_session(
                Method::POST,
                format!("{}/files", self.upload_base),
                &metadata,
                mime_type,
                content.len(),
                folder_id,
            )
            .await?;
        self.finish_upload(session, mime_type, content, folder_id)
            .await
    }

    async fn update_file(&self, id: &str, mime_type: &str, content: Bytes) -> Result<RemoteItem> {
        log::debug!("update_file id={id} size={}", content.len());
        // Only the content changes; parents and name stay as they are.
        let metadata = FileMetadata {
            name: None,
            mime_type: None,
            parents: vec![],
        };
        let session = self
            .start_upload_session(
                Method::PATCH,
                format!("{}/files/{id}", self.upload_base),
                &metadata,
                mime_type,
                content.len(),
                id,
            )
            .await?;
        self.finish_upload(session, mime_type, content, id).await
    }

    async fn download(&self, item: &RemoteItem) -> Result<Bytes> {
        let mut response = self.open_content(item).await?;
        let mut reporter = Self::progress(item, &response);

        let mut buffer = BytesMut::with_capacity(item.size as usize);
        while let Some(chunk) = response.body.try_next().await? {
            buffer.extend_from_slice(&chunk);
            reporter.maybe_report(buffer.len() as u64);
        }
        reporter.finish(buffer.len() as u64);

        Ok(buffer.freeze())
    }

    async fn download_to(&self, item: &RemoteItem, path: &Path) -> Result<u64> {
        let response = self.open_content(item).await?;
        let mut file = fs::File::create(path).await?;
        match Self::write_stream(item, response, &mut file).await {
            Ok(written) => Ok(written),
            Err(e) => {
                drop(file);
                // No truncated file is left behind.
                let _ = fs::remove_file(path).await;
                Err(e)
            }
        }
    }
}

/// Map a failed status code and body to the error taxonomy used by callers.
pub fn classify_failure(status: StatusCode, body: &str, id: &str) -> Error {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    let rate_limited = message.to_lowercase().contains("rate limit");

    match status {
        StatusCode::NOT_FOUND => Error::NotFound { id: id.to_string() },
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited { message },
        StatusCode::FORBIDDEN if rate_limited => Error::RateLimited { message },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::PermissionDenied {
            status: status.as_u16(),
            message,
        },
        _ => Error::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Escape a value for use inside a single-quoted Drive query literal.
pub fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn child_query(folder_id: &str, name: &str, kind: ItemKind) -> String {
    let mime_op = match kind {
        ItemKind::Folder => "=",
        ItemKind::File => "!=",
    };
    format!(
        "'{}' in parents and name = '{}' and mimeType {mime_op} '{FOLDER_MIME_TYPE}' and trashed = false",
        escape_query(folder_id),
        escape_query(name),
    )
}
