//! Google Drive API wire types
//!
//! Data structures for (de)serializing Google Drive API v3 requests and responses.

use serde::{Deserialize, Serialize};

use crate::drive::api::RemoteItem;

/// Google Drive API file resource, restricted to the fields we request.
///
/// See: https://developers.google.com/drive/api/v3/reference/files#resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,

    pub name: String,

    pub mime_type: String,

    /// Size in bytes as a decimal string (omitted for folders and native documents)
    #[serde(default)]
    pub size: Option<String>,

    #[serde(default)]
    pub parents: Vec<String>,
}

impl From<DriveFile> for RemoteItem {
    fn from(file: DriveFile) -> Self {
        RemoteItem {
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            size: file.size.and_then(|s| s.parse().ok()).unwrap_or(0),
            parents: file.parents,
        }
    }
}

/// Google Drive API files.list response
///
/// See: https://developers.google.com/drive/api/v3/reference/files/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListResponse {
    #[serde(default)]
    pub files: Vec<DriveFile>,

    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Request body for files.create / files.update metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<&'a str>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<&'a str>,
}

/// Error envelope returned by Google APIs.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}
