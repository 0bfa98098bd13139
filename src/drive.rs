use crate::auth::CredentialProvider;
use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

pub mod api;
pub mod constants;
pub mod google;
pub mod http;
#[cfg(feature = "local")]
pub mod local;
pub mod operations;
pub mod types;
pub mod utils;

use self::api::{DriveApi, ItemKind, RemoteItem};
use self::google::GoogleDrive;
use self::http::ReqwestHttpClient;
#[cfg(feature = "local")]
use self::local::LocalDrive;
use self::operations::download::DriveDownloader;
use self::operations::mkdir::DriveFolderCreator;
use self::operations::upload::DriveUploader;
use self::operations::{Downloader, FolderCreator, TransferOptions, TransferReport, Uploader};
use self::utils::space::{SpaceMeter, SystemMeter};
use crate::wrap_err;

/// Drive provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveProvider {
    Google,
    Local,
}

impl FromStr for DriveProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" | "gdrive" => Ok(Self::Google),
            "local" | "fs" => Ok(Self::Local),
            _ => Err(Error::UnsupportedProvider {
                provider: s.to_string(),
            }),
        }
    }
}

/// Drive configuration for the supported providers
#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub provider: DriveProvider,
    pub client_secrets: PathBuf,
    pub token_file: PathBuf,
    /// Pre-issued access token; skips the token file and the OAuth flow.
    pub access_token: Option<String>,
    pub api_endpoint: Option<String>,
    pub upload_endpoint: Option<String>,
    pub local_root: Option<String>,
}

impl DriveConfig {
    pub fn google(client_secrets: PathBuf, token_file: PathBuf) -> Self {
        Self {
            provider: DriveProvider::Google,
            client_secrets,
            token_file,
            access_token: None,
            api_endpoint: None,
            upload_endpoint: None,
            local_root: None,
        }
    }

    pub fn local(root: String) -> Self {
        Self {
            provider: DriveProvider::Local,
            client_secrets: PathBuf::new(),
            token_file: PathBuf::new(),
            access_token: None,
            api_endpoint: None,
            upload_endpoint: None,
            local_root: Some(root),
        }
    }
}

/// Backend selected at startup.
#[derive(Clone)]
pub enum Backend {
    Google(GoogleDrive),
    #[cfg(feature = "local")]
    Local(LocalDrive),
}

impl DriveApi for Backend {
    async fn get_item(&self, id: &str) -> Result<RemoteItem> {
        match self {
            Backend::Google(drive) => drive.get_item(id).await,
            #[cfg(feature = "local")]
            Backend::Local(drive) => drive.get_item(id).await,
        }
    }

    async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteItem>> {
        match self {
            Backend::Google(drive) => drive.list_children(folder_id).await,
            #[cfg(feature = "local")]
            Backend::Local(drive) => drive.list_children(folder_id).await,
        }
    }

    async fn find_child(
        &self,
        folder_id: &str,
        name: &str,
        kind: ItemKind,
    ) -> Result<Option<RemoteItem>> {
        match self {
            Backend::Google(drive) => drive.find_child(folder_id, name, kind).await,
            #[cfg(feature = "local")]
            Backend::Local(drive) => drive.find_child(folder_id, name, kind).await,
        }
    }

    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<RemoteItem> {
        match self {
            Backend::Google(drive) => drive.create_folder(parent_id, name).await,
            #[cfg(feature = "local")]
            Backend::Local(drive) => drive.create_folder(parent_id, name).await,
        }
    }

    async fn create_file(
        &self,
        folder_id: &str,
        name: &str,
        mime_type: &str,
        content: Bytes,
    ) -> Result<RemoteItem> {
        match self {
            Backend::Google(drive) => drive.create_file(folder_id, name, mime_type, content).await,
            #[cfg(feature = "local")]
            Backend::Local(drive) => drive.create_file(folder_id, name, mime_type, content).await,
        }
    }

    async fn update_file(&self, id: &str, mime_type: &str, content: Bytes) -> Result<RemoteItem> {
        match self {
            Backend::Google(drive) => drive.update_file(id, mime_type, content).await,
            #[cfg(feature = "local")]
            Backend::Local(drive) => drive.update_file(id, mime_type, content).await,
        }
    }

    async fn download(&self, item: &RemoteItem) -> Result<Bytes> {
        match self {
            Backend::Google(drive) => drive.download(item).await,
            #[cfg(feature = "local")]
            Backend::Local(drive) => drive.download(item).await,
        }
    }

    async fn download_to(&self, item: &RemoteItem, path: &Path) -> Result<u64> {
        match self {
            Backend::Google(drive) => drive.download_to(item, path).await,
            #[cfg(feature = "local")]
            Backend::Local(drive) => drive.download_to(item, path).await,
        }
    }
}

/// Drive client used by the command line
pub struct DriveClient {
    provider: DriveProvider,
    backend: Backend,
    meter: Box<dyn SpaceMeter>,
}

impl DriveClient {
    pub async fn new(config: DriveConfig) -> Result<Self> {
        let backend = Self::build_backend(&config).await?;
        Ok(Self {
            provider: config.provider,
            backend,
            meter: Box::new(SystemMeter),
        })
    }

    /// Replace the source of free disk and memory figures.
    pub fn with_meter(mut self, meter: Box<dyn SpaceMeter>) -> Self {
        self.meter = meter;
        self
    }

    async fn build_backend(config: &DriveConfig) -> Result<Backend> {
        match config.provider {
            DriveProvider::Google => {
                let http = Client::builder()
                    .user_agent(concat!("drivectl/", env!("CARGO_PKG_VERSION")))
                    .build()?;
                let access_token = match &config.access_token {
                    Some(token) => token.clone(),
                    None => {
                        let provider = CredentialProvider::new(
                            config.client_secrets.clone(),
                            config.token_file.clone(),
                        );
                        wrap_err!(provider.access_token().await, CredentialsFailed {})?
                    }
                };

                let api_base = config
                    .api_endpoint
                    .clone()
                    .unwrap_or_else(|| constants::DRIVE_API_BASE.to_string());
                let upload_base = config
                    .upload_endpoint
                    .clone()
                    .unwrap_or_else(|| constants::DRIVE_UPLOAD_BASE.to_string());
                let drive = GoogleDrive::with_endpoints(
                    Arc::new(ReqwestHttpClient::new(http)),
                    access_token,
                    api_base,
                    upload_base,
                );
                Ok(Backend::Google(drive))
            }
            DriveProvider::Local => {
                #[cfg(feature = "local")]
                {
                    let root = config
                        .local_root
                        .as_deref()
                        .unwrap_or(constants::DEFAULT_LOCAL_ROOT);
                    Ok(Backend::Local(LocalDrive::new(root)?))
                }

                #[cfg(not(feature = "local"))]
                {
                    Err(Error::UnsupportedProvider {
                        provider: "local (feature disabled)".to_string(),
                    })
                }
            }
        }
    }

    pub async fn download(
        &self,
        item_id: &str,
        local_path: &Path,
        options: &TransferOptions,
    ) -> Result<TransferReport> {
        log::debug!(
            "download provider={:?} item_id={} local_path={} options={:?}",
            self.provider,
            item_id,
            local_path.display(),
            options
        );
        let downloader = DriveDownloader::new(&self.backend, self.meter.as_ref());
        wrap_err!(
            downloader.download(item_id, local_path, options).await,
            DownloadFailed {
                item_id: item_id.to_string(),
                local_path: local_path.display().to_string()
            }
        )
    }

    pub async fn upload(
        &self,
        folder_id: &str,
        local_path: &Path,
        create_folder: bool,
        options: &TransferOptions,
    ) -> Result<TransferReport> {
        log::debug!(
            "upload provider={:?} folder_id={} local_path={} create_folder={} options={:?}",
            self.provider,
            folder_id,
            local_path.display(),
            create_folder,
            options
        );
        let uploader = DriveUploader::new(&self.backend);
        wrap_err!(
            uploader
                .upload(folder_id, local_path, create_folder, options)
                .await,
            UploadFailed {
                local_path: local_path.display().to_string(),
                folder_id: folder_id.to_string()
            }
        )
    }

    pub async fn create_folder(&self, name: &str, parent_id: &str) -> Result<RemoteItem> {
        log::debug!(
            "create_folder provider={:?} name={} parent_id={}",
            self.provider,
            name,
            parent_id
        );
        let creator = DriveFolderCreator::new(&self.backend);
        wrap_err!(
            creator.create_folder(name, parent_id).await,
            CreateFolderFailed {
                name: name.to_string(),
                parent_id: parent_id.to_string()
            }
        )
    }
}
