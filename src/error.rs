use snafu::Snafu;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Unsupported drive provider: {provider}"))]
    UnsupportedProvider { provider: String },

    #[snafu(display("Path does not exist: {}", path.display()))]
    PathNotFound { path: PathBuf },

    #[snafu(display("Client secrets file not found: {}", path.display()))]
    ClientSecretsMissing { path: PathBuf },

    #[snafu(display("Invalid client secrets file {}: {source}", path.display()))]
    InvalidClientSecrets {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to set up the OAuth authenticator: {source}"))]
    Authenticator { source: std::io::Error },

    #[snafu(display("Authorization failed: {source}"))]
    OAuth { source: yup_oauth2::Error },

    #[snafu(display("Authorization server returned no access token"))]
    EmptyToken,

    #[snafu(display("Item not found: {id}"))]
    NotFound { id: String },

    #[snafu(display("Permission denied (status {status}): {message}"))]
    PermissionDenied { status: u16, message: String },

    #[snafu(display("Rate limit exceeded: {message}"))]
    RateLimited { message: String },

    #[snafu(display("Drive API error (status {status}): {message}"))]
    Api { status: u16, message: String },

    #[snafu(display("Upload session response did not include a Location header"))]
    MissingUploadSession,

    #[snafu(display("Item '{id}' is not a folder"))]
    NotAFolder { id: String },

    #[snafu(display("Cannot download '{name}': Google type {mime_type} has no export format"))]
    UnsupportedExport { name: String, mime_type: String },

    #[snafu(display("Invalid item name: '{name}'"))]
    InvalidName { name: String },

    #[snafu(display("A folder named '{name}' already exists in folder {parent_id}"))]
    FolderAlreadyExists { name: String, parent_id: String },

    #[snafu(display(
        "The folder '{name}' does not exist in folder {parent_id}; use --create-folder to create it"
    ))]
    FolderNotFound { name: String, parent_id: String },

    #[snafu(display(
        "A file named '{name}' already exists in folder {folder_id}; use --overwrite to overwrite it"
    ))]
    FileAlreadyExists { name: String, folder_id: String },

    #[snafu(display(
        "Not enough free disk space at {}: {required} bytes required, {available} bytes available",
        path.display()
    ))]
    InsufficientSpace {
        path: PathBuf,
        required: u64,
        available: u64,
    },

    #[snafu(display(
        "Not enough available memory to hold results: {required} bytes required, {available} bytes available"
    ))]
    InsufficientMemory { required: u64, available: u64 },

    #[snafu(display("Partial transfer failure: {} item(s) failed: {}", failed.len(), failed.join(", ")))]
    PartialTransfer { failed: Vec<String> },

    #[snafu(display("Failed to download '{item_id}' to '{local_path}': {source}"))]
    DownloadFailed {
        item_id: String,
        local_path: String,
        source: Box<Error>,
    },

    #[snafu(display("Failed to upload '{local_path}' to folder '{folder_id}': {source}"))]
    UploadFailed {
        local_path: String,
        folder_id: String,
        source: Box<Error>,
    },

    #[snafu(display("Failed to create folder '{name}' in '{parent_id}': {source}"))]
    CreateFolderFailed {
        name: String,
        parent_id: String,
        source: Box<Error>,
    },

    #[snafu(display("Failed to list folder '{id}': {source}"))]
    ListFolderFailed { id: String, source: Box<Error> },

    #[snafu(display("Failed to obtain credentials: {source}"))]
    CredentialsFailed { source: Box<Error> },

    #[snafu(display("HTTP error: {source}"))]
    Http { source: reqwest::Error },

    #[snafu(display("JSON error: {source}"))]
    Json { source: serde_json::Error },

    #[snafu(display("OpenDAL error: {source}"))]
    OpenDal { source: opendal::Error },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },
}

impl From<opendal::Error> for Error {
    fn from(error: opendal::Error) -> Self {
        Error::OpenDal { source: error }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io { source: error }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Http { source: error }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json { source: error }
    }
}
