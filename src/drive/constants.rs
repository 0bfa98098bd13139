// Drive API endpoints
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
pub const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

// Maximum results per files.list page
pub const LIST_PAGE_SIZE: u32 = 1000;

// Fields requested for every file resource
pub const FILE_FIELDS: &str = "id,name,mimeType,size,parents";

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
pub const GOOGLE_APPS_MIME_PREFIX: &str = "application/vnd.google-apps.";

// Identifier of the drive root folder, accepted by both backends
pub const ROOT_FOLDER_ID: &str = "root";

// Progress related constants
// Bytes between two download progress lines
pub const PROGRESS_STEP_BYTES: u64 = 4 * 1024 * 1024;

// Local backend default
pub const DEFAULT_LOCAL_ROOT: &str = "./drive";
