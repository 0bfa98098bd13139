use assert_cmd::prelude::*;
use drivectl::drive::api::{DriveApi, RemoteItem};
use drivectl::drive::constants::ROOT_FOLDER_ID;
use drivectl::drive::local::LocalDrive;
use drivectl::drive::utils::space::SpaceMeter;
use drivectl::drive::{DriveClient, DriveConfig};
use drivectl::error::Result;
use libtest_mimic::{Failed, Trial};
use rand::Rng;
use rand::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;
use uuid::Uuid;

pub static TEST_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
});

/// Local drive root shared by all behavior tests of one run.
#[derive(Clone)]
pub struct TestDrive {
    pub root: PathBuf,
    pub drive: LocalDrive,
}

impl TestDrive {
    pub fn config(&self) -> DriveConfig {
        DriveConfig::local(self.root.to_string_lossy().to_string())
    }

    pub async fn client(&self) -> Result<DriveClient> {
        DriveClient::new(self.config()).await
    }

    pub async fn client_with_meter(&self, meter: impl SpaceMeter + 'static) -> Result<DriveClient> {
        Ok(self.client().await?.with_meter(Box::new(meter)))
    }

    /// Absolute path on disk of a remote item id.
    pub fn path_of(&self, id: &str) -> PathBuf {
        self.root.join(id.trim_end_matches('/'))
    }
}

pub fn init_test_service() -> Result<TestDrive> {
    let root = TEST_FIXTURE.new_local_dir();
    let drive = LocalDrive::new(&root.to_string_lossy())?;
    Ok(TestDrive { root, drive })
}

/// Reports fixed free space and memory.
pub struct FixedMeter(pub u64);

impl SpaceMeter for FixedMeter {
    fn available_disk(&self, _path: &Path) -> Option<u64> {
        Some(self.0)
    }

    fn available_memory(&self) -> u64 {
        self.0
    }
}

/// Create a drivectl Command with clean environment pointed at the test drive
pub fn drivectl_cmd(env: &TestDrive) -> Command {
    let mut cmd = Command::cargo_bin("drivectl").unwrap();
    cmd.env_clear()
        .env("RUST_LOG", "info")
        .env("DRIVE_PROVIDER", "local")
        .env("DRIVE_LOCAL_ROOT", &env.root);
    cmd
}

pub struct Fixture {
    pub paths: std::sync::Mutex<Vec<PathBuf>>,
}

impl Fixture {
    pub const fn new() -> Self {
        Self {
            paths: std::sync::Mutex::new(vec![]),
        }
    }

    /// Fresh, not yet existing directory under the system temp dir.
    pub fn new_local_dir(&self) -> PathBuf {
        let path = std::env::temp_dir().join(format!("drivectl-behavior-{}", Uuid::new_v4()));
        self.paths.lock().unwrap().push(path.clone());
        path
    }

    /// Folder with a unique name directly under the drive root.
    pub async fn new_remote_folder(&self, env: &TestDrive) -> Result<RemoteItem> {
        env.drive
            .create_folder(ROOT_FOLDER_ID, &Uuid::new_v4().to_string())
            .await
    }

    pub fn new_content(&self, range: std::ops::Range<usize>) -> Vec<u8> {
        let mut rng = rand::rng();
        let size = rng.random_range(range);
        let mut content = vec![0; size];
        rng.fill_bytes(&mut content);
        content
    }

    pub fn cleanup(&self) {
        let paths: Vec<_> = std::mem::take(self.paths.lock().unwrap().as_mut());
        for path in paths {
            let _ = std::fs::remove_dir_all(path);
        }
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_async_trial<F, Fut>(name: &str, env: &TestDrive, f: F) -> Trial
where
    F: FnOnce(TestDrive) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Result<()>>,
{
    let handle = TEST_RUNTIME.handle().clone();
    let env = env.clone();

    Trial::test(format!("behavior::{name}"), move || {
        handle
            .block_on(f(env))
            .map_err(|err| Failed::from(err.to_string()))
    })
}

#[macro_export]
macro_rules! async_trials {
    ($env:ident, $($test:ident),*) => {
        vec![$(build_async_trial(stringify!($test), $env, $test),)*]
    };
}

pub static TEST_FIXTURE: Fixture = Fixture::new();
