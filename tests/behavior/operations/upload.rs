use crate::*;
use assert_cmd::prelude::*;
use bytes::Bytes;
use drivectl::drive::api::DriveApi;
use drivectl::drive::operations::TransferOptions;
use drivectl::error::{Error, Result};
use predicates::prelude::*;
use tokio::fs;

pub fn tests(env: &TestDrive, tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        env,
        test_upload_rejects_existing_file,
        test_upload_overwrite_replaces_content,
        test_upload_round_trip
    ));

    tests.extend(async_trials!(
        env,
        e2e_test_upload_command_succeeds,
        e2e_test_upload_directory_with_create_folder
    ));

    #[cfg(unix)]
    tests.extend(async_trials!(env, e2e_test_upload_skips_symlinked_directory));
}

/// Local directory `photos` with two files and a nested directory.
async fn stage_local_dir() -> Result<(std::path::PathBuf, Vec<u8>, Vec<u8>)> {
    let dir = TEST_FIXTURE.new_local_dir().join("photos");
    fs::create_dir_all(dir.join("raw")).await?;
    let top = TEST_FIXTURE.new_content(1..8192);
    let nested = TEST_FIXTURE.new_content(1..8192);
    fs::write(dir.join("a.jpg"), &top).await?;
    fs::write(dir.join("notes.txt"), b"notes").await?;
    fs::write(dir.join("raw").join("b.jpg"), &nested).await?;
    Ok((dir, top, nested))
}

async fn test_upload_rejects_existing_file(env: TestDrive) -> Result<()> {
    let folder = TEST_FIXTURE.new_remote_folder(&env).await?;
    env.drive
        .create_file(&folder.id, "report.pdf", "application/pdf", Bytes::from_static(b"v1"))
        .await?;

    let src = TEST_FIXTURE.new_local_dir();
    fs::create_dir_all(&src).await?;
    let report_pdf = src.join("report.pdf");
    fs::write(&report_pdf, b"v2").await?;

    let client = env.client().await?;
    let result = client
        .upload(&folder.id, &report_pdf, false, &TransferOptions::default())
        .await;
    match result {
        Err(Error::UploadFailed { source, .. }) => {
            assert!(matches!(*source, Error::FileAlreadyExists { .. }));
        }
        other => panic!("expected file already exists, got {other:?}"),
    }

    let remote = env.drive.get_item(&format!("{}report.pdf", folder.id)).await?;
    assert_eq!(env.drive.download(&remote).await?, Bytes::from_static(b"v1"));
    Ok(())
}

async fn test_upload_overwrite_replaces_content(env: TestDrive) -> Result<()> {
    let folder = TEST_FIXTURE.new_remote_folder(&env).await?;
    let original = env
        .drive
        .create_file(&folder.id, "report.pdf", "application/pdf", Bytes::from_static(b"v1"))
        .await?;

    let src = TEST_FIXTURE.new_local_dir();
    fs::create_dir_all(&src).await?;
    let report_pdf = src.join("report.pdf");
    fs::write(&report_pdf, b"version two").await?;

    let client = env.client().await?;
    let options = TransferOptions {
        overwrite: true,
        ..TransferOptions::default()
    };
    let report = client.upload(&folder.id, &report_pdf, false, &options).await?;

    assert_eq!(report.transferred.len(), 1);
    assert_eq!(report.transferred[0].id, original.id);
    assert_eq!(report.transferred[0].size, 11);
    assert_eq!(
        env.drive.download(&original).await?,
        Bytes::from_static(b"version two")
    );
    Ok(())
}

async fn test_upload_round_trip(env: TestDrive) -> Result<()> {
    let parent = TEST_FIXTURE.new_remote_folder(&env).await?;
    let (src, top, nested) = stage_local_dir().await?;
    let client = env.client().await?;

    let options = TransferOptions {
        recursive: true,
        ..TransferOptions::default()
    };
    let uploaded = client.upload(&parent.id, &src, true, &options).await?;
    assert_eq!(uploaded.transferred.len(), 3);

    let back = TEST_FIXTURE.new_local_dir();
    let folder_id = format!("{}photos/", parent.id);
    let downloaded = client.download(&folder_id, &back, &options).await?;
    assert_eq!(downloaded.transferred.len(), 3);

    assert_eq!(fs::read(back.join("a.jpg")).await?, top);
    assert_eq!(fs::read(back.join("notes.txt")).await?, b"notes");
    assert_eq!(fs::read(back.join("raw").join("b.jpg")).await?, nested);
    Ok(())
}

async fn e2e_test_upload_command_succeeds(env: TestDrive) -> Result<()> {
    let folder = TEST_FIXTURE.new_remote_folder(&env).await?;
    let src = TEST_FIXTURE.new_local_dir();
    fs::create_dir_all(&src).await?;
    let content = TEST_FIXTURE.new_content(1..65536);
    let file = src.join("data.bin");
    fs::write(&file, &content).await?;

    drivectl_cmd(&env)
        .arg("upload")
        .arg(&folder.id)
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Uploading data.bin..."))
        .stdout(predicate::str::contains("Uploaded 1 item(s)"));

    assert_eq!(fs::read(env.path_of(&folder.id).join("data.bin")).await?, content);

    // A second upload without --overwrite is refused
    drivectl_cmd(&env)
        .arg("upload")
        .arg(&folder.id)
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    Ok(())
}

async fn e2e_test_upload_directory_with_create_folder(env: TestDrive) -> Result<()> {
    let parent = TEST_FIXTURE.new_remote_folder(&env).await?;
    let (src, top, _) = stage_local_dir().await?;

    drivectl_cmd(&env)
        .arg("upload")
        .arg(&parent.id)
        .arg(&src)
        .arg("--create-folder")
        .arg("--file-extensions")
        .arg("jpg")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created folder photos"));

    let remote_dir = env.path_of(&parent.id).join("photos");
    assert_eq!(fs::read(remote_dir.join("a.jpg")).await?, top);
    assert!(!remote_dir.join("notes.txt").exists());
    assert!(!remote_dir.join("raw").exists());
    Ok(())
}

#[cfg(unix)]
async fn e2e_test_upload_skips_symlinked_directory(env: TestDrive) -> Result<()> {
    let parent = TEST_FIXTURE.new_remote_folder(&env).await?;
    let (src, top, nested) = stage_local_dir().await?;
    std::os::unix::fs::symlink(&src, src.join("loop"))?;

    drivectl_cmd(&env)
        .arg("upload")
        .arg(&parent.id)
        .arg(&src)
        .arg("--create-folder")
        .arg("-R")
        .assert()
        .success()
        .stdout(predicate::str::contains("Uploaded 3 item(s)"));

    let remote_dir = env.path_of(&parent.id).join("photos");
    assert_eq!(fs::read(remote_dir.join("a.jpg")).await?, top);
    assert_eq!(fs::read(remote_dir.join("raw").join("b.jpg")).await?, nested);
    assert!(!remote_dir.join("loop").exists());
    Ok(())
}
