use crate::*;
use assert_cmd::prelude::*;
use bytes::Bytes;
use drivectl::drive::api::DriveApi;
use drivectl::drive::operations::{SkipReason, TransferOptions};
use drivectl::error::{Error, Result};
use predicates::prelude::*;
use tokio::fs;

pub fn tests(env: &TestDrive, tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        env,
        test_download_filters_by_extension,
        test_download_single_file,
        test_download_recursive_keeps_layout,
        test_download_rejects_existing_files,
        test_download_insufficient_space,
        test_download_non_existent_item
    ));

    tests.extend(async_trials!(
        env,
        e2e_test_download_command_succeeds,
        e2e_test_download_return_object_json,
        e2e_test_download_missing_item_fails
    ));
}

/// Folder holding `a.pdf` (100 bytes), `b.txt` (50 bytes) and `sub/c.pdf`.
struct StagedFolder {
    id: String,
    pdf: Vec<u8>,
    nested: Vec<u8>,
}

async fn stage_folder(env: &TestDrive) -> Result<StagedFolder> {
    let folder = TEST_FIXTURE.new_remote_folder(env).await?;
    let pdf = TEST_FIXTURE.new_content(100..101);
    let nested = TEST_FIXTURE.new_content(1..4096);

    env.drive
        .create_file(&folder.id, "a.pdf", "application/pdf", Bytes::from(pdf.clone()))
        .await?;
    env.drive
        .create_file(&folder.id, "b.txt", "text/plain", Bytes::from(vec![b'x'; 50]))
        .await?;
    let sub = env.drive.create_folder(&folder.id, "sub").await?;
    env.drive
        .create_file(&sub.id, "c.pdf", "application/pdf", Bytes::from(nested.clone()))
        .await?;

    Ok(StagedFolder {
        id: folder.id,
        pdf,
        nested,
    })
}

async fn test_download_filters_by_extension(env: TestDrive) -> Result<()> {
    let staged = stage_folder(&env).await?;
    let local = TEST_FIXTURE.new_local_dir();
    let client = env.client().await?;

    let options = TransferOptions::default().with_extensions([".pdf"]);
    let report = client.download(&staged.id, &local, &options).await?;

    let names: Vec<_> = report.transferred.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["a.pdf"]);
    assert_eq!(report.total_bytes(), 100);
    assert_eq!(fs::read(local.join("a.pdf")).await?, staged.pdf);
    assert!(!local.join("b.txt").exists());
    assert!(!local.join("sub").exists());
    Ok(())
}

async fn test_download_single_file(env: TestDrive) -> Result<()> {
    let staged = stage_folder(&env).await?;
    let local = TEST_FIXTURE.new_local_dir();
    let client = env.client().await?;

    let file_id = format!("{}a.pdf", staged.id);
    let report = client
        .download(&file_id, &local, &TransferOptions::default())
        .await?;

    assert_eq!(report.transferred.len(), 1);
    assert_eq!(report.transferred[0].extension, ".pdf");
    assert_eq!(fs::read(local.join("a.pdf")).await?, staged.pdf);
    Ok(())
}

async fn test_download_recursive_keeps_layout(env: TestDrive) -> Result<()> {
    let staged = stage_folder(&env).await?;
    let local = TEST_FIXTURE.new_local_dir();
    let client = env.client().await?;

    let options = TransferOptions {
        recursive: true,
        ..TransferOptions::default()
    };
    let report = client.download(&staged.id, &local, &options).await?;

    assert_eq!(report.transferred.len(), 3);
    assert!(report.ensure_complete().is_ok());
    assert_eq!(fs::read(local.join("sub").join("c.pdf")).await?, staged.nested);
    Ok(())
}

async fn test_download_rejects_existing_files(env: TestDrive) -> Result<()> {
    let staged = stage_folder(&env).await?;
    let local = TEST_FIXTURE.new_local_dir();
    fs::create_dir_all(&local).await?;
    fs::write(local.join("a.pdf"), b"keep me").await?;
    let client = env.client().await?;

    let report = client
        .download(&staged.id, &local, &TransferOptions::default())
        .await?;
    assert!(
        report
            .skipped
            .iter()
            .any(|s| s.path == "a.pdf" && s.reason == SkipReason::AlreadyExists)
    );
    assert_eq!(fs::read(local.join("a.pdf")).await?, b"keep me");

    let overwrite = TransferOptions {
        overwrite: true,
        ..TransferOptions::default()
    };
    client.download(&staged.id, &local, &overwrite).await?;
    assert_eq!(fs::read(local.join("a.pdf")).await?, staged.pdf);
    Ok(())
}

async fn test_download_insufficient_space(env: TestDrive) -> Result<()> {
    let staged = stage_folder(&env).await?;
    let local = TEST_FIXTURE.new_local_dir();
    let client = env.client_with_meter(FixedMeter(120)).await?;

    // 150 bytes at the top level do not fit into 120
    let result = client
        .download(&staged.id, &local, &TransferOptions::default())
        .await;
    match result {
        Err(Error::DownloadFailed { source, .. }) => {
            assert!(matches!(
                *source,
                Error::InsufficientSpace {
                    required: 150,
                    available: 120,
                    ..
                }
            ));
        }
        other => panic!("expected insufficient space, got {other:?}"),
    }
    assert!(!local.exists());

    // The pdf alone fits
    let options = TransferOptions::default().with_extensions(["pdf"]);
    client.download(&staged.id, &local, &options).await?;
    assert!(local.join("a.pdf").exists());
    Ok(())
}

async fn test_download_non_existent_item(env: TestDrive) -> Result<()> {
    let local = TEST_FIXTURE.new_local_dir();
    let client = env.client().await?;

    let result = client
        .download("no-such-item.bin", &local, &TransferOptions::default())
        .await;
    match result {
        Err(Error::DownloadFailed { source, .. }) => {
            assert!(matches!(*source, Error::NotFound { .. }));
        }
        other => panic!("expected not found, got {other:?}"),
    }
    Ok(())
}

async fn e2e_test_download_command_succeeds(env: TestDrive) -> Result<()> {
    let staged = stage_folder(&env).await?;
    let local = TEST_FIXTURE.new_local_dir();

    drivectl_cmd(&env)
        .arg("download")
        .arg(&staged.id)
        .arg(&local)
        .arg("--recursive")
        .assert()
        .success()
        .stdout(predicate::str::contains("Downloading a.pdf..."))
        .stdout(predicate::str::contains("Time taken:"))
        .stdout(predicate::str::contains("Downloaded 3 item(s)"));

    assert_eq!(fs::read(local.join("a.pdf")).await?, staged.pdf);
    assert_eq!(fs::read(local.join("sub/c.pdf")).await?, staged.nested);
    Ok(())
}

async fn e2e_test_download_return_object_json(env: TestDrive) -> Result<()> {
    let staged = stage_folder(&env).await?;
    let local = TEST_FIXTURE.new_local_dir();

    let output = drivectl_cmd(&env)
        .arg("download")
        .arg(&staged.id)
        .arg(&local)
        .arg("--return-object")
        .arg("--json")
        .arg("--file-extensions")
        .arg("txt")
        .output()
        .expect("run drivectl");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json_start = stdout.find("{\n").expect("json report in stdout");
    let report: serde_json::Value = serde_json::from_str(&stdout[json_start..])?;
    assert_eq!(report["transferred"][0]["name"], "b.txt");
    assert_eq!(report["transferred"][0]["size"], 50);
    assert!(report["transferred"][0].get("content").is_none());
    assert!(!local.exists());
    Ok(())
}

async fn e2e_test_download_missing_item_fails(env: TestDrive) -> Result<()> {
    let local = TEST_FIXTURE.new_local_dir();

    drivectl_cmd(&env)
        .arg("download")
        .arg("missing-folder/")
        .arg(&local)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("missing-folder"));
    Ok(())
}
