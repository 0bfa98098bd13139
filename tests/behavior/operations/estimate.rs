use crate::*;
use bytes::Bytes;
use drivectl::drive::api::DriveApi;
use drivectl::drive::operations::estimate::{DriveSizeEstimator, SizeEstimator, check_capacity};
use drivectl::drive::operations::{RemoteWalker, TransferOptions};
use drivectl::error::{Error, Result};
use futures::TryStreamExt;

pub fn tests(env: &TestDrive, tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        env,
        test_estimate_matches_accepted_items,
        test_estimate_recursive_with_mime_filter,
        test_capacity_boundary
    ));
}

async fn stage(env: &TestDrive) -> Result<String> {
    let folder = TEST_FIXTURE.new_remote_folder(env).await?;
    env.drive
        .create_file(&folder.id, "a.pdf", "", Bytes::from(vec![0u8; 100]))
        .await?;
    env.drive
        .create_file(&folder.id, "b.txt", "", Bytes::from(vec![0u8; 50]))
        .await?;
    let sub = env.drive.create_folder(&folder.id, "nested").await?;
    env.drive
        .create_file(&sub.id, "c.PDF", "", Bytes::from(vec![0u8; 25]))
        .await?;
    Ok(folder.id)
}

async fn test_estimate_matches_accepted_items(env: TestDrive) -> Result<()> {
    let folder_id = stage(&env).await?;
    let folder = env.drive.get_item(&folder_id).await?;
    let options = TransferOptions::default().with_extensions([".pdf"]);

    let estimate = DriveSizeEstimator::new(&env.drive)
        .estimate(&folder, None, &options)
        .await;
    assert_eq!(estimate.total_bytes, 100);
    assert_eq!(estimate.accepted, 1);
    assert_eq!(estimate.skipped, 1);

    // The walker sees the same items the estimate was built from.
    let entries: Vec<_> = RemoteWalker::new(&env.drive, folder_id.clone(), false)
        .into_stream()
        .try_collect()
        .await?;
    let names: Vec<_> = entries.iter().map(|e| e.item.name.as_str()).collect();
    assert_eq!(names, vec!["a.pdf", "b.txt", "nested"]);
    Ok(())
}

async fn test_estimate_recursive_with_mime_filter(env: TestDrive) -> Result<()> {
    let folder_id = stage(&env).await?;
    let folder = env.drive.get_item(&folder_id).await?;
    let options = TransferOptions {
        recursive: true,
        ..TransferOptions::default()
    }
    .with_mime_types(["application/pdf"]);

    let estimate = DriveSizeEstimator::new(&env.drive)
        .estimate(&folder, None, &options)
        .await;
    assert_eq!(estimate.total_bytes, 125);
    assert_eq!(estimate.accepted, 2);
    Ok(())
}

async fn test_capacity_boundary(env: TestDrive) -> Result<()> {
    let folder_id = stage(&env).await?;
    let folder = env.drive.get_item(&folder_id).await?;
    let local = TEST_FIXTURE.new_local_dir();

    let estimate = DriveSizeEstimator::new(&env.drive)
        .estimate(&folder, Some(local.as_path()), &TransferOptions::default())
        .await;
    assert_eq!(estimate.total_bytes, 150);

    check_capacity(&estimate, Some(local.as_path()), &FixedMeter(150))?;
    assert!(matches!(
        check_capacity(&estimate, Some(local.as_path()), &FixedMeter(149)),
        Err(Error::InsufficientSpace { .. })
    ));
    assert!(matches!(
        check_capacity(&estimate, None, &FixedMeter(149)),
        Err(Error::InsufficientMemory { .. })
    ));
    Ok(())
}
