use crate::*;
use assert_cmd::prelude::*;
use drivectl::drive::api::{DriveApi, ItemKind};
use drivectl::error::{Error, Result};
use predicates::prelude::*;

pub fn tests(env: &TestDrive, tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        env,
        test_create_folder,
        test_create_existing_folder_fails
    ));

    tests.extend(async_trials!(env, e2e_test_mkdir_prints_folder_id));
}

async fn test_create_folder(env: TestDrive) -> Result<()> {
    let parent = TEST_FIXTURE.new_remote_folder(&env).await?;
    let client = env.client().await?;

    let folder = client.create_folder("Reports", &parent.id).await?;
    assert!(folder.is_folder());
    assert_eq!(folder.parents, vec![parent.id.clone()]);

    let found = env
        .drive
        .find_child(&parent.id, "Reports", ItemKind::Folder)
        .await?;
    assert_eq!(found.map(|f| f.id), Some(folder.id));
    Ok(())
}

async fn test_create_existing_folder_fails(env: TestDrive) -> Result<()> {
    let parent = TEST_FIXTURE.new_remote_folder(&env).await?;
    let client = env.client().await?;
    client.create_folder("Archive", &parent.id).await?;

    match client.create_folder("Archive", &parent.id).await {
        Err(Error::CreateFolderFailed { source, .. }) => {
            assert!(matches!(*source, Error::FolderAlreadyExists { .. }));
        }
        other => panic!("expected folder already exists, got {other:?}"),
    }
    Ok(())
}

async fn e2e_test_mkdir_prints_folder_id(env: TestDrive) -> Result<()> {
    let parent = TEST_FIXTURE.new_remote_folder(&env).await?;

    drivectl_cmd(&env)
        .arg("mkdir")
        .arg("My New Folder")
        .arg(&parent.id)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Folder ID: \"{}My New Folder/\"",
            parent.id
        )));

    assert!(env.path_of(&parent.id).join("My New Folder").is_dir());

    drivectl_cmd(&env)
        .arg("mkdir")
        .arg("My New Folder")
        .arg(&parent.id)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    Ok(())
}
