mod common;

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use jxt_core::store::Origin;
use jxt_core::{Catalog, ErrorKind, InstallationSource, InstallationStore};
use mockito::Server;

const ARCHIVE: &str = "/openjdk-22-jextract+5-33_linux-x64_bin.tar.gz";

fn store(cache: &std::path::Path, catalog: &str) -> Arc<InstallationStore> {
    Arc::new(
        InstallationStore::new(cache, Catalog::parse(catalog))
            .unwrap()
            .with_platform(common::linux_x64()),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_installs_download_once() {
    let body = common::distribution_tar_gz(22);
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", ARCHIVE)
        .with_status(200)
        .with_body(body.clone())
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let catalog = common::catalog_for(&format!("{}{ARCHIVE}", server.url()), &common::sha256(&body));
    let store = store(dir.path(), &catalog);

    let mut handles = Vec::new();
    for runtime_version in [22, 22, 23, 24, 22, 25, 22, 30] {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .install(&InstallationSource::Remote { runtime_version })
                .await
        }));
    }

    let mut installations = Vec::new();
    for handle in handles {
        installations.push(handle.await.unwrap().unwrap());
    }

    let first = &installations[0];
    for other in &installations[1..] {
        assert!(Arc::ptr_eq(first, other));
    }

    assert_eq!(first.version, 22);
    assert_eq!(first.root, dir.path().join("installation/22"));
    assert_eq!(
        first.executable,
        dir.path().join("installation/22/jextract-22/bin/jextract")
    );
    assert!(first.executable.is_file());
    match &first.origin {
        Origin::Downloaded { archive, .. } => {
            assert_eq!(archive, &dir.path().join(format!("downloads{ARCHIVE}")));
            assert!(archive.is_file());
        }
        Origin::Local => panic!("expected a downloaded installation"),
    }

    mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn integrity_failure_is_shared_and_leaves_no_archive() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", ARCHIVE)
        .with_status(200)
        .with_body(common::distribution_tar_gz(22))
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let catalog = common::catalog_for(&format!("{}{ARCHIVE}", server.url()), &"0".repeat(64));
    let store = store(dir.path(), &catalog);

    let source = InstallationSource::Remote { runtime_version: 22 };
    let (a, b) = tokio::join!(store.install(&source), store.install(&source));
    let (a, b) = (a.unwrap_err(), b.unwrap_err());

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.kind(), ErrorKind::IntegrityFailed);
    assert!(a.to_string().contains(ARCHIVE));
    assert!(!dir.path().join(format!("downloads{ARCHIVE}")).exists());
    assert!(!dir.path().join("installation/22").exists());

    // Not retried within the same store.
    assert_eq!(store.install(&source).await.unwrap_err().kind(), ErrorKind::IntegrityFailed);
    mock.assert_async().await;
}

#[tokio::test]
async fn missing_distribution_is_a_download_failure() {
    let mut server = Server::new_async().await;
    let _mock = server.mock("GET", ARCHIVE).with_status(404).create_async().await;

    let dir = tempfile::tempdir().unwrap();
    let catalog = common::catalog_for(&format!("{}{ARCHIVE}", server.url()), &"0".repeat(64));
    let store = store(dir.path(), &catalog);

    let err = store
        .install(&InstallationSource::Remote { runtime_version: 22 })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DownloadFailed);
}

#[tokio::test]
async fn reinstall_reuses_verified_archive() {
    let body = common::distribution_tar_gz(22);
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", ARCHIVE)
        .with_status(200)
        .with_body(body.clone())
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let catalog = common::catalog_for(&format!("{}{ARCHIVE}", server.url()), &common::sha256(&body));
    let source = InstallationSource::Remote { runtime_version: 22 };

    // A second store over the same cache finds the archive already verified.
    let first = store(dir.path(), &catalog).install(&source).await.unwrap();
    std::fs::write(first.root.join("stale"), "left over").unwrap();

    let second = store(dir.path(), &catalog).install(&source).await.unwrap();
    assert_eq!(first.executable, second.executable);
    assert!(!second.root.join("stale").exists());
    mock.assert_async().await;
}

#[tokio::test]
async fn uninstall_forgets_installation() {
    let body = common::distribution_tar_gz(22);
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", ARCHIVE)
        .with_status(200)
        .with_body(body.clone())
        .expect(2)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let catalog = common::catalog_for(&format!("{}{ARCHIVE}", server.url()), &common::sha256(&body));
    let store = store(dir.path(), &catalog);
    let source = InstallationSource::Remote { runtime_version: 22 };

    let before = store.install(&source).await.unwrap();
    assert!(store.uninstall(22).await.unwrap());
    assert!(!before.root.exists());

    let after = store.install(&source).await.unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert!(after.executable.is_file());

    assert_eq!(store.clean().await.unwrap(), 1);
    assert!(!after.root.exists());
    mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn uninstall_waits_for_running_install() {
    let body = common::distribution_tar_gz(22);
    let checksum = common::sha256(&body);
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut server = Server::new_async().await;
    let mock = {
        let (in_flight, peak) = (Arc::clone(&in_flight), Arc::clone(&peak));
        server
            .mock("GET", ARCHIVE)
            .with_status(200)
            .with_chunked_body(move |w| {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                let (head, tail) = body.split_at(body.len() / 2);
                w.write_all(head)?;
                w.flush()?;
                std::thread::sleep(Duration::from_millis(300));
                let written = w.write_all(tail);
                in_flight.fetch_sub(1, Ordering::SeqCst);
                written
            })
            .expect(2)
            .create_async()
            .await
    };

    let dir = tempfile::tempdir().unwrap();
    let catalog = common::catalog_for(&format!("{}{ARCHIVE}", server.url()), &checksum);
    let store = store(dir.path(), &catalog);
    let source = InstallationSource::Remote { runtime_version: 22 };

    let first = {
        let (store, source) = (Arc::clone(&store), source.clone());
        tokio::spawn(async move { store.install(&source).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(store.uninstall(22).await.unwrap());
    let first = first.await.unwrap().unwrap();
    assert!(!first.root.exists());
    assert!(!dir.path().join(format!("downloads{ARCHIVE}")).exists());

    let second = store.install(&source).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(second.executable.is_file());
    assert_eq!(peak.load(Ordering::SeqCst), 1);
    mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn extraction_failure_is_shared_and_leaves_no_installation() {
    let body = common::distribution_tar_gz(22);
    let truncated = body[..body.len() / 2].to_vec();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", ARCHIVE)
        .with_status(200)
        .with_body(truncated.clone())
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let catalog = common::catalog_for(&format!("{}{ARCHIVE}", server.url()), &common::sha256(&truncated));
    let store = store(dir.path(), &catalog);

    let source = InstallationSource::Remote { runtime_version: 22 };
    let (a, b) = tokio::join!(store.install(&source), store.install(&source));
    let (a, b) = (a.unwrap_err(), b.unwrap_err());

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.kind(), ErrorKind::ExtractionFailed);
    assert!(!dir.path().join("installation/22").exists());
    assert!(jxt_core::locate::locate(&dir.path().join("installation/22"), common::linux_x64()).is_err());
    mock.assert_async().await;
}
