//! Integration tests for reaper-janitor
//!
//! These tests run whole passes against an in-memory library, an in-memory
//! download client, and a real directory tree.

use chrono::{Duration, Local};
use reaper_domain::traits::{DownloadClient, LibraryService};
use reaper_domain::{Episode, HistoryEntry, LibraryItem, MediaKind, Section, TorrentHash};
use reaper_janitor::{ErasureOutcome, ExclusionSet, Janitor, JanitorConfig, TorrentVerdict};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct FakeLibrary {
    items: Vec<LibraryItem>,
}

impl LibraryService for FakeLibrary {
    type Error = String;

    fn sections(&self) -> Result<Vec<Section>, Self::Error> {
        Ok(vec![
            Section {
                key: "1".to_string(),
                title: "Movies".to_string(),
                kind: "movie".to_string(),
            },
            Section {
                key: "2".to_string(),
                title: "TV Shows".to_string(),
                kind: "show".to_string(),
            },
        ])
    }

    fn items(&self, section: &Section) -> Result<Vec<LibraryItem>, Self::Error> {
        Ok(self
            .items
            .iter()
            .filter(|item| item.kind.as_str() == section.kind)
            .map(|item| LibraryItem {
                history: Vec::new(),
                ..item.clone()
            })
            .collect())
    }

    fn history(&self, item: &LibraryItem) -> Result<Vec<HistoryEntry>, Self::Error> {
        Ok(self
            .items
            .iter()
            .find(|i| i.key == item.key)
            .map(|i| i.history.clone())
            .unwrap_or_default())
    }
}

/// Download client that forgets torrents once they are erased
struct FakeClient {
    data_dir: PathBuf,
    torrents: RefCell<Vec<(TorrentHash, PathBuf)>>,
    refuse: Vec<TorrentHash>,
    erase_calls: RefCell<Vec<TorrentHash>>,
}

impl FakeClient {
    fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            torrents: RefCell::new(Vec::new()),
            refuse: Vec::new(),
            erase_calls: RefCell::new(Vec::new()),
        }
    }

    fn add(self, hash: &str, base_path: PathBuf) -> Self {
        self.torrents.borrow_mut().push((TorrentHash::new(hash), base_path));
        self
    }

    fn lookup(&self, hash: &TorrentHash) -> Result<PathBuf, String> {
        self.torrents
            .borrow()
            .iter()
            .find(|(h, _)| h == hash)
            .map(|(_, p)| p.clone())
            .ok_or_else(|| format!("no such torrent {}", hash))
    }
}

impl DownloadClient for FakeClient {
    type Error = String;

    fn download_list(&self, _view: &str) -> Result<Vec<TorrentHash>, Self::Error> {
        Ok(self.torrents.borrow().iter().map(|(h, _)| h.clone()).collect())
    }

    fn name(&self, hash: &TorrentHash) -> Result<String, Self::Error> {
        self.lookup(hash)
            .map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default())
    }

    fn base_path(&self, hash: &TorrentHash) -> Result<PathBuf, Self::Error> {
        self.lookup(hash)
    }

    fn erase(&self, hash: &TorrentHash) -> Result<i64, Self::Error> {
        self.erase_calls.borrow_mut().push(hash.clone());
        if self.refuse.contains(hash) {
            return Ok(1);
        }
        self.torrents.borrow_mut().retain(|(h, _)| h != hash);
        Ok(0)
    }

    fn default_directory(&self) -> Result<PathBuf, Self::Error> {
        Ok(self.data_dir.clone())
    }
}

fn movie(title: &str, file: &str, viewed_days_ago: i64) -> LibraryItem {
    LibraryItem {
        key: title.to_string(),
        title: title.to_string(),
        year: Some(2021),
        kind: MediaKind::Movie {
            parts: vec![PathBuf::from("/plex/movies").join(file)],
        },
        added_at: Some(Local::now() - Duration::days(365)),
        history: vec![HistoryEntry {
            viewed_at: Local::now() - Duration::days(viewed_days_ago),
        }],
    }
}

fn write(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn janitor(root: &Path) -> Janitor {
    Janitor::new(JanitorConfig::new(root), ExclusionSet::builtin())
}

#[test]
fn test_expired_movie_is_erased_and_removed() {
    let root = TempDir::new().unwrap();
    let movie_file = root.path().join("a.mkv");
    write(&movie_file, b"expired");

    let library = FakeLibrary {
        items: vec![movie("A", "a.mkv", 40)],
    };
    let client = FakeClient::new(root.path()).add("AAAA", movie_file.clone());

    let report = janitor(root.path()).run(&library, &client).unwrap();

    assert_eq!(report.classification.expired, vec!["A (2021)".to_string()]);
    assert_eq!(
        report.reconciliation.reports[0].verdict,
        TorrentVerdict::Erased(ErasureOutcome::FullSuccess)
    );
    assert!(!movie_file.exists());
    assert_eq!(client.erase_calls.borrow().len(), 1);
}

#[test]
fn test_recent_movie_protects_whole_torrent() {
    let root = TempDir::new().unwrap();
    let pack = root.path().join("Collection");
    write(&pack.join("b.mp4"), b"b");
    write(&pack.join("c.mp4"), b"c");

    let library = FakeLibrary {
        items: vec![movie("B", "b.mp4", 10)],
    };
    let client = FakeClient::new(root.path()).add("BBBB", pack.clone());

    let report = janitor(root.path()).run(&library, &client).unwrap();

    assert!(matches!(report.reconciliation.reports[0].verdict, TorrentVerdict::Kept { .. }));
    assert!(pack.join("b.mp4").exists());
    assert!(pack.join("c.mp4").exists());
    assert!(report.sweep.removed.is_empty());
    assert!(client.erase_calls.borrow().is_empty());
}

#[test]
fn test_torrent_outside_root_is_never_erased() {
    let root = TempDir::new().unwrap();
    let library = FakeLibrary { items: vec![] };
    let client = FakeClient::new(root.path()).add("CCCC", PathBuf::from("/other/path/x"));

    let report = janitor(root.path()).run(&library, &client).unwrap();

    assert_eq!(report.reconciliation.reports[0].verdict, TorrentVerdict::PathAnomaly);
    assert!(client.erase_calls.borrow().is_empty());
}

#[test]
fn test_excluded_filename_survives_sweep() {
    let root = TempDir::new().unwrap();
    let camera = root.path().join("cams").join("surveillance.mp4");
    write(&camera, b"footage");

    let exclusions = ExclusionSet::builtin().merge(ExclusionSet::new(
        Vec::<String>::new(),
        ["surveillance.mp4"],
        Vec::<String>::new(),
    ));
    let mut janitor = Janitor::new(JanitorConfig::new(root.path()), exclusions);
    let library = FakeLibrary { items: vec![] };
    let client = FakeClient::new(root.path());

    let report = janitor.run(&library, &client).unwrap();

    assert!(camera.exists());
    assert_eq!(report.sweep.protected, 1);
}

#[test]
fn test_excluded_hash_keeps_data_through_sweep() {
    let root = TempDir::new().unwrap();
    let seed = root.path().join("Linux ISOs");
    write(&seed.join("distro.iso"), b"iso");

    let exclusions = ExclusionSet::new(["dddd"], Vec::<String>::new(), Vec::<String>::new());
    let mut janitor = Janitor::new(JanitorConfig::new(root.path()), exclusions);
    let library = FakeLibrary { items: vec![] };
    let client = FakeClient::new(root.path()).add("DDDD", seed.clone());

    janitor.run(&library, &client).unwrap();

    assert!(seed.join("distro.iso").exists());
    assert!(client.erase_calls.borrow().is_empty());
}

#[test]
fn test_show_episodes_protect_mixed_case_files() {
    let root = TempDir::new().unwrap();
    let season = root.path().join("Show.S01");
    write(&season.join("Show.S01E01.mkv"), b"1");
    write(&season.join("Show.S01E02.mkv"), b"2");

    let show = LibraryItem {
        key: "show".to_string(),
        title: "Show".to_string(),
        year: None,
        kind: MediaKind::Show {
            episodes: vec![Episode {
                title: "Pilot".to_string(),
                parts: vec![PathBuf::from("/plex/tv/Show/Season 1/show.s01e01.mkv")],
            }],
        },
        added_at: Some(Local::now() - Duration::days(3)),
        history: vec![],
    };
    let library = FakeLibrary { items: vec![show] };
    let client = FakeClient::new(root.path()).add("EEEE", season.clone());

    janitor(root.path()).run(&library, &client).unwrap();

    // Mixed-case names only survive the sweep through the kept torrent's paths
    assert!(season.join("Show.S01E01.mkv").exists());
    assert!(season.join("Show.S01E02.mkv").exists());
}

#[test]
fn test_erase_refusal_is_isolated() {
    let root = TempDir::new().unwrap();
    let refused = root.path().join("refused.mkv");
    let accepted = root.path().join("accepted.mkv");
    write(&refused, b"r");
    write(&accepted, b"a");

    let library = FakeLibrary { items: vec![] };
    let mut client = FakeClient::new(root.path())
        .add("F1", refused.clone())
        .add("F2", accepted.clone());
    client.refuse.push(TorrentHash::new("F1"));

    let report = janitor(root.path()).run(&library, &client).unwrap();

    let outcomes: Vec<_> = report.reconciliation.erased().map(|(_, o)| o.clone()).collect();
    assert!(matches!(outcomes[0], ErasureOutcome::ClientEraseFailed { .. }));
    assert_eq!(outcomes[1], ErasureOutcome::FullSuccess);
    assert!(!accepted.exists());

    // The client keeps the refused torrent, but nothing protects its file,
    // so the orphan sweep removes it later in the same pass
    assert!(client.torrents.borrow().iter().any(|(hash, _)| hash.as_str() == "F1"));
    assert!(report.sweep.removed.iter().any(|f| f.path == refused));
    assert!(!refused.exists());
}

#[test]
fn test_second_run_deletes_nothing() {
    let root = TempDir::new().unwrap();
    write(&root.path().join("old.mkv"), b"old");
    write(&root.path().join("new.mkv"), b"new");
    write(&root.path().join("leftover.txt"), b"stray");

    let library = FakeLibrary {
        items: vec![movie("Old", "old.mkv", 90), movie("New", "new.mkv", 1)],
    };
    let client = FakeClient::new(root.path())
        .add("OLD", root.path().join("old.mkv"))
        .add("NEW", root.path().join("new.mkv"));

    let mut janitor = janitor(root.path());
    let first = janitor.run(&library, &client).unwrap();
    assert_eq!(first.reconciliation.erased().count(), 1);
    assert_eq!(first.sweep.removed.len(), 1);

    let second = janitor.run(&library, &client).unwrap();
    assert_eq!(second.reconciliation.erased().count(), 0);
    assert!(second.sweep.removed.is_empty());
    assert!(root.path().join("new.mkv").exists());
    assert_eq!(janitor.metrics().run_count, 2);
}

#[test]
fn test_dry_run_leaves_everything_in_place() {
    let root = TempDir::new().unwrap();
    let movie_file = root.path().join("a.mkv");
    let stray = root.path().join("stray.nfo");
    write(&movie_file, b"expired");
    write(&stray, b"stray");

    let library = FakeLibrary {
        items: vec![movie("A", "a.mkv", 400)],
    };
    let client = FakeClient::new(root.path()).add("AAAA", movie_file.clone());
    let config = JanitorConfig {
        dry_run: true,
        ..JanitorConfig::new(root.path())
    };

    let report = Janitor::new(config, ExclusionSet::builtin())
        .run(&library, &client)
        .unwrap();

    assert!(matches!(report.reconciliation.reports[0].verdict, TorrentVerdict::WouldErase { .. }));
    assert_eq!(report.sweep.removed.len(), 2);
    assert!(movie_file.exists());
    assert!(stray.exists());
    assert!(client.erase_calls.borrow().is_empty());
}
