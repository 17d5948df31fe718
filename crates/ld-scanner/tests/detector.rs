//! End-to-end tests for the locale detector over real directories.

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use insta::assert_json_snapshot;
use ld_core::{Config, Mapping, MergePolicy, ModuleId, Value};
use ld_parser::{FormatParser, ParseError, Parser, ParserRegistry};
use ld_scanner::{DetectorError, LocaleDetector, ResourceClient, SnapshotSource};
use ld_watcher::FileEvent;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// JSON parser that counts how often each file is loaded.
#[derive(Debug, Clone, Default)]
struct CountingParser {
    loads: Arc<AtomicUsize>,
}

#[async_trait]
impl Parser for CountingParser {
    fn name(&self) -> &str {
        "counting-json"
    }

    fn supported_exts(&self) -> &str {
        "json"
    }

    fn supports(&self, ext: &str) -> bool {
        ext.trim_start_matches('.') == "json"
    }

    async fn load(&self, path: &Utf8Path) -> Result<Mapping, ParseError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        FormatParser::json().load(path).await
    }
}

struct Project {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl Project {
    fn new(files: &[(&str, &str)]) -> Self {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().canonicalize().unwrap()).unwrap();
        let project = Self { _temp: temp, root };
        for (path, body) in files {
            project.write(path, body);
        }
        project
    }

    fn write(&self, path: &str, body: &str) {
        let full = self.root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, body).unwrap();
    }

    fn config(&self) -> Config {
        let mut config = Config::default();
        config.detector.locales_paths = vec!["locales".to_owned()];
        config.resolve(&self.root).unwrap()
    }

    fn event(&self, path: &str) -> FileEvent {
        FileEvent::new(self.root.join(path))
    }
}

/// Detector whose only parser counts loads.
fn counting_detector(project: &Project) -> (LocaleDetector, Arc<AtomicUsize>) {
    let parser = CountingParser::default();
    let loads = Arc::clone(&parser.loads);
    let registry = ParserRegistry::empty().with_parser(parser);
    let detector = LocaleDetector::with_registry(&project.config(), registry).unwrap();
    (detector, loads)
}

fn scenario_one() -> Project {
    Project::new(&[
        ("locales/en/common.json", r#"{"a": "1"}"#),
        ("locales/zh/common.json", r#"{"a": "一"}"#),
    ])
}

#[tokio::test]
async fn test_two_locales_two_modules() {
    let project = scenario_one();
    let mut detector = LocaleDetector::new(&project.config()).unwrap();
    detector.init().await.unwrap();

    let modules = detector.locale_modules();
    assert_json_snapshot!(modules.modules, @r#"
    {
      "en": {
        "common": {
          "a": "1"
        }
      },
      "zh": {
        "common": {
          "a": "一"
        }
      }
    }
    "#);

    let ids: Vec<&str> = modules.virtual_modules.keys().map(ModuleId::as_str).collect();
    assert_eq!(ids, vec!["virtual-locale-en", "virtual-locale-zh"]);
    assert_eq!(
        modules.resolve_id(&project.root.join("virtual-locale-zh")),
        Some(&ModuleId::for_locale("zh"))
    );
}

#[tokio::test]
async fn test_nested_namespace_joins_with_dots() {
    let project = scenario_one();
    project.write("locales/en/more/extra.json", r#"{"b": "2"}"#);

    let mut detector = LocaleDetector::new(&project.config()).unwrap();
    detector.init().await.unwrap();

    assert_json_snapshot!(detector.bundle("en", None).unwrap(), @r#"
    {
      "common": {
        "a": "1"
      },
      "more.extra": {
        "b": "2"
      }
    }
    "#);
    assert_eq!(detector.all_locale_dirs().len(), 3);
}

#[tokio::test]
async fn test_broken_file_is_excluded() {
    let project = scenario_one();
    project.write("locales/en/broken.json", "{ this is not json");

    let mut detector = LocaleDetector::new(&project.config()).unwrap();
    let stats = detector.init().await.unwrap();

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.loaded, 2);
    assert_eq!(detector.files().len(), 2);
    assert!(!detector
        .all_locale_files()
        .contains(&project.root.join("locales/en/broken.json")));
}

#[tokio::test]
async fn test_edit_reloads_once_and_rebuilds_once() {
    let project = scenario_one();
    let (mut detector, loads) = counting_detector(&project);
    detector.init().await.unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 2);
    assert_eq!(detector.generation(), 1);
    let zh_before = detector.bundle("zh", None).cloned();

    project.write("locales/en/common.json", r#"{"a": "one"}"#);
    assert!(detector.on_file_changed(&project.event("locales/en/common.json")).await);

    assert_eq!(loads.load(Ordering::SeqCst), 3);
    assert_eq!(detector.generation(), 2);
    assert_eq!(
        detector.bundle("en", Some("common")).unwrap().as_map().unwrap()["a"],
        Value::from("one")
    );
    assert_eq!(detector.bundle("zh", None).cloned(), zh_before);
}

#[tokio::test]
async fn test_burst_coalesces_into_one_reload() {
    let project = scenario_one();
    let (mut detector, loads) = counting_detector(&project);
    detector.init().await.unwrap();

    project.write("locales/en/common.json", r#"{"a": "one"}"#);
    let event = project.event("locales/en/common.json");
    for _ in 0..5 {
        detector.notify(&event);
    }

    assert!(detector.drain().await);
    assert_eq!(loads.load(Ordering::SeqCst), 3);
    assert_eq!(detector.generation(), 2);
}

#[tokio::test]
async fn test_unchanged_drain_does_not_rebuild() {
    let project = scenario_one();
    let (mut detector, loads) = counting_detector(&project);
    detector.init().await.unwrap();
    let mut rx = detector.subscribe();
    rx.borrow_and_update();

    // Not a locale file: no reload, no rebuild.
    project.write("locales/README.json", "{}");
    assert!(!detector.on_file_changed(&project.event("locales/README.json")).await);

    // Outside every locale directory.
    assert!(!detector.on_file_changed(&project.event("src/app.json")).await);

    assert_eq!(loads.load(Ordering::SeqCst), 2);
    assert_eq!(detector.generation(), 1);
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn test_failed_reload_removes_file() {
    let project = scenario_one();
    let mut detector = LocaleDetector::new(&project.config()).unwrap();
    detector.init().await.unwrap();

    project.write("locales/zh/common.json", "[");
    assert!(detector.on_file_changed(&project.event("locales/zh/common.json")).await);

    assert_eq!(detector.files().len(), 1);
    assert!(detector.bundle("zh", None).is_none());
    assert_eq!(detector.locale_modules().virtual_modules.len(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_edit_through_symlinked_root_reloads() {
    let project = Project::new(&[("real/locales/en/common.json", r#"{"a": "1"}"#)]);
    let link = project.root.join("link");
    std::os::unix::fs::symlink(project.root.join("real"), &link).unwrap();

    let mut config = Config::default();
    config.detector.locales_paths = vec!["locales".to_owned()];
    let config = config.resolve(&link).unwrap();
    let mut detector = LocaleDetector::new(&config).unwrap();
    detector.init().await.unwrap();
    assert_eq!(detector.locale_dirs(), &[project.root.join("real/locales")]);

    project.write("real/locales/en/common.json", r#"{"a": "one"}"#);
    let event = FileEvent::new(link.join("locales/en/common.json"));
    assert!(detector.on_file_changed(&event).await);
    assert_eq!(
        detector.bundle("en", Some("common")).unwrap().as_map().unwrap()["a"],
        Value::from("one")
    );

    // A deleted file only resolves through its parent.
    fs::remove_file(project.root.join("real/locales/en/common.json")).unwrap();
    assert!(detector.on_file_changed(&event).await);
    assert!(detector.files().is_empty());
}

#[tokio::test]
async fn test_deleted_file_is_dropped() {
    let project = scenario_one();
    let mut detector = LocaleDetector::new(&project.config()).unwrap();
    detector.init().await.unwrap();

    fs::remove_file(project.root.join("locales/en/common.json")).unwrap();
    assert!(detector.on_file_changed(&project.event("locales/en/common.json")).await);
    assert!(detector.bundle("en", None).is_none());
}

#[tokio::test]
async fn test_later_directory_wins_slot() {
    let project = Project::new(&[
        ("locales/en.json", r#"{"common": {"a": "root"}}"#),
        ("locales/zh.json", r#"{"x": "y"}"#),
        ("extra/en.json", r#"{"common": {"b": "extra"}}"#),
    ]);
    let mut config = project.config();
    config.detector.path_matcher = "{locale}.{ext}".to_owned();
    config.detector.locales_paths = vec!["locales".to_owned(), "extra".to_owned()];

    let mut detector = LocaleDetector::new(&config).unwrap();
    detector.init().await.unwrap();

    assert_json_snapshot!(detector.bundle("en", None).unwrap(), @r#"
    {
      "common": {
        "b": "extra"
      }
    }
    "#);
    assert_eq!(detector.locale_dirs().len(), 2);
}

#[tokio::test]
async fn test_deep_merge_policy() {
    let project = Project::new(&[
        ("locales/en.json", r#"{"menu": {"open": "Open", "save": "Save"}}"#),
        ("extra/en.json", r#"{"menu": {"save": "Store"}}"#),
    ]);
    let mut config = project.config();
    config.detector.path_matcher = "{locale}.{ext}".to_owned();
    config.detector.locales_paths = vec!["locales".to_owned(), "extra".to_owned()];
    config.detector.merge = MergePolicy::Deep;

    let mut detector = LocaleDetector::new(&config).unwrap();
    detector.init().await.unwrap();

    assert_json_snapshot!(detector.bundle("en", None).unwrap(), @r#"
    {
      "menu": {
        "open": "Open",
        "save": "Store"
      }
    }
    "#);
}

#[tokio::test]
async fn test_yaml_root_level_files() {
    let project = Project::new(&[
        ("locales/en.yml", "greeting: Hello\n"),
        ("locales/zh.yaml", "greeting: Nihao\n"),
    ]);
    let mut config = project.config();
    config.detector.path_matcher = "{locale}.{ext}".to_owned();

    let mut detector = LocaleDetector::new(&config).unwrap();
    detector.init().await.unwrap();

    assert_eq!(detector.files().len(), 2);
    let zh = detector.bundle("zh", None).unwrap().as_map().unwrap();
    assert_eq!(zh["greeting"], Value::from("Nihao"));
}

#[tokio::test]
async fn test_no_locale_files_is_fatal() {
    let project = Project::new(&[("locales/notes.txt", "nothing here")]);
    let mut detector = LocaleDetector::new(&project.config()).unwrap();

    let err = detector.init().await.unwrap_err();
    assert!(matches!(err, DetectorError::NoLocaleFiles { dirs: 1 }));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_run_drains_buffered_events_together() {
    let project = scenario_one();
    let (mut detector, loads) = counting_detector(&project);
    detector.init().await.unwrap();

    project.write("locales/en/common.json", r#"{"a": "one"}"#);
    project.write("locales/zh/common.json", r#"{"a": "two"}"#);

    let (tx, mut rx) = mpsc::channel(16);
    for path in [
        "locales/en/common.json",
        "locales/zh/common.json",
        "locales/en/common.json",
    ] {
        tx.send(project.event(path)).await.unwrap();
    }
    drop(tx);

    detector.run(&mut rx).await;

    assert_eq!(loads.load(Ordering::SeqCst), 4);
    assert_eq!(detector.generation(), 2);
}

#[tokio::test]
async fn test_client_follows_detector() {
    let project = scenario_one();
    let mut detector = LocaleDetector::new(&project.config()).unwrap();
    detector.init().await.unwrap();

    let mut client = ResourceClient::new(SnapshotSource::new(detector.subscribe()), "en");
    client.init("zh").await.unwrap();
    assert_eq!(client.translate("common.a"), Some("一"));

    project.write("locales/zh/common.json", r#"{"a": "二"}"#);
    detector.on_file_changed(&project.event("locales/zh/common.json")).await;
    client.reload("zh").await.unwrap();

    assert_eq!(client.translate("common.a"), Some("二"));
}
