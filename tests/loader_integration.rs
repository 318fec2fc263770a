//! Integration tests for rule modules loaded from `testdata/rules`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use usecheck::config::{PluginsConfig, RuleSettings};
use usecheck::detect::{Category, Origin, Runner, Severity};
use usecheck::loader::{Capability, LoadError, Loader, NotificationSink};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn rules_dir() -> PathBuf {
    testdata_path().join("rules")
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

#[test]
fn test_default_grants() {
    let granted = PluginsConfig::default().granted();
    let report = Loader::new(granted).load_dir(&rules_dir());

    let loaded: Vec<&str> = report.loaded.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(
        loaded,
        vec!["acme-internal-terms", "no-lorem-ipsum", "checkout-url-context"]
    );
    assert!(report
        .loaded
        .iter()
        .all(|d| matches!(d.origin, Origin::Loaded(_))));

    let skipped: Vec<String> = report.skipped.iter().map(|s| file_name(&s.path)).collect();
    assert_eq!(skipped, vec!["broken.yaml", "glossary.yaml"]);
    assert!(matches!(report.skipped[0].error, LoadError::Malformed(_)));
    assert!(matches!(
        report.skipped[1].error,
        LoadError::DependencyNotAvailable(Capability::FsRead)
    ));
    assert!(report.warnings()[1].contains("capability fs-read is not granted"));
}

#[test]
fn test_all_grants_load_vocabulary_rule() {
    let report = Loader::new(Capability::ALL.to_vec()).load_dir(&rules_dir());
    assert_eq!(report.loaded.len(), 4);
    assert_eq!(report.skipped.len(), 1);

    let mut runner = Runner::new();
    for d in report.loaded {
        runner.register(d);
    }
    let result = runner.run_files(&[testdata_path().join("claims.tsx")]).unwrap();
    let lines: Vec<(usize, &str)> = result
        .diagnostics()
        .filter(|(_, d)| d.kind == "glossary-terms")
        .map(|(_, d)| (d.line, d.message.as_str()))
        .collect();
    assert_eq!(
        lines,
        vec![
            (3, "glossary term: Adjudication"),
            (4, "glossary term: Policy number"),
            (5, "glossary term: Adjudication"),
        ]
    );
}

#[test]
fn test_loaded_rules_run_after_builtins() {
    let report = Loader::new(PluginsConfig::default().granted()).load_dir(&rules_dir());
    let mut runner = Runner::new()
        .with_builtins(&RuleSettings::default())
        .auxiliary(Some("https://shop.example/checkout".to_string()));
    for d in report.loaded {
        runner.register(d);
    }
    assert_eq!(runner.descriptors().len(), 13);

    let result = runner.run_files(&[testdata_path().join("checkout.tsx")]).unwrap();
    let find = |kind: &str| {
        result
            .diagnostics()
            .map(|(_, d)| d)
            .find(|d| d.kind == kind)
            .unwrap_or_else(|| panic!("no {} finding", kind))
    };

    let lorem = find("no-lorem-ipsum");
    assert_eq!(lorem.line, 14);
    assert_eq!(lorem.category, Category::MinimalistDesign);
    assert_eq!(lorem.message, "placeholder copy left in the UI: Lorem ipsum dolor sit amet");

    let sku = find("acme-internal-terms");
    assert_eq!(sku.line, 15);
    assert_eq!(sku.severity, Severity::Info);
    assert_eq!(sku.suggested_action, "Say \"product code\" instead.");

    let heading = find("checkout-heading");
    assert_eq!(heading.line, 13);
    assert_eq!(heading.message, "checkout heading on https://shop.example/checkout: Checkout");
}

#[test]
fn test_disabled_category_modules_are_not_loaded() {
    let report = Loader::new(PluginsConfig::default().granted())
        .disabled_categories([Category::RealWorldLanguage].into_iter().collect())
        .load_dir(&rules_dir());

    let disabled: Vec<String> = report.disabled.iter().map(|p| file_name(p)).collect();
    assert_eq!(disabled, vec!["acme-words.scm", "glossary.yaml"]);
    assert!(report.loaded.iter().all(|d| d.category() != Category::RealWorldLanguage));
}

#[derive(Default)]
struct Recorder {
    messages: Mutex<Vec<String>>,
}

impl NotificationSink for Recorder {
    fn notify(&self, rule: &str, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(format!("{}: {}", rule, message));
    }
}

#[test]
fn test_notifications_reach_the_sink() {
    let temp = tempfile::TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("todo.yaml"),
        "name: visible-todo\ncategory: minimalist-design\nmessage: \"unfinished copy: {match}\"\nrequires: [notify]\nnotify: true\npattern: \"TBD\"\n",
    )
    .unwrap();

    let recorder = Arc::new(Recorder::default());
    let report = Loader::new(vec![Capability::Notify])
        .notification_sink(recorder.clone())
        .load_dir(temp.path());
    assert_eq!(report.loaded.len(), 1);

    let mut runner = Runner::new();
    for d in report.loaded {
        runner.register(d);
    }
    let diags = runner
        .run_source("Plan.tsx", "const P = () => <p>Price: TBD</p>;\n")
        .unwrap();
    assert_eq!(diags.len(), 1);

    let messages = recorder.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("visible-todo: 1 finding(s) in Plan.tsx"));
}
