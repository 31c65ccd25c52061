use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use pakt_core::config::ResolverConfig;
use pakt_core::fetcher::PackageFetcher;
use pakt_core::import::{ImportEntry, ImportStore};
use pakt_core::package::PackageSpecifier;
use pakt_core::resolver::PackageDescriptor;
use pakt_core::target::{TargetEntry, TargetStore, TargetType};
use pakt_ops::ops_imports::ImportSolver;
use pakt_registry::fetcher::HttpPackageFetcher;
use pakt_resolver::build_graph::BuildGraph;
use pakt_resolver::static_resolver::StaticPackageResolver;
use url::Url;

fn spec(s: &str) -> PackageSpecifier {
    format!("{s}@test").parse().unwrap()
}

fn package(s: &str, deps: &[&str]) -> PackageDescriptor {
    let specifier = spec(s);
    PackageDescriptor {
        url: Url::parse(&format!("https://pkgs.test/{s}.pakt")).unwrap(),
        id: specifier.id,
        version: specifier.version,
        dependencies: deps.iter().map(|d| spec(d)).collect::<BTreeSet<_>>(),
        uploaded_at: None,
        pruned: false,
    }
}

fn resolver() -> StaticPackageResolver {
    StaticPackageResolver::new(vec![
        package("json-1.2.0", &["log-0.3.1"]),
        package("log-0.3.0", &[]),
        package("log-0.3.1", &[]),
        package("http-2.0.0", &["log-0.3.0"]),
    ])
}

fn write_local_package(dir: &Path, specifier: &str, requirements: &[(&str, &str)]) -> PathBuf {
    let mut manifest = format!("[package]\nspecifier = \"{specifier}\"\n\n[requirements]\n");
    for (id, version) in requirements {
        manifest.push_str(&format!("\"{id}\" = \"{version}\"\n"));
    }
    let path = dir.join("package.toml");
    std::fs::write(&path, manifest).unwrap();
    path
}

fn requirement(s: &str) -> ImportEntry {
    ImportEntry::Requirement {
        requirement_spec: spec(s),
    }
}

fn package_import(url: &Url) -> ImportEntry {
    ImportEntry::Package {
        package_url: url.clone(),
    }
}

/// Serves a fixed set of URLs and records every attempt.
#[derive(Default)]
struct RecordingFetcher {
    available: HashMap<Url, PathBuf>,
    attempts: RefCell<Vec<Url>>,
}

impl PackageFetcher for RecordingFetcher {
    fn fetch(&self, url: &Url) -> miette::Result<PathBuf> {
        self.attempts.borrow_mut().push(url.clone());
        self.available
            .get(url)
            .cloned()
            .ok_or_else(|| miette::miette!("no route to {url}"))
    }
}

fn names(plan: &pakt_ops::ops_imports::ImportPlan) -> Vec<String> {
    plan.order.iter().map(|s| s.specifier.to_string()).collect()
}

#[test]
fn requirement_imports_become_shortcuts() {
    let resolver = resolver();
    let fetcher = RecordingFetcher::default();
    let mut solver = ImportSolver::new(&resolver, &fetcher);
    solver.add_import("json", &requirement("json-1.2.0")).unwrap();

    let plan = solver.solve().unwrap();
    assert_eq!(names(&plan), vec!["log-0.3.1@test", "json-1.2.0@test"]);
    assert_eq!(plan.shortcuts.len(), 1);
    assert_eq!(plan.shortcuts["json"].as_str(), "pakt-pkg://json-1.2.0@test");
    assert!(plan.import_bases.is_empty());
    assert!(fetcher.attempts.borrow().is_empty());
}

#[test]
fn package_imports_become_import_bases() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_local_package(dir.path(), "local-1.0.0@test", &[("log@test", "0.3.1")]);
    let url = Url::from_file_path(&manifest).unwrap();

    let resolver = resolver();
    let fetcher = HttpPackageFetcher::new(dir.path(), &ResolverConfig::default()).unwrap();
    let mut solver = ImportSolver::new(&resolver, &fetcher);
    solver.add_import("local", &package_import(&url)).unwrap();
    solver.add_import("json", &requirement("json-1.2.0")).unwrap();

    let plan = solver.solve().unwrap();
    let selected: BTreeSet<String> = names(&plan).into_iter().collect();
    assert_eq!(
        selected,
        ["json-1.2.0@test", "local-1.0.0@test", "log-0.3.1@test"]
            .into_iter()
            .map(String::from)
            .collect()
    );
    assert_eq!(
        plan.import_bases["local"].as_str(),
        "pakt-pkg://local-1.0.0@test"
    );
    assert!(plan.shortcuts.contains_key("json"));
    assert!(!plan.shortcuts.contains_key("local"));
    assert_eq!(plan.order[0].specifier, spec("log-0.3.1"));
}

#[test]
fn every_download_is_attempted_before_failing() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_local_package(dir.path(), "local-1.0.0@test", &[]);
    let good = Url::from_file_path(&manifest).unwrap();
    let bad = Url::parse("https://unreachable.test/missing.pakt").unwrap();

    let resolver = resolver();
    let fetcher = RecordingFetcher {
        available: HashMap::from([(good.clone(), manifest.clone())]),
        ..RecordingFetcher::default()
    };
    let mut solver = ImportSolver::new(&resolver, &fetcher);
    solver.add_import("a-missing", &package_import(&bad)).unwrap();
    solver.add_import("b-local", &package_import(&good)).unwrap();

    let err = solver.solve().unwrap_err();
    assert!(err
        .to_string()
        .contains("not all requested packages could be downloaded"));
    assert_eq!(fetcher.attempts.borrow().len(), 2);
}

#[test]
fn duplicate_package_import_is_rejected() {
    let resolver = resolver();
    let fetcher = RecordingFetcher::default();
    let mut solver = ImportSolver::new(&resolver, &fetcher);
    let url = Url::parse("https://pkgs.test/a.pakt").unwrap();
    solver.add_import("a", &package_import(&url)).unwrap();
    let err = solver.add_import("a", &package_import(&url)).unwrap_err();
    assert!(err.to_string().contains("import already defined for 'a'"));
}

#[test]
fn build_graph_imports_skip_targets() {
    let targets: TargetStore = [
        (
            "app".to_string(),
            TargetEntry::new(TargetType::Program, spec("app-1.0.0"))
                .with_imports(["core", "http"]),
        ),
        (
            "corelib".to_string(),
            TargetEntry::new(TargetType::Library, spec("corelib-1.0.0")),
        ),
    ]
    .into_iter()
    .collect();
    let imports: ImportStore = [
        (
            "core".to_string(),
            ImportEntry::Target {
                target_name: "corelib".to_string(),
            },
        ),
        ("http".to_string(), requirement("http-2.0.0")),
    ]
    .into_iter()
    .collect();
    let graph = BuildGraph::create(&targets, &imports).unwrap();

    let resolver = resolver();
    let fetcher = RecordingFetcher::default();
    let mut solver = ImportSolver::new(&resolver, &fetcher);
    solver.add_build_graph_imports(&graph).unwrap();

    let plan = solver.solve().unwrap();
    assert_eq!(names(&plan), vec!["log-0.3.0@test", "http-2.0.0@test"]);
    assert_eq!(plan.shortcuts.keys().collect::<Vec<_>>(), vec!["http"]);
}
