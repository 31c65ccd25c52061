use pakt_core::import::{ImportEntry, ImportStore};
use pakt_core::package::PackageSpecifier;
use pakt_core::target::{TargetEntry, TargetStore, TargetType};
use pakt_resolver::build_graph::BuildGraph;
use url::Url;

fn spec(s: &str) -> PackageSpecifier {
    s.parse().unwrap()
}

fn target(name: &str, depends: &[&str], imports: &[&str]) -> (String, TargetEntry) {
    let entry = TargetEntry::new(
        TargetType::Library,
        spec(&format!("{}-1.0.0@example.com", name.to_lowercase())),
    )
    .with_depends(depends.iter().copied())
    .with_imports(imports.iter().copied());
    (name.to_string(), entry)
}

fn abc_targets() -> TargetStore {
    [
        target("A", &["B", "C"], &[]),
        target("B", &["C"], &[]),
        target("C", &[], &[]),
    ]
    .into_iter()
    .collect()
}

#[test]
fn build_order_is_dependency_first() {
    let targets = abc_targets();
    let imports = ImportStore::default();
    let graph = BuildGraph::create(&targets, &imports).unwrap();

    assert_eq!(graph.num_targets(), 3);
    assert!(graph.has_target("B"));
    assert!(!graph.has_target("D"));
    assert_eq!(graph.calculate_build_order("C").unwrap(), vec!["C"]);
    assert_eq!(graph.calculate_build_order("B").unwrap(), vec!["C", "B"]);
    assert_eq!(graph.calculate_build_order("A").unwrap(), vec!["C", "B", "A"]);
}

#[test]
fn target_imports_become_edges() {
    let targets: TargetStore = [
        target("app", &[], &["core"]),
        target("corelib", &[], &[]),
    ]
    .into_iter()
    .collect();
    let imports: ImportStore = [(
        "core".to_string(),
        ImportEntry::Target {
            target_name: "corelib".to_string(),
        },
    )]
    .into_iter()
    .collect();

    let graph = BuildGraph::create(&targets, &imports).unwrap();
    assert_eq!(
        graph.calculate_build_order("app").unwrap(),
        vec!["corelib", "app"]
    );
    assert!(graph.requested_requirements().is_empty());
    assert!(graph.requested_package_urls().is_empty());
}

#[test]
fn package_imports_are_collected() {
    let targets: TargetStore = [target("app", &[], &["json", "http"])].into_iter().collect();
    let imports: ImportStore = [
        (
            "json".to_string(),
            ImportEntry::Requirement {
                requirement_spec: spec("json-1.2.0@example.com"),
            },
        ),
        (
            "http".to_string(),
            ImportEntry::Package {
                package_url: Url::parse("https://example.com/http-2.0.0.pakt").unwrap(),
            },
        ),
    ]
    .into_iter()
    .collect();

    let graph = BuildGraph::create(&targets, &imports).unwrap();
    assert!(graph
        .requested_requirements()
        .contains(&spec("json-1.2.0@example.com")));
    assert_eq!(graph.requested_package_urls().len(), 1);
    assert_eq!(graph.calculate_build_order("app").unwrap(), vec!["app"]);
    assert_eq!(graph.import_store().len(), 2);
    assert_eq!(graph.target_store().len(), 1);
}

#[test]
fn missing_target_dependency_is_rejected() {
    let targets: TargetStore = [target("A", &["Z"], &[])].into_iter().collect();
    let imports = ImportStore::default();
    let err = BuildGraph::create(&targets, &imports).err().unwrap();
    assert!(err
        .to_string()
        .contains("target 'A' refers to nonexistent target dependency 'Z'"));
}

#[test]
fn missing_import_is_rejected() {
    let targets: TargetStore = [target("A", &[], &["nothing"])].into_iter().collect();
    let imports = ImportStore::default();
    let err = BuildGraph::create(&targets, &imports).err().unwrap();
    assert!(err
        .to_string()
        .contains("target 'A' refers to nonexistent import 'nothing'"));
}

#[test]
fn import_of_missing_target_is_rejected() {
    let targets = abc_targets();
    let imports: ImportStore = [(
        "ghost".to_string(),
        ImportEntry::Target {
            target_name: "G".to_string(),
        },
    )]
    .into_iter()
    .collect();
    let err = BuildGraph::create(&targets, &imports).err().unwrap();
    assert!(err
        .to_string()
        .contains("import 'ghost' refers to nonexistent target 'G'"));
}

#[test]
fn unknown_build_target_is_an_error() {
    let targets = abc_targets();
    let imports = ImportStore::default();
    let graph = BuildGraph::create(&targets, &imports).unwrap();
    assert!(graph.calculate_build_order("missing").is_err());
}
