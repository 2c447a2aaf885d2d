use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use terradep_graph::{encode, merge_graphs, GraphError};
use terradep_scanner::{ScanError, ScanOptions, Scanner};
use terradep_state::{ResolveError, ResolverRegistry, S3Resolver, State};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn backend(key: &str) -> String {
    format!(
        r#"
terraform {{
  backend "s3" {{
    bucket = "b"
    key    = "{key}"
    region = "eu-west-3"
  }}
}}
"#
    )
}

fn remote_state(name: &str, key: &str) -> String {
    format!(
        r#"
data "terraform_remote_state" "{name}" {{
  backend = "s3"
  config = {{
    bucket = "b"
    key    = "{key}"
  }}
}}
"#
    )
}

fn scanner() -> Scanner {
    Scanner::new(ScanOptions::default(), ResolverRegistry::default()).unwrap()
}

fn s3(key: &str) -> State {
    State::new(format!("s3://b/{key}"))
}

#[test]
fn foundation_and_app() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write(root, "foundation/backend.tf", &backend("net/state"));
    write(root, "app/backend.tf", &backend("app/state"));
    write(root, "app/remote.tf", &remote_state("net", "net/state"));

    let graph = scanner().scan(root).unwrap();

    let heads: Vec<&State> = graph.head_nodes().map(|node| &node.state).collect();
    assert_eq!(heads, vec![&s3("app/state")]);

    let app = graph.find_by_path(&root.join("app")).unwrap();
    let foundation = graph.find_by_path(&root.join("foundation")).unwrap();
    assert_eq!(graph.dependencies(app), vec![foundation]);
    assert!(graph.dependencies(foundation).is_empty());

    let encoded = encode(&graph);
    let labels: Vec<&str> = encoded.vertices.iter().map(|v| v.label.as_str()).collect();
    assert_eq!(labels, vec!["s3://b/app/state", "s3://b/net/state"]);
    assert_eq!(encoded.edges.len(), 1);
    assert_eq!(encoded.edges[0].from, 0);
    assert_eq!(encoded.edges[0].to, 1);
}

#[test]
fn nested_directories_of_a_deployment_are_not_scanned() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write(root, "app/main.tf", &backend("app/state"));
    // would collide with app if it were scanned
    write(root, "app/modules/copy/main.tf", &backend("app/state"));

    let (records, stats) = scanner().collect(root).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(stats.deployments, 1);
}

#[test]
fn modules_without_backend_are_walked_through() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write(root, "shared/main.tf", "variable \"name\" {}\n");
    write(root, "shared/envs/prod/main.tf", &backend("prod/state"));

    let (records, stats) = scanner().collect(root).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].path, root.join("shared/envs/prod"));
    assert_eq!(stats.modules, 1);
}

#[test]
fn excluded_directories_are_skipped() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write(root, "app/main.tf", &backend("app/state"));
    write(root, ".terraform/modules/app/main.tf", &backend("app/state"));
    write(root, "legacy-app/main.tf", &backend("app/state"));

    let options = ScanOptions::default().with_exclusions(["legacy-*"]);
    let scanner = Scanner::new(options, ResolverRegistry::default()).unwrap();
    let (records, stats) = scanner.collect(root).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(stats.excluded, 2);
}

#[test]
fn two_deployments_with_the_same_state_are_rejected() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write(root, "a/main.tf", &backend("same/state"));
    write(root, "z/main.tf", &backend("same/state"));

    let err = scanner().scan(root).unwrap_err();
    match err {
        ScanError::Graph(GraphError::DuplicateState { state, first, second }) => {
            assert_eq!(state, s3("same/state"));
            assert_eq!(first, root.join("a"));
            assert_eq!(second, root.join("z"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn region_policy_decides_whether_states_collide() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write(root, "west/main.tf", &backend("shared/state"));
    write(
        root,
        "east/main.tf",
        &backend("shared/state").replace("eu-west-3", "us-east-1"),
    );

    assert!(scanner().scan(root).is_err());

    let resolvers = ResolverRegistry::new().with(S3Resolver::default().with_region());
    let scanner = Scanner::new(ScanOptions::default(), resolvers).unwrap();
    let graph = scanner.scan(root).unwrap();
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.heads().len(), 2);
}

#[test]
fn unsupported_backend_names_the_deployment() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write(
        root,
        "app/main.tf",
        "terraform {\n  backend \"gcs\" {\n    bucket = \"b\"\n  }\n}\n",
    );

    let err = scanner().scan(root).unwrap_err();
    match err {
        ScanError::Resolve { path, source } => {
            assert_eq!(path, root.join("app"));
            assert!(matches!(source, ResolveError::UnsupportedBackend { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn assert_configuration_error(root: &Path, file: &str) {
    match scanner().scan(root).unwrap_err() {
        ScanError::ConfigurationParse { path, .. } => assert_eq!(path, root.join(file)),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_native_remote_state_fails_the_scan() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write(root, "app/main.tf", &backend("app/state"));
    write(root, "app/remote.tf", &remote_state("net", "net/state"));
    write(
        root,
        "app/legacy.tf",
        "data \"terraform_remote_state\" \"dns\" {\n  backend = \"s3\"\n  config  = \"bucket=b,key=dns\"\n}\n",
    );

    assert_configuration_error(root, "app/legacy.tf");
}

#[test]
fn malformed_json_remote_state_fails_the_scan() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write(root, "app/main.tf", &backend("app/state"));
    write(
        root,
        "app/remote.tf.json",
        r#"{"data": {"terraform_remote_state": {
            "net": {"backend": "s3", "config": {"bucket": "b", "key": "net/state"}},
            "dns": "s3://b/dns/state"
        }}}"#,
    );

    assert_configuration_error(root, "app/remote.tf.json");
}

#[test]
fn json_deployment_is_scanned_like_native() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write(root, "foundation/main.tf", &backend("net/state"));
    write(
        root,
        "app/main.tf.json",
        r#"{
  "terraform": {"backend": {"s3": {"bucket": "b", "key": "app/state"}}},
  "data": {"terraform_remote_state": {
    "net": [{"backend": "s3", "config": {"bucket": "b", "key": "net/state"}}]
  }}
}"#,
    );

    let graph = scanner().scan(root).unwrap();
    let app = graph.find_by_path(&root.join("app")).unwrap();
    let deps = graph.dependency_nodes(app);
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].path.as_deref(), Some(root.join("foundation").as_path()));
}

#[test]
fn external_state_becomes_unresolved_node() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write(root, "app/main.tf", &backend("app/state"));
    write(root, "app/remote.tf", &remote_state("vpc", "elsewhere/vpc"));

    let graph = scanner().scan(root).unwrap();
    let app = graph.find_by_path(&root.join("app")).unwrap();
    let deps = graph.dependency_nodes(app);
    assert_eq!(deps.len(), 1);
    assert!(deps[0].is_external());
    assert_eq!(deps[0].state, s3("elsewhere/vpc"));
}

#[test]
fn scans_of_separate_roots_merge_into_one_graph() {
    let temp = tempdir().unwrap();
    let platform = temp.path().join("platform");
    let product = temp.path().join("product");
    write(&platform, "network/main.tf", &backend("net/state"));
    write(&product, "api/main.tf", &backend("api/state"));
    write(&product, "api/remote.tf", &remote_state("net", "net/state"));

    let scanner = scanner();
    let graphs = vec![
        scanner.scan(&platform).unwrap(),
        scanner.scan(&product).unwrap(),
    ];
    let merged = merge_graphs(&graphs).unwrap();

    assert_eq!(merged.node_count(), 2);
    let net = merged.find_by_state(&s3("net/state")).unwrap();
    assert_eq!(
        merged.node(net).unwrap().path.as_deref(),
        Some(platform.join("network").as_path())
    );
    assert!(merged.is_depended_upon(net));
}

#[test]
fn empty_root_yields_empty_graph() {
    let temp = tempdir().unwrap();
    let graph = scanner().scan(temp.path()).unwrap();
    assert!(graph.is_empty());
}
