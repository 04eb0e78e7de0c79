//! End-to-end runs of the pipeline from configuration and descriptor files.

use camino::{Utf8Path, Utf8PathBuf};
use logtest::Logger;
use mockall::predicate::eq;
use std::fs;
use std::io::Read;
use tempfile::TempDir;
use trellis::ProjectConfig;
use trellis_common::{ApiSnapshot, ApiSurface, ApiSymbol, Module, ModuleId, ModuleKind};
use trellis_orchestrator::gate::{ChangeKind, GateError, SnapshotStore};
use trellis_orchestrator::inputs::load_descriptors;
use trellis_orchestrator::pipeline::PipelineContext;
use zip::ZipArchive;

mockall::mock! {
    Store {}

    impl SnapshotStore for Store {
        fn load(&self, module: &ModuleId) -> Result<Option<ApiSnapshot>, GateError>;
        fn save(&self, snapshot: &ApiSnapshot) -> Result<(), GateError>;
    }
}

const CONFIG: &str = r#"
group = "net.example"
version = "1.4.0"

[api]
allow = ["api", "console"]
ignored_packages = ["net.example.internal"]
non_public_markers = ["net.example.InternalApi"]
"#;

fn id(name: &str) -> ModuleId {
    ModuleId::new(name).expect("valid id")
}

fn context() -> PipelineContext {
    let config = ProjectConfig::from_toml_str(CONFIG).expect("valid config");
    PipelineContext::from_config(config).expect("valid context")
}

fn root(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 path")
}

fn module_with_api(name: &str, symbols: Vec<ApiSymbol>) -> Module {
    Module::new(id(name), ModuleKind::Multiplatform).with_api(ApiSurface::new(symbols))
}

fn foo() -> ApiSymbol {
    ApiSymbol::new("net.example.api", "foo()", "public static final fun foo(): Unit")
}

fn bar() -> ApiSymbol {
    ApiSymbol::new("net.example.console", "bar()", "public final fun bar(): Int")
}

#[test]
fn removed_symbol_fails_the_check_and_unlisted_modules_are_not_read() {
    let modules = vec![
        module_with_api("api", Vec::new()),
        module_with_api(
            "internal-impl",
            vec![ApiSymbol::new("net.example.impl", "gone()", "fun gone(): Unit")],
        ),
        module_with_api("console", vec![bar()]),
    ];

    let mut store = MockStore::new();
    store
        .expect_load()
        .with(eq(id("api")))
        .times(1)
        .returning(|module| Ok(Some(ApiSnapshot::new(module.clone(), vec![foo()]))));
    store
        .expect_load()
        .with(eq(id("console")))
        .times(1)
        .returning(|module| Ok(Some(ApiSnapshot::new(module.clone(), vec![bar()]))));
    store
        .expect_load()
        .with(eq(id("internal-impl")))
        .times(0);
    store.expect_save().times(0);

    let report = context().check_api(&modules, store).expect("gate runs");

    assert!(!report.is_pass());
    let breaking: Vec<_> = report.breaking_changes().collect();
    assert_eq!(breaking.len(), 1);
    let change = breaking.first().expect("one breaking change");
    assert_eq!(change.module, id("api"));
    assert_eq!(change.key.to_string(), "net.example.api.foo()");
    assert!(matches!(change.kind, ChangeKind::Removed { .. }));

    let checked: Vec<&str> = report
        .modules()
        .iter()
        .map(|check| check.module.as_str())
        .collect();
    assert_eq!(checked, vec!["api", "console"]);
}

fn write_jar(path: &Utf8Path, members: &[(&str, &str)]) {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut writer = zip::ZipWriter::new(fs::File::create(path).expect("create jar"));
    for (name, contents) in members {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start member");
        writer.write_all(contents.as_bytes()).expect("write member");
    }
    writer.finish().expect("finish jar");
}

fn write_project(base: &Utf8Path) -> Utf8PathBuf {
    fs::create_dir_all(base.join("core/jvm/net/example/core")).expect("mkdir jvm");
    fs::write(base.join("core/jvm/net/example/core/Core.class"), "core-jvm").expect("write");
    fs::create_dir_all(base.join("core/js")).expect("mkdir js");
    fs::write(base.join("core/js/core.js"), "core-js").expect("write");
    write_jar(
        &base.join("dep.jar"),
        &[
            ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\n"),
            ("META-INF/DEP.SF", "signature"),
            ("org/dep/Dep.class", "dep"),
        ],
    );

    let descriptors = base.join("modules.json");
    fs::write(
        &descriptors,
        r#"{
          "modules": [
            {
              "id": "core",
              "kind": "multiplatform",
              "plugins": ["blocking-bridge"],
              "targets": [
                { "name": "js", "platform": "js",
                  "output": { "status": "compiled", "directory": "core/js" } },
                { "name": "jvm", "platform": "jvm",
                  "output": { "status": "compiled", "directory": "core/jvm" } }
              ],
              "dependency_closure": {
                "platform": "jvm",
                "artifacts": [{ "coordinate": "org.dep:dep:1.0", "archive": "dep.jar" }]
              }
            },
            { "id": "console", "kind": "jvm-only" }
          ]
        }"#,
    )
    .expect("write descriptors");
    descriptors
}

fn archive_names(path: &Utf8Path) -> Vec<String> {
    let mut archive = ZipArchive::new(fs::File::open(path).expect("open jar")).expect("read jar");
    (0..archive.len())
        .map(|index| archive.by_index(index).expect("member").name().to_owned())
        .collect()
}

#[test]
fn descriptors_assemble_into_one_deterministic_jar() {
    let dir = TempDir::new().expect("temp dir");
    let base = root(&dir);
    let descriptors = write_project(&base);
    let context = context();

    let modules = load_descriptors(&descriptors).expect("valid descriptors");
    let configured = context.configure(modules).expect("configures").into_modules();
    let out_dir = base.join("build/libs");
    let first = context
        .assemble(&configured, &out_dir)
        .expect("task graph runs")
        .into_result()
        .expect("every task succeeds");

    assert_eq!(first.artifacts.len(), 1);
    let artifact = first.artifacts.first().expect("core artifact");
    assert_eq!(artifact.archive_path, out_dir.join("core-1.4.0-all.jar"));
    assert_eq!(
        archive_names(&artifact.archive_path),
        vec![
            "META-INF/MANIFEST.MF",
            "net/example/core/Core.class",
            "org/dep/Dep.class",
        ]
    );

    let mut archive =
        ZipArchive::new(fs::File::open(&artifact.archive_path).expect("open jar")).expect("jar");
    let mut contents = String::new();
    archive
        .by_name("net/example/core/Core.class")
        .expect("class present")
        .read_to_string(&mut contents)
        .expect("readable");
    assert_eq!(contents, "core-jvm");

    let second = context
        .assemble(&configured, &out_dir)
        .expect("task graph runs")
        .into_result()
        .expect("every task succeeds");
    let rebuilt = second.artifacts.first().expect("core artifact");
    assert_eq!(rebuilt.sha256, artifact.sha256);
}

#[test]
fn tolerated_aspect_failures_are_logged() {
    let mut logger = Logger::start();
    let report = context()
        .configure(vec![Module::new(id("core"), ModuleKind::Multiplatform)])
        .expect("optional failures are tolerated");
    assert_eq!(report.tolerated_count(), 1);

    let mut warnings = Vec::new();
    while let Some(record) = logger.pop() {
        let message = record.args().to_string();
        if record.level() == log::Level::Warn
            && message.contains("core")
            && message.contains("unit-coercion")
        {
            warnings.push(message);
        }
    }
    assert_eq!(warnings.len(), 1, "one warning per tolerated failure: {warnings:?}");
    assert!(
        warnings
            .iter()
            .all(|message| message.contains("module core: tolerated failure of unit-coercion"))
    );
}
