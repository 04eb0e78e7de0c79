//! Behaviour-driven tests for artifact assembly.

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;
use trellis::ProjectConfig;
use trellis_common::{
    CompilationTarget, DependencyClosure, Entry, Module, ModuleId, ModuleKind, PlatformTag,
};
use trellis_orchestrator::assembly::{ArtifactAssembler, ArtifactAssembly, AssemblyError};
use trellis_orchestrator::pipeline::{AssemblyReport, PipelineContext};
use trellis_orchestrator::selector::PlatformOutputSelector;
use trellis_orchestrator::tasks::{TaskId, TaskStatus};

struct AssemblyWorld {
    scratch: TempDir,
    module: Option<Module>,
    assembled: Option<Result<Option<ArtifactAssembly>, AssemblyError>>,
    report: Option<AssemblyReport>,
}

#[fixture]
fn world() -> AssemblyWorld {
    AssemblyWorld {
        scratch: TempDir::new().expect("temp dir creation succeeds"),
        module: None,
        assembled: None,
        report: None,
    }
}

fn out_dir(world: &AssemblyWorld) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(world.scratch.path().join("libs")).expect("utf-8 path")
}

fn multiplatform(name: &str) -> Module {
    Module::new(ModuleId::new(name).expect("valid id"), ModuleKind::Multiplatform)
}

fn module_mut(world: &mut AssemblyWorld) -> &mut Module {
    world.module.as_mut().expect("module set")
}

#[given("a multiplatform module \"{name}\" with a \"{js}\" target and a \"{jvm}\" target")]
fn given_two_targets(world: &mut AssemblyWorld, name: String, js: String, jvm: String) {
    let module = multiplatform(&name)
        .with_target(CompilationTarget::compiled(
            js,
            PlatformTag::Js,
            vec![Entry::named(format!("{name}.js"))],
        ))
        .with_target(CompilationTarget::compiled(
            jvm,
            PlatformTag::Jvm,
            vec![Entry::named(format!("{name}/Api.class"))],
        ));
    world.module = Some(module);
}

#[given("a multiplatform module \"{name}\" with a \"{js}\" target only")]
fn given_js_only(world: &mut AssemblyWorld, name: String, js: String) {
    let module = multiplatform(&name).with_target(CompilationTarget::compiled(
        js,
        PlatformTag::Js,
        vec![Entry::named(format!("{name}.js"))],
    ));
    world.module = Some(module);
}

#[given("a multiplatform module \"{name}\" whose \"{target}\" target failed")]
fn given_failed(world: &mut AssemblyWorld, name: String, target: String) {
    let module = multiplatform(&name).with_target(CompilationTarget::failed(
        target,
        PlatformTag::Jvm,
        "unresolved reference: Bot",
    ));
    world.module = Some(module);
}

#[given("a JVM dependency closure containing \"{first}\" and \"{second}\"")]
fn given_closure(world: &mut AssemblyWorld, first: String, second: String) {
    let closure = DependencyClosure::new(PlatformTag::Jvm).with_artifact(
        "org.dep:dep:1.0".parse().expect("valid coordinate"),
        vec![Entry::named(first), Entry::named(second)],
    );
    module_mut(world).dependency_closure = Some(closure);
}

#[when("the module is assembled for \"{platform}\"")]
fn when_assembled(world: &mut AssemblyWorld, platform: String) {
    let platform: PlatformTag = platform.parse().expect("known platform");
    let assembler = ArtifactAssembler::new(PlatformOutputSelector::new(platform));
    let module = world.module.as_ref().expect("module set");
    world.assembled = Some(assembler.assemble(module));
}

#[when("the build writes artifacts to a scratch directory")]
fn when_built(world: &mut AssemblyWorld) {
    let context = PipelineContext::from_config(ProjectConfig::default()).expect("valid context");
    let modules = vec![world.module.clone().expect("module set")];
    let report = context
        .assemble(&modules, &out_dir(world))
        .expect("task graph runs");
    world.report = Some(report);
}

#[then("the assembly contains exactly \"{names}\"")]
fn then_contains(world: &mut AssemblyWorld, names: String) {
    let assembly = world
        .assembled
        .as_ref()
        .expect("assembly attempted")
        .as_ref()
        .expect("assembly succeeded")
        .as_ref()
        .expect("module qualifies");
    let expected: Vec<&str> = names.split(',').collect();
    assert_eq!(assembly.entry_names().collect::<Vec<_>>(), expected);
}

#[then("no assembly is produced")]
fn then_none(world: &mut AssemblyWorld) {
    let outcome = world
        .assembled
        .as_ref()
        .expect("assembly attempted")
        .as_ref()
        .expect("not an error");
    assert!(outcome.is_none());
}

#[then("the assembly task is skipped")]
fn then_skipped(world: &mut AssemblyWorld) {
    let report = world.report.as_ref().expect("build ran");
    let module = world.module.as_ref().expect("module set");
    assert!(matches!(
        report.tasks.status_of(&TaskId::assemble(&module.id)),
        Some(TaskStatus::Skipped { .. })
    ));
    assert!(report.clone().into_result().is_err());
}

#[then("no artifact file is written")]
fn then_no_artifact(world: &mut AssemblyWorld) {
    let report = world.report.as_ref().expect("build ran");
    assert!(report.artifacts.is_empty());
    let written = std::fs::read_dir(out_dir(world))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(written, 0);
}

#[scenario(path = "tests/features/assembly.feature", name = "Only the designated platform is merged")]
fn scenario_designated_only(world: AssemblyWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/assembly.feature",
    name = "A closure without matching targets still assembles"
)]
fn scenario_closure_only(world: AssemblyWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/assembly.feature",
    name = "Modules without a closure get no assembly"
)]
fn scenario_no_closure(world: AssemblyWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/assembly.feature",
    name = "A failed compilation blocks the artifact"
)]
fn scenario_failed_compilation(world: AssemblyWorld) {
    let _ = world;
}
