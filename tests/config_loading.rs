//! Behaviour-driven tests for project configuration loading.

use std::cell::RefCell;
use std::convert::Infallible;
use std::str::FromStr;

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;
use trellis::{CONFIG_FILE_NAME, ProjectConfig};
use trellis_common::PlatformTag;

struct ConfigWorld {
    dir: TempDir,
    result: RefCell<Option<Result<ProjectConfig, String>>>,
}

impl ConfigWorld {
    fn config_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().join(CONFIG_FILE_NAME))
            .unwrap_or_else(|path| panic!("temp path {path:?} is not UTF-8"))
    }

    fn write(&self, contents: &str) {
        std::fs::write(self.config_path(), contents).expect("write configuration");
    }

    fn loaded(&self) -> ProjectConfig {
        match self.result.borrow().as_ref() {
            Some(Ok(config)) => config.clone(),
            Some(Err(error)) => panic!("expected configuration loading to succeed: {error}"),
            None => panic!("configuration should be loaded"),
        }
    }
}

#[fixture]
fn world() -> ConfigWorld {
    ConfigWorld {
        dir: TempDir::new().expect("temp dir"),
        result: RefCell::new(None),
    }
}

#[derive(Debug)]
struct Quoted(String);

impl FromStr for Quoted {
    type Err = Infallible;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(Self(input.trim().trim_matches('"').to_owned()))
    }
}

#[given("no configuration file is written")]
fn no_file(world: &ConfigWorld) {
    let _ = world;
}

#[given("the configuration allows module {module} through the API gate")]
fn allow_module(world: &ConfigWorld, module: Quoted) {
    world.write(&format!("[api]\nallow = [\"{}\"]\n", module.0));
}

#[given("the configuration includes unknown fields")]
fn unknown_fields(world: &ConfigWorld) {
    world.write("unexpected = true\nversion = \"1.0.0\"\n");
}

#[given("the configuration designates platform {platform}")]
fn designate_platform(world: &ConfigWorld, platform: Quoted) {
    world.write(&format!("designated_platform = \"{}\"\n", platform.0));
}

#[when("the project configuration is loaded")]
fn load(world: &ConfigWorld) {
    let outcome = ProjectConfig::load_from(&world.config_path()).map_err(|err| err.to_string());
    world.result.borrow_mut().replace(outcome);
}

#[then("the designated platform is jvm")]
fn designated_is_jvm(world: &ConfigWorld) {
    assert_eq!(world.loaded().designated_platform, PlatformTag::Jvm);
}

#[then("the optional aspects are {names}")]
fn optional_aspects(world: &ConfigWorld, names: Quoted) {
    assert_eq!(world.loaded().aspects.optional.join(","), names.0);
}

#[then("the API allow-list contains {module}")]
fn allow_list_contains(world: &ConfigWorld, module: Quoted) {
    let allowed = world.loaded().allowed_modules().expect("valid module names");
    assert!(
        allowed.iter().any(|id| id.as_str() == module.0),
        "expected {} in {allowed:?}",
        module.0
    );
}

#[then("a configuration error mentioning {snippet} is reported")]
fn error_mentions(world: &ConfigWorld, snippet: Quoted) {
    match world.result.borrow().as_ref() {
        Some(Err(error)) => assert!(
            error.contains(snippet.0.as_str()),
            "expected error '{error}' to mention '{}'",
            snippet.0
        ),
        Some(Ok(config)) => {
            panic!("expected configuration loading to fail but succeeded with {config:?}")
        }
        None => panic!("configuration should be loaded"),
    }
}

#[scenario("tests/features/config_loading.feature", index = 0)]
fn scenario_defaults(world: ConfigWorld) {
    let _ = world;
}

#[scenario("tests/features/config_loading.feature", index = 1)]
fn scenario_allow_list(world: ConfigWorld) {
    let _ = world;
}

#[scenario("tests/features/config_loading.feature", index = 2)]
fn scenario_unknown_fields(world: ConfigWorld) {
    let _ = world;
}

#[scenario("tests/features/config_loading.feature", index = 3)]
fn scenario_unknown_platform(world: ConfigWorld) {
    let _ = world;
}
