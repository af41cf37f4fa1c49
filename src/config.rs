//! Tailor Config - Compiler Invocation Contract
//!
//! Declares the flags the buildpack compiler understands, derives the paths
//! staging reads and writes, and renders the command line that runs the
//! compiler.

use crate::hashing::buildpack_dir_name;
use crate::schema::{ConfigSchema, FlagError, OptionRef};
use crate::validation::{validate_schema, ValidationError};

pub const APP_DIR_FLAG: &str = "appDir";
pub const OUTPUT_DROPLET_DIR_FLAG: &str = "outputDropletDir";
pub const OUTPUT_METADATA_DIR_FLAG: &str = "outputMetadataDir";
pub const BUILDPACKS_DIR_FLAG: &str = "buildpacksDir";
pub const BUILD_ARTIFACTS_CACHE_DIR_FLAG: &str = "buildArtifactsCacheDir";
pub const BUILDPACK_ORDER_FLAG: &str = "buildpackOrder";

/// Fixed defaults. `buildpackOrder` is seeded from the buildpack list instead.
pub const DEFAULTS: &[(&str, &str)] = &[
    (APP_DIR_FLAG, "/app"),
    (OUTPUT_DROPLET_DIR_FLAG, "/tmp/droplet"),
    (OUTPUT_METADATA_DIR_FLAG, "/tmp/result"),
    (BUILDPACKS_DIR_FLAG, "/tmp/buildpacks"),
    (BUILD_ARTIFACTS_CACHE_DIR_FLAG, "/tmp/cache"),
];

pub const COMPILER_PATH: &str = "/tmp/compiler";
pub const SCHEMA_NAME: &str = "linux-smelter";
pub const RESULT_JSON_FILE: &str = "result.json";

pub fn default_for(name: &str) -> Option<&'static str> {
    DEFAULTS
        .iter()
        .find(|(flag, _)| *flag == name)
        .map(|(_, default)| *default)
}

#[derive(Debug, Clone)]
pub struct TailorConfig {
    schema: ConfigSchema,
    compiler_path: String,

    app_dir: OptionRef,
    output_droplet_dir: OptionRef,
    output_metadata_dir: OptionRef,
    buildpacks_dir: OptionRef,
    build_artifacts_cache_dir: OptionRef,
    buildpack_order: OptionRef,
}

impl TailorConfig {
    /// Declare every compiler flag; `buildpacks` seeds `buildpackOrder`
    pub fn new<S: AsRef<str>>(buildpacks: &[S]) -> Self {
        let mut schema = ConfigSchema::new(SCHEMA_NAME);

        let app_dir = schema.define(
            APP_DIR_FLAG,
            fixed_default(APP_DIR_FLAG),
            "directory containing raw app bits",
        );
        let output_droplet_dir = schema.define(
            OUTPUT_DROPLET_DIR_FLAG,
            fixed_default(OUTPUT_DROPLET_DIR_FLAG),
            "directory in which to write the smelted app bits",
        );
        let output_metadata_dir = schema.define(
            OUTPUT_METADATA_DIR_FLAG,
            fixed_default(OUTPUT_METADATA_DIR_FLAG),
            "directory in which to place smelting result metadata",
        );
        let buildpacks_dir = schema.define(
            BUILDPACKS_DIR_FLAG,
            fixed_default(BUILDPACKS_DIR_FLAG),
            "directory containing the buildpacks to try",
        );
        let build_artifacts_cache_dir = schema.define(
            BUILD_ARTIFACTS_CACHE_DIR_FLAG,
            fixed_default(BUILD_ARTIFACTS_CACHE_DIR_FLAG),
            "directory to store cached artifacts to buildpacks",
        );

        let order: Vec<&str> = buildpacks.iter().map(AsRef::as_ref).collect();
        let buildpack_order = schema.define(
            BUILDPACK_ORDER_FLAG,
            order.join(","),
            "comma-separated list of buildpacks, to be tried in order",
        );

        Self {
            schema,
            compiler_path: COMPILER_PATH.to_string(),
            app_dir,
            output_droplet_dir,
            output_metadata_dir,
            buildpacks_dir,
            build_artifacts_cache_dir,
            buildpack_order,
        }
    }

    // --- Override step ---

    /// Override one flag by name
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), FlagError> {
        self.schema.set(name, value)
    }

    /// Apply compiler-style flags (`-appDir=/src`), returning leftover args
    pub fn parse<I, S>(&mut self, args: I) -> Result<Vec<String>, FlagError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.schema.parse(args)
    }

    /// Read-only view of every flag, for enumeration
    pub fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    // --- Accessors ---

    /// Directory holding the raw app bits
    pub fn app_dir(&self) -> &str {
        self.schema.value(self.app_dir)
    }

    /// Where the compiled droplet is written
    pub fn output_droplet_dir(&self) -> &str {
        self.schema.value(self.output_droplet_dir)
    }

    /// The `outputMetadataDir` flag
    pub fn result_json_dir(&self) -> &str {
        self.schema.value(self.output_metadata_dir)
    }

    /// `<outputMetadataDir>/result.json`, cleaned
    pub fn result_json_path(&self) -> String {
        join(self.result_json_dir(), RESULT_JSON_FILE)
    }

    /// Directory the buildpacks are unpacked in
    pub fn buildpacks_dir(&self) -> &str {
        self.schema.value(self.buildpacks_dir)
    }

    /// Cache shared across builds by the buildpacks
    pub fn build_artifacts_cache_dir(&self) -> &str {
        self.schema.value(self.build_artifacts_cache_dir)
    }

    /// Fixed compiler install location
    pub fn compiler_path(&self) -> &str {
        &self.compiler_path
    }

    /// Executable the script invokes
    pub fn compiler_command(&self) -> String {
        join(self.compiler_path(), "run")
    }

    /// Buildpacks to try, first match wins.
    ///
    /// An empty `buildpackOrder` yields `[""]`, not an empty list; the
    /// compiler receives the raw flag and decides what that means.
    pub fn buildpack_order(&self) -> Vec<String> {
        self.schema
            .value(self.buildpack_order)
            .split(',')
            .map(str::to_string)
            .collect()
    }

    /// `<buildpacksDir>/<md5 hex of identifier>`, cleaned
    pub fn buildpack_path(&self, buildpack: &str) -> String {
        join(self.buildpacks_dir(), &buildpack_dir_name(buildpack))
    }

    // --- Operations ---

    /// Fail with every flag that holds an empty value
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_schema(&self.schema)
    }

    /// Command line for the compiler: `<compiler>/run -flag='value' ...`.
    ///
    /// Values are wrapped in single quotes verbatim; embedded quotes are not
    /// escaped.
    pub fn script(&self) -> String {
        let mut argv = vec![self.compiler_command()];
        self.schema.visit_all(|name, value| {
            argv.push(format!("-{}='{}'", name, value));
        });
        argv.join(" ")
    }
}

fn fixed_default(name: &str) -> &'static str {
    default_for(name).unwrap_or_default()
}

/// Slash-join for paths inside the Linux staging container, then clean
fn join(dir: &str, name: &str) -> String {
    let joined = match (dir.is_empty(), name.is_empty()) {
        (true, true) => return String::new(),
        (true, false) => name.to_string(),
        (false, true) => dir.to_string(),
        (false, false) => format!("{}/{}", dir, name),
    };
    clean(&joined)
}

/// Lexical cleanup: collapse `//`, drop `.`, resolve `..`.
///
/// A rooted path never climbs above `/`; a relative one keeps leading `..`
/// segments it cannot resolve. An empty result is `.`.
fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = vec![];

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last().copied() {
                Some(last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            _ => segments.push(segment),
        }
    }

    let body = segments.join("/");
    match (rooted, body.is_empty()) {
        (true, _) => format!("/{}", body),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}
