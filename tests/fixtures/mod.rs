//! Shared fixtures for release pipeline tests
//!
//! Builds a throwaway working root (registry, patch, pristine pbxproj,
//! Xcode skeleton), an in-memory release zip, and a scripted command runner
//! standing in for git and meson.

#![allow(dead_code)]

use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use pygios_release::{CommandOutput, CommandRunner, Invocation, Pipeline, ReleaseConfig, StubTransport, Workspace};
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::ZipWriter;

pub const VERSION: &str = "2.5.0";

/// Create a working root with everything the pipeline reads
pub fn working_root() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    fs::create_dir_all(root.join("patches")).unwrap();
    fs::write(
        root.join("patches/pygame-ce.json"),
        r#"{"supportedVersions": ["2.4.1", "2.5.0"]}"#,
    )
    .unwrap();
    fs::write(root.join("patches/pygame-ce_2.5.0.patch"), "--- a/setup.py\n+++ b/setup.py\n").unwrap();

    fs::create_dir_all(root.join("data")).unwrap();
    fs::write(root.join("data/project.pbxproj"), "// !$*UTF8*$!\n// pristine\n").unwrap();

    let proj = root.join("xcode/pygios.xcodeproj");
    fs::create_dir_all(proj.join("project.xcworkspace/xcuserdata/dev.xcuserdatad")).unwrap();
    fs::write(proj.join("project.xcworkspace/contents.xcworkspacedata"), "<Workspace/>").unwrap();
    fs::create_dir_all(proj.join("xcuserdata/dev.xcuserdatad/xcschemes")).unwrap();
    fs::write(proj.join("xcuserdata/dev.xcuserdatad/xcschemes/xcschememanagement.plist"), "<plist/>").unwrap();
    fs::create_dir_all(proj.join("xcshareddata")).unwrap();
    fs::write(proj.join("xcshareddata/IDEWorkspaceChecks.plist"), "<plist/>").unwrap();
    fs::write(proj.join("project.pbxproj"), "DEVELOPMENT_TEAM = ABCDE12345;\n").unwrap();

    fs::create_dir_all(root.join("xcode/pygios")).unwrap();
    fs::write(root.join("xcode/pygios/main.py"), "import pygame\n").unwrap();

    dir
}

/// Minimal pygame-ce source release as GitHub serves it
pub fn release_zip(version: &str) -> Vec<u8> {
    let prefix = format!("pygame-ce-{}", version);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.add_directory(format!("{}/", prefix), FileOptions::default()).unwrap();
    for (name, contents) in [
        ("setup.py", "# setup"),
        ("meson.build", "project('pygame_ce')"),
        ("src_py/__init__.py", "# pygame"),
        ("src_py/version.py", "ver = '2.5.0'"),
    ] {
        writer.start_file(format!("{}/{}", prefix, name), FileOptions::default()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Which scripted command should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Nothing,
    GitApply,
    MesonSetup(&'static str),
    MesonCompile(&'static str),
}

/// Stand-in for git and meson.
///
/// `meson compile -C build-<target>` writes `src_c/libfoo.dylib` into the
/// build directory, mimicking a real extension-module build.
pub struct ScriptedRunner {
    fail_at: FailAt,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new(fail_at: FailAt) -> Self {
        Self {
            fail_at,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn meson_calls(&self) -> usize {
        self.calls().iter().filter(|c| c.program == "meson").count()
    }

    fn failure(program: &str) -> CommandOutput {
        CommandOutput {
            code: Some(1),
            stdout: format!("{} output", program),
            stderr: format!("{} failed", program),
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        let args: Vec<&str> = invocation.args.iter().map(String::as_str).collect();

        match (invocation.program.as_str(), args.as_slice()) {
            ("git", ["apply", _]) => {
                if self.fail_at == FailAt::GitApply {
                    return Ok(Self::failure("git"));
                }
            }
            ("meson", ["setup", build_dir, ..]) => {
                if self.fail_at == FailAt::MesonSetup(triple_of(build_dir)) {
                    return Ok(Self::failure("meson"));
                }
                fs::create_dir_all(invocation.cwd.join(build_dir))?;
            }
            ("meson", ["compile", "-C", build_dir]) => {
                if self.fail_at == FailAt::MesonCompile(triple_of(build_dir)) {
                    return Ok(Self::failure("meson"));
                }
                let src_c = invocation.cwd.join(build_dir).join("src_c");
                fs::create_dir_all(&src_c)?;
                fs::write(src_c.join("libfoo.dylib"), format!("native module for {}", build_dir))?;
            }
            _ => return Err(io::Error::new(io::ErrorKind::NotFound, invocation.to_string())),
        }

        Ok(CommandOutput::success())
    }
}

fn triple_of(build_dir: &str) -> &'static str {
    match build_dir {
        "build-ios-arm64" => "ios-arm64",
        "build-ios-arm64-simulator" => "ios-arm64-simulator",
        _ => "unknown",
    }
}

/// Pipeline wired to the stubs, plus handles for assertions
pub struct Harness {
    pub root: TempDir,
    pub transport: Arc<StubTransport>,
    pub runner: Arc<ScriptedRunner>,
    pub pipeline: Pipeline,
}

impl Harness {
    pub fn new(fail_at: FailAt) -> Self {
        Self::with(StubTransport::with_body(release_zip(VERSION)), fail_at, ReleaseConfig::default())
    }

    pub fn with(transport: StubTransport, fail_at: FailAt, config: ReleaseConfig) -> Self {
        let root = working_root();
        let transport = Arc::new(transport);
        let runner = Arc::new(ScriptedRunner::new(fail_at));
        let workspace = Workspace::new(root.path(), config);
        let pipeline = Pipeline::new(workspace, transport.clone(), runner.clone());
        Self {
            root,
            transport,
            runner,
            pipeline,
        }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }
}

/// File names directly inside `dir`
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Entry names of a zip file
pub fn zip_entries(path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    archive.file_names().map(String::from).collect()
}
