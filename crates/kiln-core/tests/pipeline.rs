//! Integration tests for the build pipeline.
//!
//! Runs `Builder` end to end against a fake compiler so scheduling,
//! aggregation and the compile-then-link contract can be checked without
//! spawning real processes.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use kiln_core::{BuildConfig, Builder, Error, ProcessError, ProcessOutput, ProcessRunner};
use tempfile::TempDir;
use walkdir::WalkDir;

// =============================================================================
// Test Helpers
// =============================================================================

/// Fake compiler.
///
/// Compile calls (`-c ...`) sleep briefly, write an empty object file and
/// track overlap; link calls are only recorded.
#[derive(Default)]
struct FakeCompiler {
    running: AtomicUsize,
    peak: AtomicUsize,
    compiles: Mutex<Vec<Vec<OsString>>>,
    links: Mutex<Vec<Vec<OsString>>>,
    fail_suffix: Option<String>,
}

impl FakeCompiler {
    fn failing_on(suffix: &str) -> Self {
        Self {
            fail_suffix: Some(suffix.to_string()),
            ..Default::default()
        }
    }

    fn compile_count(&self) -> usize {
        self.compiles.lock().unwrap().len()
    }

    fn link_calls(&self) -> Vec<Vec<OsString>> {
        self.links.lock().unwrap().clone()
    }
}

fn os(path: impl AsRef<Path>) -> OsString {
    path.as_ref().as_os_str().to_owned()
}

impl ProcessRunner for FakeCompiler {
    fn execute(&self, _program: &str, args: &[OsString]) -> io::Result<ProcessOutput> {
        if args.first().and_then(|a| a.to_str()) != Some("-c") {
            self.links.lock().unwrap().push(args.to_vec());
            return Ok(ProcessOutput::success(""));
        }

        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(15));
        self.running.fetch_sub(1, Ordering::SeqCst);

        self.compiles.lock().unwrap().push(args.to_vec());

        let source = Path::new(&args[1]);
        if !source.exists() {
            return Ok(ProcessOutput::failure(
                1,
                format!("{}: No such file or directory", source.display()),
            ));
        }
        if let Some(suffix) = &self.fail_suffix {
            if source.to_string_lossy().ends_with(suffix.as_str()) {
                return Ok(ProcessOutput::failure(
                    1,
                    format!("{}:1:1: error: unknown type name 'oops'", source.display()),
                ));
            }
        }

        fs::write(&args[3], b"")?;
        Ok(ProcessOutput::success(""))
    }
}

/// Scratch project with a source tree and an output root.
struct TestProject {
    temp: TempDir,
}

impl TestProject {
    fn new(files: &[&str]) -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir_all(temp.path().join("src")).unwrap();
        for file in files {
            let path = temp.path().join("src").join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "int f(void) { return 0; }\n").unwrap();
        }
        Self { temp }
    }

    fn src(&self) -> PathBuf {
        self.temp.path().join("src")
    }

    fn out(&self) -> PathBuf {
        self.temp.path().join("build")
    }

    fn config(&self) -> BuildConfig {
        BuildConfig::new(self.src(), self.out())
    }
}

fn builder(config: BuildConfig, runner: &Arc<FakeCompiler>) -> Builder {
    Builder::new(config).unwrap().with_runner(Arc::clone(runner))
}

fn tree_listing(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .map(|e| e.unwrap().path().strip_prefix(root).unwrap().to_path_buf())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_empty_tree_is_noop() {
    let project = TestProject::new(&[]);
    fs::write(project.src().join("README"), "no sources here").unwrap();
    let runner = Arc::new(FakeCompiler::default());

    let summary = builder(project.config(), &runner).run().unwrap();

    assert!(summary.is_none());
    assert_eq!(runner.compile_count(), 0);
    assert!(runner.link_calls().is_empty());
}

#[test]
fn test_concurrency_bound_and_invocation_count() {
    let files: Vec<String> = (0..10).map(|i| format!("mod{i}/unit{i}.c")).collect();
    let refs: Vec<&str> = files.iter().map(String::as_str).collect();
    let project = TestProject::new(&refs);

    for jobs in [1, 2, 4, 16] {
        let runner = Arc::new(FakeCompiler::default());
        let config = BuildConfig {
            jobs,
            ..project.config()
        };

        let summary = builder(config, &runner).run().unwrap().unwrap();

        assert_eq!(runner.compile_count(), 10, "jobs = {jobs}");
        assert_eq!(summary.compiled, 10);
        let peak = runner.peak.load(Ordering::SeqCst);
        assert!(peak <= jobs, "peak {peak} exceeded jobs {jobs}");
        if jobs > 1 {
            assert!(peak >= 2, "compiles never overlapped with jobs {jobs}");
        }
    }
}

#[test]
fn test_link_receives_every_artifact() {
    let project = TestProject::new(&["a.c", "b/b.c", "c/d/e.c"]);
    let runner = Arc::new(FakeCompiler::default());

    let summary = builder(project.config(), &runner).run().unwrap().unwrap();

    let links = runner.link_calls();
    assert_eq!(links.len(), 1);

    let out = project.out();
    let expected: HashSet<OsString> = [out.join("a.o"), out.join("b/b.o"), out.join("c/d/e.o")]
        .iter()
        .map(os)
        .collect();
    let linked: HashSet<OsString> = links[0][2..5].iter().cloned().collect();
    assert_eq!(linked, expected);

    let summarized: HashSet<OsString> = summary.artifacts.iter().map(os).collect();
    assert_eq!(summarized, expected);
    assert_eq!(summary.binary, out.join("program"));
}

#[test]
fn test_failure_skips_link_but_runs_all_tasks() {
    let project = TestProject::new(&["a.c", "broken.c", "c.c", "d.c", "e.c"]);
    let runner = Arc::new(FakeCompiler::failing_on("broken.c"));
    let config = BuildConfig {
        jobs: 2,
        ..project.config()
    };

    let err = builder(config, &runner).run().unwrap_err();

    assert_eq!(runner.compile_count(), 5);
    assert!(runner.link_calls().is_empty());
    assert_eq!(err.source_path(), Some(&project.src().join("broken.c")));
    match err.first_failure() {
        Error::Compile {
            source: ProcessError::Failed { output, .. },
            ..
        } => assert!(output.contains("unknown type name")),
        other => panic!("unexpected failure: {other}"),
    }
}

#[test]
fn test_documented_scenario() {
    let project = TestProject::new(&["main.c", "util/helpers.c"]);
    let runner = Arc::new(FakeCompiler::default());
    let include = project.src().join("include");
    let config = BuildConfig {
        flags: "-Wall".to_string(),
        include_dirs: vec![include.clone()],
        jobs: 2,
        binary_name: "app".to_string(),
        ..project.config()
    };

    let summary = builder(config, &runner).run().unwrap().unwrap();

    let src = project.src();
    let out = project.out();
    let compiles = runner.compiles.lock().unwrap().clone();
    assert_eq!(compiles.len(), 2);

    for args in &compiles {
        let source = PathBuf::from(&args[1]);
        let self_dir = source.parent().unwrap();
        assert!(args.contains(&OsString::from("-Wall")));
        let includes: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .filter(|a| a.starts_with("-I"))
            .collect();
        assert_eq!(
            includes,
            vec![
                format!("-I{}", include.display()),
                format!("-I{}", src.display()),
                format!("-I{}", self_dir.display()),
            ]
        );
    }

    let links = runner.link_calls();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0][0], "-o");
    assert_eq!(links[0][1], os(out.join("app")));
    let objects: HashSet<&OsString> = links[0][2..4].iter().collect();
    assert!(objects.contains(&os(out.join("main.o"))));
    assert!(objects.contains(&os(out.join("util/helpers.o"))));
    assert_eq!(links[0][4], "-Wall");
    assert_eq!(summary.binary, out.join("app"));
}

#[test]
fn test_directory_creation_failure_blocks_link() {
    let project = TestProject::new(&["main.c", "util/helpers.c"]);
    fs::create_dir_all(project.out()).unwrap();
    fs::write(project.out().join("util"), "in the way").unwrap();
    let runner = Arc::new(FakeCompiler::default());

    let err = builder(project.config(), &runner).run().unwrap_err();

    assert!(matches!(err, Error::Batch { .. }));
    assert!(matches!(
        err.first_failure(),
        Error::DirectoryCreation { .. }
    ));
    assert_eq!(runner.compile_count(), 1, "sibling task still compiles");
    assert!(runner.link_calls().is_empty());
}

#[test]
fn test_rebuild_reproduces_output_tree() {
    let project = TestProject::new(&["main.c", "net/http.c", "net/tcp/conn.c", "fs/io.c"]);
    let runner = Arc::new(FakeCompiler::default());

    builder(project.config(), &runner).run().unwrap().unwrap();
    let first = tree_listing(&project.out());

    builder(project.config(), &runner).run().unwrap().unwrap();
    let second = tree_listing(&project.out());

    assert_eq!(first, second);
    assert!(first.contains(&PathBuf::from("net/tcp/conn.o")));
    assert_eq!(runner.compile_count(), 8, "every run recompiles everything");
}

#[test]
fn test_single_file_source_root() {
    let project = TestProject::new(&["main.c"]);
    let runner = Arc::new(FakeCompiler::default());
    let config = BuildConfig::new(project.src().join("main.c"), project.out());

    let summary = builder(config, &runner).run().unwrap().unwrap();

    assert_eq!(summary.artifacts, vec![project.out().join("main.o")]);
    assert!(project.out().join("main.o").is_file());
}

#[cfg(unix)]
#[test]
fn test_non_utf8_file_names_reach_the_compiler() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let project = TestProject::new(&["main.c"]);
    let odd = project.src().join(OsStr::from_bytes(b"caf\xe9.c"));
    fs::write(&odd, "int g(void) { return 1; }\n").unwrap();
    let runner = Arc::new(FakeCompiler::default());

    let summary = builder(project.config(), &runner).run().unwrap().unwrap();

    assert_eq!(summary.compiled, 2);
    assert!(
        project
            .out()
            .join(OsStr::from_bytes(b"caf\xe9.o"))
            .is_file()
    );
    let links = runner.link_calls();
    assert!(links[0].contains(&os(project.out().join(OsStr::from_bytes(b"caf\xe9.o")))));
}
