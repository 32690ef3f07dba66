use psguard::core::config::Config;
use psguard::core::engine::{run_check, CheckOptions};
use psguard::core::scanner::{collect_script_files, ScriptSource};
use psguard::rules::Registry;
use rustc_hash::FxHashSet;
use std::fs;
use tempfile::TempDir;

fn write(dir: &std::path::Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, content).expect("write");
}

#[test]
fn walker_filters_extensions_and_state_dirs() {
    let tmp = TempDir::new().expect("tempdir");
    write(tmp.path(), "a.ps1", "Get-Item -Path $p\n");
    write(tmp.path(), "module/resource.psm1", "Get-Item -Path $p\n");
    write(tmp.path(), "notes.md", "# prose\n");
    write(tmp.path(), ".psguard/data/hidden.ps1", "iex $x\n");
    write(tmp.path(), "target/build.ps1", "iex $x\n");
    write(tmp.path(), ".git/hook.ps1", "iex $x\n");

    let files = collect_script_files(tmp.path(), &[]).expect("walk");
    let names: Vec<String> = files
        .iter()
        .map(|p| {
            p.strip_prefix(tmp.path())
                .unwrap()
                .display()
                .to_string()
                .replace('\\', "/")
        })
        .collect();
    assert_eq!(names, vec!["a.ps1", "module/resource.psm1"]);
}

#[test]
fn exclusions_from_config_apply() {
    let tmp = TempDir::new().expect("tempdir");
    write(tmp.path(), "src/good.ps1", "Write-Host 'x'\n");
    write(tmp.path(), "vendor/third.ps1", "Write-Host 'x'\n");

    let config = Config::parse("[check]\nexclude = [\"vendor/\"]\n").unwrap();
    let registry = Registry::builtin();
    let opts = CheckOptions {
        paths: vec![tmp.path().to_path_buf()],
        only_rules: vec!["PSG006".to_string()],
    };
    let report = run_check(&registry, &config, &opts, &FxHashSet::default()).expect("check");
    assert_eq!(report.files_scanned, 1);
    assert_eq!(report.findings.len(), 1);
    assert!(report.findings[0].file.contains("good.ps1"));
}

#[test]
fn duplicate_path_arguments_scan_once() {
    let tmp = TempDir::new().expect("tempdir");
    write(tmp.path(), "one.ps1", "Write-Host 'x'\n");

    let registry = Registry::builtin();
    let config = Config::default();
    let opts = CheckOptions {
        paths: vec![tmp.path().to_path_buf(), tmp.path().join("one.ps1")],
        only_rules: vec!["PSG006".to_string()],
    };
    let report = run_check(&registry, &config, &opts, &FxHashSet::default()).expect("check");
    assert_eq!(report.files_scanned, 1);
    assert_eq!(report.findings.len(), 1);
}

#[test]
fn missing_path_is_an_error() {
    let registry = Registry::builtin();
    let config = Config::default();
    let opts = CheckOptions {
        paths: vec!["/nonexistent/psguard/path".into()],
        only_rules: Vec::new(),
    };
    let err = run_check(&registry, &config, &opts, &FxHashSet::default()).unwrap_err();
    assert!(err.to_string().contains("no such path"));
}

#[test]
fn baseline_hashes_filter_and_count() {
    let tmp = TempDir::new().expect("tempdir");
    write(tmp.path(), "w.ps1", "iex $one\niex $two\n");

    let registry = Registry::builtin();
    let config = Config::default();
    let opts = CheckOptions {
        paths: vec![tmp.path().to_path_buf()],
        only_rules: Vec::new(),
    };

    let full = run_check(&registry, &config, &opts, &FxHashSet::default()).expect("check");
    assert_eq!(full.findings.len(), 2);
    assert_eq!(full.suppressed, 0);

    let mut baseline = FxHashSet::default();
    baseline.insert(full.findings[0].baseline_hash());
    let filtered = run_check(&registry, &config, &opts, &baseline).expect("check");
    assert_eq!(filtered.findings.len(), 1);
    assert_eq!(filtered.suppressed, 1);
}

#[test]
fn reports_are_deterministic_across_runs() {
    let tmp = TempDir::new().expect("tempdir");
    write(tmp.path(), "b.ps1", "Write-Host 'x'\n$y = $x -eq $null\n");
    write(tmp.path(), "a.ps1", "gci -Path $p\n");

    let registry = Registry::builtin();
    let config = Config::default();
    let opts = CheckOptions {
        paths: vec![tmp.path().to_path_buf()],
        only_rules: Vec::new(),
    };

    let render = || {
        let report = run_check(&registry, &config, &opts, &FxHashSet::default()).expect("check");
        serde_json::to_string(&report.to_json(true)).unwrap()
    };
    assert_eq!(render(), render());
}

#[test]
fn findings_point_back_into_the_guide() {
    let source = ScriptSource::parse("t.ps1", "Write-Host 'x'\n");
    let registry = Registry::builtin();
    let config = Config::default();
    let findings =
        psguard::core::engine::check_source(&source, &registry, &config, &[]);
    for finding in findings {
        let anchor = finding
            .help
            .split('#')
            .nth(1)
            .expect("help carries an anchor");
        assert!(
            psguard::core::docs::get_fragment("BEST_PRACTICES.md", Some(anchor)).is_some(),
            "finding help must resolve in the guide: {}",
            finding.help
        );
    }
}
