use criterion::{criterion_group, criterion_main, Criterion};
use psguard::core::config::Config;
use psguard::core::engine::check_source;
use psguard::core::scanner::ScriptSource;
use psguard::rules::Registry;

fn synthetic_module(functions: usize) -> String {
    let mut out = String::new();
    for i in 0..functions {
        out.push_str(&format!(
            "function Get-Resource{i}\n{{\n    param\n    (\n        [Parameter(Mandatory = $true)]\n        [System.String]\n        $Name\n    )\n\n    if ($null -eq $Name)\n    {{\n        Write-Verbose -Message 'missing name'\n    }}\n    Get-ChildItem -Path $Name | Where-Object {{ $_.Length -gt 0 }}\n}}\n\n"
        ));
    }
    out.push_str("Write-Host 'done'\niex $cmd\n");
    out
}

fn perf_check(c: &mut Criterion) {
    let registry = Registry::builtin();
    let config = Config::default();
    let text = synthetic_module(200);

    c.bench_function("parse_2k_line_module", |b| {
        b.iter(|| ScriptSource::parse("bench.psm1", &text))
    });

    let source = ScriptSource::parse("bench.psm1", &text);
    c.bench_function("check_2k_line_module", |b| {
        b.iter(|| check_source(&source, &registry, &config, &[]))
    });
}

criterion_group!(benches, perf_check);
criterion_main!(benches);
