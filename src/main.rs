//! Strath CLI - Council Area Report Pipeline
//!
//! This is a demonstration CLI for the Strath library. The bundled
//! content builder snapshots each sheet's slice for an area; real
//! deployments wire their own builder and renderer into
//! [`ReportPipeline`].

use anyhow::Context;
use serde_json::Value;
use strath::prelude::*;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        return;
    }

    let result = match args[1].as_str() {
        "areas" => {
            list_areas();
            Ok(())
        }
        "validate" => {
            if args.len() < 3 {
                eprintln!("Error: Please specify a dataset file");
                std::process::exit(2);
            }
            cmd_validate(&args[2])
        }
        "run" => {
            if args.len() < 3 {
                eprintln!("Error: Please specify a dataset file");
                eprintln!(
                    "Usage: {} run <dataset.json> [--workers N] [--fields N] [--strict-schema] [--temp DIR] [--out DIR]",
                    args[0]
                );
                std::process::exit(2);
            }
            cmd_run(&args[2], &args[3..])
        }
        "help" | "--help" | "-h" => {
            print_usage(&args[0]);
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage(&args[0]);
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn print_usage(program: &str) {
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  areas                      List the 32 council areas in report order");
    println!("  validate <dataset.json>    Check a dataset against the expectation spec");
    println!("  run <dataset.json>         Run the full two-stage report pipeline");
    println!("  help                       Show this help message");
    println!();
    println!("Run options:");
    println!("  --workers N       Worker thread count (default: hardware concurrency)");
    println!("  --fields N        Contracted content field count (default: derived)");
    println!("  --strict-schema   Abort the run on any schema validation failure");
    println!("  --temp DIR        Artifact handoff directory (default: temp)");
    println!("  --out DIR         Rendered document directory (default: output)");
}

fn list_areas() {
    println!("Council areas ({} total):", COUNCIL_AREAS.len());
    println!();
    for area in COUNCIL_AREAS {
        println!("  {:<24} -> {}", area, output_name(area, "-profile.json"));
    }
}

fn cmd_validate(path: &str) -> anyhow::Result<()> {
    let dataset =
        Dataset::from_json_file(path).with_context(|| format!("loading dataset '{}'", path))?;
    let spec = default_spec(&dataset);

    let report = check(&dataset, &spec);
    println!("{}", report.summary());
    for line in report.detailed_failures() {
        println!("  {}", line);
    }
    println!("({} ms)", report.duration_ms);

    if !report.failing_errors().is_empty() {
        anyhow::bail!("dataset does not conform to the expectation spec");
    }
    Ok(())
}

fn cmd_run(path: &str, flags: &[String]) -> anyhow::Result<()> {
    let dataset =
        Dataset::from_json_file(path).with_context(|| format!("loading dataset '{}'", path))?;
    let spec = default_spec(&dataset);

    // The demo builder emits the area field plus one field per data
    // sheet, so the derived contract is sheet count dependent.
    let derived_fields = 1 + dataset
        .sheets()
        .filter(|(name, _)| name.as_str() != UPDATES_SHEET)
        .count();

    let mut options = PipelineOptions::new().with_expected_fields(derived_fields);
    options = parse_run_flags(options, flags)?;
    options = options.with_output_suffix("-profile.json");

    println!(
        "Running pipeline: {} areas, {} contracted fields",
        COUNCIL_AREAS.len(),
        options.expected_fields
    );

    let pipeline =
        ReportPipeline::new(snapshot_builder, JsonDocumentRenderer).with_options(options);

    let summary = pipeline.run(dataset, &spec, &council_areas())?;

    println!("{}", summary.validation.summary());
    println!(
        "Rendered {} document(s) in {:.2}s",
        summary.outputs.len(),
        summary.elapsed.as_secs_f64()
    );
    Ok(())
}

fn parse_run_flags(
    mut options: PipelineOptions,
    flags: &[String],
) -> anyhow::Result<PipelineOptions> {
    let mut i = 0;
    while i < flags.len() {
        match flags[i].as_str() {
            "--workers" => {
                let value = flag_value(flags, i, "--workers")?;
                options = options.with_workers(value.parse().context("--workers expects a number")?);
                i += 2;
            }
            "--fields" => {
                let value = flag_value(flags, i, "--fields")?;
                options =
                    options.with_expected_fields(value.parse().context("--fields expects a number")?);
                i += 2;
            }
            "--strict-schema" => {
                options = options.with_schema_gate(SchemaGate::Fatal);
                i += 1;
            }
            "--temp" => {
                options = options.with_temp_dir(flag_value(flags, i, "--temp")?);
                i += 2;
            }
            "--out" => {
                options = options.with_output_dir(flag_value(flags, i, "--out")?);
                i += 2;
            }
            other => anyhow::bail!("unknown option: {}", other),
        }
    }
    Ok(options)
}

fn flag_value<'a>(flags: &'a [String], i: usize, name: &str) -> anyhow::Result<&'a str> {
    flags
        .get(i + 1)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow::anyhow!("{} expects a value", name))
}

/// Default expectation spec for a dataset: every data sheet must be
/// non-empty, and the `updates` sheet is advisory.
fn default_spec(dataset: &Dataset) -> ExpectationSpec {
    let mut spec = ExpectationSpec::new();
    for (name, _) in dataset.sheets() {
        let rule = Rule::new(
            format!("{}-non-empty", name),
            Target::sheet(name.clone()),
            Check::NonEmpty,
        );
        spec = spec.rule(if name == UPDATES_SHEET {
            rule.warning()
        } else {
            rule
        });
    }
    spec
}

/// Demo content builder: one field per data sheet, holding that sheet's
/// slice for the area (rows whose `area` column matches, or the object
/// entry keyed by the area name), plus the mandatory `area` field.
fn snapshot_builder(area: &str, dataset: &Dataset) -> Result<ContentArtifact, BuildError> {
    let mut artifact = ContentArtifact::new(area);
    for (name, content) in dataset.sheets() {
        if name == UPDATES_SHEET {
            continue;
        }
        artifact.set(name.clone(), slice_for_area(content, area));
    }
    Ok(artifact)
}

fn slice_for_area(sheet: &Value, area: &str) -> Value {
    match sheet {
        Value::Array(rows) => Value::Array(
            rows.iter()
                .filter(|row| row.get("area").and_then(Value::as_str) == Some(area))
                .cloned()
                .collect(),
        ),
        Value::Object(map) => map.get(area).cloned().unwrap_or(Value::Null),
        other => other.clone(),
    }
}
