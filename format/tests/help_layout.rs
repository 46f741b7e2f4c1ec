use std::sync::Arc;

use option_schema_core::*;
use option_schema_format::*;

fn plain_config() -> FormatterConfig {
    FormatterConfig {
        styles: HelpStyles::plain(),
        ..Default::default()
    }
}

fn sample_schema() -> Schema {
    let nested = Arc::new(
        Schema::new().with_option("dry", OptionDef::flag().with_names(["-n", "--dry-run"])),
    );
    Schema::new()
        .with_option(
            "help",
            OptionDef::help()
                .with_names(["-h", "--help"])
                .with_synopsis("Print this help."),
        )
        .with_option(
            "output",
            OptionDef::single()
                .with_names(["-o", "--output-file"])
                .with_param_name("file")
                .with_synopsis("Where to write the report."),
        )
        .with_option(
            "format",
            OptionDef::single()
                .with_names(["-f", "--format"])
                .with_choices(["json", "yaml"])
                .with_default("json")
                .with_requires("output"),
        )
        .with_option(
            "tags",
            OptionDef::array(ArraySpec {
                unique: true,
                ..Default::default()
            })
            .with_names(["-t", "--tags"])
            .with_param_name("tag"),
        )
        .with_option(
            "run",
            OptionDef::command(Some(NestedSchema::Eager(nested)))
                .with_names(["run"])
                .with_synopsis("Run the job."),
        )
}

fn groups_only() -> Vec<HelpSection> {
    vec![HelpSection::Groups(GroupsSection::default())]
}

/// Offset of the first non-space character after `from` on `line`.
fn column_after(line: &str, from: usize) -> Option<usize> {
    line[from..]
        .find(|c: char| c != ' ')
        .map(|offset| from + offset)
}

#[test]
fn test_param_column_starts_after_widest_names_cell() {
    let schema = sample_schema();
    let message = HelpFormatter::new(&schema)
        .with_config(plain_config())
        .format(&groups_only());
    let text = message.wrap(None, true);

    let widest_names = ["-h, --help", "-o, --output-file", "-f, --format", "-t, --tags", "run"]
        .iter()
        .map(|names| names.len())
        .max()
        .unwrap();
    let param_start = 2 + widest_names + 2;

    for line in text.lines() {
        let names_end = line[2..].find("  ").map(|offset| offset + 2).unwrap();
        let next = column_after(line, names_end).unwrap();
        if line.contains('<') {
            let template = line.find(['<', '[']).unwrap();
            assert_eq!(template, param_start, "{line}");
        }
        assert!(next >= param_start, "{line}");
    }
}

#[test]
fn test_description_column_is_shared() {
    let schema = sample_schema();
    let message = HelpFormatter::new(&schema)
        .with_config(plain_config())
        .format(&groups_only());
    let text = message.wrap(None, true);
    let starts: Vec<usize> = text
        .lines()
        .filter_map(|line| line.find(|c: char| c.is_ascii_uppercase()))
        .collect();
    assert!(!starts.is_empty());
    assert!(starts.iter().all(|&start| start == starts[0]), "{text}");
}

#[test]
fn test_full_help_message() {
    let schema = sample_schema();
    let flags = FormatFlags {
        program_name: Some("report".into()),
        ..Default::default()
    };
    let sections = vec![
        HelpSection::text("Generates reports."),
        HelpSection::usage(),
        HelpSection::groups(),
    ];
    let message = HelpFormatter::new(&schema)
        .with_config(plain_config())
        .with_flags(flags)
        .format(&sections);
    let expected = "\
Generates reports.

Usage:
  report [-h|--help] [(-o|--output-file) <file>] (-f|--format) <param> [(-t|--tags) [<tag>...]] [run]

Options:
  -h, --help                     Print this help.
  -o, --output-file  <file>      Where to write the report.
  -f, --format       <param>     Values must be one of {'json', 'yaml'}. Requires -o. Defaults to 'json'.
  -t, --tags         [<tag>...]  Accepts multiple parameters. Duplicate values will be removed.
  run                            Run the job.
";
    assert_eq!(message.wrap(None, true), expected);
}

#[test]
fn test_wrapping_keeps_description_indent() {
    let schema = Schema::new().with_option(
        "verbose",
        OptionDef::flag()
            .with_names(["-v"])
            .with_synopsis("Print every step of the pipeline while it runs."),
    );
    let message = HelpFormatter::new(&schema)
        .with_config(plain_config())
        .format(&groups_only());
    assert_eq!(
        message.wrap(Some(30), true),
        "  -v    Print every step of\n        the pipeline while it\n        runs.\n"
    );
}

#[test]
fn test_styles_are_emitted_and_reset() {
    let schema = Schema::new().with_option("a", OptionDef::flag().with_names(["-a"]));
    let message = format(
        &schema,
        &[HelpSection::usage()],
        &FormatFlags::default(),
    );
    let styled = message.wrap(None, false);
    assert!(styled.contains("\x1b[1mUsage:"));
    assert!(styled.contains("\x1b[35m-a"));
    assert_eq!(option_schema_text::strip_styles(&styled), message.wrap(None, true));
}

#[test]
fn test_usage_brackets_follow_required_members() {
    let schema = Schema::new()
        .with_option("flag", OptionDef::flag().with_names(["-f"]))
        .with_option(
            "single",
            OptionDef::single()
                .with_names(["-s"])
                .with_requires("flag")
                .required(),
        )
        .with_option("other", OptionDef::flag().with_names(["-x"]));
    let section = HelpSection::Usage(UsageSection::default());
    let text = HelpFormatter::new(&schema)
        .with_config(plain_config())
        .format(&[section])
        .wrap(None, true);
    assert_eq!(text, "-f -s <param> [-x]\n");
}

#[test]
fn test_flag_and_dependent_single() {
    let schema = Schema::new()
        .with_option("flag", OptionDef::flag().with_names(["-f"]))
        .with_option(
            "single",
            OptionDef::single().with_names(["-s"]).with_requires("flag"),
        );
    let report = validate(&schema, &ValidationFlags::default()).unwrap();
    assert!(report.is_clean());

    let text = HelpFormatter::new(&schema)
        .with_config(plain_config())
        .format(&[HelpSection::Usage(UsageSection::default())])
        .wrap(None, true);
    assert_eq!(text, "[-f] -s <param>\n");
}

#[test]
fn test_empty_sections_leave_no_gap() {
    let schema = Schema::new().with_option("a", OptionDef::flag().with_names(["-a"]).hidden());
    let sections = vec![
        HelpSection::text("Intro."),
        HelpSection::usage(),
        HelpSection::groups(),
        HelpSection::text("Outro."),
    ];
    let text = HelpFormatter::new(&schema)
        .with_config(plain_config())
        .format(&sections)
        .wrap(None, true);
    assert_eq!(text, "Intro.\n\nOutro.\n");
}

#[test]
fn test_validated_schema_formats() {
    let schema = sample_schema();
    let report = validate(&schema, &ValidationFlags::default()).unwrap();
    let warnings = format_warnings(&report, &plain_config()).wrap(None, true);
    for line in warnings.lines() {
        assert!(line.starts_with("Warning: "), "{line}");
    }
}
