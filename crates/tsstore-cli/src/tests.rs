use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tsstore_core::Diagnostic;

use crate::completion::{
    detect_shell_from_env, resolve_completion_shell, write_completions_script, CliCompletionShell,
};
use crate::dispatch::resolve_config;
use crate::render::{output_style_for, render_diagnostic_lines, render_status_line, OutputStyle};
use crate::{Cli, Commands};

#[test]
fn parse_install_with_multiple_versions() {
    let cli = Cli::try_parse_from(["tsstore", "install", "5.4.2", "5.5.4"]).expect("must parse");
    match cli.command {
        Commands::Install { versions } => assert_eq!(versions, vec!["5.4.2", "5.5.4"]),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_install_requires_a_version() {
    assert!(Cli::try_parse_from(["tsstore", "install"]).is_err());
}

#[test]
fn parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "tsstore",
        "list",
        "--store-path",
        "/srv/tsstore",
        "--timeout",
        "45",
    ])
    .expect("must parse");
    assert_eq!(cli.store_path, Some(PathBuf::from("/srv/tsstore")));
    assert_eq!(cli.timeout, Some(Duration::from_secs(45)));
    assert!(matches!(cli.command, Commands::List));
}

#[test]
fn parse_rejects_zero_timeout() {
    assert!(Cli::try_parse_from(["tsstore", "--timeout", "0", "list"]).is_err());
    assert!(Cli::try_parse_from(["tsstore", "--timeout", "soon", "list"]).is_err());
}

#[test]
fn resolve_config_prefers_flags() {
    let cli = Cli::try_parse_from([
        "tsstore",
        "--store-path",
        "/srv/tsstore",
        "--timeout",
        "7",
        "path",
        "5.4.2",
    ])
    .expect("must parse");
    let config = resolve_config(&cli).expect("must resolve");
    assert_eq!(config.store_path, PathBuf::from("/srv/tsstore"));
    assert_eq!(config.timeout, Duration::from_secs(7));
}

#[test]
fn render_status_line_plain_is_unadorned() {
    assert_eq!(
        render_status_line(OutputStyle::Plain, "ok", "5.4.2 /tmp/store/5.4.2"),
        "5.4.2 /tmp/store/5.4.2"
    );
}

#[test]
fn render_status_line_rich_includes_ascii_badge() {
    assert_eq!(
        render_status_line(OutputStyle::Rich, "ok", "5.4.2 /tmp/store/5.4.2"),
        "[OK] 5.4.2 /tmp/store/5.4.2"
    );
}

#[test]
fn render_diagnostic_plain_indents_causes() {
    let diagnostic = Diagnostic::error([
        "Failed to install 'typescript@5.4.2'.",
        "failed to run package manager",
        "process exited with code 1",
    ]);
    assert_eq!(
        render_diagnostic_lines(OutputStyle::Plain, &diagnostic),
        vec![
            "error: Failed to install 'typescript@5.4.2'.",
            "  failed to run package manager",
            "  process exited with code 1",
        ]
    );
}

#[test]
fn render_diagnostic_rich_uses_badge() {
    let diagnostic = Diagnostic::warning(["stale lock removed"]);
    let lines = render_diagnostic_lines(OutputStyle::Rich, &diagnostic);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("[WARNING]"));
    assert!(lines[0].ends_with(" stale lock removed"));
}

#[test]
fn output_style_is_plain_without_terminal_or_with_no_color() {
    assert_eq!(output_style_for(true, false), OutputStyle::Rich);
    assert_eq!(output_style_for(false, false), OutputStyle::Plain);
    assert_eq!(output_style_for(true, true), OutputStyle::Plain);
}

#[test]
fn detect_shell_from_env_reads_shell_basename() {
    assert_eq!(
        detect_shell_from_env(Some("/usr/bin/zsh")),
        Some(CliCompletionShell::Zsh)
    );
    assert_eq!(
        detect_shell_from_env(Some("/opt/homebrew/bin/fish")),
        Some(CliCompletionShell::Fish)
    );
    assert_eq!(detect_shell_from_env(Some("/bin/tcsh")), None);
    assert_eq!(detect_shell_from_env(None), None);
}

#[test]
fn resolve_completion_shell_falls_back_by_platform() {
    assert_eq!(
        resolve_completion_shell(Some(CliCompletionShell::Fish), Some("/bin/bash"), false),
        CliCompletionShell::Fish
    );
    assert_eq!(
        resolve_completion_shell(None, Some("/bin/tcsh"), true),
        CliCompletionShell::Powershell
    );
    assert_eq!(
        resolve_completion_shell(None, None, false),
        CliCompletionShell::Bash
    );
}

#[test]
fn completions_script_names_binary() {
    let mut output = Vec::new();
    write_completions_script(CliCompletionShell::Bash, &mut output).expect("must write");
    let script = String::from_utf8(output).expect("utf8 script");
    assert!(script.contains("tsstore"));
    assert!(script.contains("install"));
}
