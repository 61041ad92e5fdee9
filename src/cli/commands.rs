use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Find GitHub Actions jobs that can move from ubuntu-latest to ubuntu-slim
#[derive(Parser, Debug)]
#[command(
    name = "slimify",
    about = "Find GitHub Actions jobs that can move from ubuntu-latest to ubuntu-slim",
    version,
    author,
    args_conflicts_with_subcommands = true,
    long_about = "slimify analyzes .github/workflows/*.yml and reports which ubuntu-latest \
                  jobs can safely run on the lighter ubuntu-slim runner. A job qualifies \
                  when it uses no Docker commands or actions, no services or container, \
                  and its last run finished in under 15 minutes.\n\n\
                  Running without a subcommand is the same as `slimify scan`."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Scan options used when no subcommand is given
    #[command(flatten)]
    pub scan: ScanArgs,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Verbose output, including why jobs are ineligible"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Report jobs that can migrate to ubuntu-slim",
        long_about = "Evaluates every job in the repository's workflow files and lists the \
                      ones that can migrate to ubuntu-slim.\n\n\
                      Examples:\n  \
                      slimify scan\n  \
                      slimify scan -C /path/to/repo\n  \
                      slimify scan --file .github/workflows/ci.yml --skip-duration\n  \
                      slimify scan --format json"
    )]
    Scan(ScanArgs),

    #[command(
        about = "Rewrite runs-on of eligible jobs to ubuntu-slim",
        long_about = "Replaces `runs-on: ubuntu-latest` with `ubuntu-slim` for every job that \
                      meets all migration criteria. Jobs that call commands missing on \
                      ubuntu-slim are skipped unless --force is given.\n\n\
                      Examples:\n  \
                      slimify fix\n  \
                      slimify fix --skip-duration\n  \
                      slimify fix --force"
    )]
    Fix(FixArgs),
}

/// Options selecting what to scan
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    #[arg(
        short = 'C',
        long = "repo",
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        long = "file",
        value_name = "PATH",
        help = "Workflow file to scan, relative to the repository (repeatable)"
    )]
    pub files: Vec<PathBuf>,

    #[arg(
        long,
        help = "Do not fetch run durations from GitHub (the duration check is skipped)"
    )]
    pub skip_duration: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FixArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[arg(
        long,
        help = "Also migrate jobs that call commands missing on ubuntu-slim"
    )]
    pub force: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    #[default]
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults_to_scan() {
        let args = CliArgs::parse_from(["slimify"]);
        assert!(args.command.is_none());
        assert_eq!(args.scan.format, OutputFormatArg::Human);
        assert!(args.scan.target.repository_path.is_none());
        assert!(args.scan.target.files.is_empty());
        assert!(!args.scan.target.skip_duration);
    }

    #[test]
    fn test_top_level_scan_options() {
        let args = CliArgs::parse_from(["slimify", "-C", "/tmp/repo", "--skip-duration"]);
        assert!(args.command.is_none());
        assert_eq!(
            args.scan.target.repository_path,
            Some(PathBuf::from("/tmp/repo"))
        );
        assert!(args.scan.target.skip_duration);
    }

    #[test]
    fn test_scan_with_options() {
        let args = CliArgs::parse_from([
            "slimify",
            "scan",
            "--repo",
            "/tmp/repo",
            "--file",
            ".github/workflows/ci.yml",
            "--file",
            ".github/workflows/lint.yml",
            "--format",
            "json",
        ]);

        match args.command {
            Some(Commands::Scan(scan_args)) => {
                assert_eq!(scan_args.format, OutputFormatArg::Json);
                assert_eq!(scan_args.target.files.len(), 2);
                assert_eq!(
                    scan_args.target.repository_path,
                    Some(PathBuf::from("/tmp/repo"))
                );
            }
            _ => panic!("Expected Scan command"),
        }
    }

    #[test]
    fn test_fix_command() {
        let args = CliArgs::parse_from(["slimify", "fix", "--force", "--skip-duration"]);
        match args.command {
            Some(Commands::Fix(fix_args)) => {
                assert!(fix_args.force);
                assert!(fix_args.target.skip_duration);
            }
            _ => panic!("Expected Fix command"),
        }
    }

    #[test]
    fn test_fix_rejects_format() {
        assert!(CliArgs::try_parse_from(["slimify", "fix", "--format", "json"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["slimify", "scan", "-v"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["slimify", "fix", "-q"]);
        assert!(args.quiet);

        let args = CliArgs::parse_from(["slimify", "scan", "--log-level", "debug"]);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["slimify", "-v", "-q"]).is_err());
    }
}
