//! White-label Android CLI
//!
//! Renders templates and generates per-customer `build.gradle.kts` files.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use whitelabel_android::{write_build_script, GradleGenerator, WhiteLabelApp};
use whitelabel_cli::output::{format_count, format_duration, format_size, print_error, print_validation, Status};
use whitelabel_core::config::Config;
use whitelabel_core::error::{exit_codes, Error, ErrorCode, ResultExt};
use whitelabel_telemetry::{timed_span, TelemetryConfig, Timer};
use whitelabel_template::{Context, ParseOptions, RenderOptions, Template};

#[derive(Parser)]
#[command(name = "whitelabel-android")]
#[command(about = "Render white-label Android build scripts from templates")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template with a JSON or TOML context
    Render {
        /// Template file
        #[arg(short, long)]
        template: PathBuf,
        /// Context file (.json or .toml)
        #[arg(long)]
        context: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Render missing names as empty instead of failing
        #[arg(long)]
        permissive: bool,
        /// Keep lines holding only section tags
        #[arg(long)]
        literal: bool,
    },

    /// Generate build.gradle.kts for one or more white-label apps
    Generate {
        /// App description files (.json or .toml)
        #[arg(required = true)]
        apps: Vec<PathBuf>,
        /// Flutter project directory (per-app subdirectories when several apps are given)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
        /// Template replacing the built-in one
        #[arg(short, long)]
        template: Option<PathBuf>,
        /// Output path relative to the project directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print scripts instead of writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Parse a template and list the names it references
    Check {
        /// Template file
        #[arg(short, long)]
        template: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate an app description without rendering
    Validate {
        /// App description file (.json or .toml)
        app: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Settings shared by every command
struct Session {
    config: Config,
    quiet: bool,
}

impl Session {
    fn info(&self, message: &str) {
        if !self.quiet {
            Status::info(message);
        }
    }

    fn success(&self, message: &str) {
        if !self.quiet {
            Status::success(message);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    whitelabel_telemetry::init_with_config(TelemetryConfig::for_cli(
        cli.verbose,
        cli.quiet,
        !cli.no_color,
    ))?;

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            print_error(&e);
            std::process::exit(e.exit_code());
        }
    };
    let session = Session {
        config,
        quiet: cli.quiet,
    };

    let exit_code = match cli.command {
        Commands::Render {
            template,
            context,
            output,
            permissive,
            literal,
        } => run_render(&session, &template, &context, output.as_deref(), permissive, literal),
        Commands::Generate {
            apps,
            project_dir,
            template,
            output,
            dry_run,
        } => run_generate(&session, &apps, &project_dir, template, output, dry_run),
        Commands::Check { template, json } => run_check(&session, &template, json),
        Commands::Validate { app, json } => run_validate(&session, &app, json),
    };

    std::process::exit(exit_code);
}

fn read_text(path: &Path) -> whitelabel_core::Result<String> {
    if !path.is_file() {
        return Err(Error::file_not_found(path));
    }
    std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("While reading {}", path.display()))
}

fn load_context(path: &Path) -> whitelabel_core::Result<Context> {
    let text = read_text(path)?;
    let context = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Context::from_json_str(&text),
        Some("toml") => Context::from_toml_str(&text),
        _ => {
            return Err(Error::new(
                ErrorCode::InvalidFormat,
                format!("Unsupported context format: {}", path.display()),
            )
            .with_suggestion("Use a .json or .toml context file"))
        }
    };
    context
        .map_err(Error::from)
        .context(format!("While loading context {}", path.display()))
}

fn run_render(
    session: &Session,
    template: &Path,
    context: &Path,
    output: Option<&Path>,
    permissive: bool,
    literal: bool,
) -> i32 {
    let render = &session.config.schema.render;
    let parse = ParseOptions::default().standalone_lines(render.standalone_lines && !literal);
    let options = if permissive {
        RenderOptions::permissive()
    } else {
        render.render_options()
    };

    let rendered = read_text(template).and_then(|source| {
        let context = load_context(context)?;
        let parsed = Template::parse_with(&source, parse)
            .map_err(|e| Error::from(whitelabel_template::TemplateError::from(e)))
            .context(format!("In template {}", template.display()))?;
        parsed
            .render_with(&context, &options)
            .map_err(Error::from)
            .context(format!("In template {}", template.display()))
    });

    let rendered = match rendered {
        Ok(rendered) => rendered,
        Err(e) => {
            print_error(&e);
            return e.exit_code();
        }
    };

    match output {
        Some(path) => match std::fs::write(path, &rendered) {
            Ok(()) => {
                session.success(&format!(
                    "Wrote {} ({})",
                    path.display(),
                    format_size(rendered.len() as u64)
                ));
                exit_codes::SUCCESS
            }
            Err(e) => {
                print_error(&Error::from(e).with_context(format!("While writing {}", path.display())));
                exit_codes::FAILURE
            }
        },
        None => {
            print!("{rendered}");
            exit_codes::SUCCESS
        }
    }
}

fn run_generate(
    session: &Session,
    apps: &[PathBuf],
    project_dir: &Path,
    template: Option<PathBuf>,
    output: Option<PathBuf>,
    dry_run: bool,
) -> i32 {
    timed_span!("generate", apps = apps.len());
    let timer = Timer::start("generate_all");
    let android = &session.config.schema.android;

    let template_source = match template.or_else(|| android.template.clone()) {
        Some(path) => match read_text(&path) {
            Ok(source) => Some(source),
            Err(e) => {
                print_error(&e);
                return e.exit_code();
            }
        },
        None => None,
    };

    let generator =
        match GradleGenerator::from_config(&session.config.schema.render, template_source.as_deref()) {
            Ok(generator) => generator,
            Err(e) => {
                print_error(&e);
                return e.exit_code();
            }
        };

    let loaded = match apps
        .iter()
        .map(|path| WhiteLabelApp::load(path))
        .collect::<whitelabel_core::Result<Vec<_>>>()
    {
        Ok(loaded) => loaded,
        Err(e) => {
            print_error(&e);
            return e.exit_code();
        }
    };

    let output = output.unwrap_or_else(|| android.output.clone());
    let targets = match output_dirs(apps, project_dir) {
        Ok(targets) => targets,
        Err(e) => {
            print_error(&e);
            return e.exit_code();
        }
    };
    let results = generator.generate_all(&loaded);
    let mut exit_code = exit_codes::SUCCESS;
    let mut written = 0;

    for (((path, app), target), result) in apps.iter().zip(&loaded).zip(&targets).zip(results) {
        let script = match result {
            Ok(script) => script,
            Err(e) => {
                print_error(&e);
                exit_code = e.exit_code();
                continue;
            }
        };

        if dry_run {
            if apps.len() > 1 {
                println!("// {}", path.display());
            }
            print!("{script}");
            continue;
        }

        match write_build_script(target, &output, &script) {
            Ok(written_path) => {
                written += 1;
                session.success(&format!("{} → {}", app.namespace, written_path.display()));
            }
            Err(e) => {
                print_error(&e);
                exit_code = e.exit_code();
            }
        }
    }

    if !dry_run {
        session.info(&format!(
            "Generated {} in {}",
            format_count(written, "build script", "build scripts"),
            format_duration(timer.stop())
        ));
    }
    exit_code
}

/// Project directory for each app: `project_dir` itself for a single app,
/// otherwise one subdirectory per app file stem.
fn output_dirs(apps: &[PathBuf], project_dir: &Path) -> whitelabel_core::Result<Vec<PathBuf>> {
    if apps.len() == 1 {
        return Ok(vec![project_dir.to_path_buf()]);
    }

    let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
    let mut dirs = Vec::with_capacity(apps.len());
    for app in apps {
        let dir = project_dir.join(app.file_stem().unwrap_or_default());
        if let Some(first) = seen.insert(dir.clone(), app) {
            return Err(Error::validation(format!(
                "{} and {} both write to {}",
                first.display(),
                app.display(),
                dir.display()
            ))
            .with_suggestion("Give every app description a distinct file name"));
        }
        dirs.push(dir);
    }
    Ok(dirs)
}

fn run_check(session: &Session, template: &Path, json: bool) -> i32 {
    let source = match read_text(template) {
        Ok(source) => source,
        Err(e) => {
            print_error(&e);
            return e.exit_code();
        }
    };

    let parse = session.config.schema.render.parse_options();
    match Template::parse_with(&source, parse) {
        Ok(parsed) => {
            if json {
                let report = serde_json::json!({
                    "valid": true,
                    "variables": parsed.variables(),
                    "sections": parsed.sections(),
                });
                println!("{}", report);
            } else {
                session.success(&format!("{} parsed", template.display()));
                Status::item("variables", &parsed.variables().join(", "));
                Status::item("sections", &parsed.sections().join(", "));
            }
            exit_codes::SUCCESS
        }
        Err(e) => {
            let (name, line, column) = (e.name().map(str::to_string), e.line, e.column);
            let err = Error::from(whitelabel_template::TemplateError::from(e))
                .with_context(format!("In template {}", template.display()));
            if json {
                let report = serde_json::json!({
                    "valid": false,
                    "name": name,
                    "line": line,
                    "column": column,
                    "error": err.to_report(),
                });
                println!("{}", report);
            } else {
                print_error(&err);
            }
            err.exit_code()
        }
    }
}

fn run_validate(session: &Session, path: &Path, json: bool) -> i32 {
    let app = match WhiteLabelApp::load(path) {
        Ok(app) => app,
        Err(e) => {
            print_error(&e);
            return e.exit_code();
        }
    };

    let result = app.validate();
    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(report) => println!("{report}"),
            Err(e) => {
                print_error(&Error::from(e));
                return exit_codes::FAILURE;
            }
        }
    } else {
        print_validation(&app.namespace, &result);
        if result.is_valid() {
            session.success(&format!("{} is valid", path.display()));
        }
    }

    if result.is_valid() {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_ERROR
    }
}
