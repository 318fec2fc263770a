//! Command-line interface for usecheck.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::classify::LanguageReview;
use crate::config::{self, Config, PluginsConfig};
use crate::detect::{Category, Origin, Runner};
use crate::loader::{LoadReport, Loader};
use crate::report::{self, ReportContext};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", "dist", "build", "coverage", "vendor"];

/// Usability heuristics linter for JSX/TSX components.
///
/// Usecheck parses UI components and reports places where the interface is
/// likely to violate well-known usability heuristics: missing breadcrumbs,
/// unconfirmed destructive actions, modals without an exit, inconsistent
/// styling, jargon and more.
#[derive(Parser)]
#[command(name = "usecheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze components for usability issues
    #[command(visible_alias = "check")]
    Lint(LintArgs),
    /// Create a usecheck config from a template
    Init(InitArgs),
    /// List heuristic categories and registered rules
    Rules(RulesArgs),
}

/// Arguments for the lint command.
#[derive(Parser)]
pub struct LintArgs {
    /// Path to check (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty, json, or sarif
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Show suppressed diagnostics in output
    #[arg(long)]
    pub show_suppressed: bool,

    /// Directory of rule modules (overrides plugins.dir)
    #[arg(long)]
    pub rules_dir: Option<PathBuf>,

    /// URL of the page under analysis, handed to rules that accept it
    #[arg(long)]
    pub url: Option<String>,

    /// Skip the remote domain-language check
    #[arg(long)]
    pub skip_language_check: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "usecheck.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = "minimal")]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

/// Arguments for the rules command.
#[derive(Parser)]
pub struct RulesArgs {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory of rule modules (overrides plugins.dir)
    #[arg(long)]
    pub rules_dir: Option<PathBuf>,
}

/// Available config templates.
struct Template {
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

/// All available templates.
static TEMPLATES: &[Template] = &[
    Template {
        name: "minimal",
        description: "Built-in heuristics with default thresholds",
        content: include_str!("templates/minimal.yaml"),
    },
    Template {
        name: "strict",
        description: "Tighter thresholds, fails on warnings",
        content: include_str!("templates/strict.yaml"),
    },
    Template {
        name: "plugins",
        description: "Loads rule modules and enables the domain-language check",
        content: include_str!("templates/plugins.yaml"),
    },
];

/// Load the config at `path`, or the discovered one, or defaults.
/// Returns the config and a label naming where it came from.
fn load_config(path: Option<&Path>) -> anyhow::Result<(Config, String)> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => Config::discover(Path::new(".")),
    };

    let Some(path) = path else {
        return Ok((Config::default(), "defaults".to_string()));
    };

    let config = Config::parse_file(&path)
        .map_err(|e| anyhow::anyhow!("cannot parse config {}: {}", path.display(), e))?;
    config::validate(&config).map_err(|e| anyhow::anyhow!("invalid config: {}", e))?;
    Ok((config, path.to_string_lossy().to_string()))
}

/// Load rule modules from `--rules-dir` or `plugins.dir`.
fn load_rules(config: &Config, rules_dir: Option<&Path>) -> LoadReport {
    let plugins = config.plugins.clone().unwrap_or_else(PluginsConfig::default);
    let dir = match rules_dir {
        Some(d) => d.to_path_buf(),
        None => match &plugins.dir {
            Some(d) => PathBuf::from(d),
            None => return LoadReport::default(),
        },
    };

    Loader::new(plugins.granted())
        .disabled_categories(config.disabled_categories())
        .load_dir(&dir)
}

/// Collect files to scan under `root`.
fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let extensions = config.extensions();
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            if !e.file_type().is_dir() || e.depth() == 0 {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&&*name)
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !extensions.contains(&ext) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if config.is_path_excluded(relative) || config.is_path_excluded(path) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Run the lint command.
pub fn run_lint(args: &LintArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" && args.format != "sarif" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty', 'json', or 'sarif'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let (config, config_label) = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Resolve path
    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let files = if abs_path.is_dir() {
        collect_files(&abs_path, &config)?
    } else {
        vec![abs_path.clone()]
    };

    if files.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    let disabled = config.disabled_categories();
    let mut runner = Runner::new()
        .with_builtins(&config.rules)
        .disabled_categories(disabled)
        .auxiliary(args.url.clone().or_else(|| config.target_url.clone()));

    let loaded = load_rules(&config, args.rules_dir.as_deref());
    let rule_warnings = loaded.warnings();
    for descriptor in loaded.loaded {
        runner.register(descriptor);
    }

    if config.language_check_enabled() && !args.skip_language_check {
        if let Some(lc) = &config.language_check {
            match LanguageReview::from_config(lc) {
                Ok(review) => runner = runner.with_language_review(review),
                Err(e) => tracing::warn!("language check disabled: {:#}", e),
            }
        }
    }

    let mut result = runner.run_files(&files)?;
    result.rule_warnings = rule_warnings;

    let path_str = args.path.to_string_lossy().to_string();
    let ctx = ReportContext {
        path: &path_str,
        config: &config_label,
        fail_on: config.fail_threshold(),
        show_suppressed: args.show_suppressed,
    };

    match args.format.as_str() {
        "json" => report::write_json(&ctx, &result)?,
        "sarif" => {
            let base = if abs_path.is_dir() {
                abs_path.clone()
            } else {
                abs_path.parent().map(Path::to_path_buf).unwrap_or_default()
            };
            report::write_sarif(&base, &result)?
        }
        _ => report::write_pretty(&ctx, &result),
    }

    if ctx.passed(&result) {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // List mode
    if args.list {
        return list_templates();
    }

    // Find template
    let template = match TEMPLATES.iter().find(|t| t.name == args.template) {
        Some(t) => t,
        None => {
            eprintln!("Error: unknown template {:?}", args.template);
            eprintln!("Run 'usecheck init --list' to see available templates");
            return Ok(EXIT_ERROR);
        }
    };

    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, template.content) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {} from template '{}'", args.output.display(), template.name);
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: usecheck lint src --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

/// List available templates.
fn list_templates() -> anyhow::Result<i32> {
    println!("Available templates:");
    println!();

    for template in TEMPLATES {
        let name = if template.name == "minimal" {
            format!("{} (default)", template.name)
        } else {
            template.name.to_string()
        };
        println!("  {:<20} {}", name, template.description);
    }

    println!();
    println!("Usage:");
    println!("  usecheck init --template <name>");

    Ok(EXIT_SUCCESS)
}

/// Run the rules command.
pub fn run_rules(args: &RulesArgs) -> anyhow::Result<i32> {
    let (config, _) = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let disabled = config.disabled_categories();
    println!("Categories:");
    println!();
    for category in Category::ALL {
        let state = if disabled.contains(&category) { " (disabled)" } else { "" };
        println!("  {}  {:<22}{}", category.code(), category.slug(), state);
        println!("          {}", category.label());
        println!("          {}", category.url());
    }

    let mut runner = Runner::new().with_builtins(&config.rules);
    let loaded = load_rules(&config, args.rules_dir.as_deref());
    for descriptor in loaded.loaded {
        runner.register(descriptor);
    }

    println!();
    println!("Analyzers:");
    println!();
    for d in runner.descriptors() {
        let origin = match &d.origin {
            Origin::Builtin => "built-in".to_string(),
            Origin::Loaded(path) => path.display().to_string(),
        };
        let aux = if d.accepts_auxiliary_context { " [aux]" } else { "" };
        println!("  {:<28} {}  {}{}", d.name, d.category().code(), origin, aux);
    }

    if !loaded.disabled.is_empty() {
        println!();
        println!("Not loaded (category disabled):");
        for path in &loaded.disabled {
            println!("  {}", path.display());
        }
    }

    if !loaded.skipped.is_empty() {
        println!();
        println!("Skipped modules:");
        for skipped in &loaded.skipped {
            println!("  {}", skipped);
        }
    }

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_templates_parse_and_validate() {
        for template in TEMPLATES {
            let config: Config = serde_yaml::from_str(template.content)
                .unwrap_or_else(|e| panic!("{}: {}", template.name, e));
            config::validate(&config).unwrap_or_else(|e| panic!("{}: {}", template.name, e));
        }
    }

    #[test]
    fn test_collect_files_skips_build_output() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for rel in [
            "src/App.tsx",
            "src/util.ts",
            "src/styles.css",
            "src/stories/Button.tsx",
            "node_modules/lib/index.js",
            "dist/app.js",
            ".cache/x.tsx",
        ] {
            let path = root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "").unwrap();
        }

        let config: Config = serde_yaml::from_str("excluded_paths: [\"**/stories/**\"]").unwrap();
        let files = collect_files(root, &config).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["src/App.tsx", "src/util.ts"]);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("usecheck.yaml");
        let args = InitArgs {
            output: output.clone(),
            template: "strict".to_string(),
            list: false,
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        assert!(std::fs::read_to_string(&output).unwrap().contains("fail_on"));
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_lint_exit_codes() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("Danger.tsx");
        std::fs::write(
            &file,
            "const D = () => <button onClick={() => api.deleteAccount()}>Delete account</button>;\n",
        )
        .unwrap();

        let mut args = LintArgs {
            path: file,
            config: None,
            format: "json".to_string(),
            show_suppressed: false,
            rules_dir: None,
            url: None,
            skip_language_check: true,
            verbose: false,
        };
        assert_eq!(run_lint(&args).unwrap(), EXIT_FAILED);

        args.format = "xml".to_string();
        assert_eq!(run_lint(&args).unwrap(), EXIT_ERROR);
    }
}
