//! Turnover Insight CLI Module
//!
//! Command-line interface for serving, fitting artifacts and evaluation.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::artifacts::{self, ArtifactPaths};
use crate::data::{DatasetLoader, FeatureSchema};
use crate::inference::{LinearScaledModel, ModelFamily, TreeEnsembleModel};
use crate::preprocessing::{Scaler, ScalerType};
use crate::serving::{evaluation::evaluate_held_out, FamilyService, LoadedModel, ServingContext};
use crate::training::{LogisticRegression, RandomForest, StratifiedSplit};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_fail(msg: &str) {
    println!("  {} {}", "✗".red(), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "turnover-insight")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Employee turnover-intention prediction service")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    Serve {
        /// Server port (overrides API_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Server host (overrides API_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Directory holding the artifacts (overrides MODELS_DIR)
        #[arg(long)]
        models_dir: Option<String>,

        /// Dataset used by /rf/evaluate-new-data (overrides NEW_DATA_PATH)
        #[arg(long)]
        new_data: Option<String>,
    },

    /// Fit both model families on a dataset and write their artifacts
    Fit {
        /// Training CSV with the two stress features and turnover_intention
        #[arg(short, long)]
        data: PathBuf,

        /// Output directory for the artifacts
        #[arg(long, default_value = "./models")]
        models_dir: PathBuf,

        /// Number of trees in the random forest
        #[arg(long, default_value = "100")]
        n_estimators: usize,

        /// Maximum depth of each tree (unlimited when omitted)
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Load the artifacts and print the startup evaluation for both families
    Evaluate {
        /// Directory holding the artifacts
        #[arg(long, default_value = "./models")]
        models_dir: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

/// Seed shared by the split and the forest
const FIT_SEED: u64 = 42;

pub fn cmd_fit(
    data_path: &Path,
    models_dir: &Path,
    n_estimators: usize,
    max_depth: Option<usize>,
) -> anyhow::Result<()> {
    section("Fit");

    step_run("Loading data");
    let start = Instant::now();
    let dataset = DatasetLoader::new().load(data_path)?;
    let x = dataset.features();
    let y = dataset.targets()?;
    step_done(&format!("{} rows in {:?}", dataset.len(), start.elapsed()));

    let names = FeatureSchema::names();

    step_run(&format!("Training {}", "logistic regression".cyan()));
    let start = Instant::now();
    let mut scaler = Scaler::new(ScalerType::Standard);
    let x_scaled = scaler.fit_transform(&x, &names)?;
    let mut logistic = LogisticRegression::new();
    logistic.fit(&x_scaled, &y)?;
    let linear = LinearScaledModel::new(scaler, logistic)?;
    step_done(&format!("{:?}", start.elapsed()));

    step_run(&format!("Training {} ({} trees)", "random forest".cyan(), n_estimators));
    let start = Instant::now();
    let mut forest = RandomForest::new(n_estimators).with_random_state(FIT_SEED);
    if let Some(depth) = max_depth {
        forest = forest.with_max_depth(depth);
    }
    forest.fit_named(&x, &y, &names)?;
    step_done(&format!("{:?}", start.elapsed()));

    let paths = ArtifactPaths::in_dir(models_dir);
    artifacts::save_linear_model(&paths, &linear)?;
    artifacts::save_ensemble_model(&paths, &forest, &names)?;
    step_ok(&format!("Artifacts written to {}", models_dir.display()));

    let same_file = match (data_path.canonicalize(), paths.dataset.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if !same_file {
        std::fs::copy(data_path, &paths.dataset)?;
        step_ok(&format!("Dataset copied to {}", paths.dataset.display()));
    }

    let splitter = StratifiedSplit::new(0.3, FIT_SEED);
    let families = [
        ("Logistic", LoadedModel::Linear(linear)),
        ("Random forest", LoadedModel::Ensemble(TreeEnsembleModel::new(forest, names)?)),
    ];

    println!();
    for (label, model) in &families {
        match evaluate_held_out(model, &dataset, &splitter) {
            Ok(eval) => println!(
                "  {:<16} {} {} {}",
                muted(label),
                kv("recall", &format!("{:.4}", eval.metrics.recall)),
                kv("f1", &format!("{:.4}", eval.metrics.f1_score)),
                kv("auc", &format!("{:.4}", eval.metrics.auc)),
            ),
            Err(e) => step_fail(&format!("{} held-out evaluation failed: {}", label, e)),
        }
    }
    println!();

    Ok(())
}

fn print_family(service: &FamilyService) {
    let title = match service.family() {
        ModelFamily::Logistic => "Logistic regression",
        ModelFamily::Rf => "Random forest",
    };
    section(title);

    if service.is_ready() {
        step_ok("model loaded");
    } else {
        step_fail("model not loaded");
    }

    let eval = service.evaluation();
    println!("  {:<16} {}", muted("Recall"), eval.recall.white().bold());
    println!("  {:<16} {}", muted("F1"), eval.f1_score.white().bold());
    println!("  {:<16} {}", muted("AUC"), eval.auc.white().bold());
    println!(
        "  {:<16} {}",
        muted("Samples"),
        format!("{} (train {}, test {})", eval.total_samples, eval.train_size, eval.test_size).white()
    );
}

pub fn cmd_evaluate(models_dir: &Path) -> anyhow::Result<()> {
    let paths = ArtifactPaths::in_dir(models_dir);
    let ctx = ServingContext::load(&paths);

    print_family(&ctx.logistic);
    print_family(&ctx.rf);

    if ctx.rf.is_ready() && ctx.new_data_path().exists() {
        section("Random forest on new data");
        let report = ctx.evaluate_new_data()?;
        let m = &report.metrics;
        println!("  {:<16} {}", muted("Accuracy"), format!("{:.4}", m.accuracy).white().bold());
        println!("  {:<16} {}", muted("Recall"), format!("{:.4}", m.recall).white());
        println!("  {:<16} {}", muted("F1"), format!("{:.4}", m.f1_score).white());
        println!("  {:<16} {}", muted("AUC"), format!("{:.4}", m.auc).white());
        let [[tn, fp], [fn_, tp]] = report.confusion_matrix;
        println!("  {:<16} {}", muted("Confusion"), format!("tn {} fp {} fn {} tp {}", tn, fp, fn_, tp).white());
    }
    println!();

    Ok(())
}

pub async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    models_dir: Option<String>,
    new_data: Option<String>,
) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    let mut config = ServerConfig::default();
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(dir) = models_dir {
        config = config.with_models_dir(dir);
    }
    if let Some(path) = new_data {
        config = config.with_new_data_path(path);
    }

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Turnover Insight".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Pages  ", &format!("http://{}:{}", config.host, config.port)));
    line_box(&kv("Health ", &format!("http://{}:{}/health", config.host, config.port)));
    line_box(&kv("Models ", &config.models_dir));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config).await
}
