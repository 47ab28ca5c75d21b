//! Doctor command implementation.

use clap::Parser;
use console::{style, Emoji};
use serde::Serialize;
use std::path::Path;

use wotr_atlas::{SymbolMap, TesseractCli};
use wotr_common_config::{ConfigLoader, WotrConfig, CONFIG_DIR, CONFIG_FILE};

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

static CHECK: Emoji<'_, '_> = Emoji("✓", "ok");
static CROSS: Emoji<'_, '_> = Emoji("✗", "x");
static WARNING: Emoji<'_, '_> = Emoji("⚠", "!");

/// Check configuration, OCR backend and symbol assets
#[derive(Debug, Parser)]
pub struct DoctorCommand {
    /// Only check one component (config, ocr, symbols)
    #[arg(long, value_parser = ["config", "ocr", "symbols"])]
    check: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Warn,
    Fail,
}

#[derive(Debug, Serialize)]
pub struct Check {
    pub component: &'static str,
    pub status: Status,
    pub detail: String,
}

impl Check {
    fn new(component: &'static str, status: Status, detail: impl Into<String>) -> Self {
        Self {
            component,
            status,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub checks: Vec<Check>,
}

impl DoctorReport {
    fn failures(&self) -> usize {
        self.checks.iter().filter(|c| c.status == Status::Fail).count()
    }
}

impl FormattedOutput for DoctorReport {
    fn format_text(&self) -> String {
        let mut out = format!("{}\n\n", style("wotr health check").bold());
        for check in &self.checks {
            let mark = match check.status {
                Status::Ok => style(CHECK.to_string()).green(),
                Status::Warn => style(WARNING.to_string()).yellow(),
                Status::Fail => style(CROSS.to_string()).red(),
            };
            out.push_str(&format!("  {mark} {:<8} {}\n", check.component, check.detail));
        }
        out
    }
}

impl DoctorCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let mut checks = Vec::new();

        if self.should_check("config") {
            checks.push(check_config(ctx));
        }
        if self.should_check("ocr") {
            let config = ctx.config.clone();
            checks.push(tokio::task::spawn_blocking(move || check_ocr(&config)).await?);
        }
        if self.should_check("symbols") {
            checks.extend(check_symbols(&ctx.config));
        }

        let report = DoctorReport { checks };
        print_output(ctx, &report)?;

        match report.failures() {
            0 => Ok(()),
            n => Err(CliError::user_with_hint(
                format!("{n} check(s) failed"),
                "run with -v for details",
            )),
        }
    }

    fn should_check(&self, component: &str) -> bool {
        self.check.as_deref().map_or(true, |c| c == component)
    }
}

fn check_config(ctx: &CommandContext) -> Check {
    let path = ctx
        .config_path
        .clone()
        .unwrap_or_else(|| Path::new(CONFIG_DIR).join(CONFIG_FILE));
    let source = if path.exists() {
        path.display().to_string()
    } else {
        "defaults (no config file)".to_string()
    };

    match ConfigLoader::new(".").validate(&ctx.config) {
        Ok(()) => Check::new("config", Status::Ok, source),
        Err(e) => Check::new("config", Status::Fail, format!("{source}: {e}")),
    }
}

fn check_ocr(config: &WotrConfig) -> Check {
    let tesseract = TesseractCli::new(config.ocr.binary.clone(), config.ocr.psm);
    match tesseract.probe() {
        Some(version) => Check::new("ocr", Status::Ok, version),
        None => {
            // Only a problem when OCR is switched on by default.
            let status = if config.ocr.enabled {
                Status::Fail
            } else {
                Status::Warn
            };
            Check::new(
                "ocr",
                status,
                format!("`{}` not found; --ocr will be ignored", config.ocr.binary),
            )
        }
    }
}

fn check_symbols(config: &WotrConfig) -> Vec<Check> {
    let symbols = &config.symbols;
    let map = match SymbolMap::load(&symbols.map) {
        Ok(map) => map,
        Err(e) => {
            return vec![Check::new(
                "symbols",
                Status::Warn,
                format!("symbol map unavailable, detection needs --symbols-map: {e}"),
            )]
        }
    };

    let issues = match map.lint(&symbols.dir) {
        Ok(issues) => issues,
        Err(e) => return vec![Check::new("symbols", Status::Fail, e.to_string())],
    };

    let errors = issues.iter().filter(|i| i.is_error()).count();
    let status = match (errors, issues.len()) {
        (0, 0) => Status::Ok,
        (0, _) => Status::Warn,
        _ => Status::Fail,
    };
    let mut checks = vec![Check::new(
        "symbols",
        status,
        format!(
            "{} symbols in {}, {} problem(s)",
            map.len(),
            symbols.map.display(),
            issues.len()
        ),
    )];
    checks.extend(issues.iter().map(|issue| {
        let status = if issue.is_error() {
            Status::Fail
        } else {
            Status::Warn
        };
        Check::new("symbols", status, issue.to_string())
    }));
    checks
}
