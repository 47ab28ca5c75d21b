//! Symbols command implementation.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueHint};
use serde::Serialize;

use wotr_atlas::symbols::SymbolIssue;
use wotr_atlas::{
    imaging, load_templates, AtlasError, DetectorOptions, SymbolDetector, SymbolMap, SymbolMatch,
};
use wotr_common_config::SymbolsConfig;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Check and try out symbol templates
#[derive(Debug, Subcommand)]
pub enum SymbolsCommand {
    /// Lint template names, files and metadata against the symbol map
    Check(SymbolPaths),

    /// List the symbol map
    #[command(visible_alias = "ls")]
    List(SymbolPaths),

    /// Run detection on a single image, e.g. a saved region crop
    Detect(DetectArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SymbolPaths {
    /// Template directory [default: from config]
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// Symbol map JSON [default: from config]
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub map: Option<PathBuf>,
}

impl SymbolPaths {
    fn resolve<'a>(&'a self, config: &'a SymbolsConfig) -> (&'a Path, &'a Path) {
        (
            self.dir.as_deref().unwrap_or(&config.dir),
            self.map.as_deref().unwrap_or(&config.map),
        )
    }
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    #[command(flatten)]
    pub paths: SymbolPaths,

    /// Image to search
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub image: PathBuf,

    /// Intensity match threshold
    #[arg(long, value_name = "SCORE")]
    pub threshold: Option<f32>,

    /// Edge match threshold
    #[arg(long, value_name = "SCORE")]
    pub edge_threshold: Option<f32>,

    /// Also print the best scores of templates that were rejected
    #[arg(long)]
    pub all: bool,
}

impl SymbolsCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        match self {
            Self::Check(paths) => {
                let (dir, map_path) = paths.resolve(&ctx.config.symbols);
                let map = SymbolMap::load(map_path)?;
                let report = LintReport {
                    dir: dir.to_path_buf(),
                    map: map_path.to_path_buf(),
                    symbols: map.len(),
                    issues: map.lint(dir)?,
                };
                print_output(ctx, &report)?;

                let errors = report.issues.iter().filter(|i| i.is_error()).count();
                if errors > 0 {
                    return Err(CliError::user_with_hint(
                        format!("{errors} symbol problem(s) found"),
                        "rename templates to lowercase_with_underscores.png and add missing files",
                    ));
                }
                Ok(())
            }
            Self::List(paths) => {
                let (dir, map_path) = paths.resolve(&ctx.config.symbols);
                let map = SymbolMap::load(map_path)?;
                let rows = map
                    .iter()
                    .map(|(filename, meta)| SymbolRow {
                        filename: filename.to_string(),
                        name: meta.name.clone(),
                        glyph: meta.glyph.clone(),
                        token: meta.token.clone(),
                        description: meta.description.clone(),
                        template_present: dir.join(filename).is_file(),
                    })
                    .collect();
                print_output(ctx, &SymbolList(rows))
            }
            Self::Detect(args) => args.execute(ctx),
        }
    }
}

impl DetectArgs {
    fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let config = &ctx.config.symbols;
        let (dir, map_path) = self.paths.resolve(config);
        let map = SymbolMap::load(map_path)?;
        let templates = load_templates(dir, &map);
        if templates.is_empty() {
            return Err(CliError::user_with_hint(
                format!("no templates loaded from {}", dir.display()),
                "run `wotr symbols check` to see what is missing",
            ));
        }

        let detector = SymbolDetector::new(
            templates,
            DetectorOptions {
                threshold: self.threshold.unwrap_or(config.threshold),
                edge_threshold: self.edge_threshold.unwrap_or(config.edge_threshold),
                scales: config.scales.clone(),
            },
        );

        let image = image::open(&self.image).map_err(|e| AtlasError::image(&self.image, e))?;
        let gray = imaging::to_gray(&image);
        let matches = detector.detect(&gray);

        let scores = if self.all {
            let edges = imaging::canny(&gray, imaging::CANNY_LOW, imaging::CANNY_HIGH);
            detector
                .templates()
                .iter()
                .map(|t| {
                    let s = detector.score(&gray, &edges, &t.image);
                    TemplateScore {
                        filename: t.filename.clone(),
                        score: s.color,
                        edge_score: s.edge,
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        print_output(
            ctx,
            &DetectReport {
                image: self.image.clone(),
                matches,
                scores,
            },
        )
    }
}

#[derive(Debug, Serialize)]
pub struct LintReport {
    pub dir: PathBuf,
    pub map: PathBuf,
    pub symbols: usize,
    pub issues: Vec<SymbolIssue>,
}

impl FormattedOutput for LintReport {
    fn format_text(&self) -> String {
        let mut out = format!(
            "{} symbols in {} (templates in {})\n",
            self.symbols,
            self.map.display(),
            self.dir.display()
        );
        if self.issues.is_empty() {
            out.push_str("✓ no problems found\n");
        }
        for issue in &self.issues {
            let mark = if issue.is_error() { "✗" } else { "!" };
            out.push_str(&format!("  {mark} {issue}\n"));
        }
        out
    }
}

#[derive(Debug, Serialize)]
pub struct SymbolRow {
    pub filename: String,
    pub name: String,
    pub glyph: String,
    pub token: String,
    pub description: String,
    pub template_present: bool,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct SymbolList(pub Vec<SymbolRow>);

impl FormattedOutput for SymbolList {
    fn format_text(&self) -> String {
        self.0
            .iter()
            .map(|s| {
                let missing = if s.template_present { "" } else { "  (missing)" };
                format!("{:<24} {:<4} {:<12} {}{missing}", s.filename, s.glyph, s.token, s.name)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct TemplateScore {
    pub filename: String,
    pub score: f32,
    pub edge_score: f32,
}

#[derive(Debug, Serialize)]
pub struct DetectReport {
    pub image: PathBuf,
    pub matches: Vec<SymbolMatch>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scores: Vec<TemplateScore>,
}

impl FormattedOutput for DetectReport {
    fn format_text(&self) -> String {
        let mut out = if self.matches.is_empty() {
            format!("no symbols found in {}\n", self.image.display())
        } else {
            format!("{} symbol(s) in {}\n", self.matches.len(), self.image.display())
        };
        for m in &self.matches {
            out.push_str(&format!(
                "  {} {:<16} score {:.3}  edge {:.3}\n",
                m.label(),
                m.name,
                m.score,
                m.edge_score
            ));
        }
        if !self.scores.is_empty() {
            out.push_str("best scores:\n");
            for s in &self.scores {
                out.push_str(&format!(
                    "  {:<24} score {:.3}  edge {:.3}\n",
                    s.filename, s.score, s.edge_score
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lint_report_marks_errors() {
        let report = LintReport {
            dir: PathBuf::from("assets/symbols"),
            map: PathBuf::from("assets/symbols_map.json"),
            symbols: 1,
            issues: vec![
                SymbolIssue::EmptyToken {
                    filename: "eye.png".to_string(),
                },
                SymbolIssue::MissingTemplate {
                    filename: "eye.png".to_string(),
                    path: PathBuf::from("assets/symbols/eye.png"),
                },
            ],
        };
        let text = report.format_text();
        assert!(text.contains("! eye.png: empty token"));
        assert!(text.contains("✗ eye.png: template not found"));
    }

    #[test]
    fn test_symbol_list_marks_missing_templates() {
        let list = SymbolList(vec![SymbolRow {
            filename: "swords.png".to_string(),
            name: "Swords".to_string(),
            glyph: "⚔".to_string(),
            token: "SWORDS".to_string(),
            description: String::new(),
            template_present: false,
        }]);
        assert!(list.format_text().ends_with("(missing)"));
    }
}
