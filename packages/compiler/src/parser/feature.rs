//! Feature file parsing and discovery.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use gherkin::GherkinEnv;
use regex::Regex;

use super::outline::{convert_step, normalize_tags, resolve_scenario, Inherited};
use crate::config::FEATURE_EXTENSION;
use crate::error::{CompilerError, PathKind, Result};
use crate::types::{Feature, ResolvedScenario};

/// `# language: es` directive.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LANGUAGE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#\s*language\s*:\s*([A-Za-z][A-Za-z-]*)\s*$").expect("valid regex")
});

/// Find the `# language:` directive among the leading comment lines.
fn detect_language(contents: &str) -> Option<&str> {
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !line.starts_with('#') {
            return None;
        }
        if let Some(caps) = LANGUAGE_DIRECTIVE.captures(line) {
            return caps.get(1).map(|m| m.as_str());
        }
    }
    None
}

fn gherkin_env(language: Option<&str>) -> Result<GherkinEnv> {
    match language {
        Some(lang) => GherkinEnv::new(lang)
            .map_err(|_| CompilerError::UnsupportedLanguage(lang.to_string())),
        None => Ok(GherkinEnv::default()),
    }
}

/// Parse feature text into a `Feature`.
///
/// `source_path` is only used for diagnostics and is stored on the result.
///
/// # Errors
/// Returns `Parse` if the text is not a valid Gherkin document and
/// `UnsupportedLanguage` for an unknown `# language:` directive.
pub fn parse_feature(contents: &str, source_path: &Path) -> Result<Feature> {
    let env = gherkin_env(detect_language(contents))?;

    // The grammar expects a terminating newline.
    let mut text = contents.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }

    let doc = gherkin::Feature::parse(&text, env).map_err(|e| CompilerError::Parse {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })?;

    let feature = convert_feature(&doc, source_path);
    tracing::debug!(
        feature = %feature.name,
        scenarios = feature.scenarios.len(),
        path = %source_path.display(),
        "parsed feature"
    );
    Ok(feature)
}

fn convert_feature(doc: &gherkin::Feature, source_path: &Path) -> Feature {
    let background = doc
        .background
        .as_ref()
        .map(|bg| bg.steps.iter().map(convert_step).collect());

    let mut scenarios: Vec<ResolvedScenario> = Vec::new();
    let top_level = Inherited::default();
    for scenario in &doc.scenarios {
        scenarios.extend(resolve_scenario(scenario, &top_level));
    }

    for rule in &doc.rules {
        let inherited = Inherited {
            tags: normalize_tags(&rule.tags),
            steps: rule
                .background
                .as_ref()
                .map(|bg| bg.steps.iter().map(convert_step).collect())
                .unwrap_or_default(),
        };
        for scenario in &rule.scenarios {
            scenarios.extend(resolve_scenario(scenario, &inherited));
        }
    }

    dedupe_names(&mut scenarios);

    Feature {
        name: doc.name.trim().to_string(),
        description: doc
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        tags: normalize_tags(&doc.tags),
        source_path: source_path.to_path_buf(),
        background,
        scenarios,
    }
}

/// Make scenario names unique within a feature by suffixing repeats.
fn dedupe_names(scenarios: &mut [ResolvedScenario]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for scenario in scenarios.iter_mut() {
        let count = seen.entry(scenario.name.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            scenario.name = format!("{} ({})", scenario.name, count);
        }
    }
}

/// Read and parse a single feature file.
///
/// # Errors
/// Returns `NotFound` if the file does not exist.
pub fn parse_feature_file(path: &Path) -> Result<Feature> {
    if !path.is_file() {
        return Err(CompilerError::NotFound {
            path: path.to_path_buf(),
            kind: PathKind::File,
        });
    }
    let contents = fs::read_to_string(path)?;
    parse_feature(&contents, path)
}

/// List feature files in a directory, sorted lexicographically.
///
/// # Errors
/// Returns `NotFound` if the directory does not exist and `NoFeatureFiles`
/// if it contains none.
pub fn find_feature_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CompilerError::NotFound {
            path: dir.to_path_buf(),
            kind: PathKind::Directory,
        });
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == FEATURE_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(CompilerError::NoFeatureFiles(dir.to_path_buf()));
    }
    Ok(files)
}

/// Parse every feature file in a directory, in lexicographic order.
pub fn parse_all_features(dir: &Path) -> Result<Vec<Feature>> {
    find_feature_files(dir)?
        .iter()
        .map(|path| parse_feature_file(path))
        .collect()
}

/// Parse a target that is either one feature file or a directory of them.
pub fn parse_target(target: &Path) -> Result<Vec<Feature>> {
    if target.is_dir() {
        parse_all_features(target)
    } else if target.is_file() {
        Ok(vec![parse_feature_file(target)?])
    } else {
        Err(CompilerError::NotFound {
            path: target.to_path_buf(),
            kind: PathKind::FileOrDirectory,
        })
    }
}

/// Keep only scenarios carrying at least one of `tags`.
///
/// Feature-level tags count for every scenario in the feature. An empty
/// `tags` list keeps everything. Features left without scenarios stay in
/// the list so parse output still reflects every file.
pub fn filter_by_tags(features: &mut [Feature], tags: &[String]) {
    let wanted = normalize_tags(tags);
    if wanted.is_empty() {
        return;
    }
    for feature in features.iter_mut() {
        let feature_match = feature.tags.iter().any(|t| wanted.contains(t));
        if feature_match {
            continue;
        }
        feature
            .scenarios
            .retain(|s| wanted.iter().any(|tag| s.has_tag(tag)));
    }
}
